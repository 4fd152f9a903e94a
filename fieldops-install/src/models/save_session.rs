//! Save button state machine
//!
//! One session per submit:
//! IDLE → VALIDATING → (INVALID_STOP | RUNNING(step)…) → REPORTING → IDLE

use chrono::{DateTime, Utc};
use fieldops_common::events::{SaveState, SaveStep};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// State transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_state: SaveState,
    pub new_state: SaveState,
    pub transitioned_at: DateTime<Utc>,
}

/// Step-weighted progress
///
/// Each step contributes its weight once it has returned, whether it ran
/// or was skipped, so the percentage only grows and reaches 100 exactly
/// when every step is accounted for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveProgress {
    finished: BTreeSet<SaveStep>,
    /// Step currently executing, None between steps
    pub current_step: Option<SaveStep>,
}

impl SaveProgress {
    pub fn start(&mut self, step: SaveStep) {
        self.current_step = Some(step);
    }

    /// Mark a step as returned. Finishing the same step twice is a no-op.
    pub fn finish(&mut self, step: SaveStep) {
        self.finished.insert(step);
        if self.current_step == Some(step) {
            self.current_step = None;
        }
    }

    /// Percentage complete (0 - 100)
    pub fn percentage(&self) -> u8 {
        let total: u32 = self.finished.iter().map(|s| s.weight() as u32).sum();
        total.min(100) as u8
    }

    #[cfg(test)]
    fn is_complete(&self) -> bool {
        SaveStep::ALL.iter().all(|s| self.finished.contains(s))
    }
}

/// In-memory record of one submit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSession {
    pub session_id: Uuid,
    pub job_id: String,
    pub state: SaveState,
    pub progress: SaveProgress,
    /// Every transition, oldest first
    pub transitions: Vec<StateTransition>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl SaveSession {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            job_id: job_id.into(),
            state: SaveState::Idle,
            progress: SaveProgress::default(),
            transitions: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to new state
    pub fn transition_to(&mut self, new_state: SaveState) -> StateTransition {
        let transition = StateTransition {
            session_id: self.session_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;

        if let SaveState::Running(step) = new_state {
            self.progress.start(step);
        }

        // Back to idle closes the session
        if new_state == SaveState::Idle && !self.transitions.is_empty() {
            self.ended_at = Some(Utc::now());
        }

        self.transitions.push(transition.clone());
        transition
    }

    /// States visited, starting with the initial one
    #[cfg(test)]
    fn state_path(&self) -> Vec<SaveState> {
        let mut path = vec![self
            .transitions
            .first()
            .map(|t| t.old_state)
            .unwrap_or(self.state)];
        path.extend(self.transitions.iter().map(|t| t.new_state));
        path
    }

    pub fn elapsed_ms(&self) -> u64 {
        (Utc::now() - self.started_at).num_milliseconds().max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_weighted_and_monotonic() {
        let mut progress = SaveProgress::default();
        let mut last = progress.percentage();
        assert_eq!(last, 0);

        for step in SaveStep::ALL {
            progress.start(step);
            progress.finish(step);
            let now = progress.percentage();
            assert!(now > last, "{:?} should advance progress", step);
            last = now;
        }

        assert_eq!(last, 100);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_progress_finish_twice_counts_once() {
        let mut progress = SaveProgress::default();
        progress.finish(SaveStep::Media);
        progress.finish(SaveStep::Media);
        assert_eq!(progress.percentage(), SaveStep::Media.weight());
    }

    #[test]
    fn test_progress_below_100_until_every_step_returns() {
        let mut progress = SaveProgress::default();
        for step in &SaveStep::ALL[..5] {
            progress.finish(*step);
        }
        assert!(progress.percentage() < 100);
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_transitions_are_recorded() {
        let mut session = SaveSession::new("JO-1");
        assert_eq!(session.state, SaveState::Idle);

        session.transition_to(SaveState::Validating);
        let t = session.transition_to(SaveState::Running(SaveStep::Credentials));
        assert_eq!(t.old_state, SaveState::Validating);
        assert_eq!(session.progress.current_step, Some(SaveStep::Credentials));

        session.transition_to(SaveState::Reporting);
        assert!(session.ended_at.is_none());
        session.transition_to(SaveState::Idle);
        assert!(session.ended_at.is_some());

        assert_eq!(
            session.state_path(),
            vec![
                SaveState::Idle,
                SaveState::Validating,
                SaveState::Running(SaveStep::Credentials),
                SaveState::Reporting,
                SaveState::Idle,
            ]
        );
    }
}
