//! Dependent selection resolution
//!
//! Two independent chains narrow option lists from parent selections:
//!
//! - Administrative: REGION → CITY → BARANGAY → LOCATION
//! - Topology: LCP + NAP → composite key → PORT
//!
//! Everything here is a pure function of a [`Catalogs`] value and a
//! [`CompletionForm`]; nothing reads ambient state.

pub mod catalogs;

pub use catalogs::{
    BarangayRecord, Catalogs, CityRecord, LcpRecord, LocationRecord, NapRecord, PortRecord,
    RegionRecord,
};

use crate::models::CompletionForm;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A dependent form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionLevel {
    Region,
    City,
    Barangay,
    Location,
    Lcp,
    Nap,
    Port,
}

/// Administrative chain, root first
pub const ADMIN_CHAIN: [SelectionLevel; 4] = [
    SelectionLevel::Region,
    SelectionLevel::City,
    SelectionLevel::Barangay,
    SelectionLevel::Location,
];

/// Topology chain; LCP and NAP are independent siblings
pub const TOPOLOGY_CHAIN: [SelectionLevel; 3] =
    [SelectionLevel::Lcp, SelectionLevel::Nap, SelectionLevel::Port];

impl SelectionLevel {
    /// Levels whose options depend on this one and must be blanked when it changes
    pub fn dependents(self) -> &'static [SelectionLevel] {
        match self {
            SelectionLevel::Region => &ADMIN_CHAIN[1..],
            SelectionLevel::City => &ADMIN_CHAIN[2..],
            SelectionLevel::Barangay => &ADMIN_CHAIN[3..],
            SelectionLevel::Location => &[],
            SelectionLevel::Lcp | SelectionLevel::Nap => &[SelectionLevel::Port],
            SelectionLevel::Port => &[],
        }
    }

    /// Levels that must be set before this one has options
    pub fn parents(self) -> &'static [SelectionLevel] {
        match self {
            SelectionLevel::Region | SelectionLevel::Lcp | SelectionLevel::Nap => &[],
            SelectionLevel::City => &[SelectionLevel::Region],
            SelectionLevel::Barangay => &[SelectionLevel::City],
            SelectionLevel::Location => &[SelectionLevel::Barangay],
            SelectionLevel::Port => &[SelectionLevel::Lcp, SelectionLevel::Nap],
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            SelectionLevel::Region => "region",
            SelectionLevel::City => "city",
            SelectionLevel::Barangay => "barangay",
            SelectionLevel::Location => "location",
            SelectionLevel::Lcp => "lcp",
            SelectionLevel::Nap => "nap",
            SelectionLevel::Port => "port",
        }
    }

    /// Current value on the form
    pub fn get(self, form: &CompletionForm) -> &str {
        match self {
            SelectionLevel::Region => &form.region,
            SelectionLevel::City => &form.city,
            SelectionLevel::Barangay => &form.barangay,
            SelectionLevel::Location => &form.location,
            SelectionLevel::Lcp => &form.lcp,
            SelectionLevel::Nap => &form.nap,
            SelectionLevel::Port => &form.port,
        }
    }

    fn slot(self, form: &mut CompletionForm) -> &mut String {
        match self {
            SelectionLevel::Region => &mut form.region,
            SelectionLevel::City => &mut form.city,
            SelectionLevel::Barangay => &mut form.barangay,
            SelectionLevel::Location => &mut form.location,
            SelectionLevel::Lcp => &mut form.lcp,
            SelectionLevel::Nap => &mut form.nap,
            SelectionLevel::Port => &mut form.port,
        }
    }
}

impl fmt::Display for SelectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SelectionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ADMIN_CHAIN
            .iter()
            .chain(TOPOLOGY_CHAIN.iter())
            .copied()
            .find(|level| level.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown selection level '{}'", s))
    }
}

/// A chosen value and whether the live catalog still offers it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub chosen: String,
    pub valid_in_catalog: bool,
}

impl Selection {
    pub fn is_stale(&self) -> bool {
        !self.valid_in_catalog
    }
}

/// One rendered dropdown entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OptionEntry {
    /// Offered by the live catalog
    Catalog(String),
    /// Persisted historical value the catalog no longer offers
    Stale(String),
}

impl OptionEntry {
    pub fn value(&self) -> &str {
        match self {
            OptionEntry::Catalog(v) | OptionEntry::Stale(v) => v,
        }
    }
}

/// Candidates for one level plus the form's current value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelOptions {
    pub level: SelectionLevel,
    /// Catalog order preserved
    pub candidates: Vec<String>,
    pub current: Option<Selection>,
}

impl LevelOptions {
    /// Dropdown entries: a stale current value first, then the catalog
    pub fn rendered(&self) -> Vec<OptionEntry> {
        let mut entries = Vec::with_capacity(self.candidates.len() + 1);
        if let Some(current) = self.current.as_ref().filter(|c| c.is_stale()) {
            entries.push(OptionEntry::Stale(current.chosen.clone()));
        }
        entries.extend(self.candidates.iter().cloned().map(OptionEntry::Catalog));
        entries
    }
}

/// `"{lcp}-{nap}"`, or None while either half is blank
pub fn composite_key(lcp: &str, nap: &str) -> Option<String> {
    let (lcp, nap) = (lcp.trim(), nap.trim());
    if lcp.is_empty() || nap.is_empty() {
        return None;
    }
    Some(format!("{}-{}", lcp, nap))
}

/// Set `level` and blank every strictly-dependent level
pub fn on_select(level: SelectionLevel, value: &str, form: &mut CompletionForm) {
    *level.slot(form) = value.to_string();
    for dependent in level.dependents() {
        level_clear(*dependent, form);
    }
}

fn level_clear(level: SelectionLevel, form: &mut CompletionForm) {
    level.slot(form).clear();
}

/// Blank any child whose parent is blank
///
/// Returns the levels that were cleared. An orphaned child is never
/// persisted, so the orchestrator runs this before building payloads.
pub fn strip_orphans(form: &mut CompletionForm) -> Vec<SelectionLevel> {
    let mut cleared = Vec::new();
    for level in ADMIN_CHAIN.iter().chain(TOPOLOGY_CHAIN.iter()).copied() {
        let orphaned = level
            .parents()
            .iter()
            .any(|parent| parent.get(form).trim().is_empty());
        if orphaned && !level.get(form).is_empty() {
            level_clear(level, form);
            cleared.push(level);
        }
    }
    cleared
}

/// Narrows option lists from parent selections
pub struct DependentSelectionResolver<'a> {
    catalogs: &'a Catalogs,
}

impl<'a> DependentSelectionResolver<'a> {
    pub fn new(catalogs: &'a Catalogs) -> Self {
        Self { catalogs }
    }

    /// Candidate values for `level` given the form's parent selections
    ///
    /// Empty when a parent is unset or cannot be found in its own
    /// (already narrowed) option set.
    pub fn options_for(&self, level: SelectionLevel, form: &CompletionForm) -> LevelOptions {
        let candidates = self.candidates(level, form);
        let current_value = level.get(form);
        let current = (!current_value.is_empty()).then(|| Selection {
            chosen: current_value.to_string(),
            valid_in_catalog: candidates.iter().any(|c| c == current_value),
        });

        if let Some(selection) = current.as_ref().filter(|s| s.is_stale()) {
            tracing::debug!(
                level = %level,
                value = %selection.chosen,
                "Current value not offered by catalog, keeping as stale selection"
            );
        }

        LevelOptions {
            level,
            candidates,
            current,
        }
    }

    /// Set a level and clear its dependents
    pub fn on_select(&self, level: SelectionLevel, value: &str, form: &mut CompletionForm) {
        on_select(level, value, form);
    }

    fn candidates(&self, level: SelectionLevel, form: &CompletionForm) -> Vec<String> {
        let c = self.catalogs;
        match level {
            SelectionLevel::Region => c.regions.iter().map(|r| r.name.clone()).collect(),
            SelectionLevel::City => match self.region(form) {
                Some(region) => c
                    .cities
                    .iter()
                    .filter(|city| city.region_id == region.id)
                    .map(|city| city.name.clone())
                    .collect(),
                None => Vec::new(),
            },
            SelectionLevel::Barangay => match self.city(form) {
                Some(city) => c
                    .barangays
                    .iter()
                    .filter(|b| b.city_id == city.id)
                    .map(|b| b.name.clone())
                    .collect(),
                None => Vec::new(),
            },
            SelectionLevel::Location => match self.barangay(form) {
                Some(barangay) => c
                    .locations
                    .iter()
                    .filter(|l| l.barangay_id == barangay.id)
                    .map(|l| l.name.clone())
                    .collect(),
                None => Vec::new(),
            },
            SelectionLevel::Lcp => c.lcps.iter().map(|l| l.name.clone()).collect(),
            SelectionLevel::Nap => c.naps.iter().map(|n| n.name.clone()).collect(),
            SelectionLevel::Port => match composite_key(&form.lcp, &form.nap) {
                Some(key) => c
                    .ports
                    .iter()
                    .filter(|p| p.lcpnap == key)
                    .filter(|p| match p.occupied_by.as_deref() {
                        None => true,
                        Some(job) => job == form.job_id,
                    })
                    .map(|p| p.port.clone())
                    .collect(),
                None => Vec::new(),
            },
        }
    }

    fn region(&self, form: &CompletionForm) -> Option<&'a RegionRecord> {
        if form.region.is_empty() {
            return None;
        }
        self.catalogs.regions.iter().find(|r| r.name == form.region)
    }

    fn city(&self, form: &CompletionForm) -> Option<&'a CityRecord> {
        let region = self.region(form)?;
        if form.city.is_empty() {
            return None;
        }
        self.catalogs
            .cities
            .iter()
            .find(|c| c.region_id == region.id && c.name == form.city)
    }

    fn barangay(&self, form: &CompletionForm) -> Option<&'a BarangayRecord> {
        let city = self.city(form)?;
        if form.barangay.is_empty() {
            return None;
        }
        self.catalogs
            .barangays
            .iter()
            .find(|b| b.city_id == city.id && b.name == form.barangay)
    }
}
