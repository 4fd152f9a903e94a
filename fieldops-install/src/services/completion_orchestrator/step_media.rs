//! Step: MEDIA
//!
//! Persisted assets pass their URL through. Pending captures go up in one
//! batched call; a failed call or missing kinds are warnings only, and the
//! job record is saved without the URLs that did not come back.

use super::{folder_name, CompletionOrchestrator, SaveRun};
use crate::models::{CapturedImage, MediaAsset, MediaKind};
use fieldops_common::events::StepStatus;

impl CompletionOrchestrator {
    pub(super) async fn step_media(&self, run: &mut SaveRun) -> StepStatus {
        let mut uploads: Vec<(MediaKind, &CapturedImage)> = Vec::new();
        for (kind, asset) in &run.form.media {
            match asset {
                MediaAsset::Persisted { url } => {
                    run.media_urls.insert(*kind, url.clone());
                }
                MediaAsset::Pending(image) => uploads.push((*kind, image)),
            }
        }

        if uploads.is_empty() {
            tracing::debug!(job_id = %run.form.job_id, "No pending media to upload");
            return StepStatus::Completed;
        }

        let folder = folder_name(&run.form);
        tracing::info!(
            job_id = %run.form.job_id,
            folder = %folder,
            count = uploads.len(),
            "Uploading media"
        );

        let result = self
            .backend
            .upload_media(&run.form.job_id, &folder, &uploads)
            .await;

        match result {
            Ok(urls) => {
                let missing: Vec<&'static str> = uploads
                    .iter()
                    .filter(|(kind, _)| !urls.contains_key(kind))
                    .map(|(kind, _)| kind.label())
                    .collect();
                run.media_urls.extend(urls);

                if missing.is_empty() {
                    StepStatus::Completed
                } else {
                    tracing::warn!(job_id = %run.form.job_id, missing = ?missing, "Some media failed to upload");
                    run.report
                        .warning(format!("Failed to upload: {}", missing.join(", ")));
                    StepStatus::Warning
                }
            }
            Err(e) => {
                tracing::warn!(job_id = %run.form.job_id, error = %e, "Media upload failed");
                run.report.warning(format!("Failed to upload media: {}", e));
                StepStatus::Warning
            }
        }
    }
}
