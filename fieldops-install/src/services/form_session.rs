//! Editing session for one completion form
//!
//! Owns the form while it is being edited: captured images go through the
//! normalizer and get a preview handle, dependent selections clear their
//! children. Closing the session releases every preview and hands back the
//! form for submission.

use super::media_normalizer::{MediaError, MediaNormalizer};
use super::preview_registry::{PreviewHandle, PreviewRegistry};
use crate::models::{CapturedImage, CompletionForm, MediaAsset, MediaKind};
use crate::resolver::{self, SelectionLevel};
use std::path::PathBuf;

pub struct FormSession {
    form: CompletionForm,
    normalizer: MediaNormalizer,
    previews: PreviewRegistry,
}

impl FormSession {
    /// Start editing `form`, registering previews for media it already carries
    pub fn open(
        form: CompletionForm,
        normalizer: MediaNormalizer,
        preview_dir: impl Into<PathBuf>,
    ) -> Result<Self, MediaError> {
        let mut previews = PreviewRegistry::new(preview_dir)?;
        for (kind, asset) in &form.media {
            previews.accept(*kind, asset)?;
        }

        tracing::debug!(
            job_id = %form.job_id,
            media = form.media.len(),
            "Form session opened"
        );

        Ok(Self {
            form,
            normalizer,
            previews,
        })
    }

    pub fn form(&self) -> &CompletionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CompletionForm {
        &mut self.form
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    /// Normalize a fresh capture and store it as the pending asset for `kind`
    pub fn attach_media(
        &mut self,
        kind: MediaKind,
        raw: CapturedImage,
    ) -> Result<PreviewHandle, MediaError> {
        let asset = self.normalizer.to_asset(raw);
        let handle = self.previews.accept(kind, &asset)?;
        self.form.media.insert(kind, asset);
        Ok(handle)
    }

    /// Record an already uploaded asset for `kind`
    pub fn attach_persisted(
        &mut self,
        kind: MediaKind,
        url: impl Into<String>,
    ) -> Result<PreviewHandle, MediaError> {
        let asset = MediaAsset::Persisted { url: url.into() };
        let handle = self.previews.accept(kind, &asset)?;
        self.form.media.insert(kind, asset);
        Ok(handle)
    }

    /// Clear the slot for `kind`
    pub fn detach_media(&mut self, kind: MediaKind) -> Option<MediaAsset> {
        self.previews.release(kind);
        self.form.media.remove(&kind)
    }

    /// Set a dependent field and blank its children
    pub fn select(&mut self, level: SelectionLevel, value: &str) {
        resolver::on_select(level, value, &mut self.form);
    }

    /// Release every preview and return the edited form
    pub fn close(self) -> CompletionForm {
        let FormSession {
            form, mut previews, ..
        } = self;
        previews.close();
        form
    }
}
