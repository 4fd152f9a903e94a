//! Services for fieldops-install

pub mod completion_orchestrator;
pub mod credential_issuer;
pub mod form_session;
pub mod form_validator;
pub mod ledger_reconciler;
pub mod media_normalizer;
pub mod preview_registry;

pub use completion_orchestrator::{folder_name, CompletionOrchestrator, SubmitError};
pub use credential_issuer::{CredentialError, CredentialIssuer};
pub use form_session::FormSession;
pub use form_validator::{validate, FieldError, ValidationError};
pub use ledger_reconciler::{apply, reconcile, ApplyOutcome, LedgerUpdate, ReconcilePlan};
pub use media_normalizer::{normalize, MediaError, MediaNormalizer, SizePolicy};
pub use preview_registry::{PreviewHandle, PreviewRegistry};
