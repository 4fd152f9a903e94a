//! # fieldops Common Library
//!
//! Shared code for the fieldops back-office tools including:
//! - Error type shared by every crate
//! - Configuration loading and resolution priority
//! - Event types (FieldOpsEvent enum) and the EventBus

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
