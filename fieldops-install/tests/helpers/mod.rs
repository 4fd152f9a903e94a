//! Test Helper Utilities
//!
//! Shared utilities for testing fieldops-install

#![allow(dead_code)]

pub mod fixtures;
pub mod image_generator;
pub mod mock_backend;

// Re-export commonly used items
pub use fixtures::{catalogs, done_form, job_record, pending_image};
pub use image_generator::generate_test_png;
pub use mock_backend::{Call, Failures, MockBackend};
