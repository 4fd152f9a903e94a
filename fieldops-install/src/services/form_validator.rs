//! Required-field validation for the completion form
//!
//! The required set depends on `status` and, for Confirmed jobs, on
//! `onsite_status`:
//!
//! | status / onsite status | required                                          |
//! |------------------------|---------------------------------------------------|
//! | Pending                | status only                                       |
//! | Cancelled              | status remarks                                    |
//! | Confirmed / Done       | installation band, required media, ≥ 1 item       |
//! | Confirmed / Reschedule | visit attribution, onsite + status remarks        |
//! | Confirmed / Failed     | visit attribution                                 |
//! | Confirmed / In Progress| a final onsite status                             |

use crate::models::{CompletionForm, JobStatus, MediaKind, OnsiteStatus};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// `visit_with` value that requires a free-text companion name
pub const VISIT_WITH_OTHERS: &str = "Others";

/// Message used when a Done completion has no items
pub const ITEMS_REQUIRED: &str = "At least one item is required";

/// Photos and signatures a Done completion must carry
pub const REQUIRED_MEDIA: [MediaKind; 9] = MediaKind::ALL;

/// One failed rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every rule the form failed, in field order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} field(s) invalid: {}", .errors.len(), summarize(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

struct Rules<'f> {
    form: &'f CompletionForm,
    errors: Vec<FieldError>,
}

impl<'f> Rules<'f> {
    fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.errors
                .push(FieldError::new(field, format!("{} is required", humanize(field))));
        }
    }

    fn visit_attribution(&mut self) {
        self.require("visit_by", &self.form.visit_by);
        self.require("visit_with", &self.form.visit_with);
        if self.form.visit_with.trim() == VISIT_WITH_OTHERS {
            self.require("visit_with_other", &self.form.visit_with_other);
        }
    }

    fn installation(&mut self) {
        let form = self.form;
        self.require("connection_type", &form.connection_type);
        self.require("router_model", &form.router_model);
        self.require("modem_sn", &form.modem_sn);
        self.require("region", &form.region);
        self.require("city", &form.city);
        self.require("barangay", &form.barangay);
        self.require("location", &form.location);
        self.require("lcp", &form.lcp);
        self.require("nap", &form.nap);
        self.require("port", &form.port);
        self.require("vlan", &form.vlan);

        if form.coordinates.trim().is_empty() {
            self.require("coordinates", &form.coordinates);
        } else if parse_coordinates(&form.coordinates).is_none() {
            self.errors.push(FieldError::new(
                "coordinates",
                "Coordinates must be \"latitude,longitude\" within range",
            ));
        }
    }

    fn media(&mut self) {
        for kind in REQUIRED_MEDIA {
            if !self.form.media.contains_key(&kind) {
                self.errors.push(FieldError::new(
                    format!("media.{}", kind.key()),
                    format!("{} image is required", kind.label()),
                ));
            }
        }
    }

    fn items(&mut self) {
        let items = &self.form.items;
        if items.is_empty() {
            self.errors.push(FieldError::new("items", ITEMS_REQUIRED));
            return;
        }

        let mut seen = HashSet::new();
        for (index, item) in items.iter().enumerate() {
            let field = format!("items[{}]", index);
            let identity = item.identity.trim();
            if identity.is_empty() {
                self.errors
                    .push(FieldError::new(&field, "Item name is required"));
            } else if !seen.insert(identity.to_string()) {
                self.errors.push(FieldError::new(
                    &field,
                    format!("{} is listed more than once", identity),
                ));
            }
            if item.quantity == 0 {
                self.errors
                    .push(FieldError::new(&field, "Quantity must be at least 1"));
            }
        }
    }
}

fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parse `"lat,lng"` into a pair within valid ranges
pub fn parse_coordinates(value: &str) -> Option<(f64, f64)> {
    let (lat, lng) = value.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lng: f64 = lng.trim().parse().ok()?;
    let in_range = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng);
    in_range.then_some((lat, lng))
}

/// Check the form against the status-conditioned required-field set
pub fn validate(form: &CompletionForm) -> Result<(), ValidationError> {
    let mut rules = Rules {
        form,
        errors: Vec::new(),
    };

    match form.status {
        None => rules.errors.push(FieldError::new("status", "Status is required")),
        Some(JobStatus::Pending) => {}
        Some(JobStatus::Cancelled) => rules.require("status_remarks", &form.status_remarks),
        Some(JobStatus::Confirmed) => match form.onsite_status {
            None | Some(OnsiteStatus::InProgress) => rules.errors.push(FieldError::new(
                "onsite_status",
                "Onsite status must be Done, Reschedule or Failed",
            )),
            Some(OnsiteStatus::Done) => {
                rules.visit_attribution();
                rules.installation();
                rules.media();
                rules.items();
            }
            Some(OnsiteStatus::Reschedule) => {
                rules.visit_attribution();
                rules.require("onsite_remarks", &form.onsite_remarks);
                rules.require("status_remarks", &form.status_remarks);
            }
            Some(OnsiteStatus::Failed) => rules.visit_attribution(),
        },
    }

    if rules.errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError {
            errors: rules.errors,
        })
    }
}
