//! Request and response bodies exchanged with the back-office API

use crate::models::form::{CompletionForm, JobStatus, OnsiteStatus};
use crate::models::media::MediaKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted job order, as returned by `GET job/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRecord {
    pub id: String,
    pub application_id: Option<String>,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub plan: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl JobRecord {
    /// Both credential fields populated
    pub fn credential(&self) -> Option<Credential> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password))
                if !username.trim().is_empty() && !password.trim().is_empty() =>
            {
                Some(Credential {
                    username: username.to_string(),
                    password: password.to_string(),
                })
            }
            _ => None,
        }
    }
}

/// Network access credential tied to one completed job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// Result of `CredentialIssuer::ensure_credential`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredCredential {
    pub credential: Credential,
    /// The credential was already on record (nothing was issued)
    pub existed: bool,
}

/// Body of `POST job/{id}/credentials`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialRequest {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub plan: String,
}

impl From<&JobRecord> for CredentialRequest {
    fn from(job: &JobRecord) -> Self {
        Self {
            first_name: job.first_name.clone(),
            middle_name: job.middle_name.clone(),
            last_name: job.last_name.clone(),
            plan: job.plan.clone(),
        }
    }
}

/// Response of `POST job/{id}/credentials`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedCredential {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub credentials_exist: bool,
}

/// Installation band of a job update; only sent when completing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstallationFields {
    pub connection_type: String,
    pub router_model: String,
    pub modem_sn: String,
    pub region: String,
    pub city: String,
    pub barangay: String,
    pub location: String,
    pub lcp: String,
    pub nap: String,
    pub port: String,
    /// `"{lcp}-{nap}"`
    pub lcpnap: String,
    pub vlan: String,
    pub coordinates: String,
    pub ip_address: String,
}

/// Body of `PUT job/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobUpdate {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub email: String,
    pub install_address: String,
    pub landmark: String,
    pub plan: String,
    pub status: Option<JobStatus>,
    pub onsite_status: Option<OnsiteStatus>,
    pub visit_by: String,
    pub visit_with: String,
    pub visit_with_other: String,
    pub onsite_remarks: String,
    pub status_remarks: String,
    #[serde(flatten)]
    pub installation: Option<InstallationFields>,
    /// `<kind>_image_url` → URL
    #[serde(flatten)]
    pub media_urls: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl JobUpdate {
    /// Collect every field the job record owns
    ///
    /// `form` must already have orphaned selections stripped.
    pub fn from_form(
        form: &CompletionForm,
        media_urls: &BTreeMap<MediaKind, String>,
        credential: Option<&Credential>,
    ) -> Self {
        let installation = form.is_completing().then(|| InstallationFields {
            connection_type: form.connection_type.clone(),
            router_model: form.router_model.clone(),
            modem_sn: form.modem_sn.clone(),
            region: form.region.clone(),
            city: form.city.clone(),
            barangay: form.barangay.clone(),
            location: form.location.clone(),
            lcp: form.lcp.clone(),
            nap: form.nap.clone(),
            port: form.port.clone(),
            lcpnap: crate::resolver::composite_key(&form.lcp, &form.nap).unwrap_or_default(),
            vlan: form.vlan.clone(),
            coordinates: form.coordinates.clone(),
            ip_address: form.ip_address.clone(),
        });

        Self {
            first_name: form.first_name.clone(),
            middle_name: form.middle_name.clone(),
            last_name: form.last_name.clone(),
            mobile_number: form.mobile_number.clone(),
            email: form.email.clone(),
            install_address: form.install_address.clone(),
            landmark: form.landmark.clone(),
            plan: form.plan.clone(),
            status: form.status,
            onsite_status: form.onsite_status,
            visit_by: form.visit_by.clone(),
            visit_with: form.visit_with.clone(),
            visit_with_other: form.visit_with_other.clone(),
            onsite_remarks: form.onsite_remarks.clone(),
            status_remarks: form.status_remarks.clone(),
            installation,
            media_urls: media_urls
                .iter()
                .map(|(kind, url)| (kind.url_field(), url.clone()))
                .collect(),
            username: credential.map(|c| c.username.clone()),
            password: credential.map(|c| c.password.clone()),
        }
    }
}

/// Body of `PUT application/{id}`: the subset the application owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationUpdate {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub email: String,
    pub install_address: String,
    pub landmark: String,
    pub region: String,
    pub city: String,
    pub barangay: String,
    pub location: String,
    pub desired_plan: String,
}

impl From<&CompletionForm> for ApplicationUpdate {
    fn from(form: &CompletionForm) -> Self {
        Self {
            first_name: form.first_name.clone(),
            middle_name: form.middle_name.clone(),
            last_name: form.last_name.clone(),
            mobile_number: form.mobile_number.clone(),
            email: form.email.clone(),
            install_address: form.install_address.clone(),
            landmark: form.landmark.clone(),
            region: form.region.clone(),
            city: form.city.clone(),
            barangay: form.barangay.clone(),
            location: form.location.clone(),
            desired_plan: form.plan.clone(),
        }
    }
}

/// Item ledger row, as returned by `GET item-ledger?job={id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedLedgerItem {
    pub id: i64,
    pub job_id: String,
    pub item_name: String,
    pub quantity: u32,
}

/// One element of the `POST item-ledger` batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLedgerItem {
    pub job_id: String,
    pub item_name: String,
    pub quantity: u32,
}

/// Body of `PUT item-ledger/{row}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerItemPatch {
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completing_form() -> CompletionForm {
        CompletionForm {
            job_id: "JO-1".to_string(),
            first_name: "Ana".to_string(),
            status: Some(JobStatus::Confirmed),
            onsite_status: Some(OnsiteStatus::Done),
            lcp: "LCP01".to_string(),
            nap: "NAP03".to_string(),
            port: "P2".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_job_record_credential_requires_both_fields() {
        let mut job = JobRecord::default();
        assert!(job.credential().is_none());

        job.username = Some("ana01".to_string());
        assert!(job.credential().is_none());

        job.password = Some(" ".to_string());
        assert!(job.credential().is_none());

        job.password = Some("s3cret".to_string());
        assert_eq!(
            job.credential(),
            Some(Credential {
                username: "ana01".to_string(),
                password: "s3cret".to_string()
            })
        );
    }

    #[test]
    fn test_job_update_flattens_installation_and_media() {
        let mut urls = BTreeMap::new();
        urls.insert(MediaKind::Setup, "https://cdn/setup.jpg".to_string());
        let credential = Credential {
            username: "ana01".to_string(),
            password: "pw".to_string(),
        };

        let update = JobUpdate::from_form(&completing_form(), &urls, Some(&credential));
        let json = serde_json::to_value(&update).unwrap();

        assert_eq!(json["lcpnap"], "LCP01-NAP03");
        assert_eq!(json["port"], "P2");
        assert_eq!(json["setup_image_url"], "https://cdn/setup.jpg");
        assert_eq!(json["username"], "ana01");
        assert_eq!(json["onsite_status"], "Done");
    }

    #[test]
    fn test_job_update_omits_installation_when_not_completing() {
        let mut form = completing_form();
        form.onsite_status = Some(OnsiteStatus::Reschedule);

        let update = JobUpdate::from_form(&form, &BTreeMap::new(), None);
        let json = serde_json::to_value(&update).unwrap();

        assert!(json.get("lcpnap").is_none());
        assert!(json.get("port").is_none());
        assert!(json.get("username").is_none());
        assert_eq!(json["first_name"], "Ana");
    }

    #[test]
    fn test_issued_credential_flag_defaults_false() {
        let issued: IssuedCredential =
            serde_json::from_str(r#"{"username":"u","password":"p"}"#).unwrap();
        assert!(!issued.credentials_exist);
    }
}
