//! Captured and persisted media

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Photo or signature slot on the completion form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    SignedContract,
    Setup,
    BoxReading,
    RouterReading,
    PortLabel,
    Speedtest,
    HouseFront,
    ClientSignature,
    TechSignature,
}

impl MediaKind {
    pub const ALL: [MediaKind; 9] = [
        MediaKind::SignedContract,
        MediaKind::Setup,
        MediaKind::BoxReading,
        MediaKind::RouterReading,
        MediaKind::PortLabel,
        MediaKind::Speedtest,
        MediaKind::HouseFront,
        MediaKind::ClientSignature,
        MediaKind::TechSignature,
    ];

    /// Multipart field name and upload response key
    pub fn key(self) -> &'static str {
        match self {
            MediaKind::SignedContract => "signed_contract",
            MediaKind::Setup => "setup",
            MediaKind::BoxReading => "box_reading",
            MediaKind::RouterReading => "router_reading",
            MediaKind::PortLabel => "port_label",
            MediaKind::Speedtest => "speedtest",
            MediaKind::HouseFront => "house_front",
            MediaKind::ClientSignature => "client_signature",
            MediaKind::TechSignature => "tech_signature",
        }
    }

    /// Job record column holding the persisted URL
    pub fn url_field(self) -> String {
        format!("{}_image_url", self.key())
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::SignedContract => "Signed contract",
            MediaKind::Setup => "Setup",
            MediaKind::BoxReading => "Box reading",
            MediaKind::RouterReading => "Router reading",
            MediaKind::PortLabel => "Port label",
            MediaKind::Speedtest => "Speedtest",
            MediaKind::HouseFront => "House front",
            MediaKind::ClientSignature => "Client signature",
            MediaKind::TechSignature => "Technician signature",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.key() == key)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(|k| k.key()).collect();
            format!("unknown media kind '{}' (expected one of: {})", s, known.join(", "))
        })
    }
}

/// Freshly captured image bytes awaiting upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedImage {
    pub file_name: String,
    pub content_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl CapturedImage {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Content type guessed from a file extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// A media slot's value: either pending upload or already persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum MediaAsset {
    /// Captured locally, not yet uploaded
    Pending(CapturedImage),
    /// Uploaded earlier; no local ownership
    Persisted { url: String },
}

impl MediaAsset {
    pub fn is_pending(&self) -> bool {
        matches!(self, MediaAsset::Pending(_))
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            MediaAsset::Persisted { url } => Some(url),
            MediaAsset::Pending(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trips_for_every_kind() {
        for kind in MediaKind::ALL {
            assert_eq!(MediaKind::from_key(kind.key()), Some(kind));
            assert_eq!(kind.key().parse::<MediaKind>(), Ok(kind));
        }
        assert!("selfie".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_key_matches_serde_name() {
        for kind in MediaKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.key()));
        }
    }

    #[test]
    fn test_url_field() {
        assert_eq!(MediaKind::BoxReading.url_field(), "box_reading_image_url");
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("photo.png"), "image/png");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn test_persisted_asset_json() {
        let asset: MediaAsset =
            serde_json::from_str(r#"{"source":"persisted","url":"https://cdn/x.jpg"}"#).unwrap();
        assert_eq!(asset.url(), Some("https://cdn/x.jpg"));
        assert!(!asset.is_pending());
    }
}
