//! Reference catalogs
//!
//! Flat lists loaded from the back-office lookup endpoints. Every child
//! record carries its parent's id; the resolver never mutates them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRecord {
    pub id: i64,
    pub region_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarangayRecord {
    pub id: i64,
    pub city_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: i64,
    pub barangay_id: i64,
    pub name: String,
}

/// Fiber distribution point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcpRecord {
    pub id: i64,
    pub name: String,
}

/// Network access point (terminal box)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NapRecord {
    pub id: i64,
    pub name: String,
}

/// Physical port scoped to an LCP-NAP pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRecord {
    /// Composite topology key, `"{lcp}-{nap}"`
    pub lcpnap: String,
    pub port: String,
    /// Job currently holding the port
    #[serde(default)]
    pub occupied_by: Option<String>,
}

/// Every catalog the resolver filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalogs {
    pub regions: Vec<RegionRecord>,
    pub cities: Vec<CityRecord>,
    pub barangays: Vec<BarangayRecord>,
    pub locations: Vec<LocationRecord>,
    pub lcps: Vec<LcpRecord>,
    pub naps: Vec<NapRecord>,
    pub ports: Vec<PortRecord>,
}

impl Catalogs {
    /// Parse catalogs from a JSON document
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
