//! Form and catalog fixtures

use fieldops_install::models::{
    CapturedImage, CompletionForm, JobRecord, JobStatus, LedgerItem, MediaAsset, MediaKind,
    OnsiteStatus,
};
use fieldops_install::resolver::{
    BarangayRecord, Catalogs, CityRecord, LcpRecord, LocationRecord, NapRecord, PortRecord,
    RegionRecord,
};

pub fn pending_image(kind: MediaKind) -> CapturedImage {
    CapturedImage::new(
        format!("{}.jpg", kind.key()),
        "image/jpeg",
        kind.key().as_bytes().to_vec(),
    )
}

/// A Confirmed + Done form that passes validation, every image pending
pub fn done_form(job_id: &str) -> CompletionForm {
    let mut form = CompletionForm {
        job_id: job_id.to_string(),
        first_name: "Juan".into(),
        middle_name: "Santos".into(),
        last_name: "Dela Cruz".into(),
        mobile_number: "09171234567".into(),
        email: "juan@example.com".into(),
        install_address: "12 Mabini St".into(),
        landmark: "Near chapel".into(),
        plan: "Fiber 50".into(),
        status: Some(JobStatus::Confirmed),
        onsite_status: Some(OnsiteStatus::Done),
        visit_by: "Tech A".into(),
        visit_with: "Tech B".into(),
        connection_type: "Fiber".into(),
        router_model: "HG8145V5".into(),
        modem_sn: "48575443ABCDEF01".into(),
        region: "NCR".into(),
        city: "Quezon City".into(),
        barangay: "Bagumbayan".into(),
        location: "Purok 1".into(),
        lcp: "LCP01".into(),
        nap: "NAP03".into(),
        port: "P1".into(),
        vlan: "100".into(),
        coordinates: "14.6091,121.0223".into(),
        items: vec![LedgerItem::new("Drop wire", 1), LedgerItem::new("F-clamp", 2)],
        ..Default::default()
    };
    for kind in MediaKind::ALL {
        form.media
            .insert(kind, MediaAsset::Pending(pending_image(kind)));
    }
    form
}

/// Job record as the back office holds it before completion
pub fn job_record(job_id: &str) -> JobRecord {
    JobRecord {
        id: job_id.to_string(),
        application_id: None,
        first_name: "Juan".into(),
        middle_name: "Santos".into(),
        last_name: "Dela Cruz".into(),
        plan: "Fiber 50".into(),
        username: None,
        password: None,
    }
}

pub fn catalogs() -> Catalogs {
    Catalogs {
        regions: vec![
            RegionRecord { id: 1, name: "NCR".into() },
            RegionRecord { id: 2, name: "CALABARZON".into() },
        ],
        cities: vec![
            CityRecord { id: 10, region_id: 1, name: "Quezon City".into() },
            CityRecord { id: 11, region_id: 1, name: "Makati".into() },
            CityRecord { id: 20, region_id: 2, name: "Antipolo".into() },
        ],
        barangays: vec![
            BarangayRecord { id: 100, city_id: 10, name: "Bagumbayan".into() },
            BarangayRecord { id: 101, city_id: 10, name: "Libis".into() },
            BarangayRecord { id: 110, city_id: 11, name: "Poblacion".into() },
            BarangayRecord { id: 200, city_id: 20, name: "Dela Paz".into() },
        ],
        locations: vec![
            LocationRecord { id: 1000, barangay_id: 100, name: "Purok 1".into() },
            LocationRecord { id: 1001, barangay_id: 100, name: "Purok 2".into() },
            LocationRecord { id: 1010, barangay_id: 101, name: "Eastwood".into() },
        ],
        lcps: vec![
            LcpRecord { id: 1, name: "LCP01".into() },
            LcpRecord { id: 2, name: "LCP02".into() },
        ],
        naps: vec![
            NapRecord { id: 1, name: "NAP03".into() },
            NapRecord { id: 2, name: "NAP04".into() },
        ],
        ports: vec![
            PortRecord { lcpnap: "LCP01-NAP03".into(), port: "P1".into(), occupied_by: None },
            PortRecord { lcpnap: "LCP01-NAP03".into(), port: "P2".into(), occupied_by: None },
            PortRecord {
                lcpnap: "LCP01-NAP03".into(),
                port: "P3".into(),
                occupied_by: Some("JO-OTHER".into()),
            },
            PortRecord { lcpnap: "LCP02-NAP04".into(), port: "P1".into(), occupied_by: None },
        ],
    }
}
