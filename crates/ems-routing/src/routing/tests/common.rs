use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::routing::catalog::BedType;
use crate::routing::gateway::{
    DistanceEstimate, DistanceProvider, GatewayError, RegionQuery, RegistryGateway,
};
use crate::routing::snapshot::{
    GeoPoint, HospitalCapacitySnapshot, HospitalId, MessageCategory, OverrideMessage,
};

/// Fixed reference instant for resolver and ranking tests.
pub(super) fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .expect("valid date")
        .and_hms_opt(12, 0, 0)
        .expect("valid time")
}

pub(super) fn hospital(id: &str, name: &str) -> HospitalCapacitySnapshot {
    HospitalCapacitySnapshot {
        id: HospitalId::from(id),
        name: name.to_string(),
        address: Some("서울특별시 종로구 1".to_string()),
        phone: Some("02-1234-5678".to_string()),
        emergency_phone: Some("02-1234-5600".to_string()),
        location: Some(GeoPoint {
            latitude: 37.5796,
            longitude: 126.9770,
        }),
        has_emergency_department: true,
        trauma_center: false,
        beds: BTreeMap::new(),
        serious_flags: BTreeMap::new(),
        basic_flags: BTreeMap::new(),
        messages: Vec::new(),
    }
}

pub(super) fn with_beds(
    mut snapshot: HospitalCapacitySnapshot,
    beds: &[(BedType, i32)],
) -> HospitalCapacitySnapshot {
    for (bed_type, count) in beds {
        snapshot.beds.insert(*bed_type, *count);
    }
    snapshot
}

pub(super) fn with_serious_flag(
    mut snapshot: HospitalCapacitySnapshot,
    key: &str,
    value: &str,
) -> HospitalCapacitySnapshot {
    snapshot.serious_flags.insert(key.to_string(), value.to_string());
    snapshot
}

pub(super) fn with_basic_flag(
    mut snapshot: HospitalCapacitySnapshot,
    key: &str,
    value: &str,
) -> HospitalCapacitySnapshot {
    snapshot.basic_flags.insert(key.to_string(), value.to_string());
    snapshot
}

pub(super) fn severe_message(
    type_code: &str,
    display_status: &str,
    block_start: Option<&str>,
    block_end: Option<&str>,
    body: &str,
) -> OverrideMessage {
    OverrideMessage {
        type_code: type_code.to_string(),
        category: MessageCategory::Severe,
        display_status: display_status.to_string(),
        block_start: block_start.map(str::to_string),
        block_end: block_end.map(str::to_string),
        body: body.to_string(),
    }
}

/// Gateway serving a fixed snapshot list regardless of region.
pub(super) struct StaticGateway {
    pub(super) snapshots: Vec<HospitalCapacitySnapshot>,
}

impl RegistryGateway for StaticGateway {
    fn region_snapshots(
        &self,
        _query: &RegionQuery,
    ) -> Result<Vec<HospitalCapacitySnapshot>, GatewayError> {
        Ok(self.snapshots.clone())
    }
}

/// Distance provider returning pre-canned per-hospital estimates.
pub(super) struct FixedDistances {
    pub(super) estimates: Vec<(HospitalId, f64, u32)>,
}

impl DistanceProvider for FixedDistances {
    fn estimates(
        &self,
        _origin: GeoPoint,
        hospitals: &[(HospitalId, GeoPoint)],
    ) -> Result<Vec<DistanceEstimate>, GatewayError> {
        Ok(self
            .estimates
            .iter()
            .filter(|(id, _, _)| hospitals.iter().any(|(candidate, _)| candidate == id))
            .map(|(id, distance_km, duration_secs)| DistanceEstimate {
                hospital: id.clone(),
                distance_km: *distance_km,
                duration_secs: *duration_secs,
            })
            .collect())
    }
}

pub(super) fn seoul() -> RegionQuery {
    RegionQuery {
        province: "서울특별시".to_string(),
        district: None,
    }
}
