use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use ems_routing::routing::{
    BedLedger, BedType, DistanceEstimate, DistanceProvider, GatewayError, GeoPoint,
    HospitalCapacitySnapshot, HospitalId, HospitalRouter, RegionQuery, RegistryGateway,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Registry gateway backed by an in-process snapshot store. Stands in
/// for the national registry feed in demos and tests; the snapshots can
/// be swapped wholesale to simulate a fresh poll.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRegistryGateway {
    snapshots: Arc<Mutex<Vec<HospitalCapacitySnapshot>>>,
}

impl InMemoryRegistryGateway {
    pub(crate) fn with_snapshots(snapshots: Vec<HospitalCapacitySnapshot>) -> Self {
        Self {
            snapshots: Arc::new(Mutex::new(snapshots)),
        }
    }

}

impl RegistryGateway for InMemoryRegistryGateway {
    fn region_snapshots(
        &self,
        query: &RegionQuery,
    ) -> Result<Vec<HospitalCapacitySnapshot>, GatewayError> {
        if query.province.trim().is_empty() {
            return Err(GatewayError::Malformed(
                "region query without a province".to_string(),
            ));
        }

        let guard = self.snapshots.lock().expect("gateway mutex poisoned");
        Ok(guard
            .iter()
            .filter(|snapshot| {
                let address = snapshot.address.as_deref().unwrap_or("");
                address.contains(query.province.trim())
                    && query
                        .district
                        .as_deref()
                        .map(str::trim)
                        .filter(|district| !district.is_empty())
                        .map_or(true, |district| address.contains(district))
            })
            .cloned()
            .collect())
    }
}

const EARTH_RADIUS_KM: f64 = 6371.0;
/// Assumed average ambulance speed for travel-time estimates.
const AMBULANCE_SPEED_KMH: f64 = 40.0;

/// Straight-line distance provider. A road-network service would slot in
/// behind the same trait; great-circle distance is good enough for the
/// bundled demo data.
#[derive(Default, Clone)]
pub(crate) struct HaversineDistances;

impl DistanceProvider for HaversineDistances {
    fn estimates(
        &self,
        origin: GeoPoint,
        hospitals: &[(HospitalId, GeoPoint)],
    ) -> Result<Vec<DistanceEstimate>, GatewayError> {
        Ok(hospitals
            .iter()
            .map(|(hospital, position)| {
                let distance_km = haversine_km(origin, *position);
                let duration_secs = (distance_km / AMBULANCE_SPEED_KMH * 3600.0).round() as u32;
                DistanceEstimate {
                    hospital: hospital.clone(),
                    distance_km,
                    duration_secs,
                }
            })
            .collect())
    }
}

fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Everything a request handler needs to answer triage calls.
pub(crate) struct TriageApi {
    pub(crate) router: HospitalRouter<InMemoryRegistryGateway>,
    pub(crate) distances: HaversineDistances,
    pub(crate) default_region: RegionQuery,
}

fn flag(snapshot: &mut HospitalCapacitySnapshot, key: &str, value: &str) {
    snapshot
        .serious_flags
        .insert(key.to_string(), value.to_string());
}

fn seed_hospital(
    id: &str,
    name: &str,
    address: &str,
    latitude: f64,
    longitude: f64,
) -> HospitalCapacitySnapshot {
    HospitalCapacitySnapshot {
        id: HospitalId::from(id),
        name: name.to_string(),
        address: Some(address.to_string()),
        phone: Some("02-000-0000".to_string()),
        emergency_phone: Some("02-000-0119".to_string()),
        location: Some(GeoPoint {
            latitude,
            longitude,
        }),
        has_emergency_department: true,
        trauma_center: false,
        beds: BTreeMap::new(),
        serious_flags: BTreeMap::new(),
        basic_flags: BTreeMap::new(),
        messages: Vec::new(),
    }
}

/// Demo snapshot set: three Seoul hospitals with differing capability
/// spreads, loosely modeled on regional emergency center profiles.
pub(crate) fn seed_snapshots() -> Vec<HospitalCapacitySnapshot> {
    let mut central = seed_hospital(
        "A1100001",
        "서울중앙병원",
        "서울특별시 종로구 대학로 101",
        37.5796,
        126.9990,
    );
    central.trauma_center = true;
    central.beds.insert(BedType::Er, 12);
    central.beds.insert(BedType::Or, 3);
    central.beds.insert(BedType::IcuGeneral, 6);
    central.beds.insert(BedType::IcuNeuro, 4);
    central.beds.insert(BedType::IcuNeurosurg, 2);
    for key in [
        "MKioskTy1", "MKioskTy2", "MKioskTy3", "MKioskTy4", "MKioskTy7", "MKioskTy8", "MKioskTy11",
        "MKioskTy13", "MKioskTy26",
    ] {
        flag(&mut central, key, "Y");
    }

    let mut riverside = seed_hospital(
        "A1100002",
        "한강성심병원",
        "서울특별시 영등포구 버드나루로 55",
        37.5390,
        126.9368,
    );
    riverside.beds.insert(BedType::Er, 8);
    riverside.beds.insert(BedType::IcuGeneral, 3);
    riverside.beds.insert(BedType::IcuBurn, 5);
    for key in ["MKioskTy1", "MKioskTy4", "MKioskTy19", "MKioskTy26"] {
        flag(&mut riverside, key, "Y");
    }
    flag(&mut riverside, "MKioskTy2", "N");

    let mut northern = seed_hospital(
        "A1100003",
        "북부의료원",
        "서울특별시 중랑구 신내로 156",
        37.6126,
        127.0985,
    );
    northern.beds.insert(BedType::Er, 5);
    northern.beds.insert(BedType::Ward, 20);
    northern.beds.insert(BedType::WardPsych, 4);
    for key in ["MKioskTy10", "MKioskTy11", "MKioskTy12", "MKioskTy22", "MKioskTy24"] {
        flag(&mut northern, key, "Y");
    }

    vec![central, riverside, northern]
}

pub(crate) fn demo_api(region: RegionQuery) -> Result<TriageApi, ems_routing::routing::CatalogError> {
    let gateway = Arc::new(InMemoryRegistryGateway::with_snapshots(seed_snapshots()));
    let router = HospitalRouter::new(gateway, Arc::new(BedLedger::new()))?;
    Ok(TriageApi {
        router,
        distances: HaversineDistances,
        default_region: region,
    })
}
