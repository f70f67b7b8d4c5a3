use serde::{Deserialize, Serialize};

use super::snapshot::{GeoPoint, HospitalCapacitySnapshot, HospitalId};

/// Administrative region the registry is queried for. A missing district
/// means the whole province.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionQuery {
    pub province: String,
    #[serde(default)]
    pub district: Option<String>,
}

/// Upstream registry boundary. Implementations own all transport and
/// parsing concerns (HTTP, XML, rate limits); the core only sees
/// already-parsed snapshots.
pub trait RegistryGateway: Send + Sync {
    fn region_snapshots(
        &self,
        query: &RegionQuery,
    ) -> Result<Vec<HospitalCapacitySnapshot>, GatewayError>;
}

/// Failures at the registry or geo boundary. Input validation never
/// lands here; these are strictly upstream problems.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("registry unavailable: {0}")]
    Unavailable(String),
    #[error("registry returned malformed data: {0}")]
    Malformed(String),
}

/// Distance/travel-time estimate for one hospital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceEstimate {
    pub hospital: HospitalId,
    pub distance_km: f64,
    pub duration_secs: u32,
}

/// External geo service boundary: given an origin and candidate
/// hospital positions, return per-hospital estimates. The core never
/// computes geography itself.
pub trait DistanceProvider: Send + Sync {
    fn estimates(
        &self,
        origin: GeoPoint,
        hospitals: &[(HospitalId, GeoPoint)],
    ) -> Result<Vec<DistanceEstimate>, GatewayError>;
}
