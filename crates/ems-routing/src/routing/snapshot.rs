use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::catalog::BedType;

/// Registry-issued facility code (e.g. `A1100010`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HospitalId(pub String);

impl HospitalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HospitalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HospitalId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Broad category the registry attaches to an override message. Only
/// `Severe` messages participate in capability blocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    Severe,
    Emergency,
    Other,
}

impl MessageCategory {
    /// Parses the registry's free-text category label.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "중증" => MessageCategory::Severe,
            "응급" => MessageCategory::Emergency,
            _ => MessageCategory::Other,
        }
    }
}

/// Time-scoped upstream note that can force a capability unavailable
/// independent of flag data. Timestamps arrive as raw strings and may be
/// unparseable; the resolver treats that conservatively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideMessage {
    pub type_code: String,
    pub category: MessageCategory,
    pub display_status: String,
    pub block_start: Option<String>,
    pub block_end: Option<String>,
    pub body: String,
}

/// One hospital's point-in-time state as supplied by the registry
/// gateway. Built fresh per request and never mutated afterwards.
///
/// Reported bed counts are kept as raw signed integers; out-of-range
/// values are floored at zero during aggregation, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalCapacitySnapshot {
    pub id: HospitalId,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub emergency_phone: Option<String>,
    pub location: Option<GeoPoint>,
    pub has_emergency_department: bool,
    pub trauma_center: bool,
    pub beds: BTreeMap<BedType, i32>,
    pub serious_flags: BTreeMap<String, String>,
    pub basic_flags: BTreeMap<String, String>,
    pub messages: Vec<OverrideMessage>,
}

impl HospitalCapacitySnapshot {
    /// Reported count for a bed type, floored at zero. Pools the
    /// registry did not report count as zero.
    pub fn reported_beds(&self, bed_type: BedType) -> u32 {
        self.beds
            .get(&bed_type)
            .copied()
            .map(|count| count.max(0) as u32)
            .unwrap_or(0)
    }
}
