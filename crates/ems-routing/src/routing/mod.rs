//! Emergency routing engine: static procedure catalog, registry
//! snapshot model, capability resolution, effective bed capacity, and
//! coverage-weighted candidate ranking.

pub mod capacity;
pub mod catalog;
pub mod complaint;
pub mod gateway;
pub mod ledger;
pub mod ranking;
pub mod resolver;
pub mod service;
pub mod snapshot;

pub use capacity::{group_capacity, union_capacity, GroupCapacity, UnionCapacity};
pub use catalog::{BedType, CatalogError, ProcedureCatalog, ProcedureGroup, ProcedureGroupSpec};
pub use complaint::{complaints_supported_by, Complaint, TriageSeverity};
pub use gateway::{DistanceEstimate, DistanceProvider, GatewayError, RegionQuery, RegistryGateway};
pub use ledger::BedLedger;
pub use ranking::{coverage, CoverageLevel, RankingPolicy};
pub use resolver::{
    resolve_capability, CapabilityAvailability, CapabilityStatus, FlagSource, Provenance,
};
pub use service::{
    GroupBedReport, HospitalRouter, ReservationReceipt, RoutingCandidate, RoutingCase,
    RoutingResponse, TriageError, TriageRequest,
};
pub use snapshot::{
    GeoPoint, HospitalCapacitySnapshot, HospitalId, MessageCategory, OverrideMessage,
};

#[cfg(test)]
mod tests;
