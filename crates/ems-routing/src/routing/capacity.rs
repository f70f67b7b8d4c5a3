use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::catalog::{BedType, ProcedureCatalog, ProcedureGroup, ProcedureGroupSpec};
use super::ledger::BedLedger;
use super::resolver::CapabilityStatus;
use super::snapshot::HospitalCapacitySnapshot;

/// Point-in-time bed counts for one procedure group at one hospital.
/// `reported` is what the registry claims; `effective` subtracts our
/// pending reservations and floors at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCapacity {
    pub reported: u32,
    pub effective: u32,
}

impl GroupCapacity {
    pub const ZERO: GroupCapacity = GroupCapacity {
        reported: 0,
        effective: 0,
    };
}

/// Complaint-level capacity across several groups, with shared bed types
/// counted once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionCapacity {
    pub reported: u32,
    pub effective: u32,
    pub bed_types: Vec<BedType>,
}

impl UnionCapacity {
    pub fn empty() -> Self {
        Self {
            reported: 0,
            effective: 0,
            bed_types: Vec::new(),
        }
    }
}

/// A group is bottlenecked by its scarcest required bed type: the
/// reported figure is the minimum across the required set, and pending
/// reservations on any of those types count against it.
///
/// A group whose capability status is not `Available` has zero capacity
/// regardless of raw counts.
pub fn group_capacity(
    snapshot: &HospitalCapacitySnapshot,
    spec: &ProcedureGroupSpec,
    status: CapabilityStatus,
    ledger: &BedLedger,
) -> GroupCapacity {
    if status != CapabilityStatus::Available {
        return GroupCapacity::ZERO;
    }

    let bed_types: BTreeSet<BedType> = spec.bed_types.iter().copied().collect();
    let reported = bed_types
        .iter()
        .map(|bed_type| snapshot.reported_beds(*bed_type))
        .min()
        .unwrap_or(0);
    if reported == 0 {
        return GroupCapacity::ZERO;
    }

    let pending = ledger.pending_sum(&snapshot.id, bed_types.iter().copied());
    GroupCapacity {
        reported,
        effective: reported.saturating_sub(pending),
    }
}

/// Complaint-level total over several groups. Naively summing per-group
/// figures double-counts bed types shared between groups, so this builds
/// the union of required types, sums each type's reported count once,
/// and subtracts the union's pending reservations once.
pub fn union_capacity(
    snapshot: &HospitalCapacitySnapshot,
    catalog: &ProcedureCatalog,
    groups: &[ProcedureGroup],
    ledger: &BedLedger,
) -> UnionCapacity {
    let mut bed_types: BTreeSet<BedType> = BTreeSet::new();
    for group in groups {
        bed_types.extend(catalog.bed_types_for(*group).iter().copied());
    }
    if bed_types.is_empty() {
        return UnionCapacity::empty();
    }

    let reported = bed_types
        .iter()
        .map(|bed_type| snapshot.reported_beds(*bed_type))
        .fold(0u32, u32::saturating_add);
    if reported == 0 {
        return UnionCapacity {
            reported: 0,
            effective: 0,
            bed_types: bed_types.into_iter().collect(),
        };
    }

    let pending = ledger.pending_sum(&snapshot.id, bed_types.iter().copied());
    UnionCapacity {
        reported,
        effective: reported.saturating_sub(pending),
        bed_types: bed_types.into_iter().collect(),
    }
}
