use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use super::catalog::BedType;
use super::snapshot::HospitalId;

/// Process-wide counters for patients already assigned to a hospital bed
/// type but not yet visible in the upstream registry feed. The one piece
/// of long-lived mutable state in the engine.
///
/// Every operation takes the lock once, so concurrent reserve/release
/// calls for the same key serialize here and a read-modify-write can
/// never interleave. Reservations are not bounds-checked against
/// reported capacity; overcommit is possible and effective counts floor
/// at zero downstream.
#[derive(Debug, Default)]
pub struct BedLedger {
    pending: Mutex<HashMap<(HospitalId, BedType), u32>>,
}

impl BedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` patients to the pending counter for the key.
    /// Saturating; always succeeds.
    pub fn reserve(&self, hospital: &HospitalId, bed_type: BedType, count: u32) {
        let mut pending = self.pending.lock().expect("ledger mutex poisoned");
        let entry = pending.entry((hospital.clone(), bed_type)).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    /// Removes up to `count` patients from the pending counter, floored
    /// at zero. Excess releases are silently clamped, not errors.
    pub fn release(&self, hospital: &HospitalId, bed_type: BedType, count: u32) {
        let mut pending = self.pending.lock().expect("ledger mutex poisoned");
        if let Some(entry) = pending.get_mut(&(hospital.clone(), bed_type)) {
            *entry = entry.saturating_sub(count);
            if *entry == 0 {
                pending.remove(&(hospital.clone(), bed_type));
            }
        }
    }

    /// Current pending count for a key; zero for unseen keys.
    pub fn pending_for(&self, hospital: &HospitalId, bed_type: BedType) -> u32 {
        let pending = self.pending.lock().expect("ledger mutex poisoned");
        pending
            .get(&(hospital.clone(), bed_type))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of pending counts across a set of bed types, read under a
    /// single lock acquisition so aggregation sees one consistent state.
    pub fn pending_sum<I>(&self, hospital: &HospitalId, bed_types: I) -> u32
    where
        I: IntoIterator<Item = BedType>,
    {
        let pending = self.pending.lock().expect("ledger mutex poisoned");
        bed_types
            .into_iter()
            .map(|bed_type| {
                pending
                    .get(&(hospital.clone(), bed_type))
                    .copied()
                    .unwrap_or(0)
            })
            .sum()
    }

    /// All non-zero pending counters for one hospital, for receipts and
    /// debug output.
    pub fn pending_by_type(&self, hospital: &HospitalId) -> BTreeMap<BedType, u32> {
        let pending = self.pending.lock().expect("ledger mutex poisoned");
        pending
            .iter()
            .filter(|((id, _), count)| id == hospital && **count > 0)
            .map(|((_, bed_type), count)| (*bed_type, *count))
            .collect()
    }
}
