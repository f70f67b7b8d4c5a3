use std::sync::Arc;
use std::thread;

use crate::routing::catalog::BedType;
use crate::routing::ledger::BedLedger;
use crate::routing::snapshot::HospitalId;

#[test]
fn reservations_accumulate_per_key() {
    let ledger = BedLedger::new();
    let id = HospitalId::from("A1100001");

    ledger.reserve(&id, BedType::Er, 2);
    ledger.reserve(&id, BedType::Er, 3);
    ledger.reserve(&id, BedType::IcuGeneral, 1);

    assert_eq!(ledger.pending_for(&id, BedType::Er), 5);
    assert_eq!(ledger.pending_for(&id, BedType::IcuGeneral), 1);
    assert_eq!(ledger.pending_for(&id, BedType::Ward), 0);
}

#[test]
fn keys_are_scoped_to_the_hospital() {
    let ledger = BedLedger::new();
    let first = HospitalId::from("A1100001");
    let second = HospitalId::from("A1100002");

    ledger.reserve(&first, BedType::Er, 4);
    assert_eq!(ledger.pending_for(&second, BedType::Er), 0);
}

#[test]
fn release_floors_at_zero_instead_of_erroring() {
    let ledger = BedLedger::new();
    let id = HospitalId::from("A1100001");

    ledger.reserve(&id, BedType::Er, 2);
    ledger.release(&id, BedType::Er, 5);
    assert_eq!(ledger.pending_for(&id, BedType::Er), 0);

    // Releasing an unseen key is a no-op.
    ledger.release(&id, BedType::Ward, 3);
    assert_eq!(ledger.pending_for(&id, BedType::Ward), 0);
}

#[test]
fn drained_counters_disappear_from_the_receipt_view() {
    let ledger = BedLedger::new();
    let id = HospitalId::from("A1100001");

    ledger.reserve(&id, BedType::Er, 2);
    ledger.reserve(&id, BedType::IcuGeneral, 1);
    ledger.release(&id, BedType::Er, 2);

    let pending = ledger.pending_by_type(&id);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending.get(&BedType::IcuGeneral), Some(&1));
}

#[test]
fn pending_sum_spans_multiple_bed_types() {
    let ledger = BedLedger::new();
    let id = HospitalId::from("A1100001");

    ledger.reserve(&id, BedType::Er, 2);
    ledger.reserve(&id, BedType::IcuGeneral, 3);
    ledger.reserve(&id, BedType::Ward, 7);

    let sum = ledger.pending_sum(&id, [BedType::Er, BedType::IcuGeneral]);
    assert_eq!(sum, 5);
}

#[test]
fn concurrent_reservations_never_lose_updates() {
    let ledger = Arc::new(BedLedger::new());
    let id = HospitalId::from("A1100001");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            let id = id.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    ledger.reserve(&id, BedType::Er, 1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("reservation thread panicked");
    }

    assert_eq!(ledger.pending_for(&id, BedType::Er), 800);
}
