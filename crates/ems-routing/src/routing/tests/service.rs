use std::sync::Arc;

use super::common::*;
use crate::routing::catalog::BedType;
use crate::routing::complaint::{Complaint, TriageSeverity};
use crate::routing::ledger::BedLedger;
use crate::routing::ranking::CoverageLevel;
use crate::routing::service::{HospitalRouter, TriageError, TriageRequest};
use crate::routing::snapshot::{GeoPoint, HospitalCapacitySnapshot, HospitalId};

/// Hospital that can take every chest-pain procedure group.
fn cardiac_hospital(id: &str, name: &str, er: i32, icu: i32) -> HospitalCapacitySnapshot {
    let snapshot = with_beds(
        hospital(id, name),
        &[(BedType::Er, er), (BedType::IcuGeneral, icu)],
    );
    let snapshot = with_serious_flag(snapshot, "MKioskTy1", "Y");
    let snapshot = with_serious_flag(snapshot, "MKioskTy4", "Y");
    with_serious_flag(snapshot, "MKioskTy26", "Y")
}

fn router(snapshots: Vec<HospitalCapacitySnapshot>) -> HospitalRouter<StaticGateway> {
    HospitalRouter::new(
        Arc::new(StaticGateway { snapshots }),
        Arc::new(BedLedger::new()),
    )
    .expect("catalog validates")
}

fn chest_pain_request(home: Option<&str>) -> TriageRequest {
    TriageRequest {
        severity: TriageSeverity::new(2).expect("in range"),
        complaint: Complaint::ChestPain,
        region: seoul(),
        home_hospital: home.map(HospitalId::from),
    }
}

#[test]
fn candidates_are_ranked_by_priority_then_beds_then_id() {
    let router = router(vec![
        cardiac_hospital("A1100002", "한강병원", 3, 2),
        cardiac_hospital("A1100001", "서울중앙병원", 6, 4),
    ]);

    let response = router.candidates(&chest_pain_request(None)).expect("routes");
    let ids: Vec<&str> = response
        .hospitals
        .iter()
        .map(|candidate| candidate.id.as_str())
        .collect();
    assert_eq!(ids, vec!["A1100001", "A1100002"]);

    let top = &response.hospitals[0];
    assert_eq!(top.total_effective_beds, 10);
    assert_eq!(top.coverage_level, CoverageLevel::Full);
    assert_eq!(top.priority_score, 10.3);
    assert!(top.supported_complaints.contains(&Complaint::ChestPain));
    assert!(top.reason_summary.contains("KTAS 2"));
}

#[test]
fn identical_hospitals_tie_break_on_facility_code() {
    let router = router(vec![
        cardiac_hospital("A1100002", "한강병원", 4, 2),
        cardiac_hospital("A1100001", "서울중앙병원", 4, 2),
    ]);

    let response = router.candidates(&chest_pain_request(None)).expect("routes");
    let ids: Vec<&str> = response
        .hospitals
        .iter()
        .map(|candidate| candidate.id.as_str())
        .collect();
    assert_eq!(ids, vec!["A1100001", "A1100002"]);
}

#[test]
fn home_hospital_bonus_outweighs_a_one_bed_deficit() {
    let router = router(vec![
        cardiac_hospital("A1100001", "서울중앙병원", 6, 4),
        cardiac_hospital("A1100002", "한강병원", 5, 4),
    ]);

    let response = router
        .candidates(&chest_pain_request(Some("A1100002")))
        .expect("routes");
    assert_eq!(response.hospitals[0].id.as_str(), "A1100002");
    assert!(response.hospitals[0].priority_score > 100.0);
}

#[test]
fn hospitals_without_location_or_er_are_not_candidates() {
    let mut no_location = cardiac_hospital("A1100001", "서울중앙병원", 6, 4);
    no_location.location = None;
    let mut no_er = cardiac_hospital("A1100002", "한강병원", 6, 4);
    no_er.has_emergency_department = false;

    let router = router(vec![no_location, no_er]);
    let response = router.candidates(&chest_pain_request(None)).expect("routes");
    assert!(response.hospitals.is_empty());
}

#[test]
fn hospitals_with_no_usable_beds_are_not_candidates() {
    // Flags say yes but every pool is empty.
    let empty = cardiac_hospital("A1100001", "서울중앙병원", 0, 0);
    // No flag data at all, so no group resolves available.
    let silent = with_beds(
        hospital("A1100002", "한강병원"),
        &[(BedType::Er, 9), (BedType::IcuGeneral, 9)],
    );

    let router = router(vec![empty, silent]);
    let response = router.candidates(&chest_pain_request(None)).expect("routes");
    assert!(response.hospitals.is_empty());
}

#[test]
fn partial_coverage_still_ranks_with_a_lower_level() {
    // Only AcsMi resolves available: one of three required groups.
    let snapshot = with_serious_flag(
        with_beds(
            hospital("A1100001", "서울중앙병원"),
            &[(BedType::Er, 4), (BedType::IcuGeneral, 2)],
        ),
        "MKioskTy1",
        "Y",
    );

    let router = router(vec![snapshot]);
    let response = router.candidates(&chest_pain_request(None)).expect("routes");
    assert_eq!(response.hospitals.len(), 1);

    let candidate = &response.hospitals[0];
    assert_eq!(candidate.coverage_level, CoverageLevel::Low);
    assert_eq!(candidate.groups_with_beds.len(), 1);
    // Union still pools the group's full bed set.
    assert_eq!(candidate.total_effective_beds, 6);
}

#[test]
fn out_of_range_severity_is_rejected() {
    let router = router(vec![cardiac_hospital("A1100001", "서울중앙병원", 6, 4)]);
    match router.route_by_code(0, "chest_pain", None, &seoul()) {
        Err(TriageError::InvalidSeverity { value: 0 }) => {}
        other => panic!("expected invalid severity, got {other:?}"),
    }
}

#[test]
fn unknown_complaint_code_is_rejected() {
    let router = router(vec![cardiac_hospital("A1100001", "서울중앙병원", 6, 4)]);
    match router.route_by_code(3, "headache", None, &seoul()) {
        Err(TriageError::UnknownComplaintCode { code }) => assert_eq!(code, "headache"),
        other => panic!("expected unknown code, got {other:?}"),
    }
}

#[test]
fn facility_code_followup_is_used_verbatim() {
    let router = router(vec![
        cardiac_hospital("A1100001", "서울중앙병원", 6, 4),
        cardiac_hospital("A1100002", "한강병원", 5, 4),
    ]);

    let response = router
        .route_by_code(2, "chest_pain", Some("A1100002"), &seoul())
        .expect("routes");
    assert_eq!(response.followup, Some(HospitalId::from("A1100002")));
    assert_eq!(response.hospitals[0].id.as_str(), "A1100002");
}

#[test]
fn followup_names_match_ignoring_whitespace() {
    let router = router(vec![
        cardiac_hospital("A1100001", "서울중앙병원", 6, 4),
        cardiac_hospital("A1100002", "한강병원", 5, 4),
    ]);

    let response = router
        .route_by_code(2, "chest_pain", Some("서울 중앙 병원"), &seoul())
        .expect("routes");
    assert_eq!(response.followup, Some(HospitalId::from("A1100001")));
}

#[test]
fn unresolvable_followup_is_silently_dropped() {
    let router = router(vec![cardiac_hospital("A1100001", "서울중앙병원", 6, 4)]);

    let response = router
        .route_by_code(2, "chest_pain", Some("부산대학교병원"), &seoul())
        .expect("routes");
    assert_eq!(response.followup, None);
}

#[test]
fn reservation_uses_the_emergency_bay_when_available() {
    let router = router(vec![cardiac_hospital("A1100001", "서울중앙병원", 6, 4)]);
    let id = HospitalId::from("A1100001");

    let receipt = router.reserve(&id, Complaint::ChestPain, 2).expect("reserves");
    assert_eq!(receipt.bed_type, BedType::Er);
    assert_eq!(receipt.pending.get(&BedType::Er), Some(&2));

    // The pending count is visible to the next ranking pass.
    let response = router.candidates(&chest_pain_request(None)).expect("routes");
    assert_eq!(response.hospitals[0].total_effective_beds, 8);

    let receipt = router.release(&id, Complaint::ChestPain, 2).expect("releases");
    assert!(receipt.pending.is_empty());
    let response = router.candidates(&chest_pain_request(None)).expect("routes");
    assert_eq!(response.hospitals[0].total_effective_beds, 10);
}

#[test]
fn psychiatric_reservations_target_the_psychiatric_ward() {
    let router = router(vec![]);
    let receipt = router
        .reserve(&HospitalId::from("A1100001"), Complaint::Psychiatric, 1)
        .expect("reserves");
    assert_eq!(receipt.bed_type, BedType::WardPsych);
}

#[test]
fn nearest_shortlist_keeps_priority_order_among_survivors() {
    let router = router(vec![
        cardiac_hospital("A1100001", "서울중앙병원", 6, 4),
        cardiac_hospital("A1100002", "한강병원", 5, 4),
        cardiac_hospital("A1100003", "북부의료원", 4, 4),
    ]);
    let response = router.candidates(&chest_pain_request(None)).expect("routes");

    let provider = FixedDistances {
        estimates: vec![
            (HospitalId::from("A1100001"), 12.0, 1400),
            (HospitalId::from("A1100002"), 3.5, 520),
            (HospitalId::from("A1100003"), 5.1, 700),
        ],
    };
    let origin = GeoPoint {
        latitude: 37.55,
        longitude: 126.99,
    };

    let shortlisted = router
        .shortlist_nearest(response, &provider, origin, 2)
        .expect("shortlists");
    let ids: Vec<&str> = shortlisted
        .hospitals
        .iter()
        .map(|candidate| candidate.id.as_str())
        .collect();
    // A1100001 is the priority leader but too far; the two closest stay
    // in priority order.
    assert_eq!(ids, vec!["A1100002", "A1100003"]);
    assert_eq!(shortlisted.hospitals[0].distance_km, Some(3.5));
    assert_eq!(shortlisted.hospitals[0].duration_secs, Some(520));
}
