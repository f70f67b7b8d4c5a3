use crate::routing::catalog::{BedType, ProcedureCatalog, ProcedureGroup};

#[test]
fn standard_catalog_passes_validation() {
    let catalog = ProcedureCatalog::standard();
    catalog.validate().expect("standard catalog is internally consistent");
}

#[test]
fn every_group_has_a_spec_with_flags_and_beds() {
    let catalog = ProcedureCatalog::standard();
    for group in ProcedureGroup::ALL {
        let spec = catalog
            .spec(group)
            .unwrap_or_else(|| panic!("missing spec for {group:?}"));
        assert!(
            !spec.serious_keys.is_empty() || !spec.basic_keys.is_empty(),
            "{group:?} has no flag keys"
        );
        assert!(!spec.bed_types.is_empty(), "{group:?} has no bed types");
        assert!(!spec.message_codes.is_empty(), "{group:?} has no message codes");
    }
}

#[test]
fn acute_mi_spec_matches_registry_keys() {
    let catalog = ProcedureCatalog::standard();
    let spec = catalog.spec(ProcedureGroup::AcsMi).expect("spec present");

    assert_eq!(spec.serious_keys, &["MKioskTy1"]);
    assert_eq!(spec.message_codes, &["Y0011", "Y0012"]);
    assert_eq!(spec.bed_types, &[BedType::Er, BedType::IcuGeneral]);
}

#[test]
fn bed_types_for_unlisted_group_falls_back_to_empty() {
    let catalog = ProcedureCatalog::standard();
    // All groups are listed in the standard catalog, so this exercises
    // the happy path only.
    assert_eq!(
        catalog.bed_types_for(ProcedureGroup::NeonateLbw),
        &[BedType::IcuNeonatal]
    );
}
