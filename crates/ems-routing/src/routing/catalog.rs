use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Named capacity pool with an independently reported count. The upstream
/// registry reports each pool on its own; no invariant links them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BedType {
    Er,
    Or,
    IcuGeneral,
    IcuNeuro,
    IcuNeurosurg,
    IcuNeonatal,
    IcuBurn,
    WardPsych,
    Ward,
}

impl BedType {
    pub const fn label(self) -> &'static str {
        match self {
            BedType::Er => "emergency bay",
            BedType::Or => "operating room",
            BedType::IcuGeneral => "general ICU",
            BedType::IcuNeuro => "neurology ICU",
            BedType::IcuNeurosurg => "neurosurgery ICU",
            BedType::IcuNeonatal => "neonatal ICU",
            BedType::IcuBurn => "burn ICU",
            BedType::WardPsych => "closed psychiatric ward",
            BedType::Ward => "general ward",
        }
    }
}

impl fmt::Display for BedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bundle of capability flags and required bed types representing one
/// treatable emergency condition category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcedureGroup {
    AcsMi,
    AcsStroke,
    BrainHemorrhage,
    AorticEmergency,
    AbdominalEmergency,
    Intussusception,
    GiEndoscopy,
    Bronchoscopy,
    LimbReplantation,
    SevereBurn,
    ObEmergency,
    NeonateLbw,
    EmergencyDialysis,
    PsychiatricEmergency,
    IrIntervention,
    EyeEmergency,
}

impl ProcedureGroup {
    pub const ALL: [ProcedureGroup; 16] = [
        ProcedureGroup::AcsMi,
        ProcedureGroup::AcsStroke,
        ProcedureGroup::BrainHemorrhage,
        ProcedureGroup::AorticEmergency,
        ProcedureGroup::AbdominalEmergency,
        ProcedureGroup::Intussusception,
        ProcedureGroup::GiEndoscopy,
        ProcedureGroup::Bronchoscopy,
        ProcedureGroup::LimbReplantation,
        ProcedureGroup::SevereBurn,
        ProcedureGroup::ObEmergency,
        ProcedureGroup::NeonateLbw,
        ProcedureGroup::EmergencyDialysis,
        ProcedureGroup::PsychiatricEmergency,
        ProcedureGroup::IrIntervention,
        ProcedureGroup::EyeEmergency,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ProcedureGroup::AcsMi => "acute MI / emergency PCI",
            ProcedureGroup::AcsStroke => "ischemic stroke reperfusion",
            ProcedureGroup::BrainHemorrhage => "brain hemorrhage surgery",
            ProcedureGroup::AorticEmergency => "aortic dissection/rupture",
            ProcedureGroup::AbdominalEmergency => "emergency abdominal surgery",
            ProcedureGroup::Intussusception => "intussusception / bowel obstruction",
            ProcedureGroup::GiEndoscopy => "GI endoscopy (incl. bleeding)",
            ProcedureGroup::Bronchoscopy => "bronchoscopy",
            ProcedureGroup::LimbReplantation => "limb replantation",
            ProcedureGroup::SevereBurn => "severe burn care",
            ProcedureGroup::ObEmergency => "obstetric emergency",
            ProcedureGroup::NeonateLbw => "neonatal intensive care",
            ProcedureGroup::EmergencyDialysis => "emergency dialysis (HD/CRRT)",
            ProcedureGroup::PsychiatricEmergency => "psychiatric emergency admission",
            ProcedureGroup::IrIntervention => "vascular intervention (IR)",
            ProcedureGroup::EyeEmergency => "ophthalmic emergency surgery",
        }
    }
}

impl fmt::Display for ProcedureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Static description of one procedure group: where its capability flags
/// live, which override-message codes apply, and which bed types it needs.
///
/// `serious_keys` are checked against the dedicated serious-disease
/// acceptance feed first; `basic_keys` against the facility basic-info
/// feed as a fallback. The registry happens to reuse the same kiosk key
/// names in both feeds.
#[derive(Debug, Clone, Copy)]
pub struct ProcedureGroupSpec {
    pub group: ProcedureGroup,
    pub serious_keys: &'static [&'static str],
    pub basic_keys: &'static [&'static str],
    pub message_codes: &'static [&'static str],
    pub bed_types: &'static [BedType],
}

const SPECS: [ProcedureGroupSpec; 16] = [
    ProcedureGroupSpec {
        group: ProcedureGroup::AcsMi,
        serious_keys: &["MKioskTy1"],
        basic_keys: &["MKioskTy1"],
        message_codes: &["Y0011", "Y0012"],
        bed_types: &[BedType::Er, BedType::IcuGeneral],
    },
    ProcedureGroupSpec {
        group: ProcedureGroup::AcsStroke,
        serious_keys: &["MKioskTy2"],
        basic_keys: &["MKioskTy2"],
        message_codes: &["Y0021", "Y0022"],
        bed_types: &[BedType::Er, BedType::IcuNeuro],
    },
    ProcedureGroupSpec {
        group: ProcedureGroup::BrainHemorrhage,
        serious_keys: &["MKioskTy3"],
        basic_keys: &["MKioskTy3"],
        message_codes: &["Y0031", "Y0032"],
        bed_types: &[BedType::Er, BedType::IcuNeurosurg],
    },
    ProcedureGroupSpec {
        group: ProcedureGroup::AorticEmergency,
        serious_keys: &["MKioskTy4"],
        basic_keys: &["MKioskTy4"],
        message_codes: &["Y0041", "Y0042"],
        bed_types: &[BedType::Er, BedType::IcuGeneral],
    },
    ProcedureGroupSpec {
        group: ProcedureGroup::AbdominalEmergency,
        serious_keys: &["MKioskTy7", "MKioskTy8", "MKioskTy9"],
        basic_keys: &["MKioskTy7", "MKioskTy8", "MKioskTy9"],
        message_codes: &["Y0051", "Y0052"],
        bed_types: &[BedType::Er, BedType::Or, BedType::IcuGeneral],
    },
    ProcedureGroupSpec {
        group: ProcedureGroup::Intussusception,
        serious_keys: &["MKioskTy10"],
        basic_keys: &["MKioskTy10"],
        message_codes: &["Y0061", "Y0062"],
        bed_types: &[BedType::Er],
    },
    ProcedureGroupSpec {
        group: ProcedureGroup::GiEndoscopy,
        serious_keys: &["MKioskTy11", "MKioskTy12"],
        basic_keys: &["MKioskTy11", "MKioskTy12"],
        message_codes: &["Y0071", "Y0072"],
        bed_types: &[BedType::Er],
    },
    ProcedureGroupSpec {
        group: ProcedureGroup::Bronchoscopy,
        serious_keys: &["MKioskTy13", "MKioskTy14"],
        basic_keys: &["MKioskTy13", "MKioskTy14"],
        message_codes: &["Y0081", "Y0082"],
        bed_types: &[BedType::Er, BedType::IcuGeneral],
    },
    ProcedureGroupSpec {
        group: ProcedureGroup::LimbReplantation,
        serious_keys: &["MKioskTy20", "MKioskTy21"],
        basic_keys: &["MKioskTy20", "MKioskTy21"],
        message_codes: &["Y0091", "Y0092"],
        bed_types: &[BedType::Er, BedType::Or, BedType::IcuGeneral],
    },
    ProcedureGroupSpec {
        group: ProcedureGroup::SevereBurn,
        serious_keys: &["MKioskTy19"],
        basic_keys: &["MKioskTy19"],
        message_codes: &["Y0101", "Y0102"],
        bed_types: &[BedType::Er, BedType::IcuBurn],
    },
    ProcedureGroupSpec {
        group: ProcedureGroup::ObEmergency,
        serious_keys: &["MKioskTy16", "MKioskTy17", "MKioskTy18"],
        basic_keys: &["MKioskTy16", "MKioskTy17", "MKioskTy18"],
        message_codes: &["Y0111", "Y0112"],
        bed_types: &[BedType::Er, BedType::Or],
    },
    ProcedureGroupSpec {
        group: ProcedureGroup::NeonateLbw,
        serious_keys: &["MKioskTy15"],
        basic_keys: &["MKioskTy15"],
        message_codes: &["Y0121", "Y0122"],
        bed_types: &[BedType::IcuNeonatal],
    },
    ProcedureGroupSpec {
        group: ProcedureGroup::EmergencyDialysis,
        serious_keys: &["MKioskTy22", "MKioskTy23"],
        basic_keys: &["MKioskTy22", "MKioskTy23"],
        message_codes: &["Y0141", "Y0142"],
        bed_types: &[BedType::Er],
    },
    ProcedureGroupSpec {
        group: ProcedureGroup::PsychiatricEmergency,
        serious_keys: &["MKioskTy24"],
        basic_keys: &["MKioskTy24"],
        message_codes: &["Y0151", "Y0152"],
        bed_types: &[BedType::WardPsych],
    },
    ProcedureGroupSpec {
        group: ProcedureGroup::IrIntervention,
        serious_keys: &["MKioskTy26", "MKioskTy27"],
        basic_keys: &["MKioskTy26", "MKioskTy27"],
        message_codes: &["Y0161", "Y0162"],
        bed_types: &[BedType::Er, BedType::IcuGeneral],
    },
    ProcedureGroupSpec {
        group: ProcedureGroup::EyeEmergency,
        serious_keys: &["MKioskTy25"],
        basic_keys: &["MKioskTy25"],
        message_codes: &["Y0171", "Y0172"],
        bed_types: &[BedType::Er],
    },
];

/// Read-only registry of procedure group specs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ProcedureCatalog {
    specs: &'static [ProcedureGroupSpec],
}

impl ProcedureCatalog {
    pub fn standard() -> Self {
        Self { specs: &SPECS }
    }

    pub fn spec(&self, group: ProcedureGroup) -> Option<&ProcedureGroupSpec> {
        self.specs.iter().find(|spec| spec.group == group)
    }

    pub fn bed_types_for(&self, group: ProcedureGroup) -> &'static [BedType] {
        self.spec(group).map(|spec| spec.bed_types).unwrap_or(&[])
    }

    pub fn specs(&self) -> impl Iterator<Item = &ProcedureGroupSpec> {
        self.specs.iter()
    }

    /// Referential-integrity check run at startup: every group must have
    /// exactly one spec, at least one flag key, and at least one bed type.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = BTreeSet::new();
        for spec in self.specs {
            if !seen.insert(spec.group) {
                return Err(CatalogError::DuplicateSpec { group: spec.group });
            }
            if spec.serious_keys.is_empty() && spec.basic_keys.is_empty() {
                return Err(CatalogError::NoFlagKeys { group: spec.group });
            }
            if spec.bed_types.is_empty() {
                return Err(CatalogError::NoBedTypes { group: spec.group });
            }
        }
        for group in ProcedureGroup::ALL {
            if !seen.contains(&group) {
                return Err(CatalogError::MissingSpec { group });
            }
        }
        Ok(())
    }
}

/// Errors raised when the static catalog fails integrity validation.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("procedure group {group:?} has more than one spec")]
    DuplicateSpec { group: ProcedureGroup },
    #[error("procedure group {group:?} has no spec in the catalog")]
    MissingSpec { group: ProcedureGroup },
    #[error("procedure group {group:?} declares no capability flag keys")]
    NoFlagKeys { group: ProcedureGroup },
    #[error("procedure group {group:?} declares no required bed types")]
    NoBedTypes { group: ProcedureGroup },
}
