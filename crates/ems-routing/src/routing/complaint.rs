use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::catalog::ProcedureGroup;
use super::snapshot::HospitalCapacitySnapshot;

/// Presenting-complaint categories used by the triage classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complaint {
    ChestPain,
    Dyspnea,
    NeuroDeficit,
    AbdominalPain,
    Bleeding,
    AlteredMental,
    Trauma,
    ObGyn,
    Pediatric,
    Psychiatric,
}

impl Complaint {
    pub const ALL: [Complaint; 10] = [
        Complaint::ChestPain,
        Complaint::Dyspnea,
        Complaint::NeuroDeficit,
        Complaint::AbdominalPain,
        Complaint::Bleeding,
        Complaint::AlteredMental,
        Complaint::Trauma,
        Complaint::ObGyn,
        Complaint::Pediatric,
        Complaint::Psychiatric,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Complaint::ChestPain => "chest pain",
            Complaint::Dyspnea => "dyspnea / respiratory distress",
            Complaint::NeuroDeficit => "stroke-like neurological symptoms",
            Complaint::AbdominalPain => "abdominal pain / GI symptoms",
            Complaint::Bleeding => "bleeding",
            Complaint::AlteredMental => "altered mental status / syncope",
            Complaint::Trauma => "trauma",
            Complaint::ObGyn => "obstetric/gynecological emergency",
            Complaint::Pediatric => "pediatric acute illness",
            Complaint::Psychiatric => "psychiatric emergency",
        }
    }

    /// Ordered procedure groups a hospital must be able to deliver for
    /// this complaint. Callers reject a complaint whose route is empty;
    /// every defined category currently maps to at least one group.
    pub const fn required_groups(self) -> &'static [ProcedureGroup] {
        match self {
            Complaint::ChestPain => &[
                ProcedureGroup::AcsMi,
                ProcedureGroup::AorticEmergency,
                ProcedureGroup::IrIntervention,
            ],
            Complaint::Dyspnea => &[
                ProcedureGroup::AcsMi,
                ProcedureGroup::AcsStroke,
                ProcedureGroup::AorticEmergency,
                ProcedureGroup::Bronchoscopy,
                ProcedureGroup::GiEndoscopy,
            ],
            Complaint::NeuroDeficit => &[
                ProcedureGroup::AcsStroke,
                ProcedureGroup::BrainHemorrhage,
            ],
            Complaint::AbdominalPain => &[
                ProcedureGroup::AbdominalEmergency,
                ProcedureGroup::GiEndoscopy,
                ProcedureGroup::Intussusception,
            ],
            Complaint::Bleeding => &[
                ProcedureGroup::GiEndoscopy,
                ProcedureGroup::IrIntervention,
                ProcedureGroup::EyeEmergency,
            ],
            Complaint::AlteredMental => &[
                ProcedureGroup::AcsMi,
                ProcedureGroup::AcsStroke,
                ProcedureGroup::AorticEmergency,
                ProcedureGroup::EmergencyDialysis,
            ],
            Complaint::Trauma => &[
                ProcedureGroup::LimbReplantation,
                ProcedureGroup::SevereBurn,
                ProcedureGroup::IrIntervention,
            ],
            Complaint::ObGyn => &[ProcedureGroup::ObEmergency],
            Complaint::Pediatric => &[
                ProcedureGroup::Intussusception,
                ProcedureGroup::GiEndoscopy,
                ProcedureGroup::Bronchoscopy,
                ProcedureGroup::NeonateLbw,
            ],
            Complaint::Psychiatric => &[ProcedureGroup::PsychiatricEmergency],
        }
    }

    /// Normalizes a chief-complaint code coming from the triage
    /// classifier. Unrecognized codes are a hard rejection upstream, so
    /// this returns `None` rather than defaulting to any category.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "chest_pain" => Some(Complaint::ChestPain),
            "dyspnea" | "respiratory_distress" => Some(Complaint::Dyspnea),
            "neuro" | "neuro_deficit" | "stroke_like" => Some(Complaint::NeuroDeficit),
            "abdominal_pain" | "gi_symptom" => Some(Complaint::AbdominalPain),
            "bleeding" => Some(Complaint::Bleeding),
            "ams" | "altered_mental_status" => Some(Complaint::AlteredMental),
            "trauma" => Some(Complaint::Trauma),
            "obgyn" | "ob_gyn" | "pregnancy" => Some(Complaint::ObGyn),
            "pediatric" | "ped" => Some(Complaint::Pediatric),
            "psy" | "psychiatric" => Some(Complaint::Psychiatric),
            _ => None,
        }
    }
}

impl fmt::Display for Complaint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Triage severity on the KTAS 1-5 scale. Validated at the boundary so
/// downstream code never sees an out-of-range level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TriageSeverity(u8);

impl TriageSeverity {
    pub fn new(level: u8) -> Option<Self> {
        (1..=5).contains(&level).then_some(Self(level))
    }

    pub const fn level(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for TriageSeverity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TriageSeverity::new(value)
            .ok_or_else(|| format!("severity level {value} outside the KTAS 1-5 range"))
    }
}

impl From<TriageSeverity> for u8 {
    fn from(value: TriageSeverity) -> Self {
        value.0
    }
}

impl fmt::Display for TriageSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kiosk flag key -> complaint categories the flag speaks for. Used only
/// to annotate candidates with the complaints a hospital could cover;
/// routing itself runs off `required_groups`.
const FLAG_COMPLAINTS: &[(&str, &[Complaint])] = &[
    ("MKioskTy1", &[Complaint::ChestPain, Complaint::Dyspnea, Complaint::NeuroDeficit, Complaint::AlteredMental]),
    ("MKioskTy2", &[Complaint::ChestPain, Complaint::Dyspnea, Complaint::NeuroDeficit, Complaint::AlteredMental]),
    ("MKioskTy3", &[Complaint::ChestPain, Complaint::Dyspnea, Complaint::NeuroDeficit, Complaint::AlteredMental]),
    ("MKioskTy4", &[Complaint::ChestPain, Complaint::Dyspnea, Complaint::NeuroDeficit, Complaint::AlteredMental]),
    ("MKioskTy5", &[Complaint::ChestPain, Complaint::Dyspnea, Complaint::NeuroDeficit, Complaint::AlteredMental]),
    ("MKioskTy6", &[Complaint::ChestPain, Complaint::Dyspnea, Complaint::NeuroDeficit, Complaint::AlteredMental]),
    ("MKioskTy7", &[Complaint::AbdominalPain]),
    ("MKioskTy8", &[Complaint::AbdominalPain]),
    ("MKioskTy9", &[Complaint::AbdominalPain]),
    ("MKioskTy10", &[Complaint::Pediatric]),
    ("MKioskTy11", &[Complaint::AbdominalPain, Complaint::Bleeding]),
    ("MKioskTy12", &[Complaint::AbdominalPain, Complaint::Bleeding, Complaint::Pediatric]),
    ("MKioskTy13", &[Complaint::Dyspnea, Complaint::AbdominalPain]),
    ("MKioskTy14", &[Complaint::Dyspnea, Complaint::AbdominalPain, Complaint::Pediatric]),
    ("MKioskTy15", &[Complaint::ObGyn, Complaint::Pediatric]),
    ("MKioskTy16", &[Complaint::ObGyn]),
    ("MKioskTy17", &[Complaint::ObGyn]),
    ("MKioskTy18", &[Complaint::ObGyn]),
    ("MKioskTy19", &[Complaint::Trauma]),
    ("MKioskTy20", &[Complaint::Trauma]),
    ("MKioskTy21", &[Complaint::Trauma]),
    ("MKioskTy22", &[Complaint::AlteredMental]),
    ("MKioskTy23", &[Complaint::AlteredMental]),
    ("MKioskTy24", &[Complaint::Psychiatric]),
    ("MKioskTy25", &[Complaint::Bleeding, Complaint::Trauma]),
    ("MKioskTy26", &[Complaint::ChestPain, Complaint::Dyspnea, Complaint::NeuroDeficit, Complaint::AbdominalPain]),
    ("MKioskTy27", &[Complaint::ChestPain, Complaint::Dyspnea, Complaint::NeuroDeficit, Complaint::AbdominalPain]),
];

fn is_affirmative(raw: &str) -> bool {
    raw.trim().to_ascii_uppercase().starts_with('Y')
}

/// Complaint categories a hospital could plausibly cover, inferred from
/// affirmative kiosk flags across both the serious-disease and
/// basic-info sources.
pub fn complaints_supported_by(snapshot: &HospitalCapacitySnapshot) -> BTreeSet<Complaint> {
    let mut supported = BTreeSet::new();

    let flags = snapshot
        .serious_flags
        .iter()
        .chain(
            snapshot
                .basic_flags
                .iter()
                .filter(|(key, _)| key.starts_with("MKioskTy")),
        );

    for (key, raw) in flags {
        if raw.trim().is_empty() || !is_affirmative(raw) {
            continue;
        }
        if let Some((_, complaints)) = FLAG_COMPLAINTS.iter().find(|(k, _)| k == key) {
            supported.extend(complaints.iter().copied());
        }
    }

    supported
}
