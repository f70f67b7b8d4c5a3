use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::catalog::ProcedureGroupSpec;
use super::snapshot::{HospitalCapacitySnapshot, MessageCategory, OverrideMessage};

/// Whether a hospital can deliver one procedure group right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapabilityStatus {
    Available,
    Unavailable,
    Unknown,
}

/// Which flag source decided the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagSource {
    Serious,
    Basic,
    None,
}

/// Provenance of a capability decision, for audit output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub source: FlagSource,
    pub message_override: bool,
}

impl Provenance {
    pub fn label(&self) -> String {
        let source = match self.source {
            FlagSource::Serious => "serious",
            FlagSource::Basic => "basic",
            FlagSource::None => "none",
        };
        if self.message_override {
            format!("{source}+message-override")
        } else {
            source.to_string()
        }
    }
}

/// Derived per (hospital, procedure group) availability. Recomputed on
/// every request, never cached past one resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityAvailability {
    pub status: CapabilityStatus,
    pub provenance: Provenance,
}

/// Substring the registry uses in flag values and message bodies to mean
/// "cannot accept" (불가/불가능).
const NEGATIVE_MARKER: &str = "불가";
/// Substring in a display status meaning the message is a block (차단).
const BLOCK_MARKER: &str = "차단";

const BLOCK_TIMESTAMP_FORMATS: [&str; 3] = ["%Y%m%d%H%M%S", "%Y-%m-%d%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagReading {
    Yes,
    No,
    Unmapped,
}

/// Three-way classification of a raw kiosk flag value. `Y...` is
/// affirmative; an explicit negative marker or the `N` prefix is
/// negative; any other non-empty value is unmapped and must not be
/// silently treated as either.
fn classify_flag(raw: &str) -> Option<FlagReading> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    let upper = value.to_ascii_uppercase();
    if upper.starts_with('Y') {
        return Some(FlagReading::Yes);
    }
    if value.contains(NEGATIVE_MARKER) || upper.starts_with('N') {
        return Some(FlagReading::No);
    }
    Some(FlagReading::Unmapped)
}

fn status_from_readings(readings: &[FlagReading]) -> CapabilityStatus {
    if readings.contains(&FlagReading::Yes) {
        CapabilityStatus::Available
    } else if readings.contains(&FlagReading::No) {
        CapabilityStatus::Unavailable
    } else {
        CapabilityStatus::Unknown
    }
}

/// Parses the registry's block timestamps (`YYYYMMDDHHMMSS` plus two
/// dashed variants). Returns `None` when nothing matches.
fn parse_block_instant(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    BLOCK_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Whether a message's formal block flag is in effect at `now`.
///
/// If neither bound parses, the block is treated as currently in effect:
/// an unparseable blocking message is an active block, never ignored.
fn blocking_at(message: &OverrideMessage, now: NaiveDateTime) -> bool {
    let status = message.display_status.trim();
    if status.is_empty() {
        return false;
    }

    let is_block_flag =
        status.to_ascii_uppercase().starts_with('N') || status.contains(BLOCK_MARKER);
    if !is_block_flag {
        return false;
    }

    let start = message.block_start.as_deref().and_then(parse_block_instant);
    let end = message.block_end.as_deref().and_then(parse_block_instant);

    match (start, end) {
        (None, None) => true,
        (Some(start), Some(end)) => start <= now && now <= end,
        (Some(start), None) => now >= start,
        (None, Some(end)) => now <= end,
    }
}

/// Decides one procedure group's availability for one hospital snapshot.
///
/// Flag sources are consulted in priority order (serious-disease feed
/// first, basic info second); matching severe override messages can then
/// force the result to unavailable.
pub fn resolve_capability(
    snapshot: &HospitalCapacitySnapshot,
    spec: &ProcedureGroupSpec,
    now: NaiveDateTime,
) -> CapabilityAvailability {
    let serious_readings: Vec<FlagReading> = spec
        .serious_keys
        .iter()
        .filter_map(|key| snapshot.serious_flags.get(*key))
        .filter_map(|raw| classify_flag(raw))
        .collect();

    let (mut status, source) = if !serious_readings.is_empty() {
        (status_from_readings(&serious_readings), FlagSource::Serious)
    } else {
        let basic_readings: Vec<FlagReading> = spec
            .basic_keys
            .iter()
            .filter_map(|key| snapshot.basic_flags.get(*key))
            .filter_map(|raw| classify_flag(raw))
            .collect();
        if !basic_readings.is_empty() {
            (status_from_readings(&basic_readings), FlagSource::Basic)
        } else {
            (CapabilityStatus::Unknown, FlagSource::None)
        }
    };

    let mut message_override = false;
    for message in snapshot
        .messages
        .iter()
        .filter(|message| message.category == MessageCategory::Severe)
        .filter(|message| spec.message_codes.contains(&message.type_code.as_str()))
    {
        if blocking_at(message, now) {
            status = CapabilityStatus::Unavailable;
            message_override = true;
            break;
        }
        // Looser trigger: structured fields ambiguous but the body says
        // the group cannot be accepted.
        if message.body.contains(NEGATIVE_MARKER) {
            status = CapabilityStatus::Unavailable;
            message_override = true;
            break;
        }
    }

    CapabilityAvailability {
        status,
        provenance: Provenance {
            source,
            message_override,
        },
    }
}
