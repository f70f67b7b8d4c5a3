use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::capacity::{group_capacity, union_capacity};
use super::catalog::{BedType, CatalogError, ProcedureCatalog, ProcedureGroup};
use super::complaint::{complaints_supported_by, Complaint, TriageSeverity};
use super::gateway::{DistanceProvider, GatewayError, RegionQuery, RegistryGateway};
use super::ledger::BedLedger;
use super::ranking::{coverage, CoverageLevel, RankingPolicy};
use super::resolver::{resolve_capability, CapabilityStatus};
use super::snapshot::{GeoPoint, HospitalCapacitySnapshot, HospitalId};

/// Error raised by the routing facade. Input errors carry the offending
/// value so callers can surface a precise rejection.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("unknown chief complaint code '{code}'")]
    UnknownComplaintCode { code: String },
    #[error("no procedure groups are mapped for complaint '{complaint}'")]
    UndefinedComplaintRoute { complaint: Complaint },
    #[error("severity level {value} outside the KTAS 1-5 range")]
    InvalidSeverity { value: u8 },
    #[error("no reservable bed type resolves for complaint '{complaint}'")]
    NoReservableBedType { complaint: Complaint },
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// One triage routing request after classifier normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageRequest {
    pub severity: TriageSeverity,
    pub complaint: Complaint,
    pub region: RegionQuery,
    #[serde(default)]
    pub home_hospital: Option<HospitalId>,
}

/// What was asked: severity, complaint, and the procedure groups the
/// complaint requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingCase {
    pub severity: TriageSeverity,
    pub complaint: Complaint,
    pub complaint_label: String,
    pub required_groups: Vec<ProcedureGroup>,
    pub required_group_labels: Vec<String>,
}

/// Per-group bed figures exposed for debugging/audit alongside the
/// capability decision that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBedReport {
    pub reported: u32,
    pub effective: u32,
    pub status: CapabilityStatus,
    pub provenance: String,
}

/// One ranked hospital recommendation. Lives only for the duration of a
/// single ranking response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingCandidate {
    pub id: HospitalId,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub emergency_phone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub trauma_center: bool,
    pub group_beds: BTreeMap<ProcedureGroup, GroupBedReport>,
    pub groups_with_beds: Vec<ProcedureGroup>,
    pub supported_complaints: Vec<Complaint>,
    pub total_effective_beds: u32,
    pub coverage_score: f64,
    pub coverage_level: CoverageLevel,
    pub priority_score: f64,
    pub reason_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
}

/// Ordered candidate list for one triage case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingResponse {
    pub followup: Option<HospitalId>,
    pub case: RoutingCase,
    pub hospitals: Vec<RoutingCandidate>,
}

/// Outcome of a reservation or release, echoing the hospital's current
/// pending counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationReceipt {
    pub hospital: HospitalId,
    pub complaint: Complaint,
    pub patients: u32,
    pub bed_type: BedType,
    pub pending: BTreeMap<BedType, u32>,
}

/// Reservations are single-bed-type approximations: one representative
/// pool stands in for the whole complaint. Emergency bay wins when
/// present, then this fixed order, then any remaining type.
const RESERVATION_PRIORITY: [BedType; 8] = [
    BedType::Er,
    BedType::IcuGeneral,
    BedType::IcuNeuro,
    BedType::IcuNeurosurg,
    BedType::IcuNeonatal,
    BedType::WardPsych,
    BedType::Ward,
    BedType::Or,
];

/// Facade composing the registry gateway, the static catalog, the bed
/// ledger, and the ranking policy. Everything past the gateway fetch is
/// synchronous computation over the returned snapshots.
pub struct HospitalRouter<G> {
    gateway: Arc<G>,
    ledger: Arc<BedLedger>,
    catalog: ProcedureCatalog,
    policy: RankingPolicy,
}

impl<G> HospitalRouter<G>
where
    G: RegistryGateway + 'static,
{
    /// Builds the router, validating catalog integrity up front so a
    /// broken static table fails at startup instead of mid-request.
    pub fn new(gateway: Arc<G>, ledger: Arc<BedLedger>) -> Result<Self, CatalogError> {
        Self::with_policy(gateway, ledger, RankingPolicy::default())
    }

    pub fn with_policy(
        gateway: Arc<G>,
        ledger: Arc<BedLedger>,
        policy: RankingPolicy,
    ) -> Result<Self, CatalogError> {
        let catalog = ProcedureCatalog::standard();
        catalog.validate()?;
        Ok(Self {
            gateway,
            ledger,
            catalog,
            policy,
        })
    }

    pub fn ledger(&self) -> &BedLedger {
        &self.ledger
    }

    /// Ranked candidates for a normalized triage request.
    pub fn candidates(&self, request: &TriageRequest) -> Result<RoutingResponse, TriageError> {
        let snapshots = self.gateway.region_snapshots(&request.region)?;
        self.rank_snapshots(
            request.severity,
            request.complaint,
            request.home_hospital.clone(),
            &snapshots,
            Local::now().naive_local(),
        )
    }

    /// Entry point for raw classifier output: validates the severity,
    /// normalizes the chief-complaint code (unknown codes are a hard
    /// rejection), and resolves the follow-up hospital reference before
    /// ranking.
    pub fn route_by_code(
        &self,
        severity: u8,
        chief_complaint: &str,
        followup: Option<&str>,
        region: &RegionQuery,
    ) -> Result<RoutingResponse, TriageError> {
        let severity = TriageSeverity::new(severity)
            .ok_or(TriageError::InvalidSeverity { value: severity })?;
        let complaint = Complaint::from_code(chief_complaint).ok_or_else(|| {
            TriageError::UnknownComplaintCode {
                code: chief_complaint.to_string(),
            }
        })?;

        let snapshots = self.gateway.region_snapshots(region)?;
        let home = followup.and_then(|reference| resolve_followup(&snapshots, reference));
        self.rank_snapshots(severity, complaint, home, &snapshots, Local::now().naive_local())
    }

    /// Pure ranking pass over already-fetched snapshots. Deterministic
    /// given the same snapshots, ledger state, and `now`.
    pub fn rank_snapshots(
        &self,
        severity: TriageSeverity,
        complaint: Complaint,
        home_hospital: Option<HospitalId>,
        snapshots: &[HospitalCapacitySnapshot],
        now: NaiveDateTime,
    ) -> Result<RoutingResponse, TriageError> {
        let required = complaint.required_groups();
        if required.is_empty() {
            return Err(TriageError::UndefinedComplaintRoute { complaint });
        }

        let mut hospitals: Vec<RoutingCandidate> = snapshots
            .iter()
            .filter_map(|snapshot| {
                self.build_candidate(
                    severity,
                    complaint,
                    required,
                    home_hospital.as_ref(),
                    snapshot,
                    now,
                )
            })
            .collect();

        hospitals.sort_by(|a, b| {
            b.priority_score
                .total_cmp(&a.priority_score)
                .then_with(|| b.total_effective_beds.cmp(&a.total_effective_beds))
                .then_with(|| a.id.cmp(&b.id))
        });

        debug!(
            %complaint,
            candidates = hospitals.len(),
            screened = snapshots.len(),
            "ranked routing candidates"
        );

        Ok(RoutingResponse {
            followup: home_hospital,
            case: RoutingCase {
                severity,
                complaint,
                complaint_label: complaint.label().to_string(),
                required_groups: required.to_vec(),
                required_group_labels: required
                    .iter()
                    .map(|group| group.label().to_string())
                    .collect(),
            },
            hospitals,
        })
    }

    fn build_candidate(
        &self,
        severity: TriageSeverity,
        complaint: Complaint,
        required: &[ProcedureGroup],
        home_hospital: Option<&HospitalId>,
        snapshot: &HospitalCapacitySnapshot,
        now: NaiveDateTime,
    ) -> Option<RoutingCandidate> {
        // Hard exclusions before any scoring.
        let location = snapshot.location?;
        if !snapshot.has_emergency_department {
            return None;
        }

        let mut group_beds = BTreeMap::new();
        let mut groups_with_beds = Vec::new();
        for group in required {
            let Some(spec) = self.catalog.spec(*group) else {
                continue;
            };
            let availability = resolve_capability(snapshot, spec, now);
            let beds = group_capacity(snapshot, spec, availability.status, &self.ledger);
            if beds.effective > 0 {
                groups_with_beds.push(*group);
            }
            group_beds.insert(
                *group,
                GroupBedReport {
                    reported: beds.reported,
                    effective: beds.effective,
                    status: availability.status,
                    provenance: availability.provenance.label(),
                },
            );
        }

        if groups_with_beds.is_empty() {
            return None;
        }

        let union = union_capacity(snapshot, &self.catalog, &groups_with_beds, &self.ledger);
        if union.effective == 0 {
            return None;
        }

        let (coverage_score, coverage_level) = coverage(required, &groups_with_beds);
        let is_home = home_hospital.is_some_and(|home| *home == snapshot.id);
        let base_score = self.policy.base_score(union.effective, is_home);
        let priority_score = self
            .policy
            .priority_score(base_score, coverage_level, coverage_score);

        let reason_summary = reason_summary(
            severity,
            complaint,
            &groups_with_beds,
            union.effective,
            coverage_level,
            coverage_score,
        );

        Some(RoutingCandidate {
            id: snapshot.id.clone(),
            name: snapshot.name.clone(),
            address: snapshot.address.clone(),
            phone: snapshot.phone.clone(),
            emergency_phone: snapshot.emergency_phone.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            trauma_center: snapshot.trauma_center,
            group_beds,
            groups_with_beds,
            supported_complaints: complaints_supported_by(snapshot).into_iter().collect(),
            total_effective_beds: union.effective,
            coverage_score,
            coverage_level,
            priority_score,
            reason_summary,
            distance_km: None,
            duration_secs: None,
        })
    }

    /// Records `patients` pending arrivals against the complaint's
    /// representative bed type. Not bounds-checked against reported
    /// capacity; see the ledger notes on overcommit.
    pub fn reserve(
        &self,
        hospital: &HospitalId,
        complaint: Complaint,
        patients: u32,
    ) -> Result<ReservationReceipt, TriageError> {
        let bed_type = self.representative_bed_type(complaint)?;
        self.ledger.reserve(hospital, bed_type, patients);
        info!(%hospital, %complaint, patients, bed_type = %bed_type, "reserved pending beds");
        Ok(ReservationReceipt {
            hospital: hospital.clone(),
            complaint,
            patients,
            bed_type,
            pending: self.ledger.pending_by_type(hospital),
        })
    }

    /// Returns previously reserved beds, clamped so the pending counter
    /// never goes negative.
    pub fn release(
        &self,
        hospital: &HospitalId,
        complaint: Complaint,
        patients: u32,
    ) -> Result<ReservationReceipt, TriageError> {
        let bed_type = self.representative_bed_type(complaint)?;
        self.ledger.release(hospital, bed_type, patients);
        info!(%hospital, %complaint, patients, bed_type = %bed_type, "released pending beds");
        Ok(ReservationReceipt {
            hospital: hospital.clone(),
            complaint,
            patients,
            bed_type,
            pending: self.ledger.pending_by_type(hospital),
        })
    }

    fn representative_bed_type(&self, complaint: Complaint) -> Result<BedType, TriageError> {
        let groups = complaint.required_groups();
        if groups.is_empty() {
            return Err(TriageError::UndefinedComplaintRoute { complaint });
        }

        let mut bed_types: BTreeSet<BedType> = BTreeSet::new();
        for group in groups {
            bed_types.extend(self.catalog.bed_types_for(*group).iter().copied());
        }

        for candidate in RESERVATION_PRIORITY {
            if bed_types.contains(&candidate) {
                return Ok(candidate);
            }
        }
        bed_types
            .into_iter()
            .next()
            .ok_or(TriageError::NoReservableBedType { complaint })
    }

    /// Keeps only the `limit` closest candidates, annotated with the geo
    /// provider's distance and travel time. Relative priority order
    /// among the survivors is preserved.
    pub fn shortlist_nearest<D>(
        &self,
        mut response: RoutingResponse,
        provider: &D,
        origin: GeoPoint,
        limit: usize,
    ) -> Result<RoutingResponse, TriageError>
    where
        D: DistanceProvider,
    {
        let positions: Vec<(HospitalId, GeoPoint)> = response
            .hospitals
            .iter()
            .map(|candidate| {
                (
                    candidate.id.clone(),
                    GeoPoint {
                        latitude: candidate.latitude,
                        longitude: candidate.longitude,
                    },
                )
            })
            .collect();

        let mut estimates = provider.estimates(origin, &positions)?;
        estimates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        estimates.truncate(limit);

        let by_id: BTreeMap<HospitalId, (f64, u32)> = estimates
            .into_iter()
            .map(|estimate| {
                (
                    estimate.hospital,
                    (estimate.distance_km, estimate.duration_secs),
                )
            })
            .collect();

        response.hospitals.retain_mut(|candidate| {
            if let Some((distance_km, duration_secs)) = by_id.get(&candidate.id) {
                candidate.distance_km = Some(*distance_km);
                candidate.duration_secs = Some(*duration_secs);
                true
            } else {
                false
            }
        });

        Ok(response)
    }
}

/// Resolves the follow-up hospital reference handed over by the triage
/// classifier: a facility-code-shaped string (`A` + digits) is used
/// verbatim, anything else is matched against hospital names ignoring
/// whitespace.
fn resolve_followup(
    snapshots: &[HospitalCapacitySnapshot],
    reference: &str,
) -> Option<HospitalId> {
    let text = reference.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(rest) = text.strip_prefix('A') {
        if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
            return Some(HospitalId(text.to_string()));
        }
    }

    let target: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    snapshots
        .iter()
        .find(|snapshot| {
            let name: String = snapshot
                .name
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            name.contains(&target)
        })
        .map(|snapshot| snapshot.id.clone())
}

fn reason_summary(
    severity: TriageSeverity,
    complaint: Complaint,
    groups_with_beds: &[ProcedureGroup],
    total_effective_beds: u32,
    coverage_level: CoverageLevel,
    coverage_score: f64,
) -> String {
    let groups_text = groups_with_beds
        .iter()
        .map(|group| group.label())
        .collect::<Vec<_>>()
        .join(", ");
    let coverage_pct = (coverage_score * 100.0).round() as u32;

    format!(
        "KTAS {severity}, chief complaint '{}': {total_effective_beds} effective beds \
         remain across {groups_text} ({}; ~{coverage_pct}% of required procedures covered)",
        complaint.label(),
        coverage_level.label(),
    )
}
