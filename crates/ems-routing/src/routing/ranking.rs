use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::catalog::ProcedureGroup;

/// Bucketed share of a complaint's required procedure groups a hospital
/// can currently deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageLevel {
    Full,
    High,
    Medium,
    Low,
    None,
}

impl CoverageLevel {
    pub fn from_score(score: f64) -> Self {
        if score <= 0.0 {
            CoverageLevel::None
        } else if score >= 1.0 {
            CoverageLevel::Full
        } else if score >= 0.75 {
            CoverageLevel::High
        } else if score >= 0.5 {
            CoverageLevel::Medium
        } else {
            CoverageLevel::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CoverageLevel::Full => "covers all required procedures",
            CoverageLevel::High => "covers most core procedures",
            CoverageLevel::Medium => "covers some core procedures",
            CoverageLevel::Low => "covers only a few required procedures",
            CoverageLevel::None => "no directly matching procedures",
        }
    }
}

/// Fraction of required groups with positive effective capacity, over
/// the deduplicated required set, plus the bucketed level. Callers
/// guarantee `required` is non-empty (an undefined complaint route is
/// rejected before scoring).
pub fn coverage(
    required: &[ProcedureGroup],
    groups_with_beds: &[ProcedureGroup],
) -> (f64, CoverageLevel) {
    let required_set: BTreeSet<ProcedureGroup> = required.iter().copied().collect();
    if required_set.is_empty() {
        return (0.0, CoverageLevel::None);
    }

    let covered: BTreeSet<ProcedureGroup> = groups_with_beds
        .iter()
        .copied()
        .filter(|group| required_set.contains(group))
        .collect();
    let score = covered.len() as f64 / required_set.len() as f64;
    (score, CoverageLevel::from_score(score))
}

/// Tunable priority weighting. All magic numbers for the ranking formula
/// live here; the clamp bounds keep the coverage fine-tune from crossing
/// bucket boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingPolicy {
    /// Flat bonus added to the base score when the candidate matches the
    /// patient's designated home/follow-up hospital.
    pub home_hospital_bonus: f64,
    pub full_weight: f64,
    pub high_weight: f64,
    pub medium_weight: f64,
    pub low_weight: f64,
    pub none_weight: f64,
    /// Raw coverage score around which the fine-tune pivots.
    pub pivot_score: f64,
    /// Maximum fine-tune movement in either direction.
    pub tune_span: f64,
    /// Final weight clamp range.
    pub weight_floor: f64,
    pub weight_ceiling: f64,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            home_hospital_bonus: 100.0,
            full_weight: 1.00,
            high_weight: 0.95,
            medium_weight: 0.90,
            low_weight: 0.80,
            none_weight: 0.70,
            pivot_score: 0.7,
            tune_span: 0.05,
            weight_floor: 0.5,
            weight_ceiling: 1.1,
        }
    }
}

impl RankingPolicy {
    pub fn level_weight(&self, level: CoverageLevel) -> f64 {
        match level {
            CoverageLevel::Full => self.full_weight,
            CoverageLevel::High => self.high_weight,
            CoverageLevel::Medium => self.medium_weight,
            CoverageLevel::Low => self.low_weight,
            CoverageLevel::None => self.none_weight,
        }
    }

    pub fn base_score(&self, total_effective_beds: u32, is_home: bool) -> f64 {
        let bonus = if is_home { self.home_hospital_bonus } else { 0.0 };
        f64::from(total_effective_beds) + bonus
    }

    /// Weighted priority, rounded to one decimal. The level weight is
    /// fine-tuned by up to `tune_span` proportional to how far the raw
    /// coverage score sits from `pivot_score`, then clamped.
    pub fn priority_score(
        &self,
        base_score: f64,
        level: CoverageLevel,
        coverage_score: f64,
    ) -> f64 {
        let tune = (0.1 * (coverage_score - self.pivot_score)).clamp(-self.tune_span, self.tune_span);
        let weight =
            (self.level_weight(level) + tune).clamp(self.weight_floor, self.weight_ceiling);
        (base_score * weight * 10.0).round() / 10.0
    }
}
