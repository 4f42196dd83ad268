//! Symptom catalog
//!
//! Immutable reference data built once at startup and shared by reference:
//! - Lookups by id and by name substring
//! - Recommendation resolution for a reported pain level

mod data;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RomiError};

/// Lowest and highest pain levels a patient can report.
pub const PAIN_SCALE: (i64, i64) = (1, 10);

/// Inclusive `[min, max]` pain range; serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PainRange(pub i64, pub i64);

impl PainRange {
    pub fn min(&self) -> i64 {
        self.0
    }

    pub fn max(&self) -> i64 {
        self.1
    }

    pub fn contains(&self, level: i64) -> bool {
        level >= self.0 && level <= self.1
    }
}

/// One pain-level tier of a symptom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionTier {
    pub pain_level: PainRange,
    pub recommendations: Vec<String>,
    pub alert: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    pub id: i64,
    pub name: String,
    pub categories: Vec<String>,
    pub solutions: Vec<SolutionTier>,
}

/// The tier picked for a reported pain level.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    pub symptom: &'a Symptom,
    pub tier: &'a SolutionTier,
}

impl<'a> Resolution<'a> {
    pub fn recommendations(&self) -> &'a [String] {
        &self.tier.recommendations
    }

    pub fn alert(&self) -> bool {
        self.tier.alert
    }
}

/// Structural problem found in a symptom's tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverageIssue {
    EmptyRange { symptom_id: i64, range: PainRange },
    OutOfOrder { symptom_id: i64, previous: PainRange, next: PainRange },
    Uncovered { symptom_id: i64, levels: Vec<i64> },
}

#[derive(Debug, Clone)]
pub struct SymptomCatalog {
    symptoms: Vec<Symptom>,
}

impl SymptomCatalog {
    pub fn new(symptoms: Vec<Symptom>) -> Self {
        SymptomCatalog { symptoms }
    }

    /// The ten symptoms the service ships with.
    pub fn builtin() -> Self {
        SymptomCatalog::new(data::builtin_symptoms())
    }

    pub fn all(&self) -> &[Symptom] {
        &self.symptoms
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    pub fn get(&self, id: i64) -> Result<&Symptom> {
        self.symptoms
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(RomiError::symptom_not_found)
    }

    /// Case-insensitive substring match on the symptom name.
    ///
    /// An empty term is invalid input; a term matching nothing is not found.
    pub fn search(&self, term: &str) -> Result<Vec<&Symptom>> {
        if term.is_empty() {
            return Err(RomiError::missing_search_term());
        }

        let needle = term.to_lowercase();
        let matches: Vec<&Symptom> = self
            .symptoms
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .collect();

        if matches.is_empty() {
            return Err(RomiError::no_search_matches());
        }
        Ok(matches)
    }

    /// Pick the first tier, in catalog order, whose range contains `pain_level`.
    pub fn resolve(&self, symptom_id: i64, pain_level: i64) -> Result<Resolution<'_>> {
        let symptom = self.get(symptom_id)?;
        symptom
            .solutions
            .iter()
            .find(|tier| tier.pain_level.contains(pain_level))
            .map(|tier| Resolution { symptom, tier })
            .ok_or(RomiError::InvalidRange { symptom_id, pain_level })
    }

    /// Tier problems that would make some pain levels unresolvable.
    pub fn coverage_issues(&self) -> Vec<CoverageIssue> {
        let mut issues = Vec::new();

        for symptom in &self.symptoms {
            for tier in &symptom.solutions {
                if tier.pain_level.min() > tier.pain_level.max() {
                    issues.push(CoverageIssue::EmptyRange {
                        symptom_id: symptom.id,
                        range: tier.pain_level,
                    });
                }
            }

            for pair in symptom.solutions.windows(2) {
                let (previous, next) = (pair[0].pain_level, pair[1].pain_level);
                if next.min() <= previous.max() {
                    issues.push(CoverageIssue::OutOfOrder {
                        symptom_id: symptom.id,
                        previous,
                        next,
                    });
                }
            }

            let levels: Vec<i64> = (PAIN_SCALE.0..=PAIN_SCALE.1)
                .filter(|level| !symptom.solutions.iter().any(|t| t.pain_level.contains(*level)))
                .collect();
            if !levels.is_empty() {
                issues.push(CoverageIssue::Uncovered { symptom_id: symptom.id, levels });
            }
        }

        issues
    }
}
