use serde::{Deserialize, Serialize};
use std::fmt;

use rentmatch_core::{Money, RentCallCandidate, TransactionData};

use crate::config::MatchingConfig;
use crate::score::{basis_points, ScoreBreakdown};

/// Coarse bucket of a match score. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64, config: &MatchingConfig) -> Self {
        let score = basis_points(score);
        if score >= basis_points(config.high_threshold) {
            ConfidenceLevel::High
        } else if score >= basis_points(config.medium_threshold) {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::Low => write!(f, "low"),
            ConfidenceLevel::Medium => write!(f, "medium"),
            ConfidenceLevel::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for ConfidenceLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(ConfidenceLevel::Low),
            "medium" => Ok(ConfidenceLevel::Medium),
            "high" => Ok(ConfidenceLevel::High),
            other => Err(format!("Unknown confidence level: '{other}'")),
        }
    }
}

/// A transaction bound to the one rent call it most likely pays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchProposal {
    pub transaction: TransactionData,
    pub rent_call: RentCallCandidate,
    pub score: f64,
    pub confidence: ConfidenceLevel,
    pub breakdown: ScoreBreakdown,
    /// Paid minus due: negative for a partial payment, positive for an overpayment.
    pub difference_cents: i64,
}

/// One of the near-tied rent calls of an ambiguous transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub rent_call: RentCallCandidate,
    pub score: f64,
    pub confidence: ConfidenceLevel,
    pub breakdown: ScoreBreakdown,
    pub difference_cents: i64,
}

/// A transaction that fits several rent calls too closely to pick one.
/// `candidates` is ranked best first; an operator chooses among them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbiguousMatch {
    pub transaction: TransactionData,
    pub candidates: Vec<RankedCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedTransaction {
    pub transaction: TransactionData,
    /// Best score among rent calls within amount tolerance, if there were any.
    pub best_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingSummary {
    pub matched: usize,
    pub unmatched: usize,
    pub ambiguous: usize,
    pub rent_call_count: usize,
}

impl MatchingSummary {
    pub fn transaction_count(&self) -> usize {
        self.matched + self.unmatched + self.ambiguous
    }
}

impl fmt::Display for MatchingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} matched, {} ambiguous, {} unmatched out of {} transaction(s) against {} rent call(s)",
            self.matched,
            self.ambiguous,
            self.unmatched,
            self.transaction_count(),
            self.rent_call_count
        )
    }
}

/// Classification of every transaction of a run. Each transaction lands in
/// exactly one bucket; buckets keep input order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingResult {
    pub matches: Vec<MatchProposal>,
    pub ambiguous: Vec<AmbiguousMatch>,
    pub unmatched: Vec<UnmatchedTransaction>,
    pub rent_call_count: usize,
}

impl MatchingResult {
    pub fn summary(&self) -> MatchingSummary {
        MatchingSummary {
            matched: self.matches.len(),
            unmatched: self.unmatched.len(),
            ambiguous: self.ambiguous.len(),
            rent_call_count: self.rent_call_count,
        }
    }

    /// Proposals at or above `level`, for pre-selection in a review screen.
    /// Every proposal still needs an explicit confirmation.
    pub fn proposals_at_least(&self, level: ConfidenceLevel) -> impl Iterator<Item = &MatchProposal> {
        self.matches.iter().filter(move |m| m.confidence >= level)
    }

    pub fn is_fully_matched(&self) -> bool {
        self.ambiguous.is_empty() && self.unmatched.is_empty()
    }

    /// Sum of the transaction amounts of all proposals.
    pub fn matched_total(&self) -> Money {
        self.matches.iter().map(|m| m.transaction.amount()).sum()
    }

    /// Every transaction id of the run, in bucket order.
    pub fn transaction_ids(&self) -> impl Iterator<Item = &str> {
        self.matches
            .iter()
            .map(|m| m.transaction.id.as_str())
            .chain(self.ambiguous.iter().map(|a| a.transaction.id.as_str()))
            .chain(self.unmatched.iter().map(|u| u.transaction.id.as_str()))
    }
}
