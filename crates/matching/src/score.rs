use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

use rentmatch_core::{BillingMonth, RentCallCandidate, TransactionData};

use crate::config::{ConfigError, MatchingConfig};
use crate::index::IndexedCandidate;
use crate::util::{fold, jaccard, longest_common_run, payer_tokens, token_chars, word_tokens};

/// Reference sub-score when only part of an identifier shows up.
const PARTIAL_REFERENCE_FACTOR: f64 = 0.5;
/// Reference sub-score when the reference names the billing month.
const MONTH_MENTION_SCORE: f64 = 0.3;
/// Shortest common run worth crediting as a partial identifier hit.
const MIN_PARTIAL_RUN: usize = 3;

const MONTH_NAMES: &[(&str, u32)] = &[
    ("janvier", 1),
    ("january", 1),
    ("jan", 1),
    ("fevrier", 2),
    ("february", 2),
    ("fev", 2),
    ("feb", 2),
    ("mars", 3),
    ("march", 3),
    ("mar", 3),
    ("avril", 4),
    ("april", 4),
    ("avr", 4),
    ("apr", 4),
    ("mai", 5),
    ("may", 5),
    ("juin", 6),
    ("june", 6),
    ("juillet", 7),
    ("july", 7),
    ("juil", 7),
    ("aout", 8),
    ("august", 8),
    ("aug", 8),
    ("septembre", 9),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("octobre", 10),
    ("october", 10),
    ("oct", 10),
    ("novembre", 11),
    ("november", 11),
    ("nov", 11),
    ("decembre", 12),
    ("december", 12),
    ("dec", 12),
];

/// `2025-03`, `03/2025`, `mars 2025`, `202503`. Numbers must be joined by
/// `-`, `/` or `.` so "APT 12 2025" is not read as December.
fn month_mention_pattern() -> Option<&'static Regex> {
    static R: OnceLock<Option<Regex>> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(concat!(
            r"\b(?:(\d{4})[-/.](\d{1,2})|(\d{1,2})[-/.](\d{4})",
            r"|(janvier|january|jan|fevrier|february|fev|feb|mars|march|mar|avril|april|avr|apr",
            r"|mai|may|juin|june|juillet|july|juil|aout|august|aug|septembre|september|sept|sep",
            r"|octobre|october|oct|novembre|november|nov|decembre|december|dec)[\s./-]*(\d{4})",
            r"|(\d{6}))\b",
        ))
        .ok()
    })
    .as_ref()
}

/// Raw sub-scores of one transaction/rent-call pair, each in [0, 1] before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub amount: f64,
    pub reference: f64,
    pub name: f64,
    pub recency: f64,
}

impl ScoreBreakdown {
    /// Whether the amount is within tolerance. Nothing else can make up for a
    /// wrong amount.
    pub fn passes_amount_gate(&self) -> bool {
        self.amount > 0.0
    }
}

/// Outcome of scoring one candidate against one transaction.
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate {
    pub position: usize,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Per-transaction derived fields, computed once and reused for every candidate.
#[derive(Debug, Clone)]
pub struct TransactionProfile<'a> {
    pub transaction: &'a TransactionData,
    pub month: BillingMonth,
    pub payer_tokens: Option<BTreeSet<String>>,
    /// Word tokens of the reference; empty when there is none.
    pub reference_tokens: Vec<String>,
    pub month_mentions: Vec<BillingMonth>,
}

/// Scores transaction/rent-call pairs. `Default` carries the canonical configuration.
#[derive(Default)]
pub struct Scorer {
    config: MatchingConfig,
}

impl Scorer {
    pub fn new(config: MatchingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub fn profile<'a>(&self, transaction: &'a TransactionData) -> TransactionProfile<'a> {
        let reference = transaction.reference_text();
        TransactionProfile {
            transaction,
            month: transaction.billing_month(),
            payer_tokens: transaction
                .payer()
                .map(payer_tokens)
                .filter(|tokens| !tokens.is_empty()),
            reference_tokens: reference.map(word_tokens).unwrap_or_default(),
            month_mentions: reference.map(month_mentions).unwrap_or_default(),
        }
    }

    /// Weighted sum of the four signals, clamped to [0, 1] and rounded to four
    /// decimals so identical inputs always tie exactly.
    pub fn score(&self, profile: &TransactionProfile<'_>, candidate: &IndexedCandidate<'_>) -> ScoredCandidate {
        let c = &self.config;
        let breakdown = ScoreBreakdown {
            amount: self.amount_score(profile.transaction, candidate.rent_call),
            reference: self.reference_score(profile, candidate),
            name: self.name_score(profile, candidate),
            recency: recency_score(profile.month.months_since(candidate.rent_call.month)),
        };

        let raw = breakdown.amount * c.amount_weight
            + breakdown.reference * c.reference_weight
            + breakdown.name * c.name_weight
            + breakdown.recency * c.recency_weight;

        ScoredCandidate {
            position: candidate.position,
            score: round_score(raw.clamp(0.0, 1.0)),
            breakdown,
        }
    }

    fn amount_score(&self, tx: &TransactionData, rent_call: &RentCallCandidate) -> f64 {
        let due = rent_call.amount_due();
        if !tx.is_credit() {
            return 0.0;
        }
        if tx.amount() == due {
            return 1.0;
        }
        if due.is_zero() {
            return 0.0;
        }

        let c = &self.config;
        let ratio = (tx.amount() - due).abs().cents() as f64 / due.abs().cents() as f64;
        if c.amount_tolerance_ratio <= 0.0 || ratio > c.amount_tolerance_ratio {
            return 0.0;
        }
        let decay = ratio / c.amount_tolerance_ratio;
        c.partial_amount_ceiling - (c.partial_amount_ceiling - c.partial_amount_floor) * decay
    }

    fn reference_score(&self, profile: &TransactionProfile<'_>, candidate: &IndexedCandidate<'_>) -> f64 {
        let reference = profile.reference_tokens.as_slice();
        if reference.is_empty() {
            return 0.0;
        }

        let mut partial: f64 = 0.0;
        for id in &candidate.identifiers {
            let len = token_chars(id);
            let run = longest_common_run(reference, id);
            if run == len {
                return 1.0;
            }
            let ratio = run as f64 / len as f64;
            if run >= MIN_PARTIAL_RUN && ratio >= 0.5 {
                partial = partial.max(PARTIAL_REFERENCE_FACTOR * ratio);
            }
        }

        let month = if profile.month_mentions.contains(&candidate.rent_call.month) {
            MONTH_MENTION_SCORE
        } else {
            0.0
        };

        partial.max(month)
    }

    fn name_score(&self, profile: &TransactionProfile<'_>, candidate: &IndexedCandidate<'_>) -> f64 {
        match &profile.payer_tokens {
            Some(payer) => jaccard(payer, &candidate.name_tokens),
            None => self.config.neutral_name_score,
        }
    }
}

/// Billing months a free-text reference talks about.
fn month_mentions(reference: &str) -> Vec<BillingMonth> {
    let Some(pattern) = month_mention_pattern() else {
        return Vec::new();
    };
    let folded = fold(reference);

    let mut mentions: Vec<BillingMonth> = pattern
        .captures_iter(&folded)
        .filter_map(|caps| {
            let group = |i: usize| caps.get(i).map(|m| m.as_str());
            if let (Some(year), Some(month)) = (group(1), group(2)) {
                return year_month(year, month);
            }
            if let (Some(month), Some(year)) = (group(3), group(4)) {
                return year_month(year, month);
            }
            if let (Some(name), Some(year)) = (group(5), group(6)) {
                return year_month(year, name);
            }
            let digits = group(7)?;
            let (head, tail) = digits.split_at(4);
            let (front, back) = digits.split_at(2);
            year_month(head, tail).or_else(|| year_month(back, front))
        })
        .collect();
    mentions.sort();
    mentions.dedup();
    mentions
}

/// Interpret `year` as a four-digit year and `month` as a month number or name.
fn year_month(year: &str, month: &str) -> Option<BillingMonth> {
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month = if month.bytes().all(|b| b.is_ascii_digit()) {
        if month.len() > 2 {
            return None;
        }
        month.parse().ok()?
    } else {
        MONTH_NAMES.iter().find(|(name, _)| *name == month).map(|(_, n)| *n)?
    };
    BillingMonth::new(year, month)
}

/// Months between the transaction's month and the rent call's month.
/// Positive means the rent call is older.
fn recency_score(months_since: i32) -> f64 {
    match months_since {
        0 => 1.0,
        1 => 0.8,
        -1 => 0.5,
        2 => 0.4,
        3..=5 => 0.2,
        _ => 0.0,
    }
}

pub(crate) fn round_score(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

/// Score in integer basis points, for exact threshold and margin comparisons.
pub(crate) fn basis_points(score: f64) -> i64 {
    (score * 10_000.0).round() as i64
}
