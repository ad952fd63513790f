use rentmatch_core::{validate_inputs, RentCallCandidate, TransactionData, ValidationError};

use crate::config::{ConfigError, MatchingConfig};
use crate::index::CandidateIndex;
use crate::result::{
    AmbiguousMatch, ConfidenceLevel, MatchProposal, MatchingResult, RankedCandidate,
    UnmatchedTransaction,
};
use crate::score::{basis_points, ScoredCandidate, Scorer};

/// Where one transaction ends up.
enum Outcome {
    Matched(ScoredCandidate),
    Ambiguous(Vec<ScoredCandidate>),
    Unmatched(Option<f64>),
}

/// Pairs imported bank transactions with open rent calls.
///
/// Holds no state between runs: `match_transactions` is a pure function of its
/// two inputs, and a single matcher can be shared across threads.
#[derive(Default)]
pub struct PaymentMatcher {
    scorer: Scorer,
}

impl PaymentMatcher {
    pub fn new(config: MatchingConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            scorer: Scorer::new(config)?,
        })
    }

    pub fn config(&self) -> &MatchingConfig {
        self.scorer.config()
    }

    /// Classify every transaction as matched, ambiguous or unmatched.
    ///
    /// Input problems are reported all at once before any scoring; there is no
    /// partial result.
    pub fn match_transactions(
        &self,
        transactions: &[TransactionData],
        candidates: &[RentCallCandidate],
    ) -> Result<MatchingResult, ValidationError> {
        if let Err(e) = validate_inputs(transactions, candidates) {
            tracing::warn!("Matching run rejected: {e}");
            return Err(e);
        }
        let index = CandidateIndex::build(candidates)?;

        let mut result = MatchingResult {
            rent_call_count: index.len(),
            ..MatchingResult::default()
        };

        for tx in transactions {
            match self.classify(tx, &index) {
                Outcome::Matched(best) => {
                    let rent_call = index.all()[best.position].rent_call;
                    tracing::debug!(
                        "Transaction {} matched rent call {} (score {:.4})",
                        tx.id,
                        rent_call.id,
                        best.score
                    );
                    result.matches.push(MatchProposal {
                        transaction: tx.clone(),
                        rent_call: rent_call.clone(),
                        score: best.score,
                        confidence: ConfidenceLevel::from_score(best.score, self.config()),
                        breakdown: best.breakdown,
                        difference_cents: (tx.amount() - rent_call.amount_due()).cents(),
                    });
                }
                Outcome::Ambiguous(contenders) => {
                    tracing::debug!(
                        "Transaction {} is ambiguous between {} rent calls",
                        tx.id,
                        contenders.len()
                    );
                    let candidates = contenders
                        .into_iter()
                        .map(|scored| {
                            let rent_call = index.all()[scored.position].rent_call;
                            RankedCandidate {
                                rent_call: rent_call.clone(),
                                score: scored.score,
                                confidence: ConfidenceLevel::from_score(scored.score, self.config()),
                                breakdown: scored.breakdown,
                                difference_cents: (tx.amount() - rent_call.amount_due()).cents(),
                            }
                        })
                        .collect();
                    result.ambiguous.push(AmbiguousMatch {
                        transaction: tx.clone(),
                        candidates,
                    });
                }
                Outcome::Unmatched(best_score) => {
                    tracing::debug!("Transaction {} left unmatched (best score {:?})", tx.id, best_score);
                    result.unmatched.push(UnmatchedTransaction {
                        transaction: tx.clone(),
                        best_score,
                    });
                }
            }
        }

        tracing::info!("Payment matching finished: {}", result.summary());
        Ok(result)
    }

    fn classify(&self, tx: &TransactionData, index: &CandidateIndex<'_>) -> Outcome {
        let config = self.config();
        let profile = self.scorer.profile(tx);

        // Candidates outside the amount tolerance are never proposed.
        let mut ranked: Vec<ScoredCandidate> = index
            .all()
            .iter()
            .map(|candidate| self.scorer.score(&profile, candidate))
            .filter(|scored| scored.breakdown.passes_amount_gate())
            .collect();
        ranked.sort_by(|a, b| {
            basis_points(b.score)
                .cmp(&basis_points(a.score))
                .then_with(|| a.position.cmp(&b.position))
        });

        let Some(best) = ranked.first().copied() else {
            return Outcome::Unmatched(None);
        };
        let best_bp = basis_points(best.score);
        if best_bp < basis_points(config.min_accept_threshold) {
            return Outcome::Unmatched(Some(best.score));
        }

        let margin_bp = basis_points(config.ambiguity_margin);
        let too_close = |scored: &ScoredCandidate| {
            let bp = basis_points(scored.score);
            bp == best_bp || best_bp - bp < margin_bp
        };

        if ranked.get(1).is_some_and(|second| too_close(second)) {
            Outcome::Ambiguous(ranked.into_iter().take_while(|s| too_close(s)).collect())
        } else {
            Outcome::Matched(best)
        }
    }
}

/// Run one matching pass with the default configuration.
pub fn match_payments(
    transactions: &[TransactionData],
    candidates: &[RentCallCandidate],
) -> Result<MatchingResult, ValidationError> {
    PaymentMatcher::default().match_transactions(transactions, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rentmatch_core::{BillingMonth, ValidationIssue};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(y: i32, m: u32) -> BillingMonth {
        BillingMonth::new(y, m).unwrap()
    }

    fn tx(id: &str, amount: i64) -> TransactionData {
        TransactionData::new(id, date(2025, 3, 5), amount)
    }

    fn rc(id: &str, first: &str, last: &str, amount: i64, m: BillingMonth) -> RentCallCandidate {
        RentCallCandidate::for_person(id, first, last, &format!("UNIT-{id}"), &format!("LEASE-{id}"), amount, m)
    }

    #[test]
    fn clear_winner_is_matched() {
        let txs = vec![tx("t1", 85_000).with_payer("Jean Dupont")];
        let rcs = vec![
            rc("a", "Jean", "Dupont", 85_000, month(2025, 3)),
            rc("b", "Paul", "Roux", 86_000, month(2025, 3)),
        ];
        let result = match_payments(&txs, &rcs).unwrap();
        assert_eq!(result.matches.len(), 1);
        let m = &result.matches[0];
        assert_eq!(m.rent_call.id, "a");
        assert_eq!(m.score, 0.8);
        assert_eq!(m.confidence, ConfidenceLevel::High);
        assert_eq!(m.difference_cents, 0);
    }

    #[test]
    fn wide_gap_is_not_ambiguous() {
        // 0.80 against 0.70.
        let txs = vec![tx("t1", 85_000).with_payer("Jean Dupont")];
        let rcs = vec![
            rc("a", "Jean", "Dupont", 85_000, month(2025, 3)),
            rc("b", "Jeanne", "Dupont", 85_000, month(2025, 3)),
        ];
        let result = match_payments(&txs, &rcs).unwrap();
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].rent_call.id, "a");
    }

    #[test]
    fn gap_equal_to_margin_is_not_ambiguous() {
        let txs = vec![tx("t1", 85_000).with_payer("Jean Dupont")];
        let rcs = vec![
            rc("a", "Jean", "Dupont", 85_000, month(2025, 3)),
            rc("b", "Jeanne", "Dupont", 85_000, month(2025, 3)),
        ];
        let with_margin = |margin: f64| {
            PaymentMatcher::new(MatchingConfig {
                ambiguity_margin: margin,
                ..MatchingConfig::default()
            })
            .unwrap()
            .match_transactions(&txs, &rcs)
            .unwrap()
        };
        assert_eq!(with_margin(0.10).matches.len(), 1);
        assert_eq!(with_margin(0.11).ambiguous.len(), 1);
    }

    #[test]
    fn near_tie_is_ambiguous_and_ranked() {
        // Same tenant, current month (0.80) and previous month (0.78).
        let txs = vec![tx("t1", 85_000).with_payer("Jean Dupont")];
        let rcs = vec![
            rc("feb", "Jean", "Dupont", 85_000, month(2025, 2)),
            rc("mar", "Jean", "Dupont", 85_000, month(2025, 3)),
        ];
        let result = match_payments(&txs, &rcs).unwrap();
        assert!(result.matches.is_empty());
        let ambiguous = &result.ambiguous[0];
        let ranked: Vec<(&str, f64)> = ambiguous
            .candidates
            .iter()
            .map(|c| (c.rent_call.id.as_str(), c.score))
            .collect();
        assert_eq!(ranked, vec![("mar", 0.8), ("feb", 0.78)]);
    }

    #[test]
    fn exact_tie_keeps_input_order() {
        let txs = vec![tx("t1", 50_000)];
        let rcs = vec![
            rc("second", "Anne", "Roy", 50_000, month(2025, 3)),
            rc("first", "Luc", "Roy", 50_000, month(2025, 3)),
        ];
        let result = match_payments(&txs, &rcs).unwrap();
        let ids: Vec<&str> = result.ambiguous[0]
            .candidates
            .iter()
            .map(|c| c.rent_call.id.as_str())
            .collect();
        assert_eq!(ids, vec!["second", "first"]);
    }

    #[test]
    fn exact_tie_is_ambiguous_even_without_margin() {
        let matcher = PaymentMatcher::new(MatchingConfig {
            ambiguity_margin: 0.0,
            ..MatchingConfig::default()
        })
        .unwrap();
        let txs = vec![tx("t1", 50_000)];
        let rcs = vec![
            rc("a", "Anne", "Roy", 50_000, month(2025, 3)),
            rc("b", "Luc", "Roy", 50_000, month(2025, 3)),
            rc("c", "Eve", "Roy", 50_000, month(2025, 2)),
        ];
        let result = matcher.match_transactions(&txs, &rcs).unwrap();
        assert_eq!(result.ambiguous.len(), 1);
        assert_eq!(result.ambiguous[0].candidates.len(), 2);
    }

    #[test]
    fn ambiguous_list_excludes_distant_candidates() {
        let txs = vec![tx("t1", 50_000)];
        let rcs = vec![
            rc("a", "Anne", "Roy", 50_000, month(2025, 3)),
            rc("b", "Luc", "Roy", 50_000, month(2025, 3)),
            rc("old", "Eve", "Roy", 50_000, month(2024, 6)),
        ];
        let result = match_payments(&txs, &rcs).unwrap();
        assert_eq!(result.ambiguous[0].candidates.len(), 2);
    }

    #[test]
    fn low_confidence_match_is_still_a_proposal() {
        // Right amount, wrong name, no reference, stale bill: 0.55.
        let txs = vec![tx("t1", 85_000).with_payer("Bob Smith")];
        let rcs = vec![rc("a", "Jean", "Dupont", 85_000, month(2024, 1))];
        let result = match_payments(&txs, &rcs).unwrap();
        assert_eq!(result.matches[0].score, 0.55);
        assert_eq!(result.matches[0].confidence, ConfidenceLevel::Low);
    }

    #[test]
    fn below_acceptance_is_unmatched_with_best_score() {
        // 1 % short (amount 0.62), wrong name, current month: 0.441.
        let txs = vec![tx("t1", 99_000).with_payer("Bob Smith")];
        let rcs = vec![rc("a", "Jean", "Dupont", 100_000, month(2025, 3))];
        let result = match_payments(&txs, &rcs).unwrap();
        assert!(result.matches.is_empty());
        assert_eq!(result.unmatched[0].best_score, Some(0.441));
    }

    #[test]
    fn partial_payment_reports_difference() {
        let txs = vec![tx("t1", 97_000)
            .with_payer("Jean Dupont")
            .with_reference("loyer UNIT-a")];
        let rcs = vec![rc("a", "Jean", "Dupont", 100_000, month(2025, 3))];
        let result = match_payments(&txs, &rcs).unwrap();
        let m = &result.matches[0];
        assert_eq!(m.difference_cents, -3_000);
        assert_eq!(m.score, 0.703);
        assert_eq!(m.confidence, ConfidenceLevel::Medium);
    }

    #[test]
    fn missing_name_does_not_block_high_confidence() {
        // Exact amount and reference, stale month, no payer: 0.825.
        let txs = vec![tx("t1", 85_000).with_reference("VIR LEASE-a")];
        let rcs = vec![rc("a", "Jean", "Dupont", 85_000, month(2024, 6))];
        let result = match_payments(&txs, &rcs).unwrap();
        assert_eq!(result.matches[0].score, 0.825);
        assert_eq!(result.matches[0].confidence, ConfidenceLevel::High);
    }

    #[test]
    fn rent_call_may_back_several_transactions() {
        let txs = vec![
            tx("t1", 85_000).with_payer("Jean Dupont"),
            tx("t2", 85_000).with_payer("Jean Dupont"),
        ];
        let rcs = vec![rc("a", "Jean", "Dupont", 85_000, month(2025, 3))];
        let result = match_payments(&txs, &rcs).unwrap();
        assert_eq!(result.matches.len(), 2);
        assert!(result.matches.iter().all(|m| m.rent_call.id == "a"));
    }

    #[test]
    fn validation_happens_before_scoring() {
        let mut nameless = rc("b", "", "", 1, month(2025, 3));
        nameless.tenant_first_name = None;
        nameless.tenant_last_name = None;
        let txs = vec![tx("t1", 85_000), tx("t1", 1)];
        let rcs = vec![rc("a", "Jean", "Dupont", 85_000, month(2025, 3)), nameless];
        let err = match_payments(&txs, &rcs).unwrap_err();
        assert_eq!(
            err.issues,
            vec![
                ValidationIssue::DuplicateTransactionId { id: "t1".to_string() },
                ValidationIssue::MissingTenantName { candidate_id: "b".to_string() },
            ]
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = PaymentMatcher::new(MatchingConfig {
            recency_weight: 0.5,
            ..MatchingConfig::default()
        });
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn default_matcher_uses_canonical_config() {
        let matcher = PaymentMatcher::default();
        assert_eq!(matcher.config(), &MatchingConfig::default());
        assert!(matcher.config().validate().is_ok());
    }

    #[test]
    fn year_in_reference_does_not_pick_a_numeric_unit() {
        let txs = vec![tx("t1", 80_000).with_reference("LOYER MARS 2025")];
        let rcs = vec![
            RentCallCandidate::for_person("rc-a", "Marie", "Martin", "201", "L-a", 80_000, month(2025, 3)),
            RentCallCandidate::for_person("rc-b", "Marc", "Martin", "202", "L-b", 80_000, month(2025, 3)),
        ];
        let result = match_payments(&txs, &rcs).unwrap();
        assert!(result.matches.is_empty());
        assert_eq!(result.ambiguous.len(), 1);
        let contenders = &result.ambiguous[0].candidates;
        let ids: Vec<&str> = contenders.iter().map(|c| c.rent_call.id.as_str()).collect();
        assert_eq!(ids, vec!["rc-a", "rc-b"]);
        // Only the month mention counts: 0.55 + 0.3 * 0.2 + 0.5 * 0.15 + 0.1.
        assert!(contenders.iter().all(|c| c.score == 0.785 && c.breakdown.reference == 0.3));
    }

    #[test]
    fn unit_named_as_a_word_still_wins() {
        let txs = vec![tx("t1", 80_000).with_reference("LOYER LOGT 202 MARS 2025")];
        let rcs = vec![
            RentCallCandidate::for_person("rc-a", "Marie", "Martin", "201", "L-a", 80_000, month(2025, 3)),
            RentCallCandidate::for_person("rc-b", "Marc", "Martin", "202", "L-b", 80_000, month(2025, 3)),
        ];
        let result = match_payments(&txs, &rcs).unwrap();
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].rent_call.id, "rc-b");
        assert_eq!(result.matches[0].breakdown.reference, 1.0);
    }
}
