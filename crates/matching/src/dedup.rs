use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use rentmatch_core::TransactionData;

/// Identity of an imported movement across statement files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupKey {
    /// ISO `YYYY-MM-DD`.
    pub date: String,
    pub amount_cents: i64,
    /// Trimmed, lower-cased, whitespace-collapsed; empty when absent.
    pub reference: String,
}

impl DedupKey {
    pub fn of(tx: &TransactionData) -> Self {
        DedupKey {
            date: tx.date.format("%Y-%m-%d").to_string(),
            amount_cents: tx.amount_cents,
            reference: tx
                .reference
                .as_deref()
                .map(|r| r.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
                .unwrap_or_default(),
        }
    }
}

/// Split `transactions` into those never seen before and those already known.
///
/// A key repeated within the batch is kept once (first occurrence); later
/// repeats go to the skipped list. Both lists keep input order.
pub fn filter_already_imported(
    transactions: Vec<TransactionData>,
    known: &HashSet<DedupKey>,
) -> (Vec<TransactionData>, Vec<TransactionData>) {
    let mut seen: HashSet<DedupKey> = HashSet::new();
    let mut fresh = Vec::new();
    let mut skipped = Vec::new();

    for tx in transactions {
        let key = DedupKey::of(&tx);
        if known.contains(&key) || !seen.insert(key) {
            skipped.push(tx);
        } else {
            fresh.push(tx);
        }
    }

    if !skipped.is_empty() {
        tracing::info!(
            "Skipped {} already imported transaction(s), {} left to match",
            skipped.len(),
            fresh.len()
        );
    }

    (fresh, skipped)
}
