use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::money::Money;
use super::period::BillingMonth;

/// One imported bank movement. Credits are positive, debits negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    pub id: String,
    /// Value date of the movement.
    pub date: NaiveDate,
    pub amount_cents: i64,
    #[serde(default)]
    pub payer_name: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

impl TransactionData {
    pub fn new(id: &str, date: NaiveDate, amount_cents: i64) -> Self {
        TransactionData {
            id: id.to_string(),
            date,
            amount_cents,
            payer_name: None,
            reference: None,
        }
    }

    pub fn with_payer(mut self, payer_name: &str) -> Self {
        self.payer_name = Some(payer_name.to_string());
        self
    }

    pub fn with_reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }

    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    pub fn billing_month(&self) -> BillingMonth {
        BillingMonth::from_date(self.date)
    }

    pub fn is_credit(&self) -> bool {
        self.amount().is_positive()
    }

    /// Payer name with surrounding whitespace removed, `None` when blank.
    pub fn payer(&self) -> Option<&str> {
        self.payer_name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Reference with surrounding whitespace removed, `None` when blank.
    pub fn reference_text(&self) -> Option<&str> {
        self.reference.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}
