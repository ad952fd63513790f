use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;
use super::period::BillingMonth;

/// An outstanding (unpaid) rent call for one lease and billing month.
///
/// The tenant is either a company or a person. Both sets of fields are
/// optional at the type level; `display_name` picks the one that identifies
/// the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentCallCandidate {
    pub id: String,
    #[serde(default)]
    pub tenant_first_name: Option<String>,
    #[serde(default)]
    pub tenant_last_name: Option<String>,
    #[serde(default)]
    pub tenant_company_name: Option<String>,
    pub unit_id: String,
    pub lease_id: String,
    pub total_amount_cents: i64,
    pub month: BillingMonth,
}

impl RentCallCandidate {
    pub fn for_person(
        id: &str,
        first_name: &str,
        last_name: &str,
        unit_id: &str,
        lease_id: &str,
        total_amount_cents: i64,
        month: BillingMonth,
    ) -> Self {
        RentCallCandidate {
            id: id.to_string(),
            tenant_first_name: Some(first_name.to_string()),
            tenant_last_name: Some(last_name.to_string()),
            tenant_company_name: None,
            unit_id: unit_id.to_string(),
            lease_id: lease_id.to_string(),
            total_amount_cents,
            month,
        }
    }

    pub fn for_company(
        id: &str,
        company_name: &str,
        unit_id: &str,
        lease_id: &str,
        total_amount_cents: i64,
        month: BillingMonth,
    ) -> Self {
        RentCallCandidate {
            id: id.to_string(),
            tenant_first_name: None,
            tenant_last_name: None,
            tenant_company_name: Some(company_name.to_string()),
            unit_id: unit_id.to_string(),
            lease_id: lease_id.to_string(),
            total_amount_cents,
            month,
        }
    }

    pub fn amount_due(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// The company name when present, otherwise "first last". `None` when
    /// neither carries a single letter or digit.
    pub fn display_name(&self) -> Option<String> {
        let company = self
            .tenant_company_name
            .as_deref()
            .map(str::trim)
            .filter(|s| has_word_char(s));
        if let Some(company) = company {
            return Some(company.to_string());
        }

        let person = [&self.tenant_first_name, &self.tenant_last_name]
            .into_iter()
            .filter_map(|part| part.as_deref().map(str::trim))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        has_word_char(&person).then_some(person)
    }
}

impl fmt::Display for RentCallCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, unit {}, {})",
            self.id,
            self.display_name().as_deref().unwrap_or("?"),
            self.unit_id,
            self.month
        )
    }
}

fn has_word_char(s: &str) -> bool {
    s.chars().any(char::is_alphanumeric)
}
