use std::collections::HashSet;
use thiserror::Error;

use super::rent_call::RentCallCandidate;
use super::transaction::TransactionData;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("transaction #{position} has a blank id")]
    BlankTransactionId { position: usize },
    #[error("transaction id '{id}' appears more than once")]
    DuplicateTransactionId { id: String },
    #[error("rent call #{position} has a blank id")]
    BlankCandidateId { position: usize },
    #[error("rent call id '{id}' appears more than once")]
    DuplicateCandidateId { id: String },
    #[error("rent call '{candidate_id}' has neither a company name nor a personal name")]
    MissingTenantName { candidate_id: String },
    #[error("rent call '{candidate_id}' has a blank unit id")]
    BlankUnitId { candidate_id: String },
    #[error("rent call '{candidate_id}' has a blank lease id")]
    BlankLeaseId { candidate_id: String },
}

/// Every issue found in one input batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} invalid input record(s): {}", .issues.len(), describe(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

/// A rent call whose payer cannot be identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rent call '{candidate_id}' has neither a company name nor a personal name")]
pub struct InvalidCandidateError {
    pub candidate_id: String,
}

impl From<InvalidCandidateError> for ValidationError {
    fn from(e: InvalidCandidateError) -> Self {
        ValidationError {
            issues: vec![ValidationIssue::MissingTenantName {
                candidate_id: e.candidate_id,
            }],
        }
    }
}

fn describe(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl TransactionData {
    fn check(&self, position: usize, issues: &mut Vec<ValidationIssue>) {
        if self.id.trim().is_empty() {
            issues.push(ValidationIssue::BlankTransactionId { position });
        }
    }
}

impl RentCallCandidate {
    fn check(&self, position: usize, issues: &mut Vec<ValidationIssue>) {
        if self.id.trim().is_empty() {
            issues.push(ValidationIssue::BlankCandidateId { position });
        }
        if self.display_name().is_none() {
            issues.push(ValidationIssue::MissingTenantName {
                candidate_id: self.id.clone(),
            });
        }
        if self.unit_id.trim().is_empty() {
            issues.push(ValidationIssue::BlankUnitId {
                candidate_id: self.id.clone(),
            });
        }
        if self.lease_id.trim().is_empty() {
            issues.push(ValidationIssue::BlankLeaseId {
                candidate_id: self.id.clone(),
            });
        }
    }
}

/// Check both inputs of a matching run, collecting all issues.
pub fn validate_inputs(
    transactions: &[TransactionData],
    candidates: &[RentCallCandidate],
) -> Result<(), ValidationError> {
    let mut issues = Vec::new();

    let mut seen = HashSet::new();
    for (position, tx) in transactions.iter().enumerate() {
        tx.check(position, &mut issues);
        if !tx.id.trim().is_empty() && !seen.insert(tx.id.as_str()) {
            issues.push(ValidationIssue::DuplicateTransactionId { id: tx.id.clone() });
        }
    }

    let mut seen = HashSet::new();
    for (position, rc) in candidates.iter().enumerate() {
        rc.check(position, &mut issues);
        if !rc.id.trim().is_empty() && !seen.insert(rc.id.as_str()) {
            issues.push(ValidationIssue::DuplicateCandidateId { id: rc.id.clone() });
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}
