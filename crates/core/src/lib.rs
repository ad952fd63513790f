pub mod money;
pub mod period;
pub mod rent_call;
pub mod transaction;
pub mod validation;

pub use money::Money;
pub use period::{BillingMonth, InvalidBillingMonth};
pub use rent_call::RentCallCandidate;
pub use transaction::TransactionData;
pub use validation::{validate_inputs, InvalidCandidateError, ValidationError, ValidationIssue};
