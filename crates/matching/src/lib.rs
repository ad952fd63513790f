pub mod config;
pub mod dedup;
pub mod engine;
pub mod index;
pub mod result;
pub mod score;
pub(crate) mod util;

pub use config::{ConfigError, MatchingConfig};
pub use dedup::{filter_already_imported, DedupKey};
pub use engine::{match_payments, PaymentMatcher};
pub use index::{CandidateIndex, IndexedCandidate};
pub use result::{
    AmbiguousMatch, ConfidenceLevel, MatchProposal, MatchingResult, MatchingSummary,
    RankedCandidate, UnmatchedTransaction,
};
pub use score::{ScoreBreakdown, Scorer};

pub use rentmatch_core::{
    BillingMonth, Money, RentCallCandidate, TransactionData, ValidationError, ValidationIssue,
};
