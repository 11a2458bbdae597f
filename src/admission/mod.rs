pub mod error;
pub mod evaluator;
pub mod lifecycle;
pub mod types;

pub use error::{AdmissionError, AdmissionErrorKind, invalid_snapshot};
pub use evaluator::evaluate;
pub use lifecycle::removal_allowed;
pub use types::{CageSnapshot, Candidate, Occupant, RejectReason, Verdict};
