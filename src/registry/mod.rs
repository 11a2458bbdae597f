pub mod error;
pub mod store;
pub mod types;

pub use error::{RegistryError, RegistryErrorKind, internal_error, not_found};
pub use store::FacilityRegistry;
pub use types::{CageId, CageRecord, DinosaurId, DinosaurRecord};
