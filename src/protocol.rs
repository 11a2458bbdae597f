use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    registry::types::{CageRecord, DinosaurRecord},
    types::{Diet, PowerStatus, Species},
    warden::WardenError,
};

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("malformed request line: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientRequest {
    CreateCage(CreateCageRequest),
    GetCage(GetCageRequest),
    ListCages(ListCagesRequest),
    SetCagePower(SetCagePowerRequest),
    DeleteCage(DeleteCageRequest),
    AddDinosaur(AddDinosaurRequest),
    GetDinosaur(GetDinosaurRequest),
    ListDinosaurs(ListDinosaursRequest),
    MoveDinosaur(MoveDinosaurRequest),
    RemoveDinosaur(RemoveDinosaurRequest),
    Exit,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateCageRequest {
    #[validate(range(min = 1))]
    pub capacity: u32,
    pub power_status: PowerStatus,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetCageRequest {
    pub cage_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ListCagesRequest {
    #[serde(default)]
    pub filtered_power_status: Vec<PowerStatus>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetCagePowerRequest {
    pub cage_id: String,
    pub power_status: PowerStatus,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteCageRequest {
    pub cage_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AddDinosaurRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub species: String,
    pub cage_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetDinosaurRequest {
    pub dinosaur_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ListDinosaursRequest {
    #[serde(default)]
    pub filtered_species: Vec<Species>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoveDinosaurRequest {
    pub dinosaur_id: String,
    pub cage_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveDinosaurRequest {
    pub dinosaur_id: String,
}

pub fn parse_client_request(line: &str) -> Result<ClientRequest, WireError> {
    Ok(serde_json::from_str(line)?)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DinosaurView {
    pub id: String,
    pub name: String,
    pub species: Species,
    #[serde(rename = "type")]
    pub diet: Diet,
    pub cage_id: String,
}

impl DinosaurView {
    pub fn from_record(record: &DinosaurRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            species: record.species,
            diet: record.diet,
            cage_id: record.cage_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CageView {
    pub id: String,
    pub capacity: u32,
    pub current_count: usize,
    pub power_status: PowerStatus,
    pub dinosaurs: Vec<DinosaurView>,
}

impl CageView {
    pub fn from_records(cage: &CageRecord, occupants: &[DinosaurRecord]) -> Self {
        Self {
            id: cage.id.clone(),
            capacity: cage.capacity,
            current_count: occupants.len(),
            power_status: cage.power_status,
            dinosaurs: occupants.iter().map(DinosaurView::from_record).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerReply {
    Cage { cage: CageView },
    Cages { cages: Vec<CageView> },
    Dinosaur { dinosaur: DinosaurView },
    Dinosaurs { dinosaurs: Vec<DinosaurView> },
    CageDeleted,
    DinosaurRemoved,
    Error { error: ErrorBody },
}

impl ServerReply {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ServerReply::Error {
            error: ErrorBody {
                code: "invalid_request".to_string(),
                message: message.into(),
            },
        }
    }
}

/// One consistent mapping from service errors to wire errors: admission
/// denials carry their reason code verbatim, missing records carry a
/// not-found code, everything else is an invalid request or an internal
/// fault.
pub fn error_body(err: &WardenError) -> ErrorBody {
    let code = match err {
        WardenError::CageNotFound(_) => "cage_not_found",
        WardenError::DinosaurNotFound(_) => "dinosaur_not_found",
        WardenError::UnknownSpecies(_) => "unknown_species",
        WardenError::BlankName => "blank_name",
        WardenError::ZeroCapacity => "invalid_capacity",
        WardenError::PlacementDenied { reason } => reason.code(),
        WardenError::CageOccupied { .. } => "cage_occupied",
        WardenError::Registry(_) => "internal",
        WardenError::Admission(_) => "invalid_snapshot",
    };
    ErrorBody {
        code: code.to_string(),
        message: err.to_string(),
    }
}
