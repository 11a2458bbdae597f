use serde::{Deserialize, Serialize};

use crate::types::{Diet, PowerStatus, Species};

pub type CageId = String;
pub type DinosaurId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CageRecord {
    pub id: CageId,
    pub capacity: u32,
    pub power_status: PowerStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DinosaurRecord {
    pub id: DinosaurId,
    pub name: String,
    pub species: Species,
    pub diet: Diet,
    pub cage_id: CageId,
}
