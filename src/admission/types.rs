use serde::{Deserialize, Serialize};

use crate::types::{Diet, PowerStatus, Species};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub species: Species,
    pub diet: Diet,
}

impl Candidate {
    pub fn of(species: Species) -> Self {
        Self {
            species,
            diet: species.diet(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub species: Species,
    pub diet: Diet,
}

impl Occupant {
    pub fn of(species: Species) -> Self {
        Self {
            species,
            diet: species.diet(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CageSnapshot {
    pub capacity: u32,
    pub power_status: PowerStatus,
    pub occupants: Vec<Occupant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    CageFull,
    CageUnpowered,
    HerbivoreCarnivoreConflict,
    SpeciesConflict,
}

impl RejectReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::CageFull => "cage_full",
            RejectReason::CageUnpowered => "cage_unpowered",
            RejectReason::HerbivoreCarnivoreConflict => "herbivore_carnivore_conflict",
            RejectReason::SpeciesConflict => "species_conflict",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::CageFull => "cage is already at capacity",
            RejectReason::CageUnpowered => "cage has no power",
            RejectReason::HerbivoreCarnivoreConflict => {
                "herbivores and carnivores cannot share a cage"
            }
            RejectReason::SpeciesConflict => {
                "carnivores only share a cage with their own species"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Verdict {
    Admit,
    Reject { reason: RejectReason },
}
