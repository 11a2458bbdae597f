use std::collections::BTreeMap;

use uuid::Uuid;

use crate::{
    admission::types::{CageSnapshot, Occupant},
    registry::{
        error::{RegistryError, internal_error, not_found},
        types::{CageId, CageRecord, DinosaurId, DinosaurRecord},
    },
    types::{PowerStatus, Species},
};

/// In-memory record store for cages and dinosaurs. Occupancy is tracked as an
/// insertion-ordered index so cage snapshots list occupants in the order they
/// were placed.
#[derive(Debug, Clone, Default)]
pub struct FacilityRegistry {
    cages: BTreeMap<CageId, CageRecord>,
    dinosaurs: BTreeMap<DinosaurId, DinosaurRecord>,
    occupancy: BTreeMap<CageId, Vec<DinosaurId>>,
}

impl FacilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_cage(&mut self, capacity: u32, power_status: PowerStatus) -> CageRecord {
        let record = CageRecord {
            id: format!("cage:{}", Uuid::now_v7()),
            capacity,
            power_status,
        };
        self.cages.insert(record.id.clone(), record.clone());
        self.occupancy.insert(record.id.clone(), Vec::new());
        record
    }

    pub fn cage(&self, cage_id: &str) -> Option<&CageRecord> {
        self.cages.get(cage_id)
    }

    pub fn cages_filtered(&self, power_statuses: &[PowerStatus]) -> Vec<&CageRecord> {
        self.cages
            .values()
            .filter(|cage| {
                power_statuses.is_empty() || power_statuses.contains(&cage.power_status)
            })
            .collect()
    }

    pub fn set_cage_power(
        &mut self,
        cage_id: &str,
        power_status: PowerStatus,
    ) -> Result<CageRecord, RegistryError> {
        let cage = self
            .cages
            .get_mut(cage_id)
            .ok_or_else(|| not_found(format!("unknown cage '{cage_id}'")))?;
        cage.power_status = power_status;
        Ok(cage.clone())
    }

    pub fn remove_cage(&mut self, cage_id: &str) -> Result<(), RegistryError> {
        self.cages
            .remove(cage_id)
            .ok_or_else(|| not_found(format!("unknown cage '{cage_id}'")))?;
        self.occupancy.remove(cage_id);
        Ok(())
    }

    pub fn occupant_count(&self, cage_id: &str) -> usize {
        self.occupancy
            .get(cage_id)
            .map(|occupants| occupants.len())
            .unwrap_or(0)
    }

    pub fn occupants(&self, cage_id: &str) -> Vec<DinosaurRecord> {
        let Some(ids) = self.occupancy.get(cage_id) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| self.dinosaurs.get(id))
            .cloned()
            .collect()
    }

    /// Builds the engine-facing view of a cage. `exclude` drops one occupant
    /// from the listing, which callers use when re-evaluating an occupant
    /// against the cage it already lives in.
    pub fn snapshot(
        &self,
        cage_id: &str,
        exclude: Option<&str>,
    ) -> Result<CageSnapshot, RegistryError> {
        let cage = self
            .cages
            .get(cage_id)
            .ok_or_else(|| not_found(format!("unknown cage '{cage_id}'")))?;

        let mut occupants = Vec::new();
        if let Some(ids) = self.occupancy.get(cage_id) {
            for id in ids {
                if exclude == Some(id.as_str()) {
                    continue;
                }
                let dinosaur = self.dinosaurs.get(id).ok_or_else(|| {
                    internal_error(format!("occupancy index references unknown dinosaur '{id}'"))
                })?;
                occupants.push(Occupant {
                    species: dinosaur.species,
                    diet: dinosaur.diet,
                });
            }
        }

        Ok(CageSnapshot {
            capacity: cage.capacity,
            power_status: cage.power_status,
            occupants,
        })
    }

    pub fn place_dinosaur(
        &mut self,
        name: String,
        species: Species,
        cage_id: &str,
    ) -> Result<DinosaurRecord, RegistryError> {
        if !self.cages.contains_key(cage_id) {
            return Err(not_found(format!("unknown cage '{cage_id}'")));
        }

        let record = DinosaurRecord {
            id: format!("dino:{}", Uuid::now_v7()),
            name,
            species,
            diet: species.diet(),
            cage_id: cage_id.to_string(),
        };
        self.dinosaurs.insert(record.id.clone(), record.clone());
        self.occupancy
            .entry(cage_id.to_string())
            .or_default()
            .push(record.id.clone());
        Ok(record)
    }

    pub fn dinosaur(&self, dinosaur_id: &str) -> Option<&DinosaurRecord> {
        self.dinosaurs.get(dinosaur_id)
    }

    pub fn dinosaurs_filtered(&self, species: &[Species]) -> Vec<&DinosaurRecord> {
        self.dinosaurs
            .values()
            .filter(|dinosaur| species.is_empty() || species.contains(&dinosaur.species))
            .collect()
    }

    pub fn reassign_dinosaur(
        &mut self,
        dinosaur_id: &str,
        cage_id: &str,
    ) -> Result<DinosaurRecord, RegistryError> {
        if !self.cages.contains_key(cage_id) {
            return Err(not_found(format!("unknown cage '{cage_id}'")));
        }

        let previous_cage_id = {
            let dinosaur = self
                .dinosaurs
                .get_mut(dinosaur_id)
                .ok_or_else(|| not_found(format!("unknown dinosaur '{dinosaur_id}'")))?;
            let previous = dinosaur.cage_id.clone();
            dinosaur.cage_id = cage_id.to_string();
            previous
        };

        if previous_cage_id != cage_id {
            self.detach_occupant(&previous_cage_id, dinosaur_id)?;
            self.occupancy
                .entry(cage_id.to_string())
                .or_default()
                .push(dinosaur_id.to_string());
        }

        self.dinosaurs
            .get(dinosaur_id)
            .cloned()
            .ok_or_else(|| internal_error(format!("dinosaur '{dinosaur_id}' vanished mid-update")))
    }

    pub fn remove_dinosaur(&mut self, dinosaur_id: &str) -> Result<(), RegistryError> {
        let dinosaur = self
            .dinosaurs
            .remove(dinosaur_id)
            .ok_or_else(|| not_found(format!("unknown dinosaur '{dinosaur_id}'")))?;
        self.detach_occupant(&dinosaur.cage_id, dinosaur_id)
    }

    fn detach_occupant(&mut self, cage_id: &str, dinosaur_id: &str) -> Result<(), RegistryError> {
        let occupants = self.occupancy.get_mut(cage_id).ok_or_else(|| {
            internal_error(format!("occupancy index is missing cage '{cage_id}'"))
        })?;
        let position = occupants
            .iter()
            .position(|id| id == dinosaur_id)
            .ok_or_else(|| {
                internal_error(format!(
                    "occupancy index for cage '{cage_id}' is missing dinosaur '{dinosaur_id}'"
                ))
            })?;
        occupants.remove(position);
        Ok(())
    }
}
