use sha2::{Digest, Sha256};

use crate::{
    admission::{
        error::AdmissionError,
        evaluate,
        lifecycle::removal_allowed,
        types::{Candidate, RejectReason, Verdict},
    },
    registry::{
        FacilityRegistry, RegistryError, RegistryErrorKind,
        types::{CageId, CageRecord, DinosaurId, DinosaurRecord},
    },
    types::{PowerStatus, Species},
};

#[derive(Debug, thiserror::Error)]
pub enum WardenError {
    #[error("cage '{0}' not found")]
    CageNotFound(CageId),
    #[error("dinosaur '{0}' not found")]
    DinosaurNotFound(DinosaurId),
    #[error("unknown species '{0}'")]
    UnknownSpecies(String),
    #[error("dinosaur name cannot be blank")]
    BlankName,
    #[error("cage capacity must be greater than zero")]
    ZeroCapacity,
    #[error("{}", .reason.message())]
    PlacementDenied { reason: RejectReason },
    #[error("cage '{cage_id}' still houses {occupant_count} dinosaurs")]
    CageOccupied {
        cage_id: CageId,
        occupant_count: usize,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Admission(#[from] AdmissionError),
}

/// Coordinates the registry and the admission evaluator. Every mutating
/// operation runs its whole read-evaluate-commit span on one `&mut self`
/// borrow, so a verdict can never be committed against a stale snapshot as
/// long as the caller serializes access (the server holds one mutex around
/// the warden).
#[derive(Debug, Default)]
pub struct Warden {
    registry: FacilityRegistry,
}

impl Warden {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(name = "warden_create_cage", target = "warden", skip(self))]
    pub fn create_cage(
        &mut self,
        capacity: u32,
        power_status: PowerStatus,
    ) -> Result<CageRecord, WardenError> {
        if capacity == 0 {
            return Err(WardenError::ZeroCapacity);
        }
        let cage = self.registry.create_cage(capacity, power_status);
        tracing::info!(
            target: "warden",
            cage_id = %cage.id,
            capacity = cage.capacity,
            power_status = ?cage.power_status,
            "cage_created"
        );
        Ok(cage)
    }

    pub fn cage(&self, cage_id: &str) -> Result<(CageRecord, Vec<DinosaurRecord>), WardenError> {
        let cage = self
            .registry
            .cage(cage_id)
            .cloned()
            .ok_or_else(|| WardenError::CageNotFound(cage_id.to_string()))?;
        let occupants = self.registry.occupants(cage_id);
        Ok((cage, occupants))
    }

    pub fn cages(
        &self,
        power_statuses: &[PowerStatus],
    ) -> Vec<(CageRecord, Vec<DinosaurRecord>)> {
        self.registry
            .cages_filtered(power_statuses)
            .into_iter()
            .map(|cage| (cage.clone(), self.registry.occupants(&cage.id)))
            .collect()
    }

    /// Power transitions are not gated by the evaluator: a cage may go down
    /// while occupied, and its occupants remain.
    #[tracing::instrument(name = "warden_set_cage_power", target = "warden", skip(self))]
    pub fn set_cage_power(
        &mut self,
        cage_id: &str,
        power_status: PowerStatus,
    ) -> Result<(CageRecord, Vec<DinosaurRecord>), WardenError> {
        let cage = self
            .registry
            .set_cage_power(cage_id, power_status)
            .map_err(|_| WardenError::CageNotFound(cage_id.to_string()))?;
        tracing::info!(
            target: "warden",
            cage_id = %cage.id,
            power_status = ?cage.power_status,
            "cage_power_updated"
        );
        let occupants = self.registry.occupants(cage_id);
        Ok((cage, occupants))
    }

    #[tracing::instrument(name = "warden_delete_cage", target = "warden", skip(self))]
    pub fn delete_cage(&mut self, cage_id: &str) -> Result<(), WardenError> {
        if self.registry.cage(cage_id).is_none() {
            return Err(WardenError::CageNotFound(cage_id.to_string()));
        }

        let occupant_count = self.registry.occupant_count(cage_id);
        if !removal_allowed(occupant_count) {
            tracing::warn!(
                target: "warden",
                cage_id = %cage_id,
                occupant_count = occupant_count,
                "cage_deletion_refused"
            );
            return Err(WardenError::CageOccupied {
                cage_id: cage_id.to_string(),
                occupant_count,
            });
        }

        self.registry.remove_cage(cage_id)?;
        tracing::info!(target: "warden", cage_id = %cage_id, "cage_deleted");
        Ok(())
    }

    #[tracing::instrument(name = "warden_admit_dinosaur", target = "warden", skip(self, name))]
    pub fn admit_dinosaur(
        &mut self,
        name: &str,
        species_name: &str,
        cage_id: &str,
    ) -> Result<DinosaurRecord, WardenError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WardenError::BlankName);
        }
        let species = Species::parse(species_name)
            .ok_or_else(|| WardenError::UnknownSpecies(species_name.to_string()))?;

        self.evaluate_placement(species, cage_id, None)?;

        let dinosaur = self
            .registry
            .place_dinosaur(name.to_string(), species, cage_id)?;
        tracing::info!(
            target: "warden",
            dinosaur_id = %dinosaur.id,
            cage_id = %cage_id,
            species = species.name(),
            placement_id = %derive_placement_id(cage_id, &dinosaur.id),
            "dinosaur_admitted"
        );
        Ok(dinosaur)
    }

    pub fn dinosaur(&self, dinosaur_id: &str) -> Result<DinosaurRecord, WardenError> {
        self.registry
            .dinosaur(dinosaur_id)
            .cloned()
            .ok_or_else(|| WardenError::DinosaurNotFound(dinosaur_id.to_string()))
    }

    pub fn dinosaurs(&self, species: &[Species]) -> Vec<DinosaurRecord> {
        self.registry
            .dinosaurs_filtered(species)
            .into_iter()
            .cloned()
            .collect()
    }

    #[tracing::instrument(name = "warden_move_dinosaur", target = "warden", skip(self))]
    pub fn move_dinosaur(
        &mut self,
        dinosaur_id: &str,
        cage_id: &str,
    ) -> Result<DinosaurRecord, WardenError> {
        let dinosaur = self
            .registry
            .dinosaur(dinosaur_id)
            .cloned()
            .ok_or_else(|| WardenError::DinosaurNotFound(dinosaur_id.to_string()))?;

        // Re-evaluating an occupant against its own cage must not make it
        // conflict with itself, so the mover is excluded from the snapshot
        // when the target is unchanged.
        let exclude = (dinosaur.cage_id == cage_id).then_some(dinosaur_id);
        self.evaluate_placement(dinosaur.species, cage_id, exclude)?;

        let moved = self.registry.reassign_dinosaur(dinosaur_id, cage_id)?;
        tracing::info!(
            target: "warden",
            dinosaur_id = %moved.id,
            from_cage_id = %dinosaur.cage_id,
            cage_id = %cage_id,
            placement_id = %derive_placement_id(cage_id, &moved.id),
            "dinosaur_moved"
        );
        Ok(moved)
    }

    #[tracing::instrument(name = "warden_remove_dinosaur", target = "warden", skip(self))]
    pub fn remove_dinosaur(&mut self, dinosaur_id: &str) -> Result<(), WardenError> {
        self.registry
            .remove_dinosaur(dinosaur_id)
            .map_err(|err| match err.kind {
                RegistryErrorKind::NotFound => {
                    WardenError::DinosaurNotFound(dinosaur_id.to_string())
                }
                _ => WardenError::Registry(err),
            })?;
        tracing::info!(target: "warden", dinosaur_id = %dinosaur_id, "dinosaur_removed");
        Ok(())
    }

    fn evaluate_placement(
        &self,
        species: Species,
        cage_id: &str,
        exclude: Option<&str>,
    ) -> Result<(), WardenError> {
        let snapshot = self
            .registry
            .snapshot(cage_id, exclude)
            .map_err(|err| match err.kind {
                RegistryErrorKind::NotFound => {
                    WardenError::CageNotFound(cage_id.to_string())
                }
                _ => WardenError::Registry(err),
            })?;

        match evaluate(&Candidate::of(species), &snapshot)? {
            Verdict::Admit => Ok(()),
            Verdict::Reject { reason } => {
                tracing::warn!(
                    target: "warden",
                    cage_id = %cage_id,
                    species = species.name(),
                    reason = reason.code(),
                    "placement_denied"
                );
                Err(WardenError::PlacementDenied { reason })
            }
        }
    }
}

/// Deterministic reference id for a committed placement, derived from the
/// canonical JSON of the cage/dinosaur pair.
pub fn derive_placement_id(cage_id: &str, dinosaur_id: &str) -> String {
    let canonical = serde_json::json!({
        "cage_id": cage_id,
        "dinosaur_id": dinosaur_id,
    });

    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    let digest = hasher.finalize();
    let hex = format!("{:x}", digest);
    format!("plc:{}", &hex[..24])
}
