use crate::{
    admission::{
        error::{AdmissionError, invalid_snapshot},
        types::{CageSnapshot, Candidate, RejectReason, Verdict},
    },
    types::{Diet, PowerStatus},
};

/// Decides whether `candidate` may be placed into the cage described by
/// `snapshot`. The check order is fixed: capacity, then power, then each
/// occupant in its stored order with the diet check ahead of the species
/// check. Only the first violation is reported.
pub fn evaluate(
    candidate: &Candidate,
    snapshot: &CageSnapshot,
) -> Result<Verdict, AdmissionError> {
    if snapshot.capacity == 0 {
        return Err(invalid_snapshot("cage capacity must be positive"));
    }
    if snapshot.occupants.len() > snapshot.capacity as usize {
        return Err(invalid_snapshot(format!(
            "occupant count {} exceeds cage capacity {}",
            snapshot.occupants.len(),
            snapshot.capacity
        )));
    }

    if snapshot.occupants.len() == snapshot.capacity as usize {
        return Ok(Verdict::Reject {
            reason: RejectReason::CageFull,
        });
    }

    if snapshot.power_status != PowerStatus::Active {
        return Ok(Verdict::Reject {
            reason: RejectReason::CageUnpowered,
        });
    }

    for occupant in &snapshot.occupants {
        if candidate.diet != occupant.diet {
            return Ok(Verdict::Reject {
                reason: RejectReason::HerbivoreCarnivoreConflict,
            });
        }
        if candidate.diet == Diet::Carnivore && occupant.species != candidate.species {
            return Ok(Verdict::Reject {
                reason: RejectReason::SpeciesConflict,
            });
        }
    }

    Ok(Verdict::Admit)
}
