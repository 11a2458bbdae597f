use paddock::{
    types::PowerStatus,
    warden::{Warden, WardenError},
};

#[test]
fn given_zero_capacity_when_creating_cage_then_rejected() {
    let mut warden = Warden::new();
    let err = warden
        .create_cage(0, PowerStatus::Active)
        .expect_err("zero capacity must be refused");
    assert!(matches!(err, WardenError::ZeroCapacity));
}

#[test]
fn given_created_cages_when_listing_with_power_filter_then_only_matches_return() {
    let mut warden = Warden::new();
    let active = warden
        .create_cage(2, PowerStatus::Active)
        .expect("cage should be created");
    let down = warden
        .create_cage(3, PowerStatus::Down)
        .expect("cage should be created");

    let all = warden.cages(&[]);
    assert_eq!(all.len(), 2);

    let down_only = warden.cages(&[PowerStatus::Down]);
    assert_eq!(down_only.len(), 1);
    assert_eq!(down_only[0].0.id, down.id);

    let active_only = warden.cages(&[PowerStatus::Active]);
    assert_eq!(active_only.len(), 1);
    assert_eq!(active_only[0].0.id, active.id);
}

#[test]
fn given_missing_cage_when_fetching_then_cage_not_found() {
    let warden = Warden::new();
    let err = warden
        .cage("cage:missing")
        .expect_err("missing cage must not resolve");
    assert!(matches!(err, WardenError::CageNotFound(_)));
}

#[test]
fn given_occupied_cage_when_deleting_then_refused_with_occupant_count() {
    let mut warden = Warden::new();
    let cage = warden
        .create_cage(2, PowerStatus::Active)
        .expect("cage should be created");
    warden
        .admit_dinosaur("Gertie", "Stegosaurus", &cage.id)
        .expect("herbivore joins an empty cage");

    let err = warden
        .delete_cage(&cage.id)
        .expect_err("occupied cage must not be deleted");
    let WardenError::CageOccupied { occupant_count, .. } = err else {
        panic!("expected CageOccupied, got {err:?}");
    };
    assert_eq!(occupant_count, 1);

    warden.cage(&cage.id).expect("cage must survive the refusal");
}

#[test]
fn given_empty_cage_when_deleting_then_cage_is_gone() {
    let mut warden = Warden::new();
    let cage = warden
        .create_cage(2, PowerStatus::Active)
        .expect("cage should be created");

    warden.delete_cage(&cage.id).expect("empty cage deletes");
    let err = warden
        .cage(&cage.id)
        .expect_err("deleted cage must not resolve");
    assert!(matches!(err, WardenError::CageNotFound(_)));
}

#[test]
fn given_power_down_transition_then_occupants_remain_but_admissions_stop() {
    let mut warden = Warden::new();
    let cage = warden
        .create_cage(3, PowerStatus::Active)
        .expect("cage should be created");
    warden
        .admit_dinosaur("Littlefoot", "Brachiosaurus", &cage.id)
        .expect("herbivore joins an empty cage");

    let (updated, occupants) = warden
        .set_cage_power(&cage.id, PowerStatus::Down)
        .expect("power transition is not gated");
    assert_eq!(updated.power_status, PowerStatus::Down);
    assert_eq!(occupants.len(), 1);

    let err = warden
        .admit_dinosaur("Cera", "Triceratops", &cage.id)
        .expect_err("unpowered cage admits nobody");
    assert!(matches!(
        err,
        WardenError::PlacementDenied {
            reason: paddock::admission::RejectReason::CageUnpowered
        }
    ));
}
