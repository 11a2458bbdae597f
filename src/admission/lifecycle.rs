/// A cage may be dismantled only once nothing lives in it. Power status and
/// capacity play no part in the decision.
pub fn removal_allowed(occupant_count: usize) -> bool {
    occupant_count == 0
}
