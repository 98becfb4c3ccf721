use medsim_core::models::delta::DeltaSpec;
use medsim_core::models::vitals::VitalSet;

/// Apply `delta` to `vitals`, returning a new vector.
///
/// Each named field gets its increment added to the current value. Fields
/// the vector doesn't know are inserted starting from zero. Fields are
/// disjoint, so application order is irrelevant.
pub fn apply_delta(vitals: &VitalSet, delta: &DeltaSpec) -> VitalSet {
    let mut next = vitals.clone();
    for (field, change) in delta.iter() {
        let current = next.get(field).unwrap_or(0.0);
        next.set(field, current + change.amount());
    }
    next
}
