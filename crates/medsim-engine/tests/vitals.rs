use medsim_core::models::delta::{Delta, DeltaSpec};
use medsim_core::models::vitals::VitalSet;
use medsim_engine::apply_delta;

fn baseline() -> VitalSet {
    VitalSet::new(102.0, 150.0, 95.0, 95.0, 37.0, 20.0)
}

#[test]
fn empty_delta_is_identity() {
    let vitals = baseline();
    assert_eq!(apply_delta(&vitals, &DeltaSpec::new()), vitals);
}

#[test]
fn only_named_fields_change() {
    let vitals = baseline();
    let delta = DeltaSpec::new()
        .with("hr", Delta::Signed(8.0))
        .with("spo2", Delta::Signed(-2.0));

    let next = apply_delta(&vitals, &delta);

    assert_eq!(next.hr, 110.0);
    assert_eq!(next.spo2, 93.0);
    assert_eq!(next.sbp, vitals.sbp);
    assert_eq!(next.dbp, vitals.dbp);
    assert_eq!(next.temp_c, vitals.temp_c);
    assert_eq!(next.rr, vitals.rr);
    assert!(next.extra.is_empty());
}

#[test]
fn input_is_not_mutated() {
    let vitals = baseline();
    let delta = DeltaSpec::new().with("rr", Delta::Signed(3.0));
    let _ = apply_delta(&vitals, &delta);
    assert_eq!(vitals, baseline());
}

#[test]
fn bare_numbers_are_added_as_is() {
    let delta = DeltaSpec::new()
        .with("hr", Delta::Absolute(-10.0))
        .with("temp_c", Delta::Absolute(0.5));

    let next = apply_delta(&baseline(), &delta);

    assert_eq!(next.hr, 92.0);
    assert_eq!(next.temp_c, 37.5);
}

#[test]
fn unknown_fields_are_inserted() {
    let delta = DeltaSpec::new().with("lactate", Delta::Signed(2.5));
    let next = apply_delta(&baseline(), &delta);
    assert_eq!(next.get("lactate"), Some(2.5));
    assert_eq!(next.hr, 102.0);
}

#[test]
fn values_may_leave_physiological_range() {
    let delta = DeltaSpec::new().with("spo2", Delta::Signed(-500.0));
    let next = apply_delta(&baseline(), &delta);
    assert_eq!(next.spo2, -405.0);
}
