use medsim_core::models::state::PatientStatus;
use medsim_core::models::vitals::VitalSet;
use medsim_engine::classify;

fn vitals(sbp: f64, spo2: f64, hr: f64, temp_c: f64) -> VitalSet {
    VitalSet::new(hr, sbp, 80.0, spo2, temp_c, 16.0)
}

#[test]
fn low_systolic_is_critical() {
    assert_eq!(classify(&vitals(85.0, 96.0, 80.0, 37.0)), PatientStatus::Critical);
}

#[test]
fn borderline_systolic_is_deteriorating() {
    assert_eq!(
        classify(&vitals(98.0, 96.0, 80.0, 37.0)),
        PatientStatus::Deteriorating
    );
}

#[test]
fn normal_vitals_are_stable() {
    assert_eq!(classify(&vitals(120.0, 98.0, 80.0, 37.0)), PatientStatus::Stable);
}

#[test]
fn critical_thresholds_are_inclusive_where_specified() {
    assert_eq!(classify(&vitals(90.0, 98.0, 80.0, 37.0)), PatientStatus::Critical);
    assert_eq!(classify(&vitals(120.0, 90.0, 80.0, 37.0)), PatientStatus::Critical);
    // Heart-rate bounds are strict.
    assert_eq!(
        classify(&vitals(120.0, 98.0, 140.0, 37.0)),
        PatientStatus::Deteriorating
    );
    assert_eq!(classify(&vitals(120.0, 98.0, 141.0, 37.0)), PatientStatus::Critical);
    assert_eq!(classify(&vitals(120.0, 98.0, 49.0, 37.0)), PatientStatus::Critical);
    assert_eq!(
        classify(&vitals(120.0, 98.0, 50.0, 37.0)),
        PatientStatus::Deteriorating
    );
}

#[test]
fn temperature_bands() {
    assert_eq!(classify(&vitals(120.0, 98.0, 80.0, 39.5)), PatientStatus::Critical);
    assert_eq!(classify(&vitals(120.0, 98.0, 80.0, 33.9)), PatientStatus::Critical);
    assert_eq!(
        classify(&vitals(120.0, 98.0, 80.0, 39.0)),
        PatientStatus::Deteriorating
    );
    assert_eq!(classify(&vitals(120.0, 98.0, 80.0, 38.0)), PatientStatus::Stable);
    assert_eq!(
        classify(&vitals(120.0, 98.0, 80.0, 38.1)),
        PatientStatus::Deteriorating
    );
}

#[test]
fn critical_takes_precedence_over_deteriorating() {
    // SpO2 deteriorating, systolic critical.
    assert_eq!(classify(&vitals(80.0, 93.0, 80.0, 37.0)), PatientStatus::Critical);
}

#[test]
fn never_classifies_as_dead() {
    let extreme = vitals(-50.0, -10.0, 400.0, 50.0);
    assert_ne!(classify(&extreme), PatientStatus::Dead);
}
