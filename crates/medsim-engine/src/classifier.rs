use medsim_core::models::state::PatientStatus;
use medsim_core::models::vitals::VitalSet;

/// Derive the patient's status from vitals alone.
///
/// Never returns [`PatientStatus::Dead`]; death is tracked by the
/// consecutive-wrong rule, not by physiology.
pub fn classify(vitals: &VitalSet) -> PatientStatus {
    if is_critical(vitals) {
        PatientStatus::Critical
    } else if is_deteriorating(vitals) {
        PatientStatus::Deteriorating
    } else {
        PatientStatus::Stable
    }
}

fn is_critical(v: &VitalSet) -> bool {
    v.sbp <= 90.0
        || v.spo2 <= 90.0
        || v.hr > 140.0
        || v.hr < 50.0
        || v.temp_c > 39.0
        || v.temp_c < 34.0
}

fn is_deteriorating(v: &VitalSet) -> bool {
    v.sbp <= 100.0
        || v.spo2 <= 94.0
        || v.hr > 120.0
        || v.hr < 60.0
        || (v.temp_c > 38.0 && v.temp_c <= 39.0)
}
