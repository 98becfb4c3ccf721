use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named vital-sign field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalField {
    /// Heart rate, beats per minute.
    Hr,
    /// Systolic blood pressure, mmHg.
    Sbp,
    /// Diastolic blood pressure, mmHg.
    Dbp,
    /// Oxygen saturation, percent.
    Spo2,
    /// Core temperature, degrees Celsius.
    TempC,
    /// Respiratory rate, breaths per minute.
    Rr,
}

impl VitalField {
    pub const ALL: [VitalField; 6] = [
        VitalField::Hr,
        VitalField::Sbp,
        VitalField::Dbp,
        VitalField::Spo2,
        VitalField::TempC,
        VitalField::Rr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VitalField::Hr => "hr",
            VitalField::Sbp => "sbp",
            VitalField::Dbp => "dbp",
            VitalField::Spo2 => "spo2",
            VitalField::TempC => "temp_c",
            VitalField::Rr => "rr",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

/// The patient's vital-sign vector.
///
/// Values are unbounded on purpose: progression deltas may push them far
/// outside physiological ranges. Fields not in [`VitalField`] live in
/// `extra` so a permissive delta never loses data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSet {
    pub hr: f64,
    pub sbp: f64,
    pub dbp: f64,
    pub spo2: f64,
    pub temp_c: f64,
    pub rr: f64,
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, f64>,
}

impl VitalSet {
    pub fn new(hr: f64, sbp: f64, dbp: f64, spo2: f64, temp_c: f64, rr: f64) -> Self {
        Self {
            hr,
            sbp,
            dbp,
            spo2,
            temp_c,
            rr,
            extra: BTreeMap::new(),
        }
    }

    pub fn field(&self, field: VitalField) -> f64 {
        match field {
            VitalField::Hr => self.hr,
            VitalField::Sbp => self.sbp,
            VitalField::Dbp => self.dbp,
            VitalField::Spo2 => self.spo2,
            VitalField::TempC => self.temp_c,
            VitalField::Rr => self.rr,
        }
    }

    fn field_mut(&mut self, field: VitalField) -> &mut f64 {
        match field {
            VitalField::Hr => &mut self.hr,
            VitalField::Sbp => &mut self.sbp,
            VitalField::Dbp => &mut self.dbp,
            VitalField::Spo2 => &mut self.spo2,
            VitalField::TempC => &mut self.temp_c,
            VitalField::Rr => &mut self.rr,
        }
    }

    /// Look up a field by wire name, including extra fields.
    pub fn get(&self, name: &str) -> Option<f64> {
        match VitalField::parse(name) {
            Some(field) => Some(self.field(field)),
            None => self.extra.get(name).copied(),
        }
    }

    /// Set a field by wire name. Unknown names are inserted into `extra`.
    pub fn set(&mut self, name: &str, value: f64) {
        match VitalField::parse(name) {
            Some(field) => *self.field_mut(field) = value,
            None => {
                self.extra.insert(name.to_string(), value);
            }
        }
    }
}
