//! Derived fields: age from birth date, BMI from weight and height.
//!
//! Every function here is pure. The `apply_*` helpers return `Some` only when the
//! stored value would actually change, so repeated calls never produce spurious
//! updates.

use chrono::{Datelike, Local, NaiveDate};

use crate::entities::{PatientField, PatientRecord, VitalField, VitalSigns};
use crate::forms::SectionForm;
use crate::validation::{parse_date, parse_numeric};

/// Source of "today"
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the machine
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Completed years between `birth` and `today`.
///
/// `None` when the date is blank, malformed or lies in the future.
pub fn calculate_age(birth: &str, today: NaiveDate) -> Option<u32> {
    let birth = parse_date(birth)?;
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Age as stored on the patient record; empty when it cannot be computed
pub fn age_label(birth: &str, today: NaiveDate) -> String {
    calculate_age(birth, today)
        .map(|age| age.to_string())
        .unwrap_or_default()
}

/// BMI from kilograms and centimetres, when both are positive numbers
pub fn calculate_bmi(weight: &str, height: &str) -> Option<f64> {
    let weight = parse_numeric(weight).filter(|w| *w > 0.0)?;
    let height = parse_numeric(height).filter(|h| *h > 0.0)?;
    let meters = height / 100.0;
    Some(weight / (meters * meters))
}

/// BMI rounded to one decimal; empty when it cannot be computed
pub fn bmi_label(weight: &str, height: &str) -> String {
    calculate_bmi(weight, height)
        .map(|bmi| format!("{:.1}", bmi))
        .unwrap_or_default()
}

/// Recompute `edad`. A blank birth date leaves the stored age alone.
pub fn apply_age(patient: &PatientRecord, today: NaiveDate) -> Option<PatientRecord> {
    if patient.fecha_nacimiento.trim().is_empty() {
        return None;
    }
    let edad = age_label(&patient.fecha_nacimiento, today);
    if edad == patient.edad {
        None
    } else {
        Some(patient.with_field(PatientField::Edad, edad))
    }
}

/// Recompute `imc`, clearing it when weight or height is unusable
pub fn apply_bmi(vitals: &VitalSigns) -> Option<VitalSigns> {
    let imc = bmi_label(&vitals.peso, &vitals.talla);
    if imc == vitals.imc {
        None
    } else {
        Some(vitals.with_field(VitalField::Imc, imc))
    }
}
