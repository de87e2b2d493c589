use chrono::NaiveDate;
use serde_json::Value;

use historia_clinica_data::PatientSummary;

use crate::derived::age_label;
use crate::entities::patient::PatientRecord;
use crate::services::patients::PatientListing;

/// Conversion functions between domain entities and data models
/// These functions follow the pattern convert_to_[target]_[model]

/// Convert the intake form into the JSON body of a create-patient request
pub fn convert_to_patient_payload(record: &PatientRecord) -> Result<Value, serde_json::Error> {
    serde_json::to_value(record)
}

/// Convert a search row into an intake form, for reopening an existing patient
pub fn convert_to_patient_record(summary: &PatientSummary, today: NaiveDate) -> PatientRecord {
    let fecha_nacimiento = summary.fecha_nacimiento.clone().unwrap_or_default();
    PatientRecord {
        nombres: summary.nombres.clone(),
        apellidos: summary.apellidos.clone(),
        edad: age_label(&fecha_nacimiento, today),
        fecha_nacimiento,
        sexo: summary.sexo.clone().unwrap_or_default(),
        email: summary.email.clone().unwrap_or_default(),
        celular: summary.celular.clone().unwrap_or_default(),
        tipo_identificacion: summary
            .tipo_identificacion
            .clone()
            .unwrap_or_else(|| PatientRecord::default().tipo_identificacion),
        numero_identificacion: summary.numero_identificacion.clone().unwrap_or_default(),
        ciudad: summary.ciudad.clone().unwrap_or_default(),
        ..PatientRecord::default()
    }
}

/// Convert a search row into a list row with its age label
pub fn convert_to_patient_listing(summary: &PatientSummary, today: NaiveDate) -> PatientListing {
    let edad = summary
        .fecha_nacimiento
        .as_deref()
        .map(|birth| age_label(birth, today))
        .unwrap_or_default();

    PatientListing {
        id: summary.id,
        nombre_completo: summary.full_name(),
        edad,
        identificacion: summary.numero_identificacion.clone().unwrap_or_default(),
        email: summary.email.clone().unwrap_or_default(),
        celular: summary.celular.clone().unwrap_or_default(),
        ciudad: summary.ciudad.clone().unwrap_or_default(),
    }
}
