use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::forms::section_fields;
use crate::validation::SectionRules;

/// Personal and family background
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalHistory {
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub personales_patologicos: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub personales_no_patologicos: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub familiares: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub ginecobstetricos: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub quirurgicos: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub alergias: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub medicamentos: String,
}

section_fields! {
    MedicalHistory => HistoryField {
        PersonalesPatologicos => personales_patologicos,
        PersonalesNoPatologicos => personales_no_patologicos,
        Familiares => familiares,
        Ginecobstetricos => ginecobstetricos,
        Quirurgicos => quirurgicos,
        Alergias => alergias,
        Medicamentos => medicamentos,
    }
}

impl SectionRules for MedicalHistory {
    const FIELD_ORDER: &'static [&'static str] = &[
        "personales_patologicos",
        "personales_no_patologicos",
        "familiares",
        "ginecobstetricos",
        "quirurgicos",
        "alergias",
        "medicamentos",
    ];
}
