use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::forms::section_fields;
use crate::validation::SectionRules;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct TreatmentPlan {
    #[validate(length(min = 3, message = "Incluye al menos un fármaco"))]
    pub medicamentos: String,
    #[validate(length(min = 3, message = "Incluye indicaciones"))]
    pub indicaciones: String,
    pub recomendaciones: String,
    pub proxima_cita: String,
}

section_fields! {
    TreatmentPlan => TreatmentField {
        Medicamentos => medicamentos,
        Indicaciones => indicaciones,
        Recomendaciones => recomendaciones,
        ProximaCita => proxima_cita,
    }
}

impl SectionRules for TreatmentPlan {
    const FIELD_ORDER: &'static [&'static str] = &["medicamentos", "indicaciones"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::SectionForm;
    use crate::validation::validate_section;

    #[test]
    fn test_plan_requires_medication_and_instructions() {
        let plan =
            TreatmentPlan::default().with_field(TreatmentField::Medicamentos, "Paracetamol 500mg");
        let violations = validate_section(&plan).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.first_message(), "Incluye indicaciones");

        let plan = plan.with_field(TreatmentField::Indicaciones, "Cada 8 horas por 3 días");
        assert!(validate_section(&plan).is_ok());
    }
}
