use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::forms::section_fields;
use crate::validation::SectionRules;

/// Reason for the visit and how the complaint evolved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PresentIllness {
    #[validate(length(min = 3, message = "Describe el motivo"))]
    pub motivo_consulta: String,
    #[validate(length(min = 3, message = "Describe el inicio/evolución"))]
    pub inicio_sintomas: String,
    pub evolucion: String,
    pub sintomas_asociados: String,
    pub tratamiento_previo: String,
}

section_fields! {
    PresentIllness => IllnessField {
        MotivoConsulta => motivo_consulta,
        InicioSintomas => inicio_sintomas,
        Evolucion => evolucion,
        SintomasAsociados => sintomas_asociados,
        TratamientoPrevio => tratamiento_previo,
    }
}

impl SectionRules for PresentIllness {
    const FIELD_ORDER: &'static [&'static str] = &["motivo_consulta", "inicio_sintomas"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::SectionForm;
    use crate::validation::validate_section;

    #[test]
    fn test_required_narratives() {
        let violations = validate_section(&PresentIllness::default()).unwrap_err();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations.first_message(), "Describe el motivo");

        let illness = PresentIllness::default()
            .with_field(IllnessField::MotivoConsulta, "Dolor abdominal")
            .with_field(IllnessField::InicioSintomas, "Hace 3 días");
        assert!(validate_section(&illness).is_ok());
    }

    #[test]
    fn test_second_narrative_message() {
        let illness = PresentIllness::default().with_field(IllnessField::MotivoConsulta, "Tos");
        let violations = validate_section(&illness).unwrap_err();
        assert_eq!(violations.first_message(), "Describe el inicio/evolución");
    }

    #[test]
    fn test_reads_padecimiento_payload() -> anyhow::Result<()> {
        let payload = serde_json::json!({
            "motivoConsulta": "Cefalea",
            "inicioSintomas": "Hace una semana",
            "tratamientoPrevio": "Ibuprofeno"
        });

        let illness: PresentIllness = serde_json::from_value(payload)?;
        assert_eq!(illness.tratamiento_previo, "Ibuprofeno");
        assert!(validate_section(&illness).is_ok());

        let written = serde_json::to_value(&illness)?;
        assert_eq!(written["tratamientoPrevio"], "Ibuprofeno");
        assert_eq!(written.as_object().map(|o| o.len()), Some(5));
        Ok(())
    }
}
