use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::catalog::Icd10Entry;
use crate::forms::section_fields;
use crate::validation::SectionRules;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct Diagnosis {
    #[validate(length(min = 3, message = "Describe el diagnóstico principal"))]
    pub principal: String,
    pub secundarios: String,
    pub diferencial: String,
    /// Selected code, stored as `CODE - description`
    pub cie10: String,
}

section_fields! {
    Diagnosis => DiagnosisField {
        Principal => principal,
        Secundarios => secundarios,
        Diferencial => diferencial,
        Cie10 => cie10,
    }
}

impl Diagnosis {
    /// Return a copy with the ICD-10 selection set
    pub fn with_icd10(&self, entry: &Icd10Entry) -> Self {
        Self {
            cie10: entry.label(),
            ..self.clone()
        }
    }
}

impl SectionRules for Diagnosis {
    const FIELD_ORDER: &'static [&'static str] = &["principal"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_icd10;
    use crate::validation::validate_section;

    #[test]
    fn test_principal_required() {
        let violations = validate_section(&Diagnosis::default()).unwrap_err();
        assert_eq!(violations.first_message(), "Describe el diagnóstico principal");
    }

    #[test]
    fn test_icd10_selection_label() {
        let entry = find_icd10("r51").unwrap();
        let diagnosis = Diagnosis::default().with_icd10(entry);
        assert_eq!(diagnosis.cie10, "R51 - Cefalea");
    }

    #[test]
    fn test_reads_diagnostico_payload() -> anyhow::Result<()> {
        let payload = serde_json::json!({
            "principal": "Migraña sin aura",
            "diferencial": "Cefalea tensional",
            "cie10": "R51 - Cefalea"
        });

        let diagnosis: Diagnosis = serde_json::from_value(payload)?;
        assert_eq!(diagnosis.diferencial, "Cefalea tensional");

        let written = serde_json::to_value(&diagnosis)?;
        assert_eq!(written["diferencial"], "Cefalea tensional");
        assert_eq!(written.as_object().map(|o| o.len()), Some(4));
        Ok(())
    }
}
