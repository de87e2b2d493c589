use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::forms::{section_fields, SectionForm};
use crate::validation::{NumericRule, SectionRules};

/// Vital signs, kept as the raw text typed on the form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VitalSigns {
    pub temperatura: String,
    pub presion_sistolica: String,
    pub presion_diastolica: String,
    pub frecuencia_cardiaca: String,
    pub frecuencia_respiratoria: String,
    pub saturacion_oxigeno: String,
    pub peso: String,
    pub talla: String,
    /// Derived from `peso` and `talla`
    pub imc: String,
}

section_fields! {
    /// Fields of [`VitalSigns`]
    VitalSigns => VitalField {
        Temperatura => temperatura,
        PresionSistolica => presion_sistolica,
        PresionDiastolica => presion_diastolica,
        FrecuenciaCardiaca => frecuencia_cardiaca,
        FrecuenciaRespiratoria => frecuencia_respiratoria,
        SaturacionOxigeno => saturacion_oxigeno,
        Peso => peso,
        Talla => talla,
        Imc => imc,
    }
    derived [Imc]
}

impl VitalField {
    /// Label and physiological bounds of the field
    pub fn rule(self) -> NumericRule {
        match self {
            VitalField::Temperatura => NumericRule::new("Temperatura", 30.0, 45.0),
            VitalField::PresionSistolica => NumericRule::new("P. Sistólica", 60.0, 250.0),
            VitalField::PresionDiastolica => NumericRule::new("P. Diastólica", 30.0, 150.0),
            VitalField::FrecuenciaCardiaca => NumericRule::new("Frec. Cardíaca", 20.0, 220.0),
            VitalField::FrecuenciaRespiratoria => {
                NumericRule::new("Frec. Respiratoria", 6.0, 60.0)
            }
            VitalField::SaturacionOxigeno => NumericRule::new("Sat. Oxígeno", 50.0, 100.0),
            VitalField::Peso => NumericRule::new("Peso", 1.0, 500.0),
            VitalField::Talla => NumericRule::new("Talla", 30.0, 250.0),
            VitalField::Imc => NumericRule::new("IMC", 5.0, 80.0),
        }
    }
}

// Every field is optional text; a manual impl keeps the numeric rules in one table
impl Validate for VitalSigns {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for &field in VitalField::ALL {
            if let Err(error) = field.rule().check(self.field(field)) {
                errors.add(field.key(), error);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl SectionRules for VitalSigns {
    const FIELD_ORDER: &'static [&'static str] = &[
        "temperatura",
        "presion_sistolica",
        "presion_diastolica",
        "frecuencia_cardiaca",
        "frecuencia_respiratoria",
        "saturacion_oxigeno",
        "peso",
        "talla",
        "imc",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_section;

    #[test]
    fn test_blank_vitals_are_valid() {
        assert!(validate_section(&VitalSigns::default()).is_ok());
    }

    #[test]
    fn test_each_field_reports_its_label() {
        let vitals = VitalSigns::default()
            .with_field(VitalField::SaturacionOxigeno, "101")
            .with_field(VitalField::PresionSistolica, "40")
            .with_field(VitalField::Peso, "setenta");

        let violations = validate_section(&vitals).unwrap_err();
        let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "P. Sistólica mínimo 60",
                "Sat. Oxígeno máximo 100",
                "Peso debe ser numérico"
            ]
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        for &field in VitalField::ALL {
            let rule = field.rule();
            let at_min = VitalSigns::default().with_field(field, rule.min.to_string());
            let at_max = VitalSigns::default().with_field(field, rule.max.to_string());
            assert!(validate_section(&at_min).is_ok(), "{:?} min", field);
            assert!(validate_section(&at_max).is_ok(), "{:?} max", field);
        }
    }

    #[test]
    fn test_decimal_values() {
        let vitals = VitalSigns::default()
            .with_field(VitalField::Temperatura, "36.7")
            .with_field(VitalField::Talla, " 172.5 ");
        assert!(validate_section(&vitals).is_ok());
    }
}
