use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::forms::{section_fields, SectionForm};
use crate::validation::{SectionRules, DATE_FORMAT};

/// General inspection of the patient
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralExam {
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub aspecto_general: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub estado_conciencia: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub orientacion: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub hidratacion: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub coloracion: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub constitucion: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub actitud: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub facies: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub marcha: String,
}

section_fields! {
    GeneralExam => GeneralExamField {
        AspectoGeneral => aspecto_general,
        EstadoConciencia => estado_conciencia,
        Orientacion => orientacion,
        Hidratacion => hidratacion,
        Coloracion => coloracion,
        Constitucion => constitucion,
        Actitud => actitud,
        Facies => facies,
        Marcha => marcha,
    }
}

/// Examination by body system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemsExam {
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub cabeza_cuello: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub cardiopulmonar: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub abdomen: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub extremidades: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub neurologico: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub piel: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub ganglios: String,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub genitourinario: String,
}

section_fields! {
    SystemsExam => SystemsExamField {
        CabezaCuello => cabeza_cuello,
        Cardiopulmonar => cardiopulmonar,
        Abdomen => abdomen,
        Extremidades => extremidades,
        Neurologico => neurologico,
        Piel => piel,
        Ganglios => ganglios,
        Genitourinario => genitourinario,
    }
}

/// Normal and abnormal findings plus the examiner's impression
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecificFindings {
    pub hallazgos_normales: Vec<String>,
    pub hallazgos_anormales: Vec<String>,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub impresion_clinica: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PhysicalExam {
    #[validate]
    pub exploracion_general: GeneralExam,
    #[validate]
    pub exploracion_sistemas: SystemsExam,
    #[validate]
    pub hallazgos_especificos: SpecificFindings,
    #[validate(length(max = 4000, message = "Máximo 4000 caracteres"))]
    pub observaciones_generales: String,
    pub fecha_exploracion: String,
    pub explorado_por: String,
}

section_fields! {
    /// Top-level text fields of [`PhysicalExam`]
    PhysicalExam => ExamField {
        ObservacionesGenerales => observaciones_generales,
        FechaExploracion => fecha_exploracion,
        ExploradoPor => explorado_por,
    }
}

/// A field inside one of the exam's sub-objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NestedExamField {
    General(GeneralExamField),
    Systems(SystemsExamField),
    ImpresionClinica,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingKind {
    Normal,
    Anormal,
}

impl PhysicalExam {
    /// Blank exam dated `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            fecha_exploracion: today.format(DATE_FORMAT).to_string(),
            ..Self::default()
        }
    }

    pub fn nested(&self, field: NestedExamField) -> &str {
        match field {
            NestedExamField::General(f) => self.exploracion_general.field(f),
            NestedExamField::Systems(f) => self.exploracion_sistemas.field(f),
            NestedExamField::ImpresionClinica => &self.hallazgos_especificos.impresion_clinica,
        }
    }

    /// Return a copy with one sub-object field replaced
    pub fn set_nested(&self, field: NestedExamField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        match field {
            NestedExamField::General(f) => {
                next.exploracion_general = self.exploracion_general.with_field(f, value)
            }
            NestedExamField::Systems(f) => {
                next.exploracion_sistemas = self.exploracion_sistemas.with_field(f, value)
            }
            NestedExamField::ImpresionClinica => {
                next.hallazgos_especificos.impresion_clinica = value.into()
            }
        }
        next
    }

    pub fn findings(&self, kind: FindingKind) -> &[String] {
        match kind {
            FindingKind::Normal => &self.hallazgos_especificos.hallazgos_normales,
            FindingKind::Anormal => &self.hallazgos_especificos.hallazgos_anormales,
        }
    }

    /// Append a finding; blank text leaves the exam unchanged
    pub fn with_finding(&self, kind: FindingKind, text: &str) -> Self {
        let text = text.trim();
        let mut next = self.clone();
        if !text.is_empty() {
            next.findings_mut(kind).push(text.to_string());
        }
        next
    }

    /// Drop the finding at `index`; an out-of-range index leaves the exam unchanged
    pub fn without_finding(&self, kind: FindingKind, index: usize) -> Self {
        let mut next = self.clone();
        let list = next.findings_mut(kind);
        if index < list.len() {
            list.remove(index);
        }
        next
    }

    fn findings_mut(&mut self, kind: FindingKind) -> &mut Vec<String> {
        match kind {
            FindingKind::Normal => &mut self.hallazgos_especificos.hallazgos_normales,
            FindingKind::Anormal => &mut self.hallazgos_especificos.hallazgos_anormales,
        }
    }
}

impl SectionRules for PhysicalExam {
    const FIELD_ORDER: &'static [&'static str] = &[
        "exploracion_general.aspecto_general",
        "exploracion_general.estado_conciencia",
        "exploracion_general.orientacion",
        "exploracion_general.hidratacion",
        "exploracion_general.coloracion",
        "exploracion_general.constitucion",
        "exploracion_general.actitud",
        "exploracion_general.facies",
        "exploracion_general.marcha",
        "exploracion_sistemas.cabeza_cuello",
        "exploracion_sistemas.cardiopulmonar",
        "exploracion_sistemas.abdomen",
        "exploracion_sistemas.extremidades",
        "exploracion_sistemas.neurologico",
        "exploracion_sistemas.piel",
        "exploracion_sistemas.ganglios",
        "exploracion_sistemas.genitourinario",
        "hallazgos_especificos.impresion_clinica",
        "observaciones_generales",
    ];
}
