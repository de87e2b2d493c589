use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One tab per section, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tab {
    #[serde(rename = "nuevo-paciente")]
    PatientIntake,
    #[serde(rename = "padecimiento")]
    PresentIllness,
    #[serde(rename = "vitales")]
    Vitals,
    #[serde(rename = "antecedentes")]
    History,
    #[serde(rename = "exploracion")]
    PhysicalExam,
    #[serde(rename = "diagnostico")]
    Diagnosis,
    #[serde(rename = "tratamiento")]
    Treatment,
    #[serde(rename = "laboratorio")]
    Lab,
}

impl Tab {
    pub const ALL: [Tab; 8] = [
        Tab::PatientIntake,
        Tab::PresentIllness,
        Tab::Vitals,
        Tab::History,
        Tab::PhysicalExam,
        Tab::Diagnosis,
        Tab::Treatment,
        Tab::Lab,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Tab::PatientIntake => "nuevo-paciente",
            Tab::PresentIllness => "padecimiento",
            Tab::Vitals => "vitales",
            Tab::History => "antecedentes",
            Tab::PhysicalExam => "exploracion",
            Tab::Diagnosis => "diagnostico",
            Tab::Treatment => "tratamiento",
            Tab::Lab => "laboratorio",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::PatientIntake => "Datos Paciente",
            Tab::PresentIllness => "Padecimiento Actual",
            Tab::Vitals => "Signos Vitales",
            Tab::History => "Antecedentes",
            Tab::PhysicalExam => "Exploración Física",
            Tab::Diagnosis => "Diagnóstico",
            Tab::Treatment => "Tratamiento",
            Tab::Lab => "Laboratorio",
        }
    }

    /// Every tab but intake belongs to an existing patient
    pub fn requires_patient(self) -> bool {
        self != Tab::PatientIntake
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.id() == s)
            .ok_or_else(|| format!("Pestaña desconocida: {}", s))
    }
}

/// Display state of a tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TabView {
    pub tab: Tab,
    pub label: &'static str,
    /// Inputs accept edits
    pub editable: bool,
    pub active: bool,
}
