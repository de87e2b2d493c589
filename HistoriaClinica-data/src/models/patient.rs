use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-issued patient identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub i64);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PatientId {
    fn from(id: i64) -> Self {
        PatientId(id)
    }
}

/// Identifier returned by a successful patient creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPatient {
    /// The new patient's id
    pub id: PatientId,
}

/// Patient row as returned by list and search endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: PatientId,
    #[serde(default)]
    pub nombres: String,
    #[serde(default)]
    pub apellidos: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sexo: Option<String>,
    /// ISO `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_nacimiento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_identificacion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_identificacion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub celular: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ciudad: Option<String>,
}

impl PatientSummary {
    /// `nombres apellidos`, trimmed
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombres, self.apellidos).trim().to_string()
    }
}

/// Normalized search result: the only shape callers ever see
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSearchResult {
    pub patients: Vec<PatientSummary>,
    pub count: usize,
    pub search_term: String,
}

impl PatientSearchResult {
    /// Empty result for a term
    pub fn empty(search_term: impl Into<String>) -> Self {
        Self {
            patients: Vec::new(),
            count: 0,
            search_term: search_term.into(),
        }
    }
}

/// Search payload shapes accepted from the backend.
///
/// `Listing` is the contract. The other variants are a defensive adapter for
/// older backend builds that answer with a singular `patient` or a bare array;
/// they are normalized away in [`crate::gateway::normalize`] and never leak to
/// callers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SearchPayload {
    /// `{patients: [...], count?, searchTerm?}`
    Listing {
        patients: Vec<PatientSummary>,
        #[serde(default)]
        count: Option<usize>,
        #[serde(default, rename = "searchTerm")]
        search_term: Option<String>,
    },
    /// `{patient: {...} | [...], count?, searchTerm?}`
    Single {
        patient: OneOrMany,
        #[serde(default)]
        count: Option<usize>,
        #[serde(default, rename = "searchTerm")]
        search_term: Option<String>,
    },
    /// `[...]`
    Bare(Vec<PatientSummary>),
}

/// A single patient object or a list of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(Box<PatientSummary>),
    Many(Vec<PatientSummary>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<PatientSummary> {
        match self {
            OneOrMany::One(patient) => vec![*patient],
            OneOrMany::Many(patients) => patients,
        }
    }
}
