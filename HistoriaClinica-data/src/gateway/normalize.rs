//! Normalization of patient search payloads.
//!
//! The backend contract is the `Listing` shape. The remaining
//! [`SearchPayload`] variants are accepted only so older backend builds keep
//! working; everything is folded into one [`PatientSearchResult`].

use serde_json::Value;
use tracing::debug;

use crate::models::{PatientSearchResult, PatientSummary, SearchPayload};

/// Fold any accepted search payload into the canonical result
pub fn normalize_search_payload(
    payload: Value,
    term: &str,
) -> Result<PatientSearchResult, serde_json::Error> {
    if payload.is_null() {
        return Ok(PatientSearchResult::empty(term));
    }

    let parsed: SearchPayload = serde_json::from_value(payload)?;
    let result = match parsed {
        SearchPayload::Listing {
            patients,
            count,
            search_term,
        } => assemble(patients, count, search_term, term),
        SearchPayload::Single {
            patient,
            count,
            search_term,
        } => {
            debug!("Search payload used the singular `patient` shape");
            assemble(patient.into_vec(), count, search_term, term)
        }
        SearchPayload::Bare(patients) => {
            debug!("Search payload was a bare array");
            assemble(patients, None, None, term)
        }
    };

    Ok(result)
}

fn assemble(
    patients: Vec<PatientSummary>,
    count: Option<usize>,
    search_term: Option<String>,
    term: &str,
) -> PatientSearchResult {
    let count = count.unwrap_or(patients.len());
    PatientSearchResult {
        patients,
        count,
        search_term: search_term.unwrap_or_else(|| term.to_string()),
    }
}
