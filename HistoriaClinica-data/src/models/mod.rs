// Wire models for the clinical records backend
pub mod envelope;
pub mod patient;

// Re-export common types for easier imports
pub use envelope::ApiResponse;
pub use patient::{CreatedPatient, PatientId, PatientSearchResult, PatientSummary, SearchPayload};
