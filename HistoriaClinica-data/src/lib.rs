// HistoriaClinica Data
// This crate handles the external clinical records backend

// Gateway configuration resolved at startup
pub mod config;

// API gateway trait, HTTP implementation and test doubles
pub mod gateway;

// Wire models exchanged with the backend
pub mod models;

pub use config::GatewayConfig;
pub use gateway::{ClinicalApiTrait, GatewayError, GatewayResult, HttpClinicalApi};
pub use models::{ApiResponse, CreatedPatient, PatientId, PatientSearchResult, PatientSummary};
