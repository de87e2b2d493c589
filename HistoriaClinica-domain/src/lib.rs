// HistoriaClinica Domain
// This crate contains the clinical record workflow: section forms, validation
// rules, derived fields and the tab orchestrator

// Section form models and field access
pub mod forms;

// Field validators shared by every section
pub mod validation;

// Derived fields (age, BMI)
pub mod derived;

// Domain entities
pub mod entities;

// ICD-10 reference lookup
pub mod catalog;

// Patient QR payload
pub mod qr;

// Session handling
pub mod auth;

// Services around the backend: persistence stubs and the patient directory
pub mod services;

// Tab orchestrator
pub mod workflow;

// Re-export the data crate for convenience
pub use historia_clinica_data as data;
