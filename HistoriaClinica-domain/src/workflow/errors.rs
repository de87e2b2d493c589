use thiserror::Error;

use historia_clinica_data::{GatewayError, PatientId};

use crate::services::PersistenceError;
use crate::validation::Violations;

/// Message shown when a dependent tab is used before a patient exists
pub const PATIENT_REQUIRED: &str = "Debe crear o seleccionar un paciente primero.";

/// Workflow errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Dependent section used without a patient
    #[error("Debe crear o seleccionar un paciente primero.")]
    PatientRequired,

    /// Section data failed its rules; displays the first violation
    #[error("{0}")]
    Validation(#[from] Violations),

    /// Computed field edited directly
    #[error("El campo {0} se calcula automáticamente")]
    DerivedField(&'static str),

    /// Intake edited or saved again after the patient exists
    #[error("El paciente {0} ya fue registrado")]
    PatientAlreadyCreated(PatientId),

    /// Lab upload with nothing selected
    #[error("Seleccione al menos un archivo")]
    NoLabFiles,

    #[error("Código CIE-10 desconocido: {0}")]
    UnknownIcd10(String),

    #[error("{0}")]
    Gateway(#[from] GatewayError),

    #[error("{0}")]
    Persistence(#[from] PersistenceError),

    #[error("Datos inválidos: {0}")]
    Payload(#[from] serde_json::Error),
}

/// How an error reaches the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Raised locally, never sent to the network
    Validation,
    /// Failed request or non-2xx response
    Network,
    /// Action not allowed in the current state
    Precondition,
}

impl WorkflowError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WorkflowError::Validation(_)
            | WorkflowError::UnknownIcd10(_)
            | WorkflowError::Payload(_) => ErrorCategory::Validation,
            WorkflowError::Gateway(_) | WorkflowError::Persistence(_) => ErrorCategory::Network,
            WorkflowError::PatientRequired
            | WorkflowError::DerivedField(_)
            | WorkflowError::PatientAlreadyCreated(_)
            | WorkflowError::NoLabFiles => ErrorCategory::Precondition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(WorkflowError::PatientRequired.category(), ErrorCategory::Precondition);
        assert_eq!(WorkflowError::PatientRequired.to_string(), PATIENT_REQUIRED);

        let gateway = WorkflowError::from(GatewayError::Http {
            status: 500,
            message: "Error HTTP: 500".to_string(),
        });
        assert_eq!(gateway.category(), ErrorCategory::Network);
        assert_eq!(gateway.to_string(), "Error HTTP: 500");

        let rejected = WorkflowError::from(PersistenceError::Rejected("sin espacio".to_string()));
        assert_eq!(rejected.category(), ErrorCategory::Network);
    }
}
