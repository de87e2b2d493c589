mod errors;
mod loading;
mod notice;
mod orchestrator;
mod tabs;

// Tab orchestrator
// Drives one clinical record: which tabs are editable, derived fields and saves.

pub use errors::{ErrorCategory, WorkflowError, PATIENT_REQUIRED};
pub use loading::{LoadingFlag, LoadingGuard};
pub use notice::{Notice, NoticeKind};
pub use orchestrator::{
    ClinicalRecordWorkflow, DIAGNOSIS_SAVED, HISTORY_SAVED, LAB_FILES_REGISTERED, PATIENT_CREATED,
    PHYSICAL_EXAM_SAVED, PRESENT_ILLNESS_SAVED, TREATMENT_SAVED, VITAL_SIGNS_SAVED,
};
pub use tabs::{Tab, TabView};

use historia_clinica_data::{GatewayResult, HttpClinicalApi};

use crate::services::NoopPersistence;

/// Workflow over the HTTP backend configured from the environment
pub fn create_default_workflow(
) -> GatewayResult<ClinicalRecordWorkflow<HttpClinicalApi, NoopPersistence>> {
    let api = HttpClinicalApi::from_env()?;
    Ok(ClinicalRecordWorkflow::new(api, NoopPersistence))
}
