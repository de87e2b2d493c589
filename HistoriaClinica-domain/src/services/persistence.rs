use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, instrument};

use historia_clinica_data::PatientId;

use crate::entities::{
    Diagnosis, LabFile, MedicalHistory, PhysicalExam, PresentIllness, TreatmentPlan, VitalSigns,
};

/// Persistence errors for dependent sections
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The backend refused or failed the write
    #[error("{0}")]
    Rejected(String),
}

/// Where dependent sections are saved.
///
/// The backend has no agreed shape for these sections yet, so the default
/// implementation ([`NoopPersistence`]) only logs the call and reports success.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn save_present_illness(
        &self,
        patient_id: PatientId,
        section: &PresentIllness,
    ) -> Result<(), PersistenceError>;

    async fn save_vital_signs(
        &self,
        patient_id: PatientId,
        section: &VitalSigns,
    ) -> Result<(), PersistenceError>;

    async fn save_medical_history(
        &self,
        patient_id: PatientId,
        section: &MedicalHistory,
    ) -> Result<(), PersistenceError>;

    async fn save_physical_exam(
        &self,
        patient_id: PatientId,
        section: &PhysicalExam,
    ) -> Result<(), PersistenceError>;

    async fn save_diagnosis(
        &self,
        patient_id: PatientId,
        section: &Diagnosis,
    ) -> Result<(), PersistenceError>;

    async fn save_treatment_plan(
        &self,
        patient_id: PatientId,
        section: &TreatmentPlan,
    ) -> Result<(), PersistenceError>;

    /// Transfer pending lab files
    async fn upload_lab_files(
        &self,
        patient_id: PatientId,
        files: &[LabFile],
    ) -> Result<(), PersistenceError>;
}

/// Accepts every save without persisting anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPersistence;

impl NoopPersistence {
    fn accept(section: &str, patient_id: PatientId) -> Result<(), PersistenceError> {
        info!(%patient_id, section, "Section accepted without persisting");
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for NoopPersistence {
    #[instrument(skip(self, _section))]
    async fn save_present_illness(
        &self,
        patient_id: PatientId,
        _section: &PresentIllness,
    ) -> Result<(), PersistenceError> {
        Self::accept("padecimiento", patient_id)
    }

    #[instrument(skip(self, _section))]
    async fn save_vital_signs(
        &self,
        patient_id: PatientId,
        _section: &VitalSigns,
    ) -> Result<(), PersistenceError> {
        Self::accept("vitales", patient_id)
    }

    #[instrument(skip(self, _section))]
    async fn save_medical_history(
        &self,
        patient_id: PatientId,
        _section: &MedicalHistory,
    ) -> Result<(), PersistenceError> {
        Self::accept("antecedentes", patient_id)
    }

    #[instrument(skip(self, _section))]
    async fn save_physical_exam(
        &self,
        patient_id: PatientId,
        _section: &PhysicalExam,
    ) -> Result<(), PersistenceError> {
        Self::accept("exploracion", patient_id)
    }

    #[instrument(skip(self, _section))]
    async fn save_diagnosis(
        &self,
        patient_id: PatientId,
        _section: &Diagnosis,
    ) -> Result<(), PersistenceError> {
        Self::accept("diagnostico", patient_id)
    }

    #[instrument(skip(self, _section))]
    async fn save_treatment_plan(
        &self,
        patient_id: PatientId,
        _section: &TreatmentPlan,
    ) -> Result<(), PersistenceError> {
        Self::accept("tratamiento", patient_id)
    }

    #[instrument(skip(self, files))]
    async fn upload_lab_files(
        &self,
        patient_id: PatientId,
        files: &[LabFile],
    ) -> Result<(), PersistenceError> {
        for file in files {
            debug!(name = %file.name, size_kb = file.size_kb(), "Pending lab file");
        }
        Self::accept("laboratorio", patient_id)
    }
}

#[async_trait]
impl<T: PersistenceGateway + ?Sized> PersistenceGateway for Arc<T> {
    async fn save_present_illness(
        &self,
        patient_id: PatientId,
        section: &PresentIllness,
    ) -> Result<(), PersistenceError> {
        (**self).save_present_illness(patient_id, section).await
    }

    async fn save_vital_signs(
        &self,
        patient_id: PatientId,
        section: &VitalSigns,
    ) -> Result<(), PersistenceError> {
        (**self).save_vital_signs(patient_id, section).await
    }

    async fn save_medical_history(
        &self,
        patient_id: PatientId,
        section: &MedicalHistory,
    ) -> Result<(), PersistenceError> {
        (**self).save_medical_history(patient_id, section).await
    }

    async fn save_physical_exam(
        &self,
        patient_id: PatientId,
        section: &PhysicalExam,
    ) -> Result<(), PersistenceError> {
        (**self).save_physical_exam(patient_id, section).await
    }

    async fn save_diagnosis(
        &self,
        patient_id: PatientId,
        section: &Diagnosis,
    ) -> Result<(), PersistenceError> {
        (**self).save_diagnosis(patient_id, section).await
    }

    async fn save_treatment_plan(
        &self,
        patient_id: PatientId,
        section: &TreatmentPlan,
    ) -> Result<(), PersistenceError> {
        (**self).save_treatment_plan(patient_id, section).await
    }

    async fn upload_lab_files(
        &self,
        patient_id: PatientId,
        files: &[LabFile],
    ) -> Result<(), PersistenceError> {
        (**self).upload_lab_files(patient_id, files).await
    }
}
