// Gateway module structure
pub mod errors;
mod http;
pub mod normalize;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{CreatedPatient, PatientSearchResult};

// Re-export commonly used types
pub use errors::{GatewayError, GatewayResult};
pub use http::HttpClinicalApi;

/// Operations exposed by the clinical records backend
#[async_trait]
pub trait ClinicalApiTrait: Send + Sync {
    /// `POST /auth/login`; returns the raw response body
    async fn login(&self, email: &str, password: &str) -> GatewayResult<Value>;

    /// `POST /patients`; returns the server-issued id
    async fn create_patient(&self, patient: &Value) -> GatewayResult<CreatedPatient>;

    /// `GET /patients/search/{term}`; returns the normalized result
    async fn search_patients(&self, term: &str) -> GatewayResult<PatientSearchResult>;

    /// `POST /medical-records`; returns the raw response body
    async fn create_medical_record(&self, record: &Value) -> GatewayResult<Value>;
}

#[async_trait]
impl<T: ClinicalApiTrait + ?Sized> ClinicalApiTrait for Arc<T> {
    async fn login(&self, email: &str, password: &str) -> GatewayResult<Value> {
        (**self).login(email, password).await
    }

    async fn create_patient(&self, patient: &Value) -> GatewayResult<CreatedPatient> {
        (**self).create_patient(patient).await
    }

    async fn search_patients(&self, term: &str) -> GatewayResult<PatientSearchResult> {
        (**self).search_patients(term).await
    }

    async fn create_medical_record(&self, record: &Value) -> GatewayResult<Value> {
        (**self).create_medical_record(record).await
    }
}
