// Testing double for the backend gateway
// Only available in tests and when the "mock" feature is enabled

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::errors::{GatewayError, GatewayResult};
use super::ClinicalApiTrait;
use crate::models::{CreatedPatient, PatientId, PatientSearchResult, PatientSummary};

/// A call received by the mock gateway
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Login { email: String },
    CreatePatient(Value),
    SearchPatients(String),
    CreateMedicalRecord(Value),
}

/// In-memory implementation of `ClinicalApiTrait`
pub struct MockClinicalApi {
    next_patient_id: RwLock<i64>,
    failure: Option<(u16, String)>,
    login_body: Value,
    patients: Vec<PatientSummary>,
    calls: Mutex<Vec<ApiCall>>,
}

impl Default for MockClinicalApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClinicalApi {
    /// Create a mock that accepts every call; created patients start at id 1
    pub fn new() -> Self {
        Self {
            next_patient_id: RwLock::new(1),
            failure: None,
            login_body: json!({
                "success": true,
                "token": "mock-token",
                "user": {"name": "Dr. Prueba", "email": "doctor@ejemplo.com"}
            }),
            patients: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Configure the id handed to the next created patient
    pub fn with_next_patient_id(mut self, id: i64) -> Self {
        self.next_patient_id = RwLock::new(id);
        self
    }

    /// Make every call fail with the given status and backend message
    pub fn with_failure(mut self, status: u16, message: &str) -> Self {
        self.failure = Some((status, message.to_string()));
        self
    }

    /// Configure the login response body
    pub fn with_login_body(mut self, body: Value) -> Self {
        self.login_body = body;
        self
    }

    /// Patients returned by searches (filtered by name or identification)
    pub fn with_patients(mut self, patients: Vec<PatientSummary>) -> Self {
        self.patients = patients;
        self
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<ApiCall> {
        self.call_log().clone()
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.call_log().len()
    }

    // Poisoning only follows a panicking test; the recorded calls stay readable
    fn call_log(&self) -> MutexGuard<'_, Vec<ApiCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: ApiCall) -> GatewayResult<()> {
        self.call_log().push(call);
        match &self.failure {
            Some((status, message)) => Err(GatewayError::Http {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClinicalApiTrait for MockClinicalApi {
    async fn login(&self, email: &str, _password: &str) -> GatewayResult<Value> {
        self.record(ApiCall::Login { email: email.to_string() })?;
        Ok(self.login_body.clone())
    }

    async fn create_patient(&self, patient: &Value) -> GatewayResult<CreatedPatient> {
        self.record(ApiCall::CreatePatient(patient.clone()))?;
        let mut next = self
            .next_patient_id
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let id = PatientId(*next);
        *next += 1;
        Ok(CreatedPatient { id })
    }

    async fn search_patients(&self, term: &str) -> GatewayResult<PatientSearchResult> {
        self.record(ApiCall::SearchPatients(term.to_string()))?;
        let needle = term.to_lowercase();
        let patients: Vec<PatientSummary> = self
            .patients
            .iter()
            .filter(|p| {
                p.full_name().to_lowercase().contains(&needle)
                    || p.numero_identificacion.as_deref().unwrap_or("").contains(&needle)
            })
            .cloned()
            .collect();

        Ok(PatientSearchResult {
            count: patients.len(),
            patients,
            search_term: term.to_string(),
        })
    }

    async fn create_medical_record(&self, record: &Value) -> GatewayResult<Value> {
        self.record(ApiCall::CreateMedicalRecord(record.clone()))?;
        Ok(json!({"success": true, "data": record}))
    }
}
