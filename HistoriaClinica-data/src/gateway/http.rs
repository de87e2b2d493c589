use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};

use super::errors::{GatewayError, GatewayResult};
use super::normalize::normalize_search_payload;
use super::ClinicalApiTrait;
use crate::config::GatewayConfig;
use crate::models::{CreatedPatient, PatientId, PatientSearchResult};

const LOGIN_CONTEXT: &str = "Error en login";
const CREATE_PATIENT_CONTEXT: &str = "Error creando paciente";
const SEARCH_CONTEXT: &str = "Error buscando pacientes";
const MEDICAL_RECORD_CONTEXT: &str = "Error creando historia clínica";

/// `ClinicalApiTrait` over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpClinicalApi {
    client: Client,
    config: GatewayConfig,
}

impl HttpClinicalApi {
    /// Build a gateway for the given configuration
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        debug!("HTTP gateway ready for {}", config.base_url);
        Ok(Self { client, config })
    }

    /// Build a gateway from environment configuration
    pub fn from_env() -> GatewayResult<Self> {
        Self::new(GatewayConfig::from_env())
    }

    /// The configuration this gateway was built with
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Send a request and return the parsed body of a successful response
    async fn execute(
        &self,
        context: &'static str,
        request: RequestBuilder,
    ) -> GatewayResult<Value> {
        // Request URLs can embed search terms, so they never reach logs or errors
        let response = request.send().await.map_err(|source| {
            let source = source.without_url();
            error!("{}: transport failure: {}", context, source);
            GatewayError::Network { context, source }
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|source| {
            let source = source.without_url();
            error!("{}: failed to read response body: {}", context, source);
            GatewayError::Network { context, source }
        })?;
        let body: Option<Value> = serde_json::from_str(&text).ok();

        if !(200..300).contains(&status) {
            let message = failure_message(status, body.as_ref());
            warn!(status, "{}: backend rejected request", context);
            return Err(GatewayError::Http { status, message });
        }

        let body = body.ok_or_else(|| {
            warn!(status, "{}: response body is not JSON", context);
            GatewayError::InvalidResponse {
                context,
                details: format!("{}: respuesta inválida del servidor", context),
            }
        })?;

        // Some endpoints answer 200 with an explicit failure envelope
        if body.get("success") == Some(&Value::Bool(false)) {
            let message = failure_message(status, Some(&body));
            warn!(status, "{}: backend reported failure", context);
            return Err(GatewayError::Http { status, message });
        }

        Ok(body)
    }
}

/// Error text for a failed response: the body's `error` field when present,
/// otherwise a generic message embedding the status code
pub(crate) fn failure_message(status: u16, body: Option<&Value>) -> String {
    match body {
        Some(body) => match body.get("error").and_then(Value::as_str) {
            Some(message) if !message.trim().is_empty() => message.to_string(),
            _ => format!("HTTP {}: {}", status, body),
        },
        None => format!("Error HTTP: {}", status),
    }
}

#[async_trait]
impl ClinicalApiTrait for HttpClinicalApi {
    #[instrument(skip_all)]
    async fn login(&self, email: &str, password: &str) -> GatewayResult<Value> {
        let request = self
            .client
            .post(self.config.endpoint("auth/login"))
            .json(&json!({ "email": email, "password": password }));

        let body = self.execute(LOGIN_CONTEXT, request).await?;
        info!("Login accepted by backend");
        Ok(body)
    }

    #[instrument(skip_all)]
    async fn create_patient(&self, patient: &Value) -> GatewayResult<CreatedPatient> {
        let request = self.client.post(self.config.endpoint("patients")).json(patient);
        let body = self.execute(CREATE_PATIENT_CONTEXT, request).await?;

        let id = body
            .pointer("/data/patient/id")
            .cloned()
            .and_then(|id| serde_json::from_value::<PatientId>(id).ok())
            .ok_or_else(|| {
                warn!("Patient creation response carried no patient id");
                GatewayError::InvalidResponse {
                    context: CREATE_PATIENT_CONTEXT,
                    details: "Error al crear paciente.".to_string(),
                }
            })?;

        info!(patient_id = %id, "Patient created");
        Ok(CreatedPatient { id })
    }

    #[instrument(skip_all, fields(term_len = term.chars().count()))]
    async fn search_patients(&self, term: &str) -> GatewayResult<PatientSearchResult> {
        let path = format!("patients/search/{}", urlencoding::encode(term));
        let request = self.client.get(self.config.endpoint(&path));
        let body = self.execute(SEARCH_CONTEXT, request).await?;

        let payload = match body.get("data") {
            Some(data) => data.clone(),
            None => body,
        };

        let result = normalize_search_payload(payload, term).map_err(|e| {
            warn!("Unrecognised search payload: {}", e);
            GatewayError::InvalidResponse {
                context: SEARCH_CONTEXT,
                details: format!("{}: formato de respuesta no reconocido", SEARCH_CONTEXT),
            }
        })?;

        debug!(count = result.count, "Patient search completed");
        Ok(result)
    }

    #[instrument(skip_all)]
    async fn create_medical_record(&self, record: &Value) -> GatewayResult<Value> {
        let request = self.client.post(self.config.endpoint("medical-records")).json(record);
        let body = self.execute(MEDICAL_RECORD_CONTEXT, request).await?;
        info!("Medical record accepted by backend");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_prefers_backend_error() {
        let body = json!({"success": false, "error": "Paciente duplicado"});
        assert_eq!(failure_message(409, Some(&body)), "Paciente duplicado");
    }

    #[test]
    fn test_failure_message_embeds_status_without_error_field() {
        let body = json!({"detail": "boom"});
        let message = failure_message(500, Some(&body));
        assert!(message.contains("500"));
        assert!(message.contains("boom"));

        assert_eq!(failure_message(502, None), "Error HTTP: 502");
    }

    #[test]
    fn test_blank_backend_error_falls_back_to_status() {
        let body = json!({"error": "  "});
        assert!(failure_message(400, Some(&body)).contains("400"));
    }

    #[test]
    fn test_gateway_builds_from_config() {
        let api = HttpClinicalApi::new(GatewayConfig::new("http://127.0.0.1:9/api/")).unwrap();
        assert_eq!(api.config().base_url, "http://127.0.0.1:9/api");
    }
}
