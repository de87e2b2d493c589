use qrcode::{render::svg, QrCode};
use serde::Serialize;
use thiserror::Error;

use historia_clinica_data::PatientId;

#[derive(Error, Debug)]
pub enum QrError {
    #[error("No se pudo generar el código QR: {0}")]
    Encoding(String),
}

/// Text encoded in the patient's QR code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QrPayload(String);

impl QrPayload {
    pub fn for_patient(id: PatientId) -> Self {
        Self(format!("ID del Paciente: {}", id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render as an SVG document
    pub fn to_svg(&self) -> Result<String, QrError> {
        let code =
            QrCode::new(self.0.as_bytes()).map_err(|e| QrError::Encoding(e.to_string()))?;
        Ok(code
            .render::<svg::Color>()
            .min_dimensions(200, 200)
            .quiet_zone(true)
            .build())
    }
}
