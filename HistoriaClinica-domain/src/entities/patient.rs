use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::forms::section_fields;
use crate::validation::{check_one_of, check_trimmed_min, parse_date, violation, SectionRules};

pub const SEXO_OPTIONS: [&str; 3] = ["Masculino", "Femenino", "Otro"];
pub const TIPO_IDENTIFICACION_OPTIONS: [&str; 2] = ["Cédula", "Pasaporte"];
pub const ESTADO_CIVIL_OPTIONS: [&str; 5] = [
    "Soltero(a)",
    "Casado(a)",
    "Divorciado(a)",
    "Viudo(a)",
    "Unión libre",
];

/// Demographic and contact data captured on the intake tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientRecord {
    #[validate(custom = "validate_nombres")]
    pub nombres: String,
    #[validate(custom = "validate_apellidos")]
    pub apellidos: String,
    #[validate(custom = "validate_fecha_nacimiento")]
    pub fecha_nacimiento: String,
    #[validate(custom = "validate_sexo")]
    pub sexo: String,
    #[validate(custom = "validate_email_or_blank")]
    pub email: String,
    #[validate(custom = "validate_celular")]
    pub celular: String,
    pub sin_celular: bool,
    #[validate(custom = "validate_tipo_identificacion")]
    pub tipo_identificacion: String,
    #[validate(custom = "validate_numero_identificacion")]
    pub numero_identificacion: String,
    pub telefono: String,
    pub acepta_whatsapp: bool,
    pub enviar_correo: bool,
    pub direccion: String,
    pub pais: String,
    pub estado: String,
    pub ciudad: String,
    pub codigo_postal: String,
    pub numero_exterior: String,
    pub numero_interior: String,
    pub notas: String,
    #[validate(custom = "validate_foto")]
    pub foto: String,
    /// Derived from `fecha_nacimiento`
    pub edad: String,
    pub ocupacion: String,
    #[validate(custom = "validate_estado_civil")]
    pub estado_civil: String,
    pub contacto_emergencia: String,
}

impl Default for PatientRecord {
    fn default() -> Self {
        Self {
            nombres: String::new(),
            apellidos: String::new(),
            fecha_nacimiento: String::new(),
            sexo: String::new(),
            email: String::new(),
            celular: String::new(),
            sin_celular: false,
            tipo_identificacion: "Cédula".to_string(),
            numero_identificacion: String::new(),
            telefono: String::new(),
            acepta_whatsapp: false,
            enviar_correo: false,
            direccion: String::new(),
            pais: String::new(),
            estado: String::new(),
            ciudad: String::new(),
            codigo_postal: String::new(),
            numero_exterior: String::new(),
            numero_interior: String::new(),
            notas: String::new(),
            foto: String::new(),
            edad: String::new(),
            ocupacion: String::new(),
            estado_civil: String::new(),
            contacto_emergencia: String::new(),
        }
    }
}

section_fields! {
    /// Text fields of [`PatientRecord`]
    PatientRecord => PatientField {
        Nombres => nombres,
        Apellidos => apellidos,
        FechaNacimiento => fecha_nacimiento,
        Sexo => sexo,
        Email => email,
        Celular => celular,
        TipoIdentificacion => tipo_identificacion,
        NumeroIdentificacion => numero_identificacion,
        Telefono => telefono,
        Direccion => direccion,
        Pais => pais,
        Estado => estado,
        Ciudad => ciudad,
        CodigoPostal => codigo_postal,
        NumeroExterior => numero_exterior,
        NumeroInterior => numero_interior,
        Notas => notas,
        Foto => foto,
        Edad => edad,
        Ocupacion => ocupacion,
        EstadoCivil => estado_civil,
        ContactoEmergencia => contacto_emergencia,
    }
    derived [Edad]
}

/// Boolean switches of [`PatientRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatientFlag {
    SinCelular,
    AceptaWhatsapp,
    EnviarCorreo,
}

impl PatientRecord {
    pub fn flag(&self, flag: PatientFlag) -> bool {
        match flag {
            PatientFlag::SinCelular => self.sin_celular,
            PatientFlag::AceptaWhatsapp => self.acepta_whatsapp,
            PatientFlag::EnviarCorreo => self.enviar_correo,
        }
    }

    /// Return a copy with one switch set
    pub fn with_flag(&self, flag: PatientFlag, value: bool) -> Self {
        let mut next = self.clone();
        match flag {
            PatientFlag::SinCelular => next.sin_celular = value,
            PatientFlag::AceptaWhatsapp => next.acepta_whatsapp = value,
            PatientFlag::EnviarCorreo => next.enviar_correo = value,
        }
        next
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombres.trim(), self.apellidos.trim())
            .trim()
            .to_string()
    }
}

impl SectionRules for PatientRecord {
    const FIELD_ORDER: &'static [&'static str] = &[
        "nombres",
        "apellidos",
        "fecha_nacimiento",
        "sexo",
        "email",
        "celular",
        "tipo_identificacion",
        "numero_identificacion",
        "foto",
        "estado_civil",
    ];
}

fn validate_nombres(value: &str) -> Result<(), ValidationError> {
    check_trimmed_min(value, 2, "Mínimo 2 caracteres")
}

fn validate_apellidos(value: &str) -> Result<(), ValidationError> {
    check_trimmed_min(value, 2, "Mínimo 2 caracteres")
}

fn validate_fecha_nacimiento(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(violation("required", "Requerido"));
    }
    if parse_date(value).is_none() {
        return Err(violation("date", "Fecha inválida"));
    }
    Ok(())
}

fn validate_sexo(value: &str) -> Result<(), ValidationError> {
    check_one_of(value, &SEXO_OPTIONS, false, "Seleccione el sexo")
}

fn validate_email_or_blank(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || validator::validate_email(value) {
        Ok(())
    } else {
        Err(violation("email", "Email inválido"))
    }
}

fn validate_celular(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    check_trimmed_min(value, 7, "Teléfono inválido")
}

fn validate_tipo_identificacion(value: &str) -> Result<(), ValidationError> {
    check_one_of(
        value,
        &TIPO_IDENTIFICACION_OPTIONS,
        false,
        "Tipo de identificación inválido",
    )
}

fn validate_numero_identificacion(value: &str) -> Result<(), ValidationError> {
    check_trimmed_min(value, 5, "Identificación inválida")
}

fn validate_foto(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || validator::validate_url(value) {
        Ok(())
    } else {
        Err(violation("url", "URL inválida"))
    }
}

fn validate_estado_civil(value: &str) -> Result<(), ValidationError> {
    check_one_of(value, &ESTADO_CIVIL_OPTIONS, true, "Estado civil inválido")
}
