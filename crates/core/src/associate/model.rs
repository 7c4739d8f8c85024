//! Associate model definitions
//!
//! Field names on the wire follow the backend's Spanish schema.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Membership status of an associate
///
/// The backend stores `estado` as free text; values outside the known set
/// are kept as sent so they survive a read-modify-write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssociateStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
    Retired,
    Other(String),
}

impl AssociateStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "activo",
            Self::Inactive => "inactivo",
            Self::Suspended => "suspendido",
            Self::Retired => "retirado",
            Self::Other(raw) => raw,
        }
    }

    /// Parse a backend value, keeping unrecognized ones verbatim
    pub fn from_wire(value: &str) -> Self {
        value
            .parse()
            .unwrap_or_else(|_| Self::Other(value.to_string()))
    }
}

impl fmt::Display for AssociateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssociateStatus {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "activo" | "active" => Ok(Self::Active),
            "inactivo" | "inactive" => Ok(Self::Inactive),
            "suspendido" | "suspended" => Ok(Self::Suspended),
            "retirado" | "retired" => Ok(Self::Retired),
            _ => Err(Error::InvalidInput(format!(
                "Unsupported status '{}'",
                value
            ))),
        }
    }
}

impl Serialize for AssociateStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AssociateStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

/// Personal data of an associate
///
/// Missing fields take the values of [`PersonalData::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalData {
    #[serde(rename = "fecha_nacimiento")]
    pub birth_date: NaiveDate,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "ciudad")]
    pub city: String,
    #[serde(rename = "departamento")]
    pub department: String,
    #[serde(rename = "pais")]
    pub country: String,
    #[serde(rename = "estado_civil", skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
    #[serde(rename = "genero", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(rename = "nivel_academico", skip_serializing_if = "Option::is_none")]
    pub education_level: Option<String>,
    #[serde(rename = "profesion", skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(rename = "tipo_vivienda", skip_serializing_if = "Option::is_none")]
    pub housing_type: Option<String>,
    #[serde(rename = "telefono_alternativo", skip_serializing_if = "Option::is_none")]
    pub alternate_phone: Option<String>,
}

impl Default for PersonalData {
    fn default() -> Self {
        Self {
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default(),
            address: String::new(),
            city: "Bogotá".to_string(),
            department: "Cundinamarca".to_string(),
            country: "Colombia".to_string(),
            marital_status: None,
            gender: None,
            education_level: None,
            profession: None,
            housing_type: None,
            alternate_phone: None,
        }
    }
}

/// Employment data of an associate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentData {
    #[serde(rename = "institucion_educativa", default)]
    pub institution: String,
    #[serde(rename = "cargo", default)]
    pub position: String,
    #[serde(rename = "tipo_contrato", default)]
    pub contract_type: String,
    #[serde(rename = "fecha_vinculacion")]
    pub start_date: NaiveDate,
    #[serde(rename = "salario_basico", default)]
    pub base_salary: f64,
    #[serde(rename = "horario", default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(rename = "dependencia", default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// A relative of an associate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relative {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "parentesco")]
    pub relationship: String,
    #[serde(rename = "fecha_nacimiento", default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(rename = "ocupacion", default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(rename = "convive", default = "default_lives_with")]
    pub lives_with: bool,
}

fn default_lives_with() -> bool {
    true
}

/// Emergency contact of an associate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyContact {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "parentesco")]
    pub relationship: String,
    #[serde(rename = "telefono")]
    pub phone: String,
}

/// Family information of an associate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyInfo {
    #[serde(rename = "estado_civil", default, skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
    #[serde(rename = "numero_hijos", default, skip_serializing_if = "Option::is_none")]
    pub children: Option<u32>,
    #[serde(rename = "personas_a_cargo", default, skip_serializing_if = "Option::is_none")]
    pub dependents: Option<u32>,
    #[serde(rename = "familiares", default)]
    pub relatives: Vec<Relative>,
    #[serde(rename = "contactos_emergencia", default)]
    pub emergency_contacts: Vec<EmergencyContact>,
}

/// A financial obligation held by an associate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    #[serde(rename = "entidad")]
    pub entity: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "saldo", default)]
    pub balance: f64,
    #[serde(rename = "cuota_mensual", default)]
    pub monthly_payment: f64,
}

/// Financial information of an associate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialInfo {
    #[serde(rename = "ingresos_mensuales", default)]
    pub monthly_income: f64,
    #[serde(rename = "egresos_mensuales", default)]
    pub monthly_expenses: f64,
    #[serde(rename = "endeudamiento", default, skip_serializing_if = "Option::is_none")]
    pub indebtedness: Option<f64>,
    #[serde(rename = "obligaciones", default)]
    pub obligations: Vec<Obligation>,
    #[serde(rename = "calificacion_riesgo", default, skip_serializing_if = "Option::is_none")]
    pub risk_rating: Option<String>,
    #[serde(rename = "observaciones", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A cooperative member record as returned by the backend
///
/// Nested sections are optional because list responses may omit them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Associate {
    pub id: i64,
    #[serde(rename = "tipo_documento", default)]
    pub document_type: String,
    #[serde(rename = "numero_documento", default)]
    pub document_number: String,
    #[serde(rename = "nombres", default)]
    pub first_names: String,
    #[serde(rename = "apellidos", default)]
    pub last_names: String,
    #[serde(rename = "correo_electronico", default)]
    pub email: String,
    #[serde(rename = "telefono_principal", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "estado", default)]
    pub status: AssociateStatus,
    #[serde(rename = "fecha_ingreso", default, skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<NaiveDate>,
    #[serde(rename = "observaciones", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "hoja_vida_url", default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    #[serde(rename = "foto_url", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(rename = "datos_personales", default, skip_serializing_if = "Option::is_none")]
    pub personal: Option<PersonalData>,
    #[serde(rename = "datos_laborales", default, skip_serializing_if = "Option::is_none")]
    pub employment: Option<EmploymentData>,
    #[serde(rename = "informacion_familiar", default, skip_serializing_if = "Option::is_none")]
    pub family: Option<FamilyInfo>,
    #[serde(rename = "informacion_financiera", default, skip_serializing_if = "Option::is_none")]
    pub financial: Option<FinancialInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Associate {
    /// Create a record with only identity fields set
    pub fn new(id: i64, first_names: impl Into<String>, last_names: impl Into<String>) -> Self {
        Self {
            id,
            document_type: "CC".to_string(),
            document_number: String::new(),
            first_names: first_names.into(),
            last_names: last_names.into(),
            email: String::new(),
            phone: None,
            status: AssociateStatus::default(),
            admission_date: None,
            notes: None,
            resume_url: None,
            photo_url: None,
            personal: None,
            employment: None,
            family: None,
            financial: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Set the document number
    pub fn with_document(mut self, number: impl Into<String>) -> Self {
        self.document_number = number.into();
        self
    }

    /// Set the email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: AssociateStatus) -> Self {
        self.status = status;
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_names, self.last_names)
            .trim()
            .to_string()
    }
}

/// Body of a create or update request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssociatePayload {
    #[serde(rename = "tipo_documento")]
    pub document_type: String,
    #[serde(rename = "numero_documento")]
    pub document_number: String,
    #[serde(rename = "nombres")]
    pub first_names: String,
    #[serde(rename = "apellidos")]
    pub last_names: String,
    #[serde(rename = "correo_electronico")]
    pub email: String,
    #[serde(rename = "telefono_principal", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "estado")]
    pub status: AssociateStatus,
    #[serde(rename = "fecha_ingreso")]
    pub admission_date: NaiveDate,
    #[serde(rename = "observaciones", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "hoja_vida_url", skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    #[serde(rename = "datos_personales")]
    pub personal: PersonalData,
    #[serde(rename = "datos_laborales")]
    pub employment: EmploymentData,
    #[serde(rename = "informacion_familiar")]
    pub family: FamilyInfo,
    #[serde(rename = "informacion_financiera")]
    pub financial: FinancialInfo,
}

/// Pagination block of a paged list response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pagina_actual: u64,
    #[serde(default)]
    pub por_pagina: u64,
    #[serde(default)]
    pub total_paginas: u64,
}

/// List response: either a paged envelope or a bare array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AssociateList {
    Plain(Vec<Associate>),
    Paged {
        datos: Vec<Associate>,
        #[serde(default)]
        paginacion: Option<Pagination>,
    },
}

impl AssociateList {
    pub fn into_vec(self) -> Vec<Associate> {
        match self {
            Self::Plain(items) => items,
            Self::Paged { datos, .. } => datos,
        }
    }
}

/// Server-side list filters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(rename = "estado", skip_serializing_if = "Option::is_none")]
    pub status: Option<AssociateStatus>,
    #[serde(rename = "numero_documento", skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
}

impl ListQuery {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
