//! Editable associate form
//!
//! The form mirrors an associate's fields as the user edits them. Monetary
//! amounts stay as raw text until submit, when they are coerced to numbers.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use super::model::{
    Associate, AssociatePayload, AssociateStatus, EmploymentData, FamilyInfo, FinancialInfo,
    Obligation, PersonalData,
};
use crate::{Error, Result};

/// Raw text of a monetary form input
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AmountInput(String);

impl AmountInput {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Numeric value of the input, or 0 when it doesn't parse
    pub fn value(&self) -> f64 {
        match self.0.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => 0.0,
        }
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for AmountInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AmountInput {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => AmountInput::from(n),
            Raw::Text(s) => AmountInput(s),
        })
    }
}

/// Employment section of the form
///
/// Missing fields take the blank-form defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmploymentForm {
    #[serde(rename = "institucion_educativa")]
    pub institution: String,
    #[serde(rename = "cargo")]
    pub position: String,
    #[serde(rename = "tipo_contrato")]
    pub contract_type: String,
    #[serde(rename = "fecha_vinculacion")]
    pub start_date: NaiveDate,
    #[serde(rename = "salario_basico")]
    pub base_salary: AmountInput,
    #[serde(rename = "horario", skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(rename = "dependencia", skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl Default for EmploymentForm {
    fn default() -> Self {
        Self::new(today())
    }
}

impl EmploymentForm {
    fn new(today: NaiveDate) -> Self {
        Self {
            institution: "Coopeenortol".to_string(),
            position: String::new(),
            contract_type: "Indefinido".to_string(),
            start_date: today,
            base_salary: AmountInput::from("0"),
            schedule: None,
            department: None,
        }
    }

    fn from_data(data: &EmploymentData) -> Self {
        Self {
            institution: data.institution.clone(),
            position: data.position.clone(),
            contract_type: data.contract_type.clone(),
            start_date: data.start_date,
            base_salary: AmountInput::from(data.base_salary),
            schedule: data.schedule.clone(),
            department: data.department.clone(),
        }
    }

    fn to_data(&self) -> EmploymentData {
        EmploymentData {
            institution: self.institution.clone(),
            position: self.position.clone(),
            contract_type: self.contract_type.clone(),
            start_date: self.start_date,
            base_salary: self.base_salary.value(),
            schedule: self.schedule.clone(),
            department: self.department.clone(),
        }
    }
}

/// Financial section of the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialForm {
    #[serde(rename = "ingresos_mensuales")]
    pub monthly_income: AmountInput,
    #[serde(rename = "egresos_mensuales")]
    pub monthly_expenses: AmountInput,
    #[serde(rename = "endeudamiento", skip_serializing_if = "Option::is_none")]
    pub indebtedness: Option<AmountInput>,
    #[serde(rename = "obligaciones")]
    pub obligations: Vec<Obligation>,
    #[serde(rename = "calificacion_riesgo", skip_serializing_if = "Option::is_none")]
    pub risk_rating: Option<String>,
    #[serde(rename = "observaciones", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Default for FinancialForm {
    fn default() -> Self {
        Self {
            monthly_income: AmountInput::from("0"),
            monthly_expenses: AmountInput::from("0"),
            indebtedness: None,
            obligations: Vec::new(),
            risk_rating: None,
            notes: None,
        }
    }
}

impl FinancialForm {
    fn from_info(info: &FinancialInfo) -> Self {
        Self {
            monthly_income: AmountInput::from(info.monthly_income),
            monthly_expenses: AmountInput::from(info.monthly_expenses),
            indebtedness: info.indebtedness.map(AmountInput::from),
            obligations: info.obligations.clone(),
            risk_rating: info.risk_rating.clone(),
            notes: info.notes.clone(),
        }
    }

    fn to_info(&self) -> FinancialInfo {
        FinancialInfo {
            monthly_income: self.monthly_income.value(),
            monthly_expenses: self.monthly_expenses.value(),
            indebtedness: self.indebtedness.as_ref().map(AmountInput::value),
            obligations: self.obligations.clone(),
            risk_rating: self.risk_rating.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Create/edit form for an associate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociateForm {
    #[serde(rename = "tipo_documento", default = "default_document_type")]
    pub document_type: String,
    #[serde(rename = "numero_documento", default)]
    pub document_number: String,
    #[serde(rename = "nombres", default)]
    pub first_names: String,
    #[serde(rename = "apellidos", default)]
    pub last_names: String,
    #[serde(rename = "correo_electronico", default)]
    pub email: String,
    #[serde(rename = "telefono_principal", default)]
    pub phone: String,
    #[serde(rename = "estado", default)]
    pub status: AssociateStatus,
    #[serde(rename = "fecha_ingreso", default = "today")]
    pub admission_date: NaiveDate,
    #[serde(rename = "observaciones", default)]
    pub notes: String,
    #[serde(rename = "hoja_vida_url", default)]
    pub resume_url: String,
    #[serde(rename = "datos_personales", default)]
    pub personal: PersonalData,
    #[serde(rename = "datos_laborales", default)]
    pub employment: EmploymentForm,
    #[serde(rename = "informacion_familiar", default)]
    pub family: FamilyInfo,
    #[serde(rename = "informacion_financiera", default)]
    pub financial: FinancialForm,
}

fn default_document_type() -> String {
    "CC".to_string()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn merge_value(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

fn optional_amount(value: &str) -> Option<AmountInput> {
    if value.trim().is_empty() {
        None
    } else {
        Some(AmountInput::new(value))
    }
}

fn parse_count(field: &str, value: &str) -> Result<Option<u32>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse().map(Some).map_err(|_| {
        Error::InvalidInput(format!(
            "{} must be a whole number, got '{}'",
            field, value
        ))
    })
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        Error::InvalidInput(format!(
            "{} must be a date in YYYY-MM-DD format, got '{}'",
            field, value
        ))
    })
}

impl Default for AssociateForm {
    fn default() -> Self {
        Self::new(today())
    }
}

impl AssociateForm {
    /// Blank form with admission and start dates set to `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            document_type: default_document_type(),
            document_number: String::new(),
            first_names: String::new(),
            last_names: String::new(),
            email: String::new(),
            phone: String::new(),
            status: AssociateStatus::Active,
            admission_date: today,
            notes: String::new(),
            resume_url: String::new(),
            personal: PersonalData::default(),
            employment: EmploymentForm::new(today),
            family: FamilyInfo::default(),
            financial: FinancialForm::default(),
        }
    }

    /// Copy of an existing record for editing
    ///
    /// Sections the record lacks are filled with form defaults, since the
    /// backend requires all of them on update.
    pub fn from_associate(associate: &Associate) -> Self {
        let defaults = Self::default();

        Self {
            document_type: associate.document_type.clone(),
            document_number: associate.document_number.clone(),
            first_names: associate.first_names.clone(),
            last_names: associate.last_names.clone(),
            email: associate.email.clone(),
            phone: associate.phone.clone().unwrap_or_default(),
            status: associate.status.clone(),
            admission_date: associate.admission_date.unwrap_or(defaults.admission_date),
            notes: associate.notes.clone().unwrap_or_default(),
            resume_url: associate.resume_url.clone().unwrap_or_default(),
            personal: associate.personal.clone().unwrap_or(defaults.personal),
            employment: associate
                .employment
                .as_ref()
                .map(EmploymentForm::from_data)
                .unwrap_or(defaults.employment),
            family: associate.family.clone().unwrap_or(defaults.family),
            financial: associate
                .financial
                .as_ref()
                .map(FinancialForm::from_info)
                .unwrap_or(defaults.financial),
        }
    }

    /// Request body for this form, with amounts coerced to numbers
    pub fn to_payload(&self) -> AssociatePayload {
        AssociatePayload {
            document_type: self.document_type.trim().to_string(),
            document_number: self.document_number.trim().to_string(),
            first_names: self.first_names.trim().to_string(),
            last_names: self.last_names.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: non_empty(&self.phone),
            status: self.status.clone(),
            admission_date: self.admission_date,
            notes: non_empty(&self.notes),
            resume_url: non_empty(&self.resume_url),
            personal: self.personal.clone(),
            employment: self.employment.to_data(),
            family: self.family.clone(),
            financial: self.financial.to_info(),
        }
    }

    /// Overlay a partial form document onto this form
    ///
    /// Objects merge key by key, so fields the patch leaves out keep their
    /// current values. Any other JSON value replaces the current one.
    pub fn merge_json(&mut self, patch: Value) -> Result<()> {
        if !patch.is_object() {
            return Err(Error::InvalidInput(
                "form document must be a JSON object".to_string(),
            ));
        }

        let mut current = serde_json::to_value(&*self)?;
        merge_value(&mut current, patch);
        *self = serde_json::from_value(current)?;
        Ok(())
    }

    /// Set a single field by its wire name
    ///
    /// Nested fields use a dotted path, e.g. `datos_laborales.salario_basico`.
    pub fn set(&mut self, field: &str, value: &str) -> Result<()> {
        match field.trim() {
            "tipo_documento" => self.document_type = value.to_string(),
            "numero_documento" => self.document_number = value.to_string(),
            "nombres" => self.first_names = value.to_string(),
            "apellidos" => self.last_names = value.to_string(),
            "correo_electronico" => self.email = value.to_string(),
            "telefono_principal" => self.phone = value.to_string(),
            "estado" => self.status = value.parse()?,
            "fecha_ingreso" => self.admission_date = parse_date(field, value)?,
            "observaciones" => self.notes = value.to_string(),
            "hoja_vida_url" => self.resume_url = value.to_string(),

            "datos_personales.fecha_nacimiento" => {
                self.personal.birth_date = parse_date(field, value)?
            }
            "datos_personales.direccion" => self.personal.address = value.to_string(),
            "datos_personales.ciudad" => self.personal.city = value.to_string(),
            "datos_personales.departamento" => self.personal.department = value.to_string(),
            "datos_personales.pais" => self.personal.country = value.to_string(),
            "datos_personales.estado_civil" => self.personal.marital_status = non_empty(value),
            "datos_personales.genero" => self.personal.gender = non_empty(value),
            "datos_personales.nivel_academico" => {
                self.personal.education_level = non_empty(value)
            }
            "datos_personales.profesion" => self.personal.profession = non_empty(value),
            "datos_personales.tipo_vivienda" => self.personal.housing_type = non_empty(value),
            "datos_personales.telefono_alternativo" => {
                self.personal.alternate_phone = non_empty(value)
            }

            "datos_laborales.institucion_educativa" => {
                self.employment.institution = value.to_string()
            }
            "datos_laborales.cargo" => self.employment.position = value.to_string(),
            "datos_laborales.tipo_contrato" => self.employment.contract_type = value.to_string(),
            "datos_laborales.fecha_vinculacion" => {
                self.employment.start_date = parse_date(field, value)?
            }
            "datos_laborales.salario_basico" => self.employment.base_salary = value.into(),
            "datos_laborales.horario" => self.employment.schedule = non_empty(value),
            "datos_laborales.dependencia" => self.employment.department = non_empty(value),

            "informacion_familiar.estado_civil" => self.family.marital_status = non_empty(value),
            "informacion_familiar.numero_hijos" => {
                self.family.children = parse_count(field, value)?
            }
            "informacion_familiar.personas_a_cargo" => {
                self.family.dependents = parse_count(field, value)?
            }

            "informacion_financiera.ingresos_mensuales" => {
                self.financial.monthly_income = value.into()
            }
            "informacion_financiera.egresos_mensuales" => {
                self.financial.monthly_expenses = value.into()
            }
            "informacion_financiera.endeudamiento" => {
                self.financial.indebtedness = optional_amount(value)
            }
            "informacion_financiera.calificacion_riesgo" => {
                self.financial.risk_rating = non_empty(value)
            }
            "informacion_financiera.observaciones" => self.financial.notes = non_empty(value),

            other => {
                return Err(Error::InvalidInput(format!("Unknown form field '{}'", other)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_amount_coercion() {
        assert_eq!(AmountInput::from("1500000").value(), 1500000.0);
        assert_eq!(AmountInput::from(" 12.5 ").value(), 12.5);
        assert_eq!(AmountInput::from("").value(), 0.0);
        assert_eq!(AmountInput::from("abc").value(), 0.0);
        assert_eq!(AmountInput::from("1,000").value(), 0.0);
        assert_eq!(AmountInput::from("NaN").value(), 0.0);
    }

    #[test]
    fn test_amount_deserializes_from_number_or_text() {
        let from_number: AmountInput = serde_json::from_value(json!(2500)).unwrap();
        assert_eq!(from_number.value(), 2500.0);

        let from_text: AmountInput = serde_json::from_value(json!("2500")).unwrap();
        assert_eq!(from_text.raw(), "2500");
    }

    #[test]
    fn test_new_form_defaults() {
        let form = AssociateForm::new(day(2024, 3, 1));
        assert_eq!(form.document_type, "CC");
        assert_eq!(form.status, AssociateStatus::Active);
        assert_eq!(form.admission_date, day(2024, 3, 1));
        assert_eq!(form.personal.birth_date, day(1990, 1, 1));
        assert_eq!(form.employment.institution, "Coopeenortol");
        assert_eq!(form.employment.contract_type, "Indefinido");
        assert_eq!(form.employment.start_date, day(2024, 3, 1));
        assert_eq!(form.financial.monthly_income.value(), 0.0);
    }

    #[test]
    fn test_payload_coerces_amounts() {
        let mut form = AssociateForm::new(day(2024, 3, 1));
        form.employment.base_salary = "2000000".into();
        form.financial.monthly_income = "not a number".into();
        form.financial.monthly_expenses = "".into();
        form.set("informacion_financiera.endeudamiento", "abc").unwrap();

        let payload = serde_json::to_value(form.to_payload()).unwrap();
        assert_eq!(payload["datos_laborales"]["salario_basico"], json!(2000000.0));
        assert_eq!(payload["informacion_financiera"]["ingresos_mensuales"], json!(0.0));
        assert_eq!(payload["informacion_financiera"]["egresos_mensuales"], json!(0.0));
        assert_eq!(payload["informacion_financiera"]["endeudamiento"], json!(0.0));
        assert_eq!(payload["fecha_ingreso"], json!("2024-03-01"));
        assert_eq!(payload["estado"], json!("activo"));
        assert!(payload.get("telefono_principal").is_none());
    }

    #[test]
    fn test_from_associate_copies_fields_and_defaults_sections() {
        let mut associate = Associate::new(9, "Ana", "Ruiz")
            .with_document("123")
            .with_email("ana@coop.test")
            .with_status(AssociateStatus::Suspended);
        associate.phone = Some("3001234567".to_string());
        associate.financial = Some(FinancialInfo {
            monthly_income: 3000000.0,
            monthly_expenses: 1200000.0,
            ..Default::default()
        });

        let form = AssociateForm::from_associate(&associate);
        assert_eq!(form.first_names, "Ana");
        assert_eq!(form.last_names, "Ruiz");
        assert_eq!(form.document_number, "123");
        assert_eq!(form.phone, "3001234567");
        assert_eq!(form.status, AssociateStatus::Suspended);
        assert_eq!(form.financial.monthly_income.value(), 3000000.0);
        assert_eq!(form.financial.monthly_expenses.value(), 1200000.0);

        // Sections absent from the record come from the defaults
        assert_eq!(form.personal, PersonalData::default());
        assert_eq!(form.employment.institution, "Coopeenortol");
        assert!(form.family.relatives.is_empty());
    }

    #[test]
    fn test_set_fields() {
        let mut form = AssociateForm::new(day(2024, 3, 1));
        form.set("nombres", "Luis").unwrap();
        form.set("estado", "retirado").unwrap();
        form.set("datos_laborales.salario_basico", "1800000").unwrap();
        form.set("datos_personales.fecha_nacimiento", "1979-12-31").unwrap();

        assert_eq!(form.first_names, "Luis");
        assert_eq!(form.status, AssociateStatus::Retired);
        assert_eq!(form.employment.base_salary.value(), 1800000.0);
        assert_eq!(form.personal.birth_date, day(1979, 12, 31));
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut form = AssociateForm::new(day(2024, 3, 1));
        let before = form.clone();

        assert!(form.set("no_such_field", "x").is_err());
        assert!(form.set("fecha_ingreso", "yesterday").is_err());
        assert!(form.set("estado", "unknown").is_err());
        assert_eq!(form, before);
    }

    #[test]
    fn test_form_deserializes_from_partial_json() {
        let form: AssociateForm = serde_json::from_value(json!({
            "numero_documento": "555",
            "nombres": "Marta",
            "apellidos": "Gómez",
            "correo_electronico": "marta@coop.test",
            "datos_laborales": {
                "cargo": "Rectora",
                "fecha_vinculacion": "2015-02-01",
                "salario_basico": "4100000"
            }
        }))
        .unwrap();

        assert_eq!(form.document_type, "CC");
        assert_eq!(form.employment.position, "Rectora");
        assert_eq!(form.employment.base_salary.value(), 4100000.0);
        assert_eq!(form.personal.country, "Colombia");
    }

    #[test]
    fn test_set_family_counts_and_indebtedness() {
        let mut form = AssociateForm::new(day(2024, 3, 1));
        form.set("informacion_familiar.numero_hijos", "2").unwrap();
        form.set("informacion_familiar.personas_a_cargo", " 3 ").unwrap();
        form.set("informacion_financiera.endeudamiento", "1500").unwrap();

        assert_eq!(form.family.children, Some(2));
        assert_eq!(form.family.dependents, Some(3));
        assert_eq!(form.to_payload().financial.indebtedness, Some(1500.0));

        form.set("informacion_familiar.numero_hijos", "").unwrap();
        form.set("informacion_financiera.endeudamiento", "").unwrap();
        assert_eq!(form.family.children, None);
        assert_eq!(form.to_payload().financial.indebtedness, None);

        assert!(form.set("informacion_familiar.personas_a_cargo", "dos").is_err());
    }

    #[test]
    fn test_indebtedness_text_deserializes() {
        let form: AssociateForm = serde_json::from_value(json!({
            "informacion_financiera": {"endeudamiento": "abc"}
        }))
        .unwrap();
        assert_eq!(form.to_payload().financial.indebtedness, Some(0.0));
    }

    #[test]
    fn test_partial_sections_keep_form_defaults() {
        let form: AssociateForm = serde_json::from_value(json!({
            "datos_personales": {"direccion": "Calle 5"},
            "datos_laborales": {"cargo": "Docente"}
        }))
        .unwrap();

        assert_eq!(form.personal.address, "Calle 5");
        assert_eq!(form.personal.city, "Bogotá");
        assert_eq!(form.personal.department, "Cundinamarca");
        assert_eq!(form.personal.country, "Colombia");
        assert_eq!(form.personal.birth_date, day(1990, 1, 1));
        assert_eq!(form.employment.position, "Docente");
        assert_eq!(form.employment.institution, "Coopeenortol");
        assert_eq!(form.employment.contract_type, "Indefinido");
    }

    #[test]
    fn test_merge_keeps_fields_missing_from_patch() {
        let mut associate = Associate::new(6, "Luis", "Mora")
            .with_document("456")
            .with_email("luis@coop.test")
            .with_status(AssociateStatus::Retired);
        associate.admission_date = Some(day(2019, 6, 1));
        associate.personal = Some(PersonalData {
            city: "Medellín".to_string(),
            ..Default::default()
        });
        let mut form = AssociateForm::from_associate(&associate);

        form.merge_json(json!({
            "telefono_principal": "3001234567",
            "datos_personales": {"direccion": "Carrera 7"}
        }))
        .unwrap();

        assert_eq!(form.phone, "3001234567");
        assert_eq!(form.first_names, "Luis");
        assert_eq!(form.last_names, "Mora");
        assert_eq!(form.document_number, "456");
        assert_eq!(form.email, "luis@coop.test");
        assert_eq!(form.status, AssociateStatus::Retired);
        assert_eq!(form.admission_date, day(2019, 6, 1));
        assert_eq!(form.personal.address, "Carrera 7");
        assert_eq!(form.personal.city, "Medellín");
    }

    #[test]
    fn test_merge_rejects_bad_patch() {
        let mut form = AssociateForm::new(day(2024, 3, 1));
        let before = form.clone();

        assert!(form.merge_json(json!(["nombres"])).is_err());
        assert!(form.merge_json(json!({"fecha_ingreso": "ayer"})).is_err());
        assert_eq!(form, before);
    }
}
