//! Decode-and-validate step between the raw JSON body and the storage layer.
//!
//! Each endpoint gets its own typed payload; a handler never touches a
//! partially checked `serde_json::Value`.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    #[error("at least one of name, description, price, category_id must be provided")]
    NoFieldsProvided,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::NotAnObject => "invalid_payload",
            ValidationError::MissingField(_) => "missing_field",
            ValidationError::InvalidField { .. } => "invalid_field",
            ValidationError::NoFieldsProvided => "no_fields_provided",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub category_id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
}

/// Fields to change on an item; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<i64>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category_id.is_none()
    }
}

#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub fn new_category(body: &Value) -> Result<NewCategory, ValidationError> {
    let obj = object(body)?;
    let name = required(obj, "name").and_then(|v| non_blank(v, "name"))?;
    Ok(NewCategory { name })
}

pub fn new_item(body: &Value) -> Result<NewItem, ValidationError> {
    let obj = object(body)?;
    let category_id = required(obj, "category_id").and_then(|v| integer(v, "category_id"))?;
    let name = required(obj, "name").and_then(|v| non_blank(v, "name"))?;
    let price = required(obj, "price").and_then(non_negative_number)?;
    let description = match obj.get("description") {
        Some(v) => string(v, "description")?,
        None => String::new(),
    };
    Ok(NewItem {
        category_id,
        name,
        description,
        price,
    })
}

pub fn item_patch(body: &Value) -> Result<ItemPatch, ValidationError> {
    let obj = object(body)?;
    let patch = ItemPatch {
        name: obj.get("name").map(|v| non_blank(v, "name")).transpose()?,
        description: obj
            .get("description")
            .map(|v| string(v, "description"))
            .transpose()?,
        price: obj.get("price").map(non_negative_number).transpose()?,
        category_id: obj
            .get("category_id")
            .map(|v| integer(v, "category_id"))
            .transpose()?,
    };
    if patch.is_empty() {
        return Err(ValidationError::NoFieldsProvided);
    }
    Ok(patch)
}

/// Login only needs both fields to be there.
pub fn credentials(body: &Value) -> Result<Credentials, ValidationError> {
    let obj = object(body)?;
    Ok(Credentials {
        username: loose_text(required(obj, "username")?),
        password: loose_text(required(obj, "password")?),
    })
}

/// Registration also refuses a blank username.
pub fn registration(body: &Value) -> Result<Credentials, ValidationError> {
    let creds = credentials(body)?;
    if creds.username.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "username",
            expected: "a non-empty string",
        });
    }
    Ok(creds)
}

fn object(body: &Value) -> Result<&Map<String, Value>, ValidationError> {
    body.as_object().ok_or(ValidationError::NotAnObject)
}

fn required<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, ValidationError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field)),
        Some(v) => Ok(v),
    }
}

fn string(v: &Value, field: &'static str) -> Result<String, ValidationError> {
    v.as_str().map(str::to_owned).ok_or(ValidationError::InvalidField {
        field,
        expected: "a string",
    })
}

fn non_blank(v: &Value, field: &'static str) -> Result<String, ValidationError> {
    match v.as_str().map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_owned()),
        _ => Err(ValidationError::InvalidField {
            field,
            expected: "a non-empty string",
        }),
    }
}

fn integer(v: &Value, field: &'static str) -> Result<i64, ValidationError> {
    v.as_i64().ok_or(ValidationError::InvalidField {
        field,
        expected: "an integer",
    })
}

fn non_negative_number(v: &Value) -> Result<f64, ValidationError> {
    match v.as_f64() {
        Some(p) if p >= 0.0 => Ok(p),
        _ => Err(ValidationError::InvalidField {
            field: "price",
            expected: "a non-negative number",
        }),
    }
}

fn loose_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
