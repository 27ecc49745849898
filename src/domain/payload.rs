//! Save payload shapes and their mapping into one canonical save request
//!
//! A save arrives either as a JSON record or as form fields. Both are turned
//! into a [`SaveRequest`] before validation so the rules run exactly once.

use serde::Deserialize;

use crate::domain::{
    entity::MockEntity,
    validation::{EntityValidator, FieldErrors},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JsonPayload {
    pub uri: String,
    pub method: String,
    pub contenttype: String,
    pub status: i64,
    pub body: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FormPayload {
    #[serde(rename = "URI")]
    pub uri: String,
    #[serde(rename = "Method")]
    pub method: String,
    #[serde(rename = "ContentType")]
    pub content_type: String,
    #[serde(rename = "StatusCode")]
    pub status_code: String,
    pub body: String,
}

#[derive(Debug)]
pub enum SavePayload {
    Json(JsonPayload),
    Form(FormPayload),
}

#[derive(Debug, Default)]
pub struct SaveRequest {
    pub entity: MockEntity,
    pub body: Vec<u8>,
    pub field_errors: FieldErrors,
}

impl SaveRequest {
    /// The payload could not be decoded at all. The zero-valued entity still
    /// goes through validation, but the request can never be accepted.
    pub fn undecodable(field: &str, message: impl Into<String>) -> Self {
        let mut request = Self::default();
        request
            .field_errors
            .insert(field.to_string(), message.into());
        request
    }

    /// Adds validator findings without overwriting decode errors on the same field.
    pub fn validate_with(&mut self, validator: &dyn EntityValidator) {
        for (field, message) in validator.validate(&self.entity) {
            self.field_errors.entry(field).or_insert(message);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }
}

impl From<SavePayload> for SaveRequest {
    fn from(payload: SavePayload) -> Self {
        match payload {
            SavePayload::Json(json) => {
                let mut field_errors = FieldErrors::new();
                let status_code = u16::try_from(json.status).unwrap_or_else(|_| {
                    field_errors.insert(
                        "status".to_string(),
                        "status must be between 100 and 599".to_string(),
                    );
                    0
                });

                Self {
                    entity: MockEntity {
                        uri: json.uri,
                        method: json.method,
                        content_type: json.contenttype,
                        status_code,
                    },
                    body: json.body.into_bytes(),
                    field_errors,
                }
            }
            SavePayload::Form(form) => {
                let mut field_errors = FieldErrors::new();
                let status_code = form.status_code.trim().parse::<u16>().unwrap_or_else(|_| {
                    field_errors.insert(
                        "status".to_string(),
                        format!("status must be an integer, got {:?}", form.status_code),
                    );
                    0
                });

                Self {
                    entity: MockEntity {
                        uri: form.uri,
                        method: form.method,
                        content_type: form.content_type,
                        status_code,
                    },
                    body: form.body.into_bytes(),
                    field_errors,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::validation::DefaultValidator;

    use super::*;

    fn form(status_code: &str) -> FormPayload {
        FormPayload {
            uri: "/users".to_string(),
            method: "POST".to_string(),
            content_type: "application/json".to_string(),
            status_code: status_code.to_string(),
            body: "[]".to_string(),
        }
    }

    #[test]
    fn json_and_form_map_to_same_entity() {
        let from_json = SaveRequest::from(SavePayload::Json(JsonPayload {
            uri: "/users".to_string(),
            method: "POST".to_string(),
            contenttype: "application/json".to_string(),
            status: 201,
            body: "[]".to_string(),
        }));
        let from_form = SaveRequest::from(SavePayload::Form(form("201")));

        assert_eq!(from_json.entity, from_form.entity);
        assert_eq!(from_json.body, from_form.body);
        assert!(from_json.is_valid());
        assert!(from_form.is_valid());
    }

    #[test]
    fn unparseable_form_status_is_a_field_error() {
        let mut request = SaveRequest::from(SavePayload::Form(form("two hundred")));
        request.validate_with(&DefaultValidator);

        assert!(!request.is_valid());
        assert_eq!(
            request.field_errors["status"],
            "status must be an integer, got \"two hundred\""
        );
    }

    #[test]
    fn negative_json_status_is_a_field_error() {
        let request = SaveRequest::from(SavePayload::Json(JsonPayload {
            status: -1,
            ..JsonPayload::default()
        }));

        assert!(request.field_errors.contains_key("status"));
        assert_eq!(request.entity.status_code, 0);
    }

    #[test]
    fn undecodable_payload_never_validates() {
        let mut request = SaveRequest::undecodable("json", "expected value at line 1");
        request.validate_with(&DefaultValidator);

        assert!(!request.is_valid());
        assert_eq!(request.field_errors["json"], "expected value at line 1");
        assert!(request.field_errors.contains_key("uri"));
    }
}
