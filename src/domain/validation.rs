//! Entity validation rules

use std::collections::BTreeMap;

use crate::domain::entity::MockEntity;

/// Field name to human readable message. Empty means valid.
pub type FieldErrors = BTreeMap<String, String>;

pub const SUPPORTED_METHODS: [&str; 7] = [
    "GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS",
];

pub trait EntityValidator: Send + Sync {
    fn validate(&self, entity: &MockEntity) -> FieldErrors;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultValidator;

impl EntityValidator for DefaultValidator {
    fn validate(&self, entity: &MockEntity) -> FieldErrors {
        let mut errors = FieldErrors::new();

        let uri = entity.uri.trim();
        if uri.is_empty() {
            errors.insert("uri".to_string(), "uri is required".to_string());
        } else if !uri.starts_with('/') {
            errors.insert("uri".to_string(), "uri must start with /".to_string());
        }

        let method = entity.method.trim();
        if method.is_empty() {
            errors.insert("method".to_string(), "method is required".to_string());
        } else if !SUPPORTED_METHODS.contains(&method) {
            errors.insert(
                "method".to_string(),
                format!("method must be one of: {}", SUPPORTED_METHODS.join(", ")),
            );
        }

        let content_type = entity.content_type.trim();
        if content_type.is_empty() {
            errors.insert(
                "contenttype".to_string(),
                "content type is required".to_string(),
            );
        } else if !content_type.contains('/') {
            errors.insert(
                "contenttype".to_string(),
                "content type must look like type/subtype".to_string(),
            );
        }

        if !(100..=599).contains(&entity.status_code) {
            errors.insert(
                "status".to_string(),
                "status must be between 100 and 599".to_string(),
            );
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> MockEntity {
        MockEntity {
            uri: "/hello".to_string(),
            method: "GET".to_string(),
            content_type: "text/plain".to_string(),
            status_code: 200,
        }
    }

    #[test]
    fn accepts_complete_entity() {
        assert!(DefaultValidator.validate(&entity()).is_empty());
    }

    #[test]
    fn zero_valued_entity_reports_every_field() {
        let errors = DefaultValidator.validate(&MockEntity::default());
        let fields: Vec<&str> = errors.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["contenttype", "method", "status", "uri"]);
    }

    #[test]
    fn rejects_relative_uri_and_unknown_method() {
        let errors = DefaultValidator.validate(&MockEntity {
            uri: "hello".to_string(),
            method: "FETCH".to_string(),
            ..entity()
        });

        assert_eq!(errors["uri"], "uri must start with /");
        assert!(errors["method"].starts_with("method must be one of"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn rejects_out_of_range_status() {
        for status_code in [0, 99, 600] {
            let errors = DefaultValidator.validate(&MockEntity {
                status_code,
                ..entity()
            });
            assert!(errors.contains_key("status"), "{status_code} should fail");
        }
    }
}
