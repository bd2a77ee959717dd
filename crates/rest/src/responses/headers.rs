//! Alert header generation.
//!
//! Mutating requests answer with `X-{app}-alert` and `X-{app}-params`
//! headers that a client UI can turn into a notification. Failed requests
//! carry `X-{app}-error` instead of the alert.

use http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::ServerConfig;

/// Builder for alert headers.
///
/// With translation enabled the alert is a message key such as
/// `consultationApp.consultationConsultation.created`; otherwise it is a
/// human-readable sentence.
#[derive(Debug, Clone)]
pub struct AlertHeaders {
    /// Prefix of the header names and of translation keys.
    application_name: String,
    /// Emit translation keys instead of messages.
    enable_translation: bool,
}

impl AlertHeaders {
    /// Creates a builder for the given application.
    pub fn new(application_name: impl Into<String>, enable_translation: bool) -> Self {
        Self {
            application_name: application_name.into(),
            enable_translation,
        }
    }

    /// Creates a builder from the server configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.application_name.clone(), config.enable_translation)
    }

    /// Returns the application name.
    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    /// Returns whether alerts carry translation keys.
    pub fn translation_enabled(&self) -> bool {
        self.enable_translation
    }

    /// Builds an alert carrying `message` and `param`.
    pub fn alert(&self, message: &str, param: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        self.insert(&mut headers, "alert", message);
        self.insert(&mut headers, "params", &encode_param(param));
        headers
    }

    /// Alert for a newly created entity.
    pub fn entity_creation(&self, entity_name: &str, param: &str) -> HeaderMap {
        let message = if self.enable_translation {
            format!("{}.{}.created", self.application_name, entity_name)
        } else {
            format!(
                "A new {} is created with identifier {}",
                entity_name, param
            )
        };
        self.alert(&message, param)
    }

    /// Alert for an updated entity.
    pub fn entity_update(&self, entity_name: &str, param: &str) -> HeaderMap {
        let message = if self.enable_translation {
            format!("{}.{}.updated", self.application_name, entity_name)
        } else {
            format!("A {} is updated with identifier {}", entity_name, param)
        };
        self.alert(&message, param)
    }

    /// Alert for a deleted entity.
    pub fn entity_deletion(&self, entity_name: &str, param: &str) -> HeaderMap {
        let message = if self.enable_translation {
            format!("{}.{}.deleted", self.application_name, entity_name)
        } else {
            format!("A {} is deleted with identifier {}", entity_name, param)
        };
        self.alert(&message, param)
    }

    /// Failure alert: `X-{app}-error` and `X-{app}-params: {entity}`.
    pub fn failure(&self, entity_name: &str, error_key: &str, default_message: &str) -> HeaderMap {
        let message = if self.enable_translation {
            format!("error.{}", error_key)
        } else {
            default_message.to_string()
        };

        let mut headers = HeaderMap::new();
        self.insert(&mut headers, "error", &message);
        self.insert(&mut headers, "params", &encode_param(entity_name));
        headers
    }

    fn header_name(&self, suffix: &str) -> Option<HeaderName> {
        HeaderName::from_bytes(format!("X-{}-{}", self.application_name, suffix).as_bytes()).ok()
    }

    fn insert(&self, headers: &mut HeaderMap, suffix: &str, value: &str) {
        let Some(name) = self.header_name(suffix) else {
            tracing::warn!(
                application_name = %self.application_name,
                "Application name is not usable in a header name"
            );
            return;
        };
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(name, value);
        }
    }
}

/// Percent-encodes a header parameter (form encoding, spaces as `+`).
pub fn encode_param(param: &str) -> String {
    url::form_urlencoded::byte_serialize(param.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_creation_with_translation() {
        let headers =
            AlertHeaders::new("consultationApp", true).entity_creation("consultationConsultation", "1");
        assert_eq!(
            get(&headers, "x-consultationapp-alert"),
            Some("consultationApp.consultationConsultation.created")
        );
        assert_eq!(get(&headers, "x-consultationapp-params"), Some("1"));
    }

    #[test]
    fn test_update_and_deletion_keys() {
        let alerts = AlertHeaders::new("consultationApp", true);
        let update = alerts.entity_update("consultationConsultation", "7");
        assert_eq!(
            get(&update, "x-consultationapp-alert"),
            Some("consultationApp.consultationConsultation.updated")
        );
        let deletion = alerts.entity_deletion("consultationConsultation", "7");
        assert_eq!(
            get(&deletion, "x-consultationapp-alert"),
            Some("consultationApp.consultationConsultation.deleted")
        );
    }

    #[test]
    fn test_human_messages_without_translation() {
        let alerts = AlertHeaders::new("consultationApp", false);
        let headers = alerts.entity_creation("consultationConsultation", "1");
        assert_eq!(
            get(&headers, "x-consultationapp-alert"),
            Some("A new consultationConsultation is created with identifier 1")
        );
        let headers = alerts.entity_deletion("consultationConsultation", "1");
        assert_eq!(
            get(&headers, "x-consultationapp-alert"),
            Some("A consultationConsultation is deleted with identifier 1")
        );
    }

    #[test]
    fn test_failure() {
        let headers = AlertHeaders::new("consultationApp", true).failure(
            "consultationConsultation",
            "idexists",
            "A new consultation cannot already have an ID",
        );
        assert_eq!(get(&headers, "x-consultationapp-error"), Some("error.idexists"));
        assert_eq!(
            get(&headers, "x-consultationapp-params"),
            Some("consultationConsultation")
        );
        assert!(headers.get("x-consultationapp-alert").is_none());
    }

    #[test]
    fn test_failure_without_translation_uses_message() {
        let headers =
            AlertHeaders::new("consultationApp", false).failure("consultationConsultation", "idnull", "Invalid id");
        assert_eq!(get(&headers, "x-consultationapp-error"), Some("Invalid id"));
    }

    #[test]
    fn test_params_are_percent_encoded() {
        assert_eq!(encode_param("a b/c"), "a+b%2Fc");
        let headers = AlertHeaders::new("app", true).alert("app.thing.created", "x&y");
        assert_eq!(get(&headers, "x-app-params"), Some("x%26y"));
    }

    #[test]
    fn test_invalid_application_name_emits_nothing() {
        let headers = AlertHeaders::new("bad name", true).entity_creation("e", "1");
        assert!(headers.is_empty());
    }
}
