use crate::config::MailSettings;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{self, Validate};
use std::env;
use std::fmt;

pub const SENDER_EMAIL: &str = "SENDER_EMAIL";
pub const APP_PASSWORD: &str = "APP_PASSWORD";
pub const RECIPIENT_EMAIL: &str = "RECIPIENT_EMAIL";

/// Mail account details sourced from the environment.
#[derive(Clone)]
pub struct MailCredentials {
    pub sender: String,
    pub app_password: String,
    pub recipient: String,
}

impl fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailCredentials")
            .field("sender", &self.sender)
            .field("app_password", &"***")
            .field("recipient", &self.recipient)
            .finish()
    }
}

impl MailCredentials {
    pub fn from_env(settings: &MailSettings) -> Result<Self> {
        Self::from_lookup(settings, |key| env::var(key).ok())
    }

    /// `lookup` resolves a variable name; empty values count as missing.
    pub fn from_lookup<F>(settings: &MailSettings, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ReportError::MissingConfigError {
                    field: key.to_string(),
                })
        };

        let sender = required(SENDER_EMAIL)?;
        let app_password = required(APP_PASSWORD)?;
        let recipient = match &settings.recipient {
            Some(recipient) => recipient.clone(),
            None => required(RECIPIENT_EMAIL)?,
        };

        let credentials = Self {
            sender,
            app_password,
            recipient,
        };
        credentials.validate()?;
        Ok(credentials)
    }
}

impl Validate for MailCredentials {
    fn validate(&self) -> Result<()> {
        validation::validate_email(SENDER_EMAIL, &self.sender)?;
        validation::validate_email(RECIPIENT_EMAIL, &self.recipient)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_credentials_from_lookup() {
        let lookup = lookup_from(&[
            (SENDER_EMAIL, "bot@example.com"),
            (APP_PASSWORD, "abcd efgh"),
            (RECIPIENT_EMAIL, "desk@example.com"),
        ]);

        let credentials = MailCredentials::from_lookup(&MailSettings::default(), lookup).unwrap();
        assert_eq!(credentials.sender, "bot@example.com");
        assert_eq!(credentials.recipient, "desk@example.com");
        assert!(!format!("{:?}", credentials).contains("abcd"));
    }

    #[test]
    fn test_missing_password_is_config_error() {
        let lookup = lookup_from(&[
            (SENDER_EMAIL, "bot@example.com"),
            (RECIPIENT_EMAIL, "desk@example.com"),
        ]);

        let err = MailCredentials::from_lookup(&MailSettings::default(), lookup).unwrap_err();
        match err {
            ReportError::MissingConfigError { field } => assert_eq!(field, APP_PASSWORD),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_recipient_setting_overrides_environment() {
        let settings = MailSettings {
            recipient: Some("override@example.com".to_string()),
            ..MailSettings::default()
        };
        let lookup = lookup_from(&[(SENDER_EMAIL, "bot@example.com"), (APP_PASSWORD, "secret")]);

        let credentials = MailCredentials::from_lookup(&settings, lookup).unwrap();
        assert_eq!(credentials.recipient, "override@example.com");
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let lookup = lookup_from(&[
            (SENDER_EMAIL, "   "),
            (APP_PASSWORD, "secret"),
            (RECIPIENT_EMAIL, "desk@example.com"),
        ]);

        assert!(MailCredentials::from_lookup(&MailSettings::default(), lookup).is_err());
    }
}
