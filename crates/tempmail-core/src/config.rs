/// Configuration - loaded once from environment variables
use tracing::info;

use crate::address::MailCascade;
use crate::constants::DEFAULT_ADMIN_MAIL_SENDER;
use crate::error::{AdminError, Result};

#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// sqlx connection URL of the relational store
    pub database_url: String,

    /// HS256 key for impersonation tokens
    pub jwt_secret: String,

    /// Mail domains addresses may be created under
    pub domains: Vec<String>,

    /// Prepended to new address names when the caller asks for it
    pub prefix: String,

    /// `From` of notification mails written into user inboxes
    pub admin_mail_sender: String,

    /// What address deletion does with the address's inbound mail
    pub mail_cascade: MailCascade,
}

impl AdminConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AdminError::Config(format!("Missing {} env var", key)))
        };

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let domains: Vec<String> = required("DOMAINS")?
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_lowercase())
            .collect();

        let mail_cascade = match lookup("ADDRESS_DELETE_PURGE_MAILS").as_deref().map(str::trim) {
            None | Some("") | Some("false") | Some("0") => MailCascade::Orphan,
            Some("true") | Some("1") => MailCascade::Purge,
            Some(other) => {
                return Err(AdminError::Config(format!(
                    "Invalid ADDRESS_DELETE_PURGE_MAILS value: {}",
                    other
                )));
            }
        };

        let config = Self {
            database_url,
            jwt_secret,
            domains,
            prefix: lookup("PREFIX").unwrap_or_default().trim().to_lowercase(),
            admin_mail_sender: lookup("ADMIN_MAIL_SENDER")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ADMIN_MAIL_SENDER.to_string()),
            mail_cascade,
        };

        config.validate()?;
        info!(
            domains = config.domains.len(),
            mail_cascade = ?config.mail_cascade,
            "Configuration validated successfully"
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.domains.is_empty() {
            return Err(AdminError::Config(
                "DOMAINS must name at least one domain".to_string(),
            ));
        }
        if !self.admin_mail_sender.contains('@') {
            return Err(AdminError::Config(format!(
                "Invalid ADMIN_MAIL_SENDER: {}",
                self.admin_mail_sender
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_minimal_config() {
        let config = AdminConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
            ("DOMAINS", "Example.com, mail.test ,"),
        ]))
        .unwrap();

        assert_eq!(config.domains, vec!["example.com", "mail.test"]);
        assert_eq!(config.prefix, "");
        assert_eq!(config.admin_mail_sender, DEFAULT_ADMIN_MAIL_SENDER);
        assert_eq!(config.mail_cascade, MailCascade::Orphan);
    }

    #[test]
    fn test_missing_secret() {
        let result = AdminConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DOMAINS", "example.com"),
        ]));
        assert!(matches!(result, Err(AdminError::Config(msg)) if msg.contains("JWT_SECRET")));
    }

    #[test]
    fn test_mail_cascade_flag() {
        let base = [
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
            ("DOMAINS", "example.com"),
        ];

        let mut pairs = base.to_vec();
        pairs.push(("ADDRESS_DELETE_PURGE_MAILS", "true"));
        let config = AdminConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.mail_cascade, MailCascade::Purge);

        let mut pairs = base.to_vec();
        pairs.push(("ADDRESS_DELETE_PURGE_MAILS", "sometimes"));
        assert!(AdminConfig::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_empty_domains_rejected() {
        let result = AdminConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
            ("DOMAINS", " , "),
        ]));
        assert!(result.is_err());
    }
}
