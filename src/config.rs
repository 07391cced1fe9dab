use std::{collections::HashMap, env, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not a valid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub expose_error_details: bool,
    pub static_dir: PathBuf,
    pub logo_path: PathBuf,
    pub slip_font_path: Option<PathBuf>,
    pub auth: AuthConfig,
    pub sheets: SheetsConfig,
    pub push: PushConfig,
    pub whatsapp: WhatsAppConfig,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub admin_password: Option<String>,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

#[derive(Clone, Debug, Default)]
pub struct SheetsConfig {
    pub sheet_id: String,
    pub service_account_email: String,
    pub private_key: String,
    pub bookings_sheet: String,
    pub admin_sheet: String,
}

impl SheetsConfig {
    pub fn enabled(&self) -> bool {
        !(self.sheet_id.trim().is_empty()
            || self.service_account_email.trim().is_empty()
            || self.private_key.trim().is_empty())
    }
}

#[derive(Clone, Debug, Default)]
pub struct PushConfig {
    pub public_key: String,
    pub private_key: String,
    pub subject: String,
    pub admin_subscription: String,
}

impl PushConfig {
    pub fn enabled(&self) -> bool {
        !(self.public_key.trim().is_empty()
            || self.private_key.trim().is_empty()
            || self.admin_subscription.trim().is_empty())
    }
}

#[derive(Clone, Debug, Default)]
pub struct WhatsAppConfig {
    pub token: String,
    pub phone_number_id: String,
    pub api_version: String,
    pub admin_number: Option<String>,
    pub template_name: String,
}

impl WhatsAppConfig {
    pub fn enabled(&self) -> bool {
        !(self.token.trim().is_empty() || self.phone_number_id.trim().is_empty())
    }
}

impl AppConfig {
    /// Reads `.env` (when present) and the process environment once.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_vars(env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            vars.get(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let or = |name: &str, fallback: &str| get(name).unwrap_or_else(|| fallback.to_string());

        let port = parse_number("PORT", &or("PORT", "3000"))?;
        let token_ttl_secs = parse_number("ADMIN_TOKEN_TTL_SECS", &or("ADMIN_TOKEN_TTL_SECS", "43200"))?;
        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let static_dir = PathBuf::from(or("STATIC_DIR", "./dist"));
        let logo_path = get("LOGO_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| static_dir.join("logo.png"));

        Ok(Self {
            host: or("HOST", "0.0.0.0"),
            port,
            expose_error_details: or("APP_ENV", "production") == "development",
            static_dir,
            logo_path,
            slip_font_path: get("SLIP_FONT_PATH").map(PathBuf::from),
            auth: AuthConfig {
                admin_password: get("ADMIN_PASSWORD"),
                jwt_secret,
                token_ttl_secs,
            },
            sheets: SheetsConfig {
                sheet_id: or("SHEET_ID", ""),
                service_account_email: or("GOOGLE_SERVICE_ACCOUNT_EMAIL", ""),
                private_key: or("GOOGLE_PRIVATE_KEY", "").replace("\\n", "\n"),
                bookings_sheet: or("BOOKINGS_SHEET", "Sheet1"),
                admin_sheet: or("ADMIN_SHEET", "Admin"),
            },
            push: PushConfig {
                public_key: or("VAPID_PUBLIC_KEY", ""),
                private_key: or("VAPID_PRIVATE_KEY", ""),
                subject: or("VAPID_SUBJECT", "mailto:admin@localhost"),
                admin_subscription: or("ADMIN_PUSH_SUBSCRIPTION", ""),
            },
            whatsapp: WhatsAppConfig {
                token: or("META_WA_TOKEN", ""),
                phone_number_id: or("META_WA_PHONE_NUMBER_ID", ""),
                api_version: or("META_WA_API_VERSION", "v19.0"),
                admin_number: get("ADMIN_WA_NUMBER"),
                template_name: or("WA_TEMPLATE_NAME", "form_submission_alert"),
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = AppConfig::from_vars(vars(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.auth.token_ttl_secs, 43200);
        assert_eq!(config.logo_path, PathBuf::from("./dist").join("logo.png"));
        assert_eq!(config.sheets.bookings_sheet, "Sheet1");
        assert_eq!(config.whatsapp.template_name, "form_submission_alert");
        assert!(config.auth.admin_password.is_none());
        assert!(config.slip_font_path.is_none());
        assert!(!config.expose_error_details);
        assert!(!config.sheets.enabled());
        assert!(!config.push.enabled());
        assert!(!config.whatsapp.enabled());
    }

    #[test]
    fn jwt_secret_is_required() {
        let err = AppConfig::from_vars(vars(&[("PORT", "8080")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = AppConfig::from_vars(vars(&[("JWT_SECRET", "x"), ("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn private_key_newlines_are_expanded() {
        let config = AppConfig::from_vars(vars(&[
            ("JWT_SECRET", "x"),
            ("APP_ENV", "development"),
            ("GOOGLE_PRIVATE_KEY", "-----BEGIN-----\\nabc\\n-----END-----"),
        ]))
        .unwrap();
        assert_eq!(config.sheets.private_key, "-----BEGIN-----\nabc\n-----END-----");
        assert!(config.expose_error_details);
    }
}
