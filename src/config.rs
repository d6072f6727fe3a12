use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::error::RunError;

/// One user search filter. Loaded once per run from the JSON config file,
/// immutable afterwards. The file is an array of objects with a required
/// `include` key (search text) and an optional `price` ceiling; any other
/// keys are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Filter {
    #[serde(rename = "include")]
    pub search: String,
    #[serde(rename = "price", default)]
    pub max_price: Option<f64>,
}

pub fn load_filters(path: &Path) -> Result<Vec<Filter>, RunError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| RunError::Config(format!("cannot read {}: {e}", path.display())))?;
    let filters: Vec<Filter> = serde_json::from_str(&content)
        .map_err(|e| RunError::Config(format!("cannot parse {}: {e}", path.display())))?;
    Ok(filters)
}

/// SMTP settings pulled from the environment. Absent sender or password
/// means mail is not set up, which is a valid configuration: the notifier
/// then drops messages silently instead of failing the run.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub sender: String,
    pub password: String,
    pub receiver: String,
    pub server: String,
    pub port: u16,
}

impl MailSettings {
    pub fn from_env() -> Result<Option<Self>, RunError> {
        let sender = match env::var("MAIL_SENDER") {
            Ok(s) if !s.is_empty() => s,
            _ => return Ok(None),
        };
        let password = match env::var("MAIL_PASSWORD") {
            Ok(p) if !p.is_empty() => p,
            _ => return Ok(None),
        };

        let receiver = env::var("MAIL_RECEIVER").unwrap_or_else(|_| sender.clone());
        let server = env::var("SMTP_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let port = match env::var("SMTP_PORT") {
            Ok(p) => p
                .parse()
                .map_err(|_| RunError::Config(format!("invalid SMTP_PORT: {p}")))?,
            Err(_) => 587,
        };

        Ok(Some(Self {
            sender,
            password,
            receiver,
            server,
            port,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn load_filters_reads_search_and_optional_price() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"include": "Nintendo Switch", "price": 200}},
                {{"include": "PS5", "comment": "ignored key"}}
            ]"#
        )
        .unwrap();

        let filters = load_filters(file.path()).unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].search, "Nintendo Switch");
        assert_eq!(filters[0].max_price, Some(200.0));
        assert_eq!(filters[1].search, "PS5");
        assert_eq!(filters[1].max_price, None);
    }

    #[test]
    fn load_filters_missing_file_is_config_error() {
        let err = load_filters(Path::new("/nonexistent/filters.json")).unwrap_err();
        assert_eq!(err.kind_name(), "ConfigError");
    }

    #[test]
    fn load_filters_missing_search_text_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"price": 50}}]"#).unwrap();

        let err = load_filters(file.path()).unwrap_err();
        assert_eq!(err.kind_name(), "ConfigError");
    }
}
