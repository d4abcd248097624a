use serde::Deserialize;
use std::path::{Path, PathBuf};

use tillscan_email::SmtpSettings;
use tillscan_ocr::FeatureType;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_addr: String,
    pub db_path: PathBuf,
    /// Structural analyses requested from the OCR backend. Passed through
    /// to the engine; line extraction does not consume their output.
    pub ocr_features: Vec<FeatureType>,
    /// When absent, notifications are disabled.
    pub smtp: Option<SmtpSettings>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            db_path: PathBuf::from("tillscan.db"),
            ocr_features: vec![FeatureType::Tables, FeatureType::Forms],
            smtp: None,
        }
    }
}

impl Config {
    /// Load from a TOML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = Config::load(Path::new("/nonexistent/tillscan.toml")).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.ocr_features, vec![FeatureType::Tables, FeatureType::Forms]);
        assert!(cfg.smtp.is_none());
    }

    #[test]
    fn partial_toml_keeps_unset_defaults() {
        let cfg: Config = toml::from_str(r#"bind_addr = "0.0.0.0:9000""#).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:9000");
        assert_eq!(cfg.db_path, PathBuf::from("tillscan.db"));
    }

    #[test]
    fn smtp_section_parses() {
        let cfg: Config = toml::from_str(
            r#"
            ocr_features = ["tables"]

            [smtp]
            relay = "smtp.example.com"
            username = "u"
            password = "p"
            from = "receipts@example.com"
            to = "ops@example.com"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.ocr_features, vec![FeatureType::Tables]);
        assert_eq!(cfg.smtp.unwrap().relay, "smtp.example.com");
    }
}
