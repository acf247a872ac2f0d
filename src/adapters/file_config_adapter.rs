//! INI file configuration adapter.
//!
//! The config file is optional: without one every lookup misses and the
//! settings layer applies its defaults.

use crate::domain::error::StockcastError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StockcastError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| StockcastError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// Loads `path` when given, otherwise an empty configuration.
    pub fn from_optional<P: AsRef<Path>>(path: Option<P>) -> Result<Self, StockcastError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::empty()),
        }
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, String> {
        match self.config.get(section, key) {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => Self::parse_bool(raw.trim())
                .map(Some)
                .ok_or_else(|| format!("'{}' is not a boolean", raw.trim())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn reads_every_section() {
        let content = r#"
[provider]
mode = fallback
timeout_secs = 7

[model]
path = models/stock_model.json
ridge_alpha = 0.5

[training]
symbols = AAPL,MSFT

[web]
listen = 127.0.0.1:9000
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("provider", "mode"),
            Some("fallback".to_string())
        );
        assert_eq!(
            adapter.get_string("provider", "timeout_secs"),
            Some("7".to_string())
        );
        assert_eq!(
            adapter.get_string("model", "ridge_alpha"),
            Some("0.5".to_string())
        );
        assert_eq!(
            adapter.get_string("training", "symbols"),
            Some("AAPL,MSFT".to_string())
        );
        assert_eq!(
            adapter.get_string("web", "listen"),
            Some("127.0.0.1:9000".to_string())
        );
    }

    #[test]
    fn missing_keys_are_none() {
        let adapter = FileConfigAdapter::from_string("[model]\nseed = 42\n").unwrap();
        assert_eq!(adapter.get_string("model", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
        assert_eq!(adapter.get_bool("model", "missing"), Ok(None));
    }

    #[test]
    fn non_numeric_values_are_returned_verbatim() {
        let adapter =
            FileConfigAdapter::from_string("[model]\nmax_depth = deep\nridge_alpha = lots\n")
                .unwrap();
        assert_eq!(
            adapter.get_string("model", "max_depth"),
            Some("deep".to_string())
        );
        assert_eq!(
            adapter.get_string("model", "ridge_alpha"),
            Some("lots".to_string())
        );
    }

    #[test]
    fn bool_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[x]\na = true\nb = yes\nc = on\nd = false\ne = no\nf = 0\ng = maybe\n",
        )
        .unwrap();
        for key in ["a", "b", "c"] {
            assert_eq!(adapter.get_bool("x", key), Ok(Some(true)), "{}", key);
        }
        for key in ["d", "e", "f"] {
            assert_eq!(adapter.get_bool("x", key), Ok(Some(false)), "{}", key);
        }
        assert!(adapter.get_bool("x", "g").unwrap_err().contains("maybe"));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[provider]\ncsv_dir = /srv/quotes\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("provider", "csv_dir"),
            Some("/srv/quotes".to_string())
        );
    }

    #[test]
    fn missing_file_is_config_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/stockcast.ini").unwrap_err();
        assert!(matches!(err, StockcastError::ConfigParse { ref file, .. } if file.contains("stockcast.ini")));
        assert_eq!(err.kind(), "config_error");
    }

    #[test]
    fn optional_without_path_is_empty() {
        let adapter = FileConfigAdapter::from_optional(None::<&Path>).unwrap();
        assert_eq!(adapter.get_string("provider", "mode"), None);
    }
}
