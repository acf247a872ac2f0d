//! Model bundle persisted as a single JSON document.

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::bundle::ModelBundle;
use crate::domain::error::StockcastError;
use crate::ports::model_port::ModelStore;

pub struct JsonModelStore {
    path: PathBuf,
}

impl JsonModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn not_loaded(&self, reason: impl Into<String>) -> StockcastError {
        StockcastError::ModelNotLoaded {
            path: self.path.display().to_string(),
            reason: reason.into(),
        }
    }
}

impl ModelStore for JsonModelStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<ModelBundle, StockcastError> {
        let file = fs::File::open(&self.path).map_err(|e| self.not_loaded(e.to_string()))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| self.not_loaded(format!("malformed bundle: {}", e)))
    }

    /// Writes to a sibling temp file first so a crash never leaves a
    /// truncated bundle behind.
    fn save(&self, bundle: &ModelBundle) -> Result<(), StockcastError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(fs::File::create(&tmp)?);
            serde_json::to_writer(&mut writer, bundle).map_err(std::io::Error::other)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
