//! Saved code and file export.
//!
//! Layout under the data directory:
//!
//! ```text
//! <data_dir>/
//! ├── saved_code.txt   # Single save slot
//! └── exports/         # Exported snippets
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use runpad_core::Language;

use crate::error::{ServerError, ServerResult};

const SAVE_SLOT: &str = "saved_code.txt";
const EXPORT_DIR: &str = "exports";

/// Base name of exported files when none is given.
const DEFAULT_EXPORT_STEM: &str = "mycode";

/// Default data directory: the platform data dir, or `./.runpad`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("runpad"))
        .unwrap_or_else(|| PathBuf::from(".runpad"))
}

/// File-backed snippet storage.
#[derive(Debug, Clone)]
pub struct SnippetStore {
    dir: PathBuf,
}

impl SnippetStore {
    /// Open the store, creating its directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> ServerResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| ServerError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// Save code into the single slot, replacing what was there.
    pub fn save(&self, code: &str) -> ServerResult<()> {
        let path = self.dir.join(SAVE_SLOT);
        fs::write(&path, code).map_err(|e| ServerError::io(&path, e))?;
        tracing::debug!("Saved {} bytes to {}", code.len(), path.display());
        Ok(())
    }

    /// Load the saved code, if any.
    pub fn load(&self) -> ServerResult<Option<String>> {
        let path = self.dir.join(SAVE_SLOT);
        match fs::read_to_string(&path) {
            Ok(code) => Ok(Some(code)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ServerError::io(&path, e)),
        }
    }

    /// Write code to a file under `exports/`.
    ///
    /// Without a file name, `mycode.<ext>` is used. Names that would
    /// escape the export directory are rejected.
    pub fn export(
        &self,
        filename: Option<&str>,
        language: Language,
        code: &str,
    ) -> ServerResult<PathBuf> {
        let filename = match filename.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{}.{}", DEFAULT_EXPORT_STEM, language.file_extension()),
        };
        validate_filename(&filename)?;

        let export_dir = self.dir.join(EXPORT_DIR);
        fs::create_dir_all(&export_dir).map_err(|e| ServerError::io(&export_dir, e))?;

        let path = export_dir.join(&filename);
        fs::write(&path, code).map_err(|e| ServerError::io(&path, e))?;
        tracing::info!("Exported snippet to {}", path.display());
        Ok(path)
    }
}

fn validate_filename(name: &str) -> ServerResult<()> {
    let bad = name.contains('/')
        || name.contains('\\')
        || name == "."
        || name.contains("..");
    if bad {
        return Err(ServerError::InvalidFilename(name.to_string()));
    }
    Ok(())
}
