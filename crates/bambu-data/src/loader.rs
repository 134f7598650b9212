//! Data files on disk: RON, TOML or JSON, chosen by extension.
//!
//! A directory holds at most one file per base name (`dashboard.ron` and
//! `dashboard.toml` side by side is an error, not a precedence rule).

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Why a configuration or recording file could not be read.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("no {base_name}.ron, .toml or .json in {dir}")]
    Missing { base_name: String, dir: PathBuf },

    #[error("{path}: expected a .ron, .toml or .json extension")]
    UnknownExtension { path: PathBuf },

    #[error("both {first} and {second} exist; keep only one")]
    Ambiguous { first: PathBuf, second: PathBuf },

    #[error("cannot decode {path}: {detail}")]
    Parse { path: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Formats
// ===========================================================================

/// Serialization format of a data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    /// Lookup order when several could exist.
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }

    /// Format named by the extension of `path`.
    pub fn of(path: &Path) -> Result<Format, DataLoadError> {
        let extension = path.extension().and_then(|e| e.to_str());
        Format::ALL
            .into_iter()
            .find(|format| Some(format.extension()) == extension)
            .ok_or_else(|| DataLoadError::UnknownExtension {
                path: path.to_path_buf(),
            })
    }
}

// ===========================================================================
// Lookup
// ===========================================================================

/// The single `{base_name}.{ron,toml,json}` file in `dir`, if there is one.
pub fn locate(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut present = Format::ALL
        .into_iter()
        .map(|format| format!("{base_name}.{}", format.extension()))
        .map(|file_name| dir.join(file_name))
        .filter(|path| path.is_file());
    match (present.next(), present.next()) {
        (Some(first), Some(second)) => Err(DataLoadError::Ambiguous { first, second }),
        (found, _) => Ok(found),
    }
}

/// [`locate`] for files that must exist.
pub fn locate_required(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    locate(dir, base_name)?.ok_or_else(|| DataLoadError::Missing {
        base_name: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Decoding
// ===========================================================================

/// Read and decode `path` in the format its extension names.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = Format::of(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format).map_err(|detail| DataLoadError::Parse {
        path: path.to_path_buf(),
        detail,
    })
}

/// Decode in-memory content.
pub fn deserialize_str<T: DeserializeOwned>(content: &str, format: Format) -> Result<T, String> {
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
