//! Cross-platform application paths

use std::fs;
use std::path::PathBuf;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    /// `$GNOSIS_DATA_DIR` if set, else the OS data directory plus `gnosis`.
    pub fn new() -> Result<Self, AppError> {
        let data_dir = match std::env::var_os("GNOSIS_DATA_DIR") {
            Some(v) if !v.is_empty() => PathBuf::from(v),
            _ => Self::get_data_dir()?,
        };
        Self::at(data_dir)
    }

    pub fn at(data_dir: PathBuf) -> Result<Self, AppError> {
        // Ensure directory exists
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    fn get_data_dir() -> Result<PathBuf, AppError> {
        let base = dirs::data_dir().ok_or(AppError::NoDataDir)?;
        Ok(base.join("gnosis"))
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    pub fn stars_file(&self) -> PathBuf {
        self.data_dir.join("stars.json")
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }
}
