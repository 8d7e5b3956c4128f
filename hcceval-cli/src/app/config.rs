// Imports
use std::io::{Read, Write};

use hcceval_core::eval::DEFAULT_NB_WORKERS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(from = "ConfigPrecursor")]
pub struct Config {
    pub nb_workers: usize,
}

impl Config {
    pub const FILENAME: &'static str = "config.json";

    pub fn load(filepath: &std::path::Path) -> Self {
        match Self::from_file(filepath) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Warning: failed to load configuration from file, '{err}'");
                let config = ConfigPrecursor::default();
                let Ok(downcast_error) = err.downcast::<std::io::Error>() else {
                    return config.into();
                };
                if downcast_error.kind() == std::io::ErrorKind::NotFound {
                    match config.to_file(filepath) {
                        Ok(()) => eprintln!(
                            "Warning: Created default configuration file, at '{}'",
                            filepath.display()
                        ),
                        Err(error) => eprintln!(
                            "Warning: Failed to create default configuration file, at '{}', caused by '{}'",
                            filepath.display(),
                            error
                        ),
                    }
                }
                config.into()
            }
        }
    }

    fn from_file(filepath: &std::path::Path) -> anyhow::Result<Self> {
        let mut buffer: Vec<u8> = Vec::new();
        std::fs::OpenOptions::new()
            .create(false)
            .read(true)
            .open(filepath)?
            .read_to_end(&mut buffer)?;
        Ok(ijson::from_value(&serde_json::from_slice(&buffer)?)?)
    }
}

impl From<ConfigPrecursor> for Config {
    fn from(value: ConfigPrecursor) -> Self {
        let nb_workers = if value.nb_workers == 0 {
            eprintln!("Warning: `nb_workers` must be at least 1, falling back to {DEFAULT_NB_WORKERS}");
            DEFAULT_NB_WORKERS
        } else {
            value.nb_workers
        };
        Self { nb_workers }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename = "config")]
pub struct ConfigPrecursor {
    pub nb_workers: usize,
}

impl Default for ConfigPrecursor {
    fn default() -> Self {
        Self { nb_workers: DEFAULT_NB_WORKERS }
    }
}

impl ConfigPrecursor {
    fn to_file(
        &self,
        filepath: &std::path::Path,
    ) -> anyhow::Result<()> {
        let mut file = std::fs::OpenOptions::new().create(true).write(true).truncate(true).open(filepath)?;
        file.write_all(serde_json::to_string_pretty(&ijson::to_value(self)?)?.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}
