use serde::{Deserialize, Serialize};
use serde_json;
use std::fs;
use std::io::prelude::*;
use std::io::{Error, ErrorKind};
use std::path::Path;

/// Settings that shape how shapefile sessions are opened. Backed by a
/// settings.json file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Configs {
    /// Reports session summaries at info level rather than debug.
    pub verbose_mode: bool,
    /// Cross-checks each geometry record against its index entry on read.
    pub verify_index: bool,
    /// Capacity, in bytes, of the buffered file readers and writers.
    pub buffer_size: usize,
}

impl Configs {
    pub fn new() -> Configs {
        Configs {
            verbose_mode: false,
            verify_index: true,
            buffer_size: 8192,
        }
    }
}

impl Default for Configs {
    fn default() -> Configs {
        Configs::new()
    }
}

/// Reads a settings file. A missing file yields the default settings.
pub fn read_configs<P: AsRef<Path>>(config_file: P) -> Result<Configs, Error> {
    let contents = match fs::read_to_string(config_file.as_ref()) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Configs::new()),
        Err(e) => return Err(e),
    };
    serde_json::from_str(&contents).map_err(|e| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Failed to parse {}: {}", config_file.as_ref().display(), e),
        )
    })
}

pub fn save_configs<P: AsRef<Path>>(configs: &Configs, config_file: P) -> Result<(), Error> {
    let configs_json = serde_json::to_string_pretty(configs)
        .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;
    let mut file = fs::File::create(config_file)?;
    file.write_all(configs_json.as_bytes())?;
    Ok(())
}
