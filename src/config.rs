//! Process-wide configuration overrides.
//!
//! Every tunable option is an `APIO_<OPTION>` key. Precedence is strict:
//! environment variable, then `/etc/apio.json` entry, then the caller's
//! built-in default. The system config file is read once, when the
//! [`Config`] is constructed, and never reloaded.

use colored::*;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Fixed location of the optional system-wide config file.
const SYSTEM_CONFIG_FILE: &str = "/etc/apio.json";

/// Snapshot of the configuration sources, built once at startup and
/// passed by reference to anything that needs option lookup.
#[derive(Debug, Default)]
pub struct Config {
    env: HashMap<String, String>,
    file: Map<String, Value>,
}

impl Config {
    /// Snapshot `APIO_*` environment variables and load the system
    /// config file if it exists.
    pub fn load() -> Self {
        let env = std::env::vars()
            .filter(|(key, _)| key.starts_with("APIO_"))
            .collect();
        let file = read_system_config(Path::new(SYSTEM_CONFIG_FILE));
        Self { env, file }
    }

    /// Build a config from explicit parts. Lookup is deterministic, so
    /// tests never have to touch the process environment.
    pub fn from_parts(env: HashMap<String, String>, file: Map<String, Value>) -> Self {
        Self { env, file }
    }

    /// Resolve the `APIO_<NAME>` option. First match wins: environment
    /// variable, then config file entry. Returns `None` when neither
    /// source defines the key.
    pub fn option_dir(&self, name: &str) -> Option<String> {
        let key = format!("APIO_{}", name.to_uppercase());
        if let Some(value) = self.env.get(&key) {
            return Some(value.clone());
        }
        self.file
            .get(&key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// Read the system JSON config. A missing file is normal; a malformed
/// one is reported and treated as empty.
fn read_system_config(path: &Path) -> Map<String, Value> {
    let Ok(text) = fs::read_to_string(path) else {
        return Map::new();
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => map,
        _ => {
            println!(
                "{} Ignoring invalid JSON in {}",
                "!".yellow(),
                path.display()
            );
            Map::new()
        }
    }
}
