//! Integration tests for configuration precedence and home resolution.
//!
//! Configs are built from explicit parts so the tests never mutate the
//! real process environment.

use apio::config::Config;
use apio::paths;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::fs;

fn env_home(dir: &str) -> HashMap<String, String> {
    HashMap::from([("APIO_HOME_DIR".to_string(), dir.to_string())])
}

fn file_home(dir: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("APIO_HOME_DIR".to_string(), json!(dir));
    map
}

#[test]
fn env_override_resolves_and_creates_home() {
    let root = tempfile::tempdir().unwrap();
    let target = root.path().join("x");

    let config = Config::from_parts(env_home(target.to_str().unwrap()), Map::new());
    assert_eq!(paths::home_dir(&config), target);
    assert!(target.is_dir());
}

#[test]
fn config_file_entry_resolves_when_env_is_unset() {
    let root = tempfile::tempdir().unwrap();
    let target = root.path().join("from-config-file");

    let config = Config::from_parts(HashMap::new(), file_home(target.to_str().unwrap()));
    assert_eq!(paths::home_dir(&config), target);
}

#[test]
fn env_override_beats_config_file_entry() {
    let root = tempfile::tempdir().unwrap();
    let from_env = root.path().join("env");
    let from_file = root.path().join("file");

    let config = Config::from_parts(
        env_home(from_env.to_str().unwrap()),
        file_home(from_file.to_str().unwrap()),
    );
    assert_eq!(paths::home_dir(&config), from_env);
    assert!(!from_file.exists());
}

#[test]
fn package_lookup_walks_every_home_candidate() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let installed = second.path().join("packages").join("toolchain-icestorm");
    fs::create_dir_all(&installed).unwrap();

    let joined = std::env::join_paths([first.path(), second.path()]).unwrap();
    let config = Config::from_parts(env_home(joined.to_str().unwrap()), Map::new());

    // Home resolution picks the first writable candidate...
    assert_eq!(paths::home_dir(&config), first.path());
    // ...but the package probe still finds the install under the second.
    assert_eq!(paths::package_dir(&config, "toolchain-icestorm"), installed);
}
