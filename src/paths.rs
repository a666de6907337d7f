//! Home and package directory resolution.
//!
//! The home directory is where installed toolchain packages live. The
//! `home_dir` option accepts a path-list (`:`/`;` separated) of
//! candidates, tried in order. Resolution is recomputed on every call;
//! nothing is cached.

use crate::config::Config;
use colored::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_HOME: &str = "~/.apio";

/// Resolve a writable home directory.
///
/// The first existing writable candidate wins. Failing that, the first
/// candidate that can be created with `create_dir_all` is created and
/// returned. A permission error is a warning, not the end: the next
/// candidate is tried. When every candidate fails an error is reported
/// and an empty path is returned; the caller decides what that means.
pub fn home_dir(config: &Config) -> PathBuf {
    let raw = config
        .option_dir("home_dir")
        .unwrap_or_else(|| DEFAULT_HOME.to_string());
    let candidates = split_candidates(&raw);

    for path in &candidates {
        if path.is_dir() && dir_is_writable(path) {
            return path.clone();
        }
    }

    for path in &candidates {
        if path.is_dir() {
            continue;
        }
        match fs::create_dir_all(path) {
            Ok(()) => return path.clone(),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                println!("{} Can't create {}", "!".yellow(), path.display());
            }
            Err(_) => {}
        }
    }

    println!("{} No usable home directory", "x".red());
    PathBuf::new()
}

/// Locate an installed package under `<home>/packages/<name>`.
///
/// Every home candidate is probed; the first existing directory wins.
/// Returns an empty path when the package is not installed. Never
/// creates anything.
pub fn package_dir(config: &Config, name: &str) -> PathBuf {
    let raw = config
        .option_dir("home_dir")
        .unwrap_or_else(|| DEFAULT_HOME.to_string());

    for path in split_candidates(&raw) {
        let package = path.join("packages").join(name);
        if package.is_dir() {
            return package;
        }
    }

    PathBuf::new()
}

/// Split a path-list option on the platform separator and expand a
/// leading `~` in each candidate.
fn split_candidates(raw: &str) -> Vec<PathBuf> {
    std::env::split_paths(raw)
        .map(|p| expand_tilde(&p.to_string_lossy()))
        .collect()
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches(['/', '\\']));
        }
    }
    PathBuf::from(path)
}

/// Probe writability by creating and removing a marker file. Metadata
/// flags lie on network mounts and ACL setups; an actual write doesn't.
fn dir_is_writable(path: &Path) -> bool {
    let probe = path.join(".apio-write-test");
    match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe)
    {
        Ok(_) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => true,
        Err(_) => false,
    }
}
