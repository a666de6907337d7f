//! Package index version lookup.
//!
//! One blocking GET against the fixed index URL. Any failure is reported
//! in color and turned into `None`; nothing here ever propagates an
//! error to the caller.

use anyhow::Result;
use colored::*;
use semver::Version;
use serde::Deserialize;
use std::time::Duration;

const INDEX_URL: &str = "https://pypi.python.org/pypi/apio/json";
const USER_AGENT: &str = concat!("apio/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize, Debug)]
struct IndexResponse {
    info: IndexInfo,
}

#[derive(Deserialize, Debug)]
struct IndexInfo {
    version: String,
}

/// Latest version published on the package index, or `None` on any
/// failure. A transport failure gets the connectivity hint; everything
/// else is reported with the error text.
pub fn latest_published_version() -> Option<String> {
    latest_version_from(INDEX_URL)
}

fn latest_version_from(url: &str) -> Option<String> {
    let response = match ureq::get(url)
        .set("User-Agent", USER_AGENT)
        .timeout(Duration::from_secs(10))
        .call()
    {
        Ok(response) => response,
        Err(ureq::Error::Transport(_)) => {
            println!(
                "{}",
                "Error: could not connect to the package index.\n\
                 Check your internet connection and try again"
                    .red()
            );
            return None;
        }
        Err(e) => {
            println!("{} {}", "Error:".red(), e);
            return None;
        }
    };

    match response.into_json::<IndexResponse>() {
        Ok(body) => Some(body.info.version),
        Err(e) => {
            println!("{} {}", "Error:".red(), e);
            None
        }
    }
}

/// Handle `apio upgrade`: compare the running version against the index.
pub fn check_upgrade() -> Result<()> {
    println!("{} Checking the package index...", "🔍".blue());

    let Some(latest) = latest_published_version() else {
        return Ok(());
    };
    let current = Version::parse(env!("CARGO_PKG_VERSION"))?;

    match Version::parse(&latest) {
        Ok(remote) if remote > current => {
            println!(
                "{} New version available: v{} -> v{}",
                "🚀".green(),
                current,
                remote
            );
            println!("   Run {} to upgrade.", "cargo install apio".cyan());
        }
        Ok(_) => println!("{} apio is up to date (v{})", "✓".green(), current),
        Err(e) => println!(
            "{} Could not parse published version '{}': {}",
            "!".yellow(),
            latest,
            e
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_failure_yields_none() {
        // Port 1 on loopback refuses immediately; no network needed.
        assert_eq!(latest_version_from("http://127.0.0.1:1/json"), None);
    }

    #[test]
    fn malformed_body_yields_none() {
        // Bad URL scheme is also a non-panicking failure path.
        assert_eq!(latest_version_from("not a url"), None);
    }

    #[test]
    fn index_response_shape_parses() {
        let body = r#"{"info": {"version": "0.2.0", "name": "apio"}}"#;
        let parsed: IndexResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.info.version, "0.2.0");
    }
}
