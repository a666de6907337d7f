//! Platform identification and the `apio system` report.

use crate::config::Config;
use crate::paths;
use anyhow::Result;
use colored::*;

/// Packages the toolchain dispatch can ask for.
const KNOWN_PACKAGES: &[&str] = &[
    "scons-packages",
    "toolchain-icestorm",
    "toolchain-iverilog",
    "examples",
];

/// Platform tag used to pick package downloads, e.g. `linux_x86_64`.
/// Only linux carries the architecture suffix.
pub fn systype() -> String {
    if cfg!(target_os = "linux") {
        format!("linux_{}", std::env::consts::ARCH)
    } else {
        std::env::consts::OS.to_string()
    }
}

/// Print platform, resolved home directory and installed packages.
pub fn print_system_info(config: &Config) -> Result<()> {
    println!("{} v{}", "apio".bold().cyan(), env!("CARGO_PKG_VERSION"));
    println!("{}: {}", "Platform".bold(), systype().cyan());

    let home = paths::home_dir(config);
    if home.as_os_str().is_empty() {
        println!("{}: {}", "Home".bold(), "unresolved".red());
    } else {
        println!("{}: {}", "Home".bold(), home.display());
    }

    println!("\n{}", "Packages:".bold());
    for name in KNOWN_PACKAGES {
        let dir = paths::package_dir(config, name);
        if dir.as_os_str().is_empty() {
            println!("  {} {} {}", "x".red(), name, "(not installed)".dimmed());
        } else {
            println!("  {} {} {}", "✓".green(), name, dir.display().to_string().dimmed());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn systype_is_lowercase_and_names_the_os() {
        let tag = systype();
        assert!(!tag.is_empty());
        assert_eq!(tag, tag.to_lowercase());
        assert!(tag.starts_with(std::env::consts::OS));
    }

    #[test]
    fn linux_tag_carries_the_arch() {
        if cfg!(target_os = "linux") {
            assert_eq!(systype(), format!("linux_{}", std::env::consts::ARCH));
        }
    }
}
