//! SCons job dispatch.
//!
//! Every build-family command ends up here: the manager resolves the
//! toolchain packages a target needs, puts their `bin` directories in
//! front of the child's `PATH` and runs `scons -Q <target>` with the
//! board variables, colorizing its output as it streams by.

use crate::config::Config;
use crate::exec::{ExecOptions, OutputMode, exec_command};
use crate::paths;
use colored::*;
use std::env;
use std::ffi::OsString;

/// Package holding the SCons construction scripts. Every target needs
/// it, on top of whatever toolchain the target asks for.
const SCONS_PACKAGE: &str = "scons-packages";

/// Board selection forwarded to SCons as `key=value` variables.
#[derive(Debug, Default)]
pub struct BoardOptions {
    pub board: Option<String>,
    pub fpga: Option<String>,
    pub size: Option<String>,
    pub fpga_type: Option<String>,
    pub pack: Option<String>,
}

impl BoardOptions {
    /// Render the present fields as SCons variables, in a fixed order.
    pub fn variables(&self) -> Vec<String> {
        let pairs = [
            ("board", &self.board),
            ("fpga", &self.fpga),
            ("size", &self.size),
            ("type", &self.fpga_type),
            ("pack", &self.pack),
        ];
        pairs
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| format!("{key}={v}")))
            .collect()
    }
}

/// Dispatcher for the SCons targets apio knows about.
pub struct Scons<'a> {
    config: &'a Config,
}

impl<'a> Scons<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Synthesis and place-and-route.
    pub fn build(&self, options: &BoardOptions) -> i32 {
        self.run("build", options.variables(), &["toolchain-icestorm"])
    }

    /// Bitstream timing analysis.
    pub fn time(&self, options: &BoardOptions) -> i32 {
        self.run("time", options.variables(), &["toolchain-icestorm"])
    }

    /// Verilog verification.
    pub fn verify(&self) -> i32 {
        self.run("verify", Vec::new(), &["toolchain-iverilog"])
    }

    /// Verilog simulation.
    pub fn sim(&self) -> i32 {
        self.run("sim", Vec::new(), &["toolchain-iverilog"])
    }

    /// Remove build artifacts. Needs no toolchain.
    pub fn clean(&self) -> i32 {
        self.run("clean", Vec::new(), &[])
    }

    /// Launch `scons -Q <target> <vars...>` and return its exit code.
    fn run(&self, target: &str, variables: Vec<String>, toolchains: &[&str]) -> i32 {
        let mut packages: Vec<&str> = toolchains.to_vec();
        packages.push(SCONS_PACKAGE);
        let Some(path) = self.toolchain_path(&packages) else {
            return 1;
        };

        let mut argv: Vec<String> = vec!["scons".into(), "-Q".into(), target.into()];
        argv.extend(variables);

        println!("{} {}", "⚙".cyan(), argv.join(" ").dimmed());

        let result = exec_command(
            &argv,
            ExecOptions {
                stdout: OutputMode::CaptureWith(Box::new(on_stdout_line)),
                stderr: OutputMode::CaptureWith(Box::new(on_stderr_line)),
                path: Some(path),
            },
        );
        result.returncode.unwrap_or(1)
    }

    /// Child `PATH` with each required package's `bin` directory in
    /// front. `None` when a required package is not installed.
    fn toolchain_path(&self, packages: &[&str]) -> Option<OsString> {
        let mut bins = Vec::new();
        for name in packages {
            let dir = paths::package_dir(self.config, name);
            if dir.as_os_str().is_empty() {
                println!("{} Package '{}' is not installed.", "x".red(), name);
                println!(
                    "   {} Install the toolchain and try again.",
                    "!".yellow()
                );
                return None;
            }
            bins.push(dir.join("bin"));
        }

        let current = env::var_os("PATH").unwrap_or_default();
        env::join_paths(bins.into_iter().chain(env::split_paths(&current))).ok()
    }
}

fn on_stdout_line(line: &str) {
    if line.contains("is up to date") || line.ends_with("done") {
        println!("{}", line.green());
    } else {
        println!("{line}");
    }
}

fn on_stderr_line(line: &str) {
    let lower = line.to_lowercase();
    if lower.contains("error") {
        println!("{}", line.red());
    } else if lower.contains("warning") {
        println!("{}", line.yellow());
    } else {
        println!("{line}");
    }
}
