//! # apio - Open Source FPGA Toolchain Front End
//!
//! apio prepares environment paths, locates installed toolchain packages
//! and dispatches synthesis, place-and-route and timing-analysis jobs to
//! SCons, which in turn drives the open FPGA toolchain binaries.
//!
//! ## Quick Start
//!
//! ```bash
//! # Synthesize the bitstream
//! apio build --board icezum
//!
//! # Bitstream timing analysis
//! apio time --board icezum
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Process-wide configuration (environment + `/etc/apio.json`)
//! - [`paths`] - Home and package directory resolution
//! - [`exec`] - Subprocess execution with line-buffered output capture
//! - [`scons`] - SCons job dispatch
//! - [`system`] - Platform identification and system report
//! - [`version`] - Package index version lookup

/// Process-wide configuration overrides.
pub mod config;

/// Subprocess execution and output capture.
pub mod exec;

/// Home and package directory resolution.
pub mod paths;

/// SCons job dispatch (build, time, verify, sim, clean).
pub mod scons;

/// Platform identification and system report.
pub mod system;

/// Package index version lookup.
pub mod version;
