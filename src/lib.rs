//! # kiln - Declarative Build Recipes for Native Projects
//!
//! kiln declares the pinned external libraries, settings axes, and generators
//! a C/C++ project needs, hands them to a package-resolution service (Conan),
//! and then drives the native build (CMake) through configure and build.
//!
//! ## Quick Start
//!
//! ```bash
//! # Write kiln.toml with the built-in Multor and Compressor recipes
//! kiln init
//!
//! # Resolve, configure, and compile
//! kiln build multor -s os=Linux -s compiler=gcc -s build_type=Release -s arch=x86_64
//! ```
//!
//! ## Module Organization
//!
//! - [`recipe`] - Recipe aggregate: settings, generators, requirements
//! - [`config`] - `kiln.toml` parsing
//! - [`resolve`] - Resolution service boundary and the Conan resolver
//! - [`driver`] - Build driver boundary and the CMake driver
//! - [`build`] - Configure/build lifecycle
//! - [`commands`] - CLI command handlers

/// Configure/build lifecycle and toolchain fingerprints.
pub mod build;

/// CLI command handlers extracted from main.
pub mod commands;

/// Manifest parsing (`kiln.toml`).
pub mod config;

/// Built-in Multor and Compressor declarations.
pub mod declarations;

/// Build driver boundary.
pub mod driver;

/// Error taxonomy.
pub mod error;

/// Lockfile (`kiln.lock`) management.
pub mod lock;

/// Settings profiles.
pub mod profile;

/// Recipe aggregate.
pub mod recipe;

/// Resolution service boundary.
pub mod resolve;

/// Host compiler and platform detection.
pub mod toolchain;

/// Requirement tree visualization.
pub mod tree;

/// Terminal UI utilities (tables, colors).
pub mod ui;
