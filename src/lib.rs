// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # stepgen: step builders for Java classes
//!
//! Generates type-guided fluent builders ("step builders") and updaters
//! from descriptors of Java classes.
//!
//! ## Core Concept
//!
//! A **goal** is a constructor, a static or instance method, or a mutable
//! bean whose arguments should be supplied one at a time. For each goal
//! stepgen generates:
//!
//! - a **contract**: one nested interface per step, each with exactly one
//!   method, so the compiler enforces that every argument is supplied in
//!   order before the goal can be invoked
//! - an **implementation** of that contract, optionally recycled through a
//!   per-thread cache
//! - optionally an **updater**, seeded from an existing instance, whose
//!   setters may be called in any order
//!
//! All goals of one source class land in a single generated class named
//! after it (`Cube` → `CubeBuilders`).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepgen::{Build, GeneratorConfig, Unit};
//!
//! let unit = Unit::from_yaml(r#"
//!   package: cube
//!   source: Cube
//!   builders: {}
//!   types:
//!     - name: Cube
//!       constructors:
//!         - params:
//!             - { name: width, type: String }
//!             - { name: length, type: "List<String>" }
//!           goal: { updater: true }
//! "#)?;
//!
//! let mut build = Build::new(GeneratorConfig::default());
//! let file = build.render(&unit)?;
//! assert_eq!(file.path.to_str(), Some("cube/CubeBuilders.java"));
//! ```
//!
//! Client code then reads:
//!
//! ```java
//! Cube cube = CubeBuilders.cubeBuilder().width("a").length(list);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                                                             │
//! │  UNIT (YAML / JSON descriptor)                              │
//! │       │                                                     │
//! │       ├──► TypeModel::new(unit) ──► introspection           │
//! │       │                                                     │
//! │       ├──► analyse(unit, model) ──► Analysis (goals)        │
//! │       │                                                     │
//! │       ├──► generate(analysis) ──► GenerationUnit            │
//! │       │         (builder, updater, bean updater, generics)  │
//! │       │                                                     │
//! │       └──► Renderer::render(unit) ──► Java source           │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure is reported as an [`Error`]; analysis failures carry an
//! [`ErrorKind`] and the element that caused them.

// Input model
pub mod config;
pub mod error;
pub mod introspect;
pub mod model;
pub mod types;
pub mod util;

// Analysis
pub mod analyse;
pub mod goal;

// Generation
pub mod decl;
pub mod generate;
pub mod modules;
pub mod render;

// Re-exports
pub use analyse::{analyse, generated_name, Analysis};
pub use config::{GeneratorConfig, RenderOptions, CONFIG_FILE};
pub use error::{Error, ErrorKind, Result, ValidationError};
pub use generate::{generate, Build, GeneratedFile, GenerationUnit};
pub use goal::{GoalDescription, GoalDetails, Lifecycle};
pub use introspect::TypeModel;
pub use model::{schema, Unit};
pub use render::{Provenance, Renderer};
pub use types::{ClassName, TypeName};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
