//! # texshot Core
//!
//! Structural pre-flight validation for LaTeX fragments.
//!
//! ## Overview
//!
//! Rendering a LaTeX fragment to an image is expensive (a math renderer plus
//! a headless browser), and most renderers fail silently or render garbage
//! when handed structurally broken input. This crate provides the gate that
//! runs before any of that: a cheap scanner that decides whether a fragment
//! is well-formed enough to render and, when it is not, names the first
//! structural defect it found.
//!
//! ## Modules
//!
//! - [`latex_validator`] - Delimiter, command, environment and line-break checks
//!
//! ## Design Philosophy
//!
//! - **Pure**: no I/O, no logging, no global mutable state. The same input
//!   always yields the same result.
//! - **First defect wins**: checks run in a fixed order and stop at the first
//!   failure, so a malformed input maps to exactly one [`Diagnostic`].
//! - **Heuristic, not a grammar**: the command and line-break checks are
//!   character-class patterns, not a LaTeX parser.
//!
//! ## Examples
//!
//! ```
//! use texshot_core::latex_validator::{validate, DiagnosticKind};
//!
//! assert!(validate(r"\begin{aligned}x &= 1\end{aligned}").is_ok());
//!
//! let err = validate(r"\begin{aligned}x").unwrap_err();
//! assert_eq!(err.kind, DiagnosticKind::MissingEnd("aligned".into()));
//! assert_eq!(err.message(), r"TeX error: Missing \end{aligned}");
//! ```
//!
//! ## Feature Flags
//!
//! Currently, this crate does not define any feature flags.

pub mod latex_validator;

pub use latex_validator::{validate, Diagnostic, DiagnosticKind};
