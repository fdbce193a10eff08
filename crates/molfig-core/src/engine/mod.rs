//! # Engine Module
//!
//! This module implements the layout decision engine that turns a parsed
//! molecule into an ordered, annotated drawing plan, providing the stateful
//! middle layer between the core data models and the rendering workflow.
//!
//! ## Overview
//!
//! The engine owns every decision that shapes the final drawing: which atom
//! the drawing starts and ends on, in which order bonds are traversed, how
//! ring closures and crossing bonds are rearranged, how bond lengths map to
//! drawing units, and which rings collapse into aromatic circles. It builds
//! on the stateless geometry and formatting of [`crate::core`] and is
//! driven end to end by [`crate::workflows`].
//!
//! ## Architecture
//!
//! The module is organized into submodules that own one pass each:
//!
//! - **Configuration** ([`config`]) - Rendering options, validation, and the TOML file format
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation
//!
//! The internal passes behind them: **state** derives directed edges and
//! per-atom bond angles from the input molecule, **fragments** links
//! disconnected pieces with invisible bonds, **tree** parses the bond graph
//! into a rooted drawing order and reworks cross bonds and bond scaling,
//! **rings** annotates ring bonds, and **render** emits the finished lines.
//!
//! ## Key Capabilities
//!
//! - **Deterministic traversal order** with entry/exit selection and trunk marking
//! - **Ring-closure handling** through space-reserving phantom leaves
//! - **Cross-over bonds** re-drawn last so they visually pass over earlier strokes
//! - **Bond length normalization** so standard bonds render without length arguments
//! - **Aromatic circle substitution** for geometrically regular aromatic rings
//! - **Stroke-side and trim selection** for double and triple bonds

pub mod config;
pub mod error;
pub(crate) mod fragments;
pub(crate) mod render;
pub(crate) mod rings;
pub(crate) mod state;
pub(crate) mod tree;
