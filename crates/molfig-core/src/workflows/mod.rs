//! # Workflows Module
//!
//! This module provides the high-level entry points that turn a parsed
//! molecule into finished chemfig code.
//!
//! ## Overview
//!
//! Workflows are the top-level API of molfig. They encapsulate the whole
//! rendering pipeline, from configuration validation through geometry
//! derivation, tree construction and reworking, down to the final indented
//! drawing lines, so that callers deal with one function and one result
//! type instead of the engine internals.
//!
//! ## Architecture
//!
//! The module is organized around specific rendering workflows:
//!
//! - **Render Workflow** ([`render`]) - Complete molecule-to-chemfig
//!   rendering including fragment linking, cross bonds, bond length
//!   normalization and ring annotation.
//!
//! ## Key Capabilities
//!
//! - **End-to-end rendering** from molecular input to chemfig source lines
//! - **Up-front validation** of all configuration options
//! - **Progress reporting** through structured tracing spans and events
//! - **Drawing metrics** with the rotated bounding box of the result
//! - **Error handling** with precise diagnostics for bad atom references

pub mod render;
