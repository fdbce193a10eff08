//! # Core Module
//!
//! This module provides the fundamental building blocks for turning a parsed
//! molecular structure into chemfig drawing code, serving as the stateless
//! foundation of the library.
//!
//! ## Overview
//!
//! The core module implements the data structures, pure geometry, and text
//! formatting that the layout engine builds on. Nothing in here holds
//! engine state; everything is either a value type or a pure function.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules that handle
//! different aspects of the conversion:
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, rings, and the input molecule
//! - **Plane Geometry** ([`geometry`]) - Polar coordinates and stroke-trim arithmetic
//! - **Drawing Language** ([`chemfig`]) - Bond tokens, atom labels, and comment formatting
//! - **File I/O** ([`io`]) - The TOML molecule-descriptor interchange format
//!
//! ## Conventions
//!
//! Angles are degrees counter-clockwise from east throughout. Atom indices
//! are the upstream toolkit's zero-based numbering and stay stable through
//! every pass; user-facing numbering adds one.

pub mod chemfig;
pub mod geometry;
pub mod io;
pub mod models;
