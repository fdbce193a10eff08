//! # Core Models Module
//!
//! This module contains the fundamental data structures used to represent a
//! parsed molecule on its way to becoming chemfig code, providing the
//! foundation for the whole layout pipeline.
//!
//! ## Overview
//!
//! The models module defines the input side of the engine: atoms with their
//! depiction coordinates, bonds with order and stereo annotations, and the
//! perceived rings. These models are designed to:
//!
//! - **Represent depiction state** - 2-D coordinates, implicit hydrogens, charges
//! - **Stay direction-agnostic** - A bond is stored once and viewed from either end
//! - **Carry layout scratch space** - Accumulated bond angles drive label placement
//! - **Maintain type safety** - Bond kinds, stereo marks and windings as enums
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atom representation with label-placement scoring
//! - [`bond`] - Bond kinds, directed bond views, and stroke geometry
//! - [`molecule`] - The validated input molecule and its builder
//!
//! ## Usage
//!
//! Most callers assemble a molecule through the builder and hand it to the
//! rendering workflow.
//!
//! ```ignore
//! use molfig::core::models::molecule::Molecule;
//!
//! let mut builder = Molecule::builder();
//! builder
//!     .add_atom("C", Point2::new(0.0, 0.0), 3, 0, 0)
//!     .add_atom("O", Point2::new(0.83, 0.0), 1, 0, 0)
//!     .add_bond(0, 1, 1, InputStereo::None);
//! let molecule = builder.build()?;
//! ```

pub mod atom;
pub mod bond;
pub mod molecule;
