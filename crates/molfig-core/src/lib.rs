//! # molfig Library
//!
//! A layout engine that turns parsed molecular structures into indented,
//! human-editable chemfig code.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear separation of concerns,
//! making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (`Molecule`, `Atom`, `Bond`),
//!   pure geometry helpers, the chemfig formatting tables, and I/O utilities.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer orchestrates the layout process.
//!   It derives drawing geometry from the input coordinates, builds the traversal tree,
//!   and reworks it for cross bonds, bond length normalization and ring annotation.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level, user-facing layer. It ties the
//!   `engine` and `core` together to execute the complete rendering procedure and
//!   provides a simple and powerful entry point for end-users of the library.

pub mod core;
pub mod engine;
pub mod workflows;
