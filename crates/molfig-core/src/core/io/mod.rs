//! # Core I/O Module
//!
//! File-based input for the library: a molecule can be handed over
//! programmatically through the builder, or read from the TOML descriptor
//! format that upstream perception toolkits write.
//!
//! - [`descriptor`] - The TOML molecule-descriptor interchange format

pub mod descriptor;
