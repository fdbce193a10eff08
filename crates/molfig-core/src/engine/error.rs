use thiserror::Error;

use super::config::ConfigError;
use crate::core::models::molecule::MoleculeError;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Molecule is not valid: {source}")]
    Molecule {
        #[from]
        source: MoleculeError,
    },

    #[error("Configuration is not valid: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Entry atom {number} does not exist; the molecule has {count} atoms")]
    InvalidEntryAtom { number: usize, count: usize },

    #[error("Exit atom {number} does not exist; the molecule has {count} atoms")]
    InvalidExitAtom { number: usize, count: usize },

    #[error("Cross bond {a}-{b} does not match any bond in the tree")]
    CrossBondNotFound { a: usize, b: usize },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
