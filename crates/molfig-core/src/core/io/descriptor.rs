use crate::core::models::bond::InputStereo;
use crate::core::models::molecule::{Molecule, MoleculeError};
use nalgebra::Point2;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid molecule in '{path}': {source}")]
    Molecule {
        path: String,
        source: MoleculeError,
    },
}

fn default_order() -> u8 {
    1
}

#[derive(Debug, Deserialize)]
struct AtomRecord {
    element: String,
    x: f64,
    y: f64,
    #[serde(default)]
    hydrogens: u8,
    #[serde(default)]
    charge: i32,
    #[serde(default)]
    radical: u8,
}

#[derive(Debug, Deserialize)]
struct BondRecord {
    atoms: (usize, usize),
    #[serde(default = "default_order")]
    order: u8,
    #[serde(default)]
    stereo: InputStereo,
}

#[derive(Debug, Deserialize)]
struct RingRecord {
    bonds: Vec<(usize, usize)>,
    #[serde(default)]
    aromatic: bool,
}

#[derive(Debug, Deserialize)]
struct DescriptorFile {
    #[serde(default)]
    atoms: Vec<AtomRecord>,
    #[serde(default)]
    bonds: Vec<BondRecord>,
    #[serde(default)]
    rings: Vec<RingRecord>,
}

/// Loads a molecule from a TOML descriptor file.
///
/// The descriptor carries pre-resolved depiction state: atom tables with
/// 2-D coordinates and folded hydrogens, bonds by zero-based atom index
/// with order and stereo, and the perceived rings as bond lists. It is the
/// interchange format between an upstream perception toolkit and this
/// library.
pub fn load_molecule(path: &Path) -> Result<Molecule, DescriptorError> {
    let content = std::fs::read_to_string(path).map_err(|e| DescriptorError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    let descriptor: DescriptorFile = toml::from_str(&content).map_err(|e| DescriptorError::Toml {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    assemble(descriptor).map_err(|e| DescriptorError::Molecule {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

fn assemble(descriptor: DescriptorFile) -> Result<Molecule, MoleculeError> {
    let mut builder = Molecule::builder();
    for atom in &descriptor.atoms {
        builder.add_atom(
            &atom.element,
            Point2::new(atom.x, atom.y),
            atom.hydrogens,
            atom.charge,
            atom.radical,
        );
    }
    for bond in &descriptor.bonds {
        builder.add_bond(bond.atoms.0, bond.atoms.1, bond.order, bond.stereo);
    }
    for ring in &descriptor.rings {
        builder.add_ring(&ring.bonds, ring.aromatic);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn load_succeeds_with_valid_descriptor() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("ethanol.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(
            file,
            r#"
            [[atoms]]
            element = "C"
            x = 0.0
            y = 0.0
            hydrogens = 3

            [[atoms]]
            element = "C"
            x = 0.87
            y = 0.5
            hydrogens = 2

            [[atoms]]
            element = "O"
            x = 1.73
            y = 0.0
            hydrogens = 1

            [[bonds]]
            atoms = [0, 1]

            [[bonds]]
            atoms = [1, 2]
            order = 1
            "#
        )
        .unwrap();

        let molecule = load_molecule(&file_path).unwrap();
        assert_eq!(molecule.atoms.len(), 3);
        assert_eq!(molecule.bonds.len(), 2);
        assert_eq!(molecule.atoms[1].neighbors, vec![0, 2]);
        assert_eq!(molecule.atoms[2].hydrogens, 1);
    }

    #[test]
    fn omitted_fields_take_their_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("minimal.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(
            file,
            r#"
            [[atoms]]
            element = "C"
            x = 0.0
            y = 0.0

            [[atoms]]
            element = "C"
            x = 1.0
            y = 0.0

            [[bonds]]
            atoms = [0, 1]
            "#
        )
        .unwrap();

        let molecule = load_molecule(&file_path).unwrap();
        assert_eq!(molecule.atoms[0].hydrogens, 0);
        assert_eq!(molecule.atoms[0].charge, 0);
        assert_eq!(molecule.bonds[0].order, 1);
        assert_eq!(molecule.bonds[0].stereo, InputStereo::None);
        assert!(molecule.rings.is_empty());
    }

    #[test]
    fn stereo_and_ring_tables_parse() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("ring.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(
            file,
            r#"
            [[atoms]]
            element = "C"
            x = 0.0
            y = 0.0

            [[atoms]]
            element = "C"
            x = 1.0
            y = 0.0

            [[atoms]]
            element = "C"
            x = 0.5
            y = 0.87

            [[bonds]]
            atoms = [0, 1]
            stereo = "up"

            [[bonds]]
            atoms = [1, 2]

            [[bonds]]
            atoms = [2, 0]

            [[rings]]
            bonds = [[0, 1], [1, 2], [2, 0]]
            aromatic = true
            "#
        )
        .unwrap();

        let molecule = load_molecule(&file_path).unwrap();
        assert_eq!(molecule.bonds[0].stereo, InputStereo::Up);
        assert_eq!(molecule.rings.len(), 1);
        assert!(molecule.rings[0].aromatic);
        assert_eq!(molecule.rings[0].pairs.len(), 3);
    }

    #[test]
    fn missing_file_reports_an_io_error() {
        let dir = tempdir().unwrap();
        let result = load_molecule(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(DescriptorError::Io { .. })));
    }

    #[test]
    fn malformed_toml_reports_a_parse_error() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("broken.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "[[atoms]\nelement =").unwrap();

        let result = load_molecule(&file_path);
        assert!(matches!(result, Err(DescriptorError::Toml { .. })));
    }

    #[test]
    fn invalid_references_surface_as_molecule_errors() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("dangling.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(
            file,
            r#"
            [[atoms]]
            element = "C"
            x = 0.0
            y = 0.0

            [[bonds]]
            atoms = [0, 9]
            "#
        )
        .unwrap();

        let result = load_molecule(&file_path);
        assert!(matches!(
            result,
            Err(DescriptorError::Molecule {
                source: MoleculeError::BondAtomOutOfRange { atom: 9, .. },
                ..
            })
        ));
    }
}
