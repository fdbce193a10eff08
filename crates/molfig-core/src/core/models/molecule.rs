use super::atom::Atom;
use super::bond::{Bond, BondKind, InputStereo, Winding};
use nalgebra::Point2;
use thiserror::Error;

/// Orders the atoms of a bond so that either traversal direction maps to
/// the same lookup key.
pub fn canonical_pair(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("molecule has no atoms")]
    Empty,
    #[error("bond {bond} references atom {atom}, but only {count} atoms are declared")]
    BondAtomOutOfRange {
        bond: usize,
        atom: usize,
        count: usize,
    },
    #[error("bond {bond} connects atom {atom} to itself")]
    SelfBond { bond: usize, atom: usize },
    #[error("bond {bond} has order {order}, expected 1 to 4")]
    InvalidBondOrder { bond: usize, order: u8 },
    #[error("ring {ring} references bond {a}-{b}, which is not declared")]
    RingBondMissing { ring: usize, a: usize, b: usize },
}

/// An input bond between two atoms, before any drawing decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondSpec {
    pub atoms: (usize, usize),
    pub order: u8,
    pub stereo: InputStereo,
}

/// One ring of the smallest set of smallest rings, given as the atom pairs
/// of its bonds in ring-walk order.
///
/// The aromatic flag travels separately from the bond orders because the
/// input may arrive kekulized, with alternating single and double bonds
/// standing in for the aromatic system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring {
    pub pairs: Vec<(usize, usize)>,
    pub aromatic: bool,
}

/// A parsed molecule as delivered by the upstream toolkit: atoms with 2-D
/// depiction coordinates, bonds with order and stereo annotations, and the
/// perceived rings.
///
/// Instances are immutable input; the layout engine works on its own copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<BondSpec>,
    pub rings: Vec<Ring>,
}

impl Molecule {
    pub fn builder() -> MoleculeBuilder {
        MoleculeBuilder::new()
    }
}

/// Assembles a [`Molecule`], deferring all validation to [`build`].
///
/// Atoms are indexed by insertion order; bonds and rings reference those
/// indices. Neighbor lists are derived from bond declaration order, which
/// later fixes the branch order of the layout tree.
///
/// [`build`]: MoleculeBuilder::build
#[derive(Debug, Default)]
pub struct MoleculeBuilder {
    atoms: Vec<Atom>,
    bonds: Vec<BondSpec>,
    rings: Vec<Ring>,
}

impl MoleculeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an atom and returns the builder; the atom's index is its
    /// insertion position.
    pub fn add_atom(
        &mut self,
        element: &str,
        position: Point2<f64>,
        hydrogens: u8,
        charge: i32,
        radical: u8,
    ) -> &mut Self {
        let index = self.atoms.len();
        let mut atom = Atom::new(index, position, element);
        atom.hydrogens = hydrogens;
        atom.charge = charge;
        atom.radical = radical;
        self.atoms.push(atom);
        self
    }

    pub fn add_bond(&mut self, a: usize, b: usize, order: u8, stereo: InputStereo) -> &mut Self {
        self.bonds.push(BondSpec {
            atoms: (a, b),
            order,
            stereo,
        });
        self
    }

    pub fn add_ring(&mut self, pairs: &[(usize, usize)], aromatic: bool) -> &mut Self {
        self.rings.push(Ring {
            pairs: pairs.to_vec(),
            aromatic,
        });
        self
    }

    pub fn build(self) -> Result<Molecule, MoleculeError> {
        let Self {
            mut atoms,
            bonds,
            rings,
        } = self;

        if atoms.is_empty() {
            return Err(MoleculeError::Empty);
        }

        let count = atoms.len();
        for (index, bond) in bonds.iter().enumerate() {
            let (a, b) = bond.atoms;
            for atom in [a, b] {
                if atom >= count {
                    return Err(MoleculeError::BondAtomOutOfRange {
                        bond: index,
                        atom,
                        count,
                    });
                }
            }
            if a == b {
                return Err(MoleculeError::SelfBond {
                    bond: index,
                    atom: a,
                });
            }
            if !(1..=4).contains(&bond.order) {
                return Err(MoleculeError::InvalidBondOrder {
                    bond: index,
                    order: bond.order,
                });
            }
        }

        let declared: std::collections::HashSet<(usize, usize)> = bonds
            .iter()
            .map(|bond| canonical_pair(bond.atoms.0, bond.atoms.1))
            .collect();
        for (index, ring) in rings.iter().enumerate() {
            for &(a, b) in &ring.pairs {
                if !declared.contains(&canonical_pair(a, b)) {
                    return Err(MoleculeError::RingBondMissing { ring: index, a, b });
                }
            }
        }

        for bond in &bonds {
            let (a, b) = bond.atoms;
            atoms[a].neighbors.push(b);
            atoms[b].neighbors.push(a);
        }

        Ok(Molecule {
            atoms,
            bonds,
            rings,
        })
    }
}

/// An undirected bond resolved for drawing: kind settled, geometry cached.
///
/// The stored angle runs from the first atom to the second with the global
/// rotation folded in, left unnormalized the way the raw geometry reports
/// it. Directed [`Bond`] views are derived on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub atoms: (usize, usize),
    pub kind: BondKind,
    pub length: f64,
    pub angle: f64,
}

impl Edge {
    pub fn key(&self) -> (usize, usize) {
        canonical_pair(self.atoms.0, self.atoms.1)
    }

    /// Directed view from the first atom to the second.
    pub fn forward(&self) -> Bond {
        Bond {
            start: self.atoms.0,
            end: self.atoms.1,
            kind: self.kind,
            length: self.length,
            angle: self.angle,
            winding: Winding::Unknown,
        }
    }

    /// Directed view from the second atom to the first.
    pub fn reverse(&self) -> Bond {
        self.forward().inverted()
    }

    /// Directed view leaving `from`, or `None` when the atom is not an
    /// endpoint of this edge.
    pub fn leaving(&self, from: usize) -> Option<Bond> {
        if from == self.atoms.0 {
            Some(self.forward())
        } else if from == self.atoms.1 {
            Some(self.reverse())
        } else {
            None
        }
    }
}
