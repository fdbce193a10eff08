use std::collections::HashMap;

use super::config::RenderConfig;
use super::error::LayoutError;
use crate::core::geometry::{distance_and_angle, normalize_degrees};
use crate::core::models::atom::Atom;
use crate::core::models::bond::{Bond, BondKind};
use crate::core::models::molecule::{Edge, Molecule, canonical_pair};

/// Working copy of a molecule, geometry settled for one layout run.
///
/// Construction applies the configured mirroring to the coordinates,
/// resolves every bond into its drawing kind and caches each bond's length
/// and rotated angle. Both endpoints of a bond record the bond's direction
/// in their `bond_angles`: the first atom sees the raw angle, the second
/// the inverted angle wrapped into `[0, 360)`.
///
/// Link edges added afterwards extend the connectivity without claiming
/// space in `bond_angles`, so atoms held only by links still label as
/// solitary.
#[derive(Debug, Clone)]
pub struct LayoutState {
    pub atoms: Vec<Atom>,
    pub edges: Vec<Edge>,
    /// Atom pairs of the input bonds in declaration order, links excluded.
    pub bond_pairs: Vec<(usize, usize)>,
    pair_index: HashMap<(usize, usize), usize>,
    rotate: f64,
}

impl LayoutState {
    pub fn new(molecule: &Molecule, config: &RenderConfig) -> Result<Self, LayoutError> {
        let mut atoms = molecule.atoms.clone();
        for atom in &mut atoms {
            if config.flip_horizontal {
                atom.position.x = -atom.position.x;
            }
            if config.flip_vertical {
                atom.position.y = -atom.position.y;
            }
        }

        let mirrored = config.mirrored();
        let mut edges = Vec::with_capacity(molecule.bonds.len());
        let mut bond_pairs = Vec::with_capacity(molecule.bonds.len());
        let mut pair_index = HashMap::with_capacity(molecule.bonds.len());

        for (index, spec) in molecule.bonds.iter().enumerate() {
            let (a, b) = spec.atoms;
            let kind = BondKind::resolve(spec.order, spec.stereo, mirrored).ok_or_else(|| {
                LayoutError::Internal(format!(
                    "bond {index} passed validation with order {}",
                    spec.order
                ))
            })?;

            let (length, angle) = distance_and_angle(&atoms[a].position, &atoms[b].position);
            let angle = angle + config.rotate;
            atoms[a].bond_angles.push(angle);
            atoms[b].bond_angles.push(normalize_degrees(angle + 180.0));

            pair_index.insert(canonical_pair(a, b), edges.len());
            bond_pairs.push((a, b));
            edges.push(Edge {
                atoms: (a, b),
                kind,
                length,
                angle,
            });
        }

        Ok(Self {
            atoms,
            edges,
            bond_pairs,
            pair_index,
            rotate: config.rotate,
        })
    }

    /// Connects two atoms with an invisible link edge and registers the
    /// neighborhood on both sides.
    pub fn add_link(&mut self, a: usize, b: usize) {
        let (length, angle) = distance_and_angle(&self.atoms[a].position, &self.atoms[b].position);
        self.pair_index.insert(canonical_pair(a, b), self.edges.len());
        self.edges.push(Edge {
            atoms: (a, b),
            kind: BondKind::Link,
            length,
            angle: angle + self.rotate,
        });
        self.atoms[a].neighbors.push(b);
        self.atoms[b].neighbors.push(a);
    }

    pub fn edge_between(&self, a: usize, b: usize) -> Option<&Edge> {
        self.pair_index
            .get(&canonical_pair(a, b))
            .map(|&index| &self.edges[index])
    }

    /// Directed bond view leaving `from` toward `to`, if such an edge
    /// exists.
    pub fn bond_leaving(&self, from: usize, to: usize) -> Option<Bond> {
        self.edge_between(from, to)?.leaving(from)
    }
}
