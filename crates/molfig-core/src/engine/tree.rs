//! Layout tree construction.
//!
//! The tree fixes the drawing order of a molecule: a depth-first walk from
//! the entry atom turns every edge into a directed tree node, ring-closing
//! edges become phantom leaves, and the path from the entry atom to the
//! exit atom is marked as the trunk so it renders without bracket nesting.
//! Cross-over bonds and bond length scaling rework the finished tree.

use std::collections::{HashMap, HashSet};

use slotmap::{SlotMap, new_key_type};

use super::config::{BondScaleMode, RenderConfig};
use super::error::LayoutError;
use super::state::LayoutState;
use crate::core::chemfig;
use crate::core::geometry::distance_and_angle;
use crate::core::models::bond::{Bond, BondKind, Winding};
use crate::core::models::molecule::canonical_pair;

new_key_type! {
    /// Key of one node in the layout tree arena.
    pub struct NodeId;
}

/// Drawing state of one bond in the layout tree.
#[derive(Debug, Clone, PartialEq)]
pub struct BondData {
    pub bond: Bond,
    /// The end atom is already drawn elsewhere; render a space-reserving
    /// phantom instead of the label.
    pub to_phantom: bool,
    /// On the path from the entry atom to the exit atom.
    pub is_trunk: bool,
    /// Crosses over another bond as the final piece of the drawing.
    pub is_last: bool,
    /// Background gaps when this bond is drawn crossing over another.
    pub cross_gaps: Option<(i32, i32)>,
    pub marker: Option<String>,
}

/// What one tree node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    /// The entry atom, drawn without a leading bond.
    Root { atom: usize },
    Bond(BondData),
    /// Circle replacing the inner bonds of an aromatic ring, hung off the
    /// last ring bond as an invisible spoke plus a circle macro.
    RingCircle { angle: f64, length: f64, radius: f64 },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub payload: NodePayload,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// The parsed drawing order of one molecule.
pub struct LayoutTree {
    pub nodes: SlotMap<NodeId, Node>,
    pub root: NodeId,
    pub entry_atom: usize,
    /// Atom the drawing finishes on. Equals `entry_atom` for a single-atom
    /// molecule.
    pub exit_atom: usize,
    /// Node whose children all render as bracketed branches. `None` only
    /// for a single-atom molecule without an explicit exit request.
    pub exit_node: Option<NodeId>,
    /// Factor applied to every tree bond length by [`scale_bonds`].
    ///
    /// [`scale_bonds`]: LayoutTree::scale_bonds
    pub scale_factor: f64,
    edge_nodes: HashMap<(usize, usize), NodeId>,
}

impl LayoutTree {
    /// Parses the connected molecule in `state` into a tree, then settles
    /// the exit atom and marks the trunk.
    pub fn build(state: &LayoutState, config: &RenderConfig) -> Result<Self, LayoutError> {
        let count = state.atoms.len();

        let entry_atom = match config.entry_atom {
            Some(number) => number
                .checked_sub(1)
                .filter(|&index| index < count)
                .ok_or(LayoutError::InvalidEntryAtom { number, count })?,
            // A terminal atom keeps every angle after the first relative.
            None => (0..count)
                .min_by_key(|&index| state.atoms[index].neighbors.len())
                .unwrap_or(0),
        };
        let exit_request = match config.exit_atom {
            Some(number) => Some(
                number
                    .checked_sub(1)
                    .filter(|&index| index < count)
                    .ok_or(LayoutError::InvalidExitAtom { number, count })?,
            ),
            None => None,
        };

        let mut builder = TreeBuilder {
            state,
            markers: config.markers.as_deref(),
            nodes: SlotMap::with_key(),
            seen_atoms: vec![false; count],
            seen_edges: HashSet::new(),
            edge_nodes: HashMap::new(),
            exit_request,
            exit_node: None,
        };
        let root = builder
            .parse(None, entry_atom)?
            .ok_or_else(|| LayoutError::Internal("tree walk rejected the entry atom".to_string()))?;

        let mut tree = Self {
            nodes: builder.nodes,
            root,
            entry_atom,
            exit_atom: entry_atom,
            exit_node: builder.exit_node,
            scale_factor: 1.0,
            edge_nodes: builder.edge_nodes,
        };

        if count > 1 {
            if tree.exit_node.is_none() {
                tree.exit_node = Some(tree.default_exit_node()?);
            }
            if let Some(exit_node) = tree.exit_node {
                tree.exit_atom = tree.end_atom_of(exit_node).ok_or_else(|| {
                    LayoutError::Internal("exit node has no end atom".to_string())
                })?;
            }
            tree.mark_trunk()?;
        }

        Ok(tree)
    }

    /// Tree node of the edge between `a` and `b`, in whichever direction
    /// the walk traversed it.
    pub fn node_for_pair(&self, a: usize, b: usize) -> Option<NodeId> {
        self.edge_nodes.get(&canonical_pair(a, b)).copied()
    }

    /// All bond nodes in depth-first pre-order.
    pub fn bond_nodes(&self) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if matches!(self.nodes[id].payload, NodePayload::Bond(_)) {
                result.push(id);
            }
            for &child in self.nodes[id].children.iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Atom a node's drawing pen ends on, if it has one.
    pub fn end_atom_of(&self, id: NodeId) -> Option<usize> {
        match &self.nodes[id].payload {
            NodePayload::Root { atom } => Some(*atom),
            NodePayload::Bond(data) => Some(data.bond.end),
            NodePayload::RingCircle { .. } => None,
        }
    }

    // The default exit bond maximizes tree depth, then child count; among
    // fully tied candidates the one latest in pre-order wins.
    fn default_exit_node(&self) -> Result<NodeId, LayoutError> {
        let mut scored: Vec<(usize, usize, NodeId)> = Vec::new();
        for id in self.bond_nodes() {
            let NodePayload::Bond(data) = &self.nodes[id].payload else {
                continue;
            };
            // A phantom atom is drawn elsewhere and cannot end the drawing.
            if data.to_phantom {
                continue;
            }
            scored.push((self.depth_from_entry(id), self.nodes[id].children.len(), id));
        }
        scored.sort_by_key(|&(depth, children, _)| (depth, children));
        scored
            .last()
            .map(|&(_, _, id)| id)
            .ok_or_else(|| {
                LayoutError::Internal("no exit candidate in a multi-atom molecule".to_string())
            })
    }

    fn depth_from_entry(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = Some(id);
        while let Some(node) = current {
            if self.end_atom_of(node) == Some(self.entry_atom) {
                break;
            }
            depth += 1;
            current = self.nodes[node].parent;
        }
        depth
    }

    fn mark_trunk(&mut self) -> Result<(), LayoutError> {
        if self.entry_atom == self.exit_atom {
            return Ok(());
        }
        let Some(mut current) = self.exit_node else {
            return Ok(());
        };
        while self.end_atom_of(current) != Some(self.entry_atom) {
            if let NodePayload::Bond(data) = &mut self.nodes[current].payload {
                data.is_trunk = true;
            }
            current = self.nodes[current]
                .parent
                .ok_or_else(|| LayoutError::Internal("trunk walk escaped the tree".to_string()))?;
        }
        Ok(())
    }

    /// Reworks the tree so the requested bonds draw on top of whatever they
    /// cross.
    ///
    /// A crossing bond must be drawn after everything it crosses, so its
    /// tree node is demoted to an invisible link (keeping its subtree) and
    /// a childless phantom copy is spliced in under the exit node, reached
    /// by an invisible pen move from the exit atom. A bond that already
    /// renders last just gets tagged in place.
    pub fn process_cross_bonds(
        &mut self,
        state: &LayoutState,
        config: &RenderConfig,
    ) -> Result<(), LayoutError> {
        for &(a_number, b_number) in &config.cross_bonds {
            let not_found = LayoutError::CrossBondNotFound {
                a: a_number,
                b: b_number,
            };
            let (Some(a), Some(b)) = (a_number.checked_sub(1), b_number.checked_sub(1)) else {
                return Err(not_found);
            };
            let node_id = self.node_for_pair(a, b).ok_or(not_found)?;
            let exit_node = self.exit_node.ok_or_else(|| {
                LayoutError::Internal("cross bonds processed without an exit bond".to_string())
            })?;

            let snapshot = match &self.nodes[node_id].payload {
                NodePayload::Bond(data) => data.clone(),
                _ => {
                    return Err(LayoutError::Internal(
                        "cross bond node is not a bond".to_string(),
                    ));
                }
            };
            let bond = snapshot.bond;
            let gaps = bond.cross_gaps(&state.atoms[bond.start], &state.atoms[bond.end]);

            // The bond may already be the very last thing rendered; then it
            // can cross without being moved.
            if self.nodes[exit_node].children.last() == Some(&node_id) {
                if let NodePayload::Bond(data) = &mut self.nodes[node_id].payload {
                    data.cross_gaps = Some(gaps);
                    data.is_last = true;
                }
                continue;
            }

            let mut copy = snapshot;
            copy.cross_gaps = Some(gaps);
            copy.to_phantom = true;

            if let NodePayload::Bond(data) = &mut self.nodes[node_id].payload {
                data.bond.kind = BondKind::Link;
                data.cross_gaps = None;
                data.marker = None;
            }

            let copy_id = self.nodes.insert(Node {
                payload: NodePayload::Bond(copy),
                parent: None,
                children: Vec::new(),
            });

            if bond.start != self.exit_atom {
                let (length, angle) = distance_and_angle(
                    &state.atoms[self.exit_atom].position,
                    &state.atoms[bond.start].position,
                );
                let pen_move = BondData {
                    bond: Bond {
                        start: self.exit_atom,
                        end: bond.start,
                        kind: BondKind::Link,
                        length,
                        angle: angle + config.rotate,
                        winding: Winding::Unknown,
                    },
                    to_phantom: true,
                    is_trunk: false,
                    is_last: false,
                    cross_gaps: None,
                    marker: None,
                };
                let pen_id = self.nodes.insert(Node {
                    payload: NodePayload::Bond(pen_move),
                    parent: Some(exit_node),
                    children: vec![copy_id],
                });
                self.nodes[copy_id].parent = Some(pen_id);
                self.nodes[exit_node].children.push(pen_id);
            } else {
                self.nodes[copy_id].parent = Some(exit_node);
                self.nodes[exit_node].children.push(copy_id);
            }
        }
        Ok(())
    }

    /// Applies the configured bond length scaling to every tree bond and
    /// records the factor for later ring and dimension calculations.
    ///
    /// Normalization buckets the lengths at `bond_round` decimals and
    /// scales the most common bucket to the stretch factor, so standard
    /// bonds render without a length argument.
    pub fn scale_bonds(&mut self, config: &RenderConfig) {
        let bond_ids = self.bond_nodes();
        let factor = match config.bond_scale {
            BondScaleMode::Keep => 1.0,
            BondScaleMode::Scale => config.bond_stretch,
            BondScaleMode::Normalize => {
                let bucket = 10f64.powi(config.bond_round as i32);
                let mut counts: Vec<(i64, u32)> = Vec::new();
                for &id in &bond_ids {
                    if let NodePayload::Bond(data) = &self.nodes[id].payload {
                        let key = (data.bond.length * bucket).round() as i64;
                        match counts.iter_mut().find(|(k, _)| *k == key) {
                            Some(entry) => entry.1 += 1,
                            None => counts.push((key, 1)),
                        }
                    }
                }
                let mut best: Option<(i64, u32)> = None;
                for &(key, count) in &counts {
                    let better = match best {
                        Some((_, best_count)) => count > best_count,
                        None => true,
                    };
                    if better {
                        best = Some((key, count));
                    }
                }
                match best {
                    Some((key, _)) => config.bond_stretch / (key as f64 / bucket),
                    None => 1.0,
                }
            }
        };

        self.scale_factor = factor;
        for id in bond_ids {
            if let NodePayload::Bond(data) = &mut self.nodes[id].payload {
                data.bond.length *= factor;
            }
        }
    }
}

struct TreeBuilder<'a> {
    state: &'a LayoutState,
    markers: Option<&'a str>,
    nodes: SlotMap<NodeId, Node>,
    seen_atoms: Vec<bool>,
    seen_edges: HashSet<(usize, usize)>,
    edge_nodes: HashMap<(usize, usize), NodeId>,
    exit_request: Option<usize>,
    exit_node: Option<NodeId>,
}

impl TreeBuilder<'_> {
    // Depth-first walk. Returns `None` for an edge the walk already took,
    // which can reach this point through two rings sharing it.
    fn parse(&mut self, start: Option<usize>, end: usize) -> Result<Option<NodeId>, LayoutError> {
        let node_id = match start {
            None => self.nodes.insert(Node {
                payload: NodePayload::Root { atom: end },
                parent: None,
                children: Vec::new(),
            }),
            Some(start_atom) => {
                let key = canonical_pair(start_atom, end);
                if self.seen_edges.contains(&key) {
                    return Ok(None);
                }
                let bond = self.state.bond_leaving(start_atom, end).ok_or_else(|| {
                    LayoutError::Internal(format!(
                        "neighbor lists name atoms {start_atom} and {end} but no edge joins them"
                    ))
                })?;
                self.seen_edges.insert(key);
                let to_phantom = self.seen_atoms[end];
                let marker = match self.markers {
                    Some(prefix) if bond.kind != BondKind::Link => {
                        Some(chemfig::bond_marker(prefix, start_atom, end))
                    }
                    _ => None,
                };
                let id = self.nodes.insert(Node {
                    payload: NodePayload::Bond(BondData {
                        bond,
                        to_phantom,
                        is_trunk: false,
                        is_last: false,
                        cross_gaps: None,
                        marker,
                    }),
                    parent: None,
                    children: Vec::new(),
                });
                self.edge_nodes.insert(key, id);
                // A closure bond ends on an atom that is already drawn; it
                // becomes a leaf and the walk does not continue through it.
                if to_phantom {
                    return Ok(Some(id));
                }
                id
            }
        };

        self.seen_atoms[end] = true;
        if self.exit_request == Some(end) {
            self.exit_node = Some(node_id);
        }

        let state = self.state;
        for &next in &state.atoms[end].neighbors {
            if start == Some(next) {
                continue;
            }
            if let Some(child) = self.parse(Some(end), next)? {
                self.nodes[child].parent = Some(node_id);
                self.nodes[node_id].children.push(child);
            }
        }
        Ok(Some(node_id))
    }
}
