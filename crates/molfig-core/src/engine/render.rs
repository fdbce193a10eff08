//! Depth-first emission of the layout tree as indented chemfig lines.
//!
//! Each node renders as one line: the bond code right-justified into a
//! fixed column, the end atom's label, and a trailing comment naming the
//! atom. Branches off the trunk nest inside bracket lines, and the exit
//! node renders all of its children bracketed so the drawing pen finishes
//! on the exit atom.

use super::config::RenderConfig;
use super::tree::{BondData, LayoutTree, NodeId, NodePayload};
use crate::core::chemfig::{self, AtomLabel, BOND_CODE_WIDTH, BondCode};
use crate::core::models::atom::Atom;
use crate::core::models::bond::{BondKind, Decoration};

pub struct Renderer<'a> {
    tree: &'a LayoutTree,
    atoms: &'a [Atom],
    labels: &'a [AtomLabel],
    config: &'a RenderConfig,
}

impl<'a> Renderer<'a> {
    /// Labels must be cached for every atom; phantoms reuse the label of
    /// the atom's first rendering.
    pub fn new(
        tree: &'a LayoutTree,
        atoms: &'a [Atom],
        labels: &'a [AtomLabel],
        config: &'a RenderConfig,
    ) -> Self {
        Self {
            tree,
            atoms,
            labels,
            config,
        }
    }

    pub fn emit(&self) -> Vec<String> {
        let mut output = Vec::new();
        self.emit_node(&mut output, self.tree.root, 0);
        output
    }

    fn emit_node(&self, output: &mut Vec<String>, id: NodeId, level: usize) {
        output.push(self.node_line(id, level));
        let children = &self.tree.nodes[id].children;

        if Some(id) == self.tree.exit_node {
            self.emit_branches(output, level + 1, children);
        } else if !children.is_empty() {
            // The trunk child continues at the current level after all
            // side branches are closed.
            let trunk_position = children
                .iter()
                .position(|&child| {
                    matches!(
                        &self.tree.nodes[child].payload,
                        NodePayload::Bond(data) if data.is_trunk
                    )
                })
                .unwrap_or(0);
            let branches: Vec<NodeId> = children
                .iter()
                .enumerate()
                .filter(|&(position, _)| position != trunk_position)
                .map(|(_, &child)| child)
                .collect();
            self.emit_branches(output, level + 1, &branches);
            self.emit_node(output, children[trunk_position], level);
        }
    }

    fn emit_branches(&self, output: &mut Vec<String>, level: usize, branches: &[NodeId]) {
        let column = level * self.config.indent + BOND_CODE_WIDTH;
        for &branch in branches {
            output.push(format!("{:>column$}", "("));
            self.emit_node(output, branch, level);
            output.push(format!("{:>column$}", ")"));
        }
    }

    fn node_line(&self, id: NodeId, level: usize) -> String {
        let node = &self.tree.nodes[id];
        let margin = level * self.config.indent;
        match &node.payload {
            NodePayload::Root { atom } => {
                let label = &self.labels[*atom];
                assemble_line(margin, "", &label.code, &label.comment)
            }
            NodePayload::Bond(data) => {
                let (bond_code, atom_code, comment) = self.bond_parts(data, node.parent);
                assemble_line(margin, &bond_code, &atom_code, comment)
            }
            NodePayload::RingCircle {
                angle,
                length,
                radius,
            } => {
                let parent_angle = node.parent.and_then(|parent| self.bond_angle_of(parent));
                let (spoke, circle) = chemfig::format_ring_circle(
                    *angle,
                    parent_angle,
                    *length,
                    *radius,
                    self.config.relative_angles,
                );
                assemble_line(margin, &spoke, &circle, "")
            }
        }
    }

    fn bond_parts<'b>(
        &'b self,
        data: &'b BondData,
        parent: Option<NodeId>,
    ) -> (String, &'b str, &'b str) {
        let bond = &data.bond;
        let start_label = &self.labels[bond.start];
        let end_label = &self.labels[bond.end];

        let (atom_code, end_attach, comment) = if data.to_phantom {
            (
                end_label.phantom.as_str(),
                end_label.phantom_attach.as_str(),
                end_label.closure_comment.as_str(),
            )
        } else {
            (
                end_label.code.as_str(),
                end_label.attach.as_str(),
                end_label.comment.as_str(),
            )
        };

        let (kind, decoration) = self.decoration_for(data);
        let code = chemfig::format_bond(
            &BondCode {
                kind,
                angle: bond.angle,
                parent_angle: parent.and_then(|id| self.bond_angle_of(id)),
                length: bond.length,
                start_attach: &start_label.attach,
                end_attach,
                cross_gaps: data.cross_gaps,
                decoration,
                marker: data.marker.as_deref(),
            },
            self.config.relative_angles,
            self.config.bond_round,
        );

        (code, atom_code, comment)
    }

    // Fancy rendering trades the symmetric double and triple tokens for a
    // decorated single stroke whenever a side or trim improves the shape.
    fn decoration_for(&self, data: &BondData) -> (BondKind, Option<Decoration>) {
        let bond = &data.bond;
        if !self.config.fancy_bonds {
            return (bond.kind, None);
        }
        let start_explicit = self.labels[bond.start].explicit;
        let end_explicit = self.labels[bond.end].explicit;
        match bond.kind {
            BondKind::Double => {
                let double = bond.fancy_double(
                    &self.atoms[bond.start],
                    &self.atoms[bond.end],
                    start_explicit,
                    end_explicit,
                );
                match double {
                    Some(double) => (BondKind::Decorated, Some(Decoration::Double(double))),
                    None => (bond.kind, None),
                }
            }
            BondKind::Triple => {
                let (trim_start, trim_end) = bond.fancy_triple(
                    &self.atoms[bond.start],
                    &self.atoms[bond.end],
                    start_explicit,
                    end_explicit,
                );
                (
                    BondKind::Decorated,
                    Some(Decoration::Triple {
                        trim_start,
                        trim_end,
                    }),
                )
            }
            _ => (bond.kind, None),
        }
    }

    fn bond_angle_of(&self, id: NodeId) -> Option<f64> {
        match &self.tree.nodes[id].payload {
            NodePayload::Bond(data) => Some(data.bond.angle),
            _ => None,
        }
    }
}

fn assemble_line(margin: usize, bond_code: &str, atom_code: &str, comment: &str) -> String {
    let mut line = format!(
        "{}{:>width$}{}",
        " ".repeat(margin),
        bond_code,
        atom_code,
        width = BOND_CODE_WIDTH
    );
    if !comment.is_empty() {
        line.push_str("% ");
        line.push_str(comment);
    }
    line.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::bond::InputStereo;
    use crate::core::models::molecule::Molecule;
    use crate::engine::fragments::connect_fragments;
    use crate::engine::rings::annotate_rings;
    use crate::engine::state::LayoutState;
    use nalgebra::Point2;

    fn rendered(
        atoms: &[(&str, f64, f64)],
        bonds: &[(usize, usize, u8)],
        rings: &[(&[(usize, usize)], bool)],
        config: &RenderConfig,
    ) -> Vec<String> {
        let mut builder = Molecule::builder();
        for &(element, x, y) in atoms {
            builder.add_atom(element, Point2::new(x, y), 0, 0, 0);
        }
        for &(a, b, order) in bonds {
            builder.add_bond(a, b, order, InputStereo::None);
        }
        for &(pairs, aromatic) in rings {
            builder.add_ring(pairs, aromatic);
        }
        let molecule = builder.build().unwrap();

        let mut state = LayoutState::new(&molecule, config).unwrap();
        connect_fragments(&mut state);
        let mut tree = LayoutTree::build(&state, config).unwrap();
        tree.process_cross_bonds(&state, config).unwrap();
        tree.scale_bonds(config);
        annotate_rings(&mut tree, &mut state, &molecule.rings, config).unwrap();
        for atom in &mut state.atoms {
            atom.score_angles();
        }
        let labels: Vec<AtomLabel> = state
            .atoms
            .iter()
            .map(|atom| chemfig::format_atom(atom, config.atom_numbers, config.markers.as_deref()))
            .collect();

        Renderer::new(&tree, &state.atoms, &labels, config).emit()
    }

    #[test]
    fn two_carbons_render_as_root_and_one_bond() {
        let config = RenderConfig::default();
        let lines = rendered(
            &[("C", 0.0, 0.0), ("C", 1.0, 0.0)],
            &[(0, 1, 1)],
            &[],
            &config,
        );
        assert_eq!(
            lines,
            vec![
                "                    % 1: C".to_string(),
                "               -[:0]% 2: C".to_string(),
            ]
        );
    }

    #[test]
    fn lone_atom_renders_its_label_in_the_atom_column() {
        let config = RenderConfig::default();
        let lines = rendered(&[("O", 0.0, 0.0)], &[], &[], &config);
        assert_eq!(lines, vec!["                    O% 1: O".to_string()]);
    }

    #[test]
    fn side_branches_nest_in_brackets_before_the_trunk_continues() {
        let config = RenderConfig::default();
        let lines = rendered(
            &[
                ("C", 0.0, 0.0),
                ("C", 1.0, 0.0),
                ("C", 2.0, 0.0),
                ("C", 1.0, 1.0),
            ],
            &[(0, 1, 1), (1, 2, 1), (1, 3, 1)],
            &[],
            &config,
        );
        assert_eq!(
            lines,
            vec![
                "                    % 1: C".to_string(),
                "               -[:0]% 2: C".to_string(),
                "                       (".to_string(),
                "                   -[:0]% 3: C".to_string(),
                "                       )".to_string(),
                "              -[:90]% 4: C".to_string(),
            ]
        );
    }

    #[test]
    fn explicit_exit_brackets_all_downstream_bonds() {
        let config = RenderConfig::builder().exit_atom(2).build().unwrap();
        let lines = rendered(
            &[("C", 0.0, 0.0), ("C", 1.0, 0.0), ("C", 2.0, 0.0)],
            &[(0, 1, 1), (1, 2, 1)],
            &[],
            &config,
        );
        assert_eq!(
            lines,
            vec![
                "                    % 1: C".to_string(),
                "               -[:0]% 2: C".to_string(),
                "                       (".to_string(),
                "                   -[:0]% 3: C".to_string(),
                "                       )".to_string(),
            ]
        );
    }

    #[test]
    fn ring_closure_renders_a_phantom_with_closure_comment() {
        let config = RenderConfig::default();
        let lines = rendered(
            &[
                ("C", 0.0, 0.0),
                ("C", 1.0, 0.0),
                ("C", 1.0, 1.0),
                ("C", 0.0, 1.0),
            ],
            &[(0, 1, 1), (1, 2, 1), (2, 3, 1), (3, 0, 1)],
            &[],
            &config,
        );
        assert_eq!(
            lines,
            vec![
                "                    % 1: C".to_string(),
                "               -[:0]% 2: C".to_string(),
                "              -[:90]% 3: C".to_string(),
                "             -[:180]% 4: C".to_string(),
                "                       (".to_string(),
                "                 -[:270]% -> 1: C".to_string(),
                "                       )".to_string(),
            ]
        );
    }

    #[test]
    fn aromatic_circle_rides_the_closure_bond() {
        let config = RenderConfig::builder().aromatic_circles(true).build().unwrap();
        let h = 3f64.sqrt() / 2.0;
        let bonds: Vec<(usize, usize, u8)> =
            (0..6).map(|i| (i, (i + 1) % 6, 1)).collect();
        let pairs: Vec<(usize, usize)> = (0..6).map(|i| (i, (i + 1) % 6)).collect();
        let lines = rendered(
            &[
                ("C", 1.0, 0.0),
                ("C", 0.5, h),
                ("C", -0.5, h),
                ("C", -1.0, 0.0),
                ("C", -0.5, -h),
                ("C", 0.5, -h),
            ],
            &bonds,
            &[(&pairs, true)],
            &config,
        );
        assert_eq!(
            lines,
            vec![
                "                    % 1: C".to_string(),
                "             -[:120]% 2: C".to_string(),
                "             -[:180]% 3: C".to_string(),
                "             -[:240]% 4: C".to_string(),
                "             -[:300]% 5: C".to_string(),
                "               -[:0]% 6: C".to_string(),
                "                       (".to_string(),
                "                  -[:60]% -> 1: C".to_string(),
                "    -[:180,,,,draw=none]\\mcfcringle{1.3}".to_string(),
                "                       )".to_string(),
            ]
        );
    }

    #[test]
    fn fancy_double_bonds_become_decorated_strokes() {
        let config = RenderConfig::builder().fancy_bonds(true).build().unwrap();
        let h = 3f64.sqrt() / 2.0;
        let lines = rendered(
            &[("C", 0.0, 0.0), ("C", 1.0, 0.0), ("C", 1.5, h)],
            &[(0, 1, 1), (1, 2, 2)],
            &[],
            &config,
        );
        assert_eq!(
            lines,
            vec![
                "                    % 1: C".to_string(),
                "               -[:0]% 2: C".to_string(),
                "-[:60,,,,mcfd=l:58:0]% 3: C".to_string(),
            ]
        );
    }

    #[test]
    fn relative_angles_follow_the_parent_bond() {
        let config = RenderConfig::builder().relative_angles(true).build().unwrap();
        let h = 3f64.sqrt() / 2.0;
        let lines = rendered(
            &[("C", 0.0, 0.0), ("C", 1.0, 0.0), ("C", 1.5, h)],
            &[(0, 1, 1), (1, 2, 1)],
            &[],
            &config,
        );
        assert_eq!(
            lines,
            vec![
                "                    % 1: C".to_string(),
                "               -[:0]% 2: C".to_string(),
                "             -[::60]% 3: C".to_string(),
            ]
        );
    }

    #[test]
    fn markers_silence_comments_but_keep_the_percent_sign() {
        let config = RenderConfig::builder().markers("m").build().unwrap();
        let lines = rendered(
            &[("C", 0.0, 0.0), ("C", 1.0, 0.0)],
            &[(0, 1, 1)],
            &[],
            &config,
        );
        assert_eq!(
            lines,
            vec![
                "                    @{m1}%".to_string(),
                "-[:0,,,,mcfm={m1-2}]@{m2}%".to_string(),
            ]
        );
    }
}
