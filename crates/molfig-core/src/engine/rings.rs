//! Ring annotation.
//!
//! Double bonds inside a ring must draw their second stroke toward the
//! ring interior, and a sufficiently regular aromatic ring can drop its
//! inner strokes for a circle. Aromatic rings are processed before plain
//! ones so that a bond shared between fused rings orients toward the
//! aromatic neighbor.

use nalgebra::Point2;

use super::config::RenderConfig;
use super::error::LayoutError;
use super::state::LayoutState;
use super::tree::{LayoutTree, Node, NodeId, NodePayload};
use crate::core::geometry::distance_and_angle;
use crate::core::models::bond::{BondKind, Winding};
use crate::core::models::molecule::Ring;

/// Largest relative spread of bond lengths and center distances a ring may
/// have and still count as a regular polygon.
const SYMMETRY_TOLERANCE: f64 = 0.05;

/// Rings with more bonds than this are left untouched.
const MAX_RING_SIZE: usize = 8;

/// Ratio of circle radius to ring apothem, matching chemfig's built-in
/// ring size.
const CIRCLE_SCALE: f64 = 1.5;

/// Annotates every ring of the molecule, either assigning bond windings or
/// replacing the ring interior with an aromatic circle.
///
/// Call after bond scaling; circle geometry derives from the scale factor
/// recorded on the tree.
pub fn annotate_rings(
    tree: &mut LayoutTree,
    state: &mut LayoutState,
    rings: &[Ring],
    config: &RenderConfig,
) -> Result<(), LayoutError> {
    let mut ordered: Vec<&Ring> = rings.iter().collect();
    ordered.sort_by_key(|ring| ring.aromatic);
    for ring in ordered.iter().rev() {
        annotate_ring(tree, state, ring, config)?;
    }
    Ok(())
}

fn annotate_ring(
    tree: &mut LayoutTree,
    state: &mut LayoutState,
    ring: &Ring,
    config: &RenderConfig,
) -> Result<(), LayoutError> {
    if ring.pairs.is_empty() || ring.pairs.len() > MAX_RING_SIZE {
        return Ok(());
    }

    let mut node_ids = Vec::with_capacity(ring.pairs.len());
    let mut bond_lengths = Vec::with_capacity(ring.pairs.len());
    let mut members: Vec<usize> = Vec::new();
    for &(a, b) in &ring.pairs {
        let id = tree.node_for_pair(a, b).ok_or_else(|| {
            LayoutError::Internal(format!("ring bond {a}-{b} is missing from the tree"))
        })?;
        node_ids.push(id);
        if let NodePayload::Bond(data) = &tree.nodes[id].payload {
            bond_lengths.push(data.bond.length);
        }
        for atom in [a, b] {
            if !members.contains(&atom) {
                members.push(atom);
            }
        }
    }

    let count = members.len() as f64;
    let (sum_x, sum_y) = members.iter().fold((0.0, 0.0), |(x, y), &index| {
        let position = &state.atoms[index].position;
        (x + position.x, y + position.y)
    });
    let center = Point2::new(sum_x / count, sum_y / count);

    let mut center_distances = Vec::with_capacity(members.len());
    let mut center_angles = Vec::with_capacity(members.len());
    for &index in &members {
        let (distance, angle) = distance_and_angle(&state.atoms[index].position, &center);
        center_distances.push(distance);
        center_angles.push(angle);
    }

    let symmetric = spread(&bond_lengths) <= SYMMETRY_TOLERANCE
        && spread(&center_distances) <= SYMMETRY_TOLERANCE;

    if ring.aromatic && symmetric && config.aromatic_circles {
        aromatize_ring(tree, state, &node_ids, &center, config)?;
        // The circle occupies the directions toward the ring interior, so
        // hydrogens and charges on ring atoms settle outward.
        for (&index, &angle) in members.iter().zip(&center_angles) {
            state.atoms[index].bond_angles.push(angle);
        }
    } else {
        for &id in &node_ids {
            let bond = match &tree.nodes[id].payload {
                NodePayload::Bond(data) => data.bond,
                _ => continue,
            };
            // A bond shared between fused rings keeps the winding of the
            // ring that claimed it first.
            if bond.winding != Winding::Unknown {
                continue;
            }
            let winding =
                bond.winding_around(&state.atoms[bond.end].position, &center, config.rotate);
            if let NodePayload::Bond(data) = &mut tree.nodes[id].payload {
                data.bond.winding = winding;
            }
        }
    }
    Ok(())
}

// Retypes all ring bonds as aromatic and hangs the circle off the last
// ring bond's node as an invisible spoke from its end atom to the center.
fn aromatize_ring(
    tree: &mut LayoutTree,
    state: &LayoutState,
    node_ids: &[NodeId],
    center: &Point2<f64>,
    config: &RenderConfig,
) -> Result<(), LayoutError> {
    for &id in node_ids {
        if let NodePayload::Bond(data) = &mut tree.nodes[id].payload {
            data.bond.kind = BondKind::Aromatic;
        }
    }

    let anchor = *node_ids
        .last()
        .ok_or_else(|| LayoutError::Internal("aromatized ring has no bonds".to_string()))?;
    let end_atom = match &tree.nodes[anchor].payload {
        NodePayload::Bond(data) => data.bond.end,
        _ => {
            return Err(LayoutError::Internal(
                "ring anchor is not a bond".to_string(),
            ));
        }
    };

    let (outer, raw_angle) = distance_and_angle(&state.atoms[end_atom].position, center);
    // The spoke angle follows the rotated drawing; the radius follows the
    // scaled bond lengths.
    let angle = round_to(raw_angle + config.rotate, 1).rem_euclid(360.0);
    let outer_scaled = outer * tree.scale_factor;
    let sides = node_ids.len() as f64;
    let apothem = (std::f64::consts::FRAC_PI_2 - std::f64::consts::PI / sides).sin() * outer_scaled;

    let circle_id = tree.nodes.insert(Node {
        payload: NodePayload::RingCircle {
            angle,
            length: round_to(outer_scaled, 2),
            radius: round_to(CIRCLE_SCALE * apothem, 2),
        },
        parent: Some(anchor),
        children: Vec::new(),
    });
    tree.nodes[anchor].children.push(circle_id);
    Ok(())
}

fn spread(values: &[f64]) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &value in values {
        min = min.min(value);
        max = max.max(value);
    }
    (max - min) / max
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
