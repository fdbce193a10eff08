use nalgebra::Point2;
use phf::phf_set;
use std::cmp::Ordering;

// Elements whose hydrogens read better on the left when the atom stands
// alone (water as HO-H, not OH-H). Bonded functional groups containing these
// elements are not affected.
static HYDROGEN_LEFTIES: phf::Set<&'static str> = phf_set! {
    "O", "S", "Se", "Te", "F", "Cl", "Br", "I", "At",
};

// Degrees that must remain clear around a placement slot before it starts
// accumulating penalty.
const QUADRANT_TURF: f64 = 80.0;
const CHARGE_TURF: f64 = 50.0;

/// Compass slot for placing an atom's hydrogens relative to its element
/// symbol.
///
/// Slots are tried in the order east, west, south, north; a slot only loses
/// its rank when attached bonds intrude into its reserved arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    /// Hydrogens appended after the element symbol.
    East,
    /// Hydrogens prepended before the element symbol.
    West,
    /// Hydrogens stacked below the element symbol.
    South,
    /// Hydrogens stacked above the element symbol.
    North,
}

impl Quadrant {
    // Priority order; ties between equally free slots resolve to the
    // earlier entry.
    const PLACEMENTS: [Quadrant; 4] = [
        Quadrant::East,
        Quadrant::West,
        Quadrant::South,
        Quadrant::North,
    ];

    pub(crate) fn angle(self) -> f64 {
        match self {
            Quadrant::East => 0.0,
            Quadrant::West => 180.0,
            Quadrant::South => 270.0,
            Quadrant::North => 90.0,
        }
    }
}

/// Anchor position for a charge that is drawn detached from an implicit
/// (label-less) atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargePosition {
    TopRight,
    TopLeft,
    TopCenter,
    BottomCenter,
    BottomRight,
    BottomLeft,
}

impl ChargePosition {
    const PLACEMENTS: [ChargePosition; 6] = [
        ChargePosition::TopRight,
        ChargePosition::TopLeft,
        ChargePosition::TopCenter,
        ChargePosition::BottomCenter,
        ChargePosition::BottomRight,
        ChargePosition::BottomLeft,
    ];

    pub(crate) fn angle(self) -> f64 {
        match self {
            ChargePosition::TopRight => 15.0,
            ChargePosition::TopLeft => 165.0,
            ChargePosition::TopCenter => 90.0,
            ChargePosition::BottomCenter => 270.0,
            ChargePosition::BottomRight => 345.0,
            ChargePosition::BottomLeft => 195.0,
        }
    }
}

/// An atom of the input structure, augmented with the layout state the
/// engine accumulates while it works.
///
/// Coordinates are the 2-D depiction coordinates produced by the upstream
/// toolkit, already mirrored according to the render configuration by the
/// time the engine sees them. `bond_angles` collects the direction of every
/// attached bond (and, later, of aromatic ring centers) as seen from this
/// atom; the label-placement scores are derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Zero-based toolkit index; stable across the whole pipeline.
    pub index: usize,
    /// Depiction coordinates after mirroring.
    pub position: Point2<f64>,
    /// Element symbol as written in the input (e.g. "C", "Cl").
    pub element: String,
    /// Implicit hydrogens folded into this atom's label.
    pub hydrogens: u8,
    /// Formal charge.
    pub charge: i32,
    /// Unpaired electron count.
    pub radical: u8,
    /// Indices of bonded atoms, in input bond order.
    pub neighbors: Vec<usize>,
    /// Directions of attached bonds in degrees, as seen from this atom.
    pub bond_angles: Vec<f64>,
    /// Preferred hydrogen placement, set by [`Atom::score_angles`].
    pub first_quadrant: Quadrant,
    /// Fallback placement, used for radical electrons.
    pub second_quadrant: Quadrant,
    /// Placement for a detached charge, set by [`Atom::score_angles`].
    pub charge_position: ChargePosition,
}

impl Atom {
    /// Creates an atom with empty layout state.
    pub fn new(index: usize, position: Point2<f64>, element: &str) -> Self {
        Self {
            index,
            position,
            element: element.to_string(),
            hydrogens: 0,
            charge: 0,
            radical: 0,
            neighbors: Vec::new(),
            bond_angles: Vec::new(),
            first_quadrant: Quadrant::East,
            second_quadrant: Quadrant::West,
            charge_position: ChargePosition::TopRight,
        }
    }

    /// Whether the element prefers its hydrogens on the left when solitary.
    pub fn prefers_hydrogens_left(&self) -> bool {
        HYDROGEN_LEFTIES.contains(self.element.as_str())
    }

    /// Scores the placement slots against the accumulated bond angles and
    /// stores the winners.
    ///
    /// Hydrogen placement and charge placement use separate slot sets and
    /// reserved arcs. A solitary atom skips the quadrant scoring entirely
    /// and falls back to the element's reading direction.
    pub fn score_angles(&mut self) {
        if self.bond_angles.is_empty() {
            if self.prefers_hydrogens_left() {
                self.first_quadrant = Quadrant::West;
                self.second_quadrant = Quadrant::East;
            } else {
                self.first_quadrant = Quadrant::East;
                self.second_quadrant = Quadrant::West;
            }
        } else {
            let ranked = rank_placements(
                &Quadrant::PLACEMENTS,
                |q| q.angle(),
                &self.bond_angles,
                QUADRANT_TURF,
            );
            self.first_quadrant = ranked[0];
            self.second_quadrant = ranked[1];
        }

        self.charge_position = rank_placements(
            &ChargePosition::PLACEMENTS,
            |p| p.angle(),
            &self.bond_angles,
            CHARGE_TURF,
        )[0];
    }
}

// Squared intrusion depth of a bond into a slot's reserved arc; zero when
// the bond stays clear of it.
fn slot_penalty(slot_angle: f64, bond_angle: f64, turf: f64) -> f64 {
    let diff = (slot_angle - bond_angle).rem_euclid(360.0);
    let separation = diff.min(360.0 - diff);
    (turf - separation).max(0.0).powi(2)
}

fn rank_placements<T: Copy>(
    slots: &[T],
    slot_angle: impl Fn(T) -> f64,
    bond_angles: &[f64],
    turf: f64,
) -> Vec<T> {
    let mut scored: Vec<(f64, T)> = slots
        .iter()
        .map(|&slot| {
            let score = bond_angles
                .iter()
                .map(|&bond_angle| slot_penalty(slot_angle(slot), bond_angle, turf))
                .sum();
            (score, slot)
        })
        .collect();
    // Stable sort keeps the priority order among equally scored slots.
    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(_, slot)| slot).collect()
}
