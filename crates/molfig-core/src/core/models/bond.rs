use super::atom::Atom;
use crate::core::geometry::{self, cot100};
use nalgebra::Point2;
use serde::Deserialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How a bond is drawn.
///
/// The first four kinds come from the input bond order, the wedge kinds from
/// stereo annotations. `Link` is an invisible pen move, `Decorated` a plain
/// stroke whose double or triple detail is carried in tikz styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BondKind {
    Single,
    Double,
    Triple,
    Aromatic,
    UpTo,
    DownTo,
    UpFrom,
    DownFrom,
    Either,
    Link,
    Decorated,
}

impl Default for BondKind {
    fn default() -> Self {
        BondKind::Single
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond kind string")]
pub struct ParseBondKindError;

impl FromStr for BondKind {
    type Err = ParseBondKindError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "single" => Ok(Self::Single),
            "2" | "double" => Ok(Self::Double),
            "3" | "triple" => Ok(Self::Triple),
            "4" | "aromatic" => Ok(Self::Aromatic),
            "upto" => Ok(Self::UpTo),
            "downto" => Ok(Self::DownTo),
            "upfrom" => Ok(Self::UpFrom),
            "downfrom" => Ok(Self::DownFrom),
            "either" => Ok(Self::Either),
            "link" => Ok(Self::Link),
            "decorated" => Ok(Self::Decorated),
            _ => Err(ParseBondKindError),
        }
    }
}

impl fmt::Display for BondKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Aromatic => "Aromatic",
                Self::UpTo => "UpTo",
                Self::DownTo => "DownTo",
                Self::UpFrom => "UpFrom",
                Self::DownFrom => "DownFrom",
                Self::Either => "Either",
                Self::Link => "Link",
                Self::Decorated => "Decorated",
            }
        )
    }
}

impl BondKind {
    /// Resolves an input bond order plus stereo annotation into a drawing
    /// kind. `mirrored` is true when exactly one coordinate axis is flipped,
    /// which turns wedges pointing up into wedges pointing down and vice
    /// versa. Returns `None` for an order outside 1 to 4.
    pub fn resolve(order: u8, stereo: InputStereo, mirrored: bool) -> Option<Self> {
        let stereo = match (stereo, mirrored) {
            (InputStereo::Up, true) => InputStereo::Down,
            (InputStereo::Down, true) => InputStereo::Up,
            (other, _) => other,
        };

        match stereo {
            // A wedge implies a single bond, whatever the order says.
            InputStereo::Up => Some(Self::UpTo),
            InputStereo::Down => Some(Self::DownTo),
            InputStereo::Either => Some(Self::Either),
            InputStereo::None | InputStereo::Cis | InputStereo::Trans => match order {
                1 => Some(Self::Single),
                2 => Some(Self::Double),
                3 => Some(Self::Triple),
                4 => Some(Self::Aromatic),
                _ => None,
            },
        }
    }
}

/// Stereo annotation as delivered by the upstream toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputStereo {
    #[default]
    None,
    Up,
    Down,
    Either,
    Cis,
    Trans,
}

/// Drawing orientation of a ring bond relative to its ring center.
///
/// Stays `Unknown` outside rings and inside rings that are replaced by an
/// aromatic circle; the ring annotation pass assigns it at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Winding {
    #[default]
    Unknown,
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Narrowest adjoining angles on either side of a bond, in whole degrees.
/// `None` on both sides when the atom has no other bonds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideAngles {
    pub left: Option<i32>,
    pub right: Option<i32>,
}

impl SideAngles {
    fn narrowest(&self) -> Option<i32> {
        self.left.into_iter().chain(self.right).min()
    }
}

/// Second-stroke parameters for a double bond drawn as two strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleDecoration {
    pub side: Side,
    pub trim_start: i32,
    pub trim_end: i32,
}

/// Stroke detail for a bond whose double or triple nature is drawn as
/// decoration on a plain stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
    Double(DoubleDecoration),
    Triple { trim_start: i32, trim_end: i32 },
}

/// A directed view of a bond, ready to be drawn from `start` to `end`.
///
/// The forward view keeps the raw geometric angle, which may be negative;
/// the reverse view produced by [`Bond::inverted`] is wrapped into
/// `[0, 360)` and swaps wedge directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bond {
    pub start: usize,
    pub end: usize,
    pub kind: BondKind,
    pub length: f64,
    pub angle: f64,
    pub winding: Winding,
}

impl Bond {
    /// The same bond traversed the other way round.
    pub fn inverted(&self) -> Self {
        let kind = match self.kind {
            BondKind::UpTo => BondKind::UpFrom,
            BondKind::UpFrom => BondKind::UpTo,
            BondKind::DownTo => BondKind::DownFrom,
            BondKind::DownFrom => BondKind::DownTo,
            other => other,
        };
        Self {
            start: self.end,
            end: self.start,
            kind,
            length: self.length,
            angle: geometry::normalize_degrees(self.angle + 180.0),
            winding: self.winding,
        }
    }

    // Narrowest angles to either side of this bond at `atom`, measured
    // counter-clockwise from the bond direction (shifted by `inversion` when
    // looking back from the end atom). The bond's own angle is removed from
    // the atom's list before measuring.
    fn adjoining_angles(&self, atom: &Atom, inversion: f64) -> (Option<i32>, Option<i32>) {
        let mut raw: Vec<i32> = atom
            .bond_angles
            .iter()
            .map(|a| (a.round() as i32).rem_euclid(360))
            .collect();

        let reference = ((self.angle - inversion).round() as i32).rem_euclid(360);
        if let Some(pos) = raw.iter().position(|&a| a == reference) {
            raw.remove(pos);
        }

        if raw.is_empty() {
            return (None, None);
        }

        let mut offsets: Vec<i32> = raw
            .into_iter()
            .map(|a| (a - reference).rem_euclid(360))
            .collect();
        offsets.sort_unstable();

        (Some(offsets[0]), Some(offsets[offsets.len() - 1]))
    }

    /// Narrowest angles left and right of the bond at its start atom.
    pub fn upstream_angles(&self, start_atom: &Atom) -> SideAngles {
        let (first, last) = self.adjoining_angles(start_atom, 0.0);
        SideAngles {
            left: first,
            right: last.map(|l| 360 - l),
        }
    }

    /// Narrowest angles left and right of the bond at its end atom.
    pub fn downstream_angles(&self, end_atom: &Atom) -> SideAngles {
        let (first, last) = self.adjoining_angles(end_atom, 180.0);
        SideAngles {
            left: last.map(|l| 360 - l),
            right: first,
        }
    }

    /// Background gaps for a bond drawn crossing over another, one per end.
    /// The gap widens with the sharpness of the narrowest adjoining angle
    /// and never drops under the floor of 10.
    pub fn cross_gaps(&self, start_atom: &Atom, end_atom: &Atom) -> (i32, i32) {
        let gap = |angles: SideAngles| -> i32 {
            match angles.narrowest() {
                Some(narrowest) => cot100(f64::from(narrowest)).max(10),
                None => 10,
            }
        };
        (
            gap(self.upstream_angles(start_atom)),
            gap(self.downstream_angles(end_atom)),
        )
    }

    /// Decides the side and stroke trims for the second stroke of a double
    /// bond, or `None` when a plain symmetric double bond looks better.
    ///
    /// Inside a ring the assigned winding forces the second stroke to the
    /// inner side. Outside rings, a double bond touching explicitly drawn
    /// atoms stays plain unless the angles at the implicit end are extreme;
    /// otherwise the side with the milder adjoining angles wins.
    pub fn fancy_double(
        &self,
        start_atom: &Atom,
        end_atom: &Atom,
        start_explicit: bool,
        end_explicit: bool,
    ) -> Option<DoubleDecoration> {
        let start_angles = self.upstream_angles(start_atom);
        let end_angles = self.downstream_angles(end_atom);

        if self.winding == Winding::Unknown && (start_explicit || end_explicit) {
            if start_explicit && end_explicit {
                return None;
            }
            if start_explicit && flat_junction(&end_angles) {
                return None;
            }
            if end_explicit && flat_junction(&start_angles) {
                return None;
            }
        }

        let side = match self.winding {
            Winding::CounterClockwise => Side::Left,
            Winding::Clockwise => Side::Right,
            Winding::Unknown => {
                let left = angle_penalty(start_angles.left) + angle_penalty(end_angles.left);
                let right = angle_penalty(start_angles.right) + angle_penalty(end_angles.right);
                match left.cmp(&right) {
                    Ordering::Less => Side::Left,
                    Ordering::Greater => Side::Right,
                    // Equal penalties; pick sides by bond direction so that
                    // parallel bonds come out consistent.
                    Ordering::Equal => {
                        if (self.angle - 44.5).abs() < 90.0 {
                            Side::Left
                        } else {
                            Side::Right
                        }
                    }
                }
            }
        };

        let trim = |angles: SideAngles, explicit: bool| -> i32 {
            if explicit {
                return 0;
            }
            match side {
                Side::Left => shorten_stroke(angles.left, angles.right),
                Side::Right => shorten_stroke(angles.right, angles.left),
            }
        };

        Some(DoubleDecoration {
            side,
            trim_start: trim(start_angles, start_explicit),
            trim_end: trim(end_angles, end_explicit),
        })
    }

    /// Stroke trims for the outer strokes of a triple bond. No side to
    /// choose here, both outer strokes shorten symmetrically.
    pub fn fancy_triple(
        &self,
        start_atom: &Atom,
        end_atom: &Atom,
        start_explicit: bool,
        end_explicit: bool,
    ) -> (i32, i32) {
        let trim = |angles: SideAngles, explicit: bool| -> i32 {
            if explicit {
                return 0;
            }
            match angles.narrowest() {
                Some(narrowest) => cot100(0.5 * f64::from(narrowest)),
                None => 0,
            }
        };
        (
            trim(self.upstream_angles(start_atom), start_explicit),
            trim(self.downstream_angles(end_atom), end_explicit),
        )
    }

    /// Orientation of this bond relative to a ring center. The center is
    /// sighted from the end atom; coordinates are unrotated, so the global
    /// rotation already folded into the bond angle is added back in.
    pub fn winding_around(
        &self,
        end_position: &Point2<f64>,
        center: &Point2<f64>,
        rotate: f64,
    ) -> Winding {
        let (_, center_angle) = geometry::distance_and_angle(end_position, center);
        let kink = (center_angle + rotate - self.angle).rem_euclid(360.0);
        if kink > 180.0 {
            Winding::Clockwise
        } else {
            Winding::CounterClockwise
        }
    }
}

fn angle_penalty(angle: Option<i32>) -> i32 {
    angle.map_or(0, |a| (a - 105).pow(2))
}

// Both adjoining angles at an explicit atom absent, or both so close to
// perpendicular that an offset second stroke would look lopsided.
fn flat_junction(angles: &SideAngles) -> bool {
    match (angles.left, angles.right) {
        (None, _) => true,
        (Some(left), Some(right)) => {
            (90..=135).contains(&left.abs()) && (90..=135).contains(&right.abs())
        }
        (Some(_), None) => false,
    }
}

// Trim for the second stroke of a double bond, on the side whose adjoining
// angle is `same`. Reflex angles borrow the opposite side's angle when that
// one sits in the usable window.
fn shorten_stroke(same: Option<i32>, other: Option<i32>) -> i32 {
    let Some(same) = same else { return 0 };
    let other = other.unwrap_or(0);

    let angle = if same <= 180 {
        0.5 * f64::from(same)
    } else if 210 < same && same < 270 {
        f64::from(same - 180)
    } else if 210 < other && other < 270 {
        f64::from(other - 180)
    } else {
        90.0
    };

    cot100(angle)
}
