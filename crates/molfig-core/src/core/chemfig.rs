//! Formatting of the chemfig drawing language.
//!
//! Everything the output language looks like lives here: bond tokens,
//! bracket arguments, atom labels with hydrogen and charge placement, and
//! the comments that annotate each drawn line. The `mcf*` tikz styles and
//! `\mcf*` macros referenced in the output are defined by the accompanying
//! TeX support package.

use super::geometry::normalize_degrees;
use super::models::atom::{Atom, Quadrant};
use super::models::bond::{BondKind, Decoration, Side};

/// Column width that bond codes are right-justified into, so that atom
/// labels and branch brackets line up down an indented block.
pub const BOND_CODE_WIDTH: usize = 20;

/// A fully formatted atom label with its bond attachment points.
///
/// Labels are composed once per atom and reused for every bond that touches
/// the atom, including ring-closure phantoms.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AtomLabel {
    /// Complete label code, marker prefix included. Empty for a bare vertex.
    pub code: String,
    /// Attachment position of the element group within `code`, or empty
    /// when chemfig's defaults already hit the element.
    pub attach: String,
    /// Space-reserving stand-in used when a closure bond ends on an atom
    /// that is already drawn.
    pub phantom: String,
    /// Attachment position within `phantom`.
    pub phantom_attach: String,
    /// Whether the label puts visible characters at the vertex. Explicit
    /// atoms keep plain double bonds and suppress stroke trimming.
    pub explicit: bool,
    /// Per-line comment. A single space forces a bare `%` line ending,
    /// which keeps TeX from gluing a marker to the next token.
    pub comment: String,
    /// Comment used on the line of a closure bond pointing back here.
    pub closure_comment: String,
}

/// All inputs needed to format one bond code.
#[derive(Debug, Clone, PartialEq)]
pub struct BondCode<'a> {
    pub kind: BondKind,
    pub angle: f64,
    pub parent_angle: Option<f64>,
    pub length: f64,
    pub start_attach: &'a str,
    pub end_attach: &'a str,
    pub cross_gaps: Option<(i32, i32)>,
    pub decoration: Option<Decoration>,
    pub marker: Option<&'a str>,
}

/// Formats a number with at most `decimals` places, dropping trailing
/// zeros and a dangling point.
pub fn format_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn hydrogen_group(hydrogens: u8) -> String {
    match hydrogens {
        0 => String::new(),
        1 => "H".to_string(),
        2..=9 => format!("H_{hydrogens}"),
        _ => format!("H_{{{hydrogens}}}"),
    }
}

fn charge_label(charge: i32) -> String {
    match charge {
        0 => String::new(),
        1 => "+".to_string(),
        -1 => "-".to_string(),
        c if c > 1 => format!("{c}+"),
        c => format!("{}-", -c),
    }
}

// Element symbol plus its hydrogens, arranged by quadrant. Returns the
// label and the element group's attachment position.
fn element_with_hydrogens(element: &str, hydrogens: u8, quadrant: Quadrant) -> (String, String) {
    if hydrogens == 0 {
        return (element.to_string(), String::new());
    }

    let group = hydrogen_group(hydrogens);
    match quadrant {
        Quadrant::East => (format!("{element}{group}"), "1".to_string()),
        Quadrant::West => (format!("{group}{element}"), "2".to_string()),
        Quadrant::North => (format!("\\mcfabove{{{element}}}{{{group}}}"), String::new()),
        Quadrant::South => (format!("\\mcfbelow{{{element}}}{{{group}}}"), String::new()),
    }
}

/// Composes the label for one atom.
///
/// A bonded carbon without charge or radical stays a bare vertex. Bonded
/// carbons carrying a charge keep their vertex and float the charge at the
/// scored position instead of spelling out the element; a radical without a
/// charge floats its dot at the fallback hydrogen quadrant.
pub fn format_atom(atom: &Atom, atom_numbers: bool, marker_prefix: Option<&str>) -> AtomLabel {
    let bonded = !atom.bond_angles.is_empty();
    let index1 = atom.index + 1;

    let mut superscript = charge_label(atom.charge);
    for _ in 0..atom.radical {
        superscript.push_str("\\cdot");
    }

    let (mut code, attach, phantom) = if atom.element == "C" && bonded {
        if superscript.is_empty() {
            (String::new(), String::new(), String::new())
        } else {
            let angle = if atom.charge == 0 {
                atom.second_quadrant.angle() as i32
            } else {
                atom.charge_position.angle() as i32
            };
            (
                format!("\\mcfcharge{{{angle}}}{{{superscript}}}"),
                String::new(),
                String::new(),
            )
        }
    } else {
        let (label, attach) = element_with_hydrogens(&atom.element, atom.hydrogens, atom.first_quadrant);
        let phantom = format!("\\phantom{{{label}}}");
        let mut code = label;
        if !superscript.is_empty() {
            code.push_str(&format!("^{{{superscript}}}"));
        }
        (code, attach, phantom)
    };

    if atom_numbers {
        code.push_str(&format!("\\mcfatomno{{{index1}}}"));
    }

    let explicit = code
        .chars()
        .any(|c| c.is_ascii_uppercase() || c.is_ascii_digit());

    let summary = atom_summary(&atom.element, atom.hydrogens, atom.charge);
    let marker_code = marker_prefix
        .map(|prefix| format!("@{{{prefix}{index1}}}"))
        .unwrap_or_default();
    let comment = if marker_code.is_empty() {
        format!("{index1}: {summary}")
    } else {
        " ".to_string()
    };

    AtomLabel {
        code: format!("{marker_code}{code}"),
        phantom_attach: attach.clone(),
        attach,
        phantom,
        explicit,
        comment,
        closure_comment: format!("-> {index1}: {summary}"),
    }
}

fn atom_summary(element: &str, hydrogens: u8, charge: i32) -> String {
    let mut summary = element.to_string();
    match hydrogens {
        0 => {}
        1 => summary.push('H'),
        n => summary.push_str(&format!("H{n}")),
    }
    if charge != 0 {
        summary.push_str(&format!(" ({})", charge_label(charge)));
    }
    summary
}

/// Marker name shared by both rendered copies of a bond, built from the
/// sorted one-based atom indices.
pub fn bond_marker(prefix: &str, a: usize, b: usize) -> String {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("{}{}-{}", prefix, low + 1, high + 1)
}

fn bond_token(kind: BondKind) -> &'static str {
    match kind {
        BondKind::Single | BondKind::Aromatic => "-",
        BondKind::Double => "=",
        BondKind::Triple => "~",
        BondKind::UpTo => "<",
        BondKind::DownTo => "<:",
        BondKind::UpFrom => ">",
        BondKind::DownFrom => ">:",
        BondKind::Either | BondKind::Link | BondKind::Decorated => "-",
    }
}

fn angle_slot(angle: f64, parent_angle: Option<f64>, relative_angles: bool) -> String {
    match parent_angle {
        Some(parent) if relative_angles => {
            let mut delta = normalize_degrees(angle - parent);
            if delta > 180.0 {
                delta -= 360.0;
            }
            format!("::{}", format_number(delta, 1))
        }
        _ => format!(":{}", format_number(normalize_degrees(angle), 1)),
    }
}

// Bracket arguments are positional; trailing empty slots are dropped and an
// all-empty bracket disappears.
fn bracket(slots: [String; 5]) -> String {
    match slots.iter().rposition(|slot| !slot.is_empty()) {
        None => String::new(),
        Some(last) => format!("[{}]", slots[..=last].join(",")),
    }
}

/// Formats a bond token with its bracket arguments.
pub fn format_bond(code: &BondCode<'_>, relative_angles: bool, round: usize) -> String {
    let mut tikz: Vec<String> = Vec::new();
    match code.kind {
        BondKind::Either => tikz.push("mcfw".to_string()),
        BondKind::Link => tikz.push("draw=none".to_string()),
        _ => {}
    }
    if let Some(decoration) = code.decoration {
        match decoration {
            Decoration::Double(double) => {
                let side = match double.side {
                    Side::Left => 'l',
                    Side::Right => 'r',
                };
                tikz.push(format!(
                    "mcfd={side}:{}:{}",
                    double.trim_start, double.trim_end
                ));
            }
            Decoration::Triple {
                trim_start,
                trim_end,
            } => tikz.push(format!("mcft={trim_start}:{trim_end}")),
        }
    }
    if let Some((bg_start, bg_end)) = code.cross_gaps {
        tikz.push(format!("mcfx={bg_start}:{bg_end}"));
    }
    if let Some(marker) = code.marker {
        tikz.push(format!("mcfm={{{marker}}}"));
    }

    let length = {
        let formatted = format_number(code.length, round);
        if formatted == "1" {
            String::new()
        } else {
            formatted
        }
    };

    let slots = [
        angle_slot(code.angle, code.parent_angle, relative_angles),
        length,
        code.start_attach.to_string(),
        code.end_attach.to_string(),
        tikz.join(","),
    ];

    format!("{}{}", bond_token(code.kind), bracket(slots))
}

/// Formats the invisible spoke and circle that replace the inner bonds of
/// an aromatic ring. Returns the spoke's bond code and the circle macro
/// separately so the caller can align them like a bond and its atom.
pub fn format_ring_circle(
    angle: f64,
    parent_angle: Option<f64>,
    length: f64,
    radius: f64,
    relative_angles: bool,
) -> (String, String) {
    let spoke = BondCode {
        kind: BondKind::Link,
        angle,
        parent_angle,
        length,
        start_attach: "",
        end_attach: "",
        cross_gaps: None,
        decoration: None,
        marker: None,
    };
    (
        format_bond(&spoke, relative_angles, 2),
        format!("\\mcfcringle{{{}}}", format_number(radius, 2)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::ChargePosition;
    use crate::core::models::bond::DoubleDecoration;
    use nalgebra::Point2;

    fn carbon(bonded: bool) -> Atom {
        let mut atom = Atom::new(2, Point2::new(0.0, 0.0), "C");
        if bonded {
            atom.bond_angles = vec![0.0];
        }
        atom
    }

    #[test]
    fn numbers_drop_trailing_zeros() {
        assert_eq!(format_number(1.50, 2), "1.5");
        assert_eq!(format_number(2.0, 1), "2");
        assert_eq!(format_number(0.333_333, 3), "0.333");
        assert_eq!(format_number(-0.04, 1), "0");
        assert_eq!(format_number(-45.0, 1), "-45");
    }

    #[test]
    fn bonded_carbon_is_a_bare_vertex() {
        let label = format_atom(&carbon(true), false, None);
        assert_eq!(label.code, "");
        assert_eq!(label.attach, "");
        assert_eq!(label.phantom, "");
        assert!(!label.explicit);
        assert_eq!(label.comment, "3: C");
    }

    #[test]
    fn solitary_carbon_spells_itself_out() {
        let mut atom = carbon(false);
        atom.hydrogens = 4;
        let label = format_atom(&atom, false, None);
        assert_eq!(label.code, "CH_4");
        assert_eq!(label.attach, "1");
        assert!(label.explicit);
    }

    #[test]
    fn east_hydrogens_follow_the_element() {
        let mut atom = Atom::new(0, Point2::new(0.0, 0.0), "O");
        atom.bond_angles = vec![180.0];
        atom.hydrogens = 1;
        atom.first_quadrant = Quadrant::East;
        let label = format_atom(&atom, false, None);
        assert_eq!(label.code, "OH");
        assert_eq!(label.attach, "1");
        assert_eq!(label.phantom, "\\phantom{OH}");
        assert_eq!(label.phantom_attach, "1");
    }

    #[test]
    fn west_hydrogens_precede_the_element() {
        let mut atom = Atom::new(4, Point2::new(0.0, 0.0), "N");
        atom.bond_angles = vec![0.0];
        atom.hydrogens = 2;
        atom.first_quadrant = Quadrant::West;
        let label = format_atom(&atom, false, None);
        assert_eq!(label.code, "H_2N");
        assert_eq!(label.attach, "2");
        assert_eq!(label.comment, "5: NH2");
    }

    #[test]
    fn stacked_hydrogens_use_a_single_group() {
        let mut atom = Atom::new(0, Point2::new(0.0, 0.0), "N");
        atom.bond_angles = vec![0.0, 180.0];
        atom.hydrogens = 1;
        atom.first_quadrant = Quadrant::North;
        let label = format_atom(&atom, false, None);
        assert_eq!(label.code, "\\mcfabove{N}{H}");
        assert_eq!(label.attach, "");
    }

    #[test]
    fn charges_ride_as_superscripts_on_explicit_atoms() {
        let mut atom = Atom::new(0, Point2::new(0.0, 0.0), "O");
        atom.bond_angles = vec![180.0];
        atom.charge = -1;
        let label = format_atom(&atom, false, None);
        assert_eq!(label.code, "O^{-}");
        assert_eq!(label.comment, "1: O (-)");
    }

    #[test]
    fn charged_vertex_carbon_floats_its_charge() {
        let mut atom = carbon(true);
        atom.charge = 1;
        atom.charge_position = ChargePosition::TopLeft;
        let label = format_atom(&atom, false, None);
        assert_eq!(label.code, "\\mcfcharge{165}{+}");
        assert_eq!(label.phantom, "");
        assert!(label.explicit);
    }

    #[test]
    fn uncharged_radical_vertex_floats_its_dot_at_the_fallback_quadrant() {
        let mut atom = carbon(true);
        atom.bond_angles = vec![0.0, 60.0];
        atom.radical = 1;
        atom.score_angles();
        assert_eq!(atom.second_quadrant, Quadrant::South);

        let label = format_atom(&atom, false, None);
        assert_eq!(label.code, "\\mcfcharge{270}{\\cdot}");
        assert!(label.explicit);
    }

    #[test]
    fn charged_radical_vertex_stays_at_the_charge_position() {
        let mut atom = carbon(true);
        atom.charge = 1;
        atom.radical = 1;
        atom.charge_position = ChargePosition::TopLeft;
        let label = format_atom(&atom, false, None);
        assert_eq!(label.code, "\\mcfcharge{165}{+\\cdot}");
    }

    #[test]
    fn radical_dots_join_the_superscript() {
        let mut atom = Atom::new(0, Point2::new(0.0, 0.0), "N");
        atom.bond_angles = vec![180.0];
        atom.charge = 1;
        atom.radical = 1;
        let label = format_atom(&atom, false, None);
        assert_eq!(label.code, "N^{+\\cdot}");
    }

    #[test]
    fn atom_numbers_attach_to_every_vertex() {
        let label = format_atom(&carbon(true), true, None);
        assert_eq!(label.code, "\\mcfatomno{3}");
        assert!(label.explicit);
    }

    #[test]
    fn markers_prefix_the_label_and_blank_the_comment() {
        let mut atom = Atom::new(0, Point2::new(0.0, 0.0), "O");
        atom.bond_angles = vec![180.0];
        let label = format_atom(&atom, false, Some("m"));
        assert_eq!(label.code, "@{m1}O");
        assert_eq!(label.comment, " ");
    }

    #[test]
    fn double_digit_charges_and_hydrogens_format_cleanly() {
        assert_eq!(charge_label(2), "2+");
        assert_eq!(charge_label(-3), "3-");
        assert_eq!(hydrogen_group(12), "H_{12}");
    }

    #[test]
    fn bond_markers_sort_their_atom_indices() {
        assert_eq!(bond_marker("m", 4, 1), "m2-5");
        assert_eq!(bond_marker("x", 0, 3), "x1-4");
    }

    fn plain_bond(kind: BondKind, angle: f64) -> BondCode<'static> {
        BondCode {
            kind,
            angle,
            parent_angle: None,
            length: 1.0,
            start_attach: "",
            end_attach: "",
            cross_gaps: None,
            decoration: None,
            marker: None,
        }
    }

    #[test]
    fn plain_bonds_keep_only_the_angle_slot() {
        assert_eq!(format_bond(&plain_bond(BondKind::Single, 30.0), false, 3), "-[:30]");
        assert_eq!(format_bond(&plain_bond(BondKind::Double, 90.0), false, 3), "=[:90]");
        assert_eq!(format_bond(&plain_bond(BondKind::Triple, 0.0), false, 3), "~[:0]");
    }

    #[test]
    fn wedge_tokens_encode_their_direction() {
        assert_eq!(format_bond(&plain_bond(BondKind::UpTo, 0.0), false, 3), "<[:0]");
        assert_eq!(format_bond(&plain_bond(BondKind::DownTo, 0.0), false, 3), "<:[:0]");
        assert_eq!(format_bond(&plain_bond(BondKind::UpFrom, 0.0), false, 3), ">[:0]");
        assert_eq!(format_bond(&plain_bond(BondKind::DownFrom, 0.0), false, 3), ">:[:0]");
    }

    #[test]
    fn negative_raw_angles_wrap_for_display() {
        assert_eq!(format_bond(&plain_bond(BondKind::Single, -45.0), false, 3), "-[:315]");
    }

    #[test]
    fn link_bonds_draw_nothing() {
        let mut code = plain_bond(BondKind::Link, 90.0);
        code.length = 1.0;
        assert_eq!(format_bond(&code, false, 3), "-[:90,,,,draw=none]");
    }

    #[test]
    fn either_bonds_squiggle() {
        assert_eq!(
            format_bond(&plain_bond(BondKind::Either, 0.0), false, 3),
            "-[:0,,,,mcfw]"
        );
    }

    #[test]
    fn lengths_other_than_one_are_written_out() {
        let mut code = plain_bond(BondKind::Single, 0.0);
        code.length = 1.5;
        assert_eq!(format_bond(&code, false, 3), "-[:0,1.5]");
    }

    #[test]
    fn attachment_positions_fill_the_middle_slots() {
        let mut code = plain_bond(BondKind::Single, 0.0);
        code.start_attach = "2";
        code.end_attach = "1";
        assert_eq!(format_bond(&code, false, 3), "-[:0,,2,1]");
    }

    #[test]
    fn decorated_double_bonds_carry_side_and_trims() {
        let mut code = plain_bond(BondKind::Decorated, 30.0);
        code.decoration = Some(Decoration::Double(DoubleDecoration {
            side: Side::Left,
            trim_start: 58,
            trim_end: 173,
        }));
        assert_eq!(format_bond(&code, false, 3), "-[:30,,,,mcfd=l:58:173]");
    }

    #[test]
    fn decorated_triple_bonds_carry_symmetric_trims() {
        let mut code = plain_bond(BondKind::Decorated, 0.0);
        code.decoration = Some(Decoration::Triple {
            trim_start: 100,
            trim_end: 100,
        });
        assert_eq!(format_bond(&code, false, 3), "-[:0,,,,mcft=100:100]");
    }

    #[test]
    fn cross_bonds_keep_their_token_and_add_gaps() {
        let mut code = plain_bond(BondKind::Double, 0.0);
        code.cross_gaps = Some((10, 12));
        assert_eq!(format_bond(&code, false, 3), "=[:0,,,,mcfx=10:12]");
    }

    #[test]
    fn markers_land_in_the_tikz_slot() {
        let mut code = plain_bond(BondKind::Single, 0.0);
        code.marker = Some("m1-2");
        assert_eq!(format_bond(&code, false, 3), "-[:0,,,,mcfm={m1-2}]");
    }

    #[test]
    fn relative_angles_subtract_the_parent_direction() {
        let mut code = plain_bond(BondKind::Single, 90.0);
        code.parent_angle = Some(30.0);
        assert_eq!(format_bond(&code, true, 3), "-[::60]");

        code.angle = 350.0;
        assert_eq!(format_bond(&code, true, 3), "-[::-40]");
    }

    #[test]
    fn relative_mode_without_a_parent_stays_absolute() {
        let code = plain_bond(BondKind::Single, 90.0);
        assert_eq!(format_bond(&code, true, 3), "-[:90]");
    }

    #[test]
    fn ring_circles_ride_an_invisible_spoke() {
        let (spoke, circle) = format_ring_circle(30.0, None, 1.0, 0.87, false);
        assert_eq!(spoke, "-[:30,,,,draw=none]");
        assert_eq!(circle, "\\mcfcringle{0.87}");

        let (spoke, circle) = format_ring_circle(270.0, None, 1.25, 1.11, false);
        assert_eq!(spoke, "-[:270,1.25,,,draw=none]");
        assert_eq!(circle, "\\mcfcringle{1.11}");
    }
}
