use tracing::{debug, info, instrument};

use crate::core::chemfig::{self, AtomLabel};
use crate::core::models::molecule::Molecule;
use crate::engine::config::RenderConfig;
use crate::engine::error::LayoutError;
use crate::engine::fragments::connect_fragments;
use crate::engine::render::Renderer;
use crate::engine::rings::annotate_rings;
use crate::engine::state::LayoutState;
use crate::engine::tree::LayoutTree;

/// The finished chemfig drawing of one molecule.
#[derive(Debug, Clone)]
pub struct RenderedMolecule {
    /// Drawing lines, one tree node or bracket per line.
    pub lines: Vec<String>,
    /// Horizontal extent in drawing units (multiples of the standard bond
    /// length).
    pub width: f64,
    /// Vertical extent in drawing units.
    pub height: f64,
}

impl RenderedMolecule {
    /// The drawing as one newline-joined block.
    pub fn code(&self) -> String {
        self.lines.join("\n")
    }
}

/// Lays out and renders a molecule according to the configuration.
#[instrument(skip_all, name = "render_workflow")]
pub fn run(molecule: &Molecule, config: &RenderConfig) -> Result<RenderedMolecule, LayoutError> {
    config.validate()?;
    info!(
        atoms = molecule.atoms.len(),
        bonds = molecule.bonds.len(),
        "Starting molecule layout."
    );

    // === Phase 1: Geometry and connectivity ===
    let mut state = LayoutState::new(molecule, config)?;
    connect_fragments(&mut state);

    // === Phase 2: Drawing order ===
    let mut tree = LayoutTree::build(&state, config)?;

    // === Phase 3: Tree reworking ===
    // A single atom has no bonds to rework; the tree is just its root.
    if state.atoms.len() > 1 {
        tree.process_cross_bonds(&state, config)?;
        tree.scale_bonds(config);
        annotate_rings(&mut tree, &mut state, &molecule.rings, config)?;
    }
    debug!(
        entry = tree.entry_atom + 1,
        exit = tree.exit_atom + 1,
        scale = tree.scale_factor,
        "Drawing order settled."
    );

    // === Phase 4: Label placement ===
    for atom in &mut state.atoms {
        atom.score_angles();
    }
    let labels: Vec<AtomLabel> = state
        .atoms
        .iter()
        .map(|atom| chemfig::format_atom(atom, config.atom_numbers, config.markers.as_deref()))
        .collect();

    // === Phase 5: Emission ===
    let lines = Renderer::new(&tree, &state.atoms, &labels, config).emit();
    let (width, height) = dimensions(&state, config, tree.scale_factor);

    info!(lines = lines.len(), "Rendered molecule.");
    Ok(RenderedMolecule {
        lines,
        width,
        height,
    })
}

// Axis-aligned extents of the rotated drawing, in units of the standard
// bond length.
fn dimensions(state: &LayoutState, config: &RenderConfig, scale_factor: f64) -> (f64, f64) {
    let alpha = config.rotate.to_radians();
    let (sin, cos) = alpha.sin_cos();

    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for atom in &state.atoms {
        let x = atom.position.x * cos - atom.position.y * sin;
        let y = atom.position.x * sin + atom.position.y * cos;
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    ((max_x - min_x) * scale_factor, (max_y - min_y) * scale_factor)
}
