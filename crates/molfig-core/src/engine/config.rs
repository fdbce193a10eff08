use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Bond stretch must be a positive number, got {0}")]
    NonPositiveStretch(f64),
    #[error("Marker prefix must not be empty")]
    EmptyMarkerPrefix,
    #[error("Atom numbers are one-based; 0 is not a valid atom")]
    ZeroAtomNumber,
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
}

/// How tree bond lengths relate to the input coordinate distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BondScaleMode {
    /// Use the coordinate distances as they are.
    Keep,
    /// Scale so that the most common bond length becomes the stretch
    /// factor; standard-length bonds then render without a length slot.
    Normalize,
    /// Multiply every bond length by the stretch factor.
    Scale,
}

/// All rendering options, fixed for the duration of one layout run.
///
/// Atom numbers in `entry_atom`, `exit_atom` and `cross_bonds` are
/// one-based, the way structure drawings are usually numbered; internal
/// indices subtract one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderConfig {
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    /// Global rotation in degrees, applied to every bond angle.
    pub rotate: f64,
    pub entry_atom: Option<usize>,
    pub exit_atom: Option<usize>,
    pub bond_scale: BondScaleMode,
    pub bond_stretch: f64,
    /// Decimal places for bond lengths, both in output and when bucketing
    /// lengths for normalization.
    pub bond_round: usize,
    pub cross_bonds: Vec<(usize, usize)>,
    pub aromatic_circles: bool,
    pub fancy_bonds: bool,
    pub atom_numbers: bool,
    pub relative_angles: bool,
    /// Prefix for atom and bond markers; markers are off when `None`.
    pub markers: Option<String>,
    /// Spaces of indentation per tree level.
    pub indent: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            flip_horizontal: false,
            flip_vertical: false,
            rotate: 0.0,
            entry_atom: None,
            exit_atom: None,
            bond_scale: BondScaleMode::Normalize,
            bond_stretch: 1.0,
            bond_round: 3,
            cross_bonds: Vec::new(),
            aromatic_circles: false,
            fancy_bonds: false,
            atom_numbers: false,
            relative_angles: false,
            markers: None,
            indent: 4,
        }
    }
}

impl RenderConfig {
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder::default()
    }

    /// Loads and validates a configuration from a TOML file. Omitted keys
    /// take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.bond_stretch > 0.0) {
            return Err(ConfigError::NonPositiveStretch(self.bond_stretch));
        }
        if self.markers.as_deref() == Some("") {
            return Err(ConfigError::EmptyMarkerPrefix);
        }
        let mut numbers = self.entry_atom.into_iter().chain(self.exit_atom);
        if numbers.any(|n| n == 0) {
            return Err(ConfigError::ZeroAtomNumber);
        }
        if self.cross_bonds.iter().any(|&(a, b)| a == 0 || b == 0) {
            return Err(ConfigError::ZeroAtomNumber);
        }
        Ok(())
    }

    /// True when exactly one coordinate axis is mirrored, which reverses
    /// wedge directions.
    pub fn mirrored(&self) -> bool {
        self.flip_horizontal != self.flip_vertical
    }
}

#[derive(Debug, Default)]
pub struct RenderConfigBuilder {
    config: RenderConfig,
}

impl RenderConfigBuilder {
    pub fn flip_horizontal(mut self, flip: bool) -> Self {
        self.config.flip_horizontal = flip;
        self
    }
    pub fn flip_vertical(mut self, flip: bool) -> Self {
        self.config.flip_vertical = flip;
        self
    }
    pub fn rotate(mut self, degrees: f64) -> Self {
        self.config.rotate = degrees;
        self
    }
    pub fn entry_atom(mut self, number: usize) -> Self {
        self.config.entry_atom = Some(number);
        self
    }
    pub fn exit_atom(mut self, number: usize) -> Self {
        self.config.exit_atom = Some(number);
        self
    }
    pub fn bond_scale(mut self, mode: BondScaleMode) -> Self {
        self.config.bond_scale = mode;
        self
    }
    pub fn bond_stretch(mut self, stretch: f64) -> Self {
        self.config.bond_stretch = stretch;
        self
    }
    pub fn bond_round(mut self, decimals: usize) -> Self {
        self.config.bond_round = decimals;
        self
    }
    pub fn cross_bond(mut self, a: usize, b: usize) -> Self {
        self.config.cross_bonds.push((a, b));
        self
    }
    pub fn aromatic_circles(mut self, on: bool) -> Self {
        self.config.aromatic_circles = on;
        self
    }
    pub fn fancy_bonds(mut self, on: bool) -> Self {
        self.config.fancy_bonds = on;
        self
    }
    pub fn atom_numbers(mut self, on: bool) -> Self {
        self.config.atom_numbers = on;
        self
    }
    pub fn relative_angles(mut self, on: bool) -> Self {
        self.config.relative_angles = on;
        self
    }
    pub fn markers(mut self, prefix: &str) -> Self {
        self.config.markers = Some(prefix.to_string());
        self
    }
    pub fn indent(mut self, spaces: usize) -> Self {
        self.config.indent = spaces;
        self
    }

    pub fn build(self) -> Result<RenderConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn default_config_is_valid() {
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = RenderConfig::builder()
            .rotate(30.0)
            .entry_atom(5)
            .bond_scale(BondScaleMode::Keep)
            .fancy_bonds(true)
            .cross_bond(1, 4)
            .markers("m")
            .build()
            .unwrap();

        assert_eq!(config.rotate, 30.0);
        assert_eq!(config.entry_atom, Some(5));
        assert_eq!(config.bond_scale, BondScaleMode::Keep);
        assert!(config.fancy_bonds);
        assert_eq!(config.cross_bonds, vec![(1, 4)]);
        assert_eq!(config.markers.as_deref(), Some("m"));
        assert!(!config.flip_horizontal);
    }

    #[test]
    fn non_positive_stretch_is_rejected() {
        let result = RenderConfig::builder().bond_stretch(0.0).build();
        assert!(matches!(
            result,
            Err(ConfigError::NonPositiveStretch(s)) if s == 0.0
        ));
        assert!(
            RenderConfig::builder()
                .bond_stretch(-2.0)
                .build()
                .is_err()
        );
    }

    #[test]
    fn empty_marker_prefix_is_rejected() {
        let result = RenderConfig::builder().markers("").build();
        assert!(matches!(result, Err(ConfigError::EmptyMarkerPrefix)));
    }

    #[test]
    fn zero_atom_numbers_are_rejected() {
        assert!(matches!(
            RenderConfig::builder().entry_atom(0).build(),
            Err(ConfigError::ZeroAtomNumber)
        ));
        assert!(matches!(
            RenderConfig::builder().cross_bond(0, 2).build(),
            Err(ConfigError::ZeroAtomNumber)
        ));
    }

    #[test]
    fn mirrored_means_exactly_one_flip() {
        let both = RenderConfig {
            flip_horizontal: true,
            flip_vertical: true,
            ..RenderConfig::default()
        };
        assert!(!both.mirrored());

        let one = RenderConfig {
            flip_horizontal: true,
            ..RenderConfig::default()
        };
        assert!(one.mirrored());
    }

    #[test]
    fn load_reads_kebab_case_keys_and_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("render.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(
            file,
            r#"
            bond-scale = "keep"
            fancy-bonds = true
            aromatic-circles = true
            cross-bonds = [[1, 4], [2, 7]]
            rotate = 45.0
            "#
        )
        .unwrap();

        let config = RenderConfig::load(&file_path).unwrap();
        assert_eq!(config.bond_scale, BondScaleMode::Keep);
        assert!(config.fancy_bonds);
        assert!(config.aromatic_circles);
        assert_eq!(config.cross_bonds, vec![(1, 4), (2, 7)]);
        assert_eq!(config.rotate, 45.0);
        assert_eq!(config.indent, 4);
        assert_eq!(config.bond_stretch, 1.0);
    }

    #[test]
    fn load_rejects_invalid_values() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("bad.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "bond-stretch = -1.0").unwrap();

        assert!(matches!(
            RenderConfig::load(&file_path),
            Err(ConfigError::NonPositiveStretch(_))
        ));
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("broken.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "rotate = \"sideways\"").unwrap();

        assert!(matches!(
            RenderConfig::load(&file_path),
            Err(ConfigError::Toml { .. })
        ));
    }

    #[test]
    fn load_reports_missing_files() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            RenderConfig::load(&dir.path().join("absent.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
