//! Region definitions and the per-region activation state.
//!
//! The region table is fixed once a catalog is built. The only mutable state is
//! one activation level per region, always in `[0, 1]`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub type RegionIndex = usize;

/// A point or half-width vector in the model's anatomical coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

/// Base colour of a region. Rendered opacity is computed separately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(u8, u8, u8, f64)", into = "(u8, u8, u8, f64)")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// CSS form understood by the charting front-end, e.g. `rgba(255, 0, 0, 0.7)`.
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl From<(u8, u8, u8, f64)> for Rgba {
    fn from(c: (u8, u8, u8, f64)) -> Self {
        Self::new(c.0, c.1, c.2, c.3)
    }
}

impl From<Rgba> for (u8, u8, u8, f64) {
    fn from(c: Rgba) -> Self {
        (c.r, c.g, c.b, c.a)
    }
}

/// A named ellipsoidal zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub center: Vec3,
    /// Half-widths of the ellipsoid along x, y, z.
    #[serde(rename = "size")]
    pub extents: Vec3,
    pub color: Rgba,
}

struct RegionDef {
    id: &'static str,
    name: &'static str,
    center: Vec3,
    extents: Vec3,
    color: Rgba,
}

const BUILTIN_REGIONS: [RegionDef; 6] = [
    RegionDef {
        id: "v1",
        name: "Primary Visual Cortex (V1)",
        center: Vec3::new(-40.0, -30.0, -20.0),
        extents: Vec3::new(30.0, 25.0, 15.0),
        color: Rgba::new(255, 0, 0, 0.7),
    },
    RegionDef {
        id: "v2-v5",
        name: "Secondary Visual Areas (V2-V5)",
        center: Vec3::new(-35.0, -25.0, -5.0),
        extents: Vec3::new(25.0, 20.0, 15.0),
        color: Rgba::new(255, 100, 100, 0.7),
    },
    RegionDef {
        id: "a1",
        name: "Primary Auditory Cortex (A1)",
        center: Vec3::new(10.0, 50.0, -10.0),
        extents: Vec3::new(20.0, 15.0, 15.0),
        color: Rgba::new(0, 0, 255, 0.7),
    },
    RegionDef {
        id: "a2",
        name: "Secondary Auditory Areas",
        center: Vec3::new(15.0, 40.0, 0.0),
        extents: Vec3::new(15.0, 15.0, 15.0),
        color: Rgba::new(100, 100, 255, 0.7),
    },
    RegionDef {
        id: "association",
        name: "Association Areas",
        center: Vec3::new(-10.0, 10.0, 0.0),
        extents: Vec3::new(20.0, 20.0, 15.0),
        color: Rgba::new(100, 255, 100, 0.7),
    },
    RegionDef {
        id: "thalamus",
        name: "Thalamus",
        center: Vec3::new(0.0, 0.0, 0.0),
        extents: Vec3::new(10.0, 10.0, 10.0),
        color: Rgba::new(255, 255, 0, 0.7),
    },
];

/// Auditory-to-visual attenuation applied by [`RegionCatalog::simulate_auditory_activation`].
pub const AUDITORY_CASCADE: [(&str, f64); 6] = [
    ("a1", 1.0),
    ("a2", 0.9),
    ("association", 0.7),
    ("thalamus", 0.6),
    ("v2-v5", 0.5),
    ("v1", 0.4),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("unknown region id: {0}")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("region table is empty")]
    Empty,
    #[error("duplicate region id: {0}")]
    DuplicateId(String),
    #[error("region {0}: extents must be positive")]
    NonPositiveExtent(String),
    #[error("region {id}: alpha {alpha} outside [0, 1]")]
    InvalidAlpha { id: String, alpha: f64 },
    #[error("malformed region table: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Current level of one region, in table order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionActivation {
    pub id: String,
    pub name: String,
    pub level: f64,
}

#[derive(Debug, Clone)]
pub struct RegionCatalog {
    regions: Vec<Region>,
    // Parallel to `regions`; always fully populated.
    activation: Vec<f64>,
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionCatalog {
    /// The six built-in regions, all at activation 0.
    pub fn new() -> Self {
        let regions = BUILTIN_REGIONS
            .iter()
            .map(|d| Region {
                id: d.id.to_string(),
                display_name: d.name.to_string(),
                center: d.center,
                extents: d.extents,
                color: d.color,
            })
            .collect();
        Self::from_validated(regions)
    }

    /// Build a catalog from a JSON array of regions:
    /// `[{"id": "v1", "name": "...", "center": [x,y,z], "size": [x,y,z], "color": [r,g,b,a]}, ...]`.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let regions: Vec<Region> = serde_json::from_str(json)?;
        Self::from_regions(regions)
    }

    pub fn from_regions(regions: Vec<Region>) -> Result<Self, CatalogError> {
        if regions.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for r in &regions {
            if !seen.insert(r.id.as_str()) {
                return Err(CatalogError::DuplicateId(r.id.clone()));
            }
            let e = r.extents;
            if !(e.x > 0.0 && e.y > 0.0 && e.z > 0.0) {
                return Err(CatalogError::NonPositiveExtent(r.id.clone()));
            }
            if !(0.0..=1.0).contains(&r.color.a) {
                return Err(CatalogError::InvalidAlpha {
                    id: r.id.clone(),
                    alpha: r.color.a,
                });
            }
        }
        Ok(Self::from_validated(regions))
    }

    fn from_validated(regions: Vec<Region>) -> Self {
        let activation = vec![0.0; regions.len()];
        Self {
            regions,
            activation,
        }
    }

    #[inline]
    fn index_of(&self, id: &str) -> Option<RegionIndex> {
        self.regions.iter().position(|r| r.id == id)
    }

    pub fn get_region(&self, id: &str) -> Result<&Region, RegionError> {
        self.index_of(id)
            .map(|i| &self.regions[i])
            .ok_or_else(|| RegionError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions in table order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn activation(&self, id: &str) -> Option<f64> {
        self.index_of(id).map(|i| self.activation[i])
    }

    pub fn activations(&self) -> Vec<RegionActivation> {
        self.regions
            .iter()
            .zip(&self.activation)
            .map(|(r, &level)| RegionActivation {
                id: r.id.clone(),
                name: r.display_name.clone(),
                level,
            })
            .collect()
    }

    /// Ignores unknown ids and levels outside `[0, 1]` (including NaN).
    pub fn set_activation(&mut self, id: &str, level: f64) {
        let Some(i) = self.index_of(id) else {
            debug!(region = id, "ignoring activation for unknown region");
            return;
        };
        if !(0.0..=1.0).contains(&level) {
            debug!(region = id, level, "ignoring out-of-range activation");
            return;
        }
        self.activation[i] = level;
    }

    pub fn reset_activation(&mut self) {
        self.activation.iter_mut().for_each(|a| *a = 0.0);
    }

    /// Auditory regions get the full intensity; downstream regions get the
    /// fixed fractions in [`AUDITORY_CASCADE`]. Regions absent from the table
    /// are skipped.
    pub fn simulate_auditory_activation(&mut self, intensity: f64) {
        if intensity.is_nan() {
            debug!("ignoring NaN stimulus intensity");
            return;
        }
        for (id, fraction) in AUDITORY_CASCADE {
            if let Some(i) = self.index_of(id) {
                // Keep the [0,1] invariant even for out-of-range intensities.
                self.activation[i] = (intensity * fraction).clamp(0.0, 1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [&str; 6] = ["v1", "v2-v5", "a1", "a2", "association", "thalamus"];

    #[test]
    fn every_builtin_region_is_found_by_id() {
        let catalog = RegionCatalog::new();
        assert_eq!(catalog.len(), 6);
        for id in KNOWN {
            let r = catalog.get_region(id).unwrap();
            assert_eq!(r.id, id);
        }
        assert_eq!(catalog.ids(), KNOWN.to_vec());
    }

    #[test]
    fn unknown_region_is_not_found() {
        let catalog = RegionCatalog::new();
        assert_eq!(
            catalog.get_region("unknown"),
            Err(RegionError::NotFound("unknown".to_string()))
        );
        assert!(catalog.get_region("V1").is_err());
        assert!(catalog.get_region("").is_err());
    }

    #[test]
    fn activation_starts_at_zero_for_every_region() {
        let catalog = RegionCatalog::new();
        for id in KNOWN {
            assert_eq!(catalog.activation(id), Some(0.0));
        }
        assert_eq!(catalog.activation("bogus"), None);
    }

    #[test]
    fn set_activation_stores_in_range_levels() {
        let mut catalog = RegionCatalog::new();
        for level in [0.0, 0.25, 0.5, 1.0] {
            catalog.set_activation("a2", level);
            assert_eq!(catalog.activation("a2"), Some(level));
        }
    }

    #[test]
    fn set_activation_ignores_out_of_range_and_unknown() {
        let mut catalog = RegionCatalog::new();
        catalog.set_activation("v1", 0.6);
        for level in [-0.01, 1.01, f64::NAN, f64::INFINITY] {
            catalog.set_activation("v1", level);
            assert_eq!(catalog.activation("v1"), Some(0.6));
        }
        catalog.set_activation("bogus", 0.5);
        assert_eq!(catalog.activations().len(), 6);
    }

    #[test]
    fn reset_zeroes_every_region() {
        let mut catalog = RegionCatalog::new();
        catalog.simulate_auditory_activation(0.9);
        catalog.set_activation("v1", 1.0);
        catalog.reset_activation();
        assert!(catalog.activations().iter().all(|a| a.level == 0.0));
    }

    #[test]
    fn full_intensity_cascade_matches_fractions() {
        let mut catalog = RegionCatalog::new();
        catalog.simulate_auditory_activation(1.0);
        let expected = [
            ("a1", 1.0),
            ("a2", 0.9),
            ("association", 0.7),
            ("thalamus", 0.6),
            ("v2-v5", 0.5),
            ("v1", 0.4),
        ];
        for (id, level) in expected {
            assert_eq!(catalog.activation(id), Some(level), "region {id}");
        }
    }

    #[test]
    fn cascade_scales_with_intensity() {
        let mut catalog = RegionCatalog::new();
        catalog.simulate_auditory_activation(0.5);
        assert_eq!(catalog.activation("a1"), Some(0.5));
        assert_eq!(catalog.activation("v1"), Some(0.2));
    }

    #[test]
    fn cascade_never_leaves_unit_interval() {
        let mut catalog = RegionCatalog::new();
        catalog.simulate_auditory_activation(3.0);
        assert!(catalog.activations().iter().all(|a| a.level <= 1.0));
        catalog.simulate_auditory_activation(-1.0);
        assert!(catalog.activations().iter().all(|a| a.level >= 0.0));
    }

    #[test]
    fn custom_table_parses_and_validates() {
        let json = r#"[
            {"id": "v1", "name": "Visual", "center": [0, 0, 0], "size": [1, 2, 3], "color": [255, 0, 0, 0.5]},
            {"id": "a1", "name": "Auditory", "center": [5, 5, 5], "size": [1, 1, 1], "color": [0, 0, 255, 0.5]}
        ]"#;
        let mut catalog = RegionCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.ids(), vec!["v1", "a1"]);
        assert_eq!(
            catalog.get_region("v1").unwrap().extents,
            Vec3::new(1.0, 2.0, 3.0)
        );

        // Cascade entries missing from the table are skipped.
        catalog.simulate_auditory_activation(1.0);
        assert_eq!(catalog.activation("a1"), Some(1.0));
        assert_eq!(catalog.activation("v1"), Some(0.4));
    }

    #[test]
    fn custom_table_rejects_bad_input() {
        assert!(matches!(
            RegionCatalog::from_json_str("[]"),
            Err(CatalogError::Empty)
        ));
        let dup = r#"[
            {"id": "x", "name": "X", "center": [0,0,0], "size": [1,1,1], "color": [0,0,0,1.0]},
            {"id": "x", "name": "X", "center": [0,0,0], "size": [1,1,1], "color": [0,0,0,1.0]}
        ]"#;
        assert!(matches!(
            RegionCatalog::from_json_str(dup),
            Err(CatalogError::DuplicateId(id)) if id == "x"
        ));
        let flat = r#"[{"id": "x", "name": "X", "center": [0,0,0], "size": [1,0,1], "color": [0,0,0,1.0]}]"#;
        assert!(matches!(
            RegionCatalog::from_json_str(flat),
            Err(CatalogError::NonPositiveExtent(_))
        ));
        assert!(matches!(
            RegionCatalog::from_json_str("{"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn color_renders_as_css() {
        let catalog = RegionCatalog::new();
        assert_eq!(
            catalog.get_region("a2").unwrap().color.css(),
            "rgba(100, 100, 255, 0.7)"
        );
    }
}
