//! Neural pathway curves between regions.
//!
//! Each pathway is an arc from one region center to another: straight in x/y,
//! lifted along z by a half sine. The pathway state picks which arcs are drawn.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::regions::RegionCatalog;
use crate::scene::{linspace, CurveTrace, LineStyle, Primitive};

pub const PATHWAY_SAMPLES: usize = 20;
/// Peak z offset of an arc at its midpoint.
pub const PATHWAY_LIFT: f64 = 20.0;
pub const PATHWAY_COLOR: &str = "green";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathwayState {
    #[default]
    Normal,
    Early,
    Established,
    Advanced,
}

impl PathwayState {
    pub fn label(self) -> &'static str {
        match self {
            PathwayState::Normal => "normal",
            PathwayState::Early => "early",
            PathwayState::Established => "established",
            PathwayState::Advanced => "advanced",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PathwayState::Normal => "Normal State",
            PathwayState::Early => "Early Adaptation",
            PathwayState::Established => "Established Connections",
            PathwayState::Advanced => "Advanced Rewiring",
        }
    }

    pub fn all() -> &'static [PathwayState] {
        &[
            PathwayState::Normal,
            PathwayState::Early,
            PathwayState::Established,
            PathwayState::Advanced,
        ]
    }

    /// Arcs drawn in this state.
    pub fn pathways(self) -> &'static [Pathway] {
        match self {
            PathwayState::Normal => &[],
            PathwayState::Early => &EARLY,
            PathwayState::Established => &ESTABLISHED,
            PathwayState::Advanced => &ADVANCED,
        }
    }
}

impl fmt::Display for PathwayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PathwayState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PathwayState::all()
            .iter()
            .copied()
            .find(|p| p.label() == s)
            .ok_or_else(|| format!("unknown pathway state: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pathway {
    pub from: &'static str,
    pub to: &'static str,
    pub width: f64,
    pub opacity: f64,
}

const A1_V1_FAINT: Pathway = Pathway {
    from: "a1",
    to: "v1",
    width: 2.0,
    opacity: 0.4,
};
const A1_V1: Pathway = Pathway {
    from: "a1",
    to: "v1",
    width: 5.0,
    opacity: 0.8,
};
const A1_ASSOCIATION: Pathway = Pathway {
    from: "a1",
    to: "association",
    width: 3.0,
    opacity: 0.8,
};
const ASSOCIATION_V1: Pathway = Pathway {
    from: "association",
    to: "v1",
    width: 3.0,
    opacity: 0.9,
};
const THALAMUS_V1: Pathway = Pathway {
    from: "thalamus",
    to: "v1",
    width: 3.0,
    opacity: 0.9,
};

const EARLY: [Pathway; 1] = [A1_V1_FAINT];
const ESTABLISHED: [Pathway; 2] = [A1_V1, A1_ASSOCIATION];
const ADVANCED: [Pathway; 4] = [A1_V1, A1_ASSOCIATION, ASSOCIATION_V1, THALAMUS_V1];

/// Curve for one pathway, or `None` if either endpoint is not in the catalog.
pub fn pathway_curve(catalog: &RegionCatalog, pathway: &Pathway) -> Option<Primitive> {
    let from = catalog.get_region(pathway.from).ok()?;
    let to = catalog.get_region(pathway.to).ok()?;
    let (a, b) = (from.center, to.center);

    let ts = linspace(0.0, 1.0, PATHWAY_SAMPLES);
    let x = ts.iter().map(|t| a.x + t * (b.x - a.x)).collect();
    let y = ts.iter().map(|t| a.y + t * (b.y - a.y)).collect();
    let z = ts
        .iter()
        .map(|t| a.z + t * (b.z - a.z) + PATHWAY_LIFT * (t * PI).sin())
        .collect();

    Some(Primitive::Curve(CurveTrace {
        x,
        y,
        z,
        mode: "lines",
        line: LineStyle {
            color: PATHWAY_COLOR.to_string(),
            width: pathway.width,
        },
        opacity: pathway.opacity,
        name: format!("Neural Pathway ({} → {})", from.id, to.id),
    }))
}

/// All curves for a state, skipping pathways whose endpoints are missing.
pub fn pathway_curves(catalog: &RegionCatalog, state: PathwayState) -> Vec<Primitive> {
    state
        .pathways()
        .iter()
        .filter_map(|p| pathway_curve(catalog, p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_counts_grow_with_state() {
        let catalog = RegionCatalog::new();
        let counts: Vec<usize> = PathwayState::all()
            .iter()
            .map(|&s| pathway_curves(&catalog, s).len())
            .collect();
        assert_eq!(counts, vec![0, 1, 2, 4]);
    }

    #[test]
    fn arc_runs_between_centers_with_midpoint_lift() {
        let catalog = RegionCatalog::new();
        let Some(Primitive::Curve(c)) = pathway_curve(&catalog, &A1_V1) else {
            panic!("expected curve");
        };
        assert_eq!(c.x.len(), PATHWAY_SAMPLES);
        assert_eq!((c.x[0], c.y[0]), (10.0, 50.0));
        let last = PATHWAY_SAMPLES - 1;
        assert!((c.x[last] + 40.0).abs() < 1e-9);
        assert!((c.y[last] + 30.0).abs() < 1e-9);
        assert!((c.z[last] + 20.0).abs() < 1e-9);
        // The arc rises above the straight chord.
        let mid = PATHWAY_SAMPLES / 2;
        let chord = -10.0 + (c.y[mid] - 50.0) / -80.0 * -10.0;
        assert!(c.z[mid] > chord);
        assert_eq!(c.mode, "lines");
    }

    #[test]
    fn missing_endpoint_drops_the_curve() {
        let json = r#"[{"id": "a1", "name": "A", "center": [0,0,0], "size": [1,1,1], "color": [0,0,255,0.7]}]"#;
        let catalog = RegionCatalog::from_json_str(json).unwrap();
        assert!(pathway_curves(&catalog, PathwayState::Advanced).is_empty());
    }

    #[test]
    fn state_labels_parse_and_serialise() {
        for &s in PathwayState::all() {
            assert_eq!(s.label().parse::<PathwayState>(), Ok(s));
            assert_eq!(
                serde_json::to_string(&s).unwrap(),
                format!("\"{}\"", s.label())
            );
        }
        assert!("sideways".parse::<PathwayState>().is_err());
        assert_eq!(PathwayState::default(), PathwayState::Normal);
    }
}
