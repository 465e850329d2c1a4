//! Scene generation: turns catalog state plus a region selection into drawable
//! primitives and a fixed layout.
//!
//! Primitives serialise to the trace shape the charting front-end consumes
//! (`{"type": "surface", ...}` / `{"type": "scatter3d", ...}`), and a [`Scene`]
//! serialises as `{"data": [...], "layout": {...}}`.

use std::f64::consts::PI;

use serde::Serialize;

use crate::prng::Prng;
use crate::regions::{RegionCatalog, Vec3};

/// Samples per angular dimension of the brain surface mesh.
pub const SURFACE_RESOLUTION: usize = 30;
/// Semi-axes of the brain ellipsoid.
pub const BRAIN_SEMI_AXES: Vec3 = Vec3::new(50.0, 65.0, 50.0);
pub const BRAIN_SURFACE_OPACITY: f64 = 0.4;
pub const POINTS_PER_REGION: usize = 100;
pub const REGION_MARKER_SIZE: f64 = 5.0;
/// Opacity of a region at activation 0; activation 1 reaches 1.0.
pub const MIN_REGION_OPACITY: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceTrace {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<f64>>,
    pub z: Vec<Vec<f64>>,
    pub colorscale: &'static str,
    pub opacity: f64,
    pub showscale: bool,
    pub hoverinfo: &'static str,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub size: f64,
    pub color: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointCloudTrace {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub mode: &'static str,
    pub marker: Marker,
    pub name: String,
    pub hoverinfo: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveTrace {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub mode: &'static str,
    pub line: LineStyle,
    pub opacity: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Primitive {
    #[serde(rename = "surface")]
    Surface(SurfaceTrace),
    #[serde(rename = "scatter3d")]
    PointCloud(PointCloudTrace),
    #[serde(rename = "scatter3d")]
    Curve(CurveTrace),
}

impl Primitive {
    pub fn name(&self) -> &str {
        match self {
            Primitive::Surface(t) => &t.name,
            Primitive::PointCloud(t) => &t.name,
            Primitive::Curve(t) => &t.name,
        }
    }

    pub fn is_surface(&self) -> bool {
        matches!(self, Primitive::Surface(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: &'static str,
    pub showticklabels: bool,
    pub showgrid: bool,
    pub zeroline: bool,
}

impl Axis {
    const HIDDEN: Axis = Axis {
        title: "",
        showticklabels: false,
        showgrid: false,
        zeroline: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Eye {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Camera {
    pub eye: Eye,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneAxes {
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub zaxis: Axis,
    pub camera: Camera,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub b: u32,
    pub t: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub yanchor: &'static str,
    pub y: f64,
    pub xanchor: &'static str,
    pub x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub scene: SceneAxes,
    pub margin: Margin,
    pub legend: Legend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    #[serde(rename = "data")]
    pub primitives: Vec<Primitive>,
    pub layout: Layout,
}

impl Scene {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// `n` evenly spaced samples over `[start, end]`, endpoints included.
pub(crate) fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

fn grid(u: &[f64], v: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<Vec<f64>> {
    u.iter()
        .map(|&ui| v.iter().map(|&vj| f(ui, vj)).collect())
        .collect()
}

/// Opacity for a region at the given activation level.
#[inline]
pub fn region_opacity(activation: f64) -> f64 {
    MIN_REGION_OPACITY + (1.0 - MIN_REGION_OPACITY) * activation
}

/// Builds scenes from a catalog. Borrows the catalog read-only and the random
/// source mutably for the duration of one request.
pub struct ScenePipeline<'a> {
    catalog: &'a RegionCatalog,
    rng: &'a mut Prng,
}

impl<'a> ScenePipeline<'a> {
    pub fn new(catalog: &'a RegionCatalog, rng: &'a mut Prng) -> Self {
        Self { catalog, rng }
    }

    /// Fixed ellipsoid mesh; independent of regions and activation.
    pub fn generate_brain_surface(&self) -> Primitive {
        let u = linspace(0.0, 2.0 * PI, SURFACE_RESOLUTION);
        let v = linspace(0.0, PI, SURFACE_RESOLUTION);
        let a = BRAIN_SEMI_AXES;

        let x = grid(&u, &v, |ui, vj| a.x * ui.cos() * vj.sin());
        let y = grid(&u, &v, |ui, vj| a.y * ui.sin() * vj.sin());
        let z = grid(&u, &v, |_, vj| a.z * vj.cos());

        Primitive::Surface(SurfaceTrace {
            x,
            y,
            z,
            colorscale: "Greys",
            opacity: BRAIN_SURFACE_OPACITY,
            showscale: false,
            hoverinfo: "skip",
            name: "Brain Surface".to_string(),
        })
    }

    /// Point cloud for one region, or `None` if the id is unknown.
    pub fn generate_region_visualization(&mut self, region_id: &str) -> Option<Primitive> {
        let catalog = self.catalog;
        let region = catalog.get_region(region_id).ok()?;
        let activation = catalog.activation(region_id)?;
        let opacity = region_opacity(activation);

        let mut x = Vec::with_capacity(POINTS_PER_REGION);
        let mut y = Vec::with_capacity(POINTS_PER_REGION);
        let mut z = Vec::with_capacity(POINTS_PER_REGION);
        for _ in 0..POINTS_PER_REGION {
            let p = sample_unit_ball(self.rng);
            x.push(region.center.x + p.x * region.extents.x);
            y.push(region.center.y + p.y * region.extents.y);
            z.push(region.center.z + p.z * region.extents.z);
        }

        Some(Primitive::PointCloud(PointCloudTrace {
            x,
            y,
            z,
            mode: "markers",
            marker: Marker {
                size: REGION_MARKER_SIZE,
                color: region.color.css(),
                opacity,
            },
            name: region.display_name.clone(),
            hoverinfo: "name",
        }))
    }

    /// Surface first, then one cloud per known id in the order given.
    /// `None` selects every region in table order; unknown ids are skipped.
    pub fn get_all_regions_visualization<S: AsRef<str>>(
        &mut self,
        selected: Option<&[S]>,
    ) -> Vec<Primitive> {
        let mut data = vec![self.generate_brain_surface()];
        match selected {
            Some(ids) => {
                for id in ids {
                    if let Some(p) = self.generate_region_visualization(id.as_ref()) {
                        data.push(p);
                    }
                }
            }
            None => {
                let catalog = self.catalog;
                for region in catalog.regions() {
                    if let Some(p) = self.generate_region_visualization(&region.id) {
                        data.push(p);
                    }
                }
            }
        }
        data
    }

    pub fn get_layout(&self) -> Layout {
        layout()
    }

    pub fn get_complete_figure<S: AsRef<str>>(&mut self, selected: Option<&[S]>) -> Scene {
        Scene {
            primitives: self.get_all_regions_visualization(selected),
            layout: layout(),
        }
    }
}

/// The constant layout shared by every scene.
pub fn layout() -> Layout {
    Layout {
        scene: SceneAxes {
            xaxis: Axis::HIDDEN,
            yaxis: Axis::HIDDEN,
            zaxis: Axis::HIDDEN,
            camera: Camera {
                eye: Eye {
                    x: 1.5,
                    y: 1.5,
                    z: 1.5,
                },
            },
        },
        margin: Margin {
            l: 0,
            r: 0,
            b: 0,
            t: 0,
        },
        legend: Legend {
            yanchor: "top",
            y: 0.99,
            xanchor: "left",
            x: 0.01,
        },
    }
}

/// Uniform sample from the unit ball: uniform direction, radius from the cube
/// root of a uniform variate so points are not biased toward the center.
fn sample_unit_ball(rng: &mut Prng) -> Vec3 {
    let theta = rng.gen_range_f64(0.0, 2.0 * PI);
    let cos_phi = rng.gen_range_f64(-1.0, 1.0);
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
    let r = rng.next_f64_01().cbrt();
    Vec3::new(
        r * sin_phi * theta.cos(),
        r * sin_phi * theta.sin(),
        r * cos_phi,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloud(p: &Primitive) -> &PointCloudTrace {
        match p {
            Primitive::PointCloud(t) => t,
            other => panic!("expected point cloud, got {}", other.name()),
        }
    }

    #[test]
    fn linspace_includes_endpoints() {
        let v = linspace(0.0, 1.0, 5);
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
    }

    #[test]
    fn brain_surface_is_fixed_grid_on_ellipsoid() {
        let catalog = RegionCatalog::new();
        let mut rng = Prng::new(1);
        let pipeline = ScenePipeline::new(&catalog, &mut rng);
        let Primitive::Surface(s) = pipeline.generate_brain_surface() else {
            panic!("expected surface");
        };
        assert_eq!(s.x.len(), SURFACE_RESOLUTION);
        assert!(s.x.iter().all(|row| row.len() == SURFACE_RESOLUTION));
        assert_eq!(s.hoverinfo, "skip");
        assert!(!s.showscale);
        assert!(s.opacity < 1.0);

        for i in 0..SURFACE_RESOLUTION {
            for j in 0..SURFACE_RESOLUTION {
                let e = (s.x[i][j] / 50.0).powi(2)
                    + (s.y[i][j] / 65.0).powi(2)
                    + (s.z[i][j] / 50.0).powi(2);
                assert!((e - 1.0).abs() < 1e-9);
            }
        }
        assert_eq!(pipeline.generate_brain_surface(), Primitive::Surface(s));
    }

    #[test]
    fn unknown_region_yields_none() {
        let catalog = RegionCatalog::new();
        let mut rng = Prng::new(1);
        let mut pipeline = ScenePipeline::new(&catalog, &mut rng);
        assert!(pipeline.generate_region_visualization("bogus").is_none());
    }

    #[test]
    fn region_points_stay_inside_ellipsoid() {
        let catalog = RegionCatalog::new();
        let mut rng = Prng::new(42);
        let mut pipeline = ScenePipeline::new(&catalog, &mut rng);
        for region in catalog.regions() {
            let p = pipeline.generate_region_visualization(&region.id).unwrap();
            let t = cloud(&p);
            assert_eq!(t.x.len(), POINTS_PER_REGION);
            assert_eq!(t.mode, "markers");
            assert_eq!(t.name, region.display_name);
            assert_eq!(t.marker.color, region.color.css());
            for k in 0..t.x.len() {
                let e = ((t.x[k] - region.center.x) / region.extents.x).powi(2)
                    + ((t.y[k] - region.center.y) / region.extents.y).powi(2)
                    + ((t.z[k] - region.center.z) / region.extents.z).powi(2);
                assert!(e <= 1.0 + 1e-9);
            }
        }
    }

    #[test]
    fn sampling_is_not_center_biased() {
        // For a uniform ball, P(r < 0.5) = 0.125.
        let mut rng = Prng::new(2024);
        let n = 20_000;
        let inner = (0..n)
            .filter(|_| {
                let p = sample_unit_ball(&mut rng);
                (p.x * p.x + p.y * p.y + p.z * p.z).sqrt() < 0.5
            })
            .count();
        let frac = inner as f64 / n as f64;
        assert!((frac - 0.125).abs() < 0.02, "inner fraction {frac}");
    }

    #[test]
    fn opacity_tracks_activation() {
        assert_eq!(region_opacity(0.0), 0.3);
        assert_eq!(region_opacity(1.0), 1.0);

        let mut catalog = RegionCatalog::new();
        let mut last = 0.0;
        for step in 0..=10 {
            let level = step as f64 / 10.0;
            catalog.set_activation("v1", level);
            let mut rng = Prng::new(5);
            let mut pipeline = ScenePipeline::new(&catalog, &mut rng);
            let p = pipeline.generate_region_visualization("v1").unwrap();
            let opacity = cloud(&p).marker.opacity;
            assert!((0.3..=1.0).contains(&opacity));
            assert!(opacity >= last);
            last = opacity;
        }
    }

    #[test]
    fn selection_skips_unknown_and_keeps_order() {
        let catalog = RegionCatalog::new();
        let mut rng = Prng::new(3);
        let mut pipeline = ScenePipeline::new(&catalog, &mut rng);
        let data = pipeline.get_all_regions_visualization(Some(&["v1", "bogus", "a1"][..]));
        assert_eq!(data.len(), 3);
        assert!(data[0].is_surface());
        assert_eq!(data[1].name(), "Primary Visual Cortex (V1)");
        assert_eq!(data[2].name(), "Primary Auditory Cortex (A1)");
    }

    #[test]
    fn no_selection_means_all_regions() {
        let catalog = RegionCatalog::new();
        let mut rng = Prng::new(3);
        let mut pipeline = ScenePipeline::new(&catalog, &mut rng);
        let data = pipeline.get_all_regions_visualization::<&str>(None);
        assert_eq!(data.len(), 7);
        let names: Vec<&str> = data[1..].iter().map(Primitive::name).collect();
        let expected: Vec<&str> = catalog.regions().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn empty_selection_is_surface_only() {
        let catalog = RegionCatalog::new();
        let mut rng = Prng::new(3);
        let mut pipeline = ScenePipeline::new(&catalog, &mut rng);
        let empty: [&str; 0] = [];
        assert_eq!(pipeline.get_all_regions_visualization(Some(&empty[..])).len(), 1);
    }

    #[test]
    fn duplicates_render_each_time() {
        let catalog = RegionCatalog::new();
        let mut rng = Prng::new(3);
        let mut pipeline = ScenePipeline::new(&catalog, &mut rng);
        let ids = vec!["a1".to_string(), "a1".to_string()];
        assert_eq!(pipeline.get_all_regions_visualization(Some(ids.as_slice())).len(), 3);
    }

    #[test]
    fn layout_is_deterministic_and_hides_axes() {
        let a = layout();
        let b = layout();
        assert_eq!(a, b);
        assert_eq!(a.scene.camera.eye, Eye { x: 1.5, y: 1.5, z: 1.5 });
        for axis in [&a.scene.xaxis, &a.scene.yaxis, &a.scene.zaxis] {
            assert!(!axis.showticklabels && !axis.showgrid && !axis.zeroline);
        }
        assert_eq!(a.legend.xanchor, "left");
        assert_eq!(a.legend.yanchor, "top");
    }

    #[test]
    fn figure_serialises_as_data_and_layout() {
        let catalog = RegionCatalog::new();
        let mut rng = Prng::new(9);
        let mut pipeline = ScenePipeline::new(&catalog, &mut rng);
        let scene = pipeline.get_complete_figure(Some(&["thalamus"][..]));
        let json: serde_json::Value = serde_json::from_str(&scene.to_json().unwrap()).unwrap();
        let data = json["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["type"], "surface");
        assert_eq!(data[1]["type"], "scatter3d");
        assert_eq!(data[1]["marker"]["color"], "rgba(255, 255, 0, 0.7)");
        assert_eq!(json["layout"]["scene"]["camera"]["eye"]["x"], 1.5);
        assert_eq!(json["layout"]["legend"]["xanchor"], "left");
    }

    #[test]
    fn seeded_sources_reproduce_clouds() {
        let catalog = RegionCatalog::new();
        let mut rng_a = Prng::new(77);
        let mut rng_b = Prng::new(77);
        let a = ScenePipeline::new(&catalog, &mut rng_a).generate_region_visualization("a2");
        let b = ScenePipeline::new(&catalog, &mut rng_b).generate_region_visualization("a2");
        assert_eq!(a, b);
    }
}
