use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::controls::AuditoryControls;
use crate::info::{info_text, InfoText};
use crate::pathways::{pathway_curves, PathwayState};
use crate::prng::Prng;
use crate::regions::{RegionActivation, RegionCatalog};
use crate::scene::{Scene, ScenePipeline};

/// Intensity used for "simulate" when the host does not supply one.
pub const DEFAULT_SIMULATE_INTENSITY: f64 = 0.8;

pub fn default_selection() -> Vec<String> {
    vec!["v1".to_string(), "a1".to_string()]
}

/// UI events the rendering host forwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum DashboardEvent {
    RegionSelectionChanged { ids: Vec<String> },
    PathwayStateChanged { state: PathwayState },
    SimulateClicked,
    ResetClicked,
}

/// Serialisable view of everything the host might display besides the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub selection: Vec<String>,
    pub pathway_state: PathwayState,
    pub simulate_intensity: f64,
    pub activation: Vec<RegionActivation>,
    pub controls: AuditoryControls,
}

/// Host-side state for one viewer.
///
/// Owns the catalog and the random source and hands both to the scene
/// pipeline per request; nothing else in the crate holds them.
pub struct Dashboard {
    catalog: RegionCatalog,
    rng: Prng,
    selection: Vec<String>,
    pathway_state: PathwayState,
    simulate_intensity: f64,
    controls: AuditoryControls,
}

impl Dashboard {
    pub fn new(catalog: RegionCatalog, rng: Prng) -> Self {
        Self {
            catalog,
            rng,
            selection: default_selection(),
            pathway_state: PathwayState::default(),
            simulate_intensity: DEFAULT_SIMULATE_INTENSITY,
            controls: AuditoryControls::default(),
        }
    }

    pub fn with_selection(mut self, ids: Vec<String>) -> Self {
        self.selection = ids;
        self
    }

    pub fn with_simulate_intensity(mut self, intensity: f64) -> Self {
        self.set_simulate_intensity(intensity);
        self
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut RegionCatalog {
        &mut self.catalog
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn pathway_state(&self) -> PathwayState {
        self.pathway_state
    }

    pub fn controls(&self) -> &AuditoryControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut AuditoryControls {
        &mut self.controls
    }

    pub fn simulate_intensity(&self) -> f64 {
        self.simulate_intensity
    }

    /// Clamped to `[0, 1]`; NaN keeps the previous value. Returns the stored value.
    pub fn set_simulate_intensity(&mut self, intensity: f64) -> f64 {
        if !intensity.is_nan() {
            self.simulate_intensity = intensity.clamp(0.0, 1.0);
        }
        self.simulate_intensity
    }

    pub fn apply(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::RegionSelectionChanged { ids } => {
                debug!(?ids, "region selection changed");
                self.selection = ids;
            }
            DashboardEvent::PathwayStateChanged { state } => {
                debug!(%state, "pathway state changed");
                self.pathway_state = state;
            }
            DashboardEvent::SimulateClicked => {
                info!(
                    intensity = self.simulate_intensity,
                    "simulating auditory activation"
                );
                self.catalog
                    .simulate_auditory_activation(self.simulate_intensity);
            }
            DashboardEvent::ResetClicked => {
                info!("resetting activation");
                self.catalog.reset_activation();
            }
        }
    }

    /// Scene for an explicit selection: surface, region clouds, then the
    /// current pathway state's curves.
    pub fn request_scene<S: AsRef<str>>(&mut self, selected: &[S]) -> Scene {
        let mut scene =
            ScenePipeline::new(&self.catalog, &mut self.rng).get_complete_figure(Some(selected));
        scene
            .primitives
            .extend(pathway_curves(&self.catalog, self.pathway_state));
        scene
    }

    pub fn request_info_text<S: AsRef<str>>(
        &self,
        selected: &[S],
        pathway_state: PathwayState,
    ) -> InfoText {
        info_text(selected, pathway_state)
    }

    pub fn current_scene(&mut self) -> Scene {
        let selection = std::mem::take(&mut self.selection);
        let scene = self.request_scene(selection.as_slice());
        self.selection = selection;
        scene
    }

    pub fn current_info_text(&self) -> InfoText {
        self.request_info_text(self.selection.as_slice(), self.pathway_state)
    }

    /// Render a single region after forcing its level, as the "preview at
    /// level" control does. Invalid levels leave the stored level untouched.
    pub fn preview_region(&mut self, region_id: &str, level: f64) -> Option<Scene> {
        self.catalog.set_activation(region_id, level);
        if !self.catalog.contains(region_id) {
            return None;
        }
        Some(self.request_scene(&[region_id][..]))
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            selection: self.selection.clone(),
            pathway_state: self.pathway_state,
            simulate_intensity: self.simulate_intensity,
            activation: self.catalog.activations(),
            controls: self.controls,
        }
    }
}
