//! Newline-delimited JSON protocol spoken between the host daemon and its clients.
//!
//! One request per line, one response per line. Both are tagged by `"type"`.

use serde::{Deserialize, Serialize};

use crate::controls::{AuditoryControls, EncodingStrategy};
use crate::dashboard::{Dashboard, DashboardEvent, DashboardSnapshot};
use crate::info::InfoText;
use crate::pathways::PathwayState;
use crate::regions::RegionError;
use crate::scene::Scene;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    GetScene,
    GetInfo,
    GetState,
    SelectRegions {
        ids: Vec<String>,
    },
    SetPathwayState {
        state: PathwayState,
    },
    Simulate {
        #[serde(default)]
        intensity: Option<f64>,
    },
    Reset,
    SetActivation {
        region: String,
        level: f64,
    },
    /// Force one region's level and render it alone.
    PreviewRegion {
        region: String,
        level: f64,
    },
    GetControls,
    SetControls {
        #[serde(default)]
        f0_hz: Option<f64>,
        #[serde(default)]
        alpha: Option<f64>,
        #[serde(default)]
        beta: Option<f64>,
        #[serde(default)]
        encoding: Option<EncodingStrategy>,
    },
    Shutdown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Response {
    Scene(Scene),
    Info(InfoText),
    State(DashboardSnapshot),
    Controls(AuditoryControls),
    Success { message: String },
    Error { message: String },
}

impl Response {
    pub fn success(message: impl Into<String>) -> Self {
        Response::Success {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }

    /// Serialised line without the trailing newline.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Request {
    /// Requests that never touch dashboard state or the random source.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Request::GetInfo | Request::GetState | Request::GetControls
        )
    }
}

pub fn parse_request(line: &str) -> Result<Request, String> {
    serde_json::from_str(line).map_err(|e| format!("Invalid request: {}", e))
}

/// Answer a read-only request under a shared borrow. Returns `None` for
/// requests that need `handle_request`.
pub fn handle_read_request(dashboard: &Dashboard, request: &Request) -> Option<Response> {
    match request {
        Request::GetInfo => Some(Response::Info(dashboard.current_info_text())),
        Request::GetState => Some(Response::State(dashboard.snapshot())),
        Request::GetControls => Some(Response::Controls(*dashboard.controls())),
        _ => None,
    }
}

/// Apply one request to the dashboard. `Shutdown` only acknowledges; the
/// caller owns process teardown.
pub fn handle_request(dashboard: &mut Dashboard, request: Request) -> Response {
    match request {
        Request::GetScene => Response::Scene(dashboard.current_scene()),
        Request::GetInfo => Response::Info(dashboard.current_info_text()),
        Request::GetState => Response::State(dashboard.snapshot()),
        Request::GetControls => Response::Controls(*dashboard.controls()),
        Request::SelectRegions { ids } => {
            let n = ids.len();
            dashboard.apply(DashboardEvent::RegionSelectionChanged { ids });
            Response::success(format!("Selected {} region(s)", n))
        }
        Request::SetPathwayState { state } => {
            dashboard.apply(DashboardEvent::PathwayStateChanged { state });
            Response::success(format!(
                "Pathway state set to {} ({})",
                state,
                state.display_name()
            ))
        }
        Request::Simulate { intensity } => {
            if let Some(i) = intensity {
                dashboard.set_simulate_intensity(i);
            }
            dashboard.apply(DashboardEvent::SimulateClicked);
            Response::success(format!(
                "Simulated auditory stimulus at {:.2}",
                dashboard.simulate_intensity()
            ))
        }
        Request::Reset => {
            dashboard.apply(DashboardEvent::ResetClicked);
            Response::success("Activation reset")
        }
        Request::SetActivation { region, level } => {
            if let Err(e) = dashboard.catalog().get_region(&region) {
                return Response::error(e.to_string());
            }
            dashboard.catalog_mut().set_activation(&region, level);
            let stored = dashboard.catalog().activation(&region).unwrap_or(0.0);
            Response::success(format!("{} activation = {}", region, stored))
        }
        Request::PreviewRegion { region, level } => {
            match dashboard.preview_region(&region, level) {
                Some(scene) => Response::Scene(scene),
                None => Response::error(RegionError::NotFound(region).to_string()),
            }
        }
        Request::SetControls {
            f0_hz,
            alpha,
            beta,
            encoding,
        } => {
            let controls = dashboard.controls_mut();
            if let Some(v) = f0_hz {
                controls.set_f0_hz(v);
            }
            if let Some(v) = alpha {
                controls.set_alpha(v);
            }
            if let Some(v) = beta {
                controls.set_beta(v);
            }
            if let Some(e) = encoding {
                controls.set_encoding(e);
            }
            Response::Controls(*controls)
        }
        Request::Shutdown => Response::success("Shutting down"),
    }
}
