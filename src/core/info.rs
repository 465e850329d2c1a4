//! Text shown in the information panel for the current selection.

use serde::{Deserialize, Serialize};

use crate::pathways::PathwayState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoText {
    pub title: String,
    pub body: String,
}

impl InfoText {
    fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}

pub const JOINT_TITLE: &str = "Visual and Auditory Cortices";
pub const JOINT_BODY: &str = "The visual cortex processes visual information, while the auditory cortex processes sound. In blind individuals, cross-modal plasticity allows auditory information to activate the visual cortex.";
pub const VISUAL_TITLE: &str = "Visual Cortex";
pub const VISUAL_BODY: &str = "The visual cortex is located in the occipital lobe at the back of the brain. It processes visual information received from the eyes.";
pub const AUDITORY_TITLE: &str = "Auditory Cortex";
pub const AUDITORY_BODY: &str = "The auditory cortex is located in the temporal lobe. It processes sound information received from the ears.";
pub const GENERIC_TITLE: &str = "Cross-Modal Plasticity";
pub const GENERIC_BODY: &str = "Select brain regions to learn more about how auditory stimuli can activate the visual cortex in blind individuals.";

/// Only `v1` and `a1` steer the text; other regions and the pathway state do not.
pub fn info_text<S: AsRef<str>>(selected: &[S], _pathway_state: PathwayState) -> InfoText {
    let has = |id: &str| selected.iter().any(|s| s.as_ref() == id);
    match (has("v1"), has("a1")) {
        (true, true) => InfoText::new(JOINT_TITLE, JOINT_BODY),
        (true, false) => InfoText::new(VISUAL_TITLE, VISUAL_BODY),
        (false, true) => InfoText::new(AUDITORY_TITLE, AUDITORY_BODY),
        (false, false) => InfoText::new(GENERIC_TITLE, GENERIC_BODY),
    }
}
