//! Auditory-to-visual mapping parameters shown alongside the scene.
//!
//! These are presentational: they are stored and reported back to the host
//! but do not influence scene generation.

use serde::{Deserialize, Serialize};

/// Closed range with a step grid anchored at `min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl SliderRange {
    /// Clamp into range and snap to the nearest step.
    pub fn snap(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.default;
        }
        let clamped = value.clamp(self.min, self.max);
        let steps = ((clamped - self.min) / self.step).round();
        // Rounding keeps 0.1-step values free of binary noise (e.g. 0.30000000000000004).
        let snapped = self.min + steps * self.step;
        let snapped = (snapped * 1e9).round() / 1e9;
        snapped.clamp(self.min, self.max)
    }
}

pub const F0_RANGE: SliderRange = SliderRange {
    min: 220.0,
    max: 880.0,
    step: 20.0,
    default: 440.0,
};
pub const ALPHA_RANGE: SliderRange = SliderRange {
    min: 0.1,
    max: 2.0,
    step: 0.1,
    default: 1.0,
};
pub const BETA_RANGE: SliderRange = ALPHA_RANGE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EncodingStrategy {
    #[default]
    #[serde(rename = "spatial-freq")]
    SpatialFrequency,
    #[serde(rename = "freq-amp")]
    FrequencyAmplitude,
    #[serde(rename = "temporal")]
    TemporalPattern,
    #[serde(rename = "spectral")]
    SpectralContour,
    #[serde(rename = "hybrid")]
    Hybrid,
}

impl EncodingStrategy {
    pub fn label(self) -> &'static str {
        match self {
            EncodingStrategy::SpatialFrequency => "spatial-freq",
            EncodingStrategy::FrequencyAmplitude => "freq-amp",
            EncodingStrategy::TemporalPattern => "temporal",
            EncodingStrategy::SpectralContour => "spectral",
            EncodingStrategy::Hybrid => "hybrid",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            EncodingStrategy::SpatialFrequency => "Spatial-Frequency",
            EncodingStrategy::FrequencyAmplitude => "Frequency-Amplitude",
            EncodingStrategy::TemporalPattern => "Temporal Pattern",
            EncodingStrategy::SpectralContour => "Spectral Contour",
            EncodingStrategy::Hybrid => "Hybrid",
        }
    }

    pub fn all() -> &'static [EncodingStrategy] {
        &[
            EncodingStrategy::SpatialFrequency,
            EncodingStrategy::FrequencyAmplitude,
            EncodingStrategy::TemporalPattern,
            EncodingStrategy::SpectralContour,
            EncodingStrategy::Hybrid,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuditoryControls {
    /// Base frequency in Hz.
    pub f0_hz: f64,
    /// Depth factor.
    pub alpha: f64,
    /// Angular factor.
    pub beta: f64,
    pub encoding: EncodingStrategy,
}

impl Default for AuditoryControls {
    fn default() -> Self {
        Self {
            f0_hz: F0_RANGE.default,
            alpha: ALPHA_RANGE.default,
            beta: BETA_RANGE.default,
            encoding: EncodingStrategy::default(),
        }
    }
}

impl AuditoryControls {
    pub fn set_f0_hz(&mut self, hz: f64) -> f64 {
        self.f0_hz = F0_RANGE.snap(hz);
        self.f0_hz
    }

    pub fn set_alpha(&mut self, alpha: f64) -> f64 {
        self.alpha = ALPHA_RANGE.snap(alpha);
        self.alpha
    }

    pub fn set_beta(&mut self, beta: f64) -> f64 {
        self.beta = BETA_RANGE.snap(beta);
        self.beta
    }

    pub fn set_encoding(&mut self, encoding: EncodingStrategy) {
        self.encoding = encoding;
    }
}
