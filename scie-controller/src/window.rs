//! Rolling window of `Δ|V|` samples feeding the adaptive-band computation
//! and Bollinger-band anomaly detector (spec.md §4.F "Rolling window",
//! "Anomaly detection"). Corresponds to the "Monitor" stage of the MAPE-K
//! loop.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BandAdjustment {
    Widen,
    Tighten,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Anomaly {
    NegativeOutlier,
    PositiveOutlier,
    None,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self { samples: VecDeque::with_capacity(capacity), capacity: capacity.max(1) }
    }

    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Population standard deviation over the current window.
    pub fn std_dev(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let variance =
            self.samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / self.samples.len() as f64;
        variance.sqrt()
    }

    /// `σ > 0.03` → widen bands ×1.3 (noisy environment); `σ < 0.01` →
    /// tighten ×0.7; otherwise unchanged.
    pub fn band_adjustment(&self) -> BandAdjustment {
        let sigma = self.std_dev();
        if sigma > 0.03 {
            BandAdjustment::Widen
        } else if sigma < 0.01 {
            BandAdjustment::Tighten
        } else {
            BandAdjustment::Unchanged
        }
    }

    pub fn band_factor(&self) -> f64 {
        match self.band_adjustment() {
            BandAdjustment::Widen => 1.3,
            BandAdjustment::Tighten => 0.7,
            BandAdjustment::Unchanged => 1.0,
        }
    }

    /// Bollinger bands `μ ± 1.5σ`; classifies the latest sample against the
    /// window computed *before* it was pushed.
    pub fn classify(&self, latest: f64) -> Anomaly {
        if self.samples.len() < 2 {
            return Anomaly::None;
        }
        let mean = self.mean();
        let band = 1.5 * self.std_dev();
        if latest < mean - band {
            Anomaly::NegativeOutlier
        } else if latest > mean + band {
            Anomaly::PositiveOutlier
        } else {
            Anomaly::None
        }
    }
}
