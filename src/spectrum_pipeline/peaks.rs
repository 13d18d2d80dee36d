//! Per-channel peak detection.
//!
//! Each channel's peak is its global maximum, kept only when it rises above
//! the noise threshold. The scan is left to right with a strict `>`, so the
//! first of several equal maxima wins.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::spectrum_pipeline::common::error::{Result, SpectrumError};
use crate::spectrum_pipeline::reduction::Spectrum;

/// Minimum normalised intensity a peak must exceed.
pub const DEFAULT_NOISE_THRESHOLD: f64 = 0.1;

/// Index reported for a channel without a peak.
pub const ABSENT_INDEX: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
    Intensity,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Red, Channel::Green, Channel::Blue, Channel::Intensity];
    pub const COLORS: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// External name, used in exports.
    pub fn label(self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
            Channel::Intensity => "intensity",
        }
    }

    /// Key of the channel inside a [`PeakSet`].
    pub fn key(self) -> &'static str {
        match self {
            Channel::Intensity => "total",
            other => other.label(),
        }
    }

    pub fn values(self, spectrum: &Spectrum) -> &[f64] {
        match self {
            Channel::Red => &spectrum.red,
            Channel::Green => &spectrum.green,
            Channel::Blue => &spectrum.blue,
            Channel::Intensity => &spectrum.intensity,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// First-occurrence arg-max. NaN samples never win; `None` for an empty or
/// all-NaN slice.
pub fn strongest_sample(values: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, max)) if !(value > max) => {}
            _ if value.is_nan() => {}
            _ => best = Some((index, value)),
        }
    }
    best
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub index: usize,
    pub wavelength: f64,
    pub intensity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red: Option<Peak>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green: Option<Peak>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blue: Option<Peak>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Peak>,
}

impl PeakSet {
    pub fn get(&self, channel: Channel) -> Option<&Peak> {
        self.slot(channel).as_ref()
    }

    pub fn set(&mut self, channel: Channel, peak: Option<Peak>) {
        *self.slot_mut(channel) = peak;
    }

    /// Peak index, or [`ABSENT_INDEX`].
    pub fn index_of(&self, channel: Channel) -> i64 {
        self.get(channel).map_or(ABSENT_INDEX, |p| p.index as i64)
    }

    /// Present peaks in channel order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &Peak)> {
        Channel::ALL
            .into_iter()
            .filter_map(move |channel| self.get(channel).map(|peak| (channel, peak)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Refreshes peak wavelengths from new labels; indices and intensities
    /// stay as detected.
    pub fn relabel(&mut self, wavelengths: &[f64]) {
        for channel in Channel::ALL {
            if let Some(peak) = self.slot_mut(channel).as_mut() {
                if let Some(&wavelength) = wavelengths.get(peak.index) {
                    peak.wavelength = wavelength;
                }
            }
        }
    }

    fn slot(&self, channel: Channel) -> &Option<Peak> {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
            Channel::Intensity => &self.total,
        }
    }

    fn slot_mut(&mut self, channel: Channel) -> &mut Option<Peak> {
        match channel {
            Channel::Red => &mut self.red,
            Channel::Green => &mut self.green,
            Channel::Blue => &mut self.blue,
            Channel::Intensity => &mut self.total,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PeakDetector {
    threshold: f64,
}

impl Default for PeakDetector {
    fn default() -> Self {
        Self { threshold: DEFAULT_NOISE_THRESHOLD }
    }
}

impl PeakDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Peak of one channel; `values` and `wavelengths` must be parallel.
    pub fn detect_channel(&self, values: &[f64], wavelengths: &[f64]) -> Option<Peak> {
        let (index, intensity) = strongest_sample(values)?;
        if !(intensity > self.threshold) {
            return None;
        }
        let wavelength = *wavelengths.get(index)?;
        Some(Peak { index, wavelength, intensity })
    }

    pub fn detect(&self, spectrum: &Spectrum, wavelengths: &[f64]) -> Result<PeakSet> {
        spectrum.validate()?;
        if wavelengths.len() != spectrum.len() {
            return Err(SpectrumError::MalformedInput(format!(
                "{} wavelengths for {} samples",
                wavelengths.len(),
                spectrum.len()
            )));
        }
        Ok(self.scan(spectrum, wavelengths))
    }

    /// Detection on input already known to be parallel.
    pub(crate) fn scan(&self, spectrum: &Spectrum, wavelengths: &[f64]) -> PeakSet {
        let mut peaks = PeakSet::default();
        for channel in Channel::ALL {
            let peak = self.detect_channel(channel.values(spectrum), wavelengths);
            if peak.is_none() {
                debug!("No {} peak above {}", channel, self.threshold);
            }
            peaks.set(channel, peak);
        }
        peaks
    }
}
