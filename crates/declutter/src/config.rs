use serde::{Deserialize, Serialize};

/// Which stages run for a selected track, and in what order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    /// Reduce chords only; pitches stay where they are.
    DeclutterOnly,
    /// Octave-fit every note independently; no chord reduction.
    RemapOnly,
    /// Reduce chords, then octave-fit note by note.
    DeclutterThenRemap,
    /// Octave-fit with one uniform track-level shift first.
    RemapPreservingKey,
    /// Reduce chords, then the uniform-shift remap.
    DeclutterThenRemapPreservingKey,
}

impl ProcessingMode {
    pub fn declutters(&self) -> bool {
        matches!(
            self,
            Self::DeclutterOnly | Self::DeclutterThenRemap | Self::DeclutterThenRemapPreservingKey
        )
    }

    pub fn remaps(&self) -> bool {
        !matches!(self, Self::DeclutterOnly)
    }

    pub fn preserves_key(&self) -> bool {
        matches!(
            self,
            Self::RemapPreservingKey | Self::DeclutterThenRemapPreservingKey
        )
    }
}

/// How a chord over the polyphony budget picks its survivors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordPolicy {
    /// Louder notes first; velocity ties broken by lower pitch.
    Loudness,
    /// Keep the outer voicing (lowest and highest), fill from the middle.
    Span,
}

/// Which tracks the pipeline touches. Unselected tracks pass through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackSelection {
    All,
    Indices(Vec<usize>),
}

impl TrackSelection {
    pub fn selects(&self, index: usize) -> bool {
        match self {
            Self::All => true,
            Self::Indices(indices) => indices.contains(&index),
        }
    }
}

/// Inclusive playable pitch window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchWindow {
    pub low: u8,
    pub high: u8,
}

impl Default for PitchWindow {
    /// C3–C6, the three-octave playable window.
    fn default() -> Self {
        Self { low: 48, high: 84 }
    }
}

impl PitchWindow {
    pub fn contains(&self, pitch: u8) -> bool {
        (self.low..=self.high).contains(&pitch)
    }

    /// Center of the window, the target of the uniform-shift remap.
    pub fn midpoint(&self) -> f64 {
        (self.low as f64 + self.high as f64) / 2.0
    }
}

/// Caller-supplied pipeline settings, validated before any processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub mode: ProcessingMode,
    pub tracks: TrackSelection,
    /// Polyphony cap per simultaneity window.
    pub max_simultaneous: usize,
    /// Chord grouping window in seconds.
    pub tolerance: f64,
    pub window: PitchWindow,
    pub chord_policy: ChordPolicy,
    /// Reset kept velocities to the reference value after reduction.
    pub normalize_velocity: bool,
    /// Octave-fit survivors during reduction instead of waiting for the
    /// range pass. Only takes effect in modes that remap.
    pub clamp_in_reduce: bool,
    /// Tonic pitch class (0–11) for the preserve-key modes; detected from
    /// the notes when absent. Recorded in the track report, not consulted
    /// by the octave fit.
    pub tonic: Option<u8>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: ProcessingMode::DeclutterThenRemap,
            tracks: TrackSelection::All,
            max_simultaneous: 6,
            tolerance: 0.02,
            window: PitchWindow::default(),
            chord_policy: ChordPolicy::Loudness,
            normalize_velocity: false,
            clamp_in_reduce: false,
            tonic: None,
        }
    }
}

/// Configuration rejected before any processing, naming the bad value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("track selection is empty")]
    EmptySelection,
    #[error("track index {index} out of range for {track_count} tracks")]
    TrackIndexOutOfRange { index: usize, track_count: usize },
    #[error("max_simultaneous must be at least 1")]
    ZeroPolyphony,
    #[error("tolerance must be finite and non-negative, got {0}")]
    BadTolerance(f64),
    #[error("pitch window {low}..={high} is inverted")]
    InvertedWindow { low: u8, high: u8 },
    #[error("pitch window {low}..={high} spans less than an octave")]
    NarrowWindow { low: u8, high: u8 },
    #[error("pitch window high {0} exceeds the MIDI pitch range")]
    WindowBeyondMidiRange(u8),
    #[error("tonic pitch class must be 0-11, got {0}")]
    TonicOutOfRange(u8),
}

impl PipelineConfig {
    /// Check every field against `track_count` before the pipeline runs.
    /// No partial processing happens on a bad configuration.
    pub fn validate(&self, track_count: usize) -> Result<(), ConfigError> {
        if let TrackSelection::Indices(indices) = &self.tracks {
            if indices.is_empty() {
                return Err(ConfigError::EmptySelection);
            }
            if let Some(&index) = indices.iter().find(|&&i| i >= track_count) {
                return Err(ConfigError::TrackIndexOutOfRange { index, track_count });
            }
        }

        if self.max_simultaneous == 0 {
            return Err(ConfigError::ZeroPolyphony);
        }

        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::BadTolerance(self.tolerance));
        }

        let PitchWindow { low, high } = self.window;
        if low > high {
            return Err(ConfigError::InvertedWindow { low, high });
        }
        if high > 127 {
            return Err(ConfigError::WindowBeyondMidiRange(high));
        }
        // octave stepping cannot terminate inside a sub-octave window
        if high - low < 11 {
            return Err(ConfigError::NarrowWindow { low, high });
        }

        if let Some(tonic) = self.tonic {
            if tonic > 11 {
                return Err(ConfigError::TonicOutOfRange(tonic));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(PipelineConfig::default().validate(4), Ok(()));
    }

    #[test]
    fn empty_selection_rejected() {
        let config = PipelineConfig {
            tracks: TrackSelection::Indices(vec![]),
            ..Default::default()
        };
        assert_eq!(config.validate(4), Err(ConfigError::EmptySelection));
    }

    #[test]
    fn out_of_range_index_rejected() {
        let config = PipelineConfig {
            tracks: TrackSelection::Indices(vec![0, 7]),
            ..Default::default()
        };
        assert_eq!(
            config.validate(4),
            Err(ConfigError::TrackIndexOutOfRange {
                index: 7,
                track_count: 4
            })
        );
    }

    #[test]
    fn zero_polyphony_rejected() {
        let config = PipelineConfig {
            max_simultaneous: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(1), Err(ConfigError::ZeroPolyphony));
    }

    #[test]
    fn bad_tolerance_rejected() {
        for tolerance in [-0.01, f64::NAN, f64::INFINITY] {
            let config = PipelineConfig {
                tolerance,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(1),
                Err(ConfigError::BadTolerance(_))
            ));
        }
    }

    #[test]
    fn inverted_window_rejected() {
        let config = PipelineConfig {
            window: PitchWindow { low: 84, high: 48 },
            ..Default::default()
        };
        assert_eq!(
            config.validate(1),
            Err(ConfigError::InvertedWindow { low: 84, high: 48 })
        );
    }

    #[test]
    fn sub_octave_window_rejected() {
        let config = PipelineConfig {
            window: PitchWindow { low: 60, high: 65 },
            ..Default::default()
        };
        assert_eq!(
            config.validate(1),
            Err(ConfigError::NarrowWindow { low: 60, high: 65 })
        );
    }

    #[test]
    fn window_above_midi_range_rejected() {
        let config = PipelineConfig {
            window: PitchWindow {
                low: 120,
                high: 140,
            },
            ..Default::default()
        };
        assert_eq!(
            config.validate(1),
            Err(ConfigError::WindowBeyondMidiRange(140))
        );
    }

    #[test]
    fn bad_tonic_rejected() {
        let config = PipelineConfig {
            tonic: Some(12),
            ..Default::default()
        };
        assert_eq!(config.validate(1), Err(ConfigError::TonicOutOfRange(12)));
    }

    #[test]
    fn selection_membership() {
        assert!(TrackSelection::All.selects(9));
        let some = TrackSelection::Indices(vec![1, 3]);
        assert!(some.selects(3));
        assert!(!some.selects(2));
    }

    #[test]
    fn window_midpoint_of_default() {
        assert_eq!(PitchWindow::default().midpoint(), 66.0);
    }
}
