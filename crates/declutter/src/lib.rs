pub mod config;
pub mod group;
pub mod key;
pub mod pipeline;
pub mod range;
pub mod reduce;

pub use config::{
    ChordPolicy, ConfigError, PipelineConfig, PitchWindow, ProcessingMode, TrackSelection,
};
pub use group::group_chords;
pub use key::detect_tonic;
pub use pipeline::{process_tracks, BatchReport, TrackError, TrackReport};
pub use range::{center_octave_shift, center_preserving_remap, clamp_track};
pub use reduce::{reduce_chord, REFERENCE_VELOCITY};
