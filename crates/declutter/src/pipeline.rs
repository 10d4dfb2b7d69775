use midi_notes::{reconstruct_notes, Note, NoteTrack, RawTrack, TickTiming, TrackStats};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{ConfigError, PipelineConfig, ProcessingMode};
use crate::group::group_chords;
use crate::key::detect_tonic;
use crate::range::{center_preserving_remap, clamp_track};
use crate::reduce::reduce_chord;

/// A processing failure confined to one track. The rest of the batch
/// completes normally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackError {
    #[error("pitch {pitch} escaped the {low}..={high} window")]
    PitchOutsideWindow { pitch: u8, low: u8, high: u8 },
    #[error("notes left unsorted after processing")]
    UnsortedOutput,
}

/// Outcome for one input track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackReport {
    pub index: usize,
    pub name: Option<String>,
    /// Whether the track was selected for processing.
    pub processed: bool,
    /// Statistics of the reconstructed input, before any stage ran.
    pub stats: TrackStats,
    /// Tonic pitch class recorded by the preserve-key modes. Carried for
    /// callers; the octave fit does not consult it.
    pub tonic: Option<u8>,
    pub outcome: Result<NoteTrack, TrackError>,
}

/// Batch result: one report per input track, plus the timing echoed for a
/// container writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub timing: TickTiming,
    pub tracks: Vec<TrackReport>,
}

impl BatchReport {
    /// Surviving tracks in input order, ready for the writer.
    pub fn output_tracks(&self) -> Vec<NoteTrack> {
        self.tracks
            .iter()
            .filter_map(|report| report.outcome.as_ref().ok().cloned())
            .collect()
    }
}

/// Run the configured pipeline over every track.
///
/// Configuration is rejected up front; after that a failure in one track
/// is recorded in its report and the rest of the batch continues.
/// Unselected tracks are reconstructed and passed through untouched.
pub fn process_tracks(
    raw_tracks: &[RawTrack],
    timing: TickTiming,
    config: &PipelineConfig,
) -> Result<BatchReport, ConfigError> {
    config.validate(raw_tracks.len())?;

    let mut reports = Vec::with_capacity(raw_tracks.len());

    for (index, raw) in raw_tracks.iter().enumerate() {
        let mut notes = reconstruct_notes(&raw.events, &timing);
        sort_notes(&mut notes);
        let stats = TrackStats::from_notes(&notes);

        let selected = config.tracks.selects(index);
        let mut tonic = None;

        let outcome = if selected {
            if config.mode.preserves_key() {
                tonic = config.tonic.or_else(|| detect_tonic(&notes));
            }

            match run_stages(notes, config) {
                Ok(notes) => {
                    info!(
                        track = index,
                        notes_in = stats.note_count,
                        notes_out = notes.len(),
                        "track processed"
                    );
                    Ok(NoteTrack {
                        name: raw.name.clone(),
                        notes,
                    })
                }
                Err(error) => {
                    warn!(track = index, %error, "track failed, continuing batch");
                    Err(error)
                }
            }
        } else {
            Ok(NoteTrack {
                name: raw.name.clone(),
                notes,
            })
        };

        reports.push(TrackReport {
            index,
            name: raw.name.clone(),
            processed: selected,
            stats,
            tonic,
            outcome,
        });
    }

    Ok(BatchReport {
        timing,
        tracks: reports,
    })
}

/// Stage chain for one selected track.
fn run_stages(notes: Vec<Note>, config: &PipelineConfig) -> Result<Vec<Note>, TrackError> {
    let mode = config.mode;

    let mut notes = if mode.declutters() {
        let clamp = (mode.remaps() && config.clamp_in_reduce).then_some(config.window);
        let mut reduced = Vec::with_capacity(notes.len());
        for chord in group_chords(notes, config.tolerance) {
            reduced.extend(reduce_chord(
                chord,
                config.max_simultaneous,
                config.chord_policy,
                config.normalize_velocity,
                clamp,
            ));
        }
        reduced
    } else {
        notes
    };

    notes = match mode {
        ProcessingMode::DeclutterOnly => notes,
        ProcessingMode::RemapOnly | ProcessingMode::DeclutterThenRemap => {
            clamp_track(notes, config.window)
        }
        ProcessingMode::RemapPreservingKey | ProcessingMode::DeclutterThenRemapPreservingKey => {
            center_preserving_remap(notes, config.window)
        }
    };

    // reduction reorders within a chord; restore the track invariant
    sort_notes(&mut notes);
    verify(&notes, config)?;

    Ok(notes)
}

fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.pitch.cmp(&b.pitch)));
}

fn verify(notes: &[Note], config: &PipelineConfig) -> Result<(), TrackError> {
    if config.mode.remaps() {
        if let Some(note) = notes.iter().find(|n| !config.window.contains(n.pitch)) {
            return Err(TrackError::PitchOutsideWindow {
                pitch: note.pitch,
                low: config.window.low,
                high: config.window.high,
            });
        }
    }

    if notes.windows(2).any(|pair| pair[0].start > pair[1].start) {
        return Err(TrackError::UnsortedOutput);
    }

    Ok(())
}
