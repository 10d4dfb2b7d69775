use serde::{Deserialize, Serialize};

/// A reconstructed note with absolute timing in seconds.
///
/// Invariant: `end > start`. Reconstruction never emits a note that
/// violates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: u8,
    pub velocity: u8,
    pub start: f64,
    pub end: f64,
}

impl Note {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn pitch_class(&self) -> u8 {
        self.pitch % 12
    }
}

/// An ordered sequence of notes plus a display name; the unit of
/// selection and processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NoteTrack {
    pub name: Option<String>,
    pub notes: Vec<Note>,
}

impl NoteTrack {
    pub fn display_name(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Track {}", index))
    }
}

/// Summary statistics for a track's notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackStats {
    pub note_count: usize,
    pub pitch_min: u8,
    pub pitch_max: u8,
    pub mean_pitch: f64,
}

impl TrackStats {
    pub fn from_notes(notes: &[Note]) -> Self {
        if notes.is_empty() {
            return Self {
                note_count: 0,
                pitch_min: 0,
                pitch_max: 0,
                mean_pitch: 0.0,
            };
        }

        let pitch_min = notes.iter().map(|n| n.pitch).min().unwrap_or(0);
        let pitch_max = notes.iter().map(|n| n.pitch).max().unwrap_or(0);
        let mean_pitch = notes.iter().map(|n| n.pitch as f64).sum::<f64>() / notes.len() as f64;

        Self {
            note_count: notes.len(),
            pitch_min,
            pitch_max,
            mean_pitch,
        }
    }
}
