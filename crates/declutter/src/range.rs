use midi_notes::Note;

use crate::config::PitchWindow;

/// Move a pitch into the window by whole octaves.
///
/// Never changes the pitch class, so a note keeps its role in the key.
/// Signed input lets the uniform center shift pass through values outside
/// the MIDI range on the way in. Terminates for any window at least an
/// octave wide, which configuration validation guarantees.
pub(crate) fn fit_pitch(mut pitch: i32, window: PitchWindow) -> u8 {
    while pitch < window.low as i32 {
        pitch += 12;
    }
    while pitch > window.high as i32 {
        pitch -= 12;
    }
    pitch as u8
}

/// Octave-fit every note independently.
///
/// Fast, but two notes an octave apart in the source can land on the same
/// pitch; the uniform variant below avoids that where it matters.
pub fn clamp_track(notes: Vec<Note>, window: PitchWindow) -> Vec<Note> {
    notes
        .into_iter()
        .map(|mut note| {
            note.pitch = fit_pitch(note.pitch as i32, window);
            note
        })
        .collect()
}

/// Whole-octave shift (in semitones) that lands `mean_pitch` nearest the
/// window midpoint.
pub fn center_octave_shift(mean_pitch: f64, window: PitchWindow) -> i32 {
    ((window.midpoint() - mean_pitch) / 12.0).round() as i32 * 12
}

/// Shift the whole track by one uniform octave count toward the window
/// midpoint, then fit stragglers note by note.
///
/// The uniform shift keeps octave relationships between notes intact; only
/// notes still outside the window after it are folded individually.
pub fn center_preserving_remap(notes: Vec<Note>, window: PitchWindow) -> Vec<Note> {
    if notes.is_empty() {
        return notes;
    }

    let mean = notes.iter().map(|n| n.pitch as f64).sum::<f64>() / notes.len() as f64;
    let shift = center_octave_shift(mean, window);

    notes
        .into_iter()
        .map(|mut note| {
            note.pitch = fit_pitch(note.pitch as i32 + shift, window);
            note
        })
        .collect()
}
