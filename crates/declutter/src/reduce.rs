use midi_notes::Note;

use crate::config::{ChordPolicy, PitchWindow};
use crate::range;

/// Velocity assigned to kept notes when normalization is on.
pub const REFERENCE_VELOCITY: u8 = 100;

/// Select at most `max_notes` survivors from one simultaneity group.
///
/// Dropped notes are gone for good. Passing a window as `clamp` octave-fits
/// the survivors immediately instead of leaving that to a later range pass.
/// Output size is always `min(chord_len, max_notes)`.
pub fn reduce_chord(
    chord: Vec<Note>,
    max_notes: usize,
    policy: ChordPolicy,
    normalize_velocity: bool,
    clamp: Option<PitchWindow>,
) -> Vec<Note> {
    let mut kept = match policy {
        ChordPolicy::Loudness => by_loudness(chord, max_notes),
        ChordPolicy::Span => by_span(chord, max_notes),
    };

    if normalize_velocity {
        for note in &mut kept {
            note.velocity = REFERENCE_VELOCITY;
        }
    }

    if let Some(window) = clamp {
        for note in &mut kept {
            note.pitch = range::fit_pitch(note.pitch as i32, window);
        }
    }

    kept
}

/// Louder first; equal velocities keep the lower pitch first.
fn by_loudness(mut chord: Vec<Note>, max_notes: usize) -> Vec<Note> {
    chord.sort_by(|a, b| b.velocity.cmp(&a.velocity).then(a.pitch.cmp(&b.pitch)));
    chord.truncate(max_notes);
    chord
}

/// Keep the outer voicing, then fill from the middle in pitch order.
///
/// A budget of one cannot hold both edges; the top note wins, since a
/// one-voice reduction is a melody line.
fn by_span(mut chord: Vec<Note>, max_notes: usize) -> Vec<Note> {
    chord.sort_by_key(|n| n.pitch);

    if chord.len() <= max_notes {
        return chord;
    }
    if max_notes == 1 {
        return vec![chord[chord.len() - 1].clone()];
    }

    let mut kept = Vec::with_capacity(max_notes);
    kept.push(chord[0].clone());
    kept.extend(chord[1..chord.len() - 1].iter().take(max_notes - 2).cloned());
    kept.push(chord[chord.len() - 1].clone());
    kept
}
