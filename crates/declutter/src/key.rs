use midi_notes::Note;

/// Pick a tonic by majority vote over a duration-weighted pitch-class
/// histogram.
///
/// Returns the dominant pitch class (0–11, C=0), or `None` for an empty
/// track. Ties resolve to the lower pitch class so the vote is
/// deterministic. Container key-signature metadata, when a caller has it,
/// should win over this estimate.
pub fn detect_tonic(notes: &[Note]) -> Option<u8> {
    if notes.is_empty() {
        return None;
    }

    let mut histogram = [0.0_f64; 12];
    for note in notes {
        histogram[note.pitch_class() as usize] += note.duration();
    }

    let mut best = 0;
    for pc in 1..12 {
        if histogram[pc] > histogram[best] {
            best = pc;
        }
    }

    Some(best as u8)
}
