use midi_notes::Note;

/// Partition start-sorted notes into simultaneity groups.
///
/// A chord accumulates notes while each start lies within `tolerance` of
/// the chord's *first* note. Anchoring on the first note keeps a long run
/// of closely spaced starts from drifting into one giant chord, which a
/// chained predecessor comparison would allow.
///
/// Every input note lands in exactly one chord, in order.
pub fn group_chords(notes: Vec<Note>, tolerance: f64) -> Vec<Vec<Note>> {
    let mut chords: Vec<Vec<Note>> = Vec::new();
    let mut current: Vec<Note> = Vec::new();
    let mut anchor = 0.0_f64;

    for note in notes {
        if current.is_empty() || note.start - anchor <= tolerance {
            if current.is_empty() {
                anchor = note.start;
            }
            current.push(note);
        } else {
            chords.push(std::mem::take(&mut current));
            anchor = note.start;
            current.push(note);
        }
    }

    if !current.is_empty() {
        chords.push(current);
    }

    chords
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn note(pitch: u8, start: f64) -> Note {
        Note {
            pitch,
            velocity: 100,
            start,
            end: start + 0.5,
        }
    }

    #[test]
    fn simultaneous_starts_form_one_chord() {
        let notes = vec![note(60, 0.0), note(64, 0.0), note(67, 0.01)];
        let chords = group_chords(notes, 0.02);

        assert_eq!(chords.len(), 1);
        assert_eq!(chords[0].len(), 3);
    }

    #[test]
    fn gap_beyond_tolerance_splits() {
        let notes = vec![note(60, 0.0), note(64, 0.0), note(62, 0.5), note(65, 0.5)];
        let chords = group_chords(notes, 0.02);

        assert_eq!(chords.len(), 2);
        assert_eq!(chords[0].len(), 2);
        assert_eq!(chords[1].len(), 2);
    }

    #[test]
    fn anchor_is_first_note_not_predecessor() {
        // 0.015-spaced starts: each within tolerance of its predecessor,
        // but the third is 0.03 past the anchor and must open a new chord
        let notes = vec![note(60, 0.0), note(62, 0.015), note(64, 0.03)];
        let chords = group_chords(notes, 0.02);

        assert_eq!(chords.len(), 2);
        assert_eq!(chords[0].len(), 2);
        assert_eq!(chords[1].len(), 1);
        assert_eq!(chords[1][0].pitch, 64);
    }

    #[test]
    fn every_note_lands_exactly_once() {
        let notes: Vec<Note> = (0..50)
            .map(|i| note(60 + (i % 12) as u8, i as f64 * 0.011))
            .collect();
        let chords = group_chords(notes.clone(), 0.02);

        let regrouped: Vec<Note> = chords.into_iter().flatten().collect();
        assert_eq!(regrouped, notes);
    }

    #[test]
    fn zero_tolerance_groups_exact_starts_only() {
        let notes = vec![note(60, 0.0), note(64, 0.0), note(67, 0.001)];
        let chords = group_chords(notes, 0.0);

        assert_eq!(chords.len(), 2);
    }

    #[test]
    fn empty_input() {
        assert!(group_chords(vec![], 0.02).is_empty());
    }
}
