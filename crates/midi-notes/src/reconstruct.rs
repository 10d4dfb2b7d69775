use std::collections::HashMap;

use crate::event::{RawEvent, RawEventKind, TickTiming};
use crate::note::Note;

/// Pair raw on/off messages into notes with absolute seconds.
///
/// Each pitch has a single "currently held" slot: a second NoteOn for a
/// held pitch replaces the earlier hold, so the most recent onset wins. A
/// NoteOff (or vel-0 NoteOn) for a pitch that is not held is ignored, and
/// holds still open when the events run out are never emitted — both are
/// accepted degradation for malformed streams, not errors. A pitch closed
/// on the very tick it started is dropped as degenerate.
///
/// Output is in completion order; callers sort by start time.
pub fn reconstruct_notes(events: &[RawEvent], timing: &TickTiming) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut current_tick: u64 = 0;
    // pitch → (onset tick, velocity)
    let mut held: HashMap<u8, (u64, u8)> = HashMap::new();

    for event in events {
        current_tick += event.tick_delta as u64;

        match event.kind {
            RawEventKind::NoteOn if event.velocity > 0 => {
                held.insert(event.pitch, (current_tick, event.velocity));
            }
            // vel-0 NoteOn is a NoteOff in disguise
            RawEventKind::NoteOn | RawEventKind::NoteOff => {
                if let Some((onset, velocity)) = held.remove(&event.pitch) {
                    if current_tick > onset {
                        notes.push(Note {
                            pitch: event.pitch,
                            velocity,
                            start: timing.seconds(onset),
                            end: timing.seconds(current_tick),
                        });
                    }
                }
            }
        }
    }

    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn on(pitch: u8, velocity: u8, tick_delta: u32) -> RawEvent {
        RawEvent {
            kind: RawEventKind::NoteOn,
            pitch,
            velocity,
            tick_delta,
        }
    }

    fn off(pitch: u8, tick_delta: u32) -> RawEvent {
        RawEvent {
            kind: RawEventKind::NoteOff,
            pitch,
            velocity: 0,
            tick_delta,
        }
    }

    fn timing() -> TickTiming {
        TickTiming::new(480, 500_000)
    }

    #[test]
    fn well_formed_pairs_reconstruct_exactly() {
        // C4, E4, G4, each a beat long back to back
        let events = vec![
            on(60, 100, 0),
            off(60, 480),
            on(64, 90, 0),
            off(64, 480),
            on(67, 80, 0),
            off(67, 480),
        ];

        let notes = reconstruct_notes(&events, &timing());
        assert_eq!(notes.len(), 3);

        // durations come out of the tick formula exactly
        assert_eq!(notes[0].start, 0.0);
        assert_eq!(notes[0].end, 0.5);
        assert_eq!(notes[1].start, 0.5);
        assert_eq!(notes[1].end, 1.0);
        assert_eq!(notes[2].duration(), 0.5);

        assert_eq!(notes[0].velocity, 100);
        assert_eq!(notes[2].pitch, 67);
    }

    #[test]
    fn overlapping_pitches_pair_independently() {
        let events = vec![
            on(60, 100, 0),
            on(64, 100, 240),
            off(60, 240),
            off(64, 240),
        ];

        let notes = reconstruct_notes(&events, &timing());
        assert_eq!(notes.len(), 2);

        let c4 = notes.iter().find(|n| n.pitch == 60).unwrap();
        let e4 = notes.iter().find(|n| n.pitch == 64).unwrap();
        assert_eq!(c4.start, 0.0);
        assert_eq!(c4.end, 0.5);
        assert_eq!(e4.start, 0.25);
        assert_eq!(e4.end, 0.75);
    }

    #[test]
    fn double_note_on_keeps_most_recent_onset() {
        let events = vec![on(60, 50, 0), on(60, 90, 480), off(60, 480)];

        let notes = reconstruct_notes(&events, &timing());
        // the first hold is abandoned, only the overwrite survives
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].start, 0.5);
        assert_eq!(notes[0].end, 1.0);
        assert_eq!(notes[0].velocity, 90);
    }

    #[test]
    fn velocity_zero_note_on_closes() {
        let events = vec![on(72, 100, 0), on(72, 0, 480)];

        let notes = reconstruct_notes(&events, &timing());
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].duration(), 0.5);
    }

    #[test]
    fn orphan_note_off_is_ignored() {
        let events = vec![off(60, 0), on(64, 100, 0), off(64, 480), off(64, 10)];

        let notes = reconstruct_notes(&events, &timing());
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].pitch, 64);
    }

    #[test]
    fn unclosed_hold_is_never_emitted() {
        let events = vec![on(60, 100, 0), off(60, 480), on(64, 100, 0)];

        let notes = reconstruct_notes(&events, &timing());
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].pitch, 60);
    }

    #[test]
    fn same_tick_close_is_dropped() {
        let events = vec![on(60, 100, 0), off(60, 0), on(62, 100, 0), off(62, 480)];

        let notes = reconstruct_notes(&events, &timing());
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].pitch, 62);
        assert!(notes[0].end > notes[0].start);
    }

    #[test]
    fn empty_events() {
        assert!(reconstruct_notes(&[], &timing()).is_empty());
    }
}
