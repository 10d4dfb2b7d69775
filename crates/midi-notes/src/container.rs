use midly::{MetaMessage, MidiMessage, Smf, TrackEventKind};

use crate::event::{RawEvent, RawEventKind, RawTrack, TickTiming, DEFAULT_MICROSECONDS_PER_BEAT};
use crate::note::NoteTrack;
use crate::{Error, Result};

/// Read an SMF container into raw event tracks plus the global timing.
///
/// The first tempo meta anywhere in the file wins and applies globally;
/// later tempo changes are ignored. Messages other than note on/off are
/// dropped with their deltas folded into the next kept event, so absolute
/// positions survive. Timecode headers fall back to 480 ticks per beat.
pub fn read_smf(bytes: &[u8]) -> Result<(Vec<RawTrack>, TickTiming)> {
    let smf = Smf::parse(bytes).map_err(|e| Error::MidiParse(e.to_string()))?;

    let ticks_per_beat = match smf.header.timing {
        midly::Timing::Metrical(ticks) => ticks.as_int(),
        midly::Timing::Timecode(_, _) => 480,
    };

    let mut microseconds_per_beat: Option<u32> = None;
    let mut tracks = Vec::with_capacity(smf.tracks.len());

    for track in &smf.tracks {
        let mut raw = RawTrack::default();
        let mut current_tick: u64 = 0;
        let mut last_emitted_tick: u64 = 0;

        for event in track {
            current_tick += event.delta.as_int() as u64;

            match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => {
                    if microseconds_per_beat.is_none() {
                        microseconds_per_beat = Some(tempo.as_int());
                    }
                }
                TrackEventKind::Meta(MetaMessage::TrackName(name)) => {
                    if raw.name.is_none() {
                        raw.name = String::from_utf8(name.to_vec()).ok();
                    }
                }
                TrackEventKind::Midi { message, .. } => {
                    let (kind, pitch, velocity) = match message {
                        MidiMessage::NoteOn { key, vel } => {
                            (RawEventKind::NoteOn, key.as_int(), vel.as_int())
                        }
                        MidiMessage::NoteOff { key, vel } => {
                            (RawEventKind::NoteOff, key.as_int(), vel.as_int())
                        }
                        _ => continue,
                    };

                    raw.events.push(RawEvent {
                        kind,
                        pitch,
                        velocity,
                        tick_delta: (current_tick - last_emitted_tick) as u32,
                    });
                    last_emitted_tick = current_tick;
                }
                _ => {}
            }
        }

        tracks.push(raw);
    }

    let timing = TickTiming {
        ticks_per_beat,
        microseconds_per_beat: microseconds_per_beat.unwrap_or(DEFAULT_MICROSECONDS_PER_BEAT),
    };

    Ok((tracks, timing))
}

/// Write processed note tracks to SMF format-1 bytes.
///
/// Track 0 carries the tempo meta at tick zero; each note track follows
/// with an optional name meta and its note on/off pairs. Note-offs sort
/// before note-ons at the same tick so repeated pitches re-trigger
/// cleanly.
pub fn write_smf(tracks: &[NoteTrack], timing: &TickTiming) -> Vec<u8> {
    let mut chunks: Vec<Vec<u8>> = Vec::with_capacity(tracks.len() + 1);

    chunks.push(build_tempo_track(timing));
    for track in tracks {
        chunks.push(build_note_track(track, timing));
    }

    build_midi_file(timing.ticks_per_beat, &chunks)
}

/// Tempo meta at tick zero, then end of track.
fn build_tempo_track(timing: &TickTiming) -> Vec<u8> {
    let usec = timing.microseconds_per_beat;
    let mut track_data = Vec::new();

    write_vlq(&mut track_data, 0);
    track_data.extend_from_slice(&[
        0xFF,
        0x51,
        0x03,
        (usec >> 16) as u8,
        (usec >> 8) as u8,
        usec as u8,
    ]);

    write_vlq(&mut track_data, 0);
    track_data.extend_from_slice(&[0xFF, 0x2F, 0x00]);

    track_data
}

/// Re-encode one track's notes into delta-ticked channel messages.
fn build_note_track(track: &NoteTrack, timing: &TickTiming) -> Vec<u8> {
    let mut events: Vec<(u64, Vec<u8>)> = Vec::new();

    if let Some(name) = &track.name {
        let name_bytes = name.as_bytes();
        let mut name_event = vec![0xFF, 0x03];
        write_vlq(&mut name_event, name_bytes.len() as u32);
        name_event.extend_from_slice(name_bytes);
        events.push((0, name_event));
    }

    for note in &track.notes {
        events.push((
            timing.ticks(note.start),
            vec![0x90, note.pitch, note.velocity],
        ));
        events.push((timing.ticks(note.end), vec![0x80, note.pitch, 0]));
    }

    // Sort by tick, with note-offs before note-ons at the same tick
    events.sort_by(|a, b| {
        a.0.cmp(&b.0).then_with(|| {
            let a_is_off = a.1.first().is_some_and(|s| s & 0xF0 == 0x80);
            let b_is_off = b.1.first().is_some_and(|s| s & 0xF0 == 0x80);
            b_is_off.cmp(&a_is_off)
        })
    });

    let mut track_data = Vec::new();
    let mut last_tick = 0u64;

    for (tick, data) in events {
        let delta = tick.saturating_sub(last_tick);
        write_vlq(&mut track_data, delta as u32);
        track_data.extend_from_slice(&data);
        last_tick = tick;
    }

    write_vlq(&mut track_data, 0);
    track_data.extend_from_slice(&[0xFF, 0x2F, 0x00]);

    track_data
}

/// Assemble a complete MIDI file from track data blobs.
fn build_midi_file(ticks_per_beat: u16, tracks: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = Vec::new();

    // MThd header
    buf.extend_from_slice(b"MThd");
    buf.extend_from_slice(&6u32.to_be_bytes());
    buf.extend_from_slice(&1u16.to_be_bytes()); // format 1
    buf.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
    buf.extend_from_slice(&ticks_per_beat.to_be_bytes());

    // MTrk chunks
    for track_data in tracks {
        buf.extend_from_slice(b"MTrk");
        buf.extend_from_slice(&(track_data.len() as u32).to_be_bytes());
        buf.extend_from_slice(track_data);
    }

    buf
}

/// Write a variable-length quantity to a byte buffer.
fn write_vlq(buf: &mut Vec<u8>, mut value: u32) {
    if value == 0 {
        buf.push(0);
        return;
    }

    let mut bytes = Vec::new();
    bytes.push((value & 0x7F) as u8);
    value >>= 7;

    while value > 0 {
        bytes.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }

    bytes.reverse();
    buf.extend_from_slice(&bytes);
}
