use serde::{Deserialize, Serialize};

/// MIDI default tempo (120 BPM), used when no tempo meta is present.
pub const DEFAULT_MICROSECONDS_PER_BEAT: u32 = 500_000;

/// Kind of a raw timed channel message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawEventKind {
    NoteOn,
    NoteOff,
}

/// A note message with its tick delta relative to the previous event in
/// the same track. Immutable once read from the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub kind: RawEventKind,
    pub pitch: u8,
    pub velocity: u8,
    pub tick_delta: u32,
}

/// Global tick-to-seconds mapping: ticks per quarter note plus a single
/// tempo value applied to the whole batch. The first tempo encountered in
/// a container wins; mid-piece tempo changes are not modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickTiming {
    pub ticks_per_beat: u16,
    pub microseconds_per_beat: u32,
}

impl Default for TickTiming {
    fn default() -> Self {
        Self {
            ticks_per_beat: 480,
            microseconds_per_beat: DEFAULT_MICROSECONDS_PER_BEAT,
        }
    }
}

impl TickTiming {
    pub fn new(ticks_per_beat: u16, microseconds_per_beat: u32) -> Self {
        Self {
            ticks_per_beat,
            microseconds_per_beat,
        }
    }

    /// Absolute tick to absolute seconds.
    pub fn seconds(&self, tick: u64) -> f64 {
        tick as f64 * self.microseconds_per_beat as f64 / self.ticks_per_beat as f64 / 1_000_000.0
    }

    /// Absolute seconds back to the nearest absolute tick.
    pub fn ticks(&self, seconds: f64) -> u64 {
        (seconds * 1_000_000.0 * self.ticks_per_beat as f64 / self.microseconds_per_beat as f64)
            .round() as u64
    }

    pub fn bpm(&self) -> f64 {
        60_000_000.0 / self.microseconds_per_beat as f64
    }
}

/// One container track's worth of raw events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RawTrack {
    pub name: Option<String>,
    pub events: Vec<RawEvent>,
}
