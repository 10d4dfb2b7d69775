pub mod container;
pub mod event;
pub mod note;
pub mod reconstruct;

pub use container::{read_smf, write_smf};
pub use event::{RawEvent, RawEventKind, RawTrack, TickTiming};
pub use note::{Note, NoteTrack, TrackStats};
pub use reconstruct::reconstruct_notes;

/// Errors from container parsing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("MIDI parse error: {0}")]
    MidiParse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
