use crate::midi::decoder::{NoteLabel, RawMidiMessage};

/// Events sent from the MIDI input callbacks to the UI thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Bytes received on an input port
    Message {
        /// Index of the input port in the connected port list
        port: usize,
        /// Platform timestamp in microseconds
        timestamp_us: u64,
        raw: RawMidiMessage,
    },
}

/// Internal events sent from the UI thread to the audio thread
/// Must be simple and fast to construct/parse
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SynthEvent {
    /// Start a voice for the label
    NoteOn {
        label: NoteLabel,
        frequency: f32,
        amplitude: f32,
    },
    /// Release every voice holding the label
    NoteOff { label: NoteLabel },
    /// Release all voices (MIDI panic)
    AllNotesOff,
}

impl SynthEvent {
    /// Create a note on event
    pub fn note_on(label: NoteLabel, frequency: f32, amplitude: f32) -> Self {
        SynthEvent::NoteOn {
            label,
            frequency,
            amplitude,
        }
    }

    /// Create a note off event
    pub fn note_off(label: NoteLabel) -> Self {
        SynthEvent::NoteOff { label }
    }
}
