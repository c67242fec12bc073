//! Platform failures around MIDI and audio device access.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("MIDI access failed: {0}")]
    MidiInit(String),

    #[error("No MIDI input devices found")]
    NoInputDevices,

    #[error("No MIDI input device matches '{0}'")]
    NoMatchingInput(String),

    #[error("Failed to connect to MIDI port '{port}': {reason}")]
    Connect { port: String, reason: String },

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Unsupported sample format: {0}")]
    UnsupportedSampleFormat(String),
}

impl From<midir::InitError> for MonitorError {
    fn from(e: midir::InitError) -> Self {
        MonitorError::MidiInit(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
