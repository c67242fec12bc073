pub mod events;
pub mod note;
pub mod waveform;
