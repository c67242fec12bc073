pub mod engine;
pub mod envelope;
pub mod oscillator;
pub mod parameters;
pub mod trigger;
pub mod voice;
pub mod voice_pool;
