use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::config::SynthSettings;
use crate::types::waveform::Waveform;

/// Thread-safe parameter storage using atomic operations
/// Allows real-time audio thread to read parameters without blocking
pub struct SynthParameters {
    /// ADSR Attack time in seconds
    pub attack: AtomicF32,
    /// ADSR Decay time in seconds
    pub decay: AtomicF32,
    /// ADSR Sustain level (0.0 to 1.0)
    pub sustain: AtomicF32,
    /// ADSR Release time in seconds
    pub release: AtomicF32,
    /// Master gain (0.0 to 1.0)
    pub gain: AtomicF32,
    /// Waveform as stored by `Waveform::to_u8`
    pub waveform: AtomicU8,
    /// Output silence while set
    pub muted: AtomicBool,
}

impl SynthParameters {
    pub fn new() -> Self {
        Self {
            attack: AtomicF32::new(0.01),
            decay: AtomicF32::new(0.1),
            sustain: AtomicF32::new(0.7),
            release: AtomicF32::new(0.3),
            gain: AtomicF32::new(0.8),
            waveform: AtomicU8::new(Waveform::Sine.to_u8()),
            muted: AtomicBool::new(false),
        }
    }

    pub fn from_settings(settings: &SynthSettings) -> Self {
        let params = Self::new();
        params.attack.store(settings.attack, Ordering::Relaxed);
        params.decay.store(settings.decay, Ordering::Relaxed);
        params.sustain.store(settings.sustain, Ordering::Relaxed);
        params.release.store(settings.release, Ordering::Relaxed);
        params.gain.store(settings.gain, Ordering::Relaxed);
        params.set_waveform(settings.wave);
        params
    }

    pub fn waveform(&self) -> Waveform {
        Waveform::from_u8(self.waveform.load(Ordering::Relaxed))
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.waveform.store(waveform.to_u8(), Ordering::Relaxed);
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Relaxed)
    }

    /// Flip the mute flag, returns the new state
    pub fn toggle_mute(&self) -> bool {
        !self.muted.fetch_xor(true, Ordering::Relaxed)
    }
}

impl Default for SynthParameters {
    fn default() -> Self {
        Self::new()
    }
}

/// Atomic f32 wrapper for lock-free parameter updates
pub struct AtomicF32 {
    storage: AtomicU32,
}

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self {
            storage: AtomicU32::new(value.to_bits()),
        }
    }

    pub fn load(&self, ordering: Ordering) -> f32 {
        f32::from_bits(self.storage.load(ordering))
    }

    pub fn store(&self, value: f32, ordering: Ordering) {
        self.storage.store(value.to_bits(), ordering);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let settings = SynthSettings {
            attack: 0.2,
            gain: 0.5,
            wave: Waveform::Square,
            ..SynthSettings::default()
        };
        let params = SynthParameters::from_settings(&settings);
        assert_eq!(params.attack.load(Ordering::Relaxed), 0.2);
        assert_eq!(params.gain.load(Ordering::Relaxed), 0.5);
        assert_eq!(params.waveform(), Waveform::Square);
    }

    #[test]
    fn test_toggle_mute() {
        let params = SynthParameters::new();
        assert!(!params.is_muted());
        assert!(params.toggle_mute());
        assert!(params.is_muted());
        assert!(!params.toggle_mute());
        assert!(!params.is_muted());
    }
}
