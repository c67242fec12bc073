use super::{envelope::Envelope, oscillator::Oscillator};
use crate::types::waveform::Waveform;

/// Single synthesizer voice
/// Signal chain: Oscillator -> Envelope -> velocity amplitude
pub struct Voice {
    oscillator: Oscillator,
    envelope: Envelope,
    amplitude: f32,
}

impl Voice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            oscillator: Oscillator::new(sample_rate),
            envelope: Envelope::new(sample_rate),
            amplitude: 0.0,
        }
    }

    /// Start the voice at a frequency and velocity amplitude
    pub fn note_on(&mut self, frequency: f32, amplitude: f32) {
        self.oscillator.set_frequency(frequency);
        // Phase reset gives every attack the same shape
        self.oscillator.reset();
        self.amplitude = amplitude.clamp(0.0, 1.0);
        self.envelope.note_on();
    }

    pub fn note_off(&mut self) {
        self.envelope.note_off();
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.oscillator.set_waveform(waveform);
    }

    pub fn set_adsr(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.envelope.set_adsr(attack, decay, sustain, release);
    }

    /// Sounding (attack through release)
    pub fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    pub fn is_releasing(&self) -> bool {
        self.envelope.is_releasing()
    }

    pub fn next_sample(&mut self) -> f32 {
        let signal = self.oscillator.next_sample();
        let level = self.envelope.next_sample();
        signal * level * self.amplitude
    }
}
