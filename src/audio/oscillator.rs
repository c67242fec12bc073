use crate::types::waveform::Waveform;

/// Phase-accumulating oscillator
pub struct Oscillator {
    /// Current phase position (0.0 to 1.0)
    phase: f32,
    /// Phase increment per sample (frequency / sample_rate)
    phase_delta: f32,
    frequency: f32,
    sample_rate: f32,
    waveform: Waveform,
}

impl Oscillator {
    pub fn new(sample_rate: f32) -> Self {
        let mut osc = Self {
            phase: 0.0,
            phase_delta: 0.0,
            frequency: 440.0,
            sample_rate,
            waveform: Waveform::Sine,
        };
        osc.update_phase_delta();
        osc
    }

    pub fn set_frequency(&mut self, freq: f32) {
        self.frequency = freq;
        self.update_phase_delta();
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    fn update_phase_delta(&mut self) {
        self.phase_delta = self.frequency / self.sample_rate;
    }

    /// Generate next sample and advance phase
    pub fn next_sample(&mut self) -> f32 {
        let output = self.waveform.generate(self.phase);

        self.phase += self.phase_delta;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }

        output
    }

    /// Reset phase to zero
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_phase_zero() {
        let mut osc = Oscillator::new(44100.0);
        osc.set_waveform(Waveform::Sawtooth);
        assert!((osc.next_sample() - (-1.0)).abs() < 0.001);
    }

    #[test]
    fn test_phase_wraps() {
        // One cycle every 4 samples
        let mut osc = Oscillator::new(4.0);
        osc.set_frequency(1.0);
        osc.set_waveform(Waveform::Square);

        let samples: Vec<f32> = (0..8).map(|_| osc.next_sample()).collect();
        assert_eq!(samples, vec![1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_reset() {
        let mut osc = Oscillator::new(44100.0);
        osc.set_waveform(Waveform::Sawtooth);
        for _ in 0..100 {
            osc.next_sample();
        }
        osc.reset();
        assert!((osc.next_sample() - (-1.0)).abs() < 0.001);
    }
}
