use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Oscillator waveform for the monitor synth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    Sawtooth,
    Square,
}

impl Waveform {
    /// Convert to u8 for atomic storage
    pub fn to_u8(self) -> u8 {
        match self {
            Waveform::Sine => 0,
            Waveform::Triangle => 1,
            Waveform::Sawtooth => 2,
            Waveform::Square => 3,
        }
    }

    /// Convert from atomic storage, unknown values fall back to Sine
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Waveform::Triangle,
            2 => Waveform::Sawtooth,
            3 => Waveform::Square,
            _ => Waveform::Sine,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Triangle => "triangle",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Square => "square",
        }
    }

    /// Sample at a phase in 0.0..1.0, range -1.0..=1.0
    pub fn generate(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (phase * 2.0 * PI).sin(),
            Waveform::Triangle => {
                if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    3.0 - 4.0 * phase
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8_storage_round_trip() {
        for wf in [
            Waveform::Sine,
            Waveform::Triangle,
            Waveform::Sawtooth,
            Waveform::Square,
        ] {
            assert_eq!(Waveform::from_u8(wf.to_u8()), wf);
        }
        assert_eq!(Waveform::from_u8(42), Waveform::Sine);
    }

    #[test]
    fn test_triangle_range() {
        let wf = Waveform::Triangle;
        assert!((wf.generate(0.0) - (-1.0)).abs() < 0.001);
        assert!((wf.generate(0.25) - 0.0).abs() < 0.001);
        assert!((wf.generate(0.5) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_square() {
        let wf = Waveform::Square;
        assert_eq!(wf.generate(0.0), 1.0);
        assert_eq!(wf.generate(0.49), 1.0);
        assert_eq!(wf.generate(0.5), -1.0);
    }

    #[test]
    fn test_deserialize_lowercase() {
        let wf: Waveform = serde_yaml::from_str("sawtooth").unwrap();
        assert_eq!(wf, Waveform::Sawtooth);
    }
}
