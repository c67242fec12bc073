//! Note number and velocity conversions for the synth voices
//! Equal temperament, A440 tuning: MIDI note 69 = 440 Hz

use crate::midi::decoder::NoteLabel;

/// Convert a note number to frequency in Hz
/// f = 440 * 2^((n-69)/12)
pub fn note_number_to_frequency(note: i64) -> f32 {
    const A4: f32 = 440.0;
    const A4_MIDI: i64 = 69;

    let semitones = note - A4_MIDI;
    A4 * 2.0_f32.powf(semitones as f32 / 12.0)
}

/// Frequency of the note a label was decoded from
pub fn label_to_frequency(label: NoteLabel) -> f32 {
    note_number_to_frequency(label.note_number())
}

/// Convert MIDI velocity (0-127) to normalized amplitude (0.0-1.0)
pub fn velocity_to_amplitude(velocity: u8) -> f32 {
    (velocity as f32 / 127.0).clamp(0.0, 1.0)
}

/// Relative display size of a held note, 1.0 at velocity 0
pub fn velocity_to_note_size(velocity: u8) -> f32 {
    velocity as f32 / 50.0 + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::decoder::note_label;

    #[test]
    fn test_a440() {
        let freq = note_number_to_frequency(69);
        assert!((freq - 440.0).abs() < 0.01);
    }

    #[test]
    fn test_label_frequency_matches_note_number() {
        // Labelled C3 under the monitor's octave numbering
        let freq = label_to_frequency(note_label(60));
        assert!((freq - 261.63).abs() < 0.01);
    }

    #[test]
    fn test_octave_doubling() {
        let low = label_to_frequency(note_label(57));
        let mid = label_to_frequency(note_label(69));
        let high = label_to_frequency(note_label(81));

        assert!((mid / low - 2.0).abs() < 0.01);
        assert!((high / mid - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_velocity_conversion() {
        assert_eq!(velocity_to_amplitude(0), 0.0);
        assert_eq!(velocity_to_amplitude(127), 1.0);
        assert!((velocity_to_amplitude(64) - 0.504).abs() < 0.01);
        assert_eq!(velocity_to_amplitude(200), 1.0);
    }

    #[test]
    fn test_note_size() {
        assert_eq!(velocity_to_note_size(0), 1.0);
        assert_eq!(velocity_to_note_size(100), 3.0);
        assert!((velocity_to_note_size(127) - 3.54).abs() < 0.001);
    }
}
