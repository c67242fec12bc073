use super::voice::Voice;
use crate::midi::decoder::NoteLabel;
use crate::types::waveform::Waveform;

/// Number of simultaneous voices supported
pub const MAX_VOICES: usize = 16;

/// Individual voice in the pool with the label it is playing
struct PoolVoice {
    voice: Voice,
    label: Option<NoteLabel>,
    /// Allocation order for stealing, lower = older
    age: u64,
}

impl PoolVoice {
    fn new(sample_rate: f32) -> Self {
        Self {
            voice: Voice::new(sample_rate),
            label: None,
            age: 0,
        }
    }

    fn is_idle(&self) -> bool {
        self.label.is_none()
    }

    fn is_releasing(&self) -> bool {
        self.label.is_some() && self.voice.is_releasing()
    }
}

/// Pool of voices keyed by note label
/// Pre-allocated, with idle > releasing > oldest allocation
pub struct VoicePool {
    voices: [PoolVoice; MAX_VOICES],
    next_age: u64,
}

impl VoicePool {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: std::array::from_fn(|_| PoolVoice::new(sample_rate)),
            next_age: 0,
        }
    }

    /// Start a voice for a label, stealing one if the pool is full
    pub fn note_on(&mut self, label: NoteLabel, frequency: f32, amplitude: f32) {
        let index = self.find_voice();

        let pool_voice = &mut self.voices[index];
        pool_voice.voice.note_on(frequency, amplitude);
        pool_voice.label = Some(label);
        pool_voice.age = self.next_age;
        self.next_age += 1;
    }

    /// Release every voice playing the label
    pub fn note_off(&mut self, label: NoteLabel) {
        for pool_voice in &mut self.voices {
            if pool_voice.label == Some(label) {
                pool_voice.voice.note_off();
            }
        }
    }

    /// Release all voices (MIDI panic)
    pub fn all_notes_off(&mut self) {
        for pool_voice in &mut self.voices {
            if !pool_voice.is_idle() {
                pool_voice.voice.note_off();
            }
        }
    }

    fn find_voice(&self) -> usize {
        if let Some(index) = self.voices.iter().position(PoolVoice::is_idle) {
            return index;
        }

        if let Some(index) = self.voices.iter().position(PoolVoice::is_releasing) {
            return index;
        }

        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.age)
            .map(|(index, _)| index)
            .unwrap_or(0)
    }

    pub fn set_adsr(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        for pool_voice in &mut self.voices {
            pool_voice.voice.set_adsr(attack, decay, sustain, release);
        }
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        for pool_voice in &mut self.voices {
            pool_voice.voice.set_waveform(waveform);
        }
    }

    /// Free voices whose envelope has finished
    fn reclaim_finished(&mut self) {
        for pool_voice in &mut self.voices {
            if !pool_voice.is_idle() && !pool_voice.voice.is_active() {
                pool_voice.label = None;
            }
        }
    }

    /// Render all voices into a mono buffer
    pub fn process(&mut self, output: &mut [f32]) {
        self.reclaim_finished();
        output.fill(0.0);

        for pool_voice in &mut self.voices {
            if !pool_voice.is_idle() {
                for sample in output.iter_mut() {
                    *sample += pool_voice.voice.next_sample();
                }
            }
        }

        // Keeps a full chord from clipping
        let scale = 1.0 / (MAX_VOICES as f32).sqrt();
        for sample in output.iter_mut() {
            *sample *= scale;
        }
    }

    /// Label held by each voice, None for idle voices
    pub fn voice_states(&self) -> [Option<NoteLabel>; MAX_VOICES] {
        std::array::from_fn(|i| self.voices[i].label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::decoder::note_label;

    fn active_count(pool: &VoicePool) -> usize {
        pool.voice_states().iter().filter(|s| s.is_some()).count()
    }

    #[test]
    fn test_voice_pool_starts_idle() {
        let pool = VoicePool::new(44100.0);
        assert_eq!(active_count(&pool), 0);
    }

    #[test]
    fn test_voice_allocation() {
        let mut pool = VoicePool::new(44100.0);

        pool.note_on(note_label(60), 261.63, 1.0);
        assert_eq!(active_count(&pool), 1);

        pool.note_on(note_label(64), 329.63, 1.0);
        assert_eq!(active_count(&pool), 2);
        assert!(pool.voice_states().contains(&Some(note_label(64))));
    }

    #[test]
    fn test_steals_oldest_when_full() {
        let mut pool = VoicePool::new(44100.0);
        for n in 0..MAX_VOICES as i32 {
            pool.note_on(note_label(40 + n), 440.0, 1.0);
        }
        pool.note_on(note_label(100), 440.0, 1.0);

        let states = pool.voice_states();
        assert_eq!(active_count(&pool), MAX_VOICES);
        assert!(states.contains(&Some(note_label(100))));
        assert!(!states.contains(&Some(note_label(40))));
    }

    #[test]
    fn test_note_off_frees_voice_after_release() {
        let mut pool = VoicePool::new(1000.0);
        pool.set_adsr(0.001, 0.001, 0.5, 0.01);
        pool.note_on(note_label(60), 100.0, 1.0);

        let mut buffer = [0.0f32; 64];
        pool.process(&mut buffer);
        pool.note_off(note_label(60));
        pool.process(&mut buffer);
        pool.process(&mut buffer);

        assert_eq!(active_count(&pool), 0);
    }

    #[test]
    fn test_all_notes_off() {
        let mut pool = VoicePool::new(1000.0);
        pool.set_adsr(0.001, 0.001, 0.5, 0.01);
        pool.note_on(note_label(60), 100.0, 1.0);
        pool.note_on(note_label(67), 150.0, 1.0);

        pool.all_notes_off();
        let mut buffer = [0.0f32; 64];
        pool.process(&mut buffer);
        pool.process(&mut buffer);

        assert_eq!(active_count(&pool), 0);
    }
}
