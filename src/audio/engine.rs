use crossbeam_channel::Receiver;
use std::sync::{Arc, atomic::Ordering};

use super::{parameters::SynthParameters, voice_pool::{MAX_VOICES, VoicePool}};
use crate::midi::decoder::NoteLabel;
use crate::types::events::SynthEvent;

/// Synthesis engine for the monitor
/// Runs in the real-time audio thread - must stay lock-free
pub struct SynthEngine {
    voice_pool: VoicePool,
    parameters: Arc<SynthParameters>,
    event_rx: Receiver<SynthEvent>,
    mono: Vec<f32>,
}

impl SynthEngine {
    pub fn new(
        sample_rate: f32,
        parameters: Arc<SynthParameters>,
        event_rx: Receiver<SynthEvent>,
    ) -> Self {
        Self {
            voice_pool: VoicePool::new(sample_rate),
            parameters,
            event_rx,
            mono: vec![0.0; 1024],
        }
    }

    /// Label held by each voice
    pub fn voice_states(&self) -> [Option<NoteLabel>; MAX_VOICES] {
        self.voice_pool.voice_states()
    }

    fn apply_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                SynthEvent::NoteOn {
                    label,
                    frequency,
                    amplitude,
                } => self.voice_pool.note_on(label, frequency, amplitude),
                SynthEvent::NoteOff { label } => self.voice_pool.note_off(label),
                SynthEvent::AllNotesOff => self.voice_pool.all_notes_off(),
            }
        }
    }

    fn apply_parameters(&mut self) {
        let attack = self.parameters.attack.load(Ordering::Relaxed);
        let decay = self.parameters.decay.load(Ordering::Relaxed);
        let sustain = self.parameters.sustain.load(Ordering::Relaxed);
        let release = self.parameters.release.load(Ordering::Relaxed);
        self.voice_pool.set_adsr(attack, decay, sustain, release);
        self.voice_pool.set_waveform(self.parameters.waveform());
    }

    /// Fill an interleaved buffer, the same signal on every channel
    pub fn process(&mut self, output: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let frames = output.len() / channels;

        self.apply_events();
        self.apply_parameters();

        if self.mono.len() < frames {
            self.mono.resize(frames, 0.0);
        }
        let mono = &mut self.mono[..frames];
        self.voice_pool.process(mono);

        let gain = if self.parameters.is_muted() {
            0.0
        } else {
            self.parameters.gain.load(Ordering::Relaxed)
        };

        for (frame, sample) in output.chunks_mut(channels).zip(mono.iter()) {
            frame.fill(sample * gain);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::decoder::note_label;
    use crate::types::waveform::Waveform;

    fn engine() -> (SynthEngine, crossbeam_channel::Sender<SynthEvent>, Arc<SynthParameters>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let params = Arc::new(SynthParameters::new());
        params.set_waveform(Waveform::Square);
        (SynthEngine::new(1000.0, params.clone(), rx), tx, params)
    }

    #[test]
    fn test_silent_without_events() {
        let (mut engine, _tx, _params) = engine();
        let mut output = [1.0f32; 64];
        engine.process(&mut output, 2);
        assert!(output.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_note_on_produces_sound_on_all_channels() {
        let (mut engine, tx, _params) = engine();
        tx.send(SynthEvent::note_on(note_label(60), 100.0, 1.0)).unwrap();

        let mut output = [0.0f32; 128];
        engine.process(&mut output, 2);

        assert!(output.iter().any(|s| *s != 0.0));
        for frame in output.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
        assert_eq!(engine.voice_states().iter().flatten().count(), 1);
    }

    #[test]
    fn test_muted_outputs_silence() {
        let (mut engine, tx, params) = engine();
        params.toggle_mute();
        tx.send(SynthEvent::note_on(note_label(60), 100.0, 1.0)).unwrap();

        let mut output = [0.0f32; 128];
        engine.process(&mut output, 1);

        assert!(output.iter().all(|s| *s == 0.0));
        assert!(engine.voice_states().contains(&Some(note_label(60))));
    }
}
