use std::collections::VecDeque;
use std::sync::Arc;

use crate::audio::parameters::SynthParameters;
use crate::audio::voice_pool::MAX_VOICES;
use crate::midi::decoder::{Command, DecodedMessage, NoteLabel};
use crate::midi::handler::PortInfo;
use crate::types::note::velocity_to_note_size;
use crate::types::waveform::Waveform;

/// A note currently held down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveNote {
    pub label: NoteLabel,
    pub velocity: u8,
}

impl ActiveNote {
    /// Relative display size, grows with velocity
    pub fn size(&self) -> f32 {
        velocity_to_note_size(self.velocity)
    }
}

/// Event log line: "<ms> | <command>: <note> <velocity>"
pub fn format_log_line(timestamp_us: u64, message: &DecodedMessage) -> String {
    format!(
        "{:.3} | {}: {} {}",
        timestamp_us as f64 / 1000.0,
        message.command,
        message.note,
        message.velocity
    )
}

/// UI application state
pub struct App {
    /// Input ports being listened to
    pub inputs: Vec<PortInfo>,
    /// Output ports, listed for reference only
    pub outputs: Vec<PortInfo>,
    /// Event log lines, oldest first
    pub event_log: VecDeque<String>,
    pub max_log_lines: usize,
    /// Held notes in the order they were pressed
    pub active_notes: Vec<ActiveNote>,
    /// Label held by each synth voice
    pub voice_states: [Option<NoteLabel>; MAX_VOICES],
    /// Total messages received
    pub message_count: u64,
    /// Shared synth parameters, None when audio is off
    pub synth: Option<Arc<SynthParameters>>,
    pub show_help: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        inputs: Vec<PortInfo>,
        outputs: Vec<PortInfo>,
        max_log_lines: usize,
        synth: Option<Arc<SynthParameters>>,
    ) -> Self {
        Self {
            inputs,
            outputs,
            event_log: VecDeque::with_capacity(max_log_lines.min(1024)),
            max_log_lines: max_log_lines.max(1),
            active_notes: Vec::new(),
            voice_states: [None; MAX_VOICES],
            message_count: 0,
            synth,
            show_help: false,
            should_quit: false,
        }
    }

    /// Log a decoded message and update the held notes
    pub fn record(&mut self, timestamp_us: u64, message: &DecodedMessage) {
        self.message_count += 1;
        self.push_log_line(format_log_line(timestamp_us, message));
        self.display_note(message);
    }

    fn push_log_line(&mut self, line: String) {
        while self.event_log.len() >= self.max_log_lines {
            self.event_log.pop_front();
        }
        self.event_log.push_back(line);
    }

    /// Add or remove a held note
    /// Note On with velocity 0 counts as a release
    pub fn display_note(&mut self, message: &DecodedMessage) {
        let Some(label) = message.note.label() else {
            return;
        };

        let pressed = message.command == Command::NoteOn && message.velocity > 0;
        let existing = self.active_notes.iter().position(|n| n.label == label);

        match (pressed, existing) {
            (true, Some(index)) => self.active_notes[index].velocity = message.velocity,
            (true, None) => self.active_notes.push(ActiveNote {
                label,
                velocity: message.velocity,
            }),
            (false, Some(index)) => {
                self.active_notes.remove(index);
            }
            (false, None) => {}
        }
    }

    /// Name of a connected input port
    pub fn input_name(&self, port: usize) -> Option<&str> {
        self.inputs
            .iter()
            .find(|info| info.index == port)
            .map(|info| info.name.as_str())
    }

    pub fn clear_log(&mut self) {
        self.event_log.clear();
    }

    pub fn update_voice_states(&mut self, states: [Option<NoteLabel>; MAX_VOICES]) {
        self.voice_states = states;
    }

    pub fn active_voices(&self) -> usize {
        self.voice_states.iter().flatten().count()
    }

    /// Toggle synth mute, no-op without audio
    pub fn toggle_mute(&mut self) {
        if let Some(synth) = &self.synth {
            let muted = synth.toggle_mute();
            tracing::info!("Synth {}", if muted { "muted" } else { "unmuted" });
        }
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        if let Some(synth) = &self.synth {
            synth.set_waveform(waveform);
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}
