use crossbeam_channel::Sender;

use crate::midi::decoder::{Command, DecodedMessage, NoteField};
use crate::types::events::SynthEvent;
use crate::types::note::{label_to_frequency, velocity_to_amplitude};

/// Controller number for "All Notes Off"
const ALL_NOTES_OFF: u8 = 123;

/// Turns decoded messages into synth events for the audio thread
pub struct AudioTrigger {
    event_tx: Sender<SynthEvent>,
}

impl AudioTrigger {
    pub fn new(event_tx: Sender<SynthEvent>) -> Self {
        Self { event_tx }
    }

    /// Forward a message to the audio thread if it starts or stops a voice
    pub fn handle(&self, message: &DecodedMessage) {
        if let Some(event) = synth_event(message) {
            // Use try_send to avoid blocking the UI thread
            let _ = self.event_tx.try_send(event);
        }
    }
}

/// Synth event for a decoded message
/// Note On with velocity 0 releases, like Note Off
pub fn synth_event(message: &DecodedMessage) -> Option<SynthEvent> {
    match (message.command, message.note) {
        (Command::NoteOn, NoteField::Label(label)) if message.velocity > 0 => Some(
            SynthEvent::note_on(
                label,
                label_to_frequency(label),
                velocity_to_amplitude(message.velocity),
            ),
        ),
        (Command::NoteOn | Command::NoteOff, NoteField::Label(label)) => {
            Some(SynthEvent::note_off(label))
        }
        (Command::Effects, NoteField::Raw(ALL_NOTES_OFF)) => Some(SynthEvent::AllNotesOff),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::decoder::{RawMidiMessage, decode_message, note_label};

    fn decode(status: u8, data1: u8, data2: u8) -> DecodedMessage {
        decode_message(RawMidiMessage::new(status, data1, data2))
    }

    #[test]
    fn test_note_on_starts_voice() {
        match synth_event(&decode(144, 69, 127)) {
            Some(SynthEvent::NoteOn {
                label,
                frequency,
                amplitude,
            }) => {
                assert_eq!(label, note_label(69));
                assert!((frequency - 440.0).abs() < 0.1);
                assert_eq!(amplitude, 1.0);
            }
            other => panic!("Expected NoteOn event, got {:?}", other),
        }
    }

    #[test]
    fn test_note_off_and_zero_velocity_release() {
        assert_eq!(
            synth_event(&decode(128, 60, 64)),
            Some(SynthEvent::note_off(note_label(60)))
        );
        assert_eq!(
            synth_event(&decode(144, 60, 0)),
            Some(SynthEvent::note_off(note_label(60)))
        );
    }

    #[test]
    fn test_all_notes_off_controller() {
        assert_eq!(synth_event(&decode(176, 123, 0)), Some(SynthEvent::AllNotesOff));
        assert_eq!(synth_event(&decode(176, 7, 90)), None);
    }

    #[test]
    fn test_other_commands_ignored() {
        assert_eq!(synth_event(&decode(224, 0, 64)), None);
        assert_eq!(synth_event(&decode(0x91, 60, 100)), None);
    }

    #[test]
    fn test_trigger_sends_on_channel() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let trigger = AudioTrigger::new(tx);

        trigger.handle(&decode(144, 60, 100));
        trigger.handle(&decode(224, 0, 64));
        trigger.handle(&decode(128, 60, 0));

        let events: Vec<SynthEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SynthEvent::NoteOn { label, .. } if label == note_label(60)));
        assert_eq!(events[1], SynthEvent::note_off(note_label(60)));
    }
}
