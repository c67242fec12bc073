//! Routes incoming MIDI events through the decoder to the display and the synth.

use crate::audio::trigger::AudioTrigger;
use crate::midi::decoder::decode_message;
use crate::types::events::MonitorEvent;
use crate::ui::app::{App, format_log_line};

/// Decodes each event once and hands the result to its consumers
pub struct Dispatcher {
    audio: Option<AudioTrigger>,
}

impl Dispatcher {
    pub fn new(audio: Option<AudioTrigger>) -> Self {
        Self { audio }
    }

    pub fn dispatch(&self, app: &mut App, event: MonitorEvent) {
        match event {
            MonitorEvent::Message {
                port,
                timestamp_us,
                raw,
            } => {
                let message = decode_message(raw);
                tracing::info!(
                    target: "midi",
                    port = app.input_name(port).unwrap_or("?"),
                    "{}",
                    format_log_line(timestamp_us, &message)
                );

                app.record(timestamp_us, &message);
                if let Some(audio) = &self.audio {
                    audio.handle(&message);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::decoder::{RawMidiMessage, note_label};
    use crate::types::events::SynthEvent;

    fn message(status: u8, data1: u8, data2: u8) -> MonitorEvent {
        MonitorEvent::Message {
            port: 0,
            timestamp_us: 1_000,
            raw: RawMidiMessage::new(status, data1, data2),
        }
    }

    #[test]
    fn test_dispatch_updates_app_without_audio() {
        let dispatcher = Dispatcher::new(None);
        let mut app = App::new(Vec::new(), Vec::new(), 10, None);

        dispatcher.dispatch(&mut app, message(144, 60, 100));
        assert_eq!(app.event_log.back().unwrap(), "1.000 | Note start: C3 100");
        assert_eq!(app.active_notes[0].label, note_label(60));
    }

    #[test]
    fn test_dispatch_drives_audio() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let dispatcher = Dispatcher::new(Some(AudioTrigger::new(tx)));
        let mut app = App::new(Vec::new(), Vec::new(), 10, None);

        dispatcher.dispatch(&mut app, message(144, 60, 100));
        dispatcher.dispatch(&mut app, message(176, 7, 90));
        dispatcher.dispatch(&mut app, message(128, 60, 0));

        let events: Vec<SynthEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], SynthEvent::note_off(note_label(60)));
        assert!(app.active_notes.is_empty());
        assert_eq!(app.event_log.len(), 3);
    }
}
