use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use super::app::App;
use crate::types::waveform::Waveform;

/// Poll the keyboard and update app state
pub fn handle_events(app: &mut App, timeout: Duration) -> anyhow::Result<()> {
    if event::poll(timeout)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                handle_key_event(app, key);
            }
        }
    }
    Ok(())
}

/// Process individual key press
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
        app.quit();
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') => app.clear_log(),
        KeyCode::Char('m') => app.toggle_mute(),
        KeyCode::Char('?') => app.toggle_help(),

        // Quick waveform selection
        KeyCode::Char('1') => app.set_waveform(Waveform::Sine),
        KeyCode::Char('2') => app.set_waveform(Waveform::Triangle),
        KeyCode::Char('3') => app.set_waveform(Waveform::Sawtooth),
        KeyCode::Char('4') => app.set_waveform(Waveform::Square),

        _ => {}
    }
}
