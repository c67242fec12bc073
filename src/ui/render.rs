use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

use super::app::{ActiveNote, App};
use crate::audio::voice_pool::MAX_VOICES;
use crate::midi::handler::PortInfo;

/// Render the TUI
pub fn render(frame: &mut Frame, app: &App) {
    let port_rows = (app.inputs.len() + app.outputs.len()).clamp(1, 8) as u16;
    let help_rows = if app.show_help { 8 } else { 3 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Title
            Constraint::Length(port_rows + 2), // Ports
            Constraint::Length(5),             // Active notes
            Constraint::Min(3),                // Event log
            Constraint::Length(3),             // Synth
            Constraint::Length(help_rows),     // Help
        ])
        .split(frame.size());

    render_title(frame, chunks[0], app);
    render_ports(frame, chunks[1], app);
    render_notes(frame, chunks[2], app);
    render_event_log(frame, chunks[3], app);
    render_synth(frame, chunks[4], app);
    render_help(frame, chunks[5], app.show_help);
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let title = Paragraph::new(format!(
        "MIDI Monitor - {} input(s), {} message(s)",
        app.inputs.len(),
        app.message_count
    ))
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(title, area);
}

fn render_ports(frame: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app
        .inputs
        .iter()
        .map(|port| port_line(port, Color::Green))
        .chain(app.outputs.iter().map(|port| port_line(port, Color::Gray)))
        .collect();

    let paragraph =
        Paragraph::new(lines).block(Block::default().title("Ports").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn port_line(port: &PortInfo, color: Color) -> Line<'static> {
    Line::from(Span::styled(port.to_string(), Style::default().fg(color)))
}

/// One span per held note, bar length follows note size
fn note_span(note: &ActiveNote) -> Span<'static> {
    let size = note.size();
    let bar = "█".repeat((size * 2.0).round() as usize);
    let style = if size >= 2.0 {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow)
    };
    Span::styled(format!("{} {}  ", note.label, bar), style)
}

fn render_notes(frame: &mut Frame, area: Rect, app: &App) {
    let line = if app.active_notes.is_empty() {
        Line::from(Span::styled("(no notes held)", Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(app.active_notes.iter().map(note_span).collect::<Vec<_>>())
    };

    let paragraph = Paragraph::new(line)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Notes").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

/// Newest lines at the bottom
fn render_event_log(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title("Event Log").borders(Borders::ALL);
    let visible = block.inner(area).height as usize;
    let skip = app.event_log.len().saturating_sub(visible);

    let lines: Vec<Line> = app
        .event_log
        .iter()
        .skip(skip)
        .map(|line| Line::from(line.as_str()))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_synth(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title("Synth").borders(Borders::ALL);

    let Some(synth) = &app.synth else {
        let paragraph = Paragraph::new("Audio disabled")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let active = app.active_voices();
    let label = format!(
        "{} | {} | voices {}/{}",
        synth.waveform().name(),
        if synth.is_muted() { "muted" } else { "on" },
        active,
        MAX_VOICES
    );
    let color = if synth.is_muted() { Color::DarkGray } else { Color::Cyan };

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(color))
        .label(label)
        .ratio(active as f64 / MAX_VOICES as f64);

    frame.render_widget(gauge, area);
}

fn render_help(frame: &mut Frame, area: Rect, expanded: bool) {
    let help_text = if expanded {
        vec![
            Line::from("Controls:"),
            Line::from("  q / Esc / Ctrl+C  Quit"),
            Line::from("  c                 Clear event log"),
            Line::from("  m                 Mute / unmute synth"),
            Line::from("  1-4               Sine / Triangle / Sawtooth / Square"),
            Line::from("  ?                 Hide help"),
        ]
    } else {
        vec![Line::from("q: Quit  |  c: Clear log  |  m: Mute  |  1-4: Waveform  |  ?: Help")]
    };

    let paragraph = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray));

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::decoder::note_label;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn test_note_span_scales_with_velocity() {
        let soft = note_span(&ActiveNote {
            label: note_label(60),
            velocity: 0,
        });
        let hard = note_span(&ActiveNote {
            label: note_label(60),
            velocity: 100,
        });
        assert_eq!(soft.content, "C3 ██  ");
        assert_eq!(hard.content, "C3 ██████  ");
    }

    #[test]
    fn test_render_shows_log_and_notes() {
        let mut app = App::new(Vec::new(), Vec::new(), 10, None);
        app.event_log.push_back("1.000 | Note start: C3 100".to_string());
        app.active_notes.push(ActiveNote {
            label: note_label(61),
            velocity: 10,
        });

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Note start: C3 100"));
        assert!(text.contains("C#3"));
        assert!(text.contains("Audio disabled"));
    }
}
