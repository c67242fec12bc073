mod audio;
mod config;
mod error;
mod midi;
mod monitor;
mod types;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing_subscriber::EnvFilter;

use audio::engine::SynthEngine;
use audio::parameters::SynthParameters;
use audio::trigger::AudioTrigger;
use audio::voice_pool::MAX_VOICES;
use config::{DeviceConfig, LogConfig, MonitorConfig};
use error::MonitorError;
use midi::decoder::NoteLabel;
use midi::handler::{MidiHandler, find_device};
use monitor::Dispatcher;
use types::events::{MonitorEvent, SynthEvent};
use ui::{app::App, events, render};

type VoiceStates = [Option<NoteLabel>; MAX_VOICES];

/// Watch MIDI input devices, log messages, show held notes and play them
#[derive(Parser, Debug)]
#[command(name = "midi-monitor")]
#[command(about = "Terminal MIDI monitor with an optional synthesizer", long_about = None)]
struct Args {
    /// Configuration file (YAML)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// List available devices and exit
    #[arg(short = 'l', long = "list")]
    list_devices: bool,

    /// Do not open an audio device
    #[arg(long = "no-audio")]
    no_audio: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => MonitorConfig::load(path)?,
        None => MonitorConfig::default(),
    };

    // The TUI owns the terminal, so tracing only goes to stderr when listing
    init_tracing(&config.log, args.list_devices)?;

    if args.list_devices {
        return list_devices();
    }

    run(config, !args.no_audio)
}

/// Where tracing output goes
#[derive(Debug, PartialEq, Eq)]
enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Disabled,
}

/// Stderr wins when allowed (device listing), else the configured file, else nowhere
fn log_target(log: &LogConfig, allow_stderr: bool) -> LogTarget<'_> {
    match (&log.file, allow_stderr) {
        (_, true) => LogTarget::Stderr,
        (Some(path), false) => LogTarget::File(path),
        (None, false) => LogTarget::Disabled,
    }
}

/// Install the tracing subscriber
fn init_tracing(log: &LogConfig, allow_stderr: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log.level.to_lowercase()));

    match log_target(log, allow_stderr) {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        LogTarget::Disabled => {}
    }

    Ok(())
}

/// List available audio output device names
fn list_audio_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();

    let devices: Vec<String> = host
        .output_devices()?
        .filter_map(|device| device.description().ok().map(|desc| desc.name().to_string()))
        .collect();

    Ok(devices)
}

fn list_devices() -> Result<()> {
    let ports = MidiHandler::list_ports()?;

    println!("MIDI Input Ports:");
    for port in &ports.inputs {
        println!("  {}", port);
    }
    println!("\nMIDI Output Ports:");
    for port in &ports.outputs {
        println!("  {}", port);
    }

    println!("\nAudio Output Devices:");
    match list_audio_devices() {
        Ok(devices) => {
            for (i, device) in devices.iter().enumerate() {
                println!("  {}: {}", i, device);
            }
        }
        Err(e) => {
            tracing::warn!("Could not enumerate audio devices: {:#}", e);
            println!("  (unavailable)");
        }
    }

    Ok(())
}

/// Connect everything and run the TUI until the user quits
fn run(config: MonitorConfig, audio_allowed: bool) -> Result<()> {
    let listing = MidiHandler::list_ports()?;

    let (event_tx, event_rx) = crossbeam_channel::unbounded::<MonitorEvent>();
    let handler = MidiHandler::connect(&config.devices.input_selection(), event_tx)?;

    let (voice_tx, voice_rx) = crossbeam_channel::unbounded::<VoiceStates>();
    let (synth, trigger, _stream) = if audio_allowed && config.synth.enabled {
        let (synth_tx, synth_rx) = crossbeam_channel::unbounded::<SynthEvent>();
        let params = Arc::new(SynthParameters::from_settings(&config.synth));
        let stream = start_audio(&config.devices, params.clone(), synth_rx, voice_tx)?;
        (Some(params), Some(AudioTrigger::new(synth_tx)), Some(stream))
    } else {
        tracing::info!("Audio disabled");
        (None, None, None)
    };

    let dispatcher = Dispatcher::new(trigger);
    let mut app = App::new(
        handler.connected_ports().to_vec(),
        listing.outputs,
        config.display.max_log_lines,
        synth,
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_ui_loop(&mut terminal, &mut app, &dispatcher, &event_rx, &voice_rx);

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Open the configured output device and start the synth stream
fn start_audio(
    devices: &DeviceConfig,
    params: Arc<SynthParameters>,
    synth_rx: crossbeam_channel::Receiver<SynthEvent>,
    voice_tx: crossbeam_channel::Sender<VoiceStates>,
) -> Result<cpal::Stream> {
    let host = cpal::default_host();

    let device = match devices.audio_output() {
        None => host
            .default_output_device()
            .ok_or_else(|| MonitorError::AudioDevice("no default output device".to_string()))?,
        Some(search) => {
            let names = list_audio_devices()?;
            let index = find_device(&names, search).ok_or_else(|| {
                MonitorError::AudioDevice(format!("audio device '{}' not found", search))
            })?;
            let name = &names[index];
            host.output_devices()?
                .find(|device| {
                    device
                        .description()
                        .map(|desc| desc.name().to_string() == *name)
                        .unwrap_or(false)
                })
                .ok_or_else(|| {
                    MonitorError::AudioDevice(format!("audio device '{}' not available", name))
                })?
        }
    };

    let audio_config = device.default_output_config()?;
    let channels = audio_config.channels() as usize;

    let stream = match audio_config.sample_format() {
        cpal::SampleFormat::F32 => {
            start_stream::<f32>(
                &device,
                &audio_config.into(),
                params,
                synth_rx,
                voice_tx,
                channels,
            )?
        }
        cpal::SampleFormat::I16 => {
            start_stream::<i16>(
                &device,
                &audio_config.into(),
                params,
                synth_rx,
                voice_tx,
                channels,
            )?
        }
        cpal::SampleFormat::U16 => {
            start_stream::<u16>(
                &device,
                &audio_config.into(),
                params,
                synth_rx,
                voice_tx,
                channels,
            )?
        }
        other => return Err(MonitorError::UnsupportedSampleFormat(format!("{:?}", other)).into()),
    };

    tracing::info!("Audio output started ({} channels)", channels);
    Ok(stream)
}

fn start_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    params: Arc<SynthParameters>,
    synth_rx: crossbeam_channel::Receiver<SynthEvent>,
    voice_tx: crossbeam_channel::Sender<VoiceStates>,
    channels: usize,
) -> Result<cpal::Stream>
where
    T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>,
{
    let sample_rate = config.sample_rate as f32;
    let mut engine = SynthEngine::new(sample_rate, params, synth_rx);

    // Pre-allocate buffer for processing
    let mut temp_buffer = vec![0.0f32; 512 * channels];
    let mut frame_counter = 0u64;
    let report_interval = (sample_rate / 10.0) as u64;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            if temp_buffer.len() < data.len() {
                temp_buffer.resize(data.len(), 0.0);
            }
            let buffer = &mut temp_buffer[..data.len()];

            engine.process(buffer, channels);

            for (out, sample) in data.iter_mut().zip(buffer.iter()) {
                *out = T::from_sample(*sample);
            }

            // Periodically send voice states to UI
            frame_counter += (data.len() / channels.max(1)) as u64;
            if frame_counter > report_interval {
                let _ = voice_tx.try_send(engine.voice_states());
                frame_counter = 0;
            }
        },
        |err| tracing::error!("Audio stream error: {}", err),
        None,
    )?;

    stream.play()?;

    Ok(stream)
}

fn run_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    dispatcher: &Dispatcher,
    event_rx: &crossbeam_channel::Receiver<MonitorEvent>,
    voice_rx: &crossbeam_channel::Receiver<VoiceStates>,
) -> Result<()> {
    loop {
        while let Ok(event) = event_rx.try_recv() {
            dispatcher.dispatch(app, event);
        }

        while let Ok(states) = voice_rx.try_recv() {
            app.update_voice_states(states);
        }

        terminal.draw(|f| render::render(f, app))?;

        // Key polling doubles as the frame delay (~60 FPS)
        events::handle_events(app, Duration::from_millis(16))?;

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
