use crossbeam_channel::Sender;
use midir::{MidiInput, MidiInputConnection, MidiInputPort, MidiOutput};
use std::fmt;

use super::decoder::RawMidiMessage;
use crate::error::{MonitorError, Result};
use crate::types::events::MonitorEvent;

const CLIENT_NAME: &str = "midi-monitor";
const INPUT_PORT_NAME: &str = "midi-monitor-input";

/// Direction of a MIDI port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

/// A MIDI port as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub index: usize,
    pub name: String,
    pub direction: PortDirection,
}

impl fmt::Display for PortInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            PortDirection::Input => "Input",
            PortDirection::Output => "Output",
        };
        write!(f, "{} port [index:{}] name:'{}'", direction, self.index, self.name)
    }
}

/// Every MIDI port visible at startup
#[derive(Debug, Clone, Default)]
pub struct PortListing {
    pub inputs: Vec<PortInfo>,
    pub outputs: Vec<PortInfo>,
}

/// Which input ports to listen to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSelection {
    All,
    /// Index or case-insensitive name substring of a single port
    Matching(String),
}

impl InputSelection {
    /// "all" (any case) or an empty string selects every port
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        if spec.is_empty() || spec.eq_ignore_ascii_case("all") {
            InputSelection::All
        } else {
            InputSelection::Matching(spec.to_string())
        }
    }
}

/// Find a device by index or case-insensitive name substring
pub fn find_device(devices: &[String], search: &str) -> Option<usize> {
    if let Ok(index) = search.parse::<usize>() {
        return (index < devices.len()).then_some(index);
    }

    let search_lower = search.to_lowercase();
    devices
        .iter()
        .position(|device| device.to_lowercase().contains(&search_lower))
}

/// MIDI input handler
/// Holds one connection per listened port and forwards raw messages to the UI thread
pub struct MidiHandler {
    _connections: Vec<MidiInputConnection<()>>,
    connected: Vec<PortInfo>,
}

impl MidiHandler {
    /// Connect to the selected input ports
    /// Ports that fail to open are skipped; fails only if none could be opened
    pub fn connect(selection: &InputSelection, event_tx: Sender<MonitorEvent>) -> Result<Self> {
        let midi_in = MidiInput::new(CLIENT_NAME)?;
        let names = port_names(&midi_in);
        drop(midi_in);

        let (connections, connected) = connect_selected(&names, selection, |index, name| {
            connect_port(index, name, event_tx.clone())
        })?;

        Ok(Self {
            _connections: connections,
            connected,
        })
    }

    /// Ports this handler is listening to
    pub fn connected_ports(&self) -> &[PortInfo] {
        &self.connected
    }

    /// List all MIDI input and output ports
    pub fn list_ports() -> Result<PortListing> {
        let midi_in = MidiInput::new(CLIENT_NAME)?;
        let midi_out = MidiOutput::new(CLIENT_NAME)?;

        let inputs = port_infos(port_names(&midi_in), PortDirection::Input);
        let outputs = midi_out
            .ports()
            .iter()
            .filter_map(|port| midi_out.port_name(port).ok())
            .collect();
        let outputs = port_infos(outputs, PortDirection::Output);

        tracing::debug!(
            "Found {} MIDI input and {} MIDI output ports",
            inputs.len(),
            outputs.len()
        );

        Ok(PortListing { inputs, outputs })
    }
}

/// Resolve the selection against the port names and open each selected port
/// Ports that fail to open are skipped; the last failure is returned if none opened
fn connect_selected<C>(
    names: &[String],
    selection: &InputSelection,
    mut connect: impl FnMut(usize, &str) -> Result<C>,
) -> Result<(Vec<C>, Vec<PortInfo>)> {
    if names.is_empty() {
        return Err(MonitorError::NoInputDevices);
    }

    let indices: Vec<usize> = match selection {
        InputSelection::All => (0..names.len()).collect(),
        InputSelection::Matching(search) => vec![
            find_device(names, search)
                .ok_or_else(|| MonitorError::NoMatchingInput(search.clone()))?,
        ],
    };

    let mut connections = Vec::with_capacity(indices.len());
    let mut connected = Vec::with_capacity(indices.len());
    let mut last_error = None;

    for index in indices {
        let name = &names[index];
        match connect(index, name) {
            Ok(connection) => {
                tracing::info!("Connected to MIDI input {}: {}", index, name);
                connections.push(connection);
                connected.push(PortInfo {
                    index,
                    name: name.clone(),
                    direction: PortDirection::Input,
                });
            }
            Err(e) => {
                tracing::warn!("Skipping MIDI input {}: {}", index, e);
                last_error = Some(e);
            }
        }
    }

    if connections.is_empty() {
        return Err(last_error.unwrap_or(MonitorError::NoInputDevices));
    }

    Ok((connections, connected))
}

fn port_names(midi_in: &MidiInput) -> Vec<String> {
    midi_in
        .ports()
        .iter()
        .filter_map(|port| midi_in.port_name(port).ok())
        .collect()
}

fn port_infos(names: Vec<String>, direction: PortDirection) -> Vec<PortInfo> {
    names
        .into_iter()
        .enumerate()
        .map(|(index, name)| PortInfo {
            index,
            name,
            direction,
        })
        .collect()
}

/// Open one input port on its own client
/// Ports are looked up by name first since each client enumerates anew
fn connect_port(
    index: usize,
    name: &str,
    event_tx: Sender<MonitorEvent>,
) -> Result<MidiInputConnection<()>> {
    let midi_in = MidiInput::new(CLIENT_NAME)?;
    let ports = midi_in.ports();

    let port: MidiInputPort = ports
        .iter()
        .find(|p| midi_in.port_name(p).map(|n| n == name).unwrap_or(false))
        .or_else(|| ports.get(index))
        .cloned()
        .ok_or_else(|| MonitorError::Connect {
            port: name.to_string(),
            reason: "port disappeared".to_string(),
        })?;

    midi_in
        .connect(
            &port,
            INPUT_PORT_NAME,
            move |timestamp_us, bytes, _| {
                if let Some(raw) = RawMidiMessage::from_bytes(bytes) {
                    // Use try_send to avoid blocking the MIDI thread
                    let _ = event_tx.try_send(MonitorEvent::Message {
                        port: index,
                        timestamp_us,
                        raw,
                    });
                }
            },
            (),
        )
        .map_err(|e| MonitorError::Connect {
            port: name.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices() -> Vec<String> {
        vec![
            "IAC Driver Bus 1".to_string(),
            "Arturia KeyStep 32".to_string(),
            "Midi Through Port-0".to_string(),
        ]
    }

    #[test]
    fn test_find_device_by_index() {
        assert_eq!(find_device(&devices(), "1"), Some(1));
        assert_eq!(find_device(&devices(), "3"), None);
    }

    #[test]
    fn test_find_device_by_name() {
        assert_eq!(find_device(&devices(), "keystep"), Some(1));
        assert_eq!(find_device(&devices(), "THROUGH"), Some(2));
        assert_eq!(find_device(&devices(), "launchpad"), None);
    }

    fn refuse(index: usize, name: &str) -> MonitorError {
        MonitorError::Connect {
            port: name.to_string(),
            reason: format!("busy {}", index),
        }
    }

    #[test]
    fn test_connect_selected_skips_failed_port() {
        let (connections, connected) =
            connect_selected(&devices(), &InputSelection::All, |index, name| {
                if index == 1 { Err(refuse(index, name)) } else { Ok(index) }
            })
            .unwrap();

        assert_eq!(connections, vec![0, 2]);
        let names: Vec<&str> = connected.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["IAC Driver Bus 1", "Midi Through Port-0"]);
        assert!(connected.iter().all(|p| p.direction == PortDirection::Input));
    }

    #[test]
    fn test_connect_selected_all_failed_returns_last_error() {
        let result = connect_selected::<usize>(&devices(), &InputSelection::All, |index, name| {
            Err(refuse(index, name))
        });

        match result {
            Err(MonitorError::Connect { port, reason }) => {
                assert_eq!(port, "Midi Through Port-0");
                assert_eq!(reason, "busy 2");
            }
            other => panic!("Expected Connect error, got {:?}", other.map(|(c, _)| c)),
        }
    }

    #[test]
    fn test_connect_selected_matching_single_port() {
        let selection = InputSelection::Matching("keystep".to_string());
        let mut attempted = Vec::new();
        let (_, connected) = connect_selected(&devices(), &selection, |index, _| {
            attempted.push(index);
            Ok(())
        })
        .unwrap();

        assert_eq!(attempted, vec![1]);
        assert_eq!(connected[0].index, 1);
    }

    #[test]
    fn test_connect_selected_no_match() {
        let selection = InputSelection::Matching("launchpad".to_string());
        let result = connect_selected(&devices(), &selection, |_, _| Ok(()));
        assert!(matches!(result, Err(MonitorError::NoMatchingInput(s)) if s == "launchpad"));
    }

    #[test]
    fn test_connect_selected_no_ports() {
        let result = connect_selected(&[], &InputSelection::All, |_, _| Ok(()));
        assert!(matches!(result, Err(MonitorError::NoInputDevices)));
    }

    #[test]
    fn test_input_selection_parse() {
        assert_eq!(InputSelection::parse("all"), InputSelection::All);
        assert_eq!(InputSelection::parse(" ALL "), InputSelection::All);
        assert_eq!(InputSelection::parse(""), InputSelection::All);
        assert_eq!(
            InputSelection::parse("keystep"),
            InputSelection::Matching("keystep".to_string())
        );
    }

    #[test]
    fn test_port_info_display() {
        let input = PortInfo {
            index: 0,
            name: "KeyStep".to_string(),
            direction: PortDirection::Input,
        };
        assert_eq!(input.to_string(), "Input port [index:0] name:'KeyStep'");

        let output = PortInfo {
            index: 2,
            name: "Synth".to_string(),
            direction: PortDirection::Output,
        };
        assert_eq!(output.to_string(), "Output port [index:2] name:'Synth'");
    }
}
