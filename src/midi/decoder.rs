use std::fmt;

/// Status byte for Note On (channel 1)
const NOTE_ON: u8 = 144;
/// Status byte for Note Off (channel 1)
const NOTE_OFF: u8 = 128;
/// Status byte for Pitch Bend (channel 1)
const PITCH_BEND: u8 = 224;
/// Status byte for Control Change (channel 1)
const EFFECTS: u8 = 176;

/// Raw MIDI message as delivered by the input callback
/// Only the first three byte positions are meaningful here
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMidiMessage {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl RawMidiMessage {
    pub fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self {
            status,
            data1,
            data2,
        }
    }

    /// Build a message from platform bytes
    /// Missing data bytes read as 0, extra bytes are ignored
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, rest) = bytes.split_first()?;
        let data1 = rest.first().copied().unwrap_or(0);
        let data2 = rest.get(1).copied().unwrap_or(0);
        Some(Self::new(status, data1, data2))
    }
}

/// Command encoded in the status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    NoteOn,
    NoteOff,
    PitchBend,
    Effects,
    /// Status byte outside the command table, kept for display
    Unknown(u8),
}

impl Command {
    /// Whether this command carries a note number in its first data byte
    pub fn is_note(&self) -> bool {
        matches!(self, Command::NoteOn | Command::NoteOff)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::NoteOn => f.write_str("Note start"),
            Command::NoteOff => f.write_str("Note stop"),
            Command::PitchBend => f.write_str("Pitch_bend"),
            Command::Effects => f.write_str("Effects"),
            Command::Unknown(status) => write!(f, "{}", status),
        }
    }
}

/// One of the twelve semitones of an octave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    /// All pitch classes in table order
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Pitch class for an index in 0..=11, None otherwise
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Pitch class of a note number (Euclidean remainder, never out of range)
    pub fn of_note(note_number: i32) -> Self {
        match Self::from_index(note_number.rem_euclid(12) as u8) {
            Some(pitch) => pitch,
            None => unreachable!("rem_euclid(12) is always in 0..12"),
        }
    }

    /// Index of this pitch class in 0..=11
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(pitch_class_name(*self))
    }
}

/// Pitch class plus octave, e.g. "C#3"
/// Octave numbering puts MIDI note 60 at C3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteLabel {
    pub octave: i32,
    pub pitch: PitchClass,
}

impl NoteLabel {
    /// Note number this label was derived from
    /// Widened to i64 so labels of extreme note numbers still invert
    pub fn note_number(&self) -> i64 {
        (self.octave as i64 + 2) * 12 + self.pitch.index() as i64
    }
}

impl fmt::Display for NoteLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch, self.octave)
    }
}

/// Note field of a decoded message
/// A label for note commands, the untouched data byte otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteField {
    Label(NoteLabel),
    Raw(u8),
}

impl NoteField {
    pub fn label(&self) -> Option<NoteLabel> {
        match self {
            NoteField::Label(label) => Some(*label),
            NoteField::Raw(_) => None,
        }
    }
}

impl fmt::Display for NoteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteField::Label(label) => write!(f, "{}", label),
            NoteField::Raw(value) => write!(f, "{}", value),
        }
    }
}

/// Human-readable form of a raw message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedMessage {
    pub command: Command,
    pub note: NoteField,
    pub velocity: u8,
}

/// Map a status byte to its command
/// Exact values only: messages on channels other than 1 come out as Unknown
pub fn classify_command(status: u8) -> Command {
    match status {
        NOTE_ON => Command::NoteOn,
        NOTE_OFF => Command::NoteOff,
        PITCH_BEND => Command::PitchBend,
        EFFECTS => Command::Effects,
        other => Command::Unknown(other),
    }
}

/// Display name of a pitch class
pub fn pitch_class_name(pitch: PitchClass) -> &'static str {
    match pitch {
        PitchClass::C => "C",
        PitchClass::CSharp => "C#",
        PitchClass::D => "D",
        PitchClass::DSharp => "D#",
        PitchClass::E => "E",
        PitchClass::F => "F",
        PitchClass::FSharp => "F#",
        PitchClass::G => "G",
        PitchClass::GSharp => "G#",
        PitchClass::A => "A",
        PitchClass::ASharp => "A#",
        PitchClass::B => "B",
    }
}

/// Label for a note number
/// Not bounds checked: any integer gets a label, octave = floor(n / 12) - 2
pub fn note_label(note_number: i32) -> NoteLabel {
    NoteLabel {
        octave: note_number.div_euclid(12) - 2,
        pitch: PitchClass::of_note(note_number),
    }
}

/// Decode a raw message. Total over every byte triple.
pub fn decode_message(raw: RawMidiMessage) -> DecodedMessage {
    let command = classify_command(raw.status);
    let note = if command.is_note() {
        NoteField::Label(note_label(raw.data1 as i32))
    } else {
        NoteField::Raw(raw.data1)
    };

    DecodedMessage {
        command,
        note,
        velocity: raw.data2,
    }
}
