//! Note identifiers and the fixed note tables
//!
//! Only octaves 3 to 5 of the C major scale are playable; every ring sector and
//! grid row maps to one of these 21 notes.

use std::fmt;

/// Natural pitch class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pitch {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Pitch {
    pub const ALL: [Pitch; 7] = [
        Pitch::C,
        Pitch::D,
        Pitch::E,
        Pitch::F,
        Pitch::G,
        Pitch::A,
        Pitch::B,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Pitch::C => "C",
            Pitch::D => "D",
            Pitch::E => "E",
            Pitch::F => "F",
            Pitch::G => "G",
            Pitch::A => "A",
            Pitch::B => "B",
        }
    }
}

pub const LOWEST_OCTAVE: u8 = 3;
pub const HIGHEST_OCTAVE: u8 = 5;

/// Frequencies in Hz, indexed by [octave - 3][pitch]
const FREQUENCIES: [[f32; 7]; 3] = [
    [130.81, 146.83, 164.81, 174.61, 196.0, 220.0, 246.94],
    [261.63, 293.66, 329.63, 349.23, 392.0, 440.0, 493.88],
    [523.25, 587.33, 659.25, 698.46, 783.99, 880.0, 987.77],
];

/// A playable note (pitch + octave in 3..=5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Note {
    pitch: Pitch,
    octave: u8,
}

impl Note {
    /// Build a note, `None` if the octave is outside the playable range
    pub const fn new(pitch: Pitch, octave: u8) -> Option<Self> {
        if octave < LOWEST_OCTAVE || octave > HIGHEST_OCTAVE {
            None
        } else {
            Some(Self { pitch, octave })
        }
    }

    const fn known(pitch: Pitch, octave: u8) -> Self {
        Self { pitch, octave }
    }

    /// Fundamental frequency in Hz
    pub fn frequency(&self) -> f32 {
        FREQUENCIES[(self.octave - LOWEST_OCTAVE) as usize][self.pitch.index()]
    }

    /// Parse names like "C4" or "a5"
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.trim().chars();
        let pitch = match chars.next()?.to_ascii_uppercase() {
            'C' => Pitch::C,
            'D' => Pitch::D,
            'E' => Pitch::E,
            'F' => Pitch::F,
            'G' => Pitch::G,
            'A' => Pitch::A,
            'B' => Pitch::B,
            _ => return None,
        };
        let octave: u8 = chars.as_str().parse().ok()?;
        Self::new(pitch, octave)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch.as_str(), self.octave)
    }
}

const fn scale(octave: u8) -> [Note; 7] {
    [
        Note::known(Pitch::C, octave),
        Note::known(Pitch::D, octave),
        Note::known(Pitch::E, octave),
        Note::known(Pitch::F, octave),
        Note::known(Pitch::G, octave),
        Note::known(Pitch::A, octave),
        Note::known(Pitch::B, octave),
    ]
}

/// Sector notes of the left ring (sector 0 first)
pub const LEFT_RING_NOTES: [Note; 7] = scale(3);
/// Sector notes of the right ring (sector 0 first)
pub const RIGHT_RING_NOTES: [Note; 7] = scale(5);

/// Grid row → note, top row highest
pub const ROW_NOTES: [Note; 7] = [
    Note::known(Pitch::C, 5),
    Note::known(Pitch::B, 4),
    Note::known(Pitch::A, 4),
    Note::known(Pitch::G, 4),
    Note::known(Pitch::F, 4),
    Note::known(Pitch::E, 4),
    Note::known(Pitch::D, 4),
];
