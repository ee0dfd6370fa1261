//! Chord
//!
//! Tone spellings, chord decorations and chords: parsing, printing,
//! transposition and the chord tokens of the LaTeX `songs` package.
//!
//! A chord is written as its tone followed by `-`-separated decorations,
//! e.g. `C-M7`, `D#-sus2-sus4` or `G-/H`. A lower-case tone is shorthand for
//! a minor chord: `f#-7` is F# minor seventh.

use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SEMITONES: i32 = 12;

/// Separates the tone from the decorations and the decorations from each other.
const DECORATION_SEPARATOR: char = '-';

/// Number of spellings in the tone table
const NUM_TONES: usize = 18;

/// (tone, name, pitch class, identifier) in declaration order of `Tone`
static TONE_TABLE: [(Tone, &str, u8, &str); NUM_TONES] = [
    (Tone::C,  "C",  0,  "c"),
    (Tone::Cs, "C#", 1,  "cx"),
    (Tone::Db, "Db", 1,  "db"),
    (Tone::D,  "D",  2,  "d"),
    (Tone::Ds, "D#", 3,  "dx"),
    (Tone::Eb, "Eb", 3,  "eb"),
    (Tone::E,  "E",  4,  "e"),
    (Tone::F,  "F",  5,  "f"),
    (Tone::Fs, "F#", 6,  "fx"),
    (Tone::Gb, "Gb", 6,  "gb"),
    (Tone::G,  "G",  7,  "g"),
    (Tone::Gs, "G#", 8,  "gx"),
    (Tone::Ab, "Ab", 8,  "ab"),
    (Tone::A,  "A",  9,  "a"),
    (Tone::As, "A#", 10, "ax"),
    (Tone::Bb, "Bb", 10, "bb"),
    (Tone::B,  "B",  11, "b"),
    (Tone::H,  "H",  11, "b"),
];

/// Bass decorations sort by the byte order of the bass tone's name.
const BASS_ORDER: [Tone; NUM_TONES] = [
    Tone::A, Tone::As, Tone::Ab, Tone::B, Tone::Bb, Tone::C,
    Tone::Cs, Tone::D, Tone::Ds, Tone::Db, Tone::E, Tone::Eb,
    Tone::F, Tone::Fs, Tone::G, Tone::Gs, Tone::Gb, Tone::H,
];

/// Number of decorations that are not a bass tone
const NUM_PLAIN_DECORATIONS: usize = 7;

/// Errors when reading a chord from text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordError {
    /// The tone is not in the tone table, not even as a minor shorthand.
    #[error("unknown tone `{0}`")]
    UnknownTone(String),

    /// A decoration token is neither in the vocabulary nor a `/<tone>` bass.
    #[error("unknown chord decoration `{0}`")]
    UnknownDecoration(String),
}

/// Every tone spelling the songbook accepts.
///
/// Several spellings can share a pitch class (C# and Db); both B and H name
/// pitch class 11.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tone {
    /// C
    C,
    /// C sharp
    Cs,
    /// D flat
    Db,
    /// D
    D,
    /// D sharp
    Ds,
    /// E flat
    Eb,
    /// E
    E,
    /// F
    F,
    /// F sharp
    Fs,
    /// G flat
    Gb,
    /// G
    G,
    /// G sharp
    Gs,
    /// A flat
    Ab,
    /// A
    A,
    /// A sharp
    As,
    /// B flat
    Bb,
    /// B, the English name of H
    B,
    /// H
    H,
}

impl Tone {
    /// All spellings, in pitch-class order.
    pub const ALL: [Tone; NUM_TONES] = [
        Tone::C, Tone::Cs, Tone::Db, Tone::D, Tone::Ds, Tone::Eb,
        Tone::E, Tone::F, Tone::Fs, Tone::Gb, Tone::G, Tone::Gs,
        Tone::Ab, Tone::A, Tone::As, Tone::Bb, Tone::B, Tone::H,
    ];

    fn entry(self) -> &'static (Tone, &'static str, u8, &'static str) {
        &TONE_TABLE[self as usize]
    }

    /// Look a tone up by its exact (case-sensitive) name.
    pub fn from_name(name: &str) -> Option<Tone> {
        TONE_TABLE
            .iter()
            .find(|(_, n, _, _)| *n == name)
            .map(|(tone, _, _, _)| *tone)
    }

    /// Printed name, e.g. `"C#"`.
    pub fn name(self) -> &'static str {
        self.entry().1
    }

    /// Pitch class in `0..12`, C being 0.
    pub fn pitch_class(self) -> u8 {
        self.entry().2
    }

    /// Name safe for file names and LaTeX macros (`"cx"` for C#).
    pub fn identifier(self) -> &'static str {
        self.entry().3
    }

    /// Whether the spelling uses a flat (Db, Eb, Gb, Ab, Bb).
    pub fn is_flat(self) -> bool {
        self.name().contains('b')
    }

    /// How hard a chord built on this tone is to play on a guitar.
    pub const fn difficulty(self) -> Difficulty {
        match self {
            Tone::C | Tone::D | Tone::E | Tone::G | Tone::A => Difficulty::Open,
            Tone::F | Tone::Fs | Tone::Gs | Tone::Gb | Tone::Ab => Difficulty::BarreE,
            Tone::As | Tone::H | Tone::Cs | Tone::Bb | Tone::B | Tone::Db => Difficulty::BarreA,
            Tone::Ds | Tone::Eb => Difficulty::BarreAHard,
        }
    }

    /// Spell `pitch_class` the way this tone is spelled: pitch class 11 is
    /// always H, otherwise flats stay flats and sharps stay sharps.
    fn respell(self, pitch_class: u8) -> Tone {
        let candidates: Vec<Tone> = Tone::ALL
            .into_iter()
            .filter(|t| t.pitch_class() == pitch_class)
            .collect();
        match candidates.as_slice() {
            [only] => *only,
            _ if pitch_class == Tone::H.pitch_class() => Tone::H,
            _ => {
                let flat = self.is_flat();
                let matching: Vec<Tone> = candidates
                    .iter()
                    .copied()
                    .filter(|t| t.is_flat() == flat)
                    .collect();
                assert_eq!(
                    matching.len(),
                    1,
                    "pitch class {pitch_class} must have exactly one spelling with flat = {flat}"
                );
                matching[0]
            }
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Guitar difficulty tiers, easiest first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
    /// Open-position chord (C, D, E, G, A)
    Open,
    /// Barre chord from the E shape (F, F#, G#)
    BarreE,
    /// Barre chord from the A shape (A#, H, C#)
    BarreA,
    /// Barre chord from the A shape, high up the neck (D#)
    BarreAHard,
}

/// A chord quality or bass-note suffix.
///
/// Decorations sort in vocabulary order: minor first, then `5`, `6`, `7`,
/// `sus2`, `sus4`, `M7` and the bass tones.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Decoration {
    /// Minor (`m`), printed as a lower-case tone
    Minor,
    /// Power chord (`5`)
    Power,
    /// Added sixth (`6`)
    Six,
    /// Seventh (`7`)
    Seven,
    /// Suspended second (`sus2`)
    Sus2,
    /// Suspended fourth (`sus4`)
    Sus4,
    /// Major seventh (`M7`)
    MajorSeven,
    /// Over a bass tone (`/A`)
    Bass(Tone),
}

impl Decoration {
    /// Position in the canonical decoration order.
    pub fn index(self) -> usize {
        match self {
            Decoration::Minor => 0,
            Decoration::Power => 1,
            Decoration::Six => 2,
            Decoration::Seven => 3,
            Decoration::Sus2 => 4,
            Decoration::Sus4 => 5,
            Decoration::MajorSeven => 6,
            Decoration::Bass(tone) => {
                let rank = BASS_ORDER
                    .iter()
                    .position(|t| *t == tone)
                    .unwrap_or(NUM_TONES);
                NUM_PLAIN_DECORATIONS + rank
            }
        }
    }

    /// Read a single decoration token such as `sus4` or `/F#`.
    pub fn from_token(token: &str) -> Option<Decoration> {
        match token {
            "m" => Some(Decoration::Minor),
            "5" => Some(Decoration::Power),
            "6" => Some(Decoration::Six),
            "7" => Some(Decoration::Seven),
            "sus2" => Some(Decoration::Sus2),
            "sus4" => Some(Decoration::Sus4),
            "M7" => Some(Decoration::MajorSeven),
            other => other
                .strip_prefix('/')
                .and_then(Tone::from_name)
                .map(Decoration::Bass),
        }
    }
}

impl Ord for Decoration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index().cmp(&other.index())
    }
}

impl PartialOrd for Decoration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Decoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decoration::Minor => f.write_str("m"),
            Decoration::Power => f.write_str("5"),
            Decoration::Six => f.write_str("6"),
            Decoration::Seven => f.write_str("7"),
            Decoration::Sus2 => f.write_str("sus2"),
            Decoration::Sus4 => f.write_str("sus4"),
            Decoration::MajorSeven => f.write_str("M7"),
            Decoration::Bass(tone) => write!(f, "/{tone}"),
        }
    }
}

/// A chord: a tone plus a set of decorations.
///
/// Decorations are kept sorted and free of duplicates, so two chords built
/// from the same decorations in a different order are equal. Chords order by
/// pitch class first, then by decorations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Chord {
    tone: Tone,
    decorations: Vec<Decoration>,
}

impl Chord {
    /// Build a chord from a tone and decorations in any order.
    pub fn new(tone: Tone, decorations: impl IntoIterator<Item = Decoration>) -> Self {
        let mut decorations: Vec<Decoration> = decorations.into_iter().collect();
        decorations.sort();
        decorations.dedup();
        Chord { tone, decorations }
    }

    /// A chord without decorations.
    pub fn major(tone: Tone) -> Self {
        Chord::new(tone, [])
    }

    /// Read a chord such as `C-M7`, `f#` or `G-/H`.
    ///
    /// A tone that is not in the table is retried with its first letter
    /// upper-cased and read as a minor chord.
    pub fn parse(text: &str) -> Result<Chord, ChordError> {
        let mut atoms = text.split(DECORATION_SEPARATOR);
        let head = atoms.next().unwrap_or_default();

        let mut decorations = Vec::new();
        let tone = match Tone::from_name(head) {
            Some(tone) => tone,
            None => {
                decorations.push(Decoration::Minor);
                Tone::from_name(&capitalize(head))
                    .ok_or_else(|| ChordError::UnknownTone(head.to_string()))?
            }
        };

        for atom in atoms {
            let decoration = Decoration::from_token(atom)
                .ok_or_else(|| ChordError::UnknownDecoration(atom.to_string()))?;
            decorations.push(decoration);
        }

        Ok(Chord::new(tone, decorations))
    }

    /// Base tone of the chord.
    pub fn tone(&self) -> Tone {
        self.tone
    }

    /// Decorations in canonical order.
    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    /// Whether the chord is minor.
    pub fn is_minor(&self) -> bool {
        self.decorations.first() == Some(&Decoration::Minor)
    }

    /// Difficulty tier, decided by the base tone alone.
    pub fn difficulty(&self) -> Difficulty {
        self.tone.difficulty()
    }

    /// Shift the chord by `half_tones` (any sign, any size).
    ///
    /// The new tone keeps the flat or sharp spelling of the old one, except
    /// that pitch class 11 is always spelled H. Decorations are kept as they
    /// are. A shift by whole octaves returns the chord unchanged.
    pub fn transpose(&self, half_tones: i32) -> Chord {
        let shift = half_tones.rem_euclid(SEMITONES);
        if shift == 0 {
            return self.clone();
        }
        let target = (i32::from(self.tone.pitch_class()) + shift) % SEMITONES;
        Chord {
            tone: self.tone.respell(target as u8),
            decorations: self.decorations.clone(),
        }
    }

    /// Chord token for the LaTeX `songs` package, e.g. `\[C#]` or
    /// `\[D#$^\text{ 7-sus2}$]`.
    pub fn latex(&self) -> String {
        let text = self.to_string();
        match text.split_once(DECORATION_SEPARATOR) {
            Some((main, decoration)) => format!("\\[{main}$^\\text{{ {decoration}}}$]"),
            None => format!("\\[{text}]"),
        }
    }

    /// Body of the chord token with `#` and `&` replaced by the `\shrp` and
    /// `\flt` macros, for chord-table headings.
    pub fn latex_grip(&self) -> String {
        let token = self.latex();
        let body = token
            .strip_prefix("\\[")
            .and_then(|t| t.strip_suffix(']'))
            .unwrap_or(&token);
        body.replace('#', "\\shrp").replace('&', "\\flt")
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut decorations = self.decorations.iter();
        if self.is_minor() {
            f.write_str(&self.tone.name().to_lowercase())?;
            decorations.next();
        } else {
            f.write_str(self.tone.name())?;
        }
        for decoration in decorations {
            write!(f, "{DECORATION_SEPARATOR}{decoration}")?;
        }
        Ok(())
    }
}

impl FromStr for Chord {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chord::parse(s)
    }
}

impl TryFrom<String> for Chord {
    type Error = ChordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Chord::parse(&value)
    }
}

impl From<Chord> for String {
    fn from(chord: Chord) -> Self {
        chord.to_string()
    }
}

impl Ord for Chord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tone
            .pitch_class()
            .cmp(&other.tone.pitch_class())
            .then_with(|| self.decorations.cmp(&other.decorations))
            .then_with(|| self.tone.cmp(&other.tone))
    }
}

impl PartialOrd for Chord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
