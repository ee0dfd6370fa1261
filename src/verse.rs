//! Verse
//!
//! One line of lyrics with chords attached at character offsets, and the
//! parser for the inline `<chord>` marker syntax:
//!
//! ```text
//! <A>J's ne morem več <E>v temi živet
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chord::{Chord, ChordError};

const MARKER_OPEN: char = '<';
const MARKER_CLOSE: char = '>';

/// Errors when reading or building a verse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerseError {
    /// The text inside a chord marker is not a chord.
    #[error("invalid chord at character {position}: {source}")]
    Chord {
        /// Character index of the marker's `<` in the input line.
        position: usize,
        /// Why the chord was rejected.
        source: ChordError,
    },

    /// The line ended inside a chord marker.
    #[error("chord marker opened at character {position} is never closed")]
    UnterminatedChord {
        /// Character index of the unmatched `<`.
        position: usize,
    },

    /// A `<` appeared inside a chord marker.
    #[error("chord marker at character {position} opened inside the marker at {open}")]
    UnexpectedNesting {
        /// Character index of the nested `<`.
        position: usize,
        /// Character index of the enclosing `<`.
        open: usize,
    },

    /// A `>` appeared outside a chord marker.
    #[error("`>` at character {position} closes no chord marker")]
    UnexpectedClose {
        /// Character index of the stray `>`.
        position: usize,
    },

    /// A chord offset points past the end of the lyrics.
    #[error("chord offset {offset} is outside lyrics of {len} characters")]
    InvalidOffset {
        /// The rejected offset.
        offset: usize,
        /// Number of characters in the lyrics.
        len: usize,
    },
}

/// A chord starting at a character offset of the lyrics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChordAnnotation {
    /// The chord played.
    pub chord: Chord,
    /// Index of the lyric character (not byte) where the chord starts.
    pub offset: usize,
}

impl ChordAnnotation {
    /// Attach `chord` at `offset`.
    pub fn new(chord: Chord, offset: usize) -> Self {
        ChordAnnotation { chord, offset }
    }
}

/// A line of lyrics with its chords.
///
/// Annotations are sorted by offset and every offset lies in
/// `0..=lyrics.chars().count()`; an offset equal to the length is a chord
/// after the last word.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawVerse")]
pub struct Verse {
    lyrics: String,
    annotations: Vec<ChordAnnotation>,
}

#[derive(Deserialize)]
struct RawVerse {
    lyrics: String,
    annotations: Vec<ChordAnnotation>,
}

impl TryFrom<RawVerse> for Verse {
    type Error = VerseError;

    fn try_from(raw: RawVerse) -> Result<Self, Self::Error> {
        Verse::new(raw.lyrics, raw.annotations)
    }
}

impl Verse {
    /// Build a verse, sorting the annotations by offset.
    ///
    /// Returns `Err(VerseError::InvalidOffset)` if an offset lies past the
    /// end of `lyrics`.
    pub fn new(
        lyrics: impl Into<String>,
        mut annotations: Vec<ChordAnnotation>,
    ) -> Result<Self, VerseError> {
        let lyrics = lyrics.into();
        let len = lyrics.chars().count();
        if let Some(bad) = annotations.iter().find(|a| a.offset > len) {
            return Err(VerseError::InvalidOffset {
                offset: bad.offset,
                len,
            });
        }
        annotations.sort_by_key(|a| a.offset);
        Ok(Verse {
            lyrics,
            annotations,
        })
    }

    /// A verse without chords.
    pub fn plain(lyrics: impl Into<String>) -> Self {
        Verse {
            lyrics: lyrics.into(),
            annotations: Vec::new(),
        }
    }

    /// The lyrics with the chord markers removed.
    pub fn lyrics(&self) -> &str {
        &self.lyrics
    }

    /// Chords in offset order.
    pub fn annotations(&self) -> &[ChordAnnotation] {
        &self.annotations
    }

    /// Iterate over the chords alone.
    pub fn chords(&self) -> impl Iterator<Item = &Chord> {
        self.annotations.iter().map(|a| &a.chord)
    }

    /// Same lyrics and offsets, every chord replaced by `f(chord)`.
    pub(crate) fn map_chords(&self, f: impl Fn(&Chord) -> Chord) -> Verse {
        Verse {
            lyrics: self.lyrics.clone(),
            annotations: self
                .annotations
                .iter()
                .map(|a| ChordAnnotation::new(f(&a.chord), a.offset))
                .collect(),
        }
    }

    /// Write the verse back in `<chord>` marker form; the inverse of
    /// [`parse_verse`].
    pub fn annotated(&self) -> String {
        let mut out = String::with_capacity(self.lyrics.len() + 4 * self.annotations.len());
        let mut pending = self.annotations.iter().peekable();
        for (i, ch) in self.lyrics.chars().enumerate() {
            while let Some(a) = pending.next_if(|a| a.offset == i) {
                push_marker(&mut out, &a.chord);
            }
            out.push(ch);
        }
        for a in pending {
            push_marker(&mut out, &a.chord);
        }
        out
    }
}

fn push_marker(out: &mut String, chord: &Chord) {
    out.push(MARKER_OPEN);
    out.push_str(&chord.to_string());
    out.push(MARKER_CLOSE);
}

impl fmt::Display for Verse {
    /// Chord-over-lyrics layout with the default [`Layout`](crate::Layout).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::layout::render_visual(self))
    }
}

/// Chord marker being read
struct OpenMarker {
    position: usize,
    offset: usize,
    text: String,
}

/// Split a line with `<chord>` markers into lyrics and chord annotations.
///
/// A marker's offset is the number of lyric characters before it, so
/// adjacent markers share an offset and a marker at the end of the line sits
/// at the lyrics' length.
pub fn parse_verse(line: &str) -> Result<Verse, VerseError> {
    let mut lyrics = String::with_capacity(line.len());
    let mut lyric_len = 0;
    let mut annotations = Vec::new();
    let mut open: Option<OpenMarker> = None;

    for (position, ch) in line.chars().enumerate() {
        match ch {
            MARKER_OPEN => {
                if let Some(marker) = &open {
                    return Err(VerseError::UnexpectedNesting {
                        position,
                        open: marker.position,
                    });
                }
                open = Some(OpenMarker {
                    position,
                    offset: lyric_len,
                    text: String::new(),
                });
            }
            MARKER_CLOSE => {
                let marker = open
                    .take()
                    .ok_or(VerseError::UnexpectedClose { position })?;
                let chord = Chord::parse(&marker.text).map_err(|source| VerseError::Chord {
                    position: marker.position,
                    source,
                })?;
                annotations.push(ChordAnnotation::new(chord, marker.offset));
            }
            _ => match open.as_mut() {
                Some(marker) => marker.text.push(ch),
                None => {
                    lyrics.push(ch);
                    lyric_len += 1;
                }
            },
        }
    }

    if let Some(marker) = open {
        return Err(VerseError::UnterminatedChord {
            position: marker.position,
        });
    }

    Ok(Verse {
        lyrics,
        annotations,
    })
}
