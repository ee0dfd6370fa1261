//! Song
//!
//! Stanzas, songs and the plain-text song file format:
//!
//! ```text
//! ljudska
//! Kuža pazi
//! <C>Kuža pazi, <G>z repkom miga, <C>vstane, <G>leže, <C>tačko da.
//! <C>Hišo čuva, <G>jezno laja, <C>če ni<G>kogar <C>ni doma.
//!
//! <C>Ko pa Jurček <G>cicibanček <C>truden <G>se od<C>pravi spat,
//! ```
//!
//! The first line names the artist, the second the title; the remaining
//! lines are verses, with blank lines between stanzas.

use std::{fmt, fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::layout::Layout;
use crate::verse::{parse_verse, Verse, VerseError};

/// Artist of a folk song.
pub const FOLK: &str = "ljudska";

/// Artist placeholder when the author is not known.
pub const UNKNOWN_ARTIST: &str = "neznano";

/// Errors when reading or writing a song file
#[derive(Debug, Error)]
pub enum SongError {
    /// The song file could not be read or written.
    #[error("song file i/o: {0}")]
    Io(#[from] io::Error),

    /// The artist or title line is missing.
    #[error("song has no {0} line")]
    MissingHeader(&'static str),

    /// A verse line is malformed.
    #[error("line {line}: {source}")]
    Verse {
        /// One-based line number in the song text.
        line: usize,
        /// What is wrong with the verse.
        source: VerseError,
    },
}

/// A group of verses sung together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stanza {
    verses: Vec<Verse>,
}

impl Stanza {
    /// Build a stanza from its verses.
    pub fn new(verses: Vec<Verse>) -> Self {
        Stanza { verses }
    }

    /// The verses, in order.
    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    /// `\beginverse ... \endverse` block for the LaTeX `songs` package.
    pub fn latex(&self) -> String {
        Layout::default().render_stanza_typeset(self)
    }
}

impl fmt::Display for Stanza {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Layout::default().render_stanza_visual(self))
    }
}

/// A song: artist, title and stanzas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Song {
    artist: String,
    title: String,
    stanzas: Vec<Stanza>,
}

impl Song {
    /// Build a song. `artist` may list several names separated by commas.
    pub fn new(artist: impl Into<String>, title: impl Into<String>, stanzas: Vec<Stanza>) -> Self {
        Song {
            artist: artist.into(),
            title: title.into(),
            stanzas,
        }
    }

    /// The artist line.
    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// The title line.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The stanzas, in order.
    pub fn stanzas(&self) -> &[Stanza] {
        &self.stanzas
    }

    /// Same song with different stanzas.
    pub(crate) fn with_stanzas(&self, stanzas: Vec<Stanza>) -> Song {
        Song {
            artist: self.artist.clone(),
            title: self.title.clone(),
            stanzas,
        }
    }

    /// Every verse of every stanza.
    pub fn verses(&self) -> impl Iterator<Item = &Verse> {
        self.stanzas.iter().flat_map(|s| s.verses.iter())
    }

    /// `\beginsong ... \endsong` block for the LaTeX `songs` package.
    pub fn latex(&self) -> String {
        Layout::default().render_song_typeset(self)
    }

    /// The song in the text file format, the inverse of [`parse_song`].
    pub fn to_text(&self) -> String {
        let mut out = format!("{}\n{}\n", self.artist, self.title);
        for stanza in &self.stanzas {
            for verse in &stanza.verses {
                out.push_str(&verse.annotated());
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Layout::default().render_song_visual(self))
    }
}

/// Read a song from the text format.
///
/// Lines are trimmed. Blank lines close the current stanza; several blank
/// lines in a row do not produce empty stanzas. A blank artist line reads as
/// [`UNKNOWN_ARTIST`].
pub fn parse_song(text: &str) -> Result<Song, SongError> {
    let mut lines = text.lines().map(str::trim);
    let artist = match lines.next().ok_or(SongError::MissingHeader("artist"))? {
        "" => UNKNOWN_ARTIST,
        artist => artist,
    };
    let title = lines.next().ok_or(SongError::MissingHeader("title"))?;

    let mut stanzas = Vec::new();
    let mut current = Vec::new();
    for (i, line) in lines.enumerate() {
        if line.is_empty() {
            if !current.is_empty() {
                stanzas.push(Stanza::new(std::mem::take(&mut current)));
            }
            continue;
        }
        let verse = parse_verse(line).map_err(|source| SongError::Verse {
            line: i + 3,
            source,
        })?;
        current.push(verse);
    }
    if !current.is_empty() {
        stanzas.push(Stanza::new(current));
    }

    Ok(Song::new(artist, title, stanzas))
}

/// Read a song file.
pub fn read_song(path: impl AsRef<Path>) -> Result<Song, SongError> {
    let path = path.as_ref();
    let song = parse_song(&fs::read_to_string(path)?)?;
    debug!("Read song {:?} from {:?}", song.title(), path);
    Ok(song)
}

/// Write a song file.
pub fn write_song(path: impl AsRef<Path>, song: &Song) -> Result<(), SongError> {
    fs::write(path, song.to_text())?;
    Ok(())
}
