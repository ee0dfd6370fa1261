//! Songbook
//!
//! A collection of songs stored as JSON records, and the LaTeX document that
//! typesets it. The document comes from a template holding the placeholders
//! below; the chord table placeholder receives one `\printchordtable` line
//! per distinct chord of the book.

use std::{
    collections::BTreeSet,
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{info, warn};

use crate::chord::Chord;
use crate::song::{read_song, Song, SongError};

/// Extension of songbook files.
pub const SONGBOOK_EXTENSION: &str = "json";

/// Replaced by the `\beginsong` blocks.
pub const SONGS_PLACEHOLDER: &str = "SONGS_PLACEHOLDER";
/// Replaced by the chord table headings.
pub const CHORDS_PLACEHOLDER: &str = "CHORDS_PLACEHOLDER";
/// Replaced by the book title.
pub const TITLE_PLACEHOLDER: &str = "TITLE_PLACEHOLDER";
/// Replaced by the book author.
pub const AUTHOR_PLACEHOLDER: &str = "AUTHOR_PLACEHOLDER";

/// Errors when loading, saving or typesetting a songbook
#[derive(Debug, Error)]
pub enum SongbookError {
    /// The songbook file could not be read or written.
    #[error("{}: {source}", .path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying failure.
        source: io::Error,
    },

    /// The songbook file is not a valid list of song records.
    #[error("{}: malformed songbook: {source}", .path.display())]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying failure.
        source: serde_json::Error,
    },

    /// A song file could not be read.
    #[error("{}: {source}", .path.display())]
    Song {
        /// Song file involved.
        path: PathBuf,
        /// Underlying failure.
        source: SongError,
    },

    /// The songbook file already exists and may not be replaced.
    #[error("songbook {} already exists", .0.display())]
    Exists(PathBuf),

    /// The songbook file name does not end in `.json`.
    #[error("songbook file {} must end with .json", .0.display())]
    Extension(PathBuf),
}

/// A set of songs bound to a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Songbook {
    path: PathBuf,
    songs: Vec<Song>,
}

impl Songbook {
    /// Load the songbook at `path`, or start an empty one if the file does
    /// not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SongbookError> {
        let path = path.into();
        if path.extension().and_then(|e| e.to_str()) != Some(SONGBOOK_EXTENSION) {
            return Err(SongbookError::Extension(path));
        }

        if !path.exists() {
            info!("Creating songbook {:?}", path);
            return Ok(Songbook {
                path,
                songs: Vec::new(),
            });
        }

        info!("Reading songbook {:?}", path);
        let text = fs::read_to_string(&path).map_err(|source| SongbookError::Io {
            path: path.clone(),
            source,
        })?;
        let songs = serde_json::from_str(&text).map_err(|source| SongbookError::Json {
            path: path.clone(),
            source,
        })?;
        Ok(Songbook { path, songs })
    }

    /// Build a songbook at `path` from song text files and save it.
    ///
    /// An existing songbook file is replaced only when `overwrite` is set,
    /// otherwise `SongbookError::Exists` is returned and nothing is written.
    pub fn from_song_files<P: AsRef<Path>>(
        path: impl Into<PathBuf>,
        song_files: &[P],
        overwrite: bool,
    ) -> Result<Self, SongbookError> {
        let path = path.into();
        if path.exists() && !overwrite {
            return Err(SongbookError::Exists(path));
        }
        let mut book = Songbook::open(path)?;
        let songs = song_files
            .iter()
            .map(|file| {
                read_song(file).map_err(|source| SongbookError::Song {
                    path: file.as_ref().to_path_buf(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        book.set_songs(songs);
        book.save()?;
        Ok(book)
    }

    /// Where the songbook is stored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The songs, in their current order.
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Append songs.
    pub fn add_songs(&mut self, songs: impl IntoIterator<Item = Song>) {
        self.songs.extend(songs);
    }

    /// Replace every song.
    pub fn set_songs(&mut self, songs: Vec<Song>) {
        self.songs = songs;
    }

    /// Remove every song.
    pub fn clear_songs(&mut self) {
        self.songs.clear();
    }

    /// Order songs by artist, then title, ignoring case.
    pub fn sort_songs(&mut self) {
        self.songs
            .sort_by_cached_key(|song| (song.artist().to_uppercase(), song.title().to_uppercase()));
    }

    /// Sort the songs and write the songbook to its file, creating missing
    /// directories.
    pub fn save(&mut self) -> Result<(), SongbookError> {
        self.sort_songs();
        let io_error = |source| SongbookError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(&self.songs).map_err(|source| SongbookError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(io_error)?;
        info!("Saved {} songs to {:?}", self.songs.len(), self.path);
        Ok(())
    }

    /// Every distinct chord used in the book, sorted.
    pub fn chords(&self) -> BTreeSet<Chord> {
        self.songs
            .iter()
            .flat_map(Song::verses)
            .flat_map(|verse| verse.chords().cloned())
            .collect()
    }

    /// Fill a LaTeX template with the songs and chord table headings.
    pub fn latex_document(&self, template: &str, title: &str, author: &str) -> String {
        let songs = self
            .songs
            .iter()
            .map(Song::latex)
            .collect::<Vec<_>>()
            .join("\n\n");
        let chords = self
            .chords()
            .iter()
            .map(|chord| format!("\\printchordtable{{{}}}", chord.latex_grip()))
            .collect::<Vec<_>>()
            .join("\n");
        template
            .replace(TITLE_PLACEHOLDER, title)
            .replace(AUTHOR_PLACEHOLDER, author)
            .replace(CHORDS_PLACEHOLDER, &chords)
            .replace(SONGS_PLACEHOLDER, &songs)
    }

    /// Write [`Songbook::latex_document`] to `tex_file`, appending `.tex`
    /// when missing. Returns the path written.
    pub fn write_tex(
        &self,
        tex_file: impl Into<PathBuf>,
        template: &str,
        title: &str,
        author: &str,
    ) -> Result<PathBuf, SongbookError> {
        let mut tex_file = tex_file.into();
        if tex_file.extension().and_then(|e| e.to_str()) != Some("tex") {
            warn!("Appending .tex to {:?}", tex_file);
            let mut name = tex_file.into_os_string();
            name.push(".tex");
            tex_file = PathBuf::from(name);
        }
        fs::write(&tex_file, self.latex_document(template, title, author)).map_err(|source| {
            SongbookError::Io {
                path: tex_file.clone(),
                source,
            }
        })?;
        info!("Wrote {:?}", tex_file);
        Ok(tex_file)
    }
}
