//! # songbook
//!
//! Typeset chord-annotated lyrics: lay chord names out above the words, emit
//! LaTeX for the `songs` package, and transpose songs to their easiest key.
//!
//! ## Example
//! ```rust
//! use songbook::{optimal_transposition, parse_verse, render_typeset, Song, Stanza};
//!
//! fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1) Read a line with inline chord markers
//!     let verse = parse_verse("<C>Kuža pazi, <G>z repkom miga")?;
//!
//!     // 2) Chords above the lyrics
//!     println!("{verse}");
//!
//!     // 3) Inline form for LaTeX
//!     assert_eq!(render_typeset(&verse), "\\[C]Kuža pazi, \\[G]z repkom miga");
//!
//!     // 4) Find the easiest key of a song
//!     let song = Song::new("ljudska", "Kuža pazi", vec![Stanza::new(vec![verse])]);
//!     let best = optimal_transposition(&song);
//!     println!("shift by {} half tones", best.shift);
//!
//!     Ok(())
//! }
//! # run().unwrap();
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rust_2018_idioms)]
#![deny(clippy::all)]

/// Tones, decorations and chords.
pub use chord::{Chord, ChordError, Decoration, Difficulty, Tone};

/// Lyrics lines with chords.
pub use verse::{parse_verse, ChordAnnotation, Verse, VerseError};

/// Visual and typeset rendering.
pub use layout::{render_typeset, render_visual, LabelPlacement, Layout, LayoutBuilder};

/// Stanzas, songs and song files.
pub use song::{parse_song, read_song, write_song, Song, SongError, Stanza};

/// Key changes and the easiest-key search.
pub use transpose::{optimal_transposition, Transpose, Transposition};

/// Songbook collections.
pub use songbook::{Songbook, SongbookError};

/// Chord model module.
pub mod chord;

/// Annotated line module.
pub mod verse;

/// Layout module.
pub mod layout;

/// Song structure module.
pub mod song;

/// Transposition module.
pub mod transpose;

/// Songbook module.
pub mod songbook;
