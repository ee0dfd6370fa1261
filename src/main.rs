//! Command line front end for songbook files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use songbook::{optimal_transposition, read_song, Song, Songbook, Transpose};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "songbook")]
#[command(about = "Chord-over-lyrics layout, LaTeX songs output and transposition", version)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a song with chords above the lyrics
    Show {
        /// Song text file
        song: PathBuf,
        #[command(flatten)]
        key: KeyArgs,
    },
    /// Print a song as a LaTeX \beginsong block
    Latex {
        /// Song text file
        song: PathBuf,
        #[command(flatten)]
        key: KeyArgs,
    },
    /// Collect song text files into a songbook
    Build {
        /// Songbook file (.json)
        book: PathBuf,
        /// Song text files
        #[arg(required = true)]
        songs: Vec<PathBuf>,
        /// Replace an existing songbook file
        #[arg(short, long)]
        force: bool,
    },
    /// Typeset a songbook into a LaTeX document
    Tex {
        /// Songbook file (.json)
        book: PathBuf,
        /// LaTeX template with SONGS_PLACEHOLDER and CHORDS_PLACEHOLDER
        #[arg(short, long, env = "SONGBOOK_TEMPLATE")]
        template: PathBuf,
        /// Output file
        #[arg(short, long, default_value = "songbook.tex")]
        output: PathBuf,
        /// Book title
        #[arg(long, default_value = "")]
        title: String,
        /// Book author
        #[arg(long, default_value = "")]
        author: String,
    },
    /// List the chords used in a songbook
    Chords {
        /// Songbook file (.json)
        book: PathBuf,
    },
}

#[derive(Args)]
struct KeyArgs {
    /// Shift every chord by this many half tones
    #[arg(short, long, allow_hyphen_values = true, conflicts_with = "easiest")]
    transpose: Option<i32>,
    /// Move the song to the key with the easiest chords
    #[arg(short, long)]
    easiest: bool,
}

impl KeyArgs {
    fn apply(&self, song: Song) -> Song {
        if self.easiest {
            let best = optimal_transposition(&song);
            info!("Transposing by {} half tones", best.shift);
            best.value
        } else if let Some(half_tones) = self.transpose {
            song.transpose(half_tones)
        } else {
            song
        }
    }
}

fn load_song(path: &Path, key: &KeyArgs) -> Result<Song> {
    let song = read_song(path).with_context(|| format!("failed to read song {path:?}"))?;
    Ok(key.apply(song))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("songbook={level}").parse()?),
        )
        .init();

    match cli.command {
        Command::Show { song, key } => {
            println!("{}", load_song(&song, &key)?);
        }
        Command::Latex { song, key } => {
            println!("{}", load_song(&song, &key)?.latex());
        }
        Command::Build { book, songs, force } => {
            let book = Songbook::from_song_files(book, &songs, force)?;
            info!("Songbook {:?} holds {} songs", book.path(), book.songs().len());
        }
        Command::Tex {
            book,
            template,
            output,
            title,
            author,
        } => {
            let book = Songbook::open(book)?;
            let template = fs::read_to_string(&template)
                .with_context(|| format!("failed to read template {template:?}"))?;
            book.write_tex(output, &template, &title, &author)?;
        }
        Command::Chords { book } => {
            let book = Songbook::open(book)?;
            let chords: Vec<String> = book.chords().iter().map(ToString::to_string).collect();
            println!("{}", chords.join(" "));
        }
    }

    Ok(())
}
