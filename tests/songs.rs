//! Integration tests over the song files in `tests/songs`.

use lazy_static::lazy_static;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use songbook::{optimal_transposition, parse_song, read_song, Layout, Song, Transpose, Verse};
use std::path::PathBuf;
use walkdir::WalkDir;

/// A song file and what was read from it
#[derive(Debug, Clone)]
struct SongFile {
    filename: String,
    song: Song,
}

impl SongFile {
    fn from_path(path: PathBuf) -> Option<Self> {
        let filename = path.file_name()?.to_str()?.to_string();
        let song = match read_song(&path) {
            Ok(song) => song,
            Err(e) => panic!("{filename}: {e}"),
        };
        Some(SongFile { filename, song })
    }
}

/// Gather all .txt files under `base`
fn collect_song_files(base: &str) -> Vec<SongFile> {
    WalkDir::new(base)
        .into_iter()
        .filter_map(Result::ok)
        .map(|e| e.path().to_path_buf())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("txt"))
        .filter_map(SongFile::from_path)
        .collect()
}

const SONG_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/songs");

lazy_static! {
    static ref SONG_FILES: Vec<SongFile> = collect_song_files(SONG_DIR);
}

fn with_chords(verse: &Verse) -> bool {
    !verse.annotations().is_empty()
}

#[test]
fn fixtures_are_found() {
    assert!(SONG_FILES.len() >= 4, "only {} song files", SONG_FILES.len());
    assert!(SONG_FILES.iter().all(|sf| !sf.song.stanzas().is_empty()));
}

#[test]
fn annotations_are_sorted_and_in_range() {
    SONG_FILES.par_iter().for_each(|sf| {
        for verse in sf.song.verses() {
            let len = verse.lyrics().chars().count();
            let offsets: Vec<usize> = verse.annotations().iter().map(|a| a.offset).collect();
            assert!(offsets.windows(2).all(|w| w[0] <= w[1]), "{}: {offsets:?}", sf.filename);
            assert!(offsets.iter().all(|&o| o <= len), "{}: {offsets:?}", sf.filename);
        }
    });
}

#[test]
fn text_form_round_trips() {
    SONG_FILES.par_iter().for_each(|sf| {
        let again = parse_song(&sf.song.to_text()).unwrap();
        assert_eq!(again, sf.song, "{}", sf.filename);
    });
}

#[test]
fn labels_on_a_shelf_never_overlap() {
    let layout = Layout::new();
    SONG_FILES.par_iter().for_each(|sf| {
        for verse in sf.song.verses() {
            let placements = layout.place_labels(verse);
            assert_eq!(placements.len(), verse.annotations().len());
            for (i, a) in placements.iter().enumerate() {
                for b in &placements[i + 1..] {
                    if a.shelf == b.shelf {
                        assert!(
                            a.end() < b.column || b.end() < a.column,
                            "{}: {a:?} overlaps {b:?} in {:?}",
                            sf.filename,
                            verse.lyrics()
                        );
                    }
                }
            }
        }
    });
}

#[test]
fn visual_layout_keeps_the_words() {
    SONG_FILES.par_iter().for_each(|sf| {
        for verse in sf.song.verses() {
            let rendered = verse.to_string();
            if !with_chords(verse) {
                assert_eq!(rendered, verse.lyrics());
                continue;
            }
            if verse.lyrics().trim().is_empty() {
                assert_eq!(rendered.lines().count(), 1);
                continue;
            }
            let lyric_row = rendered.lines().last().unwrap();
            let words: Vec<&str> = lyric_row.split_whitespace().collect();
            let expected: Vec<&str> = verse.lyrics().split_whitespace().collect();
            assert_eq!(words, expected, "{}", sf.filename);

            let rows: Vec<&str> = rendered.lines().collect();
            assert_eq!(rows.len() % 2, 1);
            let width = rows[0].chars().count();
            assert!(rows.iter().all(|r| r.chars().count() == width));
        }
    });
}

#[test]
fn typeset_layout_has_one_token_per_chord() {
    SONG_FILES.par_iter().for_each(|sf| {
        let latex = sf.song.latex();
        assert!(latex.starts_with(&format!("\\beginsong{{{}}}", sf.song.title())));
        assert!(latex.ends_with("\\endsong"));
        let chords: usize = sf.song.verses().map(|v| v.annotations().len()).sum();
        assert_eq!(latex.matches("\\[").count(), chords, "{}", sf.filename);
    });
}

#[test]
fn octave_shift_keeps_pitch_classes() {
    SONG_FILES.par_iter().for_each(|sf| {
        let moved = sf.song.transpose(12);
        for (before, after) in sf.song.verses().zip(moved.verses()) {
            assert_eq!(before.lyrics(), after.lyrics());
            for (a, b) in before.chords().zip(after.chords()) {
                assert_eq!(a.tone().pitch_class(), b.tone().pitch_class(), "{}", sf.filename);
                assert_eq!(a.decorations(), b.decorations());
            }
        }
    });
}

#[test]
fn easiest_key_is_never_harder() {
    SONG_FILES.par_iter().for_each(|sf| {
        let best = optimal_transposition(&sf.song);
        assert!(best.difficulty <= sf.song.max_difficulty(), "{}", sf.filename);
        assert!(best.shift.abs() <= 6);
        assert_eq!(best.value, sf.song.transpose(best.shift));
        assert_eq!(best.difficulty, best.value.max_difficulty());
    });
}
