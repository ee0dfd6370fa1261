//! Transpose
//!
//! Structural transposition of chords, verses, stanzas and songs, and the
//! search for the shift that makes a song easiest to play.

use tracing::debug;

use crate::chord::{Chord, Difficulty};
use crate::song::{Song, Stanza};
use crate::verse::Verse;

/// Largest shift tried in either direction, a tritone.
pub const MAX_SHIFT: i32 = 6;

/// Anything built from chords that can change key.
pub trait Transpose: Sized {
    /// Copy with every chord shifted by `half_tones`.
    fn transpose(&self, half_tones: i32) -> Self;

    /// Hardest chord difficulty contained, `None` without chords.
    fn max_difficulty(&self) -> Option<Difficulty>;
}

impl Transpose for Chord {
    fn transpose(&self, half_tones: i32) -> Self {
        Chord::transpose(self, half_tones)
    }

    fn max_difficulty(&self) -> Option<Difficulty> {
        Some(self.difficulty())
    }
}

impl Transpose for Verse {
    fn transpose(&self, half_tones: i32) -> Self {
        self.map_chords(|chord| chord.transpose(half_tones))
    }

    fn max_difficulty(&self) -> Option<Difficulty> {
        self.chords().map(Chord::difficulty).max()
    }
}

impl Transpose for Stanza {
    fn transpose(&self, half_tones: i32) -> Self {
        Stanza::new(self.verses().iter().map(|v| v.transpose(half_tones)).collect())
    }

    fn max_difficulty(&self) -> Option<Difficulty> {
        self.verses().iter().filter_map(Verse::max_difficulty).max()
    }
}

impl Transpose for Song {
    fn transpose(&self, half_tones: i32) -> Self {
        self.with_stanzas(self.stanzas().iter().map(|s| s.transpose(half_tones)).collect())
    }

    fn max_difficulty(&self) -> Option<Difficulty> {
        self.stanzas().iter().filter_map(Stanza::max_difficulty).max()
    }
}

/// Outcome of [`optimal_transposition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transposition<T> {
    /// Half tones the input was shifted by.
    pub shift: i32,
    /// Hardest chord after the shift.
    pub difficulty: Option<Difficulty>,
    /// The shifted value.
    pub value: T,
}

/// Try every shift in `-6..=6` and keep the one whose hardest chord is
/// easiest.
///
/// On a tie the smaller shift wins, and of two shifts of equal size the
/// upward one.
pub fn optimal_transposition<T: Transpose>(item: &T) -> Transposition<T> {
    let mut best = Transposition {
        shift: 0,
        difficulty: item.max_difficulty(),
        value: item.transpose(0),
    };
    for half_tones in 1..=MAX_SHIFT {
        for shift in [half_tones, -half_tones] {
            let value = item.transpose(shift);
            let difficulty = value.max_difficulty();
            if difficulty < best.difficulty {
                best = Transposition {
                    shift,
                    difficulty,
                    value,
                };
            }
        }
    }
    debug!(shift = best.shift, difficulty = ?best.difficulty, "optimal transposition");
    best
}

impl Song {
    /// The song in its easiest key, see [`optimal_transposition`].
    pub fn easiest_version(&self) -> Song {
        optimal_transposition(self).value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song::parse_song;
    use crate::verse::parse_verse;

    fn verse(line: &str) -> Verse {
        parse_verse(line).unwrap()
    }

    fn song_in(chords: &[&str]) -> Song {
        let line: String = chords.iter().map(|c| format!("<{c}>la ")).collect();
        Song::new("a", "t", vec![Stanza::new(vec![verse(line.trim_end())])])
    }

    #[test]
    fn verse_transposition() {
        let v = verse("<A>J's ne morem več <E>v temi živet");
        for (half_tones, expected) in [
            (0, "<A>J's ne morem več <E>v temi živet"),
            (2, "<H>J's ne morem več <F#>v temi živet"),
            (10, "<G>J's ne morem več <D>v temi živet"),
            (-2, "<G>J's ne morem več <D>v temi živet"),
        ] {
            assert_eq!(v.transpose(half_tones), verse(expected));
        }

        let v = verse("<C> <G-7> <C> <G-7>");
        assert_eq!(v.transpose(2), verse("<D> <A-7> <D> <A-7>"));
        assert_eq!(v.transpose(10), verse("<A#> <F-7> <A#> <F-7>"));
        assert_eq!(v.transpose(-2), verse("<A#> <F-7> <A#> <F-7>"));
    }

    #[test]
    fn stanza_transposition() {
        let stanza = |lines: [&str; 2]| Stanza::new(lines.map(verse).to_vec());
        let original = stanza(["<E>Ma nam jaz čaku, kaj si nor<D>,", "<E>zaštarta Francelj svoj mo<D>tor."]);
        let expected = stanza(["<F>Ma nam jaz čaku, kaj si nor<D#>,", "<F>zaštarta Francelj svoj mo<D#>tor."]);
        assert_eq!(original.transpose(1), expected);
    }

    #[test]
    fn song_transposition() {
        let original = parse_song(
            "ljudska\nKuža pazi\n\
             <C>Kuža pazi, <G>z repkom miga, <C>vstane, <G>leže, <C>tačko da.\n",
        )
        .unwrap();
        let expected = parse_song(
            "ljudska\nKuža pazi\n\
             <A#>Kuža pazi, <F>z repkom miga, <A#>vstane, <F>leže, <A#>tačko da.\n",
        )
        .unwrap();
        assert_eq!(original.transpose(-2), expected);
    }

    #[test]
    fn difficulty_is_the_hardest_chord() {
        assert_eq!(song_in(&["C", "G", "Eb", "F"]).max_difficulty(), Some(Difficulty::BarreAHard));
        assert_eq!(song_in(&[]).max_difficulty(), None);
        assert_eq!(verse("<a>la <E-7>la").max_difficulty(), Some(Difficulty::Open));
    }

    #[test]
    fn picks_the_easiest_key() {
        // Bb, F, C -> C, G, D
        let best = optimal_transposition(&song_in(&["A#", "F", "C"]));
        assert_eq!(best.shift, 2);
        assert_eq!(best.difficulty, Some(Difficulty::Open));
        assert_eq!(best.value, song_in(&["C", "G", "D"]));
    }

    #[test]
    fn hardest_tier_moves_to_open() {
        let best = optimal_transposition(&song_in(&["D#", "d#-7"]));
        assert_eq!(best.shift, 1);
        assert_eq!(best.value, song_in(&["E", "e-7"]));
    }

    #[test]
    fn ties_prefer_small_then_upward_shifts() {
        // G# + 1 = A and G# - 1 = G are both open
        assert_eq!(optimal_transposition(&song_in(&["G#"])).shift, 1);
        // already open
        assert_eq!(optimal_transposition(&song_in(&["C", "G"])).shift, 0);
        // no chords at all
        let empty = song_in(&[]);
        let best = optimal_transposition(&empty);
        assert_eq!((best.shift, best.value), (0, empty));
    }

    #[test]
    fn easiest_version_of_a_chord() {
        assert_eq!(optimal_transposition(&Chord::parse("F").unwrap()).value, Chord::parse("E").unwrap());
        assert_eq!(song_in(&["A#", "F", "C"]).easiest_version(), song_in(&["C", "G", "D"]));
    }
}
