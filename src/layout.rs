//! Layout
//!
//! Renders verses two ways:
//!
//! * **visual**: chord names stacked above the lyrics on as many shelves as
//!   needed, each tied to its lyric column by a connector line;
//! * **typeset**: chords inlined as `\[C]` tokens for the LaTeX `songs`
//!   package.
//!
//! ```text
//!    D-sus2
//!    |
//! C-sus2      D
//! |  |        |
//! Some chords are
//! ```
//!
//! Labels on one shelf never overlap. When a label would run into the next
//! one on the lowest shelf, blanks are inserted at the last space between the
//! two chords, so words are never torn apart; when there is no such space the
//! label moves one shelf up.

use tracing::trace;

use crate::song::{Song, Stanza};
use crate::verse::{ChordAnnotation, Verse};

const BLANK: char = ' ';
const DEFAULT_CONNECTOR: char = '|';
const DEFAULT_INDENT: &str = "    ";

/// Builder for a [`Layout`].
pub struct LayoutBuilder {
    connector: char,
    indent: String,
}

impl LayoutBuilder {
    /// Start with the defaults: `|` connectors and a four-space indent for
    /// verses inside LaTeX stanzas.
    pub fn new() -> Self {
        LayoutBuilder {
            connector: DEFAULT_CONNECTOR,
            indent: DEFAULT_INDENT.to_string(),
        }
    }

    /// Set the character that links a label to its lyric column.
    pub fn connector(mut self, connector: char) -> Self {
        self.connector = connector;
        self
    }

    /// Set the indentation of verse lines inside `\beginverse`.
    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Build the `Layout`.
    pub fn build(self) -> Layout {
        Layout {
            connector: self.connector,
            indent: self.indent,
        }
    }
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a chord label ends up in the visual layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LabelPlacement {
    /// Stacking row, 0 being the one right above the lyrics.
    pub shelf: usize,
    /// First column of the label.
    pub column: usize,
    /// Label length in characters.
    pub width: usize,
}

impl LabelPlacement {
    /// One past the last column of the label.
    pub fn end(&self) -> usize {
        self.column + self.width
    }
}

/// Result of placing every label of a verse
struct ShelfPlan {
    placements: Vec<LabelPlacement>,
    /// Blanks inserted before each lyric character
    extra_blanks: Vec<usize>,
    shelves: usize,
    width: usize,
}

impl ShelfPlan {
    fn new(lyric: &[char], annotations: &[ChordAnnotation], labels: &[Vec<char>]) -> Self {
        // index of the annotation placed last on each shelf
        let mut last_on_shelf: Vec<usize> = Vec::new();
        let mut extra_blanks = vec![0; lyric.len()];
        let mut shift = 0;
        let mut placements = Vec::with_capacity(annotations.len());
        let mut width = lyric.len();

        for (i, annotation) in annotations.iter().enumerate() {
            let offset = annotation.offset;
            let mut shelf = 0;
            while let Some(&last) = last_on_shelf.get(shelf) {
                let last_offset = annotations[last].offset;
                let last_end = last_offset + labels[last].len();
                if last_end < offset {
                    break;
                }
                if shelf == 0 {
                    if let Some(space) = last_space(lyric, last_offset, offset) {
                        let inserted = 1 + last_end - offset;
                        extra_blanks[space] = inserted;
                        shift += inserted;
                        break;
                    }
                }
                shelf += 1;
            }
            if shelf > 0 {
                trace!(chord = %annotation.chord, offset, shelf, "label moved up");
            }

            let column = offset + shift;
            if shelf == last_on_shelf.len() {
                last_on_shelf.push(i);
            } else {
                last_on_shelf[shelf] = i;
            }
            let placement = LabelPlacement {
                shelf,
                column,
                width: labels[i].len(),
            };
            width = width.max(placement.end());
            placements.push(placement);
        }

        ShelfPlan {
            placements,
            extra_blanks,
            shelves: last_on_shelf.len(),
            width: width.max(lyric.len() + shift),
        }
    }

    /// Without lyrics every label shares one row, at least one blank apart.
    fn flatten(&mut self) {
        let mut free = 0;
        for placement in &mut self.placements {
            placement.shelf = 0;
            placement.column = placement.column.max(free);
            free = placement.end() + 1;
            self.width = self.width.max(placement.end());
        }
        self.shelves = usize::from(!self.placements.is_empty());
    }
}

/// Index of the last space in `lyric[from..to]`.
fn last_space(lyric: &[char], from: usize, to: usize) -> Option<usize> {
    lyric[from..to]
        .iter()
        .rposition(|&c| c == BLANK)
        .map(|i| from + i)
}

fn is_blank(lyric: &[char]) -> bool {
    lyric.iter().all(|c| c.is_whitespace())
}

/// Renders verses, stanzas and songs.
#[derive(Debug, Clone)]
pub struct Layout {
    connector: char,
    indent: String,
}

impl Layout {
    /// Return a builder to customize the layout.
    pub fn builder() -> LayoutBuilder {
        LayoutBuilder::new()
    }

    /// Create a layout with the default settings.
    pub fn new() -> Self {
        LayoutBuilder::new().build()
    }

    /// Place every chord label of `verse`, in annotation order.
    pub fn place_labels(&self, verse: &Verse) -> Vec<LabelPlacement> {
        self.plan(verse).placements
    }

    fn plan(&self, verse: &Verse) -> ShelfPlan {
        let lyric: Vec<char> = verse.lyrics().chars().collect();
        let labels = labels(verse);
        let mut plan = ShelfPlan::new(&lyric, verse.annotations(), &labels);
        if is_blank(&lyric) {
            plan.flatten();
        }
        plan
    }

    /// Multi-row chord-over-lyrics text.
    ///
    /// A verse without chords comes back unchanged; a verse with chords but
    /// blank lyrics becomes a single row of chord names.
    pub fn render_visual(&self, verse: &Verse) -> String {
        if verse.annotations().is_empty() {
            return verse.lyrics().to_string();
        }

        let lyric: Vec<char> = verse.lyrics().chars().collect();
        let labels = labels(verse);
        let plan = self.plan(verse);

        if is_blank(&lyric) {
            let mut row = vec![BLANK; plan.width];
            for (placement, label) in plan.placements.iter().zip(&labels) {
                row[placement.column..placement.end()].copy_from_slice(label);
            }
            return row.into_iter().collect();
        }

        // row 0 is the lyric line; shelf k prints on row 2(k + 1)
        let mut rows = vec![vec![BLANK; plan.width]; 2 * plan.shelves + 1];
        for (placement, label) in plan.placements.iter().zip(&labels) {
            let row = 2 * (placement.shelf + 1);
            rows[row][placement.column..placement.end()].copy_from_slice(label);
            for lower in &mut rows[1..row] {
                if lower[placement.column] == BLANK {
                    lower[placement.column] = self.connector;
                }
            }
        }

        let mut column = 0;
        for (ch, extra) in lyric.iter().zip(&plan.extra_blanks) {
            column += extra;
            rows[0][column] = *ch;
            column += 1;
        }

        rows.iter()
            .rev()
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Inline LaTeX form: `\[C]Kuža pazi, \[G]z repkom`.
    ///
    /// A parenthesized word such as `(2x)` is set in italics. A line with no
    /// lyrics besides chords and parenthesized runs is wrapped in
    /// `{\nolyrics ...}`.
    pub fn render_typeset(&self, verse: &Verse) -> String {
        let lyric: Vec<char> = verse.lyrics().chars().collect();
        let annotations = verse.annotations();
        let mut out = String::new();
        let mut next = 0;
        let mut has_lyrics = false;
        let mut i = 0;

        loop {
            while let Some(a) = annotations.get(next).filter(|a| a.offset == i) {
                out.push_str(&a.chord.latex());
                next += 1;
            }
            if i >= lyric.len() {
                break;
            }

            let run_end = parenthesized_run(&lyric, i)
                .filter(|&end| !matches!(annotations.get(next), Some(a) if a.offset < end));
            match run_end {
                Some(end) => {
                    let run: String = lyric[i..end].iter().collect();
                    if run.chars().any(char::is_whitespace) {
                        out.push_str(&run);
                    } else {
                        out.push_str(&format!("\\textit{{{run}}}"));
                    }
                    i = end;
                }
                None => {
                    out.push(lyric[i]);
                    has_lyrics |= !lyric[i].is_whitespace();
                    i += 1;
                }
            }
        }

        if has_lyrics {
            out
        } else {
            format!("{{\\nolyrics {out}}}")
        }
    }

    /// Visual form of a stanza, one verse after another.
    pub fn render_stanza_visual(&self, stanza: &Stanza) -> String {
        stanza
            .verses()
            .iter()
            .map(|verse| self.render_visual(verse))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Visual form of a song: the title, then the stanzas, each preceded by
    /// an empty line.
    pub fn render_song_visual(&self, song: &Song) -> String {
        let mut lines = vec![song.title().to_string()];
        for stanza in song.stanzas() {
            lines.push(String::new());
            lines.push(self.render_stanza_visual(stanza));
        }
        lines.join("\n")
    }

    /// A `\beginverse ... \endverse` block.
    pub fn render_stanza_typeset(&self, stanza: &Stanza) -> String {
        let mut lines = vec!["\\beginverse\\singlespace".to_string()];
        for verse in stanza.verses() {
            lines.push(format!("{}{}", self.indent, self.render_typeset(verse)));
        }
        lines.push("\\endverse".to_string());
        lines.join("\n")
    }

    /// A `\beginsong ... \endsong` block.
    pub fn render_song_typeset(&self, song: &Song) -> String {
        let mut parts = vec![format!(
            "\\beginsong{{{}}}[by={{{}}}]",
            song.title(),
            song.artist()
        )];
        parts.extend(song.stanzas().iter().map(|s| self.render_stanza_typeset(s)));
        parts.push("\\endsong".to_string());
        parts.join("\n\n")
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::new()
    }
}

fn labels(verse: &Verse) -> Vec<Vec<char>> {
    verse
        .chords()
        .map(|chord| chord.to_string().chars().collect())
        .collect()
}

/// End (exclusive) of a closed `(...)` run starting at `start`.
fn parenthesized_run(lyric: &[char], start: usize) -> Option<usize> {
    if lyric[start] != '(' {
        return None;
    }
    lyric[start + 1..]
        .iter()
        .position(|&c| c == ')')
        .map(|i| start + i + 2)
}

/// Visual layout with the default settings.
pub fn render_visual(verse: &Verse) -> String {
    Layout::default().render_visual(verse)
}

/// Typeset layout with the default settings.
pub fn render_typeset(verse: &Verse) -> String {
    Layout::default().render_typeset(verse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verse::parse_verse;

    fn verse(line: &str) -> Verse {
        parse_verse(line).unwrap()
    }

    #[test]
    fn chords_over_words() {
        let expected = "A                E           \n\
                        |                |           \n\
                        J's ne morem več v temi živet";
        assert_eq!(render_visual(&verse("<A>J's ne morem več <E>v temi živet")), expected);
    }

    #[test]
    fn crowded_chords_stack_up() {
        let expected = [
            "          f          ",
            "          |          ",
            "         e|          ",
            "         ||          ",
            " h C#   d-sus2      H",
            " | |    |||         |",
            "01234567890123456789 ",
        ]
        .join("\n");
        let v = verse("0<h>12<C#>34567<d-sus2>8<e>9<f>0123456789<H>");
        assert_eq!(render_visual(&v), expected);
    }

    #[test]
    fn spaces_are_widened_before_words() {
        let line = "<C-sus2>Som<D-sus2>e chords <D>are <C#-sus2-sus4>just<G-sus4>tood<h>ense \
                    to be in the <A-sus4>same lin<E>e, but <c-sus4>some <D>words \
                    allow <F#-sus4>for <E>additional spaces.";
        let expected = [
            "                        h                                                                             ",
            "                        |                                                                             ",
            "   D-sus2           G-sus4                                                                            ",
            "   |                |   |                                                                             ",
            "C-sus2      D   C#-sus2-sus4              A-sus4  E      c-sus4 D           F#-sus4 E                 ",
            "|  |        |   |   |   |                 |       |      |      |           |       |                 ",
            "Some chords are justtoodense to be in the same line, but some   words allow for     additional spaces.",
        ]
        .join("\n");
        assert_eq!(render_visual(&verse(line)), expected);
    }

    #[test]
    fn verse_without_chords_is_unchanged() {
        let line = "To besedilo ni pesem, zato akordov nima.";
        assert_eq!(render_visual(&verse(line)), line);
    }

    #[test]
    fn chords_without_lyrics_share_one_row() {
        assert_eq!(render_visual(&verse("<C> <G-7> <C> <G-7>")), "C G-7 C G-7");
        assert_eq!(render_visual(&verse("<C-sus2><G-7><a>")), "C-sus2 G-7 a");
    }

    #[test]
    fn labels_on_a_shelf_never_overlap() {
        let v = verse("<C-sus2><D-sus2>xy<E-sus4>z<F#-7><G>a b<A-sus2>c<H-7>");
        let placements = Layout::new().place_labels(&v);
        for (i, a) in placements.iter().enumerate() {
            for b in &placements[i + 1..] {
                if a.shelf == b.shelf {
                    assert!(a.end() < b.column || b.end() < a.column, "{a:?} overlaps {b:?}");
                }
            }
        }
        assert!(placements.iter().any(|p| p.shelf > 1));
    }

    #[test]
    fn custom_connector() {
        let layout = Layout::builder().connector(':').build();
        assert_eq!(layout.render_visual(&verse("<A>la")), "A \n: \nla");
    }

    #[test]
    fn typeset_lines() {
        let cases = [
            ("<A>J's ne morem več <E>v temi živet", "\\[A]J's ne morem več \\[E]v temi živet"),
            (
                "0<h>12<C#>34567<d-sus2>8<e>9<f>0123456789<H>",
                "0\\[h]12\\[C#]34567\\[d$^\\text{ sus2}$]8\\[e]9\\[f]0123456789\\[H]",
            ),
            ("To besedilo ni pesem, zato akordov nima.", "To besedilo ni pesem, zato akordov nima."),
            (
                "<C> <G-7> <C> <G-7>",
                "{\\nolyrics \\[C] \\[G$^\\text{ 7}$] \\[C] \\[G$^\\text{ 7}$]}",
            ),
        ];
        for (line, expected) in cases {
            assert_eq!(render_typeset(&verse(line)), expected);
        }
    }

    #[test]
    fn typeset_chord_pair_without_lyrics() {
        assert_eq!(render_typeset(&verse("<a><E-7>")), "{\\nolyrics \\[a]\\[E$^\\text{ 7}$]}");
    }

    #[test]
    fn typeset_parenthesized_runs() {
        assert_eq!(
            render_typeset(&verse("<C>la la (2x)")),
            "\\[C]la la \\textit{(2x)}"
        );
        assert_eq!(
            render_typeset(&verse("<C>la (two times)")),
            "\\[C]la (two times)"
        );
        assert_eq!(
            render_typeset(&verse("<C> <G> (2x)")),
            "{\\nolyrics \\[C] \\[G] \\textit{(2x)}}"
        );
        assert_eq!(render_typeset(&verse("la (oops")), "la (oops");
    }

    #[test]
    fn typeset_keeps_chords_inside_parentheses() {
        assert_eq!(
            render_typeset(&verse("(re<G>frain)")),
            "(re\\[G]frain)"
        );
        assert_eq!(render_typeset(&verse("<C>(2x)<G>")), "{\\nolyrics \\[C]\\textit{(2x)}\\[G]}");
    }
}
