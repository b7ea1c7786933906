//! Completion state: suggestions, selection, and the dropdown viewport.
//!
//! The [`CompletionManager`] holds the suggestion list produced by the
//! completer for the current input, which one (if any) is selected, and the
//! first visible row of the dropdown. The engine calls
//! [`refresh`](CompletionManager::refresh) after every key so the list always
//! matches the text.
//!
//! Selection moves with [`next`](CompletionManager::next) and
//! [`previous`](CompletionManager::previous). At the ends of the list the
//! [`CompletionCycle`] decides whether the index stops or wraps through
//! "nothing selected". After every move the scroll offset shifts by the
//! least amount that keeps the selected row visible.
//!
//! [`format_suggestions`] pads the text and description columns to a common
//! width for drawing, and [`Scrollbar`] computes the thumb.

use std::fmt;
use std::str::FromStr;

use crate::document::Document;
use crate::error::PromptError;
use crate::units::DisplayWidth;

/// Narrowest column [`format_texts`] will produce, margins included.
const MIN_COLUMN: usize = 5;

/// Appended to text cut short to fit its column.
const SHORTEN_SUFFIX: &str = "...";

/// Produces the suggestions for the current input.
pub type Completer = Box<dyn Fn(&Document) -> Vec<Suggestion>>;

// ---------------------------------------------------------------------------
// Suggestion
// ---------------------------------------------------------------------------

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Suggestion {
    /// Inserted into the buffer when the suggestion is accepted.
    pub text: String,
    /// Shown next to the text in the dropdown.
    pub description: String,
}

impl Suggestion {
    #[must_use]
    pub fn new(text: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            description: description.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// CompletionCycle
// ---------------------------------------------------------------------------

/// What happens when the selection runs off either end of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionCycle {
    /// `next` stops at the last suggestion; `previous` from the first one
    /// deselects and then stays there.
    #[default]
    Clamp,
    /// The selection cycles `none -> 0 -> .. -> last -> none`, both ways.
    Wrap,
}

impl fmt::Display for CompletionCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clamp => "clamp",
            Self::Wrap => "wrap",
        })
    }
}

impl FromStr for CompletionCycle {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "wrap" => Ok(Self::Wrap),
            _ => Err(PromptError::UnknownCompletionCycle(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// CompletionManager
// ---------------------------------------------------------------------------

/// Suggestion list, selection, and scroll offset.
pub struct CompletionManager {
    suggestions: Vec<Suggestion>,
    selected: Option<usize>,
    vertical_scroll: usize,
    max_visible: usize,
    word_separator: String,
    cycle: CompletionCycle,
    completer: Option<Completer>,
}

impl fmt::Debug for CompletionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionManager")
            .field("suggestions", &self.suggestions.len())
            .field("selected", &self.selected)
            .field("vertical_scroll", &self.vertical_scroll)
            .field("max_visible", &self.max_visible)
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}

impl CompletionManager {
    /// An empty manager showing at most `max_visible` rows. A zero is
    /// treated as one.
    #[must_use]
    pub fn new(max_visible: usize) -> Self {
        Self {
            suggestions: Vec::new(),
            selected: None,
            vertical_scroll: 0,
            max_visible: max_visible.max(1),
            word_separator: String::new(),
            cycle: CompletionCycle::default(),
            completer: None,
        }
    }

    #[must_use]
    pub fn with_completer(mut self, completer: Completer) -> Self {
        self.completer = Some(completer);
        self
    }

    #[must_use]
    pub fn with_cycle(mut self, cycle: CompletionCycle) -> Self {
        self.cycle = cycle;
        self
    }

    /// Chars that end the word a suggestion replaces. Empty means a space.
    #[must_use]
    pub fn with_word_separator(mut self, separator: impl Into<String>) -> Self {
        self.word_separator = separator.into();
        self
    }

    // -- Updating the list --------------------------------------------------

    /// Replace the list and clear the selection.
    pub fn update(&mut self, suggestions: Vec<Suggestion>) {
        self.suggestions = suggestions;
        self.reset();
    }

    /// Ask the completer again for `doc`. The selection survives if its
    /// index still exists.
    pub fn refresh(&mut self, doc: &Document) {
        let Some(completer) = &self.completer else {
            return;
        };
        self.suggestions = completer(doc);

        match self.selected {
            Some(i) if i < self.suggestions.len() => self.scroll_to_selection(),
            _ => self.reset(),
        }
    }

    /// Deselect and scroll back to the top. The list is kept.
    pub const fn reset(&mut self) {
        self.selected = None;
        self.vertical_scroll = 0;
    }

    // -- Selection ----------------------------------------------------------

    pub fn next(&mut self) {
        let len = self.suggestions.len();
        if len == 0 {
            return;
        }
        self.selected = match (self.selected, self.cycle) {
            (None, _) => Some(0),
            (Some(i), _) if i + 1 < len => Some(i + 1),
            (Some(i), CompletionCycle::Clamp) => Some(i),
            (Some(_), CompletionCycle::Wrap) => None,
        };
        self.scroll_to_selection();
    }

    pub fn previous(&mut self) {
        let len = self.suggestions.len();
        if len == 0 {
            return;
        }
        self.selected = match (self.selected, self.cycle) {
            (None, CompletionCycle::Clamp) | (Some(0), _) => None,
            (None, CompletionCycle::Wrap) => Some(len - 1),
            (Some(i), _) => Some(i - 1),
        };
        self.scroll_to_selection();
    }

    /// Shift the viewport the least amount that shows the selection.
    fn scroll_to_selection(&mut self) {
        match self.selected {
            None => self.vertical_scroll = 0,
            Some(i) if i < self.vertical_scroll => self.vertical_scroll = i,
            Some(i) if i >= self.vertical_scroll + self.max_visible => {
                self.vertical_scroll = i + 1 - self.max_visible;
            }
            Some(_) => {}
        }
    }

    // -- Queries ------------------------------------------------------------

    #[must_use]
    pub fn selected_suggestion(&self) -> Option<&Suggestion> {
        self.suggestions.get(self.selected?)
    }

    #[inline]
    #[must_use]
    pub const fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Whether a suggestion is selected.
    #[inline]
    #[must_use]
    pub const fn is_completing(&self) -> bool {
        self.selected.is_some()
    }

    #[must_use]
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// The rows currently inside the viewport.
    #[must_use]
    pub fn visible(&self) -> &[Suggestion] {
        let start = self.vertical_scroll.min(self.suggestions.len());
        let end = (start + self.max_visible).min(self.suggestions.len());
        &self.suggestions[start..end]
    }

    #[inline]
    #[must_use]
    pub const fn vertical_scroll(&self) -> usize {
        self.vertical_scroll
    }

    #[inline]
    #[must_use]
    pub const fn max_visible(&self) -> usize {
        self.max_visible
    }

    #[must_use]
    pub fn word_separator(&self) -> &str {
        &self.word_separator
    }

    #[inline]
    #[must_use]
    pub const fn cycle(&self) -> CompletionCycle {
        self.cycle
    }
}

// ---------------------------------------------------------------------------
// Scrollbar
// ---------------------------------------------------------------------------

/// Thumb of the dropdown scrollbar, in rows of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scrollbar {
    pub top: usize,
    pub height: usize,
}

impl Scrollbar {
    /// Thumb for a window of `window_height` rows over `content_height`
    /// rows scrolled by `scroll`.
    ///
    /// `height = clamp(wh * wh / ch, 1, wh)` and `top = wh * scroll / ch`,
    /// both truncated.
    #[must_use]
    pub fn compute(window_height: usize, content_height: usize, scroll: usize) -> Self {
        if content_height == 0 || window_height == 0 {
            return Self {
                top: 0,
                height: window_height,
            };
        }
        let height = (window_height * window_height / content_height).clamp(1, window_height);
        let top = window_height * scroll / content_height;
        Self { top, height }
    }

    /// Whether window row `row` is part of the thumb.
    #[inline]
    #[must_use]
    pub const fn contains(self, row: usize) -> bool {
        self.top <= row && row < self.top + self.height
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Pad every suggestion's text and description into two aligned columns
/// that fit in `max` terminal columns together.
///
/// The text column is sized first and the description column gets what is
/// left. Returns the formatted rows and their total width. If the text
/// column cannot fit, the result is empty with width 0.
#[must_use]
pub fn format_suggestions(suggestions: &[Suggestion], max: usize) -> (Vec<Suggestion>, usize) {
    let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();
    let (texts, left) = format_texts(&texts, max, " ", " ");
    if left == 0 {
        return (Vec::new(), 0);
    }

    let descriptions: Vec<&str> = suggestions.iter().map(|s| s.description.as_str()).collect();
    let (descriptions, right) = format_texts(&descriptions, max - left, " ", " ");

    let rows = texts
        .into_iter()
        .zip(descriptions)
        .map(|(text, description)| Suggestion { text, description })
        .collect();
    (rows, left + right)
}

/// Pad `texts` to a common display width, wrapped in `prefix` and
/// `suffix`, so the column is at most `max` wide. Text that does not fit is
/// cut and ends in `...`.
///
/// Returns empty strings and width 0 when every text is empty or `max` is
/// too narrow for a shortened entry.
#[must_use]
pub fn format_texts(texts: &[&str], max: usize, prefix: &str, suffix: &str) -> (Vec<String>, usize) {
    let blank = || vec![String::new(); texts.len()];

    let mut width = texts
        .iter()
        .map(|t| DisplayWidth::of_str(t).get())
        .max()
        .unwrap_or(0);
    if width == 0 || MIN_COLUMN >= max {
        return (blank(), 0);
    }

    let margins = DisplayWidth::of_str(prefix).get() + DisplayWidth::of_str(suffix).get();
    if width + margins > max {
        width = max - margins;
    }

    let rows = texts
        .iter()
        .map(|text| {
            let body = if DisplayWidth::of_str(text).get() <= width {
                (*text).to_owned()
            } else {
                shorten(text, width)
            };
            let pad = width.saturating_sub(DisplayWidth::of_str(&body).get());
            format!("{prefix}{body}{}{suffix}", " ".repeat(pad))
        })
        .collect();
    (rows, width + margins)
}

/// Longest head of `text` that fits in `width` columns with `...` after it.
fn shorten(text: &str, width: usize) -> String {
    let budget = width.saturating_sub(SHORTEN_SUFFIX.len());
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = DisplayWidth::of_char(c).get();
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(SHORTEN_SUFFIX);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::RuneIndex;
    use pretty_assertions::assert_eq;

    fn items(n: usize) -> Vec<Suggestion> {
        (0..n).map(|i| Suggestion::new(format!("item{i}"), "")).collect()
    }

    fn manager(n: usize, max: usize) -> CompletionManager {
        let mut m = CompletionManager::new(max);
        m.update(items(n));
        m
    }

    // -- Update / reset -----------------------------------------------------

    #[test]
    fn update_clears_selection() {
        let mut m = manager(3, 6);
        m.next();
        m.update(items(2));
        assert_eq!(m.selected_index(), None);
        assert_eq!(m.vertical_scroll(), 0);
        assert!(!m.is_completing());
    }

    #[test]
    fn reset_keeps_list() {
        let mut m = manager(3, 6);
        m.next();
        m.reset();
        assert_eq!(m.suggestions().len(), 3);
        assert_eq!(m.selected_suggestion(), None);
    }

    #[test]
    fn refresh_keeps_selection_in_range() {
        let mut m = CompletionManager::new(6).with_completer(Box::new(|d: &Document| {
            items(if d.text().is_empty() { 4 } else { 1 })
        }));
        m.refresh(&Document::default());
        m.next();
        m.next();
        assert_eq!(m.selected_index(), Some(1));

        m.refresh(&Document::default());
        assert_eq!(m.selected_index(), Some(1));

        m.refresh(&Document::new("x", RuneIndex(1)));
        assert_eq!(m.selected_index(), None);
        assert_eq!(m.suggestions().len(), 1);
    }

    #[test]
    fn refresh_without_completer_is_noop() {
        let mut m = manager(2, 6);
        m.refresh(&Document::default());
        assert_eq!(m.suggestions().len(), 2);
    }

    // -- Clamp --------------------------------------------------------------

    #[test]
    fn next_then_previous_returns_to_none() {
        let n = 4;
        let mut m = manager(n, 6);
        for _ in 0..n {
            m.next();
        }
        assert_eq!(m.selected_index(), Some(n - 1));
        for _ in 0..n {
            m.previous();
        }
        assert_eq!(m.selected_index(), None);
    }

    #[test]
    fn clamp_holds_at_both_ends() {
        let mut m = manager(2, 6);
        m.previous();
        assert_eq!(m.selected_index(), None);
        m.next();
        m.next();
        m.next();
        assert_eq!(m.selected_index(), Some(1));
        assert_eq!(m.selected_suggestion().map(|s| s.text.as_str()), Some("item1"));
    }

    #[test]
    fn empty_list_never_selects() {
        let mut m = manager(0, 6);
        m.next();
        m.previous();
        assert!(!m.is_completing());
    }

    // -- Wrap ---------------------------------------------------------------

    #[test]
    fn wrap_cycles_through_none() {
        let mut m = CompletionManager::new(6).with_cycle(CompletionCycle::Wrap);
        m.update(items(2));
        m.next();
        m.next();
        assert_eq!(m.selected_index(), Some(1));
        m.next();
        assert_eq!(m.selected_index(), None);
        m.previous();
        assert_eq!(m.selected_index(), Some(1));
    }

    #[test]
    fn cycle_parses() {
        assert_eq!("Wrap".parse::<CompletionCycle>().ok(), Some(CompletionCycle::Wrap));
        assert_eq!("clamp".parse::<CompletionCycle>().ok(), Some(CompletionCycle::Clamp));
        assert!("spin".parse::<CompletionCycle>().is_err());
    }

    // -- Viewport -----------------------------------------------------------

    #[test]
    fn selecting_last_of_six_scrolls_to_three() {
        let mut m = manager(6, 3);
        for _ in 0..6 {
            m.next();
        }
        assert_eq!(m.selected_index(), Some(5));
        assert_eq!(m.vertical_scroll(), 3);
        let shown: Vec<_> = m.visible().iter().map(|s| s.text.as_str()).collect();
        assert_eq!(shown, vec!["item3", "item4", "item5"]);
    }

    #[test]
    fn scrolling_back_up_moves_minimally() {
        let mut m = manager(6, 3);
        for _ in 0..6 {
            m.next();
        }
        m.previous();
        m.previous();
        assert_eq!(m.selected_index(), Some(3));
        assert_eq!(m.vertical_scroll(), 3);
        m.previous();
        assert_eq!(m.vertical_scroll(), 2);
    }

    #[test]
    fn wrap_to_last_shows_tail() {
        let mut m = CompletionManager::new(3).with_cycle(CompletionCycle::Wrap);
        m.update(items(6));
        m.previous();
        assert_eq!(m.selected_index(), Some(5));
        assert_eq!(m.vertical_scroll(), 3);
    }

    // -- Scrollbar ----------------------------------------------------------

    #[test]
    fn scrollbar_thumb() {
        let bar = Scrollbar::compute(3, 6, 0);
        assert_eq!(bar, Scrollbar { top: 0, height: 1 });
        let bar = Scrollbar::compute(3, 6, 3);
        assert_eq!(bar, Scrollbar { top: 1, height: 1 });
        assert!(bar.contains(1));
        assert!(!bar.contains(2));
    }

    #[test]
    fn scrollbar_full_when_everything_fits() {
        let bar = Scrollbar::compute(4, 4, 0);
        assert_eq!(bar, Scrollbar { top: 0, height: 4 });
        assert!((0..4).all(|row| bar.contains(row)));
    }

    #[test]
    fn scrollbar_never_thinner_than_one() {
        assert_eq!(Scrollbar::compute(2, 100, 50).height, 1);
    }

    // -- format_texts -------------------------------------------------------

    #[test]
    fn format_texts_all_empty() {
        assert_eq!(format_texts(&["", ""], 10, " ", " "), (vec![String::new(); 2], 0));
    }

    #[test]
    fn format_texts_too_narrow() {
        let fruit = ["apple", "banana", "coconut"];
        assert_eq!(format_texts(&fruit, 2, " ", " "), (vec![String::new(); 3], 0));
        assert_eq!(format_texts(&fruit, 5, " ", " "), (vec![String::new(); 3], 0));
    }

    #[test]
    fn format_texts_pads() {
        let fruit = ["apple", "banana", "coconut"];
        let (rows, width) = format_texts(&fruit, 100, " ", " ");
        assert_eq!(rows, vec![" apple   ", " banana  ", " coconut "]);
        assert_eq!(width, 9);
    }

    #[test]
    fn format_texts_shortens() {
        let fruit = ["apple", "banana", "coconut"];
        let (rows, width) = format_texts(&fruit, 6, " ", " ");
        assert_eq!(rows, vec![" a... ", " b... ", " c... "]);
        assert_eq!(width, 6);
    }

    #[test]
    fn format_texts_wide_glyphs() {
        let (rows, width) = format_texts(&["あいうえお", "a"], 9, " ", " ");
        // 7 columns for text: two wide glyphs (4) + "..." (3).
        assert_eq!(rows, vec![" あい... ", " a       "]);
        assert_eq!(width, 9);
    }

    // -- format_suggestions -------------------------------------------------

    #[test]
    fn format_text_only() {
        let list = vec![
            Suggestion::new("foo", ""),
            Suggestion::new("bar", ""),
            Suggestion::new("fuga", ""),
        ];
        let (rows, width) = format_suggestions(&list, 100);
        assert_eq!(
            rows,
            vec![
                Suggestion::new(" foo  ", ""),
                Suggestion::new(" bar  ", ""),
                Suggestion::new(" fuga ", ""),
            ]
        );
        assert_eq!(width, 6);
    }

    #[test]
    fn format_with_descriptions() {
        let list = vec![
            Suggestion::new("apple", "This is apple."),
            Suggestion::new("banana", "This is banana."),
            Suggestion::new("coconut", "This is coconut."),
        ];
        let (rows, width) = format_suggestions(&list, 100);
        assert_eq!(
            rows,
            vec![
                Suggestion::new(" apple   ", " This is apple.   "),
                Suggestion::new(" banana  ", " This is banana.  "),
                Suggestion::new(" coconut ", " This is coconut. "),
            ]
        );
        assert_eq!(width, " apple   ".len() + " This is apple.   ".len());
    }

    #[test]
    fn format_shortens_text() {
        let list = vec![
            Suggestion::new("This is apple.", ""),
            Suggestion::new("This is banana.", ""),
            Suggestion::new("This is coconut.", ""),
        ];
        let (rows, width) = format_suggestions(&list, 8);
        assert_eq!(rows, vec![Suggestion::new(" Thi... ", ""); 3]);
        assert_eq!(width, 8);
    }

    #[test]
    fn format_gives_up_when_too_narrow() {
        let list = vec![Suggestion::new("This is apple.", "")];
        assert_eq!(format_suggestions(&list, 3), (Vec::new(), 0));
    }

    #[test]
    fn format_shortens_descriptions_first() {
        let list = vec![
            Suggestion::new("--all-namespaces", "-".repeat(139)),
            Suggestion::new("--allow-missing-template-keys", "-".repeat(143)),
            Suggestion::new("-f", "-".repeat(83)),
        ];
        let (rows, width) = format_suggestions(&list, 50);
        assert_eq!(rows[0].text, " --all-namespaces              ");
        assert_eq!(rows[1].text, " --allow-missing-template-keys ");
        assert_eq!(rows[2].text, " -f                            ");
        for row in &rows {
            assert_eq!(row.description, " --------------... ");
        }
        assert_eq!(width, 50);
    }
}
