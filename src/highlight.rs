//! Excerpt rendering for matched field values.
//!
//! The [`Highlighter`] cuts a window of at most `max_length` characters out of
//! a value, starting up to `max_prefix` characters before the first match,
//! and wraps every matched range inside the window in caller-supplied
//! markers.
//!
//! ```
//! use tessera::highlight::{HighlightConfig, Highlighter};
//! use tessera::query::TextRange;
//!
//! let highlighter = Highlighter::new(HighlightConfig::default());
//! let snippet = highlighter.highlight("the quick brown fox", &[TextRange::new(4, 9)], "<b>", "</b>");
//! assert_eq!(snippet.as_deref(), Some("the <b>quick</b> brown fox"));
//! ```

use serde::{Deserialize, Serialize};

use crate::query::matching::TextRange;

/// Excerpt budget, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Maximum length of the excerpt.
    pub max_length: usize,
    /// Maximum leading context before the first match.
    pub max_prefix: usize,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        HighlightConfig {
            max_length: 50,
            max_prefix: 20,
        }
    }
}

/// Renders highlighted excerpts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Highlighter {
    config: HighlightConfig,
}

impl Highlighter {
    /// Create a highlighter with the given budget.
    pub fn new(config: HighlightConfig) -> Self {
        Highlighter { config }
    }

    /// The configured budget.
    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Render `text` with the byte `ranges` wrapped in `before` and `after`.
    ///
    /// Returns `None` when no non-empty range is given, which callers must
    /// not read as "no match".
    pub fn highlight(
        &self,
        text: &str,
        ranges: &[TextRange],
        before: &str,
        after: &str,
    ) -> Option<String> {
        let chars: Vec<char> = text.chars().collect();
        let offsets: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
        let to_char = |byte: usize| offsets.partition_point(|&offset| offset < byte);

        let mut spans: Vec<(usize, usize)> = ranges
            .iter()
            .map(|r| (to_char(r.start), to_char(r.end)))
            .filter(|(start, end)| start < end)
            .collect();
        if spans.is_empty() {
            return None;
        }
        spans.sort_unstable();

        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
        for (start, end) in spans {
            match merged.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }

        let len = chars.len();
        let first = merged[0].0;
        let window_start = first
            .saturating_sub(self.config.max_prefix)
            .min(len.saturating_sub(self.config.max_length));
        let window_end = (window_start + self.config.max_length).min(len);

        let markup = merged.len() * (before.len() + after.len());
        let mut out = String::with_capacity(text.len() + markup);
        let mut cursor = window_start;
        for (start, end) in merged {
            let start = start.max(window_start);
            let end = end.min(window_end);
            if start >= end {
                continue;
            }
            out.extend(&chars[cursor..start]);
            out.push_str(before);
            out.extend(&chars[start..end]);
            out.push_str(after);
            cursor = end;
        }
        if cursor < window_end {
            out.extend(&chars[cursor..window_end]);
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlight(config: HighlightConfig, text: &str, ranges: &[(usize, usize)]) -> Option<String> {
        let ranges: Vec<TextRange> = ranges.iter().copied().map(TextRange::from).collect();
        Highlighter::new(config).highlight(text, &ranges, "[", "]")
    }

    #[test]
    fn test_no_ranges_is_none() {
        assert_eq!(highlight(HighlightConfig::default(), "text", &[]), None);
        assert_eq!(highlight(HighlightConfig::default(), "text", &[(2, 2)]), None);
    }

    #[test]
    fn test_merges_overlapping_ranges() {
        let snippet = highlight(HighlightConfig::default(), "abcdefgh", &[(4, 6), (1, 3), (2, 5)]);
        assert_eq!(snippet.as_deref(), Some("a[bcdef]gh"));
    }

    #[test]
    fn test_window_prefix() {
        let config = HighlightConfig {
            max_length: 10,
            max_prefix: 2,
        };
        let text = "0123456789abcdefghij";
        assert_eq!(highlight(config, text, &[(8, 10)]).as_deref(), Some("67[89]abcdef"));
    }

    #[test]
    fn test_window_keeps_tail_full() {
        let config = HighlightConfig {
            max_length: 10,
            max_prefix: 2,
        };
        let text = "0123456789abcdefghij";
        assert_eq!(highlight(config, text, &[(18, 20)]).as_deref(), Some("abcdefgh[ij]"));
    }

    #[test]
    fn test_range_clipped_by_window() {
        let config = HighlightConfig {
            max_length: 4,
            max_prefix: 0,
        };
        assert_eq!(highlight(config, "abcdefgh", &[(1, 7)]).as_deref(), Some("[bcde]"));
    }

    #[test]
    fn test_multibyte_text() {
        let text = "héllo wörld";
        let start = text.find("wörld").unwrap();
        let end = start + "wörld".len();
        let snippet = highlight(HighlightConfig::default(), text, &[(start, end)]);
        assert_eq!(snippet.as_deref(), Some("héllo [wörld]"));
    }
}
