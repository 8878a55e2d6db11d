//! Tokenizers that turn field values and query strings into terms.
//!
//! Tokenization must be deterministic: the same input always produces the
//! same tokens with the same offsets, because offsets written at index time
//! are reused for highlighting at query time.

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::Token;

/// Trait for tokenizers that convert text into tokens.
pub trait Tokenizer: Send + Sync + std::fmt::Debug {
    /// Tokenize the given text into an ordered list of tokens.
    fn tokenize(&self, text: &str) -> Vec<Token>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// The default tokenizer for full-text fields.
///
/// Splits text on Unicode word boundaries (UAX #29), drops segments without
/// any alphanumeric character and lower-cases the rest. Runs of CJK
/// characters are emitted as overlapping character bigrams, so that a query
/// for any two adjacent ideographs finds the text; a run of a single
/// character is emitted as-is.
///
/// # Examples
///
/// ```
/// use tessera::analysis::tokenizer::{GeneralTokenizer, Tokenizer};
///
/// let tokens = GeneralTokenizer::new().tokenize("Hello, World");
/// assert_eq!(tokens[0].term, "hello");
/// assert_eq!(tokens[1].span(), (7, 12));
/// ```
#[derive(Clone, Debug, Default)]
pub struct GeneralTokenizer;

impl GeneralTokenizer {
    /// Create a new general tokenizer.
    pub fn new() -> Self {
        GeneralTokenizer
    }

    fn flush_cjk(run: &mut Vec<(usize, char)>, tokens: &mut Vec<Token>) {
        match run.len() {
            0 => {}
            1 => {
                let (start, c) = run[0];
                let term: String = c.to_lowercase().collect();
                tokens.push(Token::new(term, start, start + c.len_utf8()));
            }
            _ => {
                for pair in run.windows(2) {
                    let (start, first) = pair[0];
                    let (second_start, second) = pair[1];
                    let mut term = String::with_capacity(first.len_utf8() + second.len_utf8());
                    term.push(first);
                    term.push(second);
                    tokens.push(Token::new(term, start, second_start + second.len_utf8()));
                }
            }
        }
        run.clear();
    }
}

impl Tokenizer for GeneralTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut cjk_run: Vec<(usize, char)> = Vec::new();
        let mut run_end = 0;

        for (offset, word) in text.split_word_bound_indices() {
            if !word.chars().any(char::is_alphanumeric) {
                Self::flush_cjk(&mut cjk_run, &mut tokens);
                continue;
            }

            if word.chars().any(is_cjk) {
                if !cjk_run.is_empty() && run_end != offset {
                    Self::flush_cjk(&mut cjk_run, &mut tokens);
                }
                cjk_run.extend(word.char_indices().map(|(i, c)| (offset + i, c)));
                run_end = offset + word.len();
                continue;
            }

            Self::flush_cjk(&mut cjk_run, &mut tokens);
            tokens.push(Token::new(word.to_lowercase(), offset, offset + word.len()));
        }
        Self::flush_cjk(&mut cjk_run, &mut tokens);

        tokens
    }

    fn name(&self) -> &'static str {
        "general"
    }
}

/// Whether a character belongs to a script tokenized as character n-grams.
fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}' |   // CJK Unified Ideographs
        '\u{3400}'..='\u{4DBF}' |   // CJK Extension A
        '\u{20000}'..='\u{2CEAF}' | // CJK Extensions B-E
        '\u{F900}'..='\u{FAFF}' |   // CJK Compatibility Ideographs
        '\u{3040}'..='\u{309F}' |   // Hiragana
        '\u{30A0}'..='\u{30FF}' |   // Katakana
        '\u{AC00}'..='\u{D7AF}' |   // Hangul Syllables
        '\u{1100}'..='\u{11FF}'     // Hangul Jamo
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(text: &str) -> Vec<String> {
        GeneralTokenizer::new()
            .tokenize(text)
            .into_iter()
            .map(|t| t.term)
            .collect()
    }

    #[test]
    fn test_general_tokenizer() {
        assert_eq!(terms("The quick, brown fox!"), vec!["the", "quick", "brown", "fox"]);
        assert!(terms("  ...  ").is_empty());
        assert!(terms("").is_empty());
    }

    #[test]
    fn test_offsets_point_into_source() {
        let text = "Héllo wörld";
        for token in GeneralTokenizer::new().tokenize(text) {
            assert_eq!(text[token.start..token.end].to_lowercase(), token.term);
        }
    }

    #[test]
    fn test_repeated_words_get_distinct_offsets() {
        let tokens = GeneralTokenizer::new().tokenize("apple and apple");
        assert_eq!(tokens[0].span(), (0, 5));
        assert_eq!(tokens[2].span(), (10, 15));
    }

    #[test]
    fn test_cjk_bigrams() {
        assert_eq!(terms("中文字"), vec!["中文", "文字"]);
        assert_eq!(terms("中"), vec!["中"]);
        assert_eq!(terms("中文 abc 字"), vec!["中文", "abc", "字"]);

        let tokens = GeneralTokenizer::new().tokenize("a中文");
        let cjk = tokens.iter().find(|t| t.term == "中文").unwrap();
        assert_eq!(&"a中文"[cjk.start..cjk.end], "中文");
    }

    #[test]
    fn test_deterministic() {
        let text = "Search engines index 検索エンジン quickly";
        let tokenizer = GeneralTokenizer::new();
        assert_eq!(tokenizer.tokenize(text), tokenizer.tokenize(text));
    }

    #[test]
    fn test_tokenizer_name() {
        assert_eq!(GeneralTokenizer::new().name(), "general");
    }
}
