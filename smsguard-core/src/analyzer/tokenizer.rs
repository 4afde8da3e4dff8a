//! Whitespace tokenizer.
//!
//! Second analysis stage: splits the output of
//! [`TextNormalizer`](super::normalizer::TextNormalizer) on ASCII spaces.
//! Tokens borrow from the input; nothing is copied.
//!
//! The normalizer never produces leading, trailing or repeated spaces, so
//! every gap is exactly one byte. Empty segments are skipped regardless.

use memchr::Memchr;

/// Splits normalized text into word slices.
///
/// ```
/// use smsguard_core::analyzer::Tokenizer;
///
/// let words: Vec<_> = Tokenizer::new().tokens("claim your prize").collect();
/// assert_eq!(words, ["claim", "your", "prize"]);
/// ```
#[derive(Debug, Copy, Clone, Default)]
pub struct Tokenizer;

impl Tokenizer {
    #[inline]
    pub const fn new() -> Self {
        Self
    }

    /// Iterator over the words of `normalized`, left to right.
    #[inline]
    pub fn tokens<'n>(&self, normalized: &'n str) -> Tokens<'n> {
        debug_assert!(
            !normalized.starts_with(' ') && !normalized.ends_with(' '),
            "tokenizer input has surrounding spaces: {normalized:?}"
        );
        Tokens {
            text: normalized,
            spaces: Memchr::new(b' ', normalized.as_bytes()),
            start: 0,
        }
    }
}

/// Iterator returned by [`Tokenizer::tokens`].
#[derive(Debug, Clone)]
pub struct Tokens<'n> {
    text: &'n str,
    spaces: Memchr<'n>,
    start: usize,
}

impl<'n> Iterator for Tokens<'n> {
    type Item = &'n str;

    fn next(&mut self) -> Option<&'n str> {
        // A space is one ASCII byte, so every cut lands on a char boundary.
        for end in self.spaces.by_ref() {
            let start = std::mem::replace(&mut self.start, end + 1);
            if start < end {
                return Some(&self.text[start..end]);
            }
        }
        if self.start < self.text.len() {
            let start = std::mem::replace(&mut self.start, self.text.len());
            return Some(&self.text[start..]);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(input: &str) -> Vec<&str> {
        Tokenizer::new().tokens(input).collect()
    }

    #[test]
    fn splits_on_spaces() {
        assert_eq!(split("free entry win cash"), ["free", "entry", "win", "cash"]);
        assert_eq!(split("hello"), ["hello"]);
        assert_eq!(split("a"), ["a"]);
    }

    #[test]
    fn empty_input() {
        assert_eq!(split(""), Vec::<&str>::new());
    }

    #[test]
    fn keeps_repeats() {
        assert_eq!(split("claim claim claim"), ["claim", "claim", "claim"]);
    }

    #[test]
    fn borrows_from_input() {
        let input = String::from("cash prize");
        let range = input.as_bytes().as_ptr_range();
        for token in Tokenizer::new().tokens(&input) {
            assert!(range.contains(&token.as_ptr()));
        }
    }

    #[test]
    fn non_ascii_words_stay_whole() {
        assert_eq!(split("café £100 naïve"), ["café", "£100", "naïve"]);
    }

    #[test]
    fn composes_with_normalizer() {
        use crate::analyzer::normalizer::TextNormalizer;

        let normalized = TextNormalizer::default().normalize("  URGENT!! Call 0800 now ");
        assert_eq!(split(&normalized), ["urgent", "call", "now"]);
    }
}
