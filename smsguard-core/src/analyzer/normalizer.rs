use smsguard_types::NonLetterMode;

const NON_LETTER: u8 = 0;
const SEPARATOR: u8 = b' ';

/// Per-byte class for the ASCII range: the lowercased letter for `A-Z`/`a-z`,
/// [`SEPARATOR`] for whitespace and [`NON_LETTER`] for everything else.
const CLASS_TABLE: [u8; 128] = build_class_table();

const fn build_class_table() -> [u8; 128] {
    let mut table = [NON_LETTER; 128];
    let mut i = 0;
    while i < 128 {
        let b = i as u8;
        table[i] = if b.is_ascii_uppercase() {
            b + (b'a' - b'A')
        } else if b.is_ascii_lowercase() {
            b
        } else if matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C) {
            SEPARATOR
        } else {
            NON_LETTER
        };
        i += 1;
    }
    table
}

/// Normalizer settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizerConfig {
    /// What to do with characters outside `a-z` after lowercasing.
    pub non_letters: NonLetterMode,
}

/// Lowercasing letter filter.
///
/// - Converts all characters to lowercase (Unicode-aware, so `"K"` (Kelvin
///   sign) still yields `k`)
/// - Drops every character that is not an ASCII letter after lowercasing,
///   either as a separator or outright depending on [`NonLetterMode`]
/// - Collapses runs of separators into single spaces
/// - Removes leading/trailing separators
///
/// The output satisfies the [`Tokenizer`](super::tokenizer::Tokenizer)
/// input contract.
///
/// # Examples
///
/// ```
/// use smsguard_core::analyzer::normalizer::TextNormalizer;
///
/// let normalizer = TextNormalizer::default();
/// assert_eq!(normalizer.normalize("  FREE!!! Win 100 CASH "), "free win cash");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer {
    config: NormalizerConfig,
}

impl TextNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Shorthand for a normalizer with the given non-letter handling.
    pub fn with_mode(non_letters: NonLetterMode) -> Self {
        Self::new(NormalizerConfig { non_letters })
    }

    /// Writes the normalized form of `input` into `out`, replacing its
    /// contents. Lets callers scoring many messages keep one buffer.
    pub fn normalize_into(&self, input: &str, out: &mut String) {
        out.clear();
        out.reserve(input.len());

        let remove = self.config.non_letters == NonLetterMode::Remove;
        let bytes = input.as_bytes();
        let mut pending_space = false;
        let mut i = 0usize;

        while i < bytes.len() {
            let b = bytes[i];

            if b < 128 {
                match CLASS_TABLE[b as usize] {
                    SEPARATOR => pending_space = true,
                    NON_LETTER => {
                        if !remove {
                            pending_space = true;
                        }
                    }
                    letter => push_letter(out, letter as char, &mut pending_space),
                }
                i += 1;
                continue;
            }

            let Some(ch) = input[i..].chars().next() else {
                break;
            };
            i += ch.len_utf8();

            if ch.is_whitespace() {
                pending_space = true;
                continue;
            }

            for lowered in ch.to_lowercase() {
                if lowered.is_ascii_lowercase() {
                    push_letter(out, lowered, &mut pending_space);
                } else if !remove {
                    pending_space = true;
                }
            }
        }
    }

    /// Normalized copy of `input`.
    #[inline]
    pub fn normalize(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        self.normalize_into(input, &mut out);
        out
    }
}

#[inline(always)]
fn push_letter(out: &mut String, letter: char, pending_space: &mut bool) {
    if *pending_space && !out.is_empty() {
        out.push(' ');
    }
    *pending_space = false;
    out.push(letter);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replace(input: &str) -> String {
        TextNormalizer::default().normalize(input)
    }

    fn remove(input: &str) -> String {
        TextNormalizer::with_mode(NonLetterMode::Remove).normalize(input)
    }

    #[test]
    fn lowercases_letters() {
        assert_eq!(replace("WINNER"), "winner");
        assert_eq!(replace("CoNgRaTs"), "congrats");
        assert_eq!(replace("Q"), "q");
    }

    #[test]
    fn digits_and_punctuation_become_separators() {
        assert_eq!(replace("FREE!!! Win CASH now 123"), "free win cash now");
        assert_eq!(replace("txt-stop_now"), "txt stop now");
        assert_eq!(replace("call09061701461now"), "call now");
    }

    #[test]
    fn remove_mode_joins_letters() {
        assert_eq!(remove("don't"), "dont");
        assert_eq!(remove("FREE!!! Win CASH now 123"), "free win cash now");
        assert_eq!(remove("call09061701461now"), "callnow");
    }

    #[test]
    fn replace_mode_splits_contractions() {
        assert_eq!(replace("don't"), "don t");
        assert_eq!(replace("You've"), "you ve");
    }

    #[test]
    fn separators_collapse_and_trim() {
        assert_eq!(replace("ok\t\n  see you\r\n"), "ok see you");
        assert_eq!(replace("!!urgent!!"), "urgent");
        assert_eq!(replace("reply , , stop -- now"), "reply stop now");
        assert_eq!(remove("  gud nite  "), "gud nite");
    }

    #[test]
    fn nothing_left() {
        for input in ["", "   ", "\n\t", "0800 123 456", ":-) !!"] {
            assert_eq!(replace(input), "", "input: {input:?}");
            assert_eq!(remove(input), "", "input: {input:?}");
        }
    }

    #[test]
    fn non_ascii_letters_are_non_letters() {
        assert_eq!(replace("café"), "caf");
        assert_eq!(replace("Â£900 prize"), "prize");
        assert_eq!(remove("naïve"), "nave");
        assert_eq!(replace("ПРИВЕТ world"), "world");
    }

    #[test]
    fn unicode_lowercase_to_ascii_is_kept() {
        // KELVIN SIGN lowercases to ASCII 'k'.
        assert_eq!(replace("\u{212A}ing"), "king");
        assert_eq!(replace("İstanbul"), "i stanbul");
        assert_eq!(remove("İstanbul"), "istanbul");
    }

    #[test]
    fn unicode_whitespace_separates() {
        assert_eq!(replace("call\u{00A0}me"), "call me");
        assert_eq!(remove("call\u{2003}me"), "call me");
    }

    #[test]
    fn emoji_and_control_chars() {
        assert_eq!(replace("Hi 😊 there"), "hi there");
        assert_eq!(remove("Win🎉Cash"), "wincash");
        assert_eq!(replace("a\x01\x02b"), "a b");
        assert_eq!(remove("a\x01\x02b"), "ab");
    }

    #[test]
    fn normalize_into_overwrites_buffer() {
        let normalizer = TextNormalizer::default();
        let mut buf = String::from("stale contents");
        normalizer.normalize_into("Txt STOP", &mut buf);
        assert_eq!(buf, "txt stop");
        normalizer.normalize_into("", &mut buf);
        assert!(buf.is_empty());
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        for mode in [NonLetterMode::Replace, NonLetterMode::Remove] {
            let n = TextNormalizer::with_mode(mode);
            for s in ["Sorry, I'll call later", "U WON £1000!!", "ÜBER Café 42"] {
                let once = n.normalize(s);
                assert_eq!(n.normalize(&once), once);
            }
        }
    }

    #[test]
    fn output_alphabet() {
        for input in ["Hello, World!", "مرحبا 123", "こんにちは abc", "x\0y"] {
            let out = replace(input);
            assert!(out.bytes().all(|b| b == b' ' || b.is_ascii_lowercase()));
            assert!(!out.contains("  "));
        }
    }
}
