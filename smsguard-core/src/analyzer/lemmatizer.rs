//! Rule-based word reduction.
//!
//! Reduces inflected English words to a base form without a dictionary:
//! an exception table for irregular forms, then suffix detachment with
//! length guards, consonant undoubling and silent-`e` restoration. The rules
//! only need to be deterministic; the same reducer runs at training and at
//! inference time.
//!
//! Input must be lowercase ASCII (normalizer output). Anything else is
//! returned unchanged.

use std::borrow::Cow;

use smsguard_types::Reduction;

/// Word reducer for a fixed [`Reduction`] mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lemmatizer {
    reduction: Reduction,
}

impl Lemmatizer {
    /// Creates a reducer for the given mode.
    pub const fn new(reduction: Reduction) -> Self {
        Self { reduction }
    }

    /// The configured mode.
    pub const fn reduction(&self) -> Reduction {
        self.reduction
    }

    /// Reduces one token.
    ///
    /// ```
    /// use smsguard_core::analyzer::lemmatizer::Lemmatizer;
    /// use smsguard_types::Reduction;
    ///
    /// let verbs = Lemmatizer::new(Reduction::Verb);
    /// assert_eq!(verbs.reduce("running"), "run");
    /// assert_eq!(verbs.reduce("claimed"), "claim");
    /// ```
    pub fn reduce<'a>(&self, word: &'a str) -> Cow<'a, str> {
        if !word.is_ascii() {
            return Cow::Borrowed(word);
        }
        match self.reduction {
            Reduction::None => Cow::Borrowed(word),
            Reduction::Noun => reduce_noun(word),
            Reduction::Verb => reduce_verb(word),
        }
    }
}

#[inline(always)]
const fn is_vowel(b: u8) -> bool {
    matches!(b, b'a' | b'e' | b'i' | b'o' | b'u')
}

#[inline(always)]
fn has_vowel(s: &str) -> bool {
    s.bytes().any(|b| is_vowel(b) || b == b'y')
}

fn reduce_verb(word: &str) -> Cow<'_, str> {
    if let Some(base) = verb_exception(word) {
        return Cow::Borrowed(base);
    }

    let n = word.len();
    if n <= 3 {
        return Cow::Borrowed(word);
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if n > 4 {
            return Cow::Owned(format!("{stem}y"));
        }
    }

    if let Some(stem) = word.strip_suffix("ing") {
        if stem.len() >= 3 && has_vowel(stem) {
            return restore(stem);
        }
        return Cow::Borrowed(word);
    }

    if word.ends_with("eed") {
        // agreed -> agree; need, feed, speed stay
        if n > 5 {
            return Cow::Borrowed(&word[..n - 1]);
        }
        return Cow::Borrowed(word);
    }

    if let Some(stem) = word.strip_suffix("ed") {
        if stem.len() >= 3 && has_vowel(stem) {
            if let Some(s) = stem.strip_suffix('i') {
                return Cow::Owned(format!("{s}y"));
            }
            return restore(stem);
        }
        return Cow::Borrowed(word);
    }

    strip_plural(word, true)
}

fn reduce_noun(word: &str) -> Cow<'_, str> {
    if let Some(base) = noun_exception(word) {
        return Cow::Borrowed(base);
    }

    let n = word.len();
    if n <= 3 {
        return Cow::Borrowed(word);
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if n > 4 {
            return Cow::Owned(format!("{stem}y"));
        }
    }

    if let Some(stem) = word.strip_suffix("men") {
        if n > 4 {
            return Cow::Owned(format!("{stem}man"));
        }
    }

    strip_plural(word, false)
}

/// Third-person / plural `-s` removal shared by both modes.
fn strip_plural(word: &str, verb: bool) -> Cow<'_, str> {
    let n = word.len();
    if !word.ends_with('s')
        || word.ends_with("ss")
        || word.ends_with("us")
        || word.ends_with("is")
    {
        return Cow::Borrowed(word);
    }

    const ES_SUFFIXES: [&str; 5] = ["sses", "shes", "ches", "xes", "zzes"];
    if ES_SUFFIXES.iter().any(|s| word.ends_with(s)) || (verb && word.ends_with("oes")) {
        return Cow::Borrowed(&word[..n - 2]);
    }

    Cow::Borrowed(&word[..n - 1])
}

/// Repairs a stem left behind by `-ed`/`-ing` detachment.
fn restore(stem: &str) -> Cow<'_, str> {
    let b = stem.as_bytes();
    let n = b.len();
    let last = b[n - 1];

    // runn -> run, stopp -> stop; call, miss, buzz keep the double letter
    if n >= 4 && last == b[n - 2] && !is_vowel(last) && !matches!(last, b'l' | b's' | b'z') {
        return Cow::Borrowed(&stem[..n - 1]);
    }

    if needs_silent_e(b) {
        return Cow::Owned(format!("{stem}e"));
    }

    Cow::Borrowed(stem)
}

fn needs_silent_e(b: &[u8]) -> bool {
    let n = b.len();
    let last = b[n - 1];

    // mak, hop, giv, bas
    if n == 3
        && !is_vowel(b[0])
        && is_vowel(b[1])
        && !is_vowel(last)
        && !matches!(last, b'w' | b'x' | b'y')
    {
        return true;
    }

    // valu, continu, issu
    if last == b'u' {
        return true;
    }

    match &b[n - 2..] {
        b"iv" | b"iz" | b"rg" | b"dg" | b"uc" | b"rc" | b"nc" => true,
        b"bl" | b"tl" | b"pl" | b"gl" | b"kl" | b"dl" => true,
        b"at" => !is_vowel(b[n - 3]),
        b"as" | b"us" => n >= 4 && (is_vowel(b[n - 3]) || b[n - 3] == b'h'),
        _ => false,
    }
}

/// Words the suffix rules would damage.
fn invariant(word: &str) -> bool {
    matches!(
        word,
        "news" | "always" | "perhaps" | "yes" | "plus" | "series" | "species"
            // singular nouns ending in -men
            | "abdomen" | "acumen" | "regimen" | "specimen" | "stamen"
    )
}

fn verb_exception(word: &str) -> Option<&str> {
    if invariant(word) {
        return Some(word);
    }
    let base = match word {
        "anything" | "everything" | "nothing" | "something" => return Some(word),
        "morning" | "evening" | "wedding" | "hundred" | "indeed" => return Some(word),
        "ate" => "eat",
        "bought" => "buy",
        "brought" => "bring",
        "came" => "come",
        "caught" => "catch",
        "chose" | "chosen" => "choose",
        "created" | "creating" | "creates" => "create",
        "died" | "dying" => "die",
        "done" => "do",
        "drove" | "driven" => "drive",
        "fell" | "fallen" => "fall",
        "felt" => "feel",
        "flew" | "flown" => "fly",
        "forgot" | "forgotten" => "forget",
        "found" => "find",
        "gave" | "given" => "give",
        "goes" | "going" | "gone" | "went" => "go",
        "got" | "gotten" => "get",
        "heard" => "hear",
        "held" => "hold",
        "kept" => "keep",
        "knew" | "known" => "know",
        "left" => "leave",
        "lost" => "lose",
        "made" => "make",
        "meant" => "mean",
        "met" => "meet",
        "paid" => "pay",
        "ran" => "run",
        "said" => "say",
        "sang" | "sung" => "sing",
        "sat" => "sit",
        "saw" | "seen" => "see",
        "sent" => "send",
        "slept" => "sleep",
        "sold" => "sell",
        "spent" => "spend",
        "spoke" | "spoken" => "speak",
        "stood" => "stand",
        "taken" | "took" => "take",
        "taught" => "teach",
        "thought" => "think",
        "told" => "tell",
        "understood" => "understand",
        "used" | "uses" | "using" => "use",
        "woke" | "woken" => "wake",
        "won" => "win",
        "wore" | "worn" => "wear",
        "wrote" | "written" => "write",
        _ => return None,
    };
    Some(base)
}

fn noun_exception(word: &str) -> Option<&str> {
    if invariant(word) {
        return Some(word);
    }
    let base = match word {
        "children" => "child",
        "feet" => "foot",
        "geese" => "goose",
        "knives" => "knife",
        "leaves" => "leaf",
        "lives" => "life",
        "men" => "man",
        "mice" => "mouse",
        "people" => "person",
        "teeth" => "tooth",
        "wives" => "wife",
        "women" => "woman",
        _ => return None,
    };
    Some(base)
}
