//! Bounded classification history.
//!
//! Entries are kept in arrival order. Once [`HISTORY_CAPACITY`] is reached,
//! each new entry evicts the oldest one.

use std::collections::VecDeque;

use chrono::Local;
use parking_lot::Mutex;
use serde::Serialize;
use smsguard_types::{Label, Verdict};

/// Maximum number of entries kept.
pub const HISTORY_CAPACITY: usize = 50;

/// Messages longer than this many characters are truncated in the history.
pub const PREVIEW_CHARS: usize = 50;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One classified message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Message preview.
    pub text: String,
    /// Predicted label.
    pub label: Label,
    /// Shorthand for `label == spam`.
    pub is_spam: bool,
    /// Confidence in `[0, 1]`; `None` for the keyword strategy.
    pub confidence: Option<f32>,
    /// Local time of classification.
    pub timestamp: String,
}

impl HistoryEntry {
    /// Entry for `text` classified as `verdict`, stamped with the current
    /// local time.
    pub fn new(text: &str, verdict: &Verdict) -> Self {
        Self {
            text: preview(text),
            label: verdict.label(),
            is_spam: verdict.is_spam(),
            confidence: verdict.confidence(),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// First [`PREVIEW_CHARS`] characters, with `...` appended if anything was cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_owned(),
    }
}

/// FIFO buffer of recent classifications, safe to share between handlers.
#[derive(Debug)]
pub struct History {
    entries: Mutex<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl History {
    /// Empty history holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Appends an entry, evicting the oldest when full.
    pub fn push(&self, entry: HistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Copy of the entries, oldest first.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use smsguard_types::{ClassificationResult, KeywordVerdict};

    fn statistical(label: Label, confidence: f32) -> Verdict {
        Verdict::Statistical(ClassificationResult {
            label,
            confidence,
            spam_probability: if label.is_spam() { confidence } else { 1.0 - confidence },
            normalized_text: String::new(),
        })
    }

    fn entry(text: &str) -> HistoryEntry {
        HistoryEntry::new(text, &statistical(Label::Ham, 0.9))
    }

    #[test]
    fn evicts_oldest_after_capacity() {
        let history = History::default();
        for i in 0..=HISTORY_CAPACITY {
            history.push(entry(&format!("message {i}")));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        let entries = history.snapshot();
        assert_eq!(entries[0].text, "message 1");
        assert_eq!(entries[HISTORY_CAPACITY - 1].text, "message 50");
    }

    #[test]
    fn never_exceeds_capacity() {
        let history = History::new(3);
        for i in 0..10 {
            history.push(entry(&i.to_string()));
            assert!(history.len() <= 3);
        }
        let texts: Vec<_> = history.snapshot().into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["7", "8", "9"]);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let history = History::new(0);
        history.push(entry("hi"));
        assert!(history.is_empty());
    }

    #[test]
    fn preview_truncates_long_text() {
        let long = "x".repeat(60);
        assert_eq!(preview(&long), format!("{}...", "x".repeat(50)));
        let exact = "y".repeat(50);
        assert_eq!(preview(&exact), exact);
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn preview_counts_chars_not_bytes() {
        let text = "£".repeat(51);
        assert_eq!(preview(&text), format!("{}...", "£".repeat(50)));
    }

    #[test]
    fn entry_fields() {
        let e = HistoryEntry::new("Win cash", &statistical(Label::Spam, 0.75));
        assert!(e.is_spam);
        assert_eq!(e.label, Label::Spam);
        assert_eq!(e.confidence, Some(0.75));
        assert!(NaiveDateTime::parse_from_str(&e.timestamp, TIMESTAMP_FORMAT).is_ok());

        let keyword = Verdict::Keyword(KeywordVerdict {
            label: Label::Ham,
            matched: vec![],
        });
        assert_eq!(HistoryEntry::new("hi", &keyword).confidence, None);
    }

    #[test]
    fn serializes_confidence_as_null_when_absent() {
        let keyword = Verdict::Keyword(KeywordVerdict {
            label: Label::Spam,
            matched: vec!["free".into(), "win".into(), "cash".into()],
        });
        let json = serde_json::to_value(HistoryEntry::new("free win cash", &keyword)).unwrap();
        assert_eq!(json["confidence"], serde_json::Value::Null);
        assert_eq!(json["label"], "spam");
        assert_eq!(json["is_spam"], true);
    }
}
