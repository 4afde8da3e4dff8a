//! Request handlers.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use smsguard_types::{ClassifyError, Label, Strategy, Verdict};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::history::HistoryEntry;
use crate::state::AppState;

/// Response of `POST /classify`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifyResponse {
    /// Shorthand for `label == spam`.
    pub is_spam: bool,
    /// Predicted label.
    pub label: Label,
    /// Maximum class probability in `[0, 1]`; `null` for the keyword rule.
    pub confidence: Option<f32>,
    /// Normalized tokens the model saw.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_text: Option<String>,
    /// Keywords found by the keyword rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<Vec<String>>,
}

impl From<Verdict> for ClassifyResponse {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Statistical(r) => Self {
                is_spam: r.is_spam(),
                label: r.label,
                confidence: Some(r.confidence),
                processed_text: Some(r.normalized_text),
                matched: None,
            },
            Verdict::Keyword(k) => Self {
                is_spam: k.label.is_spam(),
                label: k.label,
                confidence: None,
                processed_text: None,
                matched: Some(k.matched),
            },
        }
    }
}

/// Response of `POST /check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResponse {
    /// `"spam"` or `"ham"`.
    pub result: Label,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: &'static str,
    /// Configured strategy.
    pub strategy: Strategy,
    /// Whether a model is loaded. Always `true` for the keyword rule.
    pub trained: bool,
}

/// First string field among `keys`.
fn text_field<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| body.get(*k).and_then(Value::as_str))
}

/// Classifies, records the result in the history and returns the verdict.
fn classify_and_record(state: &AppState, text: Option<&str>) -> Result<Verdict, ApiError> {
    let text = text.ok_or(ClassifyError::EmptyInput)?;
    let verdict = state.engine.classify(text).inspect_err(|e| {
        if *e == ClassifyError::ModelNotTrained {
            warn!("classification requested but no model is loaded");
        }
    })?;
    debug!(%verdict, "classified request");
    state.history.push(HistoryEntry::new(text, &verdict));
    Ok(verdict)
}

/// `POST /classify` with `{"text": "..."}`.
pub async fn classify(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let Json(body) = payload?;
    let verdict = classify_and_record(&state, text_field(&body, &["text"]))?;
    Ok(Json(verdict.into()))
}

/// `POST /check` with `{"message": "..."}` (or `text`).
pub async fn check(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CheckResponse>, ApiError> {
    let Json(body) = payload?;
    let verdict = classify_and_record(&state, text_field(&body, &["message", "text"]))?;
    Ok(Json(CheckResponse {
        result: verdict.label(),
    }))
}

/// `GET /history`, oldest first.
pub async fn history(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.snapshot())
}

/// `GET /health`.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        strategy: state.engine.strategy(),
        trained: state.engine.is_ready(),
    })
}

/// `GET /`: form and recent history.
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_index(&state))
}

const INDEX_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>smsguard</title>
<style>
body { font-family: sans-serif; max-width: 46rem; margin: 2rem auto; }
textarea { width: 100%; height: 6rem; }
table { width: 100%; border-collapse: collapse; margin-top: 1.5rem; }
td, th { border-bottom: 1px solid #ddd; padding: .3rem; text-align: left; }
.spam { color: #b00020; }
.ham { color: #1b5e20; }
</style>
</head>
<body>
<h1>SMS spam check</h1>
<form id="classify">
<textarea id="text" placeholder="Paste a message"></textarea>
<button type="submit">Classify</button>
</form>
<p id="result"></p>
<table>
<thead><tr><th>Message</th><th>Label</th><th>Confidence</th><th>Time</th></tr></thead>
<tbody>
"#;

const INDEX_TAIL: &str = r#"</tbody>
</table>
<script>
document.getElementById('classify').addEventListener('submit', async (ev) => {
  ev.preventDefault();
  const out = document.getElementById('result');
  const text = document.getElementById('text').value.trim();
  if (!text) { out.textContent = 'Please enter a message'; out.className = ''; return; }
  const res = await fetch('/classify', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ text }),
  });
  const data = await res.json();
  if (!res.ok) { out.textContent = data.error; out.className = ''; return; }
  const conf = data.confidence === null ? '' : ` (${(data.confidence * 100).toFixed(1)}%)`;
  out.textContent = `Result: ${data.label.toUpperCase()}${conf}`;
  out.className = data.label;
});
</script>
</body>
</html>
"#;

fn render_index(state: &AppState) -> String {
    let entries = state.history.snapshot();
    let mut page = String::with_capacity(INDEX_HEAD.len() + INDEX_TAIL.len() + entries.len() * 160);
    page.push_str(INDEX_HEAD);
    for e in entries.iter().rev() {
        let confidence = e
            .confidence
            .map_or_else(|| "-".to_owned(), |c| format!("{:.1}%", c * 100.0));
        // writing to a String cannot fail
        let _ = writeln!(
            page,
            "<tr class=\"{label}\"><td>{text}</td><td>{label}</td><td>{confidence}</td><td>{time}</td></tr>",
            label = e.label,
            text = escape_html(&e.text),
            time = e.timestamp,
        );
    }
    page.push_str(INDEX_TAIL);
    page
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use smsguard_types::{ClassificationResult, KeywordVerdict};

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"win" & 'cash'</b>"#),
            "&lt;b&gt;&quot;win&quot; &amp; &#39;cash&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn text_field_prefers_first_key() {
        let body = serde_json::json!({ "message": "a", "text": "b" });
        assert_eq!(text_field(&body, &["message", "text"]), Some("a"));
        assert_eq!(text_field(&body, &["text"]), Some("b"));
        let body = serde_json::json!({ "text": 12 });
        assert_eq!(text_field(&body, &["text"]), None);
    }

    #[test]
    fn statistical_response_shape() {
        let verdict = Verdict::Statistical(ClassificationResult {
            label: Label::Spam,
            confidence: 0.75,
            spam_probability: 0.75,
            normalized_text: "free cash".into(),
        });
        let json = serde_json::to_value(ClassifyResponse::from(verdict)).unwrap();
        assert_eq!(json["is_spam"], true);
        assert_eq!(json["confidence"], 0.75);
        assert_eq!(json["processed_text"], "free cash");
        assert!(json.get("matched").is_none());
    }

    #[test]
    fn keyword_response_shape() {
        let verdict = Verdict::Keyword(KeywordVerdict {
            label: Label::Ham,
            matched: vec!["free".into()],
        });
        let json = serde_json::to_value(ClassifyResponse::from(verdict)).unwrap();
        assert_eq!(json["is_spam"], false);
        assert_eq!(json["label"], "ham");
        assert!(json["confidence"].is_null());
        assert_eq!(json["matched"], serde_json::json!(["free"]));
        assert!(json.get("processed_text").is_none());
    }
}
