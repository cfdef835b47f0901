use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// An ASCII numeral (optional literal `.` fraction) directly followed by `% of retail`.
static RETAIL_LOSS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]+)?)% of retail").expect("retail-loss pattern is valid")
});

const EXCERPT_CHARS: usize = 240;
const EXCERPT_LEAD_CHARS: usize = 80;

/// The disclosure could not be found in a page's text.
#[derive(Debug, Clone, Error)]
#[error("no percentage pattern found")]
pub struct ExtractionError {
    /// Window of the page text around the most likely location, for debugging.
    pub excerpt: String,
    /// Length in bytes of the text that was searched.
    pub text_len: usize,
}

/// Find the first "<number>% of retail" disclosure in `text`.
///
/// The number is returned exactly as written; no float parsing happens.
///
/// ```
/// use tracker_web::extract::extract_percentage;
///
/// let pct = extract_percentage("76.5% of retail investor accounts lose money").unwrap();
/// assert_eq!(pct, "76.5");
/// ```
pub fn extract_percentage(text: &str) -> Result<String, ExtractionError> {
    RETAIL_LOSS_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ExtractionError {
            excerpt: diagnostic_excerpt(text),
            text_len: text.len(),
        })
}

/// Text around the first "retail" mention, or the start of the page.
fn diagnostic_excerpt(text: &str) -> String {
    let anchor = text.to_ascii_lowercase().find("retail").unwrap_or(0);
    let lead_start = text[..anchor]
        .char_indices()
        .rev()
        .nth(EXCERPT_LEAD_CHARS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    text[lead_start..].chars().take(EXCERPT_CHARS).collect()
}
