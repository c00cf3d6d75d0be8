use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EXCESS_NEWLINES: Regex = Regex::new(r"\n{3,}").unwrap();
    static ref FACT_CHECK_BANNER: Regex =
        Regex::new(r"(?is)#{40,}.*?FACT CHECK RESULT.*?#{40,}").unwrap();
    static ref HEADER_MARKERS: Regex = Regex::new(r"(?m)^#+[ \t]*").unwrap();
    static ref SECTION_STARTS: Regex =
        Regex::new(r"(?m)^(Solution:|Question:|Exercise:|FACT CHECK RESULT)").unwrap();
    static ref CONFIDENCE_RATING: Regex =
        Regex::new(r"(?i)Confidence Rating:\s*\*\*(\w+)\*\*").unwrap();
}

/// Tidy model-generated markdown for plain-text display.
///
/// The fact-check banner is collapsed before header markers are stripped,
/// otherwise a banner at the start of a line would lose its leading `#` run
/// and no longer be recognized.
pub fn clean_markdown(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = EXCESS_NEWLINES.replace_all(text, "\n\n");
    let text = FACT_CHECK_BANNER.replace_all(&text, "🧪 FACT CHECK ANALYSIS");
    let text = HEADER_MARKERS.replace_all(&text, "");
    let text = SECTION_STARTS.replace_all(&text, "\n${1}");
    let text = CONFIDENCE_RATING.replace_all(&text, "🎯 CONFIDENCE LEVEL: ${1}");

    text.into_owned()
}
