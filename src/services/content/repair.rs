use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{AppError, AppResult};

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^```(?:json)?\s*|\s*```$").expect("CODE_FENCE is a valid regex pattern")
});

static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r",\s*([}\]])").expect("TRAILING_COMMA is a valid regex pattern")
});

/// Turns typical model output into parseable JSON.
///
/// Strips markdown fences, cuts to the outermost object or array (whichever
/// opens first), straightens curly quotes and drops trailing commas.
pub fn clean_json(raw: &str) -> AppResult<serde_json::Value> {
    let trimmed = CODE_FENCE.replace_all(raw.trim(), "");
    let trimmed = trimmed.trim();

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let array_first = match (trimmed.find('['), trimmed.find('{')) {
        (Some(bracket), Some(brace)) => bracket < brace,
        (Some(_), None) => true,
        _ => false,
    };
    let body = if array_first {
        outermost(trimmed, '[', ']')
    } else {
        outermost(trimmed, '{', '}')
    }
    .ok_or_else(|| AppError::ContentError("Response contains no JSON document".to_string()))?;

    let normalized = body
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");
    let normalized = TRAILING_COMMA.replace_all(&normalized, "$1");

    serde_json::from_str(&normalized).map_err(|e| {
        log::debug!("Unrepairable model output: {}", raw);
        AppError::ContentError(format!("Failed to repair JSON: {}", e))
    })
}

fn outermost(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_passes_through() {
        let value = clean_json(r#"{"questions": []}"#).unwrap();
        assert!(value["questions"].as_array().unwrap().is_empty());
    }

    #[test]
    fn strips_code_fences() {
        let value = clean_json("```json\n{\"title\": \"Sleep\"}\n```").unwrap();
        assert_eq!(value["title"], "Sleep");
    }

    #[test]
    fn cuts_surrounding_prose() {
        let value = clean_json("Here is your test:\n{\"title\": \"Sleep\"}\nGood luck!").unwrap();
        assert_eq!(value["title"], "Sleep");
    }

    #[test]
    fn removes_trailing_commas_and_curly_quotes() {
        let raw = "{\u{201C}title\u{201D}: \"Sleep\", \"questions\": [1, 2,],}";
        let value = clean_json(raw).unwrap();
        assert_eq!(value["title"], "Sleep");
        assert_eq!(value["questions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn accepts_bare_array() {
        let value = clean_json("Questions: [{\"question\": \"1 + 1?\"},]").unwrap();
        assert!(value.is_array());
    }

    #[test]
    fn rejects_text_without_json() {
        assert!(matches!(
            clean_json("I cannot help with that."),
            Err(AppError::ContentError(_))
        ));
    }
}
