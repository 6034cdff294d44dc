use sp_core::{Error, Result};

/// Locates the JSON payload inside raw generation output.
///
/// The model routinely wraps its JSON in commentary or code fences, so this
/// is a best-effort heuristic rather than a parser: prefer a block fenced
/// as ```json, fall back to any fenced block, fall back to the whole text,
/// then trim the candidate to the substring between the first `{` and the
/// last `}`.
pub fn extract_json(raw: &str) -> Result<String> {
    let candidate = fenced_block(raw, "```json")
        .or_else(|| fenced_block(raw, "```"))
        .unwrap_or(raw);

    let start = candidate
        .find('{')
        .ok_or_else(|| Error::Extraction("no JSON object found in generation output".to_string()))?;
    let end = candidate.rfind('}').ok_or_else(|| {
        Error::Extraction("JSON object in generation output is never closed".to_string())
    })?;
    if end < start {
        return Err(Error::Extraction(
            "no JSON object found in generation output".to_string(),
        ));
    }

    Ok(candidate[start..=end].trim().to_string())
}

fn fenced_block<'a>(raw: &'a str, opener: &str) -> Option<&'a str> {
    let (_, rest) = raw.split_once(opener)?;
    let (block, _) = rest.split_once("```")?;
    Some(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBJECT: &str = r#"{"article": {"title": "Hello"}, "seo": {}}"#;

    #[test]
    fn test_extracts_json_fenced_block() {
        let raw = format!("Here is your article:\n```json\n{OBJECT}\n```\nLet me know!");
        assert_eq!(extract_json(&raw).unwrap(), OBJECT);
    }

    #[test]
    fn test_extracts_plain_fenced_block() {
        let raw = format!("Sure thing.\n```\n{OBJECT}\n```");
        assert_eq!(extract_json(&raw).unwrap(), OBJECT);
    }

    #[test]
    fn test_fenced_and_unfenced_agree() {
        let fenced = format!("Some prose before.\n```json\n{OBJECT}\n```\nProse after.");
        assert_eq!(
            extract_json(&fenced).unwrap(),
            extract_json(OBJECT).unwrap()
        );
    }

    #[test]
    fn test_trims_surrounding_prose() {
        let raw = format!("The JSON you asked for: {OBJECT} -- enjoy");
        assert_eq!(extract_json(&raw).unwrap(), OBJECT);
    }

    #[test]
    fn test_fails_without_braces() {
        let err = extract_json("I could not produce an article, sorry.").unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[test]
    fn test_fails_on_reversed_braces() {
        let err = extract_json("} nothing here {").unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }
}
