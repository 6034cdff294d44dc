use serde_json::Value;
use sp_core::{Error, Result};

/// How much of an undecodable payload to keep in the error report.
const PAYLOAD_SNIPPET_LEN: usize = 500;

/// Decodes the extracted candidate string as a JSON document and confirms
/// the top-level `article` and `seo` keys are mapping types.
///
/// Deep schema gaps are deliberately not checked here; normalization owns
/// filling those. Only the two keys the whole pipeline hangs off of are
/// required up front.
pub fn decode_document(candidate: &str) -> Result<Value> {
    let document: Value = serde_json::from_str(candidate).map_err(|e| Error::Decode {
        message: e.to_string(),
        payload: snippet(candidate),
    })?;

    for key in ["article", "seo"] {
        match document.get(key) {
            Some(Value::Object(_)) => {}
            Some(_) => {
                return Err(Error::Contract(format!(
                    "top-level '{key}' is not a JSON object"
                )))
            }
            None => {
                return Err(Error::Contract(format!(
                    "generated document is missing the top-level '{key}' object"
                )))
            }
        }
    }

    Ok(document)
}

fn snippet(payload: &str) -> String {
    if payload.len() <= PAYLOAD_SNIPPET_LEN {
        return payload.to_string();
    }
    let mut end = PAYLOAD_SNIPPET_LEN;
    while !payload.is_char_boundary(end) {
        end -= 1;
    }
    payload[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_minimal_document() {
        let doc = decode_document(r#"{"article": {"title": "T"}, "seo": {}}"#).unwrap();
        assert_eq!(doc["article"]["title"], "T");
    }

    #[test]
    fn test_malformed_json_reports_payload() {
        let err = decode_document(r#"{"article": {"#).unwrap_err();
        match err {
            Error::Decode { payload, .. } => assert_eq!(payload, r#"{"article": {"#),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_seo_is_contract_error() {
        let err = decode_document(r#"{"article": {}}"#).unwrap_err();
        assert!(matches!(err, Error::Contract(_)));
        assert!(err.to_string().contains("seo"));
    }

    #[test]
    fn test_non_object_article_is_contract_error() {
        let err = decode_document(r#"{"article": "oops", "seo": {}}"#).unwrap_err();
        assert!(matches!(err, Error::Contract(_)));
    }

    #[test]
    fn test_long_payload_is_truncated_in_report() {
        let long = format!("{}{}", "x".repeat(600), "{");
        let err = decode_document(&long).unwrap_err();
        match err {
            Error::Decode { payload, .. } => assert_eq!(payload.len(), 500),
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
