use async_trait::async_trait;
use sp_core::{GenerationModel, Result};

/// Offline model that ignores the prompt and returns a canned bundle,
/// fenced and wrapped in commentary the way the real service tends to
/// respond. Useful for dry runs and for exercising the pipeline in tests.
#[derive(Debug)]
pub struct DummyModel;

// The body markdown contains `"##`, so the fence needs a wide delimiter.
const CANNED_RESPONSE: &str = r####"Here is the article you asked for:

```json
{
  "article": {
    "title": "A Practical Guide to Automated Browser Testing",
    "slug": "practical-guide-automated-browser-testing",
    "summary": "Learn how automated browser testing catches regressions before your users do.",
    "content": "## Why Automate Browser Tests\n\nManual testing does not scale. Automated browser tests run on every change and catch regressions early.\n\n## Getting Started\n\nPick a framework, write a smoke test, and wire it into CI.",
    "ctas": [],
    "references": []
  },
  "seo": {
    "metaTitle": "Automated Browser Testing: A Practical Guide",
    "metaDescription": "Learn how automated browser testing catches regressions before your users do, with practical setup advice.",
    "keywords": "browser testing, test automation, regression testing",
    "metaRobots": "index, follow",
    "preventIndexing": false
  },
  "author": {
    "name": "AI Writer",
    "slug": "ai-writer",
    "email": "ai@example.com",
    "bio": "Generated placeholder author",
    "role": "Writer",
    "expertise": "Testing",
    "socialLinks": []
  },
  "categories": [
    {"name": "Testing", "slug": "testing", "description": "Software testing topics"}
  ],
  "tags": [
    {"name": "Automation", "slug": "automation", "description": "Automation tooling"}
  ]
}
```

Let me know if you want any changes."####;

#[async_trait]
impl GenerationModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        Ok(CANNED_RESPONSE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode_document, extract_json};

    #[tokio::test]
    async fn test_canned_response_survives_the_decode_path() {
        let raw = DummyModel.generate("system", "user").await.unwrap();
        let candidate = extract_json(&raw).unwrap();
        let document = decode_document(&candidate).unwrap();
        assert_eq!(document["author"]["name"], "AI Writer");
        assert_eq!(
            document["article"]["slug"],
            "practical-guide-automated-browser-testing"
        );
        // The markdown body must come through whole, H2 markers included.
        let content = document["article"]["content"].as_str().unwrap();
        assert!(content.starts_with("## Why Automate Browser Tests"));
        assert!(content.contains("## Getting Started"));
    }
}
