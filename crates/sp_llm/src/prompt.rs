use serde_json::json;
use sp_core::{AuthorProfile, CtaOverride};

/// System instruction for the generation service. The character limits here
/// are advisory; normalization enforces them on whatever comes back.
pub const SEO_SYSTEM_PROMPT: &str = "\
You are an expert SEO content writer with deep knowledge of creating high-traffic, engaging articles.

Your task is to create a comprehensive, SEO-optimized article based on the provided topic.
Follow these guidelines:

1. NEVER use H1 headings in the content. Start with H2 and use H3, H4 for subsections.
2. Include relevant keywords naturally throughout the text.
3. Create engaging, informative content that provides real value to readers.
4. Structure the content with clear sections, bullet points, and numbered lists where appropriate.
5. Include examples, case studies, or data points to support claims.
6. Add a compelling call-to-action.
7. Ensure the content is original and plagiarism-free.
8. Optimize for both search engines and human readers.
9. Include relevant internal and external linking opportunities.
10. Suggest meta title, meta description, and focus keywords that will maximize search visibility.
11. NEVER EVER generate placeholder URLs. Only use real URLs that were provided to you or that you know. This applies to the meta fields too.
12. DO NOT generate CTAs or references inside the markdown article field; those belong in their own fields.

IMPORTANT SEO CHARACTER LIMITS:
- Meta Title: Maximum 60 characters (will be truncated in search results if longer)
- Meta Description: Maximum 160 characters (will be truncated in search results if longer)
- URL/Slug: Keep under 75 characters, use hyphens between words
- Headlines (H2, H3): Keep under 70 characters for readability
- Focus Keywords: 3-5 keywords/phrases maximum, each keyword should be used at least twice in the content

The output should be a JSON object with all the fields required by the CMS, following the exact structure provided.";

/// Literal target structure handed to the model as a formatting guide.
pub const JSON_STRUCTURE: &str = r#"{
  "article": {
    "title": "SEO-optimized title with primary keyword",
    "slug": "url-friendly-slug-with-keyword",
    "summary": "Compelling 1-2 sentence summary with primary keyword",
    "content": "Full markdown content with H2 and H3 headings (NO H1), lists, examples, etc.",
    "readingTime": 5,
    "ctas": [
      {
        "text": "Call to Action Text",
        "url": "https://example.com/action",
        "type": "primary",
        "newTab": true,
        "icon": "arrow-right"
      }
    ],
    "references": [
      {
        "title": "Reference Title",
        "url": "https://example.com/reference",
        "authors": "Reference Authors",
        "publisher": "Publisher Name",
        "publishDate": "2023-01-01",
        "description": "Reference description",
        "referenceType": "Website"
      }
    ]
  },
  "seo": {
    "metaTitle": "Keyword-Rich Title Under 60 Characters",
    "metaDescription": "Compelling meta description with primary keyword that stays under 160 characters for optimal display in search results.",
    "keywords": "keyword1, keyword2, keyword3, keyword4, keyword5",
    "metaRobots": "index, follow",
    "canonicalURL": "https://example.com/canonical-url",
    "preventIndexing": false,
    "structuredData": {
      "@context": "https://schema.org",
      "@type": "Article",
      "headline": "Article headline (same as title)",
      "description": "Article description (same as summary)",
      "image": "URL to the featured image (will be filled automatically)",
      "datePublished": "Publication date (will be filled automatically)",
      "dateModified": "Last update date (will be filled automatically)",
      "author": {
        "@type": "Person",
        "name": "Author name (will be filled automatically)"
      },
      "mainEntityOfPage": {
        "@type": "WebPage",
        "@id": "URL to the article (will be filled automatically)"
      }
    },
    "metaSocial": [
      {
        "socialNetwork": "Facebook",
        "title": "Facebook Title",
        "description": "Facebook Description",
        "image": "Image ID for Facebook sharing (will be filled automatically with featured image)"
      },
      {
        "socialNetwork": "Twitter",
        "title": "Twitter Title",
        "description": "Twitter Description",
        "image": "Image ID for Twitter sharing (will be filled automatically with featured image)"
      }
    ]
  },
  "author": {
    "name": "Author Name",
    "slug": "author-slug",
    "email": "author@example.com",
    "bio": "Author biography with expertise and credentials",
    "role": "Author Role",
    "expertise": "Author Expertise",
    "socialLinks": [
      {
        "platform": "Twitter",
        "url": "https://twitter.com/username",
        "username": "username"
      }
    ]
  },
  "categories": [
    {
      "name": "Primary Category",
      "slug": "primary-category",
      "description": "Category description"
    }
  ],
  "tags": [
    {
      "name": "Primary Tag",
      "slug": "primary-tag",
      "description": "Tag description"
    }
  ]
}"#;

/// Builds the user prompt: topic, authoritative author fields, optional CTA
/// and reference list, site base URLs for canonical links, and the literal
/// JSON structure as a formatting guide.
pub fn build_user_prompt(
    topic: &str,
    author: &AuthorProfile,
    references: &[String],
    cta: Option<&CtaOverride>,
    canonical_base: &str,
) -> String {
    let author_json = serde_json::to_string_pretty(&json!({
        "name": author.name,
        "slug": author.slug,
        "email": author.email,
        "bio": author.bio,
        "role": author.role,
        "expertise": author.expertise,
        "socialLinks": author.social_links,
    }))
    .unwrap_or_default();

    let mut prompt = format!(
        "Create a complete SEO-optimized article about '{topic}'. \
         Use the following REAL author information - this is important for SEO:\n\n{author_json}\n"
    );

    if let Some(cta) = cta {
        prompt.push_str(&format!(
            "\nUse this CTA in the article:\nText: {}\nLink: {}\n",
            cta.text, cta.url
        ));
    }

    let valid_refs: Vec<&str> = references
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .collect();
    if !valid_refs.is_empty() {
        prompt.push_str("\nInclude these references in the JSON:\n");
        prompt.push_str(&valid_refs.join("\n"));
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "\nSet canonicalURL in the SEO section to: {base}/[article-slug]\n\
         All structured data should use {base} as the base URL.\n",
        base = canonical_base.trim_end_matches('/')
    ));

    prompt.push_str(&format!(
        "\nInclude all metadata, categories, and tags. Make sure to include structured data for SEO. \
         Follow this JSON structure: {JSON_STRUCTURE}"
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> AuthorProfile {
        AuthorProfile {
            id: None,
            name: "Jane Doe".to_string(),
            slug: "jane-doe".to_string(),
            email: "jane@example.com".to_string(),
            bio: "Writes about testing".to_string(),
            role: "Content Writer".to_string(),
            expertise: "Test Automation".to_string(),
            social_links: vec![],
        }
    }

    #[test]
    fn test_prompt_embeds_author_and_topic() {
        let prompt = build_user_prompt(
            "browser testing",
            &author(),
            &[],
            None,
            "https://example.com/blog",
        );
        assert!(prompt.contains("browser testing"));
        assert!(prompt.contains("\"name\": \"Jane Doe\""));
        assert!(prompt.contains("https://example.com/blog/[article-slug]"));
        assert!(prompt.contains("\"metaTitle\""));
    }

    #[test]
    fn test_prompt_includes_cta_and_references() {
        let cta = CtaOverride {
            text: "Try it".to_string(),
            url: "https://example.com/try".to_string(),
        };
        let refs = vec![
            "https://example.com/a".to_string(),
            "   ".to_string(),
            "https://example.com/b".to_string(),
        ];
        let prompt = build_user_prompt(
            "topic",
            &author(),
            &refs,
            Some(&cta),
            "https://example.com/blog",
        );
        assert!(prompt.contains("Text: Try it"));
        assert!(prompt.contains("Link: https://example.com/try"));
        assert!(prompt.contains("https://example.com/a\nhttps://example.com/b"));
    }

    #[test]
    fn test_prompt_omits_empty_sections() {
        let prompt = build_user_prompt("topic", &author(), &[], None, "https://example.com/blog");
        assert!(!prompt.contains("Use this CTA"));
        assert!(!prompt.contains("Include these references"));
    }
}
