use serde::{Deserialize, Serialize};

/// The complete generated record: one article plus its SEO metadata, the
/// author it is attributed to and the taxonomy terms it is filed under.
/// This is the unit handed to the publish orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishBundle {
    pub article: ArticleDocument,
    pub seo: SeoMetadata,
    pub author: AuthorProfile,
    #[serde(default)]
    pub categories: Vec<TaxonomyTerm>,
    #[serde(default)]
    pub tags: Vec<TaxonomyTerm>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDocument {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub summary: String,
    /// Markdown body. Starts at H2; the generation prompt forbids H1 markers.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<u32>,
    #[serde(default)]
    pub ctas: Vec<CallToAction>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

/// Caller-supplied call-to-action pair. When present it unconditionally
/// replaces whatever CTA list the model produced.
#[derive(Debug, Clone)]
pub struct CtaOverride {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToAction {
    pub text: String,
    pub url: String,
    #[serde(rename = "type", default = "default_cta_kind")]
    pub kind: String,
    #[serde(rename = "newTab", default)]
    pub new_tab: bool,
    #[serde(default)]
    pub icon: Option<String>,
}

fn default_cta_kind() -> String {
    "primary".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "referenceType", default)]
    pub reference_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoMetadata {
    pub meta_title: String,
    pub meta_description: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub meta_robots: Option<String>,
    #[serde(rename = "canonicalURL", default)]
    pub canonical_url: Option<String>,
    #[serde(default)]
    pub prevent_indexing: bool,
    /// schema.org Article object. Kept as raw JSON since the CMS stores it
    /// verbatim and search engines consume it untyped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<serde_json::Value>,
    #[serde(default)]
    pub meta_social: Vec<SocialPreview>,
}

/// Per-network link-sharing card override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialPreview {
    pub social_network: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
}

/// A media reference is a placeholder string until the featured image is
/// uploaded, then the numeric media id the CMS assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Id(i64),
    Placeholder(String),
}

/// Either an existing CMS author (`id` set) or a creation request
/// (`id` absent; a profile image is required before creation).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub expertise: String,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
    pub username: String,
}

/// A Category or Tag. Resolved against existing CMS terms by
/// case-insensitive name match during publish; unmatched terms are created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyTerm {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
}
