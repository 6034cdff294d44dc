use crate::types::{CallToAction, Reference, SeoMetadata, SocialLink};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a CMS collection listing (`{id, attributes: {...}}`).
#[derive(Debug, Clone, Deserialize)]
pub struct CmsEntry {
    pub id: i64,
    pub attributes: EntryAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntryAttributes {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub expertise: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// A file to be pushed to the CMS media library. Carries bytes rather than
/// a path so implementations stay free of filesystem concerns.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub name: Option<String>,
    pub alternative_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuthor {
    pub name: String,
    pub slug: String,
    pub email: String,
    pub bio: String,
    pub role: String,
    pub expertise: String,
    pub social_links: Vec<SocialLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTerm {
    pub name: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub content: String,
    pub author: i64,
    pub categories: Vec<i64>,
    pub tags: Vec<i64>,
    pub reading_time: u32,
    pub publish_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
    pub featured: bool,
    pub seo: SeoMetadata,
    pub cta: Vec<CallToAction>,
    pub references: Vec<Reference>,
    pub featured_image: i64,
}

#[async_trait]
pub trait CmsClient: Send + Sync {
    /// List all authors known to the CMS
    async fn list_authors(&self) -> Result<Vec<CmsEntry>>;

    /// List all categories known to the CMS
    async fn list_categories(&self) -> Result<Vec<CmsEntry>>;

    /// List all tags known to the CMS
    async fn list_tags(&self) -> Result<Vec<CmsEntry>>;

    /// Push a file into the media library
    async fn upload_image(&self, upload: &ImageUpload) -> Result<UploadedImage>;

    /// Create an author record, returning its id
    async fn create_author(&self, author: &NewAuthor) -> Result<i64>;

    /// Create a category, returning its id
    async fn create_category(&self, term: &NewTerm) -> Result<i64>;

    /// Create a tag, returning its id
    async fn create_tag(&self, term: &NewTerm) -> Result<i64>;

    /// Create the article itself, returning its id
    async fn create_article(&self, article: &NewArticle) -> Result<i64>;
}
