use chrono::{DateTime, Utc};
use serde_json::json;
use sp_core::cms::{NewArticle, NewAuthor, NewTerm};
use sp_core::{
    ArticleDocument, CmsClient, CmsEntry, Error, ImageRef, ImageUpload, PublishBundle, Result,
    SeoMetadata, SiteConfig,
};
use std::sync::Arc;

use crate::normalize::reading_time_minutes;

/// Compensation log of remote resources touched during a publish run.
/// Filled in step order and returned on success and failure alike: nothing
/// is rolled back, so after a mid-sequence failure these identifiers are
/// what remains in the CMS.
#[derive(Debug, Clone, Default)]
pub struct CreatedResources {
    pub featured_image_id: Option<i64>,
    pub profile_image_id: Option<i64>,
    /// Resolved author id; pre-existing when the bundle carried one,
    /// freshly created otherwise.
    pub author_id: Option<i64>,
    pub category_ids: Vec<i64>,
    pub tag_ids: Vec<i64>,
    pub final_slug: Option<String>,
}

/// Outcome of a publish run: the created article id on success, the
/// partial progress either way, and the terminal error on failure.
#[derive(Debug)]
pub struct PublishReport {
    pub article_id: Option<i64>,
    pub resources: CreatedResources,
    pub failure: Option<Error>,
}

impl PublishReport {
    pub fn is_success(&self) -> bool {
        self.article_id.is_some()
    }
}

/// Sequences the dependent CMS writes: featured image, author, taxonomy
/// terms, then the article itself. Each step feeds the next; the first
/// failure aborts the rest. No step is retried.
pub struct Publisher {
    cms: Arc<dyn CmsClient>,
    site: SiteConfig,
}

impl Publisher {
    pub fn new(cms: Arc<dyn CmsClient>, site: SiteConfig) -> Self {
        Self { cms, site }
    }

    /// Runs the full sequence. The bundle is not mutated; SEO rewrites
    /// happen on a working copy.
    pub async fn publish(
        &self,
        bundle: &PublishBundle,
        featured_image: Option<ImageUpload>,
        profile_image: Option<ImageUpload>,
    ) -> PublishReport {
        let mut resources = CreatedResources::default();
        match self
            .run(bundle, featured_image, profile_image, &mut resources)
            .await
        {
            Ok(article_id) => PublishReport {
                article_id: Some(article_id),
                resources,
                failure: None,
            },
            Err(e) => {
                tracing::error!("❌ Publish failed: {e}");
                PublishReport {
                    article_id: None,
                    resources,
                    failure: Some(e),
                }
            }
        }
    }

    async fn run(
        &self,
        bundle: &PublishBundle,
        featured_image: Option<ImageUpload>,
        profile_image: Option<ImageUpload>,
        resources: &mut CreatedResources,
    ) -> Result<i64> {
        let featured_image = featured_image.ok_or(Error::Publish {
            step: "featured-image",
            status: None,
            body: "no featured image supplied".to_string(),
        })?;
        let image = self
            .cms
            .upload_image(&featured_image)
            .await
            .map_err(|e| e.at_step("featured-image"))?;
        resources.featured_image_id = Some(image.id);

        let now = Utc::now();
        let timestamp = now.timestamp();
        let final_slug = finalize_slug(&bundle.article.slug, timestamp);
        resources.final_slug = Some(final_slug.clone());
        tracing::info!("🔗 Finalized slug: {final_slug}");

        let author_id = self
            .resolve_author(bundle, profile_image, timestamp, resources)
            .await?;
        resources.author_id = Some(author_id);

        let existing = self
            .cms
            .list_categories()
            .await
            .map_err(|e| e.at_step("categories"))?;
        for term in &bundle.categories {
            let id = match find_term(&existing, &term.name) {
                Some(id) => {
                    tracing::info!("✅ Using existing category: {} (ID: {id})", term.name);
                    id
                }
                None => self
                    .cms
                    .create_category(&new_term(term, timestamp))
                    .await
                    .map_err(|e| e.at_step("categories"))?,
            };
            resources.category_ids.push(id);
        }

        let existing = self.cms.list_tags().await.map_err(|e| e.at_step("tags"))?;
        for term in &bundle.tags {
            let id = match find_term(&existing, &term.name) {
                Some(id) => {
                    tracing::info!("✅ Using existing tag: {} (ID: {id})", term.name);
                    id
                }
                None => self
                    .cms
                    .create_tag(&new_term(term, timestamp))
                    .await
                    .map_err(|e| e.at_step("tags"))?,
            };
            resources.tag_ids.push(id);
        }

        let mut seo = bundle.seo.clone();
        finalize_seo(&mut seo, &bundle.article, &final_slug, image.id, now, &self.site);

        let article = NewArticle {
            title: bundle.article.title.clone(),
            slug: final_slug,
            summary: bundle.article.summary.clone(),
            content: bundle.article.content.clone(),
            author: author_id,
            categories: resources.category_ids.clone(),
            tags: resources.tag_ids.clone(),
            reading_time: bundle
                .article
                .reading_time
                .filter(|t| *t > 0)
                .unwrap_or_else(|| reading_time_minutes(&bundle.article.content)),
            publish_date: now,
            update_date: now,
            featured: true,
            seo,
            cta: bundle.article.ctas.clone(),
            references: bundle.article.references.clone(),
            featured_image: image.id,
        };

        self.cms
            .create_article(&article)
            .await
            .map_err(|e| e.at_step("article"))
    }

    /// Reuses the authoritative author's id when it has one; otherwise a
    /// profile image is mandatory before the author record can be created.
    async fn resolve_author(
        &self,
        bundle: &PublishBundle,
        profile_image: Option<ImageUpload>,
        timestamp: i64,
        resources: &mut CreatedResources,
    ) -> Result<i64> {
        let author = &bundle.author;
        if let Some(id) = author.id {
            tracing::info!("✅ Using existing author: {} (ID: {id})", author.name);
            return Ok(id);
        }

        let profile_image = profile_image.ok_or(Error::Publish {
            step: "author",
            status: None,
            body: format!(
                "author '{}' has no CMS id and no profile image was supplied",
                author.name
            ),
        })?;
        let uploaded = self
            .cms
            .upload_image(&profile_image)
            .await
            .map_err(|e| e.at_step("author"))?;
        resources.profile_image_id = Some(uploaded.id);

        let slug = if author.slug.trim().is_empty() {
            slugify(&author.name)
        } else {
            author.slug.clone()
        };
        self.cms
            .create_author(&NewAuthor {
                name: author.name.clone(),
                slug: finalize_slug(&slug, timestamp),
                email: author.email.clone(),
                bio: author.bio.clone(),
                role: author.role.clone(),
                expertise: author.expertise.clone(),
                social_links: author.social_links.clone(),
                profile_picture: Some(uploaded.id),
            })
            .await
            .map_err(|e| e.at_step("author"))
    }
}

/// Appends a wall-clock-seconds token to avoid colliding with previously
/// published content sharing the same human-chosen slug. This is a
/// collision-avoidance heuristic, not a uniqueness guarantee: two publishes
/// within the same second can still collide.
pub fn finalize_slug(slug: &str, timestamp: i64) -> String {
    format!("{slug}-{timestamp}")
}

fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

fn find_term(existing: &[CmsEntry], name: &str) -> Option<i64> {
    existing
        .iter()
        .find(|e| e.attributes.name.eq_ignore_ascii_case(name))
        .map(|e| e.id)
}

fn new_term(term: &sp_core::TaxonomyTerm, timestamp: i64) -> NewTerm {
    let slug = if term.slug.trim().is_empty() {
        slugify(&term.name)
    } else {
        term.slug.clone()
    };
    NewTerm {
        name: term.name.clone(),
        slug: finalize_slug(&slug, timestamp),
        description: term.description.clone(),
    }
}

/// Publish-time SEO rewrites: timestamps and headline to the final values,
/// the canonical page identifier to the finalized slug, and every social
/// preview image to the uploaded media id.
fn finalize_seo(
    seo: &mut SeoMetadata,
    article: &ArticleDocument,
    final_slug: &str,
    image_id: i64,
    now: DateTime<Utc>,
    site: &SiteConfig,
) {
    if let Some(data) = seo.structured_data.as_mut() {
        let stamp = now.to_rfc3339();
        data["datePublished"] = json!(stamp);
        data["dateModified"] = json!(stamp);
        data["headline"] = json!(article.title);
        data["description"] = json!(article.summary);
        data["mainEntityOfPage"] = json!({
            "@type": "WebPage",
            "@id": site.page_url(final_slug),
        });
    }

    for preview in &mut seo.meta_social {
        preview.image = Some(ImageRef::Id(image_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sp_core::{AuthorProfile, SocialPreview, TaxonomyTerm, UploadedImage};
    use std::sync::Mutex;

    /// In-memory CMS double. Pre-seeded listings, monotonically assigned
    /// ids, optional failure injection per step.
    #[derive(Default)]
    struct FakeCms {
        categories: Vec<CmsEntry>,
        tags: Vec<CmsEntry>,
        fail_article: bool,
        fail_upload: bool,
        state: Mutex<FakeState>,
    }

    #[derive(Default)]
    struct FakeState {
        next_id: i64,
        created_categories: Vec<String>,
        created_tags: Vec<String>,
        created_authors: Vec<NewAuthor>,
        created_articles: Vec<NewArticle>,
        uploads: Vec<String>,
    }

    fn entry(id: i64, name: &str) -> CmsEntry {
        serde_json::from_value(json!({
            "id": id,
            "attributes": {"name": name, "slug": name.to_lowercase()}
        }))
        .unwrap()
    }

    impl FakeCms {
        fn next_id(&self) -> i64 {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            state.next_id + 100
        }
    }

    #[async_trait]
    impl CmsClient for FakeCms {
        async fn list_authors(&self) -> Result<Vec<CmsEntry>> {
            Ok(vec![])
        }

        async fn list_categories(&self) -> Result<Vec<CmsEntry>> {
            Ok(self.categories.clone())
        }

        async fn list_tags(&self) -> Result<Vec<CmsEntry>> {
            Ok(self.tags.clone())
        }

        async fn upload_image(&self, upload: &ImageUpload) -> Result<UploadedImage> {
            if self.fail_upload {
                return Err(Error::Cms {
                    status: 500,
                    body: "upload rejected".to_string(),
                });
            }
            let id = self.next_id();
            self.state
                .lock()
                .unwrap()
                .uploads
                .push(upload.filename.clone());
            Ok(UploadedImage {
                id,
                name: upload.filename.clone(),
            })
        }

        async fn create_author(&self, author: &NewAuthor) -> Result<i64> {
            let id = self.next_id();
            self.state
                .lock()
                .unwrap()
                .created_authors
                .push(author.clone());
            Ok(id)
        }

        async fn create_category(&self, term: &NewTerm) -> Result<i64> {
            let id = self.next_id();
            self.state
                .lock()
                .unwrap()
                .created_categories
                .push(term.name.clone());
            Ok(id)
        }

        async fn create_tag(&self, term: &NewTerm) -> Result<i64> {
            let id = self.next_id();
            self.state.lock().unwrap().created_tags.push(term.name.clone());
            Ok(id)
        }

        async fn create_article(&self, article: &NewArticle) -> Result<i64> {
            if self.fail_article {
                return Err(Error::Cms {
                    status: 400,
                    body: "ValidationError: slug must be unique".to_string(),
                });
            }
            let id = self.next_id();
            self.state
                .lock()
                .unwrap()
                .created_articles
                .push(article.clone());
            Ok(id)
        }
    }

    fn bundle() -> PublishBundle {
        PublishBundle {
            article: ArticleDocument {
                title: "A Guide to Testing".to_string(),
                slug: "a-guide-to-testing".to_string(),
                summary: "Everything about testing.".to_string(),
                content: "## Intro\n\nTesting matters.".to_string(),
                reading_time: Some(3),
                ctas: vec![],
                references: vec![],
            },
            seo: SeoMetadata {
                meta_title: "A Guide to Testing".to_string(),
                meta_description: "Everything about testing, in one place.".to_string(),
                keywords: "testing".to_string(),
                meta_robots: Some("index, follow".to_string()),
                canonical_url: None,
                prevent_indexing: false,
                structured_data: Some(json!({
                    "@type": "Article",
                    "headline": "draft",
                    "author": {"@type": "Person", "name": "Jane Doe"}
                })),
                meta_social: vec![SocialPreview {
                    social_network: "Facebook".to_string(),
                    title: "FB".to_string(),
                    description: "d".to_string(),
                    image: Some(ImageRef::Placeholder("placeholder".to_string())),
                }],
            },
            author: AuthorProfile {
                id: Some(7),
                name: "Jane Doe".to_string(),
                slug: "jane-doe".to_string(),
                email: "jane@example.com".to_string(),
                bio: "Bio".to_string(),
                role: "Writer".to_string(),
                expertise: "Testing".to_string(),
                social_links: vec![],
            },
            categories: vec![TaxonomyTerm {
                name: "testing".to_string(),
                slug: "testing".to_string(),
                description: "d".to_string(),
            }],
            tags: vec![
                TaxonomyTerm {
                    name: "Automation".to_string(),
                    slug: "automation".to_string(),
                    description: "d".to_string(),
                },
                TaxonomyTerm {
                    name: "QA".to_string(),
                    slug: "qa".to_string(),
                    description: "d".to_string(),
                },
            ],
        }
    }

    fn image(name: &str) -> ImageUpload {
        ImageUpload {
            filename: name.to_string(),
            bytes: vec![0u8; 8],
            name: None,
            alternative_text: None,
        }
    }

    fn publisher(cms: FakeCms) -> (Publisher, Arc<FakeCms>) {
        let cms = Arc::new(cms);
        let publisher = Publisher::new(
            cms.clone(),
            SiteConfig {
                canonical_base: "https://example.com/blog".to_string(),
            },
        );
        (publisher, cms)
    }

    #[tokio::test]
    async fn test_missing_featured_image_fails_before_any_write() {
        let (publisher, cms) = publisher(FakeCms::default());
        let report = publisher.publish(&bundle(), None, None).await;
        assert!(!report.is_success());
        assert!(report.resources.featured_image_id.is_none());
        assert!(cms.state.lock().unwrap().uploads.is_empty());
        match report.failure {
            Some(Error::Publish { step, .. }) => assert_eq!(step, "featured-image"),
            other => panic!("expected publish error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_successful_publish_reports_all_ids() {
        let cms = FakeCms {
            categories: vec![entry(3, "Testing")],
            ..FakeCms::default()
        };
        let (publisher, cms) = publisher(cms);
        let report = publisher.publish(&bundle(), Some(image("cover.png")), None).await;
        assert!(report.is_success());
        assert_eq!(report.resources.author_id, Some(7));
        // "testing" matches the existing "Testing" case-insensitively.
        assert_eq!(report.resources.category_ids, vec![3]);
        assert_eq!(report.resources.tag_ids.len(), 2);
        assert!(cms.state.lock().unwrap().created_categories.is_empty());
        assert_eq!(
            cms.state.lock().unwrap().created_tags,
            vec!["Automation".to_string(), "QA".to_string()]
        );
    }

    #[tokio::test]
    async fn test_taxonomy_reuse_and_creation() {
        let cms = FakeCms {
            tags: vec![entry(9, "automation")],
            ..FakeCms::default()
        };
        let (publisher, cms) = publisher(cms);
        let report = publisher.publish(&bundle(), Some(image("cover.png")), None).await;
        assert!(report.is_success());
        // Existing "automation" reused for "Automation"; only "QA" created.
        assert_eq!(report.resources.tag_ids[0], 9);
        assert_eq!(cms.state.lock().unwrap().created_tags, vec!["QA".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_article_write_keeps_partial_progress() {
        let cms = FakeCms {
            fail_article: true,
            ..FakeCms::default()
        };
        let (publisher, _) = publisher(cms);
        let report = publisher.publish(&bundle(), Some(image("cover.png")), None).await;
        assert!(!report.is_success());
        assert!(report.resources.featured_image_id.is_some());
        assert_eq!(report.resources.author_id, Some(7));
        assert_eq!(report.resources.category_ids.len(), 1);
        assert_eq!(report.resources.tag_ids.len(), 2);
        match report.failure {
            Some(Error::Publish { step, status, body }) => {
                assert_eq!(step, "article");
                assert_eq!(status, Some(400));
                assert!(body.contains("ValidationError"));
            }
            other => panic!("expected publish error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_new_author_requires_profile_image() {
        let (publisher, _) = publisher(FakeCms::default());
        let mut bundle = bundle();
        bundle.author.id = None;
        let report = publisher.publish(&bundle, Some(image("cover.png")), None).await;
        assert!(!report.is_success());
        match report.failure {
            Some(Error::Publish { step, body, .. }) => {
                assert_eq!(step, "author");
                assert!(body.contains("Jane Doe"));
            }
            other => panic!("expected publish error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_new_author_is_created_with_profile_picture() {
        let (publisher, cms) = publisher(FakeCms::default());
        let mut bundle = bundle();
        bundle.author.id = None;
        let report = publisher
            .publish(&bundle, Some(image("cover.png")), Some(image("profile.png")))
            .await;
        assert!(report.is_success());
        assert!(report.resources.profile_image_id.is_some());
        let state = cms.state.lock().unwrap();
        assert_eq!(state.created_authors.len(), 1);
        let created = &state.created_authors[0];
        assert_eq!(created.name, "Jane Doe");
        assert!(created.slug.starts_with("jane-doe-"));
        assert_eq!(created.profile_picture, report.resources.profile_image_id);
    }

    #[tokio::test]
    async fn test_article_payload_carries_finalized_seo() {
        let (publisher, cms) = publisher(FakeCms::default());
        let report = publisher.publish(&bundle(), Some(image("cover.png")), None).await;
        assert!(report.is_success());
        let state = cms.state.lock().unwrap();
        let article = &state.created_articles[0];
        let final_slug = report.resources.final_slug.clone().unwrap();
        assert!(final_slug.starts_with("a-guide-to-testing-"));
        assert_eq!(article.slug, final_slug);

        let data = article.seo.structured_data.as_ref().unwrap();
        assert_eq!(data["headline"], "A Guide to Testing");
        assert_eq!(
            data["mainEntityOfPage"]["@id"],
            format!("https://example.com/blog/{final_slug}")
        );
        assert_eq!(data["datePublished"], data["dateModified"]);

        let image_id = report.resources.featured_image_id.unwrap();
        assert_eq!(article.featured_image, image_id);
        for preview in &article.seo.meta_social {
            assert_eq!(preview.image, Some(ImageRef::Id(image_id)));
        }
        assert_eq!(article.reading_time, 3);
        assert!(article.featured);
    }

    #[tokio::test]
    async fn test_upload_failure_carries_remote_status() {
        let cms = FakeCms {
            fail_upload: true,
            ..FakeCms::default()
        };
        let (publisher, _) = publisher(cms);
        let report = publisher.publish(&bundle(), Some(image("cover.png")), None).await;
        match report.failure {
            Some(Error::Publish { step, status, .. }) => {
                assert_eq!(step, "featured-image");
                assert_eq!(status, Some(500));
            }
            other => panic!("expected publish error, got {other:?}"),
        }
    }

    #[test]
    fn test_finalize_slug_appends_timestamp() {
        assert_eq!(finalize_slug("my-article", 1700000000), "my-article-1700000000");
    }

    #[test]
    fn test_caller_bundle_is_not_mutated() {
        // finalize_seo works on a clone; quick sanity check on the helper.
        let b = bundle();
        let mut seo = b.seo.clone();
        finalize_seo(
            &mut seo,
            &b.article,
            "final-slug",
            42,
            Utc::now(),
            &SiteConfig {
                canonical_base: "https://example.com/blog".to_string(),
            },
        );
        assert_eq!(
            b.seo.meta_social[0].image,
            Some(ImageRef::Placeholder("placeholder".to_string()))
        );
        assert_eq!(seo.meta_social[0].image, Some(ImageRef::Id(42)));
    }
}
