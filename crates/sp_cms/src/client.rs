use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sp_core::cms::{NewArticle, NewAuthor, NewTerm};
use sp_core::{CmsClient, CmsConfig, CmsEntry, Error, ImageUpload, Result, UploadedImage};
use std::fmt;

/// Strapi v4 REST client. Collection reads return `{data: [{id,
/// attributes}]}` envelopes, writes take `{data: {...}}` bodies and media
/// uploads answer with a bare JSON array.
pub struct StrapiClient {
    client: Client,
    config: CmsConfig,
}

impl fmt::Debug for StrapiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrapiClient")
            .field("api_url", &self.config.api_url)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct ListEnvelope {
    data: Option<Vec<CmsEntry>>,
}

#[derive(Deserialize)]
struct CreateEnvelope {
    data: CreatedEntity,
}

#[derive(Deserialize)]
struct CreatedEntity {
    id: i64,
}

impl StrapiClient {
    pub fn new(config: CmsConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.api_url.trim_end_matches('/'))
    }

    async fn list(&self, collection: &str) -> Result<Vec<CmsEntry>> {
        let response = self
            .client
            .get(self.url(collection))
            .query(&[("populate", "*")])
            .bearer_auth(&self.config.api_token)
            .send()
            .await?;
        let envelope: ListEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn create<T: Serialize + Sync>(&self, collection: &str, data: &T) -> Result<i64> {
        let response = self
            .client
            .post(self.url(collection))
            .bearer_auth(&self.config.api_token)
            .json(&json!({ "data": data }))
            .send()
            .await?;
        let envelope: CreateEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.data.id)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Cms {
            status: status.as_u16(),
            body,
        })
    }
}

fn guess_mime(filename: &str) -> &'static str {
    match filename.rsplit('.').next() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

#[async_trait]
impl CmsClient for StrapiClient {
    async fn list_authors(&self) -> Result<Vec<CmsEntry>> {
        self.list("authors").await
    }

    async fn list_categories(&self) -> Result<Vec<CmsEntry>> {
        self.list("categories").await
    }

    async fn list_tags(&self) -> Result<Vec<CmsEntry>> {
        self.list("tags").await
    }

    async fn upload_image(&self, upload: &ImageUpload) -> Result<UploadedImage> {
        tracing::info!("📤 Uploading image: {}", upload.filename);

        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.filename.clone())
            .mime_str(guess_mime(&upload.filename))?;
        let mut form = Form::new().part("files", part);

        if upload.name.is_some() || upload.alternative_text.is_some() {
            let file_info = json!({
                "name": upload.name,
                "alternativeText": upload.alternative_text,
            });
            form = form.text("fileInfo", file_info.to_string());
        }

        let response = self
            .client
            .post(self.url("upload"))
            .bearer_auth(&self.config.api_token)
            .multipart(form)
            .send()
            .await?;
        let mut uploaded: Vec<UploadedImage> = Self::check(response).await?.json().await?;
        if uploaded.is_empty() {
            return Err(Error::Cms {
                status: 200,
                body: "upload succeeded but returned no files".to_string(),
            });
        }
        let file = uploaded.remove(0);
        tracing::info!("✅ Uploaded image: {} (ID: {})", file.name, file.id);
        Ok(file)
    }

    async fn create_author(&self, author: &NewAuthor) -> Result<i64> {
        let id = self.create("authors", author).await?;
        tracing::info!("✅ Created author: {} (ID: {})", author.name, id);
        Ok(id)
    }

    async fn create_category(&self, term: &NewTerm) -> Result<i64> {
        let id = self.create("categories", term).await?;
        tracing::info!("✅ Created category: {} (ID: {})", term.name, id);
        Ok(id)
    }

    async fn create_tag(&self, term: &NewTerm) -> Result<i64> {
        let id = self.create("tags", term).await?;
        tracing::info!("✅ Created tag: {} (ID: {})", term.name, id);
        Ok(id)
    }

    async fn create_article(&self, article: &NewArticle) -> Result<i64> {
        let id = self.create("articles", article).await?;
        tracing::info!("✅ Created article: {} (ID: {})", article.title, id);
        Ok(id)
    }
}
