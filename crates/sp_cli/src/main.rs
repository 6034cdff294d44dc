use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use clap::Parser;
use sp_cms::StrapiClient;
use sp_core::{
    AuthorProfile, CmsClient, CmsConfig, CtaOverride, GenerationConfig, ImageUpload,
    PublishBundle, SiteConfig,
};
use sp_llm::prompt::{build_user_prompt, SEO_SYSTEM_PROMPT};
use sp_llm::{create_model, decode_document, extract_json};
use sp_pipeline::{normalize, NormalizeContext, Publisher, Repair};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate an SEO article bundle and publish it to the CMS", long_about = None)]
struct Cli {
    /// Topic to write about
    #[arg(long, conflicts_with = "topic_file")]
    topic: Option<String>,

    /// Read the topic from a file instead
    #[arg(long)]
    topic_file: Option<PathBuf>,

    /// Generation backend (azure | dummy)
    #[arg(long, default_value = "azure")]
    model: String,

    /// Reuse an existing CMS author by id
    #[arg(long, conflicts_with = "author_name")]
    author_id: Option<i64>,

    /// Name for a new author (required unless --author-id is given)
    #[arg(long)]
    author_name: Option<String>,

    #[arg(long, default_value = "Content Writer")]
    author_role: String,

    #[arg(long)]
    author_expertise: Option<String>,

    #[arg(long)]
    author_email: Option<String>,

    #[arg(long)]
    author_bio: Option<String>,

    /// Featured image file (required for publishing)
    #[arg(long)]
    image: Option<PathBuf>,

    /// Profile picture, required when creating a new author
    #[arg(long)]
    profile_image: Option<PathBuf>,

    /// Call-to-action text; overrides whatever the model generates
    #[arg(long, requires = "cta_url")]
    cta_text: Option<String>,

    #[arg(long, requires = "cta_text")]
    cta_url: Option<String>,

    /// Reference URL to include (repeatable)
    #[arg(long = "reference")]
    references: Vec<String>,

    /// Public base URL articles are served under
    #[arg(long, default_value = "https://example.com/blog")]
    canonical_base: String,

    /// Generate, normalize and preview without touching the CMS
    #[arg(long)]
    dry_run: bool,

    /// Write the normalized bundle JSON to this file
    #[arg(long)]
    save: Option<PathBuf>,
}

fn env_var(name: &str) -> anyhow::Result<String> {
    std::env::var(name).map_err(|_| anyhow!("environment variable {name} is not set"))
}

fn cms_config() -> anyhow::Result<CmsConfig> {
    Ok(CmsConfig {
        api_url: env_var("CMS_API_URL")?,
        api_token: env_var("CMS_API_TOKEN")?,
    })
}

fn generation_config(model: &str) -> anyhow::Result<GenerationConfig> {
    if model == "dummy" {
        return Ok(GenerationConfig::default());
    }
    let defaults = GenerationConfig::default();
    Ok(GenerationConfig {
        endpoint: env_var("AZURE_OPENAI_ENDPOINT")?,
        api_key: Some(env_var("AZURE_OPENAI_API_KEY")?),
        deployment: std::env::var("AZURE_OPENAI_DEPLOYMENT").unwrap_or(defaults.deployment),
        api_version: std::env::var("AZURE_OPENAI_API_VERSION").unwrap_or(defaults.api_version),
    })
}

fn read_topic(cli: &Cli) -> anyhow::Result<String> {
    let topic = match (&cli.topic, &cli.topic_file) {
        (Some(topic), _) => topic.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read topic file {}", path.display()))?,
        (None, None) => bail!("either --topic or --topic-file is required"),
    };
    let topic = topic.trim().to_string();
    if topic.is_empty() {
        bail!("the topic is empty");
    }
    Ok(topic)
}

/// Builds the authoritative author profile: either fetched from the CMS by
/// id or assembled from the flags describing a new author.
async fn resolve_author(
    cli: &Cli,
    topic: &str,
    cms: Option<&StrapiClient>,
) -> anyhow::Result<AuthorProfile> {
    if let Some(id) = cli.author_id {
        let cms = cms.ok_or_else(|| anyhow!("--author-id requires CMS configuration"))?;
        let authors = cms.list_authors().await?;
        let entry = authors
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| anyhow!("no CMS author with id {id}"))?;
        let attrs = entry.attributes;
        let default_email = format!(
            "{}@example.com",
            attrs.name.to_lowercase().replace(' ', ".")
        );
        return Ok(AuthorProfile {
            id: Some(entry.id),
            slug: attrs
                .slug
                .unwrap_or_else(|| attrs.name.to_lowercase().replace(' ', "-")),
            email: attrs.email.unwrap_or(default_email),
            bio: attrs.bio.unwrap_or_else(|| format!("Expert in {topic}")),
            role: attrs.role.unwrap_or_else(|| "Content Writer".to_string()),
            expertise: attrs.expertise.unwrap_or_else(|| topic.to_string()),
            name: attrs.name,
            social_links: vec![],
        });
    }

    let name = cli
        .author_name
        .clone()
        .ok_or_else(|| anyhow!("either --author-id or --author-name is required"))?;
    let expertise = cli.author_expertise.clone().unwrap_or_else(|| topic.to_string());
    Ok(AuthorProfile {
        id: None,
        slug: name.to_lowercase().replace(' ', "-"),
        email: cli.author_email.clone().unwrap_or_else(|| {
            format!("{}@example.com", name.to_lowercase().replace(' ', "."))
        }),
        bio: cli.author_bio.clone().unwrap_or_else(|| {
            format!("Expert in {expertise} with years of experience writing about {topic}.")
        }),
        role: cli.author_role.clone(),
        expertise,
        name,
        social_links: vec![],
    })
}

fn load_image(path: &Path, name: String, alt: String) -> anyhow::Result<ImageUpload> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read image {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.png".to_string());
    Ok(ImageUpload {
        filename,
        bytes,
        name: Some(name),
        alternative_text: Some(alt),
    })
}

fn print_preview(bundle: &PublishBundle, repairs: &[Repair]) {
    let article = &bundle.article;
    let seo = &bundle.seo;

    println!("\n{}", "=".repeat(72));
    println!("📝 GENERATED CONTENT PREVIEW");
    println!("{}\n", "=".repeat(72));

    println!("📌 TITLE: {}", article.title);
    println!("🔗 SLUG: {}", article.slug);
    if let Some(minutes) = article.reading_time {
        println!("⏱️ READING TIME: {minutes} minutes");
    }
    println!("\n📋 SUMMARY:\n{}\n", article.summary);

    println!("🔍 SEO METADATA:");
    println!("  Title: {}", seo.meta_title);
    println!("  Description: {}", seo.meta_description);
    println!("  Keywords: {}", seo.keywords);

    println!("\n📱 SOCIAL MEDIA METADATA:");
    for preview in &seo.meta_social {
        println!("  {}: {}", preview.social_network, preview.title);
    }

    println!("\n👤 AUTHOR: {} ({})", bundle.author.name, bundle.author.role);

    println!("\n🏷️ CATEGORIES:");
    for category in &bundle.categories {
        println!("  - {}", category.name);
    }
    println!("\n🔖 TAGS:");
    for tag in &bundle.tags {
        println!("  - {}", tag.name);
    }

    if !article.ctas.is_empty() {
        println!("\n📣 CTAS:");
        for cta in &article.ctas {
            println!("  {} → {}", cta.text, cta.url);
        }
    }

    println!("\n📄 CONTENT PREVIEW:");
    let excerpt: String = article.content.chars().take(500).collect();
    println!("{excerpt}");
    if article.content.chars().count() > 500 {
        println!("...");
    }

    if !repairs.is_empty() {
        println!("\n🔧 REPAIRS APPLIED:");
        for repair in repairs {
            println!("  ⚠️ {repair}");
        }
    }
    println!("\n{}", "=".repeat(72));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let topic = read_topic(&cli)?;
    info!("📖 Topic: {topic}");

    // The CMS is only needed for author lookup and publishing; a dry run
    // with a locally described author never connects.
    let needs_cms = !cli.dry_run || cli.author_id.is_some();
    let cms = if needs_cms {
        Some(StrapiClient::new(cms_config()?))
    } else {
        None
    };

    let author = resolve_author(&cli, &topic, cms.as_ref()).await?;
    info!("👤 Using author: {}", author.name);

    let cta = cli
        .cta_text
        .as_ref()
        .zip(cli.cta_url.as_ref())
        .map(|(text, url)| CtaOverride {
            text: text.clone(),
            url: url.clone(),
        });

    let model = create_model(&cli.model, &generation_config(&cli.model)?)?;
    info!("🧠 Generating SEO-optimized content with {}...", model.name());
    let user_prompt = build_user_prompt(
        &topic,
        &author,
        &cli.references,
        cta.as_ref(),
        &cli.canonical_base,
    );
    let raw = model.generate(SEO_SYSTEM_PROMPT, &user_prompt).await?;

    let candidate = extract_json(&raw)?;
    let document = decode_document(&candidate)?;
    let (bundle, repairs) = normalize(
        document,
        &NormalizeContext {
            author: &author,
            cta: cta.as_ref(),
            canonical_base: &cli.canonical_base,
            now: Utc::now(),
        },
    )?;

    print_preview(&bundle, &repairs);

    if let Some(path) = &cli.save {
        std::fs::write(path, serde_json::to_string_pretty(&bundle)?)
            .with_context(|| format!("failed to write bundle to {}", path.display()))?;
        println!("✅ Bundle saved to {}", path.display());
    }

    if cli.dry_run {
        println!("✋ Dry run: skipping publish.");
        return Ok(());
    }

    let featured = cli
        .image
        .as_deref()
        .map(|path| {
            load_image(
                path,
                format!("{}_featured", bundle.article.slug),
                format!("Featured image for article: {}", bundle.article.title),
            )
        })
        .transpose()?;
    let profile = cli
        .profile_image
        .as_deref()
        .map(|path| {
            load_image(
                path,
                format!("{}_profile", bundle.author.name),
                format!(
                    "Profile picture of {}, {}",
                    bundle.author.name, bundle.author.role
                ),
            )
        })
        .transpose()?;

    let cms = cms.ok_or_else(|| anyhow!("CMS configuration is required for publishing"))?;
    let publisher = Publisher::new(
        Arc::new(cms),
        SiteConfig {
            canonical_base: cli.canonical_base.clone(),
        },
    );

    println!("\n🚀 Publishing to CMS...");
    let report = publisher.publish(&bundle, featured, profile).await;

    let resources = &report.resources;
    if let Some(slug) = &resources.final_slug {
        println!("🔗 Final slug: {slug}");
    }
    if let Some(id) = resources.featured_image_id {
        println!("✅ Featured image: ID {id}");
    }
    if let Some(id) = resources.author_id {
        println!("✅ Author: ID {id}");
    }
    if !resources.category_ids.is_empty() {
        println!("✅ Categories: {:?}", resources.category_ids);
    }
    if !resources.tag_ids.is_empty() {
        println!("✅ Tags: {:?}", resources.tag_ids);
    }

    if let Some(id) = report.article_id {
        println!("\n🎉 Article published! (ID: {id})");
        return Ok(());
    }

    eprintln!("\n❌ Publish failed.");
    eprintln!("The resources listed above were already created and were not rolled back.");
    match report.failure {
        Some(error) => Err(error.into()),
        None => Err(anyhow!("publish failed without a reported error")),
    }
}
