use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sp_core::{
    ArticleDocument, AuthorProfile, CallToAction, CtaOverride, Error, ImageRef, PublishBundle,
    Result, SeoMetadata, SocialPreview, TaxonomyTerm,
};
use std::fmt;

/// Stands in for the featured-image media id until publish time.
pub const PLACEHOLDER_IMAGE: &str = "placeholder-will-be-replaced-with-featured-image";

const META_TITLE_MAX: usize = 60;
const META_DESCRIPTION_MAX: usize = 160;
const SLUG_MAX: usize = 75;
const ELLIPSIS: &str = "...";
const WORDS_PER_MINUTE: u32 = 200;

/// Fields the generation step must supply; there is no synthesis rule for
/// them, so their absence is a contract violation rather than a repair.
const REQUIRED_FIELDS: [(&str, &str); 5] = [
    ("article", "title"),
    ("article", "slug"),
    ("article", "content"),
    ("seo", "metaTitle"),
    ("seo", "metaDescription"),
];

/// Inputs the repair rules need beyond the document itself. The core holds
/// no ambient state; everything arrives through here.
#[derive(Debug, Clone)]
pub struct NormalizeContext<'a> {
    /// Ground-truth author; the generation step may hallucinate identity.
    pub author: &'a AuthorProfile,
    /// Caller-supplied CTA that overrides whatever the model produced.
    pub cta: Option<&'a CtaOverride>,
    /// Public base URL for canonical page identifiers.
    pub canonical_base: &'a str,
    pub now: DateTime<Utc>,
}

/// One applied repair. Normalization reports these instead of failing:
/// every rule is independent and idempotent, and a repairable gap is never
/// an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Repair {
    AuthorReplaced { generated: Option<String> },
    MetaTitleTruncated { original_len: usize },
    MetaDescriptionTruncated { original_len: usize },
    SlugTruncated { original_len: usize },
    SocialPreviewsSynthesized,
    SocialImagePlaceholderInjected { network: String },
    StructuredDataSynthesized,
    StructuredDataAuthorRewritten { generated: Option<String> },
    ReadingTimeDerived { minutes: u32 },
    CtaOverridden,
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repair::AuthorReplaced { generated } => write!(
                f,
                "replaced generated author {:?} with the authoritative profile",
                generated.as_deref().unwrap_or("<absent>")
            ),
            Repair::MetaTitleTruncated { original_len } => write!(
                f,
                "meta title truncated from {original_len} to {META_TITLE_MAX} characters"
            ),
            Repair::MetaDescriptionTruncated { original_len } => write!(
                f,
                "meta description truncated from {original_len} to {META_DESCRIPTION_MAX} characters"
            ),
            Repair::SlugTruncated { original_len } => write!(
                f,
                "slug truncated from {original_len} to {SLUG_MAX} characters"
            ),
            Repair::SocialPreviewsSynthesized => {
                write!(f, "synthesized missing social preview entries")
            }
            Repair::SocialImagePlaceholderInjected { network } => {
                write!(f, "injected placeholder image for {network} social preview")
            }
            Repair::StructuredDataSynthesized => write!(f, "synthesized missing structured data"),
            Repair::StructuredDataAuthorRewritten { generated } => write!(
                f,
                "rewrote structured-data author {:?} to the authoritative name",
                generated.as_deref().unwrap_or("<absent>")
            ),
            Repair::ReadingTimeDerived { minutes } => {
                write!(f, "derived reading time of {minutes} minutes from word count")
            }
            Repair::CtaOverridden => write!(f, "replaced generated CTAs with the caller's CTA"),
        }
    }
}

/// Repairs a decoded document into a contract-complete [`PublishBundle`].
///
/// The input document is consumed; the caller's authoritative profile is
/// never mutated. Rules run in a fixed order and each reports what it
/// changed. Fails only when a structurally required field is absent.
pub fn normalize(
    document: Value,
    ctx: &NormalizeContext<'_>,
) -> Result<(PublishBundle, Vec<Repair>)> {
    check_required(&document)?;

    let mut article: ArticleDocument = serde_json::from_value(document["article"].clone())?;
    let mut seo: SeoMetadata = serde_json::from_value(document["seo"].clone())?;
    let categories: Vec<TaxonomyTerm> = parse_terms(document.get("categories"));
    let tags: Vec<TaxonomyTerm> = parse_terms(document.get("tags"));

    let mut repairs = Vec::new();

    let (author, repair) = reconcile_author(document.get("author"), ctx.author);
    repairs.extend(repair);

    repairs.extend(enforce_field_lengths(&mut article, &mut seo));
    repairs.extend(complete_social_previews(&mut seo, &article));
    repairs.extend(complete_structured_data(&mut seo, &article, ctx));
    repairs.extend(derive_reading_time(&mut article));
    repairs.extend(apply_cta_override(&mut article, ctx.cta));

    for repair in &repairs {
        tracing::warn!("⚠️ {repair}");
    }

    Ok((
        PublishBundle {
            article,
            seo,
            author,
            categories,
            tags,
        },
        repairs,
    ))
}

fn check_required(document: &Value) -> Result<()> {
    for (section, field) in REQUIRED_FIELDS {
        let present = document
            .get(section)
            .and_then(|s| s.get(field))
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty());
        if !present {
            return Err(Error::Contract(format!(
                "required field '{section}.{field}' is missing"
            )));
        }
    }
    Ok(())
}

fn parse_terms(raw: Option<&Value>) -> Vec<TaxonomyTerm> {
    raw.cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

/// Rule 1: the authoritative profile is ground truth. A document author
/// whose name differs (or is absent, or does not parse) is replaced
/// wholesale. A matching author is kept, but the generated document never
/// carries a CMS id, so the authoritative one is grafted on either way.
fn reconcile_author(
    raw: Option<&Value>,
    authoritative: &AuthorProfile,
) -> (AuthorProfile, Option<Repair>) {
    let generated_name = raw
        .and_then(|v| v.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);

    if generated_name.as_deref() == Some(authoritative.name.as_str()) {
        if let Some(profile) = raw.and_then(|v| serde_json::from_value::<AuthorProfile>(v.clone()).ok())
        {
            return (
                AuthorProfile {
                    id: authoritative.id,
                    ..profile
                },
                None,
            );
        }
    }

    (
        authoritative.clone(),
        Some(Repair::AuthorReplaced {
            generated: generated_name,
        }),
    )
}

/// Rule 2: hard limits the CMS and search results enforce visually.
fn enforce_field_lengths(article: &mut ArticleDocument, seo: &mut SeoMetadata) -> Vec<Repair> {
    let mut repairs = Vec::new();

    if let Some(original_len) = truncate(&mut seo.meta_title, META_TITLE_MAX) {
        repairs.push(Repair::MetaTitleTruncated { original_len });
    }
    if let Some(original_len) = truncate(&mut seo.meta_description, META_DESCRIPTION_MAX) {
        repairs.push(Repair::MetaDescriptionTruncated { original_len });
    }
    if let Some(original_len) = truncate(&mut article.slug, SLUG_MAX) {
        repairs.push(Repair::SlugTruncated { original_len });
    }

    repairs
}

/// Truncates to `max` characters (ellipsis included) when over the limit,
/// returning the original character count.
fn truncate(field: &mut String, max: usize) -> Option<usize> {
    let original_len = field.chars().count();
    if original_len <= max {
        return None;
    }
    let mut truncated: String = field.chars().take(max - ELLIPSIS.len()).collect();
    truncated.push_str(ELLIPSIS);
    *field = truncated;
    Some(original_len)
}

/// Rule 3: one preview per supported network, images filled with the
/// placeholder until the featured image is uploaded.
fn complete_social_previews(seo: &mut SeoMetadata, article: &ArticleDocument) -> Vec<Repair> {
    if seo.meta_social.is_empty() {
        let title = non_empty_or(&seo.meta_title, &article.title);
        let description = non_empty_or(&seo.meta_description, &article.summary);
        seo.meta_social = ["Facebook", "Twitter"]
            .into_iter()
            .map(|network| SocialPreview {
                social_network: network.to_string(),
                title: title.clone(),
                description: description.clone(),
                image: Some(ImageRef::Placeholder(PLACEHOLDER_IMAGE.to_string())),
            })
            .collect();
        return vec![Repair::SocialPreviewsSynthesized];
    }

    let mut repairs = Vec::new();
    for preview in &mut seo.meta_social {
        if preview.image.is_none() {
            preview.image = Some(ImageRef::Placeholder(PLACEHOLDER_IMAGE.to_string()));
            repairs.push(Repair::SocialImagePlaceholderInjected {
                network: preview.social_network.clone(),
            });
        }
    }
    repairs
}

fn non_empty_or(preferred: &str, fallback: &str) -> String {
    if preferred.trim().is_empty() {
        fallback.to_string()
    } else {
        preferred.to_string()
    }
}

/// Rule 4: a minimal schema.org Article when the model produced none; when
/// it produced one, its embedded author must match the authoritative
/// profile for the same reason as rule 1.
fn complete_structured_data(
    seo: &mut SeoMetadata,
    article: &ArticleDocument,
    ctx: &NormalizeContext<'_>,
) -> Option<Repair> {
    let Some(data) = seo.structured_data.as_mut() else {
        let now = ctx.now.to_rfc3339();
        seo.structured_data = Some(json!({
            "@context": "https://schema.org",
            "@type": "Article",
            "headline": article.title,
            "description": article.summary,
            "datePublished": now,
            "dateModified": now,
            "author": {
                "@type": "Person",
                "name": ctx.author.name,
            },
            "mainEntityOfPage": {
                "@type": "WebPage",
                "@id": page_url(ctx.canonical_base, &article.slug),
            },
        }));
        return Some(Repair::StructuredDataSynthesized);
    };

    let embedded_name = data
        .get("author")
        .and_then(|a| a.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);
    if embedded_name.as_deref() == Some(ctx.author.name.as_str()) {
        return None;
    }

    data["author"] = json!({
        "@type": "Person",
        "name": ctx.author.name,
    });
    Some(Repair::StructuredDataAuthorRewritten {
        generated: embedded_name,
    })
}

fn page_url(canonical_base: &str, slug: &str) -> String {
    format!("{}/{slug}", canonical_base.trim_end_matches('/'))
}

/// Rule 5: derive reading time at ~200 words per minute, floored at one
/// minute, when the model omitted it.
fn derive_reading_time(article: &mut ArticleDocument) -> Option<Repair> {
    if article.reading_time.is_some_and(|t| t > 0) {
        return None;
    }
    let minutes = reading_time_minutes(&article.content);
    article.reading_time = Some(minutes);
    Some(Repair::ReadingTimeDerived { minutes })
}

pub fn reading_time_minutes(content: &str) -> u32 {
    let words = content.split_whitespace().count() as u32;
    (words / WORDS_PER_MINUTE).max(1)
}

/// Rule 6: the caller's CTA wins unconditionally when supplied.
fn apply_cta_override(article: &mut ArticleDocument, cta: Option<&CtaOverride>) -> Option<Repair> {
    let cta = cta?;
    article.ctas = vec![CallToAction {
        text: cta.text.clone(),
        url: cta.url.clone(),
        kind: "primary".to_string(),
        new_tab: true,
        icon: Some("arrow-right".to_string()),
    }];
    Some(Repair::CtaOverridden)
}
