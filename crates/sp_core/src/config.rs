/// Connection settings for the CMS REST API.
#[derive(Debug, Clone)]
pub struct CmsConfig {
    /// Base URL of the CMS API, e.g. `https://cms.example.com/api`
    pub api_url: String,
    /// Bearer token sent on every request
    pub api_token: String,
}

/// Connection settings for the generation service.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Deployed model name on the service
    pub deployment: String,
    pub api_version: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            deployment: "gpt-4".to_string(),
            api_version: "2024-07-01-preview".to_string(),
        }
    }
}

/// Site-level settings used when composing canonical page identifiers.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Public base URL articles are served under, e.g.
    /// `https://example.com/blog`. The finalized slug is appended to it.
    pub canonical_base: String,
}

impl SiteConfig {
    pub fn page_url(&self, slug: &str) -> String {
        format!("{}/{}", self.canonical_base.trim_end_matches('/'), slug)
    }
}
