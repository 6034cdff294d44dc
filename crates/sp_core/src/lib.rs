pub mod cms;
pub mod config;
pub mod error;
pub mod generator;
pub mod types;

pub use cms::{CmsClient, CmsEntry, ImageUpload, UploadedImage};
pub use config::{CmsConfig, GenerationConfig, SiteConfig};
pub use error::Error;
pub use generator::GenerationModel;
pub use types::{
    ArticleDocument, AuthorProfile, CallToAction, CtaOverride, ImageRef, PublishBundle,
    Reference, SeoMetadata, SocialLink, SocialPreview, TaxonomyTerm,
};

pub type Result<T> = std::result::Result<T, Error>;
