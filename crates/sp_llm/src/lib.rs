pub mod decode;
pub mod extract;
pub mod models;
pub mod prompt;

pub use decode::decode_document;
pub use extract::extract_json;
pub use models::create_model;

pub mod prelude {
    pub use super::decode::decode_document;
    pub use super::extract::extract_json;
    pub use super::models::create_model;
    pub use sp_core::{Error, GenerationModel, Result};
}
