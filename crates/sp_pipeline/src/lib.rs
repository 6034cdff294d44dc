pub mod normalize;
pub mod publish;

pub use normalize::{normalize, NormalizeContext, Repair};
pub use publish::{CreatedResources, PublishReport, Publisher};
