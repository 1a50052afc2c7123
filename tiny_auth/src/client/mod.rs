mod authorized;
mod errors;
mod origin;
mod pipeline;

pub use authorized::AuthorizedClient;
pub use errors::ClientError;
pub use origin::OriginPolicy;
pub use pipeline::{RequestInterceptor, RequestPipeline};
