// labinv-api: Async Rust clients for the hosted services behind labinv
// (identity, document store, generative model, image host)

pub mod auth;
pub mod documents;
pub mod error;
pub mod generative;
pub mod identity;
pub mod image;
pub mod transport;

pub use auth::{AuthSession, Credentials, TokenSlot};
pub use documents::{Document, DocumentClient};
pub use error::Error;
pub use generative::{DescriptionRequest, EnhancedDescription, GenerativeClient, PaperSummary};
pub use identity::{IdentityClient, UserRecord};
pub use image::ImageHostClient;
pub use transport::TransportConfig;
