pub mod articles;
pub mod catalog;
pub mod collaborative;
pub mod content;
pub mod encoding;
pub mod favorites;
pub mod inference;
pub mod providers;
pub mod ratings;
pub mod recommendations;
pub mod similarity;
pub mod users;

pub use catalog::ArticleCatalog;
pub use collaborative::CollaborativeRecommender;
pub use content::ContentRecommender;
pub use providers::{GoogleIdentityProvider, IdentityProvider, VerifiedIdentity};
pub use recommendations::Recommender;
pub use similarity::KeywordSimilarityIndex;
