use std::sync::Arc;

use crate::{
    db::DocumentStore,
    services::{
        inference::{CollaborativeModel, ContentModel},
        ArticleCatalog, CollaborativeRecommender, ContentRecommender, IdentityProvider,
        KeywordSimilarityIndex, Recommender,
    },
};

/// Shared application state
///
/// Everything here is read-only after start-up; mutable data lives in the
/// document store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub catalog: Arc<ArticleCatalog>,
    pub content: Arc<dyn Recommender>,
    pub collaborative: Arc<dyn Recommender>,
    pub identity: Arc<dyn IdentityProvider>,
    pub default_recommendations: usize,
}

/// Trained models available to the recommenders
#[derive(Clone, Default)]
pub struct Models {
    pub content: Option<Arc<dyn ContentModel>>,
    pub collaborative: Option<Arc<dyn CollaborativeModel>>,
}

impl AppState {
    /// Loads the catalog, builds the similarity index and wires both recommenders
    pub async fn initialize(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        models: Models,
        default_recommendations: usize,
    ) -> Self {
        let catalog = Arc::new(ArticleCatalog::load(store.as_ref()).await);
        let index = Arc::new(KeywordSimilarityIndex::build(&catalog));

        tracing::info!(
            store = store.name(),
            articles = catalog.len(),
            content_model = models.content.is_some(),
            collaborative_model = models.collaborative.is_some(),
            "Application state initialized"
        );

        let content = Arc::new(ContentRecommender::new(
            store.clone(),
            catalog.clone(),
            index,
            models.content,
        ));
        let collaborative = Arc::new(CollaborativeRecommender::new(
            store.clone(),
            models.collaborative,
        ));

        Self {
            store,
            catalog,
            content,
            collaborative,
            identity,
            default_recommendations,
        }
    }
}
