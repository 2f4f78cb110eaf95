use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL. When absent the service runs on an in-memory store.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Path to the serialized content model weights
    #[serde(default = "default_content_model_path")]
    pub content_model_path: String,

    /// Path to the serialized collaborative model weights
    #[serde(default = "default_collaborative_model_path")]
    pub collaborative_model_path: String,

    /// OAuth client id expected as the `aud` claim of Google ID tokens
    #[serde(default)]
    pub google_client_id: Option<String>,

    /// Google token verification endpoint
    #[serde(default = "default_google_tokeninfo_url")]
    pub google_tokeninfo_url: String,

    /// Number of articles returned when a request does not ask for a specific count
    #[serde(default = "default_recommendations")]
    pub default_recommendations: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_content_model_path() -> String {
    "models/content_model.json".to_string()
}

fn default_collaborative_model_path() -> String {
    "models/collaborative_model.json".to_string()
}

fn default_google_tokeninfo_url() -> String {
    "https://oauth2.googleapis.com/tokeninfo".to_string()
}

fn default_recommendations() -> usize {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_variables_missing() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.port, 3000);
        assert_eq!(config.default_recommendations, 10);
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_overrides_are_read() {
        let vars = vec![
            ("DATABASE_URL".to_string(), "postgres://localhost/recs".to_string()),
            ("PORT".to_string(), "8080".to_string()),
            ("DEFAULT_RECOMMENDATIONS".to_string(), "5".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/recs"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.default_recommendations, 5);
    }
}
