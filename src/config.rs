use serde::Deserialize;

const DEFAULT_LANGUAGES: &str = "en,he,ru";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    /// Database the dropdown migration writes to; defaults to `database_url`.
    pub target_database_url: Option<String>,
    pub port: u16,
    pub content_api_base_url: Option<String>, // Only needed by the API verification tool
    pub languages: Vec<String>,
    pub cache_ttl_secs: u64,
    pub max_connections: u32,
    /// Serve `/api/dropdowns` from `dropdown_configs` instead of the legacy rows.
    pub use_jsonb_dropdowns: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("CONTENT_DATABASE_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .map_err(|_| {
                    anyhow::anyhow!(
                        "CONTENT_DATABASE_URL or DATABASE_URL environment variable required"
                    )
                })
                .and_then(|url| validate_database_url(&url).map(|_| url))?,
            target_database_url: optional_database_url(std::env::var("TARGET_DATABASE_URL").ok())?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8003".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            content_api_base_url: std::env::var("CONTENT_API_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|url| validate_http_url(&url).map(|_| url.trim_end_matches('/').to_string()))
                .transpose()?,
            languages: parse_languages(
                &std::env::var("CONTENT_LANGUAGES")
                    .unwrap_or_else(|_| DEFAULT_LANGUAGES.to_string()),
            )?,
            cache_ttl_secs: std::env::var("CONTENT_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CONTENT_CACHE_TTL_SECS must be a number of seconds"))?,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a positive number"))?,
            use_jsonb_dropdowns: parse_flag(
                "USE_JSONB_DROPDOWNS",
                std::env::var("USE_JSONB_DROPDOWNS").ok().as_deref(),
                true,
            )?,
        };

        // Log successful configuration load (without credentials)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Database URL: {}...", url_preview(&config.database_url));
        if let Some(ref target) = config.target_database_url {
            tracing::debug!("Target database URL: {}...", url_preview(target));
        }
        if let Some(ref api) = config.content_api_base_url {
            tracing::debug!("Content API base URL: {}", api);
        }
        tracing::debug!("Languages: {}", config.languages.join(","));
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("JSONB dropdowns: {}", config.use_jsonb_dropdowns);

        Ok(config)
    }

    /// Base URL of the content API, required by tools that talk to it.
    pub fn require_api_base_url(&self) -> anyhow::Result<&str> {
        self.content_api_base_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("CONTENT_API_BASE_URL environment variable required"))
    }
}

/// First 20 characters of a URL, enough to tell hosts apart without the password.
pub fn url_preview(url: &str) -> String {
    url.chars().take(20).collect()
}

/// An optional database URL; blank counts as unset.
pub fn optional_database_url(raw: Option<String>) -> anyhow::Result<Option<String>> {
    raw.filter(|url| !url.trim().is_empty())
        .map(|url| validate_database_url(&url).map(|_| url))
        .transpose()
}

/// Parses a boolean environment flag; unset or blank yields `default`.
pub fn parse_flag(name: &str, raw: Option<&str>, default: bool) -> anyhow::Result<bool> {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(default),
        Some("true" | "1" | "yes" | "on") => Ok(true),
        Some("false" | "0" | "no" | "off") => Ok(false),
        Some(other) => anyhow::bail!("{} must be true or false, got {:?}", name, other),
    }
}

pub fn validate_database_url(url: &str) -> anyhow::Result<()> {
    if url.trim().is_empty() {
        anyhow::bail!("DATABASE_URL cannot be empty");
    }
    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
    }
    Ok(())
}

pub fn validate_http_url(url: &str) -> anyhow::Result<()> {
    let parsed = url::Url::parse(url)
        .map_err(|e| anyhow::anyhow!("CONTENT_API_BASE_URL is not a valid URL: {}", e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("CONTENT_API_BASE_URL must start with http:// or https://");
    }
    Ok(())
}

/// Parses a comma separated language list such as `en,he,ru`.
pub fn parse_languages(raw: &str) -> anyhow::Result<Vec<String>> {
    let mut languages = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let valid = (2..=5).contains(&code.len())
            && code.chars().all(|c| c.is_ascii_alphabetic() || c == '-');
        if !valid {
            anyhow::bail!("Invalid language code in CONTENT_LANGUAGES: {:?}", code);
        }
        let code = code.to_ascii_lowercase();
        if !languages.contains(&code) {
            languages.push(code);
        }
    }
    if languages.is_empty() {
        anyhow::bail!("CONTENT_LANGUAGES must list at least one language");
    }
    Ok(languages)
}
