use crate::config::Config;
use crate::content_store::ContentStore;
use crate::dropdown_api::{
    build_content_response, build_dropdowns_response, build_legacy_dropdowns_response,
    DropdownsResponse, JSONB_SOURCE, LEGACY_SOURCE,
};
use crate::dropdown_builder::build_dropdown_configs;
use crate::errors::AppError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use moka::future::Cache;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Queries against the content tables.
    pub store: ContentStore,
    /// Application configuration.
    pub config: Config,
    /// Serialized API responses keyed by route and parameters.
    pub response_cache: Cache<String, Value>,
}

/// Query parameters of `GET /api/content/:screen/:language`.
#[derive(Debug, Default, Deserialize)]
pub struct ContentQuery {
    #[serde(rename = "type")]
    pub component_type: Option<String>,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "content-doctor",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Rejects path segments that cannot be a screen or language name.
fn validate_segment(kind: &str, value: &str) -> Result<(), AppError> {
    let valid = !value.is_empty()
        && value.len() <= 255
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid {}: {:?}", kind, value)))
    }
}

/// Marks a cached response body as served from cache.
fn mark_cached(mut body: Value) -> Value {
    if let Some(obj) = body.as_object_mut() {
        obj.insert("cached".to_string(), Value::Bool(true));
    }
    body
}

/// GET /api/content/:screen/:language
///
/// Approved content of a screen in one language, optionally filtered with `?type=`.
pub async fn get_content(
    State(state): State<Arc<AppState>>,
    Path((screen, language)): Path<(String, String)>,
    Query(params): Query<ContentQuery>,
) -> Result<Json<Value>, AppError> {
    validate_segment("screen_location", &screen)?;
    validate_segment("language_code", &language)?;
    let component_type = params
        .component_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let cache_key = format!(
        "content:{}:{}:{}",
        screen,
        language,
        component_type.unwrap_or("all")
    );
    if let Some(cached) = state.response_cache.get(&cache_key).await {
        tracing::debug!("Cache hit for {}", cache_key);
        return Ok(Json(mark_cached(cached)));
    }

    let rows = state
        .store
        .fetch_screen_content(&screen, &language, component_type)
        .await?;
    tracing::info!(
        "GET /api/content/{}/{} - {} items",
        screen,
        language,
        rows.len()
    );

    let body = serde_json::to_value(build_content_response(
        &screen,
        &language,
        &rows,
        component_type,
    ))?;
    state.response_cache.insert(cache_key, body.clone()).await;
    Ok(Json(body))
}

/// GET /api/dropdowns/:screen/:language
///
/// Dropdowns of a screen, from `dropdown_configs` or, with
/// `USE_JSONB_DROPDOWNS=false`, assembled from the legacy content rows.
pub async fn get_dropdowns(
    State(state): State<Arc<AppState>>,
    Path((screen, language)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    validate_segment("screen_location", &screen)?;
    validate_segment("language_code", &language)?;

    let system = dropdown_system(&state.config);
    let cache_key = format!("dropdowns:{}:{}:{}", system, screen, language);
    if let Some(cached) = state.response_cache.get(&cache_key).await {
        tracing::debug!("Cache hit for {}", cache_key);
        return Ok(Json(mark_cached(cached)));
    }

    let response = if state.config.use_jsonb_dropdowns {
        jsonb_dropdowns(&state, &screen, &language).await?
    } else {
        legacy_dropdowns(&state, &screen, &language).await?
    };

    let body = serde_json::to_value(response)?;
    state.response_cache.insert(cache_key, body.clone()).await;
    Ok(Json(body))
}

async fn jsonb_dropdowns(
    state: &AppState,
    screen: &str,
    language: &str,
) -> Result<DropdownsResponse, AppError> {
    let configs = state.store.fetch_dropdown_configs(screen).await?;
    let response = build_dropdowns_response(screen, language, &configs);
    tracing::info!(
        "GET /api/dropdowns/{}/{} - {} dropdowns from {} configs",
        screen,
        language,
        response.dropdowns.len(),
        configs.len()
    );
    Ok(response)
}

async fn legacy_dropdowns(
    state: &AppState,
    screen: &str,
    language: &str,
) -> Result<DropdownsResponse, AppError> {
    let rows = state.store.fetch_dropdown_rows(screen).await?;
    let outcome = build_dropdown_configs(&rows, &state.config.languages, LEGACY_SOURCE, Utc::now());
    if !outcome.skipped_keys.is_empty() {
        tracing::debug!(
            "{}: {} legacy keys not assignable to a dropdown",
            screen,
            outcome.skipped_keys.len()
        );
    }
    let response = build_legacy_dropdowns_response(screen, language, outcome.drafts);
    tracing::info!(
        "GET /api/dropdowns/{}/{} - {} dropdowns from {} legacy rows",
        screen,
        language,
        response.dropdowns.len(),
        rows.len()
    );
    Ok(response)
}

fn dropdown_system(config: &Config) -> &'static str {
    if config.use_jsonb_dropdowns {
        "jsonb"
    } else {
        "legacy"
    }
}

/// Body of `GET /api/feature-flags/dropdown-system`.
fn feature_flags_body(config: &Config) -> Value {
    json!({
        "status": "success",
        "feature_flags": {
            "use_jsonb_dropdowns": config.use_jsonb_dropdowns,
            "current_system": dropdown_system(config),
        },
        "source": if config.use_jsonb_dropdowns { JSONB_SOURCE } else { LEGACY_SOURCE },
    })
}

/// GET /api/feature-flags/dropdown-system
pub async fn dropdown_feature_flags(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(feature_flags_body(&state.config))
}

/// POST /api/cache/clear
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<Value> {
    let entries = state.response_cache.entry_count();
    state.response_cache.invalidate_all();
    tracing::info!("Response cache cleared ({} entries)", entries);

    Json(json!({
        "status": "success",
        "message": "Cache cleared",
        "cleared_entries": entries
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(use_jsonb_dropdowns: bool) -> Config {
        Config {
            database_url: "postgres://localhost/content".to_string(),
            target_database_url: None,
            port: 8003,
            content_api_base_url: None,
            languages: vec!["en".to_string(), "he".to_string(), "ru".to_string()],
            cache_ttl_secs: 300,
            max_connections: 5,
            use_jsonb_dropdowns,
        }
    }

    #[test]
    fn test_feature_flags_body_reports_current_system() {
        let body = feature_flags_body(&config(true));
        assert_eq!(body["feature_flags"]["use_jsonb_dropdowns"], Value::Bool(true));
        assert_eq!(body["feature_flags"]["current_system"], "jsonb");
        assert_eq!(body["source"], "dropdown_configs");

        let body = feature_flags_body(&config(false));
        assert_eq!(body["feature_flags"]["current_system"], "legacy");
        assert_eq!(body["source"], "content_items_translations");
    }

    #[test]
    fn test_validate_segment() {
        assert!(validate_segment("screen_location", "mortgage_step1").is_ok());
        assert!(validate_segment("language_code", "he").is_ok());
        assert!(validate_segment("screen_location", "").is_err());
        assert!(validate_segment("screen_location", "a b").is_err());
        assert!(validate_segment("screen_location", "x';drop").is_err());
    }

    #[test]
    fn test_mark_cached_overrides_flag() {
        let body = mark_cached(json!({"status": "success", "cached": false}));
        assert_eq!(body["cached"], Value::Bool(true));
        assert_eq!(body["status"], "success");
    }
}
