/// Integration tests with a mocked content API
/// Exercises the client against recorded response shapes without a running server
use content_doctor::errors::AppError;
use content_doctor::integrations::content_client::ContentApiClient;
use content_doctor::verification::verify_content;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_dropdowns_parses_mixed_options() {
    let mock_server = MockServer::start().await;

    let mock_response = serde_json::json!({
        "status": "success",
        "screen_location": "mortgage_step1",
        "language_code": "en",
        "dropdowns": [
            {"key": "mortgage_step1_property_ownership", "label": "Property ownership"}
        ],
        "options": {
            "mortgage_step1_property_ownership": [
                {"value": "1", "text": "No property"},
                {"value": "2", "text": "I own a property"}
            ],
            "mortgage_step1_property_ownership_option_1": "No property",
            "mortgage_step1_property_ownership_option_2": "I own a property"
        },
        "placeholders": {"mortgage_step1_property_ownership": "Select status"},
        "labels": {"mortgage_step1_property_ownership": "Property ownership"},
        "cached": true,
        "jsonb_source": true,
        "performance": {
            "query_count": 1,
            "source": "dropdown_configs",
            "total_items": 1,
            "dropdowns_found": 1
        },
        "property_ownership": {
            "label": "Property ownership",
            "placeholder": "Select status",
            "options": [{"value": "1", "text": "No property"}]
        }
    });

    Mock::given(method("GET"))
        .and(path("/api/dropdowns/mortgage_step1/en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .mount(&mock_server)
        .await;

    let client = ContentApiClient::new(mock_server.uri()).unwrap();
    let response = client.get_dropdowns("mortgage_step1", "en").await.unwrap();

    assert!(response.cached);
    assert_eq!(response.dropdowns.len(), 1);
    assert_eq!(
        response
            .option_list("mortgage_step1_property_ownership")
            .unwrap()
            .len(),
        2
    );
    assert!(response
        .option_list("mortgage_step1_property_ownership_option_1")
        .is_none());
    assert_eq!(
        response.fields["property_ownership"]["placeholder"],
        "Select status"
    );
    assert_eq!(response.performance.unwrap().source, "dropdown_configs");
}

#[tokio::test]
async fn test_get_content_sends_type_filter() {
    let mock_server = MockServer::start().await;

    let mock_response = serde_json::json!({
        "status": "success",
        "screen_location": "mortgage_step1",
        "language_code": "he",
        "content_count": 1,
        "content": {
            "mortgage_step1.field.city_option_1": {
                "value": "תל אביב",
                "component_type": "dropdown_option",
                "category": "form",
                "language": "he",
                "status": "approved"
            }
        },
        "filtered_by_type": "dropdown_option",
        "cached": false
    });

    Mock::given(method("GET"))
        .and(path("/api/content/mortgage_step1/he"))
        .and(query_param("type", "dropdown_option"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .mount(&mock_server)
        .await;

    let client = ContentApiClient::new(mock_server.uri()).unwrap();
    let response = client
        .get_content("mortgage_step1", "he", Some("dropdown_option"))
        .await
        .unwrap();

    assert_eq!(response.content_count, 1);
    assert_eq!(
        response.content["mortgage_step1.field.city_option_1"].value,
        "תל אביב"
    );

    let report = verify_content(
        &[
            "mortgage_step1.field.city_option_1",
            "mortgage_step1.field.city_option_2",
        ],
        &response,
    );
    assert_eq!(report.issues.len(), 1);
}

#[tokio::test]
async fn test_server_error_maps_to_external_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/dropdowns/mortgage_step9/en"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = ContentApiClient::new(mock_server.uri()).unwrap();
    let err = client
        .get_dropdowns("mortgage_step9", "en")
        .await
        .unwrap_err();

    match err {
        AppError::ExternalApiError(msg) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("boom"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_clear_cache_posts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/cache/clear"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "success", "message": "Cache cleared"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ContentApiClient::new(format!("{}/", mock_server.uri())).unwrap();
    let body = client.clear_cache().await.unwrap();
    assert_eq!(body["status"], "success");
}
