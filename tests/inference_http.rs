//! HTTP inference client against a mock inference service.

use mockito::{Matcher, Server};
use price_cache::{HttpInferenceClient, InferenceConfig, PredictionError, PredictionRequest, PredictionService};
use serde_json::json;
use std::time::Duration;

fn client_for(url: &str) -> HttpInferenceClient {
    HttpInferenceClient::new(&InferenceConfig::new(url).with_timeout(Duration::from_secs(2)))
        .expect("client builds")
}

#[tokio::test]
async fn posts_renamed_fields_and_rounds_the_result() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/predict")
        .match_header("content-type", "application/json")
        .match_header("x-request-id", Matcher::Any)
        .match_body(Matcher::Json(json!({
            "BOROUGH": 3,
            "BUILDING_CLASS_AT_TIME_OF_SALE": "A1",
            "GROSS_SQUARE_FEET": 1500.0,
            "YEAR_BUILT": 1950
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"prediction": 123456.789}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let price = client
        .predict(&PredictionRequest::new(3, "A1", 1500.0, 1950))
        .await
        .unwrap();

    assert_eq!(price.to_string(), "123456.79");
    mock.assert_async().await;
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_tolerated() {
    let server = Server::new_async().await;
    let client = client_for(&format!("{}/", server.url()));
    assert_eq!(client.url(), format!("{}/predict", server.url()));
}

#[tokio::test]
async fn client_error_keeps_status_and_body() {
    let mut server = Server::new_async().await;
    let body = r#"{"detail":"invalid building class"}"#;
    server
        .mock("POST", "/predict")
        .with_status(422)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;

    let err = client_for(&server.url())
        .predict(&PredictionRequest::new(3, "ZZ", 1500.0, 1950))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        PredictionError::Upstream {
            status: 422,
            body: body.to_string()
        }
    );
}

#[tokio::test]
async fn server_error_is_passed_through_as_well() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/predict")
        .with_status(500)
        .with_body(r#"{"detail":"Model pipeline not loaded"}"#)
        .create_async()
        .await;

    let err = client_for(&server.url())
        .predict(&PredictionRequest::new(1, "A1", 10.0, 1900))
        .await
        .unwrap_err();

    assert!(matches!(err, PredictionError::Upstream { status: 500, .. }));
}

#[tokio::test]
async fn null_prediction_is_internal() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/predict")
        .with_status(200)
        .with_body(r#"{"prediction": null}"#)
        .create_async()
        .await;

    let err = client_for(&server.url())
        .predict(&PredictionRequest::new(1, "A1", 10.0, 1900))
        .await
        .unwrap_err();

    assert!(matches!(err, PredictionError::Internal { .. }));
}

#[tokio::test]
async fn unreachable_service_is_unavailable() {
    // Nothing listens on port 1.
    let err = client_for("http://127.0.0.1:1")
        .predict(&PredictionRequest::new(1, "A1", 10.0, 1900))
        .await
        .unwrap_err();

    assert!(matches!(err, PredictionError::UpstreamUnavailable { .. }));
}

#[test]
fn malformed_base_url_is_a_configuration_error() {
    let err = HttpInferenceClient::new(&InferenceConfig::new("not a url")).err().unwrap();
    assert!(matches!(err, price_cache::Error::Configuration { .. }));
}
