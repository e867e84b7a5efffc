mod common;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

fn decode_png(data_url: &str) -> image::DynamicImage {
    let encoded = data_url
        .strip_prefix("data:image/png;base64,")
        .expect("data URL prefix");
    let bytes = STANDARD.decode(encoded).unwrap();
    image::load_from_memory(&bytes).unwrap()
}

async fn create(server: &axum_test::TestServer, body: Value) -> Value {
    let response = server.post("/api/v1/urls").json(&body).await;
    assert_eq!(response.status_code(), 201);
    response.json::<Value>()
}

#[tokio::test]
async fn test_qr_uses_stored_settings() {
    let (state, _repo) = common::create_test_state();
    let server = common::test_server(state);

    let created = create(&server, json!({ "original_url": "https://example.com" })).await;
    let code = created["short_code"].as_str().unwrap();

    let response = server.get(&format!("/api/v1/urls/{}/qr", code)).await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["short_code"], code);
    assert_eq!(body["short_url"], created["short_url"]);
    assert_eq!(body["qr_error_correction"], "M");
    assert_eq!(body["qr_size"], 256);
    assert_eq!(body["qr_data_url"], created["qr_data_url"]);
}

#[tokio::test]
async fn test_qr_overrides_apply_to_one_request() {
    let (state, _repo) = common::create_test_state();
    let server = common::test_server(state);

    let created = create(&server, json!({ "original_url": "https://example.com" })).await;
    let code = created["short_code"].as_str().unwrap();

    let overridden = server
        .get(&format!("/api/v1/urls/{}/qr", code))
        .add_query_param("level", "H")
        .add_query_param("size", 512)
        .await
        .json::<Value>();

    assert_eq!(overridden["qr_error_correction"], "H");
    assert_eq!(overridden["qr_size"], 512);

    let image = decode_png(overridden["qr_data_url"].as_str().unwrap());
    assert_eq!((image.width(), image.height()), (512, 512));

    let stored = server
        .get(&format!("/api/v1/urls/{}/qr", code))
        .await
        .json::<Value>();

    assert_eq!(stored["qr_error_correction"], "M");
    assert_eq!(stored["qr_size"], 256);

    let record = server
        .get(&format!("/api/v1/urls/{}", code))
        .await
        .json::<Value>();
    assert_eq!(record["qr_error_correction"], "M");
    assert_eq!(record["qr_size"], 256);
}

#[tokio::test]
async fn test_qr_empty_params_fall_back_to_stored() {
    let (state, _repo) = common::create_test_state();
    let server = common::test_server(state);

    let created = create(
        &server,
        json!({ "original_url": "https://example.com", "qr_error_correction": "L", "qr_size": 200 }),
    )
    .await;
    let code = created["short_code"].as_str().unwrap();

    let response = server
        .get(&format!("/api/v1/urls/{}/qr?level=&size=", code))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["qr_error_correction"], "L");
    assert_eq!(body["qr_size"], 200);

    let image = decode_png(body["qr_data_url"].as_str().unwrap());
    assert_eq!((image.width(), image.height()), (200, 200));
}

#[tokio::test]
async fn test_qr_invalid_params() {
    let (state, _repo) = common::create_test_state();
    let server = common::test_server(state);

    let created = create(&server, json!({ "original_url": "https://example.com" })).await;
    let code = created["short_code"].as_str().unwrap();

    for query in ["level=Z", "size=2000", "size=64", "size=abc"] {
        let response = server
            .get(&format!("/api/v1/urls/{}/qr?{}", code, query))
            .await;

        response.assert_status_bad_request();
        assert_eq!(
            response.json::<Value>()["error"]["code"],
            "invalid_qr_params"
        );
    }
}

#[tokio::test]
async fn test_qr_unknown_code() {
    let (state, _repo) = common::create_test_state();
    let server = common::test_server(state);

    let response = server.get("/api/v1/urls/zzz999/qr").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}
