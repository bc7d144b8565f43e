mod common;

use common::StubTransport;
use std::sync::Arc;
use witching_hour::{
    Archetype, AspectRatio, BackendConfig, BackendKind, GenerationAdapter, GenerationError,
    GenerationRequest,
};

fn lighthouse() -> GenerationRequest {
    GenerationRequest::new("a lighthouse at dusk")
        .with_archetype(Archetype::Sea)
        .with_aspect_ratio(AspectRatio::Widescreen)
}

async fn fal_adapter(transport: Arc<StubTransport>) -> GenerationAdapter {
    let config = BackendConfig::new(BackendKind::Fal).with_api_key("key-id:key-secret");
    GenerationAdapter::with_transport(&config, transport)
        .await
        .expect("fal adapter")
}

#[tokio::test]
async fn test_fal_lighthouse_example() {
    let transport = Arc::new(StubTransport::replying(
        200,
        r#"{"images":[{"url":"https://x/y.png"}]}"#,
    ));
    let adapter = fal_adapter(transport.clone()).await;

    let result = adapter.generate(&lighthouse()).await.unwrap();
    assert_eq!(result.image_reference.to_string(), "https://x/y.png");
    assert_eq!(result.source_prompt, "a lighthouse at dusk");
    assert_eq!(result.model_label, "fal-ai/fast-sdxl");
    assert!(!result.id.is_empty());

    let requests = transport.requests();
    assert_eq!(requests.len(), 1, "exactly one call per submission");
    assert_eq!(requests[0].url, "https://fal.run/fal-ai/fast-sdxl");
    assert_eq!(
        requests[0].headers,
        vec![("Authorization".to_string(), "Key key-id:key-secret".to_string())]
    );
    assert_eq!(requests[0].body["image_size"], "landscape_16_9");
    let prompt = requests[0].body["prompt"].as_str().unwrap();
    assert!(prompt.starts_with("A high-quality, cinematic digital painting of a Sea Witch."));
    assert!(prompt.contains("a lighthouse at dusk"));
}

#[tokio::test]
async fn test_empty_image_list_is_missing_image_data() {
    for body in [r#"{"images":[]}"#, r#"{"timings":{"inference":0.5}}"#] {
        let adapter = fal_adapter(Arc::new(StubTransport::replying(200, body))).await;
        let err = adapter.generate(&lighthouse()).await.unwrap_err();
        assert_eq!(err, GenerationError::MissingImageData);
    }
}

#[tokio::test]
async fn test_status_classification() {
    let adapter = fal_adapter(Arc::new(StubTransport::replying(
        401,
        r#"{"detail":"Invalid key"}"#,
    )))
    .await;
    assert!(matches!(
        adapter.generate(&lighthouse()).await,
        Err(GenerationError::Authentication(_))
    ));

    let adapter = fal_adapter(Arc::new(StubTransport::replying(
        429,
        r#"{"detail":"Too many requests"}"#,
    )))
    .await;
    assert!(matches!(
        adapter.generate(&lighthouse()).await,
        Err(GenerationError::RateLimited(_))
    ));
}

#[tokio::test]
async fn test_no_retry_after_failure() {
    let transport = Arc::new(StubTransport::new());
    transport.push(503, "upstream unavailable");
    transport.push(200, r#"{"images":[{"url":"https://x/late.png"}]}"#);
    let adapter = fal_adapter(transport.clone()).await;

    let err = adapter.generate(&lighthouse()).await.unwrap_err();
    assert!(matches!(err, GenerationError::Unknown(_)));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_network_and_malformed_responses_are_unknown() {
    let transport = Arc::new(StubTransport::new());
    transport.push_error(GenerationError::Unknown("Network error: connection refused".into()));
    let adapter = fal_adapter(transport).await;
    assert!(matches!(
        adapter.generate(&lighthouse()).await,
        Err(GenerationError::Unknown(msg)) if msg.contains("connection refused")
    ));

    let adapter = fal_adapter(Arc::new(StubTransport::replying(200, "<html>oops</html>"))).await;
    assert!(matches!(
        adapter.generate(&lighthouse()).await,
        Err(GenerationError::Unknown(_))
    ));
}

#[tokio::test]
async fn test_openai_backend() {
    let transport = Arc::new(StubTransport::new());
    transport.push(200, r#"{"created":1,"data":[{"b64_json":"iVBORw0KGgo="}]}"#);
    transport.push(
        400,
        r#"{"error":{"message":"Your request was rejected as a result of our safety system.","type":"invalid_request_error","code":"content_policy_violation"}}"#,
    );
    let config = BackendConfig::new(BackendKind::OpenAi)
        .with_api_key("sk-test")
        .with_model("gpt-image-1");
    let adapter = GenerationAdapter::with_transport(&config, transport.clone())
        .await
        .unwrap();

    let result = adapter.generate(&lighthouse()).await.unwrap();
    assert_eq!(
        result.image_reference.to_string(),
        "data:image/png;base64,iVBORw0KGgo="
    );
    assert_eq!(result.model_label, "gpt-image-1");

    let err = adapter.generate(&lighthouse()).await.unwrap_err();
    assert!(matches!(err, GenerationError::ContentPolicy(_)));

    let requests = transport.requests();
    assert_eq!(requests[0].url, "https://api.openai.com/v1/images/generations");
    assert_eq!(requests[0].headers[0].1, "Bearer sk-test");
    assert_eq!(requests[0].body["size"], "1792x1024");
}

#[tokio::test]
async fn test_gemini_backend() {
    let transport = Arc::new(StubTransport::new());
    transport.push(
        200,
        r#"{"candidates":[{"content":{"parts":[{"text":"behold"},{"inlineData":{"mimeType":"image/png","data":"AAAA"}}]}}]}"#,
    );
    transport.push(
        400,
        r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#,
    );
    let config = BackendConfig::new(BackendKind::Gemini)
        .with_api_key("AIza-test")
        .with_endpoint("http://localhost:1234/v1beta/");
    let adapter = GenerationAdapter::with_transport(&config, transport.clone())
        .await
        .unwrap();

    let result = adapter.generate(&lighthouse()).await.unwrap();
    assert_eq!(result.image_reference.to_string(), "data:image/png;base64,AAAA");

    assert!(matches!(
        adapter.generate(&lighthouse()).await,
        Err(GenerationError::Authentication(_))
    ));

    let requests = transport.requests();
    assert_eq!(
        requests[0].url,
        "http://localhost:1234/v1beta/models/gemini-2.5-flash-image:generateContent"
    );
    assert_eq!(
        requests[0].headers,
        vec![("x-goog-api-key".to_string(), "AIza-test".to_string())]
    );
    assert_eq!(
        requests[0].body["generationConfig"]["imageConfig"]["aspectRatio"],
        "16:9"
    );
}
