mod common;

use copyforge::batch::{BatchDriver, CompositeRequest, Compositor, FailureReason, LayerText, plan_batch};
use copyforge::clients::CompositorClient;
use copyforge::config::CampaignConfig;
use copyforge::variants::Variant;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    RgbImage::new(width, height)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn request(text: &str) -> CompositeRequest {
    CompositeRequest {
        template_id: "tpl-42".to_string(),
        layers: vec![LayerText {
            layer_id: "header".to_string(),
            text: text.to_string(),
        }],
    }
}

#[tokio::test]
async fn test_render_posts_multipart_form_with_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/edit"))
        .and(header("x-api-key", "photoroom-key"))
        .and(body_string_contains("name=\"templateId\""))
        .and(body_string_contains("tpl-42"))
        .and(body_string_contains("name=\"layers.header.text.content\""))
        .and(body_string_contains("Big Sale"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png(2, 2)))
        .expect(1)
        .mount(&server)
        .await;

    let options = common::options_for(&server.uri());
    let client = CompositorClient::new(&options, options.photoroom_api_key.clone()).unwrap();

    let bytes = client.render(&request("Big Sale")).await.unwrap();
    assert_eq!(bytes, png(2, 2));
}

#[tokio::test]
async fn test_non_success_status_is_reported_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/edit"))
        .respond_with(ResponseTemplate::new(402).set_body_string("  out of credits \n"))
        .mount(&server)
        .await;

    let options = common::options_for(&server.uri());
    let client = CompositorClient::new(&options, options.photoroom_api_key.clone()).unwrap();

    let reason = client.render(&request("Big Sale")).await.unwrap_err();
    assert_eq!(
        reason,
        FailureReason::Status {
            status: 402,
            body: "out of credits".to_string()
        }
    );
}

#[tokio::test]
async fn test_timeout_is_a_transport_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/edit"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(png(1, 1))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut options = common::options_for(&server.uri());
    options.timeout_secs = 1;
    let client = CompositorClient::new(&options, options.photoroom_api_key.clone()).unwrap();

    let reason = client.render(&request("Big Sale")).await.unwrap_err();
    assert!(matches!(reason, FailureReason::Transport(_)));
}

#[tokio::test]
async fn test_batch_with_second_item_failing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/edit"))
        .and(body_string_contains("Save Now"))
        .respond_with(ResponseTemplate::new(500).set_body_string("render failed"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/edit"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png(3, 1)))
        .mount(&server)
        .await;

    let options = common::options_for(&server.uri());
    let config = CampaignConfig::from_options(&options);
    let client = CompositorClient::new(&options, config.credentials.compositor_key.clone()).unwrap();

    let variants = vec![
        Variant::title(0, "Big Sale"),
        Variant::title(1, "Save Now"),
        Variant::title(2, "Clearance"),
    ];
    let plan = plan_batch(&variants, &[0, 1, 2], &config).unwrap();
    let report = BatchDriver::new(&client).run(plan, |_| {}).await;

    assert_eq!(report.images.len(), 2);
    assert_eq!(report.images[0].variant.label(), "Big Sale");
    assert_eq!(report.images[1].variant.label(), "Clearance");
    assert_eq!(report.images[1].width, 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert!(matches!(
        report.failures[0].reason,
        FailureReason::Status { status: 500, .. }
    ));
    assert_eq!(server.received_requests().await.unwrap_or_default().len(), 3);
}

#[tokio::test]
async fn test_base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/photoroom/v2/edit"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png(1, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let mut options = common::options_for(&server.uri());
    options.compositor_base_url = format!("{}/photoroom", server.uri()).parse().unwrap();
    let client = CompositorClient::new(&options, options.photoroom_api_key.clone()).unwrap();

    assert!(client.render(&request("Big Sale")).await.is_ok());
}
