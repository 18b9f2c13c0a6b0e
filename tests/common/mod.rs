use copyforge::cli::ServiceOptions;
use copyforge::constants::{DEFAULT_COMPLETION_MODEL, DEFAULT_TEMPLATE_ID};

pub fn options_for(server_uri: &str) -> ServiceOptions {
    ServiceOptions {
        writer_api_key: Some("writer-key".to_string()),
        photoroom_api_key: Some("photoroom-key".to_string()),
        template_id: DEFAULT_TEMPLATE_ID.to_string(),
        layers: vec![
            "title=header".parse().unwrap(),
            "header=header".parse().unwrap(),
            "cta=cta".parse().unwrap(),
        ],
        completion_base_url: server_uri.parse().unwrap(),
        compositor_base_url: server_uri.parse().unwrap(),
        model: DEFAULT_COMPLETION_MODEL.to_string(),
        max_tokens: 500,
        timeout_secs: 2,
        variant_limit: 10,
    }
}
