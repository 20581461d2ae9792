use webface_api::url::endpoint_url;
use webface_api::{normalize_base_url, resolve_page_url, ApiError, DEFAULT_BASE_URL};

#[test]
fn blank_base_falls_back_to_default_origin() {
    let url = normalize_base_url("   ").expect("default base should parse");
    assert_eq!(url.as_str(), format!("{DEFAULT_BASE_URL}/"));
}

#[test]
fn base_path_prefix_gains_trailing_slash() {
    let url = normalize_base_url("https://example.org/webface").expect("base");
    assert_eq!(url.as_str(), "https://example.org/webface/");
}

#[test]
fn base_query_and_fragment_are_dropped() {
    let url = normalize_base_url("http://example.org/?x=1#top").expect("base");
    assert_eq!(url.as_str(), "http://example.org/");
}

#[test]
fn non_http_scheme_is_rejected() {
    let error = normalize_base_url("ftp://example.org").expect_err("ftp must fail");
    assert!(matches!(error, ApiError::InvalidBaseUrl(_)));
}

#[test]
fn nested_endpoint_joins_under_prefix() {
    let base = normalize_base_url("http://example.org/app").expect("base");
    let url = endpoint_url(&base, "chat/clear", &[("session_id", "s1")]).expect("url");
    assert_eq!(url.as_str(), "http://example.org/app/chat/clear?session_id=s1");
}

#[test]
fn page_directive_resolves_against_origin() {
    let base = normalize_base_url("http://example.org/app").expect("base");
    assert_eq!(
        resolve_page_url(&base, "/static/suppertime_v1.4.html"),
        "http://example.org/static/suppertime_v1.4.html"
    );
    assert_eq!(
        resolve_page_url(&base, "https://cdn.example.org/page.html"),
        "https://cdn.example.org/page.html"
    );
}
