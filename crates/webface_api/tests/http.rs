use webface_api::{BackendRequest, Endpoint, WebfaceApiClient, WebfaceApiConfig};

fn client() -> WebfaceApiClient {
    WebfaceApiClient::new(WebfaceApiConfig::new("http://127.0.0.1:8000")).expect("client")
}

#[test]
fn chat_request_posts_json_body() {
    let request = client()
        .build_request(&BackendRequest::Chat {
            session_id: "s1".to_owned(),
            message: "hello".to_owned(),
        })
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(request.method(), "POST");
    assert_eq!(request.url().as_str(), "http://127.0.0.1:8000/chat?session_id=s1");
    let body = request
        .body()
        .and_then(|body| body.as_bytes())
        .expect("chat request has a body");
    let body: serde_json::Value = serde_json::from_slice(body).expect("json body");
    assert_eq!(body, serde_json::json!({ "message": "hello" }));
}

#[test]
fn clear_request_posts_without_body() {
    let request = client()
        .build_request(&BackendRequest::ClearHistory {
            session_id: "s1".to_owned(),
        })
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(request.method(), "POST");
    assert_eq!(request.url().path(), "/chat/clear");
    assert!(request.body().is_none());
}

#[test]
fn after_read_and_forum_start_use_get() {
    let client = client();
    for request in [
        BackendRequest::AfterRead {
            version: "1.6".to_owned(),
            session_id: "s1".to_owned(),
        },
        BackendRequest::ForumStart,
    ] {
        let built = client
            .build_request(&request)
            .expect("build request")
            .build()
            .expect("request");
        assert_eq!(built.method(), "GET", "{:?}", request.endpoint());
    }
}

#[test]
fn requests_report_captured_session_ids() {
    let chat = BackendRequest::Chat {
        session_id: "s1".to_owned(),
        message: "x".to_owned(),
    };
    assert_eq!(chat.session_id(), Some("s1"));
    assert_eq!(chat.endpoint(), Endpoint::Chat);
    assert_eq!(
        BackendRequest::ForumChat {
            message: "x".to_owned()
        }
        .session_id(),
        None
    );
}
