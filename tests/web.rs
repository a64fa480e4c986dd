use std::sync::Arc;

use serde_json::{json, Value};
use warp::http::StatusCode;

use excessive_desk::config::Root;
use excessive_desk::host::{CommandSink, RecordingSink};
use excessive_desk::listener::web;
use excessive_desk::Mapper;

const CONFIG: &str = r#"
lights:
  accent: { type: rgb, red: 17, green: 27, blue: 22 }
  task: { type: white, white: 23 }
  ring: { type: dualWhite, warm: 4, cool: 25 }
"#;

fn setup() -> (Arc<Mapper>, Arc<RecordingSink>) {
    let config: Root = serde_yaml::from_str(CONFIG).unwrap();
    let sink = Arc::new(RecordingSink::new());
    let mapper = Mapper::from_config(&config, Arc::clone(&sink) as Arc<dyn CommandSink>);
    (Arc::new(mapper), sink)
}

fn body_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn lists_light_names() {
    let (mapper, _sink) = setup();
    let response = warp::test::request()
        .method("GET")
        .path("/lights")
        .reply(&web::routes(mapper))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response.body()), json!(["accent", "ring", "task"]));
}

#[tokio::test]
async fn reports_status() {
    let (mapper, _sink) = setup();
    let response = warp::test::request()
        .method("GET")
        .path("/lights/ring")
        .reply(&web::routes(mapper))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response.body()),
        json!({
            "type": "ring",
            "isOn": false,
            "effectiveColor": "#000000",
            "channels": ["Warm", "Cool"],
        })
    );
}

#[tokio::test]
async fn unknown_light_is_not_found() {
    let (mapper, _sink) = setup();
    let routes = web::routes(mapper);

    for (method, path) in [
        ("GET", "/lights/desk"),
        ("PUT", "/lights/desk/on"),
        ("DELETE", "/lights/desk/on"),
        ("PUT", "/lights/desk/transitions"),
    ]
    .iter()
    {
        let response = warp::test::request()
            .method(method)
            .path(path)
            .body(r#"[{"color": "white"}]"#)
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{} {}", method, path);
    }
}

#[tokio::test]
async fn on_and_off_are_accepted() {
    let (mapper, sink) = setup();
    let routes = web::routes(Arc::clone(&mapper));

    let response = warp::test::request()
        .method("PUT")
        .path("/lights/task/on")
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(mapper.get("task").unwrap().status().is_on);

    let response = warp::test::request()
        .method("DELETE")
        .path("/lights/task/on")
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(!mapper.get("task").unwrap().status().is_on);
    assert_eq!(sink.last().as_deref(), Some("23=0.0000"));
}

#[tokio::test]
async fn transitions_replace_the_animation() {
    let (mapper, _sink) = setup();
    let response = warp::test::request()
        .method("PUT")
        .path("/lights/accent/transitions")
        .json(&json!([
            { "color": "#FF0000", "duration": 1000 },
            { "color": "#00FF00", "duration": 1000 },
            { "color": "#0000FF", "duration": 1000 },
        ]))
        .reply(&web::routes(Arc::clone(&mapper)))
        .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(mapper.get("accent").unwrap().frame_count(), 90);
}

#[tokio::test]
async fn invalid_transitions_are_rejected() {
    let (mapper, _sink) = setup();
    let routes = web::routes(Arc::clone(&mapper));

    for body in [r#"[]"#, r#"[{"color": "not-a-color", "duration": 10}]"#, "{"].iter() {
        let response = warp::test::request()
            .method("PUT")
            .path("/lights/accent/transitions")
            .body(*body)
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
        assert!(body_json(response.body())["error"].is_string());
    }

    assert_eq!(mapper.get("accent").unwrap().frame_count(), 1);
}

#[tokio::test]
async fn large_transitions_leave_other_requests_served() {
    let (mapper, _sink) = setup();
    let routes = web::routes(Arc::clone(&mapper));

    // Two hours of animation at 30 fps.
    let keyframes = json!([
        { "color": "#FF0000", "duration": 3_600_000 },
        { "color": "#0000FF", "duration": 3_600_000 },
    ]);
    let transitions = warp::test::request()
        .method("PUT")
        .path("/lights/accent/transitions")
        .json(&keyframes)
        .reply(&routes);
    let status = warp::test::request().method("GET").path("/lights/task").reply(&routes);

    let (transitions, status) = tokio::join!(transitions, status);
    assert_eq!(transitions.status(), StatusCode::ACCEPTED);
    assert_eq!(status.status(), StatusCode::OK);
    assert_eq!(mapper.get("accent").unwrap().frame_count(), 216_000);
}
