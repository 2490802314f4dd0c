use std::sync::Arc;

use proptest::prelude::*;
use serde_json::Value;

use dromos::pattern::{match_template, reconstruct};
use dromos::{
    Arguments, Config, Controller, Exception, Request, Response, Router, Signature, Target,
};

fn json_body(response: &Response) -> Value {
    serde_json::from_slice(response.body().as_slice()).unwrap()
}

fn tagged(tag: &'static str) -> Target {
    Target::closure(Signature::new(), move |_| Ok(Response::new().text(tag)))
}

fn demo_router() -> Router {
    let mut router = Router::new();
    router
        .get(
            "/home/{id}",
            Target::closure(Signature::new().response().param("id"), |mut args| {
                let id = args.value("id").unwrap_or_default().to_string();
                args.take_response()
                    .with_header("x-custom-header", "demo")
                    .json(&serde_json::json!({ "id": id }))
            }),
        )
        .get(
            "/data/{id}/user/{user_id}",
            Target::closure(
                Signature::new().param("id").param("user_id"),
                |args| {
                    Ok(Response::new().text(&format!(
                        "{}:{}",
                        args.value("id").unwrap_or_default(),
                        args.value("user_id").unwrap_or_default()
                    )))
                },
            ),
        );
    router
}

struct ArticleController;

impl Controller for ArticleController {
    fn name(&self) -> String {
        "ArticleController".to_string()
    }

    fn describe(&self, method: &str) -> Option<Signature> {
        match method {
            "get" => Some(Signature::new().param("id")),
            _ => None,
        }
    }

    fn call(&self, method: &str, args: Arguments) -> Result<Response, Exception> {
        Ok(Response::new().text(&format!(
            "{} {}",
            method,
            args.value("id").unwrap_or_default()
        )))
    }
}

#[test]
fn test_home_route_returns_json() {
    let mut router = demo_router();
    let response = router.handle(Request::new("GET", "/home/42"));

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header_line("x-custom-header"), "demo");
    assert_eq!(json_body(&response), serde_json::json!({ "id": "42" }));
}

#[test]
fn test_two_parameters() {
    let mut router = demo_router();
    let response = router.handle(Request::new("GET", "/data/7/user/9"));
    assert_eq!(response.body().to_string_lossy(), "7:9");
}

#[test]
fn test_raw_request_round_trip() {
    let mut router = demo_router();
    let raw = b"GET /home/5?verbose=1 HTTP/1.1\r\nHost: localhost\r\n\r\n";
    let request = Request::try_from(raw, 3).unwrap();
    let response = router.handle(request);

    let text = String::from_utf8(response.as_bytes()).unwrap();
    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.ends_with(r#"{"id":"5"}"#));
}

#[test]
fn test_unregistered_method_is_405() {
    let mut router = demo_router();
    let response = router.handle(Request::new("POST", "/home/42"));

    assert_eq!(response.status_code(), 405);
    assert_eq!(response.header_line("Allow"), "GET");
    assert_eq!(json_body(&response)["available"], serde_json::json!(["GET"]));
}

#[test]
fn test_unknown_method_is_405() {
    let mut router = demo_router();
    let response = router.handle(Request::new("BREW", "/home/42"));
    assert_eq!(response.status_code(), 405);
}

#[test]
fn test_unmatched_path_is_404() {
    let mut router = demo_router();
    for path in ["/nowhere", "/home", "/home/1/2", "/data/7/user"] {
        let response = router.handle(Request::new("GET", path));
        assert_eq!(response.status_code(), 404, "{}", path);
        assert_eq!(json_body(&response)["message"], "Route not found");
    }
}

#[test]
fn test_first_registered_route_wins() {
    let mut router = Router::new();
    router.get("/a/{x}", tagged("first")).get("/{p}/{q}", tagged("second"));

    let response = router.handle(Request::new("GET", "/a/v"));
    assert_eq!(response.body().to_string_lossy(), "first");
    let response = router.handle(Request::new("GET", "/b/v"));
    assert_eq!(response.body().to_string_lossy(), "second");
}

#[test]
fn test_same_shape_replaces_in_place() {
    let mut router = Router::new();
    router
        .get("/a/{x}", tagged("old"))
        .get("/{p}/{q}", tagged("other"))
        .get("/a/{y}", tagged("new"));

    assert_eq!(router.routes().len(), 2);
    let response = router.handle(Request::new("GET", "/a/v"));
    assert_eq!(response.body().to_string_lossy(), "new");
}

#[test]
fn test_exact_template_path_matches_without_params() {
    let mut router = Router::new();
    router.get(
        "/raw/{id}",
        Target::closure(Signature::new().optional("id", "none"), |args| {
            Ok(Response::new().text(args.value("id").unwrap_or_default()))
        }),
    );

    let response = router.handle(Request::new("GET", "/raw/{id}"));
    assert_eq!(response.body().to_string_lossy(), "none");
}

#[test]
fn test_missing_parameter_is_404() {
    let mut router = Router::new();
    router.get(
        "/items/{id}",
        Target::closure(Signature::new().param("page"), |_| Ok(Response::new())),
    );

    let response = router.handle(Request::new("GET", "/items/3"));
    assert_eq!(response.status_code(), 404);
    assert_eq!(json_body(&response)["parameter"], "page");
}

#[test]
fn test_missing_controller_method_is_reported_once() {
    let mut router = Router::new();
    router.resource("/articles/{id}", Arc::new(ArticleController));

    match router.check_routes() {
        Err(Exception::TargetNotFound { missing }) => {
            let methods: Vec<_> = missing.iter().map(|m| m.method.as_str()).collect();
            assert_eq!(methods, vec!["post", "put", "patch", "delete"]);
            assert!(missing.iter().all(|m| m.owner == "ArticleController"));
        }
        other => panic!("unexpected result: {:?}", other.map(|r| r.len())),
    }
    assert_eq!(router.check_routes().unwrap().len(), 5);

    let response = router.handle(Request::new("GET", "/articles/8"));
    assert_eq!(response.body().to_string_lossy(), "get 8");
    let response = router.handle(Request::new("DELETE", "/articles/8"));
    assert_eq!(response.status_code(), 404);
}

#[test]
fn test_validate_before_dispatch() {
    let config = Config::new().with_validate_before_dispatch(true);
    let mut router = Router::with_config(config);
    router.resource("/articles/{id}", Arc::new(ArticleController));

    let response = router.handle(Request::new("GET", "/articles/8"));
    assert_eq!(response.status_code(), 404);
    assert_eq!(json_body(&response)["message"], "Missing Target Methods");

    // 缺失列表只报告一次
    let response = router.handle(Request::new("GET", "/articles/8"));
    assert_eq!(response.status_code(), 200);
}

#[test]
fn test_handler_failure_is_500() {
    let mut router = Router::new();
    router
        .get(
            "/fail",
            Target::closure(Signature::new(), |_| Err(Exception::internal("database offline"))),
        )
        .get(
            "/panic",
            Target::closure(Signature::new(), |_| -> Result<Response, Exception> {
                panic!("handler blew up")
            }),
        );

    let response = router.handle(Request::new("GET", "/fail"));
    assert_eq!(response.status_code(), 500);
    assert_eq!(json_body(&response)["message"], "database offline");

    let response = router.handle(Request::new("GET", "/panic"));
    assert_eq!(response.status_code(), 500);
    assert_eq!(json_body(&response)["message"], "handler blew up");
}

#[test]
fn test_handler_routing_errors_stay_500() {
    let mut router = Router::new();
    router.get(
        "/rows/{id}",
        Target::closure(Signature::new(), |_| {
            Err(Exception::RouteNotFound {
                path: "/db-row".to_string(),
            })
        }),
    );

    let response = router.handle(Request::new("GET", "/rows/1"));
    assert_eq!(response.status_code(), 500);
    assert_eq!(json_body(&response)["message"], "Route not found");
}

#[test]
fn test_path_params_exposed_as_attributes() {
    let mut router = Router::new();
    router.get(
        "/users/{uid}/posts/{pid}",
        Target::closure(Signature::new().request(), |args| {
            let request = args.request().cloned().unwrap_or_else(|| Request::new("GET", "/"));
            Ok(Response::new().text(&format!(
                "{}-{}",
                request.attribute("uid").unwrap_or_default(),
                request.get("pid").unwrap_or_default()
            )))
        }),
    );

    let response = router.handle(Request::new("GET", "/users/u1/posts/p2"));
    assert_eq!(response.body().to_string_lossy(), "u1-p2");
}

proptest! {
    #[test]
    fn prop_params_are_extracted(id in "[A-Za-z0-9_.-]{1,12}", user in "[A-Za-z0-9_.-]{1,12}") {
        let path = format!("/data/{}/user/{}", id, user);
        let params = match_template("/data/{id}/user/{user_id}", &path).unwrap().unwrap();
        prop_assert_eq!(params.get("id"), Some(id.as_str()));
        prop_assert_eq!(params.get("user_id"), Some(user.as_str()));
    }

    #[test]
    fn prop_reconstruction_round_trips(a in "[a-z0-9]{1,8}", b in "[a-z0-9]{1,8}") {
        let template = "/x/{a}/y/{b}";
        let path = format!("/x/{}/y/{}", a, b);
        let params = match_template(template, &path).unwrap().unwrap();
        prop_assert_eq!(reconstruct(template, &params), path);
    }

    #[test]
    fn prop_matching_is_idempotent(segment in "[a-z0-9/]{0,16}") {
        let path = format!("/home/{}", segment);
        let first = match_template("/home/{id}", &path).unwrap();
        let second = match_template("/home/{id}", &path).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_slash_never_inside_a_parameter(left in "[a-z]{1,6}", right in "[a-z]{1,6}") {
        let path = format!("/home/{}/{}", left, right);
        let matched = match_template("/home/{id}", &path).unwrap();
        prop_assert!(matched.is_none());
    }

    #[test]
    fn prop_first_match_in_registration_order(segment in "[a-z0-9]{1,10}") {
        let mut router = Router::new();
        router.get("/p/{x}", tagged("first")).get("/{a}/{b}", tagged("second"));
        let response = router.handle(Request::new("GET", &format!("/p/{}", segment)));
        prop_assert_eq!(response.body().to_string_lossy(), "first");
    }
}
