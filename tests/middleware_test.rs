use std::io::Read;
use std::sync::{Arc, Mutex};

use flate2::read::GzDecoder;

use dromos::middleware::FnHandler;
use dromos::stream::Stream;
use dromos::{
    Compression, Dispatcher, HttpRequestMethod, Middleware, Pipeline, Request, RequestHandler,
    Response, RouteTable, Router, Signature, Target,
};

type Log = Arc<Mutex<Vec<String>>>;

fn recorder(tag: &'static str, log: Log) -> impl Middleware {
    move |request: Request, next: &dyn RequestHandler| {
        log.lock().unwrap().push(format!("{} in", tag));
        let response = next.handle(request);
        log.lock().unwrap().push(format!("{} out", tag));
        response
    }
}

fn logged_router(log: Log) -> Router {
    let handler_log = Arc::clone(&log);
    let mut router = Router::new();
    router.get(
        "/work/{id}",
        Target::closure(Signature::new().param("id"), move |args| {
            handler_log.lock().unwrap().push("handler".to_string());
            Ok(Response::new().text(args.value("id").unwrap_or_default()))
        }),
    );
    router
}

#[test]
fn test_middleware_runs_in_order_added() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut router = logged_router(Arc::clone(&log));
    router
        .add_middleware(recorder("A", Arc::clone(&log)))
        .add_middleware(recorder("B", Arc::clone(&log)));

    let response = router.handle(Request::new("GET", "/work/1"));
    assert_eq!(response.status_code(), 200);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["A in", "B in", "handler", "B out", "A out"]
    );
}

#[test]
fn test_short_circuit_skips_dispatch() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut router = logged_router(Arc::clone(&log));
    router.add_middleware(|request: Request, next: &dyn RequestHandler| {
        if request.header_line("Authorization").is_empty() {
            Response::from_status_code(401)
        } else {
            next.handle(request)
        }
    });

    let response = router.handle(Request::new("GET", "/work/1"));
    assert_eq!(response.status_code(), 401);
    assert!(log.lock().unwrap().is_empty());

    let response = router.handle(Request::new("GET", "/work/1").with_header("Authorization", "token"));
    assert_eq!(response.status_code(), 200);
    assert_eq!(*log.lock().unwrap(), vec!["handler"]);
}

#[test]
fn test_middleware_can_rewrite_request() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut router = logged_router(log);
    router.add_middleware(|request: Request, next: &dyn RequestHandler| {
        let path = request.path().replacen("/v1", "", 1);
        next.handle(request.with_path(&path))
    });

    let response = router.handle(Request::new("GET", "/v1/work/77"));
    assert_eq!(response.body().to_string_lossy(), "77");
}

#[test]
fn test_middleware_sees_translated_failures() {
    let mut router = Router::new();
    router.add_middleware(|request: Request, next: &dyn RequestHandler| {
        let response = next.handle(request);
        let code = response.status_code().to_string();
        response.with_header("X-Seen-Status", &code)
    });

    let response = router.handle(Request::new("GET", "/missing"));
    assert_eq!(response.status_code(), 405);
    assert_eq!(response.header_line("X-Seen-Status"), "405");
}

#[test]
fn test_pipeline_over_dispatcher() {
    let mut table = RouteTable::new();
    table.register(
        HttpRequestMethod::Get,
        "/report",
        Target::closure(Signature::new(), |_| {
            let body = format!("[{}1]", "1,".repeat(400));
            Ok(Response::new()
                .with_header("Content-Type", "application/json")
                .with_body(Stream::from_bytes(body)))
        }),
    );

    let mut pipeline = Pipeline::new();
    pipeline.add(Compression::default());
    let chain = pipeline.build(Arc::new(Dispatcher::from_table(table)));

    let response = chain.handle(Request::new("GET", "/report").with_header("Accept-Encoding", "gzip, br"));
    assert_eq!(response.header_line("Content-Encoding"), "gzip");

    let mut decoded = String::new();
    GzDecoder::new(response.body().as_slice())
        .read_to_string(&mut decoded)
        .unwrap();
    assert!(decoded.starts_with("[1,1,"));
    assert!(decoded.ends_with("1]"));
}

#[test]
fn test_small_bodies_are_not_compressed() {
    let mut pipeline = Pipeline::new();
    pipeline.add(Compression::default());
    let chain = pipeline.build(Arc::new(FnHandler(|_request: Request| {
        Response::new().text("tiny")
    })));

    let response = chain.handle(Request::new("GET", "/").with_header("Accept-Encoding", "gzip"));
    assert!(!response.headers().contains("Content-Encoding"));
    assert_eq!(response.body().to_string_lossy(), "tiny");
}
