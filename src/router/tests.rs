use super::{Filter, PathPattern, Route, Service, StageAcceptor};
use crate::codec::{ApiError, SerializerRegistry};
use crate::dispatcher::api_not_found;
use crate::error::ConfigError;
use crate::ids::RequestId;
use crate::server::{Context, IncomingRequest, ResponseSink};
use http::{Method, Request, StatusCode};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn request(method: Method, uri: &str) -> Request<Vec<u8>> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Vec::new())
        .unwrap()
}

fn context_for(method: Method, uri: &str) -> Context {
    Context::new(
        Arc::new(IncomingRequest::from(request(method, uri))),
        Arc::new(SerializerRegistry::default()),
        RequestId::new(),
    )
}

fn items_service() -> Service {
    let mut service = Service::new("/api");
    service
        .path("/items/{id}")
        .name("Get")
        .get()
        .action(|cx| {
            let id = cx.path_var("id").unwrap_or_default().to_string();
            cx.api_response(StatusCode::OK, id)
        });
    service
}

#[test]
fn test_root_is_normalized() {
    assert_eq!(Service::new("/api").root(), "/api/");
    assert_eq!(Service::new("/api///").root(), "/api/");
    assert_eq!(Service::new("").root(), "/");

    let mut service = Service::new("/api/");
    service.path("//items");
    assert_eq!(service.routes()[0].path(), "/api/items");
}

#[test]
fn test_parameterized_path() {
    let pattern = PathPattern::compile("/items/{id}").unwrap();
    assert_eq!(pattern.as_str(), "^/items/([^/]+)$");
    assert!(pattern.is_match("/items/123"));
    assert!(!pattern.is_match("/items/123/extra"));
    assert!(!pattern.is_match("/items/"));
}

#[test]
fn test_captures_bind_in_declaration_order() {
    let pattern = PathPattern::compile("/a/{x}/b/{y}").unwrap();
    let vars = pattern.match_path("/a/1/b/2").unwrap();
    let pairs: Vec<_> = vars.iter().collect();
    assert_eq!(pairs, vec![("x", "1"), ("y", "2")]);
}

#[test]
fn test_mismatch_leaves_context_untouched() {
    let route = Route::new("/a/{x}/b/{y}");
    let mut cx = context_for(Method::GET, "/a/1/c/2");
    assert!(!route.accepts(&mut cx));
    assert!(cx.path_vars().is_none());
}

#[test]
fn test_remainder_capture_spans_segments() {
    let pattern = PathPattern::compile("/files/{path...}").unwrap();
    let vars = pattern.match_path("/files/a/b/c.txt").unwrap();
    assert_eq!(vars.get("path"), Some("a/b/c.txt"));
}

#[test]
fn test_remainder_capture_is_greedy_mid_path() {
    let pattern = PathPattern::compile("/{rest...}/tail").unwrap();
    let vars = pattern.match_path("/x/tail/y/tail").unwrap();
    assert_eq!(vars.get("rest"), Some("x/tail/y"));
}

#[test]
fn test_literal_text_is_escaped() {
    let pattern = PathPattern::compile("/v1.0/{id}").unwrap();
    assert!(pattern.is_match("/v1.0/7"));
    assert!(!pattern.is_match("/v1x0/7"));
}

#[test]
fn test_duplicate_capture_is_rejected() {
    let err = PathPattern::compile("/{id}/x/{id}").unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateCapture { ref name, .. } if name == "id"));
}

#[test]
fn test_query_string_is_not_part_of_the_path() {
    let service = items_service();
    let response = service.handle(request(Method::GET, "/api/items/9?verbose=1"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), br#""9""#);
}

#[test]
fn test_items_get_scenario() {
    let service = items_service();

    let response = service.handle(request(Method::GET, "/api/items/42"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(response.body(), br#""42""#);

    let response = service.handle(request(Method::POST, "/api/items/42"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = service.handle(request(Method::GET, "/api/items/"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_registration_order_wins() {
    let mut service = Service::new("/");
    service
        .path("/items/{id}")
        .action(|cx| cx.api_response(StatusCode::OK, "first"));
    service
        .path("/items/special")
        .action(|cx| cx.api_response(StatusCode::OK, "second"));

    let response = service.handle(request(Method::GET, "/items/special"));
    assert_eq!(response.body(), br#""first""#);
}

#[test]
fn test_empty_service_answers_plain_404() {
    let service = Service::new("/");
    let response = service.handle(request(Method::GET, "/anything"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body(), b"404 page not found\n");
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; charset=utf-8"
    );
}

#[test]
fn test_default_action_answers_structured_404() {
    let mut service = Service::new("/");
    service.default_action(api_not_found);
    let response = service.handle(request(Method::GET, "/missing"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ApiError = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body.status, 404);
    assert_eq!(body.error, "Not Found");
}

#[test]
fn test_default_handler_replaces_not_found() {
    let mut service = Service::new("/");
    service.default_handler(|_req: &IncomingRequest, sink: &mut dyn ResponseSink| {
        sink.set_status(StatusCode::GONE);
    });
    let response = service.handle(request(Method::GET, "/missing"));
    assert_eq!(response.status(), StatusCode::GONE);
}

#[test]
fn test_header_predicate() {
    let mut service = Service::new("/");
    service
        .path("/secure")
        .header("X-Token", "^abc$")
        .action(|cx| cx.api_response(StatusCode::OK, "ok"));

    let ok = Request::get("/secure")
        .header("X-Token", "abc")
        .body(Vec::new())
        .unwrap();
    assert_eq!(service.handle(ok).status(), StatusCode::OK);

    let wrong = Request::get("/secure")
        .header("X-Token", "abcd")
        .body(Vec::new())
        .unwrap();
    assert_eq!(service.handle(wrong).status(), StatusCode::NOT_FOUND);

    let missing = request(Method::GET, "/secure");
    assert_eq!(service.handle(missing).status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_missing_header_matches_as_empty_string() {
    let mut route = Route::new("/x");
    route.header("X-Optional", "^$");
    let mut cx = context_for(Method::GET, "/x");
    assert!(route.accepts(&mut cx));
}

#[test]
fn test_query_predicate_checks_every_value() {
    let mut route = Route::new("/search");
    route.query("id", r"^\d+$");

    assert!(route.accepts(&mut context_for(Method::GET, "/search?id=x&id=12")));
    assert!(!route.accepts(&mut context_for(Method::GET, "/search?id=x")));
    assert!(!route.accepts(&mut context_for(Method::GET, "/search")));
}

#[test]
fn test_invalid_filter_pattern_is_a_config_error() {
    let mut route = Route::new("/x");
    let err = route.try_header("X-Token", "(").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPattern { .. }));
}

struct CountingFilter(Arc<AtomicUsize>);

impl StageAcceptor for CountingFilter {
    fn accept(&self, _cx: &mut Context) -> bool {
        self.0.fetch_add(1, Ordering::SeqCst);
        true
    }
}

impl fmt::Display for CountingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Counting()")
    }
}

#[test]
fn test_filters_short_circuit_in_order() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut route = Route::new("/x");
    route.get().custom_filter(CountingFilter(Arc::clone(&calls)));

    assert!(!route.accepts(&mut context_for(Method::POST, "/x")));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert!(route.accepts(&mut context_for(Method::GET, "/x")));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_custom_filter_can_set_vars() {
    struct Tenant;
    impl StageAcceptor for Tenant {
        fn accept(&self, cx: &mut Context) -> bool {
            let tenant = cx.request().header("x-tenant").map(str::to_string);
            match tenant {
                Some(t) => {
                    cx.set_var("tenant", t);
                    true
                }
                None => false,
            }
        }
    }
    impl fmt::Display for Tenant {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Tenant()")
        }
    }

    let mut service = Service::new("/");
    service.path("/t").filter(Filter::custom(Tenant)).action(|cx| {
        let tenant = cx.var::<String>("tenant").cloned().unwrap_or_default();
        cx.api_response(StatusCode::OK, tenant)
    });

    let req = Request::get("/t")
        .header("X-Tenant", "acme")
        .body(Vec::new())
        .unwrap();
    let response = service.handle(req);
    assert_eq!(response.body(), br#""acme""#);
}

#[test]
fn test_route_description() {
    let mut service = Service::new("/api");
    service
        .path("/items/{id}")
        .get()
        .header("X-Token", "^abc$")
        .name("Get");
    assert_eq!(
        service.routes()[0].to_string(),
        r#"Route.Path("^/api/items/([^/]+)$").Methods([GET]).Header("X-Token", "^abc$").Named("Get")"#
    );
}

#[test]
fn test_reverse_routing() {
    let service = items_service();
    let route = service.find("Get").unwrap();
    assert_eq!(route.reverse([("id", "42")]), "/api/items/42");
    assert_eq!(route.reverse(Vec::<(&str, &str)>::new()), "/api/items/{id}");
    assert_eq!(route.reverse([("other", "1")]), "/api/items/{id}");
    assert_eq!(route.method(), Method::GET);
    assert!(service.find("Missing").is_none());
}

#[test]
fn test_reverse_leaves_remainder_placeholder() {
    let route = Route::new("/files/{path...}");
    assert_eq!(route.reverse([("path", "a/b")]), "/files/{path...}");
}

#[test]
fn test_method_requires_exactly_one() {
    let mut route = Route::new("/x");
    assert!(matches!(
        route.try_method(),
        Err(ConfigError::AmbiguousMethod { count: 0, .. })
    ));
    route.methods([Method::GET, Method::POST]);
    assert!(matches!(
        route.try_method(),
        Err(ConfigError::AmbiguousMethod { count: 2, .. })
    ));
    route.put();
    assert_eq!(route.try_method(), Ok(Method::PUT));
}

#[test]
#[should_panic(expected = "has 0 methods registered")]
fn test_method_panics_without_methods() {
    let _ = Route::new("/x").method();
}

#[test]
fn test_second_action_is_rejected() {
    let mut route = Route::new("/x");
    route.action(|cx| cx.api_response(StatusCode::OK, 1));
    let err = route
        .try_set_action(crate::dispatcher::from_fn(|cx| {
            cx.api_response(StatusCode::OK, 2)
        }))
        .unwrap_err();
    assert!(matches!(err, ConfigError::ActionAlreadySet { .. }));
}

#[test]
#[should_panic(expected = "an action has already been applied to route /x")]
fn test_second_action_panics() {
    let mut route = Route::new("/x");
    route.action(|cx| cx.api_response(StatusCode::OK, 1));
    route.action(|cx| cx.api_response(StatusCode::OK, 2));
}

#[test]
fn test_route_without_action_answers_500() {
    let mut service = Service::new("/");
    service.path("/unbound").name("Unbound");
    let response = service.handle(request(Method::GET, "/unbound"));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_declared_request_type_rejects_other_functions() {
    let mut route = Route::new("/x");
    route.api_request_type::<u32>();

    let err = route
        .try_api_typed_function(|cx: &mut Context, _body: String| {
            cx.api_response(StatusCode::OK, ())
        })
        .unwrap_err();
    assert!(matches!(err, ConfigError::RequestTypeMismatch { .. }));

    let err = route
        .try_api_function(|cx| cx.api_response(StatusCode::OK, ()))
        .unwrap_err();
    assert!(matches!(err, ConfigError::RequestTypeMismatch { .. }));

    assert!(route
        .try_api_typed_function(|cx: &mut Context, n: u32| cx.api_response(StatusCode::OK, n))
        .is_ok());
    assert!(route.has_action());
}

#[test]
fn test_typed_function_records_request_type() {
    let mut route = Route::new("/x");
    route
        .api_response_type::<String>()
        .api_typed_function(|cx: &mut Context, n: i64| cx.api_response(StatusCode::OK, n));
    assert!(route.request_type().unwrap().is::<i64>());
    assert!(route.response_type().unwrap().is::<String>());
}

#[test]
fn test_route_serves_alone() {
    let mut route = Route::new("/ping");
    route.get().action(|cx| cx.api_response(StatusCode::OK, "pong"));

    let response = route.handle(request(Method::GET, "/ping"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), br#""pong""#);

    let response = route.handle(request(Method::DELETE, "/ping"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_find_mut_binds_late() {
    let mut service = Service::new("/");
    service.path("/late").name("Late").get();
    service
        .find_mut("Late")
        .unwrap()
        .action(|cx| cx.api_response(StatusCode::ACCEPTED, "bound"));
    let response = service.handle(request(Method::GET, "/late"));
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[test]
fn test_service_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Service>();
}
