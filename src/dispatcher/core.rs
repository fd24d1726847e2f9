use crate::server::{write_text_error, Context, IncomingRequest, Response, ResponseSink};
use http::StatusCode;
use std::sync::Arc;

/// The terminal behaviour of a route: turn a matched request into a pending response.
pub type Action = Arc<dyn Fn(&mut Context) -> Response + Send + Sync>;

/// A raw HTTP handler that writes straight to the sink.
pub trait Handler: Send + Sync {
    fn serve_http(&self, request: &IncomingRequest, sink: &mut dyn ResponseSink);
}

impl<F> Handler for F
where
    F: Fn(&IncomingRequest, &mut dyn ResponseSink) + Send + Sync,
{
    fn serve_http(&self, request: &IncomingRequest, sink: &mut dyn ResponseSink) {
        self(request, sink);
    }
}

/// Plain-text `404 page not found`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFound;

impl Handler for NotFound {
    fn serve_http(&self, _request: &IncomingRequest, sink: &mut dyn ResponseSink) {
        write_text_error(sink, StatusCode::NOT_FOUND, "404 page not found");
    }
}

/// Wrap a raw handler; it runs when the response is written, not when the action runs.
pub fn from_handler(handler: Arc<dyn Handler>) -> Action {
    Arc::new(move |cx: &mut Context| {
        let handler = Arc::clone(&handler);
        let request = cx.request_arc();
        Response::new(move |sink| handler.serve_http(&request, sink))
    })
}

/// Wrap a plain `(Context) -> Response` function.
pub fn from_fn<F>(f: F) -> Action
where
    F: Fn(&mut Context) -> Response + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Action answering with a structured 404 in the negotiated content type.
pub fn api_not_found(cx: &mut Context) -> Response {
    cx.api_error(StatusCode::NOT_FOUND, "Not Found")
}
