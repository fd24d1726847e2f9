use crate::dispatcher::Action;
use crate::server::{Context, Response};
use http::StatusCode;
use serde::de::DeserializeOwned;
use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Name and identity of a request or response body type declared on a route.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    name: &'static str,
    id: TypeId,
}

impl TypeDescriptor {
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Adapt a function that takes no request body.
pub fn api_function<F>(f: F) -> Action
where
    F: Fn(&mut Context) -> Response + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Adapt a function taking the request body decoded as `T`.
///
/// The body is decoded with the codec for the negotiated content type
/// (the registry's default when the request states none). If decoding fails
/// the function is not called and a 400 [`ApiError`](crate::codec::ApiError)
/// is returned instead.
pub fn api_typed_function<T, F>(f: F) -> Action
where
    T: DeserializeOwned + 'static,
    F: Fn(&mut Context, T) -> Response + Send + Sync + 'static,
{
    Arc::new(move |cx: &mut Context| {
        let content_type = cx.infer_content_type(Some(cx.registry().default_content_type()));
        match cx.registry().decode_request::<T>(cx.request(), &content_type) {
            Ok(body) => f(cx, body),
            Err(e) => {
                warn!(
                    request_id = %cx.request_id(),
                    content_type = %content_type,
                    body_type = type_name::<T>(),
                    error = %e,
                    "Request body decode failed"
                );
                cx.api_error(StatusCode::BAD_REQUEST, e.to_string())
            }
        }
    })
}
