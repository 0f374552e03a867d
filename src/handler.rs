//! Handler traits and type erasure.
//!
//! Route handlers and error handlers are plain async functions of different
//! concrete types. Both kinds are stored behind one object-safe trait,
//! [`Erased`], parameterised by what the function is called with:
//!
//! ```text
//! async fn hello(req: Request) -> String { … }
//!        ↓ router.get("/<name>", "hello", hello)
//! Arc::new(Route(hello))                       : Arc<dyn Erased<Request>>
//!        ↓ at request time
//! handler.call(req)                            → BoxFuture<Response>
//!
//! async fn page_not_found(req: Request, err: HttpError) -> … { … }
//!        ↓ builder.on_error(StatusCode::NOT_FOUND, page_not_found)
//! Arc::new(Recover(page_not_found))            : Arc<dyn Erased<(Request, HttpError)>>
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::HttpError;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

#[doc(hidden)]
pub trait Erased<A>: Send + Sync + 'static {
    fn call(&self, args: A) -> BoxFuture;
}

#[doc(hidden)]
pub type BoxedHandler = Arc<dyn Erased<Request>>;

#[doc(hidden)]
pub type BoxedErrorHandler = Arc<dyn Erased<(Request, HttpError)>>;

/// Implemented for every valid route handler:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// Sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed<Request> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// Implemented for every valid error handler:
///
/// ```text
/// async fn name(req: Request, err: HttpError) -> impl IntoResponse
/// ```
pub trait ErrorHandler: private::Sealed<(Request, HttpError)> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_error_handler(self) -> BoxedErrorHandler;
}

mod private {
    pub trait Sealed<A> {}
}

struct Route<F>(F);

struct Recover<F>(F);

impl<F, Fut, R> private::Sealed<Request> for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(Route(self))
    }
}

impl<F, Fut, R> Erased<Request> for Route<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

impl<F, Fut, R> private::Sealed<(Request, HttpError)> for F
where
    F: Fn(Request, HttpError) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> ErrorHandler for F
where
    F: Fn(Request, HttpError) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_error_handler(self) -> BoxedErrorHandler {
        Arc::new(Recover(self))
    }
}

impl<F, Fut, R> Erased<(Request, HttpError)> for Recover<F>
where
    F: Fn(Request, HttpError) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, (req, err): (Request, HttpError)) -> BoxFuture {
        let fut = (self.0)(req, err);
        // The handler's own response replaces the error page outright.
        Box::pin(async move {
            let mut response = fut.await.into_response();
            response.abort = None;
            response
        })
    }
}
