//! The trailing slash middleware itself.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::ready;
use http::header::{HeaderValue, LOCATION};
use http::{Request, Response, StatusCode};
use http_body::Body;
use pin_project::pin_project;
use tower_layer::Layer;
use tower_service::Service;

use crate::ext::{OriginalUri, ServedFile};
use crate::path;

/// Configures trailing slash redirects.
///
/// Every option has an explicit setter, so "left at its default" and
/// "explicitly disabled" never collapse into the same state:
///
/// - [`defer`](TrailingSlash::defer) (default `true`): inspect after the rest
///   of the stack has produced a response, instead of before delegating.
/// - [`chained`](TrailingSlash::chained) (default `true`): when the stack
///   already answered with a `301`, re-check *its* target and rewrite the
///   `Location` to keep the trailing slash, rather than passing it through
///   untouched.
/// - [`index`](TrailingSlash::index) (default `index.html`): the directory
///   index filename, used to tell a directory request a file server resolved
///   internally apart from a request naming the index file outright. Disable
///   with [`without_index`](TrailingSlash::without_index).
#[derive(Clone, Debug)]
pub struct TrailingSlash {
    defer: bool,
    chained: bool,
    index: Option<String>,
}

impl TrailingSlash {
    /// Creates the default configuration.
    pub fn new() -> TrailingSlash {
        TrailingSlash {
            defer: true,
            chained: true,
            index: Some("index.html".to_owned()),
        }
    }

    /// Inspect after the wrapped service has run (`true`, the default), or
    /// before delegating to it (`false`).
    ///
    /// An eager check cannot see anything the wrapped service produces, so a
    /// successful file serve no longer suppresses the redirect. The wrapped
    /// service is still invoked exactly once either way.
    pub fn defer(mut self, defer: bool) -> TrailingSlash {
        self.defer = defer;
        self
    }

    /// Cooperate with a redirect the wrapped service already staged.
    ///
    /// With `true` (the default) a `301` coming back from the stack has its
    /// `Location` re-checked for a trailing slash and rewritten if one is
    /// missing. With `false` any prior `301` passes through untouched.
    pub fn chained(mut self, chained: bool) -> TrailingSlash {
        self.chained = chained;
        self
    }

    /// Sets the directory index filename. Defaults to `index.html`.
    pub fn index(mut self, name: impl Into<String>) -> TrailingSlash {
        self.index = Some(name.into());
        self
    }

    /// Disables the directory index rule entirely; only the plain trailing
    /// slash check remains.
    pub fn without_index(mut self) -> TrailingSlash {
        self.index = None;
        self
    }

    /// Wraps a service, returning the middleware.
    pub fn wrap<S>(self, inner: S) -> TrailingSlashService<S> {
        TrailingSlashService {
            config: self,
            inner,
        }
    }
}

impl Default for TrailingSlash {
    fn default() -> TrailingSlash {
        TrailingSlash::new()
    }
}

impl<S> Layer<S> for TrailingSlash {
    type Service = TrailingSlashService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        self.clone().wrap(inner)
    }
}

/// Middleware that redirects slashless request paths to their `…/` form.
///
/// See [`TrailingSlash`] for the configuration and
/// [`trailing_slash()`](crate::trailing_slash) for the default construction.
#[derive(Clone, Debug)]
pub struct TrailingSlashService<S> {
    config: TrailingSlash,
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for TrailingSlashService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    ResBody: Body + Default,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let facts = Facts::capture(&req, &self.config);
        let action = if self.config.defer {
            Action::Inspect(facts)
        } else {
            // Eager mode decides from the request line alone; there is no
            // body or prior status to look at yet.
            Action::Overwrite(facts.early_target())
        };
        ResponseFuture {
            inner: self.inner.call(req),
            action: Some(action),
        }
    }
}

/// What the middleware remembers about the request while the rest of the
/// stack runs.
#[derive(Debug)]
struct Facts {
    /// The externally visible path the slash check applies to.
    subject: String,
    /// Raw query string, without the leading `?`.
    query: Option<String>,
    chained: bool,
    index: Option<String>,
}

impl Facts {
    fn capture<B>(req: &Request<B>, config: &TrailingSlash) -> Facts {
        let uri = req.uri();
        let visible_path = uri.path();
        let subject = match req
            .extensions()
            .get::<OriginalUri>()
            .and_then(|original| original.0.path_and_query())
        {
            Some(original) => {
                let visible_url = uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or(visible_path);
                path::external_subject(original.as_str(), visible_url, visible_path)
            }
            None => visible_path.to_owned(),
        };
        Facts {
            subject,
            query: uri.query().map(str::to_owned),
            chained: config.chained,
            index: config.index.clone(),
        }
    }

    /// Pre-delegation decision, for eager mode.
    fn early_target(&self) -> Option<String> {
        if path::missing_slash(&self.subject) {
            Some(path::with_trailing_slash(&self.subject, self.query.as_deref()))
        } else {
            None
        }
    }

    /// Post-delegation decision, for deferred mode.
    fn inspect<B>(self, res: Response<B>) -> Response<B>
    where
        B: Body + Default,
    {
        if res.status() == StatusCode::MOVED_PERMANENTLY {
            if !self.chained {
                tracing::trace!("prior redirect present and chaining disabled, passing through");
                return res;
            }
            return self.rewrite_chained(res);
        }

        // A directory request the file server resolved to the index file
        // still needs its slash; the index file requested by name does not.
        let served = res.extensions().get::<ServedFile>();
        let index_resolution = self.index.as_deref().is_some_and(|index| {
            served.is_some_and(|file| {
                file.filename() == Some(index) && path::filename(&self.subject) != index
            })
        });
        // A served file counts as a body even when it is empty.
        let no_body = served.is_none() && res.body().size_hint().exact() == Some(0);
        let settled = res.status() == StatusCode::OK && !no_body && !index_resolution;
        if settled || !path::missing_slash(&self.subject) {
            return res;
        }

        let target = path::with_trailing_slash(&self.subject, self.query.as_deref());
        tracing::debug!(location = %target, "redirecting to slash-terminated path");
        redirect(target)
    }

    /// Re-checks the target an earlier stage put in `Location`, adding the
    /// missing slash while leaving the `301` in place.
    fn rewrite_chained<B>(self, mut res: Response<B>) -> Response<B>
    where
        B: Body,
    {
        let subject = match res.headers().get(LOCATION).and_then(|v| v.to_str().ok()) {
            Some(location) => path::strip_query(location).to_owned(),
            None => return res,
        };
        if !path::missing_slash(&subject) {
            return res;
        }
        let target = path::with_trailing_slash(&subject, self.query.as_deref());
        tracing::debug!(location = %target, "rewriting upstream redirect to keep the trailing slash");
        if let Ok(location) = HeaderValue::try_from(target) {
            res.headers_mut().insert(LOCATION, location);
        }
        res
    }
}

fn redirect<B: Default>(target: String) -> Response<B> {
    let mut res = Response::new(B::default());
    *res.status_mut() = StatusCode::MOVED_PERMANENTLY;
    if let Ok(location) = HeaderValue::try_from(target) {
        res.headers_mut().insert(LOCATION, location);
    }
    res
}

/// Response future for [`TrailingSlashService`].
#[pin_project]
#[derive(Debug)]
pub struct ResponseFuture<F> {
    #[pin]
    inner: F,
    action: Option<Action>,
}

#[derive(Debug)]
enum Action {
    /// Deferred mode: decide once the rest of the stack has responded.
    Inspect(Facts),
    /// Eager mode: the decision was made before delegating.
    Overwrite(Option<String>),
}

impl<F, B, E> Future for ResponseFuture<F>
where
    F: Future<Output = Result<Response<B>, E>>,
    B: Body + Default,
{
    type Output = Result<Response<B>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let res = ready!(this.inner.poll(cx))?;
        let action = this.action.take().expect("polled after completion");
        Poll::Ready(Ok(match action {
            Action::Inspect(facts) => facts.inspect(res),
            Action::Overwrite(Some(target)) => redirect(target),
            Action::Overwrite(None) => res,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_resolve_at_construction() {
        let config = TrailingSlash::new();
        assert!(config.defer);
        assert!(config.chained);
        assert_eq!(config.index.as_deref(), Some("index.html"));

        let config = TrailingSlash::new()
            .defer(false)
            .chained(false)
            .index("default.htm");
        assert!(!config.defer);
        assert!(!config.chained);
        assert_eq!(config.index.as_deref(), Some("default.htm"));

        // disabled is a distinct state, not a funny spelling of the default
        let config = TrailingSlash::new().without_index();
        assert_eq!(config.index, None);
    }
}
