//! Middleware that adds trailing slashes to request paths.
//!
//! Requests for `/foo` are answered with a `301 Moved Permanently` pointing at
//! `/foo/` (query string preserved), unless the rest of the stack already
//! produced a real response for the slashless path. The middleware cooperates
//! with static file serving: a directory request that a file server resolved
//! to its `index.html` is still redirected to the slash-terminated directory,
//! while a request naming `index.html` outright is left alone. It also
//! cooperates with redirects staged by neighboring middleware, rewriting
//! their `Location` to keep the trailing slash instead of stacking a second
//! redirect on top.
//!
//! Mount and prefix remapping middleware can record the request line it saw
//! with the [`OriginalUri`] extension, so redirect targets are built from the
//! path the client actually requested rather than an internally rewritten
//! one. File servers record what they resolved with the [`ServedFile`]
//! response extension.
//!
//! # Example
//!
//! ```
//! use tower_trailing_slash::trailing_slash;
//!
//! // Deferred by default: the decision is made after the rest of the stack
//! // has run, so a successful response for the slashless path suppresses
//! // the redirect.
//! let middleware = trailing_slash();
//!
//! // Or check the request line up front, and treat `default.htm` as the
//! // directory index.
//! let eager = trailing_slash().defer(false).index("default.htm");
//! # let _ = (middleware, eager);
//! ```
//!
//! Wrap a service directly with [`TrailingSlash::wrap`], or stack it with the
//! [`tower_layer::Layer`] implementation.

#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

mod ext;
mod normalize;
mod path;

pub use self::ext::{OriginalUri, ServedFile};
pub use self::normalize::{ResponseFuture, TrailingSlash, TrailingSlashService};

/// Creates the middleware with its default configuration: deferred
/// inspection, prior redirects honored, `index.html` as the directory index.
pub fn trailing_slash() -> TrailingSlash {
    TrailingSlash::new()
}
