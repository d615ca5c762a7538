//! Path string helpers.

/// Returns the final segment of `path`, treating both `/` and `\` as
/// separators.
pub(crate) fn filename(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(at) => &path[at + 1..],
        None => path,
    }
}

/// The path portion of `url`, query excluded.
pub(crate) fn strip_query(url: &str) -> &str {
    match url.find('?') {
        Some(at) => &url[..at],
        None => url,
    }
}

/// Whether a slash still needs to be appended.
pub(crate) fn missing_slash(path: &str) -> bool {
    !path.ends_with('/')
}

/// Rebuilds the externally visible subject path when an upstream stage has
/// remapped the request under a mount prefix.
///
/// `original` is the pre-remap path+query, `visible_url` and `visible_path`
/// are what this stage currently sees. When the original request line ends
/// with the visible url, everything in front of that suffix is the mount
/// prefix and gets spliced back in front of the visible path. Otherwise the
/// remap replaced the tail outright and the original request line (query
/// stripped) wins.
pub(crate) fn external_subject(original: &str, visible_url: &str, visible_path: &str) -> String {
    if original == visible_url {
        return visible_path.to_owned();
    }
    match original.strip_suffix(visible_url) {
        Some(base) => {
            let mut subject = String::with_capacity(base.len() + visible_path.len());
            subject.push_str(base);
            subject.push_str(visible_path);
            subject
        }
        None => strip_query(original).to_owned(),
    }
}

/// Appends the trailing slash and splices the query back on. An empty
/// subject becomes `/`, never `//`.
pub(crate) fn with_trailing_slash(subject: &str, query: Option<&str>) -> String {
    let mut target = String::with_capacity(subject.len() + 1 + query.map_or(0, |q| q.len() + 1));
    target.push_str(subject);
    if !target.ends_with('/') {
        target.push('/');
    }
    if let Some(query) = query {
        target.push('?');
        target.push_str(query);
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_takes_the_last_segment() {
        assert_eq!(filename("/some/path/that/is/served/index.html"), "index.html");
        assert_eq!(filename("C:\\www\\index.html"), "index.html");
        assert_eq!(filename("index.html"), "index.html");
        assert_eq!(filename("/dir/"), "");
    }

    #[test]
    fn strip_query_cuts_at_the_first_question_mark() {
        assert_eq!(strip_query("/foo?hello=world"), "/foo");
        assert_eq!(strip_query("/foo?a=1?b=2"), "/foo");
        assert_eq!(strip_query("/foo"), "/foo");
        assert_eq!(strip_query(""), "");
    }

    #[test]
    fn subject_keeps_the_mount_prefix() {
        // no remap
        assert_eq!(external_subject("/foo", "/foo", "/foo"), "/foo");
        // mounted under /bar
        assert_eq!(external_subject("/bar/foo", "/foo", "/foo"), "/bar/foo");
        assert_eq!(external_subject("/bar/foo?a=b", "/foo?a=b", "/foo"), "/bar/foo");
        // mounted at the root itself
        assert_eq!(external_subject("/bar", "/", "/"), "/bar");
        assert_eq!(external_subject("/bar/", "/", "/"), "/bar/");
        // remap replaced the tail, trust the original request line
        assert_eq!(external_subject("/foo?a=b", "/elsewhere", "/elsewhere"), "/foo");
    }

    #[test]
    fn trailing_slash_splices_the_query_back_on() {
        assert_eq!(with_trailing_slash("/foo", None), "/foo/");
        assert_eq!(with_trailing_slash("/foo", Some("hello=world")), "/foo/?hello=world");
        assert_eq!(with_trailing_slash("", None), "/");
        assert_eq!(with_trailing_slash("", Some("a=b")), "/?a=b");
    }
}
