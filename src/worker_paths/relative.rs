use url::Url;

/// Reference to `to` as written inside the document at `from`.
///
/// Uses a relative reference when both URLs share scheme and authority, the absolute URL
/// otherwise.
pub fn relative_href(from: &Url, to: &Url) -> String {
    from.make_relative(to)
        .filter(|href| !href.is_empty())
        .unwrap_or_else(|| to.to_string())
}

/// Root-relative reference to `target` below a canonical public root such as `/my-app`.
///
/// Targets inside the graph root keep their path relative to it; targets elsewhere keep their
/// own path.
pub fn root_relative_href(canonical_root: &str, graph_root: &Url, target: &Url) -> String {
    let root = graph_root.as_str();
    let path = root
        .ends_with('/')
        .then(|| target.as_str().strip_prefix(root))
        .flatten()
        .unwrap_or_else(|| target.path().trim_start_matches('/'));

    format!("{}/{}", canonical_root.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(value: &str) -> Url {
        Url::parse(value).unwrap()
    }

    #[test]
    fn relative_to_sibling_and_parent_directories() {
        let worker = url("file:///site/path/to/index-precache-service-worker.js");
        assert_eq!(relative_href(&worker, &url("file:///site/path/to/foo.png")), "foo.png");
        assert_eq!(relative_href(&worker, &url("file:///site/foo.png")), "../../foo.png");
    }

    #[test]
    fn cross_origin_targets_stay_absolute() {
        let worker = url("https://example.com/sw.js");
        assert_eq!(
            relative_href(&worker, &url("https://cdn.example.com/lib.js")),
            "https://cdn.example.com/lib.js"
        );
    }

    #[test]
    fn prefixes_canonical_root() {
        let root = url("file:///site/");
        let target = url("file:///site/index-otherpage-precache-service-worker.js");
        assert_eq!(
            root_relative_href("/my-app", &root, &target),
            "/my-app/index-otherpage-precache-service-worker.js"
        );
        assert_eq!(root_relative_href("/my-app/", &root, &url("file:///site/foo.png")), "/my-app/foo.png");
        assert_eq!(root_relative_href("", &root, &url("file:///site/a/b.css")), "/a/b.css");
    }

    #[test]
    fn targets_outside_the_root_keep_their_path() {
        let root = url("file:///site/");
        assert_eq!(
            root_relative_href("/my-app", &root, &url("https://example.com/blah.html")),
            "/my-app/blah.html"
        );
    }
}
