use std::collections::BTreeSet;

use url::Url;

/// File name of a page with its last extension stripped.
///
/// Directory URLs (an empty file name) are named `index`, after the document a server would
/// serve for them.
pub fn page_base_name(url: &Url) -> String {
    let file_name = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };

    if stem.is_empty() {
        "index".to_string()
    } else {
        stem.to_string()
    }
}

/// Base name for a worker shared by `urls`.
///
/// Page base names are joined with `-` in the order supplied. A base name that already
/// contributed a fragment is skipped, so `index.html` and `somewhereelse/index.html` produce
/// `index` rather than `index-index`.
pub fn group_base_name(urls: &[Url]) -> String {
    let mut seen = BTreeSet::new();
    let mut fragments = Vec::new();

    for url in urls {
        let base = page_base_name(url);
        if seen.insert(base.clone()) {
            fragments.push(base);
        }
    }

    fragments.join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(value: &str) -> Url {
        Url::parse(value).unwrap()
    }

    #[test]
    fn strips_only_the_last_extension() {
        assert_eq!(page_base_name(&url("file:///site/index.html")), "index");
        assert_eq!(page_base_name(&url("file:///site/app.min.html")), "app.min");
        assert_eq!(page_base_name(&url("file:///site/README")), "README");
        assert_eq!(page_base_name(&url("file:///site/.hidden")), ".hidden");
    }

    #[test]
    fn names_directory_urls_index() {
        assert_eq!(page_base_name(&url("https://example.com/")), "index");
    }

    #[test]
    fn joins_fragments_in_supplied_order() {
        let urls = [url("file:///site/otherpage.html"), url("file:///site/index.html")];
        assert_eq!(group_base_name(&urls), "otherpage-index");
    }

    #[test]
    fn repeated_base_names_contribute_once() {
        let urls = [
            url("file:///site/index.html"),
            url("file:///site/somewhereelse/index.html"),
        ];
        assert_eq!(group_base_name(&urls), "index");
    }
}
