use url::Url;

/// Longest common ancestor directory of `urls`, compared segment by segment.
///
/// The result keeps the scheme and authority of the first URL, drops query and fragment, and
/// always ends in a slash. Returns `None` for an empty slice or a URL without a hierarchical
/// path (such as `data:`).
pub fn common_directory(urls: &[Url]) -> Option<Url> {
    let (first, rest) = urls.split_first()?;
    let mut common = directory_segments(first)?;

    for url in rest {
        let segments = directory_segments(url)?;
        let shared = common
            .iter()
            .zip(&segments)
            .take_while(|(left, right)| left == right)
            .count();
        common.truncate(shared);
    }

    let path = if common.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", common.join("/"))
    };

    let mut directory = first.clone();
    directory.set_query(None);
    directory.set_fragment(None);
    directory.set_path(&path);
    Some(directory)
}

fn directory_segments(url: &Url) -> Option<Vec<&str>> {
    let mut segments: Vec<&str> = url.path_segments()?.collect();
    segments.pop();
    Some(segments)
}

#[cfg(test)]
mod tests {
    use super::common_directory;
    use url::Url;

    fn directory(values: &[&str]) -> Option<String> {
        let urls: Vec<Url> = values.iter().map(|value| Url::parse(value).unwrap()).collect();
        common_directory(&urls).map(String::from)
    }

    #[test]
    fn single_page_uses_its_own_directory() {
        assert_eq!(
            directory(&["https://example.com/docs/index.html?x=1#top"]).as_deref(),
            Some("https://example.com/docs/")
        );
    }

    #[test]
    fn compares_whole_segments_not_characters() {
        assert_eq!(
            directory(&[
                "file:///site/app/index.html",
                "file:///site/apple/index.html",
            ])
            .as_deref(),
            Some("file:///site/")
        );
    }

    #[test]
    fn falls_back_to_origin_root() {
        assert_eq!(
            directory(&["https://example.com/a/x.html", "https://example.com/b/y.html"]).as_deref(),
            Some("https://example.com/")
        );
    }

    #[test]
    fn rejects_empty_and_opaque_inputs() {
        assert_eq!(directory(&[]), None);
        assert_eq!(directory(&["data:text/html,hello"]), None);
    }
}
