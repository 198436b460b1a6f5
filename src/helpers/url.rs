//! URL helper functions

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters left untouched when encoding a URL component (RFC 3986 unreserved)
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/post/hello/") // -> "https://example.com/blog/post/hello/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Link to a post page
pub fn post_url(config: &SiteConfig, slug: &str) -> String {
    url_for(config, &format!("post/{}", encode_url(slug)))
}

/// Link to a static continuation page of the listing
pub fn page_json_url(config: &SiteConfig, page: usize) -> String {
    url_for(config, &format!("page/{}.json", page))
}

/// Link to the load-more endpoint for a CMS continuation URL
pub fn load_more_url(config: &SiteConfig, cursor: &str) -> String {
    format!(
        "{}?cursor={}",
        url_for(config, "api/posts"),
        encode_url(cursor)
    )
}

/// Encode a URL component
pub fn encode_url(path: &str) -> String {
    percent_encoding::utf8_percent_encode(path, COMPONENT).to_string()
}

/// Whether a slug is safe to use as a route segment and directory name
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            url: "https://example.com".to_string(),
            root: "/blog/".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/css/style.css"), "/blog/css/style.css");
        assert_eq!(url_for(&config, ""), "/blog/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/post/hello"),
            "https://example.com/blog/post/hello"
        );
    }

    #[test]
    fn test_post_url() {
        let config = SiteConfig::default();
        assert_eq!(post_url(&config, "como-utilizar-hooks"), "/post/como-utilizar-hooks");
        assert_eq!(page_json_url(&config, 2), "/page/2.json");
    }

    #[test]
    fn test_load_more_url() {
        let config = SiteConfig::default();
        assert_eq!(
            load_more_url(&config, "https://x.io/api?page=2"),
            "/api/posts?cursor=https%3A%2F%2Fx.io%2Fapi%3Fpage%3D2"
        );
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("como-utilizar-hooks"));
        assert!(!is_valid_slug(".."));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("a/b"));
    }
}
