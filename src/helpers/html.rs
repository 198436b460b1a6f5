//! HTML helper functions

/// Generate the opening tag of an anchor
///
/// # Examples
/// ```ignore
/// anchor_open("https://prismic.io", true) // -> <a href="https://prismic.io" target="_blank" rel="noopener">
/// ```
pub fn anchor_open(href: &str, new_tab: bool) -> String {
    if new_tab {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener">"#,
            html_escape(href)
        )
    } else {
        format!(r#"<a href="{}">"#, html_escape(href))
    }
}

/// Generate an image tag
///
/// # Examples
/// ```ignore
/// image_tag("https://images.prismic.io/banner.png", Some("Banner"), Some("banner"))
/// ```
pub fn image_tag(src: &str, alt: Option<&str>, class: Option<&str>) -> String {
    let alt = alt.unwrap_or("");
    let class_attr = class
        .map(|c| format!(r#" class="{}""#, html_escape(c)))
        .unwrap_or_default();

    format!(
        r#"<img{} src="{}" alt="{}">"#,
        class_attr,
        html_escape(src),
        html_escape(alt)
    )
}

/// Generate a `<time>` element
pub fn time_tag(datetime: &str, display: &str) -> String {
    format!(
        r#"<time datetime="{}">{}</time>"#,
        html_escape(datetime),
        html_escape(display)
    )
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_open() {
        assert_eq!(anchor_open("/post/a", false), r#"<a href="/post/a">"#);
        assert!(anchor_open("https://x.dev", true).contains(r#"rel="noopener""#));
    }

    #[test]
    fn test_image_tag() {
        assert_eq!(
            image_tag("/banner.png", Some(r#"A "quoted" title"#), Some("banner")),
            r#"<img class="banner" src="/banner.png" alt="A &quot;quoted&quot; title">"#
        );
        assert_eq!(image_tag("/logo.svg", None, None), r#"<img src="/logo.svg" alt="">"#);
    }

    #[test]
    fn test_time_tag() {
        assert_eq!(
            time_tag("2021-03-15T19:25:28+00:00", "15 mar 2021"),
            r#"<time datetime="2021-03-15T19:25:28+00:00">15 mar 2021</time>"#
        );
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<a href='x'>&</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&lt;/a&gt;");
    }
}
