use pulldown_cmark::{Options, Parser};

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders CMS markdown to an HTML fragment.
///
/// Inline HTML from editors is kept, then the whole fragment goes through an
/// allow-list sanitizer: scripts, event handlers and `javascript:` URLs are
/// stripped from both raw HTML and markdown links or images.
pub fn markdown_to_html(md: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, Parser::new_ext(md, options));
    ammonia::Builder::default().clean(&html).to_string()
}

/// `href` value safe to emit: script-ish schemes are replaced by `#`.
pub fn safe_href(href: &str) -> String {
    let lower = href.trim().to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("data:")
        || lower.starts_with("vbscript:")
    {
        return "#".to_owned();
    }
    escape(href.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_attribute_delimiters() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn markdown_renders_gfm_features() {
        let html = markdown_to_html(
            "# Título\n\n~~viejo~~ **nuevo**\n\n| a | b |\n|---|---|\n| 1 | 2 |\n",
        );
        assert!(html.contains("<h1>Título</h1>"));
        assert!(html.contains("<del>viejo</del>"));
        assert!(html.contains("<strong>nuevo</strong>"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn markdown_keeps_safe_html_and_drops_scripts() {
        let html = markdown_to_html(
            "Hola <b>negrita</b> <script>alert(1)</script>\n\n<div onclick=\"x\">y</div>\n",
        );
        assert!(html.contains("<b>negrita</b>"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("alert(1)"));
        assert!(!html.contains("onclick"));
        assert!(html.contains("<div>y</div>"));
    }

    #[test]
    fn markdown_links_cannot_carry_script_urls() {
        let html = markdown_to_html(
            "[clic](javascript:alert(document.cookie)) ![i](javascript:x) [ok](/agenda) [siu](https://siu.uncoma.edu.ar)",
        );
        assert!(!html.contains("javascript:"));
        assert!(html.contains(">clic</a>"));
        assert!(html.contains("href=\"/agenda\""));
        assert!(html.contains("href=\"https://siu.uncoma.edu.ar\""));
    }

    #[test]
    fn safe_href_blocks_script_schemes() {
        assert_eq!(safe_href("javascript:alert(1)"), "#");
        assert_eq!(safe_href(" /agenda?page=2&x=1 "), "/agenda?page=2&amp;x=1");
    }
}
