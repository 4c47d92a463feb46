use url::Url;

/// Media base used to absolutize upload paths returned by the CMS.
///
/// An explicit override wins. Otherwise the API URL is reused with a trailing
/// `/api` segment dropped, so `https://host/strapi/api` serves media from
/// `https://host/strapi`. Returns an empty string when nothing usable is set.
pub fn files_base(override_url: Option<&str>, api_url: Option<&str>) -> String {
    if let Some(base) = override_url.map(str::trim).filter(|v| !v.is_empty()) {
        return base.trim_end_matches('/').to_owned();
    }

    let Some(api) = api_url.map(str::trim).filter(|v| !v.is_empty()) else {
        return String::new();
    };
    let Ok(parsed) = Url::parse(api) else {
        return String::new();
    };

    let mut path = parsed.path().trim_end_matches('/').to_owned();
    if let Some(stripped) = path.strip_suffix("/api") {
        path = stripped.to_owned();
    }

    let origin = parsed.origin().ascii_serialization();
    format!("{origin}{path}").trim_end_matches('/').to_owned()
}

pub fn with_base_url(files_base: &str, path: &str) -> String {
    if path.is_empty() || path.starts_with("http") || files_base.is_empty() {
        return path.to_owned();
    }
    if path.starts_with('/') {
        format!("{files_base}{path}")
    } else {
        format!("{files_base}/{path}")
    }
}

/// Makes a CMS-provided link usable as an `href`.
///
/// Site-relative paths, fragments, queries and anything that already carries a
/// scheme are kept. Bare hosts such as `www.uncoma.edu.ar/x` get `https://`.
pub fn normalize_url(raw: &str) -> String {
    let link = raw.trim();
    if link.is_empty() {
        return "#".to_owned();
    }
    if link.starts_with('/') || link.starts_with('#') || link.starts_with('?') {
        return link.to_owned();
    }
    if has_scheme(link) {
        return link.to_owned();
    }
    format!("https://{link}")
}

pub fn is_external(href: &str) -> bool {
    let lower = href.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn has_scheme(link: &str) -> bool {
    let Some((scheme, _)) = link.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_alpha
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        && !scheme.contains('.')
}
