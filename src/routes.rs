use crate::cms::items::Audience;

/// Site pages addressable by URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    NewsList,
    NewsBySlug(String),
    NewsById(String),
    AgendaList,
    AgendaDetail(String),
    Audience(Audience),
    Page { slug: String },
    Section { slug: String, section_id: String },
    NotFound,
}

impl Route {
    /// Maps a request path (no query, no fragment) to a route. A trailing
    /// slash is ignored.
    pub fn parse(path: &str) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Home,
            ["novedades"] => Self::NewsList,
            ["novedades", "id", id] => Self::NewsById((*id).to_owned()),
            ["novedades", slug] => Self::NewsBySlug((*slug).to_owned()),
            ["agenda"] => Self::AgendaList,
            ["agenda", id] => Self::AgendaDetail((*id).to_owned()),
            ["pagina", slug] => Self::Page {
                slug: (*slug).to_owned(),
            },
            ["pagina", slug, "seccion", sid] => Self::Section {
                slug: (*slug).to_owned(),
                section_id: (*sid).to_owned(),
            },
            [segment] => Audience::from_segment(segment).map_or(Self::NotFound, Self::Audience),
            _ => Self::NotFound,
        }
    }

    pub fn href(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::NewsList => "/novedades".to_owned(),
            Self::NewsBySlug(slug) => format!("/novedades/{slug}"),
            Self::NewsById(id) => format!("/novedades/id/{id}"),
            Self::AgendaList => "/agenda".to_owned(),
            Self::AgendaDetail(id) => format!("/agenda/{id}"),
            Self::Audience(audience) => format!("/{}", audience.segment()),
            Self::Page { slug } => format!("/pagina/{slug}"),
            Self::Section { slug, section_id } => format!("/pagina/{slug}/seccion/{section_id}"),
            Self::NotFound => "/404".to_owned(),
        }
    }
}

/// Strips a trailing slash except on the root path.
pub fn normalize_path(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// Path plus optional `#fragment` (stored without the `#`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub hash: Option<String>,
}

impl Location {
    pub fn parse(href: &str) -> Self {
        let (rest, hash) = match href.split_once('#') {
            Some((rest, hash)) => (rest, Some(hash.to_owned()).filter(|h| !h.is_empty())),
            None => (href, None),
        };
        let path = rest.split_once('?').map_or(rest, |(p, _)| p);
        Self {
            path: normalize_path(path).to_owned(),
            hash,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollEffect {
    /// Bring the element with this id into view.
    Anchor(String),
    Top,
}

/// Scroll behaviour when navigating from `previous` to `next`: a fragment
/// scrolls to its anchor, a new path resets to the top.
pub fn scroll_effect(previous: Option<&Location>, next: &Location) -> Option<ScrollEffect> {
    if let Some(hash) = &next.hash {
        return Some(ScrollEffect::Anchor(hash.clone()));
    }
    match previous {
        Some(prev) if prev.path == next.path => None,
        _ => Some(ScrollEffect::Top),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_route() {
        let cases = [
            ("/", Route::Home),
            ("", Route::Home),
            ("/novedades", Route::NewsList),
            ("/novedades/becas-2026", Route::NewsBySlug("becas-2026".into())),
            ("/novedades/id/abc123", Route::NewsById("abc123".into())),
            ("/agenda/", Route::AgendaList),
            ("/agenda/7", Route::AgendaDetail("7".into())),
            ("/estudiantes", Route::Audience(Audience::Estudiantes)),
            ("/personas-graduadas", Route::Audience(Audience::PersonasGraduadas)),
            ("/pagina/ingreso", Route::Page { slug: "ingreso".into() }),
            (
                "/pagina/ingreso/seccion/12",
                Route::Section {
                    slug: "ingreso".into(),
                    section_id: "12".into(),
                },
            ),
            ("/pagina/ingreso/otra/12", Route::NotFound),
            ("/desconocido", Route::NotFound),
        ];
        for (path, expected) in cases {
            assert_eq!(Route::parse(path), expected, "path {path:?}");
        }
    }

    #[test]
    fn href_parses_back_to_the_same_route() {
        for route in [
            Route::Home,
            Route::NewsById("9".into()),
            Route::Audience(Audience::Nodocentes),
            Route::Section {
                slug: "s".into(),
                section_id: "3".into(),
            },
        ] {
            assert_eq!(Route::parse(&route.href()), route);
        }
    }

    #[test]
    fn normalizes_trailing_slashes() {
        assert_eq!(normalize_path("/pagina/x/"), "/pagina/x");
        assert_eq!(normalize_path("///"), "/");
        assert_eq!(normalize_path("/agenda"), "/agenda");
    }

    #[test]
    fn hash_scrolls_to_anchor_and_new_paths_reset() {
        let home = Location::parse("/");
        let agenda_anchor = Location::parse("/#agenda");
        assert_eq!(agenda_anchor.path, "/");
        assert_eq!(
            scroll_effect(Some(&home), &agenda_anchor),
            Some(ScrollEffect::Anchor("agenda".into()))
        );

        let detail = Location::parse("/agenda/3?from=home");
        assert_eq!(detail.path, "/agenda/3");
        assert_eq!(scroll_effect(Some(&home), &detail), Some(ScrollEffect::Top));
        assert_eq!(scroll_effect(Some(&detail), &Location::parse("/agenda/3/")), None);
        assert_eq!(scroll_effect(None, &Location::parse("/#")), Some(ScrollEffect::Top));
    }
}
