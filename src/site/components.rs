//! HTML fragments shared by the pages.

use crate::agenda::{self, Actividad};
use crate::cms::hero::HeroItem;
use crate::cms::items::Audience;
use crate::cms::news::NewsItem;
use crate::cms::urls;
use crate::markup::{escape, safe_href};
use crate::ui::carousel::{Carousel, LoadStatus};

/// Where an agenda detail link was followed from; decides its back link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgendaOrigin {
    Home,
    Agenda,
}

impl AgendaOrigin {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw? {
            "home" => Some(Self::Home),
            "agenda" => Some(Self::Agenda),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Agenda => "agenda",
        }
    }
}

/// Anchor that opens external targets in a new tab.
pub fn link(href: &str, class: &str, inner_html: &str) -> String {
    let class_attr = if class.is_empty() {
        String::new()
    } else {
        format!(" class=\"{}\"", escape(class))
    };
    if urls::is_external(href) {
        format!(
            "<a href=\"{}\"{class_attr} target=\"_blank\" rel=\"noreferrer noopener\">{inner_html}</a>",
            safe_href(href)
        )
    } else {
        format!("<a href=\"{}\"{class_attr}>{inner_html}</a>", safe_href(href))
    }
}

pub fn status(message: &str) -> String {
    format!("<p class=\"status\">{}</p>", escape(message))
}

pub fn error_status(message: &str) -> String {
    format!("<p class=\"status error\">Error: {}</p>", escape(message))
}

fn slide(item: &HeroItem, visible: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<div class=\"hero-slide\" data-id=\"{}\" data-duration-ms=\"{}\"{}>",
        escape(&item.id),
        item.duration().as_millis(),
        if visible { "" } else { " hidden" }
    ));
    if let Some(src) = &item.image_url {
        let alt = item.image_alt.as_deref().unwrap_or(item.title.as_str());
        out.push_str(&format!(
            "<img class=\"hero-img\" src=\"{}\" alt=\"{}\">",
            safe_href(src),
            escape(alt)
        ));
    }
    out.push_str("<div class=\"hero-overlay\"></div><div class=\"hero-content\">");
    match &item.href {
        Some(href) => out.push_str(&format!(
            "<h1><a href=\"{}\" target=\"_blank\" rel=\"noreferrer noopener\">{}</a></h1>",
            safe_href(href),
            escape(&item.title)
        )),
        None => out.push_str(&format!("<h1>{}</h1>", escape(&item.title))),
    }
    if let Some(subtitle) = &item.subtitle {
        out.push_str(&format!("<p class=\"subtitle\">{}</p>", escape(subtitle)));
    }
    out.push_str("</div></div>");
    out
}

/// Hero carousel. Only the current slide is visible; arrows link to the
/// neighbouring slides through `?slide=`.
pub fn hero(carousel: &Carousel, path: &str) -> String {
    match carousel.status() {
        LoadStatus::Idle | LoadStatus::Loading => {
            return format!("<section class=\"hero\">{}</section>", status("Cargando…"));
        }
        LoadStatus::Failed(message) => {
            return format!("<section class=\"hero\">{}</section>", error_status(message));
        }
        LoadStatus::Ready => {}
    }
    if carousel.current().is_none() {
        return String::new();
    }

    let autoplay_ms = carousel
        .autoplay_delay()
        .map_or_else(String::new, |d| format!(" data-autoplay-ms=\"{}\"", d.as_millis()));
    let mut out = format!(
        "<section class=\"hero\" data-index=\"{}\"{autoplay_ms}><div class=\"hero-media\">",
        carousel.index()
    );
    for (i, item) in carousel.items().iter().enumerate() {
        out.push_str(&slide(item, i == carousel.index()));
    }
    if carousel.len() > 1 {
        let path = escape(path);
        let mut prev = carousel.clone();
        prev.go(-1);
        let mut next = carousel.clone();
        next.go(1);
        out.push_str(&format!(
            "<a class=\"nav prev\" aria-label=\"Anterior\" href=\"{path}?slide={}\">‹</a>\
             <a class=\"nav next\" aria-label=\"Siguiente\" href=\"{path}?slide={}\">›</a>",
            prev.index(),
            next.index()
        ));
    }
    out.push_str("</div></section>");
    out
}

pub fn quick_links() -> String {
    let mut out =
        String::from("<section class=\"quick-links-hero\"><ul class=\"ql-list-hero\" aria-label=\"Accesos rápidos\">");
    for audience in Audience::ALL {
        out.push_str(&format!(
            "<li><a href=\"/{}\" class=\"ql-item ql-{}\"><span class=\"ql-label\">{}</span></a></li>",
            audience.segment(),
            audience.segment(),
            escape(&audience.title().to_uppercase())
        ));
    }
    out.push_str("</ul></section>");
    out
}

pub fn news_card(item: &NewsItem) -> String {
    let mut inner = String::new();
    if let Some(src) = item.thumbnail_url() {
        let alt = item
            .image
            .as_ref()
            .and_then(|i| i.alt.as_deref())
            .unwrap_or(item.title.as_str());
        inner.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\">",
            safe_href(src),
            escape(alt)
        ));
    }
    inner.push_str(&format!(
        "<div class=\"novedad-body\"><span class=\"chip\">{}</span><h3 class=\"novedad-title\">{}</h3></div>",
        escape(item.category_label()),
        escape(&item.title)
    ));
    format!(
        "<li class=\"novedad-card\">{}</li>",
        link(&format!("/novedades/{}", item.link_key()), "novedad-link", &inner)
    )
}

/// News block on the home page: the first three entries.
pub fn news_home(items: &[NewsItem]) -> String {
    let mut out = String::from(
        "<section class=\"container novedades\"><div class=\"section-header\"><h2>Novedades</h2>\
         <a href=\"/novedades\" class=\"see-all\">Ver todas</a></div>",
    );
    if items.is_empty() {
        out.push_str("<p>No hay novedades</p>");
    } else {
        out.push_str("<ul class=\"novedades-grid\">");
        for item in items.iter().take(3) {
            out.push_str(&news_card(item));
        }
        out.push_str("</ul>");
    }
    out.push_str("</section>");
    out
}

pub fn agenda_entry(actividad: &Actividad, origin: AgendaOrigin) -> String {
    let when = actividad
        .starts_at()
        .map(|dt| agenda::format_short(&dt.with_timezone(&chrono::Local)))
        .unwrap_or_default();
    format!(
        "<li class=\"agenda-item estado-{estado}\"><a href=\"/agenda/{id}?from={from}\" class=\"agenda-link\">\
         <div class=\"agenda-date\"><time datetime=\"{datetime}\">{when}</time></div>\
         <div class=\"agenda-info\"><h3 class=\"agenda-title\">{titulo}</h3>\
         <p class=\"agenda-meta\">{espacio} • {label}</p></div></a></li>",
        estado = actividad.estado.as_str(),
        id = actividad.id,
        from = origin.as_str(),
        datetime = escape(&actividad.datetime),
        when = escape(&when),
        titulo = escape(&actividad.titulo),
        espacio = escape(&actividad.espacio),
        label = escape(&actividad.estado.label()),
    )
}

/// Upcoming activities laid out in columns of two.
pub fn agenda_home(items: &[Actividad]) -> String {
    let mut out = String::from(
        "<section id=\"agenda\" class=\"container agenda-home\"><div class=\"section-header\"><h2>Agenda</h2>\
         <a href=\"/agenda\" class=\"see-all\">Ver todas</a></div>",
    );
    if items.is_empty() {
        out.push_str("<p>No hay actividades en el próximo mes</p>");
    } else {
        out.push_str("<ul class=\"agenda-cols\">");
        for pair in items.chunks(2) {
            out.push_str("<li class=\"agenda-col\"><ul class=\"agenda-col-list\">");
            for actividad in pair {
                out.push_str(&agenda_entry(actividad, AgendaOrigin::Home));
            }
            out.push_str("</ul></li>");
        }
        out.push_str("</ul>");
    }
    out.push_str("</section>");
    out
}

pub fn newsletter() -> String {
    "<div class=\"newsletter-parallax\"><div class=\"newsletter-content\">\
     <h2>Registrate al boletín de difusión</h2>\
     <a class=\"newsletter-button\" href=\"#newsletter\">Registrate</a></div></div>"
        .to_owned()
}

/// Title plus optional subtitle, wrapped in a link to `href`.
pub fn card_link(
    href: &str,
    title: &str,
    subtitle: Option<&str>,
    heading: &str,
    block: &str,
) -> String {
    let mut inner = format!(
        "<{heading} class=\"{block}__title\">{}</{heading}>",
        escape(title)
    );
    if let Some(subtitle) = subtitle.filter(|s| !s.is_empty()) {
        inner.push_str(&format!(
            "<p class=\"{block}__subtitle\">{}</p>",
            escape(subtitle)
        ));
    }
    link(href, "", &inner)
}
