use std::collections::HashMap;

use axum::http::StatusCode;
use chrono::{Months, Utc};

use crate::agenda::{self, AgendaError, ListOptions};
use crate::cms::hero::load_home_hero_items;
use crate::cms::items::{self, Audience, Item, default_item_endpoints};
use crate::cms::news::{self, NewsItem};
use crate::cms::urls;
use crate::markup::{self, escape, safe_href};
use crate::richtext::{self, RichTextNode};
use crate::routes::{Route, normalize_path};
use crate::site::AppState;
use crate::site::components::{self, AgendaOrigin};
use crate::ui::carousel::Carousel;

pub const AGENDA_PAGE_SIZE: usize = 6;
pub const AGENDA_HOME_ITEMS: usize = 4;

/// Result of rendering a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Html {
        status: StatusCode,
        title: String,
        main: String,
    },
    Redirect(String),
}

impl PageOutcome {
    fn ok(title: impl Into<String>, main: String) -> Self {
        Self::Html {
            status: StatusCode::OK,
            title: title.into(),
            main,
        }
    }

    fn message(status: StatusCode, title: &str, message: &str) -> Self {
        Self::Html {
            status,
            title: title.to_owned(),
            main: format!(
                "<main class=\"container\"><p class=\"error\">{}</p></main>",
                escape(message)
            ),
        }
    }

    fn fetch_error(title: &str, err: &impl std::fmt::Display) -> Self {
        Self::Html {
            status: StatusCode::BAD_GATEWAY,
            title: title.to_owned(),
            main: format!(
                "<main class=\"container\">{}</main>",
                components::error_status(&err.to_string())
            ),
        }
    }
}

/// Where a CMS link on `current_path` should send the visitor, if anywhere.
///
/// External URLs always redirect. Internal paths redirect unless they point
/// back at the current page.
pub fn redirect_target(href: &str, current_path: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if urls::is_external(href) {
        return Some(href.to_owned());
    }
    let target = href.split(['?', '#']).next().unwrap_or(href);
    if normalize_path(target) == normalize_path(current_path) {
        return None;
    }
    Some(href.to_owned())
}

pub async fn render(
    state: &AppState,
    route: &Route,
    path: &str,
    query: &HashMap<String, String>,
) -> PageOutcome {
    match route {
        Route::Home => home(state, path, query).await,
        Route::NewsList => news_list(state).await,
        Route::NewsBySlug(slug) => news_detail(state, NewsKey::Slug(slug)).await,
        Route::NewsById(id) => news_detail(state, NewsKey::Id(id)).await,
        Route::AgendaList => agenda_list(state, query).await,
        Route::AgendaDetail(id) => {
            let origin = AgendaOrigin::parse(query.get("from").map(String::as_str));
            agenda_detail(state, id, origin).await
        }
        Route::Audience(audience) => items_index(state, *audience).await,
        Route::Page { slug } => page(state, slug, path).await,
        Route::Section { slug, section_id } => section(state, slug, section_id, path).await,
        Route::NotFound => {
            PageOutcome::message(StatusCode::NOT_FOUND, "No encontrado", "Página no encontrada")
        }
    }
}

async fn home(state: &AppState, path: &str, query: &HashMap<String, String>) -> PageOutcome {
    let mut carousel = Carousel::default();
    carousel.set_autoplay(true);
    let ticket = carousel.begin_load();

    let now = Utc::now();
    let agenda_window = ListOptions {
        from: Some(now),
        to: now.checked_add_months(Months::new(1)),
        page: 1,
        page_size: AGENDA_HOME_ITEMS,
    };
    let (hero, news, upcoming) = tokio::join!(
        load_home_hero_items(&state.cms),
        news::fetch_news(&state.cms),
        state.agenda.list(agenda_window),
    );

    carousel.finish_load(ticket, hero.map_err(|err| err.to_string()));
    if let Some(slide) = query.get("slide").and_then(|s| s.parse::<usize>().ok()) {
        carousel.select(slide);
    }
    let news = news.unwrap_or_else(|err| {
        tracing::error!(error = %err, "error loading novedades");
        Vec::new()
    });

    let mut main = String::from("<main>");
    main.push_str(&components::hero(&carousel, path));
    main.push_str(&components::quick_links());
    main.push_str(&components::news_home(&news));
    main.push_str(&components::newsletter());
    main.push_str(&components::agenda_home(&upcoming.items));
    main.push_str("</main>");
    PageOutcome::ok("Inicio", main)
}

async fn news_list(state: &AppState) -> PageOutcome {
    let items = match news::fetch_news(&state.cms).await {
        Ok(items) => items,
        Err(err) => return PageOutcome::fetch_error("Novedades", &err),
    };
    let mut main = String::from("<main class=\"container novedades\"><h1>Novedades</h1>");
    if items.is_empty() {
        main.push_str("<p>No hay novedades</p>");
    } else {
        main.push_str("<ul class=\"novedades-grid\">");
        for item in &items {
            main.push_str(&components::news_card(item));
        }
        main.push_str("</ul>");
    }
    main.push_str("</main>");
    PageOutcome::ok("Novedades", main)
}

enum NewsKey<'a> {
    Slug(&'a str),
    Id(&'a str),
}

async fn news_detail(state: &AppState, key: NewsKey<'_>) -> PageOutcome {
    let found = match key {
        NewsKey::Slug(slug) => match news::fetch_news_by_slug(&state.cms, slug).await {
            // Cards link by document id when an entry has no slug.
            Ok(None) => news::fetch_news_by_id(&state.cms, slug).await,
            other => other,
        },
        NewsKey::Id(id) => news::fetch_news_by_id(&state.cms, id).await,
    };
    match found {
        Ok(Some(item)) => PageOutcome::ok(item.title.clone(), news_article(&item)),
        Ok(None) => PageOutcome::message(StatusCode::NOT_FOUND, "No encontrado", "No encontrado"),
        Err(err) => PageOutcome::fetch_error("Novedades", &err),
    }
}

fn news_article(item: &NewsItem) -> String {
    let mut main = String::from("<main class=\"container\">");
    if let Some(image) = &item.image {
        main.push_str(&format!(
            "<img class=\"novedad-hero\" src=\"{}\" alt=\"{}\">",
            safe_href(&image.url),
            escape(image.alt.as_deref().unwrap_or(item.title.as_str()))
        ));
    }
    main.push_str(&format!("<h1>{}</h1>", escape(&item.title)));
    main.push_str("<article class=\"post\">");
    main.push_str(&markup::markdown_to_html(&item.body));
    main.push_str("</article></main>");
    main
}

async fn agenda_list(state: &AppState, query: &HashMap<String, String>) -> PageOutcome {
    let page = query
        .get("page")
        .and_then(|p| p.parse::<usize>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1);
    let result = state
        .agenda
        .list(ListOptions {
            page,
            page_size: AGENDA_PAGE_SIZE,
            ..ListOptions::default()
        })
        .await;

    let mut main = String::from("<main class=\"container agenda-page\"><h1>Agenda</h1>");
    if result.items.is_empty() {
        main.push_str("<p>No hay actividades</p>");
    } else {
        main.push_str("<ul class=\"agenda-list grid\">");
        for actividad in &result.items {
            main.push_str(&components::agenda_entry(actividad, AgendaOrigin::Agenda));
        }
        main.push_str("</ul>");

        let p = &result.pagination;
        main.push_str("<nav class=\"pagination\" aria-label=\"Paginación\">");
        if p.page > 1 {
            main.push_str(&format!("<a href=\"/agenda?page={}\">Anterior</a>", p.page - 1));
        } else {
            main.push_str("<span class=\"disabled\">Anterior</span>");
        }
        main.push_str(&format!("<span>Página {} de {}</span>", p.page, p.page_count));
        if p.page < p.page_count {
            main.push_str(&format!("<a href=\"/agenda?page={}\">Siguiente</a>", p.page + 1));
        } else {
            main.push_str("<span class=\"disabled\">Siguiente</span>");
        }
        main.push_str("</nav>");
    }
    main.push_str("</main>");
    PageOutcome::ok("Agenda", main)
}

async fn agenda_detail(
    state: &AppState,
    raw_id: &str,
    origin: Option<AgendaOrigin>,
) -> PageOutcome {
    let back = match origin {
        Some(AgendaOrigin::Home) => "<a href=\"/#agenda\">← Volver al inicio</a>",
        Some(AgendaOrigin::Agenda) => "<a href=\"/agenda\">← Volver a agenda</a>",
        None => "<a href=\"/agenda\">← Volver</a>",
    };
    let mut main = format!("<main class=\"container agenda-detail\"><p>{back}</p>");

    let Some(id) = raw_id.parse::<u32>().ok().filter(|id| *id > 0) else {
        main.push_str(&components::error_status("ID inválido"));
        main.push_str("</main>");
        return PageOutcome::Html {
            status: StatusCode::BAD_REQUEST,
            title: "Agenda".to_owned(),
            main,
        };
    };

    match state.agenda.get(id).await {
        Ok(actividad) => {
            let when = actividad
                .starts_at()
                .map(|dt| agenda::format_long(&dt.with_timezone(&chrono::Local)))
                .unwrap_or_default();
            main.push_str(&format!(
                "<article><h1 class=\"agenda-title\">{titulo}</h1>\
                 <p class=\"agenda-when\"><time datetime=\"{datetime}\">{when}</time></p>\
                 <p class=\"agenda-where\"><strong>Espacio:</strong> {espacio}</p>\
                 <p class=\"agenda-status\"><strong>Estado:</strong> {estado}</p></article></main>",
                titulo = escape(&actividad.titulo),
                datetime = escape(&actividad.datetime),
                when = escape(&when),
                espacio = escape(&actividad.espacio),
                estado = escape(&actividad.estado.label()),
            ));
            PageOutcome::ok(actividad.titulo, main)
        }
        Err(err @ AgendaError::NotFound(_)) => {
            main.push_str(&components::error_status(&err.to_string()));
            main.push_str("</main>");
            PageOutcome::Html {
                status: StatusCode::NOT_FOUND,
                title: "Agenda".to_owned(),
                main,
            }
        }
    }
}

fn item_card(item: &Item) -> String {
    let href = item
        .link()
        .map_or_else(|| format!("/pagina/{}", item.slug), ToOwned::to_owned);
    format!(
        "<li class=\"item item--{}\">{}</li>",
        escape(&item.estilo),
        components::card_link(
            &href,
            &item.title,
            Some(item.subtitle.as_str()),
            "h2",
            "item"
        )
    )
}

async fn items_index(state: &AppState, audience: Audience) -> PageOutcome {
    let title = audience.title();
    let items = match items::fetch_sorted_items(&state.cms, audience.endpoint()).await {
        Ok(items) => items,
        Err(err) => return PageOutcome::fetch_error(title, &err),
    };
    let mut main = format!("<main class=\"container\"><h1>{}</h1>", escape(title));
    if items.is_empty() {
        main.push_str("<p>No hay elementos.</p>");
    } else {
        main.push_str("<ul class=\"items-grid\">");
        for item in &items {
            main.push_str(&item_card(item));
        }
        main.push_str("</ul>");
    }
    main.push_str("</main>");
    PageOutcome::ok(title, main)
}

async fn resolve(state: &AppState, slug: &str) -> Option<Item> {
    items::resolve_item_by_slug(&state.cms, slug, &default_item_endpoints()).await
}

async fn page(state: &AppState, slug: &str, path: &str) -> PageOutcome {
    let Some(item) = resolve(state, slug).await else {
        return PageOutcome::message(
            StatusCode::NOT_FOUND,
            "No encontrado",
            "Página no encontrada",
        );
    };
    if let Some(target) = item.link().and_then(|href| redirect_target(href, path)) {
        return PageOutcome::Redirect(target);
    }

    let mut main = format!("<main class=\"container\"><h1>{}</h1>", escape(&item.title));
    if !item.subtitle.is_empty() {
        main.push_str(&format!("<p class=\"lead\">{}</p>", escape(&item.subtitle)));
    }
    if !item.contenido.is_empty() {
        main.push_str("<section>");
        main.push_str(&richtext::render_html(&[RichTextNode::paragraph(
            item.contenido.as_str(),
        )]));
        main.push_str("</section>");
    }

    main.push_str("<h2>Secciones</h2>");
    let sections = item.sorted_sections();
    if sections.is_empty() {
        main.push_str("<p>No hay secciones.</p>");
    } else {
        main.push_str("<ul class=\"secciones-grid\">");
        for s in sections {
            let href = s.link().map_or_else(
                || format!("/pagina/{}/seccion/{}", item.slug, s.id),
                ToOwned::to_owned,
            );
            main.push_str(&format!(
                "<li class=\"seccion seccion--{}\">{}</li>",
                escape(&s.estilo),
                components::card_link(&href, &s.title, s.subtitle.as_deref(), "h3", "seccion")
            ));
        }
        main.push_str("</ul>");
    }
    main.push_str("</main>");
    PageOutcome::ok(item.title.clone(), main)
}

async fn section(state: &AppState, slug: &str, section_id: &str, path: &str) -> PageOutcome {
    let Some(item) = resolve(state, slug).await else {
        return PageOutcome::message(
            StatusCode::NOT_FOUND,
            "No encontrado",
            "Página no encontrada",
        );
    };
    let Some(seccion) = item.section(section_id) else {
        return PageOutcome::message(StatusCode::NOT_FOUND, &item.title, "Sección no encontrada");
    };
    if let Some(target) = seccion.link().and_then(|href| redirect_target(href, path)) {
        return PageOutcome::Redirect(target);
    }

    let mut main = format!(
        "<main class=\"container\"><nav class=\"breadcrumb\"><a href=\"/pagina/{}\">{}</a> / <span>{}</span></nav>",
        escape(&item.slug),
        escape(&item.title),
        escape(&seccion.title)
    );
    main.push_str(&format!("<h1>{}</h1>", escape(&seccion.title)));
    if let Some(subtitle) = &seccion.subtitle {
        main.push_str(&format!("<p class=\"lead\">{}</p>", escape(subtitle)));
    }
    main.push_str(&richtext::render_html(&seccion.content));
    main.push_str("</main>");
    PageOutcome::ok(seccion.title.clone(), main)
}
