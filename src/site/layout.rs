use std::collections::HashMap;

use chrono::Datelike;

use crate::cms::menu::MenuGroup;
use crate::markup::escape;
use crate::site::components::link;
use crate::ui::header::HeaderState;
use crate::ui::store::{HeaderMode, MenuOpen, Store};

/// Everything around a page body, shared by every route.
#[derive(Debug, Clone)]
pub struct Chrome {
    pub path: String,
    pub menu: Vec<MenuGroup>,
    pub header: HeaderState,
    pub header_mode: Store<HeaderMode>,
    pub menu_open: MenuOpen,
}

impl Chrome {
    pub fn new(path: &str, menu: Vec<MenuGroup>) -> Self {
        Self {
            path: path.to_owned(),
            menu,
            header: HeaderState::new(),
            header_mode: Store::default(),
            menu_open: MenuOpen::default(),
        }
    }

    /// Applies UI state carried in the query string: `menu=abierto` opens the
    /// mobile menu and `desplegable=<grupo>` expands that menu group.
    pub fn apply_query(&mut self, query: &HashMap<String, String>) {
        self.menu_open
            .set(query.get("menu").is_some_and(|v| v == "abierto"));
        if let Some(group) = query.get("desplegable")
            && self.menu.iter().any(|g| &g.title == group)
        {
            self.header.toggle_dropdown(group);
        }
    }
}

fn menu_links(group: &MenuGroup, link_class: &str, section_class: &str, title_tag: &str) -> String {
    let mut out = String::new();
    for section in &group.sections {
        out.push_str(&format!(
            "<div class=\"{section_class}\"><{title_tag} class=\"section-title\">{}</{title_tag}><ul>",
            escape(&section.title)
        ));
        for item in &section.items {
            out.push_str(&format!(
                "<li>{}</li>",
                link(&item.href, link_class, &escape(&item.title))
            ));
        }
        out.push_str("</ul></div>");
    }
    out
}

pub fn header(chrome: &Chrome) -> String {
    let mut state = chrome.header.clone();
    if chrome.menu_open.get() != state.is_mobile_menu_open() {
        state.toggle_mobile_menu();
    }
    let mode = chrome.header_mode.get();

    let mut out = format!(
        "<header class=\"{} {}\"><div class=\"header-container\">\
         <a href=\"/\" class=\"brand\"><img src=\"/static/logo.png\" alt=\"CRUB\"></a>",
        state.classes(),
        mode.as_class()
    );
    out.push_str(&format!(
        "<nav class=\"header-nav{}\"><ul class=\"nav-list\">",
        if state.is_mobile_menu_open() { " open" } else { "" }
    ));
    for group in &chrome.menu {
        let expanded = state.open_dropdown() == Some(group.title.as_str());
        out.push_str(&format!(
            "<li class=\"nav-item{}\"><details class=\"dropdown\"{}><summary class=\"nav-link dropdown-trigger\">{}</summary>\
             <div class=\"dropdown-content\">",
            if expanded { " expanded" } else { "" },
            if expanded { " open" } else { "" },
            escape(&group.title)
        ));
        out.push_str(&menu_links(group, "dropdown-link", "dropdown-section", "div"));
        out.push_str("</div></details></li>");
    }
    out.push_str("</ul></nav></div></header>");
    out
}

/// Floating toggle for the navigation, bound to the shared menu-open flag.
pub fn menu_button(chrome: &Chrome) -> String {
    let open = chrome.menu_open.get();
    let (label, next) = if open {
        ("Cerrar menú", "cerrado")
    } else {
        ("Abrir menú", "abierto")
    };
    format!(
        "<a class=\"floating-menu-btn\" href=\"{}?menu={next}\" aria-label=\"{label}\" aria-expanded=\"{open}\">{}</a>",
        escape(&chrome.path),
        if open { "✕" } else { "☰" }
    )
}

pub fn footer(menu: &[MenuGroup]) -> String {
    let mut out = String::from("<footer class=\"footer\"><div class=\"footer-container\"><nav class=\"footer-nav\">");
    for group in menu {
        out.push_str(&format!(
            "<div class=\"footer-group\"><h3 class=\"footer-group-title\">{}</h3>",
            escape(&group.title)
        ));
        out.push_str(&menu_links(group, "footer-link", "footer-section", "h4"));
        out.push_str("</div>");
    }
    out.push_str("</nav>");
    out.push_str(
        "<div class=\"footer-bottom-info\"><div class=\"footer-contact\">\
         <h3 class=\"footer-contact-title\">Contacto</h3><div class=\"footer-contact-info\">\
         <p><strong>Centro Regional Universitario Bariloche</strong></p>\
         <p>Universidad Nacional del Comahue</p>\
         <p>Quintral 1250 - San Carlos de Bariloche</p>\
         <p>Río Negro - Argentina (8400)</p>\
         <p>Tel: +54 294 442-6727</p>\
         <p>Email: crub@uncoma.edu.ar</p></div>\
         <div class=\"footer-social\">\
         <a href=\"https://www.facebook.com/UncoBariloche/\" target=\"_blank\" rel=\"noopener noreferrer\" aria-label=\"Facebook\">Facebook</a>\
         <a href=\"https://www.instagram.com/uncobariloche/?hl=es\" target=\"_blank\" rel=\"noopener noreferrer\" aria-label=\"Instagram\">Instagram</a>\
         <a href=\"https://www.youtube.com/c/Comunicaci%C3%B3nUNCoBariloche\" target=\"_blank\" rel=\"noopener noreferrer\" aria-label=\"YouTube\">YouTube</a>\
         </div></div></div>",
    );
    out.push_str(&format!(
        "<div class=\"footer-bottom\"><p>&copy; {} CRUB - Centro Regional Universitario Bariloche. Todos los derechos reservados.</p></div>",
        chrono::Local::now().year()
    ));
    out.push_str("</div></footer>");
    out
}

pub fn document(chrome: &Chrome, title: &str, main_html: &str) -> String {
    let mut out = String::new();
    out.push_str("<!doctype html>\n<html lang=\"es\">\n<head>\n");
    out.push_str("  <meta charset=\"utf-8\">\n");
    out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("  <title>{} | CRUB</title>\n", escape(title)));
    out.push_str("  <link rel=\"stylesheet\" href=\"/static/site.css\">\n");
    out.push_str("</head>\n<body>\n<div class=\"app\">\n");
    out.push_str(&header(chrome));
    out.push('\n');
    out.push_str(main_html);
    out.push('\n');
    out.push_str(&footer(&chrome.menu));
    out.push('\n');
    out.push_str(&menu_button(chrome));
    out.push_str("\n</div>\n</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::menu::{MenuItemLink, MenuSection};
    use crate::ui::store::{scoped_header_mode, toggle_menu};

    fn menu() -> Vec<MenuGroup> {
        vec![MenuGroup {
            title: "Académica".to_owned(),
            sections: vec![MenuSection {
                id: "1".to_owned(),
                title: "Carreras".to_owned(),
                items: vec![
                    MenuItemLink {
                        id: "10".to_owned(),
                        title: "Grado".to_owned(),
                        href: "/pagina/grado".to_owned(),
                    },
                    MenuItemLink {
                        id: "11".to_owned(),
                        title: "SIU".to_owned(),
                        href: "https://siu.uncoma.edu.ar".to_owned(),
                    },
                ],
            }],
        }]
    }

    #[test]
    fn header_reflects_mode_and_menu_state() {
        let chrome = Chrome::new("/agenda", menu());
        let _mode = scoped_header_mode(&chrome.header_mode, HeaderMode::Solid);
        toggle_menu(&chrome.menu_open);

        let html = header(&chrome);
        assert!(html.starts_with("<header class=\"header menu-open header--solid\">"));
        assert!(html.contains("header-nav open"));
        assert!(html.contains("<a href=\"/pagina/grado\" class=\"dropdown-link\">Grado</a>"));
        assert!(html.contains("target=\"_blank\""));
    }

    #[test]
    fn query_expands_a_known_dropdown() {
        let mut chrome = Chrome::new("/", menu());
        let query = HashMap::from([
            ("desplegable".to_owned(), "Académica".to_owned()),
            ("menu".to_owned(), "abierto".to_owned()),
        ]);
        chrome.apply_query(&query);

        let html = header(&chrome);
        assert!(
            html.contains("<li class=\"nav-item expanded\"><details class=\"dropdown\" open>")
        );
        assert!(html.contains("header-nav open"));

        let mut unknown = Chrome::new("/", menu());
        unknown.apply_query(&HashMap::from([(
            "desplegable".to_owned(),
            "Otra".to_owned(),
        )]));
        assert_eq!(unknown.header.open_dropdown(), None);
        assert!(!header(&unknown).contains("expanded"));
    }

    #[test]
    fn menu_button_links_to_opposite_state() {
        let chrome = Chrome::new("/", Vec::new());
        assert!(menu_button(&chrome).contains("href=\"/?menu=abierto\""));
        toggle_menu(&chrome.menu_open);
        let html = menu_button(&chrome);
        assert!(html.contains("href=\"/?menu=cerrado\""));
        assert!(html.contains("Cerrar menú"));
    }

    #[test]
    fn document_wraps_body_with_chrome() {
        let chrome = Chrome::new("/", menu());
        let html = document(&chrome, "Inicio", "<main>hola</main>");
        assert!(html.contains("<title>Inicio | CRUB</title>"));
        assert!(html.contains("<main>hola</main>"));
        assert!(html.contains("footer-group-title\">Académica"));
        assert!(html.contains("header--overlay"));
    }
}
