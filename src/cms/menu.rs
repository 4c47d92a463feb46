use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cms::client::CmsClient;
use crate::cms::error::CmsError;
use crate::cms::lenient::{self, RawId};
use crate::cms::urls;

pub const MENU_PATH: &str = "/menu-ppls";
pub const UNGROUPED_TITLE: &str = "Sin categoría";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItemLink {
    pub id: String,
    pub title: String,
    /// Normalized href: site-relative path or absolute URL.
    pub href: String,
}

impl MenuItemLink {
    pub fn is_external(&self) -> bool {
        urls::is_external(&self.href)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuSection {
    pub id: String,
    pub title: String,
    pub items: Vec<MenuItemLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuGroup {
    pub title: String,
    pub sections: Vec<MenuSection>,
}

/// `btns_menu` arrives as a bare title, a populated relation, or a v4-style
/// `{ data: { titulo } }` wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawButtonMenu {
    Title(String),
    Relation {
        #[serde(default, deserialize_with = "lenient::text")]
        titulo: Option<String>,
        #[serde(default)]
        data: Option<RawButtonMenuData>,
    },
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawButtonMenuData {
    #[serde(default, deserialize_with = "lenient::text")]
    pub titulo: Option<String>,
}

impl RawButtonMenu {
    fn title(&self) -> Option<String> {
        match self {
            Self::Title(t) => lenient::non_empty(Some(t.as_str())),
            Self::Relation { titulo, data } => lenient::non_empty(titulo.as_deref()).or_else(|| {
                data.as_ref()
                    .and_then(|d| lenient::non_empty(d.titulo.as_deref()))
            }),
            Self::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMenuEntry {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(rename = "documentId", default, deserialize_with = "lenient::text")]
    pub document_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub titulo: Option<String>,
    #[serde(default)]
    pub btns_menu: Option<RawButtonMenu>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub itemsmenu: Vec<RawMenuLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMenuLink {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub titulo: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub enlace: Option<String>,
}

/// Groups raw menu entries into the navigation tree.
///
/// Groups appear in the order their title is first seen; sections keep the
/// order of the entries within each group.
pub fn group_menu(entries: Vec<RawMenuEntry>) -> Vec<MenuGroup> {
    let mut groups: Vec<MenuGroup> = Vec::new();
    let mut index_by_title: HashMap<String, usize> = HashMap::new();

    for (position, entry) in entries.into_iter().enumerate() {
        let group_title = entry
            .btns_menu
            .as_ref()
            .and_then(RawButtonMenu::title)
            .unwrap_or_else(|| UNGROUPED_TITLE.to_owned());

        let section_id = entry
            .id
            .as_ref()
            .map(ToString::to_string)
            .or_else(|| lenient::non_empty(entry.document_id.as_deref()))
            .unwrap_or_else(|| format!("section-{position}"));
        let items = entry
            .itemsmenu
            .into_iter()
            .enumerate()
            .map(|(i, link)| MenuItemLink {
                id: link
                    .id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| format!("{section_id}-{i}")),
                title: link.titulo.unwrap_or_default(),
                href: urls::normalize_url(link.enlace.as_deref().unwrap_or("#")),
            })
            .collect();
        let section = MenuSection {
            id: section_id,
            title: entry.titulo.unwrap_or_default(),
            items,
        };

        let slot = *index_by_title
            .entry(group_title.clone())
            .or_insert_with(|| {
                groups.push(MenuGroup {
                    title: group_title,
                    sections: Vec::new(),
                });
                groups.len() - 1
            });
        groups[slot].sections.push(section);
    }

    groups
}

pub async fn fetch_menu(client: &CmsClient) -> Result<Vec<MenuGroup>, CmsError> {
    let entries: Vec<RawMenuEntry> = client
        .get_list(&format!("{MENU_PATH}?populate=*"))
        .await?;
    Ok(group_menu(entries))
}
