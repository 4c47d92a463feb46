use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cms::client::CmsClient;
use crate::cms::error::CmsError;
use crate::cms::lenient::{self, RawId};
use crate::richtext::RichTextNode;

/// Audience landing collections. Declaration order is the slug resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Audience {
    Estudiantes,
    Docentes,
    Nodocentes,
    PersonasGraduadas,
}

impl Audience {
    pub const ALL: [Audience; 4] = [
        Audience::Estudiantes,
        Audience::Docentes,
        Audience::Nodocentes,
        Audience::PersonasGraduadas,
    ];

    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Estudiantes => "/item-estudiantes?populate=*",
            Self::Docentes => "/item-docentes?populate=*",
            Self::Nodocentes => "/item-nodocentes?populate=*",
            Self::PersonasGraduadas => "/item-personas-graduadas?populate=*",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Estudiantes => "Estudiantes",
            Self::Docentes => "Docentes",
            Self::Nodocentes => "Nodocentes",
            Self::PersonasGraduadas => "Personas graduadas",
        }
    }

    /// Site path segment (`/estudiantes`, ...).
    pub fn segment(self) -> &'static str {
        match self {
            Self::Estudiantes => "estudiantes",
            Self::Docentes => "docentes",
            Self::Nodocentes => "nodocentes",
            Self::PersonasGraduadas => "personas-graduadas",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.segment() == segment)
    }
}

pub fn default_item_endpoints() -> Vec<&'static str> {
    Audience::ALL.into_iter().map(Audience::endpoint).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Seccion {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub orden: i64,
    pub estilo: String,
    pub url: Option<String>,
    pub content: Vec<RichTextNode>,
}

impl Seccion {
    /// Link target that replaces the section body, if any.
    pub fn link(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// Generic CMS page ("item") with its ordered sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: String,
    pub document_id: String,
    pub title: String,
    pub subtitle: String,
    pub url: Option<String>,
    pub orden: i64,
    pub estilo: String,
    pub contenido: String,
    pub slug: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub published_at: Option<String>,
    pub secciones: Vec<Seccion>,
}

impl Item {
    pub fn link(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// Sections by ascending `orden`; ties keep CMS order.
    pub fn sorted_sections(&self) -> Vec<&Seccion> {
        let mut sections: Vec<&Seccion> = self.secciones.iter().collect();
        sections.sort_by_key(|s| s.orden);
        sections
    }

    pub fn section(&self, id: &str) -> Option<&Seccion> {
        self.secciones.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(rename = "documentId", default, deserialize_with = "lenient::text")]
    pub document_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub subtitle: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient::order")]
    pub orden: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub estilo: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub contenido: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub slug: Option<String>,
    #[serde(rename = "createdAt", default, deserialize_with = "lenient::text")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default, deserialize_with = "lenient::text")]
    pub updated_at: Option<String>,
    #[serde(rename = "publishedAt", default, deserialize_with = "lenient::text")]
    pub published_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub secciones: Vec<RawSeccion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSeccion {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub subtitle: Option<String>,
    #[serde(default, deserialize_with = "lenient::order")]
    pub orden: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub estilo: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub content: Vec<RichTextNode>,
}

fn estilo_or_plain(estilo: Option<String>) -> String {
    lenient::non_empty(estilo.as_deref()).unwrap_or_else(|| "plain".to_owned())
}

impl From<RawSeccion> for Seccion {
    fn from(raw: RawSeccion) -> Self {
        Self {
            id: raw.id.map(|id| id.to_string()).unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            subtitle: lenient::non_empty(raw.subtitle.as_deref()),
            orden: raw.orden,
            estilo: estilo_or_plain(raw.estilo),
            url: raw.url,
            content: raw.content,
        }
    }
}

impl From<RawItem> for Item {
    fn from(raw: RawItem) -> Self {
        Self {
            id: raw.id.map(|id| id.to_string()).unwrap_or_default(),
            document_id: raw.document_id.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            subtitle: raw.subtitle.unwrap_or_default(),
            url: raw.url,
            orden: raw.orden,
            estilo: estilo_or_plain(raw.estilo),
            contenido: raw.contenido.unwrap_or_default(),
            slug: raw.slug.unwrap_or_default(),
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            published_at: raw.published_at,
            secciones: raw.secciones.into_iter().map(Seccion::from).collect(),
        }
    }
}

/// Anything that can list the items of a CMS collection endpoint.
#[async_trait]
pub trait ItemSource: Send + Sync {
    async fn fetch_items(&self, endpoint: &str) -> Result<Vec<Item>, CmsError>;
}

#[async_trait]
impl ItemSource for CmsClient {
    async fn fetch_items(&self, endpoint: &str) -> Result<Vec<Item>, CmsError> {
        let raw: Vec<RawItem> = self.get_list(endpoint).await?;
        Ok(raw.into_iter().map(Item::from).collect())
    }
}

/// Items of one collection ordered by `orden` for index pages.
pub async fn fetch_sorted_items<S: ItemSource + ?Sized>(
    source: &S,
    endpoint: &str,
) -> Result<Vec<Item>, CmsError> {
    let mut items = source.fetch_items(endpoint).await?;
    items.sort_by_key(|i| i.orden);
    Ok(items)
}

/// Scans `endpoints` in order and returns the first item whose slug matches.
///
/// A failing endpoint is logged and skipped. Endpoints after the match are not
/// queried. `None` means every endpoint was tried without a match.
pub async fn resolve_item_by_slug<S: ItemSource + ?Sized>(
    source: &S,
    slug: &str,
    endpoints: &[&str],
) -> Option<Item> {
    for endpoint in endpoints {
        match source.fetch_items(endpoint).await {
            Ok(items) => {
                if let Some(found) = items.into_iter().find(|i| i.slug == slug) {
                    tracing::debug!(slug, endpoint, "resolved item by slug");
                    return Some(found);
                }
            }
            Err(err) => {
                tracing::warn!(endpoint, error = %err, "item endpoint failed; trying next");
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    fn item(slug: &str) -> Item {
        Item::from(RawItem {
            slug: Some(slug.to_owned()),
            title: Some(format!("Página {slug}")),
            ..RawItem::default()
        })
    }

    /// In-memory collections that record every endpoint they are asked for.
    struct FakeCollections {
        by_endpoint: HashMap<&'static str, Result<Vec<Item>, u16>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeCollections {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ItemSource for FakeCollections {
        async fn fetch_items(&self, endpoint: &str) -> Result<Vec<Item>, CmsError> {
            self.calls.lock().unwrap().push(endpoint.to_owned());
            match self.by_endpoint.get(endpoint) {
                Some(Ok(items)) => Ok(items.clone()),
                Some(Err(status)) => Err(CmsError::Http {
                    status: *status,
                    body: "boom".to_owned(),
                }),
                None => Ok(Vec::new()),
            }
        }
    }

    #[tokio::test]
    async fn resolution_stops_at_first_matching_endpoint() {
        let endpoints = default_item_endpoints();
        let fake = FakeCollections {
            by_endpoint: HashMap::from([
                (endpoints[0], Ok(vec![item("inscripcion")])),
                (endpoints[1], Err(500)),
                (endpoints[2], Ok(vec![item("otra"), item("becas")])),
                (endpoints[3], Ok(vec![item("becas")])),
            ]),
            calls: Mutex::new(Vec::new()),
        };

        let found = resolve_item_by_slug(&fake, "becas", &endpoints).await.unwrap();
        assert_eq!(found.title, "Página becas");
        assert_eq!(fake.calls(), endpoints[..3].to_vec());
    }

    #[tokio::test]
    async fn resolution_reports_not_found_after_trying_every_endpoint() {
        let endpoints = default_item_endpoints();
        let fake = FakeCollections {
            by_endpoint: HashMap::from([(endpoints[3], Err(503))]),
            calls: Mutex::new(Vec::new()),
        };

        assert!(resolve_item_by_slug(&fake, "nada", &endpoints).await.is_none());
        assert_eq!(fake.calls(), endpoints);
    }

    #[test]
    fn normalizes_raw_items_with_defaults() {
        let raw: RawItem = serde_json::from_value(serde_json::json!({
            "id": 5,
            "documentId": "doc5",
            "title": "Becas",
            "orden": "2",
            "estilo": null,
            "slug": "becas",
            "secciones": [
                { "id": 1, "title": "B", "orden": 2, "content": [ { "type": "paragraph", "children": [ { "text": "x" } ] } ] },
                { "id": 2, "title": "A", "orden": 1, "url": "  ", "estilo": "card", "content": "bad" }
            ]
        }))
        .unwrap();
        let item = Item::from(raw);

        assert_eq!(item.orden, 2);
        assert_eq!(item.estilo, "plain");
        assert_eq!(item.subtitle, "");
        assert_eq!(item.link(), None);

        let titles: Vec<&str> = item.sorted_sections().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);

        let a = item.section("2").unwrap();
        assert_eq!(a.estilo, "card");
        assert_eq!(a.link(), None);
        assert!(a.content.is_empty());
        assert_eq!(item.section("1").unwrap().content.len(), 1);
        assert!(item.section("9").is_none());
    }

    #[test]
    fn audience_segments_round_trip() {
        for audience in Audience::ALL {
            assert_eq!(Audience::from_segment(audience.segment()), Some(audience));
        }
        assert_eq!(Audience::from_segment("otros"), None);
    }
}
