use serde::{Deserialize, Serialize};

use crate::cms::client::{CmsClient, SingleEnvelope};
use crate::cms::error::CmsError;
use crate::cms::lenient::{self, RawId};
use crate::cms::media::{Image, RawMedia};

pub const NEWS_PATH: &str = "/novedades";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNovedad {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(rename = "documentId", default, deserialize_with = "lenient::text")]
    pub document_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub titulo: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub contenido: Option<String>,
    #[serde(rename = "publishedAt", default, deserialize_with = "lenient::text")]
    pub published_at: Option<String>,
    #[serde(rename = "imagenPrincipal", default, deserialize_with = "lenient::shaped")]
    pub imagen_principal: Option<RawMedia>,
    #[serde(default)]
    pub categoria: Option<RawCategoria>,
}

/// `categoria` arrives as a bare name or as a populated relation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCategoria {
    Name(String),
    Relation {
        #[serde(default, deserialize_with = "lenient::text")]
        nombre: Option<String>,
    },
    Other(serde_json::Value),
}

impl RawCategoria {
    fn name(&self) -> Option<String> {
        match self {
            Self::Name(name) => lenient::non_empty(Some(name.as_str())),
            Self::Relation { nombre } => lenient::non_empty(nombre.as_deref()),
            Self::Other(_) => None,
        }
    }
}

/// A news entry ("novedad") ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsItem {
    pub id: String,
    pub document_id: Option<String>,
    pub slug: Option<String>,
    pub title: String,
    /// Markdown source.
    pub body: String,
    pub image: Option<Image>,
    pub category: Option<String>,
    pub published_at: Option<String>,
}

impl NewsItem {
    pub fn from_raw(raw: RawNovedad, files_base: &str) -> Self {
        let id = raw.id.map(|id| id.to_string()).unwrap_or_default();
        let title = lenient::non_empty(raw.titulo.as_deref())
            .unwrap_or_else(|| format!("Novedad #{id}"));
        Self {
            document_id: lenient::non_empty(raw.document_id.as_deref()),
            slug: lenient::non_empty(raw.slug.as_deref()),
            title,
            body: raw.contenido.unwrap_or_default(),
            image: raw
                .imagen_principal
                .and_then(|media| media.into_image(files_base)),
            category: raw
                .categoria
                .and_then(|c| c.name()),
            published_at: raw.published_at,
            id,
        }
    }

    /// Identifier used in `/novedades/<key>` links: slug, then document id, then id.
    pub fn link_key(&self) -> &str {
        self.slug
            .as_deref()
            .or(self.document_id.as_deref())
            .unwrap_or(self.id.as_str())
    }

    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or("novedad")
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.image
            .as_ref()
            .map(|image| image.variant_or_original("thumbnail"))
    }
}

pub async fn fetch_news(client: &CmsClient) -> Result<Vec<NewsItem>, CmsError> {
    let raw: Vec<RawNovedad> = client
        .get_list(&format!("{NEWS_PATH}?populate=*"))
        .await?;
    Ok(raw
        .into_iter()
        .map(|r| NewsItem::from_raw(r, client.files_base()))
        .collect())
}

/// Single entry by id or document id. A 404 from the CMS means "no such entry".
pub async fn fetch_news_by_id(client: &CmsClient, id: &str) -> Result<Option<NewsItem>, CmsError> {
    let path = format!("{NEWS_PATH}/{}?populate=*", encode_component(id));
    match client.get_json::<SingleEnvelope<RawNovedad>>(&path).await {
        Ok(envelope) => Ok(envelope
            .data
            .map(|r| NewsItem::from_raw(r, client.files_base()))),
        Err(err) if err.status() == Some(404) => Ok(None),
        Err(err) => Err(err),
    }
}

pub async fn fetch_news_by_slug(
    client: &CmsClient,
    slug: &str,
) -> Result<Option<NewsItem>, CmsError> {
    let path = format!(
        "{NEWS_PATH}?filters[slug][$eq]={}&populate=*",
        encode_component(slug)
    );
    let raw: Vec<RawNovedad> = client.get_list(&path).await?;
    Ok(raw
        .into_iter()
        .next()
        .map(|r| NewsItem::from_raw(r, client.files_base())))
}

fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
