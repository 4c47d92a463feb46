use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cms::client::CmsClient;
use crate::cms::error::CmsError;
use crate::cms::lenient::{self, RawId};
use crate::cms::media::RawMedia;
use crate::cms::urls;

pub const HOME_HERO_PATH: &str = "/portada-principals";

pub const DEFAULT_SLIDE_DURATION: Duration = Duration::from_millis(8_000);
const MIN_SLIDE_MS: f64 = 1_000.0;
const MAX_SLIDE_MS: f64 = 600_000.0;

/// Display time for a slide.
///
/// Values below 1000 are read as seconds. The result is clamped to
/// `[1s, 10min]`; missing, non-finite or non-positive input yields 8s.
pub fn slide_duration(raw_ms: Option<f64>) -> Duration {
    let Some(v) = raw_ms.filter(|v| v.is_finite() && *v > 0.0) else {
        return DEFAULT_SLIDE_DURATION;
    };
    let ms = if v >= MIN_SLIDE_MS { v } else { v * 1_000.0 };
    let ms = ms.min(MAX_SLIDE_MS).max(MIN_SLIDE_MS);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Duration::from_millis(ms.round() as u64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroItem {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
    pub href: Option<String>,
    pub duration_ms: Option<f64>,
}

impl HeroItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subtitle: None,
            image_url: None,
            image_alt: None,
            href: None,
            duration_ms: None,
        }
    }

    pub fn duration(&self) -> Duration {
        slide_duration(self.duration_ms)
    }
}

/// Raw "portada principal" (home cover) entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPortada {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(rename = "documentId", default, deserialize_with = "lenient::text")]
    pub document_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub titulo: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub subtitulo: Option<String>,
    #[serde(default, deserialize_with = "lenient::shaped")]
    pub imagen: Option<RawMedia>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub duration: Option<f64>,
}

/// `position` only seeds the id when the entry carries neither id nor document id.
pub fn adapt_portada(raw: RawPortada, position: usize, files_base: &str) -> HeroItem {
    let id = raw
        .id
        .as_ref()
        .map(ToString::to_string)
        .or_else(|| lenient::non_empty(raw.document_id.as_deref()))
        .unwrap_or_else(|| format!("hero-{position}"));
    let titulo = lenient::non_empty(raw.titulo.as_deref());
    let title = titulo.clone().unwrap_or_else(|| {
        format!(
            "Item #{}",
            raw.id.as_ref().map(ToString::to_string).unwrap_or_default()
        )
    });

    let (image_url, image_alt) = match &raw.imagen {
        Some(media) => (
            media
                .pick_url(&["large", "medium", "small"])
                .map(|u| urls::with_base_url(files_base, u)),
            lenient::non_empty(media.alternative_text.as_deref()).or_else(|| titulo.clone()),
        ),
        None => (None, titulo.clone()),
    };

    HeroItem {
        id,
        title,
        subtitle: raw.subtitulo,
        image_url,
        image_alt,
        href: lenient::non_empty(raw.url.as_deref()).map(|u| urls::normalize_url(&u)),
        duration_ms: raw.duration,
    }
}

type MapFn<T> = Arc<dyn Fn(T, usize, &str) -> HeroItem + Send + Sync>;

/// Loads hero slides from any CMS collection, mapping entries with `map`.
#[derive(Clone)]
pub struct HeroLoader<T> {
    path: String,
    map: MapFn<T>,
}

impl<T> std::fmt::Debug for HeroLoader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeroLoader").field("path", &self.path).finish()
    }
}

impl<T: serde::de::DeserializeOwned> HeroLoader<T> {
    pub fn new<F>(path: impl Into<String>, map: F) -> Self
    where
        F: Fn(T, usize, &str) -> HeroItem + Send + Sync + 'static,
    {
        Self {
            path: path.into(),
            map: Arc::new(map),
        }
    }

    pub async fn load(&self, client: &CmsClient) -> Result<Vec<HeroItem>, CmsError> {
        let raw: Vec<T> = client
            .get_list(&format!("{}?populate=*", self.path))
            .await?;
        Ok(raw
            .into_iter()
            .enumerate()
            .map(|(i, entry)| (self.map)(entry, i, client.files_base()))
            .collect())
    }
}

impl HeroLoader<RawPortada> {
    pub fn home() -> Self {
        Self::new(HOME_HERO_PATH, adapt_portada)
    }
}

pub async fn load_home_hero_items(client: &CmsClient) -> Result<Vec<HeroItem>, CmsError> {
    HeroLoader::<RawPortada>::home().load(client).await
}
