use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cms::lenient;
use crate::cms::urls;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMedia {
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: Option<String>,
    #[serde(rename = "alternativeText", default, deserialize_with = "lenient::text")]
    pub alternative_text: Option<String>,
    /// Size variants; entries that are not `{ url }` objects are dropped.
    #[serde(default, deserialize_with = "lenient::map_or_empty")]
    pub formats: BTreeMap<String, RawMediaFormat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMediaFormat {
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: Option<String>,
}

/// Uploaded image with absolute URLs for the original and each size variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub url: String,
    pub alt: Option<String>,
    pub variants: BTreeMap<String, String>,
}

impl RawMedia {
    fn format_url(&self, name: &str) -> Option<&str> {
        self.formats
            .get(name)?
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
    }

    /// First available variant in `preferred` order, else the original upload.
    pub fn pick_url(&self, preferred: &[&str]) -> Option<&str> {
        preferred
            .iter()
            .find_map(|name| self.format_url(name))
            .or_else(|| self.url.as_deref().filter(|u| !u.trim().is_empty()))
    }

    pub fn into_image(self, files_base: &str) -> Option<Image> {
        let url = lenient::non_empty(self.url.as_deref())?;
        let variants = self
            .formats
            .into_iter()
            .filter_map(|(name, format)| {
                let url = lenient::non_empty(format.url.as_deref())?;
                Some((name, urls::with_base_url(files_base, &url)))
            })
            .collect();
        Some(Image {
            url: urls::with_base_url(files_base, &url),
            alt: lenient::non_empty(self.alternative_text.as_deref()),
            variants,
        })
    }
}

impl Image {
    pub fn variant(&self, name: &str) -> Option<&str> {
        self.variants.get(name).map(String::as_str)
    }

    /// Named variant when present, the original otherwise.
    pub fn variant_or_original(&self, name: &str) -> &str {
        self.variant(name).unwrap_or(self.url.as_str())
    }
}
