use std::collections::HashMap;
use std::path::Path;

use crate::cms::urls;

pub const HUAYCA_DEFAULT_API_URL: &str = "https://huayca.crub.uncoma.edu.ar/strapi/api";

/// Process environment layered over `.env` and `.env.local`.
///
/// Lookups try the real environment first, then `.env`, then `.env.local`, so
/// a file never overrides a variable that is already set.
#[derive(Debug, Clone, Default)]
pub struct EnvLayers {
    files: Vec<HashMap<String, String>>,
}

impl EnvLayers {
    /// Reads `.env` and `.env.local` from `dir`. Missing or unreadable files are
    /// skipped.
    pub fn load(dir: &Path) -> Self {
        let mut files = Vec::new();
        for name in [".env", ".env.local"] {
            let path = dir.join(name);
            if !path.is_file() {
                continue;
            }
            match dotenvy::from_path_iter(&path) {
                Ok(iter) => {
                    let mut vars = HashMap::new();
                    for item in iter {
                        match item {
                            Ok((key, value)) => {
                                vars.entry(key).or_insert(value);
                            }
                            Err(err) => {
                                tracing::warn!(
                                    path = %path.display(),
                                    error = %err,
                                    "skipping malformed env line"
                                );
                            }
                        }
                    }
                    files.push(vars);
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "cannot read env file");
                }
            }
        }
        Self { files }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .or_else(|| self.files.iter().find_map(|vars| vars.get(key).cloned()))
    }
}

/// First non-empty value among `keys`.
fn first_set(lookup: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        lookup(key)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteConfig {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub files_base_override: Option<String>,
    /// Development mode: the browser talks to the CMS through `/strapi-api`.
    pub dev: bool,
}

impl SiteConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let config = Self {
            api_url: first_set(&lookup, &["STRAPI_API_URL", "VITE_STRAPI_API_URL"]),
            api_token: first_set(&lookup, &["STRAPI_TOKEN", "VITE_STRAPI_TOKEN"]),
            files_base_override: first_set(
                &lookup,
                &["STRAPI_FILES_BASE_URL", "VITE_STRAPI_FILES_BASE_URL"],
            ),
            dev: first_set(&lookup, &["CRUB_DEV"])
                .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes")),
        };
        if config.api_url.is_none() {
            tracing::warn!("STRAPI_API_URL is not set; CMS requests will fail");
        }
        config
    }

    /// Reads the configuration from the environment and the env files in `dir`.
    pub fn load(dir: &Path) -> Self {
        let layers = EnvLayers::load(dir);
        Self::from_lookup(|key| layers.get(key))
    }

    pub fn files_base(&self) -> String {
        urls::files_base(
            self.files_base_override.as_deref(),
            self.api_url.as_deref(),
        )
    }
}

/// Which CMS a fetch utility talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FetchProfile {
    /// Main site CMS; the base URL is mandatory.
    Strapi,
    /// Research-portal CMS; falls back to its public base URL.
    Huayca,
}

impl FetchProfile {
    pub fn default_path(self) -> &'static str {
        match self {
            Self::Strapi => "/portada-principals?populate=*",
            Self::Huayca => "/Menu-p-investigacion-items?populate=*",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    pub api_url: String,
    pub token: Option<String>,
}

impl FetchTarget {
    /// `None` when the profile requires a base URL and none is configured.
    pub fn resolve(profile: FetchProfile, lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        match profile {
            FetchProfile::Strapi => Some(Self {
                api_url: first_set(&lookup, &["STRAPI_API_URL", "VITE_STRAPI_API_URL"])?,
                token: first_set(&lookup, &["STRAPI_TOKEN", "VITE_STRAPI_TOKEN"]),
            }),
            FetchProfile::Huayca => Some(Self {
                api_url: first_set(
                    &lookup,
                    &["HUAYCA_API_URL", "STRAPI_API_URL", "VITE_STRAPI_API_URL"],
                )
                .unwrap_or_else(|| HUAYCA_DEFAULT_API_URL.to_owned()),
                token: first_set(
                    &lookup,
                    &["HUAYCA_TOKEN", "STRAPI_TOKEN", "VITE_STRAPI_TOKEN"],
                ),
            }),
        }
    }
}
