//! One-shot authenticated GET against a CMS, printing the JSON response.

use std::path::Path;

use thiserror::Error;

use crate::cli::FetchArgs;
use crate::cms::{CmsClient, CmsError};
use crate::config::{EnvLayers, FetchProfile, FetchTarget};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Missing STRAPI_API_URL or VITE_STRAPI_API_URL in env")]
    MissingApiUrl,
    #[error(transparent)]
    Cms(#[from] CmsError),
    #[error("encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl FetchError {
    /// 1 for configuration problems, 2 for anything that went wrong talking to the CMS.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::MissingApiUrl => 1,
            Self::Cms(_) | Self::Encode(_) => 2,
        }
    }
}

pub fn resolve_target(profile: FetchProfile, dir: &Path) -> Result<FetchTarget, FetchError> {
    let layers = EnvLayers::load(dir);
    FetchTarget::resolve(profile, |key| layers.get(key)).ok_or(FetchError::MissingApiUrl)
}

/// Fetches `args.path` (or the profile's default endpoint) and returns the
/// pretty-printed body.
pub async fn fetch_pretty(args: &FetchArgs, dir: &Path) -> Result<String, FetchError> {
    let target = resolve_target(args.profile, dir)?;
    let client = CmsClient::new(&target.api_url, target.token);
    let path = args
        .path
        .as_deref()
        .unwrap_or_else(|| args.profile.default_path());

    eprintln!("GET {}", client.url_for(path));
    let json: serde_json::Value = client.get_json(path).await?;
    Ok(serde_json::to_string_pretty(&json)?)
}

pub async fn run(args: FetchArgs) -> Result<(), FetchError> {
    let dir = std::env::current_dir().unwrap_or_else(|_| ".".into());
    let body = fetch_pretty(&args, &dir).await?;
    println!("{body}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_separate_config_from_http_failures() {
        assert_eq!(FetchError::MissingApiUrl.exit_code(), 1);
        let http = FetchError::from(CmsError::Http {
            status: 500,
            body: "boom".to_owned(),
        });
        assert_eq!(http.exit_code(), 2);
        assert_eq!(http.to_string(), "CMS error 500: boom");
    }
}
