use std::{future::Future, pin::Pin};

/**
 * This module contains all logic for fetching and decoding external assets:
 * HDR panoramas and glTF models.
 */
pub mod environment;
pub mod model;

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<Vec<u8>>> + 'a>>;

/// Where asset bytes come from.
///
/// The viewer fetches through [`DefaultAssetSource`]; tests substitute sources
/// that count requests or never resolve.
pub trait AssetSource {
    fn fetch<'a>(&'a self, uri: &'a str) -> FetchFuture<'a>;
}

/// Fetches http(s) URIs over the network and everything else from the
/// application's asset directory.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultAssetSource;

impl AssetSource for DefaultAssetSource {
    fn fetch<'a>(&'a self, uri: &'a str) -> FetchFuture<'a> {
        Box::pin(load_binary(uri))
    }
}

fn is_remote(uri: &str) -> bool {
    uri.starts_with("http://") || uri.starts_with("https://")
}

/// Resolve `reference` (e.g. an external glTF buffer) against the URI of the
/// document that mentions it.
pub fn resolve_uri(base: &str, reference: &str) -> String {
    if is_remote(reference) || reference.starts_with('/') {
        return reference.to_string();
    }
    match base.rfind('/') {
        Some(idx) => format!("{}{}", &base[..=idx], reference),
        None => reference.to_string(),
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow::anyhow!("no browser window"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|err| anyhow::anyhow!("page origin unavailable: {err:?}"))?;
    let base = reqwest::Url::parse(&format!("{origin}/assets/"))?;
    Ok(base.join(file_name)?)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    if is_remote(file_name) {
        let response = reqwest::get(file_name).await?.error_for_status()?;
        return Ok(response.bytes().await?.to_vec());
    }
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.error_for_status()?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        tokio::fs::read(&path)
            .await
            .map_err(|err| anyhow::anyhow!("could not read {}: {err}", path.display()))?
    };

    Ok(data)
}
