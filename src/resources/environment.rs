use anyhow::Context;

use crate::{
    data_structures::environment::{EnvironmentMap, EnvironmentMapping},
    error::LoadError,
    resources::AssetSource,
};

/// Fetch and decode a Radiance HDR panorama.
pub async fn load_environment(
    source: &dyn AssetSource,
    uri: &str,
) -> Result<EnvironmentMap, LoadError> {
    log::info!("loading environment {uri}");
    let bytes = source
        .fetch(uri)
        .await
        .map_err(|err| LoadError::environment(uri, err))?;
    decode_hdr(uri, &bytes).map_err(|err| LoadError::environment(uri, err))
}

/// Decode Radiance HDR bytes into linear RGBA texels.
pub fn decode_hdr(name: &str, bytes: &[u8]) -> anyhow::Result<EnvironmentMap> {
    let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Hdr)
        .with_context(|| format!("{name} is not a Radiance HDR image"))?
        .to_rgba32f();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        anyhow::bail!("{name} has no pixels");
    }
    let texels = image
        .pixels()
        .map(|pixel| pixel.0)
        .collect();
    log::debug!("decoded environment {name}: {width}x{height}");
    Ok(EnvironmentMap {
        name: name.to_string(),
        width,
        height,
        texels,
        mapping: EnvironmentMapping::EquirectangularReflection,
    })
}
