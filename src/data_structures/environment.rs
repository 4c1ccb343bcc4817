//! Decoded light-probe panoramas.

/// How the panorama is projected when it is sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvironmentMapping {
    /// Longitude/latitude panorama sampled by reflection direction.
    EquirectangularReflection,
}

/// A linear HDR panorama ready to be uploaded as an environment texture.
#[derive(Clone, Debug)]
pub struct EnvironmentMap {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Row-major linear RGBA texels.
    pub texels: Vec<[f32; 4]>,
    pub mapping: EnvironmentMapping,
}

impl EnvironmentMap {
    pub fn texel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.texels.get((y * self.width + x) as usize).copied()
    }

    /// Half-float bytes as expected by an `Rgba16Float` texture upload.
    pub fn to_rgba16f_bytes(&self) -> Vec<u8> {
        self.texels
            .iter()
            .flat_map(|texel| texel.iter())
            .flat_map(|&channel| half::f16::from_f32(channel).to_le_bytes())
            .collect()
    }
}
