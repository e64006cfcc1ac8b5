/**
 * This module contains all logic for loading textures from external files and
 * generating the scene's procedural geometry.
 */
pub mod primitives;
pub mod texture;

use crate::data_structures::{model::Material, texture::Texture};

/// A texture the scene wants to load: asset path, how often it repeats
/// across geometry, and an optional fallback color for when the file is
/// missing. Textures without a fallback render plain white if absent.
#[derive(Clone, Copy, Debug)]
pub struct TextureSlot {
    pub name: &'static str,
    pub file: &'static str,
    pub repeat: f32,
    pub fallback: Option<u32>,
}

/// The seven scene textures. Bricks, roof and grass are expected to exist;
/// the four decorative textures degrade to flat colors.
pub const STONE: TextureSlot = TextureSlot {
    name: "stone",
    file: "textures/bricks.jpg",
    repeat: 2.0,
    fallback: None,
};
pub const ROOF: TextureSlot = TextureSlot {
    name: "roof",
    file: "textures/roof.jpg",
    repeat: 4.0,
    fallback: None,
};
pub const GROUND: TextureSlot = TextureSlot {
    name: "ground",
    file: "textures/grass.jpg",
    repeat: 10.0,
    fallback: None,
};
pub const WOOD: TextureSlot = TextureSlot {
    name: "wood",
    file: "textures/wood.jpg",
    repeat: 2.0,
    fallback: Some(0x8B4513),
};
pub const METAL: TextureSlot = TextureSlot {
    name: "metal",
    file: "textures/metal.jpg",
    repeat: 1.0,
    fallback: Some(0x666666),
};
pub const COBBLESTONE: TextureSlot = TextureSlot {
    name: "cobblestone",
    file: "textures/cobblestone.jpg",
    repeat: 5.0,
    fallback: Some(0x555555),
};
pub const DARK_STONE: TextureSlot = TextureSlot {
    name: "dark_stone",
    file: "textures/dark_stone.jpg",
    repeat: 2.0,
    fallback: Some(0x444444),
};

pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Convert a 0xRRGGBB color to linear RGBA.
pub fn hex_color(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| {
        let srgb = ((hex >> shift) & 0xFF) as f32 / 255.0;
        srgb.powf(2.2)
    };
    [channel(16), channel(8), channel(0), 1.0]
}

/// The base color a material ends up with once its texture load has
/// resolved. A successful load is never overridden; only the failure branch
/// consults the fallback color.
pub fn resolve_base_color(slot: &TextureSlot, loaded: bool) -> [f32; 4] {
    if loaded {
        WHITE
    } else {
        slot.fallback.map(hex_color).unwrap_or(WHITE)
    }
}

/// Load one material, resolving the texture to success or failure exactly
/// once. On failure the fallback color (if any) is applied right here, on
/// the failure branch; a texture that loads is never overridden later.
pub async fn load_material(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    slot: TextureSlot,
) -> Material {
    match texture::load_texture(slot.file, device, queue).await {
        Ok(diffuse) => Material::new(
            device,
            slot.name,
            diffuse,
            resolve_base_color(&slot, true),
            layout,
        ),
        Err(e) => {
            if slot.fallback.is_some() {
                log::warn!(
                    "{} texture not found ({}), using fallback color",
                    slot.name,
                    e
                );
            } else {
                log::error!(
                    "required {} texture missing ({}); rendering with default appearance",
                    slot.name,
                    e
                );
            }
            let white = Texture::solid_color([255, 255, 255, 255], device, queue);
            Material::new(
                device,
                slot.name,
                white,
                resolve_base_color(&slot, false),
                layout,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_decodes_channels() {
        let c = hex_color(0x8B4513);
        let expected = [
            (0x8B as f32 / 255.0_f32).powf(2.2),
            (0x45 as f32 / 255.0_f32).powf(2.2),
            (0x13 as f32 / 255.0_f32).powf(2.2),
            1.0,
        ];
        assert_eq!(c, expected);
    }

    #[test]
    fn fallback_applies_only_on_the_failure_branch() {
        // A loaded texture keeps its appearance no matter what the slot's
        // fallback says.
        assert_eq!(resolve_base_color(&WOOD, true), WHITE);
        assert_eq!(resolve_base_color(&STONE, true), WHITE);
        // A failed decorative load gets its documented flat color.
        assert_eq!(resolve_base_color(&WOOD, false), hex_color(0x8B4513));
        assert_eq!(resolve_base_color(&METAL, false), hex_color(0x666666));
        assert_eq!(
            resolve_base_color(&COBBLESTONE, false),
            hex_color(0x555555)
        );
        assert_eq!(resolve_base_color(&DARK_STONE, false), hex_color(0x444444));
        // A failed core load has no fallback and renders the default white.
        assert_eq!(resolve_base_color(&STONE, false), WHITE);
    }

    #[test]
    fn decorative_slots_carry_documented_fallbacks() {
        assert_eq!(WOOD.fallback, Some(0x8B4513));
        assert_eq!(METAL.fallback, Some(0x666666));
        assert_eq!(COBBLESTONE.fallback, Some(0x555555));
        assert_eq!(DARK_STONE.fallback, Some(0x444444));
        // Core textures have no fallback color.
        assert!(STONE.fallback.is_none());
        assert!(ROOF.fallback.is_none());
        assert!(GROUND.fallback.is_none());
    }
}
