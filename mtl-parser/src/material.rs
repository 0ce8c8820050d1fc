use bitflags::bitflags;
use serde_derive::{Deserialize, Serialize};

pub const PHYSICS_NO_DRAW_NAME: &str = "physProxyNoDraw";
pub const NO_DRAW_SHADER: &str = "Nodraw";
pub const DEFAULT_SHADER: &str = "Illum";
pub const DEFAULT_SURFACE_TYPE: &str = "mat_default";
/// Shader generation flag, stored as `%VERTCOLORS` in `StringGenMask`.
pub const VERTEX_COLORS_GEN_MASK: &str = "VERTCOLORS";

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct MtlFlags: u32 {
        const WIRE = 0x0001;
        const TWO_SIDED = 0x0002;
        const ADDITIVE = 0x0004;
        const LIGHTING = 0x0010;
        const NO_SHADOW = 0x0020;
        const PURE_CHILD = 0x0080;
        const MULTI_SUBMTL = 0x0100;
        const NO_PHYSICALIZE = 0x0200;
        const NO_DRAW = 0x0400;
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureMapType {
    Diffuse,
    Specular,
    #[serde(rename = "Bumpmap")]
    Bump,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Texture {
    #[serde(rename = "@Map")]
    pub map: TextureMapType,
    #[serde(rename = "@File")]
    pub file: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Textures {
    #[serde(rename = "Texture", default)]
    pub elements: Vec<Texture>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SubMaterials {
    #[serde(rename = "Material", default)]
    pub elements: Vec<Material>,
}

/// A `<Material>` element. The root of a file is a material as well, holding the actual
/// materials as `SubMaterials` when it carries the `MULTI_SUBMTL` flag.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Material {
    #[serde(rename = "@Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "@MtlFlags", default)]
    pub mtl_flags: u32,
    #[serde(rename = "@Shader", skip_serializing_if = "Option::is_none")]
    pub shader: Option<String>,
    #[serde(rename = "@StringGenMask", default, skip_serializing_if = "String::is_empty")]
    pub string_gen_mask: String,
    #[serde(rename = "@SurfaceType", skip_serializing_if = "Option::is_none")]
    pub surface_type: Option<String>,
    #[serde(rename = "@Diffuse", skip_serializing_if = "Option::is_none")]
    pub diffuse: Option<String>,
    #[serde(rename = "@Specular", skip_serializing_if = "Option::is_none")]
    pub specular: Option<String>,
    #[serde(rename = "@Opacity", skip_serializing_if = "Option::is_none")]
    pub opacity: Option<String>,
    #[serde(rename = "@Shininess", skip_serializing_if = "Option::is_none")]
    pub shininess: Option<String>,
    #[serde(rename = "Textures", skip_serializing_if = "Option::is_none")]
    pub textures: Option<Textures>,
    #[serde(rename = "SubMaterials", skip_serializing_if = "Option::is_none")]
    pub sub_materials: Option<SubMaterials>,
}

impl Material {
    pub fn new(name: &str) -> Material {
        Material {
            name: Some(name.to_string()),
            mtl_flags: MtlFlags::PURE_CHILD.bits(),
            shader: Some(DEFAULT_SHADER.to_string()),
            surface_type: Some(DEFAULT_SURFACE_TYPE.to_string()),
            diffuse: Some("1,1,1".to_string()),
            specular: Some("0,0,0".to_string()),
            opacity: Some("1".to_string()),
            shininess: Some("10".to_string()),
            ..Material::default()
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    pub fn flags(&self) -> MtlFlags {
        MtlFlags::from_bits_truncate(self.mtl_flags)
    }

    pub fn set_flag(&mut self, flag: MtlFlags, value: bool) {
        let mut flags = self.flags();
        flags.set(flag, value);
        self.mtl_flags = flags.bits();
    }

    fn gen_mask_tokens(&self) -> impl Iterator<Item = &str> {
        self.string_gen_mask.split('%').filter(|token| !token.is_empty())
    }

    pub fn uses_vertex_color(&self) -> bool {
        self.gen_mask_tokens().any(|token| token == VERTEX_COLORS_GEN_MASK)
    }

    pub fn enable_use_vertex_color(&mut self, enable: bool) {
        if enable == self.uses_vertex_color() {
            return;
        }

        let mut tokens = self
            .gen_mask_tokens()
            .filter(|token| *token != VERTEX_COLORS_GEN_MASK)
            .map(str::to_string)
            .collect::<Vec<_>>();
        if enable {
            tokens.push(VERTEX_COLORS_GEN_MASK.to_string());
        }
        self.string_gen_mask = tokens.iter().map(|token| format!("%{}", token)).collect();
    }

    pub fn is_physical_material(&self) -> bool {
        self.flags().contains(MtlFlags::NO_DRAW) && self.shader.as_deref() == Some(NO_DRAW_SHADER)
    }

    /// Physical materials are never drawn and only carry the collision surface.
    pub fn enable_physical_material(&mut self, enable: bool) {
        self.set_flag(MtlFlags::NO_DRAW, enable);
        self.shader = Some(if enable { NO_DRAW_SHADER } else { DEFAULT_SHADER }.to_string());
    }

    pub fn texture(&self, map: TextureMapType) -> Option<&str> {
        self.textures
            .as_ref()?
            .elements
            .iter()
            .find(|texture| texture.map == map)
            .map(|texture| texture.file.as_str())
    }

    /// An empty `file` removes the texture slot.
    pub fn set_texture(&mut self, map: TextureMapType, file: &str) {
        let textures = self.textures.get_or_insert_with(Textures::default);
        textures.elements.retain(|texture| texture.map != map);
        if !file.is_empty() {
            textures.elements.push(Texture {
                map,
                file: file.to_string(),
            });
        }

        if textures.elements.is_empty() {
            self.textures = None;
        }
    }
}
