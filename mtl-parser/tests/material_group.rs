use mtl_parser::MtlError;
use mtl_parser::group::MaterialGroup;
use mtl_parser::material::{Material, MtlFlags, PHYSICS_NO_DRAW_NAME, TextureMapType};

#[test]
fn parse_crate_box() -> Result<(), anyhow::Error> {
    let group = MaterialGroup::read_str(include_str!("crate_box.mtl"))?;
    assert_eq!(group.material_count(), 3);

    let no_draw = group.material(0).unwrap();
    assert_eq!(no_draw.name(), PHYSICS_NO_DRAW_NAME);
    assert!(no_draw.is_physical_material());
    assert!(!no_draw.uses_vertex_color());

    let wood = group.material(1).unwrap();
    assert!(wood.uses_vertex_color());
    assert!(!wood.is_physical_material());
    assert_eq!(wood.surface_type.as_deref(), Some("mat_wood"));
    assert_eq!(wood.texture(TextureMapType::Diffuse), Some("textures/crate_diff.dds"));
    assert_eq!(wood.texture(TextureMapType::Bump), Some("textures/crate_ddn.dds"));
    assert_eq!(wood.texture(TextureMapType::Specular), None);

    assert_eq!(group.find_material_index("metal"), Some(2));
    assert_eq!(group.find_material_index("glass"), None);
    Ok(())
}

#[test]
fn single_material_file() -> Result<(), anyhow::Error> {
    let group = MaterialGroup::read_str(r#"<Material Name="single" MtlFlags="0" Shader="Illum"/>"#)?;
    assert_eq!(group.material_count(), 1);
    assert_eq!(group.material(0).unwrap().name(), "single");
    Ok(())
}

#[test]
fn malformed_file() {
    let result = MaterialGroup::read_str("<Material MtlFlags=\"not a number\">");
    assert!(matches!(result, Err(MtlError::DeserializeError(_))));
}

#[test]
fn vertex_color_toggle_keeps_other_flags() {
    let mut material = Material::new("wood");
    material.string_gen_mask = "%SPECULAR_MAP".to_string();

    material.enable_use_vertex_color(true);
    assert!(material.uses_vertex_color());
    assert_eq!(material.string_gen_mask, "%SPECULAR_MAP%VERTCOLORS");

    material.enable_use_vertex_color(true);
    assert_eq!(material.string_gen_mask, "%SPECULAR_MAP%VERTCOLORS");

    material.enable_use_vertex_color(false);
    assert!(!material.uses_vertex_color());
    assert_eq!(material.string_gen_mask, "%SPECULAR_MAP");
}

#[test]
fn physical_material_toggle() {
    let mut material = Material::new(PHYSICS_NO_DRAW_NAME);
    assert!(!material.is_physical_material());

    material.enable_physical_material(true);
    assert!(material.is_physical_material());
    assert!(material.flags().contains(MtlFlags::NO_DRAW));

    material.enable_physical_material(false);
    assert!(!material.is_physical_material());
    assert_eq!(material.shader.as_deref(), Some("Illum"));
}

#[test]
fn textures_are_replaced_and_removed() {
    let mut material = Material::new("stone");
    material.set_texture(TextureMapType::Diffuse, "a.dds");
    material.set_texture(TextureMapType::Diffuse, "b.dds");
    assert_eq!(material.texture(TextureMapType::Diffuse), Some("b.dds"));
    assert_eq!(material.textures.as_ref().unwrap().elements.len(), 1);

    material.set_texture(TextureMapType::Diffuse, "");
    assert_eq!(material.texture(TextureMapType::Diffuse), None);
    assert!(material.textures.is_none());
}

#[test]
fn add_and_remove() {
    let mut group = MaterialGroup::new();
    assert!(group.add_material(Material::new("a")));
    assert!(group.add_material(Material::new("b")));
    assert!(!group.add_material(Material::new("a")));
    assert_eq!(group.material_count(), 2);

    assert!(group.remove_material("a"));
    assert!(!group.remove_material("a"));
    assert_eq!(group.find_material_index("b"), Some(0));
}

#[test]
fn written_file_reads_back() -> Result<(), anyhow::Error> {
    let mut group = MaterialGroup::new();
    let mut wood = Material::new("wood");
    wood.enable_use_vertex_color(true);
    wood.set_texture(TextureMapType::Diffuse, "textures/wood.dds");
    group.add_material(wood);

    let mut no_draw = Material::new(PHYSICS_NO_DRAW_NAME);
    no_draw.enable_physical_material(true);
    group.add_material(no_draw);

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("crate.mtl");
    group.write_file(&path)?;

    let xml = std::fs::read_to_string(&path)?;
    assert!(xml.starts_with("<Material MtlFlags=\"256\">"));

    let read_back = MaterialGroup::read_file(&path)?;
    assert_eq!(read_back, group);
    Ok(())
}
