use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, trace};
use quick_xml::de::Deserializer;
use serde::Deserialize;

use crate::MtlError;
use crate::material::{Material, MtlFlags, SubMaterials};

/// The materials of one `.mtl` file, in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialGroup {
    materials: Vec<Material>,
}

impl MaterialGroup {
    pub fn new() -> MaterialGroup {
        MaterialGroup::default()
    }

    pub fn read<R: BufRead>(read: R) -> Result<MaterialGroup, MtlError> {
        let mut deserializer = Deserializer::from_reader(read);
        let root = Material::deserialize(&mut deserializer)?;
        Ok(MaterialGroup::from_root(root))
    }

    pub fn read_str(xml: &str) -> Result<MaterialGroup, MtlError> {
        let mut deserializer = Deserializer::from_str(xml);
        let root = Material::deserialize(&mut deserializer)?;
        Ok(MaterialGroup::from_root(root))
    }

    pub fn read_file(path: &Path) -> Result<MaterialGroup, MtlError> {
        let group = MaterialGroup::read(BufReader::new(File::open(path)?))?;
        debug!("Read {} materials from {}", group.material_count(), path.display());
        Ok(group)
    }

    fn from_root(root: Material) -> MaterialGroup {
        match root.sub_materials {
            Some(sub_materials) => MaterialGroup {
                materials: sub_materials.elements,
            },
            // a single material file
            None if root.name.is_some() => MaterialGroup { materials: vec![root] },
            None => MaterialGroup::default(),
        }
    }

    pub fn to_xml_string(&self) -> Result<String, MtlError> {
        let root = Material {
            mtl_flags: MtlFlags::MULTI_SUBMTL.bits(),
            sub_materials: Some(SubMaterials {
                elements: self.materials.clone(),
            }),
            ..Material::default()
        };

        quick_xml::se::to_string_with_root("Material", &root).map_err(|e| MtlError::SerializeError(e.to_string()))
    }

    pub fn write_file(&self, path: &Path) -> Result<(), MtlError> {
        let xml = self.to_xml_string()?;
        std::fs::write(path, xml)?;
        debug!("Wrote {} materials to {}", self.material_count(), path.display());
        Ok(())
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn material(&self, index: usize) -> Option<&Material> {
        self.materials.get(index)
    }

    pub fn material_mut(&mut self, index: usize) -> Option<&mut Material> {
        self.materials.get_mut(index)
    }

    pub fn find_material_index(&self, name: &str) -> Option<usize> {
        self.materials.iter().position(|material| material.name() == name)
    }

    /// Returns false if a material of the same name already exists.
    pub fn add_material(&mut self, material: Material) -> bool {
        if self.find_material_index(material.name()).is_some() {
            trace!("Material {} already in group", material.name());
            return false;
        }
        self.materials.push(material);
        true
    }

    pub fn remove_material(&mut self, name: &str) -> bool {
        match self.find_material_index(name) {
            Some(index) => {
                self.materials.remove(index);
                true
            }
            None => false,
        }
    }
}
