use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::manifest::groups::{ManifestObject, MeshGroup};

pub mod groups;
pub mod rules;

/// File extension of the manifest sidecar that lives next to a scene source.
pub const MANIFEST_EXTENSION: &str = "assetinfo";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error("Malformed manifest: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Duplicate manifest entry '{name}'")]
    DuplicateEntry { name: String },
}

#[derive(Serialize, Deserialize)]
struct ManifestEntry {
    name: String,
    object: ManifestObject,
}

#[derive(Serialize, Deserialize, Default)]
struct ManifestFile {
    #[serde(default)]
    values: Vec<ManifestEntry>,
}

/// Named export configurations in insertion order.
#[derive(Debug, Clone, Default)]
pub struct SceneManifest {
    names: Vec<String>,
    values: Vec<ManifestObject>,
    name_lookup: HashMap<String, usize>,
}

impl SceneManifest {
    pub fn new() -> SceneManifest {
        SceneManifest::default()
    }

    /// Returns false if the name is already taken.
    pub fn add_entry(&mut self, name: &str, value: ManifestObject) -> bool {
        if self.name_lookup.contains_key(name) {
            warn!("Manifest already contains an entry named '{}'", name);
            return false;
        }

        self.name_lookup.insert(name.to_string(), self.values.len());
        self.names.push(name.to_string());
        self.values.push(value);
        true
    }

    pub fn remove_entry(&mut self, name: &str) -> bool {
        let Some(index) = self.name_lookup.remove(name) else {
            return false;
        };

        self.names.remove(index);
        self.values.remove(index);
        for value in self.name_lookup.values_mut() {
            if *value > index {
                *value -= 1;
            }
        }
        true
    }

    pub fn rename_entry(&mut self, old_name: &str, new_name: &str) -> bool {
        if self.name_lookup.contains_key(new_name) {
            return false;
        }
        let Some(index) = self.name_lookup.remove(old_name) else {
            return false;
        };

        self.names[index] = new_name.to_string();
        self.name_lookup.insert(new_name.to_string(), index);
        true
    }

    pub fn find_index(&self, name: &str) -> Option<usize> {
        self.name_lookup.get(name).copied()
    }

    pub fn find_value(&self, name: &str) -> Option<&ManifestObject> {
        self.values.get(self.find_index(name)?)
    }

    pub fn find_value_mut(&mut self, name: &str) -> Option<&mut ManifestObject> {
        let index = self.find_index(name)?;
        self.values.get_mut(index)
    }

    pub fn get_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn get_value(&self, index: usize) -> Option<&ManifestObject> {
        self.values.get(index)
    }

    pub fn entry_count(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.names.clear();
        self.values.clear();
        self.name_lookup.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestObject)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    pub fn mesh_groups(&self) -> impl Iterator<Item = (&str, &MeshGroup)> {
        self.iter()
            .filter_map(|(name, value)| Some((name, value.as_mesh_group()?)))
    }

    /// Replaces the current entries. On error the manifest is left empty.
    pub fn load_from_str(&mut self, json: &str) -> Result<(), ManifestError> {
        self.clear();
        let file: ManifestFile = serde_json::from_str(json)?;
        self.load_entries(file)
    }

    /// Replaces the current entries. On error the manifest is left empty.
    pub fn load_from_file(&mut self, path: &Path) -> Result<(), ManifestError> {
        self.clear();
        let file: ManifestFile = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        self.load_entries(file)?;
        debug!("Loaded {} manifest entries from {}", self.entry_count(), path.display());
        Ok(())
    }

    fn load_entries(&mut self, file: ManifestFile) -> Result<(), ManifestError> {
        for entry in file.values {
            if !self.add_entry(&entry.name, entry.object) {
                self.clear();
                return Err(ManifestError::DuplicateEntry { name: entry.name });
            }
        }
        Ok(())
    }

    fn to_file(&self) -> ManifestFile {
        ManifestFile {
            values: self
                .iter()
                .map(|(name, object)| ManifestEntry {
                    name: name.to_string(),
                    object: object.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json_string(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(&self.to_file())?)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ManifestError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &self.to_file())?;
        debug!("Saved {} manifest entries to {}", self.entry_count(), path.display());
        Ok(())
    }
}
