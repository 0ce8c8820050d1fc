use std::collections::HashMap;
use std::sync::Arc;

use log::warn;

use crate::scene::content::NodeContent;

pub const NODE_SEPARATOR: char = '.';

/// Index into the parallel storages of a [`SceneGraph`]. Indices stay valid until the graph is cleared.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(u32);

impl NodeIndex {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    fn from_usize(index: usize) -> NodeIndex {
        NodeIndex(index as u32)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct NodeHeader {
    pub parent: Option<NodeIndex>,
    pub child: Option<NodeIndex>,
    pub sibling: Option<NodeIndex>,
    pub end_point: bool,
}

/// A single rooted tree of named nodes. Hierarchy, names and content are stored in parallel
/// vectors of the same length and order, names are the full dotted path of a node.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    hierarchy: Vec<NodeHeader>,
    names: Vec<String>,
    contents: Vec<Option<Arc<NodeContent>>>,
    name_lookup: HashMap<String, NodeIndex>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        SceneGraph::new()
    }
}

impl SceneGraph {
    pub fn new() -> SceneGraph {
        let mut graph = SceneGraph {
            hierarchy: Vec::new(),
            names: Vec::new(),
            contents: Vec::new(),
            name_lookup: HashMap::new(),
        };
        graph.add_default_root();
        graph
    }

    fn add_default_root(&mut self) {
        self.hierarchy.push(NodeHeader::default());
        self.names.push(String::new());
        self.contents.push(None);
        self.name_lookup.insert(String::new(), NodeIndex(0));
    }

    pub fn get_root(&self) -> NodeIndex {
        NodeIndex(0)
    }

    pub fn get_node_count(&self) -> usize {
        self.hierarchy.len()
    }

    pub fn is_valid_index(&self, index: NodeIndex) -> bool {
        index.as_usize() < self.hierarchy.len()
    }

    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty() && !name.contains(NODE_SEPARATOR)
    }

    /// The part of a dotted path after the last separator.
    pub fn get_short_name(name: &str) -> &str {
        match name.rfind(NODE_SEPARATOR) {
            Some(position) => &name[position + 1..],
            None => name,
        }
    }

    fn combine_name(path: &str, name: &str) -> String {
        if path.is_empty() {
            name.to_string()
        } else {
            format!("{}{}{}", path, NODE_SEPARATOR, name)
        }
    }

    pub fn find(&self, path: &str) -> Option<NodeIndex> {
        self.name_lookup.get(path).copied()
    }

    pub fn find_relative(&self, root: NodeIndex, relative_path: &str) -> Option<NodeIndex> {
        let root_name = self.names.get(root.as_usize())?;
        self.find(&SceneGraph::combine_name(root_name, relative_path))
    }

    pub fn get_node_name(&self, index: NodeIndex) -> Option<&str> {
        self.names.get(index.as_usize()).map(String::as_str)
    }

    pub fn get_node_header(&self, index: NodeIndex) -> Option<&NodeHeader> {
        self.hierarchy.get(index.as_usize())
    }

    pub fn get_node_parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.get_node_header(index)?.parent
    }

    pub fn get_node_child(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.get_node_header(index)?.child
    }

    pub fn get_node_sibling(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.get_node_header(index)?.sibling
    }

    /// Invalid indices count as end points, nothing can be attached to them.
    pub fn is_node_end_point(&self, index: NodeIndex) -> bool {
        self.get_node_header(index).is_none_or(|header| header.end_point)
    }

    pub fn has_node_content(&self, index: NodeIndex) -> bool {
        self.get_node_content(index).is_some()
    }

    pub fn get_node_content(&self, index: NodeIndex) -> Option<&Arc<NodeContent>> {
        self.contents.get(index.as_usize())?.as_ref()
    }

    pub fn set_content(&mut self, index: NodeIndex, content: NodeContent) -> bool {
        self.set_shared_content(index, Some(Arc::new(content)))
    }

    pub fn set_shared_content(&mut self, index: NodeIndex, content: Option<Arc<NodeContent>>) -> bool {
        match self.contents.get_mut(index.as_usize()) {
            Some(slot) => {
                *slot = content;
                true
            }
            None => false,
        }
    }

    pub fn make_end_point(&mut self, index: NodeIndex) -> bool {
        match self.hierarchy.get_mut(index.as_usize()) {
            Some(header) => {
                header.end_point = true;
                true
            }
            None => false,
        }
    }

    /// Appends `name` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeIndex, name: &str, content: Option<NodeContent>) -> Option<NodeIndex> {
        let header = self.get_node_header(parent)?;
        match header.child {
            Some(first_child) => self.add_sibling(first_child, name, content),
            None => {
                if header.end_point {
                    warn!(
                        "Can't add child '{}' to end point '{}'",
                        name, self.names[parent.as_usize()]
                    );
                    return None;
                }

                let index = self.append_node(parent, name, content)?;
                self.hierarchy[parent.as_usize()].child = Some(index);
                Some(index)
            }
        }
    }

    /// Appends `name` after the last sibling of `sibling`, sharing its parent.
    pub fn add_sibling(&mut self, sibling: NodeIndex, name: &str, content: Option<NodeContent>) -> Option<NodeIndex> {
        if !self.is_valid_index(sibling) {
            return None;
        }

        let mut last = sibling;
        while let Some(next) = self.hierarchy[last.as_usize()].sibling {
            last = next;
        }

        let Some(parent) = self.hierarchy[last.as_usize()].parent else {
            warn!("Can't add sibling '{}' to the root node", name);
            return None;
        };

        let index = self.append_node(parent, name, content)?;
        self.hierarchy[last.as_usize()].sibling = Some(index);
        Some(index)
    }

    fn append_node(&mut self, parent: NodeIndex, name: &str, content: Option<NodeContent>) -> Option<NodeIndex> {
        if !SceneGraph::is_valid_name(name) {
            warn!("Invalid scene graph node name '{}'", name);
            return None;
        }

        let full_name = SceneGraph::combine_name(&self.names[parent.as_usize()], name);
        if self.name_lookup.contains_key(&full_name) {
            warn!("Duplicate scene graph node name '{}'", full_name);
            return None;
        }

        let index = NodeIndex::from_usize(self.hierarchy.len());
        self.hierarchy.push(NodeHeader {
            parent: Some(parent),
            ..NodeHeader::default()
        });
        self.name_lookup.insert(full_name.clone(), index);
        self.names.push(full_name);
        self.contents.push(content.map(Arc::new));
        Some(index)
    }

    /// Removes every node but a fresh root.
    pub fn clear(&mut self) {
        self.hierarchy.clear();
        self.names.clear();
        self.contents.clear();
        self.name_lookup.clear();
        self.add_default_root();
    }

    pub fn hierarchy_storage(&self) -> &[NodeHeader] {
        &self.hierarchy
    }

    pub fn name_storage(&self) -> &[String] {
        &self.names
    }

    pub fn content_storage(&self) -> &[Option<Arc<NodeContent>>] {
        &self.contents
    }

    pub fn convert_storage_index(&self, storage_index: usize) -> Option<NodeIndex> {
        (storage_index < self.hierarchy.len()).then(|| NodeIndex::from_usize(storage_index))
    }
}
