use std::collections::{HashSet, VecDeque};

use log::error;
use serde::{Deserialize, Serialize};

use crate::scene::content::ContentKind;
use crate::scene::graph::{NodeIndex, SceneGraph};

/// Explicit include and exclude verdicts by full node name. Nodes without a verdict inherit
/// the one of their closest ancestor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SceneNodeSelectionList {
    #[serde(default)]
    selected_nodes: Vec<String>,
    #[serde(default)]
    unselected_nodes: Vec<String>,
}

impl SceneNodeSelectionList {
    pub fn new() -> SceneNodeSelectionList {
        SceneNodeSelectionList::default()
    }

    pub fn selected_node_count(&self) -> usize {
        self.selected_nodes.len()
    }

    pub fn selected_nodes(&self) -> &[String] {
        &self.selected_nodes
    }

    pub fn unselected_node_count(&self) -> usize {
        self.unselected_nodes.len()
    }

    pub fn unselected_nodes(&self) -> &[String] {
        &self.unselected_nodes
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected_nodes.iter().any(|node| node == name)
    }

    pub fn is_unselected(&self, name: &str) -> bool {
        self.unselected_nodes.iter().any(|node| node == name)
    }

    /// Selecting a node drops a previous exclusion of it.
    pub fn add_selected_node(&mut self, name: &str) {
        if !self.is_selected(name) {
            self.selected_nodes.push(name.to_string());
        }
        self.unselected_nodes.retain(|node| node != name);
    }

    /// Deselecting a node turns it into an explicit exclusion.
    pub fn remove_selected_node(&mut self, name: &str) {
        self.selected_nodes.retain(|node| node != name);
        self.add_unselected_node(name);
    }

    pub fn add_unselected_node(&mut self, name: &str) {
        if !self.is_unselected(name) {
            self.unselected_nodes.push(name.to_string());
        }
    }

    pub fn remove_unselected_node(&mut self, name: &str) {
        self.unselected_nodes.retain(|node| node != name);
    }

    pub fn clear_selected_nodes(&mut self) {
        self.selected_nodes.clear();
    }

    pub fn clear_unselected_nodes(&mut self) {
        self.unselected_nodes.clear();
    }
}

pub struct SceneGraphSelector {}

impl SceneGraphSelector {
    /// Resolves `list` against `graph` breadth first from the root. The root itself is never
    /// part of the result.
    pub fn generate_target_nodes(
        graph: &SceneGraph,
        list: &SceneNodeSelectionList,
        filter: impl Fn(&SceneGraph, NodeIndex) -> bool,
    ) -> Vec<String> {
        let mut selected = list.selected_nodes().iter().cloned().collect::<HashSet<_>>();
        let mut unselected = list.unselected_nodes().iter().cloned().collect::<HashSet<_>>();

        // the root is always selected, its descendants can still be excluded
        let root_name = graph.get_node_name(graph.get_root()).unwrap_or_default().to_string();
        unselected.remove(&root_name);
        selected.insert(root_name);

        let mut target_nodes = Vec::new();
        let mut pending = VecDeque::from_iter(graph.children(graph.get_root()));
        while let Some(index) = pending.pop_front() {
            pending.extend(graph.children(index));

            let Some(name) = graph.get_node_name(index) else {
                continue;
            };

            if unselected.contains(name) {
                continue;
            }
            if selected.contains(name) {
                if filter(graph, index) {
                    target_nodes.push(name.to_string());
                }
                continue;
            }

            let parent_name = graph
                .get_node_parent(index)
                .and_then(|parent| graph.get_node_name(parent))
                .unwrap_or_default();
            if unselected.contains(parent_name) {
                unselected.insert(name.to_string());
            } else if selected.contains(parent_name) {
                selected.insert(name.to_string());
                if filter(graph, index) {
                    target_nodes.push(name.to_string());
                }
            } else {
                error!(
                    "Parent '{}' of node '{}' has not been resolved before its child",
                    parent_name, name
                );
                debug_assert!(false, "parent visited after child");
            }
        }
        target_nodes
    }

    pub fn select_all(graph: &SceneGraph, list: &mut SceneNodeSelectionList) {
        list.clear_selected_nodes();
        list.clear_unselected_nodes();
        for name in SceneGraphSelector::selectable_names(graph) {
            list.add_selected_node(name);
        }
    }

    pub fn unselect_all(graph: &SceneGraph, list: &mut SceneNodeSelectionList) {
        list.clear_selected_nodes();
        list.clear_unselected_nodes();
        for name in SceneGraphSelector::selectable_names(graph) {
            list.remove_selected_node(name);
        }
    }

    /// Writes the resolved membership back: every non end point node ends up with an explicit
    /// verdict, so later graph changes don't silently alter what was chosen.
    pub fn update_node_selection(graph: &SceneGraph, list: &mut SceneNodeSelectionList) {
        let target_nodes = SceneGraphSelector::generate_target_nodes(graph, list, |_, _| true)
            .into_iter()
            .collect::<HashSet<_>>();

        for name in SceneGraphSelector::selectable_names(graph) {
            if target_nodes.contains(name) {
                list.add_selected_node(name);
            } else {
                list.remove_selected_node(name);
            }
        }
    }

    /// Replaces the list with explicit verdicts for every node accepted by `filter`:
    /// selected if it is in `target_nodes`, unselected otherwise.
    pub fn update_target_nodes(
        graph: &SceneGraph,
        list: &mut SceneNodeSelectionList,
        target_nodes: &HashSet<String>,
        filter: impl Fn(&SceneGraph, NodeIndex) -> bool,
    ) {
        list.clear_selected_nodes();
        list.clear_unselected_nodes();

        for (index, name, _) in graph.node_pairs() {
            if index == graph.get_root() || !filter(graph, index) {
                continue;
            }

            if target_nodes.contains(name) {
                list.add_selected_node(name);
            } else {
                list.remove_selected_node(name);
            }
        }
    }

    fn selectable_names(graph: &SceneGraph) -> impl Iterator<Item = &str> {
        graph
            .node_pairs()
            .filter(move |(index, _, _)| *index != graph.get_root() && !graph.is_node_end_point(*index))
            .map(|(_, name, _)| name)
    }

    pub fn is_mesh(graph: &SceneGraph, index: NodeIndex) -> bool {
        graph
            .get_node_content(index)
            .is_some_and(|content| content.is_kind(ContentKind::Mesh))
    }

    /// Nodes that show up in a hierarchy view: everything except the root and end points.
    pub fn is_tree_view_type(graph: &SceneGraph, index: NodeIndex) -> bool {
        index != graph.get_root() && !graph.is_node_end_point(index)
    }
}
