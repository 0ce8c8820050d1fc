//! Iterator views over a [`SceneGraph`]. They only borrow the graph and can be freely combined
//! with the std iterator adaptors.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::scene::content::{ContentKind, NodeContent};
use crate::scene::graph::{NodeIndex, SceneGraph};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Traversal {
    DepthFirst,
    BreadthFirst,
}

/// Visits `start` and its whole subtree. Siblings of `start` are not visited.
pub struct Downwards<'a> {
    graph: &'a SceneGraph,
    pending: VecDeque<NodeIndex>,
    traversal: Traversal,
}

impl Iterator for Downwards<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = match self.traversal {
            Traversal::DepthFirst => self.pending.pop_back()?,
            Traversal::BreadthFirst => self.pending.pop_front()?,
        };

        let children = Children::new(self.graph, current);
        match self.traversal {
            Traversal::BreadthFirst => self.pending.extend(children),
            // reversed, so the first child is popped first
            Traversal::DepthFirst => {
                let children = children.collect::<Vec<_>>();
                self.pending.extend(children.into_iter().rev());
            }
        }
        Some(current)
    }
}

/// Walks from a node to the root, both included.
pub struct Upwards<'a> {
    graph: &'a SceneGraph,
    current: Option<NodeIndex>,
}

impl Iterator for Upwards<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.graph.get_node_parent(current);
        Some(current)
    }
}

/// The direct children of a node, in insertion order.
pub struct Children<'a> {
    graph: &'a SceneGraph,
    current: Option<NodeIndex>,
}

impl<'a> Children<'a> {
    fn new(graph: &'a SceneGraph, parent: NodeIndex) -> Children<'a> {
        Children {
            graph,
            current: graph.get_node_child(parent),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.graph.get_node_sibling(current);
        Some(current)
    }
}

impl SceneGraph {
    pub fn downwards(&self, start: NodeIndex, traversal: Traversal) -> Downwards<'_> {
        let mut pending = VecDeque::new();
        if self.is_valid_index(start) {
            pending.push_back(start);
        }
        Downwards {
            graph: self,
            pending,
            traversal,
        }
    }

    pub fn upwards(&self, start: NodeIndex) -> Upwards<'_> {
        Upwards {
            graph: self,
            current: self.is_valid_index(start).then_some(start),
        }
    }

    pub fn children(&self, parent: NodeIndex) -> Children<'_> {
        Children::new(self, parent)
    }

    /// Every node paired with its full name and content, in storage order.
    pub fn node_pairs(&self) -> impl Iterator<Item = (NodeIndex, &str, Option<&Arc<NodeContent>>)> {
        self.name_storage()
            .iter()
            .zip(self.content_storage())
            .enumerate()
            .filter_map(|(storage_index, (name, content))| {
                let index = self.convert_storage_index(storage_index)?;
                Some((index, name.as_str(), content.as_ref()))
            })
    }
}

/// Pairs every index with its content, dropping nodes without any.
pub fn with_content<'a>(
    graph: &'a SceneGraph,
    nodes: impl Iterator<Item = NodeIndex> + 'a,
) -> impl Iterator<Item = (NodeIndex, &'a NodeContent)> + 'a {
    nodes.filter_map(move |index| Some((index, graph.get_node_content(index)?.as_ref())))
}

pub fn of_kind<'a>(
    graph: &'a SceneGraph,
    nodes: impl Iterator<Item = NodeIndex> + 'a,
    kind: ContentKind,
) -> impl Iterator<Item = NodeIndex> + 'a {
    with_content(graph, nodes)
        .filter(move |(_, content)| content.is_kind(kind))
        .map(|(index, _)| index)
}

/// Converts the content of every node with `convert`, dropping nodes it doesn't apply to.
pub fn convert<'a, T: 'a>(
    graph: &'a SceneGraph,
    nodes: impl Iterator<Item = NodeIndex> + 'a,
    convert: impl Fn(&'a NodeContent) -> Option<&'a T> + 'a,
) -> impl Iterator<Item = (NodeIndex, &'a T)> + 'a {
    with_content(graph, nodes).filter_map(move |(index, content)| Some((index, convert(content)?)))
}
