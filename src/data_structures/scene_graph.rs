//! Scene graph and hierarchical scene organization.
//!
//! The graph is an arena: nodes live in one `Vec` and refer to each other by
//! [`NodeId`]. Every node keeps a `(local, world)` transform pair; world
//! transforms are recomputed top-down by [`SceneGraph::update_world_transforms`]
//! as `parent_world * local`.

use std::sync::Arc;

use log::warn;

use crate::data_structures::{
    geometry::Geometry,
    instance::Instance,
    material::Material,
    texture::Texture,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Which of the two tendon pools an instanced node draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    Cylinders,
    Spheres,
}

/// A reflective ground quad.
#[derive(Debug, Clone, PartialEq)]
pub struct Reflector {
    pub geometry: Arc<Geometry>,
    pub clip_bias: f32,
    pub texture: Option<Arc<Texture>>,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Plain grouping node.
    Group,
    /// The group of one physics body.
    Body { body_id: usize, has_custom_mesh: bool },
    Mesh {
        geometry: Arc<Geometry>,
        material: Arc<Material>,
        body_id: usize,
    },
    Reflector(Reflector),
    /// Index into the scene's light list.
    Light(usize),
    Instanced(PoolKind),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub local: Instance,
    pub world: Instance,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    /// Detached nodes stay in the arena but are no longer part of the tree.
    pub detached: bool,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            children: Vec::new(),
            local: Instance::new(),
            world: Instance::new(),
            cast_shadow: false,
            receive_shadow: false,
            detached: false,
        }
    }

    pub fn with_local(mut self, local: Instance) -> Self {
        self.local = local;
        self
    }

    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }

    pub fn body_id(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Body { body_id, .. } | NodeKind::Mesh { body_id, .. } => Some(body_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Insert a node without a parent.
    pub fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Insert `node` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.add(node);
        self.attach(parent, id);
        id
    }

    /// Move an existing node under `parent`.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.get(parent).is_none() || self.get(child).is_none() {
            warn!("Cannot attach {child:?} to {parent:?}");
            return;
        }
        if let Some(old) = self.nodes[child.0].parent {
            self.nodes[old.0].children.retain(|&c| c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].detached = false;
        self.nodes[parent.0].children.push(child);
    }

    /// Remove `id` from its parent. The subtree is kept in the arena but is
    /// skipped by traversals starting above it.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.get(id).and_then(|node| node.parent) else {
            if let Some(node) = self.get_mut(id) {
                node.detached = true;
            }
            return;
        };
        self.nodes[parent.0].children.retain(|&c| c != id);
        self.nodes[id.0].parent = None;
        self.nodes[id.0].detached = true;
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    pub fn set_local_transform(&mut self, id: NodeId, instance: Instance) {
        if let Some(node) = self.get_mut(id) {
            node.local = instance;
        }
    }

    pub fn get_local_transform(&self, id: NodeId) -> Option<Instance> {
        self.get(id).map(|node| node.local)
    }

    pub fn get_world_transform(&self, id: NodeId) -> Option<Instance> {
        self.get(id).map(|node| node.world)
    }

    /// Recompute world transforms of `root` and everything below it. The
    /// root's own parent world transform is taken as-is.
    pub fn update_world_transforms(&mut self, root: NodeId) {
        let parent_world = self
            .get(root)
            .and_then(|node| node.parent)
            .and_then(|parent| self.get_world_transform(parent))
            .unwrap_or_default();
        let mut stack = vec![(root, parent_world)];
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(id.0) else {
                continue;
            };
            node.world = &parent_world * &node.local;
            let world = node.world;
            stack.extend(node.children.iter().map(|&child| (child, world)));
        }
    }

    /// Depth-first pre-order traversal of the subtree at `root`.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                out.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn find_by_name(&self, root: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&id| self.nodes[id.0].name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }
}
