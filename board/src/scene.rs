//! A retained ordered tree of visual nodes.
//!
//! This is the narrow boundary to whatever actually paints: the core creates
//! nodes, toggles classes, sets text and transforms, and keeps ordered child
//! lists patched; the host walks the tree read-only each frame and draws it
//! however it likes. Node ids are never reused, so a handle that outlives its
//! node degrades into a no-op (detached-element semantics).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Container,
    Piece,
    Marker,
    Label,
}

/// A partial transform update. Channels left as `None` keep their current
/// value; `x`/`y` are translate-percent, `deg` rotation degrees, `scale` a
/// scale factor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub deg: Option<f64>,
    pub scale: Option<f64>,
}

impl Transform {
    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn rotate(deg: f64) -> Self {
        Self {
            deg: Some(deg),
            ..Self::default()
        }
    }

    pub fn rescale(scale: f64) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }
}

/// A node's fully-resolved transform state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTransform {
    pub x: f64,
    pub y: f64,
    pub deg: f64,
    pub scale: f64,
}

impl Default for ResolvedTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            deg: 0.0,
            scale: 1.0,
        }
    }
}

struct NodeData {
    kind: NodeKind,
    classes: Vec<String>,
    text: String,
    transform: ResolvedTransform,
    children: Vec<NodeId>,
}

pub struct Scene {
    nodes: HashMap<NodeId, NodeData>,
    next_id: u64,
    root: NodeId,
}

pub type SceneHandle = Rc<RefCell<Scene>>;

impl Scene {
    pub fn new() -> Self {
        let mut scene = Self {
            nodes: HashMap::new(),
            next_id: 0,
            root: NodeId(0),
        };
        scene.root = scene.create(NodeKind::Container);
        scene
    }

    pub fn new_handle() -> SceneHandle {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            NodeData {
                kind,
                classes: Vec::new(),
                text: String::new(),
                transform: ResolvedTransform::default(),
                children: Vec::new(),
            },
        );
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(&id).map(|node| node.kind)
    }

    pub fn set_class(&mut self, id: NodeId, class: &str, on: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            let present = node.classes.iter().position(|c| c == class);
            match (on, present) {
                (true, None) => node.classes.push(class.to_string()),
                (false, Some(index)) => {
                    node.classes.remove(index);
                }
                _ => {}
            }
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|node| node.classes.iter().any(|c| c == class))
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.text = text.to_string();
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|node| node.text.as_str())
    }

    /// Merge a partial transform over the node's current one.
    pub fn set_transform(&mut self, id: NodeId, update: Transform) {
        if let Some(node) = self.nodes.get_mut(&id) {
            if let Some(x) = update.x {
                node.transform.x = x;
            }
            if let Some(y) = update.y {
                node.transform.y = y;
            }
            if let Some(deg) = update.deg {
                node.transform.deg = deg;
            }
            if let Some(scale) = update.scale {
                node.transform.scale = scale;
            }
        }
    }

    pub fn transform(&self, id: NodeId) -> ResolvedTransform {
        self.nodes
            .get(&id)
            .map(|node| node.transform)
            .unwrap_or_default()
    }

    /// Insert `child` into `parent`'s ordered children. An out-of-range index
    /// appends.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if !self.nodes.contains_key(&child) {
            return;
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            let index = index.min(node.children.len());
            node.children.insert(index, child);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.child_count(parent);
        self.insert_child(parent, index, child);
    }

    /// Detach and return the child at `index`. The node itself stays alive
    /// until `destroy`.
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> Option<NodeId> {
        let node = self.nodes.get_mut(&parent)?;
        if index < node.children.len() {
            Some(node.children.remove(index))
        } else {
            None
        }
    }

    /// Exchange two live child positions without disturbing the others.
    pub fn swap_children(&mut self, parent: NodeId, a: usize, b: usize) {
        if let Some(node) = self.nodes.get_mut(&parent) {
            if a < node.children.len() && b < node.children.len() {
                node.children.swap(a, b);
            }
        }
    }

    pub fn child_count(&self, parent: NodeId) -> usize {
        self.nodes
            .get(&parent)
            .map(|node| node.children.len())
            .unwrap_or(0)
    }

    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&parent)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Free a detached node and everything under it.
    pub fn destroy(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.destroy(child);
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_channels_merge_independently() {
        let mut scene = Scene::new();
        let node = scene.create(NodeKind::Piece);

        scene.set_transform(node, Transform::translate(100.0, 200.0));
        scene.set_transform(node, Transform::rotate(15.0));
        scene.set_transform(node, Transform::rescale(0.8));

        let t = scene.transform(node);
        assert_eq!((t.x, t.y, t.deg, t.scale), (100.0, 200.0, 15.0, 0.8));

        scene.set_transform(node, Transform::translate(300.0, 400.0));
        let t = scene.transform(node);
        assert_eq!(t.deg, 15.0);
        assert_eq!(t.scale, 0.8);
        assert_eq!((t.x, t.y), (300.0, 400.0));
    }

    #[test]
    fn class_toggling_is_idempotent() {
        let mut scene = Scene::new();
        let node = scene.create(NodeKind::Piece);
        scene.set_class(node, "ghost", true);
        scene.set_class(node, "ghost", true);
        assert!(scene.has_class(node, "ghost"));
        scene.set_class(node, "ghost", false);
        scene.set_class(node, "ghost", false);
        assert!(!scene.has_class(node, "ghost"));
    }

    #[test]
    fn child_order_operations() {
        let mut scene = Scene::new();
        let parent = scene.create(NodeKind::Container);
        let a = scene.create(NodeKind::Label);
        let b = scene.create(NodeKind::Label);
        let c = scene.create(NodeKind::Label);

        scene.append_child(parent, a);
        scene.append_child(parent, c);
        scene.insert_child(parent, 1, b);
        assert_eq!(scene.children(parent), vec![a, b, c]);

        scene.swap_children(parent, 0, 2);
        assert_eq!(scene.children(parent), vec![c, b, a]);

        let removed = scene.remove_child(parent, 1);
        assert_eq!(removed, Some(b));
        assert_eq!(scene.children(parent), vec![c, a]);
    }

    #[test]
    fn destroyed_node_handles_are_noops() {
        let mut scene = Scene::new();
        let node = scene.create(NodeKind::Marker);
        scene.destroy(node);

        scene.set_class(node, "orig", true);
        scene.set_transform(node, Transform::translate(1.0, 1.0));
        assert!(!scene.has_class(node, "orig"));
        assert_eq!(scene.transform(node), ResolvedTransform::default());
    }

    #[test]
    fn destroy_frees_subtrees() {
        let mut scene = Scene::new();
        let parent = scene.create(NodeKind::Container);
        let child = scene.create(NodeKind::Label);
        scene.append_child(parent, child);

        let before = scene.node_count();
        scene.destroy(parent);
        assert_eq!(scene.node_count(), before - 2);
        assert!(!scene.contains(child));
    }
}
