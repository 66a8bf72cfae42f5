// osgjs-scene/src/node.rs
//! Scene graph nodes

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use osgjs_core::{Matrix, ObjectId, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::animation::UpdateCallback;
use crate::geometry::Geometry;
use crate::state::{Light, StateSet};

/// Closed set of node variants the exporter understands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    Group {
        #[serde(default)]
        children: Vec<Arc<Node>>,
    },
    MatrixTransform {
        matrix: Matrix,
        #[serde(default)]
        children: Vec<Arc<Node>>,
    },
    PositionAttitudeTransform {
        #[serde(default)]
        position: Vec3,
        #[serde(default)]
        attitude: Quat,
        #[serde(default = "unit_scale")]
        scale: Vec3,
        #[serde(default)]
        pivot: Vec3,
        #[serde(default)]
        children: Vec<Arc<Node>>,
    },
    Projection {
        matrix: Matrix,
        #[serde(default)]
        children: Vec<Arc<Node>>,
    },
    LightSource {
        #[serde(default)]
        light: Option<Light>,
        #[serde(default)]
        children: Vec<Arc<Node>>,
    },
    /// Leaf container of drawables
    Geode {
        #[serde(default)]
        drawables: Vec<Arc<Node>>,
    },
    Geometry(Geometry),
    /// Host node type with no document representation; its children are
    /// still reachable
    Unsupported {
        class_name: String,
        #[serde(default)]
        children: Vec<Arc<Node>>,
    },
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

/// Scene graph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Empty when unnamed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_set: Option<Arc<StateSet>>,
    /// Update callback chain, front to back
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub update_callbacks: Vec<UpdateCallback>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: String::new(),
            state_set: None,
            update_callbacks: Vec::new(),
            kind,
        }
    }

    pub fn group() -> Self {
        Self::new(NodeKind::Group { children: Vec::new() })
    }

    pub fn geode() -> Self {
        Self::new(NodeKind::Geode { drawables: Vec::new() })
    }

    pub fn geometry(geometry: Geometry) -> Self {
        Self::new(NodeKind::Geometry(geometry))
    }

    pub fn matrix_transform(matrix: Matrix) -> Self {
        Self::new(NodeKind::MatrixTransform {
            matrix,
            children: Vec::new(),
        })
    }

    pub fn position_attitude_transform(position: Vec3, attitude: Quat, scale: Vec3) -> Self {
        Self::new(NodeKind::PositionAttitudeTransform {
            position,
            attitude,
            scale,
            pivot: Vec3::ZERO,
            children: Vec::new(),
        })
    }

    pub fn projection(matrix: Matrix) -> Self {
        Self::new(NodeKind::Projection {
            matrix,
            children: Vec::new(),
        })
    }

    pub fn light_source(light: Option<Light>) -> Self {
        Self::new(NodeKind::LightSource {
            light,
            children: Vec::new(),
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_state_set(mut self, state_set: Arc<StateSet>) -> Self {
        self.state_set = Some(state_set);
        self
    }

    pub fn with_callback(mut self, callback: UpdateCallback) -> Self {
        self.update_callbacks.push(callback);
        self
    }

    /// Append a child (a drawable for geodes); ignored by geometries
    pub fn with_child(mut self, child: Arc<Node>) -> Self {
        self.add_child(child);
        self
    }

    /// Append a child (a drawable for geodes). Returns false for geometries,
    /// which cannot have children.
    pub fn add_child(&mut self, child: Arc<Node>) -> bool {
        match self.children_mut() {
            Some(children) => {
                children.push(child);
                true
            }
            None => false,
        }
    }

    /// Children of container nodes, drawables of geodes
    pub fn children(&self) -> &[Arc<Node>] {
        match &self.kind {
            NodeKind::Group { children }
            | NodeKind::MatrixTransform { children, .. }
            | NodeKind::PositionAttitudeTransform { children, .. }
            | NodeKind::Projection { children, .. }
            | NodeKind::LightSource { children, .. }
            | NodeKind::Unsupported { children, .. } => children,
            NodeKind::Geode { drawables } => drawables,
            NodeKind::Geometry(_) => &[],
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Arc<Node>>> {
        match &mut self.kind {
            NodeKind::Group { children }
            | NodeKind::MatrixTransform { children, .. }
            | NodeKind::PositionAttitudeTransform { children, .. }
            | NodeKind::Projection { children, .. }
            | NodeKind::LightSource { children, .. }
            | NodeKind::Unsupported { children, .. } => Some(children),
            NodeKind::Geode { drawables } => Some(drawables),
            NodeKind::Geometry(_) => None,
        }
    }

    /// Host class name, used in diagnostics
    pub fn class_name(&self) -> &str {
        match &self.kind {
            NodeKind::Group { .. } => "Group",
            NodeKind::MatrixTransform { .. } => "MatrixTransform",
            NodeKind::PositionAttitudeTransform { .. } => "PositionAttitudeTransform",
            NodeKind::Projection { .. } => "Projection",
            NodeKind::LightSource { .. } => "LightSource",
            NodeKind::Geode { .. } => "Geode",
            NodeKind::Geometry(_) => "Geometry",
            NodeKind::Unsupported { class_name, .. } => class_name,
        }
    }

    pub fn as_geometry(&self) -> Option<&Geometry> {
        match &self.kind {
            NodeKind::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }

    pub fn as_geometry_mut(&mut self) -> Option<&mut Geometry> {
        match &mut self.kind {
            NodeKind::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }

    /// Copy every node of the graph into fresh allocations. Subgraphs shared
    /// inside the graph stay shared in the copy; state sets are not copied.
    pub fn deep_clone(&self) -> Node {
        let mut copies = HashMap::new();
        self.deep_clone_with(&mut copies)
    }

    fn deep_clone_with(&self, copies: &mut HashMap<ObjectId, Arc<Node>>) -> Node {
        let mut copy = Node {
            name: self.name.clone(),
            state_set: self.state_set.clone(),
            update_callbacks: self.update_callbacks.clone(),
            kind: self.kind.clone(),
        };
        if let Some(children) = copy.children_mut() {
            for child in children.iter_mut() {
                let id = ObjectId::of(Arc::as_ptr(child));
                let cloned = match copies.get(&id) {
                    Some(existing) => Arc::clone(existing),
                    None => {
                        let fresh = Arc::new(child.deep_clone_with(copies));
                        copies.insert(id, Arc::clone(&fresh));
                        fresh
                    }
                };
                *child = cloned;
            }
        }
        copy
    }

    /// Apply `f` to every distinct geometry of the graph, depth first.
    /// Nodes held from outside the graph are copied on write; a subgraph
    /// shared inside the graph is rewritten once and every parent is
    /// pointed at the same rewritten node.
    pub fn for_each_geometry_mut(&mut self, f: &mut dyn FnMut(&mut Geometry)) {
        let mut rewritten = HashMap::new();
        self.rewrite_geometries(f, &mut rewritten);
    }

    fn rewrite_geometries(
        &mut self,
        f: &mut dyn FnMut(&mut Geometry),
        rewritten: &mut HashMap<ObjectId, (Option<Arc<Node>>, Arc<Node>)>,
    ) {
        if let Some(geometry) = self.as_geometry_mut() {
            f(geometry);
            return;
        }
        let Some(children) = self.children_mut() else {
            return;
        };
        for child in children.iter_mut() {
            let id = ObjectId::of(Arc::as_ptr(child));
            if let Some((_, done)) = rewritten.get(&id) {
                *child = Arc::clone(done);
                continue;
            }
            // a shared node is copied; the original is held so its address
            // stays unique while it is a key
            let original = (Arc::strong_count(child) > 1).then(|| Arc::clone(child));
            Arc::make_mut(child).rewrite_geometries(f, rewritten);
            rewritten.insert(id, (original, Arc::clone(child)));
        }
    }

    /// Count the distinct objects reachable from this node
    pub fn stats(&self) -> SceneStats {
        let mut stats = SceneStats::default();
        let mut seen_nodes = HashSet::new();
        let mut seen_states = HashSet::new();
        self.collect_stats(&mut stats, &mut seen_nodes, &mut seen_states);
        stats
    }

    fn collect_stats(
        &self,
        stats: &mut SceneStats,
        seen_nodes: &mut HashSet<ObjectId>,
        seen_states: &mut HashSet<ObjectId>,
    ) {
        stats.nodes += 1;
        stats.update_callbacks += self.update_callbacks.len();
        if let Some(ss) = &self.state_set {
            if seen_states.insert(ObjectId::of(Arc::as_ptr(ss))) {
                stats.state_sets += 1;
            }
        }
        if let Some(geometry) = self.as_geometry() {
            stats.geometries += 1;
            stats.vertices += geometry.vertex_count();
            stats.primitive_sets += geometry.primitive_sets.len();
        }
        for child in self.children() {
            if seen_nodes.insert(ObjectId::of(Arc::as_ptr(child))) {
                child.collect_stats(stats, seen_nodes, seen_states);
            } else {
                stats.shared_references += 1;
            }
        }
    }
}

/// Summary of a scene graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SceneStats {
    pub nodes: usize,
    pub geometries: usize,
    pub vertices: usize,
    pub primitive_sets: usize,
    pub state_sets: usize,
    pub update_callbacks: usize,
    /// Extra parent links to already counted nodes
    pub shared_references: usize,
}
