//! Graph traversal engine
//!
//! Walks a scene graph depth first and assembles the document tree. Each
//! recursive call builds the object of one node, attaches its fully built
//! children, and hands the result back to its caller, which attaches it to
//! its own object. Ancestry and inherited state travel down as an immutable
//! [`TraversalContext`] value, so nothing has to be pushed or popped on
//! shared stacks.
//!
//! Shared subgraphs are encoded once: a second visit of the same `Arc<Node>`
//! attaches the already built object under the new parent.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use osgjs_core::{Error, Matrix, ObjectId, Result, StructuralError};
use osgjs_scene::{Geometry, Node, NodeKind, StateSet, MAX_TEXTURE_UNITS};
use tracing::{debug, error, trace, warn};

use crate::buffer::encode_buffer;
use crate::callback::{encode_callbacks, UPDATE_CALLBACKS_KEY};
use crate::document::{Document, Object, Value};
use crate::primitive::encode_primitive_set;
use crate::state::{encode_light, state_set_value, StateEncoder, STATE_SET_KEY};

/// Position of the visitor in the graph: the ancestor chain and the state
/// set in effect. Lives on the call stack of one recursive step.
#[derive(Debug, Clone, Copy)]
pub struct TraversalContext<'a> {
    parent: Option<&'a TraversalContext<'a>>,
    label: &'a str,
    state_set: Option<&'a Arc<StateSet>>,
    depth: usize,
}

impl<'a> TraversalContext<'a> {
    /// Context above the scene root
    pub fn root() -> Self {
        Self {
            parent: None,
            label: "",
            state_set: None,
            depth: 0,
        }
    }

    /// Context for visiting `node` below this one
    pub fn enter(&'a self, node: &'a Node) -> TraversalContext<'a> {
        let label = if node.name.is_empty() {
            node.class_name()
        } else {
            node.name.as_str()
        };
        TraversalContext {
            parent: Some(self),
            label,
            state_set: node.state_set.as_ref().or(self.state_set),
            depth: self.depth + 1,
        }
    }

    /// Number of nodes from the scene root to here, inclusive
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Closest state set on the path to the root
    pub fn inherited_state(&self) -> Option<&'a Arc<StateSet>> {
        self.state_set
    }

    /// Node labels from the scene root down to here
    pub fn path(&self) -> Vec<&'a str> {
        let mut labels = Vec::with_capacity(self.depth);
        let mut current = Some(self);
        while let Some(ctx) = current {
            if ctx.parent.is_some() {
                labels.push(ctx.label);
            }
            current = ctx.parent;
        }
        labels.reverse();
        labels
    }
}

impl fmt::Display for TraversalContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path().join("/"))
    }
}

/// Encoded node with the wrapper key it is attached under
type Encoded = (&'static str, Arc<Object>);

/// Depth-first document builder. One instance per encode call; its memo
/// tables die with it. Memoized nodes are held alive alongside their
/// objects so their addresses stay unique.
#[derive(Debug, Default)]
pub struct WriteVisitor {
    states: StateEncoder,
    nodes: HashMap<ObjectId, (Arc<Node>, Encoded)>,
}

impl WriteVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a whole graph. Fails without a partial document on the first
    /// structural error.
    pub fn encode(mut self, root: &Node) -> Result<Document> {
        let mut container = Object::new();
        let top = TraversalContext::root();
        if let Some((key, obj)) = self.visit(root, &top, &mut container)? {
            container.add_child(key, obj);
        }
        debug!(
            nodes = self.nodes.len() + 1,
            state_sets = self.states.len(),
            "Scene graph encoded"
        );
        Ok(Document::new(Arc::new(container)))
    }

    /// Visit a child reached through a parent link, reusing the object of an
    /// already encoded instance
    fn visit_child(
        &mut self,
        child: &Arc<Node>,
        ctx: &TraversalContext<'_>,
        parent: &mut Object,
    ) -> Result<()> {
        let id = ObjectId::of(Arc::as_ptr(child));
        if let Some((_, (key, obj))) = self.nodes.get(&id) {
            trace!(path = %ctx, node = %id, "Attaching shared subgraph by reference");
            parent.add_child(key, Arc::clone(obj));
            return Ok(());
        }

        if let Some((key, obj)) = self.visit(child, ctx, parent)? {
            self.nodes.insert(id, (Arc::clone(child), (key, Arc::clone(&obj))));
            parent.add_child(key, obj);
        }
        Ok(())
    }

    /// Build the object of `node`. Unsupported nodes produce nothing and
    /// attach their children straight to `parent`.
    fn visit(
        &mut self,
        node: &Node,
        outer: &TraversalContext<'_>,
        parent: &mut Object,
    ) -> Result<Option<Encoded>> {
        let ctx = outer.enter(node);

        let (key, matrix) = match &node.kind {
            NodeKind::Group { .. } | NodeKind::Geode { .. } => ("osg.Node", None),
            NodeKind::MatrixTransform { matrix, .. } => ("osg.MatrixTransform", Some(*matrix)),
            NodeKind::PositionAttitudeTransform {
                position,
                attitude,
                scale,
                pivot,
                ..
            } => (
                "osg.MatrixTransform",
                Some(Matrix::position_attitude(*position, *attitude, *scale, *pivot)),
            ),
            NodeKind::Projection { matrix, .. } => ("osg.Projection", Some(*matrix)),
            NodeKind::LightSource { .. } => ("osg.LightSource", None),
            NodeKind::Geometry(geometry) => {
                let obj = self.encode_geometry(node, geometry, &ctx)?;
                return Ok(Some(("osg.Geometry", obj)));
            }
            NodeKind::Unsupported { class_name, children } => {
                warn!(path = %ctx, class = %class_name, "Node type not supported, keeping its children only");
                for child in children {
                    self.visit_child(child, outer, parent)?;
                }
                return Ok(None);
            }
        };

        trace!(path = %ctx, depth = ctx.depth(), "Encoding {}", node.class_name());

        let mut obj = Object::new();
        self.write_common(node, &mut obj);
        if let Some(matrix) = matrix {
            obj.insert("Matrix", Value::matrix(&matrix));
        }
        if let NodeKind::LightSource { light: Some(light), .. } = &node.kind {
            obj.insert("Light", Object::wrap("osg.Light", encode_light(light)));
        }

        for child in node.children() {
            self.visit_child(child, &ctx, &mut obj)?;
        }

        Ok(Some((key, Arc::new(obj))))
    }

    /// `UpdateCallbacks`, `StateSet`, `Name`, in that order
    fn write_common(&mut self, node: &Node, obj: &mut Object) {
        if let Some(callbacks) = encode_callbacks(&node.update_callbacks) {
            obj.insert(UPDATE_CALLBACKS_KEY, callbacks);
        }
        self.write_state_and_name(node, obj);
    }

    /// `StateSet`, `Name`, in that order
    fn write_state_and_name(&mut self, node: &Node, obj: &mut Object) {
        if let Some(state) = node.state_set.as_ref().and_then(|ss| self.states.encode(ss)) {
            obj.insert(STATE_SET_KEY, state_set_value(state));
        }
        if !node.name.is_empty() {
            obj.insert("Name", node.name.as_str());
        }
    }

    fn encode_geometry(
        &mut self,
        node: &Node,
        geometry: &Geometry,
        ctx: &TraversalContext<'_>,
    ) -> Result<Arc<Object>> {
        if let Err(e) = validate_geometry(&node.name, geometry) {
            error!(path = %ctx, error = %e, "Invalid geometry, aborting");
            return Err(Error::Structural(e).with_context(format!("encoding {ctx}")));
        }

        let extra = geometry.extra_tex_coord_units();
        if !extra.is_empty() {
            warn!(path = %ctx, units = ?extra, "Texture units past {} are not written", MAX_TEXTURE_UNITS - 1);
        }

        if !node.update_callbacks.is_empty() {
            debug!(path = %ctx, callbacks = node.update_callbacks.len(), "Drawables carry no update callbacks, skipping");
        }

        let mut obj = Object::new();
        self.write_state_and_name(node, &mut obj);

        let mut attributes = Object::new();
        for (semantic, array) in geometry.attributes() {
            attributes.insert(semantic.to_string(), encode_buffer(array).to_object());
        }
        obj.insert("VertexAttributeList", attributes);

        if !geometry.primitive_sets.is_empty() {
            let primitives: Vec<Value> = geometry
                .primitive_sets
                .iter()
                .filter_map(encode_primitive_set)
                .map(|p| Value::from(p.to_entry()))
                .collect();
            obj.insert("PrimitiveSetList", primitives);
        }

        trace!(
            path = %ctx,
            vertices = geometry.vertex_count(),
            inherits_state = ctx.inherited_state().is_some(),
            "Geometry encoded"
        );
        Ok(Arc::new(obj))
    }
}

/// Encode a scene graph into a document
pub fn encode(root: &Node) -> Result<Document> {
    WriteVisitor::new().encode(root)
}

/// Check that every per-vertex array has one element per vertex and that
/// every draw command stays within the vertex array
pub fn validate_geometry(name: &str, geometry: &Geometry) -> std::result::Result<(), StructuralError> {
    let vertex_count = geometry.vertex_count();

    for (semantic, array) in geometry.attributes() {
        let found = array.element_count();
        if found != vertex_count {
            return Err(StructuralError::AttributeCountMismatch {
                geometry: name.to_string(),
                attribute: semantic.to_string(),
                expected: vertex_count,
                found,
            });
        }
    }

    for set in &geometry.primitive_sets {
        if let Some(index) = set.max_index() {
            if index as usize >= vertex_count {
                return Err(StructuralError::IndexOutOfRange {
                    geometry: name.to_string(),
                    index,
                    vertex_count,
                });
            }
        }
        if let Some((first, end)) = set.vertex_range() {
            if end > vertex_count as u64 {
                return Err(StructuralError::DrawRangeOutOfBounds {
                    geometry: name.to_string(),
                    first,
                    count: u32::try_from(end - u64::from(first)).unwrap_or(u32::MAX),
                    vertex_count,
                });
            }
        }
    }

    Ok(())
}
