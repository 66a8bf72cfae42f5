//! Tests for loading scene descriptions
//!
//! These tests cover:
//! - Deserializing every node kind from the JSON scene form
//! - Attribute array validation on load
//! - Serialization round trip of a built graph

use std::sync::Arc;

use osgjs_scene::{
    from_json_str, ArrayData, AttributeArray, DrawMode, Geometry, KeyframeTrack, Node, NodeKind,
    PrimitiveSet, StateAttribute, UpdateCallback,
};
use proptest::prelude::*;

const SCENE: &str = r#"{
    "type": "Group",
    "name": "Root",
    "state_set": {
        "name": "base",
        "attributes": [{"type": "CullFace", "mode": "BACK"}]
    },
    "children": [
        {
            "type": "PositionAttitudeTransform",
            "position": {"x": 1.0, "y": 2.0, "z": 3.0},
            "update_callbacks": [
                {
                    "type": "UpdateMatrixTransform",
                    "name": "pat",
                    "stacked_transforms": [
                        {"type": "Translate", "name": "translate", "translate": {"x": 0, "y": 0, "z": 0}}
                    ]
                },
                {
                    "type": "AnimationManager",
                    "animations": [{
                        "name": "move",
                        "channels": [{
                            "name": "translate",
                            "target_name": "pat",
                            "track": {"type": "Vec3", "keys": [
                                {"time": 0.0, "value": {"x": 0, "y": 0, "z": 0}},
                                {"time": 1.0, "value": {"x": 1, "y": 0, "z": 0}}
                            ]}
                        }]
                    }]
                }
            ],
            "children": [
                {
                    "type": "Geode",
                    "drawables": [
                        {
                            "type": "Geometry",
                            "name": "quad",
                            "vertices": {"item_size": 3, "data": {"type": "Float32", "values": [0,0,0, 1,0,0, 1,1,0, 0,1,0]}},
                            "primitive_sets": [{"type": "DrawArrays", "mode": "QUADS", "first": 0, "count": 4}]
                        }
                    ]
                }
            ]
        },
        {"type": "LightSource", "light": {"light_num": 1}},
        {"type": "Unsupported", "class_name": "Switch"}
    ]
}"#;

mod load_tests {
    use super::*;

    #[test]
    fn test_load_full_scene() {
        let root = from_json_str(SCENE).unwrap();
        assert_eq!(root.name, "Root");
        assert_eq!(root.children().len(), 3);

        let state = root.state_set.as_ref().unwrap();
        assert_eq!(state.attributes.len(), 1);
        assert!(matches!(state.attributes[0], StateAttribute::CullFace { .. }));

        let pat = &root.children()[0];
        match &pat.kind {
            NodeKind::PositionAttitudeTransform { position, scale, .. } => {
                assert_eq!(position.z, 3.0);
                assert_eq!(scale.x, 1.0);
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(pat.update_callbacks.len(), 2);
        match &pat.update_callbacks[1] {
            UpdateCallback::AnimationManager { animations } => {
                assert!(matches!(animations[0].channels[0].track, KeyframeTrack::Vec3(ref k) if k.len() == 2));
            }
            other => panic!("unexpected callback {other:?}"),
        }

        let geometry = pat.children()[0].children()[0].as_geometry().unwrap();
        assert_eq!(geometry.vertex_count(), 4);
        assert!(matches!(
            geometry.primitive_sets[0],
            PrimitiveSet::DrawArrays { mode: DrawMode::Quads, first: 0, count: 4 }
        ));

        assert_eq!(root.children()[2].class_name(), "Switch");
    }

    #[test]
    fn test_load_rejects_ragged_array() {
        let text = r#"{"type": "Geometry",
            "vertices": {"item_size": 3, "data": {"type": "Float32", "values": [0, 0]}}}"#;
        let err = from_json_str(text).unwrap_err();
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_roundtrip_built_graph() {
        let geometry = Geometry::new()
            .with_vertices(AttributeArray::vec3(&[[0.0; 3], [1.0; 3], [2.0; 3]]))
            .with_primitive_set(PrimitiveSet::triangles_u16(vec![0, 1, 2]));
        let root = Node::group()
            .named("root")
            .with_child(Arc::new(Node::geode().with_child(Arc::new(Node::geometry(geometry)))));

        let text = serde_json::to_string(&root).unwrap();
        assert_eq!(from_json_str(&text).unwrap(), root);
    }
}

proptest! {
    #[test]
    fn prop_element_count_matches_payload(item_size in 1u8..=4, elements in 0usize..64) {
        let values = vec![0u16; elements * usize::from(item_size)];
        let array = AttributeArray::new(item_size, ArrayData::Uint16(values)).unwrap();
        prop_assert_eq!(array.element_count(), elements);
    }

    #[test]
    fn prop_ragged_payload_rejected(item_size in 2u8..=4, elements in 0usize..64, extra in 1usize..4) {
        let extra = extra % usize::from(item_size);
        prop_assume!(extra != 0);
        let values = vec![0.0f32; elements * usize::from(item_size) + extra];
        prop_assert!(AttributeArray::new(item_size, ArrayData::Float32(values)).is_err());
    }
}
