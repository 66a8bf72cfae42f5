//! Update callback encoder

use osgjs_scene::{Animation, Channel, Keyframe, KeyframeTrack, StackedTransform, UpdateCallback};
use tracing::debug;

use crate::document::{Object, Value};

/// Key of the callback array inside node objects
pub const UPDATE_CALLBACKS_KEY: &str = "UpdateCallbacks";

/// Encode a callback chain front to back. `None` when nothing in the chain
/// has a document representation, so the caller can omit the key.
pub fn encode_callbacks(callbacks: &[UpdateCallback]) -> Option<Vec<Value>> {
    let encoded: Vec<Value> = callbacks
        .iter()
        .filter_map(encode_callback)
        .map(Value::from)
        .collect();
    (!encoded.is_empty()).then_some(encoded)
}

/// Encode one callback as `{class: record}`
pub fn encode_callback(callback: &UpdateCallback) -> Option<Object> {
    match callback {
        UpdateCallback::AnimationManager { animations } => {
            let animations: Vec<Value> = animations
                .iter()
                .filter_map(encode_animation)
                .map(Value::from)
                .collect();
            Some(Object::wrap(
                "osgAnimation.BasicAnimationManager",
                Object::new().with("Animations", animations),
            ))
        }
        UpdateCallback::UpdateMatrixTransform {
            name,
            stacked_transforms,
        } => {
            let elements: Vec<Value> = stacked_transforms
                .iter()
                .map(|e| Value::from(encode_stacked_transform(e)))
                .collect();
            Some(Object::wrap(
                "osgAnimation.UpdateMatrixTransform",
                Object::new()
                    .with("Name", name.as_str())
                    .with("StackedTransforms", elements),
            ))
        }
        UpdateCallback::Unsupported { class_name } => {
            debug!(callback = %class_name, "Callback type not supported, skipping");
            None
        }
    }
}

/// `{"osgAnimation.Animation": {Name, Channels}}`; animations without
/// channels are dropped
fn encode_animation(animation: &Animation) -> Option<Object> {
    if animation.channels.is_empty() {
        debug!(animation = %animation.name, "Animation has no channels, skipping");
        return None;
    }
    let channels: Vec<Value> = animation
        .channels
        .iter()
        .map(|c| Value::from(encode_channel(c)))
        .collect();
    debug!(
        animation = %animation.name,
        channels = channels.len(),
        duration = animation.duration(),
        "Encoded animation"
    );
    Some(Object::wrap(
        "osgAnimation.Animation",
        Object::new()
            .with("Name", animation.name.as_str())
            .with("Channels", channels),
    ))
}

fn encode_channel(channel: &Channel) -> Object {
    let (class, keys) = match &channel.track {
        KeyframeTrack::Float(keys) => (
            "osgAnimation.FloatLinearChannel",
            key_rows(keys, |v| vec![*v]),
        ),
        KeyframeTrack::Vec3(keys) => (
            "osgAnimation.Vec3LerpChannel",
            key_rows(keys, |v| v.to_array().to_vec()),
        ),
        KeyframeTrack::Quat(keys) => (
            "osgAnimation.QuatSlerpChannel",
            key_rows(keys, |v| v.to_array().to_vec()),
        ),
    };
    Object::wrap(
        class,
        Object::new()
            .with("Name", channel.name.as_str())
            .with("TargetName", channel.target_name.as_str())
            .with("KeyFrames", keys),
    )
}

/// One `[time, v0, v1, ...]` row per key
fn key_rows<T>(keys: &[Keyframe<T>], values: impl Fn(&T) -> Vec<f32>) -> Vec<Value> {
    keys.iter()
        .map(|key| {
            let mut row = vec![Value::from(key.time)];
            row.extend(values(&key.value).into_iter().map(Value::from));
            Value::Array(row)
        })
        .collect()
}

fn encode_stacked_transform(element: &StackedTransform) -> Object {
    match element {
        StackedTransform::Translate { name, translate } => Object::wrap(
            "osgAnimation.StackedTranslateElement",
            Object::new().with("Name", name.as_str()).with("Translate", *translate),
        ),
        StackedTransform::RotateAxis { name, axis, angle } => Object::wrap(
            "osgAnimation.StackedRotateAxisElement",
            Object::new()
                .with("Name", name.as_str())
                .with("Axis", *axis)
                .with("Angle", *angle),
        ),
        StackedTransform::Quaternion { name, quaternion } => Object::wrap(
            "osgAnimation.StackedQuaternionElement",
            Object::new().with("Name", name.as_str()).with("Quaternion", *quaternion),
        ),
        StackedTransform::Scale { name, scale } => Object::wrap(
            "osgAnimation.StackedScaleElement",
            Object::new().with("Name", name.as_str()).with("Scale", *scale),
        ),
        StackedTransform::Matrix { name, matrix } => Object::wrap(
            "osgAnimation.StackedMatrixElement",
            Object::new()
                .with("Name", name.as_str())
                .with("Matrix", Value::matrix(matrix)),
        ),
        StackedTransform::LookAt {
            name,
            eye,
            center,
            up,
        } => Object::wrap(
            "osgAnimation.StackedLookAtElement",
            Object::new()
                .with("Name", name.as_str())
                .with("Eye", *eye)
                .with("Center", *center)
                .with("Up", *up),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osgjs_core::{Quat, Vec3};

    fn walk() -> Animation {
        Animation::new("walk").with_channel(Channel {
            name: "rotate".into(),
            target_name: "hip".into(),
            track: KeyframeTrack::Quat(vec![
                Keyframe::new(0.0, Quat::IDENTITY),
                Keyframe::new(0.5, Quat::new(0.0, 0.0, 1.0, 0.0)),
            ]),
        })
    }

    #[test]
    fn test_unsupported_only_chain_is_none() {
        let chain = [UpdateCallback::Unsupported { class_name: "osg::Sequence".into() }];
        assert!(encode_callbacks(&chain).is_none());
        assert!(encode_callbacks(&[]).is_none());
    }

    #[test]
    fn test_chain_keeps_order_and_skips_unsupported() {
        let chain = [
            UpdateCallback::UpdateMatrixTransform {
                name: "hip".into(),
                stacked_transforms: vec![StackedTransform::Translate {
                    name: "translate".into(),
                    translate: Vec3::new(1.0, 2.0, 3.0),
                }],
            },
            UpdateCallback::Unsupported { class_name: "custom".into() },
            UpdateCallback::AnimationManager { animations: vec![walk(), Animation::new("idle")] },
        ];
        let encoded = encode_callbacks(&chain).unwrap();
        let keys: Vec<&str> = encoded
            .iter()
            .filter_map(|v| v.as_object()?.unwrap_single().map(|(k, _)| k))
            .collect();
        assert_eq!(keys, ["osgAnimation.UpdateMatrixTransform", "osgAnimation.BasicAnimationManager"]);

        let (_, manager) = encoded[1].as_object().unwrap().unwrap_single().unwrap();
        let animations = manager.as_object().unwrap().get("Animations").and_then(Value::as_array).unwrap();
        assert_eq!(animations.len(), 1, "animation without channels must be dropped");
    }

    #[test]
    fn test_channel_keyframes_rows() {
        let obj = encode_channel(&walk().channels[0]);
        let (class, record) = obj.unwrap_single().unwrap();
        assert_eq!(class, "osgAnimation.QuatSlerpChannel");

        let record = record.as_object().unwrap();
        assert_eq!(record.keys().collect::<Vec<_>>(), ["Name", "TargetName", "KeyFrames"]);
        let rows = record.get("KeyFrames").and_then(Value::as_array).unwrap();
        assert_eq!(rows.len(), 2);
        let second = rows[1].as_array().unwrap();
        assert_eq!(second.len(), 5);
        assert_eq!(second[0], Value::Float(0.5));
        assert_eq!(second[3], Value::Float(1.0));
    }

    #[test]
    fn test_stacked_element_records() {
        let rotate = encode_stacked_transform(&StackedTransform::RotateAxis {
            name: "rotateZ".into(),
            axis: Vec3::UP,
            angle: 1.5,
        });
        let (class, record) = rotate.unwrap_single().unwrap();
        assert_eq!(class, "osgAnimation.StackedRotateAxisElement");
        assert_eq!(record.as_object().unwrap().keys().collect::<Vec<_>>(), ["Name", "Axis", "Angle"]);

        let look_at = encode_stacked_transform(&StackedTransform::LookAt {
            name: "camera".into(),
            eye: Vec3::ZERO,
            center: Vec3::new(0.0, 1.0, 0.0),
            up: Vec3::UP,
        });
        let (class, _) = look_at.unwrap_single().unwrap();
        assert_eq!(class, "osgAnimation.StackedLookAtElement");
    }
}
