// osgjs-scene/src/animation.rs
//! Update callbacks: animation managers and animated transform stacks

use osgjs_core::{Matrix, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A single key of a keyframe track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    /// Time in seconds
    pub time: f64,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub fn new(time: f64, value: T) -> Self {
        Self { time, value }
    }
}

/// Keys of one animated channel, by value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "keys")]
pub enum KeyframeTrack {
    /// Linearly interpolated scalar
    Float(Vec<Keyframe<f32>>),
    /// Linearly interpolated vector
    Vec3(Vec<Keyframe<Vec3>>),
    /// Spherically interpolated rotation
    Quat(Vec<Keyframe<Quat>>),
}

impl KeyframeTrack {
    pub fn len(&self) -> usize {
        match self {
            KeyframeTrack::Float(keys) => keys.len(),
            KeyframeTrack::Vec3(keys) => keys.len(),
            KeyframeTrack::Quat(keys) => keys.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(first, last)` key time
    pub fn time_range(&self) -> Option<(f64, f64)> {
        fn range<T>(keys: &[Keyframe<T>]) -> Option<(f64, f64)> {
            Some((keys.first()?.time, keys.last()?.time))
        }
        match self {
            KeyframeTrack::Float(keys) => range(keys),
            KeyframeTrack::Vec3(keys) => range(keys),
            KeyframeTrack::Quat(keys) => range(keys),
        }
    }
}

/// Animated channel driving one named element of a target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Name of the animated element (e.g. a stacked transform name)
    pub name: String,
    /// Name of the update callback the channel drives
    pub target_name: String,
    pub track: KeyframeTrack,
}

/// Named set of channels played together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    #[serde(default)]
    pub channels: Vec<Channel>,
}

impl Animation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: Vec::new(),
        }
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channels.push(channel);
        self
    }

    /// Time span covered by all channels
    pub fn duration(&self) -> f64 {
        let mut start = f64::MAX;
        let mut end = f64::MIN;
        for (first, last) in self.channels.iter().filter_map(|c| c.track.time_range()) {
            start = start.min(first);
            end = end.max(last);
        }
        if end < start {
            0.0
        } else {
            end - start
        }
    }
}

/// One element of an animated transform stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StackedTransform {
    Translate { name: String, translate: Vec3 },
    RotateAxis { name: String, axis: Vec3, angle: f32 },
    Quaternion { name: String, quaternion: Quat },
    Scale { name: String, scale: Vec3 },
    Matrix { name: String, matrix: Matrix },
    LookAt {
        name: String,
        eye: Vec3,
        center: Vec3,
        up: Vec3,
    },
}

impl StackedTransform {
    /// Element name; channels target elements by this name
    pub fn name(&self) -> &str {
        match self {
            StackedTransform::Translate { name, .. }
            | StackedTransform::RotateAxis { name, .. }
            | StackedTransform::Quaternion { name, .. }
            | StackedTransform::Scale { name, .. }
            | StackedTransform::Matrix { name, .. }
            | StackedTransform::LookAt { name, .. } => name,
        }
    }
}

/// Behavior run at update time, attached to a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UpdateCallback {
    /// Owns and plays a list of animations
    AnimationManager { animations: Vec<Animation> },
    /// Rebuilds the node matrix from a stack of (possibly animated) elements
    UpdateMatrixTransform {
        name: String,
        stacked_transforms: Vec<StackedTransform>,
    },
    /// Host callback with no document representation
    Unsupported { class_name: String },
}

impl UpdateCallback {
    pub fn class_name(&self) -> &str {
        match self {
            UpdateCallback::AnimationManager { .. } => "BasicAnimationManager",
            UpdateCallback::UpdateMatrixTransform { .. } => "UpdateMatrixTransform",
            UpdateCallback::Unsupported { class_name } => class_name,
        }
    }
}
