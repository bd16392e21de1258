// Loaded model data handed from the asset worker to characters

use crate::engine::animation::AnimationClip;
use crate::engine::scene::{SceneNode, Skeleton};

/// Joint names of the stock humanoid rig
const HUMANOID_BONES: [&str; 9] = [
    "Hips",
    "Spine",
    "Neck",
    "Head",
    "LeftArm",
    "RightArm",
    "LeftUpLeg",
    "RightUpLeg",
    "LeftFoot",
];

/// Result of a successful model load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    /// Root of the model's scene graph
    pub root: SceneNode,
    /// Every animation clip shipped with the model
    pub clips: Vec<AnimationClip>,
}

impl LoadedModel {
    /// Find a clip by its authored name
    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.iter().find(|c| c.name == name)
    }

    /// Procedural stand-in rig with one looping clip per given name.
    ///
    /// Used when no authored asset is available.
    pub fn mannequin(name: &str, clip_names: &[&str]) -> Self {
        let body = SceneNode::new("Body").with_skeleton(Skeleton::from_names(&HUMANOID_BONES));
        let root = SceneNode::new(name)
            .with_child(SceneNode::new("Armature"))
            .with_child(body);

        let clips = clip_names
            .iter()
            .map(|clip| AnimationClip::new(clip, 1.0).with_tracks(&HUMANOID_BONES))
            .collect();

        Self { root, clips }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::BoneMap;

    #[test]
    fn test_mannequin_has_rig_and_clips() {
        let model = LoadedModel::mannequin("ybot", &["BreathingIdle", "RunningInPlace"]);
        assert_eq!(model.root.name, "ybot");
        assert_eq!(model.clips.len(), 2);
        assert!(model.clip("RunningInPlace").is_some());
        assert!(model.clip("Dance").is_none());
        assert_eq!(BoneMap::build(&model.root).len(), HUMANOID_BONES.len());
    }
}
