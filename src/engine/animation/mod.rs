// Skeletal animation playback
//
// - `clip`: named keyframed animation data
// - `mixer`: time-driven blending of clip actions bound to a scene node

pub mod clip;
pub mod mixer;

pub use clip::AnimationClip;
pub use mixer::{ActionHandle, ActionPose, AnimationAction, AnimationMixer, MixerTarget};
