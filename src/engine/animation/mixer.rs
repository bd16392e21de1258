// Animation mixer: advances and blends clip actions over time

use super::clip::AnimationClip;
use crate::core::math::{clamp, lerp};

/// Scene node a mixer drives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MixerTarget {
    /// Empty group used before the model is loaded
    Placeholder,
    /// Root node of a loaded model
    Model { root: String },
}

/// Index of an action inside its mixer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionHandle(usize);

/// Weight ramp in progress
#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
}

/// Playback state of one clip inside a mixer
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: AnimationClip,
    /// Local playback time in seconds
    time: f32,
    /// Blend weight (0 = no influence, 1 = full)
    weight: f32,
    /// Whether the action is advancing and contributing
    enabled: bool,
    fade: Option<Fade>,
}

impl AnimationAction {
    fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            time: 0.0,
            weight: 0.0,
            enabled: false,
            fade: None,
        }
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    fn start_fade(&mut self, to: f32, duration: f32) {
        if duration <= 0.0 {
            self.weight = to;
            self.fade = None;
            self.enabled = to > 0.0;
            return;
        }
        self.fade = Some(Fade {
            from: self.weight,
            to,
            elapsed: 0.0,
            duration,
        });
    }

    fn advance(&mut self, dt: f32) {
        if !self.enabled {
            return;
        }

        self.time += dt;
        if self.clip.duration > 0.0 {
            self.time = self.time.rem_euclid(self.clip.duration);
        } else {
            self.time = 0.0;
        }

        if let Some(fade) = &mut self.fade {
            fade.elapsed += dt;
            let t = clamp(fade.elapsed / fade.duration, 0.0, 1.0);
            self.weight = lerp(fade.from, fade.to, t);
            if t >= 1.0 {
                self.weight = fade.to;
                self.fade = None;
                if self.weight <= 0.0 {
                    self.enabled = false;
                    self.time = 0.0;
                }
            }
        }
    }
}

/// Per-action snapshot handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct ActionPose {
    pub clip_name: String,
    pub time: f32,
    pub weight: f32,
}

/// Drives clip actions for one target node
#[derive(Debug)]
pub struct AnimationMixer {
    target: MixerTarget,
    actions: Vec<AnimationAction>,
    /// Total time advanced
    time: f32,
}

impl Default for AnimationMixer {
    fn default() -> Self {
        Self::new(MixerTarget::Placeholder)
    }
}

impl AnimationMixer {
    pub fn new(target: MixerTarget) -> Self {
        Self {
            target,
            actions: Vec::new(),
            time: 0.0,
        }
    }

    /// Node this mixer is bound to
    pub fn target(&self) -> &MixerTarget {
        &self.target
    }

    /// Get or create the action for a clip.
    ///
    /// Actions are cached by clip name, so asking twice for the same clip
    /// returns the same handle.
    pub fn clip_action(&mut self, clip: &AnimationClip) -> ActionHandle {
        if let Some(index) = self.actions.iter().position(|a| a.clip.name == clip.name) {
            return ActionHandle(index);
        }
        self.actions.push(AnimationAction::new(clip.clone()));
        ActionHandle(self.actions.len() - 1)
    }

    /// Start an action at full weight from the beginning
    pub fn play(&mut self, handle: ActionHandle) {
        if let Some(action) = self.actions.get_mut(handle.0) {
            action.enabled = true;
            action.time = 0.0;
            action.weight = 1.0;
            action.fade = None;
        }
    }

    /// Blend from `from` (if any) to `to` over `duration` seconds.
    ///
    /// An action that is still enabled (for example one fading out) keeps
    /// its playback time and ramps up from its current weight.
    pub fn cross_fade(&mut self, from: Option<ActionHandle>, to: ActionHandle, duration: f32) {
        if from == Some(to) {
            return;
        }

        if let Some(from) = from.and_then(|h| self.actions.get_mut(h.0)) {
            from.start_fade(0.0, duration);
        }

        if let Some(to) = self.actions.get_mut(to.0) {
            if !to.enabled {
                to.enabled = true;
                to.time = 0.0;
                to.weight = 0.0;
            }
            to.start_fade(1.0, duration);
        }
    }

    /// Advance every enabled action (called every frame)
    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.time += dt;
        for action in &mut self.actions {
            action.advance(dt);
        }
    }

    pub fn action(&self, handle: ActionHandle) -> Option<&AnimationAction> {
        self.actions.get(handle.0)
    }

    /// Current weight of an action, 0 for unknown handles
    pub fn weight(&self, handle: ActionHandle) -> f32 {
        self.action(handle).map_or(0.0, |a| a.weight)
    }

    /// Whether the action is enabled and contributing to the pose
    pub fn is_running(&self, handle: ActionHandle) -> bool {
        self.action(handle).map_or(false, |a| a.enabled && a.weight > 0.0)
    }

    /// Total time advanced
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Number of actions created on this mixer
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Snapshot of every contributing action
    pub fn pose(&self) -> Vec<ActionPose> {
        self.actions
            .iter()
            .filter(|a| a.enabled)
            .map(|a| ActionPose {
                clip_name: a.clip.name.clone(),
                time: a.time,
                weight: a.weight,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mixer_with(clips: &[(&str, f32)]) -> (AnimationMixer, Vec<ActionHandle>) {
        let mut mixer = AnimationMixer::new(MixerTarget::Model {
            root: "ybot".to_string(),
        });
        let handles = clips
            .iter()
            .map(|(name, duration)| mixer.clip_action(&AnimationClip::new(name, *duration)))
            .collect();
        (mixer, handles)
    }

    #[test]
    fn test_clip_action_is_cached() {
        let (mut mixer, handles) = mixer_with(&[("idle", 1.0)]);
        let again = mixer.clip_action(&AnimationClip::new("idle", 1.0));
        assert_eq!(handles[0], again);
        assert_eq!(mixer.action_count(), 1);
    }

    #[test]
    fn test_play_and_loop() {
        let (mut mixer, handles) = mixer_with(&[("idle", 1.0)]);
        mixer.play(handles[0]);
        mixer.update(1.25);

        let action = mixer.action(handles[0]).unwrap();
        assert_relative_eq!(action.time(), 0.25, epsilon = 1e-5);
        assert!(mixer.is_running(handles[0]));
    }

    #[test]
    fn test_cross_fade_completes_after_duration() {
        let (mut mixer, handles) = mixer_with(&[("idle", 1.0), ("run", 0.8)]);
        mixer.play(handles[0]);
        mixer.cross_fade(Some(handles[0]), handles[1], 0.2);

        mixer.update(0.1);
        assert_relative_eq!(mixer.weight(handles[0]), 0.5, epsilon = 1e-5);
        assert_relative_eq!(mixer.weight(handles[1]), 0.5, epsilon = 1e-5);

        mixer.update(0.1);
        assert_relative_eq!(mixer.weight(handles[1]), 1.0);
        assert!(!mixer.is_running(handles[0]));
        assert!(mixer.is_running(handles[1]));
    }

    #[test]
    fn test_cross_fade_back_keeps_time() {
        let (mut mixer, handles) = mixer_with(&[("idle", 1.0), ("run", 1.0)]);
        mixer.play(handles[0]);
        mixer.update(0.3);
        mixer.cross_fade(Some(handles[0]), handles[1], 0.2);
        mixer.update(0.05);
        mixer.cross_fade(Some(handles[1]), handles[0], 0.2);

        let idle = mixer.action(handles[0]).unwrap();
        assert!(idle.is_enabled());
        assert_relative_eq!(idle.time(), 0.35, epsilon = 1e-5);
        assert_relative_eq!(idle.weight(), 0.75, epsilon = 1e-5);
    }

    #[test]
    fn test_zero_duration_cross_fade_is_immediate() {
        let (mut mixer, handles) = mixer_with(&[("idle", 1.0), ("run", 1.0)]);
        mixer.play(handles[0]);
        mixer.cross_fade(Some(handles[0]), handles[1], 0.0);
        assert!(!mixer.is_running(handles[0]));
        assert!(mixer.is_running(handles[1]));
    }

    #[test]
    fn test_update_zero_is_noop() {
        let (mut mixer, handles) = mixer_with(&[("idle", 1.0)]);
        mixer.play(handles[0]);
        mixer.update(0.0);
        assert_eq!(mixer.time(), 0.0);
        assert_eq!(mixer.action(handles[0]).unwrap().time(), 0.0);
    }

    #[test]
    fn test_pose_lists_enabled_actions() {
        let (mut mixer, handles) = mixer_with(&[("idle", 1.0), ("run", 1.0)]);
        mixer.play(handles[1]);
        let pose = mixer.pose();
        assert_eq!(pose.len(), 1);
        assert_eq!(pose[0].clip_name, "run");
        assert_eq!(pose[0].weight, 1.0);
    }

    #[test]
    fn test_placeholder_target_by_default() {
        let mixer = AnimationMixer::default();
        assert_eq!(mixer.target(), &MixerTarget::Placeholder);
        assert_eq!(mixer.action_count(), 0);
    }
}
