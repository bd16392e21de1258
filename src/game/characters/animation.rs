// Animation registry and clip selection for characters

use super::state::Classification;
use super::MotionError;
use crate::engine::animation::{ActionHandle, AnimationClip, AnimationMixer};
use serde::{Deserialize, Serialize};

/// Which authored clip plays for each classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipNameTable {
    pub idle: String,
    pub walk_forward: String,
    pub run_forward: String,
    pub walk_backward: String,
    pub run_backward: String,
}

impl Default for ClipNameTable {
    /// Mapping shipped with the stock character asset.
    ///
    /// The backward entries point at the opposite-speed clips
    /// ("RunningBackward" for walking, "WalkingBackward" for running).
    /// Kept as shipped until the intended pairing is confirmed; see
    /// [`ClipNameTable::straightened`].
    fn default() -> Self {
        Self {
            idle: "BreathingIdle".to_string(),
            walk_forward: "WalkingInPlace".to_string(),
            run_forward: "RunningInPlace".to_string(),
            walk_backward: "RunningBackward".to_string(),
            run_backward: "WalkingBackward".to_string(),
        }
    }
}

impl ClipNameTable {
    /// Shipped mapping with the backward clips matched by name
    pub fn straightened() -> Self {
        Self {
            walk_backward: "WalkingBackward".to_string(),
            run_backward: "RunningBackward".to_string(),
            ..Self::default()
        }
    }

    /// Clip name for a classification
    pub fn name_for(&self, classification: Classification) -> &str {
        match classification {
            Classification::Idle => &self.idle,
            Classification::WalkForward => &self.walk_forward,
            Classification::RunForward => &self.run_forward,
            Classification::WalkBackward => &self.walk_backward,
            Classification::RunBackward => &self.run_backward,
        }
    }
}

/// A registered clip and its action on the character's mixer
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub clip: AnimationClip,
    pub action: ActionHandle,
}

/// Classification -> clip lookup. Entries stay empty until a model with
/// the matching clip has loaded.
#[derive(Debug, Clone, Default)]
pub struct AnimationRegistry {
    entries: [Option<RegistryEntry>; 5],
}

impl AnimationRegistry {
    /// Registry with no clips (before any model load)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a complete registry from a model's clips.
    ///
    /// Creates one mixer action per found clip. Classifications whose clip
    /// name is absent from `clips` stay empty.
    pub fn build(clips: &[AnimationClip], names: &ClipNameTable, mixer: &mut AnimationMixer) -> Self {
        let mut registry = Self::empty();
        for classification in Classification::ALL {
            let wanted = names.name_for(classification);
            registry.entries[classification.index()] = clips
                .iter()
                .find(|clip| clip.name == wanted)
                .map(|clip| RegistryEntry {
                    clip: clip.clone(),
                    action: mixer.clip_action(clip),
                });
        }
        registry
    }

    pub fn get(&self, classification: Classification) -> Option<&RegistryEntry> {
        self.entries[classification.index()].as_ref()
    }

    pub fn contains(&self, classification: Classification) -> bool {
        self.get(classification).is_some()
    }

    /// Classifications that have no clip
    pub fn missing(&self) -> Vec<Classification> {
        Classification::ALL
            .into_iter()
            .filter(|c| !self.contains(*c))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }
}

/// A crossfade that was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Option<Classification>,
    pub to: Classification,
}

/// Chooses which registered clip plays and starts crossfades
#[derive(Debug)]
pub struct AnimationSelector {
    /// Classification whose action is currently playing
    playing: Option<Classification>,
    blend_duration: f32,
    crossfades: u64,
}

impl AnimationSelector {
    pub fn new(blend_duration: f32) -> Self {
        Self {
            playing: None,
            blend_duration,
            crossfades: 0,
        }
    }

    /// Classification whose clip is active, if any
    pub fn playing(&self) -> Option<Classification> {
        self.playing
    }

    /// Number of crossfades started
    pub fn crossfades(&self) -> u64 {
        self.crossfades
    }

    pub fn blend_duration(&self) -> f32 {
        self.blend_duration
    }

    /// Start playing directly (no blend), used right after a model load.
    pub fn start(
        &mut self,
        target: Classification,
        registry: &AnimationRegistry,
        mixer: &mut AnimationMixer,
    ) -> Result<(), MotionError> {
        self.playing = None;
        let entry = registry
            .get(target)
            .ok_or(MotionError::MissingAnimation(target))?;
        mixer.play(entry.action);
        self.playing = Some(target);
        Ok(())
    }

    /// Crossfade to the target's clip.
    ///
    /// A missing clip leaves the current action playing and reports
    /// `MissingAnimation`. Asking for the clip that already plays is a no-op.
    pub fn transition(
        &mut self,
        target: Classification,
        registry: &AnimationRegistry,
        mixer: &mut AnimationMixer,
    ) -> Result<Option<Transition>, MotionError> {
        if self.playing == Some(target) {
            return Ok(None);
        }

        let entry = registry
            .get(target)
            .ok_or(MotionError::MissingAnimation(target))?;

        let from_action = self
            .playing
            .and_then(|playing| registry.get(playing))
            .map(|e| e.action);
        mixer.cross_fade(from_action, entry.action, self.blend_duration);

        let transition = Transition {
            from: self.playing,
            to: target,
        };
        self.playing = Some(target);
        self.crossfades += 1;
        Ok(Some(transition))
    }
}
