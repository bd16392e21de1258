// Character entity and management

use std::fmt;

use glam::Vec3;
use log::{debug, info, trace, warn};

use super::animation::{AnimationRegistry, AnimationSelector, ClipNameTable};
use super::controller::{MotionController, MotionSources};
use super::state::{Classification, MotionSample, MotionStateMachine};
use super::stats::ModelConfig;
use super::MotionError;
use crate::core::math::yaw_rotation;
use crate::engine::animation::{ActionPose, AnimationMixer, MixerTarget};
use crate::engine::assets::{
    AssetError, LoadCompletion, LoadTicket, LoadedModel, ModelHandle, ModelLoader,
};
use crate::engine::input::InputHandle;
use crate::engine::scene::{BoneMap, PickCylinder, SceneNode, Transform};
use crate::game::config::GameConfig;
use crate::game::net::SnapshotInbox;

/// Unique identifier for a character
pub type CharacterId = u32;

/// Whether the character's model has been installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Placeholder node only; no animation runs
    Unloaded,
    /// Model attached, registry populated, mixer bound to the model
    Loaded,
}

type ReadyCallback = Box<dyn FnOnce(Result<(), AssetError>)>;

struct PendingLoad {
    ticket: LoadTicket,
    on_ready: ReadyCallback,
}

impl fmt::Debug for PendingLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingLoad")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

/// What the renderer reads for one character each frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub id: CharacterId,
    pub user_id: String,
    pub transform: Transform,
    pub model_loaded: bool,
    pub pose: Vec<ActionPose>,
}

/// An avatar driven by a local or replicated motion source
#[derive(Debug)]
pub struct Character {
    id: CharacterId,
    user_id: String,
    /// Fixed at creation; picks the controller variant
    is_remote: bool,

    // Spatial node
    transform: Transform,
    spawn: Transform,
    /// Loaded model attached under the node
    model: Option<SceneNode>,
    pick: Option<PickCylinder>,

    // Animation
    bones: BoneMap,
    mixer: AnimationMixer,
    registry: AnimationRegistry,
    selector: AnimationSelector,
    model_state: ModelState,
    pending_load: Option<PendingLoad>,

    // Motion
    controller: MotionController,
    state_machine: MotionStateMachine,
    last_sample: MotionSample,

    clip_names: ClipNameTable,
    model_config: ModelConfig,
}

impl Character {
    /// Create a character at `spawn`, bound to the controller matching
    /// `is_remote`. The model starts unloaded.
    pub fn new(
        id: CharacterId,
        user_id: &str,
        is_remote: bool,
        sources: MotionSources,
        spawn: Transform,
        config: &GameConfig,
    ) -> Result<Self, MotionError> {
        let controller = MotionController::bind(user_id, is_remote, sources, config.motion)?;

        Ok(Self {
            id,
            user_id: user_id.to_string(),
            is_remote,
            transform: spawn,
            spawn,
            model: None,
            pick: None,
            bones: BoneMap::default(),
            mixer: AnimationMixer::new(MixerTarget::Placeholder),
            registry: AnimationRegistry::empty(),
            selector: AnimationSelector::new(config.motion.blend_duration),
            model_state: ModelState::Unloaded,
            pending_load: None,
            controller,
            state_machine: MotionStateMachine::new(),
            last_sample: MotionSample::IDLE,
            clip_names: config.clips.clone(),
            model_config: config.model,
        })
    }

    /// Advance one tick.
    ///
    /// Order within the tick: the controller's sample moves the node, then
    /// a classification change picks a clip, then the mixer advances.
    /// Ticks with no elapsed time change nothing.
    pub fn tick(&mut self, elapsed: f32) {
        // NaN counts as no elapsed time
        if !(elapsed > 0.0) {
            return;
        }

        let sample = self.controller.sample(elapsed, &self.transform);
        self.transform
            .apply_local_delta(sample.delta.translation, sample.delta.rotation);

        if self.state_machine.observe(sample.classification, elapsed) {
            self.select_animation(sample.classification);
        }

        if self.model_state == ModelState::Loaded {
            self.mixer.update(elapsed);
        }

        self.last_sample = sample;
    }

    fn select_animation(&mut self, target: Classification) {
        if self.model_state == ModelState::Unloaded {
            trace!("{}: {} while unloaded", self.user_id, target);
            return;
        }

        match self
            .selector
            .transition(target, &self.registry, &mut self.mixer)
        {
            Ok(Some(transition)) => debug!(
                "{}: crossfade {:?} -> {}",
                self.user_id, transition.from, transition.to
            ),
            Ok(None) => {}
            Err(err) => warn!("{}: {}, holding current animation", self.user_id, err),
        }
    }

    /// Start loading a model for this character.
    ///
    /// The character keeps ticking while the load is outstanding. `on_ready`
    /// runs exactly once: with the outcome when the load is applied, or
    /// with `Superseded` if another load is requested first. It never runs
    /// if the character is dropped before the load finishes.
    pub fn load_model(
        &mut self,
        loader: &mut ModelLoader,
        handle: &ModelHandle,
        on_ready: impl FnOnce(Result<(), AssetError>) + 'static,
    ) -> LoadTicket {
        if let Some(previous) = self.pending_load.take() {
            debug!("{}: load {:?} superseded", self.user_id, previous.ticket);
            (previous.on_ready)(Err(AssetError::Superseded));
        }

        let ticket = loader.request(handle);
        self.pending_load = Some(PendingLoad {
            ticket,
            on_ready: Box::new(on_ready),
        });
        ticket
    }

    /// Whether this character waits on `ticket`
    pub fn awaits(&self, ticket: LoadTicket) -> bool {
        self.pending_load
            .as_ref()
            .map_or(false, |pending| pending.ticket == ticket)
    }

    /// Apply a finished load. Returns false if the completion is not the
    /// one this character is waiting for.
    pub fn complete_load(&mut self, completion: LoadCompletion) -> bool {
        if !self.awaits(completion.ticket) {
            return false;
        }
        let Some(pending) = self.pending_load.take() else {
            return false;
        };

        let outcome = match completion.result {
            Ok(model) => {
                self.install_model(&model);
                info!(
                    "{}: loaded {} ({} bones, {} clips)",
                    self.user_id,
                    completion.handle.path(),
                    self.bones.len(),
                    model.clips.len()
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "{}: failed to load {}: {}",
                    self.user_id,
                    completion.handle.path(),
                    err
                );
                Err(err)
            }
        };

        (pending.on_ready)(outcome);
        true
    }

    fn install_model(&mut self, model: &LoadedModel) {
        let mut root = model.root.clone();
        root.transform = root
            .transform
            .with_rotation(yaw_rotation(self.model_config.yaw_offset))
            .with_uniform_scale(self.model_config.scale);

        // Build everything first, then swap in
        let bones = BoneMap::build(&root);
        let mut mixer = AnimationMixer::new(MixerTarget::Model {
            root: root.name.clone(),
        });
        let registry = AnimationRegistry::build(&model.clips, &self.clip_names, &mut mixer);

        let missing = registry.missing();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|c| c.name()).collect();
            warn!("{}: model has no clips for {:?}", self.user_id, names);
        }

        self.bones = bones;
        self.mixer = mixer;
        self.registry = registry;
        self.model = Some(root);
        self.pick = Some(PickCylinder {
            radius: self.model_config.pick_radius,
            height: self.model_config.pick_height,
            offset: Vec3::new(0.0, self.model_config.pick_center_height, 0.0),
        });
        self.model_state = ModelState::Loaded;

        let current = self.state_machine.state();
        if let Err(err) = self.selector.start(current, &self.registry, &mut self.mixer) {
            warn!("{}: {}", self.user_id, err);
        }
    }

    /// Distance along a world-space ray to this character's pick volume
    pub fn pick_ray(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        self.pick?
            .intersect_ray(self.transform.position, origin, direction)
    }

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn is_remote(&self) -> bool {
        self.is_remote
    }

    /// Current world transform of the character node
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn spawn_transform(&self) -> &Transform {
        &self.spawn
    }

    /// Loaded model attached under the node
    pub fn model(&self) -> Option<&SceneNode> {
        self.model.as_ref()
    }

    pub fn bones(&self) -> &BoneMap {
        &self.bones
    }

    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    pub fn registry(&self) -> &AnimationRegistry {
        &self.registry
    }

    pub fn controller(&self) -> &MotionController {
        &self.controller
    }

    pub fn model_state(&self) -> ModelState {
        self.model_state
    }

    pub fn is_loaded(&self) -> bool {
        self.model_state == ModelState::Loaded
    }

    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Classification reported by the last tick
    pub fn classification(&self) -> Classification {
        self.state_machine.state()
    }

    pub fn last_sample(&self) -> &MotionSample {
        &self.last_sample
    }

    /// Classification whose clip is active, if any
    pub fn playing_animation(&self) -> Option<Classification> {
        self.selector.playing()
    }

    /// Crossfades started over the character's lifetime
    pub fn crossfades(&self) -> u64 {
        self.selector.crossfades()
    }

    pub fn render_state(&self) -> RenderState {
        RenderState {
            id: self.id,
            user_id: self.user_id.clone(),
            transform: self.transform,
            model_loaded: self.is_loaded(),
            pose: self.mixer.pose(),
        }
    }
}

/// Owns every character in the session
#[derive(Debug)]
pub struct CharacterManager {
    characters: Vec<Character>,
    next_id: CharacterId,
    config: GameConfig,
}

impl Default for CharacterManager {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl CharacterManager {
    pub fn new(config: GameConfig) -> Self {
        Self {
            characters: Vec::new(),
            next_id: 0,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Spawn a character bound to the given motion sources
    pub fn spawn(
        &mut self,
        user_id: &str,
        is_remote: bool,
        sources: MotionSources,
        spawn: Transform,
    ) -> Result<CharacterId, MotionError> {
        let id = self.next_id;
        let character = Character::new(id, user_id, is_remote, sources, spawn, &self.config)?;
        self.next_id += 1;
        self.characters.push(character);
        info!(
            "Spawned {} character {} for {}",
            if is_remote { "remote" } else { "local" },
            id,
            user_id
        );
        Ok(id)
    }

    /// Spawn the keyboard-driven character
    pub fn spawn_local(
        &mut self,
        user_id: &str,
        input: InputHandle,
        spawn: Transform,
    ) -> Result<CharacterId, MotionError> {
        self.spawn(user_id, false, MotionSources::local(input), spawn)
    }

    /// Spawn a character that follows a remote user's snapshots
    pub fn spawn_remote(
        &mut self,
        user_id: &str,
        inbox: SnapshotInbox,
        spawn: Transform,
    ) -> Result<CharacterId, MotionError> {
        self.spawn(user_id, true, MotionSources::remote(inbox), spawn)
    }

    /// Request the configured model for a character
    pub fn load_model(
        &mut self,
        id: CharacterId,
        loader: &mut ModelLoader,
        on_ready: impl FnOnce(Result<(), AssetError>) + 'static,
    ) -> Option<LoadTicket> {
        let handle = ModelHandle::new(&self.config.model_path);
        let character = self.get_mut(id)?;
        Some(character.load_model(loader, &handle, on_ready))
    }

    /// Get a character by ID
    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Get a mutable character by ID
    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    /// Get a character by user ID
    pub fn get_by_user(&self, user_id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.user_id == user_id)
    }

    /// Get all characters
    pub fn all(&self) -> &[Character] {
        &self.characters
    }

    /// Tick every character once
    pub fn tick_all(&mut self, dt: f32) {
        for character in &mut self.characters {
            character.tick(dt);
        }
    }

    /// Apply finished loads. Completions for removed characters are dropped.
    pub fn poll_loads(&mut self, loader: &mut ModelLoader) -> usize {
        let completions = loader.poll();
        self.deliver(completions)
    }

    /// Hand completions to the characters waiting on them
    pub fn deliver(&mut self, completions: Vec<LoadCompletion>) -> usize {
        let mut applied = 0;
        for completion in completions {
            let ticket = completion.ticket;
            match self.characters.iter_mut().find(|c| c.awaits(ticket)) {
                Some(character) => {
                    if character.complete_load(completion) {
                        applied += 1;
                    }
                }
                None => debug!("Dropping load {:?}: no character waits on it", ticket),
            }
        }
        applied
    }

    /// Remove a character. Its pending load, if any, becomes a no-op.
    pub fn remove(&mut self, id: CharacterId) -> Option<Character> {
        let pos = self.characters.iter().position(|c| c.id == id)?;
        let character = self.characters.remove(pos);
        info!("Removed character {} ({})", id, character.user_id);
        Some(character)
    }

    /// Get the number of characters
    pub fn count(&self) -> usize {
        self.characters.len()
    }

    /// Render state for every character, read after the frame's ticks
    pub fn render_states(&self) -> Vec<RenderState> {
        self.characters.iter().map(Character::render_state).collect()
    }
}
