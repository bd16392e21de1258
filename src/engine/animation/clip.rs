// Animation clip data

/// A named animation clip as delivered by the asset loader
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    /// Name authored in the asset (e.g. "BreathingIdle")
    pub name: String,
    /// Length of one cycle in seconds
    pub duration: f32,
    /// Bones the clip has tracks for
    pub tracks: Vec<String>,
}

impl AnimationClip {
    /// Create a clip with no tracks
    pub fn new(name: &str, duration: f32) -> Self {
        Self {
            name: name.to_string(),
            duration: duration.max(0.0),
            tracks: Vec::new(),
        }
    }

    /// Add tracks for the given bones
    pub fn with_tracks(mut self, bones: &[&str]) -> Self {
        self.tracks.extend(bones.iter().map(|b| b.to_string()));
        self
    }
}
