//! Fire-and-forget feedback (effects, sounds, camera shake)
//!
//! Nothing the core does depends on feedback succeeding. A cue that was
//! never configured is skipped without touching gameplay state.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Visual effects the gameplay layer asks the host to spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Weapon muzzle flash
    MuzzleFlash,
    /// Bullet impact on level geometry (sparks, decal)
    Impact,
    /// Blood spray on a damageable target
    Blood,
    /// Explosion at a blast center
    Explosion,
    /// Item collected
    Pickup,
}

/// Host side of effect/audio playback
pub trait Feedback {
    /// Spawn a visual effect oriented along `normal`
    fn play_effect(&mut self, kind: EffectKind, position: Vec3, normal: Vec3);

    /// Play an audio clip, positional when `position` is set
    fn play_sound(&mut self, clip: &str, position: Option<Vec3>);

    /// Shake the first-person camera
    fn camera_shake(&mut self, _intensity: f32, _duration: f32) {}
}

/// Feedback sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFeedback;

impl Feedback for NullFeedback {
    fn play_effect(&mut self, _kind: EffectKind, _position: Vec3, _normal: Vec3) {}
    fn play_sound(&mut self, _clip: &str, _position: Option<Vec3>) {}
}

/// Feedback sink that remembers every call, for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct RecordingFeedback {
    pub effects: Vec<(EffectKind, Vec3, Vec3)>,
    pub sounds: Vec<String>,
    pub shakes: Vec<(f32, f32)>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count effects of one kind
    pub fn effect_count(&self, kind: EffectKind) -> usize {
        self.effects.iter().filter(|(k, _, _)| *k == kind).count()
    }

    /// Whether a clip was played at least once
    pub fn played(&self, clip: &str) -> bool {
        self.sounds.iter().any(|s| s == clip)
    }

    pub fn clear(&mut self) {
        self.effects.clear();
        self.sounds.clear();
        self.shakes.clear();
    }
}

impl Feedback for RecordingFeedback {
    fn play_effect(&mut self, kind: EffectKind, position: Vec3, normal: Vec3) {
        self.effects.push((kind, position, normal));
    }

    fn play_sound(&mut self, clip: &str, _position: Option<Vec3>) {
        self.sounds.push(clip.to_string());
    }

    fn camera_shake(&mut self, intensity: f32, duration: f32) {
        self.shakes.push((intensity, duration));
    }
}

/// A pool of interchangeable clips; one is picked at random per play
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CueSet(pub Vec<String>);

impl CueSet {
    pub fn new<I, S>(clips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(clips.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pick a clip, or `None` when no clip is configured
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        if self.0.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.0.len());
        Some(self.0[index].as_str())
    }

    /// Play a random clip through `feedback`; no-op when empty
    pub fn play<R: Rng + ?Sized>(
        &self,
        feedback: &mut dyn Feedback,
        rng: &mut R,
        position: Option<Vec3>,
    ) {
        if let Some(clip) = self.choose(rng) {
            feedback.play_sound(clip, position);
        }
    }
}

/// Play an optional single clip
pub fn play_optional(feedback: &mut dyn Feedback, clip: Option<&str>, position: Option<Vec3>) {
    if let Some(clip) = clip {
        feedback.play_sound(clip, position);
    }
}
