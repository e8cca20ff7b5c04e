//! The player's body: vitals, view and damage feedback

use crate::config::PlayerConfig;
use glam::Vec3;
use rand::RngCore;
use strafe_combat::{DamageOutcome, Vitals};
use strafe_core::feedback::play_optional;
use strafe_core::{EntityId, Feedback};

/// Player state owned by the session
#[derive(Debug, Clone)]
pub struct Player {
    id: EntityId,
    settings: PlayerConfig,
    vitals: Vitals,
    position: Vec3,
    look: Vec3,
    blood_overlay: f32,
}

impl Player {
    /// Create the player at the configured spawn point
    pub fn spawn(id: EntityId, settings: PlayerConfig) -> Self {
        Self {
            id,
            vitals: Vitals::new(settings.max_health).with_armor(settings.armor, settings.max_armor),
            position: settings.spawn,
            look: Vec3::Z,
            blood_overlay: 0.0,
            settings,
        }
    }

    /// Get player entity id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Get health and armor
    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    /// Get mutable health and armor
    pub fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    /// Check if the player is alive
    pub fn is_alive(&self) -> bool {
        self.vitals.is_alive()
    }

    /// Feet position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Camera position; shots and use rays start here
    pub fn eye(&self) -> Vec3 {
        self.position + Vec3::Y * self.settings.eye_height
    }

    /// Normalized view direction
    pub fn look(&self) -> Vec3 {
        self.look
    }

    /// Sync the controller transform. Ignored once dead.
    pub fn set_view(&mut self, position: Vec3, look: Vec3) {
        if !self.is_alive() {
            return;
        }
        self.position = position;
        let look = look.normalize_or_zero();
        if look != Vec3::ZERO {
            self.look = look;
        }
    }

    /// Blood overlay alpha in `[0, 1]`
    pub fn blood_overlay(&self) -> f32 {
        self.blood_overlay
    }

    /// Fade the blood overlay
    pub fn update(&mut self, delta_time: f32) {
        if self.is_alive() && self.blood_overlay > 0.0 {
            self.blood_overlay = (self.blood_overlay - self.settings.overlay_decay * delta_time).max(0.0);
        }
    }

    /// Audio and overlay for damage already applied to the vitals
    pub fn react_to_damage(
        &mut self,
        outcome: &DamageOutcome,
        feedback: &mut dyn Feedback,
        rng: &mut dyn RngCore,
    ) {
        if *outcome == DamageOutcome::Ignored {
            return;
        }

        let cues = if outcome.armor_absorbed() > 0.0 {
            &self.settings.armor_hit_sounds
        } else {
            &self.settings.hurt_sounds
        };
        cues.play(feedback, rng, None);

        if outcome.is_kill() {
            play_optional(feedback, self.settings.death_sound.as_deref(), None);
            self.blood_overlay = 1.0;
            log::info!("Player died");
        } else {
            let missing = 1.0 - self.vitals.health_percent();
            self.blood_overlay = self.settings.overlay_max_alpha * missing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use strafe_core::{CueSet, RecordingFeedback};

    fn player() -> Player {
        let settings = PlayerConfig {
            armor: 0.0,
            hurt_sounds: CueSet::new(["hurt"]),
            armor_hit_sounds: CueSet::new(["armor_hit"]),
            death_sound: Some("death".into()),
            ..Default::default()
        };
        Player::spawn(EntityId::new(0, 0), settings)
    }

    #[test]
    fn test_overlay_tracks_missing_health() {
        let mut player = player();
        let mut feedback = RecordingFeedback::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let outcome = player.vitals_mut().apply_damage(50.0).unwrap();
        player.react_to_damage(&outcome, &mut feedback, &mut rng);
        assert!(feedback.played("hurt"));
        assert_relative_eq!(player.blood_overlay(), 0.35, epsilon = 1e-5);

        player.update(0.1);
        assert_relative_eq!(player.blood_overlay(), 0.25, epsilon = 1e-5);
        player.update(10.0);
        assert_eq!(player.blood_overlay(), 0.0);
    }

    #[test]
    fn test_armor_cue_and_death() {
        let mut player = player();
        player.vitals_mut().add_armor(10.0).unwrap();
        let mut feedback = RecordingFeedback::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let outcome = player.vitals_mut().apply_damage(6.0).unwrap();
        player.react_to_damage(&outcome, &mut feedback, &mut rng);
        assert!(feedback.played("armor_hit"));

        let outcome = player.vitals_mut().apply_damage(500.0).unwrap();
        player.react_to_damage(&outcome, &mut feedback, &mut rng);
        assert!(feedback.played("death"));
        assert_eq!(player.blood_overlay(), 1.0);

        player.set_view(Vec3::ONE, Vec3::X);
        assert_eq!(player.position(), Vec3::ZERO);
    }
}
