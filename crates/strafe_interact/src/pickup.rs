//! Pickup system for world items

use glam::Vec3;
use serde::{Deserialize, Serialize};
use strafe_combat::{CombatResult, Vitals, WeaponController};
use strafe_core::{EffectKind, EntityId, Feedback};
use strafe_gamestate::GameProgress;

/// What a pickup gives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupKind {
    /// Restore health (only taken when hurt)
    Health(f32),
    /// Add armor (only taken below max armor)
    Armor(f32),
    /// Add reserve ammo to a weapon slot
    Ammo { weapon: usize, amount: u32 },
    /// Hand the player a weapon slot
    Weapon(usize),
    /// Grant a keycard color
    KeyCard(String),
    /// Count a secret
    Secret,
}

/// Pickup behavior mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PickupMode {
    /// Pick up automatically on touch
    #[default]
    Automatic,
    /// Require interaction to pick up
    Interactive,
}

/// Named pickup template, spawned by level data or drop tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupDef {
    pub id: String,
    pub kind: PickupKind,
    #[serde(default)]
    pub mode: PickupMode,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default)]
    pub sound: Option<String>,
}

fn default_radius() -> f32 {
    1.0
}

impl PickupDef {
    pub fn new(id: impl Into<String>, kind: PickupKind) -> Self {
        Self {
            id: id.into(),
            kind,
            mode: PickupMode::default(),
            radius: default_radius(),
            sound: None,
        }
    }

    /// Set pickup sound
    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }

    /// Place an instance in the world
    pub fn spawn(&self, id: EntityId, position: Vec3) -> Pickup {
        Pickup {
            id,
            def: self.clone(),
            position,
            consumed: false,
        }
    }
}

/// Everything a pickup may modify
pub struct PickupTarget<'a> {
    pub vitals: &'a mut Vitals,
    pub weapons: &'a mut WeaponController,
    pub progress: &'a mut GameProgress,
}

/// What the player got
#[derive(Debug, Clone, PartialEq)]
pub enum PickupEffect {
    Healed(f32),
    ArmorAdded(f32),
    /// `amount` is what fit in the reserve, possibly 0
    AmmoAdded { weapon: usize, amount: u32 },
    WeaponGranted(usize),
    KeyCard(String),
    Secret { total: u32 },
}

/// A pickup placed in the level
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    id: EntityId,
    def: PickupDef,
    position: Vec3,
    consumed: bool,
}

impl Pickup {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn def(&self) -> &PickupDef {
        &self.def
    }

    pub fn kind(&self) -> &PickupKind {
        &self.def.kind
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Check if a position is inside the trigger radius
    pub fn in_range(&self, picker: Vec3) -> bool {
        self.position.distance_squared(picker) <= self.def.radius * self.def.radius
    }

    /// Apply the pickup. `Ok(None)` means the player could not use it and
    /// the pickup stays in the world.
    pub fn apply(
        &mut self,
        target: &mut PickupTarget<'_>,
        feedback: &mut dyn Feedback,
    ) -> CombatResult<Option<PickupEffect>> {
        if self.consumed {
            return Ok(None);
        }

        let effect = match &self.def.kind {
            PickupKind::Health(amount) if target.vitals.is_hurt() => {
                Some(PickupEffect::Healed(target.vitals.heal(*amount)?))
            }
            PickupKind::Armor(amount) if target.vitals.can_take_armor() => {
                Some(PickupEffect::ArmorAdded(target.vitals.add_armor(*amount)?))
            }
            PickupKind::Health(_) | PickupKind::Armor(_) => None,
            PickupKind::Ammo { weapon, amount } => {
                let added = target.weapons.add_ammo(*weapon, *amount).unwrap_or_else(|| {
                    log::warn!("Ammo pickup {} targets missing weapon {}", self.def.id, weapon);
                    0
                });
                Some(PickupEffect::AmmoAdded { weapon: *weapon, amount: added })
            }
            PickupKind::Weapon(index) => {
                let magazine = target
                    .weapons
                    .slot(*index)
                    .map_or(0, |slot| slot.stats().max_ammo);
                target.weapons.add_ammo(*index, magazine);
                target.weapons.switch_to(*index);
                Some(PickupEffect::WeaponGranted(*index))
            }
            PickupKind::KeyCard(color) => {
                target.progress.set_keycard(color.clone());
                Some(PickupEffect::KeyCard(color.clone()))
            }
            PickupKind::Secret => Some(PickupEffect::Secret {
                total: target.progress.record_secret(),
            }),
        };

        if effect.is_some() {
            self.consumed = true;
            feedback.play_effect(EffectKind::Pickup, self.position, Vec3::Y);
            if let Some(sound) = &self.def.sound {
                feedback.play_sound(sound, Some(self.position));
            }
            log::debug!("Picked up {} ({:?})", self.def.id, effect);
        }
        Ok(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strafe_combat::{WeaponSlot, WeaponStats};
    use strafe_core::RecordingFeedback;

    struct Player {
        vitals: Vitals,
        weapons: WeaponController,
        progress: GameProgress,
    }

    impl Player {
        fn new() -> Self {
            Self {
                vitals: Vitals::new(100.0).with_armor(0.0, 100.0),
                weapons: WeaponController::new(vec![
                    WeaponSlot::new(WeaponStats::new("Pistol").with_ammo(12, 48)).with_ammo(12, 0),
                    WeaponSlot::new(WeaponStats::new("Shotgun").with_ammo(8, 32)).with_ammo(8, 0),
                ]),
                progress: GameProgress::new(),
            }
        }

        fn pick(&mut self, pickup: &mut Pickup) -> Option<PickupEffect> {
            let mut target = PickupTarget {
                vitals: &mut self.vitals,
                weapons: &mut self.weapons,
                progress: &mut self.progress,
            };
            pickup.apply(&mut target, &mut RecordingFeedback::new()).unwrap()
        }
    }

    fn spawn(kind: PickupKind) -> Pickup {
        PickupDef::new("test", kind).spawn(EntityId::new(9, 0), Vec3::ZERO)
    }

    #[test]
    fn test_health_not_taken_at_full_health() {
        let mut player = Player::new();
        let mut medkit = spawn(PickupKind::Health(25.0));

        assert_eq!(player.pick(&mut medkit), None);
        assert!(!medkit.is_consumed());

        player.vitals.apply_damage(40.0).unwrap();
        assert_eq!(player.pick(&mut medkit), Some(PickupEffect::Healed(25.0)));
        assert!(medkit.is_consumed());
        assert_eq!(player.pick(&mut medkit), None);
    }

    #[test]
    fn test_armor_pickup_clamps() {
        let mut player = Player::new();
        player.vitals.add_armor(90.0).unwrap();
        let mut vest = spawn(PickupKind::Armor(50.0));

        assert_eq!(player.pick(&mut vest), Some(PickupEffect::ArmorAdded(10.0)));
        assert_eq!(player.vitals.armor(), 100.0);

        let mut another = spawn(PickupKind::Armor(50.0));
        assert_eq!(player.pick(&mut another), None);
    }

    #[test]
    fn test_ammo_always_taken() {
        let mut player = Player::new();
        let mut shells = spawn(PickupKind::Ammo { weapon: 1, amount: 100 });
        assert_eq!(
            player.pick(&mut shells),
            Some(PickupEffect::AmmoAdded { weapon: 1, amount: 32 })
        );
        assert_eq!(player.weapons.slot(1).unwrap().reserve_ammo(), 32);

        // Taken even when full; the effect reports nothing added
        let mut more = spawn(PickupKind::Ammo { weapon: 1, amount: 4 });
        assert_eq!(
            player.pick(&mut more),
            Some(PickupEffect::AmmoAdded { weapon: 1, amount: 0 })
        );

        let mut stray = spawn(PickupKind::Ammo { weapon: 7, amount: 5 });
        assert_eq!(
            player.pick(&mut stray),
            Some(PickupEffect::AmmoAdded { weapon: 7, amount: 0 })
        );
        assert!(stray.is_consumed());
    }

    #[test]
    fn test_weapon_pickup_switches() {
        let mut player = Player::new();
        let mut shotgun = spawn(PickupKind::Weapon(1));

        assert_eq!(player.pick(&mut shotgun), Some(PickupEffect::WeaponGranted(1)));
        assert_eq!(player.weapons.active_index(), 1);
        assert_eq!(player.weapons.slot(1).unwrap().reserve_ammo(), 8);
    }

    #[test]
    fn test_keycard_and_secret() {
        let mut player = Player::new();
        let mut card = spawn(PickupKind::KeyCard("red".into()));
        let mut secret = spawn(PickupKind::Secret);

        player.pick(&mut card);
        assert!(player.progress.has_keycard("red"));
        assert_eq!(player.pick(&mut secret), Some(PickupEffect::Secret { total: 1 }));
    }

    #[test]
    fn test_in_range() {
        let pickup = PickupDef::new("ammo", PickupKind::Secret)
            .spawn(EntityId::new(1, 0), Vec3::new(0.0, 0.0, 5.0));
        assert!(pickup.in_range(Vec3::new(0.0, 0.0, 4.5)));
        assert!(!pickup.in_range(Vec3::new(0.0, 0.0, 3.0)));
    }

    #[test]
    fn test_pickup_feedback() {
        let mut player = Player::new();
        let mut card = PickupDef::new("blue", PickupKind::KeyCard("blue".into()))
            .with_sound("pickup_key")
            .spawn(EntityId::new(2, 0), Vec3::ONE);
        let mut feedback = RecordingFeedback::new();
        let mut target = PickupTarget {
            vitals: &mut player.vitals,
            weapons: &mut player.weapons,
            progress: &mut player.progress,
        };

        card.apply(&mut target, &mut feedback).unwrap();
        assert!(feedback.played("pickup_key"));
        assert_eq!(feedback.effect_count(EffectKind::Pickup), 1);
    }
}
