//! Interactables and the per-level interaction system
//!
//! Everything the player can use is a closed [`InteractableKind`] variant,
//! dispatched with `match`. The [`InteractionSystem`] owns the level's
//! doors, pickups and interactables.

use crate::door::{Door, DoorEvent, DoorLock, DoorResponse};
use crate::pickup::{Pickup, PickupEffect, PickupMode, PickupTarget};
use glam::Vec3;
use std::collections::BTreeMap;
use strafe_combat::CombatResult;
use strafe_core::{CollisionLayer, EntityId, Feedback, LayerMask, PhysicsQuery, RaycastOptions};
use strafe_gamestate::GameProgress;

/// Prompt shown for a one-time switch after use
pub const SWITCH_USED_PROMPT: &str = "Switch already used";

/// What an interactable controls
#[derive(Debug, Clone, PartialEq)]
pub enum InteractableKind {
    Door(EntityId),
    Pickup(EntityId),
    Switch {
        doors: Vec<EntityId>,
        one_time: bool,
        used: bool,
    },
}

/// Something the player can look at and use
#[derive(Debug, Clone, PartialEq)]
pub struct Interactable {
    pub kind: InteractableKind,
    pub prompt: String,
}

impl Interactable {
    pub fn door(door: EntityId) -> Self {
        Self {
            kind: InteractableKind::Door(door),
            prompt: "Press E to open door".to_string(),
        }
    }

    pub fn pickup(pickup: EntityId) -> Self {
        Self {
            kind: InteractableKind::Pickup(pickup),
            prompt: "Press E to pick up".to_string(),
        }
    }

    pub fn switch(doors: Vec<EntityId>, one_time: bool) -> Self {
        Self {
            kind: InteractableKind::Switch {
                doors,
                one_time,
                used: false,
            },
            prompt: "Press E to activate switch".to_string(),
        }
    }

    /// Set prompt text
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Current prompt text
    pub fn prompt(&self) -> &str {
        match &self.kind {
            InteractableKind::Switch { one_time: true, used: true, .. } => SWITCH_USED_PROMPT,
            _ => &self.prompt,
        }
    }
}

/// What happened when the player used something
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    Door { door: EntityId, response: DoorResponse },
    Pickup { pickup: EntityId, effect: Option<PickupEffect> },
    SwitchActivated { doors: Vec<(EntityId, DoorResponse)> },
    /// One-time switch pressed again
    SwitchSpent,
    /// The target no longer exists
    Missing,
}

/// State the player's interactions can modify
pub struct InteractContext<'a> {
    pub now: f32,
    pub target: PickupTarget<'a>,
    pub feedback: &'a mut dyn Feedback,
}

/// Doors, pickups and interactables of one level
#[derive(Debug, Clone)]
pub struct InteractionSystem {
    doors: BTreeMap<EntityId, Door>,
    pickups: BTreeMap<EntityId, Pickup>,
    interactables: BTreeMap<EntityId, Interactable>,
    interaction_distance: f32,
}

impl Default for InteractionSystem {
    fn default() -> Self {
        Self::new(3.0)
    }
}

impl InteractionSystem {
    pub fn new(interaction_distance: f32) -> Self {
        Self {
            doors: BTreeMap::new(),
            pickups: BTreeMap::new(),
            interactables: BTreeMap::new(),
            interaction_distance,
        }
    }

    pub fn interaction_distance(&self) -> f32 {
        self.interaction_distance
    }

    pub fn add_door(&mut self, door: Door) {
        self.doors.insert(door.id(), door);
    }

    pub fn add_pickup(&mut self, pickup: Pickup) {
        self.pickups.insert(pickup.id(), pickup);
    }

    /// Register `id` (the collider the look ray hits) as usable
    pub fn add_interactable(&mut self, id: EntityId, interactable: Interactable) {
        self.interactables.insert(id, interactable);
    }

    pub fn door(&self, id: EntityId) -> Option<&Door> {
        self.doors.get(&id)
    }

    pub fn doors(&self) -> impl Iterator<Item = &Door> {
        self.doors.values()
    }

    pub fn pickup(&self, id: EntityId) -> Option<&Pickup> {
        self.pickups.get(&id)
    }

    pub fn pickups(&self) -> impl Iterator<Item = &Pickup> {
        self.pickups.values()
    }

    pub fn interactable(&self, id: EntityId) -> Option<&Interactable> {
        self.interactables.get(&id)
    }

    /// The interactable under the player's crosshair and its prompt.
    /// Level geometry blocks the look ray.
    pub fn look_at(
        &self,
        physics: &dyn PhysicsQuery,
        origin: Vec3,
        direction: Vec3,
    ) -> Option<(EntityId, &str)> {
        let options = RaycastOptions::default()
            .with_max_distance(self.interaction_distance)
            .with_layers(LayerMask::from_layers(&[
                CollisionLayer::ENVIRONMENT,
                CollisionLayer::INTERACTABLES,
                CollisionLayer::DOORWAYS,
                CollisionLayer::PICKUPS,
            ]));
        let hit = physics.raycast(origin, direction.normalize_or_zero(), &options)?;
        let id = hit.entity?;
        self.interactables.get(&id).map(|i| (id, i.prompt()))
    }

    /// Use an interactable
    pub fn interact(
        &mut self,
        id: EntityId,
        ctx: &mut InteractContext<'_>,
    ) -> CombatResult<InteractionOutcome> {
        let Some(interactable) = self.interactables.get_mut(&id) else {
            return Ok(InteractionOutcome::Missing);
        };

        match &mut interactable.kind {
            InteractableKind::Door(door_id) => {
                let door_id = *door_id;
                let Some(door) = self.doors.get_mut(&door_id) else {
                    return Ok(InteractionOutcome::Missing);
                };
                let response = door.interact(ctx.now, &*ctx.target.progress, ctx.feedback);
                Ok(InteractionOutcome::Door {
                    door: door_id,
                    response,
                })
            }
            InteractableKind::Pickup(pickup_id) => {
                let pickup_id = *pickup_id;
                let Some(pickup) = self.pickups.get_mut(&pickup_id) else {
                    return Ok(InteractionOutcome::Missing);
                };
                let effect = pickup.apply(&mut ctx.target, ctx.feedback)?;
                if pickup.is_consumed() {
                    self.pickups.remove(&pickup_id);
                    self.interactables.remove(&id);
                }
                Ok(InteractionOutcome::Pickup {
                    pickup: pickup_id,
                    effect,
                })
            }
            InteractableKind::Switch { doors, one_time, used } => {
                if *used && *one_time {
                    return Ok(InteractionOutcome::SwitchSpent);
                }
                *used = true;

                let mut results = Vec::with_capacity(doors.len());
                for door_id in doors.iter() {
                    if let Some(door) = self.doors.get_mut(door_id) {
                        results.push((*door_id, door.unlock_with_switch(ctx.now, ctx.feedback)));
                    }
                }
                Ok(InteractionOutcome::SwitchActivated { doors: results })
            }
        }
    }

    /// Apply every automatic pickup the player is touching; consumed
    /// pickups are removed
    pub fn collect_pickups(
        &mut self,
        player_position: Vec3,
        target: &mut PickupTarget<'_>,
        feedback: &mut dyn Feedback,
    ) -> CombatResult<Vec<(EntityId, PickupEffect)>> {
        let mut collected = Vec::new();
        for pickup in self.pickups.values_mut() {
            if pickup.def().mode != PickupMode::Automatic || !pickup.in_range(player_position) {
                continue;
            }
            if let Some(effect) = pickup.apply(target, feedback)? {
                collected.push((pickup.id(), effect));
            }
        }

        self.pickups.retain(|_, p| !p.is_consumed());
        for (id, _) in &collected {
            self.interactables.remove(id);
        }
        Ok(collected)
    }

    /// Re-check enemy-count doors. Returns the doors unlocked by this call.
    pub fn notify_kills(&mut self, now: f32, kills: u32, feedback: &mut dyn Feedback) -> Vec<EntityId> {
        self.doors
            .values_mut()
            .filter_map(|door| {
                door.check_enemy_requirement(now, kills, feedback)
                    .then(|| door.id())
            })
            .collect()
    }

    /// Advance door motions and auto-close
    pub fn update(&mut self, now: f32, feedback: &mut dyn Feedback) -> Vec<(EntityId, DoorEvent)> {
        self.doors
            .values_mut()
            .filter_map(|door| door.update(now, feedback).map(|event| (door.id(), event)))
            .collect()
    }

    /// Is the player's way through this door clear
    pub fn is_door_open(&self, id: EntityId) -> bool {
        self.doors.get(&id).map_or(false, Door::is_open)
    }

    /// Keycard colors still missing for locked doors
    pub fn required_keycards<'a>(
        &'a self,
        progress: &'a GameProgress,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.doors.values().filter_map(move |door| match &door.settings().lock {
            DoorLock::KeyCard(color) if door.is_locked() && !progress.has_keycard(color) => {
                Some(color.as_str())
            }
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::door::{DoorLock, DoorSettings};
    use crate::pickup::{PickupDef, PickupKind};
    use strafe_combat::{Vitals, WeaponController, WeaponSlot, WeaponStats};
    use strafe_core::{RaycastHit, RecordingFeedback};

    struct Player {
        vitals: Vitals,
        weapons: WeaponController,
        progress: GameProgress,
        feedback: RecordingFeedback,
    }

    impl Player {
        fn new() -> Self {
            Self {
                vitals: Vitals::new(100.0).with_armor(0.0, 100.0),
                weapons: WeaponController::new(vec![WeaponSlot::new(WeaponStats::new("Pistol"))]),
                progress: GameProgress::new(),
                feedback: RecordingFeedback::new(),
            }
        }

        fn interact(
            &mut self,
            system: &mut InteractionSystem,
            id: EntityId,
            now: f32,
        ) -> InteractionOutcome {
            let mut ctx = InteractContext {
                now,
                target: PickupTarget {
                    vitals: &mut self.vitals,
                    weapons: &mut self.weapons,
                    progress: &mut self.progress,
                },
                feedback: &mut self.feedback,
            };
            system.interact(id, &mut ctx).unwrap()
        }
    }

    struct LookWorld(Option<RaycastHit>);

    impl PhysicsQuery for LookWorld {
        fn raycast(&self, _o: Vec3, _d: Vec3, options: &RaycastOptions) -> Option<RaycastHit> {
            self.0.filter(|h| h.distance <= options.max_distance)
        }

        fn overlap_sphere(&self, _c: Vec3, _r: f32, _l: LayerMask) -> Vec<strafe_core::Overlap> {
            Vec::new()
        }
    }

    fn id(index: u32) -> EntityId {
        EntityId::new(index, 0)
    }

    #[test]
    fn test_one_time_switch() {
        let mut system = InteractionSystem::default();
        system.add_door(Door::new(id(1), DoorSettings::new(DoorLock::Switch), Vec3::ZERO));
        system.add_door(Door::new(id(2), DoorSettings::new(DoorLock::Switch), Vec3::X));
        system.add_interactable(id(10), Interactable::switch(vec![id(1), id(2)], true));
        let mut player = Player::new();

        match player.interact(&mut system, id(10), 0.0) {
            InteractionOutcome::SwitchActivated { doors } => {
                assert_eq!(doors.len(), 2);
                assert!(doors.iter().all(|(_, r)| *r == DoorResponse::Opening));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(system.interactable(id(10)).unwrap().prompt(), SWITCH_USED_PROMPT);
        assert_eq!(player.interact(&mut system, id(10), 1.0), InteractionOutcome::SwitchSpent);
    }

    #[test]
    fn test_reusable_switch_keeps_prompt() {
        let mut system = InteractionSystem::default();
        system.add_door(Door::new(id(1), DoorSettings::new(DoorLock::Switch), Vec3::ZERO));
        system.add_interactable(id(10), Interactable::switch(vec![id(1)], false));
        let mut player = Player::new();

        player.interact(&mut system, id(10), 0.0);
        assert_eq!(system.interactable(id(10)).unwrap().prompt(), "Press E to activate switch");
        assert!(matches!(
            player.interact(&mut system, id(10), 0.1),
            InteractionOutcome::SwitchActivated { .. }
        ));
    }

    #[test]
    fn test_door_interactable() {
        let mut system = InteractionSystem::default();
        system.add_door(Door::new(
            id(1),
            DoorSettings::new(DoorLock::KeyCard("blue".into())),
            Vec3::ZERO,
        ));
        system.add_interactable(id(11), Interactable::door(id(1)));
        let mut player = Player::new();

        assert_eq!(
            player.interact(&mut system, id(11), 0.0),
            InteractionOutcome::Door { door: id(1), response: DoorResponse::Locked }
        );
        assert_eq!(system.required_keycards(&player.progress).collect::<Vec<_>>(), vec!["blue"]);

        player.progress.set_keycard("blue");
        assert_eq!(
            player.interact(&mut system, id(11), 1.0),
            InteractionOutcome::Door { door: id(1), response: DoorResponse::Opening }
        );
        system.update(1.5, &mut player.feedback);
        assert!(system.is_door_open(id(1)));
    }

    #[test]
    fn test_manual_pickup_removed_after_use() {
        let mut system = InteractionSystem::default();
        let mut def = PickupDef::new("secret_stash", PickupKind::Secret);
        def.mode = PickupMode::Interactive;
        system.add_pickup(def.spawn(id(5), Vec3::ZERO));
        system.add_interactable(id(5), Interactable::pickup(id(5)));
        let mut player = Player::new();

        let outcome = player.interact(&mut system, id(5), 0.0);
        assert!(matches!(outcome, InteractionOutcome::Pickup { effect: Some(_), .. }));
        assert!(system.pickup(id(5)).is_none());
        assert_eq!(player.interact(&mut system, id(5), 0.1), InteractionOutcome::Missing);
    }

    #[test]
    fn test_collect_pickups_in_range() {
        let mut system = InteractionSystem::default();
        system.add_pickup(PickupDef::new("medkit", PickupKind::Health(25.0)).spawn(id(1), Vec3::ZERO));
        system.add_pickup(
            PickupDef::new("card", PickupKind::KeyCard("red".into())).spawn(id(2), Vec3::new(10.0, 0.0, 0.0)),
        );
        system.add_pickup(PickupDef::new("shells", PickupKind::Ammo { weapon: 0, amount: 4 }).spawn(id(3), Vec3::Z));
        let mut player = Player::new();
        let mut target = PickupTarget {
            vitals: &mut player.vitals,
            weapons: &mut player.weapons,
            progress: &mut player.progress,
        };

        let collected = system
            .collect_pickups(Vec3::new(0.0, 0.0, 0.5), &mut target, &mut player.feedback)
            .unwrap();

        // Full health: medkit stays, ammo is taken, card is out of reach
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].0, id(3));
        assert!(system.pickup(id(1)).is_some());
        assert!(system.pickup(id(2)).is_some());
        assert!(system.pickup(id(3)).is_none());
    }

    #[test]
    fn test_notify_kills_opens_enemy_doors() {
        let mut system = InteractionSystem::default();
        system.add_door(Door::new(id(1), DoorSettings::new(DoorLock::EnemyCount(2)), Vec3::ZERO));
        system.add_door(Door::new(id(2), DoorSettings::default(), Vec3::ZERO));
        let mut feedback = RecordingFeedback::new();

        assert!(system.notify_kills(0.0, 1, &mut feedback).is_empty());
        assert_eq!(system.notify_kills(1.0, 2, &mut feedback), vec![id(1)]);
        assert!(system.notify_kills(2.0, 3, &mut feedback).is_empty());
    }

    #[test]
    fn test_look_at_prompt() {
        let mut system = InteractionSystem::new(3.0);
        system.add_interactable(id(7), Interactable::door(id(1)).with_prompt("Open the vault"));

        let hit = |distance: f32, entity: Option<EntityId>| RaycastHit {
            entity,
            point: Vec3::Z * distance,
            normal: Vec3::NEG_Z,
            distance,
            layer: CollisionLayer::INTERACTABLES,
        };

        let near = LookWorld(Some(hit(2.0, Some(id(7)))));
        assert_eq!(system.look_at(&near, Vec3::ZERO, Vec3::Z), Some((id(7), "Open the vault")));

        let far = LookWorld(Some(hit(5.0, Some(id(7)))));
        assert_eq!(system.look_at(&far, Vec3::ZERO, Vec3::Z), None);

        let wall = LookWorld(Some(hit(1.0, None)));
        assert_eq!(system.look_at(&wall, Vec3::ZERO, Vec3::Z), None);
    }
}
