//! One level of gameplay and its tick
//!
//! [`LevelSession`] owns every per-level object: the clock, the player, the
//! weapon controller, enemies, doors and pickups, the progress counters and
//! the level flow. Hosts feed it input and collaborators once per frame
//! through [`LevelSession::tick`] and read back the ordered event log.

use crate::config::{ConfigResult, ExitTrigger, GameConfig};
use crate::events::GameEvent;
use crate::player::Player;
use crate::sandbox::SphereWorld;
use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashMap};
use strafe_ai::{DirectNavigator, EnemyAgent, EnemyEvent, EnemyStats, EnemyTick};
use strafe_combat::{
    apply_area_damage, resolve_shot, AreaDamage, CombatResult, DamageInfo, DamageKind,
    DamageOutcome, DamageTargets, FireOutcome, HitOutcome, TriggerInput, Vitals,
    WeaponController, WeaponSlot,
};
use strafe_core::{
    CollisionLayer, EffectKind, EntityId, Feedback, GameClock, IdAllocator, LayerMask,
};
use strafe_gamestate::{GameProgress, LevelFlow, LevelStatus, LevelSummary, SceneLoader};
use strafe_interact::{
    Door, DoorMotion, InteractContext, Interactable, InteractionOutcome, InteractionSystem, PickupDef,
    PickupMode, PickupTarget,
};

/// Radius of enemy hit spheres in the sandbox world
pub const ENEMY_RADIUS: f32 = 0.5;

/// Radius of door, switch and interactive pickup colliders
pub const INTERACTABLE_RADIUS: f32 = 0.5;

/// Height above the corpse at which a dropped pickup appears
pub const DROP_HEIGHT: f32 = 0.5;

/// Blast radius and damage at scale 1
pub const EXPLOSION_RADIUS: f32 = 5.0;
pub const EXPLOSION_DAMAGE: f32 = 100.0;

/// One frame of player input, as reported by the host controller
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInput {
    /// Feet position
    pub position: Vec3,
    /// View direction
    pub look: Vec3,
    pub trigger: TriggerInput,
    pub reload: bool,
    /// Select a weapon slot directly
    pub select_weapon: Option<usize>,
    /// Scroll through slots (+1 next, -1 previous)
    pub cycle_weapon: i32,
    pub interact: bool,
    pub toggle_pause: bool,
}

impl Default for PlayerInput {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            look: Vec3::Z,
            trigger: TriggerInput::default(),
            reload: false,
            select_weapon: None,
            cycle_weapon: 0,
            interact: false,
            toggle_pause: false,
        }
    }
}

impl PlayerInput {
    /// Stand at `position` looking along `look`
    pub fn at(position: Vec3, look: Vec3) -> Self {
        Self {
            position,
            look,
            ..Default::default()
        }
    }

    pub fn firing(mut self, trigger: TriggerInput) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn reloading(mut self) -> Self {
        self.reload = true;
        self
    }

    pub fn selecting(mut self, slot: usize) -> Self {
        self.select_weapon = Some(slot);
        self
    }

    pub fn interacting(mut self) -> Self {
        self.interact = true;
        self
    }

    pub fn pausing(mut self) -> Self {
        self.toggle_pause = true;
        self
    }
}

/// Host collaborators for one tick
pub struct Host<'a> {
    pub feedback: &'a mut dyn Feedback,
    pub scenes: &'a mut dyn SceneLoader,
}

/// Live enemies keyed by id, in spawn order
#[derive(Default)]
pub struct Roster {
    agents: BTreeMap<EntityId, EnemyAgent>,
}

impl Roster {
    pub fn get(&self, id: EntityId) -> Option<&EnemyAgent> {
        self.agents.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnemyAgent> {
        self.agents.values()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Enemies that are still alive
    pub fn alive(&self) -> usize {
        self.agents.values().filter(|a| !a.is_dead()).count()
    }
}

impl DamageTargets for Roster {
    fn vitals_mut(&mut self, entity: EntityId) -> Option<&mut Vitals> {
        self.agents.get_mut(&entity).map(EnemyAgent::vitals_mut)
    }
}

/// Death observed during the enemy step, handled after every agent ticked
struct Death {
    enemy: EntityId,
    position: Vec3,
    drop: Option<String>,
}

/// All gameplay state of one level
pub struct LevelSession {
    config: GameConfig,
    clock: GameClock,
    rng: ChaCha8Rng,
    ids: IdAllocator,
    physics: SphereWorld,
    navigator: DirectNavigator,
    player: Player,
    weapons: WeaponController,
    enemies: Roster,
    interaction: InteractionSystem,
    progress: GameProgress,
    flow: LevelFlow,
    exit: Option<ExitTrigger>,
    doors_by_name: HashMap<String, EntityId>,
}

impl LevelSession {
    /// Validate the config and spawn everything it places
    pub fn new(config: GameConfig) -> ConfigResult<Self> {
        config.validate()?;

        let mut ids = IdAllocator::new();
        let player = Player::spawn(ids.allocate(), config.player.clone());
        let weapons = WeaponController::new(
            config.weapons.iter().cloned().map(WeaponSlot::new).collect(),
        )
        .with_policy(config.reload_policy);

        let mut session = Self {
            clock: GameClock::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            ids,
            physics: SphereWorld::new(),
            navigator: DirectNavigator::new(),
            player,
            weapons,
            enemies: Roster::default(),
            interaction: InteractionSystem::new(config.interaction_distance),
            progress: GameProgress::new(),
            flow: LevelFlow::new(config.level.clone()),
            exit: config.exit,
            doors_by_name: HashMap::new(),
            config,
        };
        session.populate();

        log::info!(
            "Level {} ready: {} enemies, {} pickups, {} doors",
            session.config.level.name,
            session.enemies.len(),
            session.interaction.pickups().count(),
            session.doors_by_name.len()
        );
        Ok(session)
    }

    fn populate(&mut self) {
        let now = self.clock.now();

        for spawn in self.config.enemy_spawns.clone() {
            if let Some(stats) = self.config.archetype(&spawn.archetype).cloned() {
                self.spawn_enemy(stats, spawn.position, now);
            }
        }

        for spawn in self.config.pickup_spawns.clone() {
            if let Some(def) = self.config.pickup(&spawn.pickup).cloned() {
                self.spawn_pickup(&def, spawn.position);
            }
        }

        for spawn in self.config.doors.clone() {
            let id = self.ids.allocate();
            self.interaction.add_door(Door::new(id, spawn.settings, spawn.position));
            let mut interactable = Interactable::door(id);
            if let Some(prompt) = spawn.prompt {
                interactable = interactable.with_prompt(prompt);
            }
            self.interaction.add_interactable(id, interactable);
            self.physics.add_sphere(
                Some(id),
                spawn.position,
                INTERACTABLE_RADIUS,
                CollisionLayer::INTERACTABLES,
            );
            self.doors_by_name.insert(spawn.name, id);
        }

        for spawn in self.config.switches.clone() {
            let id = self.ids.allocate();
            let doors = spawn
                .doors
                .iter()
                .filter_map(|name| self.doors_by_name.get(name).copied())
                .collect();
            let mut interactable = Interactable::switch(doors, spawn.one_time);
            if let Some(prompt) = spawn.prompt {
                interactable = interactable.with_prompt(prompt);
            }
            self.interaction.add_interactable(id, interactable);
            self.physics.add_sphere(
                Some(id),
                spawn.position,
                INTERACTABLE_RADIUS,
                CollisionLayer::INTERACTABLES,
            );
        }
    }

    /// Add an enemy at runtime
    pub fn spawn_enemy(&mut self, stats: EnemyStats, position: Vec3, now: f32) -> EntityId {
        let id = self.ids.allocate();
        self.navigator.add_agent(id, position, stats.move_speed);
        self.physics
            .add_sphere(Some(id), position, ENEMY_RADIUS, CollisionLayer::ENEMIES);
        let agent = EnemyAgent::spawn(id, stats, position, now, &mut self.rng);
        self.enemies.agents.insert(id, agent);
        id
    }

    /// Place a pickup. Interactive pickups also get a collider for the use ray.
    pub fn spawn_pickup(&mut self, def: &PickupDef, position: Vec3) -> EntityId {
        let id = self.ids.allocate();
        self.interaction.add_pickup(def.spawn(id, position));
        if def.mode == PickupMode::Interactive {
            self.interaction.add_interactable(id, Interactable::pickup(id));
            self.physics
                .add_sphere(Some(id), position, INTERACTABLE_RADIUS, CollisionLayer::PICKUPS);
        }
        id
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn now(&self) -> f32 {
        self.clock.now()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn weapons(&self) -> &WeaponController {
        &self.weapons
    }

    pub fn enemies(&self) -> &Roster {
        &self.enemies
    }

    pub fn interaction(&self) -> &InteractionSystem {
        &self.interaction
    }

    pub fn progress(&self) -> &GameProgress {
        &self.progress
    }

    pub fn status(&self) -> LevelStatus {
        self.flow.status()
    }

    pub fn flow(&self) -> &LevelFlow {
        &self.flow
    }

    pub fn physics(&self) -> &SphereWorld {
        &self.physics
    }

    /// Add level geometry
    pub fn physics_mut(&mut self) -> &mut SphereWorld {
        &mut self.physics
    }

    /// Door id by config name
    pub fn door_id(&self, name: &str) -> Option<EntityId> {
        self.doors_by_name.get(name).copied()
    }

    /// End-of-level statistics
    pub fn summary(&self) -> LevelSummary {
        self.progress.summary(self.config.level.secrets_total)
    }

    /// The interactable under the crosshair and its prompt
    pub fn look_prompt(&self) -> Option<&str> {
        self.interaction
            .look_at(&self.physics, self.player.eye(), self.player.look())
            .map(|(_, prompt)| prompt)
    }

    /// Advance the level by `delta_time` seconds
    pub fn tick(
        &mut self,
        delta_time: f32,
        input: &PlayerInput,
        host: &mut Host<'_>,
    ) -> CombatResult<Vec<GameEvent>> {
        let mut events = Vec::new();

        if input.toggle_pause {
            if let Some(paused) = self.flow.toggle_pause() {
                log::info!("{}", if paused { "Paused" } else { "Resumed" });
                events.push(GameEvent::LevelStatusChanged(self.flow.status()));
            }
        }
        if self.flow.is_paused() {
            return Ok(events);
        }

        let delta_time = self.clock.advance(delta_time);
        let now = self.clock.now();
        self.progress.tick(delta_time);
        self.player.update(delta_time);
        self.player.set_view(input.position, input.look);

        if self.player.is_alive() {
            self.step_weapons(now, input, host.feedback, &mut events)?;
            if input.interact {
                self.step_interact(now, host.feedback, &mut events)?;
            }
        } else {
            self.weapons.update(now);
        }
        events.extend(self.weapons.drain_events().into_iter().map(GameEvent::Weapon));

        let (deaths, reclaimed) = self.step_enemies(now, delta_time, host.feedback, &mut events);
        self.handle_deaths(now, deaths, host.feedback, &mut events);
        for enemy in reclaimed {
            self.enemies.agents.remove(&enemy);
            self.navigator.remove_agent(enemy);
            self.ids.release(enemy);
            events.push(GameEvent::EnemyReclaimed { enemy });
        }

        for (door, event) in self.interaction.update(now, host.feedback) {
            self.sync_door_collider(door);
            events.push(GameEvent::Door { door, event });
        }

        if self.player.is_alive() {
            self.step_pickups(host.feedback, &mut events)?;
            self.check_exit(now, &mut events);
        }

        if let Some(transition) = self.flow.update(now, host.scenes) {
            events.push(GameEvent::LevelTransition(transition));
        }
        Ok(events)
    }

    /// Set off a blast (barrels, rockets). Corpses stop blocking shots at
    /// once; kills are counted on the next tick.
    pub fn explode(
        &mut self,
        center: Vec3,
        scale: f32,
        feedback: &mut dyn Feedback,
    ) -> CombatResult<Vec<GameEvent>> {
        let blast = AreaDamage::new(center, EXPLOSION_RADIUS * scale, EXPLOSION_DAMAGE * scale)
            .with_layers(LayerMask::from_layers(&[CollisionLayer::ENEMIES]));
        let hits = apply_area_damage(&self.physics, &mut self.enemies, feedback, &blast)?;

        let mut events = Vec::with_capacity(hits.len());
        for hit in hits {
            if let Some(agent) = self.enemies.get(hit.entity) {
                agent.react_to_hit(&hit.outcome, feedback, &mut self.rng);
            }
            if hit.outcome.is_kill() {
                self.physics.remove(hit.entity);
            }
            events.push(GameEvent::EnemyDamaged {
                enemy: hit.entity,
                info: DamageInfo::new(hit.damage, DamageKind::Explosion).with_hit(center, Vec3::Y),
                outcome: hit.outcome,
            });
        }
        Ok(events)
    }

    fn step_weapons(
        &mut self,
        now: f32,
        input: &PlayerInput,
        feedback: &mut dyn Feedback,
        events: &mut Vec<GameEvent>,
    ) -> CombatResult<()> {
        self.weapons.update(now);

        if let Some(slot) = input.select_weapon {
            self.weapons.switch_to(slot);
        }
        if input.cycle_weapon != 0 {
            self.weapons.cycle(input.cycle_weapon);
        }
        if input.reload {
            self.weapons.reload(now, feedback);
        }

        if !(input.trigger.pressed || input.trigger.held) {
            return Ok(());
        }

        match self.weapons.fire(now, input.trigger, feedback) {
            FireOutcome::Fired(shot) => {
                let eye = self.player.eye();
                let look = self.player.look();
                feedback.play_effect(EffectKind::MuzzleFlash, eye, look);
                events.push(GameEvent::ShotFired {
                    weapon: shot.weapon_index,
                    ammo_left: self.weapons.slot(shot.weapon_index).map_or(0, |s| s.current_ammo()),
                });

                let hit = resolve_shot(
                    &self.physics,
                    &mut self.enemies,
                    feedback,
                    eye,
                    look,
                    &shot,
                    Some(self.player.id()),
                )?;
                match hit {
                    HitOutcome::Damaged { entity, point, normal, outcome } => {
                        if let Some(agent) = self.enemies.get(entity) {
                            agent.react_to_hit(&outcome, feedback, &mut self.rng);
                        }
                        events.push(GameEvent::EnemyDamaged {
                            enemy: entity,
                            info: DamageInfo::new(shot.damage, DamageKind::Bullet)
                                .with_source(self.player.id())
                                .with_hit(point, normal),
                            outcome,
                        });
                    }
                    HitOutcome::Environment { point, normal } => {
                        events.push(GameEvent::ImpactOnSurface { point, normal });
                    }
                    HitOutcome::Ignored { .. } | HitOutcome::Miss => {}
                }
            }
            FireOutcome::EmptyClick { reload_started } => events.push(GameEvent::EmptyClick {
                weapon: self.weapons.active_index(),
                reload_started,
            }),
            FireOutcome::Rejected(reason) => events.push(GameEvent::FireRejected(reason)),
        }
        Ok(())
    }

    fn step_interact(
        &mut self,
        now: f32,
        feedback: &mut dyn Feedback,
        events: &mut Vec<GameEvent>,
    ) -> CombatResult<()> {
        let Some((target, _)) = self
            .interaction
            .look_at(&self.physics, self.player.eye(), self.player.look())
        else {
            return Ok(());
        };

        let mut ctx = InteractContext {
            now,
            target: PickupTarget {
                vitals: self.player.vitals_mut(),
                weapons: &mut self.weapons,
                progress: &mut self.progress,
            },
            feedback,
        };
        match self.interaction.interact(target, &mut ctx)? {
            InteractionOutcome::Door { door, response } => {
                self.sync_door_collider(door);
                events.push(GameEvent::DoorResponse { door, response });
            }
            InteractionOutcome::Pickup { pickup, effect } => {
                if let Some(effect) = effect {
                    self.physics.remove(pickup);
                    events.push(GameEvent::PickupCollected { pickup, effect });
                }
            }
            InteractionOutcome::SwitchActivated { doors } => {
                events.push(GameEvent::SwitchUsed { switch: target });
                for (door, response) in doors {
                    self.sync_door_collider(door);
                    events.push(GameEvent::DoorResponse { door, response });
                }
            }
            InteractionOutcome::SwitchSpent | InteractionOutcome::Missing => {}
        }
        Ok(())
    }

    fn step_enemies(
        &mut self,
        now: f32,
        delta_time: f32,
        feedback: &mut dyn Feedback,
        events: &mut Vec<GameEvent>,
    ) -> (Vec<Death>, Vec<EntityId>) {
        self.navigator.step(delta_time);

        let mut deaths = Vec::new();
        let mut reclaimed = Vec::new();
        let player_position = self.player.position();

        for (&id, agent) in self.enemies.agents.iter_mut() {
            if let Some(position) = self.navigator.position(id) {
                agent.set_position(position);
                self.physics.set_center(id, position);
            }

            let mut ctx = EnemyTick {
                now,
                delta_time,
                player_position,
                player: self.player.vitals_mut(),
                navigator: &mut self.navigator,
                feedback: &mut *feedback,
                rng: &mut self.rng,
            };
            let agent_events = agent.tick(&mut ctx);

            for event in agent_events {
                match event {
                    EnemyEvent::StateChanged(change) => {
                        events.push(GameEvent::EnemyStateChanged { enemy: id, change });
                    }
                    EnemyEvent::AttackStarted => events.push(GameEvent::EnemyAttackStarted { enemy: id }),
                    EnemyEvent::AttackDodged => events.push(GameEvent::EnemyAttackDodged { enemy: id }),
                    EnemyEvent::AttackLanded { damage, outcome } => {
                        if outcome == DamageOutcome::Ignored {
                            continue;
                        }
                        self.player.react_to_damage(&outcome, feedback, &mut self.rng);
                        events.push(GameEvent::PlayerDamaged {
                            info: DamageInfo::new(damage, DamageKind::Melee).with_source(id),
                            outcome,
                        });
                        if outcome.is_kill() && self.flow.player_died(now) {
                            events.push(GameEvent::PlayerDied);
                            events.push(GameEvent::LevelStatusChanged(self.flow.status()));
                        }
                    }
                    EnemyEvent::Died { position, drop } => deaths.push(Death {
                        enemy: id,
                        position,
                        drop,
                    }),
                    EnemyEvent::Reclaimed => reclaimed.push(id),
                }
            }
        }
        (deaths, reclaimed)
    }

    fn handle_deaths(
        &mut self,
        now: f32,
        deaths: Vec<Death>,
        feedback: &mut dyn Feedback,
        events: &mut Vec<GameEvent>,
    ) {
        if deaths.is_empty() {
            return;
        }

        for death in deaths {
            self.physics.remove(death.enemy);
            let total_kills = self.progress.record_kill();
            events.push(GameEvent::EnemyKilled {
                enemy: death.enemy,
                total_kills,
            });

            let def = death.drop.as_deref().and_then(|id| self.config.pickup(id)).cloned();
            if let Some(def) = def {
                let position = death.position + Vec3::Y * DROP_HEIGHT;
                let pickup = self.spawn_pickup(&def, position);
                events.push(GameEvent::PickupSpawned {
                    pickup,
                    id: def.id,
                    position,
                });
            }
        }

        let kills = self.progress.enemies_killed();
        for door in self.interaction.notify_kills(now, kills, feedback) {
            events.push(GameEvent::DoorUnlocked { door });
        }
    }

    fn step_pickups(
        &mut self,
        feedback: &mut dyn Feedback,
        events: &mut Vec<GameEvent>,
    ) -> CombatResult<()> {
        let position = self.player.position();
        let mut target = PickupTarget {
            vitals: self.player.vitals_mut(),
            weapons: &mut self.weapons,
            progress: &mut self.progress,
        };
        let collected = self
            .interaction
            .collect_pickups(position, &mut target, feedback)?;

        for (pickup, effect) in collected {
            self.physics.remove(pickup);
            events.push(GameEvent::PickupCollected { pickup, effect });
        }
        Ok(())
    }

    /// A fully open door lets shots through; any other state blocks them
    fn sync_door_collider(&mut self, door: EntityId) {
        let Some(motion) = self.interaction.door(door).map(Door::motion) else {
            return;
        };
        let layer = match motion {
            DoorMotion::Open => CollisionLayer::DOORWAYS,
            _ => CollisionLayer::INTERACTABLES,
        };
        self.physics.set_layer(door, layer);
    }

    fn check_exit(&mut self, now: f32, events: &mut Vec<GameEvent>) {
        let Some(exit) = self.exit else {
            return;
        };
        if self.player.position().distance(exit.position) > exit.radius {
            return;
        }
        if self.flow.complete_level(now, &mut self.progress) {
            log::info!("{}", self.summary());
            events.push(GameEvent::LevelStatusChanged(self.flow.status()));
        }
    }
}
