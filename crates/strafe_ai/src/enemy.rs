//! Enemy combat AI: detection, pursuit and the windup/recovery attack cycle
//!
//! The agent is driven by [`EnemyAgent::tick`]. Suspensions (attack windup,
//! recovery, reclamation) are deadlines on the level clock, so nothing
//! blocks and a dead agent simply stops advancing them.

use crate::navigation::Navigator;
use crate::state_machine::{State, StateChange, StateMachine};
use glam::{Quat, Vec3};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use strafe_combat::{CombatError, CombatResult, DamageOutcome, DropTable, Vitals};
use strafe_core::{CueSet, Deadline, EntityId, Feedback};

/// AI state of an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    Idle,
    Pursuing,
    Attacking,
    Dead,
}

impl State for EnemyState {
    fn is_terminal(&self) -> bool {
        matches!(self, EnemyState::Dead)
    }
}

/// Audio cue pools for an enemy archetype
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyCues {
    pub hurt: CueSet,
    pub attack: CueSet,
    pub death: CueSet,
    pub idle: CueSet,
}

/// Enemy archetype configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyStats {
    pub name: String,
    pub max_health: f32,
    pub attack_damage: f32,
    pub attack_range: f32,
    /// Seconds between attack cycle starts
    pub attack_cooldown: f32,
    pub move_speed: f32,
    pub detection_range: f32,
    /// Mean seconds between idle cues; 0 disables them
    pub idle_sound_interval: f32,
    /// Delay from attack start to the damage check
    pub windup: f32,
    /// Delay from the damage check until the agent may attack again
    pub recovery: f32,
    /// Delay from death until the agent is removed
    pub reclaim_delay: f32,
    /// Yaw slerp rate while facing the player
    pub turn_rate: f32,
    pub cues: EnemyCues,
    pub drops: DropTable,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            name: "Grunt".to_string(),
            max_health: 100.0,
            attack_damage: 10.0,
            attack_range: 2.0,
            attack_cooldown: 2.0,
            move_speed: 3.5,
            detection_range: 20.0,
            idle_sound_interval: 8.0,
            windup: 0.5,
            recovery: 0.5,
            reclaim_delay: 5.0,
            turn_rate: 5.0,
            cues: EnemyCues::default(),
            drops: DropTable::default(),
        }
    }
}

impl EnemyStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attack(mut self, damage: f32, range: f32, cooldown: f32) -> Self {
        self.attack_damage = damage;
        self.attack_range = range;
        self.attack_cooldown = cooldown;
        self
    }

    pub fn with_detection_range(mut self, range: f32) -> Self {
        self.detection_range = range;
        self
    }

    pub fn with_drops(mut self, drops: DropTable) -> Self {
        self.drops = drops;
        self
    }

    pub fn with_cues(mut self, cues: EnemyCues) -> Self {
        self.cues = cues;
        self
    }

    /// Reject archetypes the AI cannot run
    pub fn validate(&self) -> CombatResult<()> {
        let invalid = |field, reason| CombatError::InvalidStat {
            owner: self.name.clone(),
            field,
            reason,
        };
        let non_negative = [
            ("attack_damage", self.attack_damage),
            ("attack_range", self.attack_range),
            ("attack_cooldown", self.attack_cooldown),
            ("move_speed", self.move_speed),
            ("detection_range", self.detection_range),
            ("idle_sound_interval", self.idle_sound_interval),
            ("windup", self.windup),
            ("recovery", self.recovery),
            ("reclaim_delay", self.reclaim_delay),
            ("turn_rate", self.turn_rate),
        ];

        if !(self.max_health.is_finite() && self.max_health > 0.0) {
            return Err(invalid("max_health", "must be positive"));
        }
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, "must be non-negative"));
            }
        }
        if !(0.0..=1.0).contains(&self.drops.chance) {
            return Err(invalid("drops.chance", "must be within [0, 1]"));
        }
        Ok(())
    }
}

/// What an agent did during one tick
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyEvent {
    StateChanged(StateChange<EnemyState>),
    AttackStarted,
    /// Windup finished with the player in reach
    AttackLanded { damage: f32, outcome: DamageOutcome },
    /// Windup finished with the player out of reach
    AttackDodged,
    Died { position: Vec3, drop: Option<String> },
    /// Grace delay after death elapsed; remove the agent
    Reclaimed,
}

/// Collaborators and inputs for one agent tick
pub struct EnemyTick<'a> {
    pub now: f32,
    pub delta_time: f32,
    pub player_position: Vec3,
    pub player: &'a mut Vitals,
    pub navigator: &'a mut dyn Navigator,
    pub feedback: &'a mut dyn Feedback,
    pub rng: &'a mut dyn RngCore,
}

/// What the FSM sees each tick
struct Perception {
    distance: f32,
    alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AttackPhase {
    Windup(Deadline),
    Recovery(Deadline),
}

fn build_fsm(stats: &EnemyStats) -> StateMachine<EnemyState, Perception> {
    use EnemyState::*;

    let detect = stats.detection_range;
    let reach = stats.attack_range;
    let mut fsm: StateMachine<EnemyState, Perception> = StateMachine::new(Idle);

    fsm.add_global_transition(Dead, |p| !p.alive, i32::MAX);

    fsm.add_transition_priority(
        Idle,
        Attacking,
        move |p| p.distance <= reach && p.distance <= detect,
        1,
    );
    fsm.add_transition(Idle, Pursuing, move |p| p.distance <= detect);

    fsm.add_transition_priority(Pursuing, Idle, move |p| p.distance > detect, 1);
    fsm.add_transition(Pursuing, Attacking, move |p| p.distance <= reach);

    fsm.add_transition_priority(Attacking, Idle, move |p| p.distance > detect, 1);
    fsm.add_transition(Attacking, Pursuing, move |p| p.distance > reach);

    fsm
}

fn idle_cue_delay(rng: &mut dyn RngCore, interval: f32, low: f32, high: f32) -> f32 {
    rng.gen_range(interval * low..=interval * high)
}

/// One enemy: vitals, AI state and attack cycle
pub struct EnemyAgent {
    id: EntityId,
    stats: EnemyStats,
    vitals: Vitals,
    fsm: StateMachine<EnemyState, Perception>,
    position: Vec3,
    facing: Quat,
    attack: Option<AttackPhase>,
    last_attack_time: Option<f32>,
    distance_to_target: f32,
    next_idle_cue: Deadline,
    reclaim_at: Option<Deadline>,
    reclaimed: bool,
}

impl EnemyAgent {
    /// Spawn with full health in `Idle`
    pub fn spawn(
        id: EntityId,
        stats: EnemyStats,
        position: Vec3,
        now: f32,
        rng: &mut dyn RngCore,
    ) -> Self {
        let first_cue = if stats.idle_sound_interval > 0.0 {
            idle_cue_delay(rng, stats.idle_sound_interval, 0.5, 1.0)
        } else {
            0.0
        };

        Self {
            id,
            vitals: Vitals::new(stats.max_health),
            fsm: build_fsm(&stats),
            stats,
            position,
            facing: Quat::IDENTITY,
            attack: None,
            last_attack_time: None,
            distance_to_target: f32::INFINITY,
            next_idle_cue: Deadline::after(now, first_cue),
            reclaim_at: None,
            reclaimed: false,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn stats(&self) -> &EnemyStats {
        &self.stats
    }

    pub fn state(&self) -> EnemyState {
        *self.fsm.current()
    }

    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    /// Damage routing entry point used by hit resolution
    pub fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Sync the transform reported by the host
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Unit forward vector of the agent's facing
    pub fn forward(&self) -> Vec3 {
        self.facing * Vec3::Z
    }

    pub fn distance_to_target(&self) -> f32 {
        self.distance_to_target
    }

    /// Mid attack cycle (windup or recovery)
    pub fn is_attacking(&self) -> bool {
        self.attack.is_some()
    }

    pub fn last_attack_time(&self) -> Option<f32> {
        self.last_attack_time
    }

    /// Dead agents are no longer targeted or collided with
    pub fn is_dead(&self) -> bool {
        self.state() == EnemyState::Dead
    }

    pub fn is_reclaimed(&self) -> bool {
        self.reclaimed
    }

    pub fn reclaim_deadline(&self) -> Option<Deadline> {
        self.reclaim_at
    }

    /// Apply damage and play the hurt cue. Death is processed on the next tick.
    pub fn take_damage(
        &mut self,
        amount: f32,
        feedback: &mut dyn Feedback,
        rng: &mut dyn RngCore,
    ) -> CombatResult<DamageOutcome> {
        let outcome = self.vitals.apply_damage(amount)?;
        self.react_to_hit(&outcome, feedback, rng);
        Ok(outcome)
    }

    /// Hurt feedback for damage applied elsewhere (hit resolution)
    pub fn react_to_hit(
        &self,
        outcome: &DamageOutcome,
        feedback: &mut dyn Feedback,
        rng: &mut dyn RngCore,
    ) {
        if *outcome != DamageOutcome::Ignored {
            self.stats.cues.hurt.play(feedback, rng, Some(self.position));
        }
    }

    /// Advance perception, movement, the attack cycle and reclamation
    pub fn tick(&mut self, ctx: &mut EnemyTick<'_>) -> Vec<EnemyEvent> {
        let mut events = Vec::new();

        if self.is_dead() {
            self.advance_reclaim(ctx.now, &mut events);
            return events;
        }

        self.distance_to_target = self.position.distance(ctx.player_position);
        let perception = Perception {
            distance: self.distance_to_target,
            alive: self.vitals.is_alive(),
        };

        if let Some(change) = self.fsm.update(&perception) {
            log::debug!("{} {}: {:?} -> {:?}", self.stats.name, self.id, change.from, change.to);
            let entered = change.to;
            events.push(EnemyEvent::StateChanged(change));
            self.enter(entered, ctx, &mut events);
        }

        if self.is_dead() {
            return events;
        }

        self.advance_attack(ctx, &mut events);

        match self.state() {
            EnemyState::Pursuing => ctx.navigator.move_to(self.id, ctx.player_position),
            EnemyState::Attacking => {
                self.face(ctx.player_position, ctx.delta_time);
                if self.can_start_attack(ctx.now) {
                    self.start_attack(ctx, &mut events);
                }
            }
            EnemyState::Idle | EnemyState::Dead => {}
        }

        self.play_idle_cue(ctx);
        events
    }

    fn enter(&mut self, state: EnemyState, ctx: &mut EnemyTick<'_>, events: &mut Vec<EnemyEvent>) {
        match state {
            EnemyState::Idle | EnemyState::Attacking => ctx.navigator.stop(self.id),
            EnemyState::Pursuing => {}
            EnemyState::Dead => self.die(ctx, events),
        }
    }

    fn die(&mut self, ctx: &mut EnemyTick<'_>, events: &mut Vec<EnemyEvent>) {
        self.attack = None;
        ctx.navigator.stop(self.id);
        self.stats
            .cues
            .death
            .play(ctx.feedback, &mut *ctx.rng, Some(self.position));
        self.reclaim_at = Some(Deadline::after(ctx.now, self.stats.reclaim_delay));

        let drop = self.stats.drops.roll(&mut *ctx.rng).map(str::to_string);
        log::info!(
            "{} {} died at {:?} (drop: {:?})",
            self.stats.name,
            self.id,
            self.position,
            drop
        );
        events.push(EnemyEvent::Died {
            position: self.position,
            drop,
        });
    }

    fn advance_reclaim(&mut self, now: f32, events: &mut Vec<EnemyEvent>) {
        if self.reclaimed {
            return;
        }
        if self.reclaim_at.map_or(false, |at| at.is_due(now)) {
            self.reclaimed = true;
            log::debug!("{} {} reclaimed", self.stats.name, self.id);
            events.push(EnemyEvent::Reclaimed);
        }
    }

    fn face(&mut self, target: Vec3, delta_time: f32) {
        let mut direction = target - self.position;
        direction.y = 0.0;
        if direction.length_squared() <= f32::EPSILON {
            return;
        }
        let look = Quat::from_rotation_y(direction.x.atan2(direction.z));
        let t = (self.stats.turn_rate * delta_time).clamp(0.0, 1.0);
        self.facing = self.facing.slerp(look, t);
    }

    fn can_start_attack(&self, now: f32) -> bool {
        self.attack.is_none()
            && self
                .last_attack_time
                .map_or(true, |last| now >= last + self.stats.attack_cooldown)
    }

    fn start_attack(&mut self, ctx: &mut EnemyTick<'_>, events: &mut Vec<EnemyEvent>) {
        self.last_attack_time = Some(ctx.now);
        self.attack = Some(AttackPhase::Windup(Deadline::after(ctx.now, self.stats.windup)));
        self.stats
            .cues
            .attack
            .play(ctx.feedback, &mut *ctx.rng, Some(self.position));
        events.push(EnemyEvent::AttackStarted);
    }

    fn advance_attack(&mut self, ctx: &mut EnemyTick<'_>, events: &mut Vec<EnemyEvent>) {
        loop {
            match self.attack {
                Some(AttackPhase::Windup(deadline)) if deadline.is_due(ctx.now) => {
                    if self.distance_to_target <= self.stats.attack_range {
                        match ctx.player.apply_damage(self.stats.attack_damage) {
                            Ok(outcome) => events.push(EnemyEvent::AttackLanded {
                                damage: self.stats.attack_damage,
                                outcome,
                            }),
                            Err(err) => log::warn!("{} attack rejected: {}", self.stats.name, err),
                        }
                    } else {
                        events.push(EnemyEvent::AttackDodged);
                    }
                    let recovery = Deadline::after(deadline.at(), self.stats.recovery);
                    self.attack = Some(AttackPhase::Recovery(recovery));
                }
                Some(AttackPhase::Recovery(deadline)) if deadline.is_due(ctx.now) => {
                    self.attack = None;
                    return;
                }
                _ => return,
            }
        }
    }

    fn play_idle_cue(&mut self, ctx: &mut EnemyTick<'_>) {
        let interval = self.stats.idle_sound_interval;
        if interval <= 0.0 || self.stats.cues.idle.is_empty() || !self.next_idle_cue.is_due(ctx.now) {
            return;
        }
        self.stats
            .cues
            .idle
            .play(ctx.feedback, &mut *ctx.rng, Some(self.position));
        let delay = idle_cue_delay(&mut *ctx.rng, interval, 0.8, 1.2);
        self.next_idle_cue = Deadline::after(ctx.now, delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use strafe_core::RecordingFeedback;

    #[derive(Default)]
    struct RecordingNavigator {
        moves: Vec<(EntityId, Vec3)>,
        stops: Vec<EntityId>,
    }

    impl Navigator for RecordingNavigator {
        fn move_to(&mut self, entity: EntityId, target: Vec3) {
            self.moves.push((entity, target));
        }

        fn stop(&mut self, entity: EntityId) {
            self.stops.push(entity);
        }
    }

    struct Harness {
        player: Vitals,
        nav: RecordingNavigator,
        feedback: RecordingFeedback,
        rng: ChaCha8Rng,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                player: Vitals::new(100.0),
                nav: RecordingNavigator::default(),
                feedback: RecordingFeedback::new(),
                rng: ChaCha8Rng::seed_from_u64(3),
            }
        }

        fn spawn(&mut self, stats: EnemyStats) -> EnemyAgent {
            EnemyAgent::spawn(EntityId::new(1, 0), stats, Vec3::ZERO, 0.0, &mut self.rng)
        }

        fn tick(&mut self, agent: &mut EnemyAgent, now: f32, player_z: f32) -> Vec<EnemyEvent> {
            let mut ctx = EnemyTick {
                now,
                delta_time: 0.1,
                player_position: Vec3::new(0.0, 0.0, player_z),
                player: &mut self.player,
                navigator: &mut self.nav,
                feedback: &mut self.feedback,
                rng: &mut self.rng,
            };
            agent.tick(&mut ctx)
        }
    }

    fn quiet_stats() -> EnemyStats {
        EnemyStats {
            idle_sound_interval: 0.0,
            ..EnemyStats::default()
        }
    }

    #[test]
    fn test_detection_and_pursuit() {
        let mut h = Harness::new();
        let mut agent = h.spawn(quiet_stats());

        h.tick(&mut agent, 0.0, 30.0);
        assert_eq!(agent.state(), EnemyState::Idle);
        assert!(h.nav.moves.is_empty());

        h.tick(&mut agent, 0.1, 15.0);
        assert_eq!(agent.state(), EnemyState::Pursuing);
        assert_eq!(h.nav.moves.last(), Some(&(agent.id(), Vec3::new(0.0, 0.0, 15.0))));

        h.tick(&mut agent, 0.2, 25.0);
        assert_eq!(agent.state(), EnemyState::Idle);
        assert_eq!(h.nav.stops.last(), Some(&agent.id()));
    }

    #[test]
    fn test_attack_cycle_lands_after_windup() {
        let mut h = Harness::new();
        let mut agent = h.spawn(quiet_stats());

        let events = h.tick(&mut agent, 0.0, 1.5);
        assert_eq!(agent.state(), EnemyState::Attacking);
        assert!(events.contains(&EnemyEvent::AttackStarted));
        assert!(agent.is_attacking());

        h.tick(&mut agent, 0.25, 1.5);
        assert_eq!(h.player.health(), 100.0);

        let events = h.tick(&mut agent, 0.5, 1.5);
        assert!(matches!(events[0], EnemyEvent::AttackLanded { damage, .. } if damage == 10.0));
        assert_eq!(h.player.health(), 90.0);

        h.tick(&mut agent, 1.0, 1.5);
        assert!(!agent.is_attacking());

        // Cooldown runs from the cycle start
        let events = h.tick(&mut agent, 1.5, 1.5);
        assert!(!events.contains(&EnemyEvent::AttackStarted));
        let events = h.tick(&mut agent, 2.0, 1.5);
        assert!(events.contains(&EnemyEvent::AttackStarted));
    }

    #[test]
    fn test_attack_dodged_by_leaving_range() {
        let mut h = Harness::new();
        let mut agent = h.spawn(quiet_stats());

        h.tick(&mut agent, 0.0, 1.5);
        assert!(agent.is_attacking());

        h.tick(&mut agent, 0.4, 3.0);
        assert_eq!(agent.state(), EnemyState::Pursuing);

        let events = h.tick(&mut agent, 0.5, 3.0);
        assert!(events.contains(&EnemyEvent::AttackDodged));
        assert_eq!(h.player.health(), 100.0);
    }

    #[test]
    fn test_death_cancels_windup_and_reclaims() {
        let mut h = Harness::new();
        let stats = quiet_stats().with_drops(DropTable::new(1.0, ["health_small"]));
        let mut agent = h.spawn(stats);

        h.tick(&mut agent, 0.0, 1.5);
        assert!(agent.is_attacking());

        let outcome = agent.take_damage(150.0, &mut h.feedback, &mut h.rng).unwrap();
        assert!(outcome.is_kill());

        let events = h.tick(&mut agent, 0.3, 1.5);
        assert!(agent.is_dead());
        assert!(events.iter().any(|e| matches!(
            e,
            EnemyEvent::Died { drop: Some(item), .. } if item == "health_small"
        )));

        h.tick(&mut agent, 0.5, 1.5);
        assert_eq!(h.player.health(), 100.0);

        assert!(h.tick(&mut agent, 5.0, 1.5).is_empty());
        assert_eq!(h.tick(&mut agent, 5.4, 1.5), vec![EnemyEvent::Reclaimed]);
        assert!(agent.is_reclaimed());
        assert!(h.tick(&mut agent, 6.0, 1.5).is_empty());
    }

    #[test]
    fn test_dead_agent_ignores_damage() {
        let mut h = Harness::new();
        let mut agent = h.spawn(quiet_stats());
        agent.take_damage(100.0, &mut h.feedback, &mut h.rng).unwrap();

        let again = agent.take_damage(10.0, &mut h.feedback, &mut h.rng).unwrap();
        assert_eq!(again, DamageOutcome::Ignored);
    }

    #[test]
    fn test_idle_cue_schedule() {
        let mut h = Harness::new();
        let stats = EnemyStats {
            cues: EnemyCues {
                idle: CueSet::new(["growl"]),
                ..Default::default()
            },
            ..EnemyStats::default()
        };
        let mut agent = h.spawn(stats);

        h.tick(&mut agent, 3.9, 50.0);
        assert!(!h.feedback.played("growl"));

        h.tick(&mut agent, 8.0, 50.0);
        assert_eq!(h.feedback.sounds, vec!["growl".to_string()]);

        // Next cue lands 6.4..=9.6 seconds later
        h.tick(&mut agent, 14.3, 50.0);
        assert_eq!(h.feedback.sounds.len(), 1);
        h.tick(&mut agent, 17.7, 50.0);
        assert_eq!(h.feedback.sounds.len(), 2);
    }

    #[test]
    fn test_turns_toward_player() {
        let mut h = Harness::new();
        let mut agent = h.spawn(quiet_stats());
        agent.set_position(Vec3::new(0.0, 0.0, 0.0));

        let mut player = Vitals::new(100.0);
        for i in 0..60 {
            let mut ctx = EnemyTick {
                now: i as f32 * 0.1,
                delta_time: 0.1,
                player_position: Vec3::new(1.5, 0.0, 0.0),
                player: &mut player,
                navigator: &mut h.nav,
                feedback: &mut h.feedback,
                rng: &mut h.rng,
            };
            agent.tick(&mut ctx);
        }

        let forward = agent.forward();
        assert_relative_eq!(forward.x, 1.0, epsilon = 1e-3);
        assert_relative_eq!(forward.z, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_stats_validation() {
        assert!(EnemyStats::default().validate().is_ok());
        assert!(EnemyStats { max_health: 0.0, ..Default::default() }.validate().is_err());
        assert!(EnemyStats { windup: -1.0, ..Default::default() }.validate().is_err());
        let greedy = EnemyStats::default().with_drops(DropTable::new(1.5, ["x"]));
        assert!(greedy.validate().is_err());
    }
}
