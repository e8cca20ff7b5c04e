//! Weapon slots and the weapon controller state machine
//!
//! Each slot cycles `Idle -> Firing -> Idle` and `Idle -> Reloading -> Idle`.
//! Reloads are deadline timestamps checked by [`WeaponController::update`],
//! so a reload keeps running no matter which slot is active (see
//! [`ReloadPolicy`]).

use crate::error::{CombatError, CombatResult};
use serde::{Deserialize, Serialize};
use strafe_core::feedback::{play_optional, Feedback};
use strafe_core::Deadline;

/// Camera shake length applied per shot, scaled by `recoil`
const RECOIL_SHAKE_DURATION: f32 = 0.1;

/// What happens to a slot's pending reload when the player switches away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReloadPolicy {
    /// The reload finishes on schedule in the background
    #[default]
    ContinueInBackground,
    /// The reload and its elapsed time are discarded
    CancelOnSwitch,
}

/// Optional audio clips for a weapon
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponSounds {
    pub shoot: Option<String>,
    pub empty: Option<String>,
    pub reload: Option<String>,
}

/// Static weapon configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponStats {
    /// Weapon name/id
    pub name: String,
    /// Damage per hit
    pub damage: f32,
    /// Range in world units
    pub range: f32,
    /// Fire rate (shots per second)
    pub fire_rate: f32,
    /// Reload time in seconds
    pub reload_time: f32,
    /// Magazine size
    pub max_ammo: u32,
    /// Reserve capacity
    pub max_reserve_ammo: u32,
    /// Fires while the trigger is held
    pub is_automatic: bool,
    /// Camera shake intensity per shot
    pub recoil: f32,
    pub sounds: WeaponSounds,
}

impl Default for WeaponStats {
    fn default() -> Self {
        Self {
            name: "Pistol".to_string(),
            damage: 20.0,
            range: 100.0,
            fire_rate: 1.0,
            reload_time: 2.0,
            max_ammo: 30,
            max_reserve_ammo: 90,
            is_automatic: false,
            recoil: 0.1,
            sounds: WeaponSounds::default(),
        }
    }
}

impl WeaponStats {
    /// Create stats with a name and default numbers
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set damage
    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    /// Set range
    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    /// Set fire rate
    pub fn with_fire_rate(mut self, rate: f32) -> Self {
        self.fire_rate = rate;
        self
    }

    /// Set reload time
    pub fn with_reload_time(mut self, seconds: f32) -> Self {
        self.reload_time = seconds;
        self
    }

    /// Set magazine and reserve capacity
    pub fn with_ammo(mut self, max_ammo: u32, max_reserve_ammo: u32) -> Self {
        self.max_ammo = max_ammo;
        self.max_reserve_ammo = max_reserve_ammo;
        self
    }

    /// Make the weapon fully automatic
    pub fn automatic(mut self) -> Self {
        self.is_automatic = true;
        self
    }

    /// Seconds between accepted trigger requests
    pub fn fire_interval(&self) -> f32 {
        1.0 / self.fire_rate
    }

    /// Reject stats that would break the state machine
    pub fn validate(&self) -> CombatResult<()> {
        let invalid = |field, reason| CombatError::InvalidStat {
            owner: self.name.clone(),
            field,
            reason,
        };

        if !(self.fire_rate.is_finite() && self.fire_rate > 0.0) {
            return Err(invalid("fire_rate", "must be positive"));
        }
        if !(self.damage.is_finite() && self.damage >= 0.0) {
            return Err(invalid("damage", "must be non-negative"));
        }
        if !(self.range.is_finite() && self.range > 0.0) {
            return Err(invalid("range", "must be positive"));
        }
        if !(self.reload_time.is_finite() && self.reload_time >= 0.0) {
            return Err(invalid("reload_time", "must be non-negative"));
        }
        if self.max_ammo == 0 {
            return Err(invalid("max_ammo", "magazine must hold at least one round"));
        }
        Ok(())
    }
}

/// One configured weapon plus its ammo and reload state
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponSlot {
    stats: WeaponStats,
    current_ammo: u32,
    reserve_ammo: u32,
    reload: Option<Deadline>,
}

impl WeaponSlot {
    /// Create a slot with a full magazine and full reserve
    pub fn new(stats: WeaponStats) -> Self {
        let current_ammo = stats.max_ammo;
        let reserve_ammo = stats.max_reserve_ammo;
        Self {
            stats,
            current_ammo,
            reserve_ammo,
            reload: None,
        }
    }

    /// Override the ammo counts (clamped to capacity)
    pub fn with_ammo(mut self, current: u32, reserve: u32) -> Self {
        self.current_ammo = current.min(self.stats.max_ammo);
        self.reserve_ammo = reserve.min(self.stats.max_reserve_ammo);
        self
    }

    /// Get the configured stats
    pub fn stats(&self) -> &WeaponStats {
        &self.stats
    }

    /// Get weapon name
    pub fn name(&self) -> &str {
        &self.stats.name
    }

    /// Rounds in the magazine
    pub fn current_ammo(&self) -> u32 {
        self.current_ammo
    }

    /// Rounds in reserve
    pub fn reserve_ammo(&self) -> u32 {
        self.reserve_ammo
    }

    /// Check if a reload is pending
    pub fn is_reloading(&self) -> bool {
        self.reload.is_some()
    }

    /// When the pending reload completes
    pub fn reload_deadline(&self) -> Option<Deadline> {
        self.reload
    }

    /// Magazine not full, reserve not empty, not already reloading
    pub fn can_reload(&self) -> bool {
        !self.is_reloading()
            && self.current_ammo < self.stats.max_ammo
            && self.reserve_ammo > 0
    }

    /// Start a reload. Returns false if rejected.
    pub fn start_reload(&mut self, now: f32) -> bool {
        if !self.can_reload() {
            return false;
        }
        self.reload = Some(Deadline::after(now, self.stats.reload_time));
        true
    }

    /// Finish the reload if its deadline passed. Returns rounds transferred.
    pub fn finish_reload_if_due(&mut self, now: f32) -> Option<u32> {
        let deadline = self.reload?;
        if !deadline.is_due(now) {
            return None;
        }
        self.reload = None;

        let needed = self.stats.max_ammo - self.current_ammo;
        let transferred = needed.min(self.reserve_ammo);
        self.current_ammo += transferred;
        self.reserve_ammo -= transferred;
        Some(transferred)
    }

    /// Drop a pending reload and its elapsed time
    pub fn cancel_reload(&mut self) -> bool {
        self.reload.take().is_some()
    }

    /// Add reserve rounds, clamped to capacity. Returns rounds added.
    pub fn add_reserve(&mut self, amount: u32) -> u32 {
        let before = self.reserve_ammo;
        self.reserve_ammo = self
            .reserve_ammo
            .saturating_add(amount)
            .min(self.stats.max_reserve_ammo);
        self.reserve_ammo - before
    }

    fn consume_round(&mut self) -> bool {
        if self.current_ammo == 0 {
            return false;
        }
        self.current_ammo -= 1;
        true
    }

    /// Get ammo display string
    pub fn ammo_display(&self) -> String {
        format!("{} / {}", self.current_ammo, self.reserve_ammo)
    }
}

/// Trigger state for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerInput {
    /// Trigger went down this tick
    pub pressed: bool,
    /// Trigger is down
    pub held: bool,
}

impl TriggerInput {
    /// Trigger pressed this frame
    pub fn press() -> Self {
        Self { pressed: true, held: true }
    }

    /// Trigger held down since an earlier frame
    pub fn hold() -> Self {
        Self { pressed: false, held: true }
    }
}

/// Why a fire request was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireRejection {
    /// Controller holds no weapons
    NoWeapon,
    /// Semi-automatic weapon needs a fresh press
    NoTrigger,
    /// Active slot is reloading
    Reloading,
    /// Too soon after the previous request
    Cooldown,
}

/// A round that left the barrel; resolve it with [`crate::hit::resolve_shot`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub weapon_index: usize,
    pub damage: f32,
    pub range: f32,
    pub recoil: f32,
}

/// Result of a fire request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FireOutcome {
    Rejected(FireRejection),
    Fired(Shot),
    /// Magazine was empty; a reload may have been started
    EmptyClick { reload_started: bool },
}

/// State changes worth telling the HUD about
#[derive(Debug, Clone, PartialEq)]
pub enum WeaponEvent {
    ReloadStarted { index: usize, until: Deadline },
    ReloadFinished { index: usize, transferred: u32 },
    ReloadCancelled { index: usize },
    Switched { from: usize, to: usize },
}

/// Owns the player's weapon slots; exactly one is active
#[derive(Debug, Clone)]
pub struct WeaponController {
    slots: Vec<WeaponSlot>,
    active: usize,
    next_fire_time: f32,
    policy: ReloadPolicy,
    events: Vec<WeaponEvent>,
}

impl WeaponController {
    /// Create a controller with the first slot active
    pub fn new(slots: Vec<WeaponSlot>) -> Self {
        Self {
            slots,
            active: 0,
            next_fire_time: 0.0,
            policy: ReloadPolicy::default(),
            events: Vec::new(),
        }
    }

    /// Set the reload-on-switch policy
    pub fn with_policy(mut self, policy: ReloadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Get reload-on-switch policy
    pub fn policy(&self) -> ReloadPolicy {
        self.policy
    }

    /// Number of weapon slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if there are no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Index of the selected slot
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Get the selected slot
    pub fn active_slot(&self) -> Option<&WeaponSlot> {
        self.slots.get(self.active)
    }

    /// Get a slot by index
    pub fn slot(&self, index: usize) -> Option<&WeaponSlot> {
        self.slots.get(index)
    }

    /// Get all slots in selection order
    pub fn slots(&self) -> &[WeaponSlot] {
        &self.slots
    }

    /// Earliest time the next trigger request is accepted
    pub fn next_fire_time(&self) -> f32 {
        self.next_fire_time
    }

    /// Drain HUD events produced since the last call
    pub fn drain_events(&mut self) -> Vec<WeaponEvent> {
        std::mem::take(&mut self.events)
    }

    /// Complete every reload whose deadline has passed, active or not
    pub fn update(&mut self, now: f32) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(transferred) = slot.finish_reload_if_due(now) {
                log::debug!(
                    "{} reloaded {} rounds ({})",
                    slot.name(),
                    transferred,
                    slot.ammo_display()
                );
                self.events.push(WeaponEvent::ReloadFinished { index, transferred });
            }
        }
    }

    /// Handle a trigger request for the active weapon
    pub fn fire(
        &mut self,
        now: f32,
        trigger: TriggerInput,
        feedback: &mut dyn Feedback,
    ) -> FireOutcome {
        let index = self.active;
        let Some(slot) = self.slots.get_mut(index) else {
            return FireOutcome::Rejected(FireRejection::NoWeapon);
        };

        if slot.is_reloading() {
            return FireOutcome::Rejected(FireRejection::Reloading);
        }

        let wants_fire = if slot.stats.is_automatic {
            trigger.held || trigger.pressed
        } else {
            trigger.pressed
        };
        if !wants_fire {
            return FireOutcome::Rejected(FireRejection::NoTrigger);
        }

        if now < self.next_fire_time {
            return FireOutcome::Rejected(FireRejection::Cooldown);
        }
        self.next_fire_time = now + slot.stats.fire_interval();

        if slot.consume_round() {
            play_optional(feedback, slot.stats.sounds.shoot.as_deref(), None);
            feedback.camera_shake(slot.stats.recoil, RECOIL_SHAKE_DURATION);
            log::debug!("{} fired ({})", slot.name(), slot.ammo_display());
            return FireOutcome::Fired(Shot {
                weapon_index: index,
                damage: slot.stats.damage,
                range: slot.stats.range,
                recoil: slot.stats.recoil,
            });
        }

        play_optional(feedback, slot.stats.sounds.empty.as_deref(), None);
        let reload_started = slot.reserve_ammo > 0 && self.start_reload_at(index, now, feedback);
        FireOutcome::EmptyClick { reload_started }
    }

    /// Manually reload the active weapon
    pub fn reload(&mut self, now: f32, feedback: &mut dyn Feedback) -> bool {
        self.start_reload_at(self.active, now, feedback)
    }

    fn start_reload_at(&mut self, index: usize, now: f32, feedback: &mut dyn Feedback) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        if !slot.start_reload(now) {
            return false;
        }
        play_optional(feedback, slot.stats.sounds.reload.as_deref(), None);
        if let Some(until) = slot.reload_deadline() {
            log::debug!("{} reloading until {:.2}", slot.name(), until.at());
            self.events.push(WeaponEvent::ReloadStarted { index, until });
        }
        true
    }

    /// Cancel a pending reload on any slot
    pub fn cancel_reload(&mut self, index: usize) -> bool {
        let cancelled = self
            .slots
            .get_mut(index)
            .map_or(false, WeaponSlot::cancel_reload);
        if cancelled {
            self.events.push(WeaponEvent::ReloadCancelled { index });
        }
        cancelled
    }

    /// Switch to a slot. Rejected when out of bounds or already active.
    ///
    /// The fire cooldown carries over. The reload of the slot switched away
    /// from follows the controller's [`ReloadPolicy`].
    pub fn switch_to(&mut self, index: usize) -> bool {
        if index == self.active || index >= self.slots.len() {
            return false;
        }

        let from = self.active;
        if self.policy == ReloadPolicy::CancelOnSwitch {
            self.cancel_reload(from);
        }
        self.active = index;
        log::debug!("Switched weapon {} -> {}", from, index);
        self.events.push(WeaponEvent::Switched { from, to: index });
        true
    }

    /// Switch relative to the active slot, wrapping around
    pub fn cycle(&mut self, step: i32) -> bool {
        if self.slots.is_empty() {
            return false;
        }
        let len = self.slots.len() as i64;
        let target = (self.active as i64 + step as i64).rem_euclid(len) as usize;
        self.switch_to(target)
    }

    /// Add reserve ammo to a slot. Returns the rounds actually added,
    /// `None` for an out-of-range index.
    pub fn add_ammo(&mut self, index: usize, amount: u32) -> Option<u32> {
        self.slots.get_mut(index).map(|slot| slot.add_reserve(amount))
    }

    /// HUD ammo string for the active weapon
    pub fn ammo_display(&self) -> String {
        self.active_slot()
            .map(WeaponSlot::ammo_display)
            .unwrap_or_default()
    }
}
