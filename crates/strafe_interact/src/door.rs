//! Doors: lock rules, timed opening/closing and auto-close

use glam::Vec3;
use serde::{Deserialize, Serialize};
use strafe_core::feedback::play_optional;
use strafe_core::{Deadline, EntityId, Feedback};
use strafe_gamestate::GameProgress;

/// How a door is locked at level start
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorLock {
    /// Never locked
    #[default]
    Normal,
    /// Opens once the player holds this keycard color
    KeyCard(String),
    /// Opens only through a connected switch
    Switch,
    /// Opens when the kill count reaches the requirement
    EnemyCount(u32),
}

impl DoorLock {
    fn starts_locked(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// Door audio clips
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorSounds {
    pub open: Option<String>,
    pub close: Option<String>,
    pub locked: Option<String>,
}

/// Door settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorSettings {
    pub lock: DoorLock,
    /// Never closes once opened
    pub stay_open: bool,
    /// Seconds after an open request before the door closes itself
    pub close_delay: f32,
    /// Seconds an open or close motion takes
    pub open_duration: f32,
    pub sounds: DoorSounds,
}

impl Default for DoorSettings {
    fn default() -> Self {
        Self {
            lock: DoorLock::Normal,
            stay_open: false,
            close_delay: 2.0,
            open_duration: 0.5,
            sounds: DoorSounds::default(),
        }
    }
}

impl DoorSettings {
    /// Default timings with the given lock
    pub fn new(lock: DoorLock) -> Self {
        Self {
            lock,
            ..Default::default()
        }
    }

    /// Never close once opened
    pub fn stay_open(mut self) -> Self {
        self.stay_open = true;
        self
    }
}

/// Where the door is in its motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DoorMotion {
    Closed,
    Opening(Deadline),
    Open,
    Closing(Deadline),
}

/// Result of an interaction or unlock request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoorResponse {
    Opening,
    Closing,
    /// Still locked; the locked cue played
    Locked,
    /// Mid-motion or a stay-open door that is already open
    Ignored,
}

/// Motion completed during [`Door::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorEvent {
    Opened,
    Closed,
    /// Auto-close kicked in
    ClosingAutomatically,
}

/// A door in the level
#[derive(Debug, Clone, PartialEq)]
pub struct Door {
    id: EntityId,
    settings: DoorSettings,
    position: Vec3,
    locked: bool,
    motion: DoorMotion,
    auto_close: Option<Deadline>,
}

impl Door {
    /// Create a closed door; lockable kinds start locked
    pub fn new(id: EntityId, settings: DoorSettings, position: Vec3) -> Self {
        Self {
            id,
            locked: settings.lock.starts_locked(),
            settings,
            position,
            motion: DoorMotion::Closed,
            auto_close: None,
        }
    }

    /// Get door id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Get door settings
    pub fn settings(&self) -> &DoorSettings {
        &self.settings
    }

    /// Check if the door is still locked
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Check if the door is fully open
    pub fn is_open(&self) -> bool {
        self.motion == DoorMotion::Open
    }

    /// Check if an open or close motion is running
    pub fn is_moving(&self) -> bool {
        matches!(self.motion, DoorMotion::Opening(_) | DoorMotion::Closing(_))
    }

    /// Get current motion state
    pub fn motion(&self) -> DoorMotion {
        self.motion
    }

    /// How far open the door is, 0 (closed) to 1 (open)
    pub fn openness(&self, now: f32) -> f32 {
        let duration = self.settings.open_duration.max(f32::EPSILON);
        match self.motion {
            DoorMotion::Closed => 0.0,
            DoorMotion::Open => 1.0,
            DoorMotion::Opening(done) => 1.0 - (done.remaining(now) / duration).min(1.0),
            DoorMotion::Closing(done) => (done.remaining(now) / duration).min(1.0),
        }
    }

    /// Player pressed use on the door
    pub fn interact(
        &mut self,
        now: f32,
        progress: &GameProgress,
        feedback: &mut dyn Feedback,
    ) -> DoorResponse {
        if self.locked {
            let has_card = match &self.settings.lock {
                DoorLock::KeyCard(color) => progress.has_keycard(color),
                _ => false,
            };
            if !has_card {
                play_optional(feedback, self.settings.sounds.locked.as_deref(), Some(self.position));
                if let DoorLock::KeyCard(color) = &self.settings.lock {
                    log::info!("You need a {} keycard to open this door", color);
                }
                return DoorResponse::Locked;
            }
            self.unlock();
        }
        self.toggle(now, feedback)
    }

    /// Clear the lock without moving the door
    pub fn unlock(&mut self) {
        if self.locked {
            self.locked = false;
            log::debug!("Door {} unlocked", self.id);
        }
    }

    /// Connected switch fired. Only switch doors respond.
    pub fn unlock_with_switch(&mut self, now: f32, feedback: &mut dyn Feedback) -> DoorResponse {
        if self.settings.lock != DoorLock::Switch {
            return DoorResponse::Ignored;
        }
        self.unlock();
        self.toggle(now, feedback)
    }

    /// Kill count changed. Returns true when this call unlocked the door.
    pub fn check_enemy_requirement(
        &mut self,
        now: f32,
        kills: u32,
        feedback: &mut dyn Feedback,
    ) -> bool {
        let DoorLock::EnemyCount(required) = self.settings.lock else {
            return false;
        };
        if !self.locked || kills < required {
            return false;
        }
        self.unlock();
        self.toggle(now, feedback);
        true
    }

    /// Open if closed, close if open (unless stay-open). Ignored mid-motion.
    pub fn toggle(&mut self, now: f32, feedback: &mut dyn Feedback) -> DoorResponse {
        match self.motion {
            DoorMotion::Closed => {
                self.open(now, feedback);
                DoorResponse::Opening
            }
            DoorMotion::Open if !self.settings.stay_open => {
                self.close(now, feedback);
                DoorResponse::Closing
            }
            _ => DoorResponse::Ignored,
        }
    }

    fn open(&mut self, now: f32, feedback: &mut dyn Feedback) {
        play_optional(feedback, self.settings.sounds.open.as_deref(), Some(self.position));
        self.motion = DoorMotion::Opening(Deadline::after(now, self.settings.open_duration));
        self.auto_close = if self.settings.stay_open {
            None
        } else {
            Some(Deadline::after(now, self.settings.close_delay))
        };
    }

    fn close(&mut self, now: f32, feedback: &mut dyn Feedback) {
        play_optional(feedback, self.settings.sounds.close.as_deref(), Some(self.position));
        self.motion = DoorMotion::Closing(Deadline::after(now, self.settings.open_duration));
        self.auto_close = None;
    }

    /// Finish motions and fire auto-close. A due auto-close waits for any
    /// motion in progress to finish.
    pub fn update(&mut self, now: f32, feedback: &mut dyn Feedback) -> Option<DoorEvent> {
        match self.motion {
            DoorMotion::Opening(done) if done.is_due(now) => {
                self.motion = DoorMotion::Open;
                return Some(DoorEvent::Opened);
            }
            DoorMotion::Closing(done) if done.is_due(now) => {
                self.motion = DoorMotion::Closed;
                return Some(DoorEvent::Closed);
            }
            _ => {}
        }

        let auto_close_due = self.auto_close.map_or(false, |at| at.is_due(now));
        if auto_close_due && self.motion == DoorMotion::Open {
            self.close(now, feedback);
            return Some(DoorEvent::ClosingAutomatically);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strafe_core::RecordingFeedback;

    fn door(settings: DoorSettings) -> Door {
        Door::new(EntityId::new(1, 0), settings, Vec3::ZERO)
    }

    #[test]
    fn test_normal_door_cycle() {
        let mut door = door(DoorSettings::default());
        let progress = GameProgress::new();
        let mut fb = RecordingFeedback::new();

        assert_eq!(door.interact(0.0, &progress, &mut fb), DoorResponse::Opening);
        assert_eq!(door.interact(0.1, &progress, &mut fb), DoorResponse::Ignored);
        assert_eq!(door.update(0.5, &mut fb), Some(DoorEvent::Opened));
        assert!(door.is_open());

        assert_eq!(door.update(1.0, &mut fb), None);
        assert_eq!(door.update(2.0, &mut fb), Some(DoorEvent::ClosingAutomatically));
        assert_eq!(door.update(2.5, &mut fb), Some(DoorEvent::Closed));
        assert!(!door.is_open());
    }

    #[test]
    fn test_manual_close_cancels_auto_close() {
        let mut door = door(DoorSettings::default());
        let progress = GameProgress::new();
        let mut fb = RecordingFeedback::new();

        door.interact(0.0, &progress, &mut fb);
        door.update(0.5, &mut fb);
        assert_eq!(door.interact(1.0, &progress, &mut fb), DoorResponse::Closing);
        door.update(1.5, &mut fb);
        assert_eq!(door.update(2.5, &mut fb), None);
        assert_eq!(door.motion(), DoorMotion::Closed);
    }

    #[test]
    fn test_stay_open() {
        let mut door = door(DoorSettings::default().stay_open());
        let progress = GameProgress::new();
        let mut fb = RecordingFeedback::new();

        door.interact(0.0, &progress, &mut fb);
        door.update(1.0, &mut fb);
        assert_eq!(door.interact(2.0, &progress, &mut fb), DoorResponse::Ignored);
        assert_eq!(door.update(10.0, &mut fb), None);
        assert!(door.is_open());
    }

    #[test]
    fn test_keycard_door() {
        let mut settings = DoorSettings::new(DoorLock::KeyCard("red".into()));
        settings.sounds.locked = Some("door_locked".into());
        let mut door = door(settings);
        let mut progress = GameProgress::new();
        let mut fb = RecordingFeedback::new();

        assert_eq!(door.interact(0.0, &progress, &mut fb), DoorResponse::Locked);
        assert!(fb.played("door_locked"));
        assert!(door.is_locked());

        progress.set_keycard("red");
        assert_eq!(door.interact(1.0, &progress, &mut fb), DoorResponse::Opening);
        assert!(!door.is_locked());
    }

    #[test]
    fn test_switch_door() {
        let mut switch_door = door(DoorSettings::new(DoorLock::Switch));
        let mut plain = door(DoorSettings::default());
        let progress = GameProgress::new();
        let mut fb = RecordingFeedback::new();

        assert_eq!(switch_door.interact(0.0, &progress, &mut fb), DoorResponse::Locked);
        assert_eq!(switch_door.unlock_with_switch(0.0, &mut fb), DoorResponse::Opening);
        assert_eq!(plain.unlock_with_switch(0.0, &mut fb), DoorResponse::Ignored);
        assert_eq!(plain.motion(), DoorMotion::Closed);
    }

    #[test]
    fn test_enemy_count_door() {
        let mut door = door(DoorSettings::new(DoorLock::EnemyCount(3)));
        let mut fb = RecordingFeedback::new();

        assert!(!door.check_enemy_requirement(0.0, 2, &mut fb));
        assert!(door.is_locked());
        assert!(door.check_enemy_requirement(1.0, 3, &mut fb));
        assert!(!door.is_locked());
        assert!(door.is_moving());

        door.update(1.5, &mut fb);
        assert!(!door.check_enemy_requirement(1.6, 4, &mut fb));
        assert!(door.is_open());
    }

    #[test]
    fn test_openness() {
        let mut door = door(DoorSettings::default());
        let mut fb = RecordingFeedback::new();
        assert_eq!(door.openness(0.0), 0.0);

        door.toggle(0.0, &mut fb);
        assert!((door.openness(0.25) - 0.5).abs() < 1e-5);
        door.update(0.5, &mut fb);
        assert_eq!(door.openness(0.5), 1.0);
    }
}
