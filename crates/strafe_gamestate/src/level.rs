//! Level flow: completion, game over, pause and scene transitions

use crate::progress::GameProgress;
use serde::{Deserialize, Serialize};
use strafe_core::Deadline;

/// Scene transition interface the host implements
pub trait SceneLoader {
    /// Load a scene by name
    fn load_level(&mut self, name: &str);

    /// Reload the current scene
    fn restart_level(&mut self);
}

/// A scheduled scene change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelTransition {
    /// Advance to the named level
    Next(String),
    /// Show the named game-over scene
    GameOver(String),
    /// Reload the current level
    Restart,
}

/// Where the level is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelStatus {
    #[default]
    Playing,
    Paused,
    Complete,
    GameOver,
}

impl LevelStatus {
    /// Whether gameplay ticks should run
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Playing | Self::Complete)
    }

    /// Whether the level has ended one way or the other
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Complete | Self::GameOver)
    }
}

/// Level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    pub name: String,
    /// Level loaded after completion, none to stay
    pub next_level: Option<String>,
    /// Scene shown after death, none to restart
    pub game_over_scene: Option<String>,
    pub level_complete_delay: f32,
    pub game_over_delay: f32,
    /// Secrets placed in the level (for the summary)
    pub secrets_total: u32,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            name: "E1M1".to_string(),
            next_level: None,
            game_over_scene: None,
            level_complete_delay: 2.0,
            game_over_delay: 2.0,
            secrets_total: 3,
        }
    }
}

impl LevelSettings {
    /// Default delays for a named level
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the level loaded after completion
    pub fn with_next_level(mut self, name: impl Into<String>) -> Self {
        self.next_level = Some(name.into());
        self
    }

    /// Set the scene shown after death
    pub fn with_game_over_scene(mut self, name: impl Into<String>) -> Self {
        self.game_over_scene = Some(name.into());
        self
    }
}

/// Drives the end of a level. Each level fires at most one transition.
#[derive(Debug, Clone)]
pub struct LevelFlow {
    settings: LevelSettings,
    status: LevelStatus,
    pending: Option<(Deadline, LevelTransition)>,
    fired: Option<LevelTransition>,
}

impl LevelFlow {
    /// Create a flow in the playing state
    pub fn new(settings: LevelSettings) -> Self {
        Self {
            settings,
            status: LevelStatus::Playing,
            pending: None,
            fired: None,
        }
    }

    /// Get level settings
    pub fn settings(&self) -> &LevelSettings {
        &self.settings
    }

    /// Get current status
    pub fn status(&self) -> LevelStatus {
        self.status
    }

    /// Check if paused
    pub fn is_paused(&self) -> bool {
        self.status == LevelStatus::Paused
    }

    /// The scheduled transition, if any
    pub fn pending(&self) -> Option<&(Deadline, LevelTransition)> {
        self.pending.as_ref()
    }

    /// The transition already handed to the scene loader
    pub fn fired(&self) -> Option<&LevelTransition> {
        self.fired.as_ref()
    }

    /// Toggle pause. Returns the new paused state, `None` once the level ended.
    pub fn toggle_pause(&mut self) -> Option<bool> {
        self.status = match self.status {
            LevelStatus::Playing => LevelStatus::Paused,
            LevelStatus::Paused => LevelStatus::Playing,
            LevelStatus::Complete | LevelStatus::GameOver => return None,
        };
        Some(self.is_paused())
    }

    /// Player reached the exit. Returns true on the first call only.
    pub fn complete_level(&mut self, now: f32, progress: &mut GameProgress) -> bool {
        if self.status.is_finished() || !progress.complete_level() {
            return false;
        }
        self.status = LevelStatus::Complete;

        if let Some(next) = self.settings.next_level.clone() {
            let at = Deadline::after(now, self.settings.level_complete_delay);
            log::info!("Loading {} at {:.2}", next, at.at());
            self.pending = Some((at, LevelTransition::Next(next)));
        }
        true
    }

    /// Player died. Returns true on the first call only.
    pub fn player_died(&mut self, now: f32) -> bool {
        if self.status.is_finished() {
            return false;
        }
        self.status = LevelStatus::GameOver;

        let transition = match &self.settings.game_over_scene {
            Some(scene) => LevelTransition::GameOver(scene.clone()),
            None => LevelTransition::Restart,
        };
        log::info!("Game over, {:?} scheduled", transition);
        self.pending = Some((Deadline::after(now, self.settings.game_over_delay), transition));
        true
    }

    /// Hand a due transition to the scene loader, exactly once
    pub fn update(&mut self, now: f32, loader: &mut dyn SceneLoader) -> Option<LevelTransition> {
        let due = self.pending.as_ref().map_or(false, |(at, _)| at.is_due(now));
        if !due {
            return None;
        }
        let (_, transition) = self.pending.take()?;

        match &transition {
            LevelTransition::Next(name) | LevelTransition::GameOver(name) => loader.load_level(name),
            LevelTransition::Restart => loader.restart_level(),
        }
        self.fired = Some(transition.clone());
        Some(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingLoader {
        loaded: Vec<String>,
        restarts: u32,
    }

    impl SceneLoader for RecordingLoader {
        fn load_level(&mut self, name: &str) {
            self.loaded.push(name.to_string());
        }

        fn restart_level(&mut self) {
            self.restarts += 1;
        }
    }

    #[test]
    fn test_level_complete_transition_fires_once() {
        let mut flow = LevelFlow::new(LevelSettings::new("E1M1").with_next_level("E1M2"));
        let mut progress = GameProgress::new();
        let mut loader = RecordingLoader::default();

        assert!(flow.complete_level(10.0, &mut progress));
        assert!(!flow.complete_level(10.5, &mut progress));
        assert_eq!(flow.status(), LevelStatus::Complete);

        assert_eq!(flow.update(11.0, &mut loader), None);
        assert_eq!(
            flow.update(12.0, &mut loader),
            Some(LevelTransition::Next("E1M2".to_string()))
        );
        assert_eq!(flow.update(13.0, &mut loader), None);
        assert_eq!(loader.loaded, vec!["E1M2".to_string()]);
    }

    #[test]
    fn test_complete_without_next_level() {
        let mut flow = LevelFlow::new(LevelSettings::new("finale"));
        let mut progress = GameProgress::new();
        let mut loader = RecordingLoader::default();

        assert!(flow.complete_level(0.0, &mut progress));
        assert!(flow.pending().is_none());
        assert_eq!(flow.update(10.0, &mut loader), None);
    }

    #[test]
    fn test_game_over_restarts_without_scene() {
        let mut flow = LevelFlow::new(LevelSettings::default());
        let mut loader = RecordingLoader::default();

        assert!(flow.player_died(5.0));
        assert!(!flow.player_died(5.1));
        flow.update(7.0, &mut loader);
        assert_eq!(loader.restarts, 1);
        assert_eq!(flow.fired(), Some(&LevelTransition::Restart));
    }

    #[test]
    fn test_game_over_scene() {
        let mut flow = LevelFlow::new(LevelSettings::default().with_game_over_scene("GameOver"));
        let mut progress = GameProgress::new();
        let mut loader = RecordingLoader::default();

        flow.player_died(1.0);
        assert!(!flow.complete_level(1.5, &mut progress));
        assert!(!progress.is_level_complete());

        flow.update(3.0, &mut loader);
        assert_eq!(loader.loaded, vec!["GameOver".to_string()]);
    }

    #[test]
    fn test_pause_toggle() {
        let mut flow = LevelFlow::new(LevelSettings::default());
        let mut progress = GameProgress::new();

        assert_eq!(flow.toggle_pause(), Some(true));
        assert!(!flow.status().is_running());
        assert_eq!(flow.toggle_pause(), Some(false));

        flow.complete_level(0.0, &mut progress);
        assert_eq!(flow.toggle_pause(), None);
    }
}
