//! Per-level progress: kills, secrets, keycards and the level timer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Format seconds as `MM:SS`
pub fn format_time(seconds: f32) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Level progress shared by every gameplay component of one level
///
/// Reset, not recreated, between levels. Completion is one-way and freezes
/// the timer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameProgress {
    enemies_killed: u32,
    secrets_found: u32,
    level_time: f32,
    level_complete: bool,
    /// Keycard color -> possessed
    keycards: BTreeMap<String, bool>,
}

impl GameProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a kill. Returns the new total.
    pub fn record_kill(&mut self) -> u32 {
        self.enemies_killed += 1;
        self.enemies_killed
    }

    /// Count a secret. Returns the new total.
    pub fn record_secret(&mut self) -> u32 {
        self.secrets_found += 1;
        log::info!("Secret found! Total: {}", self.secrets_found);
        self.secrets_found
    }

    /// Give the player a keycard. Returns true if it was not held before.
    pub fn set_keycard(&mut self, color: impl Into<String>) -> bool {
        let color = color.into();
        let newly = !self.has_keycard(&color);
        if newly {
            log::info!("{} keycard found", color);
        }
        self.keycards.insert(color, true);
        newly
    }

    pub fn has_keycard(&self, color: &str) -> bool {
        self.keycards.get(color).copied().unwrap_or(false)
    }

    /// Held keycard colors, sorted
    pub fn keycards(&self) -> impl Iterator<Item = &str> {
        self.keycards
            .iter()
            .filter(|(_, held)| **held)
            .map(|(color, _)| color.as_str())
    }

    /// Mark the level complete. Returns false if it already was.
    pub fn complete_level(&mut self) -> bool {
        if self.level_complete {
            return false;
        }
        self.level_complete = true;
        log::info!("Level complete in {}", format_time(self.level_time));
        true
    }

    /// Clear everything for a fresh level
    pub fn reset_for_level(&mut self) {
        *self = Self::default();
    }

    /// Advance the level timer unless the level is complete
    pub fn tick(&mut self, delta_time: f32) {
        if !self.level_complete && delta_time.is_finite() && delta_time > 0.0 {
            self.level_time += delta_time;
        }
    }

    pub fn enemies_killed(&self) -> u32 {
        self.enemies_killed
    }

    pub fn secrets_found(&self) -> u32 {
        self.secrets_found
    }

    pub fn level_time(&self) -> f32 {
        self.level_time
    }

    pub fn is_level_complete(&self) -> bool {
        self.level_complete
    }

    /// End-of-level statistics
    pub fn summary(&self, secrets_total: u32) -> LevelSummary {
        LevelSummary {
            level_time: self.level_time,
            enemies_killed: self.enemies_killed,
            secrets_found: self.secrets_found,
            secrets_total,
            keycards: self.keycards().map(str::to_string).collect(),
        }
    }
}

/// Statistics shown on the level-complete screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub level_time: f32,
    pub enemies_killed: u32,
    pub secrets_found: u32,
    pub secrets_total: u32,
    pub keycards: Vec<String>,
}

impl fmt::Display for LevelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Time: {}", format_time(self.level_time))?;
        writeln!(f, "Enemies Killed: {}", self.enemies_killed)?;
        write!(f, "Secrets Found: {}/{}", self.secrets_found, self.secrets_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut progress = GameProgress::new();
        assert_eq!(progress.record_kill(), 1);
        assert_eq!(progress.record_kill(), 2);
        assert_eq!(progress.record_secret(), 1);
        assert_eq!(progress.enemies_killed(), 2);
        assert_eq!(progress.secrets_found(), 1);
    }

    #[test]
    fn test_keycards() {
        let mut progress = GameProgress::new();
        assert!(!progress.has_keycard("red"));

        assert!(progress.set_keycard("red"));
        assert!(!progress.set_keycard("red"));
        progress.set_keycard("blue");

        assert!(progress.has_keycard("red"));
        assert!(!progress.has_keycard("yellow"));
        assert_eq!(progress.keycards().collect::<Vec<_>>(), vec!["blue", "red"]);
    }

    #[test]
    fn test_complete_level_is_one_way() {
        let mut progress = GameProgress::new();
        progress.tick(10.0);

        assert!(progress.complete_level());
        assert!(!progress.complete_level());
        assert!(progress.is_level_complete());

        progress.tick(5.0);
        assert_eq!(progress.level_time(), 10.0);
    }

    #[test]
    fn test_reset_for_level() {
        let mut progress = GameProgress::new();
        progress.record_kill();
        progress.set_keycard("red");
        progress.tick(3.0);
        progress.complete_level();

        progress.reset_for_level();
        assert_eq!(progress, GameProgress::default());
        progress.tick(1.0);
        assert_eq!(progress.level_time(), 1.0);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(59.9), "00:59");
        assert_eq!(format_time(125.0), "02:05");
        assert_eq!(format_time(-3.0), "00:00");
    }

    #[test]
    fn test_summary() {
        let mut progress = GameProgress::new();
        progress.tick(75.0);
        progress.record_kill();
        progress.record_secret();
        progress.set_keycard("yellow");

        let summary = progress.summary(3);
        assert_eq!(summary.keycards, vec!["yellow".to_string()]);
        assert_eq!(
            summary.to_string(),
            "Time: 01:15\nEnemies Killed: 1\nSecrets Found: 1/3"
        );
    }
}
