//! Navigation contract and a straight-line navigator
//!
//! Enemies only ask for "move toward this point" and "stop". Real hosts
//! back [`Navigator`] with their navmesh; [`DirectNavigator`] moves agents
//! in a straight line and is used by the headless runtime and tests.

use glam::Vec3;
use std::collections::HashMap;
use strafe_core::EntityId;

/// Path request interface the host implements
pub trait Navigator {
    /// Start (or retarget) movement of `entity` toward `target`
    fn move_to(&mut self, entity: EntityId, target: Vec3);

    /// Halt `entity` where it stands
    fn stop(&mut self, entity: EntityId);
}

/// Navigator that ignores every request
#[derive(Debug, Clone, Default)]
pub struct NullNavigator;

impl Navigator for NullNavigator {
    fn move_to(&mut self, _entity: EntityId, _target: Vec3) {}
    fn stop(&mut self, _entity: EntityId) {}
}

/// Movement state of one agent
#[derive(Debug, Clone, PartialEq)]
pub struct NavAgent {
    /// Current position
    pub position: Vec3,
    /// Where the agent is heading
    pub destination: Option<Vec3>,
    /// Movement speed
    pub speed: f32,
    /// Arrival threshold
    pub arrival_threshold: f32,
}

impl NavAgent {
    /// Create a new navigation agent
    pub fn new(position: Vec3, speed: f32) -> Self {
        Self {
            position,
            destination: None,
            speed,
            arrival_threshold: 0.1,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.destination.is_some()
    }

    /// Advance toward the destination, stopping on arrival
    pub fn update(&mut self, delta_time: f32) {
        let Some(destination) = self.destination else {
            return;
        };

        let to_target = destination - self.position;
        let distance = to_target.length();
        if distance <= self.arrival_threshold {
            self.destination = None;
            return;
        }

        let step = self.speed * delta_time;
        if step >= distance {
            self.position = destination;
            self.destination = None;
        } else {
            self.position += to_target / distance * step;
        }
    }
}

/// Straight-line mover keyed by entity
#[derive(Debug, Clone, Default)]
pub struct DirectNavigator {
    agents: HashMap<EntityId, NavAgent>,
}

impl DirectNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent at a position
    pub fn add_agent(&mut self, entity: EntityId, position: Vec3, speed: f32) {
        self.agents.insert(entity, NavAgent::new(position, speed));
    }

    pub fn remove_agent(&mut self, entity: EntityId) -> Option<NavAgent> {
        self.agents.remove(&entity)
    }

    pub fn agent(&self, entity: EntityId) -> Option<&NavAgent> {
        self.agents.get(&entity)
    }

    /// Current position of an agent
    pub fn position(&self, entity: EntityId) -> Option<Vec3> {
        self.agents.get(&entity).map(|a| a.position)
    }

    /// Move every agent one step
    pub fn step(&mut self, delta_time: f32) {
        for agent in self.agents.values_mut() {
            agent.update(delta_time);
        }
    }
}

impl Navigator for DirectNavigator {
    fn move_to(&mut self, entity: EntityId, target: Vec3) {
        match self.agents.get_mut(&entity) {
            Some(agent) => agent.destination = Some(target),
            None => log::debug!("move_to for unknown nav agent {}", entity),
        }
    }

    fn stop(&mut self, entity: EntityId) {
        if let Some(agent) = self.agents.get_mut(&entity) {
            agent.destination = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_agent_moves_at_speed() {
        let mut agent = NavAgent::new(Vec3::ZERO, 2.0);
        agent.destination = Some(Vec3::new(10.0, 0.0, 0.0));

        agent.update(1.0);
        assert_relative_eq!(agent.position.x, 2.0);
        assert!(agent.is_moving());
    }

    #[test]
    fn test_agent_arrives_without_overshoot() {
        let mut agent = NavAgent::new(Vec3::ZERO, 5.0);
        agent.destination = Some(Vec3::new(0.0, 0.0, 3.0));

        agent.update(1.0);
        assert_eq!(agent.position, Vec3::new(0.0, 0.0, 3.0));
        assert!(!agent.is_moving());
    }

    #[test]
    fn test_direct_navigator() {
        let enemy = EntityId::new(4, 0);
        let mut nav = DirectNavigator::new();
        nav.add_agent(enemy, Vec3::ZERO, 1.0);

        nav.move_to(enemy, Vec3::new(0.0, 0.0, 10.0));
        nav.step(0.5);
        assert_relative_eq!(nav.position(enemy).unwrap().z, 0.5);

        nav.stop(enemy);
        nav.step(0.5);
        assert_relative_eq!(nav.position(enemy).unwrap().z, 0.5);

        assert!(nav.remove_agent(enemy).is_some());
        assert_eq!(nav.position(enemy), None);
    }
}
