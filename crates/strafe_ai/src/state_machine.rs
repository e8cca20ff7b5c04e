//! Priority-ordered finite state machine used by enemy brains

use std::collections::HashMap;
use std::hash::Hash;

/// Marker for FSM state types
pub trait State: Clone + Eq + Hash {
    /// No rule may leave a terminal state, and neither may a forced jump
    fn is_terminal(&self) -> bool {
        false
    }
}

/// Guard evaluated against the per-update context
pub type Guard<C> = Box<dyn Fn(&C) -> bool + Send + Sync>;

/// One edge: jump to `to` when `guard` holds
pub struct Transition<S, C> {
    pub to: S,
    pub guard: Guard<C>,
    /// Higher rules are tried first
    pub priority: i32,
}

impl<S, C> Transition<S, C> {
    pub fn new<F>(to: S, guard: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Self {
            to,
            guard: Box::new(guard),
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn holds(&self, context: &C) -> bool {
        (self.guard)(context)
    }
}

/// A transition that happened during [`StateMachine::update`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange<S> {
    pub from: S,
    pub to: S,
}

// Descending priority, ties in insertion order
fn insert_by_priority<S, C>(rules: &mut Vec<Transition<S, C>>, rule: Transition<S, C>) {
    let at = rules
        .iter()
        .position(|r| r.priority < rule.priority)
        .unwrap_or(rules.len());
    rules.insert(at, rule);
}

/// Finite state machine
///
/// At most one transition fires per update. Rules registered with
/// [`add_global_transition`](Self::add_global_transition) apply from every
/// state and are tried before the current state's own rules.
pub struct StateMachine<S, C>
where
    S: State,
{
    current: S,
    previous: Option<S>,
    rules: HashMap<S, Vec<Transition<S, C>>>,
    any_state: Vec<Transition<S, C>>,
}

impl<S, C> StateMachine<S, C>
where
    S: State,
{
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            previous: None,
            rules: HashMap::new(),
            any_state: Vec::new(),
        }
    }

    pub fn add_transition<F>(&mut self, from: S, to: S, guard: F)
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.add_transition_priority(from, to, guard, 0);
    }

    pub fn add_transition_priority<F>(&mut self, from: S, to: S, guard: F, priority: i32)
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        let rules = self.rules.entry(from).or_default();
        insert_by_priority(rules, Transition::new(to, guard).with_priority(priority));
    }

    /// Rule that may fire from any state except its own target
    pub fn add_global_transition<F>(&mut self, to: S, guard: F, priority: i32)
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        insert_by_priority(
            &mut self.any_state,
            Transition::new(to, guard).with_priority(priority),
        );
    }

    pub fn current(&self) -> &S {
        &self.current
    }

    pub fn previous(&self) -> Option<&S> {
        self.previous.as_ref()
    }

    /// Jump straight to `to`. No-op from a terminal state or onto itself.
    pub fn force_transition(&mut self, to: S) -> Option<StateChange<S>> {
        if self.current.is_terminal() || self.current == to {
            return None;
        }
        let from = std::mem::replace(&mut self.current, to.clone());
        self.previous = Some(from.clone());
        Some(StateChange { from, to })
    }

    /// Evaluate rules against `context`, firing at most one
    pub fn update(&mut self, context: &C) -> Option<StateChange<S>> {
        if self.current.is_terminal() {
            return None;
        }

        let target = self
            .any_state
            .iter()
            .find(|r| r.to != self.current && r.holds(context))
            .or_else(|| {
                self.rules
                    .get(&self.current)
                    .and_then(|rules| rules.iter().find(|r| r.holds(context)))
            })
            .map(|r| r.to.clone())?;

        self.force_transition(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Post {
        Patrol,
        Chase,
        Strike,
        Down,
    }

    impl State for Post {
        fn is_terminal(&self) -> bool {
            *self == Post::Down
        }
    }

    struct Sight {
        distance: f32,
        alive: bool,
    }

    fn at(distance: f32) -> Sight {
        Sight { distance, alive: true }
    }

    fn sentry() -> StateMachine<Post, Sight> {
        let mut fsm = StateMachine::new(Post::Patrol);
        fsm.add_global_transition(Post::Down, |s: &Sight| !s.alive, i32::MAX);
        fsm.add_transition(Post::Patrol, Post::Chase, |s| s.distance <= 10.0);
        fsm.add_transition(Post::Chase, Post::Strike, |s| s.distance <= 2.0);
        fsm.add_transition_priority(Post::Chase, Post::Patrol, |s| s.distance > 10.0, 1);
        fsm.add_transition(Post::Strike, Post::Chase, |s| s.distance > 2.0);
        fsm
    }

    #[test]
    fn test_one_step_per_update() {
        let mut fsm = sentry();
        assert_eq!(fsm.update(&at(20.0)), None);

        // Already within reach, but only one rule fires
        assert_eq!(
            fsm.update(&at(1.0)),
            Some(StateChange { from: Post::Patrol, to: Post::Chase })
        );
        fsm.update(&at(1.0));
        assert_eq!(*fsm.current(), Post::Strike);
        assert_eq!(fsm.previous(), Some(&Post::Chase));
    }

    #[test]
    fn test_priority_wins_over_insertion_order() {
        let mut fsm = StateMachine::new(Post::Chase);
        fsm.add_transition(Post::Chase, Post::Strike, |s: &Sight| s.distance < 50.0);
        fsm.add_transition_priority(Post::Chase, Post::Patrol, |s| s.distance > 10.0, 3);

        fsm.update(&at(30.0));
        assert_eq!(*fsm.current(), Post::Patrol);
    }

    #[test]
    fn test_global_rule_reaches_terminal_state() {
        let mut fsm = sentry();
        fsm.update(&at(5.0));
        fsm.update(&Sight { distance: 5.0, alive: false });
        assert_eq!(*fsm.current(), Post::Down);

        assert_eq!(fsm.update(&at(5.0)), None);
        assert_eq!(fsm.force_transition(Post::Patrol), None);
    }

    #[test]
    fn test_force_transition_skips_self() {
        let mut fsm = sentry();
        assert!(fsm.force_transition(Post::Strike).is_some());
        assert_eq!(fsm.force_transition(Post::Strike), None);
        assert_eq!(fsm.previous(), Some(&Post::Patrol));
    }
}
