/// Generic state-machine plumbing shared by the enemy base and the cannon.
///
/// A [`Manager`] owns exactly one current state and a cached copy of its
/// body. States never hold a reference back to their manager: a machine
/// answers transition requests through its [`Machine::transition_to`] table,
/// which either rejects the request or hands back the freshly constructed
/// next state, and the manager installs it. The replaced state is dropped
/// unless the machine keeps it through [`Machine::retire`].
use std::fmt::Debug;

use tracing::{debug, trace};

use crate::body::{Body, Rect};

/// One state of a machine: knows its own number and owns its body.
pub trait State {
    type Number: Copy + Eq + Debug;

    fn number(&self) -> Self::Number;

    fn body(&self) -> &Body;
}

/// Answer of a transition table.
#[derive(Debug)]
pub enum Transition<S> {
    Rejected,
    Accepted(S),
}

// ── Manager ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Manager<S: State> {
    current: Option<S>,
    body: Option<Body>,
}

impl<S: State> Default for Manager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> Manager<S> {
    /// A manager with no state yet. It ignores updates until the first
    /// [`Manager::change_state`].
    pub fn new() -> Self {
        Manager {
            current: None,
            body: None,
        }
    }

    pub fn with_state(state: S) -> Self {
        let mut manager = Self::new();
        manager.change_state(state);
        manager
    }

    /// Unconditionally installs `state` and returns the one it replaced.
    pub fn change_state(&mut self, state: S) -> Option<S> {
        let previous = self.current.replace(state);
        self.refresh();
        previous
    }

    /// Runs `step` on the current state, then refreshes the cached body.
    /// Returns whatever transition the state asked for.
    pub fn update_with<F>(&mut self, step: F) -> Option<S::Number>
    where
        F: FnOnce(&mut S) -> Option<S::Number>,
    {
        let request = step(self.current.as_mut()?);
        self.refresh();
        request
    }

    pub fn state(&self) -> Option<&S> {
        self.current.as_ref()
    }

    pub fn state_number(&self) -> Option<S::Number> {
        self.current.as_ref().map(State::number)
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Body of the current state as of the last refresh.
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn rect(&self) -> Option<Rect> {
        self.body.as_ref().map(Body::rect)
    }

    /// Re-reads the drawable attributes from the current state.
    pub fn refresh(&mut self) {
        self.body = self.current.as_ref().map(|s| s.body().clone());
    }
}

// ── Machine ───────────────────────────────────────────────────────────────────

/// A concrete machine: a manager plus the table of allowed edges.
pub trait Machine {
    type State: State;

    /// Name used in log lines.
    const NAME: &'static str;

    fn manager(&self) -> &Manager<Self::State>;

    fn manager_mut(&mut self) -> &mut Manager<Self::State>;

    /// The transition whitelist of `from`. Accepting means building the
    /// next state, so everything it needs must be reachable from `self`.
    fn transition_to(
        &self,
        from: &Self::State,
        target: <Self::State as State>::Number,
    ) -> Transition<Self::State>;

    /// Called with the state that was just replaced.
    fn retire(&mut self, _previous: Self::State) {}

    /// Asks the current state to move to `target`. Returns `false`, leaving
    /// the machine untouched, when the edge is not whitelisted or the
    /// machine has no state.
    fn start_transition(&mut self, target: <Self::State as State>::Number) -> bool {
        let next = match self.manager().state() {
            Some(current) => self.transition_to(current, target),
            None => return false,
        };

        match next {
            Transition::Accepted(state) => {
                debug!(
                    machine = Self::NAME,
                    from = ?self.manager().state_number(),
                    to = ?target,
                    "state transition"
                );
                if let Some(previous) = self.manager_mut().change_state(state) {
                    self.retire(previous);
                }
                true
            }
            Transition::Rejected => {
                trace!(
                    machine = Self::NAME,
                    from = ?self.manager().state_number(),
                    to = ?target,
                    "transition refused"
                );
                false
            }
        }
    }

    fn state_number(&self) -> Option<<Self::State as State>::Number> {
        self.manager().state_number()
    }

    fn body(&self) -> Option<&Body> {
        self.manager().body()
    }
}
