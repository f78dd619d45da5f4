use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Up,
    Down,
}

/// An edge between two consecutive observations of the same target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WentUp,
    WentDown,
}

impl Transition {
    /// Subject prefix used in notifications.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Transition::WentUp => "UP",
            Transition::WentDown => "DOWN",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Last known status of every configured target.
///
/// The set of targets is fixed at construction. Every target starts `Up`, so
/// a target that fails its very first check produces exactly one `WentDown`.
#[derive(Debug)]
pub struct StateTracker {
    states: HashMap<String, Status>,
}

impl StateTracker {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            states: targets
                .into_iter()
                .map(|target| (target.into(), Status::Up))
                .collect(),
        }
    }

    #[must_use]
    pub fn status(&self, url: &str) -> Option<Status> {
        self.states.get(url).copied()
    }

    /// Records a probe outcome and returns the edge it crossed, if any.
    ///
    /// The stored status is updated before the caller gets to notify, so a
    /// failed notification never causes the same edge to fire twice.
    pub fn observe(&mut self, url: &str, is_up: bool) -> Option<Transition> {
        let state = self.states.get_mut(url)?;
        let (next, transition) = match (*state, is_up) {
            (Status::Up, false) => (Status::Down, Some(Transition::WentDown)),
            (Status::Down, true) => (Status::Up, Some(Transition::WentUp)),
            (current, _) => (current, None),
        };
        *state = next;
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_start_up() {
        let tracker = StateTracker::new(["http://a", "http://b"]);
        assert_eq!(tracker.status("http://a"), Some(Status::Up));
        assert_eq!(tracker.status("http://b"), Some(Status::Up));
    }

    #[test]
    fn test_success_while_up_is_silent() {
        let mut tracker = StateTracker::new(["http://a"]);
        assert_eq!(tracker.observe("http://a", true), None);
        assert_eq!(tracker.status("http://a"), Some(Status::Up));
    }

    #[test]
    fn test_failure_while_up_goes_down_once() {
        let mut tracker = StateTracker::new(["http://a"]);
        assert_eq!(tracker.observe("http://a", false), Some(Transition::WentDown));
        assert_eq!(tracker.status("http://a"), Some(Status::Down));

        for _ in 0..5 {
            assert_eq!(tracker.observe("http://a", false), None);
        }
        assert_eq!(tracker.status("http://a"), Some(Status::Down));
    }

    #[test]
    fn test_success_while_down_goes_up() {
        let mut tracker = StateTracker::new(["http://a"]);
        tracker.observe("http://a", false);
        assert_eq!(tracker.observe("http://a", true), Some(Transition::WentUp));
        assert_eq!(tracker.status("http://a"), Some(Status::Up));
    }

    #[test]
    fn test_unknown_target_is_ignored() {
        let mut tracker = StateTracker::new(["http://a"]);
        assert_eq!(tracker.observe("http://other", false), None);
        assert_eq!(tracker.status("http://other"), None);
        assert_eq!(tracker.status("http://a"), Some(Status::Up));
    }

    #[test]
    fn test_duplicate_targets_share_one_state() {
        let mut tracker = StateTracker::new(["http://a", "http://a"]);
        assert_eq!(tracker.observe("http://a", false), Some(Transition::WentDown));
        assert_eq!(tracker.observe("http://a", false), None);
    }

    #[test]
    fn test_transition_labels() {
        assert_eq!(Transition::WentUp.to_string(), "UP");
        assert_eq!(Transition::WentDown.to_string(), "DOWN");
    }
}
