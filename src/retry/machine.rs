//! Retry state machine.

use crate::error::GenerationError;

/// State of one `(prompt, mode)` retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Pending,
    Attempting,
    Retrying,
    Succeeded,
    Exhausted,
}

impl AttemptState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Succeeded | AttemptState::Exhausted)
    }
}

/// Result of feeding one attempt outcome into the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Valid artifact; terminal.
    Succeeded(String),
    /// Failed attempt with budget left; `retries` is the count after increment.
    Retrying { retries: u32, reason: String },
    /// Failed attempt with no budget left; terminal.
    Exhausted { reason: String },
}

/// Bounded retry state machine.
///
/// `retries` starts at zero and only increments on `Attempting -> Retrying`,
/// which requires `retries < max_retries`, so it can never exceed the bound.
#[derive(Debug, Clone)]
pub struct RetryMachine {
    state: AttemptState,
    retries: u32,
    max_retries: u32,
}

impl RetryMachine {
    pub fn new(max_retries: u32) -> Self {
        Self {
            state: AttemptState::Pending,
            retries: 0,
            max_retries,
        }
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Moves `Pending` or `Retrying` to `Attempting`. Returns false in any
    /// other state.
    pub fn begin_attempt(&mut self) -> bool {
        match self.state {
            AttemptState::Pending | AttemptState::Retrying => {
                self.state = AttemptState::Attempting;
                true
            }
            _ => false,
        }
    }

    /// Feeds the outcome of the current attempt. Returns `None` unless the
    /// machine is `Attempting`.
    pub fn step(&mut self, outcome: Result<String, GenerationError>) -> Option<Transition> {
        if self.state != AttemptState::Attempting {
            return None;
        }

        let transition = match outcome {
            Ok(code) => {
                self.state = AttemptState::Succeeded;
                Transition::Succeeded(code)
            }
            Err(err) if self.retries < self.max_retries => {
                self.retries += 1;
                self.state = AttemptState::Retrying;
                Transition::Retrying {
                    retries: self.retries,
                    reason: err.to_string(),
                }
            }
            Err(err) => {
                self.state = AttemptState::Exhausted;
                Transition::Exhausted {
                    reason: err.to_string(),
                }
            }
        };

        tracing::debug!(state = ?self.state, retries = self.retries, "Retry machine transition");
        Some(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail() -> Result<String, GenerationError> {
        Err(GenerationError::Provider("nope".to_string()))
    }

    #[test]
    fn test_starts_pending() {
        let machine = RetryMachine::new(3);
        assert_eq!(machine.state(), AttemptState::Pending);
        assert_eq!(machine.retries(), 0);
        assert!(!machine.state().is_terminal());
    }

    #[test]
    fn test_success_is_terminal() {
        let mut machine = RetryMachine::new(3);
        assert!(machine.begin_attempt());
        assert_eq!(machine.state(), AttemptState::Attempting);

        let transition = machine.step(Ok("code".to_string()));
        assert_eq!(transition, Some(Transition::Succeeded("code".to_string())));
        assert_eq!(machine.state(), AttemptState::Succeeded);
        assert!(!machine.begin_attempt());
        assert_eq!(machine.step(Ok("again".to_string())), None);
    }

    #[test]
    fn test_exhausts_after_exactly_max_retries() {
        for max in 0..6u32 {
            let mut machine = RetryMachine::new(max);
            let mut attempts = 0;
            let mut last = None;
            while machine.begin_attempt() {
                attempts += 1;
                last = machine.step(fail());
            }
            assert_eq!(attempts, max + 1);
            assert_eq!(machine.retries(), max);
            assert_eq!(machine.state(), AttemptState::Exhausted);
            assert_eq!(
                last,
                Some(Transition::Exhausted {
                    reason: "Provider failed: nope".to_string()
                })
            );
        }
    }

    #[test]
    fn test_retrying_reports_incremented_count() {
        let mut machine = RetryMachine::new(2);
        machine.begin_attempt();
        assert_eq!(
            machine.step(fail()),
            Some(Transition::Retrying {
                retries: 1,
                reason: "Provider failed: nope".to_string()
            })
        );
        assert_eq!(machine.state(), AttemptState::Retrying);
    }

    #[test]
    fn test_step_requires_attempting() {
        let mut machine = RetryMachine::new(1);
        assert_eq!(machine.step(fail()), None);
        assert_eq!(machine.state(), AttemptState::Pending);
        assert_eq!(machine.retries(), 0);
    }
}
