//! Per-state transition rules
//!
//! Each state owns one function that looks at this tick's signals and
//! returns the state it wants next. The functions are pure; debouncing and
//! enter/exit effects live in the guard controller.

use super::state::GuardState;

/// Everything a transition rule may look at
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Signals {
    /// Suspicion has reached its maximum
    pub suspicion_max: bool,
    /// Suspicion is at or above the suspicious threshold
    pub suspicious: bool,
    /// De-aggro countdown has run out
    pub de_aggro_expired: bool,
    /// The chased target cannot currently be caught
    pub target_invulnerable: bool,
    /// A camera alert is pending
    pub camera_alert: bool,
    /// A distraction is pending
    pub distraction: bool,
    /// The guard is within arrival radius of its current target
    pub arrived: bool,
    /// The look-around duration has elapsed
    pub look_around_done: bool,
}

/// Desired next state. Max suspicion beats every per-state rule.
#[must_use]
pub fn next_state(state: GuardState, signals: &Signals) -> GuardState {
    if signals.suspicion_max && state != GuardState::Chase {
        return GuardState::Chase;
    }

    match state {
        GuardState::Patrol => patrol(signals),
        GuardState::Suspicious => suspicious(signals),
        GuardState::Chase => chase(signals),
        GuardState::Distracted => distracted(signals),
        GuardState::Alerted => alerted(signals),
        GuardState::LookingAround => looking_around(signals),
    }
}

/// Whether a desired change may be committed after `ticks_in_state` ticks
#[must_use]
pub fn may_commit(to: GuardState, ticks_in_state: u32, min_state_ticks: u32) -> bool {
    to == GuardState::Distracted || ticks_in_state >= min_state_ticks
}

fn patrol(s: &Signals) -> GuardState {
    if s.suspicious {
        GuardState::Suspicious
    } else if s.distraction {
        GuardState::Distracted
    } else if s.camera_alert {
        GuardState::Alerted
    } else {
        GuardState::Patrol
    }
}

fn suspicious(s: &Signals) -> GuardState {
    if s.camera_alert {
        GuardState::Alerted
    } else if !s.suspicious {
        GuardState::Patrol
    } else {
        GuardState::Suspicious
    }
}

fn chase(s: &Signals) -> GuardState {
    if s.de_aggro_expired || s.target_invulnerable {
        GuardState::Suspicious
    } else {
        GuardState::Chase
    }
}

fn distracted(s: &Signals) -> GuardState {
    if s.suspicious {
        GuardState::Suspicious
    } else if s.camera_alert {
        GuardState::Alerted
    } else if s.arrived {
        GuardState::LookingAround
    } else {
        GuardState::Distracted
    }
}

fn alerted(s: &Signals) -> GuardState {
    if s.suspicious {
        GuardState::Suspicious
    } else if s.arrived {
        GuardState::Patrol
    } else {
        GuardState::Alerted
    }
}

fn looking_around(s: &Signals) -> GuardState {
    if s.suspicious {
        GuardState::Suspicious
    } else if s.distraction {
        GuardState::Distracted
    } else if s.camera_alert {
        GuardState::Alerted
    } else if s.look_around_done {
        GuardState::Patrol
    } else {
        GuardState::LookingAround
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::state::GuardState::*;

    fn quiet() -> Signals {
        Signals::default()
    }

    #[test]
    fn test_no_signals_keeps_state() {
        for state in GuardState::ALL {
            assert_eq!(next_state(state, &quiet()), state, "{state}");
        }
    }

    #[test]
    fn test_max_suspicion_always_chases() {
        let signals = Signals {
            suspicion_max: true,
            suspicious: true,
            camera_alert: true,
            distraction: true,
            arrived: true,
            look_around_done: true,
            ..quiet()
        };
        for state in GuardState::ALL {
            assert_eq!(next_state(state, &signals), Chase);
        }
    }

    #[test]
    fn test_patrol_interrupt_priority() {
        let all = Signals {
            suspicious: true,
            distraction: true,
            camera_alert: true,
            ..quiet()
        };
        assert_eq!(next_state(Patrol, &all), Suspicious);

        let no_suspicion = Signals {
            suspicious: false,
            ..all
        };
        assert_eq!(next_state(Patrol, &no_suspicion), Distracted);

        let alert_only = Signals {
            camera_alert: true,
            ..quiet()
        };
        assert_eq!(next_state(Patrol, &alert_only), Alerted);
    }

    #[test]
    fn test_chase_gives_up() {
        let expired = Signals {
            de_aggro_expired: true,
            ..quiet()
        };
        assert_eq!(next_state(Chase, &expired), Suspicious);

        let invulnerable = Signals {
            target_invulnerable: true,
            ..quiet()
        };
        assert_eq!(next_state(Chase, &invulnerable), Suspicious);
    }

    #[test]
    fn test_suspicious_exits() {
        assert_eq!(next_state(Suspicious, &quiet()), Patrol);

        let alert = Signals {
            suspicious: true,
            camera_alert: true,
            ..quiet()
        };
        assert_eq!(next_state(Suspicious, &alert), Alerted);
    }

    #[test]
    fn test_alerted_exits() {
        let arrived = Signals {
            arrived: true,
            ..quiet()
        };
        assert_eq!(next_state(Alerted, &arrived), Patrol);

        let spotted = Signals {
            suspicious: true,
            arrived: true,
            ..quiet()
        };
        assert_eq!(next_state(Alerted, &spotted), Suspicious);
    }

    #[test]
    fn test_distraction_flow() {
        let arrived = Signals {
            arrived: true,
            distraction: true,
            ..quiet()
        };
        assert_eq!(next_state(Distracted, &arrived), LookingAround);

        let alert = Signals {
            camera_alert: true,
            distraction: true,
            ..quiet()
        };
        assert_eq!(next_state(Distracted, &alert), Alerted);

        let done = Signals {
            look_around_done: true,
            ..quiet()
        };
        assert_eq!(next_state(LookingAround, &done), Patrol);

        let noise = Signals {
            distraction: true,
            camera_alert: true,
            look_around_done: true,
            ..quiet()
        };
        assert_eq!(next_state(LookingAround, &noise), Distracted);
    }

    #[test]
    fn test_debounce_exempts_distraction() {
        assert!(!may_commit(Suspicious, 2, 5));
        assert!(may_commit(Suspicious, 5, 5));
        assert!(may_commit(Distracted, 0, 5));
    }
}
