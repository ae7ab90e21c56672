//! Discrete PID control law with windup prevention (spec.md §4.F "Control
//! law"). Corresponds to the "Analyze" stage of the MAPE-K loop this crate
//! is grounded on (`knhk-autonomic::controller::AutonomicController`): the
//! Monitor stage hands in the latest `|V|`, this module turns it into a
//! bounded correction `u(t)`.

use scie_core::Config;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidState {
    pub integral: f64,
    pub last_error: f64,
}

impl Default for PidState {
    fn default() -> Self {
        Self { integral: 0.0, last_error: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidStep {
    pub error: f64,
    pub integral: f64,
    pub derivative: f64,
    pub output: f64,
}

/// `e(t) = setpoint − |V|(t)`, `I(t) = clamp(I(t−1)+e(t), ±i_max)`,
/// `D(t) = e(t) − e(t−1)`, `u(t) = clamp(Kp·e + Ki·I + Kd·D, ±u_max)`.
pub fn step(config: &Config, state: PidState, magnitude: f64) -> (PidStep, PidState) {
    let error = config.setpoint - magnitude;
    let integral = (state.integral + error).clamp(-config.i_max, config.i_max);
    let derivative = error - state.last_error;
    let output =
        (config.k_p * error + config.k_i * integral + config.k_d * derivative).clamp(-config.u_max, config.u_max);

    let next_state = PidState { integral, last_error: error };
    (PidStep { error, integral, derivative, output }, next_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_error_below_setpoint_pushes_output_positive() {
        let config = Config::default();
        let (step, _) = step(&config, PidState::default(), 0.50);
        assert!(step.error > 0.0);
        assert!(step.output > 0.0);
    }

    #[test]
    fn integral_never_exceeds_i_max() {
        let config = Config::default();
        let mut state = PidState::default();
        for _ in 0..1000 {
            let (_, next) = step(&config, state, 0.0);
            state = next;
        }
        assert!(state.integral.abs() <= config.i_max + 1e-12);
    }

    #[test]
    fn output_never_exceeds_u_max() {
        let config = Config::default();
        let mut state = PidState::default();
        for _ in 0..1000 {
            let (step, next) = step(&config, state, 1.0);
            assert!(step.output.abs() <= config.u_max + 1e-12);
            state = next;
        }
    }

    #[test]
    fn at_setpoint_output_is_zero() {
        let config = Config::default();
        let (step, _) = step(&config, PidState::default(), config.setpoint);
        assert_eq!(step.error, 0.0);
        assert_eq!(step.output, 0.0);
    }
}
