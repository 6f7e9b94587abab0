use super::engine::{run_strategy, validate_config, validate_debts};
use super::error::PayoffError;
use super::ordering::OrderingPolicy;
use super::types::{Debt, PayoffResult, SimulationConfig};

#[derive(Debug, Clone, Copy)]
pub struct GoalSolveConfig {
    pub target_months: u32,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl GoalSolveConfig {
    pub fn for_target(target_months: u32) -> Self {
        Self {
            target_months,
            search_max: 100_000.0,
            tolerance: 0.01,
            max_iterations: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_extra: f64,
    pub months: u32,
    pub meets_target: bool,
}

#[derive(Debug, Clone)]
pub struct GoalSolveResult {
    pub target_months: u32,
    pub search_max: f64,
    pub tolerance: f64,
    pub solved_extra: Option<f64>,
    pub achieved: Option<PayoffResult>,
    pub iterations: Vec<GoalSolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

/// Bisects on the extra monthly payment for the smallest amount that pays
/// everything off within `target_months`. Months are weakly decreasing in the
/// extra payment, which keeps the search well-defined.
pub fn solve_required_extra(
    debts: &[Debt],
    policy: &OrderingPolicy,
    sim_config: &SimulationConfig,
    config: GoalSolveConfig,
) -> Result<GoalSolveResult, PayoffError> {
    validate_debts(debts)?;
    validate_config(sim_config)?;
    validate_goal(sim_config, config)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let low_eval = run_strategy(debts, policy, 0.0, sim_config)?;
    let high_eval = run_strategy(debts, policy, config.search_max, sim_config)?;

    let mut solved_extra = None;
    let mut converged = false;
    let feasible;
    let message;

    if meets_target(&low_eval, config.target_months) {
        solved_extra = Some(0.0);
        converged = true;
        feasible = true;
        message = "Minimum payments alone meet the target.".to_string();
    } else if !meets_target(&high_eval, config.target_months) {
        feasible = false;
        message = "No extra payment within the search bounds meets the target.".to_string();
    } else {
        let mut lo = 0.0_f64;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let eval = run_strategy(debts, policy, mid, sim_config)?;
            let ok = meets_target(&eval, config.target_months);
            iterations.push(GoalSolveIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_extra: mid,
                months: eval.months,
                meets_target: ok,
            });

            if ok {
                hi = mid;
            } else {
                lo = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                break;
            }
        }
        solved_extra = Some(hi);
        feasible = true;
        message = if converged {
            "Solved required extra payment.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate."
                .to_string()
        };
    }

    tracing::debug!(
        target_months = config.target_months,
        iterations = iterations.len(),
        feasible,
        "goal solve finished"
    );

    let achieved = match solved_extra {
        Some(extra) => Some(run_strategy(debts, policy, extra, sim_config)?),
        None => None,
    };

    Ok(GoalSolveResult {
        target_months: config.target_months,
        search_max: config.search_max,
        tolerance: config.tolerance,
        solved_extra,
        achieved,
        iterations,
        converged,
        feasible,
        message,
    })
}

fn meets_target(result: &PayoffResult, target_months: u32) -> bool {
    result.converged() && result.months <= target_months
}

fn validate_goal(
    sim_config: &SimulationConfig,
    config: GoalSolveConfig,
) -> Result<(), PayoffError> {
    if config.target_months == 0 {
        return Err(PayoffError::InvalidGoal(
            "target months must be > 0".to_string(),
        ));
    }
    if config.target_months > sim_config.max_months {
        return Err(PayoffError::InvalidGoal(format!(
            "target months must be <= max months ({})",
            sim_config.max_months
        )));
    }
    if !config.search_max.is_finite() || config.search_max <= 0.0 {
        return Err(PayoffError::InvalidGoal(
            "search max must be finite and > 0".to_string(),
        ));
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err(PayoffError::InvalidGoal("tolerance must be > 0".to_string()));
    }
    if config.max_iterations == 0 {
        return Err(PayoffError::InvalidGoal(
            "max iterations must be > 0".to_string(),
        ));
    }
    Ok(())
}
