mod engine;
mod error;
mod ordering;
mod report;
mod solver;
mod types;

pub use engine::{
    run_strategy, simulate, simulate_with_trace, validate_config, validate_debts, validate_extra,
};
pub use error::PayoffError;
pub use ordering::{AVALANCHE, HIGHEST_BALANCE, OrderingPolicy, SNOWBALL, Strategy};
pub use report::{
    Comparison, DebtSummary, StrategyComparison, compare_strategies, compare_with_baseline,
};
pub use solver::{GoalSolveConfig, GoalSolveIteration, GoalSolveResult, solve_required_extra};
pub use types::{
    CalendarMonth, DEFAULT_MAX_MONTHS, Debt, DebtPayoff, MAX_MONTHS_LIMIT, MonthTracePoint,
    PayoffOutcome, PayoffResult, SimulationConfig,
};
