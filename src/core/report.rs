use serde::Serialize;

use super::engine::{run_strategy, validate_debts};
use super::error::PayoffError;
use super::ordering::{AVALANCHE, OrderingPolicy, SNOWBALL, Strategy};
use super::types::{CalendarMonth, Debt, PayoffResult, SimulationConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub baseline: PayoffResult,
    pub accelerated: PayoffResult,
    pub months_saved: i64,
    pub interest_saved: f64,
}

impl Comparison {
    /// Savings only mean something when both runs actually paid everything off.
    pub fn is_meaningful(&self) -> bool {
        self.baseline.converged() && self.accelerated.converged()
    }

    pub fn debt_free_month(&self, start: CalendarMonth) -> Option<CalendarMonth> {
        self.accelerated
            .converged()
            .then(|| start.plus_months(self.accelerated.months))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyComparison {
    pub snowball: Comparison,
    pub avalanche: Comparison,
    pub avalanche_interest_advantage: f64,
    pub cheaper: Strategy,
}

impl StrategyComparison {
    pub fn for_strategy(&self, strategy: Strategy) -> Option<&Comparison> {
        match strategy {
            Strategy::Snowball => Some(&self.snowball),
            Strategy::Avalanche => Some(&self.avalanche),
            Strategy::HighestBalance => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtSummary {
    pub debt_count: usize,
    pub total_balance: f64,
    pub total_original_balance: f64,
    pub total_paid: f64,
    pub paid_fraction: f64,
    pub average_interest_rate: f64,
    pub total_minimum_payment: f64,
}

impl DebtSummary {
    pub fn from_debts(debts: &[Debt]) -> Self {
        let total_balance = debts.iter().map(|d| d.balance).sum::<f64>();
        let total_original_balance = debts.iter().map(|d| d.original_balance).sum::<f64>();
        let total_paid = (total_original_balance - total_balance).max(0.0);
        let paid_fraction = if total_original_balance > 0.0 {
            (total_paid / total_original_balance).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let average_interest_rate = if debts.is_empty() {
            0.0
        } else {
            debts.iter().map(|d| d.annual_interest_rate).sum::<f64>() / debts.len() as f64
        };
        Self {
            debt_count: debts.len(),
            total_balance,
            total_original_balance,
            total_paid,
            paid_fraction,
            average_interest_rate,
            total_minimum_payment: debts.iter().map(|d| d.minimum_payment).sum(),
        }
    }
}

pub fn compare_with_baseline(
    debts: &[Debt],
    policy: &OrderingPolicy,
    extra_monthly: f64,
    config: &SimulationConfig,
) -> Result<Comparison, PayoffError> {
    let baseline = run_strategy(debts, policy, 0.0, config)?;
    let accelerated = run_strategy(debts, policy, extra_monthly, config)?;
    let months_saved = i64::from(baseline.months) - i64::from(accelerated.months);
    let interest_saved = baseline.total_interest - accelerated.total_interest;
    Ok(Comparison {
        baseline,
        accelerated,
        months_saved,
        interest_saved,
    })
}

pub fn compare_strategies(
    debts: &[Debt],
    extra_monthly: f64,
    config: &SimulationConfig,
) -> Result<StrategyComparison, PayoffError> {
    validate_debts(debts)?;
    let snowball = compare_with_baseline(debts, &SNOWBALL, extra_monthly, config)?;
    let avalanche = compare_with_baseline(debts, &AVALANCHE, extra_monthly, config)?;
    let avalanche_interest_advantage =
        snowball.accelerated.total_interest - avalanche.accelerated.total_interest;
    let cheaper = if snowball.accelerated.total_interest < avalanche.accelerated.total_interest {
        Strategy::Snowball
    } else {
        Strategy::Avalanche
    };
    Ok(StrategyComparison {
        snowball,
        avalanche,
        avalanche_interest_advantage,
        cheaper,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PayoffOutcome;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_debts() -> Vec<Debt> {
        vec![
            Debt::new("student", 18_420.0, 5.5, 285.0).with_original_balance(32_000.0),
            Debt::new("sapphire", 3_847.0, 21.49, 95.0).with_original_balance(6_200.0),
            Debt::new("car", 11_230.0, 6.9, 340.0).with_original_balance(19_500.0),
            Debt::new("store-card", 680.0, 25.99, 25.0).with_original_balance(1_200.0),
        ]
    }

    #[test]
    fn summary_matches_portfolio_totals() {
        let summary = DebtSummary::from_debts(&sample_debts());
        assert_eq!(summary.debt_count, 4);
        assert_approx(summary.total_balance, 34_177.0);
        assert_approx(summary.total_original_balance, 58_900.0);
        assert_approx(summary.total_paid, 24_723.0);
        assert_approx(summary.paid_fraction, 24_723.0 / 58_900.0);
        assert_approx(summary.average_interest_rate, 59.88 / 4.0);
        assert_approx(summary.total_minimum_payment, 745.0);
    }

    #[test]
    fn summary_of_empty_set_is_zero() {
        let summary = DebtSummary::from_debts(&[]);
        assert_eq!(summary.debt_count, 0);
        assert_approx(summary.total_balance, 0.0);
        assert_approx(summary.paid_fraction, 0.0);
        assert_approx(summary.average_interest_rate, 0.0);
    }

    #[test]
    fn baseline_comparison_reports_savings() {
        let comparison =
            compare_with_baseline(&sample_debts(), &AVALANCHE, 100.0, &SimulationConfig::default())
                .expect("valid input");
        assert!(comparison.is_meaningful());
        assert_eq!(comparison.baseline.months, 77);
        assert_eq!(comparison.accelerated.months, 66);
        assert_eq!(comparison.months_saved, 11);
        assert_approx(
            comparison.interest_saved,
            comparison.baseline.total_interest - comparison.accelerated.total_interest,
        );
        assert!(comparison.interest_saved > 2_400.0);
    }

    #[test]
    fn zero_extra_saves_nothing() {
        let comparison =
            compare_with_baseline(&sample_debts(), &SNOWBALL, 0.0, &SimulationConfig::default())
                .expect("valid input");
        assert_eq!(comparison.months_saved, 0);
        assert_approx(comparison.interest_saved, 0.0);
    }

    #[test]
    fn capped_baseline_is_not_a_meaningful_comparison() {
        let debts = vec![Debt::new("runaway", 1_000.0, 30.0, 5.0)];
        let comparison =
            compare_with_baseline(&debts, &AVALANCHE, 500.0, &SimulationConfig::default())
                .expect("valid input");
        assert_eq!(comparison.baseline.outcome, PayoffOutcome::Capped);
        assert_eq!(comparison.accelerated.outcome, PayoffOutcome::Converged);
        assert!(!comparison.is_meaningful());
    }

    #[test]
    fn debt_free_month_is_offset_from_start() {
        let comparison =
            compare_with_baseline(&sample_debts(), &AVALANCHE, 100.0, &SimulationConfig::default())
                .expect("valid input");
        let start = CalendarMonth::new(2026, 2).expect("valid month");
        assert_eq!(
            comparison.debt_free_month(start),
            Some(CalendarMonth {
                year: 2031,
                month: 8
            })
        );
    }

    #[test]
    fn debt_free_month_is_none_when_capped() {
        let debts = vec![Debt::new("runaway", 1_000.0, 30.0, 5.0)];
        let comparison =
            compare_with_baseline(&debts, &SNOWBALL, 0.0, &SimulationConfig::default())
                .expect("valid input");
        let start = CalendarMonth::new(2026, 2).expect("valid month");
        assert_eq!(comparison.debt_free_month(start), None);
    }

    #[test]
    fn strategy_comparison_prefers_avalanche_when_cheaper() {
        let debts = vec![
            Debt::new("cheap-small", 500.0, 2.0, 40.0),
            Debt::new("costly-large", 6_000.0, 24.0, 40.0),
        ];
        let strategies =
            compare_strategies(&debts, 200.0, &SimulationConfig::default()).expect("valid input");
        assert_eq!(strategies.cheaper, Strategy::Avalanche);
        assert!(strategies.avalanche_interest_advantage > 400.0);
        assert_eq!(strategies.snowball.accelerated.months, 39);
        assert_eq!(strategies.avalanche.accelerated.months, 36);
        assert!(strategies.for_strategy(Strategy::HighestBalance).is_none());
    }

    #[test]
    fn strategy_comparison_ties_favor_avalanche() {
        let strategies = compare_strategies(&sample_debts(), 100.0, &SimulationConfig::default())
            .expect("valid input");
        assert_approx(strategies.avalanche_interest_advantage, 0.0);
        assert_eq!(strategies.cheaper, Strategy::Avalanche);
    }

    #[test]
    fn strategy_comparison_rejects_invalid_debts() {
        let debts = vec![Debt::new("bad", -5.0, 10.0, 10.0)];
        assert!(compare_strategies(&debts, 0.0, &SimulationConfig::default()).is_err());
    }
}
