use std::collections::HashSet;

use super::error::PayoffError;
use super::ordering::OrderingPolicy;
use super::types::{
    Debt, DebtPayoff, MAX_MONTHS_LIMIT, MonthTracePoint, PayoffOutcome, PayoffResult,
    SimulationConfig,
};

#[derive(Debug, Clone, Copy, Default)]
struct MonthFlow {
    interest: f64,
    minimum_paid: f64,
    extra_paid: f64,
}

/// Run-local state. Balances are indexed by position in the ordered sequence.
#[derive(Debug)]
struct LedgerState<'a> {
    debts: &'a [Debt],
    balances: Vec<f64>,
    paid_off_month: Vec<Option<u32>>,
    months: u32,
    total_interest: f64,
}

impl<'a> LedgerState<'a> {
    fn new(debts: &'a [Debt]) -> Self {
        let balances = debts.iter().map(|d| d.balance).collect::<Vec<_>>();
        let paid_off_month = balances
            .iter()
            .map(|&b| if b <= 0.0 { Some(0) } else { None })
            .collect();
        Self {
            debts,
            balances,
            paid_off_month,
            months: 0,
            total_interest: 0.0,
        }
    }

    fn all_paid(&self) -> bool {
        self.balances.iter().all(|&b| b <= 0.0)
    }

    fn remaining_balance(&self) -> f64 {
        self.balances.iter().sum()
    }

    fn step_month(&mut self, extra_monthly: f64, rollover_freed_minimums: bool) -> MonthFlow {
        self.months += 1;
        let mut flow = MonthFlow::default();

        accrue_interest(self.debts, &mut self.balances, &mut flow);
        self.total_interest += flow.interest;

        let freed = pay_minimums(self.debts, &mut self.balances, &mut flow);
        let surplus = if rollover_freed_minimums {
            extra_monthly + freed
        } else {
            extra_monthly
        };
        allocate_surplus(&mut self.balances, surplus, &mut flow);

        for (idx, &balance) in self.balances.iter().enumerate() {
            if balance <= 0.0 && self.paid_off_month[idx].is_none() {
                self.paid_off_month[idx] = Some(self.months);
            }
        }

        flow
    }

    fn trace_point(&self, flow: MonthFlow) -> MonthTracePoint {
        MonthTracePoint {
            month: self.months,
            interest: flow.interest,
            minimum_paid: flow.minimum_paid,
            extra_paid: flow.extra_paid,
            balances: self.balances.clone(),
            total_balance: self.remaining_balance(),
        }
    }

    fn into_result(self, outcome: PayoffOutcome) -> PayoffResult {
        let remaining_balance = self.remaining_balance();
        let debt_payoffs = self
            .debts
            .iter()
            .zip(self.paid_off_month)
            .map(|(debt, paid_off_month)| DebtPayoff {
                id: debt.id.clone(),
                paid_off_month,
            })
            .collect();
        PayoffResult {
            outcome,
            months: self.months,
            total_interest: self.total_interest,
            remaining_balance,
            order: self.debts.to_vec(),
            debt_payoffs,
        }
    }
}

pub fn simulate(
    ordered: &[Debt],
    extra_monthly: f64,
    config: &SimulationConfig,
) -> Result<PayoffResult, PayoffError> {
    run_ledger(ordered, extra_monthly, config, None)
}

pub fn simulate_with_trace(
    ordered: &[Debt],
    extra_monthly: f64,
    config: &SimulationConfig,
) -> Result<(PayoffResult, Vec<MonthTracePoint>), PayoffError> {
    let mut trace = Vec::new();
    let result = run_ledger(ordered, extra_monthly, config, Some(&mut trace))?;
    Ok((result, trace))
}

pub fn run_strategy(
    debts: &[Debt],
    policy: &OrderingPolicy,
    extra_monthly: f64,
    config: &SimulationConfig,
) -> Result<PayoffResult, PayoffError> {
    simulate(&policy.order(debts), extra_monthly, config)
}

pub fn validate_debts(debts: &[Debt]) -> Result<(), PayoffError> {
    let mut seen = HashSet::with_capacity(debts.len());
    for debt in debts {
        for (field, value) in [
            ("balance", debt.balance),
            ("original balance", debt.original_balance),
            ("annual interest rate", debt.annual_interest_rate),
            ("minimum payment", debt.minimum_payment),
        ] {
            if !value.is_finite() {
                return Err(PayoffError::NonFiniteValue {
                    id: debt.id.clone(),
                    field,
                });
            }
            if value < 0.0 {
                return Err(PayoffError::NegativeValue {
                    id: debt.id.clone(),
                    field,
                });
            }
        }
        if !seen.insert(debt.id.as_str()) {
            return Err(PayoffError::DuplicateDebtId(debt.id.clone()));
        }
    }
    Ok(())
}

pub fn validate_extra(extra_monthly: f64) -> Result<(), PayoffError> {
    if !extra_monthly.is_finite() {
        return Err(PayoffError::NonFiniteExtraPayment);
    }
    if extra_monthly < 0.0 {
        return Err(PayoffError::NegativeExtraPayment);
    }
    Ok(())
}

pub fn validate_config(config: &SimulationConfig) -> Result<(), PayoffError> {
    if config.max_months == 0 || config.max_months > MAX_MONTHS_LIMIT {
        return Err(PayoffError::InvalidMaxMonths {
            value: config.max_months,
            limit: MAX_MONTHS_LIMIT,
        });
    }
    Ok(())
}

fn run_ledger(
    ordered: &[Debt],
    extra_monthly: f64,
    config: &SimulationConfig,
    mut trace: Option<&mut Vec<MonthTracePoint>>,
) -> Result<PayoffResult, PayoffError> {
    validate_debts(ordered)?;
    validate_extra(extra_monthly)?;
    validate_config(config)?;

    let mut state = LedgerState::new(ordered);
    loop {
        if state.all_paid() {
            return Ok(state.into_result(PayoffOutcome::Converged));
        }
        if state.months >= config.max_months {
            tracing::debug!(
                max_months = config.max_months,
                remaining_balance = state.remaining_balance(),
                "payoff simulation hit the month cap"
            );
            return Ok(state.into_result(PayoffOutcome::Capped));
        }

        let flow = state.step_month(extra_monthly, config.rollover_freed_minimums);
        if let Some(points) = trace.as_deref_mut() {
            points.push(state.trace_point(flow));
        }
    }
}

fn accrue_interest(debts: &[Debt], balances: &mut [f64], flow: &mut MonthFlow) {
    for (debt, balance) in debts.iter().zip(balances.iter_mut()) {
        if *balance <= 0.0 {
            continue;
        }
        let interest = *balance * debt.monthly_rate();
        *balance += interest;
        flow.interest += interest;
    }
}

/// Returns the part of the nominal minimums that was not needed this month.
fn pay_minimums(debts: &[Debt], balances: &mut [f64], flow: &mut MonthFlow) -> f64 {
    let mut freed = 0.0;
    for (debt, balance) in debts.iter().zip(balances.iter_mut()) {
        if *balance <= 0.0 {
            freed += debt.minimum_payment;
            continue;
        }
        let payment = debt.minimum_payment.min(*balance);
        *balance -= payment;
        flow.minimum_paid += payment;
        freed += debt.minimum_payment - payment;
    }
    freed
}

fn allocate_surplus(balances: &mut [f64], mut surplus: f64, flow: &mut MonthFlow) {
    for balance in balances.iter_mut() {
        if surplus <= 0.0 {
            break;
        }
        if *balance <= 0.0 {
            continue;
        }
        let payment = surplus.min(*balance);
        *balance -= payment;
        surplus -= payment;
        flow.extra_paid += payment;
    }
}
