use serde::Serialize;

pub const DEFAULT_MAX_MONTHS: u32 = 600;
pub const MAX_MONTHS_LIMIT: u32 = 1_200;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: String,
    pub name: String,
    pub balance: f64,
    pub original_balance: f64,
    pub annual_interest_rate: f64,
    pub minimum_payment: f64,
}

impl Debt {
    /// Builds a debt whose original balance equals its current balance.
    pub fn new(
        id: impl Into<String>,
        balance: f64,
        annual_interest_rate: f64,
        minimum_payment: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            balance,
            original_balance: balance,
            annual_interest_rate,
            minimum_payment,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_original_balance(mut self, original_balance: f64) -> Self {
        self.original_balance = original_balance;
        self
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_interest_rate / 100.0 / 12.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub max_months: u32,
    /// Adds the minimum payment of every already-cleared debt to the monthly
    /// surplus pool instead of dropping it.
    pub rollover_freed_minimums: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_months: DEFAULT_MAX_MONTHS,
            rollover_freed_minimums: false,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoffOutcome {
    Converged,
    Capped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayoff {
    pub id: String,
    pub paid_off_month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayoffResult {
    pub outcome: PayoffOutcome,
    pub months: u32,
    pub total_interest: f64,
    pub remaining_balance: f64,
    pub order: Vec<Debt>,
    pub debt_payoffs: Vec<DebtPayoff>,
}

impl PayoffResult {
    pub fn converged(&self) -> bool {
        self.outcome == PayoffOutcome::Converged
    }

    pub fn rounded_total_interest(&self) -> f64 {
        self.total_interest.round()
    }

    pub fn order_ids(&self) -> Vec<&str> {
        self.order.iter().map(|d| d.id.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTracePoint {
    pub month: u32,
    pub interest: f64,
    pub minimum_paid: f64,
    pub extra_paid: f64,
    pub balances: Vec<f64>,
    pub total_balance: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonth {
    pub year: i32,
    /// 1-based, January is 1.
    pub month: u32,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn plus_months(self, months: u32) -> Self {
        let zero_based = self.year as i64 * 12 + (self.month as i64 - 1) + months as i64;
        Self {
            year: zero_based.div_euclid(12) as i32,
            month: zero_based.rem_euclid(12) as u32 + 1,
        }
    }
}
