use serde::Serialize;

use super::types::Debt;

/// A payoff ordering expressed as a sort key. Debts are stable-sorted
/// ascending by key, so ties keep their input position.
#[derive(Clone, Copy, Debug)]
pub struct OrderingPolicy {
    pub name: &'static str,
    key: fn(&Debt) -> f64,
}

impl OrderingPolicy {
    pub const fn new(name: &'static str, key: fn(&Debt) -> f64) -> Self {
        Self { name, key }
    }

    pub fn key(&self, debt: &Debt) -> f64 {
        (self.key)(debt)
    }

    pub fn order(&self, debts: &[Debt]) -> Vec<Debt> {
        let mut ordered = debts.to_vec();
        ordered.sort_by(|a, b| self.key(a).total_cmp(&self.key(b)));
        ordered
    }
}

fn ascending_balance(debt: &Debt) -> f64 {
    debt.balance
}

fn descending_rate(debt: &Debt) -> f64 {
    -debt.annual_interest_rate
}

fn descending_balance(debt: &Debt) -> f64 {
    -debt.balance
}

pub const SNOWBALL: OrderingPolicy = OrderingPolicy::new("snowball", ascending_balance);
pub const AVALANCHE: OrderingPolicy = OrderingPolicy::new("avalanche", descending_rate);
pub const HIGHEST_BALANCE: OrderingPolicy =
    OrderingPolicy::new("highest-balance", descending_balance);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Snowball,
    Avalanche,
    HighestBalance,
}

impl Strategy {
    pub fn policy(self) -> OrderingPolicy {
        match self {
            Strategy::Snowball => SNOWBALL,
            Strategy::Avalanche => AVALANCHE,
            Strategy::HighestBalance => HIGHEST_BALANCE,
        }
    }
}
