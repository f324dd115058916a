use crate::domain::SavingsGoal;
use rust_decimal::Decimal;
use serde::Serialize;

/// Adds `amount` to the goal and re-evaluates the achieved flag.
///
/// The amount is trusted; callers validate it is positive before getting here.
pub fn add_contribution(goal: &mut SavingsGoal, amount: Decimal) {
    goal.current_amount += amount;
    goal.is_achieved = goal.current_amount >= goal.target_amount;
}

/// Progress in percent, within [0, 100]. A non-positive target reads as 0.
pub fn progress_percentage(goal: &SavingsGoal) -> Decimal {
    if goal.target_amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (goal.current_amount / goal.target_amount * Decimal::ONE_HUNDRED)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

pub fn remaining_amount(goal: &SavingsGoal) -> Decimal {
    (goal.target_amount - goal.current_amount).max(Decimal::ZERO)
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalProgress {
    pub name: String,
    pub current: Decimal,
    pub target: Decimal,
    pub percentage: Decimal,
    pub remaining: Decimal,
    pub achieved: bool,
}

impl GoalProgress {
    pub fn of(goal: &SavingsGoal) -> Self {
        Self {
            name: goal.name.clone(),
            current: goal.current_amount,
            target: goal.target_amount,
            percentage: progress_percentage(goal),
            remaining: remaining_amount(goal),
            achieved: goal.is_achieved,
        }
    }
}
