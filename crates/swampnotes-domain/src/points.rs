//! Point balance arithmetic.
//!
//! Balances and prices are plain `i64` point counts. A balance is never allowed
//! to go below zero; these helpers are the single place that rule is computed
//! outside the database.

/// Errors produced by balance arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PointsError {
    #[error("amount must not be negative")]
    NegativeAmount,
    #[error("insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: i64, required: i64 },
    #[error("balance overflow")]
    Overflow,
}

/// Compute the balance after debiting `amount`.
///
/// Fails without producing a value if the result would be negative.
pub fn debit(balance: i64, amount: i64) -> Result<i64, PointsError> {
    if amount < 0 {
        return Err(PointsError::NegativeAmount);
    }
    if balance < amount {
        return Err(PointsError::InsufficientFunds {
            balance,
            required: amount,
        });
    }
    Ok(balance - amount)
}

/// Compute the balance after crediting `amount`.
pub fn credit(balance: i64, amount: i64) -> Result<i64, PointsError> {
    if amount < 0 {
        return Err(PointsError::NegativeAmount);
    }
    balance.checked_add(amount).ok_or(PointsError::Overflow)
}
