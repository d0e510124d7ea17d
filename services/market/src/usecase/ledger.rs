use swampnotes_domain::id::UserId;

use crate::domain::repository::PointsLedger;
use crate::error::MarketServiceError;

/// Admin credit of points to a user's balance.
pub struct CreditPointsUseCase<L: PointsLedger> {
    pub ledger: L,
}

impl<L: PointsLedger> CreditPointsUseCase<L> {
    pub async fn execute(&self, user_id: UserId, amount: i64) -> Result<i64, MarketServiceError> {
        if amount <= 0 {
            return Err(MarketServiceError::InvalidAmount);
        }
        let balance = self.ledger.credit(user_id, amount).await?;
        tracing::info!(%user_id, amount, balance, "points credited");
        Ok(balance)
    }
}
