use swampnotes_domain::id::{NoteId, UserId};
use swampnotes_market::error::MarketServiceError;
use swampnotes_market::usecase::ownership::ResolveOwnershipUseCase;
use swampnotes_market::usecase::purchase::PurchaseNoteUseCase;

use crate::helpers::InMemoryMarket;

fn purchase_usecase(market: &InMemoryMarket) -> PurchaseNoteUseCase<InMemoryMarket> {
    PurchaseNoteUseCase {
        uow: market.clone(),
    }
}

#[tokio::test]
async fn should_debit_price_and_record_purchase() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let buyer = market.seed_user(150).await;
    let note = market.seed_note(author.id, 100).await;

    let receipt = purchase_usecase(&market)
        .execute(buyer.id, note.id)
        .await
        .unwrap();

    assert_eq!(receipt.purchase.price_paid, 100);
    assert_eq!(receipt.balance, Some(50));
    assert_eq!(market.balance(buyer.id).await, 50);
    assert_eq!(market.purchase_count(buyer.id, note.id).await, 1);
}

#[tokio::test]
async fn should_reject_repeat_purchase_without_second_debit() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let buyer = market.seed_user(300).await;
    let note = market.seed_note(author.id, 100).await;
    let usecase = purchase_usecase(&market);

    usecase.execute(buyer.id, note.id).await.unwrap();
    for _ in 0..3 {
        let result = usecase.execute(buyer.id, note.id).await;
        assert!(matches!(result, Err(MarketServiceError::AlreadyOwned)));
    }

    assert_eq!(market.balance(buyer.id).await, 200);
    assert_eq!(market.purchase_count(buyer.id, note.id).await, 1);
}

#[tokio::test]
async fn should_fail_insufficient_funds_and_leave_balance() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let buyer = market.seed_user(50).await;
    let note = market.seed_note(author.id, 100).await;

    let result = purchase_usecase(&market).execute(buyer.id, note.id).await;

    assert!(matches!(
        result,
        Err(MarketServiceError::InsufficientFunds {
            balance: 50,
            required: 100
        })
    ));
    assert_eq!(market.balance(buyer.id).await, 50);
    assert_eq!(market.purchase_count(buyer.id, note.id).await, 0);
}

#[tokio::test]
async fn should_record_zero_price_purchase_for_free_note() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let buyer = market.seed_user(0).await;
    let note = market.seed_note(author.id, 0).await;

    let receipt = purchase_usecase(&market)
        .execute(buyer.id, note.id)
        .await
        .unwrap();

    assert_eq!(receipt.purchase.price_paid, 0);
    assert_eq!(receipt.balance, None);
    assert_eq!(market.balance(buyer.id).await, 0);
    assert_eq!(market.purchase_count(buyer.id, note.id).await, 1);
}

#[tokio::test]
async fn should_ignore_stale_price_on_free_note() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let buyer = market.seed_user(10).await;
    let note = market
        .seed_note_with(author.id, 0, |n| n.price = 75)
        .await;

    let receipt = purchase_usecase(&market)
        .execute(buyer.id, note.id)
        .await
        .unwrap();

    assert_eq!(receipt.purchase.price_paid, 0);
    assert_eq!(market.balance(buyer.id).await, 10);
}

#[tokio::test]
async fn should_reject_self_purchase_and_keep_author_access() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(500).await;
    let note = market.seed_note(author.id, 100).await;

    let ownership = ResolveOwnershipUseCase {
        notes: market.clone(),
        purchases: market.clone(),
    }
    .execute(author.id, note.id)
    .await
    .unwrap();
    assert!(ownership.can_download);
    assert!(ownership.is_author);

    let result = purchase_usecase(&market).execute(author.id, note.id).await;
    assert!(matches!(result, Err(MarketServiceError::SelfPurchase)));
    assert_eq!(market.balance(author.id).await, 500);
    assert_eq!(market.purchase_count(author.id, note.id).await, 0);
}

#[tokio::test]
async fn should_return_note_not_found_for_unknown_note() {
    let market = InMemoryMarket::new();
    let buyer = market.seed_user(100).await;

    let result = purchase_usecase(&market)
        .execute(buyer.id, NoteId::generate())
        .await;

    assert!(matches!(result, Err(MarketServiceError::NoteNotFound)));
    assert_eq!(market.balance(buyer.id).await, 100);
}

#[tokio::test]
async fn should_return_user_not_found_for_unknown_buyer() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let note = market.seed_note(author.id, 10).await;

    let result = purchase_usecase(&market)
        .execute(UserId::generate(), note.id)
        .await;

    assert!(matches!(result, Err(MarketServiceError::UserNotFound)));
    assert!(market.snapshot().await.purchases.is_empty());
}

#[tokio::test]
async fn should_charge_once_when_two_purchases_race_with_exact_balance() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let buyer = market.seed_user(100).await;
    let note = market.seed_note(author.id, 100).await;

    let first = tokio::spawn({
        let usecase = purchase_usecase(&market);
        async move { usecase.execute(buyer.id, note.id).await }
    });
    let second = tokio::spawn({
        let usecase = purchase_usecase(&market);
        async move { usecase.execute(buyer.id, note.id).await }
    });
    let results = [first.await.unwrap(), second.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(
        loser,
        MarketServiceError::AlreadyOwned | MarketServiceError::InsufficientFunds { .. }
    ));
    assert_eq!(market.balance(buyer.id).await, 0);
    assert_eq!(market.purchase_count(buyer.id, note.id).await, 1);
}

#[tokio::test]
async fn should_reverse_debit_when_insert_loses_race() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let buyer = market.seed_user(200).await;
    let note = market.seed_note(author.id, 100).await;
    let usecase = purchase_usecase(&market);
    usecase.execute(buyer.id, note.id).await.unwrap();

    // The second attempt passes the existence check, debits, then hits the
    // unique (user, note) insert.
    market.set_blind_precheck(true);
    let result = usecase.execute(buyer.id, note.id).await;

    assert!(matches!(result, Err(MarketServiceError::AlreadyOwned)));
    assert_eq!(market.balance(buyer.id).await, 100);
    assert_eq!(market.purchase_count(buyer.id, note.id).await, 1);
}

#[tokio::test]
async fn should_allow_exactly_one_winner_among_many_concurrent_attempts() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let buyer = market.seed_user(1_000).await;
    let note = market.seed_note(author.id, 40).await;
    market.set_blind_precheck(true);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let usecase = purchase_usecase(&market);
            tokio::spawn(async move { usecase.execute(buyer.id, note.id).await })
        })
        .collect();
    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, MarketServiceError::AlreadyOwned))
    );
    assert_eq!(market.balance(buyer.id).await, 960);
    assert_eq!(market.purchase_count(buyer.id, note.id).await, 1);
}

#[tokio::test]
async fn should_keep_balances_non_negative_and_pairs_unique_across_mixed_purchases() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let mut buyers = Vec::new();
    for points in [0, 35, 120, 250] {
        buyers.push(market.seed_user(points).await);
    }
    let mut notes = Vec::new();
    for price in [0, 20, 35, 60, 100] {
        notes.push(market.seed_note(author.id, price).await);
    }

    market.set_blind_precheck(true);
    let mut handles = Vec::new();
    for _ in 0..3 {
        for buyer in &buyers {
            for note in &notes {
                let usecase = purchase_usecase(&market);
                let (buyer_id, note_id) = (buyer.id, note.id);
                handles.push(tokio::spawn(async move {
                    usecase.execute(buyer_id, note_id).await
                }));
            }
        }
    }
    for handle in futures::future::join_all(handles).await {
        match handle.unwrap() {
            Ok(_)
            | Err(MarketServiceError::AlreadyOwned)
            | Err(MarketServiceError::InsufficientFunds { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    let state = market.snapshot().await;
    for buyer in &buyers {
        let spent: i64 = state
            .purchases
            .iter()
            .filter(|p| p.user_id == buyer.id)
            .map(|p| p.price_paid)
            .sum();
        let balance = state.users[&buyer.id].points;
        assert!(balance >= 0);
        assert_eq!(balance + spent, buyer.points, "ledger must balance");
        for note in &notes {
            let rows = state
                .purchases
                .iter()
                .filter(|p| p.user_id == buyer.id && p.note_id == note.id)
                .count();
            assert!(rows <= 1);
        }
    }
}
