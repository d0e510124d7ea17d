use swampnotes_auth_types::token::Identity;
use swampnotes_domain::id::UserId;
use swampnotes_market::domain::types::ProfileUpdate;
use swampnotes_market::error::MarketServiceError;
use swampnotes_market::usecase::ledger::CreditPointsUseCase;
use swampnotes_market::usecase::purchase::PurchaseNoteUseCase;
use swampnotes_market::usecase::user::{GetOrCreateUserUseCase, UpdateProfileUseCase};

use crate::helpers::InMemoryMarket;

fn identity(subject: &str, is_admin: bool) -> Identity {
    Identity {
        subject: subject.into(),
        email: Some(format!("{subject}@ufl.edu")),
        name: Some("Gator".into()),
        is_admin,
    }
}

#[tokio::test]
async fn should_create_user_once_under_concurrent_first_contact() {
    let market = InMemoryMarket::new();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let usecase = GetOrCreateUserUseCase {
                repo: market.clone(),
                signup_points: 100,
            };
            tokio::spawn(async move { usecase.execute(&identity("user_new", false)).await })
        })
        .collect();
    let users: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert!(users.iter().all(|u| u.id == users[0].id));
    assert_eq!(users[0].points, 100);
    assert_eq!(market.snapshot().await.users.len(), 1);
}

#[tokio::test]
async fn should_carry_admin_claim_into_new_account() {
    let market = InMemoryMarket::new();
    let user = GetOrCreateUserUseCase {
        repo: market.clone(),
        signup_points: 0,
    }
    .execute(&identity("admin_1", true))
    .await
    .unwrap();
    assert!(user.is_admin);
    assert_eq!(user.points, 0);
}

#[tokio::test]
async fn should_credit_points_and_enable_purchase() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let buyer = market.seed_user(20).await;
    let note = market.seed_note(author.id, 50).await;
    let purchase = PurchaseNoteUseCase {
        uow: market.clone(),
    };
    assert!(matches!(
        purchase.execute(buyer.id, note.id).await,
        Err(MarketServiceError::InsufficientFunds { .. })
    ));

    let balance = CreditPointsUseCase {
        ledger: market.clone(),
    }
    .execute(buyer.id, 30)
    .await
    .unwrap();
    assert_eq!(balance, 50);

    purchase.execute(buyer.id, note.id).await.unwrap();
    assert_eq!(market.balance(buyer.id).await, 0);
}

#[tokio::test]
async fn should_fail_credit_for_unknown_user() {
    let market = InMemoryMarket::new();
    let result = CreditPointsUseCase {
        ledger: market.clone(),
    }
    .execute(UserId::generate(), 10)
    .await;
    assert!(matches!(result, Err(MarketServiceError::UserNotFound)));
}

#[tokio::test]
async fn should_update_profile_without_touching_points() {
    let market = InMemoryMarket::new();
    let user = market.seed_user(42).await;

    let updated = UpdateProfileUseCase {
        repo: market.clone(),
    }
    .execute(
        user.id,
        ProfileUpdate {
            display_name: Some("Albert G.".into()),
            is_profile_public: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.display_name.as_deref(), Some("Albert G."));
    assert!(!updated.is_profile_public);
    assert_eq!(updated.points, 42);
}
