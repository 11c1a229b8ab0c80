/// Integration tests for subscriptions, mock payments and content requests
mod common;

use common::*;
use nikoflix::billing::{self, NewPayment, NewSubscription};
use nikoflix::error::ApiError;
use nikoflix::orm::content_requests::{RequestStatus, RequestType};
use nikoflix::orm::subscriptions::SubscriptionStatus;
use nikoflix::requests::{self, NewRequest};
use rust_decimal::Decimal;
use std::str::FromStr;

fn monthly() -> NewSubscription {
    NewSubscription {
        plan: "monthly".to_string(),
        end_date: Some("2099-12-31".to_string()),
        payment_method: Some("card".to_string()),
    }
}

fn payment(subscription_id: Option<i32>, amount: &str) -> NewPayment {
    NewPayment {
        subscription_id,
        amount: Decimal::from_str(amount).unwrap(),
        payment_method: Some("card".to_string()),
        transaction_id: Some("txn_test".to_string()),
    }
}

#[actix_rt::test]
async fn test_one_active_subscription_per_user() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let viewer = auth_user(&create_viewer(&db, "viewer").await.unwrap());

    assert!(billing::latest(&db, &viewer).await.unwrap().is_none());

    let sub = billing::subscribe(&db, &viewer, monthly()).await.unwrap();
    assert_eq!(sub.status, SubscriptionStatus::Active);

    let err = billing::subscribe(&db, &viewer, monthly()).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    let cancelled = billing::cancel(&db, &viewer).await.unwrap();
    assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);
    assert!(cancelled.end_date.is_some());

    let err = billing::cancel(&db, &viewer).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    // After cancelling, a new subscription may start.
    let renewed = billing::subscribe(&db, &viewer, monthly()).await.unwrap();
    let latest = billing::latest(&db, &viewer).await.unwrap().unwrap();
    assert_eq!(latest.id, renewed.id);
}

#[actix_rt::test]
async fn test_payment_rules() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let viewer = auth_user(&create_viewer(&db, "payer").await.unwrap());
    let other = auth_user(&create_viewer(&db, "other").await.unwrap());
    let sub = billing::subscribe(&db, &viewer, monthly()).await.unwrap();

    for amount in ["0", "-3.5", "0.999"] {
        let err = billing::record_payment(&db, &viewer, payment(Some(sub.id), amount))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)), "amount {}", amount);
    }

    // Somebody else's subscription.
    let err = billing::record_payment(&db, &other, payment(Some(sub.id), "9.99"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let paid = billing::record_payment(&db, &viewer, payment(Some(sub.id), "9.99"))
        .await
        .unwrap();
    assert_eq!(paid.status, billing::PAYMENT_SUCCESS);
    assert_eq!(paid.user_id, viewer.user_id);
    assert_eq!(paid.amount, Decimal::new(999, 2));

    billing::record_payment(&db, &other, payment(None, "4.50"))
        .await
        .unwrap();

    let all = billing::list_payments(&db).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].user_id, other.user_id);
    assert_eq!(all[0].amount, Decimal::new(45, 1));
    assert_eq!(all[1].amount.to_string(), "9.99");
}

#[actix_rt::test]
async fn test_request_fulfilment_stamps() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let viewer = auth_user(&create_viewer(&db, "fan").await.unwrap());

    let request = requests::create(
        &db,
        &viewer,
        NewRequest {
            title: "  Cowboy Bebop ".to_string(),
            request_type: RequestType::Anime,
            language: Some("Japanese".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(request.title, "Cowboy Bebop");
    assert_eq!(request.status, RequestStatus::Unfulfilled);
    assert!(request.fulfilled_at.is_none());

    let done = requests::set_status(&db, request.id, RequestStatus::Fulfilled)
        .await
        .unwrap();
    assert!(done.fulfilled_at.is_some());

    let reopened = requests::set_status(&db, request.id, RequestStatus::Unfulfilled)
        .await
        .unwrap();
    assert!(reopened.fulfilled_at.is_none());

    assert_eq!(requests::list(&db).await.unwrap().len(), 1);
    requests::delete(&db, request.id).await.unwrap();
    let err = requests::delete(&db, request.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
