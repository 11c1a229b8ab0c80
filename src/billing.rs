//! Subscriptions and mock payments. No money moves; payments are recorded as
//! reported by the client.

use crate::datetime::parse_timestamp;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::orm::subscriptions::{self, SubscriptionStatus};
use crate::orm::payments;
use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{entity::*, query::*, ActiveValue::Set, DatabaseConnection};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const PAYMENT_SUCCESS: &str = "success";

/// Amounts are stored in a numeric(10, 2) column.
const AMOUNT_SCALE: u32 = 2;

#[derive(Debug, Deserialize, Validate)]
pub struct NewSubscription {
    #[validate(length(min = 1, max = 64))]
    pub plan: String,
    #[serde(default)]
    pub end_date: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    pub id: i32,
    pub user_id: i32,
    pub plan: String,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub status: SubscriptionStatus,
    pub payment_method: Option<String>,
}

impl From<subscriptions::Model> for SubscriptionView {
    fn from(sub: subscriptions::Model) -> Self {
        Self {
            id: sub.id,
            user_id: sub.user_id,
            plan: sub.plan,
            start_date: sub.start_date,
            end_date: sub.end_date,
            status: sub.status,
            payment_method: sub.payment_method,
        }
    }
}

pub async fn subscribe(
    db: &DatabaseConnection,
    user: &AuthUser,
    input: NewSubscription,
) -> ApiResult<subscriptions::Model> {
    input.validate()?;
    let end_date = parse_timestamp(input.end_date.as_deref())?;

    if active_subscription(db, user.user_id).await?.is_some() {
        return Err(ApiError::conflict("You already have an active subscription"));
    }

    let sub = subscriptions::ActiveModel {
        user_id: Set(user.user_id),
        plan: Set(input.plan.trim().to_string()),
        start_date: Set(Utc::now().naive_utc()),
        end_date: Set(end_date),
        status: Set(SubscriptionStatus::Active),
        payment_method: Set(input.payment_method),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!("user_id {} subscribed to '{}'", user.user_id, sub.plan);
    Ok(sub)
}

async fn active_subscription(
    db: &DatabaseConnection,
    user_id: i32,
) -> ApiResult<Option<subscriptions::Model>> {
    Ok(subscriptions::Entity::find()
        .filter(subscriptions::Column::UserId.eq(user_id))
        .filter(subscriptions::Column::Status.eq(SubscriptionStatus::Active))
        .one(db)
        .await?)
}

/// Most recent subscription of any status.
pub async fn latest(
    db: &DatabaseConnection,
    user: &AuthUser,
) -> ApiResult<Option<subscriptions::Model>> {
    Ok(subscriptions::Entity::find()
        .filter(subscriptions::Column::UserId.eq(user.user_id))
        .order_by_desc(subscriptions::Column::StartDate)
        .order_by_desc(subscriptions::Column::Id)
        .one(db)
        .await?)
}

pub async fn cancel(db: &DatabaseConnection, user: &AuthUser) -> ApiResult<subscriptions::Model> {
    let sub = active_subscription(db, user.user_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("No active subscription found"))?;

    let mut model: subscriptions::ActiveModel = sub.into();
    model.status = Set(SubscriptionStatus::Cancelled);
    model.end_date = Set(Some(Utc::now().naive_utc()));
    let sub = model.update(db).await?;

    log::info!("user_id {} cancelled subscription {}", user.user_id, sub.id);
    Ok(sub)
}

#[derive(Debug, Deserialize)]
pub struct NewPayment {
    pub subscription_id: Option<i32>,
    /// Accepts a JSON number or a decimal string.
    pub amount: Decimal,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentView {
    pub id: i32,
    pub subscription_id: Option<i32>,
    pub user_id: i32,
    pub amount: Decimal,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub status: String,
    pub payment_date: NaiveDateTime,
}

impl From<payments::Model> for PaymentView {
    fn from(payment: payments::Model) -> Self {
        Self {
            id: payment.id,
            subscription_id: payment.subscription_id,
            user_id: payment.user_id,
            amount: payment.amount,
            payment_method: payment.payment_method,
            transaction_id: payment.transaction_id,
            status: payment.status,
            payment_date: payment.payment_date,
        }
    }
}

pub async fn record_payment(
    db: &DatabaseConnection,
    user: &AuthUser,
    input: NewPayment,
) -> ApiResult<payments::Model> {
    if input.amount <= Decimal::ZERO {
        return Err(ApiError::bad_request("Amount must be greater than zero"));
    }
    if input.amount.normalize().scale() > AMOUNT_SCALE {
        return Err(ApiError::bad_request(
            "Amount can have at most two decimal places",
        ));
    }

    if let Some(subscription_id) = input.subscription_id {
        let owned = subscriptions::Entity::find_by_id(subscription_id)
            .one(db)
            .await?
            .map_or(false, |sub| sub.user_id == user.user_id);
        if !owned {
            return Err(ApiError::bad_request("Subscription not found"));
        }
    }

    let payment = payments::ActiveModel {
        subscription_id: Set(input.subscription_id),
        user_id: Set(user.user_id),
        amount: Set(input.amount.round_dp(AMOUNT_SCALE)),
        payment_method: Set(input.payment_method),
        transaction_id: Set(input.transaction_id),
        status: Set(PAYMENT_SUCCESS.to_string()),
        payment_date: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!(
        "Recorded payment {} of {} for user_id {}",
        payment.id,
        payment.amount,
        user.user_id
    );
    Ok(payment)
}

/// Newest first.
pub async fn list_payments(db: &DatabaseConnection) -> ApiResult<Vec<payments::Model>> {
    Ok(payments::Entity::find()
        .order_by_desc(payments::Column::PaymentDate)
        .order_by_desc(payments::Column::Id)
        .all(db)
        .await?)
}
