use crate::billing::{self, NewSubscription, SubscriptionView};
use crate::error::ApiResult;
use crate::middleware::AuthUser;
use actix_web::{get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde_json::json;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(cancel_subscription)
        .service(create_subscription)
        .service(view_subscription);
}

#[post("/subscriptions")]
pub async fn create_subscription(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
    form: web::Json<NewSubscription>,
) -> ApiResult<HttpResponse> {
    let sub = billing::subscribe(&db, &user, form.into_inner()).await?;
    Ok(HttpResponse::Created().json(SubscriptionView::from(sub)))
}

#[get("/subscriptions")]
pub async fn view_subscription(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    Ok(match billing::latest(&db, &user).await? {
        Some(sub) => HttpResponse::Ok().json(SubscriptionView::from(sub)),
        None => HttpResponse::Ok().json(json!({ "status": "none" })),
    })
}

#[put("/subscriptions/cancel")]
pub async fn cancel_subscription(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let sub = billing::cancel(&db, &user).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Subscription cancelled",
        "subscription": SubscriptionView::from(sub),
    })))
}
