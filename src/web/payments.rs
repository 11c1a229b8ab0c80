use crate::billing::{self, NewPayment, PaymentView};
use crate::error::ApiResult;
use crate::middleware::{AdminUser, AuthUser};
use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(create_payment).service(list_payments);
}

/// Mock checkout: the payment is recorded as reported.
#[post("/payments")]
pub async fn create_payment(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
    form: web::Json<NewPayment>,
) -> ApiResult<HttpResponse> {
    let payment = billing::record_payment(&db, &user, form.into_inner()).await?;
    Ok(HttpResponse::Created().json(PaymentView::from(payment)))
}

#[get("/payments")]
pub async fn list_payments(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let payments: Vec<PaymentView> = billing::list_payments(&db)
        .await?
        .into_iter()
        .map(PaymentView::from)
        .collect();
    Ok(HttpResponse::Ok().json(payments))
}
