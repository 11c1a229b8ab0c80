use crate::error::ApiResult;
use crate::middleware::{AdminUser, AuthUser};
use crate::requests::{self, NewRequest, RequestStatusUpdate, RequestView};
use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde_json::json;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(list_requests)
        .service(create_request)
        .service(update_request)
        .service(delete_request);
}

/// Newest first, shared with the admin listing.
pub(super) async fn request_views(db: &DatabaseConnection) -> ApiResult<Vec<RequestView>> {
    Ok(requests::list(db)
        .await?
        .into_iter()
        .map(RequestView::from)
        .collect())
}

#[get("/requests")]
pub async fn list_requests(db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(request_views(&db).await?))
}

#[post("/requests")]
pub async fn create_request(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
    form: web::Json<NewRequest>,
) -> ApiResult<HttpResponse> {
    let request = requests::create(&db, &user, form.into_inner()).await?;
    Ok(HttpResponse::Created().json(RequestView::from(request)))
}

#[put("/requests/{id}")]
pub async fn update_request(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Json<RequestStatusUpdate>,
) -> ApiResult<HttpResponse> {
    let request = requests::set_status(&db, path.into_inner(), form.status).await?;
    Ok(HttpResponse::Ok().json(RequestView::from(request)))
}

#[delete("/requests/{id}")]
pub async fn delete_request(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let request = requests::delete(&db, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Request deleted",
        "deleted": RequestView::from(request),
    })))
}
