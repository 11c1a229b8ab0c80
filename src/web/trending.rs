use crate::error::{ApiError, ApiResult};
use crate::middleware::AdminUser;
use crate::storage::AssetStore;
use crate::trending::{self, NewTrending, TrendingFilter, TrendingUpdate, TrendingView};
use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde_json::json;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(view_positions)
        .service(list_trending)
        .service(create_trending)
        .service(update_trending)
        .service(delete_trending);
}

#[get("/trending")]
pub async fn list_trending(
    db: web::Data<DatabaseConnection>,
    query: web::Query<TrendingFilter>,
) -> ApiResult<HttpResponse> {
    let rows = trending::list_active(&db, query.trending_type).await?;
    let views: Vec<TrendingView> = rows.into_iter().map(TrendingView::from).collect();
    Ok(HttpResponse::Ok().json(views))
}

#[get("/trending/positions")]
pub async fn view_positions(
    db: web::Data<DatabaseConnection>,
    query: web::Query<TrendingFilter>,
) -> ApiResult<HttpResponse> {
    let trending_type = query
        .trending_type
        .ok_or_else(|| ApiError::bad_request("trending_type is required"))?;
    let available = trending::available_positions(&db, trending_type).await?;

    Ok(HttpResponse::Ok().json(json!({
        "trending_type": trending_type,
        "available_positions": available,
    })))
}

#[post("/trending")]
pub async fn create_trending(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    form: web::Json<NewTrending>,
) -> ApiResult<HttpResponse> {
    let row = trending::create(&db, form.into_inner()).await?;
    Ok(HttpResponse::Created().json(TrendingView::from(row)))
}

#[put("/trending/{id}")]
pub async fn update_trending(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Json<TrendingUpdate>,
) -> ApiResult<HttpResponse> {
    let row = trending::update(&db, path.into_inner(), form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(TrendingView::from(row)))
}

#[delete("/trending/{id}")]
pub async fn delete_trending(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    store: web::Data<dyn AssetStore>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let outcome = trending::delete(&db, store.get_ref(), path.into_inner()).await?;

    let message = if outcome.asset_deleted {
        "Trending item and its video deleted"
    } else {
        "Trending item deleted; its video could not be removed from storage"
    };

    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "deleted": outcome.deleted,
        "asset_deleted": outcome.asset_deleted,
        "asset_error": outcome.asset_error,
    })))
}
