use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::social::{self, CommentView, LikeView, NewComment, TargetParams};
use actix_web::{delete, get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde_json::json;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(count_likes)
        .service(add_like)
        .service(remove_like)
        .service(list_comments)
        .service(add_comment)
        .service(remove_comment);
}

#[get("/likes")]
pub async fn count_likes(
    db: web::Data<DatabaseConnection>,
    query: web::Query<TargetParams>,
) -> ApiResult<HttpResponse> {
    let target = query.exactly_one()?;
    let count = social::count_likes(&db, target).await?;
    Ok(HttpResponse::Ok().json(json!({ "count": count })))
}

#[post("/likes")]
pub async fn add_like(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
    form: web::Json<TargetParams>,
) -> ApiResult<HttpResponse> {
    let target = form.exactly_one()?;
    let like = social::add_like(&db, &user, target).await?;
    Ok(HttpResponse::Created().json(LikeView::from(like)))
}

#[delete("/likes/{id}")]
pub async fn remove_like(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let like = social::remove_like(&db, &user, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Like removed",
        "deleted": LikeView::from(like),
    })))
}

#[get("/comments")]
pub async fn list_comments(
    db: web::Data<DatabaseConnection>,
    query: web::Query<TargetParams>,
) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(social::list_comments(&db, &query).await?))
}

#[post("/comments")]
pub async fn add_comment(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
    form: web::Json<NewComment>,
) -> ApiResult<HttpResponse> {
    let comment = social::add_comment(&db, &user, form.into_inner()).await?;
    Ok(HttpResponse::Created().json(CommentView::new(comment, None)))
}

#[delete("/comments/{id}")]
pub async fn remove_comment(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let comment = social::remove_comment(&db, &user, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Comment deleted",
        "deleted": CommentView::new(comment, None),
    })))
}
