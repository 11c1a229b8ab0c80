use crate::error::ApiResult;
use crate::media::{self, DeleteImage};
use crate::middleware::AdminUser;
use crate::storage::AssetStore;
use actix_web::{delete, web, HttpResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(delete_image);
}

#[delete("/cloudinary/delete-image")]
pub async fn delete_image(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    store: web::Data<dyn AssetStore>,
    form: web::Json<DeleteImage>,
) -> ApiResult<HttpResponse> {
    let outcome = media::delete_image(&db, store.get_ref(), form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(outcome))
}
