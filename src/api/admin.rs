use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::api::response::ok;
use crate::auth::{auth::AuthAdmin, password::hash_password};
use crate::error::AppError;
use crate::model::admin::{Admin, AdminChanges};
use crate::model::gender::Gender;
use crate::store::Store;
use crate::utils::{email_cache::EmailCache, email_filter::EmailFilter, validation::Violations};

#[derive(Deserialize, ToSchema)]
pub struct UpdateAdmin {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(format = "email")]
    pub email: Option<String>,
    #[schema(example = "1990-01-01", format = "date", value_type = Option<String>)]
    #[serde(default, deserialize_with = "crate::utils::date::deserialize_option")]
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    #[schema(min_length = 6)]
    pub password: Option<String>,
}

impl UpdateAdmin {
    fn validate(&self) -> Result<(), AppError> {
        Violations::new()
            .optional(self.first_name.as_deref(), |v, s| {
                v.not_blank("first_name", s);
            })
            .optional(self.last_name.as_deref(), |v, s| {
                v.not_blank("last_name", s);
            })
            .optional(self.email.as_deref(), |v, s| {
                v.email("email", s);
            })
            .optional(self.password.as_deref(), |v, s| {
                v.min_len("password", s, 6);
            })
            .finish()
    }
}

async fn find_admin(store: &dyn Store, id: u64) -> Result<Admin, AppError> {
    store
        .find_admin(id)
        .await
        .map_err(AppError::store("Admin", Some(id)))?
        .ok_or_else(|| AppError::not_found("Admin", id))
}

#[utoipa::path(
    get,
    path = "/api/admin",
    responses((status = 200, description = "Admins retrieved successfully", body = [Admin])),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn list_admins(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let admins = store
        .list_admins()
        .await
        .map_err(AppError::store("Admin", None))?;
    Ok(ok("Admins retrieved successfully", admins))
}

#[utoipa::path(
    get,
    path = "/api/admin/{id}",
    params(("id" = u64, Path, description = "Admin id")),
    responses(
        (status = 200, description = "Admin retrieved successfully", body = Admin),
        (status = 404, description = "Admin not found", body = Object)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn get_admin(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let admin = find_admin(store.get_ref(), path.into_inner()).await?;
    Ok(ok("Admin retrieved successfully", admin))
}

/// Partial update; a new password is hashed before it is stored.
#[utoipa::path(
    patch,
    path = "/api/admin/{id}",
    params(("id" = u64, Path, description = "Admin id")),
    request_body = UpdateAdmin,
    responses(
        (status = 200, description = "Admin updated successfully", body = Admin),
        (status = 404, description = "Admin not found", body = Object),
        (status = 409, description = "Admin with this email already exists", body = Object)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn update_admin(
    actor: AuthAdmin,
    store: web::Data<dyn Store>,
    filter: web::Data<EmailFilter>,
    cache: web::Data<EmailCache>,
    path: web::Path<u64>,
    payload: web::Json<UpdateAdmin>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let payload = payload.into_inner();
    payload.validate()?;

    let before = find_admin(store.get_ref(), id).await?;

    let password = match payload.password.as_deref() {
        Some(plain) => Some(hash_password(plain).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            AppError::Internal(e.to_string())
        })?),
        None => None,
    };

    let changes = AdminChanges {
        first_name: payload.first_name.map(|s| s.trim().to_string()),
        last_name: payload.last_name.map(|s| s.trim().to_string()),
        email: payload.email.map(|s| s.trim().to_string()),
        birth_date: payload.birth_date,
        gender: payload.gender,
        password,
    };

    let admin = store
        .update_admin(id, changes)
        .await
        .map_err(AppError::store("Admin", Some(id)))?
        .ok_or_else(|| AppError::not_found("Admin", id))?;

    if !admin.email.eq_ignore_ascii_case(&before.email) {
        filter.remove(&before.email);
        cache.forget(&before.email).await;
        filter.insert(&admin.email);
        cache.mark_taken(&admin.email).await;
    }

    info!(admin_id = id, actor_id = actor.admin_id, "Admin updated");
    Ok(ok("Admin updated successfully", admin))
}

#[utoipa::path(
    delete,
    path = "/api/admin/{id}",
    params(("id" = u64, Path, description = "Admin id")),
    responses(
        (status = 200, description = "Admin deleted successfully", body = Object),
        (status = 404, description = "Admin not found", body = Object)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn delete_admin(
    actor: AuthAdmin,
    store: web::Data<dyn Store>,
    filter: web::Data<EmailFilter>,
    cache: web::Data<EmailCache>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let admin = find_admin(store.get_ref(), id).await?;

    let deleted = store
        .delete_admin(id)
        .await
        .map_err(AppError::store("Admin", Some(id)))?;
    if !deleted {
        return Err(AppError::not_found("Admin", id));
    }

    filter.remove(&admin.email);
    cache.forget(&admin.email).await;

    info!(admin_id = id, actor_id = actor.admin_id, "Admin deleted");
    Ok(ok("Admin deleted successfully", ()))
}
