use crate::{
    api::response::{created, ok},
    auth::{
        jwt::generate_access_token,
        password::{hash_password, verify_password},
    },
    config::Config,
    error::AppError,
    model::admin::NewAdmin,
    models::{LoginReqDto, LoginResponse, RegisterAdmin},
    store::{AdminStore, Store},
    utils::{email_cache::EmailCache, email_filter::EmailFilter},
};
use actix_web::{HttpResponse, web};
use tracing::{debug, error, info, instrument, warn};

/// true  => email AVAILABLE
/// false => email TAKEN
pub async fn is_email_available<S>(
    email: &str,
    filter: &EmailFilter,
    cache: &EmailCache,
    store: &S,
) -> Result<bool, AppError>
where
    S: AdminStore + ?Sized,
{
    // 1️⃣ Cuckoo filter: a miss is a definite "free"
    if !filter.might_exist(email) {
        return Ok(true);
    }

    // 2️⃣ Moka cache: fast positive
    if cache.is_taken(email).await {
        return Ok(false);
    }

    // 3️⃣ Store fallback
    let existing = store
        .find_admin_by_email(email.trim())
        .await
        .map_err(AppError::store("Admin", None))?;

    if existing.is_some() {
        cache.mark_taken(email).await;
        return Ok(false);
    }

    Ok(true)
}

/// Admin registration handler
#[utoipa::path(
    post,
    path = "/api/admin/register",
    request_body = RegisterAdmin,
    responses(
        (status = 201, description = "Admin registered successfully", body = Object),
        (status = 400, description = "Validation failed", body = Object),
        (status = 409, description = "Email already registered", body = Object)
    ),
    tag = "Admin"
)]
pub async fn register(
    payload: web::Json<RegisterAdmin>,
    store: web::Data<dyn Store>,
    filter: web::Data<EmailFilter>,
    cache: web::Data<EmailCache>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    payload.validate()?;

    let email = payload.email.trim().to_string();
    if !is_email_available(&email, &filter, &cache, store.get_ref()).await? {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        AppError::Internal(e.to_string())
    })?;

    // A concurrent registration can still win the race; the unique key
    // catches it and it surfaces as the same conflict.
    let admin = store
        .create_admin(NewAdmin {
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            email,
            birth_date: payload.birth_date,
            gender: payload.gender,
            password,
        })
        .await
        .map_err(|e| match AppError::store("Admin", None)(e) {
            AppError::Conflict(_) => AppError::Conflict("Email already registered".into()),
            other => other,
        })?;

    // keep filter and cache in step with the store
    filter.insert(&admin.email);
    cache.mark_taken(&admin.email).await;

    info!(admin_id = admin.id, "Admin registered");
    Ok(created("Admin registered successfully", admin))
}

#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Login successful", body = Object),
        (status = 401, description = "Invalid credentials", body = Object)
    ),
    tag = "Admin"
)]
#[instrument(
    name = "auth_login",
    skip(store, config, payload),
    fields(email = %payload.email)
)]
pub async fn login(
    payload: web::Json<LoginReqDto>,
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    // 1️⃣ Basic validation
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        info!("Validation failed: empty email or password");
        return Err(AppError::BadRequest("Email and password are required".into()));
    }

    debug!("Fetching admin from store");

    // 2️⃣ Fetch admin
    let admin = match store
        .find_admin_by_email(payload.email.trim())
        .await
        .map_err(AppError::store("Admin", None))?
    {
        Some(admin) => admin,
        None => {
            warn!("Admin not found");
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }
    };

    // 3️⃣ Verify password
    if verify_password(&payload.password, &admin.password).is_err() {
        warn!(admin_id = admin.id, "Invalid password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    // 4️⃣ Issue access token
    let access_token = generate_access_token(
        admin.id,
        admin.email.clone(),
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to sign access token");
        AppError::Internal(e.to_string())
    })?;

    info!(admin_id = admin.id, "Login successful");
    Ok(ok(
        "Login successful",
        LoginResponse {
            user: admin,
            access_token,
        },
    ))
}
