//! Users API handlers.
//!
//! ```text
//! GET    /api/users
//! GET    /api/users/{id}
//! GET    /api/users/username/{username}
//! POST   /api/users {"username":"ada","email":"ada@example.com","age":36}
//! DELETE /api/users/{id}
//! DELETE /api/users
//! ```
//!
//! Every success body carries `"success": true`; failures use the error
//! envelope from [`crate::inbound::http::error`].

use actix_web::{HttpResponse, delete, get, post, web};
use serde::Serialize;

use crate::domain::registration_service::USER_NOT_FOUND;
use crate::domain::{Error, RegistrationRequest, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    CreatedUserResponseSchema, ErrorSchema, MessageResponseSchema, RegistrationRequestSchema,
    UserListResponseSchema, UserResponseSchema,
};
use crate::inbound::http::state::HttpState;

/// Confirmation returned after a successful create.
pub const USER_CREATED: &str = "User created successfully";
/// Confirmation returned after deleting one user.
pub const USER_DELETED: &str = "User deleted successfully";
/// Confirmation returned after deleting every user.
pub const ALL_USERS_DELETED: &str = "All users deleted successfully";

/// Body of `GET /api/users`.
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    success: bool,
    users: Vec<User>,
}

/// Body of single-user lookups.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    success: bool,
    user: User,
}

/// Body of `POST /api/users`.
#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    success: bool,
    message: &'static str,
    user: User,
}

/// Body of acknowledgement-only responses.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    success: bool,
    message: &'static str,
}

impl MessageResponse {
    fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

/// Path segments that do not parse as an id can never name a stored user.
fn parse_user_id(raw: &str) -> Option<UserId> {
    raw.parse().ok()
}

/// List registered users, newest first.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users", body = UserListResponseSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<UserListResponse>> {
    let users = state.users.list_users().await?;
    Ok(web::Json(UserListResponse {
        success: true,
        users,
    }))
}

/// Fetch one user by id.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "Store-assigned user id")),
    responses(
        (status = 200, description = "User", body = UserResponseSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = parse_user_id(&path).ok_or_else(|| Error::not_found(USER_NOT_FOUND))?;
    let user = state.users.get_user(id).await?;
    Ok(web::Json(UserResponse {
        success: true,
        user,
    }))
}

/// Fetch one user by exact username.
#[utoipa::path(
    get,
    path = "/api/users/username/{username}",
    params(("username" = String, Path, description = "Exact username")),
    responses(
        (status = 200, description = "User", body = UserResponseSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUserByUsername"
)]
#[get("/users/username/{username}")]
pub async fn get_user_by_username(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.users.get_user_by_username(&path).await?;
    Ok(web::Json(UserResponse {
        success: true,
        user,
    }))
}

/// Validate and register a new user.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegistrationRequestSchema,
    responses(
        (status = 201, description = "User created", body = CreatedUserResponseSchema),
        (status = 400, description = "Missing field or age out of range", body = ErrorSchema),
        (status = 409, description = "Username or email already exists", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<RegistrationRequest>,
) -> ApiResult<HttpResponse> {
    let user = state.users.create_user(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(CreatedUserResponse {
        success: true,
        message: USER_CREATED,
        user,
    }))
}

/// Delete one user. Absent ids succeed as a no-op.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "Store-assigned user id")),
    responses(
        (status = 200, description = "Deleted or already absent", body = MessageResponseSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    if let Some(id) = parse_user_id(&path) {
        state.users.delete_user(id).await?;
    }
    Ok(web::Json(MessageResponse::ok(USER_DELETED)))
}

/// Delete every user.
#[utoipa::path(
    delete,
    path = "/api/users",
    responses(
        (status = 200, description = "All users deleted", body = MessageResponseSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteAllUsers"
)]
#[delete("/users")]
pub async fn delete_all_users(state: web::Data<HttpState>) -> ApiResult<web::Json<MessageResponse>> {
    state.users.delete_all_users().await?;
    Ok(web::Json(MessageResponse::ok(ALL_USERS_DELETED)))
}

/// Register every users route under the caller's scope.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use user_registry::inbound::http::users;
///
/// let app = App::new().service(web::scope("/api").configure(users::configure));
/// # drop(app);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(get_user_by_username)
        .service(get_user)
        .service(create_user)
        .service(delete_all_users)
        .service(delete_user);
}

#[cfg(test)]
mod tests;
