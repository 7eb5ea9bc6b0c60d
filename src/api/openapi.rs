#![allow(clippy::needless_for_each)]

#[allow(unused_imports)]
use super::handlers::{
    admin::__path_get_user, get_user, health, health::__path_health, login, login::__path_login,
    logout, logout::__path_logout, me, me::__path_me, register, register::__path_register, types,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(health, register, login, logout, me, get_user),
    components(
        schemas(
            health::Health,
            types::Credentials,
            types::UserResponse,
            types::MeResponse,
            types::MessageResponse,
            crate::store::Role,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Registration, login and cookie sessions"),
        (name = "admin", description = "Admin-only account lookups"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
