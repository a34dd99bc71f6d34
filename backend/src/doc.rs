//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: the users endpoints, the registration page and health probes
//! - **Schemas**: domain type wrappers ([`ErrorSchema`], [`ErrorCodeSchema`],
//!   [`UserSchema`], [`RegistrationRequestSchema`]) plus the success
//!   envelopes, so domain types stay free of utoipa derives
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{
    CreatedUserResponseSchema, ErrorCodeSchema, ErrorSchema, MessageResponseSchema,
    RegistrationRequestSchema, UserListResponseSchema, UserResponseSchema, UserSchema,
};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User registry API",
        description = "Register, look up and delete users stored in an embedded SQLite file.",
        license(name = "ISC", url = "https://opensource.org/license/isc-license-txt")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::get_user_by_username,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::delete_all_users,
        crate::inbound::http::form::index,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserSchema,
        RegistrationRequestSchema,
        ErrorSchema,
        ErrorCodeSchema,
        UserListResponseSchema,
        UserResponseSchema,
        CreatedUserResponseSchema,
        MessageResponseSchema
    )),
    tags(
        (name = "users", description = "User registration and lookup"),
        (name = "form", description = "Browser registration page"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure and path registration.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const USER_SCHEMA_NAME: &str = "crate.domain.User";
    const REQUEST_SCHEMA_NAME: &str = "crate.domain.RegistrationRequest";

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case(ERROR_SCHEMA_NAME, &["success", "code", "message", "traceId"])]
    #[case(USER_SCHEMA_NAME, &["id", "username", "email", "age", "created_at"])]
    #[case(REQUEST_SCHEMA_NAME, &["username", "email", "age"])]
    fn schemas_expose_wire_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");

        for field in fields {
            assert_object_schema_has_field(schema, field);
        }
    }

    #[rstest]
    #[case("/api/users")]
    #[case("/api/users/{id}")]
    #[case("/api/users/username/{username}")]
    #[case("/")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn paths_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn users_collection_documents_every_method() {
        let doc = ApiDoc::openapi();
        let item = doc.paths.paths.get("/api/users").expect("users path");
        assert!(item.get.is_some());
        assert!(item.post.is_some());
        assert!(item.delete.is_some());
    }
}
