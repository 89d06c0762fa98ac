//! OpenAPI documentation for the monitoring API.
//!
//! A single [`ApiDoc`] covers every route under `/api/*`. The generated
//! document is served at `/api-docs/openapi.json` and rendered by Scalar
//! at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;

/// Registers the two ways a caller can authenticate: the `Authorization`
/// header (`Token <key>`) and the session cookie set by login/register.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "token".to_string(),
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "Token authentication. Send the key issued at registration or login:\n\n\
                    ```\nAuthorization: Token YOUR_KEY\n```",
                ))),
            );
            components.security_schemes.insert(
                "session_cookie".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "auth_token",
                    "Session cookie set by `/api/register/` and `/api/login/`. \
                    Browsers send it automatically on subsequent requests.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    servers(
        (url = "/", description = "Monitoring API server")
    ),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::user_info,
        api::handlers::auth::csrf,
        api::handlers::water_units::list_water_units,
        api::handlers::water_units::create_water_unit,
        api::handlers::water_units::get_water_unit,
        api::handlers::water_units::update_water_unit,
        api::handlers::water_units::delete_water_unit,
        api::handlers::water_quality::list_water_quality,
        api::handlers::water_quality::create_water_quality,
        api::handlers::water_quality::get_water_quality,
        api::handlers::water_quality::update_water_quality,
        api::handlers::water_quality::delete_water_quality,
        api::handlers::maintenance::list_maintenance,
        api::handlers::maintenance::create_maintenance,
        api::handlers::maintenance::get_maintenance,
        api::handlers::maintenance::update_maintenance,
        api::handlers::maintenance::delete_maintenance,
    ),
    components(
        schemas(
            api::models::auth::RegisterRequest,
            api::models::auth::LoginRequest,
            api::models::auth::RegisterInfo,
            api::models::auth::LoginInfo,
            api::models::auth::LogoutInfo,
            api::models::auth::CsrfInfo,
            api::models::maintainers::MaintainerResponse,
            api::models::water_units::WaterUnitCreate,
            api::models::water_units::WaterUnitUpdate,
            api::models::water_units::WaterUnitResponse,
            api::models::water_quality::WaterQualityCreate,
            api::models::water_quality::WaterQualityUpdate,
            api::models::water_quality::WaterQualityResponse,
            api::models::maintenance::MaintenanceCreate,
            api::models::maintenance::MaintenanceUpdate,
            api::models::maintenance::MaintenanceResponse,
        )
    ),
    tags(
        (name = "authentication", description = "Register, log in and out, and inspect the current maintainer.

Registration and login both issue an opaque token, returned in the `auth_token` cookie. API clients can instead send it as `Authorization: Token <key>`."),
        (name = "water-unit", description = "Monitored water units (a physical installation at a location).

Reads are open; creating, updating and deleting require authentication."),
        (name = "water-quality", description = "TDS readings recorded against a water unit.

Timestamps are assigned by the server when the reading is stored. Lists support filtering by unit, value range and date, plus ordering."),
        (name = "maintenance", description = "Maintenance reports filed against a water unit.

Reports are attributed to the maintainer who files them. Lists support filtering by unit, maintainer, date and problem text."),
    ),
    info(
        title = "aquamon API",
        description = "CRUD and authentication backend for water-monitoring units.

## Authentication

`GET`, `HEAD` and `OPTIONS` requests are open. All other methods require a
maintainer token, sent either as a header:

```
Authorization: Token YOUR_KEY
```

or via the `auth_token` session cookie issued by `/api/register/` and
`/api/login/`.

## Errors

Validation failures return `400` with a map of field names to messages:

```json
{
  \"location\": [\"This field is required.\"]
}
```

Missing resources return `404` with a `detail` message.",
    ),
)]
pub struct ApiDoc;
