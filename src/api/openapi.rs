//! OpenAPI documentation and schema generation
//!
//! Describes the form endpoint for non-browser clients, using utoipa for
//! compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the report-relay HTTP surface
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation (when enabled)
#[derive(OpenApi)]
#[openapi(
    info(
        title = "report-relay",
        version = "0.1.0",
        description = "Web form that relays shift reports and an optional attachment to a Telegram chat",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Form
        crate::api::routes::show_form,
        crate::api::routes::submit_report,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        // Submission and dispatch types from types.rs
        crate::types::ReportFields,
        crate::types::AttachmentKind,
        crate::types::DispatchReport,
        crate::types::LegOutcome,
        crate::types::Delivery,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "form", description = "Report form - Render the form and submit reports"),
        (name = "system", description = "System endpoints - Health checks and OpenAPI spec"),
    )
)]
pub struct ApiDoc;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_has_paths() {
        let spec = ApiDoc::openapi();

        for path in ["/", "/health", "/openapi.json"] {
            assert!(
                spec.paths.paths.contains_key(path),
                "OpenAPI spec should document {path}"
            );
        }
    }

    #[test]
    fn test_openapi_spec_has_schemas() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("components should be defined");

        for schema in ["ReportFields", "DispatchReport", "LegOutcome", "ApiError"] {
            assert!(
                components.schemas.contains_key(schema),
                "missing schema {schema}"
            );
        }
    }

    #[test]
    fn test_submit_errors_reference_api_error_schema() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let responses = &json["paths"]["/"]["post"]["responses"];

        for status in ["400", "413", "500", "502", "503"] {
            assert_eq!(
                responses[status]["content"]["application/json"]["schema"]["$ref"],
                "#/components/schemas/ApiError",
                "status {status} should document the error body"
            );
        }
    }

    #[test]
    fn test_openapi_spec_has_tags() {
        let spec = ApiDoc::openapi();
        let tags = spec.tags.expect("tags should be defined");
        let tag_names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();

        assert!(tag_names.contains(&"form"), "Should have 'form' tag");
        assert!(tag_names.contains(&"system"), "Should have 'system' tag");
    }

    #[test]
    fn test_openapi_spec_info() {
        let spec = ApiDoc::openapi();

        assert_eq!(spec.info.title, "report-relay");
        assert!(spec.info.description.is_some());
    }

    #[test]
    fn test_openapi_spec_version() {
        let spec = ApiDoc::openapi();

        let json = serde_json::to_value(&spec).expect("Should serialize to JSON");
        let version = json.get("openapi").and_then(|v| v.as_str());
        assert!(
            version.is_some_and(|v| v.starts_with("3.")),
            "Should use OpenAPI 3.x version"
        );
    }
}
