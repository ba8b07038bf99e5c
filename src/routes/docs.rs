use axum::Router;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::api_doc, state::SharedState};

/// Path of the generated OpenAPI document.
pub const OPENAPI_PATH: &str = "/api-doc/openapi.json";

/// Swagger UI under `/docs`, reading the document served at [`OPENAPI_PATH`].
pub fn router(state: SharedState) -> Router<SharedState> {
    let ui: Router<SharedState> = SwaggerUi::new("/docs").url(OPENAPI_PATH, api_doc()).into();
    ui.with_state(state)
}
