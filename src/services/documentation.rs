use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Alfavit Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::ws::ClientCommand,
            crate::dto::ws::ServerMessage,
            crate::dto::ws::PlayerInput,
            crate::dto::room::RoomSnapshot,
            crate::dto::room::PlayerSnapshot,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rooms", description = "WebSocket operations for room participants"),
    )
)]
pub struct ApiDoc;
