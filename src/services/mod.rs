/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Outbound room-channel broadcasts and toasts.
pub mod room_events;
/// Turn/order command handling and persistence orchestration.
pub mod room_service;
/// Storage supervisor with reconnect backoff and degraded mode.
pub mod storage_supervisor;
/// Per-player timer subsystem.
pub mod timer_service;
/// WebSocket connection and command dispatch.
pub mod websocket_service;
