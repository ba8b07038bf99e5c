/// Admin service for courses, tournaments, players and groups.
pub mod admin_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Tournament leaderboards and player history.
pub mod leaderboard_service;
/// Scorer workflow: opening a card and confirming holes.
pub mod scorecard_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervision and degraded mode.
pub mod storage_supervisor;

#[cfg(test)]
pub(crate) mod test_support;
