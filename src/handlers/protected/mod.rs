// handlers/protected/mod.rs - bearer-authenticated handlers
//
// Every route here runs behind `middleware::require_bearer`, which injects
// `AuthCompany`. Handlers check the path company against it before touching
// any store.
pub mod auth;
pub mod companies;
pub mod dashboard;
pub mod insights;
pub mod kpi;
