// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (bearer token scoped to one company)
pub mod protected;
pub mod public;
