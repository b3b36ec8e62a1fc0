//! Company profiles and sign-in state. The profile feeds insight generation;
//! `isActive` gates every bearer-authenticated request.

pub mod model;
pub mod store;

pub use model::{Company, CompanyProfile};
pub use store::CompanyStore;
