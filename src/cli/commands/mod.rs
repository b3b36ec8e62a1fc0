pub mod company;
pub mod ingest;
pub mod revocations;
pub mod token;
