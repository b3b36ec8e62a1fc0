// Public handlers: service metadata, liveness and CSV templates
pub mod root;
pub mod templates;

pub use root::{health, root};
pub use templates::csv_template;
