pub mod datasets;
pub mod request;
pub mod stats;
pub mod theme;

pub use datasets::*;
pub use request::*;
pub use stats::*;
pub use theme::*;
