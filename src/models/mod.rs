pub mod record;
pub mod request;
pub mod response;
pub mod snapshot;

pub use record::*;
pub use request::*;
pub use response::*;
pub use snapshot::*;
