pub mod cost;
pub mod credentials;
pub mod session;

pub use cost::CostRecord;
pub use credentials::Credentials;
pub use session::{STATUS_SIGNED_IN, STATUS_SIGNED_OUT, Session};
