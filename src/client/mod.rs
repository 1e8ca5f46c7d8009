// Backend HTTP client module
// Author: kelexine (https://github.com/kelexine)

mod http;
pub mod session;

pub use http::{ApiClient, Query};
pub use session::{watch_expiry, Session, SessionEvent, SessionState};
