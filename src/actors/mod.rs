pub mod coordinator;
pub mod error;
pub mod session;

pub use coordinator::CoordinatorService;
pub use error::{CoordinatorError, SessionError};
pub use session::SessionService;
