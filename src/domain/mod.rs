pub mod user;
pub mod appointment;
pub mod bill;

pub use user::*;
pub use appointment::*;
pub use bill::*;
