#[macro_use]
mod macros;

pub mod appointment_client;
pub mod bill_client;
pub mod coordinator_client;
pub mod session_client;

pub use appointment_client::AppointmentClient;
pub use bill_client::BillClient;
pub use coordinator_client::CoordinatorClient;
pub use session_client::SessionClient;
