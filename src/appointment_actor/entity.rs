use crate::collection_actor::Record;
use crate::domain::{Appointment, AppointmentFilter};

impl Record for Appointment {
    type Id = String;
    type Filter = AppointmentFilter;

    fn id(&self) -> &String {
        &self.id
    }

    fn matches(&self, filter: &AppointmentFilter) -> bool {
        match filter {
            AppointmentFilter::All => true,
            AppointmentFilter::Status(status) => self.status == *status,
        }
    }

    /// Accepts a server-confirmed update of this appointment.
    ///
    /// A terminal status (completed, cancelled, missed) never transitions
    /// again; a confirmation that claims otherwise is rejected here even if it
    /// came back from the server.
    fn apply(&mut self, update: Self) -> Result<(), String> {
        if self.status != update.status && !self.status.can_transition_to(update.status) {
            return Err(format!(
                "appointment {} cannot move from {} to {}",
                self.id, self.status, update.status
            ));
        }
        *self = update;
        Ok(())
    }
}
