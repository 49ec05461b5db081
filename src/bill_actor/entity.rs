use crate::collection_actor::Record;
use crate::domain::{Bill, BillFilter};

impl Record for Bill {
    type Id = String;
    type Filter = BillFilter;

    fn id(&self) -> &String {
        &self.id
    }

    fn matches(&self, filter: &BillFilter) -> bool {
        match filter {
            BillFilter::All => true,
            BillFilter::Paid => self.paid,
            BillFilter::Unpaid => !self.paid,
        }
    }

    /// Accepts a server-confirmed update of this bill.
    ///
    /// A paid bill is immutable except for the paid timestamp; in particular
    /// `paid` never reverts to false.
    fn apply(&mut self, update: Self) -> Result<(), String> {
        if self.paid {
            if !update.paid {
                return Err(format!("bill {} is paid and cannot revert to unpaid", self.id));
            }
            self.date_paid = update.date_paid;
            return Ok(());
        }
        *self = update;
        Ok(())
    }
}
