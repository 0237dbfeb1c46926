pub mod roles;
pub mod status;

pub use roles::UserRole;
pub use status::{BookingStatus, ListingType, PaymentStatus};
