use basera_shared::{BookingStatus, PaymentStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{CoreError, CoreResult};

pub const MIN_QUANTITY: i32 = 1;
pub const MAX_QUANTITY: i32 = 5;

/// A booking ties a user to a listing. The amount is fixed at creation time
/// from the listing's price and never recomputed, even if the listing price
/// changes later.
#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub status: BookingStatus,
    pub quantity: i32,
    pub amount_minor: i64,
    pub payment_reference: Option<String>,
    pub payment_screenshot: Option<String>,
    pub payment_verified: bool,
    pub payment_status: PaymentStatus,
    pub payment_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn new(
        listing_id: Uuid,
        user_id: Uuid,
        quantity: i32,
        price_minor: i64,
        payment_reference: Option<String>,
        payment_screenshot: Option<String>,
    ) -> CoreResult<Self> {
        validate_quantity(quantity)?;
        Ok(Self {
            id: Uuid::new_v4(),
            listing_id,
            user_id,
            status: BookingStatus::Pending,
            quantity,
            amount_minor: compute_amount(price_minor, quantity),
            payment_reference,
            payment_screenshot,
            payment_verified: false,
            payment_status: PaymentStatus::Pending,
            payment_verified_at: None,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    pub fn apply_payment_review(&mut self, effect: &PaymentReviewEffect) {
        self.payment_status = effect.payment_status;
        self.payment_verified = effect.payment_verified;
        self.status = effect.booking_status;
        self.payment_verified_at = effect.payment_verified_at;
        self.updated_at = Some(effect.reviewed_at);
    }
}

/// A booking joined with the user and listing it references, for lister and
/// admin management views.
#[derive(Debug, Clone, Serialize)]
pub struct BookingWithContext {
    #[serde(flatten)]
    pub booking: Booking,
    pub user_email: String,
    pub user_name: String,
    pub user_phone: Option<String>,
    pub listing_name: String,
    pub listing_type: basera_shared::ListingType,
}

pub fn validate_quantity(quantity: i32) -> CoreResult<()> {
    if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
        return Err(CoreError::Validation(format!(
            "Quantity must be between {} and {}",
            MIN_QUANTITY, MAX_QUANTITY
        )));
    }
    Ok(())
}

pub fn compute_amount(price_minor: i64, quantity: i32) -> i64 {
    price_minor * quantity as i64
}

/// The write set an admin payment review produces. Review outcomes override
/// the booking status: verified bookings are accepted, fake payments cancel
/// the booking, and resetting the review returns the booking to pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReviewEffect {
    pub payment_status: PaymentStatus,
    pub payment_verified: bool,
    pub booking_status: BookingStatus,
    pub payment_verified_at: Option<DateTime<Utc>>,
    pub reviewed_at: DateTime<Utc>,
}

pub fn review_payment(payment_status: PaymentStatus, now: DateTime<Utc>) -> PaymentReviewEffect {
    match payment_status {
        PaymentStatus::Verified => PaymentReviewEffect {
            payment_status,
            payment_verified: true,
            booking_status: BookingStatus::Accepted,
            payment_verified_at: Some(now),
            reviewed_at: now,
        },
        PaymentStatus::Fake => PaymentReviewEffect {
            payment_status,
            payment_verified: false,
            booking_status: BookingStatus::Cancelled,
            payment_verified_at: None,
            reviewed_at: now,
        },
        PaymentStatus::Pending => PaymentReviewEffect {
            payment_status,
            payment_verified: false,
            booking_status: BookingStatus::Pending,
            payment_verified_at: None,
            reviewed_at: now,
        },
    }
}

/// Statuses a lister may set on bookings for their listings. Transitions
/// among these are unrestricted; cancelled and pending are not lister moves.
pub fn validate_lister_status(status: BookingStatus) -> CoreResult<()> {
    match status {
        BookingStatus::Accepted | BookingStatus::Rejected | BookingStatus::Waitlist => Ok(()),
        other => Err(CoreError::Validation(format!(
            "Invalid status '{}'. Must be: accepted, rejected, or waitlist",
            other
        ))),
    }
}
