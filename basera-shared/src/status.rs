use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a booking request. Listers move requests between accepted,
/// rejected and waitlist; cancelled is reached by the booking user or by an
/// admin marking the payment fake.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Waitlist,
    Accepted,
    Rejected,
    Cancelled,
}

/// Outcome of the manual admin review of a payment proof.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Verified,
    Fake,
}

/// Listing categories offered on the marketplace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Hostel,
    Coaching,
    Library,
    Tiffin,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Waitlist => "waitlist",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "waitlist" => Ok(BookingStatus::Waitlist),
            "accepted" => Ok(BookingStatus::Accepted),
            "rejected" => Ok(BookingStatus::Rejected),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Verified => "verified",
            PaymentStatus::Fake => "fake",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "verified" => Ok(PaymentStatus::Verified),
            "fake" => Ok(PaymentStatus::Fake),
            other => Err(format!("unknown payment status: {}", other)),
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ListingType::Hostel => "hostel",
            ListingType::Coaching => "coaching",
            ListingType::Library => "library",
            ListingType::Tiffin => "tiffin",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ListingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hostel" => Ok(ListingType::Hostel),
            "coaching" => Ok(ListingType::Coaching),
            "library" => Ok(ListingType::Library),
            "tiffin" => Ok(ListingType::Tiffin),
            other => Err(format!("unknown listing type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Waitlist,
            BookingStatus::Accepted,
            BookingStatus::Rejected,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<BookingStatus>(), Ok(status));
        }
    }

    #[test]
    fn payment_status_round_trip() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Verified,
            PaymentStatus::Fake,
        ] {
            assert_eq!(status.to_string().parse::<PaymentStatus>(), Ok(status));
        }
        assert!("refunded".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn serde_uses_lowercase() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::Waitlist).unwrap(),
            "\"waitlist\""
        );
        assert_eq!(
            serde_json::from_str::<PaymentStatus>("\"fake\"").unwrap(),
            PaymentStatus::Fake
        );
    }
}
