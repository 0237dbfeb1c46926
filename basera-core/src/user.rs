use basera_shared::UserRole;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A marketplace account. Accounts start inactive and unverified; the
/// email-verification flow flips both flags. `is_approved_lister` is granted
/// by an admin and gates listing creation on top of the role check.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub is_verified_email: bool,
    pub is_approved_lister: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub profile_image: Option<String>,
    pub otp_code: Option<String>,
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(email: String, password_hash: String, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            role,
            is_active: false,
            is_verified_email: false,
            is_approved_lister: false,
            first_name: None,
            last_name: None,
            phone_number: None,
            address: None,
            city: None,
            state: None,
            pincode: None,
            profile_image: None,
            otp_code: None,
            otp_expires_at: None,
            date_joined: Utc::now(),
            last_login: None,
            updated_at: None,
        }
    }

    /// Display name for rosters; falls back to the email.
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    /// Whether the pending OTP matches and has not expired.
    pub fn otp_matches(&self, code: &str, now: DateTime<Utc>) -> bool {
        match (&self.otp_code, self.otp_expires_at) {
            (Some(expected), Some(expires_at)) => expected == code && now < expires_at,
            _ => false,
        }
    }
}

/// Self-service profile changes. Only provided fields are written.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub profile_image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn display_name_falls_back_to_email() {
        let mut user = User::new(
            "asha@example.com".into(),
            "hash".into(),
            UserRole::Student,
        );
        assert_eq!(user.display_name(), "asha@example.com");

        user.first_name = Some("Asha".into());
        user.last_name = Some("Verma".into());
        assert_eq!(user.display_name(), "Asha Verma");
    }

    #[test]
    fn otp_match_requires_code_and_freshness() {
        let now = Utc::now();
        let mut user = User::new("a@b.c".into(), "hash".into(), UserRole::Student);
        assert!(!user.otp_matches("123456", now));

        user.otp_code = Some("123456".into());
        user.otp_expires_at = Some(now + Duration::minutes(10));
        assert!(user.otp_matches("123456", now));
        assert!(!user.otp_matches("654321", now));
        assert!(!user.otp_matches("123456", now + Duration::minutes(11)));
    }
}
