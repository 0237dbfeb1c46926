use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account roles. Lister roles match the listing categories they may publish.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Hostel,
    Coaching,
    Library,
    Tiffin,
    Admin,
}

impl UserRole {
    /// Roles allowed to publish listings (subject to admin approval).
    pub fn is_lister(&self) -> bool {
        matches!(
            self,
            UserRole::Hostel | UserRole::Coaching | UserRole::Library | UserRole::Tiffin
        )
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserRole::Student => "student",
            UserRole::Hostel => "hostel",
            UserRole::Coaching => "coaching",
            UserRole::Library => "library",
            UserRole::Tiffin => "tiffin",
            UserRole::Admin => "admin",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(UserRole::Student),
            "hostel" => Ok(UserRole::Hostel),
            "coaching" => Ok(UserRole::Coaching),
            "library" => Ok(UserRole::Library),
            "tiffin" => Ok(UserRole::Tiffin),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lister_roles() {
        assert!(UserRole::Hostel.is_lister());
        assert!(UserRole::Tiffin.is_lister());
        assert!(!UserRole::Student.is_lister());
        assert!(!UserRole::Admin.is_lister());
    }

    #[test]
    fn role_round_trip() {
        for role in [
            UserRole::Student,
            UserRole::Hostel,
            UserRole::Coaching,
            UserRole::Library,
            UserRole::Tiffin,
            UserRole::Admin,
        ] {
            assert_eq!(role.to_string().parse::<UserRole>(), Ok(role));
        }
        assert!("landlord".parse::<UserRole>().is_err());
    }
}
