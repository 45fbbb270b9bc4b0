use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{KernelError, Rejection};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "user")]
    Student,
    Librarian,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Librarian => "librarian",
            Role::Admin => "admin",
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Librarian | Role::Admin)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = error_stack::Report<KernelError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            // older accounts were stored with "user"
            "student" | "user" => Ok(Role::Student),
            "librarian" => Ok(Role::Librarian),
            "admin" => Ok(Role::Admin),
            other => Err(KernelError::Internal.because(format!("Unknown role: {other}"))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Role;

    #[test]
    fn legacy_user_role_reads_as_student() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::Student);
        assert_eq!("student".parse::<Role>().unwrap(), Role::Student);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn round_trips_through_its_name() {
        for role in [Role::Student, Role::Librarian, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }
}
