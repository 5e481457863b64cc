//! Demo sign-in: three fixed accounts sharing one password.

use crate::error::{PortalError, PortalResult};
use crate::model::{Role, User};

pub const DEMO_PASSWORD: &str = "demo123";

const DEMO_USERS: [(&str, &str, &str, Role); 3] = [
    ("1", "student@demo.com", "Demo Student", Role::Student),
    ("2", "teacher@demo.com", "Demo Teacher", Role::Teacher),
    ("3", "admin@demo.com", "Demo Admin", Role::Admin),
];

pub fn demo_users() -> Vec<User> {
    DEMO_USERS
        .iter()
        .map(|(id, email, name, role)| User {
            id: id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role: *role,
        })
        .collect()
}

/// Exact email match; every demo account uses [`DEMO_PASSWORD`].
pub fn authenticate(email: &str, password: &str) -> PortalResult<User> {
    demo_users()
        .into_iter()
        .find(|u| u.email == email)
        .filter(|_| password == DEMO_PASSWORD)
        .ok_or(PortalError::InvalidCredentials)
}

pub fn landing_path(role: Role) -> &'static str {
    match role {
        Role::Student => "/student/dashboard",
        Role::Teacher => "/teacher/dashboard",
        Role::Admin => "/admin/dashboard",
    }
}

pub fn require_role(user: Option<&User>, role: Role) -> PortalResult<&User> {
    let user = user.ok_or(PortalError::Unauthenticated)?;
    if user.role != role {
        return Err(PortalError::Forbidden { required: role });
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_demo_login_lands_on_dashboard() {
        let u = authenticate("student@demo.com", "demo123").expect("login");
        assert_eq!(u.role, Role::Student);
        assert_eq!(landing_path(u.role), "/student/dashboard");
    }

    #[test]
    fn wrong_password_or_unknown_email_fails() {
        for (email, pw) in [
            ("student@demo.com", "demo1234"),
            ("student@demo.com", ""),
            ("Student@demo.com", "demo123"),
            ("nobody@demo.com", "demo123"),
        ] {
            let e = authenticate(email, pw).unwrap_err();
            assert_eq!(e.code(), "invalid_credentials", "{email}/{pw}");
        }
    }

    #[test]
    fn role_guard() {
        let teacher = authenticate("teacher@demo.com", DEMO_PASSWORD).expect("login");
        assert!(require_role(Some(&teacher), Role::Teacher).is_ok());
        assert_eq!(
            require_role(Some(&teacher), Role::Admin).unwrap_err().code(),
            "forbidden"
        );
        assert_eq!(
            require_role(None, Role::Admin).unwrap_err().code(),
            "unauthenticated"
        );
    }
}
