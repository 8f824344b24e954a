//! Staff identity
//!
//! The admin is mounted behind the host application's authentication,
//! which forwards the signed-in staff member in request headers. Requests
//! without them are rejected with 401.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AdminError;

/// Header carrying the staff member's email address
pub const STAFF_EMAIL_HEADER: &str = "x-staff-email";

/// Header carrying the staff member's full name
pub const STAFF_NAME_HEADER: &str = "x-staff-name";

/// The staff member making the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffUser {
    /// Email address
    pub email: String,
    /// Full name, may be empty
    pub full_name: String,
}

impl StaffUser {
    /// Mailbox for test sends: `Full Name <email>`, or the bare address
    /// when no name is known
    ///
    /// ```rust
    /// use letterpress::auth::StaffUser;
    ///
    /// let user = StaffUser { email: "ada@example.com".into(), full_name: "Ada Lovelace".into() };
    /// assert_eq!(user.mailbox(), "Ada Lovelace <ada@example.com>");
    /// ```
    #[must_use]
    pub fn mailbox(&self) -> String {
        if self.full_name.trim().is_empty() {
            self.email.clone()
        } else {
            format!("{} <{}>", self.full_name.trim(), self.email)
        }
    }
}

impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
{
    type Rejection = AdminError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .unwrap_or_default()
                .to_string()
        };

        let email = header(STAFF_EMAIL_HEADER);
        if email.is_empty() {
            return Err(AdminError::Unauthorized("staff identity required".to_string()));
        }

        Ok(Self {
            email,
            full_name: header(STAFF_NAME_HEADER),
        })
    }
}
