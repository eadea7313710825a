//! Credential and principal models.
//!
//! A [`Credential`] is what the credential store keeps: a username, the
//! encoded password and the granted roles. A [`User`] is the principal derived
//! from it once a session is established; it never carries the password hash.

use std::fmt;

/// A stored username/password/role record used to verify login attempts.
///
/// # Example
/// ```
/// use access_gate_core::http::security::Credential;
///
/// let credential = Credential::with_encoded_password("user", "{noop}password".to_string())
///     .roles(&["USER"]);
///
/// assert_eq!(credential.get_username(), "user");
/// assert!(credential.has_role("USER"));
/// ```
#[derive(Clone, Debug)]
pub struct Credential {
    username: String,
    password_hash: String,
    roles: Vec<String>,
}

impl Credential {
    /// Creates a credential from a username and an already encoded password.
    pub fn with_encoded_password(username: &str, encoded_password: String) -> Self {
        Credential {
            username: username.to_string(),
            password_hash: encoded_password,
            roles: Vec::new(),
        }
    }

    /// Adds roles (builder pattern). Duplicates are ignored.
    pub fn roles(mut self, roles: &[&str]) -> Self {
        for role in roles {
            if !self.has_role(role) {
                self.roles.push(role.to_string());
            }
        }
        self
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    /// Returns the encoded password.
    pub fn get_password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn get_roles(&self) -> &[String] {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// The authenticated principal attached to a request.
///
/// Handlers receive it through the `AuthenticatedUser` and `OptionalUser`
/// extractors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    username: String,
    roles: Vec<String>,
}

impl User {
    pub fn new(username: String, roles: Vec<String>) -> Self {
        User { username, roles }
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn get_roles(&self) -> &[String] {
        &self.roles
    }

    /// Checks if the user has a specific role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Checks if the user has ANY of the specified roles (OR logic).
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }
}

impl From<&Credential> for User {
    fn from(credential: &Credential) -> Self {
        User::new(credential.username.clone(), credential.roles.clone())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User {{ username: {}, roles: {:?} }}", self.username, self.roles)
    }
}
