use std::fmt;

/// Basic-auth credentials for the Jenkins API.
///
/// Jenkins accepts either the account password or an API token as the basic-auth
/// secret. When both are configured the token is used.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    secret: String,
}

impl Credentials {
    /// Returns `None` when no username or no secret is configured.
    pub fn resolve(
        username: Option<&str>,
        password: Option<&str>,
        token: Option<&str>,
    ) -> Option<Self> {
        let username = username.filter(|u| !u.is_empty())?;
        let secret = token
            .filter(|t| !t.is_empty())
            .or_else(|| password.filter(|p| !p.is_empty()))?;

        Some(Self {
            username: username.to_string(),
            secret: secret.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

// Never print the secret.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"***")
            .finish()
    }
}
