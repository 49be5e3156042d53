use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// The signed-in operator, as handed over by whatever owns the identity
/// provider exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub groups: Vec<String>,
    #[serde(with = "secret_string")]
    pub access_token: SecretString,
}

impl UserSession {
    pub fn is_in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    pub fn auth_header(&self) -> AuthHeader {
        AuthHeader::bearer(self.access_token.clone())
    }
}

/// Outcome of gating a screen on group membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// No session; the caller should send the operator to sign in.
    Unauthenticated,
    Forbidden { username: String, group: String },
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted)
    }
}

/// Decide whether `session` may see a screen restricted to `group`.
pub fn guard(session: Option<&UserSession>, group: &str) -> Access {
    match session {
        None => Access::Unauthenticated,
        Some(s) if s.is_in_group(group) => Access::Granted,
        Some(s) => Access::Forbidden {
            username: s.username.clone(),
            group: group.to_string(),
        },
    }
}

/// A header to attach to each backend request.
#[derive(Debug, Clone)]
pub struct AuthHeader {
    pub name: String,
    pub value: SecretString,
}

impl AuthHeader {
    pub fn bearer(token: SecretString) -> Self {
        Self {
            name: "Authorization".to_string(),
            value: format!("Bearer {}", token.expose_secret()).into(),
        }
    }
}

mod secret_string {
    use secrecy::SecretString;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use secrecy::ExposeSecret;
        serializer.serialize_str(secret.expose_secret())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(groups: &[&str]) -> UserSession {
        UserSession {
            user_id: "1".into(),
            username: "ops".into(),
            display_name: "Ops".into(),
            groups: groups.iter().map(|g| g.to_string()).collect(),
            access_token: "tok".to_string().into(),
        }
    }

    #[test]
    fn guard_requires_a_session() {
        assert_eq!(guard(None, "dashboard_admin"), Access::Unauthenticated);
    }

    #[test]
    fn guard_checks_group_membership() {
        let admin = session(&["dashboard_admin"]);
        let viewer = session(&["viewers"]);

        assert!(guard(Some(&admin), "dashboard_admin").is_granted());
        assert_eq!(
            guard(Some(&viewer), "dashboard_admin"),
            Access::Forbidden {
                username: "ops".into(),
                group: "dashboard_admin".into(),
            }
        );
    }

    #[test]
    fn bearer_header_wraps_the_access_token() {
        let header = session(&[]).auth_header();
        assert_eq!(header.name, "Authorization");
        assert_eq!(header.value.expose_secret(), "Bearer tok");
    }

    #[test]
    fn session_serializes_the_token() {
        let json = serde_json::to_string(&session(&["a"])).unwrap();
        let back: UserSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back.access_token.expose_secret(), "tok");
    }
}
