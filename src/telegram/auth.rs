use std::collections::HashSet;

use teloxide::types::UserId;
use tracing::warn;

/// Allowlist of Telegram user IDs permitted to issue commands.
#[derive(Clone)]
pub struct AuthorizedUsers {
    users: HashSet<UserId>,
}

impl AuthorizedUsers {
    pub fn new(user_ids: Vec<u64>) -> Self {
        Self {
            users: user_ids.into_iter().map(UserId).collect(),
        }
    }

    pub fn is_authorized(&self, user_id: &UserId) -> bool {
        self.users.contains(user_id)
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Parse a comma-separated allowlist (e.g. "123456,789012").
    pub fn from_list(raw: &str) -> anyhow::Result<Self> {
        if raw.trim().is_empty() {
            warn!("No authorized users configured; every command will be rejected");
            return Ok(Self {
                users: HashSet::new(),
            });
        }

        let user_ids: Result<Vec<u64>, _> = raw
            .split(',')
            .map(|s| s.trim().parse::<u64>())
            .collect();

        match user_ids {
            Ok(ids) => Ok(Self::new(ids)),
            Err(err) => Err(anyhow::anyhow!("failed to parse authorized user IDs: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_comma_separated_ids() {
        let users = AuthorizedUsers::from_list("123456, 789012").unwrap();
        assert!(users.is_authorized(&UserId(123456)));
        assert!(users.is_authorized(&UserId(789012)));
        assert!(!users.is_authorized(&UserId(42)));
    }

    #[test]
    fn test_empty_list_authorizes_nobody() {
        let users = AuthorizedUsers::from_list("  ").unwrap();
        assert!(users.is_empty());
        assert!(!users.is_authorized(&UserId(1)));
    }

    #[test]
    fn test_rejects_malformed_ids() {
        assert!(AuthorizedUsers::from_list("123,abc").is_err());
    }
}
