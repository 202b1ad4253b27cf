use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

use tracing::{debug, error, info, warn};

use super::token::SecurityError;

/// Default number of revoked tokens kept at once
pub const DEFAULT_MAX_SIZE: usize = 10_000;

/// Revoked token ids with their natural expiry.
///
/// Entries are only needed until the token would have expired anyway, so
/// cleanup drops anything past its expiry. Unexpired entries are never
/// evicted: when the map is full and nothing has expired, the revocation is
/// refused with [`SecurityError::RevocationCapacity`].
#[derive(Debug)]
pub struct TokenBlacklist {
    /// jti -> expiration
    revoked_tokens: Mutex<HashMap<String, SystemTime>>,

    /// Maximum number of live revocations
    max_size: usize,
}

impl Default for TokenBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenBlacklist {
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_SIZE)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            revoked_tokens: Mutex::new(HashMap::new()),
            max_size: max_size.max(1),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, SystemTime>> {
        // A panic while holding the lock cannot leave the map inconsistent
        self.revoked_tokens.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Revoke `token_id` until `expiration`
    pub fn revoke_token(&self, token_id: &str, expiration: SystemTime) -> Result<(), SecurityError> {
        let mut tokens = self.entries();

        if tokens.len() >= self.max_size && !tokens.contains_key(token_id) {
            warn!("Token blacklist reached max size ({}), removing expired entries", self.max_size);
            Self::cleanup_expired(&mut tokens);

            if tokens.len() >= self.max_size {
                error!(
                    "Token blacklist is full with {} unexpired revocations, refusing to revoke {}",
                    tokens.len(),
                    token_id
                );
                return Err(SecurityError::RevocationCapacity);
            }
        }

        tokens.insert(token_id.to_string(), expiration);
        info!("Token revoked: {}", token_id);
        Ok(())
    }

    pub fn is_revoked(&self, token_id: &str) -> bool {
        self.entries().contains_key(token_id)
    }

    pub fn size(&self) -> usize {
        self.entries().len()
    }

    /// Remove expired tokens, returning how many were removed
    pub fn cleanup_expired_tokens(&self) -> usize {
        let mut tokens = self.entries();
        Self::cleanup_expired(&mut tokens)
    }

    fn cleanup_expired(tokens: &mut HashMap<String, SystemTime>) -> usize {
        let now = SystemTime::now();
        let before_count = tokens.len();

        tokens.retain(|_, expiration| *expiration > now);

        let removed = before_count - tokens.len();
        if removed > 0 {
            debug!("Removed {} expired tokens from blacklist", removed);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_revoke_and_check_token() {
        let blacklist = TokenBlacklist::new();
        blacklist.revoke_token("jti-1", SystemTime::now() + Duration::from_secs(60)).unwrap();

        assert!(blacklist.is_revoked("jti-1"));
        assert!(!blacklist.is_revoked("jti-2"));
    }

    #[test]
    fn test_cleanup_expired_tokens() {
        let blacklist = TokenBlacklist::new();
        blacklist.revoke_token("expired", SystemTime::now() - Duration::from_secs(1)).unwrap();
        blacklist.revoke_token("valid", SystemTime::now() + Duration::from_secs(60)).unwrap();
        assert_eq!(blacklist.size(), 2);

        assert_eq!(blacklist.cleanup_expired_tokens(), 1);
        assert!(!blacklist.is_revoked("expired"));
        assert!(blacklist.is_revoked("valid"));
    }

    #[test]
    fn test_full_blacklist_keeps_unexpired_revocations() {
        let blacklist = TokenBlacklist::with_max_size(3);
        for i in 0..3 {
            blacklist
                .revoke_token(&format!("token-{}", i), SystemTime::now() + Duration::from_secs(300))
                .unwrap();
        }

        assert_eq!(
            blacklist.revoke_token("new-token", SystemTime::now() + Duration::from_secs(300)),
            Err(SecurityError::RevocationCapacity)
        );
        assert_eq!(blacklist.size(), 3);
        for i in 0..3 {
            assert!(blacklist.is_revoked(&format!("token-{}", i)));
        }
        assert!(!blacklist.is_revoked("new-token"));

        // Revoking an already listed token is still accepted
        assert!(blacklist
            .revoke_token("token-0", SystemTime::now() + Duration::from_secs(300))
            .is_ok());
    }

    #[test]
    fn test_full_blacklist_makes_room_from_expired_entries() {
        let blacklist = TokenBlacklist::with_max_size(2);
        blacklist.revoke_token("expired", SystemTime::now() - Duration::from_secs(1)).unwrap();
        blacklist.revoke_token("valid", SystemTime::now() + Duration::from_secs(60)).unwrap();

        blacklist.revoke_token("new-token", SystemTime::now() + Duration::from_secs(60)).unwrap();

        assert_eq!(blacklist.size(), 2);
        assert!(!blacklist.is_revoked("expired"));
        assert!(blacklist.is_revoked("valid"));
        assert!(blacklist.is_revoked("new-token"));
    }
}
