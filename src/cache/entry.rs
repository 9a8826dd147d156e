//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with absolute expiration.

use chrono::{DateTime, Duration, Utc};

// == Cache Entry ==
/// A stored value together with the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The stored bytes
    pub value: Vec<u8>,
    /// Absolute expiration time
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry that expires `ttl` from now.
    ///
    /// Returns `None` for a non-positive TTL: such writes are dropped.
    pub fn with_ttl(value: Vec<u8>, ttl: Duration) -> Option<Self> {
        if ttl <= Duration::zero() {
            return None;
        }
        Some(Self {
            value,
            expires_at: expiry_after(ttl),
        })
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time reaches
    /// `expires_at`. A read is only served while `expires_at` is strictly in
    /// the future.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Same as [`is_expired`](Self::is_expired) against a fixed clock reading.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    // == Time To Live ==
    /// Remaining lifetime, measured now. Negative once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at - Utc::now()
    }
}

/// `now + ttl`, saturating at the latest representable instant.
pub fn expiry_after(ttl: Duration) -> DateTime<Utc> {
    Utc::now()
        .checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::with_ttl(b"test_value".to_vec(), Duration::seconds(60)).unwrap();

        assert_eq!(entry.value, b"test_value");
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_non_positive_ttl() {
        assert!(CacheEntry::with_ttl(b"v".to_vec(), Duration::zero()).is_none());
        assert!(CacheEntry::with_ttl(b"v".to_vec(), Duration::seconds(-5)).is_none());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::with_ttl(b"v".to_vec(), Duration::milliseconds(20)).unwrap();

        assert!(!entry.is_expired());

        sleep(std::time::Duration::from_millis(40));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::with_ttl(b"v".to_vec(), Duration::seconds(10)).unwrap();

        let remaining = entry.ttl_remaining();
        assert!(remaining <= Duration::seconds(10));
        assert!(remaining >= Duration::seconds(9));
    }

    #[test]
    fn test_ttl_remaining_expired_is_negative() {
        let entry = CacheEntry {
            value: b"v".to_vec(),
            expires_at: Utc::now() - Duration::seconds(1),
        };

        assert!(entry.ttl_remaining() < Duration::zero());
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let entry = CacheEntry::with_ttl(b"v".to_vec(), Duration::MAX).unwrap();

        assert_eq!(entry.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Utc::now();
        let entry = CacheEntry {
            value: b"test".to_vec(),
            expires_at: now,
        };

        assert!(entry.is_expired_at(now), "Entry should be expired at boundary");
        assert!(!entry.is_expired_at(now - Duration::milliseconds(1)));
    }
}
