//
//  gitlab-client
//  auth/token.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Token Cache
//!
//! In-memory holder for the access token produced by an OAuth exchange.
//!
//! Each [`GitlabClient`](crate::GitlabClient) owns one cache. It starts
//! empty, is filled by the first successful exchange and is replaced by
//! every later one. A cached token is treated as expired
//! [`EXPIRY_MARGIN_SECS`] seconds before the server says it expires, so a
//! token is never sent moments before it lapses.
//!
//! ## Concurrency
//!
//! The slot sits behind a [`Mutex`] that is only held for the duration of
//! a read or a write, never across a network call. Two tasks that both
//! find the cache stale will both run an exchange; the last one to finish
//! wins the slot.
//!
//! ## Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use gitlab_client::auth::{AccessToken, TokenCache};
//!
//! let cache = TokenCache::new();
//! let issued = Utc::now();
//! cache.store_at(AccessToken::bearer("abc", Some(7200)), issued);
//!
//! assert!(cache.get_at(issued + Duration::seconds(7169)).is_some());
//! assert!(cache.get_at(issued + Duration::seconds(7170)).is_none());
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

use super::oauth::AccessToken;

/// Seconds subtracted from a token's lifetime before it is considered expired.
pub const EXPIRY_MARGIN_SECS: i64 = 30;

#[derive(Debug, Clone)]
struct CachedToken {
    token: AccessToken,
    /// `None` when the provider did not report a lifetime.
    expires_at: Option<DateTime<Utc>>,
}

/// Client-scoped cache for at most one access token.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedToken>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached token if it is still valid now.
    pub fn get(&self) -> Option<AccessToken> {
        self.get_at(Utc::now())
    }

    /// Returns the cached token if it is valid at `now`.
    ///
    /// A token is valid when its value is non-empty and `now` is strictly
    /// before its (margin-adjusted) expiry.
    pub fn get_at(&self, now: DateTime<Utc>) -> Option<AccessToken> {
        let slot = self.lock();
        let cached = slot.as_ref()?;
        if cached.token.access_token.is_empty() {
            return None;
        }
        match cached.expires_at {
            Some(expires_at) if now >= expires_at => None,
            _ => Some(cached.token.clone()),
        }
    }

    /// Stores a freshly issued token, replacing any previous one.
    pub fn store(&self, token: AccessToken) {
        self.store_at(token, Utc::now());
    }

    /// Stores a token issued at `now`.
    ///
    /// The expiry is `now + expires_in - 30s`. A token without `expires_in`
    /// never expires from the cache. Lifetimes past the representable range
    /// are clamped: too large never expires, too small is already expired.
    pub fn store_at(&self, token: AccessToken, now: DateTime<Utc>) {
        let expires_at = token.expires_in.and_then(|secs| expiry(now, secs));
        *self.lock() = Some(CachedToken { token, expires_at });
    }

    /// Margin-adjusted expiry of the cached token.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.lock().as_ref().and_then(|cached| cached.expires_at)
    }

    /// Refresh token of the cached token, returned even after expiry.
    pub fn refresh_token(&self) -> Option<String> {
        self.lock()
            .as_ref()
            .and_then(|cached| cached.token.refresh_token.clone())
            .filter(|token| !token.is_empty())
    }

    /// Empties the cache.
    pub fn clear(&self) {
        *self.lock() = None;
    }

    /// `true` when nothing is cached, valid or not.
    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }
}

fn expiry(now: DateTime<Utc>, expires_in: i64) -> Option<DateTime<Utc>> {
    let lifetime = expires_in.saturating_sub(EXPIRY_MARGIN_SECS);
    match Duration::try_seconds(lifetime).and_then(|d| now.checked_add_signed(d)) {
        Some(at) => Some(at),
        None if lifetime < 0 => Some(now),
        None => None,
    }
}
