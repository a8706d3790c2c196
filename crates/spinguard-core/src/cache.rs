//! Client-side pinning of the carrier asset.
//!
//! Models the intercepting cache that sits in front of carrier fetches. The
//! cache key is fixed and ignores the request, so the first stored asset
//! (and with it the embedded token) is what every later read sees until the
//! cache is cleared.

use dashmap::DashMap;
use tracing::trace;

use crate::carrier::CarrierAsset;

/// Cache namespace holding the pinned asset.
pub const CACHE_NAME: &str = "uia-cache-v1";

/// The single key every carrier request is stored under.
pub const PINNED_KEY: &str = "/uia-fixed";

/// First-write-wins cache whose key does not depend on the request.
#[derive(Debug)]
pub struct PinnedCache {
    name: &'static str,
    slots: DashMap<&'static str, CarrierAsset>,
}

impl Default for PinnedCache {
    fn default() -> Self {
        Self {
            name: CACHE_NAME,
            slots: DashMap::new(),
        }
    }
}

impl PinnedCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the cache namespace.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Returns the pinned asset, fetching and storing it on first use.
    ///
    /// `request_url` does not take part in the lookup. When two callers miss
    /// at the same time both fetch, the first to store wins, and both return
    /// the stored asset. Fetch errors are passed through and nothing is
    /// stored.
    pub fn get_or_fetch<F, E>(&self, request_url: &str, fetch: F) -> Result<CarrierAsset, E>
    where
        F: FnOnce(&str) -> Result<CarrierAsset, E>,
    {
        if let Some(hit) = self.get() {
            trace!(cache = self.name, request_url, "serving pinned asset");
            return Ok(hit);
        }

        let fetched = fetch(request_url)?;
        let stored = self.slots.entry(PINNED_KEY).or_insert(fetched).clone();
        trace!(cache = self.name, request_url, "pinned asset stored");
        Ok(stored)
    }

    /// The pinned asset, if any.
    pub fn get(&self) -> Option<CarrierAsset> {
        self.slots.get(PINNED_KEY).map(|slot| slot.value().clone())
    }

    /// Drops the pinned asset, as when the user clears site data.
    pub fn clear(&self) {
        self.slots.remove(PINNED_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::convert::Infallible;

    fn asset(tail: &'static str) -> CarrierAsset {
        CarrierAsset {
            status: 200,
            body: Bytes::from_static(tail.as_bytes()),
            content_type: "image/jpeg".into(),
            cache_control: "no-store",
        }
    }

    #[test]
    fn first_fetch_is_pinned() {
        let cache = PinnedCache::new();
        let first = cache
            .get_or_fetch("/api/carrier?asset=one", |_| Ok::<_, Infallible>(asset("one")))
            .unwrap();
        let second = cache
            .get_or_fetch("/api/carrier?asset=two", |_| Ok::<_, Infallible>(asset("two")))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(&second.body[..], b"one");
    }

    #[test]
    fn fetch_is_skipped_on_hit() {
        let cache = PinnedCache::new();
        cache
            .get_or_fetch("/a", |_| Ok::<_, Infallible>(asset("one")))
            .unwrap();
        let result: Result<CarrierAsset, &str> =
            cache.get_or_fetch("/b", |_| panic!("fetch must not run on a hit"));
        assert!(result.is_ok());
    }

    #[test]
    fn failed_fetch_is_not_stored() {
        let cache = PinnedCache::new();
        let result = cache.get_or_fetch("/a", |_| Err("offline"));
        assert_eq!(result.unwrap_err(), "offline");
        assert!(cache.get().is_none());
    }

    #[test]
    fn clear_allows_a_new_pin() {
        let cache = PinnedCache::new();
        cache
            .get_or_fetch("/a", |_| Ok::<_, Infallible>(asset("one")))
            .unwrap();
        cache.clear();
        let pinned = cache
            .get_or_fetch("/a", |_| Ok::<_, Infallible>(asset("two")))
            .unwrap();
        assert_eq!(&pinned.body[..], b"two");
        assert_eq!(cache.name(), "uia-cache-v1");
    }
}
