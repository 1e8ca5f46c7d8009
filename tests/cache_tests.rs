// TTL cache tests
// Author: kelexine (https://github.com/kelexine)

use fintrack::cache::{ManualClock, TtlCache, DASHBOARD_KEYS};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn cache_at(start: i64) -> (TtlCache, ManualClock) {
    let clock = ManualClock::new(start);
    (TtlCache::with_clock(Arc::new(clock.clone())), clock)
}

#[test]
fn test_entry_expires_exactly_at_ttl() {
    let (cache, clock) = cache_at(0);
    cache.set("k", 1u32, Duration::from_millis(1000));

    clock.set(999);
    assert_eq!(cache.get::<u32>("k"), Some(1));

    clock.set(1000);
    assert_eq!(cache.get::<u32>("k"), None);
    assert_eq!(cache.stats().expirations, 1);
    assert!(!cache.contains_key("k"));
}

#[test]
fn test_zero_ttl_is_never_served() {
    let (cache, _clock) = cache_at(10);
    cache.set("k", "v".to_string(), Duration::ZERO);
    assert_eq!(cache.get::<String>("k"), None);
}

#[test]
fn test_purge_and_invalidate_many() {
    let (cache, clock) = cache_at(0);
    for key in DASHBOARD_KEYS {
        cache.set(*key, 1u8, Duration::from_secs(60));
    }
    cache.set("short", 1u8, Duration::from_millis(10));
    clock.advance(20);

    assert_eq!(cache.purge_expired(), 1);
    assert_eq!(cache.len(), DASHBOARD_KEYS.len());
    assert_eq!(cache.invalidate_many(DASHBOARD_KEYS), DASHBOARD_KEYS.len());
    assert!(cache.is_empty());
}

proptest! {
    #[test]
    fn prop_get_returns_last_set_value_within_ttl(
        values in prop::collection::vec(any::<i64>(), 1..8),
        ttl in 1u64..1_000_000,
        elapsed_frac in 0.0f64..1.0,
    ) {
        let (cache, clock) = cache_at(1_000);
        for v in &values {
            cache.set("key", *v, Duration::from_millis(ttl));
        }
        let elapsed = ((ttl as f64) * elapsed_frac) as i64;
        clock.advance(elapsed.min(ttl as i64 - 1));

        prop_assert_eq!(cache.get::<i64>("key"), values.last().copied());
    }

    #[test]
    fn prop_nothing_served_at_or_after_expiry(
        ttl in 0u64..1_000_000,
        extra in 0i64..1_000_000,
    ) {
        let (cache, clock) = cache_at(0);
        cache.set("key", 42u64, Duration::from_millis(ttl));
        clock.advance(ttl as i64 + extra);

        prop_assert_eq!(cache.get::<u64>("key"), None);
    }

    #[test]
    fn prop_overwrite_resets_expiry(
        first_ttl in 1u64..10_000,
        second_ttl in 1u64..10_000,
        gap in 0i64..10_000,
    ) {
        let (cache, clock) = cache_at(0);
        cache.set("key", 1u8, Duration::from_millis(first_ttl));
        clock.advance(gap);
        cache.set("key", 2u8, Duration::from_millis(second_ttl));

        clock.advance(second_ttl as i64 - 1);
        prop_assert_eq!(cache.get::<u8>("key"), Some(2));
        clock.advance(1);
        prop_assert_eq!(cache.get::<u8>("key"), None);
    }
}
