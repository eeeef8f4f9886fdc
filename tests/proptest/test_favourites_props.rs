//! Property-based tests for favourites encoding
//!
//! Whatever well-formed favourites are persisted come back unchanged and in
//! order, and decoding arbitrary text never panics.

use openterm::config::{MemoryPreferenceStore, PreferenceStore};
use openterm::favourites::{self, FavouritesStore, FAVOURITES_KEY};
use openterm::models::Host;
use proptest::prelude::*;

fn arb_host() -> impl Strategy<Value = Host> {
    (
        "[a-z][a-z0-9.-]{0,20}",
        1u16..=u16::MAX,
        prop::sample::select(vec!["tn3270", "tn5250", "vt100", "telnet"]),
        any::<bool>(),
    )
        .prop_map(|(name, port, tag, tls)| {
            Host::new(name, port, tag, tls).unwrap().with_favourite(true)
        })
}

proptest! {
    #[test]
    fn test_persist_then_load_is_identity(hosts in prop::collection::vec(arb_host(), 0..12)) {
        let mut prefs = MemoryPreferenceStore::new();
        let store = FavouritesStore::new();

        store.persist(&mut prefs, &hosts).unwrap();
        prop_assert_eq!(store.load(&prefs), hosts);
    }

    #[test]
    fn test_only_favourites_survive(
        hosts in prop::collection::vec((arb_host(), any::<bool>()), 0..12)
    ) {
        let hosts: Vec<Host> = hosts
            .into_iter()
            .map(|(host, keep)| host.with_favourite(keep))
            .collect();

        let mut prefs = MemoryPreferenceStore::new();
        let store = FavouritesStore::new();
        store.persist(&mut prefs, &hosts).unwrap();

        let expected: Vec<Host> = hosts.into_iter().filter(Host::is_favourite).collect();
        prop_assert_eq!(store.load(&prefs), expected);
    }

    #[test]
    fn test_encoding_is_deterministic(hosts in prop::collection::vec(arb_host(), 0..8)) {
        prop_assert_eq!(favourites::encode(&hosts).unwrap(), favourites::encode(&hosts).unwrap());
    }

    #[test]
    fn test_load_never_panics_on_garbage(value in "\\PC*") {
        let mut prefs = MemoryPreferenceStore::new();
        prefs.set_prop(FAVOURITES_KEY, &value).unwrap();
        let _ = FavouritesStore::new().load(&prefs);
    }
}
