//! Integration Tests for Favourites Persistence
//!
//! Favourites written through a file-backed preference store must come back
//! unchanged after the store is reopened, as they would after a restart.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use openterm::app::Started;
use openterm::config::{FilePreferenceStore, PreferenceStore};
use openterm::display::FKEY_BAR_KEY;
use openterm::favourites::{FavouritesStore, FAVOURITES_KEY};
use openterm::hosts::HostRegistry;
use openterm::models::Host;
use openterm::Application;
use tempfile::TempDir;

use test_utils::{favourite, host, test_config, Behaviour, MockTerminalFactory, RecordingDisplay};

fn prefs_in(dir: &TempDir) -> FilePreferenceStore {
    FilePreferenceStore::open(dir.path().join("prefs.toml"))
}

#[test]
fn test_absent_key_loads_empty_without_error() {
    let dir = TempDir::new().unwrap();
    let prefs = prefs_in(&dir);

    // Known host that was never saved as a favourite
    let registry = HostRegistry::from_hosts(vec![host("sys1", 23, "tn3270")]);
    assert_eq!(registry.len(), 1);

    let store = FavouritesStore::new();
    assert!(store.try_load(&prefs).unwrap().is_empty());
    assert!(store.load(&prefs).is_empty());
}

#[test]
fn test_replace_all_survives_restart_in_order() {
    let dir = TempDir::new().unwrap();
    let store = FavouritesStore::new();
    let a = favourite("alpha", 23, "tn3270");
    let b = Host::new("beta", 992, "tn5250", true)
        .unwrap()
        .with_favourite(true);

    {
        let mut prefs = prefs_in(&dir);
        let mut registry = HostRegistry::from_hosts(vec![favourite("old", 23, "tn3270")]);
        registry.replace_all(vec![a.clone(), b.clone()]);
        store.persist(&mut prefs, registry.hosts()).unwrap();
    }

    let reopened = prefs_in(&dir);
    assert_eq!(store.load(&reopened), vec![a, b]);
}

#[test]
fn test_corrupt_value_on_disk_is_soft() {
    let dir = TempDir::new().unwrap();
    {
        let mut prefs = prefs_in(&dir);
        prefs.set_prop(FAVOURITES_KEY, "definitely not json").unwrap();
    }

    let prefs = prefs_in(&dir);
    assert!(FavouritesStore::new().load(&prefs).is_empty());
}

#[tokio::test]
async fn test_new_favourite_is_remembered_after_failed_connect() {
    let dir = TempDir::new().unwrap();
    let factory = MockTerminalFactory::new();
    factory.push(Behaviour::Fail("connection refused".to_string()));

    {
        let Started { mut app, .. } = Application::start(
            test_config(),
            prefs_in(&dir),
            factory.registry(&["tn3270"]),
            RecordingDisplay::new(),
            None,
        );
        let result = app.add_new_host(favourite("sys9", 2323, "tn3270")).await;
        assert!(result.is_err());
        app.exit().await.unwrap();
    }

    let Started { app, .. } = Application::start(
        test_config(),
        prefs_in(&dir),
        factory.registry(&["tn3270"]),
        RecordingDisplay::new(),
        None,
    );
    let names: Vec<&str> = app.hosts().iter().map(|h| h.host_name()).collect();
    assert_eq!(names, vec!["sys9"]);
    assert!(app.hosts().get(0).unwrap().is_favourite());
}

#[tokio::test]
async fn test_display_preferences_and_clear() {
    let dir = TempDir::new().unwrap();
    let factory = MockTerminalFactory::new();

    {
        let Started { mut app, .. } = Application::start(
            test_config(),
            prefs_in(&dir),
            factory.registry(&["tn3270"]),
            RecordingDisplay::new(),
            Some(favourite("sys1", 23, "tn3270")),
        );
        app.set_fkey_bar(true).unwrap();
        app.exit().await.unwrap();
    }

    let reopened = prefs_in(&dir);
    assert_eq!(reopened.get_prop(FKEY_BAR_KEY, "false"), "true");
    assert_eq!(FavouritesStore::new().load(&reopened).len(), 1);

    let Started { mut app, .. } = Application::start(
        test_config(),
        reopened,
        factory.registry(&["tn3270"]),
        RecordingDisplay::new(),
        None,
    );
    assert!(app.preferences().fkey_bar);
    app.clear_saved_preferences().unwrap();
    assert!(!app.preferences().fkey_bar);
    assert_eq!(app.hosts().len(), 1);

    let cleared = prefs_in(&dir);
    assert_eq!(cleared.get_prop(FKEY_BAR_KEY, "false"), "false");
    assert!(FavouritesStore::new().load(&cleared).is_empty());
}
