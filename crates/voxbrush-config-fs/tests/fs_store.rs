// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]

use voxbrush_app_core::{ConfigError, ConfigService, ConfigStore, OverlayPrefs, PREFS_KEY};
use voxbrush_config_fs::FsConfigStore;
use voxbrush_core::OverlayConfig;

#[test]
fn missing_key_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsConfigStore::at(dir.path()).unwrap();
    assert!(matches!(store.load_raw("nothing"), Err(ConfigError::NotFound)));

    let svc = ConfigService::new(store);
    assert_eq!(svc.load::<OverlayPrefs>(PREFS_KEY).unwrap(), None);
}

#[test]
fn prefs_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let svc = ConfigService::new(FsConfigStore::at(dir.path()).unwrap());

    let mut prefs = OverlayPrefs {
        overlay: OverlayConfig {
            highlight_slice: false,
            depth_half_range: 4.0,
            ..OverlayConfig::default()
        },
        last_renderer: Some("lines".into()),
        ..OverlayPrefs::default()
    };
    prefs.remember_color([0.25, 0.5, 1.0]);
    svc.save(PREFS_KEY, &prefs).unwrap();

    let store = svc.into_inner();
    assert!(store.path_for(PREFS_KEY).unwrap().is_file());

    // A fresh store over the same directory sees the saved file.
    let reopened = ConfigService::new(FsConfigStore::at(store.base()).unwrap());
    let loaded: OverlayPrefs = reopened.load(PREFS_KEY).unwrap().unwrap();
    assert_eq!(loaded, prefs);
    assert_eq!(loaded.effective_config().default_renderer, "lines");
}

#[test]
fn saving_twice_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let svc = ConfigService::new(FsConfigStore::at(dir.path()).unwrap());
    let first = OverlayConfig::default();
    let second = OverlayConfig {
        clear_color: Some([0.1, 0.1, 0.1, 1.0]),
        ..OverlayConfig::default()
    };
    svc.save("overlay", &first).unwrap();
    svc.save("overlay", &second).unwrap();
    assert_eq!(svc.load::<OverlayConfig>("overlay").unwrap(), Some(second));

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn nested_base_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let store = FsConfigStore::at(&nested).unwrap();
    store.save_raw("k", b"{}").unwrap();
    assert!(nested.join("k.json").is_file());
}

#[test]
fn keys_cannot_escape_the_base() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsConfigStore::at(dir.path()).unwrap();
    assert!(matches!(
        store.save_raw("../escape", b"{}"),
        Err(ConfigError::InvalidKey(_))
    ));
    assert!(!dir.path().parent().unwrap().join("escape.json").exists());
}
