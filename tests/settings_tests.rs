//! Settings store: fallbacks, round-trip through disk, snapshot validation.

use mlvbatch::{
    ChromaSmoothing, ConvertError, OutputFormat, SettingKey, SettingsStore,
};
use std::path::Path;

#[test]
fn test_reads_before_load_return_fallbacks() {
    let store = SettingsStore::new("/nonexistent/mlvbatch.toml");
    assert_eq!(store.output_type(), "dng");
    assert_eq!(store.output_directory(), "");
    assert_eq!(store.import_directory(), "");
    assert_eq!(store.chroma_smoothing(), "");
    assert_eq!(store.theme(), "");
}

#[test]
fn test_load_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::open(dir.path().join("settings.toml")).unwrap();
    assert_eq!(store.get(SettingKey::OutputType), "dng");
    assert_eq!(store.get(SettingKey::OutputDirectory), "");
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.toml");
    let mut store = SettingsStore::new(&path);
    store.set_theme("dark");
    store.set_output_directory(Path::new("/out"));
    store.set_import_directory(Path::new("/cards/A001"));
    store.set_output_type(OutputFormat::Raw);
    store.set_chroma_smoothing(ChromaSmoothing::FiveByFive);
    store.save().unwrap();
    assert!(!path.with_extension("toml.tmp").exists());

    let loaded = SettingsStore::open(&path).unwrap();
    assert_eq!(loaded.theme(), "dark");
    assert_eq!(loaded.output_directory(), "/out");
    assert_eq!(loaded.import_directory(), "/cards/A001");
    assert_eq!(loaded.output_type(), "raw");
    assert_eq!(loaded.chroma_smoothing(), "5x5");
}

#[test]
fn test_absent_keys_fall_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "theme = \"light\"\n").unwrap();
    let store = SettingsStore::open(&path).unwrap();
    assert_eq!(store.theme(), "light");
    assert_eq!(store.output_type(), "dng");
    assert_eq!(store.output_directory(), "");
}

#[test]
fn test_unknown_and_non_string_keys_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(
        &path,
        "bogus = \"x\"\noutput_type = 3\noutput_directory = \"/out\"\n",
    )
    .unwrap();
    let store = SettingsStore::open(&path).unwrap();
    assert_eq!(store.output_type(), "dng");
    assert_eq!(store.output_directory(), "/out");
}

#[test]
fn test_malformed_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "this is = = not toml").unwrap();
    assert!(SettingsStore::open(&path).is_err());
}

#[test]
fn test_setting_key_parse() {
    assert_eq!(
        "chroma_smoothing".parse::<SettingKey>().unwrap(),
        SettingKey::ChromaSmoothing
    );
    assert!("nope".parse::<SettingKey>().is_err());
}

#[test]
fn test_set_checked_validates_typed_keys() {
    let mut store = SettingsStore::new("/tmp/unused.toml");
    assert!(store.set_checked(SettingKey::OutputType, "tiff").is_err());
    assert!(store.set_checked(SettingKey::ChromaSmoothing, "4x4").is_err());
    assert!(store.set_checked(SettingKey::OutputDirectory, "relative/dir").is_err());
    store.set_checked(SettingKey::OutputType, "RAW").unwrap();
    assert_eq!(store.output_type(), "raw");
    store.set_checked(SettingKey::ChromaSmoothing, "none").unwrap();
    assert_eq!(store.chroma_smoothing(), "");
}

#[test]
fn test_snapshot_from_store() {
    let mut store = SettingsStore::new("/tmp/unused.toml");
    store.set_output_directory(Path::new("/out"));
    store.set_chroma_smoothing(ChromaSmoothing::ThreeByThree);
    let snap = store.snapshot().unwrap();
    assert_eq!(snap.format(), OutputFormat::Dng);
    assert_eq!(snap.output_dir(), Path::new("/out"));
    assert_eq!(snap.smoothing(), ChromaSmoothing::ThreeByThree);
}

#[test]
fn test_snapshot_is_a_copy() {
    let mut store = SettingsStore::new("/tmp/unused.toml");
    store.set_output_directory(Path::new("/out"));
    let snap = store.snapshot().unwrap();
    store.set_output_directory(Path::new("/elsewhere"));
    store.set_output_type(OutputFormat::Raw);
    assert_eq!(snap.output_dir(), Path::new("/out"));
    assert_eq!(snap.format(), OutputFormat::Dng);
}

#[test]
fn test_snapshot_requires_output_directory() {
    let store = SettingsStore::new("/tmp/unused.toml");
    assert!(matches!(
        store.snapshot(),
        Err(ConvertError::ConfigurationInvalid(_))
    ));
}

#[test]
fn test_snapshot_rejects_unknown_format() {
    let mut store = SettingsStore::new("/tmp/unused.toml");
    store.set_output_directory(Path::new("/out"));
    store.set(SettingKey::OutputType, "prores");
    assert!(matches!(
        store.snapshot(),
        Err(ConvertError::ConfigurationInvalid(_))
    ));
}

#[test]
fn test_display_lists_unset_as_none() {
    let mut store = SettingsStore::new("/tmp/unused.toml");
    store.set_output_directory(Path::new("/out"));
    let s = store.to_string();
    assert!(s.contains("output_directory=/out"));
    assert!(s.contains("theme=None"));
    assert!(s.contains("output_type=dng"));
}
