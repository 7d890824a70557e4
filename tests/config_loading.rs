// tests/config_loading.rs

use std::io::Write;

use querydag::config::{load_from_path, load_or_default, SchedulerConfig};
use querydag::errors::QuerydagError;

#[test]
fn defaults_apply_without_a_file() {
    let config = load_or_default(None).unwrap();
    assert_eq!(config.max_concurrent_tasks, 10);
    assert_eq!(config.task_timeout_secs, None);
}

#[test]
fn loads_values_from_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_concurrent_tasks = 3").unwrap();
    writeln!(file, "task_timeout_secs = 30").unwrap();

    let config = load_from_path(file.path()).unwrap();
    assert_eq!(config.max_concurrent_tasks, 3);
    assert_eq!(config.task_timeout_secs, Some(30));
    assert_eq!(
        config.task_timeout(),
        Some(std::time::Duration::from_secs(30))
    );
}

#[test]
fn empty_file_falls_back_to_defaults() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let config = load_from_path(file.path()).unwrap();
    assert_eq!(config.max_concurrent_tasks, 10);
}

#[test]
fn rejects_zero_worker_pool() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_concurrent_tasks = 0").unwrap();

    let err = load_from_path(file.path()).unwrap_err();
    assert!(matches!(err, QuerydagError::ConfigError(_)), "got {err:?}");
}

#[test]
fn rejects_zero_timeout() {
    let config = SchedulerConfig {
        max_concurrent_tasks: 2,
        task_timeout_secs: Some(0),
    };
    assert!(config.validate().is_err());
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_from_path("/definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, QuerydagError::IoError(_)), "got {err:?}");
}
