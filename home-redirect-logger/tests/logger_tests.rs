use home_redirect_logger::{FileLogSettings, LogSettings, cleanup_old_logs, init};
use std::fs::File;
use std::path::Path;

fn fresh_dir(name: &str) -> String {
    let dir = format!("./target/{}", name);
    if Path::new(&dir).exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn file_names(dir: &str) -> Vec<String> {
    let mut names: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_cleanup_keeps_newest_files() {
    let dir = fresh_dir("cleanup_keeps_newest_logs");
    let prefix = "redirect.log";

    for date in ["2023-10-20", "2023-10-21", "2023-10-22", "2023-10-23", "2023-10-24"] {
        File::create(format!("{}/{}.{}", dir, prefix, date)).unwrap();
    }
    File::create(format!("{}/unrelated.txt", dir)).unwrap();

    cleanup_old_logs(Path::new(&dir), prefix, 3);

    assert_eq!(
        file_names(&dir),
        vec![
            "redirect.log.2023-10-22",
            "redirect.log.2023-10-23",
            "redirect.log.2023-10-24",
            "unrelated.txt",
        ]
    );

    // Below the limit nothing is removed.
    cleanup_old_logs(Path::new(&dir), prefix, 10);
    assert_eq!(file_names(&dir).len(), 4);
}

#[test]
fn test_cleanup_ignores_missing_dir() {
    cleanup_old_logs(Path::new("./target/this/dir/does/not/exist"), "x.log", 1);
}

#[test]
fn test_settings_from_yaml() {
    let settings: LogSettings = serde_yaml::from_str(
        r#"
level: "warn,home_redirect_core=debug"
file:
  dir: ./logs
  max_files: 7
"#,
    )
    .unwrap();
    assert_eq!(settings.level, "warn,home_redirect_core=debug");
    assert!(settings.console);
    let file = settings.file.unwrap();
    assert_eq!(file.prefix, "home-redirect.log");
    assert_eq!(file.max_files, Some(7));
    assert_eq!(file.cleanup_interval_secs, 3600);

    let defaults: LogSettings = serde_yaml::from_str("{}").unwrap();
    assert_eq!(defaults.level, "info");
    assert!(defaults.file.is_none());
}

#[test]
fn test_init_writes_to_rolling_file() {
    let dir = fresh_dir("init_rolling_logs");
    let mut file = FileLogSettings::new(&dir);
    file.prefix = "init_test.log".to_string();

    let settings = LogSettings {
        console: false,
        file: Some(file),
        ..LogSettings::default()
    };

    let guard = init(&settings).unwrap();
    tracing::info!("written through the file layer");
    drop(guard);

    assert!(file_names(&dir).iter().any(|n| n.starts_with("init_test.log")));

    // A second global subscriber is refused.
    assert!(init(&LogSettings::default()).is_err());
}
