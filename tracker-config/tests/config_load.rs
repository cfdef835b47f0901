use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;
use tracker_config::{MailSecurity, TrackerConfigLoader};
use tracker_common::observability::LogFormat;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
version: "1"
targets:
  - https://capital.com/
  - https://www.plus500.com/en-es/
ledger:
  path: /srv/tracker/data.txt
browser:
  headless: false
  page_load_timeout_secs: 45
  window_size: [1280, 800]
mail:
  relay: smtp.example.com
  port: 465
  security: tls
  from: tracker@example.com
  to: ops@example.com
  username: tracker-bot
  password_env: TRACKER_SMTP_PASSWORD
  subject: Weekly CFD disclosures
logging:
  format: json
  stderr: false
  "#;
    let p = write_yaml(&tmp, "tracker.yaml", file_yaml);

    temp_env::with_var("TRACKER_SMTP_PASSWORD", None::<&str>, || {
        let config = TrackerConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load tracker config");

        let targets = config.targets().expect("valid targets");
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[1].as_str(), "https://www.plus500.com/en-es/");

        assert_eq!(config.ledger.path, PathBuf::from("/srv/tracker/data.txt"));
        assert!(!config.browser.headless);
        assert_eq!(config.browser.page_load_timeout().as_secs(), 45);
        assert_eq!(config.browser.window_size, (1280, 800));
        // untouched keys keep their defaults
        assert_eq!(config.browser.settle_millis, 1000);

        let mail = config.mail.expect("mail section");
        assert_eq!(mail.security, MailSecurity::Tls);
        assert_eq!(mail.port, 465);
        assert_eq!(mail.username(), "tracker-bot");
        assert_eq!(mail.password_env, "TRACKER_SMTP_PASSWORD");
        assert_eq!(mail.subject, "Weekly CFD disclosures");

        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(!config.logging.stderr);
    });
}

#[test]
#[serial]
fn missing_optional_file_is_tolerated() {
    let tmp = TempDir::new().unwrap();
    let config = TrackerConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("defaults");
    assert!(config.targets().is_ok());
}

#[test]
#[serial]
fn missing_required_file_fails() {
    let tmp = TempDir::new().unwrap();
    let result = TrackerConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(result.is_err());
}

#[test]
#[serial]
fn targets_can_come_from_environment() {
    temp_env::with_var(
        "TRACKER__TARGETS",
        Some("https://capital.com/,https://www.xtb.com/en/education/what-is-cfd-trading"),
        || {
            let config = TrackerConfigLoader::new().load().expect("env config");
            let targets = config.targets().unwrap();
            assert_eq!(targets.len(), 2);
            assert_eq!(targets[0].as_str(), "https://capital.com/");
        },
    );
}
