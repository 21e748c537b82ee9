// Integration tests for configuration loading

use knect_meet::prejoin::{Language, VoiceGender};
use knect_meet::session::VideoCodec;
use knect_meet::{Config, ControllerOptions};
use std::io::Write;
use std::time::Duration;

const MINIMAL: &str = r#"
[service]
name = "knect-test"

[service.http]
bind = "0.0.0.0"
port = 8080

[credentials]
endpoint = "http://localhost:8080/api/connection-details"
server_url = "wss://media.example.com"
api_key = "key"
api_secret = "super-secret"

[gateway]
endpoint = "http://localhost:8080/api/notify-bot"
"#;

fn write_config(contents: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knect.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    (dir, path.to_string_lossy().into_owned())
}

#[test]
fn test_shipped_config_loads() {
    let cfg = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config/knect-meet")).unwrap();

    assert_eq!(cfg.service.http.port, 3000);
    assert_eq!(cfg.translation.allowed_identities, vec!["host".to_string()]);
    assert_eq!(cfg.translation.settings.input_lang, Language::En);
    assert_eq!(cfg.translation.settings.output_lang, Language::Hi);
    assert_eq!(cfg.translation.settings.gender, VoiceGender::Female);
    assert_eq!(cfg.room.codec, VideoCodec::Vp9);
}

#[test]
fn test_minimal_config_uses_defaults() {
    let (_dir, path) = write_config(MINIMAL);

    let cfg = Config::load(&path).unwrap();

    assert_eq!(cfg.credentials.token_ttl_secs, 300);
    assert_eq!(cfg.gateway.request_timeout_ms, 10_000);
    assert_eq!(cfg.gateway.stop_timeout_ms, 5_000);
    assert_eq!(cfg.gateway.start_delay_ms, 2_000);
    assert!(cfg.translation.allowed_identities.is_empty());
    assert!(!cfg.room.hq);
    assert!(cfg.room.region.is_none());

    let options = ControllerOptions::from_config(&cfg);
    assert_eq!(options.stop_timeout, Duration::from_secs(5));
    assert!(!options.quality.hq);
}

#[test]
fn test_room_and_translation_sections() {
    let contents = format!(
        "{}\n{}",
        MINIMAL,
        r#"
[translation]
allowed_identities = ["host", "moderator"]

[translation.settings]
input_lang = "fr"
output_lang = "es"
gender = "male"

[room]
hq = true
codec = "av1"
region = "eu-west"
"#
    );
    let (_dir, path) = write_config(&contents);

    let cfg = Config::load(&path).unwrap();

    assert_eq!(cfg.translation.allowed_identities.len(), 2);
    assert_eq!(cfg.translation.settings.input_lang, Language::Fr);
    assert_eq!(cfg.translation.settings.gender, VoiceGender::Male);

    let quality = cfg.room.quality();
    assert!(quality.hq);
    assert_eq!(quality.codec, VideoCodec::Av1);
    assert_eq!(cfg.room.region.as_deref(), Some("eu-west"));
}

#[test]
fn test_secret_is_redacted_in_debug_output() {
    let (_dir, path) = write_config(MINIMAL);
    let cfg = Config::load(&path).unwrap();

    let rendered = format!("{:?}", cfg);

    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("[REDACTED]"));
}

#[test]
fn test_missing_section_is_an_error() {
    let (_dir, path) = write_config("[service]\nname = \"x\"\n");

    assert!(Config::load(&path).is_err());
}

#[test]
fn test_missing_file_is_an_error() {
    assert!(Config::load("/nonexistent/knect-meet").is_err());
}
