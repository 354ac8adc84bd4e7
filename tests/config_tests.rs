//! Configuration loading from lookups and INI files.

mod test_utils;

use std::{collections::HashMap, io::Write, time::Duration};

use logentries::{
    BackoffOverrides, ConfigError, DEBUG_ENV, EngineBuilder, TOKEN_ENV, WorkerState,
};
use rstest::rstest;
use tempfile::NamedTempFile;
use test_utils::{ScriptedConnector, TOKEN, wait_for_len};

fn ini_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp ini file");
    file.write_all(contents.as_bytes()).expect("write ini contents");
    file
}

#[rstest]
fn ini_settings_drive_the_engine() {
    let file = ini_file(&format!(
        "; collector settings\n[logentries]\ntoken = {TOKEN}\ncapacity = 4\n"
    ));
    let connector = ScriptedConnector::new();
    let engine = EngineBuilder::from_ini_file(file.path())
        .expect("load ini")
        .with_backoff(BackoffOverrides::new().with_base_ms(1).with_cap_ms(2))
        .build_with_connector(connector.clone())
        .expect("valid engine configuration");
    assert_eq!(engine.capacity(), 4);
    assert!(engine.has_valid_token());

    engine.submit("from ini", None);
    let expected = format!("{TOKEN}from ini\n").into_bytes();
    assert_eq!(
        wait_for_len(&connector.sink, expected.len(), Duration::from_secs(5)),
        expected
    );
    assert_eq!(engine.worker_state(), WorkerState::Running);
}

#[rstest]
fn ini_overrides_can_be_layered() {
    let file = ini_file("[logentries]\nhost = collector.internal\nport = 20000\ntls = on\n");
    let config = EngineBuilder::from_ini_file(file.path())
        .expect("load ini")
        .with_capacity(16)
        .build_config()
        .expect("valid config");
    assert_eq!(config.transport.host, "collector.internal");
    assert_eq!(config.transport.port, 20000);
    assert_eq!(config.capacity, 16);
    let tls = config.transport.tls.expect("tls enabled");
    assert_eq!(tls.domain, "collector.internal");
}

#[rstest]
fn malformed_ini_is_rejected() {
    let file = ini_file("[logentries\ntoken = x\n");
    let err = EngineBuilder::from_ini_file(file.path()).expect_err("parse must fail");
    assert!(matches!(err, ConfigError::Ini(_)), "unexpected error {err}");
}

#[rstest]
#[case(Some("on"), true)]
#[case(Some("0"), false)]
#[case(None, false)]
fn lookup_controls_debug(#[case] debug: Option<&str>, #[case] expected: bool) {
    let mut vars = HashMap::from([(TOKEN_ENV, TOKEN)]);
    if let Some(debug) = debug {
        vars.insert(DEBUG_ENV, debug);
    }
    let config = EngineBuilder::from_lookup(|key| vars.get(key).map(|v| (*v).to_owned()))
        .build_config()
        .expect("valid config");
    assert_eq!(config.token, TOKEN);
    assert_eq!(config.debug, expected);
}

#[rstest]
fn lookup_with_invalid_token_builds_an_inert_engine() {
    let connector = ScriptedConnector::new();
    let engine = EngineBuilder::from_lookup(|key| (key == TOKEN_ENV).then(|| "not-a-guid".into()))
        .build_with_connector(connector.clone())
        .expect("token syntax is checked at submit time");
    engine.submit("dropped", None);
    assert!(!engine.has_valid_token());
    assert_eq!(engine.pending_frames(), 0);
    assert_eq!(connector.connects(), 0);
}
