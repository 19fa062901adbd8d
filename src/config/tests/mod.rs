use super::*;
use fixtures::{with_sinks, Loader, BASIC_CONFIG};
use rstest::rstest;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;


#[test]
fn load_basic_config() {
    let loader = Loader::new(&[("TEST_AAD_ENV", "aad")]);
    let config = loader.load_file(BASIC_CONFIG).expect("load failed");

    assert_eq!(config.pid_file, Some(PathBuf::from("./pidfile")));

    let method = config.auto_auth.method();
    assert_eq!(method.kind, "aws-iam");
    assert_eq!(method.mount_path, "auth/aws-iam");
    assert_eq!(serde_json::Value::Object(method.config.clone()), json!({"role": "foobar"}));

    let sinks = config.auto_auth.sinks();
    assert_eq!(sinks.len(), 2);

    assert_eq!(sinks[0].kind, "file");
    assert_eq!(sinks[0].wrap_ttl, Duration::ZERO);
    assert_eq!(sinks[0].dh_type(), Some(DhType::Curve25519));
    assert_eq!(sinks[0].dh_path(), Some("/tmp/file-foo-dhpath"));
    assert_eq!(sinks[0].aad(), "aad");
    assert_eq!(sinks[0].config["config"], json!({"path": "/tmp/file-foo"}));

    assert_eq!(sinks[1].kind, "file");
    assert_eq!(sinks[1].wrap_ttl, Duration::from_secs(5 * 60));
    assert_eq!(sinks[1].dh_type(), Some(DhType::Curve25519));
    assert_eq!(sinks[1].dh_path(), Some("/tmp/file-foo-dhpath2"));
    assert_eq!(sinks[1].aad(), "foobar");
    assert_eq!(sinks[1].config["config"], json!({"path": "/tmp/file-bar"}));
}

#[test]
fn parse_matches_load() {
    let loader = Loader::new(&[("TEST_AAD_ENV", "aad")]);
    let parsed = loader.parse(BASIC_CONFIG).expect("parse failed");
    let loaded = loader.load_file(BASIC_CONFIG).expect("load failed");
    assert_eq!(parsed, loaded);
}

#[test]
fn loads_are_independent() {
    let first = Loader::new(&[("TEST_AAD_ENV", "one")]).parse(BASIC_CONFIG).expect("parse failed");
    let second = Loader::new(&[("TEST_AAD_ENV", "two")]).parse(BASIC_CONFIG).expect("parse failed");
    assert_eq!(first.auto_auth.sinks()[0].aad(), "one");
    assert_eq!(second.auto_auth.sinks()[0].aad(), "two");
}

#[test]
fn nonexistent_path() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let error = Loader::default().load_path(dir.path().join("nope.hcl")).expect_err("load succeeded");
    assert_eq!(error.kind(), ErrorKind::Io);
    assert!(matches!(&error, ConfigError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound));
}

#[test]
fn directory_path() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let error = Loader::default().load_path(dir.path().to_path_buf()).expect_err("load succeeded");
    assert_eq!(error.kind(), ErrorKind::Io);
    assert!(error.to_string().contains("directory"), "{error}");
}

#[test]
fn non_utf8_file() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("config.hcl");
    std::fs::write(&path, [0xff, 0xfe, 0xfd]).expect("failed to write config");
    let error = Loader::default().load_path(path).expect_err("load succeeded");
    assert_eq!(error.kind(), ErrorKind::Io);
}

#[rstest]
#[case::unclosed_block("auto_auth {")]
#[case::garbage("this is not a config")]
#[case::bad_string(r#"pid_file = "unterminated"#)]
#[case::deeply_nested(&format!("pid_file = {}{}", "[".repeat(10_000), "]".repeat(10_000)))]
fn syntax_errors(#[case] input: &str) {
    let error = Loader::default().parse(input).expect_err("parse succeeded");
    assert_eq!(error.kind(), ErrorKind::Syntax);
}

#[rstest]
#[case::no_auto_auth(r#"pid_file = "./pidfile""#)]
#[case::two_auto_auth(
    r#"
    auto_auth { method { type = "a" } sink "file" { } }
    auto_auth { method { type = "b" } sink "file" { } }
    "#
)]
#[case::no_method(r#"auto_auth { sink "file" { } }"#)]
#[case::two_methods(r#"auto_auth { method { type = "a" } method { type = "b" } sink "file" { } }"#)]
#[case::no_sinks(r#"auto_auth { method { type = "a" } }"#)]
#[case::pid_file_not_string(r#"pid_file = 1"#)]
#[case::bad_dh_type(&with_sinks(r#"sink "file" { dh_type = "badvalue", dh_path = "/p" }"#))]
#[case::bad_wrap_ttl(&with_sinks(r#"sink "file" { wrap_ttl = "whenever" }"#))]
#[case::wrap_ttl_in_months(&with_sinks(r#"sink "file" { wrap_ttl = "5M" }"#))]
#[case::no_sink_type(&with_sinks(r#"sink { }"#))]
fn schema_violations(#[case] input: &str) {
    let error = Loader::default().parse(input).expect_err("parse succeeded");
    assert_eq!(error.kind(), ErrorKind::SchemaViolation, "{error}");
}

#[rstest]
#[case::dh_type_without_path(r#"sink "file" { dh_type = "curve25519" }"#)]
#[case::dh_path_without_type(r#"sink "file" { dh_path = "/p" }"#)]
#[case::aad_without_dh(r#"sink "file" { aad = "x" }"#)]
#[case::aad_env_without_dh(r#"sink "file" { aad_env_var = "TEST_AAD_ENV" }"#)]
fn cross_field_violations(#[case] sinks: &str) {
    let loader = Loader::new(&[("TEST_AAD_ENV", "foobar")]);
    let error = loader.parse(&with_sinks(sinks)).expect_err("parse succeeded");
    assert_eq!(error.kind(), ErrorKind::CrossFieldViolation, "{error}");
}

#[rstest]
#[case::default(r#"method { type = "aws-iam" }"#, "auth/aws-iam")]
#[case::trailing_slash(r#"method { type = "aws-iam", mount_path = "auth/aws/" }"#, "auth/aws")]
fn mount_path(#[case] method: &str, #[case] expected: &str) {
    let input = format!(r#"auto_auth {{ {method} sink "file" {{ }} }}"#);
    let config = Loader::default().parse(&input).expect("parse failed");
    assert_eq!(config.auto_auth.method().mount_path, expected);
}

#[test]
fn dh_enabled() {
    let input = with_sinks(r#"sink "file" { dh_type = "curve25519", dh_path = "/p" }"#);
    let config = Loader::default().parse(&input).expect("parse failed");
    let sink = &config.auto_auth.sinks()[0];
    assert_eq!(sink.dh_type(), Some(DhType::Curve25519));
    assert_eq!(sink.dh_path(), Some("/p"));
    assert_eq!(sink.aad(), "");
}

#[test]
fn aad_from_environment() {
    let input = with_sinks(r#"sink "file" { aad_env_var = "TEST_AAD_ENV", dh_type = "curve25519", dh_path = "/p" }"#);
    let config = Loader::new(&[("TEST_AAD_ENV", "foobar")]).parse(&input).expect("parse failed");
    assert_eq!(config.auto_auth.sinks()[0].aad(), "foobar");
}

#[test]
fn wrap_ttl() {
    let input = with_sinks(r#"sink "file" { wrap_ttl = "5m" }"#);
    let config = Loader::default().parse(&input).expect("parse failed");
    assert_eq!(config.auto_auth.sinks()[0].wrap_ttl, Duration::from_secs(300));
}

#[test]
fn every_sink_error_is_reported() {
    let input = with_sinks(
        r#"
        sink "file" { path = "/tmp/a" }
        sink "file" { path = "/tmp/b", dh_type = "curve25519" }
        sink "file" { path = "/tmp/c", aad = "x" }
        "#,
    );
    let error = Loader::default().parse(&input).expect_err("parse succeeded");
    assert_eq!(error.kind(), ErrorKind::CrossFieldViolation);

    let ConfigError::AutoAuth(AutoAuthError::Sinks(errors)) = &error else {
        panic!("unexpected error: {error:?}");
    };
    let failed: Vec<_> = errors.errors().iter().map(|error| error.index).collect();
    assert_eq!(failed, [1, 2]);
    let parsed: Vec<_> = errors.parsed().iter().map(|sink| sink.config["path"].clone()).collect();
    assert_eq!(parsed, [json!("/tmp/a")]);
    assert_eq!(
        error.to_string(),
        "error parsing 'auto_auth': error parsing 'sink' stanzas: 2 errors occurred:\n\
         \t* sink.file: 'dh_type' and 'dh_path' must be specified together\n\
         \t* sink.file: specifying AAD data without 'dh_type' does not make sense"
    );
}

#[test]
fn multiple_sinks_keep_order() {
    let input = with_sinks(
        r#"
        sink "file" { path = "/tmp/a" }
        sink "FILE" { path = "/tmp/b" }
        "#,
    );
    let config = Loader::default().parse(&input).expect("parse failed");
    let sinks: Vec<_> =
        config.auto_auth.sinks().iter().map(|sink| (sink.kind.as_str(), sink.config["path"].clone())).collect();
    assert_eq!(sinks, [("file", json!("/tmp/a")), ("file", json!("/tmp/b"))]);
}

#[test]
fn unknown_top_level_keys_are_ignored() {
    let input = format!("{}\nvault {{ address = \"https://127.0.0.1:8200\" }}", with_sinks(r#"sink "file" { }"#));
    let config = Loader::default().parse(&input).expect("parse failed");
    assert_eq!(config.pid_file, None);
}

#[test]
fn serialization() {
    let input = r#"
    pid_file = "/run/agent.pid"
    auto_auth {
      method { type = "approle", mount_path = "auth/custom/" }
      sink "file" { path = "/tmp/token", wrap_ttl = 60 }
    }
    "#;
    let config = Loader::default().parse(input).expect("parse failed");
    let serialized = serde_json::to_value(&config).expect("serialization failed");
    assert_eq!(
        serialized,
        json!({
            "pid_file": "/run/agent.pid",
            "auto_auth": {
                "method": {"type": "approle", "mount_path": "auth/custom", "config": {}},
                "sinks": [
                    {"type": "file", "wrap_ttl": 60, "config": {"path": "/tmp/token", "wrap_ttl": 60}},
                ],
            },
        })
    );
}

#[test]
fn from_str() {
    let config: Config = with_sinks(r#"sink "file" { }"#).parse().expect("parse failed");
    assert_eq!(config.auto_auth.method().kind, "aws-iam");
}
