//! Integration tests for the `didly` CLI binary.
//!
//! Argument parsing, help output, completions, and every command against
//! the seeded `--demo` backend, plus a couple of runs against a mock HTTP
//! backend. Nothing touches the user's real configuration.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `didly` binary with env isolation.
///
/// Clears all `DIDLY_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn didly_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("didly");
    cmd.env("HOME", "/tmp/didly-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/didly-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("DIDLY_PROFILE")
        .env_remove("DIDLY_API_URL")
        .env_remove("DIDLY_TOKEN")
        .env_remove("DIDLY_OUTPUT")
        .env_remove("DIDLY_INSECURE")
        .env_remove("DIDLY_TIMEOUT")
        .env_remove("DIDLY_DEMO")
        .env_remove("RUST_LOG");
    cmd
}

fn demo() -> assert_cmd::Command {
    let mut cmd = didly_cmd();
    cmd.arg("--demo");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = didly_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    didly_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("search")
            .and(predicate::str::contains("buy"))
            .and(predicate::str::contains("numbers"))
            .and(predicate::str::contains("health")),
    );
}

#[test]
fn test_version_flag() {
    didly_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("didly"));
}

#[test]
fn test_invalid_subcommand() {
    let output = didly_cmd().arg("foobar").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("foobar"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    didly_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    didly_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Local commands ──────────────────────────────────────────────────

#[test]
fn test_countries_plain() {
    didly_cmd()
        .args(["countries", "-o", "plain"])
        .assert()
        .success()
        .stdout("US\nCA\nGB\nAU\n");
}

#[test]
fn test_config_show_without_file_prints_defaults() {
    didly_cmd()
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"currency\": \"USD\""));
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_search_without_config_fails() {
    didly_cmd()
        .arg("search")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No backend configured"));
}

#[test]
fn test_api_url_without_token_is_auth_error() {
    didly_cmd()
        .args(["--api-url", "http://127.0.0.1:9", "search"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("No API token"));
}

#[test]
fn test_unknown_profile_fails() {
    didly_cmd()
        .args(["--profile", "nope", "search"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Profile 'nope' not found"));
}

// ── Search ──────────────────────────────────────────────────────────

#[test]
fn test_demo_search_by_city() {
    demo()
        .args(["search", "--city", "San Francisco", "-o", "plain"])
        .assert()
        .success()
        .stdout("1\n2\n3\n5\n9\n");
}

#[test]
fn test_demo_search_json_returns_everything() {
    let output = demo().args(["search", "-o", "json"]).output().unwrap();
    assert!(output.status.success());
    let listings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let listings = listings.as_array().unwrap();
    assert_eq!(listings.len(), 10);
    assert!(listings[0].get("friendly_number").is_some());
}

#[test]
fn test_demo_search_table() {
    demo()
        .args(["search", "--city", "chicago"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Chicago").and(predicate::str::contains("toll-free")));
}

#[test]
fn test_demo_search_invalid_area_code_is_validation_error() {
    demo()
        .args(["search", "--area-code", "abc"])
        .assert()
        .code(6);
}

#[test]
fn test_demo_search_unknown_country_is_validation_error() {
    demo()
        .args(["search", "--country", "ZZ"])
        .assert()
        .code(6);
}

// ── Buy ─────────────────────────────────────────────────────────────

#[test]
fn test_demo_buy_with_yes() {
    demo()
        .args(["buy", "3", "-y", "-o", "plain"])
        .assert()
        .success()
        .stdout("3\n")
        .stderr(predicate::str::contains("Phone number purchased successfully!"));
}

#[test]
fn test_demo_buy_requires_confirmation_without_terminal() {
    demo()
        .args(["buy", "3"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("requires confirmation"));
}

#[test]
fn test_demo_buy_unknown_id_is_not_found() {
    demo()
        .args(["buy", "999", "-y"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Number not found"));
}

// ── Numbers ─────────────────────────────────────────────────────────

#[test]
fn test_demo_numbers_list_starts_empty() {
    demo()
        .args(["numbers", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_demo_numbers_get_unknown_is_not_found() {
    demo().args(["numbers", "get", "1"]).assert().code(5);
}

#[test]
fn test_demo_release_unowned_is_not_found() {
    demo()
        .args(["numbers", "release", "1", "-y"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Number not found"));
}

#[test]
fn test_demo_configure_without_flags_is_rejected() {
    demo()
        .args(["numbers", "configure", "1"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("nothing to change"));
}

#[test]
fn test_demo_configure_long_auto_reply_is_rejected_locally() {
    let message = "x".repeat(161);
    demo()
        .args(["numbers", "configure", "1", "--auto-reply-message", &message])
        .assert()
        .code(6);
}

#[test]
fn test_demo_configure_requires_confirmation_without_terminal() {
    demo()
        .args(["numbers", "configure", "1", "--name", "Front desk"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("requires confirmation"));
}

// ── Health / customers ──────────────────────────────────────────────

#[test]
fn test_demo_health_is_online() {
    demo()
        .arg("health")
        .assert()
        .success()
        .stdout(predicate::str::contains("System Online"));
}

#[test]
fn test_demo_customers_plain() {
    demo()
        .args(["customers", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout("cus_001\ncus_002\n");
}

// ── HTTP backend ────────────────────────────────────────────────────

mod http {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::didly_cmd;

    #[tokio::test(flavor = "multi_thread")]
    async fn search_hits_backend_with_token_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dids/search"))
            .and(query_param("area_code", "415"))
            .and(header("authorization", "Bearer t0k3n"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "dids": [
                    { "id": 11, "phone_number": "+14155550101", "city": "San Francisco" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let output = tokio::task::spawn_blocking(move || {
            didly_cmd()
                .args(["--api-url", &uri, "--token", "t0k3n"])
                .args(["search", "--area-code", "415", "-o", "plain"])
                .output()
                .unwrap()
        })
        .await
        .unwrap();

        assert!(output.status.success(), "{output:?}");
        assert_eq!(String::from_utf8_lossy(&output.stdout), "11\n");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rejected_token_exits_with_auth_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let uri = server.uri();
        let output = tokio::task::spawn_blocking(move || {
            didly_cmd()
                .args(["--api-url", &uri, "--token", "bad"])
                .args(["numbers", "list"])
                .output()
                .unwrap()
        })
        .await
        .unwrap();

        assert_eq!(output.status.code(), Some(4));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn server_message_is_shown_on_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/dids"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({ "error": "Number already owned" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/dids/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let uri = server.uri();
        let output = tokio::task::spawn_blocking(move || {
            didly_cmd()
                .args(["--api-url", &uri, "--token", "t"])
                .args(["buy", "5", "-y"])
                .output()
                .unwrap()
        })
        .await
        .unwrap();

        assert_eq!(output.status.code(), Some(7));
        assert!(String::from_utf8_lossy(&output.stderr).contains("Number already owned"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn declined_configure_never_sends_the_update() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dids"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 7, "phone_number": "4155551234" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/dids/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7, "phone_number": "4155551234"
            })))
            .expect(0)
            .mount(&server)
            .await;

        let uri = server.uri();
        let output = tokio::task::spawn_blocking(move || {
            didly_cmd()
                .args(["--api-url", &uri, "--token", "t"])
                .args(["numbers", "configure", "7", "--sms", "false"])
                .output()
                .unwrap()
        })
        .await
        .unwrap();

        assert_eq!(output.status.code(), Some(2));
        assert!(String::from_utf8_lossy(&output.stderr).contains("requires confirmation"));
    }
}

// ── Config file profiles ────────────────────────────────────────────

// XDG_CONFIG_HOME only steers the config dir on Linux.
#[cfg(target_os = "linux")]
mod profiles {
    use std::path::Path;

    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::didly_cmd;

    fn write_config(home: &Path, body: &str) {
        let dir = home.join("didly");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), body).unwrap();
    }

    fn cmd_in(home: &Path) -> assert_cmd::Command {
        let mut cmd = didly_cmd();
        cmd.env("XDG_CONFIG_HOME", home);
        cmd
    }

    #[test]
    fn config_use_rewrites_the_default_profile() {
        let home = TempDir::new().unwrap();
        write_config(
            home.path(),
            r#"
default_profile = "prod"

[profiles.prod]
api_url = "https://api.example.com"

[profiles.staging]
api_url = "https://staging.example.com"
"#,
        );

        cmd_in(home.path())
            .args(["config", "use", "staging"])
            .assert()
            .success();

        let written = std::fs::read_to_string(home.path().join("didly/config.toml")).unwrap();
        assert!(written.contains(r#"default_profile = "staging""#), "{written}");

        cmd_in(home.path())
            .args(["config", "use", "nope"])
            .assert()
            .code(1);
    }

    #[test]
    fn config_show_masks_plaintext_tokens() {
        let home = TempDir::new().unwrap();
        write_config(
            home.path(),
            r#"
[profiles.default]
api_url = "https://api.example.com"
token = "super-secret"
"#,
        );

        let output = cmd_in(home.path())
            .args(["config", "show", "-o", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(!stdout.contains("super-secret"), "{stdout}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn profile_supplies_url_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dids"))
            .and(header("authorization", "Bearer from-env"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "dids": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let home = TempDir::new().unwrap();
        write_config(
            home.path(),
            &format!(
                r#"
default_profile = "lab"

[profiles.lab]
api_url = "{}"
token_env = "DIDLY_LAB_TOKEN"
"#,
                server.uri()
            ),
        );

        let home_path = home.path().to_path_buf();
        let output = tokio::task::spawn_blocking(move || {
            cmd_in(&home_path)
                .env("DIDLY_LAB_TOKEN", "from-env")
                .args(["numbers", "list", "-o", "json"])
                .output()
                .unwrap()
        })
        .await
        .unwrap();

        assert!(output.status.success(), "{output:?}");
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "[]");
    }
}
