use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use tempfile::tempdir;

fn glossa() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("glossa"));
    cmd.env_remove("GLOSSA_API_TOKEN").env_remove("GLOSSA_API_URL");
    cmd
}

#[test]
fn test_end_to_end_pull() {
    let mut server = Server::new();

    let mock = server
        .mock("GET", "/public/glossa-hosted/repo-1/fr-FR/app")
        .match_header("authorization", "Bearer cli-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"greeting": "bonjour", "farewell": "au revoir"}"#)
        .create();

    let dir = tempdir().unwrap();
    let output = dir.path().join("fr.json");

    glossa()
        .arg("pull")
        .arg(&output)
        .args(["--repo-id", "repo-1"])
        .args(["--language", "fr-FR"])
        .args(["--bundle-name", "app"])
        .args(["--api-token", "cli-token"])
        .args(["--api-url", &server.url()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 2 key(s)"));

    mock.assert();
    let contents = std::fs::read_to_string(&output).unwrap();
    assert!(contents.contains("\"greeting\": \"bonjour\""));
}

#[test]
fn test_end_to_end_pull_with_branch() {
    let mut server = Server::new();

    let mock = server
        .mock("GET", "/public/glossa-hosted/repo-1/de-DE/app")
        .match_query(Matcher::UrlEncoded("branch".into(), "develop".into()))
        .with_status(200)
        .with_body(r#"{"greeting": "hallo"}"#)
        .create();

    let dir = tempdir().unwrap();
    let output = dir.path().join("de.json");

    glossa()
        .arg("pull")
        .arg(&output)
        .args(["--repo-id", "repo-1"])
        .args(["--language", "de-DE"])
        .args(["--bundle-name", "app"])
        .args(["--branch", "develop"])
        .args(["--api-token", "cli-token"])
        .args(["--api-url", &server.url()])
        .assert()
        .success();

    mock.assert();
}

#[test]
fn test_end_to_end_push() {
    let mut server = Server::new();

    let mock = server
        .mock("POST", "/public/glossa-hosted/repo-1/en-US/app")
        .match_query(Matcher::UrlEncoded("override".into(), "true".into()))
        .match_header("authorization", "Bearer cli-token")
        .match_body(Matcher::Json(serde_json::json!({
            "json": {"greeting": "hello"}
        })))
        .with_status(200)
        .with_body(
            r#"{"message": "updated", "total_keys": 1, "keys": [{"key": "greeting", "updated": true}]}"#,
        )
        .create();

    let dir = tempdir().unwrap();
    let input = dir.path().join("en.json");
    std::fs::write(&input, r#"{"greeting": "hello"}"#).unwrap();

    glossa()
        .arg("push")
        .arg(&input)
        .args(["--repo-id", "repo-1"])
        .args(["--language", "en-US"])
        .args(["--bundle-name", "app"])
        .arg("--override")
        .args(["--api-token", "cli-token"])
        .args(["--api-url", &server.url()])
        .assert()
        .success()
        .stdout(predicate::str::contains("updated"))
        .stdout(predicate::str::contains("1 key(s) uploaded"));

    mock.assert();
}

#[test]
fn test_push_reports_service_error() {
    let mut server = Server::new();

    let _mock = server
        .mock("POST", "/public/glossa-hosted/repo-1/en-US/app")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"message": "bundle not found"}"#)
        .create();

    let dir = tempdir().unwrap();
    let input = dir.path().join("en.json");
    std::fs::write(&input, r#"{"greeting": "hello"}"#).unwrap();

    glossa()
        .arg("push")
        .arg(&input)
        .args(["--repo-id", "repo-1"])
        .args(["--language", "en-US"])
        .args(["--bundle-name", "app"])
        .args(["--api-token", "cli-token"])
        .args(["--api-url", &server.url()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bundle not found"));
}

#[test]
fn test_pull_in_ci_without_token_fails() {
    let dir = tempdir().unwrap();

    glossa()
        .arg("pull")
        .arg(dir.path().join("out.json"))
        .args(["--repo-id", "repo-1"])
        .args(["--language", "fr-FR"])
        .args(["--bundle-name", "app"])
        .env("CI", "true")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing API token"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_auth_set_show_reset() {
    let config_home = tempdir().unwrap();

    glossa()
        .arg("auth")
        .arg("integration-key")
        .env("XDG_CONFIG_HOME", config_home.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("API key saved"));

    let config_file = config_home.path().join("glossa/config.json");
    assert!(config_file.exists());

    glossa()
        .arg("auth")
        .arg("--show")
        .env("XDG_CONFIG_HOME", config_home.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("API key: integration-key"));

    glossa()
        .arg("auth")
        .arg("--reset")
        .env("XDG_CONFIG_HOME", config_home.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("API key removed"));

    assert!(!config_file.exists());
}
