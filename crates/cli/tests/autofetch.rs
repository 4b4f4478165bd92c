use assert_cmd::Command;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::tempdir;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn run_harvest(workdir: &Path, server: &MockServer, args: &[&str]) -> Output {
    let workdir: PathBuf = workdir.to_path_buf();
    let uri = server.uri();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    tokio::task::spawn_blocking(move || {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("harvest").expect("binary");
        cmd.current_dir(&workdir)
            .env("HARVEST_GRAPHQL_URL", format!("{uri}/query"))
            .env("HARVEST_NLU_URL", &uri)
            .env("HARVEST_LABELS_URL", format!("{uri}/w/api.php"))
            .env("ROSETTE_API_KEY", "test-key")
            .env_remove("HARVEST_OUT_DIR")
            .env_remove("HARVEST_DELAY_MS")
            .args(&args)
            .output()
            .expect("command run")
    })
    .await
    .expect("join")
}

async fn mount_fixtures(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("\\\"Apple\\\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "page": {
                    "name": "Apple",
                    "hasPart": [
                        {"name": "History", "unsafe": "<p>Apples were domesticated.</p>"},
                        {"name": "Uses", "unsafe": "<p>Cider.</p>"}
                    ]
                }
            }
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("\\\"Nowhere\\\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"page": null},
            "errors": [{"message": "page not found"}]
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/topics"))
        .and(body_string_contains("Apples were domesticated."))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "concepts": [
                {"phrase": "fruit", "conceptId": "Q3314483", "salience": 0.8},
                {"phrase": "color", "conceptId": "P462", "salience": 0.9}
            ],
            "keyphrases": []
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/topics"))
        .and(body_string_contains("Cider."))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "badRequest",
            "message": "Input too short"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn autofetch_writes_parts_and_topics() {
    let server = MockServer::start().await;
    mount_fixtures(&server).await;
    let temp = tempdir().unwrap();

    let output = run_harvest(
        temp.path(),
        &server,
        &["autofetch", "Apple", "Nowhere", "Apple", "--delay-ms", "0"],
    )
    .await;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let parts: Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("data/output-parts.json")).unwrap())
            .unwrap();
    assert_eq!(
        parts,
        json!({
            "Apple - History": [{
                "title": {"page": "Apple", "part": "History"},
                "concept": "fruit (Q3314483)",
                "salience": 0.8
            }]
        })
    );

    let topics: Value = serde_json::from_str(
        &fs::read_to_string(temp.path().join("data/output-topics.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        topics,
        json!({"fruit (Q3314483)": {"0.8": {"page": "Apple", "part": "History"}}})
    );

    let summary: Value = serde_json::from_slice(&output.stdout).expect("summary json");
    assert_eq!(summary["pages"], 2);
    assert_eq!(summary["pages_failed"], 1);
    assert_eq!(summary["parts_processed"], 1);
    assert_eq!(summary["parts_failed"], 1);
    assert_eq!(summary["concepts"], 1);
    assert!(summary.get("labels_path").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn autofetch_resolves_labels_when_asked() {
    let server = MockServer::start().await;
    mount_fixtures(&server).await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "wbgetentities"))
        .and(query_param("ids", "Q3314483"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": {
                "Q3314483": {"labels": {"en": {"language": "en", "value": "fruit"}}}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let temp = tempdir().unwrap();

    let output = run_harvest(
        temp.path(),
        &server,
        &[
            "autofetch",
            "Apple",
            "--name",
            "fruits",
            "--out-dir",
            "out",
            "--pacing",
            "off",
            "--labels",
        ],
    )
    .await;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    assert!(temp.path().join("out/fruits-parts.json").is_file());
    assert!(temp.path().join("out/fruits-topics.json").is_file());
    let labels: Value = serde_json::from_str(
        &fs::read_to_string(temp.path().join("out/fruits-labels.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(labels, json!({"Q3314483": "fruit"}));
}

#[test]
#[allow(deprecated)]
fn autofetch_without_pages_fails() {
    let temp = tempdir().unwrap();
    Command::cargo_bin("harvest")
        .expect("binary")
        .current_dir(temp.path())
        .arg("autofetch")
        .assert()
        .failure()
        .stderr(predicates::str::contains("No pages to harvest"));
    assert!(!temp.path().join("data").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_config_key_is_rejected() {
    let server = MockServer::start().await;
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("harvest.toml"), "graphql = \"http://x\"\n").unwrap();

    let output = run_harvest(temp.path(), &server, &["autofetch", "Apple"]).await;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("harvest.toml"), "stderr: {stderr}");
}
