//! Integration tests for the `verlock` binary
//!
//! Drives `fetch`, `locks` and `forget` against a mock hosting provider and
//! static artifact server.

mod common;

use common::{remote_dependency, static_dependency, stderr, stdout, TestProject};
use verlock::core::lock::LockFile;
use verlock::infra::download::compute_checksum;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn read_lock(project: &TestProject) -> LockFile {
    LockFile::from_toml(&project.read_file("verlock.lock")).expect("lock file parses")
}

// ============================================
// verlock fetch
// ============================================

#[tokio::test]
async fn test_fetch_static_dependency() {
    let server = MockServer::start().await;
    serve(&server, "/static/zlib/1.0.tar.gz", "zlib archive").await;

    let project = TestProject::new();
    project.write_config(&server.uri());
    project.write_manifest(&static_dependency("zlib", "latest"));

    let output = project.run(&["fetch"]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Locked 1 dependencies, 0 failed"));

    let lock = read_lock(&project);
    let entry = &lock.dependencies["zlib"];
    assert_eq!(entry.version.to_string(), "1.0");
    assert_eq!(entry.strategy, "static");
    assert_eq!(entry.sha256, compute_checksum(b"zlib archive"));
    assert_eq!(entry.size, 12);
}

#[tokio::test]
async fn test_fetch_partial_failure_exits_nonzero() {
    let server = MockServer::start().await;
    serve(&server, "/static/a/1.0.tar.gz", "a").await;
    serve(&server, "/static/c/1.0.tar.gz", "c").await;

    let project = TestProject::new();
    project.write_config(&server.uri());
    project.write_manifest(&format!(
        "{}{}{}",
        static_dependency("a", "latest"),
        static_dependency("b", "latest"),
        static_dependency("c", "latest"),
    ));

    let output = project.run(&["fetch"]).await;
    assert!(!output.status.success());
    assert!(stdout(&output).contains("Locked 2 dependencies, 1 failed"));
    assert!(stderr(&output).contains("[transport]"));

    let lock = read_lock(&project);
    let names: Vec<_> = lock.dependencies.keys().map(String::as_str).collect();
    assert_eq!(names, ["a", "c"]);
}

#[tokio::test]
async fn test_fetch_remote_tag_latest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/lib/tags"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"name":"v1.2"},{"name":"v1.10-rc.1"},{"name":"v1.9"},{"name":"nightly"}]"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    serve(&server, "/repos/acme/lib/tarball/v1.10-rc.1", "tarball").await;

    let project = TestProject::new();
    project.write_config(&server.uri());
    project.write_manifest(&remote_dependency("lib", "acme/lib", "latest"));

    let output = project.run(&["fetch"]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let lock = read_lock(&project);
    let entry = &lock.dependencies["lib"];
    assert_eq!(entry.version.to_string(), "1.10-rc.1");
    assert!(entry.url.ends_with("/repos/acme/lib/tarball/v1.10-rc.1"));
}

#[tokio::test]
async fn test_fetch_exact_version_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let project = TestProject::new();
    project.write_config(&server.uri());
    project.write_manifest(&static_dependency("zlib", "2.0"));

    let output = project.run(&["fetch"]).await;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("[version_not_found]"));
    assert!(!project.file_exists("verlock.lock"));
}

#[tokio::test]
async fn test_fetch_unsupported_strategy_aborts_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let project = TestProject::new();
    project.write_config(&server.uri());
    project.write_manifest(&format!(
        "{}\n[[dependency]]\nname = \"x\"\nstrategy = \"svn\"\n",
        static_dependency("a", "latest")
    ));

    let output = project.run(&["fetch"]).await;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unsupported strategy 'svn'"));
    assert!(!project.file_exists("verlock.lock"));
}

#[tokio::test]
async fn test_fetch_concurrent_unordered() {
    let server = MockServer::start().await;
    for name in ["a", "b", "c", "d"] {
        serve(&server, &format!("/static/{name}/1.0.tar.gz"), name).await;
    }

    let project = TestProject::new();
    project.write_config(&server.uri());
    project.write_manifest(
        &["a", "b", "c", "d"]
            .iter()
            .map(|name| static_dependency(name, "latest"))
            .collect::<String>(),
    );

    let output = project
        .run(&["fetch", "--concurrency", "4", "--unordered"])
        .await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(read_lock(&project).dependencies.len(), 4);
}

#[tokio::test]
async fn test_fetch_json_output() {
    let server = MockServer::start().await;
    serve(&server, "/static/a/1.0.tar.gz", "a").await;

    let project = TestProject::new();
    project.write_config(&server.uri());
    project.write_manifest(&format!(
        "{}{}",
        static_dependency("a", "latest"),
        static_dependency("b", "latest")
    ));

    let output = project.run(&["fetch", "--json"]).await;
    assert!(!output.status.success());

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["locks"].as_array().unwrap().len(), 1);
    assert_eq!(json["locks"][0]["name"], "a");
    assert_eq!(json["locks"][0]["version"], "1.0");
    assert_eq!(json["errors"][0]["level"], "error");
    assert_eq!(json["errors"][0]["kind"], "transport");
}

#[tokio::test]
async fn test_fetch_stores_artifacts() {
    let server = MockServer::start().await;
    serve(&server, "/static/a/1.0.tar.gz", "artifact bytes").await;

    let project = TestProject::new();
    project.write_config(&server.uri());
    project.write_manifest(&static_dependency("a", "latest"));

    let output = project.run(&["fetch", "--artifacts-dir", "out"]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(project.read_file("out/a-1.0.tar.gz"), "artifact bytes");
}

#[tokio::test]
async fn test_fetch_missing_manifest() {
    let project = TestProject::new();
    let output = project.run(&["fetch"]).await;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Manifest not found"));
}

// ============================================
// verlock locks / forget
// ============================================

#[tokio::test]
async fn test_locks_and_forget() {
    let server = MockServer::start().await;
    serve(&server, "/static/a/1.0.tar.gz", "a").await;
    serve(&server, "/static/b/1.0.tar.gz", "b").await;

    let project = TestProject::new();
    project.write_config(&server.uri());
    project.write_manifest(&format!(
        "{}{}",
        static_dependency("a", "latest"),
        static_dependency("b", "latest")
    ));
    assert!(project.run(&["fetch", "-q"]).await.status.success());

    let listed = stdout(&project.run(&["locks"]).await);
    assert!(listed.contains("a 1.0 (static, sha256:"));
    assert!(listed.contains("b 1.0 (static, sha256:"));

    let forgot = project.run(&["forget", "a"]).await;
    assert!(forgot.status.success(), "stderr: {}", stderr(&forgot));
    assert!(stdout(&forgot).contains("Removed lock for a"));

    let json: serde_json::Value =
        serde_json::from_str(&stdout(&project.run(&["locks", "--json"]).await)).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "b");

    let again = project.run(&["forget", "a"]).await;
    assert!(!again.status.success());
    assert!(stderr(&again).contains("No lock recorded for 'a'"));
}

#[tokio::test]
async fn test_locks_empty() {
    let project = TestProject::new();
    let output = project.run(&["locks"]).await;
    assert!(output.status.success());
    assert!(stdout(&output).contains("No locks recorded"));
}
