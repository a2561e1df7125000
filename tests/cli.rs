use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
    "screen": { "width": 1920, "height": 1080 },
    "displays": [
        {
            "id": "main",
            "bounds": { "left": 100, "top": 50, "width": 1920, "height": 1080 },
            "workArea": { "left": 100, "top": 75, "width": 1920, "height": 1055 },
            "scaleFactor": 2,
            "isPrimary": true
        }
    ],
    "windows": [
        { "id": 1, "type": "normal", "left": 110, "top": 70, "width": 800, "height": 450 },
        { "id": 2, "type": "popup", "left": 300, "top": 300, "width": 420, "height": 360 }
    ],
    "currentWindow": 2
}"#;

// A preview height this large makes the preview scale exactly 0.25.
const CONFIG: &str = r#"
[settings]
log_filter = "warn"

[settings.preview]
container_width = 480
max_height = 600
"#;

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("host.json"), SNAPSHOT).unwrap();
        fs::write(dir.path().join("config.toml"), CONFIG).unwrap();
        Env { dir }
    }

    fn path(&self, name: &str) -> PathBuf { self.dir.path().join(name) }

    fn run(&self, args: &[&str]) -> Output {
        test_bin::get_test_bin("window-resizer")
            .arg("--config")
            .arg(self.path("config.toml"))
            .arg("--host")
            .arg(self.path("host.json"))
            .arg("--prefs")
            .arg(self.path("prefs.json"))
            .args(args)
            .output()
            .expect("failed to run window-resizer")
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let out = self.run(args);
        assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
        serde_json::from_slice(&out.stdout).unwrap()
    }

    fn host(&self) -> Value { read_json(&self.path("host.json")) }
}

fn read_json(path: &Path) -> Value { serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap() }

#[test]
fn locate_reports_display_local_rect() {
    let env = Env::new();
    let located = env.run_json(&["locate", "--window", "1"]);
    assert_eq!(located["systemRect"], json!({
        "left": 100.0, "top": 50.0, "width": 1920.0, "height": 1080.0
    }));
    assert_eq!(located["windowRect"], json!({
        "left": 10.0, "top": 20.0, "width": 800.0, "height": 450.0
    }));
    assert_eq!(located["display"], json!("main"));
}

#[test]
fn apply_moves_window_and_closes_popup() {
    let env = Env::new();
    let report = env.run_json(&["apply", "--window", "1", "--dx", "40", "--dy", "20"]);
    assert_eq!(report["update"], json!({
        "left": 150, "top": 90, "width": 800, "height": 450, "focused": true
    }));
    assert_eq!(report["status"]["key"], json!("applied"));

    let host = env.host();
    let windows = host["windows"].as_array().unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0]["left"], json!(150.0));
    assert_eq!(host["selfClosed"], json!(true));

    // The target is remembered for the next session.
    let preview = env.run_json(&["preview", "--ratio", "1:1"]);
    assert_eq!(preview["target"], json!(1));
    assert_eq!(preview["ratio"], json!("1:1"));
    assert_eq!(preview["virtualRect"], json!({
        "left": 50.0, "top": 40.0, "width": 800.0, "height": 800.0
    }));
    assert_eq!(preview["preview"], json!({
        "scale": 0.25,
        "screenWidth": 480.0,
        "screenHeight": 270.0,
        "window": { "left": 12.5, "top": 10.0, "width": 200.0, "height": 200.0 }
    }));
}

#[test]
fn apply_without_target_fails() {
    let env = Env::new();
    let out = env.run(&["apply", "--keep-open"]);
    assert!(!out.status.success());
    let report: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["status"], json!({ "key": "missingWindow" }));
    assert_eq!(env.host()["windows"].as_array().unwrap().len(), 2);
}

#[test]
fn keep_open_leaves_resizer_window() {
    let env = Env::new();
    env.run_json(&["close-on-apply", "true"]);
    let report = env.run_json(&["apply", "--window", "1", "--keep-open", "--dw", "-100"]);
    assert_eq!(report["update"]["width"], json!(700));
    assert_eq!(env.host()["windows"].as_array().unwrap().len(), 2);
    assert_eq!(read_json(&env.path("prefs.json"))["closeOnApply"], json!(true));
}

#[test]
fn rpc_counter_persists_between_runs() {
    let env = Env::new();
    assert_eq!(env.run_json(&["rpc", "ping"]), json!("pong"));
    assert_eq!(env.run_json(&["rpc", "counter-get"]), json!(0));
    assert_eq!(env.run_json(&["rpc", "counter-increment"]), json!(1));
    assert_eq!(env.run_json(&["rpc", "counter-increment"]), json!(2));
    assert_eq!(env.run_json(&["rpc", "counter-get"]), json!(2));
}

#[test]
fn guide_accepts_only_onboarding_messages() {
    let env = Env::new();
    let ok = env.run(&[
        "guide",
        r#"{"source":"wxt-onboarding-injected","type":"wxt-guide-copy-markdown","markdown":"hi"}"#,
    ]);
    assert!(ok.status.success());
    assert_eq!(String::from_utf8_lossy(&ok.stdout).trim(), "hi");

    let bad = env.run(&["guide", r#"{"source":"elsewhere","type":"wxt-guide-copy-markdown"}"#]);
    assert!(!bad.status.success());
}
