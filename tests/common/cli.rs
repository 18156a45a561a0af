use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};
use tempfile::TempDir;

#[derive(Debug)]
pub struct GhtRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
    pub duration: Duration,
    pub log_path: PathBuf,
}

impl GhtRun {
    /// Parsed structured error envelope from stderr.
    pub fn error_json(&self) -> serde_json::Value {
        let payload = extract_json_payload(&self.stderr);
        serde_json::from_str(&payload).expect("parse error json")
    }
}

/// A temporary vault plus a snapshot file and a run log directory.
pub struct GhtWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub vault: PathBuf,
    pub snapshot: PathBuf,
    pub log_dir: PathBuf,
}

impl GhtWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let vault = root.join("vault");
        let log_dir = root.join("logs");
        fs::create_dir_all(&vault).expect("vault dir");
        fs::create_dir_all(&log_dir).expect("log dir");
        Self {
            snapshot: root.join("snapshot.json"),
            temp_dir,
            root,
            vault,
            log_dir,
        }
    }

    pub fn write_note(&self, path: &str, text: &str) {
        let full = self.vault.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("note dir");
        }
        fs::write(full, text).expect("write note");
    }

    pub fn read_note(&self, path: &str) -> String {
        fs::read_to_string(self.vault.join(path)).expect("read note")
    }

    pub fn write_snapshot(&self, json: &str) {
        fs::write(&self.snapshot, json).expect("write snapshot");
    }

    pub fn write_vault_config(&self, yaml: &str) {
        let dir = self.vault.join(".ghtasks");
        fs::create_dir_all(&dir).expect("config dir");
        fs::write(dir.join("config.yaml"), yaml).expect("write config");
    }
}

pub fn run_ght<I, S>(workspace: &GhtWorkspace, args: I, label: &str) -> GhtRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_ght_with_env(
        workspace,
        args,
        std::iter::empty::<(String, String)>(),
        label,
    )
}

/// Run `ght` against the workspace vault and snapshot.
///
/// `HOME` points into the workspace so no user config leaks in.
pub fn run_ght_with_env<I, S, E, K, V>(
    workspace: &GhtWorkspace,
    args: I,
    env_vars: E,
    label: &str,
) -> GhtRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ght"));
    cmd.current_dir(&workspace.root);
    for key in ["GHT_VAULT", "GHT_SNAPSHOT", "GHT_NOW"] {
        cmd.env_remove(key);
    }
    cmd.env("GHT_VAULT", &workspace.vault);
    if workspace.snapshot.exists() {
        cmd.env("GHT_SNAPSHOT", &workspace.snapshot);
    }
    cmd.env("GHT_NOW", super::fixtures::NOW);
    cmd.args(args);
    cmd.envs(env_vars);
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "ghtasks=debug");
    cmd.env("RUST_BACKTRACE", "1");
    cmd.env("HOME", &workspace.root);

    let start = Instant::now();
    let output = cmd.output().expect("run ght");
    let duration = start.elapsed();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let log_path = workspace.log_dir.join(format!("{label}.log"));
    let timestamp = SystemTime::now();
    let log_body = format!(
        "label: {label}\nstarted: {:?}\nduration: {:?}\nstatus: {}\nargs: {:?}\ncwd: {}\n\nstdout:\n{}\n\nstderr:\n{}\n",
        timestamp,
        duration,
        output.status,
        cmd.get_args().collect::<Vec<_>>(),
        workspace.root.display(),
        stdout,
        stderr
    );
    fs::write(&log_path, log_body).expect("write log");

    GhtRun {
        stdout,
        stderr,
        status: output.status,
        duration,
        log_path,
    }
}

/// The JSON document starting at the first line that opens an object or
/// array. Debug log lines before it are skipped.
pub fn extract_json_payload(output: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();
    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            return lines[idx..].join("\n").trim().to_string();
        }
    }
    output.trim().to_string()
}
