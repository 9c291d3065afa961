use std::io::Write;
use std::process::{Command, Output, Stdio};

const BUCKET: &str = "http://bucket.test/b";
const PDF: &str = "http://pdf.test/p.php";

fn visor() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_visor"));
    for var in [
        "VISOR_BUCKET_BASE",
        "VISOR_PDF_ENDPOINT",
        "VISOR_PROBE_TIMEOUT_SECS",
        "RUST_LOG_FORMAT",
    ] {
        command.env_remove(var);
    }
    command.env("RUST_LOG", "warn");
    command
}

/// Run `visor` against fixed test backends unless `env` overrides them.
pub fn run_visor(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut command = visor();
    command
        .args(args)
        .env("VISOR_BUCKET_BASE", BUCKET)
        .env("VISOR_PDF_ENDPOINT", PDF);
    for (key, value) in env {
        command.env(key, value);
    }

    command.output().expect("Failed to run visor")
}

/// Run `visor` with `stdin` piped in.
pub fn run_visor_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = visor()
        .args(args)
        .env("VISOR_BUCKET_BASE", BUCKET)
        .env("VISOR_PDF_ENDPOINT", PDF)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn visor");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");

    child.wait_with_output().expect("Failed to wait for visor")
}

pub fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "visor should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|_| panic!("Should output valid JSON, got: {}", stdout))
}
