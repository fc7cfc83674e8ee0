//! Layering Rules
//!
//! `studio-core` is the only crate that talks to the generation service, and
//! it knows nothing about terminals. The visualizer and palette are pure and
//! must not learn about jobs.

use architectural_enforcement::{fail_on, rust_sources};

#[test]
fn test_core_has_no_ui_dependencies() {
    let mut violations = Vec::new();
    for file in rust_sources("studio/core/src") {
        for needle in ["ratatui", "crossterm", "clap::", "anyhow"] {
            violations.extend(file.find(needle));
        }
    }
    fail_on("UI or binary-only crates used in studio-core", &violations);
}

#[test]
fn test_visualizer_is_job_agnostic() {
    let mut violations = Vec::new();
    for file in rust_sources("studio/core/src") {
        let name = file.path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if name != "waveform.rs" && name != "palette.rs" {
            continue;
        }
        for needle in ["crate::client", "crate::job", "crate::session", "crate::service"] {
            violations.extend(file.find(needle));
        }
    }
    fail_on("Visualizer depends on job lifecycle", &violations);
}

#[test]
fn test_shells_do_not_call_the_service_directly() {
    let mut violations = Vec::new();
    for dir in ["studio/cli/src", "tui/src"] {
        for file in rust_sources(dir) {
            violations.extend(file.find("reqwest"));
        }
    }
    fail_on("Front end bypasses studio-core", &violations);
}
