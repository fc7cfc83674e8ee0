//! Blocking Call Prohibition
//!
//! Everything here runs on tokio. A blocking sleep or HTTP call stalls the
//! poll loop and the frame loop alike.

use architectural_enforcement::{fail_on, rust_sources};

const CRATES: [&str; 3] = ["studio/core/src", "studio/cli/src", "tui/src"];

#[test]
fn test_no_thread_sleep() {
    let mut violations = Vec::new();
    for dir in CRATES {
        for file in rust_sources(dir) {
            violations.extend(file.find("thread::sleep"));
        }
    }
    fail_on("std::thread::sleep in async code", &violations);
}

#[test]
fn test_no_blocking_http() {
    let mut violations = Vec::new();
    for dir in CRATES {
        for file in rust_sources(dir) {
            violations.extend(file.find("reqwest::blocking"));
        }
    }
    fail_on("Blocking HTTP client used", &violations);
}

#[test]
fn test_core_sleeps_only_in_poll_loop() {
    let mut violations = Vec::new();
    for file in rust_sources("studio/core/src") {
        if file.path.ends_with("client.rs") {
            continue;
        }
        violations.extend(file.find("sleep("));
    }
    fail_on("Sleeping outside the poll loop", &violations);
}
