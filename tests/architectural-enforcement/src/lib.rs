//! Architectural Enforcement Helpers
//!
//! Source-tree scanning shared by the integration tests in `tests/`. The
//! tests enforce layering rules that the compiler cannot:
//! - `studio-core` stays free of UI frameworks
//! - The waveform and palette modules know nothing about jobs
//! - Shells reach the network only through `studio-core`
//! - No thread-blocking sleeps in async code

use std::fs;
use std::path::{Path, PathBuf};

/// A Rust source file loaded for inspection
pub struct SourceFile {
    /// Path relative to the workspace root
    pub path: PathBuf,
    /// Full file contents
    pub content: String,
}

impl SourceFile {
    /// Lines of production code, 1-based, with `//` comments stripped
    ///
    /// Everything from the first `#[cfg(test)]` onwards is treated as test
    /// code and skipped.
    pub fn production_lines(&self) -> Vec<(usize, &str)> {
        self.content
            .lines()
            .enumerate()
            .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
            .map(|(idx, line)| (idx + 1, line.split("//").next().unwrap_or(line)))
            .filter(|(_, code)| !code.trim().is_empty())
            .collect()
    }

    /// Production lines containing `needle`, formatted for a failure report
    pub fn find(&self, needle: &str) -> Vec<String> {
        self.production_lines()
            .into_iter()
            .filter(|(_, code)| code.contains(needle))
            .map(|(line, code)| format!("{}:{} - {}", self.path.display(), line, code.trim()))
            .collect()
    }
}

/// Workspace root (two levels above this package)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// Load every `.rs` file under `dir` (relative to the workspace root)
///
/// Panics if the directory does not exist, so a moved crate cannot make a
/// rule pass vacuously.
pub fn rust_sources(dir: &str) -> Vec<SourceFile> {
    let root = workspace_root();
    let base = root.join(dir);
    assert!(base.is_dir(), "source directory {dir} not found");

    let mut files: Vec<SourceFile> = walkdir::WalkDir::new(&base)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .filter_map(|e| {
            let content = fs::read_to_string(e.path()).ok()?;
            let path = e.path().strip_prefix(&root).unwrap_or(e.path()).to_path_buf();
            Some(SourceFile { path, content })
        })
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}

/// Report violations and fail
pub fn fail_on(rule: &str, violations: &[String]) {
    if violations.is_empty() {
        return;
    }
    for violation in violations {
        eprintln!("  {violation}");
    }
    panic!("{rule}: {} violation(s)", violations.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let file = SourceFile {
            path: PathBuf::from("x.rs"),
            content: "use a; // note\n\nfn f() {}\n#[cfg(test)]\nmod tests { use b; }\n"
                .to_string(),
        };
        let lines = file.production_lines();
        assert_eq!(lines, vec![(1, "use a; "), (3, "fn f() {}")]);
        assert!(file.find("use b").is_empty());
        assert_eq!(file.find("use a").len(), 1);
    }

    #[test]
    fn test_core_sources_found() {
        assert!(!rust_sources("studio/core/src").is_empty());
    }
}
