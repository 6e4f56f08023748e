//! Shared test utilities for integration tests
//!
//! Provides the fixture repository used across multiple test files.

#![allow(dead_code)]

use assert_fs::prelude::*;

/// Build a small repository with task lists, docs and ignore rules.
///
/// Visible: `TODO.md`, `api/TODO.md`, `README.md`, `docs/guide.md`.
/// Hidden by `.gitignore`: `build/TODO.md`, `scratch.todo.md`.
pub fn make_repo() -> assert_fs::TempDir
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    tmp.child(".gitignore")
        .write_str("build/\n*.todo.md\n# comment\n\n")
        .expect("write .gitignore");

    tmp.child("TODO.md")
        .write_str("# Setup\n- [x] init repo\n- [ ] write tests\n\n# Release\n* [ ] tag v1\n")
        .expect("write TODO.md");

    tmp.child("api/TODO.md")
        .write_str("- [ ] document endpoints\r\n- [ ] add auth\r\n")
        .expect("write api/TODO.md");

    tmp.child("build/TODO.md")
        .write_str("- [ ] generated\n")
        .expect("write build/TODO.md");

    tmp.child("scratch.todo.md")
        .write_str("- [ ] scratch\n")
        .expect("write scratch.todo.md");

    tmp.child("README.md")
        .write_str("# Demo\nA demo project.\n\n## Usage\nRun it.\n")
        .expect("write README.md");

    tmp.child("docs/guide.md")
        .write_str("intro without heading\n# Guide\nStep one.\n")
        .expect("write guide");

    tmp
}
