//! FILENAME: tests/common/mod.rs
//! Harness for running the `cantabular-csv` binary against saved responses.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

pub const SAMPLE_RESPONSE: &str = r#"{"data":{"dataset":{"table":{
    "dimensions":[
        {"count":2,"variable":{"name":"sex","label":"Sex"},
         "categories":[{"code":"1","label":"Male"},{"code":"2","label":"Female"}]},
        {"count":3,"variable":{"name":"age","label":"Age, banded"},
         "categories":[{"code":"1","label":"0-15"},{"code":"2","label":"16-64"},{"code":"3","label":"65+"}]}],
    "values":[10,11,12,13,14,15],
    "error":null}}}}"#;

pub const SAMPLE_CSV: &str = "Sex,\"Age, banded\",count\n\
Male,0-15,10\n\
Male,16-64,11\n\
Male,65+,12\n\
Female,0-15,13\n\
Female,16-64,14\n\
Female,65+,15\n";

pub const ERRORS_RESPONSE: &str =
    r#"{"data":null,"errors":[{"message":"400 Bad Request: dataset not found"}]}"#;

pub const BLOCKED_RESPONSE: &str = r#"{"data":{"dataset":{"table":{
    "dimensions":[],"values":null,"error":"Disclosure control: table is blocked"}}}}"#;

pub const VARIABLES_RESPONSE: &str = r#"{"data":{"dataset":{
    "variables":{"edges":[{"node":{"name":"sex"}},{"node":{"name":"oa"}},{"node":{"name":"lad"}}]},
    "ruleBase":{"name":"oa","isSourceOf":{"edges":[{"node":{"name":"oa"}},{"node":{"name":"lad"}}]}}}}}"#;

/// A scratch directory plus a handle on the binary.
pub struct CliHarness {
    pub dir: TempDir,
}

impl CliHarness {
    pub fn new() -> Self {
        CliHarness {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Writes `content` to a file in the scratch directory.
    pub fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// The binary with a clean configuration environment.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_cantabular-csv"));
        cmd.current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .env_remove("CANTABULAR_CSV_MODE")
            .env_remove("CANTABULAR_CSV_CATEGORIES")
            .env_remove("CANTABULAR_CSV_DELIMITER");
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().unwrap()
    }

    /// Runs with `stdin` fed from a string.
    pub fn run_with_stdin(&self, args: &[&str], stdin: &str) -> Output {
        let mut child = self
            .command()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child
            .stdin
            .take()
            .unwrap()
            .write_all(stdin.as_bytes())
            .unwrap();
        child.wait_with_output().unwrap()
    }
}

pub fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}
