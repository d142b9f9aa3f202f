#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

pub struct Sidecar {
    _child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    next_id: u64,
}

pub fn spawn_sidecar() -> Sidecar {
    let exe = env!("CARGO_BIN_EXE_sisd");
    let mut child = Command::new(exe)
        .env_remove("SISD_AI_API_KEY")
        .env_remove("API_KEY")
        .env_remove("SISD_ROSTER_PATH")
        .env("SISD_AI_ENDPOINT", "http://127.0.0.1:9")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn sisd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    Sidecar {
        _child: child,
        stdin,
        reader: BufReader::new(stdout),
        next_id: 0,
    }
}

impl Sidecar {
    pub fn send_line(&mut self, line: &str) -> serde_json::Value {
        writeln!(self.stdin, "{}", line).expect("write request");
        self.stdin.flush().expect("flush request");

        let mut out = String::new();
        self.reader.read_line(&mut out).expect("read response line");
        assert!(!out.trim().is_empty(), "empty response for {}", line);
        serde_json::from_str(out.trim()).expect("parse response json")
    }

    pub fn request(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        self.next_id += 1;
        let id = self.next_id.to_string();
        let payload = json!({
            "id": id,
            "method": method,
            "params": params,
        });
        let value = self.send_line(&payload.to_string());
        assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id.as_str()));
        value
    }

    pub fn request_ok(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        let value = self.request(method, params);
        assert!(
            value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
            "{} failed: {}",
            method,
            value
        );
        value.get("result").cloned().unwrap_or_else(|| json!({}))
    }

    pub fn request_err(&mut self, method: &str, params: serde_json::Value) -> String {
        let value = self.request(method, params);
        assert_eq!(
            value.get("ok").and_then(|v| v.as_bool()),
            Some(false),
            "{} unexpectedly succeeded: {}",
            method,
            value
        );
        value
            .pointer("/error/code")
            .and_then(|v| v.as_str())
            .expect("error code")
            .to_string()
    }
}

pub fn student(id: &str, name: &str, class_name: &str, results: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{}@school.test", id.to_lowercase()),
        "className": class_name,
        "grade": "Grade 10",
        "attendanceRate": 95.0,
        "enrollmentDate": "2023-09-01",
        "expectedGraduationDate": "2026-06-30",
        "status": "Active",
        "results": results,
    })
}

/// Loads a roster where student S has Math/Fall 70 with Sep=80 and Oct=90.
/// The stored 70 is restored to the monthly mean (85) on load.
pub fn load_scenario(sidecar: &mut Sidecar) {
    let students = json!([
        student("S", "Sam Lee", "10-A", json!([
            {
                "subject": "Math",
                "semester": "Fall",
                "score": 70,
                "monthlyScores": [
                    { "month": "September", "score": 80 },
                    { "month": "October", "score": 90 }
                ],
                "teacherComment": "Works hard.",
                "date": "2024-12-01"
            },
            { "subject": "English", "semester": "Fall", "score": 64, "teacherComment": "", "date": "2024-12-01" }
        ])),
        student("T", "Tina Ng", "10-B", json!([
            { "subject": "Math", "semester": "Spring", "score": 88, "teacherComment": "", "date": "2025-05-01" }
        ])),
    ]);
    let r = sidecar.request_ok("roster.load", json!({ "students": students }));
    assert_eq!(r.get("studentCount").and_then(|v| v.as_u64()), Some(2));
}

pub fn math_fall(student: &serde_json::Value) -> serde_json::Value {
    student
        .get("results")
        .and_then(|v| v.as_array())
        .and_then(|arr| {
            arr.iter().find(|r| {
                r.get("subject").and_then(|v| v.as_str()) == Some("Math")
                    && r.get("semester").and_then(|v| v.as_str()) == Some("Fall")
            })
        })
        .cloned()
        .expect("Math/Fall result")
}
