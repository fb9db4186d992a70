//! Test fixtures: topic content and request bodies.

use serde_json::json;

use skilldrill_backend::services::catalog::ContentCatalog;

pub const DOCKER: &str = r#"# Docker

ID: ps
Q: List running containers
A: docker ps

ID: inspect
Q: How do you inspect an image?
A: docker image inspect <image>
MATCH: regex
PATTERN: ^docker\s+(image\s+inspect|inspect)\s+\S+

ID: version
Q: Print the client version
A: docker --version
MATCH: exact
"#;

pub const GIT: &str = r#"# Git

ID: status
Q: Show the working tree status
A: git status

ID: clone
Q: Clone a repository
A: git clone <url>
MATCH: regex
PATTERN: ^git\s+clone\s+\S+
"#;

/// Topic whose rules cannot be evaluated.
pub const BROKEN: &str = r#"# Broken

ID: fuzzy
Q: Unknown mode
A: ls
MATCH: fuzzy

ID: unclosed
Q: Bad pattern
A: ls -la
MATCH: regex
PATTERN: ^ls\s+(-la
"#;

/// Default catalog: docker (3 items), git (2), broken (2), empty (0).
pub fn catalog() -> ContentCatalog {
    ContentCatalog::from_sources(&[
        ("docker", DOCKER),
        ("git", GIT),
        ("broken", BROKEN),
        ("empty", ""),
    ])
    .expect("fixture catalog must parse")
}

/// Topic content with `count` exact-match items `item-0`..`item-{count-1}`.
pub fn numbered_topic(count: usize) -> String {
    (0..count)
        .map(|i| format!("ID: item-{i}\nQ: Question {i}\nA: answer {i}\nMATCH: exact\n"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Create a submit answer request body.
pub fn answer_request(answer: &str) -> serde_json::Value {
    json!({ "answer": answer })
}
