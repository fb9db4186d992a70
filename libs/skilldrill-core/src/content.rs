//! Parser for topic files.
//!
//! # Format
//! ```markdown
//! # Docker
//!
//! ID: list-images
//! Q: How do you list Docker images?
//! A: docker images
//! A: docker image ls
//!
//! ID: inspect-image
//! Q: How do you inspect an image?
//! A: docker image inspect <image>
//! MATCH: regex
//! PATTERN: ^docker\s+(image\s+inspect|inspect)\s+\S+
//! ```
//!
//! Every item starts with an `ID:` line. `A:` may repeat, one canonical
//! answer per line. `MATCH:` takes a mode (`exact`, `normalized`, `regex`)
//! followed by flags (`case-sensitive`, and `keep-whitespace` for
//! `normalized`). Items without `MATCH:` use case-insensitive, whitespace
//! collapsing normalized matching.
//!
//! A rule that cannot be understood does not fail the file. The item is kept
//! with a defect so it still counts towards the topic size but never grades
//! as correct.

use std::collections::HashSet;

use crate::error::{ContentIntegrityError, ParseError, Result};
use crate::matching::Pattern;
use crate::types::{Item, MatchRule, Topic, ALL_TOPICS};

/// Parse a topic file into a [`Topic`].
pub fn parse_topic(topic_id: &str, content: &str) -> Result<Topic> {
    if topic_id == ALL_TOPICS {
        return Err(ParseError::ReservedTopicId(topic_id.to_string()));
    }
    if !is_valid_id(topic_id) {
        return Err(ParseError::InvalidId {
            line: 0,
            value: topic_id.to_string(),
        });
    }

    let mut parser = Parser::new(topic_id);
    for (idx, line) in content.lines().enumerate() {
        parser.process_line(line, idx + 1)?;
    }
    parser.finish()
}

/// Ids are non-empty and limited to ASCII letters, digits, `-`, `_` and `.`.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Question,
    Answer,
}

struct ItemBuilder {
    id: String,
    start_line: usize,
    question: Option<String>,
    answers: Vec<String>,
    mode: Option<String>,
    pattern: Option<String>,
}

impl ItemBuilder {
    fn new(id: String, start_line: usize) -> Self {
        Self {
            id,
            start_line,
            question: None,
            answers: Vec::new(),
            mode: None,
            pattern: None,
        }
    }

    fn build(self, topic_id: &str) -> Result<Item> {
        let prompt = self.question.ok_or_else(|| ParseError::MissingQuestion {
            id: self.id.clone(),
            line: self.start_line,
        })?;
        if self.answers.is_empty() {
            return Err(ParseError::MissingAnswer {
                id: self.id,
                line: self.start_line,
            });
        }

        let (rule, defect) = match resolve_rule(self.mode.as_deref(), self.pattern) {
            Ok(rule) => (rule, None),
            Err(defect) => (MatchRule::default(), Some(defect)),
        };

        Ok(Item {
            topic_id: topic_id.to_string(),
            id: self.id,
            prompt,
            answers: self.answers,
            rule,
            defect,
        })
    }
}

fn resolve_rule(
    mode_line: Option<&str>,
    pattern: Option<String>,
) -> std::result::Result<MatchRule, ContentIntegrityError> {
    let mut tokens = mode_line.unwrap_or("normalized").split_whitespace();
    let mode = tokens.next().unwrap_or("normalized").to_lowercase();
    let flags: Vec<&str> = tokens.collect();

    let unknown_flag = |flag: &str| ContentIntegrityError::UnknownFlag {
        mode: mode.clone(),
        flag: flag.to_string(),
    };

    match mode.as_str() {
        "exact" => {
            if let Some(&flag) = flags.first() {
                return Err(unknown_flag(flag));
            }
            if pattern.is_some() {
                return Err(ContentIntegrityError::UnexpectedPattern(mode.clone()));
            }
            Ok(MatchRule::Exact)
        }
        "normalized" => {
            let mut case_sensitive = false;
            let mut normalize_whitespace = true;
            for flag in flags {
                match flag {
                    "case-sensitive" => case_sensitive = true,
                    "keep-whitespace" => normalize_whitespace = false,
                    other => return Err(unknown_flag(other)),
                }
            }
            if pattern.is_some() {
                return Err(ContentIntegrityError::UnexpectedPattern(mode.clone()));
            }
            Ok(MatchRule::Normalized {
                case_sensitive,
                normalize_whitespace,
            })
        }
        "regex" => {
            let mut case_sensitive = false;
            for flag in flags {
                match flag {
                    "case-sensitive" => case_sensitive = true,
                    other => return Err(unknown_flag(other)),
                }
            }
            let pattern = pattern.ok_or(ContentIntegrityError::MissingPattern)?;
            Ok(MatchRule::Regex(Pattern::new(pattern, case_sensitive)?))
        }
        _ => Err(ContentIntegrityError::UnknownMode(mode.clone())),
    }
}

struct Parser<'a> {
    topic_id: &'a str,
    title: Option<String>,
    items: Vec<Item>,
    seen_ids: HashSet<String>,
    current: Option<ItemBuilder>,
    current_field: Option<Field>,
    buffer: Vec<String>,
}

impl<'a> Parser<'a> {
    fn new(topic_id: &'a str) -> Self {
        Self {
            topic_id,
            title: None,
            items: Vec::new(),
            seen_ids: HashSet::new(),
            current: None,
            current_field: None,
            buffer: Vec::new(),
        }
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<()> {
        match Self::parse_line(line) {
            LineType::Id(id) => self.handle_id(id, line_num)?,
            LineType::Question(text) => self.start_field(Field::Question, text, line_num)?,
            LineType::Answer(text) => self.start_field(Field::Answer, text, line_num)?,
            LineType::Match(mode) => {
                let builder = self.current_item(line_num)?;
                builder.mode = Some(mode.to_string());
            }
            LineType::Pattern(pattern) => {
                let builder = self.current_item(line_num)?;
                builder.pattern = Some(pattern.to_string());
            }
            LineType::Heading(text) if self.current.is_none() => {
                if self.title.is_none() {
                    self.title = Some(text.to_string());
                }
            }
            LineType::Heading(_) => self.push_text(line),
            LineType::Text(text) => self.push_text(text),
            LineType::Empty => self.push_text(""),
        }
        Ok(())
    }

    fn parse_line(line: &str) -> LineType<'_> {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("ID:") {
            LineType::Id(rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("Q:") {
            LineType::Question(rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("A:") {
            LineType::Answer(rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("MATCH:") {
            LineType::Match(rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("PATTERN:") {
            LineType::Pattern(rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("# ") {
            LineType::Heading(rest.trim())
        } else if trimmed.is_empty() {
            LineType::Empty
        } else {
            LineType::Text(line)
        }
    }

    fn handle_id(&mut self, id: &str, line_num: usize) -> Result<()> {
        self.finish_item()?;

        if !is_valid_id(id) {
            return Err(ParseError::InvalidId {
                line: line_num,
                value: id.to_string(),
            });
        }
        if !self.seen_ids.insert(id.to_string()) {
            return Err(ParseError::DuplicateId {
                id: id.to_string(),
                line: line_num,
            });
        }

        self.current = Some(ItemBuilder::new(id.to_string(), line_num));
        Ok(())
    }

    fn start_field(&mut self, field: Field, text: &str, line_num: usize) -> Result<()> {
        self.current_item(line_num)?;
        self.current_field = Some(field);
        self.buffer.push(text.to_string());
        Ok(())
    }

    /// Flush pending text and return the open item.
    fn current_item(&mut self, line_num: usize) -> Result<&mut ItemBuilder> {
        self.flush_buffer();
        self.current_field = None;
        self.current
            .as_mut()
            .ok_or(ParseError::MissingId { line: line_num })
    }

    fn push_text(&mut self, text: &str) {
        if self.current_field.is_some() {
            self.buffer.push(text.to_string());
        }
    }

    fn flush_buffer(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let content = self.buffer.join("\n").trim().to_string();
        self.buffer.clear();

        if let Some(ref mut item) = self.current {
            match self.current_field {
                Some(Field::Question) => item.question = Some(content),
                Some(Field::Answer) if !content.is_empty() => item.answers.push(content),
                _ => {}
            }
        }
    }

    fn finish_item(&mut self) -> Result<()> {
        self.flush_buffer();
        self.current_field = None;
        if let Some(builder) = self.current.take() {
            self.items.push(builder.build(self.topic_id)?);
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Topic> {
        self.finish_item()?;
        Ok(Topic {
            id: self.topic_id.to_string(),
            title: self.title.unwrap_or_else(|| self.topic_id.to_string()),
            items: self.items,
        })
    }
}

enum LineType<'a> {
    Id(&'a str),
    Question(&'a str),
    Answer(&'a str),
    Match(&'a str),
    Pattern(&'a str),
    Heading(&'a str),
    Text(&'a str),
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOCKER: &str = "# Docker basics

ID: list-images
Q: How do you list Docker images?
A: docker images
A: docker image ls

ID: inspect-image
Q: How do you inspect an image?
A: docker image inspect <image>
MATCH: regex
PATTERN: ^docker\\s+(image\\s+inspect|inspect)\\s+\\S+

ID: version
Q: Print the client version
A: docker --version
MATCH: exact
";

    #[test]
    fn parse_topic_file() {
        let topic = parse_topic("docker", DOCKER).unwrap();
        assert_eq!(topic.title, "Docker basics");
        assert_eq!(topic.item_ids(), vec!["list-images", "inspect-image", "version"]);

        let list = topic.item("list-images").unwrap();
        assert_eq!(list.prompt, "How do you list Docker images?");
        assert_eq!(list.answers, vec!["docker images", "docker image ls"]);
        assert_eq!(list.rule, MatchRule::default());
        assert_eq!(list.defect, None);

        let inspect = topic.item("inspect-image").unwrap();
        assert_eq!(
            inspect.rule,
            MatchRule::Regex(
                Pattern::new(r"^docker\s+(image\s+inspect|inspect)\s+\S+", false).unwrap()
            )
        );
        assert_eq!(topic.item("version").unwrap().rule, MatchRule::Exact);
    }

    #[test]
    fn normalized_flags() {
        let input = "ID: a\nQ: q\nA: a\nMATCH: normalized case-sensitive keep-whitespace";
        let topic = parse_topic("t", input).unwrap();
        assert_eq!(
            topic.items[0].rule,
            MatchRule::Normalized {
                case_sensitive: true,
                normalize_whitespace: false
            }
        );
    }

    #[test]
    fn title_defaults_to_topic_id() {
        let topic = parse_topic("git", "ID: a\nQ: q\nA: a").unwrap();
        assert_eq!(topic.title, "git");
    }

    #[test]
    fn multiline_prompt() {
        let topic = parse_topic("t", "ID: a\nQ: Line 1\nLine 2\n\nA: ans\n").unwrap();
        assert_eq!(topic.items[0].prompt, "Line 1\nLine 2");
    }

    #[test]
    fn unknown_mode_becomes_defect() {
        let topic = parse_topic("t", "ID: a\nQ: q\nA: a\nMATCH: fuzzy").unwrap();
        assert_eq!(
            topic.items[0].defect,
            Some(ContentIntegrityError::UnknownMode("fuzzy".into()))
        );
    }

    #[test]
    fn malformed_regex_becomes_defect() {
        let topic = parse_topic("t", "ID: a\nQ: q\nA: a\nMATCH: regex\nPATTERN: ^(unclosed").unwrap();
        assert!(matches!(
            topic.items[0].defect,
            Some(ContentIntegrityError::MalformedRegex { .. })
        ));
    }

    #[test]
    fn regex_without_pattern_becomes_defect() {
        let topic = parse_topic("t", "ID: a\nQ: q\nA: a\nMATCH: regex").unwrap();
        assert_eq!(topic.items[0].defect, Some(ContentIntegrityError::MissingPattern));
    }

    #[test]
    fn unknown_flag_becomes_defect() {
        let topic = parse_topic("t", "ID: a\nQ: q\nA: a\nMATCH: exact loose").unwrap();
        assert_eq!(
            topic.items[0].defect,
            Some(ContentIntegrityError::UnknownFlag {
                mode: "exact".into(),
                flag: "loose".into()
            })
        );
    }

    #[test]
    fn reject_duplicate_ids() {
        let result = parse_topic("t", "ID: a\nQ: q\nA: a\n\nID: a\nQ: q2\nA: a2");
        assert_eq!(
            result,
            Err(ParseError::DuplicateId {
                id: "a".into(),
                line: 5
            })
        );
    }

    #[test]
    fn reject_question_without_id() {
        let result = parse_topic("t", "Q: q\nA: a");
        assert_eq!(result, Err(ParseError::MissingId { line: 1 }));
    }

    #[test]
    fn reject_missing_answer() {
        let result = parse_topic("t", "ID: a\nQ: q");
        assert!(matches!(result, Err(ParseError::MissingAnswer { .. })));
    }

    #[test]
    fn reject_invalid_id() {
        let result = parse_topic("t", "ID: two words\nQ: q\nA: a");
        assert!(matches!(result, Err(ParseError::InvalidId { line: 1, .. })));
    }

    #[test]
    fn reject_reserved_topic_id() {
        let result = parse_topic("all", "");
        assert_eq!(result, Err(ParseError::ReservedTopicId("all".into())));
    }

    #[test]
    fn empty_file_has_no_items() {
        let topic = parse_topic("empty", "").unwrap();
        assert!(topic.items.is_empty());
    }
}
