//! Line-based event scripts for replaying an editing session.
//!
//! One event per line, `#` starts a comment:
//!
//! ```text
//! add-cluster
//! select 1
//! add
//! rename db-east
//! move 2 1 0        # node, parent (id | root | none), position
//! attempt 2 root 0  # ask the validator only
//! delete
//! deselect
//! ```

use std::fmt;

use crate::application::bridge::RenderBridge;
use crate::application::editor::{EventOutcome, TopologyEditor};
use crate::application::{ApplicationError, ApplicationResult, ScriptParseError};
use crate::domain::{MoveDecision, NodeId, ParentRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEvent {
    Select(NodeId),
    Deselect,
    AddCluster,
    Add,
    Rename(String),
    Delete,
    Attempt {
        node: NodeId,
        target: Option<ParentRef>,
        position: usize,
    },
    Move {
        node: NodeId,
        target: Option<ParentRef>,
        position: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Event(EventOutcome),
    Decision(MoveDecision),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStep {
    pub line: usize,
    pub event: ScriptEvent,
    pub outcome: StepOutcome,
}

impl ScriptEvent {
    pub fn parse(line: &str) -> Result<Option<Self>, ScriptParseError> {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map(|(v, r)| (v, r.trim()))
            .unwrap_or((line, ""));

        let event = match verb {
            "select" => ScriptEvent::Select(parse_id(rest)?),
            "deselect" => ScriptEvent::Deselect,
            "add-cluster" => ScriptEvent::AddCluster,
            "add" => ScriptEvent::Add,
            "rename" => {
                if rest.is_empty() {
                    return Err(ScriptParseError::MissingArguments {
                        verb: "rename",
                        usage: "<label>",
                    });
                }
                ScriptEvent::Rename(rest.to_string())
            }
            "delete" => ScriptEvent::Delete,
            "attempt" | "move" => {
                let args: Vec<&str> = rest.split_whitespace().collect();
                let [node, target, position] = args.as_slice() else {
                    return Err(ScriptParseError::MissingArguments {
                        verb: if verb == "move" { "move" } else { "attempt" },
                        usage: "<node> <parent|root|none> <position>",
                    });
                };
                let node = parse_id(node)?;
                let target = parse_target(target)?;
                let position = position
                    .parse()
                    .map_err(|_| ScriptParseError::InvalidPosition(position.to_string()))?;
                if verb == "attempt" {
                    ScriptEvent::Attempt {
                        node,
                        target,
                        position,
                    }
                } else {
                    ScriptEvent::Move {
                        node,
                        target,
                        position,
                    }
                }
            }
            other => return Err(ScriptParseError::UnknownEvent(other.to_string())),
        };
        Ok(Some(event))
    }

    pub fn apply<B: RenderBridge>(&self, editor: &mut TopologyEditor<B>) -> StepOutcome {
        let outcome = match self {
            ScriptEvent::Select(id) => editor.on_select(*id),
            ScriptEvent::Deselect => editor.on_deselect(),
            ScriptEvent::AddCluster => editor.add_cluster(),
            ScriptEvent::Add => editor.on_request_add(),
            ScriptEvent::Rename(label) => editor.on_request_rename(label.clone()),
            ScriptEvent::Delete => editor.on_request_delete(),
            ScriptEvent::Attempt {
                node,
                target,
                position,
            } => {
                return StepOutcome::Decision(editor.on_move_attempt(*node, *target, *position))
            }
            ScriptEvent::Move {
                node,
                target,
                position,
            } => editor.on_move_dropped(*node, *target, *position),
        };
        StepOutcome::Event(outcome)
    }
}

/// Cuts a trailing comment: `#` at the start of the line or after whitespace.
/// A `#` inside a word, as in `rename bucket#2`, is kept.
fn strip_comment(line: &str) -> &str {
    let mut previous = None;
    for (idx, c) in line.char_indices() {
        if c == '#' && previous.map_or(true, char::is_whitespace) {
            return &line[..idx];
        }
        previous = Some(c);
    }
    line
}

fn parse_id(token: &str) -> Result<NodeId, ScriptParseError> {
    token
        .parse()
        .map_err(|_| ScriptParseError::InvalidNodeId(token.to_string()))
}

fn parse_target(token: &str) -> Result<Option<ParentRef>, ScriptParseError> {
    match token {
        "root" => Ok(Some(ParentRef::Container)),
        "none" | "-" => Ok(None),
        id => parse_id(id).map(|id| Some(ParentRef::Node(id))),
    }
}

impl fmt::Display for ScriptEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = |t: &Option<ParentRef>| t.map_or("none".to_string(), |t| t.to_string());
        match self {
            ScriptEvent::Select(id) => write!(f, "select {id}"),
            ScriptEvent::Deselect => f.write_str("deselect"),
            ScriptEvent::AddCluster => f.write_str("add-cluster"),
            ScriptEvent::Add => f.write_str("add"),
            ScriptEvent::Rename(label) => write!(f, "rename {label}"),
            ScriptEvent::Delete => f.write_str("delete"),
            ScriptEvent::Attempt {
                node,
                target: t,
                position,
            } => write!(f, "attempt {node} {} {position}", target(t)),
            ScriptEvent::Move {
                node,
                target: t,
                position,
            } => write!(f, "move {node} {} {position}", target(t)),
        }
    }
}

/// A parsed script ready to be replayed against an editor.
#[derive(Debug, Clone, Default)]
pub struct ScriptRunner {
    events: Vec<(usize, ScriptEvent)>,
}

impl ScriptRunner {
    /// Parses the whole script up front; the first malformed line aborts.
    pub fn parse(content: &str) -> ApplicationResult<Self> {
        let mut events = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            if let Some(event) = ScriptEvent::parse(line)
                .map_err(|source| ApplicationError::Script {
                    line: line_no,
                    source,
                })?
            {
                events.push((line_no, event));
            }
        }
        Ok(Self { events })
    }

    /// Parsed events with their 1-based line numbers.
    pub fn events(&self) -> &[(usize, ScriptEvent)] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Replays every event in order. Rejections do not stop the replay.
    pub fn run<B: RenderBridge>(&self, editor: &mut TopologyEditor<B>) -> Vec<ScriptStep> {
        self.events
            .iter()
            .map(|(line, event)| ScriptStep {
                line: *line,
                event: event.clone(),
                outcome: event.apply(editor),
            })
            .collect()
    }
}
