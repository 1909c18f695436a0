//! Core data model.
//!
//! A work instruction is a titled document owning an ordered list of steps.
//! Steps have no identity of their own; they are stored inline with their
//! parent and only ever read or written through it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Collection that work instruction documents live in.
pub const INSTRUCTION_COLLECTION: &str = "workinstruction";

/// Title reported for stored documents that have none.
pub const UNTITLED: &str = "Untitled";

// ---------------------------------------------------------------------------
// Record Id
// ---------------------------------------------------------------------------

/// Storage-native identifier for a stored document.
///
/// Opaque to callers: it can be parsed from a string, compared, and written
/// back out as a string. Parsing is the only validation a path parameter
/// gets before it reaches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First 8 characters, for compact CLI output.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }

    /// Resolve `raw` against known ids.
    ///
    /// A full id in any form `Uuid` accepts wins outright. Anything else is
    /// treated as a prefix of the hyphenated form and must match exactly one
    /// candidate.
    pub fn resolve(raw: &str, candidates: impl IntoIterator<Item = RecordId>) -> Result<Self> {
        if let Ok(id) = raw.parse::<RecordId>() {
            return Ok(id);
        }
        let prefix = raw.to_ascii_lowercase();
        let matches: Vec<RecordId> = candidates
            .into_iter()
            .filter(|id| id.to_string().starts_with(&prefix))
            .collect();
        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(Error::NotFound(format!("no work instruction matching '{raw}'"))),
            many => Err(Error::Other(format!(
                "{} work instructions match '{raw}', be more specific",
                many.len()
            ))),
        }
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(RecordId)
            .map_err(|_| Error::MalformedId(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// One step of a work instruction.
///
/// On input `order` is only a sort key; once persisted it is the step's
/// zero-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub order: u64,
}

impl Step {
    pub fn new(title: impl Into<String>, order: u64) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            order,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Order Key
// ---------------------------------------------------------------------------

/// Sort key of a step that has not been normalized yet.
///
/// Any non-negative integer, however large. Held as canonical decimal
/// digits (no leading zeros) so that comparison is exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderKey(String);

impl OrderKey {
    /// From a run of ASCII digits. `None` if empty or not all digits.
    pub fn from_digits(digits: &str) -> Option<Self> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let trimmed = digits.trim_start_matches('0');
        let canonical = if trimmed.is_empty() { "0" } else { trimmed };
        Some(Self(canonical.to_string()))
    }

    pub fn digits(&self) -> &str {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == "0"
    }
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl From<u64> for OrderKey {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl std::fmt::Display for OrderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A step as submitted, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStep {
    pub title: String,
    pub description: String,
    pub order: OrderKey,
}

impl NewStep {
    pub fn new(title: impl Into<String>, order: impl Into<OrderKey>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            order: order.into(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl From<Step> for NewStep {
    fn from(step: Step) -> Self {
        Self {
            title: step.title,
            description: step.description,
            order: step.order.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Work Instruction
// ---------------------------------------------------------------------------

/// A persisted work instruction with its full step list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInstruction {
    pub id: RecordId,
    pub title: String,
    pub steps: Vec<Step>,
}

/// List and create responses carry only identity and title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionSummary {
    pub id: RecordId,
    pub title: String,
}

/// A validated create request. Steps are not yet normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkInstruction {
    pub title: String,
    pub steps: Vec<NewStep>,
}

impl NewWorkInstruction {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: impl Into<NewStep>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn steps(mut self, steps: Vec<NewStep>) -> Self {
        self.steps = steps;
        self
    }
}
