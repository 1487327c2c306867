//! Line-level tokens of a planner trace

use std::fmt;

/// Line announcing that a legal plan follows
pub const PLAN_FOUND_SENTINEL: &str = "ff: found legal plan as follows";
/// First line after the plan block
pub const TIME_SPENT_MARKER: &str = "time spent";
/// Name prefix of actions that observe a fact at run time
pub const OBSERVE_PREFIX: &str = "observe-";

/// What one plan line asks the parser to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceToken {
    Ramificate,
    Shed,
    Pop,
    Assume,
    Action(ActionSignature),
}

impl TraceToken {
    /// Classify a lowercased action token
    pub fn classify(token: &str) -> Option<TraceToken> {
        if token == "ramificate" {
            Some(TraceToken::Ramificate)
        } else if token.starts_with("shed") {
            Some(TraceToken::Shed)
        } else if token.starts_with("pop") {
            Some(TraceToken::Pop)
        } else if token.starts_with("assume") {
            Some(TraceToken::Assume)
        } else {
            ActionSignature::parse(token).map(TraceToken::Action)
        }
    }
}

/// Operator name and positional arguments of one plan step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSignature {
    pub operator: String,
    pub arguments: Vec<String>,
}

impl ActionSignature {
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let operator = parts.next()?.to_string();
        Some(Self {
            operator,
            arguments: parts.map(str::to_string).collect(),
        })
    }

    /// Observed atom for `observe-` actions, e.g. `at robot1 rooma`
    pub fn observed_fact(&self) -> Option<String> {
        self.to_string()
            .strip_prefix(OBSERVE_PREFIX)
            .filter(|fact| !fact.is_empty())
            .map(str::to_string)
    }
}

impl fmt::Display for ActionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operator)?;
        for arg in &self.arguments {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Action token of a plan line: the trimmed text after its first colon
pub fn action_token(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once(':')?;
    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}
