// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Handles command lists and signals given by name or number.

use nonempty::NonEmpty;
use serde::Deserialize;

use crate::guest::parse_signal;

pub fn deserialize_command<'de, D>(deserializer: D) -> Result<Option<NonEmpty<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<CommandEntry> = Option::deserialize(deserializer)?;
    let Some(entry) = opt else {
        return Ok(None);
    };

    let args = match entry {
        CommandEntry::Shell(line) => line.split_whitespace().map(str::to_string).collect(),
        CommandEntry::Args(args) => args,
    };

    NonEmpty::from_vec(args)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom("command cannot be empty"))
}

pub fn deserialize_signal<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match SignalEntry::deserialize(deserializer)? {
        SignalEntry::Number(number) => Ok(number),
        SignalEntry::Name(name) => parse_signal(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown signal: {name}"))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CommandEntry {
    Shell(String),
    Args(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignalEntry {
    Number(u32),
    Name(String),
}
