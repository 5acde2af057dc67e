use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::{Handler, TaskReply};

/// Sorts `contacts.json` by last name, then first name.
pub struct SortContactsHandler {
    input: PathBuf,
    output: PathBuf,
}

impl SortContactsHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            input: data_dir.join("contacts.json"),
            output: data_dir.join("contacts-sorted.json"),
        }
    }
}

fn name_field<'a>(contact: &'a Value, field: &str) -> Result<&'a str> {
    contact
        .get(field)
        .and_then(Value::as_str)
        .with_context(|| format!("contact is missing string field {field:?}: {contact}"))
}

fn sort_key(contact: &Value) -> (Option<&str>, Option<&str>) {
    (
        contact["last_name"].as_str(),
        contact["first_name"].as_str(),
    )
}

/// Sort contacts in place by `(last_name, first_name)`.
///
/// Every entry must carry both fields as strings; the check happens before
/// sorting so a bad entry never leaves a half-sorted list behind.
pub fn sort_contacts(contacts: &mut [Value]) -> Result<()> {
    for contact in contacts.iter() {
        name_field(contact, "last_name")?;
        name_field(contact, "first_name")?;
    }
    contacts.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    Ok(())
}

#[async_trait]
impl Handler for SortContactsHandler {
    fn name(&self) -> &str {
        "sort-contacts"
    }

    fn description(&self) -> &str {
        "sort contacts.json by last and first name"
    }

    async fn run(&self) -> Result<TaskReply> {
        let raw = tokio::fs::read_to_string(&self.input)
            .await
            .with_context(|| format!("failed to read {}", self.input.display()))?;
        let mut contacts = match serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", self.input.display()))?
        {
            Value::Array(items) => items,
            other => bail!("expected a JSON array of contacts, got {other}"),
        };
        sort_contacts(&mut contacts)?;
        let json = serde_json::to_string_pretty(&contacts)?;
        tokio::fs::write(&self.output, json)
            .await
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        Ok(TaskReply::ok("Contacts sorted"))
    }
}
