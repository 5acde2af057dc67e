//! Task handlers and the ordered registry that binds them to triggers.
//!
//! A [`Handler`] is a zero-argument operation against the data root. Each
//! one is paired with a [`Trigger`] in a [`HandlerRegistry`]; the registry
//! keeps insertion order because routing is first-match-wins.

pub mod card;
pub mod clone;
pub mod comments;
pub mod contacts;
pub mod csv_filter;
pub mod datagen;
pub mod email;
pub mod fetch;
pub mod format;
pub mod index;
pub mod logs;
pub mod markdown;
pub mod process;
pub mod resize;
pub mod scrape;
pub mod sql;
pub mod tickets;
pub mod transcribe;
pub mod weekdays;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// What a handler reports when it finishes normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReply {
    pub message: String,
    pub status: u16,
}

impl TaskReply {
    /// A `200` reply with a short confirmation.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: 200,
        }
    }
}

/// Something the service can do to the data root.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Stable tag, e.g. `"count-wednesdays"`.
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    async fn run(&self) -> Result<TaskReply>;
}

/// Decides whether a task description selects a binding.
///
/// Both variants see the description already lower-cased.
#[derive(Clone)]
pub enum Trigger {
    /// Case-insensitive substring match.
    Contains(String),
    /// Arbitrary pure predicate.
    Predicate(fn(&str) -> bool),
}

impl Trigger {
    pub fn contains(pattern: &str) -> Self {
        Self::Contains(pattern.to_lowercase())
    }

    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            Self::Contains(pattern) => normalized.contains(pattern.as_str()),
            Self::Predicate(f) => f(normalized),
        }
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains(pattern) => f.debug_tuple("Contains").field(pattern).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains(pattern) => write!(f, "contains \"{pattern}\""),
            Self::Predicate(_) => f.write_str("custom predicate"),
        }
    }
}

/// One row of the routing table.
#[derive(Clone)]
pub struct Binding {
    pub trigger: Trigger,
    pub handler: Arc<dyn Handler>,
}

/// Serializable view of a binding, in precedence order.
#[derive(Debug, Clone, Serialize)]
pub struct BindingInfo {
    pub name: String,
    pub trigger: String,
    pub description: String,
}

/// Ordered (trigger, handler) bindings.
///
/// Filled once at startup, then shared behind an `Arc` and never mutated.
#[derive(Default)]
pub struct HandlerRegistry {
    bindings: Vec<Binding>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding. Later bindings lose to earlier ones on overlap.
    pub fn register(&mut self, trigger: Trigger, handler: Arc<dyn Handler>) {
        self.bindings.push(Binding { trigger, handler });
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// The routing table as served by `GET /tasks`.
    pub fn describe(&self) -> Vec<BindingInfo> {
        self.bindings
            .iter()
            .map(|b| BindingInfo {
                name: b.handler.name().to_string(),
                trigger: b.trigger.to_string(),
                description: b.handler.description().to_string(),
            })
            .collect()
    }

    /// The reference routing table. Order is part of the contract.
    pub fn builtin(data_dir: &Path) -> Self {
        let mut reg = Self::new();
        reg.register(
            Trigger::contains("format"),
            Arc::new(format::FormatHandler::new(data_dir)),
        );
        reg.register(
            Trigger::contains("count wednesdays"),
            Arc::new(weekdays::WednesdayHandler::new(data_dir)),
        );
        reg.register(
            Trigger::contains("sort contacts"),
            Arc::new(contacts::SortContactsHandler::new(data_dir)),
        );
        reg.register(
            Trigger::contains("query ticket sales"),
            Arc::new(tickets::TicketSalesHandler::new(data_dir)),
        );
        reg.register(
            Trigger::contains("extract email"),
            Arc::new(email::EmailSenderHandler::new(data_dir)),
        );
        reg.register(
            Trigger::contains("extract card number"),
            Arc::new(card::CardNumberHandler::new(data_dir)),
        );
        reg.register(
            Trigger::contains("find similar comments"),
            Arc::new(comments::SimilarCommentsHandler::new(data_dir)),
        );
        reg.register(
            Trigger::contains("fetch api data"),
            Arc::new(fetch::FetchApiHandler::new(data_dir)),
        );
        reg.register(
            Trigger::contains("clone git repo"),
            Arc::new(clone::CloneRepoHandler::new(data_dir)),
        );
        reg.register(
            Trigger::contains("run sql query"),
            Arc::new(sql::UserCountHandler::new(data_dir)),
        );
        reg.register(
            Trigger::contains("scrape website"),
            Arc::new(scrape::ScrapeHandler::new(data_dir)),
        );
        reg.register(
            Trigger::contains("resize image"),
            Arc::new(resize::ResizeImageHandler::new(data_dir)),
        );
        reg.register(
            Trigger::contains("transcribe audio"),
            Arc::new(transcribe::TranscribeHandler::new(data_dir)),
        );
        reg.register(
            Trigger::contains("convert markdown"),
            Arc::new(markdown::MarkdownHandler::new(data_dir)),
        );
        reg.register(
            Trigger::contains("filter csv"),
            Arc::new(csv_filter::FilterCsvHandler::new(data_dir)),
        );
        reg.register(
            Trigger::contains("generate index"),
            Arc::new(index::DocsIndexHandler::new(data_dir)),
        );
        reg.register(
            Trigger::contains("run datagen"),
            Arc::new(datagen::DatagenHandler::new()),
        );
        reg.register(
            Trigger::contains("extract logs"),
            Arc::new(logs::RecentLogsHandler::new(data_dir)),
        );
        reg
    }
}
