use std::sync::Arc;

use crate::handlers::{Handler, HandlerRegistry};

/// Outcome of matching a task description against the registry.
pub enum Resolution {
    Matched(Arc<dyn Handler>),
    Unmatched,
}

impl Resolution {
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// First binding, in registration order, whose trigger accepts `description`.
///
/// Matching is case-insensitive. Callers reject empty descriptions before
/// getting here; an empty string simply matches whatever accepts it.
pub fn resolve(registry: &HandlerRegistry, description: &str) -> Resolution {
    let normalized = description.to_lowercase();
    registry
        .bindings()
        .iter()
        .find(|b| b.trigger.matches(&normalized))
        .map(|b| Resolution::Matched(Arc::clone(&b.handler)))
        .unwrap_or(Resolution::Unmatched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{TaskReply, Trigger};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::path::Path;

    struct Named(&'static str);

    #[async_trait]
    impl Handler for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "test handler"
        }
        async fn run(&self) -> Result<TaskReply> {
            Ok(TaskReply::ok(self.0))
        }
    }

    fn matched_name(res: Resolution) -> Option<String> {
        match res {
            Resolution::Matched(h) => Some(h.name().to_string()),
            Resolution::Unmatched => None,
        }
    }

    #[test]
    fn first_registered_wins() {
        let mut reg = HandlerRegistry::new();
        reg.register(Trigger::contains("report"), Arc::new(Named("first")));
        reg.register(Trigger::contains("weekly report"), Arc::new(Named("second")));

        assert_eq!(matched_name(resolve(&reg, "weekly report")).as_deref(), Some("first"));
    }

    #[test]
    fn case_insensitive() {
        let mut reg = HandlerRegistry::new();
        reg.register(Trigger::contains("format"), Arc::new(Named("format")));
        assert_eq!(
            matched_name(resolve(&reg, "please Format the file")).as_deref(),
            Some("format")
        );
    }

    #[test]
    fn nothing_matches() {
        let mut reg = HandlerRegistry::new();
        reg.register(Trigger::contains("format"), Arc::new(Named("format")));
        assert!(!resolve(&reg, "do something unknown").is_matched());
    }

    #[test]
    fn empty_registry_never_matches() {
        assert!(!resolve(&HandlerRegistry::new(), "format").is_matched());
    }

    #[test]
    fn builtin_precedence_on_overlap() {
        let reg = HandlerRegistry::builtin(Path::new("/tmp/taskgate-test"));
        // "format" is registered before "convert markdown".
        assert_eq!(
            matched_name(resolve(&reg, "convert markdown and format it")).as_deref(),
            Some("format")
        );
        assert_eq!(
            matched_name(resolve(&reg, "Count Wednesdays in the dates file")).as_deref(),
            Some("count-wednesdays")
        );
        assert_eq!(
            matched_name(resolve(&reg, "extract logs please")).as_deref(),
            Some("extract-logs")
        );
    }
}
