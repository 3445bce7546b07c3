use serde::Serialize;

/// Outcome of one command.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CommandResult {
    pub command: String,
    pub exit_status: i32,
    pub output: String,
}

/// One result per requested command, in request order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BatchResult {
    results: Vec<CommandResult>,
}

impl BatchResult {
    pub fn new(results: Vec<CommandResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[CommandResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommandResult> {
        self.results.iter()
    }

    /// Shorthand for [`aggregate`].
    pub fn render(&self) -> String {
        aggregate(self)
    }
}

impl IntoIterator for BatchResult {
    type Item = CommandResult;
    type IntoIter = std::vec::IntoIter<CommandResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a CommandResult;
    type IntoIter = std::slice::Iter<'a, CommandResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Fold a batch into one text block: every command's output followed by a
/// newline, in execution order.
pub fn aggregate(batch: &BatchResult) -> String {
    let mut out = String::new();
    for result in batch {
        out.push_str(&result.output);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(command: &str, output: &str) -> CommandResult {
        CommandResult {
            command: command.to_string(),
            exit_status: 0,
            output: output.to_string(),
        }
    }

    #[test]
    fn aggregate_joins_outputs_in_order() {
        let batch = BatchResult::new(vec![result("echo a", "a"), result("echo b", "b")]);
        assert_eq!(aggregate(&batch), "a\nb\n");
        assert_eq!(batch.render(), "a\nb\n");
    }

    #[test]
    fn aggregate_keeps_captured_newlines() {
        let batch = BatchResult::new(vec![result("uname", "Linux\n"), result("true", "")]);
        assert_eq!(aggregate(&batch), "Linux\n\n\n");
        assert_eq!(aggregate(&BatchResult::default()), "");
    }

    #[test]
    fn batch_serializes_as_a_list() {
        let batch = BatchResult::new(vec![result("uptime", "up 3 days")]);
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "command": "uptime", "exit_status": 0, "output": "up 3 days" }])
        );
    }
}
