use std::fmt::Write;

use crate::core::category::{self, Category};
use crate::core::stats::percent;
use crate::core::task::Task;

/// Render the task snapshot sent to the assistant as a system message.
pub fn build_context(tasks: &[Task], categories: &[Category]) -> String {
    let mut out = String::from("# Task manager data\n\n## Categories\n");
    for cat in categories {
        let _ = writeln!(out, "- {} (ID: {})", cat.name, cat.id);
    }

    out.push_str("\n## Tasks\n");
    for task in tasks {
        let mut parts = vec![
            format!("- {}", task.title),
            if task.completed { "[done]".into() } else { "[open]".into() },
        ];
        if task.important {
            parts.push("[important]".into());
        }
        if let Some(cat) = category::find(categories, task.category_id.as_deref()) {
            parts.push(format!("[category: {}]", cat.name));
        }
        if let Some(due) = task.due_day() {
            parts.push(format!("due: {}", due.format("%Y-%m-%d")));
        }
        let _ = writeln!(out, "{}", parts.join(" "));
        if !task.description.is_empty() {
            let _ = writeln!(out, "  Description: {}", task.description);
        }
    }

    let completed = tasks.iter().filter(|t| t.completed).count();
    out.push_str("\n## Statistics\n");
    let _ = writeln!(out, "- Total tasks: {}", tasks.len());
    let _ = writeln!(out, "- Completed tasks: {}", completed);
    let _ = writeln!(out, "- Completion rate: {}%", percent(completed, tasks.len()));
    out
}
