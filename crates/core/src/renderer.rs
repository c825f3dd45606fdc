use std::fmt::Write as _;

use crate::Plan;

const PLAN_HEADER: &str = "--- Execution Plan ---";
const PLAN_FOOTER: &str = "----------------------";
const NO_CHANGES: &str = "No changes detected. The schema is up-to-date.";

#[derive(Debug, Default, Clone, Copy)]
pub struct Renderer;

impl Renderer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Numbered, human-readable list of planned actions.
    #[must_use]
    pub fn render_plan(&self, plan: &Plan) -> String {
        let mut rendered = String::new();
        rendered.push_str(PLAN_HEADER);
        rendered.push('\n');

        if plan.is_empty() {
            rendered.push_str(NO_CHANGES);
            rendered.push('\n');
            return rendered;
        }

        for (index, action) in plan.actions().iter().enumerate() {
            let _ = writeln!(
                rendered,
                "{}. [{}] {}",
                index + 1,
                action.action_type(),
                action.reason()
            );
        }
        rendered.push_str(PLAN_FOOTER);
        rendered.push('\n');
        rendered
    }

    /// Statements as a script, each terminated by `;`.
    #[must_use]
    pub fn render_sql(&self, statements: &[String]) -> String {
        let mut rendered = String::new();
        for statement in statements {
            rendered.push_str(statement);
            rendered.push_str(";\n");
        }
        rendered
    }
}
