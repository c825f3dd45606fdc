use tracing::{debug, info};

use crate::{DatabaseAdapter, ExecutionError, Plan, Result, generate_sql};

pub struct Executor<'a> {
    adapter: &'a dyn DatabaseAdapter,
}

impl<'a> Executor<'a> {
    #[must_use]
    pub fn new(adapter: &'a dyn DatabaseAdapter) -> Self {
        Self { adapter }
    }

    /// Renders every action of `plan`, then runs the statements in plan
    /// order. Rendering completes before anything is sent, so an invalid
    /// action never leaves the server half-migrated. Returns the number of
    /// statements executed.
    pub fn execute_plan(&self, plan: &Plan) -> Result<usize> {
        if plan.is_empty() {
            info!("no actions to execute");
            return Ok(0);
        }

        let statements = generate_sql(plan)?;
        self.execute_statements(&statements)
    }

    /// Runs `statements` in order and stops at the first failure.
    pub fn execute_statements(&self, statements: &[String]) -> Result<usize> {
        for (statement_index, sql) in statements.iter().enumerate() {
            debug!(statement_index, %sql, "executing statement");
            self.adapter
                .execute(sql)
                .map_err(|source| ExecutionError::StatementFailed {
                    statement_index,
                    sql: sql.clone(),
                    executed_statements: statement_index,
                    source,
                })?;
        }

        info!(executed = statements.len(), "plan executed");
        Ok(statements.len())
    }
}
