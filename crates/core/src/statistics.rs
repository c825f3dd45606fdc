use std::{collections::BTreeMap, fmt};

/// Per-engine tally of what an introspection run modeled and what it left out.
///
/// Every catalog entity is first counted as skipped under its engine name;
/// modeling it moves one count from skipped to dumped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStatistics {
    dumped: BTreeMap<String, usize>,
    skipped: BTreeMap<String, usize>,
    failures: Vec<SkippedTable>,
}

/// A table whose engine is modeled but whose declaration could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTable {
    pub database: String,
    pub name: String,
    pub engine: String,
    pub reason: String,
}

impl EngineStatistics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_seen(&mut self, engine: &str) {
        *self.skipped.entry(engine.to_string()).or_default() += 1;
    }

    pub fn record_dumped(&mut self, engine: &str) {
        *self.dumped.entry(engine.to_string()).or_default() += 1;
        if let Some(count) = self.skipped.get_mut(engine) {
            *count = count.saturating_sub(1);
        }
    }

    pub fn record_failure(&mut self, failure: SkippedTable) {
        self.failures.push(failure);
    }

    #[must_use]
    pub fn dumped(&self, engine: &str) -> usize {
        self.dumped.get(engine).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn skipped(&self, engine: &str) -> usize {
        self.skipped.get(engine).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn total_dumped(&self) -> usize {
        self.dumped.values().sum()
    }

    #[must_use]
    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    #[must_use]
    pub fn failures(&self) -> &[SkippedTable] {
        &self.failures
    }

    /// Engines with at least one dumped entity, by engine name.
    pub fn dumped_engines(&self) -> impl Iterator<Item = (&str, usize)> {
        non_zero(&self.dumped)
    }

    /// Engines with at least one skipped entity, by engine name.
    pub fn skipped_engines(&self) -> impl Iterator<Item = (&str, usize)> {
        non_zero(&self.skipped)
    }
}

fn non_zero(counts: &BTreeMap<String, usize>) -> impl Iterator<Item = (&str, usize)> {
    counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(engine, count)| (engine.as_str(), *count))
}

impl fmt::Display for EngineStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dumped: {}", self.total_dumped())?;
        for (engine, count) in self.dumped_engines() {
            writeln!(f, "  {engine}: {count}")?;
        }

        writeln!(f, "Skipped: {}", self.total_skipped())?;
        for (engine, count) in self.skipped_engines() {
            writeln!(f, "  {engine}: {count}")?;
        }

        if !self.failures.is_empty() {
            writeln!(f, "Failed:")?;
            for failure in &self.failures {
                writeln!(
                    f,
                    "  {}.{} ({}): {}",
                    failure.database, failure.name, failure.engine, failure.reason
                )?;
            }
        }

        Ok(())
    }
}
