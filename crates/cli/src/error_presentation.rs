use std::{io, path::PathBuf};

use chstate_files::FilesError;
use miette::Report;

const LOAD_CONTEXT: &str = "while loading schema files";
const CATALOG_CONTEXT: &str = "while reading the catalog";
const PLAN_CONTEXT: &str = "while planning schema changes";
const DUMP_CONTEXT: &str = "while dumping schema files";
const APPLY_CONTEXT: &str = "while applying schema changes";

pub(crate) type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug)]
pub(crate) enum CliError {
    MissingCatalog,
    Load(FilesError),
    Catalog(FilesError),
    Dump(FilesError),
    WriteOutput { path: PathBuf, source: io::Error },
    WriteStdout(io::Error),
    Core(chstate_core::Error),
}

impl From<chstate_core::Error> for CliError {
    fn from(value: chstate_core::Error) -> Self {
        Self::Core(value)
    }
}

impl From<chstate_core::GenerateError> for CliError {
    fn from(value: chstate_core::GenerateError) -> Self {
        Self::Core(value.into())
    }
}

impl CliError {
    /// Usage mistakes exit with 2 like clap's own errors; everything else with 1.
    pub(crate) const fn exit_code(&self) -> u8 {
        match self {
            Self::MissingCatalog => 2,
            _ => 1,
        }
    }
}

pub(crate) fn render_runtime_error(error: CliError) -> String {
    match error {
        CliError::MissingCatalog => format!("[usage] {}", missing_catalog_message()),
        CliError::Load(source) => render_files_error(source, LOAD_CONTEXT),
        CliError::Catalog(source) => render_files_error(source, CATALOG_CONTEXT),
        CliError::Dump(source) => render_files_error(source, DUMP_CONTEXT),
        CliError::WriteOutput { path, source } => {
            let context = format!("while writing plan output `{}`", path.display());
            format!("[io] {}", report_with_context(source, context))
        }
        CliError::WriteStdout(source) => {
            let report = report_with_context(source, "while writing to stdout");
            format!("[io] {report}")
        }
        CliError::Core(source) => {
            let category = core_category(&source);
            let context = match source {
                chstate_core::Error::Execute(_) => APPLY_CONTEXT,
                _ => PLAN_CONTEXT,
            };
            let report = report_with_context(source, context);
            format!("[{category}] {report}")
        }
    }
}

fn render_files_error(error: FilesError, context: &str) -> String {
    let category = files_category(&error);
    format!("[{category}] {}", report_with_context(error, context))
}

fn report_with_context<E, C>(source: E, context: C) -> Report
where
    E: std::error::Error + Send + Sync + 'static,
    C: Into<String>,
{
    let anyhow_error = anyhow::Error::new(source).context(context.into());
    miette::miette!("{anyhow_error:#}")
}

fn core_category(error: &chstate_core::Error) -> &'static str {
    match error {
        chstate_core::Error::Parse(_) => "parse",
        chstate_core::Error::Schema(_) => "schema",
        chstate_core::Error::Generate(_) => "generate",
        chstate_core::Error::Catalog(_) => "catalog",
        chstate_core::Error::Execute(_) => "execute",
    }
}

fn files_category(error: &FilesError) -> &'static str {
    match error {
        FilesError::Yaml { .. } => "parse",
        FilesError::Schema(_) => "schema",
        FilesError::ReadDir { .. }
        | FilesError::ReadFile { .. }
        | FilesError::WriteFile { .. }
        | FilesError::CreateDir { .. }
        | FilesError::AlreadyExists { .. } => "io",
    }
}

fn missing_catalog_message() -> &'static str {
    "missing catalog: pass --catalog <FILE> or set CHSTATE_CATALOG"
}
