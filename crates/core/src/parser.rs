//! Engine declaration parsing.
//!
//! The catalog reports each table's engine twice: the bare name
//! (`system.tables.engine`) and the full clause including every trailing
//! table clause (`system.tables.engine_full`). [`parse_engine`] carves the
//! declaration out of the latter and turns it into an [`Engine`].

use std::collections::BTreeMap;

use crate::{Arity, Engine, ParseError};

/// Clause keywords that may follow the engine declaration in `engine_full`,
/// in the order the server prints them.
const TRAILING_CLAUSES: [&str; 6] = [
    "PARTITION BY",
    "PRIMARY KEY",
    "ORDER BY",
    "SAMPLE BY",
    "TTL",
    "SETTINGS",
];

/// Settings holding the Kafka engine arguments when they are not positional.
pub(crate) const KAFKA_ENGINE_SETTINGS: [&str; 4] = [
    "kafka_broker_list",
    "kafka_topic_list",
    "kafka_group_name",
    "kafka_format",
];

type EngineConstructor = fn(&Declaration<'_>) -> Result<Engine, ParseError>;

/// Engine names tried in order with a prefix match against the declaration.
///
/// An entry must precede every entry whose name is a prefix of its own,
/// otherwise the shorter name would claim the declaration first. The
/// replicated variants are therefore listed ahead of their non-replicated
/// counterparts, and every `*MergeTree` specialisation ahead of `MergeTree`.
const ENGINE_DISPATCH: [(&str, EngineConstructor); 12] = [
    (
        "ReplicatedReplacingMergeTree",
        parse_replicated_replacing_merge_tree,
    ),
    (
        "ReplicatedCollapsingMergeTree",
        parse_replicated_collapsing_merge_tree,
    ),
    (
        "ReplicatedAggregatingMergeTree",
        parse_replicated_aggregating_merge_tree,
    ),
    ("ReplicatedMergeTree", parse_replicated_merge_tree),
    ("ReplacingMergeTree", parse_replacing_merge_tree),
    ("SummingMergeTree", parse_summing_merge_tree),
    ("CollapsingMergeTree", parse_collapsing_merge_tree),
    ("AggregatingMergeTree", parse_aggregating_merge_tree),
    ("MergeTree", parse_merge_tree),
    ("Distributed", parse_distributed),
    ("Kafka", parse_kafka),
    ("Log", parse_log),
];

/// Engine names the parser understands, in dispatch order.
pub fn supported_engines() -> impl Iterator<Item = &'static str> {
    ENGINE_DISPATCH.iter().map(|(name, _)| *name)
}

/// Parses a table engine from the catalog's engine name and full engine text.
///
/// `engine_full` may carry trailing `PARTITION BY`/`ORDER BY`/`SETTINGS`
/// (and similar) clauses; they are stripped before parameters are read.
/// When `engine_full` is empty the bare `engine_name` is parsed instead.
pub fn parse_engine(engine_name: &str, engine_full: &str) -> Result<Engine, ParseError> {
    let mut text = extract_engine_declaration(engine_full);
    if text.is_empty() {
        text = engine_name.trim();
    }

    let declaration = Declaration {
        engine: engine_name,
        text,
        full: engine_full,
    };

    for (name, constructor) in ENGINE_DISPATCH {
        if matches_engine_prefix(text, name) {
            return constructor(&declaration);
        }
    }

    Err(ParseError::UnsupportedEngine {
        engine: engine_name.to_string(),
        declaration: text.to_string(),
    })
}

fn matches_engine_prefix(text: &str, name: &str) -> bool {
    text.strip_prefix(name).is_some_and(|rest| {
        rest.chars()
            .next()
            .is_none_or(|next| next == '(' || next.is_whitespace())
    })
}

/// Returns the engine declaration part of `engine_full`:
/// `ReplacingMergeTree(ver) ORDER BY id SETTINGS ...` gives `ReplacingMergeTree(ver)`.
#[must_use]
pub fn extract_engine_declaration(engine_full: &str) -> &str {
    let end = TRAILING_CLAUSES
        .iter()
        .filter_map(|keyword| find_top_level_keyword(engine_full, keyword))
        .min()
        .unwrap_or(engine_full.len());
    engine_full[..end].trim()
}

/// Splits the parameters of `Name(p1, p2, ...)`.
///
/// The interior between the first `(` and the last `)` is split on commas
/// that are neither quoted nor nested in parentheses. Each parameter is
/// trimmed and one pair of surrounding quotes is removed. A declaration
/// without parentheses has no parameters.
#[must_use]
pub fn extract_parameters(declaration: &str) -> Vec<String> {
    let (Some(start), Some(end)) = (declaration.find('('), declaration.rfind(')')) else {
        return Vec::new();
    };
    if start >= end {
        return Vec::new();
    }

    let content = declaration[start + 1..end].trim();
    if content.is_empty() {
        return Vec::new();
    }

    // Only a bare trailing comma is dropped; a quoted `''` is a real parameter.
    let mut pieces = split_top_level(content);
    if pieces.last().is_some_and(|piece| piece.is_empty()) {
        pieces.pop();
    }
    pieces.into_iter().map(unquote).collect()
}

/// Splits `input` on commas outside quotes and parentheses, trimming each piece.
#[must_use]
pub fn split_top_level(input: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for offset in top_level_offsets(input) {
        if input[offset..].starts_with(',') {
            pieces.push(input[start..offset].trim());
            start = offset + 1;
        }
    }
    pieces.push(input[start..].trim());
    pieces
}

/// Clauses carved out of `system.tables.engine_full` that the catalog does
/// not expose as separate columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineClauses {
    pub ttl: Option<String>,
    pub settings: BTreeMap<String, String>,
}

#[must_use]
pub fn extract_engine_clauses(engine_full: &str) -> EngineClauses {
    let mut clauses = EngineClauses::default();

    if let Some(body) = clause_body(engine_full, "TTL") {
        clauses.ttl = Some(body.to_string());
    }

    if let Some(body) = clause_body(engine_full, "SETTINGS") {
        for setting in split_top_level(body) {
            if let Some((key, value)) = setting.split_once('=') {
                clauses
                    .settings
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }

    clauses
}

/// Text between `keyword` and the next trailing clause keyword.
fn clause_body<'a>(engine_full: &'a str, keyword: &str) -> Option<&'a str> {
    let start = find_top_level_keyword(engine_full, keyword)? + keyword.len();
    let end = TRAILING_CLAUSES
        .iter()
        .filter_map(|other| {
            find_top_level_keyword(&engine_full[start..], other).map(|offset| start + offset)
        })
        .min()
        .unwrap_or(engine_full.len());
    let body = engine_full[start..end].trim();
    (!body.is_empty()).then_some(body)
}

/// Byte offset of the first top-level occurrence of `keyword` that stands
/// as a separate word preceded by whitespace.
fn find_top_level_keyword(input: &str, keyword: &str) -> Option<usize> {
    top_level_offsets(input).into_iter().find(|&offset| {
        let preceded_by_space = input[..offset]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
        let rest = &input[offset..];
        preceded_by_space
            && rest.starts_with(keyword)
            && rest[keyword.len()..]
                .chars()
                .next()
                .is_none_or(char::is_whitespace)
    })
}

/// Offsets of characters that sit outside quoted strings and parentheses.
fn top_level_offsets(input: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut depth = 0usize;

    for (offset, ch) in input.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == open {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' | '`' => quote = Some(ch),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => offsets.push(offset),
            _ => {}
        }
    }

    offsets
}

fn unquote(param: &str) -> String {
    let param = param.trim();
    for quote in ['\'', '"'] {
        if param.len() >= 2 && param.starts_with(quote) && param.ends_with(quote) {
            return unescape(&param[1..param.len() - 1]);
        }
    }
    param.to_string()
}

fn unescape(literal: &str) -> String {
    let mut unescaped = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\'
            && let Some(next) = chars.next()
        {
            unescaped.push(next);
            continue;
        }
        unescaped.push(ch);
    }
    unescaped
}

struct Declaration<'a> {
    engine: &'a str,
    text: &'a str,
    full: &'a str,
}

impl Declaration<'_> {
    fn parameters(&self, engine: &'static str, expected: Arity) -> Result<Vec<String>, ParseError> {
        let params = extract_parameters(self.text);
        if expected.accepts(params.len()) {
            Ok(params)
        } else {
            Err(self.malformed(engine, expected, params.len()))
        }
    }

    fn malformed(&self, engine: &'static str, expected: Arity, found: usize) -> ParseError {
        let declaration = if self.text.is_empty() {
            self.engine
        } else {
            self.text
        };
        ParseError::MalformedEngineDeclaration {
            engine,
            declaration: declaration.to_string(),
            expected,
            found,
        }
    }

    fn fixed<const N: usize>(&self, engine: &'static str) -> Result<[String; N], ParseError> {
        let params = self.parameters(engine, Arity::exactly(N))?;
        let found = params.len();
        <[String; N]>::try_from(params)
            .map_err(|_| self.malformed(engine, Arity::exactly(N), found))
    }

    fn has_parameters(&self) -> bool {
        !extract_parameters(self.text).is_empty()
    }

    /// Reads engine arguments from the `SETTINGS` clause, one per key.
    fn settings<const N: usize>(
        &self,
        engine: &'static str,
        keys: [&str; N],
    ) -> Result<[String; N], ParseError> {
        let mut settings = extract_engine_clauses(self.full).settings;
        let values: Vec<String> = keys
            .iter()
            .filter_map(|key| settings.remove(*key))
            .map(|value| unquote(&value))
            .collect();
        let found = values.len();
        <[String; N]>::try_from(values)
            .map_err(|_| self.malformed(engine, Arity::exactly(N), found))
    }
}

fn parse_merge_tree(declaration: &Declaration<'_>) -> Result<Engine, ParseError> {
    let [] = declaration.fixed::<0>("MergeTree")?;
    Ok(Engine::MergeTree)
}

fn parse_replicated_merge_tree(declaration: &Declaration<'_>) -> Result<Engine, ParseError> {
    let [zoo_path, replica_name] = declaration.fixed::<2>("ReplicatedMergeTree")?;
    Ok(Engine::ReplicatedMergeTree {
        zoo_path,
        replica_name,
    })
}

fn parse_replacing_merge_tree(declaration: &Declaration<'_>) -> Result<Engine, ParseError> {
    let mut params = declaration.parameters("ReplacingMergeTree", Arity::between(0, 1))?;
    Ok(Engine::ReplacingMergeTree {
        version_column: params.pop(),
    })
}

fn parse_replicated_replacing_merge_tree(
    declaration: &Declaration<'_>,
) -> Result<Engine, ParseError> {
    const ENGINE: &str = "ReplicatedReplacingMergeTree";
    let expected = Arity::between(2, 3);
    let params = declaration.parameters(ENGINE, expected)?;
    let found = params.len();
    let mut params = params.into_iter();

    match (params.next(), params.next(), params.next()) {
        (Some(zoo_path), Some(replica_name), version_column) => {
            Ok(Engine::ReplicatedReplacingMergeTree {
                zoo_path,
                replica_name,
                version_column,
            })
        }
        _ => Err(declaration.malformed(ENGINE, expected, found)),
    }
}

fn parse_summing_merge_tree(declaration: &Declaration<'_>) -> Result<Engine, ParseError> {
    let params = declaration.parameters("SummingMergeTree", Arity::between(0, 1))?;
    let sum_columns = params
        .first()
        .map(|columns| split_column_list(columns))
        .unwrap_or_default();
    Ok(Engine::SummingMergeTree { sum_columns })
}

/// `(a, b)` or a bare `a`. Column names are bare identifiers, so the split
/// does not track quotes.
fn split_column_list(columns: &str) -> Vec<String> {
    let columns = columns.trim();
    let inner = columns
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(columns);

    inner
        .split(',')
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_collapsing_merge_tree(declaration: &Declaration<'_>) -> Result<Engine, ParseError> {
    let [sign_column] = declaration.fixed::<1>("CollapsingMergeTree")?;
    Ok(Engine::CollapsingMergeTree { sign_column })
}

fn parse_replicated_collapsing_merge_tree(
    declaration: &Declaration<'_>,
) -> Result<Engine, ParseError> {
    let [zoo_path, replica_name, sign_column] =
        declaration.fixed::<3>("ReplicatedCollapsingMergeTree")?;
    Ok(Engine::ReplicatedCollapsingMergeTree {
        zoo_path,
        replica_name,
        sign_column,
    })
}

fn parse_aggregating_merge_tree(declaration: &Declaration<'_>) -> Result<Engine, ParseError> {
    let [] = declaration.fixed::<0>("AggregatingMergeTree")?;
    Ok(Engine::AggregatingMergeTree)
}

fn parse_replicated_aggregating_merge_tree(
    declaration: &Declaration<'_>,
) -> Result<Engine, ParseError> {
    let [zoo_path, replica_name] = declaration.fixed::<2>("ReplicatedAggregatingMergeTree")?;
    Ok(Engine::ReplicatedAggregatingMergeTree {
        zoo_path,
        replica_name,
    })
}

fn parse_distributed(declaration: &Declaration<'_>) -> Result<Engine, ParseError> {
    const ENGINE: &str = "Distributed";
    let expected = Arity::between(3, 4);
    let params = declaration.parameters(ENGINE, expected)?;
    let found = params.len();
    let mut params = params.into_iter();

    match (params.next(), params.next(), params.next(), params.next()) {
        (Some(cluster_name), Some(remote_database), Some(remote_table), sharding_key) => {
            Ok(Engine::Distributed {
                cluster_name,
                remote_database,
                remote_table,
                sharding_key,
            })
        }
        _ => Err(declaration.malformed(ENGINE, expected, found)),
    }
}

fn parse_log(declaration: &Declaration<'_>) -> Result<Engine, ParseError> {
    let [] = declaration.fixed::<0>("Log")?;
    Ok(Engine::Log)
}

/// Accepts both `Kafka('brokers', 'topic', 'group', 'format')` and
/// `Kafka SETTINGS kafka_broker_list = ..., kafka_topic_list = ...`.
fn parse_kafka(declaration: &Declaration<'_>) -> Result<Engine, ParseError> {
    const ENGINE: &str = "Kafka";
    let [brokers, topic, consumer_group, format] = if declaration.has_parameters() {
        declaration.fixed::<4>(ENGINE)?
    } else {
        declaration.settings(ENGINE, KAFKA_ENGINE_SETTINGS)?
    };
    let broker_list = brokers
        .split(',')
        .map(str::trim)
        .filter(|broker| !broker.is_empty())
        .map(str::to_string)
        .collect();
    Ok(Engine::Kafka {
        broker_list,
        topic,
        consumer_group,
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        extract_engine_clauses, extract_engine_declaration, find_top_level_keyword,
        split_column_list, split_top_level, unquote,
    };

    #[test]
    fn declaration_stops_at_earliest_trailing_clause() {
        assert_eq!(
            extract_engine_declaration(
                "ReplacingMergeTree(version) PARTITION BY toYYYYMM(ts) ORDER BY id SETTINGS index_granularity = 8192",
            ),
            "ReplacingMergeTree(version)"
        );
        assert_eq!(extract_engine_declaration("Log"), "Log");
        assert_eq!(extract_engine_declaration("  MergeTree  "), "MergeTree");
    }

    #[test]
    fn keywords_inside_quotes_are_not_clause_boundaries() {
        let engine_full = "ReplicatedMergeTree('/tables/ ORDER BY /x', '{replica}') ORDER BY id";
        assert_eq!(
            extract_engine_declaration(engine_full),
            "ReplicatedMergeTree('/tables/ ORDER BY /x', '{replica}')"
        );
    }

    #[test]
    fn keyword_must_stand_alone() {
        assert_eq!(
            find_top_level_keyword("MergeTree XORDER BY id", "ORDER BY"),
            None
        );
        assert_eq!(
            find_top_level_keyword("MergeTree ORDER BYx", "ORDER BY"),
            None
        );
        assert_eq!(
            find_top_level_keyword("MergeTree ORDER BY id", "ORDER BY"),
            Some(10)
        );
    }

    #[test]
    fn top_level_split_respects_quotes_and_parentheses() {
        assert_eq!(
            split_top_level("'a,b', cityHash64(x, y), \"c,d\", plain"),
            vec!["'a,b'", "cityHash64(x, y)", "\"c,d\"", "plain"]
        );
        assert_eq!(
            split_top_level("'it\\'s, fine', b"),
            vec!["'it\\'s, fine'", "b"]
        );
    }

    #[test]
    fn unquote_removes_one_matching_pair_and_unescapes() {
        assert_eq!(unquote("'/path'"), "/path");
        assert_eq!(unquote("\"/path\""), "/path");
        assert_eq!(unquote("'it\\'s'"), "it's");
        assert_eq!(unquote("version"), "version");
        assert_eq!(unquote("''"), "");
        assert_eq!(unquote("'unbalanced"), "'unbalanced");
    }

    #[test]
    fn column_list_accepts_parenthesized_and_bare_forms() {
        assert_eq!(split_column_list("(a, b ,c)"), vec!["a", "b", "c"]);
        assert_eq!(split_column_list("value"), vec!["value"]);
        assert!(split_column_list("()").is_empty());
    }

    #[test]
    fn engine_clauses_carry_ttl_and_settings() {
        let clauses = extract_engine_clauses(
            "MergeTree PARTITION BY toYYYYMM(ts) ORDER BY id TTL ts + toIntervalDay(90) SETTINGS index_granularity = 8192, storage_policy = 'hot_cold'",
        );
        assert_eq!(clauses.ttl.as_deref(), Some("ts + toIntervalDay(90)"));
        assert_eq!(
            clauses
                .settings
                .get("index_granularity")
                .map(String::as_str),
            Some("8192")
        );
        assert_eq!(
            clauses.settings.get("storage_policy").map(String::as_str),
            Some("'hot_cold'")
        );
    }

    #[test]
    fn engine_clauses_are_empty_without_ttl_or_settings() {
        let clauses = extract_engine_clauses("Distributed('c', 'db', 't', rand())");
        assert!(clauses.ttl.is_none());
        assert!(clauses.settings.is_empty());
    }
}
