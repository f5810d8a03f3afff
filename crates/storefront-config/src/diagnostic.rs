// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics rendered with miette.
//!
//! Every error names its setting by dotted path (`shop.page_size`). Unknown
//! keys carry a "did you mean" hint, and value errors point at the
//! `STOREFRONT_*` variable that overrides the setting.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::path::Path;

use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a candidate must beat to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.8;

const ENV_PREFIX: &str = "STOREFRONT_";

/// Source name for configuration given as a string.
pub(crate) const INLINE_SOURCE: &str = "<inline>";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("`{path}` is not a known setting")]
    #[diagnostic(
        code(storefront::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), allowed))
    )]
    UnknownKey {
        /// Dotted path of the offending key.
        path: String,
        /// The key as written.
        key: String,
        suggestion: Option<String>,
        /// Keys accepted in the same table.
        allowed: Vec<String>,
        #[label("unknown key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{path}` has the wrong type: found {found}")]
    #[diagnostic(
        code(storefront::config::wrong_type),
        help("{}", value_help(path, &format!("expected {expected}")))
    )]
    WrongType {
        path: String,
        found: String,
        expected: String,
        #[label("wrong type")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{path}` is required")]
    #[diagnostic(
        code(storefront::config::missing_key),
        help("{}", value_help(path, "add it"))
    )]
    MissingKey { path: String },

    /// A value that parsed but is out of range for the shop.
    #[error("`{path}` {reason}")]
    #[diagnostic(
        code(storefront::config::invalid_value),
        help("{}", value_help(path, describe(path).unwrap_or("fix the value")))
    )]
    Invalid { path: String, reason: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(storefront::config::other))]
    Other(String),
}

impl ConfigError {
    pub(crate) fn invalid(path: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Dotted path of the setting the error is about, if there is one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::UnknownKey { path, .. }
            | Self::WrongType { path, .. }
            | Self::MissingKey { path }
            | Self::Invalid { path, .. } => Some(path.as_str()),
            Self::Other(_) => None,
        }
    }
}

fn unknown_key_help(suggestion: Option<&str>, allowed: &[String]) -> String {
    let allowed = if allowed.is_empty() {
        "none".to_string()
    } else {
        allowed.join(", ")
    };
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Allowed here: {allowed}"),
        None => format!("allowed here: {allowed}"),
    }
}

fn value_help(path: &str, what: &str) -> String {
    format!(
        "{what}; set `{path}` in storefront.toml or via {}",
        env_var_for(path)
    )
}

/// The environment variable that overrides `path`.
pub fn env_var_for(path: &str) -> String {
    format!("{ENV_PREFIX}{}", path.replace('.', "_").to_uppercase())
}

/// What a shop setting controls, for validation help.
fn describe(path: &str) -> Option<&'static str> {
    Some(match path {
        "storage.database_path" => "path of the SQLite database file",
        "shop.currency" => "suffix printed after every price",
        "shop.page_size" => "products per catalog page, at least 1",
        "shop.default_min_delivery_sum" => {
            "minimum cart total for home delivery, written on first start"
        }
        "shop.demo_admin_phrase" => "text that unlocks the admin panel; omit to disable",
        "shop.order_history_limit" => "orders listed on the profile card",
        "shop.news_limit" => "posts listed in the news feed",
        "shop.pickup_choice_limit" => "pickup points offered at checkout",
        "shop.admin_order_limit" => "orders per admin status list",
        "dispatcher.interval_secs" => "seconds between scheduled notification checks",
        "prometheus.listen_address" => "metrics endpoint as host:port",
        _ => return None,
    })
}

/// Converts a figment error, which may hold several, into diagnostics.
///
/// `toml_sources` are `(path, content)` pairs used to label the offending
/// key in the file it came from.
pub fn from_figment(err: figment::Error, toml_sources: &[(String, String)]) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(key, allowed) => {
                let (span, src) = label_key(&error, &error.path, key, toml_sources);
                ConfigError::UnknownKey {
                    path: join_path(&error.path, Some(key.as_str())),
                    key: key.clone(),
                    suggestion: suggest_key(key, allowed),
                    allowed: allowed.iter().map(|k| k.to_string()).collect(),
                    span,
                    src,
                }
            }
            Kind::MissingField(key) => ConfigError::MissingKey {
                path: join_path(&error.path, Some(key.as_ref())),
            },
            Kind::InvalidType(found, expected) | Kind::InvalidValue(found, expected) => {
                let (span, src) = match error.path.split_last() {
                    Some((key, table)) => label_key(&error, table, key, toml_sources),
                    None => (None, None),
                };
                ConfigError::WrongType {
                    path: join_path(&error.path, None),
                    found: found.to_string(),
                    expected: expected.clone(),
                    span,
                    src,
                }
            }
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

fn join_path(table: &[String], key: Option<&str>) -> String {
    table
        .iter()
        .map(String::as_str)
        .chain(key)
        .collect::<Vec<_>>()
        .join(".")
}

/// Finds the file the error came from and the key's span inside it.
fn label_key(
    error: &figment::error::Error,
    table: &[String],
    key: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|source| match source {
            figment::Source::File(path) => Some(path.as_path()),
            _ => None,
        });

    let source = toml_sources.iter().find(|(name, _)| match origin {
        Some(origin) => origin == Path::new(name) || origin.ends_with(name),
        None => name == INLINE_SOURCE,
    });

    let Some((name, content)) = source else {
        return (None, None);
    };
    match locate_key(content, table, key) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), key.len())),
            Some(NamedSource::new(name, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `key` within the table `table` of a TOML document.
///
/// Tracks `[table]` headers line by line, so a key that appears in several
/// tables is found only in the requested one. An empty `table` means the
/// root, before any header.
pub fn locate_key(content: &str, table: &[String], key: &str) -> Option<usize> {
    let wanted = table.join(".");
    let mut current = String::new();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let code = line.split('#').next().unwrap_or_default().trim();
        let header = code
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .filter(|name| !name.starts_with('['));

        if let Some(name) = header {
            current = name.trim().to_string();
        } else if current == wanted {
            let indent = line.len() - line.trim_start().len();
            let is_key = line[indent..]
                .strip_prefix(key)
                .is_some_and(|after| after.trim_start().starts_with('='));
            if is_key {
                return Some(offset + indent);
            }
        }
        offset += line.len();
    }

    None
}

/// The candidate closest to `unknown` by Jaro-Winkler similarity, if any is
/// close enough to be a plausible typo.
pub fn suggest_key(unknown: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|candidate| (strsim::jaro_winkler(unknown, candidate), *candidate))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.to_string())
}

/// Renders all errors as one report, preceded by a count line.
pub fn render_to_string(errors: &[ConfigError]) -> String {
    let handler = GraphicalReportHandler::new();
    let mut out = match errors.len() {
        1 => "storefront.toml has 1 problem:\n".to_string(),
        n => format!("storefront.toml has {n} problems:\n"),
    };
    for error in errors {
        if handler.render_report(&mut out, error).is_err() {
            out.push_str(&format!("error: {error}\n"));
        }
    }
    out
}

/// Prints [`render_to_string`] to stderr.
pub fn render_errors(errors: &[ConfigError]) {
    eprint!("{}", render_to_string(errors));
}
