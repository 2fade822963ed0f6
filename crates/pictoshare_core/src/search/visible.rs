//! Visible-set query builder with title search and pagination.
//!
//! # Responsibility
//! - Assemble the union of public, user-owned and department-owned
//!   pictograms for a caller.
//! - Normalize search terms and rank starts-with matches above
//!   contains-only matches.
//! - Apply the same normalization (ASCII lowercase, spaces removed) to the
//!   term and to titles, so both sides compare identically.
//!
//! # Invariants
//! - No pictogram id appears twice in one result.
//! - Ordering is deterministic (normalized title, then id) so pagination is
//!   stable across requests.
//! - A page beyond the last returns an empty list, never an error.

use crate::model::identity::Identity;
use crate::model::pictogram::Pictogram;
use crate::repo::pictogram_repo::{parse_pictogram_row, RepoResult, PICTOGRAM_SELECT_SQL};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::collections::HashSet;

const DEFAULT_PAGE_SIZE: u32 = 10;
const PAGE_SIZE_MAX: u32 = 100;

static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").expect("valid space regex"));

/// 1-based pagination window for visible-set queries.
///
/// Values are normalized in the constructor and the fields stay private, so
/// every window in circulation is already clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisiblePage {
    page: u32,
    page_size: u32,
}

impl VisiblePage {
    /// Creates a normalized page window.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: match page_size {
                0 => DEFAULT_PAGE_SIZE,
                value if value > PAGE_SIZE_MAX => PAGE_SIZE_MAX,
                value => value,
            },
        }
    }

    /// 1-based page number, at least 1.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Rows per page, clamped to `[1, 100]`.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

impl Default for VisiblePage {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

enum TitleFilter<'a> {
    All,
    StartsWith(&'a str),
    Contains(&'a str),
}

/// Lists the page of pictograms visible to `caller`, optionally narrowed by
/// a case-insensitive, space-stripped title search.
///
/// With a search term, results ranked by starts-with matches first, then
/// contains-only matches; both bands are internally ordered by normalized
/// title and id. Without a term the whole visible set is returned in the
/// same stable order.
pub fn list_visible_rows(
    conn: &Connection,
    caller: Option<&Identity>,
    term: Option<&str>,
    page: &VisiblePage,
) -> RepoResult<Vec<Pictogram>> {
    let normalized_term = term.and_then(normalize_search_term);

    let merged = match normalized_term.as_deref() {
        None => visible_rows(conn, caller, &TitleFilter::All)?,
        Some(term) => {
            let starts_with = visible_rows(conn, caller, &TitleFilter::StartsWith(term))?;
            let contains = visible_rows(conn, caller, &TitleFilter::Contains(term))?;
            merge_ranked(starts_with, contains)
        }
    };

    let skip = (page.page - 1) as usize * page.page_size as usize;
    Ok(merged
        .into_iter()
        .skip(skip)
        .take(page.page_size as usize)
        .collect())
}

fn visible_rows(
    conn: &Connection,
    caller: Option<&Identity>,
    filter: &TitleFilter<'_>,
) -> RepoResult<Vec<Pictogram>> {
    let mut sql = format!("{PICTOGRAM_SELECT_SQL} WHERE ");
    let mut bind_values: Vec<Value> = Vec::new();

    match caller {
        None => sql.push_str("p.access_level = 'public'"),
        Some(identity) => match identity.department {
            None => {
                sql.push_str("(p.access_level = 'public' OR ur.user_id = ?)");
                bind_values.push(Value::Text(identity.id.to_string()));
            }
            Some(department) => {
                sql.push_str(
                    "(p.access_level = 'public' OR ur.user_id = ? OR dr.department_id = ?)",
                );
                bind_values.push(Value::Text(identity.id.to_string()));
                bind_values.push(Value::Text(department.to_string()));
            }
        },
    }

    match filter {
        TitleFilter::All => {}
        TitleFilter::StartsWith(term) => {
            sql.push_str(" AND REPLACE(LOWER(p.title), ' ', '') LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(format!("{}%", escape_like(term))));
        }
        TitleFilter::Contains(term) => {
            sql.push_str(" AND REPLACE(LOWER(p.title), ' ', '') LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(format!("%{}%", escape_like(term))));
        }
    }

    sql.push_str(" ORDER BY REPLACE(LOWER(p.title), ' ', '') ASC, p.id ASC;");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut pictograms = Vec::new();
    while let Some(row) = rows.next()? {
        pictograms.push(parse_pictogram_row(row)?);
    }

    Ok(pictograms)
}

fn merge_ranked(starts_with: Vec<Pictogram>, contains: Vec<Pictogram>) -> Vec<Pictogram> {
    let mut seen: HashSet<_> = starts_with.iter().map(|p| p.id).collect();
    let mut merged = starts_with;
    for pictogram in contains {
        if seen.insert(pictogram.id) {
            merged.push(pictogram);
        }
    }
    merged
}

/// Normalizes a search term: ASCII-lowercased, spaces removed.
///
/// Mirrors the title-side SQL normalization (`REPLACE(LOWER(title), ' ',
/// '')`) exactly, so both comparison operands are shaped the same way.
/// Returns `None` when nothing searchable remains.
pub fn normalize_search_term(term: &str) -> Option<String> {
    let stripped = SPACE_RE.replace_all(term, "");
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_ascii_lowercase())
    }
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
