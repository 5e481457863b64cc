//! Search, facet filter and sort over repository records.
//!
//! Every admin list page runs the same pipeline: a case-insensitive
//! substring search over a few text fields, zero or more categorical
//! facets where `"all"` means "no filter", then an optional `<key>_asc` /
//! `<key>_desc` sort. Without a sort the input order is kept.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::{PortalError, PortalResult};
use crate::model::{Account, Section, Student, Teacher};

/// Facet value that disables a filter.
pub const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub descending: bool,
}

impl SortSpec {
    pub fn parse(raw: &str) -> PortalResult<Self> {
        let Some((key, dir)) = raw.rsplit_once('_') else {
            return Err(PortalError::bad_params(format!(
                "sort must look like <key>_asc or <key>_desc, got {raw:?}"
            )));
        };
        let descending = match dir {
            "asc" => false,
            "desc" => true,
            _ => {
                return Err(PortalError::bad_params(format!(
                    "sort direction must be asc or desc, got {dir:?}"
                )))
            }
        };
        Ok(Self {
            key: key.to_string(),
            descending,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Trimmed and lowercased; empty matches everything.
    pub search: String,
    pub filters: BTreeMap<String, String>,
    pub sort: Option<SortSpec>,
}

impl ListQuery {
    pub fn new(search: &str) -> Self {
        Self {
            search: search.trim().to_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, facet: &str, value: &str) -> Self {
        self.filters.insert(facet.to_string(), value.to_string());
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Reads `{search?, filters?: {facet: value}, sort?}` from request params.
    pub fn from_params(params: &serde_json::Value) -> PortalResult<Self> {
        let search = match params.get("search") {
            None => "",
            Some(v) if v.is_null() => "",
            Some(v) => v
                .as_str()
                .ok_or_else(|| PortalError::bad_params("search must be a string"))?,
        };
        let mut query = Self::new(search);

        if let Some(raw) = params.get("filters").filter(|v| !v.is_null()) {
            let Some(obj) = raw.as_object() else {
                return Err(PortalError::bad_params("filters must be an object"));
            };
            for (facet, value) in obj {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Number(n) => n.to_string(),
                    _ => {
                        return Err(PortalError::bad_params(format!(
                            "filter {facet} must be a string"
                        )))
                    }
                };
                query.filters.insert(facet.clone(), value);
            }
        }

        if let Some(raw) = params.get("sort").and_then(|v| v.as_str()) {
            query.sort = Some(SortSpec::parse(raw)?);
        }
        Ok(query)
    }

    fn active_filters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters
            .iter()
            .filter(|(_, v)| v.as_str() != ALL)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

pub trait Listable {
    const FACETS: &'static [&'static str];
    const SORT_KEYS: &'static [&'static str];

    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    /// Current value of a facet, in the same spelling filters use.
    fn facet(&self, name: &str) -> Option<Cow<'_, str>>;

    fn compare_by(&self, other: &Self, key: &str) -> Ordering;
}

pub fn matches_search<T: Listable>(item: &T, needle: &str) -> bool {
    needle.is_empty()
        || item
            .search_fields()
            .iter()
            .any(|f| f.to_lowercase().contains(needle))
}

pub fn apply<'a, T, I>(items: I, query: &ListQuery) -> PortalResult<Vec<&'a T>>
where
    T: Listable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    for (facet, _) in query.active_filters() {
        if !T::FACETS.contains(&facet) {
            return Err(PortalError::bad_params(format!(
                "unknown filter {facet:?}; expected one of {:?}",
                T::FACETS
            )));
        }
    }
    if let Some(sort) = &query.sort {
        if !T::SORT_KEYS.contains(&sort.key.as_str()) {
            return Err(PortalError::bad_params(format!(
                "unknown sort key {:?}; expected one of {:?}",
                sort.key,
                T::SORT_KEYS
            )));
        }
    }

    let mut out: Vec<&T> = items
        .into_iter()
        .filter(|item| matches_search(*item, &query.search))
        .filter(|item| {
            query
                .active_filters()
                .all(|(facet, want)| item.facet(facet).as_deref() == Some(want))
        })
        .collect();

    if let Some(sort) = &query.sort {
        // Stable: ties keep their incoming order.
        out.sort_by(|a, b| {
            let ord = a.compare_by(b, &sort.key);
            if sort.descending {
                ord.reverse()
            } else {
                ord
            }
        });
    }
    Ok(out)
}

/// Case-insensitive ordering for display names, raw text as tie-break.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

impl Listable for Account {
    const FACETS: &'static [&'static str] = &["role", "status"];
    const SORT_KEYS: &'static [&'static str] = &["name", "email"];

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(&self.name), Cow::Borrowed(&self.email)]
    }

    fn facet(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "role" => Some(Cow::Borrowed(self.role.as_str())),
            "status" => Some(Cow::Borrowed(self.status.as_str())),
            _ => None,
        }
    }

    fn compare_by(&self, other: &Self, key: &str) -> Ordering {
        match key {
            "email" => compare_text(&self.email, &other.email),
            _ => compare_text(&self.name, &other.name),
        }
    }
}

impl Listable for Student {
    const FACETS: &'static [&'static str] = &["yearLevel", "status", "section"];
    const SORT_KEYS: &'static [&'static str] = &["name", "id", "year"];

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(&self.name),
            Cow::Borrowed(&self.email),
            Cow::Borrowed(&self.student_id),
        ]
    }

    fn facet(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "yearLevel" => Some(Cow::Owned(self.year_level.to_string())),
            "status" => Some(Cow::Borrowed(self.status.as_str())),
            "section" => Some(Cow::Borrowed(&self.section)),
            _ => None,
        }
    }

    fn compare_by(&self, other: &Self, key: &str) -> Ordering {
        match key {
            "id" => compare_text(&self.student_id, &other.student_id),
            "year" => self.year_level.cmp(&other.year_level),
            _ => compare_text(&self.name, &other.name),
        }
    }
}

impl Listable for Teacher {
    const FACETS: &'static [&'static str] = &["status"];
    const SORT_KEYS: &'static [&'static str] = &["name", "id"];

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Owned(self.full_name()),
            Cow::Borrowed(&self.email),
            Cow::Borrowed(&self.employee_id),
        ]
    }

    fn facet(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "status" => Some(Cow::Borrowed(self.status.as_str())),
            _ => None,
        }
    }

    fn compare_by(&self, other: &Self, key: &str) -> Ordering {
        match key {
            "id" => compare_text(&self.employee_id, &other.employee_id),
            _ => compare_text(&self.full_name(), &other.full_name()),
        }
    }
}

impl Listable for Section {
    const FACETS: &'static [&'static str] = &["status"];
    const SORT_KEYS: &'static [&'static str] = &["name", "size"];

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(&self.name), Cow::Borrowed(&self.description)]
    }

    fn facet(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "status" => Some(Cow::Borrowed(self.status.as_str())),
            _ => None,
        }
    }

    fn compare_by(&self, other: &Self, key: &str) -> Ordering {
        match key {
            "size" => self.students.len().cmp(&other.students.len()),
            _ => compare_text(&self.name, &other.name),
        }
    }
}
