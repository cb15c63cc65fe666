use crate::catalog::{Catalog, SpeciesRecord};
use std::str::FromStr;

/// What an empty search box shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyQueryPolicy {
    /// The whole catalog, in order.
    #[default]
    ShowAll,
    /// Only names containing a space (binomials). Matches the legacy web client, which yields
    /// an empty list for catalogs of single-word names.
    NamesWithSpace,
}

impl FromStr for EmptyQueryPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "show-all" => Ok(Self::ShowAll),
            "spaced" | "names-with-space" => Ok(Self::NamesWithSpace),
            _ => Err(()),
        }
    }
}

/// Catalog positions of the records visible for `query`, in catalog order.
pub fn filter_indices(catalog: &Catalog, query: &str, policy: EmptyQueryPolicy) -> Vec<usize> {
    if query.is_empty() {
        return match policy {
            EmptyQueryPolicy::ShowAll => (0..catalog.len()).collect(),
            EmptyQueryPolicy::NamesWithSpace => catalog
                .iter()
                .enumerate()
                .filter(|(_, record)| record.name.to_lowercase().contains(' '))
                .map(|(idx, _)| idx)
                .collect(),
        };
    }

    let needle = query.to_lowercase();
    catalog
        .iter()
        .enumerate()
        .filter(|(_, record)| record.name.to_lowercase().contains(&needle))
        .map(|(idx, _)| idx)
        .collect()
}

pub fn filter<'a>(
    catalog: &'a Catalog,
    query: &str,
    policy: EmptyQueryPolicy,
) -> Vec<&'a SpeciesRecord> {
    filter_indices(catalog, query, policy)
        .into_iter()
        .filter_map(|idx| catalog.get_index(idx))
        .collect()
}

/// Live search box state. The visible list is recomputed on every query change.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    query: String,
    policy: EmptyQueryPolicy,
    visible: Vec<usize>,
}

impl SearchFilter {
    pub fn new(catalog: &Catalog, policy: EmptyQueryPolicy) -> Self {
        Self {
            query: String::new(),
            policy,
            visible: filter_indices(catalog, "", policy),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn policy(&self) -> EmptyQueryPolicy {
        self.policy
    }

    pub fn set_query(&mut self, catalog: &Catalog, query: impl Into<String>) {
        self.query = query.into();
        self.visible = filter_indices(catalog, &self.query, self.policy);
    }

    pub fn visible<'a>(&self, catalog: &'a Catalog) -> Vec<&'a SpeciesRecord> {
        self.visible
            .iter()
            .filter_map(|&idx| catalog.get_index(idx))
            .collect()
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }
}
