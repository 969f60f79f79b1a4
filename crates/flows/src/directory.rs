use std::collections::BTreeMap;

use foundation::iso::IsoCode;

use crate::index::FlowTable;

/// Country names known to the dataset, for the free-text search box.
#[derive(Debug, Clone, Default)]
pub struct CountryDirectory {
    /// Lower-cased display name -> (display name, code), sorted by key.
    by_name: BTreeMap<String, (String, IsoCode)>,
    by_iso: BTreeMap<IsoCode, String>,
}

impl CountryDirectory {
    pub fn from_table(table: &FlowTable) -> Self {
        Self::from_entries(table.countries().map(|(iso, name)| (iso, name.to_string())))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (IsoCode, String)>) -> Self {
        let mut dir = Self::default();
        for (iso, name) in entries {
            dir.by_name
                .entry(fold(&name))
                .or_insert_with(|| (name.clone(), iso));
            dir.by_iso.entry(iso).or_insert(name);
        }
        dir
    }

    pub fn len(&self) -> usize {
        self.by_iso.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_iso.is_empty()
    }

    pub fn name_of(&self, iso: IsoCode) -> Option<&str> {
        self.by_iso.get(&iso).map(String::as_str)
    }

    /// Display names starting with `prefix` (case-insensitive), alphabetical.
    pub fn suggest(&self, prefix: &str) -> Vec<&str> {
        let prefix = fold(prefix);
        if prefix.is_empty() {
            return Vec::new();
        }
        self.by_name
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(_, (name, _))| name.as_str())
            .collect()
    }

    /// Resolves a search-box entry: a known three-letter code or a display
    /// name, compared case-insensitively.
    pub fn resolve(&self, query: &str) -> Option<IsoCode> {
        let trimmed = query.trim();
        if let Ok(iso) = IsoCode::parse(trimmed) {
            if self.by_iso.contains_key(&iso) {
                return Some(iso);
            }
        }
        self.by_name.get(&fold(trimmed)).map(|(_, iso)| *iso)
    }
}

fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}
