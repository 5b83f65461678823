use std::collections::BTreeMap;
use std::fmt;

use crate::data::export::ContainerJson;
use crate::error::Result;
use crate::state::series::Series;

/// A named set of series keyed by series name.
#[derive(Debug, Clone, Default)]
pub struct SeriesContainer {
    pub name: String,
    pub comment: String,
    series: BTreeMap<String, Series>,
}

impl SeriesContainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Insert under the series' own name, returning any series it replaced.
    pub fn insert(&mut self, series: Series) -> Option<Series> {
        self.series.insert(series.name.clone(), series)
    }

    pub fn get(&self, name: &str) -> Option<&Series> {
        self.series.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Series> {
        self.series.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Series> {
        self.series.remove(name)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Series in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Series)> {
        self.series.iter()
    }

    pub fn refresh_all(&mut self) {
        for s in self.series.values_mut() {
            s.refresh_stats();
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&ContainerJson::from(self))?)
    }
}

impl fmt::Display for SeriesContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Container: {} ({} series)", self.name, self.series.len())?;
        if !self.comment.is_empty() {
            writeln!(f, "Comment: {}", self.comment)?;
        }
        for s in self.series.values() {
            writeln!(f)?;
            write!(f, "{s}")?;
        }
        Ok(())
    }
}
