//! # Source
//!
//! $$
//! \operatorname{fetch}(c) = s_i(c),\quad i = \min\{\,j : s_j(c) \neq \bot\,\}
//! $$
//!
//! Where series come from. A [`SourceChain`] tries named [`SeriesSource`]s
//! in order and returns the first success; when all of them fail the error
//! lists every attempt. Friendly names resolve to vendor codes through an
//! immutable [`Favorites`] table handed to the chain at construction.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::FetchError;
use crate::error::Result;
use crate::series::Series;

/// A named provider of series by vendor code.
pub trait SeriesSource<K>: Send + Sync {
  fn name(&self) -> &str;

  fn fetch(&self, code: &str) -> std::result::Result<Series<K>, FetchError>;
}

/// Friendly name to vendor code lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Favorites {
  codes: BTreeMap<String, String>,
}

impl Favorites {
  pub fn new<I, N, C>(entries: I) -> Self
  where
    I: IntoIterator<Item = (N, C)>,
    N: Into<String>,
    C: Into<String>,
  {
    Self {
      codes: entries
        .into_iter()
        .map(|(name, code)| (name.into(), code.into()))
        .collect(),
    }
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.codes.get(name).map(String::as_str)
  }

  /// Vendor code for `name`, or `name` itself when it is not a favorite.
  pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
    self.get(name).unwrap_or(name)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
    self.codes.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.codes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.codes.is_empty()
  }
}

/// Ordered fallback list of sources.
pub struct SourceChain<K> {
  sources: Vec<Box<dyn SeriesSource<K>>>,
  favorites: Favorites,
}

impl<K> Default for SourceChain<K> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K> SourceChain<K> {
  pub fn new() -> Self {
    Self {
      sources: Vec::new(),
      favorites: Favorites::default(),
    }
  }

  /// Append a source; sources are tried in insertion order.
  pub fn with_source<S>(mut self, source: S) -> Self
  where
    S: SeriesSource<K> + 'static,
  {
    self.sources.push(Box::new(source));
    self
  }

  pub fn with_favorites(mut self, favorites: Favorites) -> Self {
    self.favorites = favorites;
    self
  }

  pub fn favorites(&self) -> &Favorites {
    &self.favorites
  }

  pub fn source_names(&self) -> Vec<&str> {
    self.sources.iter().map(|s| s.name()).collect()
  }

  /// First successful fetch of `code` (after favorite lookup).
  pub fn fetch(&self, code: &str) -> std::result::Result<Series<K>, FetchError> {
    let code = self.favorites.resolve(code);
    let mut attempts = Vec::with_capacity(self.sources.len());

    for source in &self.sources {
      match source.fetch(code) {
        Ok(series) => {
          debug!(source = source.name(), code, n = series.len(), "fetched");
          return Ok(series);
        }
        Err(err) => {
          debug!(source = source.name(), code, %err, "source failed, trying next");
          attempts.push(err.to_string());
        }
      }
    }

    Err(FetchError::Exhausted {
      code: code.to_string(),
      attempts,
    })
  }
}

/// Either data already in hand or a code to fetch, decided once at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesInput<K> {
  Raw(Series<K>),
  Code(String),
}

impl<K> SeriesInput<K> {
  pub fn resolve(self, chain: &SourceChain<K>) -> Result<Series<K>> {
    match self {
      SeriesInput::Raw(series) => Ok(series),
      SeriesInput::Code(code) => Ok(chain.fetch(&code)?),
    }
  }
}

impl<K> From<Series<K>> for SeriesInput<K> {
  fn from(series: Series<K>) -> Self {
    SeriesInput::Raw(series)
  }
}

impl<K> From<&str> for SeriesInput<K> {
  fn from(code: &str) -> Self {
    SeriesInput::Code(code.to_string())
  }
}

/// In-memory source, for tests and for data loaded elsewhere.
#[derive(Debug, Clone)]
pub struct MemorySource<K> {
  name: String,
  series: BTreeMap<String, Series<K>>,
}

impl<K> MemorySource<K> {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      series: BTreeMap::new(),
    }
  }

  pub fn with_series(mut self, code: impl Into<String>, series: Series<K>) -> Self {
    self.series.insert(code.into(), series);
    self
  }
}

impl<K> SeriesSource<K> for MemorySource<K>
where
  K: Clone + Send + Sync,
{
  fn name(&self) -> &str {
    &self.name
  }

  fn fetch(&self, code: &str) -> std::result::Result<Series<K>, FetchError> {
    self
      .series
      .get(code)
      .cloned()
      .ok_or_else(|| FetchError::UnknownCode {
        source_name: self.name.clone(),
        code: code.to_string(),
      })
  }
}
