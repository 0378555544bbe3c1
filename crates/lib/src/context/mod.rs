//! Typed key-value store shared by every target of a pipeline run.
//!
//! Targets publish values (layout roots, artifact paths, the build version)
//! under the fixed names in [`keys`]. Later targets read them back through
//! [`BuildContext::get`], which fails loudly instead of handing out a default
//! when a value was never written or was written with another type.

pub mod keys;

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
  #[error("build context has no value for key '{0}'")]
  MissingKey(String),

  #[error("build context value for key '{key}' is not a {expected}")]
  TypeMismatch { key: String, expected: &'static str },
}

#[derive(Default)]
pub struct BuildContext {
  values: HashMap<String, Box<dyn Any>>,
}

impl BuildContext {
  pub fn new() -> Self {
    Self::default()
  }

  /// Store a value, replacing whatever was under `key` before.
  pub fn set<T: Any>(&mut self, key: &str, value: T) {
    self.values.insert(key.to_string(), Box::new(value));
  }

  /// Borrow the value under `key` as a `T`.
  pub fn get<T: Any>(&self, key: &str) -> Result<&T, ContextError> {
    let value = self
      .values
      .get(key)
      .ok_or_else(|| ContextError::MissingKey(key.to_string()))?;

    value.downcast_ref::<T>().ok_or_else(|| ContextError::TypeMismatch {
      key: key.to_string(),
      expected: type_name::<T>(),
    })
  }

  /// Keys currently present, sorted.
  pub fn keys(&self) -> Vec<&str> {
    let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

impl fmt::Debug for BuildContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BuildContext").field("keys", &self.keys()).finish()
  }
}
