//! Filename generation strategies for uploaded files.
//!
//! Built-in strategies are addressed by keyword; custom strategies are
//! registered by name and resolved when an upload policy is validated.

use crate::core::{PolicyError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

pub const FILENAME_GENERATOR_NONE: &str = "NONE";
pub const FILENAME_GENERATOR_ALPHANUMERIC: &str = "ALPHANUMERIC";
pub const FILENAME_GENERATOR_SHA256: &str = "SHA256";

lazy_static! {
    static ref NON_ALPHANUMERIC: Regex =
        Regex::new("[^a-z0-9]+").expect("static pattern is valid");
}

/// Produces the stored file name from the original one.
pub trait FilenameGenerator: Send + Sync {
    fn generate(&self, raw: &str) -> String;
}

/// Splits `name.ext` into `("name", ".ext")`; the extension may be empty.
///
/// Only a dot inside the last path component counts, and a leading dot
/// (`.bashrc`) does not start an extension.
fn split_extension(raw: &str) -> (&str, &str) {
    let name_start = raw.rfind(['/', '\\']).map_or(0, |sep| sep + 1);
    match raw[name_start..].rfind('.') {
        Some(dot) if dot > 0 => raw.split_at(name_start + dot),
        _ => (raw, ""),
    }
}

/// Keeps the original name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneGenerator;

impl FilenameGenerator for NoneGenerator {
    fn generate(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// Lowercases the name and collapses anything outside `[a-z0-9]` into `-`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphanumericGenerator;

impl FilenameGenerator for AlphanumericGenerator {
    fn generate(&self, raw: &str) -> String {
        let (stem, extension) = split_extension(raw);
        let stem = stem.to_lowercase();
        format!("{}{}", NON_ALPHANUMERIC.replace_all(&stem, "-"), extension)
    }
}

/// Hex SHA-256 of the name salted with a random UUID, so two uploads of the
/// same file never collide.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Generator;

impl FilenameGenerator for Sha256Generator {
    fn generate(&self, raw: &str) -> String {
        let (_, extension) = split_extension(raw);
        let mut hasher = Sha256::new();
        hasher.update(raw.as_bytes());
        hasher.update(Uuid::new_v4().as_bytes());
        format!("{}{}", hex::encode(hasher.finalize()), extension)
    }
}

/// Name-to-strategy table consulted by the upload validator.
pub struct FilenameGeneratorRegistry {
    generators: HashMap<String, Arc<dyn FilenameGenerator>>,
    /// Names known to the engine that are not filename generators.
    other_types: HashSet<String>,
}

impl FilenameGeneratorRegistry {
    /// Registry holding the built-in keywords.
    pub fn new() -> Self {
        let mut generators: HashMap<String, Arc<dyn FilenameGenerator>> = HashMap::new();
        generators.insert(FILENAME_GENERATOR_NONE.to_string(), Arc::new(NoneGenerator));
        generators.insert(
            FILENAME_GENERATOR_ALPHANUMERIC.to_string(),
            Arc::new(AlphanumericGenerator),
        );
        generators.insert(FILENAME_GENERATOR_SHA256.to_string(), Arc::new(Sha256Generator));

        Self {
            generators,
            other_types: HashSet::new(),
        }
    }

    pub fn is_builtin(name: &str) -> bool {
        matches!(
            name,
            FILENAME_GENERATOR_NONE | FILENAME_GENERATOR_ALPHANUMERIC | FILENAME_GENERATOR_SHA256
        )
    }

    /// Registers a custom strategy. Built-in keywords cannot be replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        generator: Arc<dyn FilenameGenerator>,
    ) -> Result<()> {
        let name = name.into();
        if name.is_empty() || Self::is_builtin(&name) {
            return Err(PolicyError::Config(format!(
                "'{}' cannot be used as a custom filename generator name",
                name
            )));
        }
        self.generators.insert(name, generator);
        Ok(())
    }

    /// Records a type name that exists but is not a filename generator, so
    /// naming it as one is reported as a missing capability.
    pub fn declare_type(&mut self, name: impl Into<String>) {
        self.other_types.insert(name.into());
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn FilenameGenerator>> {
        if let Some(generator) = self.generators.get(name) {
            return Ok(generator.clone());
        }

        if self.other_types.contains(name) {
            return Err(PolicyError::InvalidMapping(format!(
                "Class '{}' needs to implement 'FilenameGenerator' to be used as a filename generator.",
                name
            )));
        }

        Err(PolicyError::InvalidMapping(format!(
            "Filename generator '{}' is neither a built-in keyword ({}, {}, {}) nor a registered generator.",
            name, FILENAME_GENERATOR_ALPHANUMERIC, FILENAME_GENERATOR_SHA256, FILENAME_GENERATOR_NONE
        )))
    }
}

impl Default for FilenameGeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
