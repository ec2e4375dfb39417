//! Package renames applied to text, entry paths and class-file constants.
//!
//! A [`Relocator`] performs one rename. Several relocators are always applied
//! as an ordered left fold: each one sees the complete output of the previous
//! one. Renames with overlapping prefixes do not commute, so callers must keep
//! the order they were configured in.

use std::borrow::Cow;

use regex::Captures;

use crate::error::{Error, Result};

pub trait Relocator: Send + Sync {
    /// Rename package occurrences in textual content such as XML descriptors.
    fn apply_to_source_content(&self, content: &str) -> String;

    /// Rename an archive entry path, `None` if the path is not below the package.
    fn relocate_path(&self, path: &str) -> Option<String>;

    /// Rename inside a class-file `CONSTANT_Utf8`, `None` if nothing matched.
    fn relocate_class_constant(&self, constant: &[u8]) -> Option<Vec<u8>>;
}

/// Fold `content` through every relocator, in order.
pub fn apply_all(relocators: &[Box<dyn Relocator>], content: String) -> String {
    relocators
        .iter()
        .fold(content, |text, relocator| relocator.apply_to_source_content(&text))
}

/// Fold an entry path through every relocator, in order.
pub fn relocate_path_all(relocators: &[Box<dyn Relocator>], path: &str) -> Option<String> {
    let mut relocated: Option<String> = None;
    for relocator in relocators {
        let current = relocated.as_deref().unwrap_or(path);
        if let Some(next) = relocator.relocate_path(current) {
            relocated = Some(next);
        }
    }
    relocated
}

/// Renames one package, e.g. `dev.j_a.ide` to `com.example.lsp`.
///
/// The dotted form is matched in text, the slash form in text and entry paths.
/// An occurrence only counts when it is not glued to a preceding identifier
/// character or separator of its own form, so `org.dev.j_a.ide`,
/// `org/dev/j_a/ide` and `mydev.j_a.ide` stay untouched. A single leading `/`
/// of an absolute resource path such as `"/dev/j_a/ide/icon.svg"` is allowed.
#[derive(Debug, Clone)]
pub struct PackageRelocator {
    shaded_pattern:      String,
    path_pattern:        String,
    shaded_path_pattern: String,
    source_rx:           regex::Regex,
    source_path_rx:      regex::Regex,
    class_name_rx:       regex::bytes::Regex,
    class_dotted_rx:     regex::bytes::Regex,
}

impl PackageRelocator {
    pub fn new(pattern: impl Into<String>, shaded_pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let shaded_pattern = shaded_pattern.into();
        let path_pattern = pattern.replace('.', "/");
        let shaded_path_pattern = shaded_pattern.replace('.', "/");

        let source_rx = compile(&format!(
            r"(^|[^A-Za-z0-9_$.]){}\b",
            regex::escape(&pattern)
        ))?;
        let source_path_rx = compile(&format!(
            r"(^/?|[^A-Za-z0-9_$./]/?){}\b",
            regex::escape(&path_pattern)
        ))?;
        let class_name_rx = compile_bytes(&format!(
            r"(^|L){}(/|;|$)",
            regex::escape(&path_pattern)
        ))?;
        let class_dotted_rx = compile_bytes(&format!(r"^{}(\.|$)", regex::escape(&pattern)))?;

        Ok(Self {
            shaded_pattern,
            path_pattern,
            shaded_path_pattern,
            source_rx,
            source_path_rx,
            class_name_rx,
            class_dotted_rx,
        })
    }
}

impl Relocator for PackageRelocator {
    fn apply_to_source_content(&self, content: &str) -> String {
        let dotted = self.source_rx.replace_all(content, |caps: &Captures| {
            format!("{}{}", &caps[1], self.shaded_pattern)
        });
        self.source_path_rx
            .replace_all(&dotted, |caps: &Captures| {
                format!("{}{}", &caps[1], self.shaded_path_pattern)
            })
            .into_owned()
    }

    fn relocate_path(&self, path: &str) -> Option<String> {
        let rest = path.strip_prefix(self.path_pattern.as_str())?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(format!("{}{}", self.shaded_path_pattern, rest))
        } else {
            None
        }
    }

    fn relocate_class_constant(&self, constant: &[u8]) -> Option<Vec<u8>> {
        let shaded_path = self.shaded_path_pattern.as_bytes();
        let shaded_dotted = self.shaded_pattern.as_bytes();

        let names = self
            .class_name_rx
            .replace_all(constant, |caps: &regex::bytes::Captures| {
                [&caps[1], shaded_path, &caps[2]].concat()
            });
        let dotted = self
            .class_dotted_rx
            .replace_all(&names, |caps: &regex::bytes::Captures| {
                [shaded_dotted, &caps[1]].concat()
            });

        let changed = matches!(names, Cow::Owned(_)) || matches!(dotted, Cow::Owned(_));
        changed.then(|| dotted.into_owned())
    }
}

fn compile(pattern: &str) -> Result<regex::Regex> {
    regex::Regex::new(pattern)
        .map_err(|e| Error::InvalidConfiguration(format!("invalid relocation pattern: {e}")))
}

fn compile_bytes(pattern: &str) -> Result<regex::bytes::Regex> {
    regex::bytes::Regex::new(pattern)
        .map_err(|e| Error::InvalidConfiguration(format!("invalid relocation pattern: {e}")))
}
