//! Minimal Go module manifest parser.
//!
//! Only the `require` and `replace` directives are retained; everything else
//! is recognised and skipped.

use crate::changelog::error::ChangelogError;
use crate::changelog::matchers::ArtifactKind;

/// A `require` directive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Require {
    /// Module path.
    pub path: String,
    /// Required version.
    pub version: String,
    /// Marked `// indirect`.
    pub indirect: bool,
}

/// A `replace` directive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    /// Path being replaced.
    pub old_path: String,
    /// Version constraint on the replaced path, if any.
    pub old_version: Option<String>,
    /// Replacement module path or local directory.
    pub new_path: String,
    /// Replacement version. `None` for local directory replacements.
    pub new_version: Option<String>,
}

/// Parsed module manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModFile {
    /// Declared module path.
    pub module: Option<String>,
    /// Replace directives in file order.
    pub replace: Vec<Replace>,
    /// Require directives in file order.
    pub require: Vec<Require>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    Require,
    Replace,
    Other,
}

impl ModFile {
    /// Parses the manifest text.
    pub fn parse(text: &str) -> Result<Self, ChangelogError> {
        let mut file = Self::default();
        let mut block: Option<Block> = None;

        for (idx, raw) in text.lines().enumerate() {
            let lineno = idx + 1;
            let (line, comment) = split_comment(raw);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(current) = block {
                if line == ")" {
                    block = None;
                    continue;
                }
                file.apply(current, line, comment, lineno)?;
                continue;
            }

            let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let rest = rest.trim();
            let kind = match verb {
                "require" => Block::Require,
                "replace" => Block::Replace,
                "module" => {
                    file.module = Some(unquote(rest).to_string());
                    continue;
                }
                "go" | "toolchain" | "godebug" | "exclude" | "retract" => Block::Other,
                _ => {
                    return Err(ChangelogError::ModuleManifest {
                        line: lineno,
                        reason: format!("unknown directive: {verb}"),
                    })
                }
            };

            if rest == "(" {
                block = Some(kind);
            } else {
                file.apply(kind, rest, comment, lineno)?;
            }
        }

        if block.is_some() {
            return Err(ChangelogError::ModuleManifest {
                line: text.lines().count(),
                reason: "unterminated block".to_string(),
            });
        }

        Ok(file)
    }

    fn apply(
        &mut self,
        block: Block,
        entry: &str,
        comment: Option<&str>,
        lineno: usize,
    ) -> Result<(), ChangelogError> {
        match block {
            Block::Require => {
                let fields: Vec<&str> = entry.split_whitespace().collect();
                let [path, version] = fields.as_slice() else {
                    return Err(ChangelogError::ModuleManifest {
                        line: lineno,
                        reason: format!("usage: require module/path v1.2.3, got {entry:?}"),
                    });
                };
                self.require.push(Require {
                    path: unquote(path).to_string(),
                    version: (*version).to_string(),
                    indirect: comment.is_some_and(|c| c.trim() == "indirect"),
                });
            }
            Block::Replace => self.replace.push(parse_replace(entry, lineno)?),
            Block::Other => {}
        }
        Ok(())
    }

    /// Looks up the version of the first module whose path contains `name`.
    ///
    /// A replacement carrying a version overrides any requirement.
    pub fn dependency(&self, name: &str) -> Result<String, ChangelogError> {
        let replaced = self
            .replace
            .iter()
            .filter(|r| r.old_path.contains(name))
            .find_map(|r| r.new_version.clone());
        if let Some(version) = replaced {
            return Ok(version);
        }

        self.require
            .iter()
            .find(|r| r.path.contains(name))
            .map(|r| r.version.clone())
            .ok_or_else(|| ChangelogError::not_found(ArtifactKind::ModuleManifest, name))
    }
}

fn parse_replace(entry: &str, lineno: usize) -> Result<Replace, ChangelogError> {
    let malformed = || ChangelogError::ModuleManifest {
        line: lineno,
        reason: format!("usage: replace module/path [v1.2.3] => other/module v1.4.5, got {entry:?}"),
    };

    let (old, new) = entry.split_once("=>").ok_or_else(malformed)?;
    let old: Vec<&str> = old.split_whitespace().collect();
    let new: Vec<&str> = new.split_whitespace().collect();

    let (old_path, old_version) = match old.as_slice() {
        [path] => (unquote(path), None),
        [path, version] => (unquote(path), Some((*version).to_string())),
        _ => return Err(malformed()),
    };
    let (new_path, new_version) = match new.as_slice() {
        [path] => (unquote(path), None),
        [path, version] => (unquote(path), Some((*version).to_string())),
        _ => return Err(malformed()),
    };

    Ok(Replace {
        old_path: old_path.to_string(),
        old_version,
        new_path: new_path.to_string(),
        new_version,
    })
}

fn split_comment(line: &str) -> (&str, Option<&str>) {
    match line.split_once("//") {
        Some((code, comment)) => (code, Some(comment)),
        None => (line, None),
    }
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}
