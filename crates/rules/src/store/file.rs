//! Directory-backed rule-set store.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{info, warn};

use super::error::{check_name, LoadResult, LoadStatus, Result};
use super::RuleSetStore;
use crate::codec::RuleSetCodec;
use crate::schema::RuleSet;

/// Filesystem-backed rule-set store.
///
/// Each rule set lives in its own file in the wire format. New rule sets are
/// written as `<name>.yml` at the top of the directory; existing files may sit
/// in subdirectories and use `.yml`, `.yaml` or `.json`. Call
/// [`load_all`](Self::load_all) to read the directory into memory.
pub struct FileRuleSetStore {
    /// Root directory containing rule-set files.
    dir: PathBuf,
    codec: RuleSetCodec,
    /// Loaded rule sets keyed by name, with the file each came from.
    entries: RwLock<HashMap<String, (PathBuf, RuleSet)>>,
}

impl FileRuleSetStore {
    /// Create a store over the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist.
    pub fn new(dir: impl Into<PathBuf>, codec: RuleSetCodec) -> Self {
        let dir = dir.into();
        if !dir.exists() {
            if let Err(e) = fs::create_dir_all(&dir) {
                warn!(path = %dir.display(), error = %e, "failed to create rule set directory");
            }
        }
        Self {
            dir,
            codec,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Open a store and load every rule-set file in it.
    pub fn open(dir: impl Into<PathBuf>, codec: RuleSetCodec) -> Result<(Self, Vec<LoadResult>)> {
        let store = Self::new(dir, codec);
        let results = store.load_all()?;
        Ok((store, results))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Recursively scan the directory and load every rule-set file.
    ///
    /// Dotfiles and files with other extensions are skipped. Decode errors
    /// are reported per file and do not abort the scan.
    pub fn load_all(&self) -> Result<Vec<LoadResult>> {
        let mut results = Vec::new();
        self.scan_dir_recursive(&self.dir, &mut results)?;
        Ok(results)
    }

    fn scan_dir_recursive(&self, dir: &Path, results: &mut Vec<LoadResult>) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory");
                return Ok(());
            }
        };

        let mut paths = entries
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        paths.sort();

        for path in paths {
            // Skip dotfiles/dotdirs, including our own temp files.
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    if path.is_file() {
                        results.push(LoadResult {
                            path,
                            status: LoadStatus::Skipped {
                                reason: "dotfile".to_string(),
                            },
                        });
                    }
                    continue;
                }
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, results)?;
                continue;
            }

            if file_format(&path).is_none() {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a YAML or JSON file".to_string(),
                    },
                });
                continue;
            }

            match self.load_file(&path) {
                Ok(rule_set) => {
                    let name = rule_set.name.clone();
                    info!(rule_set = %name, path = %path.display(), "loaded rule set");
                    let previous = self
                        .entries
                        .write()
                        .expect("entries lock poisoned")
                        .insert(name.clone(), (path.clone(), rule_set));
                    if let Some((previous_path, _)) = previous {
                        warn!(rule_set = %name, path = %path.display(), previous = %previous_path.display(), "rule set name defined twice, keeping the later file");
                    }
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Loaded { name },
                    });
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load rule set file");
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        Ok(())
    }

    /// Read and decode a single rule-set file.
    pub fn load_file(&self, path: &Path) -> Result<RuleSet> {
        let contents = fs::read_to_string(path)?;
        let rule_set = match file_format(path) {
            Some(Format::Json) => self.codec.decode_str(&contents)?,
            _ => self.codec.decode_yaml(&contents)?,
        };
        check_name(&rule_set.name)?;
        Ok(rule_set)
    }

    fn default_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.yml", name))
    }
}

impl RuleSetStore for FileRuleSetStore {
    /// Atomically write the rule set as YAML.
    ///
    /// Writes to a `.tmp` file first, then renames to the final path.
    fn persist(&self, rule_set: RuleSet) -> Result<RuleSet> {
        check_name(&rule_set.name)?;
        let yaml = self.codec.encode_yaml(&rule_set)?;

        let mut entries = self.entries.write().expect("entries lock poisoned");
        let final_path = entries
            .get(&rule_set.name)
            .map(|(path, _)| path.clone())
            .filter(|path| file_format(path) != Some(Format::Json))
            .unwrap_or_else(|| self.default_path(&rule_set.name));
        let tmp_path = self.dir.join(format!(".{}.tmp", rule_set.name));

        fs::write(&tmp_path, yaml)?;
        fs::rename(&tmp_path, &final_path)?;

        if let Some((old_path, _)) = entries.get(&rule_set.name) {
            if *old_path != final_path && old_path.exists() {
                fs::remove_file(old_path)?;
            }
        }

        info!(rule_set = %rule_set.name, path = %final_path.display(), "wrote rule set file");
        entries.insert(rule_set.name.clone(), (final_path, rule_set.clone()));
        Ok(rule_set)
    }

    fn get_all(&self) -> Result<Vec<RuleSet>> {
        let mut all: Vec<_> = self
            .entries
            .read()
            .expect("entries lock poisoned")
            .values()
            .map(|(_, rule_set)| rule_set.clone())
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    fn get_by_name(&self, name: &str) -> Result<Option<RuleSet>> {
        Ok(self
            .entries
            .read()
            .expect("entries lock poisoned")
            .get(name)
            .map(|(_, rule_set)| rule_set.clone()))
    }

    fn delete_by_name(&self, name: &str) -> Result<()> {
        check_name(name)?;
        let mut entries = self.entries.write().expect("entries lock poisoned");
        let path = match entries.remove(name) {
            Some((path, _)) => path,
            None => self.default_path(name),
        };
        if path.exists() {
            fs::remove_file(&path)?;
            info!(rule_set = %name, path = %path.display(), "deleted rule set file");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

fn file_format(path: &Path) -> Option<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yml") | Some("yaml") => Some(Format::Yaml),
        Some("json") => Some(Format::Json),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::components::{FieldEquals, FieldNotEmpty};
    use crate::registry::ComponentRegistry;
    use crate::store::StoreError;
    use jsonguard_core::JsonPath;
    use tempfile::TempDir;

    fn codec() -> RuleSetCodec {
        RuleSetCodec::new(Arc::new(ComponentRegistry::builtin()))
    }

    fn rule_set(name: &str) -> RuleSet {
        RuleSet::new(name, "stored")
            .matches(FieldEquals::new(JsonPath::parse("$.kind").unwrap(), "user"))
            .validates(FieldNotEmpty::new(JsonPath::parse("$.name").unwrap()))
    }

    const VALID_YAML: &str = r#"
name: from-disk
description: Loaded from a file
rules:
  - id: field-not-empty-rule
    jsonPath: $.id
"#;

    #[test]
    fn persist_writes_yaml_and_reloads() {
        let tmp = TempDir::new().unwrap();
        let store = FileRuleSetStore::new(tmp.path(), codec());
        store.persist(rule_set("users")).unwrap();

        let path = tmp.path().join("users.yml");
        assert!(path.exists());
        assert!(!tmp.path().join(".users.tmp").exists());
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("field-equals-matcher"));

        let (reopened, results) = FileRuleSetStore::open(tmp.path(), codec()).unwrap();
        assert!(matches!(results[0].status, LoadStatus::Loaded { ref name } if name == "users"));
        assert_eq!(reopened.get_by_name("users").unwrap(), Some(rule_set("users")));
    }

    #[test]
    fn load_all_skips_and_reports_per_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("good.yml"), VALID_YAML).unwrap();
        fs::write(tmp.path().join(".hidden.yml"), VALID_YAML).unwrap();
        fs::write(tmp.path().join("notes.txt"), "hello").unwrap();
        fs::write(
            tmp.path().join("bad.yaml"),
            "name: bad\nrules:\n  - id: nope\n",
        )
        .unwrap();

        let store = FileRuleSetStore::new(tmp.path(), codec());
        let results = store.load_all().unwrap();

        let loaded = results
            .iter()
            .filter(|r| matches!(r.status, LoadStatus::Loaded { .. }))
            .count();
        let skipped = results
            .iter()
            .filter(|r| matches!(r.status, LoadStatus::Skipped { .. }))
            .count();
        let failed: Vec<_> = results
            .iter()
            .filter_map(|r| match &r.status {
                LoadStatus::Failed { error } => Some(error.clone()),
                _ => None,
            })
            .collect();

        assert_eq!(loaded, 1);
        assert_eq!(skipped, 2);
        assert_eq!(failed.len(), 1);
        assert!(failed[0].contains("nope"));
        assert_eq!(store.get_all().unwrap().len(), 1);
    }

    #[test]
    fn load_all_recurses_and_reads_json() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("team").join("billing");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("nested.yml"), VALID_YAML).unwrap();
        fs::write(
            tmp.path().join("json-set.json"),
            r#"{"name":"json-set","rules":[{"id":"field-equals-rule","jsonPath":"$.a","value":1}]}"#,
        )
        .unwrap();

        let store = FileRuleSetStore::new(tmp.path(), codec());
        store.load_all().unwrap();

        let names: Vec<_> = store.get_all().unwrap().into_iter().map(|rs| rs.name).collect();
        assert_eq!(names, vec!["from-disk", "json-set"]);
    }

    #[test]
    fn persist_rewrites_existing_file_in_place() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("sub");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("custom.yaml"), VALID_YAML).unwrap();

        let store = FileRuleSetStore::new(tmp.path(), codec());
        store.load_all().unwrap();

        let mut updated = store.get_by_name("from-disk").unwrap().unwrap();
        updated.description = "changed".into();
        store.persist(updated).unwrap();

        assert!(!tmp.path().join("from-disk.yml").exists());
        let text = fs::read_to_string(nested.join("custom.yaml")).unwrap();
        assert!(text.contains("changed"));
    }

    #[test]
    fn delete_removes_file_and_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = FileRuleSetStore::new(tmp.path(), codec());
        store.persist(rule_set("gone")).unwrap();

        store.delete_by_name("gone").unwrap();
        assert!(!tmp.path().join("gone.yml").exists());
        assert!(store.get_by_name("gone").unwrap().is_none());
        store.delete_by_name("gone").unwrap();
    }

    #[test]
    fn names_that_escape_the_directory_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = FileRuleSetStore::new(tmp.path(), codec());
        for name in ["../escape", ".hidden", "a/b", ""] {
            assert!(matches!(
                store.persist(rule_set(name)),
                Err(StoreError::InvalidName(_))
            ));
        }
    }

    #[test]
    fn creates_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("new").join("rules");
        let store = FileRuleSetStore::new(&dir, codec());
        assert!(dir.is_dir());
        assert!(store.load_all().unwrap().is_empty());
    }
}
