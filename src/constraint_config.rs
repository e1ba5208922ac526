// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-root global constraint configuration: named constraints injected as anonymous
//! constraints on matching nodes before any user constraint is applied.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::errors::{Error, Result};
use crate::pdl::Dep;

/// Named constraints loaded from a root's configuration, keyed by package name. Only one
/// `Dep` per name is kept; a later file or line overwrites an earlier one for the same name.
pub type ConstraintList = HashMap<String, Dep>;

static CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<ConstraintList>>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Loads and parses every non-empty, non-comment line of `path` as a `Dep`, inserting each
/// into `list`. Rejects any `Dep` carrying a `Condition`, or one that constrains nothing.
fn add_file(list: &mut ConstraintList, path: &Path) -> Result<()> {
    let contents = fs::read_to_string(path)?;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let dep: Dep = line.parse()?;

        if dep.condition.is_some() {
            return Err(Error::ConstraintConfig {
                path: path.to_path_buf(),
                reason: format!("cannot have a condition in a constraint config file: {}", line),
            });
        }

        let unconstrained = dep.version1.is_none()
            && dep.version2.is_none()
            && dep.flags.as_ref().map_or(true, |f| f.is_empty());
        if unconstrained {
            return Err(Error::ConstraintConfig {
                path: path.to_path_buf(),
                reason: format!("package {} has no constraints specified", dep.name),
            });
        }

        list.insert(dep.name.clone(), dep);
    }
    Ok(())
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.path())
        .collect();
    paths.sort();
    Ok(paths)
}

fn load_uncached(root: &Path) -> Result<ConstraintList> {
    let mut list = ConstraintList::new();

    let conf_file = root.join("etc/spack/pkg.conf");
    if conf_file.is_file() {
        add_file(&mut list, &conf_file)?;
    }

    let conf_dir = root.join("etc/spack/pkg");
    if conf_dir.is_dir() {
        for path in read_dir_sorted(&conf_dir)? {
            add_file(&mut list, &path)?;
        }
    }

    Ok(list)
}

/// Loads the constraint config for `root`, returning a cached, shared copy if this root has
/// already been loaded in this process.
pub fn load(root: impl AsRef<Path>) -> Result<Arc<ConstraintList>> {
    let root = root.as_ref();
    let key = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

    if let Some(cached) = CACHE.lock().unwrap().get(&key) {
        return Ok(Arc::clone(cached));
    }

    let list = Arc::new(load_uncached(root)?);
    CACHE.lock().unwrap().insert(key, Arc::clone(&list));
    Ok(list)
}

/// Clears the process-wide cache. Needed for test isolation: tests that build distinct
/// temporary roots must not see each other's cached constraint lists.
pub fn clear_cache() {
    CACHE.lock().unwrap().clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tempdir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("crucible-resolve-test-{}", std::process::id()));
        dir.push(uniquify());
        dir
    }

    fn uniquify() -> String {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        COUNTER.fetch_add(1, Ordering::Relaxed).to_string()
    }

    #[test]
    fn loads_single_conf_file() {
        clear_cache();
        let root = tempdir();
        fs::create_dir_all(root.join("etc/spack")).unwrap();
        let mut f = fs::File::create(root.join("etc/spack/pkg.conf")).unwrap();
        writeln!(f, "# a comment").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "kernel(+lto)").unwrap();
        drop(f);

        let list = load(&root).unwrap();
        assert!(list.contains_key("kernel"));

        clear_cache();
        fs::remove_dir_all(root.parent().unwrap()).ok();
    }

    #[test]
    fn rejects_unconstrained_entry() {
        clear_cache();
        let root = tempdir();
        fs::create_dir_all(root.join("etc/spack")).unwrap();
        let mut f = fs::File::create(root.join("etc/spack/pkg.conf")).unwrap();
        writeln!(f, "kernel").unwrap();
        drop(f);

        let err = load(&root).unwrap_err();
        assert!(matches!(err, Error::ConstraintConfig { .. }));

        clear_cache();
        fs::remove_dir_all(root.parent().unwrap()).ok();
    }

    #[test]
    fn rejects_condition() {
        clear_cache();
        let root = tempdir();
        fs::create_dir_all(root.join("etc/spack")).unwrap();
        let mut f = fs::File::create(root.join("etc/spack/pkg.conf")).unwrap();
        writeln!(f, "[+x]kernel(+lto)").unwrap();
        drop(f);

        let err = load(&root).unwrap_err();
        assert!(matches!(err, Error::ConstraintConfig { .. }));

        clear_cache();
        fs::remove_dir_all(root.parent().unwrap()).ok();
    }

    #[test]
    fn caches_across_calls() {
        clear_cache();
        let root = tempdir();
        fs::create_dir_all(root.join("etc/spack")).unwrap();
        let mut f = fs::File::create(root.join("etc/spack/pkg.conf")).unwrap();
        writeln!(f, "kernel(+lto)").unwrap();
        drop(f);

        let first = load(&root).unwrap();
        fs::remove_file(root.join("etc/spack/pkg.conf")).unwrap();
        let second = load(&root).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        clear_cache();
        fs::remove_dir_all(root.parent().unwrap()).ok();
    }

    #[test]
    fn missing_root_yields_empty_list() {
        clear_cache();
        let root = tempdir();
        let list = load(&root).unwrap();
        assert!(list.is_empty());
        clear_cache();
    }
}
