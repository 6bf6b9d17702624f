//! The Makefile update driver.
//!
//! Walks every subdirectory of the tree for files named `Makefile` and
//! runs the rewrite pipeline over each. The pipeline has two phases:
//! per-file passes first, then cross-file passes computed from models
//! parsed out of the phase-one text. Each file's text is transformed
//! in memory and written back at most once, so a run over an already
//! updated tree touches nothing.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;

use crate::config::Config;
use crate::makefile::model::{Makefile, ModelSet};
use crate::makefile::passes::{
    generate_aux_files, run_all, AddVariable, DirPaths, EmitSuffixRules, MoveRecipe, Pass,
    RenameCommon, StripTrailer, StripVariables,
};
use crate::util;

/// Variables expanded on the generated compile line, in this order,
/// when the file defines them (bare or directory-suffixed).
const FLAG_VARIABLES: &[&str] = &["CFLAG", "INCLUDE"];

#[derive(Debug, Default)]
pub struct UpdateSummary {
    pub files: usize,
    pub changed: usize,
    pub aux_created: usize,
}

/// Find every `Makefile` under the immediate subdirectories of `root`,
/// sorted by path. The top-level Makefile, if any, is left alone.
pub fn collect_makefiles(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(root)
        .with_context(|| format!("failed to read directory {}", root.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        for file in WalkDir::new(entry.path()).sort_by_file_name() {
            let file = file?;
            if file.file_type().is_file() && file.file_name() == "Makefile" {
                found.push(file.into_path());
            }
        }
    }
    found.sort();
    Ok(found)
}

/// Parse every listed file into a cross-file model set.
pub fn load_models(paths: &[PathBuf]) -> Result<ModelSet> {
    let mut models = ModelSet::new();
    for path in paths {
        let text = util::fs::read_to_string(path)?;
        models.insert(Makefile::parse(path.as_path(), &text)?);
    }
    Ok(models)
}

/// The directory of `makefile` relative to `root`, slash-joined.
fn relative_dir(root: &Path, makefile: &Path) -> String {
    let dir = makefile.parent().unwrap_or(root);
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn phase_one_passes(config: &Config) -> Vec<Box<dyn Pass>> {
    let mut passes: Vec<Box<dyn Pass>> = vec![Box::new(StripTrailer)];
    if !config.strip_variables.is_empty() {
        passes.push(Box::new(StripVariables::new(
            config.strip_variables.iter().cloned(),
        )));
    }
    for spec in &config.add_variables {
        passes.push(Box::new(AddVariable {
            name: spec.name.clone(),
            definition: spec.definition.clone(),
        }));
    }
    for spec in &config.move_recipes {
        passes.push(Box::new(MoveRecipe {
            from: spec.from.clone(),
            to: spec.to.clone(),
        }));
    }
    passes
}

fn flag_vars(model: &Makefile, renames: &[(String, String)]) -> Vec<String> {
    FLAG_VARIABLES
        .iter()
        .filter_map(|name| {
            if let Some((_, new)) = renames.iter().find(|(old, _)| old == name) {
                Some(new.clone())
            } else if model.variables.contains_key(*name) {
                Some((*name).to_string())
            } else {
                // A previous run may already have suffixed it.
                let prefix = format!("{name}_");
                model.variables.keys().find(|k| k.starts_with(&prefix)).cloned()
            }
        })
        .collect()
}

/// Run the full rewrite pipeline over the tree rooted at `root`.
pub fn update(root: &Path, config: &Config) -> Result<UpdateSummary> {
    let makefiles = collect_makefiles(root)?;
    if makefiles.is_empty() {
        bail!("no Makefiles found under {}", root.display());
    }
    tracing::debug!("updating {} Makefile(s)", makefiles.len());

    let mut summary = UpdateSummary {
        files: makefiles.len(),
        ..UpdateSummary::default()
    };

    // Phase one: passes that only need the file itself.
    let mut originals: BTreeMap<PathBuf, String> = BTreeMap::new();
    let mut texts: BTreeMap<PathBuf, String> = BTreeMap::new();
    let passes = phase_one_passes(config);
    for path in &makefiles {
        let original = util::fs::read_to_string(path)?;
        let text = run_all(path, &original, &passes)?;
        originals.insert(path.clone(), original);
        texts.insert(path.clone(), text);
    }

    // Names defined in more than one file get a directory suffix;
    // variables stripped everywhere do not count.
    let mut models = ModelSet::new();
    for (path, text) in &texts {
        models.insert(Makefile::parse(path.as_path(), text)?);
    }
    let mut common: BTreeSet<String> = BTreeSet::new();
    common.extend(models.common_variables().keys().map(|n| n.to_string()));
    common.extend(models.common_targets().keys().map(|n| n.to_string()));
    common.retain(|n| !config.strip_variables.contains(n));

    let pb = ProgressBar::new(makefiles.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    // Phase two: cross-file renames, path normalization, trailer; then
    // write each changed file once.
    for path in &makefiles {
        pb.set_message(path.display().to_string());
        let Some(model) = models.files.get(path) else {
            continue;
        };
        let rel = relative_dir(root, path);
        let dirkey = rel.replace('/', "_");

        let renames: Vec<(String, String)> = common
            .iter()
            .filter(|n| {
                model.variables.contains_key(n.as_str()) || model.targets.contains_key(n.as_str())
            })
            .map(|n| (n.clone(), format!("{n}_{dirkey}")))
            .collect();

        let mut passes: Vec<Box<dyn Pass>> = Vec::new();
        if !renames.is_empty() {
            passes.push(Box::new(RenameCommon {
                renames: renames.clone(),
            }));
        }
        passes.push(Box::new(DirPaths {
            dir: rel.clone(),
            table: config.path_variables.clone(),
        }));
        if config.emit_suffix_rules {
            passes.push(Box::new(EmitSuffixRules {
                flag_vars: flag_vars(model, &renames),
            }));
        }

        let text = run_all(path, &texts[path], &passes)?;
        if text != originals[path] {
            util::fs::replace_file(path, &text)?;
            tracing::info!("{}: updated", path.display());
            summary.changed += 1;
        }

        if config.aux_files {
            summary.aux_created += generate_aux_files(path, &rel)?.len();
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    tracing::info!(
        "updated {} of {} Makefile(s), created {} wrapper file(s)",
        summary.changed,
        summary.files,
        summary.aux_created
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }

    fn tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "crypto/Makefile",
            "TOP= ..\nCFLAG= -O2\nINCLUDE= -I. -I$(TOP) -I../include\n\nall:\n\techo crypto\n\nclean:\n\trm -f *.o\n",
        );
        write(
            tmp.path(),
            "ssl/Makefile",
            "TOP= ..\nCFLAG= -O3\n\nall:\n\techo ssl\n\nclean:\n\trm -f *.o\n",
        );
        // Top-level files are not rewritten.
        write(tmp.path(), "Makefile", "CFLAG= -O2\n");
        tmp
    }

    #[test]
    fn collects_only_subdirectory_makefiles() {
        let tmp = tree();
        let found = collect_makefiles(tmp.path()).unwrap();
        let rels: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(rels, vec!["crypto/Makefile", "ssl/Makefile"]);
    }

    #[test]
    fn update_suffixes_common_names_and_is_idempotent() {
        let tmp = tree();
        let config = Config {
            strip_variables: vec!["TOP".to_string()],
            emit_suffix_rules: true,
            aux_files: false,
            ..Config::default()
        };

        let summary = update(tmp.path(), &config).unwrap();
        assert_eq!(summary.files, 2);
        assert_eq!(summary.changed, 2);

        let crypto = std::fs::read_to_string(tmp.path().join("crypto/Makefile")).unwrap();
        assert!(crypto.contains("CFLAG_crypto= -O2\n"));
        assert!(crypto.contains("INCLUDE= -Icrypto -I. -Iinclude\n"));
        assert!(crypto.contains("all_crypto:"));
        assert!(crypto.contains("clean_crypto:"));
        assert!(!crypto.contains("TOP= ..\n"));
        assert!(crypto.contains("$(CC) $(CFLAG_crypto) $(INCLUDE) -c -o $@ $<\n"));

        let ssl = std::fs::read_to_string(tmp.path().join("ssl/Makefile")).unwrap();
        assert!(ssl.contains("CFLAG_ssl= -O3\n"));

        // The top-level Makefile is untouched.
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("Makefile")).unwrap(),
            "CFLAG= -O2\n"
        );

        // A second run must not change a single byte.
        let again = update(tmp.path(), &config).unwrap();
        assert_eq!(again.changed, 0);
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("crypto/Makefile")).unwrap(),
            crypto
        );
        assert_eq!(std::fs::read_to_string(tmp.path().join("ssl/Makefile")).unwrap(), ssl);
    }

    #[test]
    fn update_creates_wrapper_files_when_enabled() {
        let tmp = tree();
        let config = Config {
            strip_variables: vec!["TOP".to_string()],
            aux_files: true,
            ..Config::default()
        };
        let summary = update(tmp.path(), &config).unwrap();
        assert_eq!(summary.aux_created, 4);
        let gnu = std::fs::read_to_string(tmp.path().join("crypto/GNUmakefile")).unwrap();
        assert!(gnu.contains("TOP= .."));
    }

    #[test]
    fn moves_recipes_between_targets() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "crypto/Makefile",
            "clean:\n\trm -f *.o\n\t@target=clean; $(RECURSIVE_MAKE)\n\ndclean:\n\trm -f Makefile.bak\n\t@target=dclean; $(RECURSIVE_MAKE)\n\n",
        );
        let config = Config {
            aux_files: false,
            ..Config::default()
        };
        update(tmp.path(), &config).unwrap();
        let text = std::fs::read_to_string(tmp.path().join("crypto/Makefile")).unwrap();
        assert!(!text.contains("dclean:"));
        assert!(text.contains("clean:\n\trm -f *.o\n\trm -f Makefile.bak\n\t@target=clean; $(RECURSIVE_MAKE)\n"));
    }

    #[test]
    fn empty_tree_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(update(tmp.path(), &Config::default()).is_err());
    }
}
