//! Batch ingest: collect inputs, parse and resolve each file, summarize.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use colored::Colorize;
use lineage_ingest_gedcom::{parse_file, ParseReport, ParserConfig};
use lineage_model::RecordGraph;
use lineage_resolve::{resolve, ResolutionReport, ResolveConfig};
use serde::Serialize;
use walkdir::WalkDir;

fn is_gedcom(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ged"))
}

/// Expands directories into their `*.ged` files, sorted; plain files pass
/// through whatever their extension.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(path).follow_links(true) {
                let entry = entry.with_context(|| format!("walking {}", path.display()))?;
                if entry.file_type().is_file() && is_gedcom(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            tracing::debug!(dir = %path.display(), files = found.len(), "collected directory");
            files.extend(found);
        } else if path.exists() {
            files.push(path.clone());
        } else {
            anyhow::bail!("no such file or directory: {}", path.display());
        }
    }
    Ok(files)
}

#[derive(Debug, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub parse: ParseReport,
    pub resolution: ResolutionReport,
    pub graph: RecordGraph,
}

impl FileOutcome {
    /// Unknown tags or resolution errors; what `--strict` rejects.
    pub fn is_unclean(&self) -> bool {
        self.parse.had_unknown_tag || self.resolution.has_errors()
    }
}

#[derive(Debug, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
    pub warnings: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    pub files: Vec<FileOutcome>,
    pub failures: Vec<FileFailure>,
}

impl BatchOutcome {
    pub fn unclean(&self) -> usize {
        self.files.iter().filter(|f| f.is_unclean()).count()
    }
}

/// Parses and resolves one file. Fatal parse errors come back as the error
/// value; everything else lands in the outcome's reports.
pub fn ingest_file(
    path: &Path,
    parser: &ParserConfig,
    resolver: &ResolveConfig,
) -> lineage_ingest_gedcom::Result<FileOutcome> {
    let parsed = parse_file(path, parser)?;
    let mut graph = parsed.graph;
    let resolution = resolve(&mut graph, resolver);
    Ok(FileOutcome {
        path: path.to_path_buf(),
        parse: parsed.report,
        resolution,
        graph,
    })
}

/// Processes every file back to back; one bad file does not stop the batch.
pub fn ingest_all(files: &[PathBuf], parser: &ParserConfig, resolver: &ResolveConfig) -> BatchOutcome {
    let mut batch = BatchOutcome::default();
    for path in files {
        let span = tracing::info_span!("ingest", path = %path.display());
        let _guard = span.enter();
        match ingest_file(path, parser, resolver) {
            Ok(outcome) => batch.files.push(outcome),
            Err(err) => {
                tracing::error!(error = %err, "file rejected");
                batch.failures.push(FileFailure {
                    path: path.clone(),
                    warnings: err.warnings(),
                    error: err.to_string(),
                });
            }
        }
    }
    batch
}

pub fn print_outcome(outcome: &FileOutcome) {
    let stats = outcome.graph.stats();
    let parse = &outcome.parse;
    let res = &outcome.resolution;

    println!("{} {}", "Ingested".green().bold(), outcome.path.display());
    if let Some(program) = &parse.source_program {
        println!("  {} {}", "from".cyan(), program);
    }
    println!(
        "  {} {} people, {} families, {} sources",
        "→".yellow(),
        stats.people,
        stats.families,
        stats.sources
    );
    let unknown = if parse.had_unknown_tag {
        format!("{} unknown tags", parse.unknown_tags).yellow().to_string()
    } else {
        "no unknown tags".to_string()
    };
    println!("  {} {} warnings, {}", "→".yellow(), parse.warnings, unknown);
    println!(
        "  {} {} living, {} dead, {} before cutoff",
        "→".yellow(),
        res.living,
        res.dead,
        res.born_before_cutoff
    );
    if res.repaired_links + res.removed_dangling + res.folded_sources > 0 {
        println!(
            "  {} {} links repaired, {} dangling removed, {} sources folded",
            "→".yellow(),
            res.repaired_links,
            res.removed_dangling,
            res.folded_sources
        );
    }
    for (a, b) in &res.duplicate_families {
        println!("  {} possible duplicate families {a} and {b}", "warning:".yellow().bold());
    }
    for err in &res.errors {
        println!("  {} {err}", "error:".red().bold());
    }
}

pub fn print_failure(failure: &FileFailure) {
    println!(
        "{} {}: {} ({} warnings before failure)",
        "Failed".red().bold(),
        failure.path.display(),
        failure.error,
        failure.warnings
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAMILY: &str = "0 HEAD\n1 SOUR TEST\n0 @I1@ INDI\n1 NAME Ann /Lee/\n1 FAMS @F1@\n\
                          0 @I2@ INDI\n1 BIRT\n2 DATE 1990\n0 @F1@ FAM\n1 WIFE @I1@\n1 CHIL @I2@\n0 TRLR\n";

    #[test]
    fn directories_expand_to_sorted_gedcom_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir(dir.path().join("nested")).expect("mkdir");
        for name in ["b.ged", "a.GED", "notes.txt", "nested/c.ged"] {
            std::fs::write(dir.path().join(name), FAMILY).expect("write");
        }
        let files = collect_inputs(&[dir.path().to_path_buf()]).expect("should collect");
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).expect("prefix").to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.GED"),
                PathBuf::from("b.ged"),
                PathBuf::from("nested/c.ged")
            ]
        );
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(collect_inputs(&[dir.path().join("absent.ged")]).is_err());
    }

    #[test]
    fn batch_continues_past_a_fatal_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let good = dir.path().join("good.ged");
        let bad = dir.path().join("bad.ged");
        std::fs::write(&good, FAMILY).expect("write");
        std::fs::write(&bad, "0 FAM\n1 HUSB @I1@\n0 TRLR\n").expect("write");

        let batch = ingest_all(
            &[bad.clone(), good.clone()],
            &ParserConfig::default(),
            &ResolveConfig::default(),
        );
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].path, bad);
        assert_eq!(batch.files.len(), 1);

        let outcome = &batch.files[0];
        assert_eq!(outcome.parse.source_program.as_deref(), Some("TEST"));
        assert!(outcome
            .graph
            .person("I2")
            .is_some_and(|p| p.child_of_families().contains("F1")));
        assert!(!outcome.is_unclean());
    }
}
