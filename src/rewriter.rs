//! Writes synthesized directives back into the Go sources.
//!
//! Directives are inserted as `// <directive>` lines directly above the `func` line of each
//! eligible handler, below any existing doc comment. A handler is eligible when it has a
//! route, its doc comment is shorter than the configured threshold and the comment does
//! not already carry a `@Router` directive, so rewriting twice changes nothing.

use crate::analyzer::{AnalysisReport, HandlerDoc};
use crate::config::AnalyzerConfig;
use crate::serializer;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;

/// Comment lines to insert at a byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub offset: usize,
    pub lines: Vec<String>,
}

/// Outcome of a rewrite run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    pub files: usize,
    pub handlers: usize,
}

pub fn is_eligible(handler: &HandlerDoc, config: &AnalyzerConfig) -> bool {
    let detail = &handler.detail;
    detail.route.is_some()
        && detail.doc_lines < config.annotated_threshold
        && !detail.has_router_directive
}

/// Inserts every block as `// <line>` comments, back to front so earlier offsets stay valid.
pub fn apply_insertions(source: &str, insertions: &[Insertion]) -> String {
    let mut ordered: Vec<&Insertion> = insertions.iter().collect();
    ordered.sort_by(|a, b| b.offset.cmp(&a.offset));

    let mut out = source.to_string();
    for insertion in ordered {
        if insertion.offset > out.len() || !out.is_char_boundary(insertion.offset) {
            warn!("Skipping insertion at invalid offset {}", insertion.offset);
            continue;
        }
        let block: String = insertion
            .lines
            .iter()
            .map(|line| format!("// {}\n", line))
            .collect();
        out.insert_str(insertion.offset, &block);
    }
    out
}

/// Rewrites every file of `report` that holds at least one eligible handler.
pub fn rewrite_sources(report: &AnalysisReport, config: &AnalyzerConfig) -> Result<RewriteSummary> {
    let mut summary = RewriteSummary::default();

    for file in &report.files {
        let insertions: Vec<Insertion> = file
            .handlers
            .iter()
            .filter(|handler| is_eligible(handler, config))
            .map(|handler| Insertion {
                offset: handler.detail.location.insert_offset,
                lines: handler.directives.clone(),
            })
            .collect();

        if insertions.is_empty() {
            debug!("Nothing to annotate in {}", file.path.display());
            continue;
        }

        let source = fs::read_to_string(&file.path)
            .with_context(|| format!("Failed to read source file: {}", file.path.display()))?;
        let updated = apply_insertions(&source, &insertions);
        serializer::write_to_file(&updated, &file.path)?;

        info!(
            "Annotated {} handlers in {}",
            insertions.len(),
            file.path.display()
        );
        summary.files += 1;
        summary.handlers += insertions.len();
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_apply_insertions_back_to_front() {
        let source = "package a\n\n// A doc\nfunc A() {}\n\nfunc B() {}\n";
        let a = source.find("func A").unwrap();
        let b = source.find("func B").unwrap();

        let updated = apply_insertions(
            source,
            &[
                Insertion {
                    offset: a,
                    lines: vec!["@Summary A".to_string()],
                },
                Insertion {
                    offset: b,
                    lines: vec!["@Summary".to_string(), "@Router /b [GET]".to_string()],
                },
            ],
        );

        assert_eq!(
            updated,
            "package a\n\n// A doc\n// @Summary A\nfunc A() {}\n\n// @Summary\n// @Router /b [GET]\nfunc B() {}\n"
        );
    }

    #[test]
    fn test_apply_insertions_skips_invalid_offsets() {
        let source = "package é\n";
        let inside_char = source.find('é').unwrap() + 1;

        let updated = apply_insertions(
            source,
            &[
                Insertion {
                    offset: inside_char,
                    lines: vec!["x".to_string()],
                },
                Insertion {
                    offset: 1000,
                    lines: vec!["y".to_string()],
                },
            ],
        );

        assert_eq!(updated, source);
    }
}
