//! Serialization module for rendering analysis reports as text, YAML or JSON.
//!
//! This module provides functions to render an [`AnalysisReport`] into the supported output
//! formats and write them to files or return them as strings.

use crate::analyzer::AnalysisReport;
use crate::error::Error;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Renders the report as Go comment blocks, ready to paste above each handler.
///
/// Every handler gets a header line `// <file>:<line> <handler>` followed by one
/// `// <directive>` line per directive. Handlers are separated by a blank line.
///
/// # Example
///
/// ```text
/// // api/account/account.go:14 accountApi.GetAccountInfo
/// // @Summary GetAccountInfo 注册
/// // @Accept application/json
/// // @Produce application/json
/// // @Success 200 {object} response.AccountInfo "成功"
/// // @Router /account/getUserInfo [GET]
/// // @Param data body request.GetAccountInfoReq true "请求参数"
/// ```
pub fn render_text(report: &AnalysisReport) -> String {
    debug!("Rendering {} handlers as text", report.handler_count());
    report
        .handlers()
        .map(|handler| {
            let location = &handler.detail.location;
            let mut block = format!(
                "// {}:{} {}\n",
                location.file.display(),
                location.line,
                handler.detail.key
            );
            for directive in &handler.directives {
                block.push_str(&format!("// {}\n", directive));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serializes a report to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(report: &AnalysisReport) -> Result<String> {
    debug!("Serializing analysis report to YAML");
    serde_yaml::to_string(report)
        .map_err(Error::from)
        .context("Failed to serialize analysis report to YAML")
}

/// Serializes a report to JSON format with pretty printing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(report: &AnalysisReport) -> Result<String> {
    debug!("Serializing analysis report to JSON");
    serde_json::to_string_pretty(report)
        .map_err(Error::from)
        .context("Failed to serialize analysis report to JSON")
}

/// Writes string content to a file.
///
/// Creates the file and its parent directories if they don't exist, or overwrites the file
/// if it does.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
