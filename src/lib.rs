//! gin swag generator - swag documentation directives from gin projects.
//!
//! This library statically analyzes Go web projects built on gin. It finds request handlers
//! (functions taking `*gin.Context`), reconstructs the route table from router setup code
//! (`Group` nesting and `GET`/`POST`/... registrations), and synthesizes the
//! `@Summary`/`@Accept`/`@Produce`/`@Success`/`@Router`/`@Param` comment directives the
//! swag tool consumes.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Recursively scans project directories for Go files
//! 2. [`parser`] - Parses Go files with tree-sitter and lowers them into [`syntax`] trees
//! 3. [`checker`] - Best-effort type checking, recorded in an [`oracle::TypeInfo`]
//! 4. [`loader`] - Runs the three steps above as one batch and finds `go.mod`
//! 5. [`detector`] - Reports which files import the framework
//! 6. [`extractor`] - Handler signatures and router topology
//! 7. [`analyzer`] - Joins handlers with routes and runs [`annotation`] synthesis
//! 8. [`serializer`] / [`rewriter`] - Emit the result or write it back into the sources
//!
//! # Example Usage
//!
//! ```no_run
//! use gin_swag_from_source::{
//!     analyzer::Analyzer, config::AnalyzerConfig, loader, serializer::render_text,
//! };
//! use std::path::Path;
//!
//! let config = AnalyzerConfig::default();
//! let loaded = loader::load(Path::new("./my-gin-project"), &config).unwrap();
//! let report = Analyzer::new(&config).analyze(&loaded.program, &loaded.types);
//! print!("{}", render_text(&report));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod analyzer;
pub mod annotation;
pub mod checker;
pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod extractor;
pub mod loader;
pub mod oracle;
pub mod parser;
pub mod rewriter;
pub mod scanner;
pub mod serializer;
pub mod syntax;
pub mod type_name;
pub mod types;
