use crate::annotation;
use crate::config::AnalyzerConfig;
use crate::extractor::handler::HandlerExtractor;
use crate::extractor::router::RouterExtractor;
use crate::extractor::{FunctionExtractor, HandlerDetail, RouteMap};
use crate::oracle::TypeOracle;
use crate::syntax::Program;
use log::{debug, info};
use serde::Serialize;
use std::path::PathBuf;

/// Drives both extractors over a program and joins their results.
///
/// # Example
///
/// ```no_run
/// use gin_swag_from_source::analyzer::Analyzer;
/// use gin_swag_from_source::config::AnalyzerConfig;
/// use gin_swag_from_source::loader;
/// use std::path::Path;
///
/// let config = AnalyzerConfig::default();
/// let loaded = loader::load(Path::new("./my-project"), &config).unwrap();
/// let report = Analyzer::new(&config).analyze(&loaded.program, &loaded.types);
/// for handler in report.handlers() {
///     println!("{}: {:?}", handler.detail.key, handler.directives);
/// }
/// ```
pub struct Analyzer<'c> {
    config: &'c AnalyzerConfig,
}

/// Handlers of the whole run, grouped per file.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub files: Vec<FileReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub package: String,
    pub handlers: Vec<HandlerDoc>,
}

/// A joined handler with its synthesized directives.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerDoc {
    #[serde(flatten)]
    pub detail: HandlerDetail,
    pub directives: Vec<String>,
}

impl AnalysisReport {
    pub fn handlers(&self) -> impl Iterator<Item = &HandlerDoc> {
        self.files.iter().flat_map(|file| &file.handlers)
    }

    pub fn handler_count(&self) -> usize {
        self.files.iter().map(|file| file.handlers.len()).sum()
    }
}

/// State confined to a single analysis run.
#[derive(Default)]
struct RunContext {
    routes: RouteMap,
    files: Vec<(PathBuf, String, Vec<HandlerDetail>)>,
}

impl<'c> Analyzer<'c> {
    pub fn new(config: &'c AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, program: &Program, oracle: &dyn TypeOracle) -> AnalysisReport {
        let handlers = HandlerExtractor::new(oracle, self.config);
        let routers = RouterExtractor::new(oracle, self.config);
        let mut ctx = RunContext::default();

        for file in &program.files {
            let mut details = Vec::new();
            for func in file.functions() {
                if handlers.accepts(func) {
                    details.push(handlers.extract(func, &file.path));
                } else if routers.accepts(func) {
                    let count = routers.extract(func, &mut ctx.routes);
                    debug!("{}: {} registers {} routes", file.path.display(), func.name, count);
                }
            }
            if !details.is_empty() {
                ctx.files.push((file.path.clone(), file.package.clone(), details));
            }
        }

        let handler_total: usize = ctx.files.iter().map(|(_, _, details)| details.len()).sum();
        info!(
            "Found {} handlers and {} routes",
            handler_total,
            ctx.routes.len()
        );

        let mut unrouted = 0;
        let files = ctx
            .files
            .into_iter()
            .map(|(path, package, details)| FileReport {
                path,
                package,
                handlers: details
                    .into_iter()
                    .map(|mut detail| {
                        let route = ctx.routes.get(&detail.key).or_else(|| {
                            detail
                                .key
                                .receiver
                                .as_ref()
                                .and_then(|_| ctx.routes.get(&detail.key.unqualified()))
                        });
                        match route {
                            Some(route) => detail.attach_route(route.clone()),
                            None => {
                                unrouted += 1;
                                debug!("No route registered for handler {}", detail.key);
                            }
                        }
                        let directives = annotation::synthesize(&detail, self.config);
                        HandlerDoc { detail, directives }
                    })
                    .collect(),
            })
            .collect();

        if unrouted > 0 {
            info!("{} handlers have no registered route", unrouted);
        }

        AnalysisReport { files }
    }
}
