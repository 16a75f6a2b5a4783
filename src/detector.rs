use crate::syntax::Program;
use log::debug;
use std::path::PathBuf;

/// Framework detector for identifying the Go files that use the web framework.
///
/// The `FrameworkDetector` examines the import declarations of parsed Go files for the
/// configured framework import path (`github.com/gin-gonic/gin` by default). Aliased and
/// blank imports count as well.
pub struct FrameworkDetector;

/// Result of framework detection.
pub struct DetectionResult {
    /// Files importing the framework, in program order
    pub files: Vec<PathBuf>,
}

impl DetectionResult {
    pub fn is_detected(&self) -> bool {
        !self.files.is_empty()
    }
}

impl FrameworkDetector {
    /// Detects the files of `program` that import `import_path`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gin_swag_from_source::detector::FrameworkDetector;
    /// use gin_swag_from_source::syntax::Program;
    ///
    /// let program = Program::default();
    /// let result = FrameworkDetector::detect(&program, "github.com/gin-gonic/gin");
    /// println!("{} file(s) import gin", result.files.len());
    /// ```
    pub fn detect(program: &Program, import_path: &str) -> DetectionResult {
        debug!(
            "Detecting {} in {} files",
            import_path,
            program.files.len()
        );

        let files: Vec<PathBuf> = program
            .files
            .iter()
            .filter(|file| {
                file.imports
                    .iter()
                    .any(|import| Self::is_framework_import(&import.path, import_path))
            })
            .map(|file| file.path.clone())
            .collect();

        debug!("Files importing {}: {:?}", import_path, files);

        DetectionResult { files }
    }

    /// Matches the framework root and its sub-packages (`.../gin/binding`).
    fn is_framework_import(path: &str, framework: &str) -> bool {
        path == framework
            || path
                .strip_prefix(framework)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::GoParser;
    use std::path::Path;

    const GIN: &str = "github.com/gin-gonic/gin";

    fn program(sources: &[(&str, &str)]) -> Program {
        let mut parser = GoParser::new().unwrap();
        Program {
            files: sources
                .iter()
                .map(|(path, code)| parser.parse_source(Path::new(path), code).unwrap())
                .collect(),
        }
    }

    #[test]
    fn test_detect_gin_import() {
        let program = program(&[
            (
                "router.go",
                "package router\n\nimport \"github.com/gin-gonic/gin\"\n\nfunc InitRouter(e *gin.Engine) {}\n",
            ),
            ("model.go", "package model\n\ntype User struct{}\n"),
        ]);

        let result = FrameworkDetector::detect(&program, GIN);

        assert!(result.is_detected());
        assert_eq!(result.files, vec![PathBuf::from("router.go")]);
    }

    #[test]
    fn test_detect_aliased_and_sub_package_import() {
        let program = program(&[
            (
                "a.go",
                "package a\n\nimport (\n\tweb \"github.com/gin-gonic/gin\"\n)\n",
            ),
            (
                "b.go",
                "package b\n\nimport \"github.com/gin-gonic/gin/binding\"\n",
            ),
        ]);

        let result = FrameworkDetector::detect(&program, GIN);

        assert_eq!(result.files.len(), 2);
    }

    #[test]
    fn test_detect_no_framework() {
        let program = program(&[
            ("a.go", "package a\n\nimport \"net/http\"\n"),
            ("b.go", "package b\n\nimport \"github.com/gin-gonic/ginx\"\n"),
        ]);

        let result = FrameworkDetector::detect(&program, GIN);

        assert!(!result.is_detected());
    }
}
