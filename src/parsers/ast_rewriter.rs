//! Structural import rewriting using OXC
//!
//! Parses a source file, finds every module specifier literal (import and
//! re-export sources, single-argument `require("...")` calls), and replaces
//! the selected literals with their extension-stripped form. Only the
//! literal nodes change; the text around them is carried over untouched.

use crate::error::{FixImportsError, Result};
use crate::models::rewrite::ConvertedFileSet;
use crate::utils::path_resolver::{strip_legacy_extension, PathResolver};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast_visit::{walk, Visit};
use oxc_diagnostics::OxcDiagnostic;
use oxc_parser::{ParseOptions, Parser};
use oxc_span::SourceType;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

/// Thread-safe allocator pool for reuse across parses
pub struct AllocatorPool {
    allocators: Arc<Mutex<Vec<Allocator>>>,
}

impl AllocatorPool {
    /// Create a new allocator pool
    pub fn new(size: usize) -> Self {
        let mut allocators = Vec::with_capacity(size);
        for _ in 0..size {
            allocators.push(Allocator::default());
        }
        Self {
            allocators: Arc::new(Mutex::new(allocators)),
        }
    }

    /// Take an allocator from the pool
    pub fn take(&self) -> Option<Allocator> {
        self.allocators.lock().pop()
    }

    /// Reset an allocator and return it to the pool
    pub fn return_allocator(&self, mut allocator: Allocator) {
        allocator.reset();
        self.allocators.lock().push(allocator);
    }
}

/// A module specifier literal found in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecifierLiteral {
    /// Byte offset of the opening quote
    pub start: u32,
    /// Byte offset just past the closing quote
    pub end: u32,
    /// Decoded literal value
    pub value: String,
}

/// Collects specifier literals from import, re-export and require nodes
#[derive(Default)]
struct SpecifierCollector {
    literals: Vec<SpecifierLiteral>,
}

impl SpecifierCollector {
    fn push(&mut self, literal: &StringLiteral<'_>) {
        self.literals.push(SpecifierLiteral {
            start: literal.span.start,
            end: literal.span.end,
            value: literal.value.as_str().to_string(),
        });
    }
}

impl<'a> Visit<'a> for SpecifierCollector {
    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        self.push(&it.source);
        walk::walk_import_declaration(self, it);
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &it.source {
            self.push(source);
        }
        walk::walk_export_named_declaration(self, it);
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        self.push(&it.source);
        walk::walk_export_all_declaration(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let Expression::Identifier(ident) = &it.callee {
            if ident.name.as_str() == "require" && it.arguments.len() == 1 {
                if let Some(Argument::StringLiteral(lit)) = it.arguments.first() {
                    self.push(lit);
                }
            }
        }
        walk::walk_call_expression(self, it);
    }
}

/// Structural rewriter for parseable consumer files
pub struct ASTImportRewriter {
    parse_options: ParseOptions,
    allocator_pool: AllocatorPool,
}

impl ASTImportRewriter {
    /// Create a new rewriter
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions {
                allow_return_outside_function: true,
                ..ParseOptions::default()
            },
            allocator_pool: AllocatorPool::new(num_cpus::get()),
        }
    }

    /// Rewrite every specifier in `source` that resolves into `converted`
    pub fn rewrite(
        &self,
        source: &str,
        importing_file: &Path,
        converted: &ConvertedFileSet,
        resolver: &PathResolver,
    ) -> Result<String> {
        self.rewrite_with(source, importing_file, |specifier| {
            let resolved = resolver.resolve(specifier, importing_file);
            let hit = resolved.is_converted(converted);
            if hit {
                tracing::debug!(
                    file = %importing_file.display(),
                    specifier,
                    "specifier references a converted file"
                );
            }
            hit
        })
    }

    /// Rewrite the specifiers accepted by `select`
    pub fn rewrite_with<F>(&self, source: &str, path: &Path, mut select: F) -> Result<String>
    where
        F: FnMut(&str) -> bool,
    {
        let literals = self.collect_specifiers(source, path)?;

        let mut output = String::with_capacity(source.len());
        let mut cursor = 0usize;
        for literal in literals {
            let (start, end) = (literal.start as usize, literal.end as usize);
            if start < cursor || !select(&literal.value) {
                continue;
            }
            let Some(replacement) = stripped_literal(source, &literal) else {
                continue;
            };
            output.push_str(&source[cursor..start]);
            output.push_str(&replacement);
            cursor = end;
        }
        output.push_str(&source[cursor..]);
        Ok(output)
    }

    /// Parse `source` and return its specifier literals in source order
    ///
    /// Sources carrying type annotations (Flow) fail the plain parse; they are
    /// retried as TypeScript before being reported.
    pub fn collect_specifiers(&self, source: &str, path: &Path) -> Result<Vec<SpecifierLiteral>> {
        let source_type =
            SourceType::from_path(path).unwrap_or_else(|_| SourceType::mjs().with_jsx(true));

        let collected = self.parse_specifiers(source, source_type).or_else(|message| {
            if source_type.is_typescript() {
                return Err(message);
            }
            let fallback = if source_type.is_jsx() { SourceType::tsx() } else { SourceType::ts() };
            tracing::debug!(file = %path.display(), "retrying parse with type annotations");
            self.parse_specifiers(source, fallback).map_err(|_| message)
        });

        let mut literals = collected.map_err(|message| FixImportsError::parse_error(path, message))?;
        literals.sort_by_key(|literal| literal.start);
        Ok(literals)
    }

    fn parse_specifiers(
        &self,
        source: &str,
        source_type: SourceType,
    ) -> std::result::Result<Vec<SpecifierLiteral>, String> {
        let allocator = self.allocator_pool.take().unwrap_or_default();

        let collected = {
            let ret = Parser::new(&allocator, source, source_type)
                .with_options(self.parse_options)
                .parse();

            if ret.panicked || !ret.errors.is_empty() {
                Err(describe_errors(&ret.errors))
            } else {
                let mut collector = SpecifierCollector::default();
                collector.visit_program(&ret.program);
                Ok(collector.literals)
            }
        };

        self.allocator_pool.return_allocator(allocator);
        collected
    }
}

impl Default for ASTImportRewriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Replacement text for `literal`, if stripping changes it
///
/// Stripping works on the decoded value. When the source spells the value
/// with escapes, the replacement is re-escaped in the same quote style.
fn stripped_literal(source: &str, literal: &SpecifierLiteral) -> Option<String> {
    let raw = source.get(literal.start as usize..literal.end as usize)?;
    let quote = raw.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let stripped = strip_legacy_extension(&literal.value);
    if stripped == literal.value {
        return None;
    }

    let inner = raw.get(1..raw.len().checked_sub(1)?)?;
    if inner == literal.value {
        return Some(format!("{quote}{stripped}{quote}"));
    }

    let mut escaped = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c if c == quote => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    Some(format!("{quote}{escaped}{quote}"))
}

fn describe_errors(errors: &[OxcDiagnostic]) -> String {
    match errors.first() {
        Some(first) if errors.len() > 1 => format!("{} (and {} more)", first, errors.len() - 1),
        Some(first) => first.to_string(),
        None => "parser aborted".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new(files: &[&str]) -> Self {
            let dir = TempDir::new().unwrap();
            for file in files {
                let path = dir.path().join(file);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, "").unwrap();
            }
            Self { dir }
        }

        fn path(&self, rel: &str) -> std::path::PathBuf {
            self.dir.path().join(rel)
        }
    }

    #[test]
    fn test_rewrites_converted_import() {
        let fx = Fixture::new(&["a/b/c.js", "a/b/foo.js"]);
        let converted = ConvertedFileSet::from_paths([fx.path("a/b/foo.js")]);
        let resolver = PathResolver::relative_only();

        let source = "import foo from './foo.coffee';\nfoo();\n";
        let out = ASTImportRewriter::new()
            .rewrite(source, &fx.path("a/b/c.js"), &converted, &resolver)
            .unwrap();

        assert_eq!(out, "import foo from './foo';\nfoo();\n");
    }

    #[test]
    fn test_leaves_unconverted_import() {
        let fx = Fixture::new(&["a/b/c.js", "a/b/foo.js"]);
        let converted = ConvertedFileSet::from_paths([fx.path("a/b/other.js")]);
        let resolver = PathResolver::relative_only();

        let source = "import foo from './foo.coffee';\n";
        let out = ASTImportRewriter::new()
            .rewrite(source, &fx.path("a/b/c.js"), &converted, &resolver)
            .unwrap();

        assert_eq!(out, source);
    }

    #[test]
    fn test_rewrites_reexports_and_requires() {
        let fx = Fixture::new(&["main.js", "foo.js", "bar.js", "baz.js", "nested/qux.js"]);
        let converted = ConvertedFileSet::from_paths([
            fx.path("foo.js"),
            fx.path("bar.js"),
            fx.path("nested/qux.js"),
        ]);
        let resolver = PathResolver::relative_only();

        let source = r#"export { a } from "./foo.coffee";
export * from './bar.js.coffee';
const baz = require('./baz.coffee');
function load() {
  return require("./nested/qux.coffee");
}
"#;
        let out = ASTImportRewriter::new()
            .rewrite(source, &fx.path("main.js"), &converted, &resolver)
            .unwrap();

        assert_eq!(
            out,
            r#"export { a } from "./foo";
export * from './bar';
const baz = require('./baz.coffee');
function load() {
  return require("./nested/qux");
}
"#
        );
    }

    #[test]
    fn test_multi_argument_require_is_ignored() {
        let fx = Fixture::new(&["main.js", "foo.js"]);
        let converted = ConvertedFileSet::from_paths([fx.path("foo.js")]);
        let resolver = PathResolver::relative_only();

        let source = "const foo = require('./foo.coffee', true);\nconst b = load('./foo.coffee');\n";
        let out = ASTImportRewriter::new()
            .rewrite(source, &fx.path("main.js"), &converted, &resolver)
            .unwrap();

        assert_eq!(out, source);
    }

    #[test]
    fn test_absolute_root_import() {
        let fx = Fixture::new(&["app/main.js", "lib/models/user.js"]);
        let converted = ConvertedFileSet::from_paths([fx.path("lib/models/user.js")]);
        let resolver = PathResolver::new([fx.path("lib")]);

        let source = "import User from 'models/user.coffee';\n";
        let out = ASTImportRewriter::new()
            .rewrite(source, &fx.path("app/main.js"), &converted, &resolver)
            .unwrap();

        assert_eq!(out, "import User from 'models/user';\n");
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let fx = Fixture::new(&["main.js", "foo.js"]);
        let converted = ConvertedFileSet::from_paths([fx.path("foo.js")]);
        let resolver = PathResolver::relative_only();
        let rewriter = ASTImportRewriter::new();

        let once = rewriter
            .rewrite("import foo from './foo.coffee';\n", &fx.path("main.js"), &converted, &resolver)
            .unwrap();
        let twice = rewriter.rewrite(&once, &fx.path("main.js"), &converted, &resolver).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_jsx_source_parses() {
        let fx = Fixture::new(&["view.jsx", "button.js"]);
        let converted = ConvertedFileSet::from_paths([fx.path("button.js")]);
        let resolver = PathResolver::relative_only();

        let source = "import Button from './button.coffee';\nexport const View = () => <Button />;\n";
        let out = ASTImportRewriter::new()
            .rewrite(source, &fx.path("view.jsx"), &converted, &resolver)
            .unwrap();

        assert!(out.starts_with("import Button from './button';"));
    }

    #[test]
    fn test_same_basename_elsewhere_is_not_rewritten() {
        let fx = Fixture::new(&["a/foo.js", "b/foo.js", "c/main.js"]);
        let converted = ConvertedFileSet::from_paths([fx.path("a/foo.js")]);
        let resolver = PathResolver::relative_only();

        let source = "import a from '../a/foo.coffee';\nimport b from '../b/foo.coffee';\n";
        let out = ASTImportRewriter::new()
            .rewrite(source, &fx.path("c/main.js"), &converted, &resolver)
            .unwrap();

        assert_eq!(out, "import a from '../a/foo';\nimport b from '../b/foo.coffee';\n");
    }

    #[test]
    fn test_flow_annotated_source_is_rewritten() {
        let fx = Fixture::new(&["user.js", "foo.js"]);
        let converted = ConvertedFileSet::from_paths([fx.path("foo.js")]);
        let resolver = PathResolver::relative_only();

        let source = "// @flow\nimport foo from './foo.coffee';\nfunction f(x: number): number {\n  return foo(x);\n}\n";
        let out = ASTImportRewriter::new()
            .rewrite(source, &fx.path("user.js"), &converted, &resolver)
            .unwrap();

        assert_eq!(
            out,
            "// @flow\nimport foo from './foo';\nfunction f(x: number): number {\n  return foo(x);\n}\n"
        );
    }

    #[test]
    fn test_escaped_specifier_is_stripped_from_its_value() {
        let fx = Fixture::new(&["main.js", "foo.js"]);
        let converted = ConvertedFileSet::from_paths([fx.path("foo.js")]);
        let resolver = PathResolver::relative_only();

        let source = r"import foo from './foo\x2ecoffee';
";
        let out = ASTImportRewriter::new()
            .rewrite(source, &fx.path("main.js"), &converted, &resolver)
            .unwrap();

        assert_eq!(out, "import foo from './foo';\n");
    }

    #[test]
    fn test_parse_error_is_reported() {
        let fx = Fixture::new(&["broken.js"]);
        let err = ASTImportRewriter::new()
            .collect_specifiers("import from from from;", &fx.path("broken.js"))
            .unwrap_err();

        assert!(matches!(err, FixImportsError::Parse { .. }));
    }

    #[test]
    fn test_rewrite_with_custom_selection() {
        let source = "import a from './a.coffee';\nimport b from 'b.coffee';\n";
        let out = ASTImportRewriter::new()
            .rewrite_with(source, Path::new("x.js"), |_| true)
            .unwrap();

        assert_eq!(out, "import a from './a';\nimport b from 'b';\n");
    }
}
