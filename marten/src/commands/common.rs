// commands/common.rs
//! Shared front-end driving for CLI commands.

use std::path::Path;

use miette::NamedSource;

use marten_frontend::parser::{ParseError, Parser};
use marten_frontend::errors::LexerError;
use marten_identity::Interner;
use marten_sema::loader::{self, ModuleSource};
use marten_sema::{Analyzer, TypeError};

use crate::cli::ColorMode;
use crate::report::render_to_stderr;

/// Run the whole front end for the project at `root`.
///
/// Returns the analyzer (program, registry and interner) on success, or
/// `Err(())` after rendering every collected diagnostic to stderr.
pub fn run_front_end(root: &Path, color: ColorMode) -> Result<Analyzer, ()> {
    let sources = match loader::load_tree(root) {
        Ok(sources) => sources,
        Err(e) => {
            eprintln!("error: {e}");
            return Err(());
        }
    };
    tracing::info!(modules = sources.len(), "loaded source tree");

    // Parse every module; the first parse failure aborts the compilation
    // after its (and any lexer) diagnostics are rendered.
    let mut interner = Interner::new();
    let mut modules = Vec::new();
    for source in &sources {
        let mut parser = Parser::new(&source.source, &mut interner);
        let result = parser.parse_module();
        let lexer_errors = parser.take_lexer_errors();

        match result {
            Ok(module) => {
                if !lexer_errors.is_empty() {
                    render_lexer_errors(&lexer_errors, source, color);
                    return Err(());
                }
                modules.push(module);
            }
            Err(e) => {
                if lexer_errors.is_empty() {
                    render_parse_error(&e, source, color);
                } else {
                    // The parse error is likely a consequence of an error
                    // token; the lexer diagnostics tell the real story.
                    render_lexer_errors(&lexer_errors, source, color);
                }
                return Err(());
            }
        }
    }

    let mut analyzer = Analyzer::new(modules, sources, interner);
    if !analyzer.analyze() {
        let errors = analyzer.take_errors();
        render_sema_errors(&errors, &analyzer, color);
        return Err(());
    }

    Ok(analyzer)
}

fn named_source(source: &ModuleSource) -> NamedSource<String> {
    NamedSource::new(source.file.display().to_string(), source.source.clone())
}

fn render_lexer_errors(errors: &[LexerError], source: &ModuleSource, color: ColorMode) {
    for error in errors {
        let report = miette::Report::new(error.clone()).with_source_code(named_source(source));
        render_to_stderr(report.as_ref(), color);
    }
}

fn render_parse_error(error: &ParseError, source: &ModuleSource, color: ColorMode) {
    let report = miette::Report::new(error.error.clone()).with_source_code(named_source(source));
    render_to_stderr(report.as_ref(), color);
}

fn render_sema_errors(errors: &[TypeError], analyzer: &Analyzer, color: ColorMode) {
    for error in errors {
        match error.module {
            Some(module) => {
                let source = analyzer.program.source(module);
                let report = miette::Report::new(error.error.clone())
                    .with_source_code(named_source(source));
                render_to_stderr(report.as_ref(), color);
            }
            None => {
                let report = miette::Report::new(error.error.clone());
                render_to_stderr(report.as_ref(), color);
            }
        }
    }
}
