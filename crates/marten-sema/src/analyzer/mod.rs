// analyzer/mod.rs
//
// The semantic checker. Four passes over the parsed program, each gated on
// the diagnostic sink being empty:
//
//   1. declarations : symbol tables, program-level ids, import resolution
//   2. signatures   : use-imports, type resolution, constant evaluation
//   3. layout       : struct self-storage detection and sizing
//   4. bodies       : control-flow rules, then scoped type checking with
//                      constant folding
//
// Passes mutate the AST only to resolve names and rewrite folded
// expressions; every other result lands in the program registry.

mod decls;
mod expr;
mod signatures;
mod stmt;

#[cfg(test)]
mod tests;

use marten_frontend::ast::Module;
use marten_identity::Interner;

use crate::layout;
use crate::loader::ModuleSource;
use crate::program::{Program, TypeError};

pub struct Analyzer {
    pub program: Program,
    pub interner: Interner,
    errors: Vec<TypeError>,
}

impl Analyzer {
    pub fn new(modules: Vec<Module>, sources: Vec<ModuleSource>, interner: Interner) -> Self {
        Self {
            program: Program::new(modules, sources),
            interner,
            errors: Vec::new(),
        }
    }

    /// Run all passes. Returns true when the program checked cleanly.
    pub fn analyze(&mut self) -> bool {
        self.run_pass1();
        tracing::debug!(errors = self.errors.len(), "pass 1 (declarations) done");
        if !self.errors.is_empty() {
            return false;
        }

        self.run_pass2();
        tracing::debug!(errors = self.errors.len(), "pass 2 (signatures) done");
        if !self.errors.is_empty() {
            return false;
        }

        layout::run(&mut self.program, &self.interner, &mut self.errors);
        tracing::debug!(errors = self.errors.len(), "pass 3 (layout) done");
        if !self.errors.is_empty() {
            return false;
        }

        self.run_pass4();
        tracing::debug!(errors = self.errors.len(), "pass 4 (bodies) done");
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[TypeError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<TypeError> {
        std::mem::take(&mut self.errors)
    }
}
