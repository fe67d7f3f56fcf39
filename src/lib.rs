#![allow(clippy::module_inception)]

use std::io::{self, Write};

use inkwell::context::Context;

use crate::errors::errors::Error;

pub mod ast;
pub mod codegen;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod semantics;

extern crate regex;

/// A `line:column` location in the source text, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position(pub u32, pub u32);

impl Position {
    pub fn null() -> Self {
        Position(0, 0)
    }

    pub fn line(&self) -> u32 {
        self.0
    }

    pub fn column(&self) -> u32 {
        self.1
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.0, self.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Pipeline switches, filled in from the command line by the driver.
#[derive(Debug, Default, Clone)]
pub struct Options {
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub verbose: bool,
}

/// What a full pipeline invocation produced.
#[derive(Debug)]
pub enum RunOutcome {
    /// Lexing or parsing failed; the analyzer and generator never ran.
    SyntaxError(Error),
    /// The analyzer logged at least one ERROR; no IR was produced.
    SemanticFailure { errors: usize },
    /// Clean analysis; the textual IR module.
    Success { ir: String },
}

/// Runs the whole pipeline over one compilation unit: tokenize, parse,
/// analyze, and (only when the analysis is error-free) generate IR.
///
/// Token/AST dumps and diagnostics are written to `out` in emission order.
pub fn run<W: Write>(
    source: &str,
    file_name: &str,
    out: &mut W,
    opts: &Options,
) -> io::Result<RunOutcome> {
    let tokens = match lexer::lexer::tokenize(source) {
        Ok(tokens) => tokens,
        Err(error) => {
            writeln!(out, "{}", error.format())?;
            return Ok(RunOutcome::SyntaxError(error));
        }
    };

    if opts.dump_tokens {
        for token in &tokens {
            writeln!(out, "{}", token.dump())?;
        }
    }

    let krate = match parser::parser::parse(tokens) {
        Ok(krate) => krate,
        Err(error) => {
            writeln!(out, "{}", error.format())?;
            return Ok(RunOutcome::SyntaxError(error));
        }
    };

    if opts.dump_ast {
        writeln!(out, "{}", ast::dump(&krate))?;
    }

    let analyzer = semantics::analyzer::analyze(&krate);
    for diagnostic in analyzer.diags.iter() {
        if diagnostic.severity == semantics::diagnostics::Severity::Info && !opts.verbose {
            continue;
        }
        writeln!(out, "{}", diagnostic)?;
    }

    let errors = analyzer.diags.error_count();
    if errors != 0 {
        writeln!(
            out,
            "Semantics analyzer found {} errors, can't continue.",
            errors
        )?;
        return Ok(RunOutcome::SemanticFailure { errors });
    }

    let context = Context::create();
    let module = codegen::generator::generate(&context, &krate, file_name);
    Ok(RunOutcome::Success {
        ir: module.print_to_string().to_string(),
    })
}
