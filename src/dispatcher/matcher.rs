//! Job and path matching.
//!
//! # Responsibilities
//! - Match a job by exact name (case-sensitive)
//! - Match the declaring file path against compiled patterns
//!
//! # Design Decisions
//! - Patterns match anywhere in the path unless they anchor themselves
//! - An empty matcher never matches
//! - Patterns compile once at load time, never on the resolve path
//! - A repetition applied directly to another repetition (`a**`, `[0-9]++`)
//!   is rejected, so configs stay portable to stricter regex dialects

use std::collections::BTreeSet;

use regex::Regex;
use regex_syntax::ast::{parse::Parser, Ast};
use thiserror::Error;

use crate::dispatcher::types::JobBase;

/// Trait for matching a job (and the file it was declared in) against a rule.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the job matches this rule.
    fn matches(&self, job: &JobBase, path: &str) -> bool;
}

/// Matches jobs pinned by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobNameMatcher {
    names: BTreeSet<String>,
}

impl JobNameMatcher {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }
}

impl Matcher for JobNameMatcher {
    fn matches(&self, job: &JobBase, _path: &str) -> bool {
        self.contains(&job.name)
    }
}

/// Why a single pattern was rejected.
#[derive(Debug, Error)]
pub enum PatternFault {
    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error("invalid nested repetition operator: `{0}`")]
    NestedRepetition(String),
}

/// A pattern that failed to compile, by position in its list.
#[derive(Debug)]
pub struct PatternError {
    pub index: usize,
    pub pattern: String,
    pub source: PatternFault,
}

/// Compile one pattern, refusing stacked repetition operators.
fn compile_pattern(pattern: &str) -> Result<Regex, PatternFault> {
    let re = Regex::new(pattern)?;
    // Regex::new accepted it, so the AST parse succeeds too.
    if let Ok(ast) = Parser::new().parse(pattern) {
        if let Some(op) = nested_repetition(&ast, pattern) {
            return Err(PatternFault::NestedRepetition(op));
        }
    }
    Ok(re)
}

/// Operator text of the first repetition whose operand is itself a repetition.
fn nested_repetition(ast: &Ast, pattern: &str) -> Option<String> {
    match ast {
        Ast::Repetition(rep) => {
            if let Ast::Repetition(inner) = &*rep.ast {
                let (start, end) = (inner.op.span.start.offset, rep.op.span.end.offset);
                return Some(pattern.get(start..end).unwrap_or_default().to_string());
            }
            nested_repetition(&rep.ast, pattern)
        }
        Ast::Group(group) => nested_repetition(&group.ast, pattern),
        Ast::Alternation(alt) => alt.asts.iter().find_map(|a| nested_repetition(a, pattern)),
        Ast::Concat(concat) => concat.asts.iter().find_map(|a| nested_repetition(a, pattern)),
        _ => None,
    }
}

/// Matches the declaring file path against an ordered list of patterns.
///
/// `patterns[i]` is always the source of `compiled[i]`.
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    patterns: Vec<String>,
    compiled: Vec<Regex>,
}

impl PathMatcher {
    /// Compile every pattern, reporting all failures rather than the first.
    pub fn compile(patterns: Vec<String>) -> Result<Self, Vec<PatternError>> {
        let mut compiled = Vec::with_capacity(patterns.len());
        let mut errors = Vec::new();

        for (index, pattern) in patterns.iter().enumerate() {
            match compile_pattern(pattern) {
                Ok(re) => compiled.push(re),
                Err(source) => errors.push(PatternError {
                    index,
                    pattern: pattern.clone(),
                    source,
                }),
            }
        }

        if errors.is_empty() {
            Ok(Self { patterns, compiled })
        } else {
            Err(errors)
        }
    }

    /// True on the first pattern found anywhere in `path`.
    pub fn is_match(&self, path: &str) -> bool {
        self.compiled.iter().any(|re| re.is_match(path))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

// Regex has no equality; the sources determine the compiled form.
impl PartialEq for PathMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.patterns == other.patterns
    }
}

impl Eq for PathMatcher {}

impl Matcher for PathMatcher {
    fn matches(&self, _job: &JobBase, path: &str) -> bool {
        self.is_match(path)
    }
}
