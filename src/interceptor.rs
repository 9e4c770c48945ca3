// Copyright 2026 Martin Pool

//! Mid-pipeline filters that veto candidate mutations before they're run.
//!
//! An [`Interceptor`] is consulted once per discovered [`Mutant`]. The chain
//! is ordered and the first veto wins: a mutation survives only if every
//! interceptor in the chain allows it.

use std::fmt::Debug;

use regex::RegexSet;
use tracing::trace;

use crate::mutant::Mutant;
use crate::options::Options;
use crate::pragma;

/// A filter consulted once a candidate mutation has been discovered.
///
/// Returning `false` vetoes the mutation; it's dropped from the plan as if
/// it had never been found.
pub trait Interceptor: Debug + Send + Sync {
    fn allows(&self, mutant: &Mutant) -> bool;
}

/// An ordered sequence of [`Interceptor`]s.
#[derive(Debug, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Box<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new(interceptors: Vec<Box<dyn Interceptor>>) -> InterceptorChain {
        InterceptorChain { interceptors }
    }

    /// The chain of built-in interceptors, configured from `options`.
    pub fn standard(options: &Options) -> InterceptorChain {
        let mut interceptors: Vec<Box<dyn Interceptor>> =
            vec![Box::new(PragmaInterceptor), Box::new(TypeAnnotationInterceptor)];
        if let Some(filter) = OperatorsFilterInterceptor::new(&options.operators_load) {
            interceptors.push(Box::new(filter));
        }
        InterceptorChain::new(interceptors)
    }

    pub fn allows(&self, mutant: &Mutant) -> bool {
        self.interceptors.iter().all(|i| {
            let ok = i.allows(mutant);
            if !ok {
                trace!(interceptor = ?i, mutant = %mutant.name(true), "mutation vetoed");
            }
            ok
        })
    }

    /// Remove every mutant from `mutants` that any interceptor in the chain vetoes.
    pub fn retain(&self, mutants: &mut Vec<Mutant>) {
        mutants.retain(|m| self.allows(m));
    }
}

/// Suppresses mutations on a source line carrying a `// pragma: no mutate` comment.
#[derive(Debug, Default)]
pub struct PragmaInterceptor;

impl Interceptor for PragmaInterceptor {
    fn allows(&self, mutant: &Mutant) -> bool {
        let Some(line) = mutant.source_file.line(mutant.span.start.line) else {
            return true;
        };
        !pragma::line_is_excluded(line, mutant.genre.name())
    }
}

/// Suppresses mutations whose replaced text is itself a bare type, rather than
/// an expression: mutating `Vec<u32>` in `let v: Vec<u32> = ...` to some other
/// type is never an interesting mutant.
#[derive(Debug, Default)]
pub struct TypeAnnotationInterceptor;

impl Interceptor for TypeAnnotationInterceptor {
    fn allows(&self, mutant: &Mutant) -> bool {
        let text = mutant.original_text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return true;
        }
        // A region that parses as a type but not as an expression is a type
        // annotation, not a value; replacing it isn't a meaningful mutant.
        syn::parse_str::<syn::Type>(trimmed).is_err()
            || syn::parse_str::<syn::Expr>(trimmed).is_ok()
    }
}

/// Restricts which mutation genres run at all, driven by `operators.load` config regexes.
#[derive(Debug)]
pub struct OperatorsFilterInterceptor {
    allow: RegexSet,
}

impl OperatorsFilterInterceptor {
    fn new(patterns: &[String]) -> Option<OperatorsFilterInterceptor> {
        if patterns.is_empty() {
            return None;
        }
        RegexSet::new(patterns)
            .map(|allow| OperatorsFilterInterceptor { allow })
            .ok()
    }
}

impl Interceptor for OperatorsFilterInterceptor {
    fn allows(&self, mutant: &Mutant) -> bool {
        self.allow.is_match(mutant.genre.name())
    }
}
