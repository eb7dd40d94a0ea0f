//! The induction transform
//!
//! Given a claim annotated with `decreases = (v, measure, floor)` the
//! transform produces:
//!
//! - a fresh opaque witness `symbol_v()` standing for the value of `v` at the
//!   point the hypothesis is used,
//! - the side constraint `measure(symbol_v, v) andBool notBool measure(floor, v)`,
//! - the induction hypothesis: the claim's first body component, guarded by the
//!   claim's `requires` and the side constraint, as a prioritised reachability rule,
//! - the inductive-step claim: the original claim with `v` replaced by the witness,
//! - three modules, `SYNTAX -> SEMANTICS -> SPEC`, wrapping the above.
//!
//! The transform is a pure function of the claim and the configuration.

use crate::annotation::find_decreases;
use crate::config::TransformConfig;
use crate::error::{TransformError, TransformResult};
use induct_term::{
    and_bool, not_bool, Claim, Decreases, Definition, Module, Rule, RuleKind, Sentence, Sort,
    SymbolDeclaration, Term,
};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument, warn};

/// Everything the transform produces for one claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InductionArtifacts {
    pub decreases: Decreases,
    /// The 0-ary witness application, e.g. `symboln()`
    pub witness: Term,
    pub witness_sort: Sort,
    pub side_constraint: Term,
    /// The induction hypothesis
    pub rule: Rule,
    /// The inductive-step goal
    pub claim: Claim,
    /// Syntax and semantics modules, to be compiled
    pub definition: Definition,
    /// Module wrapping the inductive-step claim
    pub claim_module: Module,
}

/// `measure(witness, variable) andBool notBool measure(floor, variable)`
pub fn side_constraint(decreases: &Decreases, witness: &Term, variable: &Term) -> Term {
    and_bool([
        Term::apply(&decreases.measure, [witness.clone(), variable.clone()]),
        not_bool(Term::apply(
            &decreases.measure,
            [decreases.floor_term(), variable.clone()],
        )),
    ])
}

/// The claim body's first component: the part describing one unfolding
pub fn step_projection(body: &Term) -> TransformResult<&Term> {
    let Term::Application { symbol, args } = body else {
        return Err(TransformError::shape(format!(
            "claim body {body} is not an application"
        )));
    };
    let Some(first) = args.first() else {
        return Err(TransformError::shape(format!(
            "claim body {symbol}() has no components"
        )));
    };
    if !first.contains_rewrite() {
        return Err(TransformError::shape(format!(
            "first component of {symbol}(..) contains no rewrite"
        )));
    }
    Ok(first)
}

/// Builds induction artifacts
#[derive(Debug, Clone, Default)]
pub struct InductionTransform {
    config: TransformConfig,
}

impl InductionTransform {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    #[instrument(skip_all, fields(claim = claim.label.as_deref().unwrap_or("<unlabelled>")))]
    pub fn apply(&self, claim: &Claim) -> TransformResult<InductionArtifacts> {
        let decreases = find_decreases(claim, &self.config.annotation_predicate)?;
        info!(
            variable = %decreases.variable,
            measure = %decreases.measure,
            floor = %decreases.floor,
            "Found decreases annotation"
        );

        let var_name = decreases.variable.as_str();
        let sort = self.resolve_sort(claim, var_name)?;

        let witness_name = self.config.witness_name(var_name);
        let witness = Term::symbol(&witness_name);
        if claim_mentions_symbol(claim, &witness_name) {
            return Err(TransformError::shape(format!(
                "witness symbol {witness_name} already occurs in the claim"
            )));
        }

        let variable = Term::sorted_var(var_name, sort.clone());
        let side = side_constraint(&decreases, &witness, &variable);
        debug!(side_constraint = %side, "Built side constraint");

        let rule = Rule {
            body: step_projection(&claim.body)?.clone(),
            requires: and_bool([claim.requires.clone(), side.clone()]),
            ensures: claim.ensures.clone(),
            priority: self.config.rule_priority,
            label: self.config.rule_label.clone(),
            kind: RuleKind::Reachability,
        };

        let step_claim = Claim {
            label: Some(self.config.claim_label.clone()),
            body: claim.body.substitute(var_name, &witness),
            requires: claim.requires.substitute(var_name, &witness),
            ensures: claim.ensures.substitute(var_name, &witness),
            decreases: None,
        };

        let (definition, claim_module) =
            self.package(&witness_name, &sort, rule.clone(), step_claim.clone())?;

        Ok(InductionArtifacts {
            decreases,
            witness,
            witness_sort: sort,
            side_constraint: side,
            rule,
            claim: step_claim,
            definition,
            claim_module,
        })
    }

    /// Explicit sorts on the variable's occurrences win; otherwise the configured default.
    fn resolve_sort(&self, claim: &Claim, var_name: &str) -> TransformResult<Sort> {
        let occurrences = claim.variable_sorts(var_name);
        if occurrences.is_empty() {
            return Err(TransformError::sort_unresolved(
                var_name,
                "variable does not occur in the claim",
            ));
        }

        let explicit: BTreeSet<Sort> = occurrences.into_iter().flatten().collect();
        let mut explicit = explicit.into_iter();
        match (explicit.next(), explicit.next()) {
            (Some(sort), None) => Ok(sort),
            (Some(a), Some(b)) => Err(TransformError::sort_unresolved(
                var_name,
                format!("occurrences disagree ({a} vs {b})"),
            )),
            (None, _) => match &self.config.default_sort {
                Some(sort) => {
                    warn!(
                        variable = var_name,
                        %sort,
                        "Induction variable has no sort annotation, assuming the default sort"
                    );
                    Ok(sort.clone())
                }
                None => Err(TransformError::sort_unresolved(
                    var_name,
                    "no sort annotation and no default sort configured",
                )),
            },
        }
    }

    fn package(
        &self,
        witness_name: &str,
        sort: &Sort,
        rule: Rule,
        claim: Claim,
    ) -> TransformResult<(Definition, Module)> {
        let syntax_name = self.config.syntax_module_name();
        let semantics_name = self.config.semantics_module_name();

        let syntax = Module::new(&syntax_name)
            .import(&self.config.base_syntax_module)
            .sentence(Sentence::Symbol(SymbolDeclaration::opaque_constant(
                witness_name,
                sort.clone(),
            )));
        let semantics = Module::new(&semantics_name)
            .import(&self.config.base_main_module)
            .import(&syntax_name)
            .sentence(Sentence::Rule(rule));
        let claim_module = Module::new(self.config.claim_module_name())
            .import(&semantics_name)
            .sentence(Sentence::Claim(claim));

        let definition = Definition {
            main_module: semantics_name,
            requires: vec![self.config.base_source.clone()],
            modules: vec![syntax, semantics],
        };

        let external = [
            self.config.base_main_module.as_str(),
            self.config.base_syntax_module.as_str(),
        ];
        let mut full = definition.clone();
        full.modules.push(claim_module.clone());
        full.validate_imports(&external)?;

        Ok((definition, claim_module))
    }
}

fn claim_mentions_symbol(claim: &Claim, name: &str) -> bool {
    let is_symbol = |t: &Term| t.symbol_name() == Some(name);
    claim.body.find_first(&is_symbol).is_some()
        || claim.requires.find_first(&is_symbol).is_some()
        || claim.ensures.find_first(&is_symbol).is_some()
}
