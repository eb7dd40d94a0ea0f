//! In-process compiler and oracle for driver tests
//!
//! The oracle understands one tiny language: a `loop` that moves `n` into an
//! accumulator until `n` reaches zero, then becomes `done`.
//!
//! ```text
//! <generatedTop>(<T>(<k>(loop), <env>(N, S)), <generatedCounter>(C))
//!   N >Int 0   =>  <k>(loop), <env>(N -Int 1, S +Int N)
//!   N <=Int 0  =>  <k>(done), <env>(N, S)
//! ```
//!
//! Path conditions are decided by brute force over a small integer range,
//! which is enough for the linear and quadratic facts the tests need.

#![allow(dead_code)]

use async_trait::async_trait;
use induct::{CompileRequest, InductResult, SemanticsCompiler};
use induct_oracle::{
    OracleError, OracleLauncher, OracleResult, SemanticsHandle, StepLabel, StepResult, Successor,
    SymbolicOracle,
};
use induct_term::{Definition, Rule, SymbolicState, Term};
use std::collections::{BTreeSet, HashMap};
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TOP: &str = "<generatedTop>";
const RANGE: RangeInclusive<i64> = -3..=12;
const CONSTRUCTORS: [&str; 2] = ["loop", "done"];
const ARITH: [&str; 11] = [
    "_+Int_",
    "_-Int_",
    "_*Int_",
    "_/Int_",
    "_>Int_",
    "_<Int_",
    "_>=Int_",
    "_<=Int_",
    "_==Int_",
    "_andBool_",
    "notBool_",
];

pub fn op(symbol: &str, a: Term, b: Term) -> Term {
    Term::apply(symbol, [a, b])
}

/// `<generatedTop>(<T>(<k>(k), <env>(n, s)), <generatedCounter>(c))`
pub fn config(k: Term, n: Term, s: Term, c: Term) -> Term {
    Term::apply(
        TOP,
        [
            Term::apply(
                "<T>",
                [Term::apply("<k>", [k]), Term::apply("<env>", [n, s])],
            ),
            Term::apply("<generatedCounter>", [c]),
        ],
    )
}

/// Records every request and hands the source back as the definition location
#[derive(Clone, Default)]
pub struct RecordingCompiler {
    pub requests: Arc<Mutex<Vec<CompileRequest>>>,
}

impl RecordingCompiler {
    pub fn requests(&self) -> Vec<CompileRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SemanticsCompiler for RecordingCompiler {
    async fn compile(&self, request: &CompileRequest) -> InductResult<SemanticsHandle> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(SemanticsHandle {
            definition_dir: request.source.clone(),
            main_module: request.main_module.clone(),
            syntax_module: request.syntax_module.clone(),
        })
    }
}

/// Starts [`LoopSemantics`] sessions over the generated definition
#[derive(Clone)]
pub struct LoopLauncher {
    use_induction_rule: bool,
    /// Fail every step after this many have succeeded
    fail_after: Option<usize>,
    pub starts: Arc<AtomicUsize>,
    pub shutdowns: Arc<AtomicUsize>,
}

impl LoopLauncher {
    pub fn new() -> Self {
        Self {
            use_induction_rule: true,
            fail_after: None,
            starts: Arc::default(),
            shutdowns: Arc::default(),
        }
    }

    /// Ignore the generated rule: the loop then unrolls forever
    pub fn without_induction_rule() -> Self {
        Self {
            use_induction_rule: false,
            ..Self::new()
        }
    }

    /// A server that drops the connection after `steps` successful steps
    pub fn failing_after(steps: usize) -> Self {
        Self {
            fail_after: Some(steps),
            ..Self::new()
        }
    }
}

#[async_trait]
impl OracleLauncher for LoopLauncher {
    type Session = LoopSemantics;

    async fn start(&self, semantics: &SemanticsHandle) -> OracleResult<LoopSemantics> {
        let text = std::fs::read_to_string(&semantics.definition_dir)?;
        let definition: Definition = serde_json::from_str(&text)?;
        let rule = if self.use_induction_rule {
            let module = definition
                .module(&definition.main_module)
                .ok_or_else(|| OracleError::protocol("main module missing from bundle"))?;
            module.rules().next().cloned()
        } else {
            None
        };
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(LoopSemantics {
            rule,
            fresh: 0,
            steps_left: self.fail_after,
            shutdowns: Arc::clone(&self.shutdowns),
        })
    }
}

pub struct LoopSemantics {
    rule: Option<Rule>,
    fresh: usize,
    steps_left: Option<usize>,
    shutdowns: Arc<AtomicUsize>,
}

impl LoopSemantics {
    /// Rewrite with the induction hypothesis when its guard is entailed
    fn apply_rule(&mut self, state: &SymbolicState) -> Option<SymbolicState> {
        let rule = self.rule.as_ref()?;
        let cell = state.config.args().first()?;
        let lhs = rule.body.extract_lhs();
        let rhs = rule.body.extract_rhs();

        let mut bindings = HashMap::new();
        let mut equalities = Vec::new();
        if !match_term(&lhs, cell, &BTreeSet::new(), &mut bindings, &mut equalities)
            || !equalities.is_empty()
        {
            return None;
        }
        let guard = instantiate(&rule.requires, &bindings);
        if !entails(&state.constraints, &[guard]).valid {
            return None;
        }

        let bound = lhs.free_variables();
        let mut existential = rhs.free_variables();
        existential.extend(rule.ensures.free_variables());
        for name in existential.difference(&bound) {
            self.fresh += 1;
            bindings.insert(name.clone(), Term::var(format!("{name}{}", self.fresh)));
        }

        let mut args = state.config.args().to_vec();
        args[0] = instantiate(&rhs, &bindings);
        let mut next = SymbolicState {
            config: Term::apply(TOP, args),
            constraints: state.constraints.clone(),
        };
        next.add_constraint(instantiate(&rule.ensures, &bindings));
        Some(next)
    }
}

#[async_trait]
impl SymbolicOracle for LoopSemantics {
    async fn assume_defined(&mut self, state: &SymbolicState) -> OracleResult<SymbolicState> {
        Ok(state.clone())
    }

    async fn step(&mut self, state: &SymbolicState, _max_depth: u32) -> OracleResult<StepResult> {
        if let Some(left) = self.steps_left.as_mut() {
            if *left == 0 {
                return Err(OracleError::protocol("connection closed mid-response"));
            }
            *left -= 1;
        }
        let (k, n, s, c) = cells(&state.config)
            .ok_or_else(|| OracleError::protocol(format!("unexpected configuration {}", state.config)))?;
        if !entails(&state.constraints, &[]).satisfiable {
            return Ok(StepResult::Vacuous);
        }
        match k.symbol_name() {
            Some("done") => Ok(StepResult::Stuck),
            Some("loop") => {
                if let Some(next) = self.apply_rule(state) {
                    let label = self.rule.as_ref().map(|r| r.label.clone()).unwrap_or_default();
                    return Ok(StepResult::Successors(vec![Successor {
                        state: next,
                        label: StepLabel::new(label),
                        depth: 1,
                    }]));
                }

                let branches = [
                    (
                        "IMP.while-true",
                        op("_>Int_", n.clone(), Term::int(0)),
                        config(
                            Term::symbol("loop"),
                            op("_-Int_", n.clone(), Term::int(1)),
                            op("_+Int_", s.clone(), n.clone()),
                            c.clone(),
                        ),
                    ),
                    (
                        "IMP.while-false",
                        op("_<=Int_", n.clone(), Term::int(0)),
                        config(Term::symbol("done"), n.clone(), s.clone(), c.clone()),
                    ),
                ];
                let mut successors = Vec::new();
                for (label, condition, next) in branches {
                    let mut constraints = state.constraints.clone();
                    constraints.push(condition.clone());
                    if entails(&constraints, &[]).satisfiable {
                        let mut next = SymbolicState {
                            config: next,
                            constraints: state.constraints.clone(),
                        };
                        next.add_constraint(condition);
                        successors.push(Successor {
                            state: next,
                            label: StepLabel::new(label),
                            depth: 1,
                        });
                    }
                }
                if successors.is_empty() {
                    Ok(StepResult::Vacuous)
                } else {
                    Ok(StepResult::Successors(successors))
                }
            }
            _ => Err(OracleError::protocol(format!("unknown statement {k}"))),
        }
    }

    async fn implies(
        &mut self,
        antecedent: &SymbolicState,
        consequent: &SymbolicState,
    ) -> OracleResult<bool> {
        let mut shared = antecedent.config.free_variables();
        for c in &antecedent.constraints {
            shared.extend(c.free_variables());
        }
        let mut bindings = HashMap::new();
        let mut goals = Vec::new();
        if !match_term(
            &consequent.config,
            &antecedent.config,
            &shared,
            &mut bindings,
            &mut goals,
        ) {
            return Ok(false);
        }
        goals.extend(consequent.constraints.iter().map(|c| instantiate(c, &bindings)));
        Ok(entails(&antecedent.constraints, &goals).valid)
    }

    async fn shutdown(&mut self) -> OracleResult<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn cells(config: &Term) -> Option<(&Term, &Term, &Term, &Term)> {
    if config.symbol_name() != Some(TOP) {
        return None;
    }
    let [t, counter] = config.args() else {
        return None;
    };
    let [k_cell, env] = t.args() else {
        return None;
    };
    let [k] = k_cell.args() else {
        return None;
    };
    let [n, s] = env.args() else {
        return None;
    };
    let [c] = counter.args() else {
        return None;
    };
    Some((k, n, s, c))
}

fn is_arith(term: &Term) -> bool {
    match term {
        Term::Variable { .. } => true,
        Term::Constant { sort, .. } => sort.name() == "Int",
        Term::Application { symbol, args } => {
            ARITH.contains(&symbol.as_str())
                || (args.is_empty() && !CONSTRUCTORS.contains(&symbol.as_str()))
        }
    }
}

/// Match `pattern` against `term`, binding pattern variables not in `shared`.
/// Arithmetic mismatches become equalities in `equalities`.
fn match_term(
    pattern: &Term,
    term: &Term,
    shared: &BTreeSet<String>,
    bindings: &mut HashMap<String, Term>,
    equalities: &mut Vec<Term>,
) -> bool {
    if let Term::Variable { name, .. } = pattern {
        if shared.contains(name) {
            if term.variable_name() != Some(name.as_str()) {
                equalities.push(op("_==Int_", pattern.clone(), term.clone()));
            }
        } else if let Some(bound) = bindings.get(name) {
            if bound != term {
                equalities.push(op("_==Int_", bound.clone(), term.clone()));
            }
        } else {
            bindings.insert(name.clone(), term.clone());
        }
        return true;
    }
    if pattern == term {
        return true;
    }
    if let (
        Term::Application { symbol, args },
        Term::Application {
            symbol: other,
            args: other_args,
        },
    ) = (pattern, term)
    {
        if symbol == other && args.len() == other_args.len() {
            return args
                .iter()
                .zip(other_args)
                .all(|(p, t)| match_term(p, t, shared, bindings, equalities));
        }
    }
    if is_arith(pattern) && is_arith(term) {
        equalities.push(op("_==Int_", pattern.clone(), term.clone()));
        return true;
    }
    false
}

/// Simultaneous substitution of variables by name
fn instantiate(term: &Term, bindings: &HashMap<String, Term>) -> Term {
    term.bottom_up(&mut |node| match node.variable_name().and_then(|n| bindings.get(n)) {
        Some(value) => value.clone(),
        None => node,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value {
    Int(i64),
    Bool(bool),
}

fn eval(term: &Term, valuation: &HashMap<Term, i64>) -> Option<Value> {
    if let Some(v) = valuation.get(term) {
        return Some(Value::Int(*v));
    }
    match term {
        Term::Variable { .. } => None,
        Term::Constant { token, sort } => match sort.name() {
            "Int" => token.parse().ok().map(Value::Int),
            "Bool" => token.parse().ok().map(Value::Bool),
            _ => None,
        },
        Term::Application { symbol, args } => {
            let values = args
                .iter()
                .map(|a| eval(a, valuation))
                .collect::<Option<Vec<_>>>()?;
            use Value::{Bool, Int};
            match (symbol.as_str(), values.as_slice()) {
                ("_+Int_", [Int(a), Int(b)]) => a.checked_add(*b).map(Int),
                ("_-Int_", [Int(a), Int(b)]) => a.checked_sub(*b).map(Int),
                ("_*Int_", [Int(a), Int(b)]) => a.checked_mul(*b).map(Int),
                ("_/Int_", [Int(a), Int(b)]) => a.checked_div(*b).map(Int),
                ("_>Int_", [Int(a), Int(b)]) => Some(Bool(a > b)),
                ("_<Int_", [Int(a), Int(b)]) => Some(Bool(a < b)),
                ("_>=Int_", [Int(a), Int(b)]) => Some(Bool(a >= b)),
                ("_<=Int_", [Int(a), Int(b)]) => Some(Bool(a <= b)),
                ("_==Int_", [Int(a), Int(b)]) => Some(Bool(a == b)),
                ("_andBool_", [Bool(a), Bool(b)]) => Some(Bool(*a && *b)),
                ("notBool_", [Bool(a)]) => Some(Bool(!a)),
                _ => None,
            }
        }
    }
}

fn holds(term: &Term, valuation: &HashMap<Term, i64>) -> bool {
    eval(term, valuation) == Some(Value::Bool(true))
}

#[derive(Debug, Clone, Copy)]
struct Entailment {
    satisfiable: bool,
    valid: bool,
}

/// Decide `hypotheses => goals` over every valuation in [`RANGE`].
///
/// A hypothesis `?X ==Int e` defines the existential `?X` instead of
/// constraining it.
fn entails(hypotheses: &[Term], goals: &[Term]) -> Entailment {
    let mut definitions = Vec::new();
    let mut plain = Vec::new();
    for h in hypotheses {
        match h.symbol_name().zip(h.args().first()) {
            Some(("_==Int_", lhs))
                if lhs.variable_name().is_some_and(|n| n.starts_with('?'))
                    && !h.args()[1].occurs(lhs.variable_name().unwrap_or_default()) =>
            {
                definitions.push((lhs.clone(), h.args()[1].clone()));
            }
            _ => plain.push(h.clone()),
        }
    }

    let is_unknown = |t: &Term| {
        t.is_variable()
            || matches!(t, Term::Application { symbol, args } if args.is_empty() && !CONSTRUCTORS.contains(&symbol.as_str()))
    };
    let mut unknowns: Vec<Term> = Vec::new();
    let sources = plain
        .iter()
        .chain(definitions.iter().map(|(_, e)| e))
        .chain(goals);
    for term in sources {
        for u in term.find_all(&is_unknown) {
            if !unknowns.contains(u) && !definitions.iter().any(|(d, _)| d == u) {
                unknowns.push(u.clone());
            }
        }
    }

    let mut result = Entailment {
        satisfiable: false,
        valid: true,
    };
    let width = (RANGE.end() - RANGE.start() + 1) as usize;
    let total = width.pow(unknowns.len() as u32);
    'valuations: for index in 0..total {
        let mut valuation = HashMap::new();
        let mut rest = index;
        for u in &unknowns {
            valuation.insert(u.clone(), RANGE.start() + (rest % width) as i64);
            rest /= width;
        }
        for (name, expr) in &definitions {
            match eval(expr, &valuation) {
                Some(Value::Int(v)) => {
                    valuation.insert(name.clone(), v);
                }
                _ => continue 'valuations,
            }
        }
        if !plain.iter().all(|h| holds(h, &valuation)) {
            continue;
        }
        result.satisfiable = true;
        if !goals.iter().all(|g| holds(g, &valuation)) {
            result.valid = false;
            break;
        }
    }
    result
}
