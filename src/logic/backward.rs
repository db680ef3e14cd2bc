//! Goal-directed backward chaining with a proof trace
//!
//! The prover enumerates every proof of a goal: known facts first, then each
//! rule whose conclusion unifies with the goal, proving the premises left to
//! right. Rule variables are renamed apart on every use.
//!
//! A goal that is a variant of one of its own ancestors does not recurse.
//! It is answered from the table of ground answers found so far for that
//! variant, and the whole search is repeated until the table stops growing,
//! so left-recursive rules still reach every answer forward chaining derives.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{
    atom::{Atom, Bindings, Term, resolve, unify},
    rules::{KnowledgeBase, Rule},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackwardConfig {
    /// Subgoal nesting depth at which the search gives up on a branch.
    pub max_depth: usize,
}

impl Default for BackwardConfig {
    fn default() -> Self {
        Self { max_depth: 32 }
    }
}

impl BackwardConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Goal,
    Fact,
    Rule(String),
    Proven,
    Failed,
    Cycle,
    Tabled,
    DepthLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProofStep {
    pub depth: usize,
    pub kind: StepKind,
    pub goal: Atom,
}

impl fmt::Display for ProofStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "  ".repeat(self.depth);
        let goal = &self.goal;
        match &self.kind {
            StepKind::Goal => write!(f, "{indent}goal {goal}"),
            StepKind::Fact => write!(f, "{indent}  {goal} is a known fact"),
            StepKind::Rule(name) => write!(f, "{indent}  trying rule {name}"),
            StepKind::Proven => write!(f, "{indent}proved {goal}"),
            StepKind::Failed => write!(f, "{indent}cannot prove {goal}"),
            StepKind::Cycle => write!(f, "{indent}  {goal} repeats an open goal"),
            StepKind::Tabled => write!(f, "{indent}  {goal} was proven earlier"),
            StepKind::DepthLimit => write!(f, "{indent}  depth limit reached at {goal}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProofResult {
    pub goal: Atom,
    pub proven: bool,
    /// Distinct bindings of the goal's variables, one per answer. A proven
    /// ground goal has a single empty answer.
    pub answers: Vec<Bindings>,
    pub trace: Vec<ProofStep>,
}

impl ProofResult {
    /// The goal instantiated by each answer.
    pub fn instances(&self) -> Vec<Atom> {
        self.answers
            .iter()
            .map(|answer| self.goal.substitute(answer))
            .collect()
    }
}

struct Prover<'a> {
    kb: &'a KnowledgeBase,
    config: BackwardConfig,
    trace: Vec<ProofStep>,
    renamings: usize,
    depth_limited: bool,
    /// Ground answers per canonical goal, kept across passes.
    table: BTreeMap<Atom, BTreeSet<Atom>>,
    cut: bool,
}

impl Prover<'_> {
    fn table_size(&self) -> usize {
        self.table.values().map(BTreeSet::len).sum()
    }

    fn record(&mut self, depth: usize, kind: StepKind, goal: Atom) {
        self.trace.push(ProofStep { depth, kind, goal });
    }

    fn rename(&mut self, rule: &Rule) -> Rule {
        self.renamings += 1;
        let suffix = self.renamings;
        let rename = |atom: &Atom| {
            let args = atom
                .args
                .iter()
                .map(|t| match t {
                    Term::Variable(v) => Term::Variable(format!("{v}#{suffix}")),
                    constant => constant.clone(),
                })
                .collect();
            Atom::new(atom.predicate.clone(), args)
        };
        Rule {
            label: rule.label.clone(),
            premises: rule.premises.iter().map(rename).collect(),
            conclusion: rename(&rule.conclusion),
        }
    }

    fn prove(
        &mut self,
        goal: &Atom,
        bindings: &Bindings,
        depth: usize,
        open: &mut Vec<Atom>,
    ) -> Vec<Bindings> {
        let kb = self.kb;
        let goal = goal.substitute(bindings);
        self.record(depth, StepKind::Goal, goal.clone());

        if depth > self.config.max_depth {
            self.depth_limited = true;
            self.record(depth, StepKind::DepthLimit, goal);
            return Vec::new();
        }
        let key = goal.canonical();
        if open.contains(&key) {
            self.cut = true;
            self.record(depth, StepKind::Cycle, goal.clone());
            let known: Vec<Atom> = self.table.get(&key).into_iter().flatten().cloned().collect();
            let mut solutions = Vec::new();
            for answer in known {
                if let Some(found) = unify(&goal, &answer, bindings) {
                    self.record(depth, StepKind::Tabled, answer);
                    solutions.push(found);
                }
            }
            return solutions;
        }

        let mut solutions = Vec::new();
        for fact in kb.facts() {
            if let Some(found) = unify(&goal, fact, bindings) {
                self.record(depth, StepKind::Fact, fact.clone());
                solutions.push(found);
            }
        }

        open.push(key.clone());
        for rule in kb.rules() {
            let renamed = self.rename(rule);
            let Some(unified) = unify(&renamed.conclusion, &goal, bindings) else {
                continue;
            };
            self.record(depth, StepKind::Rule(rule.name()), goal.clone());
            solutions.extend(self.prove_all(&renamed.premises, unified, depth + 1, open));
        }
        open.pop();

        let answers: Vec<Atom> = solutions
            .iter()
            .map(|found| goal.substitute(found))
            .filter(Atom::is_ground)
            .collect();
        self.table.entry(key).or_default().extend(answers);

        let kind = if solutions.is_empty() {
            StepKind::Failed
        } else {
            StepKind::Proven
        };
        self.record(depth, kind, goal);
        solutions
    }

    fn prove_all(
        &mut self,
        premises: &[Atom],
        bindings: Bindings,
        depth: usize,
        open: &mut Vec<Atom>,
    ) -> Vec<Bindings> {
        let mut partial = vec![bindings];
        for premise in premises {
            let mut next = Vec::new();
            for bindings in &partial {
                next.extend(self.prove(premise, bindings, depth, open));
            }
            if next.is_empty() {
                return next;
            }
            partial = next;
        }
        partial
    }
}

/// Try to prove `goal` from the knowledge base.
///
/// Variables in the goal are answered: `CanServe(?who)` yields one binding of
/// `who` per provable individual.
pub fn backward_chain(kb: &KnowledgeBase, goal: &Atom, config: BackwardConfig) -> ProofResult {
    let mut prover = Prover {
        kb,
        config,
        trace: Vec::new(),
        renamings: 0,
        depth_limited: false,
        table: BTreeMap::new(),
        cut: false,
    };
    // Rules are range restricted, so the table is bounded by the ground atoms
    // over the knowledge base's constants and the loop terminates.
    let mut passes = 0usize;
    let solutions = loop {
        passes += 1;
        prover.trace.clear();
        prover.cut = false;
        prover.depth_limited = false;
        let before = prover.table_size();
        let solutions = prover.prove(goal, &Bindings::new(), 0, &mut Vec::new());
        if !prover.cut || prover.table_size() == before {
            break solutions;
        }
    };

    let mut answers: Vec<Bindings> = Vec::new();
    for solution in &solutions {
        let answer: Bindings = goal
            .variables()
            .into_iter()
            .map(|v| (v.to_string(), resolve(&Term::var(v), solution)))
            .collect();
        if !answers.contains(&answer) {
            answers.push(answer);
        }
    }

    if prover.depth_limited {
        warn!(
            max_depth = config.max_depth,
            %goal,
            "backward chaining pruned branches at the depth limit"
        );
    }
    debug!(steps = prover.trace.len(), passes, "proof search finished");
    info!(%goal, proven = !answers.is_empty(), answers = answers.len(), "backward chaining");

    ProofResult {
        goal: goal.clone(),
        proven: !answers.is_empty(),
        answers,
        trace: prover.trace,
    }
}
