//! Forward chaining to a fixed point

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{
    atom::{Atom, Bindings, match_atom},
    rules::{KnowledgeBase, Rule},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardConfig {
    /// Maximum number of passes over the rule list.
    pub max_iterations: usize,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self { max_iterations: 10 }
    }
}

impl ForwardConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// A rule firing that produced a new fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inference {
    /// 1-based pass number.
    pub pass: usize,
    pub rule: String,
    pub premises: Vec<Atom>,
    pub conclusion: Atom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardResult {
    pub facts: BTreeSet<Atom>,
    pub inferences: Vec<Inference>,
    /// Passes performed, including the final one that added nothing.
    pub iterations: usize,
    pub reached_fixed_point: bool,
}

impl ForwardResult {
    /// Facts that were derived rather than given.
    pub fn derived(&self) -> impl Iterator<Item = &Atom> {
        self.inferences.iter().map(|i| &i.conclusion)
    }
}

/// Every binding under which all of `rule`'s premises are in `facts`.
pub fn satisfying_bindings(rule: &Rule, facts: &BTreeSet<Atom>) -> Vec<Bindings> {
    let mut partial = vec![Bindings::new()];
    for premise in &rule.premises {
        partial = partial
            .iter()
            .flat_map(|bindings| {
                let pattern = premise.substitute(bindings);
                facts
                    .iter()
                    .filter_map(move |fact| match_atom(&pattern, fact, bindings))
                    .collect::<Vec<_>>()
            })
            .collect();
        if partial.is_empty() {
            break;
        }
    }
    partial
}

/// Repeatedly pass over the rules, adding each new conclusion as soon as it
/// fires, until a pass adds nothing or the pass cap is reached.
///
/// ```
/// use kindness::logic::{Atom, RuleBase, forward::{forward_chain, ForwardConfig}};
///
/// let kb = RuleBase::JingSi.knowledge_base().unwrap();
/// let result = forward_chain(&kb, ForwardConfig::default());
/// assert!(result.reached_fixed_point);
/// assert!(result.facts.contains(&Atom::proposition("can_take_effective_action")));
/// ```
pub fn forward_chain(kb: &KnowledgeBase, config: ForwardConfig) -> ForwardResult {
    let mut facts = kb.facts().clone();
    let mut inferences = Vec::new();
    let mut iterations = 0;
    let mut reached_fixed_point = false;

    while iterations < config.max_iterations {
        iterations += 1;
        let mut added = false;
        for rule in kb.rules() {
            for bindings in satisfying_bindings(rule, &facts) {
                let conclusion = rule.conclusion.substitute(&bindings);
                if facts.contains(&conclusion) {
                    continue;
                }
                debug!(pass = iterations, rule = %rule.name(), %conclusion, "inferred");
                inferences.push(Inference {
                    pass: iterations,
                    rule: rule.name(),
                    premises: rule.premises.iter().map(|p| p.substitute(&bindings)).collect(),
                    conclusion: conclusion.clone(),
                });
                facts.insert(conclusion);
                added = true;
            }
        }
        if !added {
            reached_fixed_point = true;
            break;
        }
    }

    if reached_fixed_point {
        info!(
            iterations,
            derived = inferences.len(),
            "forward chaining reached a fixed point"
        );
    } else {
        warn!(
            max_iterations = config.max_iterations,
            "forward chaining stopped at the pass cap before a fixed point"
        );
    }

    ForwardResult {
        facts,
        inferences,
        iterations,
        reached_fixed_point,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::rules::RuleBase;

    fn atom(s: &str) -> Atom {
        s.parse().unwrap()
    }

    #[test]
    fn jing_si_chains_within_one_pass() {
        let kb = RuleBase::JingSi.knowledge_base().unwrap();
        let result = forward_chain(&kb, ForwardConfig::default());
        let derived: Vec<String> = result.derived().map(Atom::to_string).collect();
        assert_eq!(
            derived,
            vec!["need_calm_mind", "focus_present_moment", "can_take_effective_action"]
        );
        assert_eq!(result.iterations, 2);
        assert!(result.reached_fixed_point);
        assert_eq!(result.inferences[2].rule, "effective_action");
    }

    #[test]
    fn first_order_rules_bind_variables() {
        let kb = RuleBase::VolunteerEligibility.knowledge_base().unwrap();
        let result = forward_chain(&kb, ForwardConfig::default());
        for fact in ["Compassionate(Maria)", "CanVolunteer(Maria)", "CanServe(Maria)", "HelpsFamily(Maria)"] {
            assert!(result.facts.contains(&atom(fact)), "missing {fact}");
        }
        let first = &result.inferences[0];
        assert_eq!(first.rule, "hardship");
        assert_eq!(first.premises, vec![atom("Person(Maria)"), atom("ExperiencedHardship(Maria)")]);
    }

    #[test]
    fn result_is_a_fixed_point() {
        let kb = RuleBase::VolunteerEligibility.knowledge_base().unwrap();
        let first = forward_chain(&kb, ForwardConfig::default());
        let again = KnowledgeBase::new(kb.rules().to_vec())
            .with_facts(first.facts.iter().cloned())
            .unwrap();
        let second = forward_chain(&again, ForwardConfig::default());
        assert!(second.inferences.is_empty());
        assert_eq!(second.iterations, 1);
    }

    #[test]
    fn pass_cap_is_reported() {
        let rules: Vec<Rule> = ["a -> b", "b -> c", "c -> d"]
            .iter()
            .map(|r| r.parse().unwrap())
            .rev()
            .collect();
        let kb = KnowledgeBase::new(rules).with_facts([atom("a")]).unwrap();
        let capped = forward_chain(&kb, ForwardConfig::default().with_max_iterations(2));
        assert!(!capped.reached_fixed_point);
        assert_eq!(capped.inferences.len(), 2);
        let full = forward_chain(&kb, ForwardConfig::default());
        assert!(full.reached_fixed_point);
        assert_eq!(full.iterations, 4);
    }

    #[test]
    fn joins_shared_variables_across_premises() {
        let rules = vec!["Parent(?x, ?y), Parent(?y, ?z) -> Grandparent(?x, ?z)".parse().unwrap()];
        let kb = KnowledgeBase::new(rules)
            .with_facts([atom("Parent(Ana, Ben)"), atom("Parent(Ben, Cai)"), atom("Parent(Dee, Eve)")])
            .unwrap();
        let result = forward_chain(&kb, ForwardConfig::default());
        let derived: Vec<String> = result.derived().map(Atom::to_string).collect();
        assert_eq!(derived, vec!["Grandparent(Ana, Cai)"]);
    }
}
