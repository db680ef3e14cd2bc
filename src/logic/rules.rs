//! Horn rules, knowledge bases and the built-in rule bases

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::atom::{Atom, Term, split_top_level};
use crate::error::{Error, Result};

/// `premises -> conclusion`. Every conclusion variable must occur in some premise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rule {
    pub label: Option<String>,
    pub premises: Vec<Atom>,
    pub conclusion: Atom,
}

impl Rule {
    /// # Errors
    ///
    /// [`Error::MalformedRule`] without premises, [`Error::UnsafeRule`] when a
    /// conclusion variable is unbound by the premises.
    pub fn new(premises: Vec<Atom>, conclusion: Atom) -> Result<Self> {
        let rule = Self {
            label: None,
            premises,
            conclusion,
        };
        if rule.premises.is_empty() {
            return Err(Error::MalformedRule {
                rule: rule.to_string(),
                reason: "a rule needs at least one premise".to_string(),
            });
        }
        for variable in rule.conclusion.variables() {
            if !rule
                .premises
                .iter()
                .any(|p| p.variables().contains(&variable))
            {
                return Err(Error::UnsafeRule {
                    rule: rule.to_string(),
                    variable: variable.to_string(),
                });
            }
        }
        Ok(rule)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label if present, otherwise the rule text.
    pub fn name(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.to_string())
    }
}

impl FromStr for Rule {
    type Err = Error;

    /// `"[label:] A(?x), B(?x) -> C(?x)"`; `=>` also separates the sides.
    fn from_str(s: &str) -> Result<Self> {
        let malformed = |reason: &str| Error::MalformedRule {
            rule: s.to_string(),
            reason: reason.to_string(),
        };
        let (body, head) = s
            .split_once("->")
            .or_else(|| s.split_once("=>"))
            .ok_or_else(|| malformed("expected '->' between premises and conclusion"))?;

        let (label, body) = match body.split_once(':') {
            Some((label, rest)) if !label.contains('(') => (Some(label.trim()), rest),
            _ => (None, body),
        };

        let premises = split_top_level(body)
            .into_iter()
            .map(str::parse)
            .collect::<Result<Vec<Atom>>>()?;
        let rule = Rule::new(premises, head.parse()?)?;
        Ok(match label {
            Some(label) if !label.is_empty() => rule.with_label(label),
            _ => rule,
        })
    }
}

impl TryFrom<String> for Rule {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Rule> for String {
    fn from(rule: Rule) -> Self {
        let premises: Vec<String> = rule.premises.iter().map(Atom::to_string).collect();
        let body = format!("{} -> {}", premises.join(", "), rule.conclusion);
        match rule.label {
            Some(label) => format!("{label}: {body}"),
            None => body,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let premises: Vec<String> = self.premises.iter().map(Atom::to_string).collect();
        write!(f, "IF {} THEN {}", premises.join(" AND "), self.conclusion)
    }
}

/// Ground facts plus an ordered rule list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    facts: BTreeSet<Atom>,
    rules: Vec<Rule>,
}

impl KnowledgeBase {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            facts: BTreeSet::new(),
            rules,
        }
    }

    /// Add a ground fact; returns false if it was already known.
    pub fn tell(&mut self, fact: Atom) -> Result<bool> {
        if !fact.is_ground() {
            return Err(Error::MalformedAtom {
                atom: fact.to_string(),
                reason: "facts must not contain variables".to_string(),
            });
        }
        Ok(self.facts.insert(fact))
    }

    pub fn with_facts<I>(mut self, facts: I) -> Result<Self>
    where
        I: IntoIterator<Item = Atom>,
    {
        for fact in facts {
            self.tell(fact)?;
        }
        Ok(self)
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn facts(&self) -> &BTreeSet<Atom> {
        &self.facts
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn knows(&self, fact: &Atom) -> bool {
        self.facts.contains(fact)
    }
}

/// Built-in rule bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleBase {
    /// Seven propositional rules about coping while volunteering.
    #[default]
    JingSi,
    /// Four first-order rules deciding who can serve.
    VolunteerEligibility,
}

const JING_SI: [&str; 7] = [
    "calm_mind: feeling_overwhelmed, many_tasks -> need_calm_mind",
    "willing_to_do: feeling_tired, want_continue -> apply_willing_heart",
    "mind_shapes: feeling_uncertain, external_difficulty -> transform_perspective",
    "seize_time: feeling_anxious, time_pressure -> focus_present_moment",
    "gratitude: task_completed, positive_outcome -> practice_gratitude",
    "effective_action: need_calm_mind, focus_present_moment -> can_take_effective_action",
    "sustained_motivation: apply_willing_heart, practice_gratitude -> sustained_volunteer_motivation",
];

const VOLUNTEER_ELIGIBILITY: [&str; 4] = [
    "compassion: Person(?x), Compassionate(?x) -> CanVolunteer(?x)",
    "hardship: Person(?x), ExperiencedHardship(?x) -> Compassionate(?x)",
    "availability: CanVolunteer(?x), Available(?x) -> CanServe(?x)",
    "service: CanServe(?x) -> HelpsFamily(?x)",
];

impl RuleBase {
    pub const ALL: [RuleBase; 2] = [RuleBase::JingSi, RuleBase::VolunteerEligibility];

    pub fn rules(self) -> Result<Vec<Rule>> {
        let source: &[&str] = match self {
            RuleBase::JingSi => &JING_SI,
            RuleBase::VolunteerEligibility => &VOLUNTEER_ELIGIBILITY,
        };
        source.iter().map(|r| r.parse()).collect()
    }

    /// Facts used when a scenario supplies none.
    pub fn default_facts(self) -> Vec<Atom> {
        let names: &[&str] = match self {
            RuleBase::JingSi => &[
                "feeling_overwhelmed",
                "many_tasks",
                "time_pressure",
                "feeling_anxious",
            ],
            RuleBase::VolunteerEligibility => &[
                "Person(Maria)",
                "ExperiencedHardship(Maria)",
                "Available(Maria)",
            ],
        };
        names.iter().filter_map(|n| n.parse().ok()).collect()
    }

    /// Goal used for backward chaining when a scenario supplies none.
    pub fn default_goal(self) -> Atom {
        match self {
            RuleBase::JingSi => Atom::proposition("can_take_effective_action"),
            RuleBase::VolunteerEligibility => Atom::new(
                "CanServe",
                vec![Term::constant("Maria")],
            ),
        }
    }

    pub fn knowledge_base(self) -> Result<KnowledgeBase> {
        KnowledgeBase::new(self.rules()?).with_facts(self.default_facts())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleBase::JingSi => "jing_si",
            RuleBase::VolunteerEligibility => "volunteer_eligibility",
        }
    }
}

impl fmt::Display for RuleBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleBase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "jing_si" | "jingsi" => Ok(RuleBase::JingSi),
            "volunteer_eligibility" | "volunteer" | "eligibility" => {
                Ok(RuleBase::VolunteerEligibility)
            }
            _ => Err(Error::ParseRuleBase {
                input: s.to_string(),
                expected: RuleBase::ALL.map(|r| r.as_str()).join(", "),
            }),
        }
    }
}
