//! Exact inference in a small fixed-shape Bayesian network
//!
//! Three independent boolean roots feed one mediating variable, which in turn
//! drives a single outcome variable:
//!
//! ```text
//! Poor   Elderly   Sick
//!    \      |      /
//!          Aid
//!           |
//!       Volunteer
//! ```
//!
//! Queries are answered by enumerating all 32 joint assignments, with a direct
//! CPT lookup when every root is observed.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result},
    types::Probability,
};

const VARIABLES: usize = 5;
const MEDIATOR: usize = 3;
const OUTCOME: usize = 4;

/// A root variable and its prior `P(X = true)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootVariable {
    pub name: String,
    pub prior: Probability,
}

/// Network parameters.
///
/// `mediator_cpt` holds `P(mediator = true | roots)` for root assignments in
/// the order TTT, TTF, TFT, TFF, FTT, FTF, FFT, FFF. `outcome_cpt` holds
/// `P(outcome = true | mediator)` for mediator true then false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BayesNet {
    pub roots: [RootVariable; 3],
    pub mediator: String,
    pub mediator_cpt: [Probability; 8],
    pub outcome: String,
    pub outcome_cpt: [Probability; 2],
}

/// Posterior probabilities for one query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueryResult {
    /// `P(outcome = true | evidence)`.
    pub probability: f64,
    /// `P(mediator = true | evidence)`.
    pub mediator_probability: f64,
    /// `P(evidence)`; 1.0 for empty evidence.
    pub evidence_probability: f64,
}

impl BayesNet {
    /// The community-aid network: does a volunteer come back?
    pub fn community_aid() -> Self {
        let p = Probability::from_constant;
        let root = |name: &str, prior| RootVariable {
            name: name.to_string(),
            prior: p(prior),
        };
        Self {
            roots: [root("Poor", 0.30), root("Elderly", 0.25), root("Sick", 0.15)],
            mediator: "Aid".to_string(),
            mediator_cpt: [0.95, 0.85, 0.80, 0.70, 0.75, 0.60, 0.55, 0.30].map(p),
            outcome: "Volunteer".to_string(),
            outcome_cpt: [p(0.65), p(0.40)],
        }
    }

    /// Variable names in evaluation order: roots, mediator, outcome.
    pub fn variables(&self) -> Vec<&str> {
        self.roots
            .iter()
            .map(|r| r.name.as_str())
            .chain([self.mediator.as_str(), self.outcome.as_str()])
            .collect()
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.variables()
            .iter()
            .position(|v| v.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownVariable {
                name: name.to_string(),
                expected: self.variables().join(", "),
            })
    }

    fn mediator_row(&self, roots: [bool; 3]) -> f64 {
        let index = roots
            .iter()
            .fold(0, |acc, &value| (acc << 1) | usize::from(!value));
        self.mediator_cpt[index].value()
    }

    fn outcome_given(&self, mediator: bool) -> f64 {
        self.outcome_cpt[usize::from(!mediator)].value()
    }

    fn joint(&self, world: [bool; VARIABLES]) -> f64 {
        let factor = |p: f64, value: bool| if value { p } else { 1.0 - p };
        let roots: f64 = self
            .roots
            .iter()
            .zip(world)
            .map(|(root, value)| factor(root.prior.value(), value))
            .product();
        let mediator = factor(self.mediator_row([world[0], world[1], world[2]]), world[MEDIATOR]);
        let outcome = factor(self.outcome_given(world[MEDIATOR]), world[OUTCOME]);
        roots * mediator * outcome
    }

    fn observed(&self, evidence: &Evidence) -> Result<[Option<bool>; VARIABLES]> {
        let mut observed = [None; VARIABLES];
        for (name, value) in evidence.iter() {
            let index = self.index_of(name)?;
            // Names match case-insensitively, so two keys can hit one slot.
            if observed[index].is_some_and(|seen| seen != value) {
                return Err(Error::ConflictingEvidence {
                    variable: self.variables()[index].to_string(),
                });
            }
            observed[index] = Some(value);
        }
        Ok(observed)
    }

    /// Posterior of the outcome (and mediator) given evidence.
    ///
    /// # Errors
    ///
    /// Fails for evidence on unknown variables, or evidence with probability 0.
    pub fn query(&self, evidence: &Evidence) -> Result<QueryResult> {
        let observed = self.observed(evidence)?;

        if let [Some(a), Some(b), Some(c), None, None] = observed {
            let mediator_probability = self.mediator_row([a, b, c]);
            let probability = mediator_probability * self.outcome_given(true)
                + (1.0 - mediator_probability) * self.outcome_given(false);
            let evidence_probability: f64 = self
                .roots
                .iter()
                .zip([a, b, c])
                .map(|(root, v)| if v { root.prior.value() } else { root.prior.complement().value() })
                .product();
            if evidence_probability <= 0.0 {
                return Err(Error::ImpossibleEvidence);
            }
            debug!(mediator_probability, "all roots observed, read CPT row directly");
            return Ok(QueryResult {
                probability,
                mediator_probability,
                evidence_probability,
            });
        }

        let mut evidence_probability = 0.0;
        let mut mediator_true = 0.0;
        let mut outcome_true = 0.0;
        for bits in 0..(1u32 << VARIABLES) {
            let world: [bool; VARIABLES] = std::array::from_fn(|i| bits & (1 << i) != 0);
            let consistent = observed
                .iter()
                .zip(world)
                .all(|(seen, value)| seen.is_none_or(|s| s == value));
            if !consistent {
                continue;
            }
            let p = self.joint(world);
            evidence_probability += p;
            if world[MEDIATOR] {
                mediator_true += p;
            }
            if world[OUTCOME] {
                outcome_true += p;
            }
        }

        if evidence_probability <= 0.0 {
            return Err(Error::ImpossibleEvidence);
        }
        Ok(QueryResult {
            probability: outcome_true / evidence_probability,
            mediator_probability: mediator_true / evidence_probability,
            evidence_probability,
        })
    }

    /// `P(variable = true | evidence)` for any variable in the network.
    pub fn marginal(&self, variable: &str, evidence: &Evidence) -> Result<f64> {
        let target = self.index_of(variable)?;
        let observed = self.observed(evidence)?;
        let mut total = 0.0;
        let mut positive = 0.0;
        for bits in 0..(1u32 << VARIABLES) {
            let world: [bool; VARIABLES] = std::array::from_fn(|i| bits & (1 << i) != 0);
            if observed
                .iter()
                .zip(world)
                .all(|(seen, value)| seen.is_none_or(|s| s == value))
            {
                let p = self.joint(world);
                total += p;
                if world[target] {
                    positive += p;
                }
            }
        }
        if total <= 0.0 {
            return Err(Error::ImpossibleEvidence);
        }
        Ok(positive / total)
    }
}

impl Default for BayesNet {
    fn default() -> Self {
        Self::community_aid()
    }
}

/// Observed truth values keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Evidence(BTreeMap<String, bool>);

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: bool) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: bool) {
        self.0.insert(name.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Build evidence from loosely-typed JSON values (`true`, `"yes"`, `0`, ...).
    pub fn from_json(values: &BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let mut evidence = Evidence::new();
        for (name, value) in values {
            let invalid = || Error::InvalidEvidence {
                variable: name.clone(),
                value: value.to_string(),
            };
            let parsed = match value {
                serde_json::Value::Bool(b) => *b,
                serde_json::Value::String(s) => parse_bool(s).ok_or_else(invalid)?,
                serde_json::Value::Number(n) => match n.as_u64() {
                    Some(1) => true,
                    Some(0) => false,
                    _ => return Err(invalid()),
                },
                _ => return Err(invalid()),
            };
            evidence.insert(name.clone(), parsed);
        }
        Ok(evidence)
    }
}

/// Accepts true/false, yes/no, 1/0 and high/low in any case.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "high" | "t" | "y" => Some(true),
        "false" | "no" | "0" | "low" | "f" | "n" => Some(false),
        _ => None,
    }
}

impl FromStr for Evidence {
    type Err = Error;

    /// Parse `"Poor=true, Sick=no"`. An empty string is empty evidence.
    fn from_str(s: &str) -> Result<Self> {
        let mut evidence = Evidence::new();
        for item in s.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            let (name, value) = item.split_once('=').ok_or_else(|| Error::InvalidEvidence {
                variable: item.to_string(),
                value: String::new(),
            })?;
            let name = name.trim();
            let parsed = parse_bool(value).ok_or_else(|| Error::InvalidEvidence {
                variable: name.to_string(),
                value: value.trim().to_string(),
            })?;
            evidence.insert(name, parsed);
        }
        Ok(evidence)
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(none)");
        }
        let items: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{}", items.join(", "))
    }
}
