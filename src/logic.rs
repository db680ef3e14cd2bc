//! Rule-based inference over Horn clauses
//!
//! [`forward`] derives everything the rules allow from the known facts;
//! [`backward`] works from a single goal back to the facts and records how it
//! got there.

pub mod atom;
pub mod backward;
pub mod forward;
pub mod rules;

pub use atom::{Atom, Bindings, Term, match_atom, unify};
pub use backward::{BackwardConfig, ProofResult, ProofStep, StepKind, backward_chain};
pub use forward::{ForwardConfig, ForwardResult, Inference, forward_chain};
pub use rules::{KnowledgeBase, Rule, RuleBase};
