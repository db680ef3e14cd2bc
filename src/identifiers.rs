//! Identifier types for Markov decision process states and actions.
//!
//! These types provide type-safe wrappers around the string labels used to
//! name states and actions, so a state label can never be passed where an
//! action label is expected.

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert the identifier into its inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }

        impl PartialEq<$name> for &str {
            fn eq(&self, other: &$name) -> bool {
                *self == other.as_str()
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }
    };
}

string_identifier!(
    /// Label of a state in a Markov decision process.
    ///
    /// ```
    /// use kindness::identifiers::StateId;
    ///
    /// let state = StateId::new("curious");
    /// assert_eq!(state.as_str(), "curious");
    /// ```
    StateId
);

string_identifier!(
    /// Label of an action available in some MDP state.
    ActionId
);

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn identifiers_compare_with_str() {
        let state = StateId::from("leader");
        assert_eq!(state, "leader");
        assert_eq!("leader", state);
        assert_ne!(state, "inactive");
    }

    #[test]
    fn borrowed_lookup_by_str() {
        let mut values = BTreeMap::new();
        values.insert(StateId::new("curious"), 1.5);
        assert_eq!(values.get("curious"), Some(&1.5));
    }

    #[test]
    fn serializes_as_plain_string() {
        let action = ActionId::new("mentor");
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, "\"mentor\"");
        let back: ActionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);
    }
}
