//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging a [`SkillName`]
//! with a [`NodeName`] even though both are text under the hood.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display, FromStr,
// and serde conversions that reject blank values on the way in.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from trimmed text, returning `None` if
            /// nothing but whitespace remains.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    None
                } else if trimmed.len() == v.len() {
                    Some(Self(v))
                } else {
                    Some(Self(trimmed.to_owned()))
                }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or_else(|| {
                    format!("{} must not be empty", stringify!($name))
                })
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::try_from(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single pipeline execution run (one analysis request).
///
/// Generated fresh for every request; propagated through spans so all activity
/// from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineRunId(Uuid);

impl PipelineRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`PipelineRunId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for PipelineRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: node names
// ---------------------------------------------------------------------------

/// Identifies a pipeline node by its stable display name
/// (e.g. `"Skill-Analysis Node"`).
///
/// Built-in nodes use [`NodeName::from_static`] so their names are available
/// as constants; names read back from serialised failures are owned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeName(Cow<'static, str>);

impl NodeName {
    /// Creates a node name from a string literal.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates a node name from owned text, returning `None` if it is blank.
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let n = name.into();
        if n.trim().is_empty() {
            None
        } else {
            Some(Self(Cow::Owned(n)))
        }
    }

    /// Returns the node name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (user input / configuration)
// ---------------------------------------------------------------------------

string_id! {
    /// The skill under analysis (e.g. `"Guitar Playing"`).
    ///
    /// Set once when the context is created and never changed afterwards.
    SkillName
}

string_id! {
    /// Identifies the completion model requested from the provider
    /// (e.g. `"gpt-4o-mini"`).
    ModelName
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_name_is_trimmed() {
        let name = SkillName::new("  Guitar Playing \n").unwrap();
        assert_eq!(name.as_str(), "Guitar Playing");
    }

    #[test]
    fn blank_skill_name_is_rejected() {
        assert!(SkillName::new("").is_none());
        assert!(SkillName::new("   \t").is_none());
    }

    #[test]
    fn skill_name_deserialisation_rejects_blank_text() {
        let err = serde_json::from_str::<SkillName>("\"  \"").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));

        let ok: SkillName = serde_json::from_str("\"Chess\"").unwrap();
        assert_eq!(ok.as_str(), "Chess");
    }

    #[test]
    fn node_name_serialises_as_plain_string() {
        let name = NodeName::from_static("Skill-Analysis Node");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"Skill-Analysis Node\"");

        let back: NodeName = serde_json::from_str("\"Skill-Analysis Node\"").unwrap();
        assert_eq!(back, name);
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(PipelineRunId::new_random(), PipelineRunId::new_random());
    }
}
