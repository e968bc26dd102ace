//! Enum types for the BugSage system.
//!
//! Each enum has:
//! - Custom Serialize (as its display string, e.g. `"In Progress"`)
//! - Strict Deserialize (unknown strings are rejected, never stored)
//! - `as_str()`, `ALL`, `parse()`, `parse_loose()`, `Display`, `FromStr`

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Error returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    /// Human-readable enum name, e.g. `"status"`.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

// ---------------------------------------------------------------------------
// Macro: defines a closed enum backed by a fixed set of display strings.
// ---------------------------------------------------------------------------
macro_rules! define_enum {
    (
        $(#[$meta:meta])*
        $name:ident, kind = $kind:expr, default = $default:ident,
        variants: [
            $( ($variant:ident, $str:expr) ),+ $(,)?
        ]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $variant, )+
        }

        impl $name {
            /// Every variant, in canonical display order.
            pub const ALL: &'static [$name] = &[ $( Self::$variant, )+ ];

            /// Returns the string representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $str, )+
                }
            }

            /// Returns `true` if this is the default variant.
            pub fn is_default(&self) -> bool {
                *self == Self::$default
            }

            /// Exact-match parse against the display strings.
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $( $str => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Lenient parse for command-line input: ignores ASCII case and
            /// treats `_` and `-` as spaces (`in_progress` -> `In Progress`).
            pub fn parse_loose(s: &str) -> Option<Self> {
                let wanted = s.trim().replace(['_', '-'], " ");
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(&wanted))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s).ok_or_else(|| ParseEnumError {
                    kind: $kind,
                    value: s.to_owned(),
                })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

// ===========================================================================
// Status
// ===========================================================================

define_enum! {
    /// Lifecycle state of a bug.
    Status, kind = "status", default = New,
    variants: [
        (New, "New"),
        (InProgress, "In Progress"),
        (Resolved, "Resolved"),
        (Closed, "Closed"),
    ]
}

impl Status {
    /// Returns `true` for the states counted as "done" in resolution reports.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

// ===========================================================================
// Priority
// ===========================================================================

define_enum! {
    /// How urgently a bug needs attention.
    Priority, kind = "priority", default = Medium,
    variants: [
        (Low, "Low"),
        (Medium, "Medium"),
        (High, "High"),
        (Critical, "Critical"),
    ]
}

// ===========================================================================
// Role
// ===========================================================================

define_enum! {
    /// Role of a registered user.
    Role, kind = "role", default = Developer,
    variants: [
        (Developer, "Developer"),
        (Tester, "Tester"),
        (Admin, "Admin"),
    ]
}

// ===========================================================================
// TrackedField
// ===========================================================================

define_enum! {
    /// Bug fields that may be changed after creation and are recorded in history.
    TrackedField, kind = "field", default = Title,
    variants: [
        (Title, "title"),
        (Description, "description"),
        (Priority, "priority"),
        (Status, "status"),
        (AssigneeId, "assignee_id"),
    ]
}
