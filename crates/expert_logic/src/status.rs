//! Three-valued truth status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The resolution state of a symbol.
///
/// `Unknown` and `InProgress` only exist while solving. Once a symbol has
/// been solved it is `True`, `False` or `Undetermined`, and only those three
/// values are ever returned to callers of the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Not visited yet.
    #[default]
    Unknown,
    /// Currently being solved further up the call stack.
    InProgress,
    True,
    False,
    /// The rules do not allow a definite verdict.
    Undetermined,
}

impl Status {
    /// Returns `true` once the status is one of the three final values.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Status::True | Status::False | Status::Undetermined)
    }

    /// Returns the definite boolean value, if there is one.
    #[must_use]
    pub const fn as_bool(self) -> Option<bool> {
        match self {
            Status::True => Some(true),
            Status::False => Some(false),
            _ => None,
        }
    }

    /// Three-valued negation: `True` and `False` swap, anything else is
    /// `Undetermined`.
    #[must_use]
    pub const fn not(self) -> Status {
        match self {
            Status::True => Status::False,
            Status::False => Status::True,
            _ => Status::Undetermined,
        }
    }

    /// `False` if either side is `False`, `True` only if both are `True`.
    #[must_use]
    pub const fn and(self, other: Status) -> Status {
        match (self, other) {
            (Status::False, _) | (_, Status::False) => Status::False,
            (Status::True, Status::True) => Status::True,
            _ => Status::Undetermined,
        }
    }

    /// `True` if either side is `True`, `False` only if both are `False`.
    #[must_use]
    pub const fn or(self, other: Status) -> Status {
        match (self, other) {
            (Status::True, _) | (_, Status::True) => Status::True,
            (Status::False, Status::False) => Status::False,
            _ => Status::Undetermined,
        }
    }

    /// `Undetermined` unless both sides are definite.
    #[must_use]
    pub const fn xor(self, other: Status) -> Status {
        match (self.as_bool(), other.as_bool()) {
            (Some(a), Some(b)) => Status::from_bool(a != b),
            _ => Status::Undetermined,
        }
    }

    #[must_use]
    pub const fn from_bool(value: bool) -> Status {
        if value {
            Status::True
        } else {
            Status::False
        }
    }
}

impl From<bool> for Status {
    fn from(value: bool) -> Self {
        Status::from_bool(value)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Unknown => "UNKNOWN",
            Status::InProgress => "IN_PROGRESS",
            Status::True => "TRUE",
            Status::False => "FALSE",
            Status::Undetermined => "UNDETERMINED",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALUES: [Status; 3] = [Status::True, Status::False, Status::Undetermined];

    #[test]
    fn test_not_table() {
        assert_eq!(Status::True.not(), Status::False);
        assert_eq!(Status::False.not(), Status::True);
        assert_eq!(Status::Undetermined.not(), Status::Undetermined);
    }

    #[test]
    fn test_and_table() {
        use Status::*;
        let expected = [
            [True, False, Undetermined],
            [False, False, False],
            [Undetermined, False, Undetermined],
        ];
        for (i, a) in VALUES.iter().enumerate() {
            for (j, b) in VALUES.iter().enumerate() {
                assert_eq!(a.and(*b), expected[i][j], "{a} AND {b}");
            }
        }
    }

    #[test]
    fn test_or_table() {
        use Status::*;
        let expected = [
            [True, True, True],
            [True, False, Undetermined],
            [True, Undetermined, Undetermined],
        ];
        for (i, a) in VALUES.iter().enumerate() {
            for (j, b) in VALUES.iter().enumerate() {
                assert_eq!(a.or(*b), expected[i][j], "{a} OR {b}");
            }
        }
    }

    #[test]
    fn test_xor_table() {
        use Status::*;
        let expected = [
            [False, True, Undetermined],
            [True, False, Undetermined],
            [Undetermined, Undetermined, Undetermined],
        ];
        for (i, a) in VALUES.iter().enumerate() {
            for (j, b) in VALUES.iter().enumerate() {
                assert_eq!(a.xor(*b), expected[i][j], "{a} XOR {b}");
            }
        }
    }

    #[test]
    fn test_resolution_and_display() {
        assert!(!Status::Unknown.is_resolved());
        assert!(!Status::InProgress.is_resolved());
        assert!(Status::Undetermined.is_resolved());
        assert_eq!(Status::Undetermined.to_string(), "UNDETERMINED");
        assert_eq!(Status::from(true), Status::True);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Status::True).unwrap(), "\"TRUE\"");
        let status: Status = serde_json::from_str("\"UNDETERMINED\"").unwrap();
        assert_eq!(status, Status::Undetermined);
    }
}
