use serde::{Deserialize, Serialize};

/// The key used for every "is this the same voter" comparison.
pub type ConstituentIdentifier = String;

/// A voter that is eligible to cast a ballot in a vote.
///
/// The derived equality compares all the fields. Logic that needs to know
/// whether two constituents are the same person compares `identifier` only.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
pub struct Constituent {
    pub name: Option<String>,
    pub identifier: ConstituentIdentifier,
    /// Free-form grouping label. Never starts with `-` when imported.
    pub tag: Option<String>,
    pub email: Option<String>,
}

impl Constituent {
    pub fn new(identifier: impl Into<ConstituentIdentifier>) -> Constituent {
        Constituent {
            name: None,
            identifier: identifier.into(),
            tag: None,
            email: None,
        }
    }

    pub fn with_name(self, name: impl Into<String>) -> Constituent {
        Constituent {
            name: Some(name.into()),
            ..self
        }
    }

    pub fn with_tag(self, tag: impl Into<String>) -> Constituent {
        Constituent {
            tag: Some(tag.into()),
            ..self
        }
    }

    pub fn with_email(self, email: impl Into<String>) -> Constituent {
        Constituent {
            email: Some(email.into()),
            ..self
        }
    }

    /// The display name, falling back to the identifier.
    pub fn name_or_identifier(&self) -> &str {
        self.name.as_deref().unwrap_or(self.identifier.as_str())
    }

    pub fn same_identifier(&self, other: &Constituent) -> bool {
        self.identifier == other.identifier
    }
}

// Mostly used for writing tests.
impl From<&str> for Constituent {
    fn from(identifier: &str) -> Constituent {
        Constituent::new(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_falls_back_to_identifier() {
        let c = Constituent::from("alice");
        assert_eq!(c.name_or_identifier(), "alice");
        let c = c.with_name("Alice Liddell");
        assert_eq!(c.name_or_identifier(), "Alice Liddell");
    }

    #[test]
    fn identity_is_by_identifier_only() {
        let a = Constituent::new("bob").with_tag("board");
        let b = Constituent::new("bob").with_email("bob@example.org");
        assert_ne!(a, b);
        assert!(a.same_identifier(&b));
    }
}
