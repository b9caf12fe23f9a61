use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// A choice in a vote.
///
/// Two options are the same option only if they share the same `id`. Two
/// options created separately with the same name are distinct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteOption {
    pub id: Uuid,
    pub name: String,
    pub subtitle: Option<String>,
    #[serde(default)]
    pub custom_data: BTreeMap<String, String>,
}

impl VoteOption {
    pub fn new(name: impl Into<String>) -> VoteOption {
        VoteOption {
            id: Uuid::new_v4(),
            name: name.into(),
            subtitle: None,
            custom_data: BTreeMap::new(),
        }
    }

    pub fn with_subtitle(self, subtitle: impl Into<String>) -> VoteOption {
        VoteOption {
            subtitle: Some(subtitle.into()),
            ..self
        }
    }

    pub fn with_custom_data(self, custom_data: BTreeMap<String, String>) -> VoteOption {
        VoteOption {
            custom_data,
            ..self
        }
    }
}

impl PartialEq for VoteOption {
    fn eq(&self, other: &VoteOption) -> bool {
        self.id == other.id
    }
}

impl Eq for VoteOption {}

impl Hash for VoteOption {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl From<&str> for VoteOption {
    fn from(name: &str) -> VoteOption {
        VoteOption::new(name)
    }
}

/// Options ordered by ascending name. The sort is stable, so options sharing
/// a name keep their relative order.
pub(crate) fn sorted_by_name(options: &[VoteOption]) -> Vec<VoteOption> {
    let mut res = options.to_vec();
    res.sort_by(|a, b| a.name.cmp(&b.name));
    res
}
