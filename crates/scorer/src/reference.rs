use serde::{Deserialize, Serialize};

use crate::types::ScoreError;

/// Exemplars that read like typical model output: hedged, evenly paced,
/// heavy on transitions and abstract nouns.
const DEFAULT_AI_LIKE: &[&str] = &[
    "In today's rapidly evolving digital landscape, it is important to recognize that \
     technology plays a pivotal role in shaping how we communicate, collaborate, and \
     innovate. By leveraging these tools effectively, individuals and organizations \
     can unlock new opportunities for growth.",
    "Furthermore, it is worth noting that there are several key factors to consider. \
     First, a comprehensive approach ensures that all aspects are addressed. Second, \
     consistent evaluation allows for continuous improvement. Ultimately, these \
     strategies contribute to more effective and sustainable outcomes.",
    "Overall, this topic highlights the delicate balance between innovation and \
     responsibility. While there are clear benefits, it is essential to remain \
     mindful of potential challenges and to approach them with a thoughtful, \
     well-rounded perspective.",
];

/// Exemplars that read like people: uneven rhythm, specifics, asides.
const DEFAULT_HUMAN_LIKE: &[&str] = &[
    "Honestly I didn't expect the bus to be that late. Stood there for like forty \
     minutes in the rain, phone at 3%, and then two of them showed up at once. \
     Classic. Anyway I made it, just soaked.",
    "My grandmother never measured anything when she baked. A handful of this, a \
     splash of that. I tried writing her bread recipe down once and she laughed at \
     me, said the dough tells you when it's ready.",
];

/// Two labeled groups of exemplar texts the input is compared against.
///
/// Both groups must be non-empty. The set is configuration, not user data:
/// it is built once at startup and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSet {
    ai_like: Vec<String>,
    human_like: Vec<String>,
}

impl ReferenceSet {
    pub fn new<A, H, S>(ai_like: A, human_like: H) -> Result<Self, ScoreError>
    where
        A: IntoIterator<Item = S>,
        H: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = Self {
            ai_like: ai_like.into_iter().map(Into::into).collect(),
            human_like: human_like.into_iter().map(Into::into).collect(),
        };
        set.validate()?;
        Ok(set)
    }

    pub fn ai_like(&self) -> &[String] {
        &self.ai_like
    }

    pub fn human_like(&self) -> &[String] {
        &self.human_like
    }

    /// Total number of exemplars across both groups.
    pub fn len(&self) -> usize {
        self.ai_like.len() + self.human_like.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self) -> Result<(), ScoreError> {
        for (label, group) in [("ai_like", &self.ai_like), ("human_like", &self.human_like)] {
            if group.is_empty() {
                return Err(ScoreError::InvalidConfig(format!(
                    "reference group '{label}' must contain at least one exemplar"
                )));
            }
            if group.iter().any(|text| text.trim().is_empty()) {
                return Err(ScoreError::InvalidConfig(format!(
                    "reference group '{label}' contains a blank exemplar"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ReferenceSet {
    fn default() -> Self {
        Self {
            ai_like: DEFAULT_AI_LIKE.iter().map(|s| s.to_string()).collect(),
            human_like: DEFAULT_HUMAN_LIKE.iter().map(|s| s.to_string()).collect(),
        }
    }
}
