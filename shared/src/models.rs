use serde::{Serialize, Deserialize};

pub type PollId = u64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    pub options: Vec<String>,
    pub votes: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PollSummary {
    pub id: PollId,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub question: String,
    pub options: Vec<String>,
}

impl Poll {
    pub fn new(id: PollId, question: impl Into<String>, options: Vec<String>) -> Self {
        let votes = vec![0; options.len()];
        Self { id, question: question.into(), options, votes }
    }

    /// Every option has exactly one count, index aligned.
    pub fn is_consistent(&self) -> bool {
        self.options.len() == self.votes.len()
    }

    pub fn total_votes(&self) -> u64 {
        self.votes.iter().sum()
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn summary(&self) -> PollSummary {
        PollSummary { id: self.id, question: self.question.clone() }
    }
}

impl CreatePollRequest {
    pub fn trimmed(&self) -> Self {
        Self {
            question: self.question.trim().to_string(),
            options: self.options.iter().map(|opt| opt.trim().to_string()).collect(),
        }
    }
}
