use crate::models::Poll;

/// Display row for one option. Derived from a snapshot, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TallyRow {
    pub index: usize,
    pub label: String,
    pub votes: u64,
    pub share: f64,
    pub is_own_vote: bool,
}

impl TallyRow {
    pub fn percent(&self) -> f64 {
        self.share * 100.0
    }

    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.percent())
    }
}

/// `votes[i] / sum(votes)`, or 0 for every option while nothing has been cast.
pub fn share(votes: &[u64], index: usize) -> f64 {
    let total: u64 = votes.iter().sum();
    match votes.get(index) {
        Some(&count) if total > 0 => count as f64 / total as f64,
        _ => 0.0,
    }
}

pub fn shares(votes: &[u64]) -> Vec<f64> {
    (0..votes.len()).map(|i| share(votes, i)).collect()
}

pub fn tally_rows(poll: &Poll, own_vote: Option<usize>) -> Vec<TallyRow> {
    poll.options.iter()
        .zip(poll.votes.iter())
        .enumerate()
        .map(|(index, (label, &votes))| TallyRow {
            index,
            label: label.clone(),
            votes,
            share: share(&poll.votes, index),
            is_own_vote: own_vote == Some(index),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_split_by_total() {
        assert_eq!(share(&[3, 1], 0), 0.75);
        assert_eq!(share(&[3, 1], 1), 0.25);
    }

    #[test]
    fn empty_tally_is_all_zero() {
        assert_eq!(shares(&[0, 0]), vec![0.0, 0.0]);
        assert_eq!(shares(&[]), Vec::<f64>::new());
        assert_eq!(share(&[2], 5), 0.0);
    }

    #[test]
    fn rows_mark_own_vote() {
        let poll = Poll {
            id: 1,
            question: "A".into(),
            options: vec!["X".into(), "Y".into()],
            votes: vec![1, 3],
        };
        let rows = tally_rows(&poll, Some(1));
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].is_own_vote);
        assert!(rows[1].is_own_vote);
        assert_eq!(rows[1].percent_label(), "75.0%");
    }
}
