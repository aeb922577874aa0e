//! The adapter boundary between external probability tensors and the core.

use crate::ccg::error::ParseFailure;

/// Per-sentence score tensors handed to the driver by an external
/// supertagger/dependency scorer. The core treats these as opaque,
/// already-materialised, read-only arrays (spec §4.4) — it never computes
/// or normalizes a probability itself.
#[derive(Debug, Clone)]
pub struct ScoreTensors {
    /// `tag_log_prob[i][c]`: log-probability of category index `c` at
    /// token `i`. Row length is the number of tokens, each row length is
    /// the number of categories in the grammar pack.
    pub tag_log_prob: Vec<Vec<f64>>,
    /// `dep_log_prob[i][j]`: log-probability that token `i`'s head is
    /// token `j`, where `j == sentence_len` is the virtual ROOT head.
    pub dep_log_prob: Vec<Vec<f64>>,
}

impl ScoreTensors {
    pub fn new(tag_log_prob: Vec<Vec<f64>>, dep_log_prob: Vec<Vec<f64>>) -> Self {
        ScoreTensors {
            tag_log_prob,
            dep_log_prob,
        }
    }

    pub fn sentence_len(&self) -> usize {
        self.tag_log_prob.len()
    }

    pub fn num_categories(&self) -> usize {
        self.tag_log_prob.first().map(Vec::len).unwrap_or(0)
    }

    pub fn tag(&self, i: usize, c: usize) -> f64 {
        self.tag_log_prob[i][c]
    }

    pub fn dep(&self, i: usize, j: usize) -> f64 {
        self.dep_log_prob[i][j]
    }

    /// The highest-probability dependency target for position `i`.
    pub fn head_guess(&self, i: usize) -> usize {
        let row = &self.dep_log_prob[i];
        row.iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(j, _)| j)
            .unwrap_or(row.len().saturating_sub(1))
    }

    /// Validate shape and value-range invariants (spec §4.4, §8 P6,
    /// §9 "beware NaN: reject at ingress").
    pub fn validate(&self, sentence_len: usize, num_categories: usize) -> Result<(), ParseFailure> {
        if self.tag_log_prob.len() != sentence_len {
            return Err(ParseFailure::InvalidInput(format!(
                "tag_log_prob has {} rows, expected {}",
                self.tag_log_prob.len(),
                sentence_len
            )));
        }
        if self.dep_log_prob.len() != sentence_len {
            return Err(ParseFailure::InvalidInput(format!(
                "dep_log_prob has {} rows, expected {}",
                self.dep_log_prob.len(),
                sentence_len
            )));
        }
        for (i, row) in self.tag_log_prob.iter().enumerate() {
            if row.len() != num_categories {
                return Err(ParseFailure::InvalidInput(format!(
                    "tag_log_prob row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    num_categories
                )));
            }
            for &v in row {
                validate_log_prob(v)?;
            }
        }
        for (i, row) in self.dep_log_prob.iter().enumerate() {
            if row.len() != sentence_len + 1 {
                return Err(ParseFailure::InvalidInput(format!(
                    "dep_log_prob row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    sentence_len + 1
                )));
            }
            for &v in row {
                validate_log_prob(v)?;
            }
        }
        Ok(())
    }
}

fn validate_log_prob(v: f64) -> Result<(), ParseFailure> {
    if v.is_nan() {
        return Err(ParseFailure::InvalidInput("NaN log-probability".to_string()));
    }
    if v > 0.0 {
        return Err(ParseFailure::InvalidInput(format!(
            "log-probability {} exceeds 0.0",
            v
        )));
    }
    Ok(())
}
