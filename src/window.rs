/// Sliding window of recent sentiment scores
///
/// Fixed-capacity ordered buffer, oldest-first eviction. Owned by a
/// single pipeline instance and mutated only from its processing path.
use std::collections::VecDeque;

pub struct SentimentWindow {
    scores: VecDeque<f64>,
    capacity: usize,
}

impl SentimentWindow {
    /// Create a window holding at most `capacity` scores.
    pub fn new(capacity: usize) -> Self {
        Self {
            scores: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a score, evicting the single oldest entry when full.
    pub fn push(&mut self, score: f64) {
        self.scores.push_back(score);
        if self.scores.len() > self.capacity {
            self.scores.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current contents in insertion order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.scores.iter().copied()
    }

    /// Copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<f64> {
        self.scores.iter().copied().collect()
    }
}
