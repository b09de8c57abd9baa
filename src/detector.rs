/// Sentiment shift detector
///
/// Two-sample mean-shift test over the sliding window: compare the mean
/// of the older half against the newer half and alert when the absolute
/// difference exceeds the threshold. Deliberately simple, not a
/// statistical significance test; more rigorous change-point detection
/// is a possible extension but out of scope here.
use crate::window::SentimentWindow;

/// Classification of a fired alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftKind {
    RapidSentimentChange,
}

impl ShiftKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftKind::RapidSentimentChange => "rapid_sentiment_change",
        }
    }
}

pub struct ShiftDetector {
    alert_threshold: f64,
}

impl ShiftDetector {
    pub fn new(alert_threshold: f64) -> Self {
        Self { alert_threshold }
    }

    /// Evaluate the window's current contents.
    ///
    /// Reports nothing while the window holds fewer than half its
    /// capacity, so a cold window cannot produce false positives. The
    /// split puts the extra element of an odd-length window into the
    /// newer half. Strict `>` against the threshold. Read-only: calling
    /// this twice on an unmutated window yields identical results.
    pub fn evaluate(&self, window: &SentimentWindow) -> Option<ShiftKind> {
        let n = window.len();
        if n < window.capacity() / 2 {
            return None;
        }

        let half = n / 2;
        if half == 0 {
            return None;
        }

        let mut older_sum = 0.0;
        let mut newer_sum = 0.0;
        for (i, score) in window.iter().enumerate() {
            if i < half {
                older_sum += score;
            } else {
                newer_sum += score;
            }
        }

        let older_mean = older_sum / half as f64;
        let newer_mean = newer_sum / (n - half) as f64;

        if (newer_mean - older_mean).abs() > self.alert_threshold {
            Some(ShiftKind::RapidSentimentChange)
        } else {
            None
        }
    }
}
