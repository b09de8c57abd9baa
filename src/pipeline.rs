/// Windowed stream-processing core
///
/// Consume → score → detect → publish. One pipeline instance owns one
/// sliding window and one detector; posts are processed strictly
/// sequentially in arrival order, so the window needs no internal
/// synchronization. Parallel instances each own an independent window.
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::bus::{PostSink, PostSource};
use crate::detector::ShiftDetector;
use crate::error::{ConfigError, ScoreError, TransportError};
use crate::scorer::{SentimentScorer, SCORE_MAX, SCORE_MIN};
use crate::types::Post;
use crate::window::SentimentWindow;

pub struct StreamPipeline<S> {
    scorer: S,
    window: SentimentWindow,
    detector: ShiftDetector,
    processed: u64,
}

impl<S: SentimentScorer> StreamPipeline<S> {
    /// Build a pipeline. Fails fast on invalid detector settings,
    /// before any post is processed.
    pub fn new(scorer: S, window_size: usize, alert_threshold: f64) -> Result<Self, ConfigError> {
        if window_size == 0 {
            return Err(ConfigError::InvalidWindowSize);
        }
        if !alert_threshold.is_finite() || alert_threshold < 0.0 {
            return Err(ConfigError::InvalidAlertThreshold(alert_threshold));
        }

        Ok(Self {
            scorer,
            window: SentimentWindow::new(window_size),
            detector: ShiftDetector::new(alert_threshold),
            processed: 0,
        })
    }

    /// Process one inbound post.
    ///
    /// On success the post gains `sentiment_score`, `alert` and, when an
    /// alert fires, `alert_type`. A scoring failure is recovered locally:
    /// the post gains an `error` field instead and the window is left
    /// untouched so a bad post cannot skew subsequent shift statistics.
    pub fn handle(&mut self, mut post: Post) -> Post {
        self.processed += 1;

        let scored = self.checked_score(post.content());
        let score = match scored {
            Ok(score) => score,
            Err(e) => {
                warn!("⚠️ Scoring failed on {}: {}", post.platform(), e);
                post.set_error(&e.to_string());
                return post;
            }
        };

        post.set_sentiment_score(score);
        self.window.push(score);

        match self.detector.evaluate(&self.window) {
            Some(kind) => {
                post.set_alert(true);
                post.set_alert_type(kind.as_str());
                warn!(
                    "🚨 Rapid sentiment change detected on {} (window of {})",
                    post.platform(),
                    self.window.len()
                );
            }
            None => post.set_alert(false),
        }

        post
    }

    /// Pull posts from the source, process them one at a time and
    /// publish each result before starting the next.
    ///
    /// Runs until the source is exhausted, a transport error occurs
    /// (propagated, never retried here) or the stop signal flips — the
    /// stop is honored between posts, never mid-handle.
    pub async fn run<Src, Snk>(
        &mut self,
        source: &mut Src,
        sink: &mut Snk,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), TransportError>
    where
        Src: PostSource,
        Snk: PostSink,
    {
        loop {
            let post = tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    info!("🛑 Stop signal received, shutting down after {} posts", self.processed);
                    return Ok(());
                }
                next = source.next_post() => match next? {
                    Some(post) => post,
                    None => {
                        info!("✅ Source exhausted after {} posts", self.processed);
                        return Ok(());
                    }
                },
            };

            let enriched = self.handle(post);
            sink.publish(&enriched).await?;

            if self.processed % 1000 == 0 {
                info!("📊 Processed {} posts, window fill {}/{}",
                    self.processed, self.window.len(), self.window.capacity());
            } else {
                debug!("Processed post #{}", self.processed);
            }
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn window(&self) -> &SentimentWindow {
        &self.window
    }

    fn checked_score(&self, content: &str) -> Result<f64, ScoreError> {
        let score = self.scorer.score(content)?;
        if !score.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&score) {
            return Err(ScoreError::InvalidValue(score));
        }
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::LexiconScorer;
    use serde_json::json;
    use std::collections::VecDeque;

    fn post(content: &str, platform: &str) -> Post {
        Post::from_bytes(
            json!({"content": content, "platform": platform})
                .to_string()
                .as_bytes(),
        )
        .unwrap()
    }

    /// Scores by fixed markers in the content, errors on "boom".
    struct StubScorer;

    impl SentimentScorer for StubScorer {
        fn score(&self, content: &str) -> Result<f64, ScoreError> {
            match content {
                "neg" => Ok(-0.9),
                "pos" => Ok(0.9),
                "boom" => Err(ScoreError::Failed("model unavailable".to_string())),
                "nan" => Ok(f64::NAN),
                _ => Ok(0.0),
            }
        }
    }

    struct VecSource {
        posts: VecDeque<Post>,
    }

    impl PostSource for VecSource {
        async fn next_post(&mut self) -> Result<Option<Post>, TransportError> {
            Ok(self.posts.pop_front())
        }
    }

    struct VecSink {
        published: Vec<Post>,
    }

    impl PostSink for VecSink {
        async fn publish(&mut self, post: &Post) -> Result<(), TransportError> {
            self.published.push(post.clone());
            Ok(())
        }
    }

    struct BrokenSink;

    impl PostSink for BrokenSink {
        async fn publish(&mut self, _post: &Post) -> Result<(), TransportError> {
            Err(TransportError::Publish(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "broker down",
            )))
        }
    }

    #[test]
    fn test_construction_rejects_bad_settings() {
        assert!(matches!(
            StreamPipeline::new(StubScorer, 0, 0.3),
            Err(ConfigError::InvalidWindowSize)
        ));
        assert!(matches!(
            StreamPipeline::new(StubScorer, 100, -0.3),
            Err(ConfigError::InvalidAlertThreshold(_))
        ));
        assert!(StreamPipeline::new(StubScorer, 100, 0.3).is_ok());
    }

    #[test]
    fn test_handle_enriches_post() {
        let mut pipeline = StreamPipeline::new(StubScorer, 100, 0.3).unwrap();
        let out = pipeline.handle(post("pos", "bluesky"));

        assert_eq!(out.sentiment_score(), Some(0.9));
        assert_eq!(out.alert(), Some(false));
        assert_eq!(out.alert_type(), None);
        assert_eq!(out.error(), None);
        // Originals survive
        assert_eq!(out.content(), "pos");
        assert_eq!(out.platform(), "bluesky");
    }

    #[test]
    fn test_handle_defaults_for_missing_fields() {
        let mut pipeline = StreamPipeline::new(LexiconScorer::new(), 100, 0.3).unwrap();
        let out = pipeline.handle(Post::default());

        assert_eq!(out.sentiment_score(), Some(0.0));
        assert_eq!(out.alert(), Some(false));
    }

    #[test]
    fn test_scoring_error_leaves_window_untouched() {
        let mut pipeline = StreamPipeline::new(StubScorer, 100, 0.3).unwrap();
        pipeline.handle(post("pos", "x"));
        pipeline.handle(post("neg", "x"));
        let before = pipeline.window().snapshot();

        let out = pipeline.handle(post("boom", "x"));

        assert_eq!(pipeline.window().snapshot(), before);
        assert!(out.error().unwrap().contains("model unavailable"));
        assert_eq!(out.sentiment_score(), None);
        assert_eq!(out.alert(), None);
    }

    #[test]
    fn test_out_of_contract_score_treated_as_scoring_error() {
        let mut pipeline = StreamPipeline::new(StubScorer, 100, 0.3).unwrap();
        let out = pipeline.handle(post("nan", "x"));

        assert!(out.error().is_some());
        assert_eq!(out.sentiment_score(), None);
        assert!(pipeline.window().is_empty());
    }

    #[test]
    fn test_alert_fires_on_step_change() {
        let mut pipeline = StreamPipeline::new(StubScorer, 8, 0.3).unwrap();
        for _ in 0..4 {
            pipeline.handle(post("neg", "x"));
        }
        let mut last = None;
        for _ in 0..4 {
            last = Some(pipeline.handle(post("pos", "x")));
        }

        let out = last.unwrap();
        assert_eq!(out.alert(), Some(true));
        assert_eq!(out.alert_type(), Some("rapid_sentiment_change"));
    }

    #[tokio::test]
    async fn test_end_to_end_alert_timing() {
        // 100 posts: 50 strongly negative then 50 strongly positive,
        // window 100, threshold 0.3. The older half-mean stays at -0.9
        // throughout, so the alert flips on once enough positive posts
        // land in the newer half and stays on through post 100.
        let mut pipeline = StreamPipeline::new(StubScorer, 100, 0.3).unwrap();
        let posts = (0..100)
            .map(|i| post(if i < 50 { "neg" } else { "pos" }, "x"))
            .collect::<VecDeque<_>>();
        let mut source = VecSource { posts };
        let mut sink = VecSink { published: vec![] };
        let (_stop_tx, mut stop_rx) = watch::channel(false);

        pipeline
            .run(&mut source, &mut sink, &mut stop_rx)
            .await
            .unwrap();

        assert_eq!(sink.published.len(), 100);
        for (i, out) in sink.published.iter().enumerate() {
            let n = i + 1;
            // With halves (floor(n/2), rest) the mean gap first exceeds
            // 0.3 at post 55 and only widens from there
            let expected = n >= 55;
            assert_eq!(
                out.alert(),
                Some(expected),
                "unexpected alert state at post {}",
                n
            );
            assert!(out.sentiment_score().is_some());
        }
    }

    #[tokio::test]
    async fn test_scoring_error_does_not_stop_the_loop() {
        let mut pipeline = StreamPipeline::new(StubScorer, 8, 0.3).unwrap();
        let posts = VecDeque::from([post("pos", "x"), post("boom", "x"), post("neg", "x")]);
        let mut source = VecSource { posts };
        let mut sink = VecSink { published: vec![] };
        let (_stop_tx, mut stop_rx) = watch::channel(false);

        pipeline
            .run(&mut source, &mut sink, &mut stop_rx)
            .await
            .unwrap();

        assert_eq!(sink.published.len(), 3);
        assert!(sink.published[1].error().is_some());
        assert_eq!(sink.published[2].sentiment_score(), Some(-0.9));
        assert_eq!(pipeline.window().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_is_fatal() {
        let mut pipeline = StreamPipeline::new(StubScorer, 8, 0.3).unwrap();
        let posts = VecDeque::from([post("pos", "x"), post("pos", "x")]);
        let mut source = VecSource { posts };
        let mut sink = BrokenSink;
        let (_stop_tx, mut stop_rx) = watch::channel(false);

        let result = pipeline.run(&mut source, &mut sink, &mut stop_rx).await;
        assert!(matches!(result, Err(TransportError::Publish(_))));
        // The failing publish terminated the loop before post 2
        assert_eq!(pipeline.processed(), 1);
    }

    #[tokio::test]
    async fn test_stop_signal_honored_between_posts() {
        let mut pipeline = StreamPipeline::new(StubScorer, 8, 0.3).unwrap();
        let posts = VecDeque::from([post("pos", "x"), post("pos", "x")]);
        let mut source = VecSource { posts };
        let mut sink = VecSink { published: vec![] };
        let (stop_tx, mut stop_rx) = watch::channel(false);

        stop_tx.send(true).unwrap();
        pipeline
            .run(&mut source, &mut sink, &mut stop_rx)
            .await
            .unwrap();

        assert!(sink.published.is_empty());
        assert_eq!(pipeline.processed(), 0);
    }
}
