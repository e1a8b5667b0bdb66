//! Integration tests for the reconcile → validate → commit path
//!
//! Runs whole matches through the reconciler and the pipeline with a scripted
//! capture source and a table-driven classifier.

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use hashbrown::HashMap;
    use image::RgbaImage;
    use spyglass_header::decode;

    use crate::classify::{EventClassifier, RecognitionError};
    use crate::coherency::{Coherency, validate};
    use crate::config::Config;
    use crate::pipeline::{
        CaptureError, CaptureSource, CapturedPiece, DecodeFailure, JobBatch, MatchJob,
        MemorySink, Pipeline, PipelineError, TimelineSink,
    };
    use crate::reconcile::{
        AssemblyConfig, Delivery, FragmentKey, Reconciler, StartClockPolicy,
    };
    use crate::test_utils::{
        fixture_events, fixture_header, fixture_header_bytes_with_uuid, fixture_pieces,
        fixture_timeline,
    };
    use crate::timeline::{MatchId, MatchTimeline, RawEvent, TimelineCategory};

    // ============================================================================
    // Reconcile + validate
    // ============================================================================

    fn assert_elapsed_monotonic_except_after_time_add(timeline: &MatchTimeline) {
        for pair in timeline.events().windows(2) {
            if pair[0].raw.is(TimelineCategory::TIME_ADD) {
                continue;
            }
            assert!(
                pair[1].elapsed >= pair[0].elapsed,
                "elapsed went back from {:?} to {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    fn reconcile_fixture(config: AssemblyConfig, order: [usize; 3]) -> MatchTimeline {
        let header = fixture_header();
        let match_id = MatchId(header.uuid.clone());
        let mut reconciler = Reconciler::new(config);
        if let Some(clock) = header.start_clock_secs {
            reconciler.register_start_clock(&match_id, clock as f32);
        }

        let pieces = fixture_pieces();
        let mut result = None;
        for index in order {
            let (key, events) = pieces[index].clone();
            match reconciler.deliver(&match_id, key, events) {
                Delivery::Pending => assert!(result.is_none()),
                Delivery::Completed(timeline) => result = Some(timeline),
                Delivery::Ignored => panic!("fixture piece {index} ignored"),
            }
        }
        result.flatten().expect("fixture match assembles")
    }

    #[test]
    fn test_fixture_round_trip_is_coherent() {
        let header = fixture_header();
        for order in [[0, 1, 2], [2, 0, 1], [1, 2, 0]] {
            let timeline = reconcile_fixture(AssemblyConfig::default(), order);
            assert_eq!(timeline, fixture_timeline());
            assert_eq!(validate(Some(&timeline), &header), Coherency::empty());
            assert_elapsed_monotonic_except_after_time_add(&timeline);
        }
    }

    #[test]
    fn test_fixture_elapsed_steps_back_after_time_add() {
        let timeline = reconcile_fixture(AssemblyConfig::default(), [0, 1, 2]);
        let add = timeline
            .iter()
            .position(|e| e.raw.is(TimelineCategory::TIME_ADD))
            .unwrap();
        let events = timeline.events();
        assert_eq!(events[add].elapsed, 42.0);
        assert_eq!(events[add + 1].elapsed, -1.0);
        assert_eq!(timeline.last().elapsed, 30.0);
    }

    #[test]
    fn test_prefer_header_clock_matches_fixture() {
        let config = AssemblyConfig {
            start_clock: StartClockPolicy::PreferHeader,
            ..AssemblyConfig::default()
        };
        let timeline = reconcile_fixture(config, [1, 0, 2]);
        assert_eq!(timeline.first().elapsed, 0.0);
        assert!(validate(Some(&timeline), &fixture_header()).is_coherent());
    }

    // ============================================================================
    // Scripted pipeline
    // ============================================================================

    /// Image width doubles as a key into the classifier's table
    #[derive(Default)]
    struct Script {
        table: Vec<Option<Vec<RawEvent>>>,
        matches: HashMap<MatchId, Vec<(FragmentKey, u32)>>,
    }

    impl Script {
        fn piece(&mut self, match_id: &MatchId, key: FragmentKey, events: Option<Vec<RawEvent>>) {
            self.table.push(events);
            let width = self.table.len() as u32;
            self.matches
                .entry(match_id.clone())
                .or_default()
                .push((key, width));
        }

        fn split(self) -> (TableClassifier, ScriptedCapture) {
            (
                TableClassifier { table: self.table },
                ScriptedCapture {
                    matches: self.matches,
                    current: VecDeque::new(),
                    ready: true,
                    started: Vec::new(),
                },
            )
        }
    }

    struct TableClassifier {
        table: Vec<Option<Vec<RawEvent>>>,
    }

    impl EventClassifier for TableClassifier {
        fn classify(&self, image: &RgbaImage) -> Result<Vec<RawEvent>, RecognitionError> {
            self.table
                .get(image.width() as usize - 1)
                .cloned()
                .flatten()
                .ok_or_else(|| RecognitionError::new(format!("no text in {}px", image.width())))
        }
    }

    struct ScriptedCapture {
        matches: HashMap<MatchId, Vec<(FragmentKey, u32)>>,
        current: VecDeque<(FragmentKey, u32)>,
        ready: bool,
        started: Vec<MatchId>,
    }

    impl CaptureSource for ScriptedCapture {
        fn window_ready(&mut self) -> bool {
            self.ready
        }

        fn diagnostic_capture(&mut self) -> Option<RgbaImage> {
            Some(RgbaImage::new(8, 8))
        }

        fn begin_match(&mut self, job: &MatchJob) -> Result<(), CaptureError> {
            assert!(self.current.is_empty(), "previous match still capturing");
            let match_id = job.match_id();
            self.current = self.matches.remove(&match_id).unwrap_or_default().into();
            self.started.push(match_id);
            Ok(())
        }

        fn capture_next(&mut self) -> Result<Option<CapturedPiece>, CaptureError> {
            Ok(self.current.pop_front().map(|(key, width)| CapturedPiece {
                key,
                image: RgbaImage::new(width, 1),
            }))
        }
    }

    fn job(uuid_byte: u8, source: &str) -> MatchJob {
        let header = decode(&fixture_header_bytes_with_uuid([uuid_byte; 16])).unwrap();
        MatchJob::new(header, source)
    }

    fn small_pool_config() -> Config {
        let mut config = Config::default();
        config.classify.workers = 3;
        config.classify.queue_capacity = 2;
        config
    }

    #[test]
    fn test_pipeline_commits_only_coherent_matches() {
        let good = job(0x11, "good.replay");
        let lossy = job(0x22, "lossy.replay");
        let endless = job(0x33, "endless.replay");

        let mut script = Script::default();
        for (key, events) in fixture_pieces() {
            script.piece(&good.match_id(), key, Some(events));
        }
        for (key, events) in fixture_pieces() {
            let events = (key.piece_index != 2).then_some(events);
            script.piece(&lossy.match_id(), key, events);
        }
        for (key, mut events) in fixture_pieces() {
            events.retain(|e| !e.is(TimelineCategory::GAME_END));
            script.piece(&endless.match_id(), key, Some(events));
        }
        let (classifier, mut capture) = script.split();

        // Stale state from an earlier run must be removed on rejection
        let mut sink = MemorySink::new();
        sink.commit(&endless.header, fixture_timeline()).unwrap();

        let batch = JobBatch {
            jobs: vec![good.clone(), lossy.clone(), endless.clone()],
            decode_failures: vec![DecodeFailure {
                path: "broken.replay".into(),
                error: "header too short".to_string(),
            }],
        };

        let pipeline = Pipeline::new(small_pool_config(), Arc::new(classifier));
        let report = pipeline.run(batch, &mut capture, &mut sink).unwrap();

        assert_eq!(
            capture.started,
            vec![good.match_id(), lossy.match_id(), endless.match_id()]
        );

        assert_eq!(report.committed, vec![good.match_id()]);
        assert_eq!(report.pieces_captured, 9);
        assert_eq!(report.pieces_lost, 1);
        assert_eq!(report.decode_failures.len(), 1);
        assert!(report.commit_failures.is_empty());
        assert!(!report.is_clean());

        assert_eq!(report.rejected.len(), 2);
        let lossy_report = &report.rejected[0];
        assert_eq!(lossy_report.match_id, lossy.match_id());
        assert_eq!(lossy_report.violations, Coherency::NO_TIMELINE);
        assert_eq!(lossy_report.received_pieces, vec![1, 3]);
        assert_eq!(lossy_report.lost_pieces, vec![2]);

        let endless_report = &report.rejected[1];
        assert_eq!(endless_report.match_id, endless.match_id());
        assert_eq!(endless_report.violations, Coherency::NO_GAME_END);
        assert_eq!(endless_report.source, endless.source);
        assert!(endless_report.received_pieces.is_empty());

        assert_eq!(sink.len(), 1);
        let (header, timeline) = sink.get(&good.match_id()).unwrap();
        assert_eq!(header, &good.header);
        assert_eq!(timeline.len(), fixture_events().len());
        assert!(!sink.contains(&endless.match_id()));

        assert_eq!(
            report.summary(),
            "1 committed, 2 rejected, 1 unreadable, 0 commit failures (9 pieces, 1 lost)"
        );
    }

    #[test]
    fn test_pipeline_window_timeout_is_fatal() {
        let (classifier, mut capture) = Script::default().split();
        capture.ready = false;

        let mut config = small_pool_config();
        config.capture.ready_timeout_secs = 0;

        let batch = JobBatch {
            jobs: vec![job(0x11, "a.replay")],
            decode_failures: Vec::new(),
        };
        let mut sink = MemorySink::new();
        let err = Pipeline::new(config, Arc::new(classifier))
            .run(batch, &mut capture, &mut sink)
            .unwrap_err();

        let PipelineError::Capture(capture_err) = &err else {
            panic!("expected capture failure, got {err:?}");
        };
        assert!(matches!(capture_err, CaptureError::WindowTimeout { .. }));
        assert!(capture_err.diagnostic().is_some());
        assert!(capture.started.is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_pipeline_match_without_pieces() {
        let (classifier, mut capture) = Script::default().split();
        let batch = JobBatch {
            jobs: vec![job(0x44, "empty.replay")],
            decode_failures: Vec::new(),
        };
        let mut sink = MemorySink::new();
        let report = Pipeline::new(small_pool_config(), Arc::new(classifier))
            .run(batch, &mut capture, &mut sink)
            .unwrap();

        assert!(report.committed.is_empty());
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].violations, Coherency::NO_TIMELINE);
        assert_eq!(report.pieces_captured, 0);
    }
}
