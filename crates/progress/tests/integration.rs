//! Integration tests for the progress logger

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex, OnceLock, Weak};
    use std::time::Duration;
    use tickline::*;

    /// Options that write plain lines into a shared buffer and never start a heartbeat
    fn captured(total: u64, message: &str) -> (ProgressOptions, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink_lines = Arc::clone(&lines);
        let options = ProgressOptions::new(total, message)
            .with_theme(Theme::plain())
            .with_heartbeat(None)
            .with_log_function(move |line: &str| {
                sink_lines.lock().unwrap().push(line.to_string());
            });
        (options, lines)
    }

    fn drain(lines: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        lines.lock().unwrap().clone()
    }

    fn finished_count(lines: &[String]) -> usize {
        lines.iter().filter(|l| l.starts_with("Finished ")).count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_trip_explicit_durations() {
        let (options, lines) = captured(10, "Resizing images");
        let logger = ProgressLogger::new(options);

        for i in 1..=9 {
            tokio::time::advance(Duration::from_millis(100)).await;
            logger.tick_with_duration(1, Duration::from_millis(100));
            let snapshot = logger.snapshot().expect("still running");
            assert_eq!(snapshot.completed, i);
            assert_eq!(snapshot.samples.len(), usize::try_from(i).unwrap());
            if i >= 2 {
                let average = snapshot.average_ms.expect("average after two samples");
                assert!((average - 100.0).abs() < 1e-9);
            }
        }

        tokio::time::advance(Duration::from_millis(100)).await;
        logger.tick_with_duration(1, Duration::from_millis(100));

        assert!(logger.is_disposed());
        assert!(logger.snapshot().is_none());

        let lines = drain(&lines);
        assert_eq!(finished_count(&lines), 1);
        assert_eq!(lines.last().unwrap(), "Finished Resizing images in 1.0s");

        let final_line = &lines[lines.len() - 2];
        assert!(final_line.starts_with("Resizing images: 10 of 10 |"));
        assert!(final_line.contains("| 100.00% | Est remaining: 0s"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_render_waits_for_estimate() {
        let (options, lines) = captured(10, "job");
        let logger = ProgressLogger::new(options);

        logger.tick_with_duration(1, Duration::from_millis(50));
        assert!(drain(&lines).is_empty(), "no average yet, nothing to show");

        logger.tick_with_duration(1, Duration::from_millis(50));
        let lines = drain(&lines);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("job: 2 of 10 |"));
        assert!(lines[0].contains("| 20.00% |"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_inferred_and_explicit_durations() {
        let (options, _lines) = captured(100, "job");
        let logger = ProgressLogger::new(options);

        tokio::time::advance(Duration::from_millis(50)).await;
        logger.tick(1);
        tokio::time::advance(Duration::from_millis(50)).await;
        logger.tick(1);

        let samples = logger.snapshot().unwrap().samples;
        assert_eq!(samples.len(), 2);
        assert!((samples[1] - 50.0).abs() < 1e-6);

        tokio::time::advance(Duration::from_millis(5)).await;
        logger.tick_with_duration(1, Duration::from_millis(200));
        let samples = logger.snapshot().unwrap().samples;
        assert!((samples[2] - 200.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_tick_adds_one_averaged_sample() {
        let (options, _lines) = captured(100, "job");
        let logger = ProgressLogger::new(options);

        logger.tick_with_duration(5, Duration::from_millis(500));
        let snapshot = logger.snapshot().unwrap();
        assert_eq!(snapshot.completed, 5);
        assert_eq!(snapshot.samples, vec![100.0]);

        logger.tick(0);
        let snapshot = logger.snapshot().unwrap();
        assert_eq!(snapshot.completed, 5);
        assert_eq!(snapshot.samples.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_byte_mode_renders_units() {
        let (options, lines) = captured(5_000_000_000, "upload");
        let logger = ProgressLogger::new(options.with_bytes(true));

        logger.tick_with_duration(1_250_000_000, Duration::from_secs(1));
        tokio::time::advance(Duration::from_secs(1)).await;
        logger.tick_with_duration(1_250_000_000, Duration::from_secs(1));

        let lines = drain(&lines);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("upload: 2.3 GB of 4.7 GB |"));
        assert!(lines[0].contains("| 50.00% |"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_keeps_first_and_last_state() {
        let (options, lines) = captured(1000, "crunch");
        let logger = ProgressLogger::new(options.with_throttle(Duration::from_millis(500)));

        for _ in 0..100 {
            logger.tick_with_duration(1, Duration::from_millis(10));
            tokio::time::advance(Duration::from_micros(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(600)).await;

        let lines = drain(&lines);
        assert_eq!(lines.len(), 2, "one leading and one trailing render");
        assert!(lines[0].starts_with("crunch: 2 of 1000 |"));
        assert!(lines[1].starts_with("crunch: 100 of 1000 |"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_bypasses_throttle() {
        let (options, lines) = captured(20, "crunch");
        let logger = ProgressLogger::new(options.with_throttle(Duration::from_secs(60)));

        for _ in 0..20 {
            logger.tick_with_duration(1, Duration::from_millis(10));
        }

        let lines = drain(&lines);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("crunch: 2 of 20 |"));
        assert!(lines[1].starts_with("crunch: 20 of 20 |"));
        assert_eq!(finished_count(&lines), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_advances_estimate_without_ticks() {
        let (options, lines) = captured(10, "slow");
        let logger = ProgressLogger::new(options.with_heartbeat(Some(Duration::from_secs(1))));

        logger.tick_with_duration(1, Duration::from_millis(100));
        logger.tick_with_duration(1, Duration::from_millis(100));
        assert_eq!(drain(&lines).len(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let lines_after = drain(&lines);
        assert_eq!(lines_after.len(), 2);
        assert!(lines_after[1].starts_with("slow: 2 of 10 |"));
        assert_ne!(lines_after[0], lines_after[1]);

        logger.dispose();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(drain(&lines).len(), 2, "no renders after disposal");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_is_idempotent() {
        let (options, lines) = captured(10, "job");
        let logger = ProgressLogger::new(options);

        logger.tick_with_duration(1, Duration::from_millis(10));
        logger.tick_with_duration(1, Duration::from_millis(10));
        assert_eq!(logger.state(), LifecycleState::Running);

        logger.dispose();
        logger.dispose();
        assert_eq!(logger.state(), LifecycleState::Disposed);

        logger.tick_with_duration(8, Duration::from_millis(10));
        assert!(logger.snapshot().is_none());

        let lines = drain(&lines);
        assert_eq!(lines.len(), 1);
        assert_eq!(finished_count(&lines), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_heartbeat() {
        let (options, lines) = captured(10, "slow");
        let logger = ProgressLogger::new(options.with_heartbeat(Some(Duration::from_secs(1))));

        logger.tick_with_duration(1, Duration::from_millis(100));
        logger.tick_with_duration(1, Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(drain(&lines).len(), 2);

        drop(logger);
        tokio::time::sleep(Duration::from_secs(5)).await;

        let lines = drain(&lines);
        assert_eq!(lines.len(), 2, "no renders after the logger is dropped");
        assert_eq!(finished_count(&lines), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_log_function_can_inspect_logger() {
        let cell: Arc<OnceLock<Weak<ProgressLogger>>> = Arc::new(OnceLock::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink_cell = Arc::clone(&cell);
        let sink_seen = Arc::clone(&seen);
        let options = ProgressOptions::new(3, "job")
            .with_theme(Theme::plain())
            .with_heartbeat(None)
            .with_log_function(move |line: &str| {
                let logger = sink_cell.get().and_then(Weak::upgrade);
                let state = logger.as_ref().map(|logger| logger.state());
                let completed = logger
                    .as_ref()
                    .and_then(|logger| logger.snapshot())
                    .map(|snapshot| snapshot.completed);
                sink_seen
                    .lock()
                    .unwrap()
                    .push((line.to_string(), state, completed));
            });

        let logger = Arc::new(ProgressLogger::new(options));
        cell.set(Arc::downgrade(&logger)).unwrap();

        for _ in 0..3 {
            logger.tick_with_duration(1, Duration::from_millis(10));
        }

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].0.starts_with("job: 2 of 3 |"));
        assert_eq!(seen[0].1, Some(LifecycleState::Running));
        assert_eq!(seen[0].2, Some(2));
        assert_eq!(seen[2].0, "Finished job in 0ms");
        assert_eq!(seen[2].1, Some(LifecycleState::Disposed));
        assert_eq!(seen[2].2, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_after_completion_is_noop() {
        let (options, lines) = captured(2, "job");
        let logger = ProgressLogger::new(options);

        logger.tick_with_duration(1, Duration::from_millis(10));
        logger.tick_with_duration(1, Duration::from_millis(10));
        assert!(logger.is_disposed());

        logger.dispose();
        drop(logger);

        assert_eq!(finished_count(&drain(&lines)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overshoot_clamps_percentage() {
        let (options, lines) = captured(3, "job");
        let logger = ProgressLogger::new(options);

        logger.tick_with_duration(5, Duration::from_millis(10));
        assert!(logger.is_disposed());

        let lines = drain(&lines);
        assert!(lines[0].starts_with("job: 5 of 3 |"));
        assert!(lines[0].contains("| 100.00% |"));
        assert_eq!(finished_count(&lines), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_percentage_is_monotonic() {
        let (options, _lines) = captured(37, "job");
        let logger = ProgressLogger::new(options);

        let mut last = 0.0;
        for amount in [1, 3, 2, 5, 1, 8, 4] {
            tokio::time::advance(Duration::from_millis(7)).await;
            logger.tick(amount);
            let pct = logger.snapshot().unwrap().percentage.unwrap();
            assert!(pct >= last);
            assert!((0.0..=100.0).contains(&pct));
            last = pct;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_total_never_renders() {
        let (options, lines) = captured(0, "empty");
        let logger = ProgressLogger::new(options);

        for _ in 0..5 {
            logger.tick_with_duration(1, Duration::from_millis(10));
        }

        assert_eq!(logger.state(), LifecycleState::Running);
        let snapshot = logger.snapshot().unwrap();
        assert_eq!(snapshot.percentage, None);
        assert_eq!(snapshot.eta, None);
        assert!(drain(&lines).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_trend_shown_once_averages_exist() {
        let (options, lines) = captured(100, "job");
        let logger = ProgressLogger::new(options);

        for ms in [10, 10, 20, 20, 40] {
            logger.tick_with_duration(1, Duration::from_millis(ms));
        }

        let snapshot = logger.snapshot().unwrap();
        assert_eq!(snapshot.history_len, 4);

        let lines = drain(&lines);
        let last = lines.last().unwrap();
        let trend = last.rsplit(" | ").next().unwrap();
        assert!(trend.chars().all(|c| ('▁'..='█').contains(&c)));
        assert_eq!(trend.chars().count(), 4);
    }

    #[test]
    fn test_works_without_runtime() {
        let (options, lines) = captured(3, "sync");
        let logger = ProgressLogger::new(
            options
                .with_heartbeat(Some(Duration::from_secs(1)))
                .with_throttle(Duration::from_secs(10)),
        );

        logger.tick_with_duration(1, Duration::from_millis(5));
        logger.tick_with_duration(1, Duration::from_millis(5));
        logger.tick_with_duration(1, Duration::from_millis(5));

        assert!(logger.is_disposed());
        let lines = drain(&lines);
        assert_eq!(finished_count(&lines), 1);
        assert!(lines.iter().any(|l| l.starts_with("sync: 3 of 3 |")));
    }
}
