use std::time::Duration;
use super::*;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

// ============================================================================
// FrameRateCounter
// ============================================================================

#[test]
fn test_counter_is_zero_before_first_window() {
    let mut counter = FrameRateCounter::new();
    for _ in 0..10 {
        assert_eq!(counter.tick(ms(16)), 0.0);
    }
}

#[test]
fn test_counter_averages_over_the_window() {
    let mut counter = FrameRateCounter::new();
    for _ in 0..49 {
        counter.tick(ms(20));
    }
    // 50 frames over exactly one second
    assert!((counter.tick(ms(20)) - 50.0).abs() < 1e-3);
    assert!((counter.fps() - 50.0).abs() < 1e-3);
}

#[test]
fn test_counter_holds_value_until_next_window() {
    let mut counter = FrameRateCounter::new();
    counter.tick(ms(500));
    counter.tick(ms(500));
    assert!((counter.fps() - 2.0).abs() < 1e-5);

    // Second window: 4 frames over 1.25 s
    for _ in 0..3 {
        counter.tick(ms(250));
        assert!((counter.fps() - 2.0).abs() < 1e-5);
    }
    counter.tick(ms(500));
    assert!((counter.fps() - 3.2).abs() < 1e-4);
}

// ============================================================================
// FpsRecorder
// ============================================================================

#[test]
fn test_recorder_samples_first_tick_immediately() {
    let mut recorder = FpsRecorder::new(4);
    assert!(!recorder.tick(ms(16), 60.0));
    assert_eq!(recorder.samples().len(), 1);
    assert_eq!(recorder.samples()[0].fps, 60.0);
}

#[test]
fn test_recorder_samples_every_interval() {
    let mut recorder = FpsRecorder::new(2);
    recorder.tick(ms(10), 30.0);
    assert!(!recorder.tick(ms(200), 31.0));
    assert_eq!(recorder.samples().len(), 1);
    assert!(!recorder.tick(ms(60), 32.0));
    assert_eq!(recorder.samples().len(), 2);
    assert_eq!(recorder.samples()[1].interval, ms(260));
    assert!(recorder.tick(ms(250), 33.0));
    assert!(recorder.is_finished());
    assert_eq!(recorder.samples().len(), 3);

    // Finished recorders ignore further ticks
    assert!(recorder.tick(ms(1000), 99.0));
    assert_eq!(recorder.samples().len(), 3);
}

#[test]
fn test_for_duration_uses_one_checkpoint_per_interval() {
    let mut recorder = FpsRecorder::for_duration(Duration::from_secs(1));
    let mut ticks = 0;
    while !recorder.tick(ms(250), 60.0) {
        ticks += 1;
    }
    assert_eq!(ticks, 4);
    assert_eq!(recorder.samples().len(), 5);
}

#[test]
fn test_write_accumulates_seconds() {
    let mut recorder = FpsRecorder::new(2);
    recorder.tick(ms(0), 10.0);
    recorder.tick(ms(250), 20.0);
    recorder.tick(ms(500), 30.0);

    let mut out = Vec::new();
    recorder.write_to(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text, "0.0 10\n0.25 20\n0.75 30\n");
}

#[test]
fn test_write_empty_record() {
    let recorder = FpsRecorder::new(3);
    let mut out = Vec::new();
    recorder.write_to(&mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_save_to_missing_directory_fails() {
    let mut recorder = FpsRecorder::new(0);
    recorder.tick(ms(0), 1.0);
    let result = recorder.save("/nonexistent-dir/fps.txt");
    assert!(matches!(result, Err(crate::error::Error::Io(_))));
}
