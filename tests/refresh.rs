use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use pvdash::chart::{live_chart, HIGHLIGHT_SERIES, LIVE_SERIES};
use pvdash::controllers::{channel_refresh, RefreshCommand};
use pvdash::data::source::{DataSource, StaticSource};
use pvdash::data::table::{Row, Table};
use pvdash::refresh::{run_refresh_loop, LoopExit, RefreshLoop, RunState, TickOutput};
use pvdash::sink::{channel_dashboard, DashboardUpdate, LiveEvent};
use pvdash::{DashboardError, DashboardResult};

fn at(secs: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + TimeDelta::seconds(secs)
}

fn power_table(samples: &[(i64, f64)]) -> Table {
    Table::new(
        vec!["PV_P (W)".to_string()],
        samples
            .iter()
            .map(|(s, v)| Row::new(at(*s), vec![Some(*v)]))
            .collect(),
    )
}

/// Fails every other fetch, starting with the first.
struct FlakySource {
    calls: Arc<AtomicUsize>,
    table: Table,
}

impl DataSource for FlakySource {
    fn fetch(&self) -> DashboardResult<Table> {
        if self.calls.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
            Err(DashboardError::Status {
                url: "http://test/live.csv".to_string(),
                status: 503,
            })
        } else {
            Ok(self.table.clone())
        }
    }

    fn describe(&self) -> String {
        "flaky".to_string()
    }
}

fn frame(out: TickOutput) -> pvdash::refresh::LiveFrame {
    match out {
        TickOutput::Frame(f) => f,
        other => panic!("expected a frame, got {other:?}"),
    }
}

#[test]
fn reveal_batch_one_takes_exactly_n_ticks() {
    let points: Vec<[f64; 2]> = (0..5).map(|i| [i as f64 * 60.0, i as f64 * 10.0]).collect();
    let mut refresh = RefreshLoop::reveal(points.clone(), 1);
    let mut chart = live_chart(Vec::new());

    for n in 1..=5 {
        let f = frame(refresh.tick(at(0)));
        assert_eq!(f.revision, n as u64);
        assert_eq!(f.points.len(), n);
        assert_eq!(f.total, Some(5));
        chart.apply_live_points(f.revision, f.points);
    }
    assert!(refresh.is_finished());
    assert_eq!(refresh.tick(at(0)), TickOutput::Finished);

    assert_eq!(chart.series(LIVE_SERIES).unwrap().points, points);
    assert_eq!(chart.series(HIGHLIGHT_SERIES).unwrap().points, vec![points[4]]);
}

#[test]
fn reveal_larger_batches_end_on_the_last_row() {
    let points: Vec<[f64; 2]> = (0..5).map(|i| [i as f64, 1.0]).collect();
    let mut refresh = RefreshLoop::reveal(points, 2);
    let sizes: Vec<usize> = (0..3).map(|_| frame(refresh.tick(at(0))).points.len()).collect();
    assert_eq!(sizes, vec![2, 4, 5]);
    assert!(refresh.is_finished());
}

#[test]
fn reveal_of_empty_feed_finishes_immediately() {
    let mut refresh = RefreshLoop::reveal(Vec::new(), 1);
    assert_eq!(refresh.tick(at(0)), TickOutput::Finished);
    assert_eq!(refresh.revision(), 0);
}

#[test]
fn reveal_table_skips_missing_readings() {
    let table = Table::new(
        vec!["PV_P (W)".to_string()],
        vec![
            Row::new(at(0), vec![Some(1.0)]),
            Row::new(at(5), vec![None]),
            Row::new(at(10), vec![Some(3.0)]),
        ],
    );
    let mut refresh = RefreshLoop::reveal_table(&table, "PV_P (W)", 10).unwrap();
    assert_eq!(frame(refresh.tick(at(0))).points.len(), 2);
    assert!(RefreshLoop::reveal_table(&table, "missing", 1).is_err());
}

#[test]
fn pause_freezes_data_until_resumed() {
    let points: Vec<[f64; 2]> = (0..4).map(|i| [i as f64, i as f64]).collect();
    let mut refresh = RefreshLoop::reveal(points, 1);
    let first = frame(refresh.tick(at(0)));

    assert!(refresh.apply(RefreshCommand::Pause));
    assert_eq!(refresh.state(), RunState::Paused);
    for _ in 0..3 {
        assert_eq!(refresh.tick(at(0)), TickOutput::Paused);
    }
    assert_eq!(refresh.revision(), first.revision);

    assert!(refresh.apply(RefreshCommand::Toggle));
    assert_eq!(refresh.state(), RunState::Running);
    let second = frame(refresh.tick(at(0)));
    assert_eq!(second.points.len(), 2, "reveal resumes where it paused");
    assert_eq!(second.revision, first.revision + 1);
}

#[test]
fn repeated_commands_do_not_change_state() {
    let mut refresh = RefreshLoop::reveal(Vec::new(), 1);
    assert!(!refresh.apply(RefreshCommand::Resume));
    assert!(refresh.apply(RefreshCommand::Pause));
    assert!(!refresh.apply(RefreshCommand::Pause));
    assert_eq!(refresh.state().button_label(), "Resume");
    assert_eq!(refresh.state().toggled(), RunState::Running);
}

#[test]
fn refetch_resamples_each_tick() {
    let table = power_table(&[(0, 10.0), (5, 20.0), (10, 30.0), (15, 100.0)]);
    let mut refresh = RefreshLoop::refetch(
        Box::new(StaticSource::new(table)),
        "PV_P (W)",
        TimeDelta::seconds(15),
        false,
    );
    let a = frame(refresh.tick(at(0)));
    assert_eq!(a.points.len(), 2);
    assert!((a.points[0][1] - 20.0).abs() < 1e-9);
    assert_eq!(a.total, None);

    let b = frame(refresh.tick(at(0)));
    assert_eq!(b.points, a.points);
    assert_eq!(b.revision, a.revision + 1, "every tick gets a fresh revision");
    assert!(!refresh.is_finished());
}

#[test]
fn refetch_clips_to_now_when_enabled() {
    let table = power_table(&[(0, 10.0), (30, 20.0), (60, 30.0)]);
    let mut refresh = RefreshLoop::refetch(
        Box::new(StaticSource::new(table)),
        "PV_P (W)",
        TimeDelta::seconds(15),
        true,
    );
    assert_eq!(frame(refresh.tick(at(40))).points.len(), 2);
}

#[test]
fn refetch_errors_become_warnings_and_the_loop_continues() {
    let calls = Arc::new(AtomicUsize::new(0));
    let source = FlakySource {
        calls: calls.clone(),
        table: power_table(&[(0, 1.0)]),
    };
    let mut refresh = RefreshLoop::refetch(Box::new(source), "PV_P (W)", TimeDelta::seconds(15), false);

    match refresh.tick(at(0)) {
        TickOutput::Warning(msg) => assert!(msg.contains("503"), "{msg}"),
        other => panic!("expected a warning, got {other:?}"),
    }
    assert_eq!(frame(refresh.tick(at(0))).revision, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn worker_loop_sends_n_frames_then_finished() {
    let (sink, rx) = channel_dashboard();
    let (_controller, commands) = channel_refresh();
    let points: Vec<[f64; 2]> = (0..3).map(|i| [i as f64, 1.0]).collect();
    let mut refresh = RefreshLoop::reveal(points, 1);

    let exit = run_refresh_loop(&mut refresh, Duration::from_millis(1), &commands, &sink);
    assert_eq!(exit, LoopExit::Finished);

    let events: Vec<LiveEvent> = rx
        .try_iter()
        .map(|u| match u {
            DashboardUpdate::Live(e) => e,
            other => panic!("unexpected update: {other:?}"),
        })
        .collect();
    let frames = events.iter().filter(|e| matches!(e, LiveEvent::Frame(_))).count();
    assert_eq!(frames, 3);
    assert!(matches!(events.last(), Some(LiveEvent::Finished)));
}

#[test]
fn worker_loop_confirms_pause_and_stops_when_ui_is_gone() {
    let (sink, rx) = channel_dashboard();
    let (controller, commands) = channel_refresh();
    let points: Vec<[f64; 2]> = (0..100).map(|i| [i as f64, 1.0]).collect();
    let mut refresh = RefreshLoop::reveal(points, 1);

    assert!(controller.pause());
    drop(controller);
    let exit = run_refresh_loop(&mut refresh, Duration::from_millis(50), &commands, &sink);
    assert_eq!(exit, LoopExit::Disconnected);
    assert_eq!(refresh.state(), RunState::Paused);

    let events: Vec<LiveEvent> = rx
        .try_iter()
        .filter_map(|u| match u {
            DashboardUpdate::Live(e) => Some(e),
            _ => None,
        })
        .collect();
    assert!(matches!(events[0], LiveEvent::Frame(_)));
    assert!(matches!(events[1], LiveEvent::State(RunState::Paused)));
}

#[test]
fn controller_sends_commands_in_order() {
    let (controller, commands) = channel_refresh();
    assert!(controller.pause());
    assert!(controller.resume());
    assert!(controller.toggle());
    let sent: Vec<RefreshCommand> = commands.try_iter().collect();
    assert_eq!(
        sent,
        vec![RefreshCommand::Pause, RefreshCommand::Resume, RefreshCommand::Toggle]
    );
    drop(commands);
    assert!(!controller.pause());
}
