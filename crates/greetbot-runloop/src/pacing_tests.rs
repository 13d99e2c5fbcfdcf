use super::*;
use tokio::time::Instant;

#[test]
fn test_draw_delay_within_range() {
    let range = DelayRange::new(500, 1500);
    for _ in 0..200 {
        let d = draw_delay(range).as_millis() as u64;
        assert!((500..=1500).contains(&d), "{d}");
    }
    assert_eq!(draw_delay(DelayRange::new(700, 700)), Duration::from_millis(700));
    assert_eq!(draw_delay(DelayRange::new(900, 100)), Duration::from_millis(900));
}

#[tokio::test(start_paused = true)]
async fn test_pause_waits_drawn_delay() {
    let pacer = Pacer::new(CancellationToken::new());
    let start = Instant::now();
    pacer.pause("between", DelayRange::new(3000, 3000)).await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_millis(3000));
}

#[tokio::test(start_paused = true)]
async fn test_guard_abandons_slow_step_on_cancel() {
    let token = CancellationToken::new();
    let pacer = Pacer::new(token.clone());
    let stop = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        stop.cancel();
    });

    let start = Instant::now();
    let result = pacer
        .guard(async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, RunError>(())
        })
        .await;
    assert!(matches!(result, Err(RunError::Cancelled)));
    assert_eq!(start.elapsed(), Duration::from_millis(200));

    // Already cancelled: the step never gets to finish.
    let result = pacer.guard(async { Ok::<_, RunError>(7) }).await;
    assert!(matches!(result, Err(RunError::Cancelled)));
}

#[tokio::test]
async fn test_guard_passes_step_result_through() {
    let pacer = Pacer::new(CancellationToken::new());
    assert_eq!(pacer.guard(async { Ok::<_, RunError>(7) }).await.unwrap(), 7);
    let err = pacer.guard(async { Err::<(), _>(RunError::NoCandidates) }).await;
    assert!(matches!(err, Err(RunError::NoCandidates)));
}

#[tokio::test(start_paused = true)]
async fn test_pause_ends_on_cancel() {
    let token = CancellationToken::new();
    let pacer = Pacer::new(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let start = Instant::now();
    let result = pacer.pause("break", DelayRange::new(60_000, 60_000)).await;
    assert!(matches!(result, Err(RunError::Cancelled)));
    assert!(start.elapsed() < Duration::from_secs(1));
    canceller.await.unwrap();
}

#[test]
fn test_checkpoint() {
    let token = CancellationToken::new();
    let pacer = Pacer::new(token.clone());
    assert!(pacer.checkpoint().is_ok());
    token.cancel();
    assert!(pacer.is_cancelled());
    assert!(matches!(pacer.checkpoint(), Err(RunError::Cancelled)));
}

#[test]
fn test_break_schedule_fixed_interval() {
    let mut schedule = BreakSchedule::new(CountRange { min: 3, max: 3 });
    let due: Vec<bool> = (0..7).map(|_| schedule.record()).collect();
    assert_eq!(due, vec![false, false, true, false, false, true, false]);
    assert_eq!(schedule.remaining(), 2);
}

#[test]
fn test_break_schedule_random_interval_stays_in_range() {
    let mut schedule = BreakSchedule::new(CountRange { min: 20, max: 30 });
    let mut last = 0;
    for i in 1..=200u32 {
        if schedule.record() {
            let gap = i - last;
            assert!((20..=30).contains(&gap), "{gap}");
            last = i;
        }
    }
    assert!(last > 0);
}

#[test]
fn test_break_schedule_disabled_at_zero() {
    let mut schedule = BreakSchedule::new(CountRange { min: 0, max: 0 });
    assert!((0..50).all(|_| !schedule.record()));
}
