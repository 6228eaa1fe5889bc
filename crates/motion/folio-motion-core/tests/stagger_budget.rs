use approx::assert_abs_diff_eq;
use folio_motion_core::{
    props, HostEvent, MemoryHost, MotionEngine, MotionEvent, Rect, SectionSpec, Stagger, Timeline,
    Trigger, TweenSpec,
};

fn cards(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("card.{i}")).collect()
}

fn staggered(n: usize, stagger: Stagger) -> Timeline {
    Timeline::new().add(
        TweenSpec::from_to(
            cards(n),
            props([("opacity", 0.0)]),
            props([("opacity", 1.0)]),
        )
        .duration(2.0)
        .stagger(stagger),
    )
}

#[test]
fn amount_stagger_fits_the_budget_for_any_count() {
    for n in [1usize, 2, 3, 7, 50] {
        let layout = staggered(n, Stagger::amount(1.5)).layout();
        assert_eq!(layout.len(), n);

        let first = layout.first().unwrap();
        let last = layout.last().unwrap();
        assert_abs_diff_eq!(first.start, 0.0);
        let expected_last = if n == 1 { 0.0 } else { 1.5 };
        assert_abs_diff_eq!(last.start, expected_last, epsilon = 1e-4);

        let span = staggered(n, Stagger::amount(1.5)).span();
        let expected_span = if n == 1 { 2.0 } else { 3.5 };
        assert_abs_diff_eq!(span, expected_span, epsilon = 1e-4);

        // Evenly spaced, in target order.
        for pair in layout.windows(2) {
            let gap = pair[1].start - pair[0].start;
            assert_abs_diff_eq!(gap, 1.5 / (n - 1) as f32, epsilon = 1e-4);
        }
    }
}

#[test]
fn each_stagger_grows_with_count() {
    for n in [1usize, 4, 10] {
        let span = staggered(n, Stagger::each(0.1)).span();
        assert_abs_diff_eq!(span, 2.0 + 0.1 * (n - 1) as f32, epsilon = 1e-4);
    }
}

#[test]
fn reversed_stagger_starts_from_the_last_target() {
    let layout = staggered(3, Stagger::amount(1.0).from_end()).layout();
    let starts: Vec<f32> = layout.iter().map(|t| t.start).collect();
    assert_abs_diff_eq!(starts[0], 1.0, epsilon = 1e-4);
    assert_abs_diff_eq!(starts[1], 0.5, epsilon = 1e-4);
    assert_abs_diff_eq!(starts[2], 0.0, epsilon = 1e-4);
}

#[test]
fn staggered_reveal_completes_within_budget_when_played() {
    for n in [2usize, 7, 50] {
        let mut host = MemoryHost::new();
        for (i, key) in cards(n).into_iter().enumerate() {
            host.insert(key, Rect::new(100.0 + i as f32 * 10.0, 0.0, 200.0, 10.0));
        }
        let mut engine = MotionEngine::default();
        engine.dispatch(HostEvent::Resize {
            width: 1280.0,
            height: 800.0,
            max_scroll: None,
        });
        engine
            .mount(
                SectionSpec::new("grid").timeline(
                    Trigger::immediate(0.0),
                    staggered(n, Stagger::amount(1.5)),
                ),
                &mut host,
            )
            .unwrap();

        let mut completed_at = None;
        let mut elapsed = 0.0f32;
        for _ in 0..300 {
            let out = engine.frame(0.02, &mut host);
            elapsed += 0.02;
            if out
                .events
                .iter()
                .any(|e| matches!(e, MotionEvent::TimelineCompleted { .. }))
            {
                completed_at = Some(elapsed);
                break;
            }
        }
        let completed_at = completed_at.expect("timeline should complete");
        assert!(completed_at >= 3.5 - 1e-3, "n={n} finished early at {completed_at}");
        assert!(completed_at <= 3.5 + 0.05, "n={n} finished late at {completed_at}");
        for key in cards(n) {
            assert_eq!(host.get_f32(&key, "opacity"), Some(1.0));
        }
    }
}
