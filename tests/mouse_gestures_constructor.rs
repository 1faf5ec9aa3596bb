use gesture_engine::mouse_gestures::{PatternConstructor, Vector2};

fn feed(constructor: &mut PatternConstructor, points: &[(f64, f64)]) -> usize {
    points
        .iter()
        .filter(|(x, y)| constructor.add_point(*x, *y))
        .count()
}

#[test]
fn no_points_yields_empty_pattern() {
    let constructor = PatternConstructor::new(10.0, 0.12);
    assert!(constructor.pattern().is_empty());
}

#[test]
fn single_point_yields_empty_pattern() {
    let mut constructor = PatternConstructor::new(10.0, 0.12);
    assert!(!constructor.add_point(5.0, 5.0));
    assert!(constructor.pattern().is_empty());
}

#[test]
fn collinear_points_collapse_into_one_vector() {
    for count in [3usize, 10, 100] {
        let mut constructor = PatternConstructor::new(10.0, 0.12);
        let points: Vec<(f64, f64)> = (0..count).map(|i| (i as f64 * 20.0, 0.0)).collect();
        let changes = feed(&mut constructor, &points);

        let pattern = constructor.pattern();
        assert_eq!(changes, 0);
        assert_eq!(pattern.len(), 1, "{count} points");
        assert_eq!(
            pattern.vectors()[0],
            Vector2::new((count - 1) as f64 * 20.0, 0.0)
        );
    }
}

#[test]
fn small_wobble_stays_in_one_segment() {
    let mut constructor = PatternConstructor::new(10.0, 0.12);
    let points = [(0.0, 0.0), (15.0, 0.0), (30.0, 1.0), (45.0, 0.0), (60.0, 1.0), (75.0, 0.0)];
    feed(&mut constructor, &points);

    let pattern = constructor.pattern();
    assert_eq!(pattern.len(), 1);
    assert_eq!(pattern.vectors()[0], Vector2::new(75.0, 0.0));
}

#[test]
fn right_angle_turn_yields_two_vectors() {
    let mut constructor = PatternConstructor::new(10.0, 0.12);
    let points = [
        (0.0, 0.0),
        (20.0, 0.0),
        (40.0, 0.0),
        (60.0, 0.0),
        (80.0, 0.0),
        (100.0, 0.0),
        (100.0, 20.0),
        (100.0, 40.0),
        (100.0, 60.0),
        (100.0, 80.0),
        (100.0, 100.0),
    ];
    let changes = feed(&mut constructor, &points);

    assert_eq!(changes, 1);
    assert_eq!(constructor.committed(), &[Vector2::new(100.0, 0.0)]);
    assert_eq!(
        constructor.pattern().vectors(),
        &[Vector2::new(100.0, 0.0), Vector2::new(0.0, 100.0)]
    );
}

#[test]
fn jitter_is_not_committed_but_extends_the_tail() {
    let mut constructor = PatternConstructor::new(10.0, 0.12);
    let points = [(0.0, 0.0), (3.0, 4.0), (-2.0, 3.0), (4.0, -4.0), (6.0, 8.0)];
    let changes = feed(&mut constructor, &points);

    assert_eq!(changes, 0);
    assert!(constructor.committed().is_empty());
    assert_eq!(constructor.pattern().vectors(), &[Vector2::new(6.0, 8.0)]);
}

#[test]
fn pattern_tracks_the_open_tail_while_drawing() {
    let mut constructor = PatternConstructor::new(10.0, 0.12);
    feed(&mut constructor, &[(0.0, 0.0), (20.0, 0.0), (40.0, 0.0), (40.0, 20.0)]);
    assert_eq!(
        constructor.pattern().vectors(),
        &[Vector2::new(40.0, 0.0), Vector2::new(0.0, 20.0)]
    );

    feed(&mut constructor, &[(40.0, 40.0)]);
    assert_eq!(
        constructor.pattern().vectors(),
        &[Vector2::new(40.0, 0.0), Vector2::new(0.0, 40.0)]
    );
}

#[test]
fn reversal_starts_a_new_segment() {
    let mut constructor = PatternConstructor::new(10.0, 0.12);
    feed(
        &mut constructor,
        &[(0.0, 0.0), (30.0, 0.0), (60.0, 0.0), (30.0, 0.0), (0.0, 0.0)],
    );
    assert_eq!(
        constructor.pattern().vectors(),
        &[Vector2::new(60.0, 0.0), Vector2::new(-60.0, 0.0)]
    );
}

#[test]
fn clear_allows_a_fresh_gesture() {
    let mut constructor = PatternConstructor::new(10.0, 0.12);
    feed(&mut constructor, &[(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)]);
    constructor.clear();
    assert!(constructor.pattern().is_empty());

    feed(&mut constructor, &[(200.0, 200.0), (200.0, 150.0)]);
    assert_eq!(constructor.pattern().vectors(), &[Vector2::new(0.0, -50.0)]);
}
