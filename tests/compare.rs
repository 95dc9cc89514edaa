//! Winner selection and speedup ratios.

use fragsort_bench::pick_winner;

#[test]
fn fastest_competitor_wins() {
    let v = pick_winner(5.0, &[2.0, 3.0, 1.0]).unwrap();
    assert_eq!(v.winner, 3);
    assert_eq!(v.vs_runner_up, Some(2.0));
    assert_eq!(v.vs_baseline, 5.0);
}

#[test]
fn first_of_tied_minimum_wins() {
    let v = pick_winner(4.0, &[1.0, 1.0, 2.0]).unwrap();
    assert_eq!(v.winner, 1);
    assert_eq!(v.vs_runner_up, Some(1.0));
    assert_eq!(v.vs_baseline, 4.0);
}

#[test]
fn baseline_can_beat_the_winner() {
    let v = pick_winner(1.0, &[4.0, 2.0]).unwrap();
    assert_eq!(v.winner, 2);
    assert_eq!(v.vs_runner_up, Some(2.0));
    assert_eq!(v.vs_baseline, 0.5);
}

#[test]
fn lone_competitor_has_no_runner_up() {
    let v = pick_winner(3.0, &[1.5]).unwrap();
    assert_eq!(v.winner, 1);
    assert_eq!(v.vs_runner_up, None);
    assert_eq!(v.vs_baseline, 2.0);
}
