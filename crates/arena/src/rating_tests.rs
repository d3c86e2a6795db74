use super::*;

#[test]
fn test_expected_score_equal_ratings() {
    // Equal ratings should give 50% expected score
    let expected = expected_score(1000, 1000);
    assert!((expected - 0.5).abs() < 0.001);
}

#[test]
fn test_expected_scores_are_complementary() {
    let a = expected_score(1400, 1600);
    let b = expected_score(1600, 1400);
    assert!((a + b - 1.0).abs() < 1e-12);
    assert!(a < 0.5);
}

#[test]
fn test_equal_ratings_k32() {
    let update = update_ratings(1000, 1000, 32.0);
    assert_eq!(update.delta, RatingDelta { winner: 16, loser: -16 });
    assert_eq!(update.winner_rating, 1016);
    assert_eq!(update.loser_rating, 984);
}

#[test]
fn test_upset_moves_more_than_expected_win() {
    let upset = compute_deltas(1400, 1600, K_FACTOR);
    let favourite = compute_deltas(1600, 1400, K_FACTOR);
    assert!(upset.winner > favourite.winner);
    assert!(favourite.winner > 0);
}

#[test]
fn test_deltas_are_zero_sum_before_clamp() {
    for winner in (0..3000).step_by(37) {
        for loser in (0..3000).step_by(41) {
            for k in [1.0, 16.0, 24.0, 32.0, 40.0, 64.0] {
                let d = compute_deltas(winner, loser, k);
                assert_eq!(
                    d.winner, -d.loser,
                    "winner {} loser {} k {}",
                    winner, loser, k
                );
                assert!(d.winner >= 0);
            }
        }
    }
}

#[test]
fn test_ratings_never_negative() {
    // Near-equal pair at the floor: deltas are +-16, so the loser clamps
    let update = update_ratings(10, 5, 32.0);
    assert_eq!(update.delta.winner, 16);
    assert_eq!(update.loser_rating, 0);
    assert_eq!(update.winner_rating, 26);

    // Heavy favourite: both rounded deltas are 0 and nothing moves
    let update = update_ratings(900, 5, 32.0);
    assert_eq!(update.delta.winner, 0);
    assert_eq!(update.loser_rating, 5);
    assert_eq!(update.winner_rating, 900);

    for loser in 0..40 {
        let update = update_ratings(loser + 500, loser, 64.0);
        assert!(update.loser_rating >= 0);
        assert!(update.winner_rating >= 0);
    }
}

#[test]
fn test_clamp_breaks_zero_sum_near_floor() {
    let update = update_ratings(10, 3, 32.0);
    let winner_gain = update.winner_rating - 10;
    let loser_loss = 3 - update.loser_rating;
    assert_eq!(winner_gain, update.delta.winner);
    assert_eq!(loser_loss, 3);
    assert!(winner_gain > loser_loss);
}
