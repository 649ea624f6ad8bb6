#![doc = r#"
Musical time, measured in whole notes.

Onsets and durations are exact rationals so that grouping decisions made
while recovering structure (equal onsets, back-to-back notes) never depend
on floating point error. `1` is a whole note, `1/4` a quarter note.
"#]

use num_rational::Rational64;

/// A point or span of musical time in whole notes.
pub type Time = Rational64;

/// No time at all.
pub const ZERO: Time = Time::new_raw(0, 1);
/// Whole note.
pub const WN: Time = Time::new_raw(1, 1);
/// Dotted half note.
pub const DHN: Time = Time::new_raw(3, 4);
/// Half note.
pub const HN: Time = Time::new_raw(1, 2);
/// Dotted quarter note.
pub const DQN: Time = Time::new_raw(3, 8);
/// Quarter note.
pub const QN: Time = Time::new_raw(1, 4);
/// Dotted eighth note.
pub const DEN: Time = Time::new_raw(3, 16);
/// Eighth note.
pub const EN: Time = Time::new_raw(1, 8);
/// Sixteenth note.
pub const SN: Time = Time::new_raw(1, 16);
/// Thirty-second note.
pub const TN: Time = Time::new_raw(1, 32);

/// Shorthand for `numer / denom` whole notes.
///
/// # Panics
/// if `denom` is zero.
pub fn whole_notes(numer: i64, denom: i64) -> Time {
    Time::new(numer, denom)
}

/// Rounds to the nearest integer, sending exact halves to the even neighbour.
pub(crate) fn round_half_even(value: Time) -> i64 {
    let floor = value.floor().to_integer();
    let fraction = value - Time::from_integer(floor);
    let half = Time::new_raw(1, 2);
    if fraction > half || (fraction == half && floor % 2 != 0) {
        floor + 1
    } else {
        floor
    }
}

#[test]
fn rounding_sends_halves_to_even() {
    assert_eq!(round_half_even(whole_notes(1, 2)), 0);
    assert_eq!(round_half_even(whole_notes(3, 2)), 2);
    assert_eq!(round_half_even(whole_notes(5, 2)), 2);
    assert_eq!(round_half_even(whole_notes(96, 1)), 96);
    assert_eq!(round_half_even(whole_notes(384, 5)), 77);
    assert_eq!(round_half_even(whole_notes(-3, 2)), -2);
}

#[test]
fn constants_are_reduced() {
    assert_eq!(QN + QN, HN);
    assert_eq!(HN + QN, DHN);
    assert_eq!(EN + SN, DEN);
    assert_eq!(WN * whole_notes(1, 4), QN);
}
