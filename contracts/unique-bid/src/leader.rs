//! Highest-unique-number selection.
//!
//! Recomputed from scratch on every call. Works on seats: positions in the
//! round's roster, where `numbers[seat]` is the number revealed from that seat
//! (0 when never revealed). Seats are ranked by number, highest first, then
//! groups of equal numbers are walked from the top. The first group of exactly
//! one seat is the leader. Tied groups are skipped whole, so a tie at the top
//! hands the lead to the next distinct number down.

use soroban_sdk::{Env, Vec};

/// Order seats by their number, descending.
///
/// Binary-search insertion into a fresh `Vec`. Seats with equal numbers keep
/// commit order; ties never lead, so the order among them does not matter.
pub fn rank_seats(env: &Env, numbers: &Vec<u32>) -> Vec<u32> {
    let mut ranked: Vec<u32> = Vec::new(env);

    for seat in 0..numbers.len() {
        let number = numbers.get_unchecked(seat);

        // First position holding a strictly lower number.
        let mut lo = 0u32;
        let mut hi = ranked.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if numbers.get_unchecked(ranked.get_unchecked(mid)) >= number {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        ranked.insert(lo, seat);
    }

    ranked
}

/// Pick the seat whose number no other seat shares, highest such number first.
///
/// `ranked` must come from [`rank_seats`] over the same `numbers`. Unrevealed
/// seats (0) never lead, even when alone, and since 0 sorts last the scan
/// stops at the first one.
pub fn unique_highest(numbers: &Vec<u32>, ranked: &Vec<u32>) -> Option<u32> {
    let len = ranked.len();
    let mut start = 0u32;

    while start < len {
        let seat = ranked.get_unchecked(start);
        let number = numbers.get_unchecked(seat);
        if number == 0 {
            return None;
        }

        let mut end = start + 1;
        while end < len && numbers.get_unchecked(ranked.get_unchecked(end)) == number {
            end += 1;
        }

        if end - start == 1 {
            return Some(seat);
        }
        start = end;
    }

    None
}
