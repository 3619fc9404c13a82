//! Start-slot inference.
//!
//! Picks the most promising slot for a tag inside a search window while
//! steering away from slots that were suggested moments ago.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::field::ProbabilityField;
use crate::slot::clamp_slot;

/// Slots recorded per suggestion: the chosen slot and its two neighbours.
pub const SLOTS_PER_SUGGESTION: usize = 3;

/// Offset of the first fallback candidate from the window start.
const FALLBACK_OFFSET: usize = 6;

/// Score given to recently suggested slots while scanning.
const RECENT_PENALTY: f64 = -1.0;

/// Fixed-size history of recently suggested slots, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentWindow(VecDeque<i64>);

impl RecentWindow {
    /// Window of `size` entries, all zero.
    pub fn new(size: usize) -> Self {
        Self(std::iter::repeat(0).take(size).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, slot: usize) -> bool {
        self.0.contains(&(slot as i64))
    }

    pub fn entries(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }

    /// Forget the oldest suggestion and remember `chosen` with its neighbours.
    ///
    /// The window keeps its length.
    pub fn record(&mut self, chosen: usize) {
        let chosen = chosen as i64;
        let size = self.0.len();
        for slot in [chosen - 1, chosen, chosen + 1] {
            self.0.push_back(slot);
        }
        while self.0.len() > size {
            self.0.pop_front();
        }
    }
}

/// Inclusive slot range to search, already clamped to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub lo: usize,
    pub hi: usize,
}

impl SearchWindow {
    /// `after` defaults to slot 0 and `before` to `lookahead` slots past it.
    ///
    /// A `before` earlier than `after` collapses the window to `lo`.
    pub fn resolve(before: Option<i64>, after: Option<i64>, lookahead: u32, len: usize) -> Self {
        let lo_raw = after.unwrap_or(0);
        let hi_raw = before.unwrap_or(lo_raw + i64::from(lookahead));
        let lo = clamp_slot(lo_raw, len);
        let hi = clamp_slot(hi_raw, len).max(lo);
        Self { lo, hi }
    }
}

/// Choose a slot for `field` inside `window`.
///
/// An untrained field has nothing to scan, so one of three early slots
/// (`lo + 6`, `lo + 9`, `lo + 12`) is drawn instead. Otherwise the first
/// slot with the highest probability wins, with recent slots scored as
/// `-1.0`; when every candidate is recent the first one is returned.
pub fn choose_slot<R: Rng>(
    field: &ProbabilityField,
    window: SearchWindow,
    recent: &RecentWindow,
    rng: &mut R,
) -> usize {
    let chosen = if field.is_uniform() {
        let step = rng.gen_range(0..SLOTS_PER_SUGGESTION);
        window.lo + FALLBACK_OFFSET + step * SLOTS_PER_SUGGESTION
    } else {
        let mut best = window.lo;
        let mut best_score = f64::NEG_INFINITY;
        for slot in window.lo..=window.hi {
            let score = if recent.contains(slot) {
                RECENT_PENALTY
            } else {
                field.get(slot).unwrap_or(RECENT_PENALTY)
            };
            if score > best_score {
                best = slot;
                best_score = score;
            }
        }
        best
    };
    clamp_slot(chosen as i64, field.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    fn rng() -> Mcg128Xsl64 {
        Mcg128Xsl64::seed_from_u64(7)
    }

    fn field_with_peak(len: usize, peak: usize) -> ProbabilityField {
        let values = (0..len)
            .map(|i| 0.9 - (i as f64 - peak as f64).abs() * 0.00001)
            .collect();
        ProbabilityField::from_values(values)
    }

    #[test]
    fn window_defaults() {
        assert_eq!(
            SearchWindow::resolve(None, None, 2016, 8640),
            SearchWindow { lo: 0, hi: 2016 }
        );
        assert_eq!(
            SearchWindow::resolve(None, Some(100), 2016, 8640),
            SearchWindow { lo: 100, hi: 2116 }
        );
        assert_eq!(
            SearchWindow::resolve(Some(300), Some(100), 2016, 8640),
            SearchWindow { lo: 100, hi: 300 }
        );
    }

    #[test]
    fn window_is_clamped() {
        assert_eq!(
            SearchWindow::resolve(None, Some(8000), 2016, 8640),
            SearchWindow { lo: 8000, hi: 8639 }
        );
        assert_eq!(
            SearchWindow::resolve(Some(50), Some(-20), 2016, 8640),
            SearchWindow { lo: 0, hi: 50 }
        );
        assert_eq!(
            SearchWindow::resolve(Some(10), Some(90), 2016, 8640),
            SearchWindow { lo: 90, hi: 90 }
        );
    }

    #[test]
    fn uniform_field_uses_early_fallback() {
        let field = ProbabilityField::uniform(8640);
        let recent = RecentWindow::new(9);
        let window = SearchWindow::resolve(None, Some(0), 2016, 8640);
        let mut rng = rng();
        for _ in 0..50 {
            let slot = choose_slot(&field, window, &recent, &mut rng);
            assert!([6, 9, 12].contains(&slot), "unexpected fallback slot {slot}");
        }
    }

    #[test]
    fn uniform_fallback_is_relative_to_window_start() {
        let field = ProbabilityField::uniform(8640);
        let window = SearchWindow::resolve(None, Some(288), 2016, 8640);
        let slot = choose_slot(&field, window, &RecentWindow::new(9), &mut rng());
        assert!([294, 297, 300].contains(&slot));
    }

    #[test]
    fn fallback_near_the_end_is_clamped() {
        let field = ProbabilityField::uniform(100);
        let window = SearchWindow::resolve(None, Some(99), 2016, 100);
        assert_eq!(choose_slot(&field, window, &RecentWindow::new(9), &mut rng()), 99);
    }

    #[test]
    fn picks_highest_probability() {
        let field = field_with_peak(8640, 500);
        let window = SearchWindow::resolve(None, None, 2016, 8640);
        assert_eq!(choose_slot(&field, window, &RecentWindow::new(9), &mut rng()), 500);
    }

    #[test]
    fn first_maximum_wins() {
        let mut values = vec![0.2; 50];
        values[10] = 0.8;
        values[30] = 0.8;
        let field = ProbabilityField::from_values(values);
        let window = SearchWindow::resolve(None, None, 2016, 50);
        assert_eq!(choose_slot(&field, window, &RecentWindow::new(9), &mut rng()), 10);
    }

    #[test]
    fn peak_outside_window_is_ignored() {
        let field = field_with_peak(8640, 5000);
        let window = SearchWindow::resolve(Some(200), Some(100), 2016, 8640);
        assert_eq!(choose_slot(&field, window, &RecentWindow::new(9), &mut rng()), 200);
    }

    #[test]
    fn recent_slots_are_skipped() {
        let field = field_with_peak(8640, 500);
        let mut recent = RecentWindow::new(9);
        recent.record(500);
        let window = SearchWindow::resolve(None, None, 2016, 8640);
        let slot = choose_slot(&field, window, &recent, &mut rng());
        assert!(!(499..=501).contains(&slot));
        assert!(slot == 498 || slot == 502);
    }

    #[test]
    fn all_recent_falls_back_to_first_candidate() {
        let field = field_with_peak(100, 50);
        let mut recent = RecentWindow::new(9);
        recent.record(41);
        let window = SearchWindow::resolve(Some(42), Some(40), 2016, 100);
        assert_eq!(choose_slot(&field, window, &recent, &mut rng()), 40);
    }

    #[test]
    fn record_keeps_window_size() {
        let mut recent = RecentWindow::new(9);
        recent.record(10);
        recent.record(20);
        recent.record(30);
        assert_eq!(recent.len(), 9);
        assert_eq!(
            recent.entries().collect::<Vec<_>>(),
            vec![9, 10, 11, 19, 20, 21, 29, 30, 31]
        );
        recent.record(40);
        assert_eq!(recent.len(), 9);
        assert_eq!(recent.entries().next(), Some(19));
    }

    #[test]
    fn record_at_slot_zero_keeps_negative_neighbour() {
        let mut recent = RecentWindow::new(9);
        recent.record(0);
        assert_eq!(recent.entries().collect::<Vec<_>>()[6..], [-1, 0, 1]);
    }

    #[test]
    fn fresh_window_marks_slot_zero_recent() {
        let recent = RecentWindow::new(9);
        assert!(recent.contains(0));
        assert!(!recent.contains(1));
    }
}
