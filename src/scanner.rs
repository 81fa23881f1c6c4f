//! Peak Recogniser and Window Resolver: the main single-pass loop and the
//! amortised neighbour search it drives on every detected peak.

use crate::config::DetectorConfig;
use crate::error::{PeakError, Result};
use crate::observer::{NullObserver, ScanObserver};
use crate::slope::{classify, Slope};
use crate::stacks::{IndexStack, PlateauStack, SkipMap};

/// A reusable scan context.
///
/// Processing many same-length (or similarly-sized) signals through a
/// single `Scanner` avoids reallocating the landmark stacks and the skip
/// map on every call — [`Scanner::scan`] resets its scratch buffers in
/// place rather than dropping and rebuilding them.
#[derive(Debug, Default)]
pub struct Scanner {
    prev_stack: IndexStack,
    next_stack: IndexStack,
    plateau: PlateauStack,
    skip: SkipMap,
}

impl Scanner {
    pub fn new() -> Self {
        Scanner {
            prev_stack: IndexStack::new(),
            next_stack: IndexStack::new(),
            plateau: PlateauStack::new(),
            skip: SkipMap::new(0),
        }
    }

    /// Runs a scan with the default (no-op) observer.
    pub fn scan(&mut self, samples: &[f64], config: DetectorConfig) -> Result<Vec<u32>> {
        self.scan_with_observer(samples, config, &mut NullObserver)
    }

    /// Runs a scan, forwarding every notable event to `observer`.
    pub fn scan_with_observer<O: ScanObserver>(
        &mut self,
        samples: &[f64],
        config: DetectorConfig,
        observer: &mut O,
    ) -> Result<Vec<u32>> {
        let cap: i64 = match config.cap_win_size {
            Some(c) if c < 0 => return Err(PeakError::NegativeCap(c)),
            Some(c) => c,
            None => i64::MAX,
        };

        let n = samples.len();
        let mut out = vec![0u32; n];
        if n <= 1 {
            return Ok(out);
        }

        self.prev_stack = IndexStack::new();
        self.next_stack = IndexStack::new();
        self.plateau = PlateauStack::new();
        self.skip = SkipMap::new(n);

        let mut prev_diff: Option<Slope> = None;
        let mut i = 0;
        while i < n - 1 {
            if self.skip.get(i) {
                prev_diff = Some(classify(samples[i], samples[i + 1]));
                i += 1;
                continue;
            }

            self.prev_stack.advance_prev(i);
            self.next_stack.advance_next(i);
            let loc = self.plateau.locate(i);

            let curr_diff = classify(samples[i], samples[i + 1]);
            observer.slope_token(i, curr_diff);

            match (prev_diff, curr_diff) {
                (None, _) | (Some(Slope::Decreasing), _) => {
                    self.prev_stack.push(i);
                    observer.push_prev(i);
                }
                (Some(Slope::Flat), Slope::Decreasing) => {
                    self.prev_stack.push(i);
                    observer.push_prev(i);
                    if loc.in_plateau {
                        let start = self.plateau.start_at(loc.boundary_pos);
                        self.plateau.close(i);
                        observer.close_plateau(start, i);
                        let center = (start + i) / 2;
                        let winsize = self.window_resolver(samples, center, cap, observer);
                        out[center] = winsize;
                        observer.emit_peak(center, winsize);
                    }
                }
                (Some(Slope::Flat), Slope::Flat) => {}
                (Some(Slope::Flat), Slope::Increasing) => {
                    self.plateau.cancel_open();
                }
                (Some(Slope::Increasing), Slope::Decreasing) => {
                    self.prev_stack.push(i);
                    observer.push_prev(i);
                    let winsize = self.window_resolver(samples, i, cap, observer);
                    out[i] = winsize;
                    observer.emit_peak(i, winsize);
                }
                (Some(Slope::Increasing), Slope::Flat) => {
                    self.plateau.open(i);
                    observer.open_plateau(i);
                }
                (Some(Slope::Increasing), Slope::Increasing) => {}
            }

            prev_diff = Some(curr_diff);
            i += 1;
        }
        out[n - 1] = 0;
        Ok(out)
    }

    /// Computes the symmetric half-window for the peak centred at
    /// `peak_center`, advancing the forward lookahead cursor (and, as a
    /// byproduct, the `next` stack, the plateau stack, and the skip map)
    /// as far as it needs to go to find the nearest strictly-greater
    /// sample on each side, or the signal's edge.
    fn window_resolver<O: ScanObserver>(
        &mut self,
        samples: &[f64],
        peak_center: usize,
        cap: i64,
        observer: &mut O,
    ) -> u32 {
        let mut winsize: i64 = 1;
        let mut accumulated: i64 = 0;

        let left_half = self.left_half(samples, peak_center, cap, accumulated);
        winsize += left_half;
        accumulated += left_half;

        let right_half = self.right_half(samples, peak_center, cap, accumulated, observer);
        winsize += right_half;

        winsize.clamp(0, cap) as u32
    }

    fn left_half(&self, samples: &[f64], peak_center: usize, cap: i64, accumulated: i64) -> i64 {
        let mut j = self.prev_stack.prev_cursor();
        while j >= 0 {
            let p = self.prev_stack.as_slice()[j as usize];
            let dist = peak_center as i64 - p as i64 - 1;
            let remaining = (cap - 1 - accumulated).max(0);
            if dist > remaining {
                return remaining;
            }
            if samples[p] > samples[peak_center] {
                return dist;
            }
            j -= 1;
        }
        let dist = peak_center as i64;
        let remaining = (cap - 1 - accumulated).max(0);
        dist.min(remaining)
    }

    fn right_half<O: ScanObserver>(
        &mut self,
        samples: &[f64],
        peak_center: usize,
        cap: i64,
        accumulated: i64,
        observer: &mut O,
    ) -> i64 {
        let n = samples.len();
        let start = self.next_stack.next_forward_start();
        for &q in &self.next_stack.as_slice()[start..] {
            let dist = q as i64 - peak_center as i64 - 1;
            let remaining = (cap - 1 - accumulated).max(0);
            if dist >= remaining {
                return remaining;
            }
            if samples[q] > samples[peak_center] {
                return dist;
            }
        }

        // The `next` stack is never actually populated by this scanner (see
        // the module docs on the amortisation this buys nothing for), so
        // the loop above never finds anything and every peak falls through
        // to a forward lookahead from its own position.
        let mut jj = self
            .next_stack
            .last()
            .map(|t| t + 1)
            .unwrap_or(peak_center + 1)
            .max(peak_center + 1);
        while jj < n {
            if jj < n - 1 {
                let pc = classify(samples[jj], samples[jj + 1]);
                let pp = classify(samples[jj - 1], samples[jj]);
                // Mirrors exactly what the main loop's own dispatch would do
                // for this (pp, pc) pair, except plateau mutation: that is
                // left to the main loop once it reaches jj for real (guarded
                // by skip[jj] == false), since redoing it here could corrupt
                // a plateau opened by bookkeeping unrelated to this lookahead.
                match pp {
                    Slope::Decreasing => {
                        self.prev_stack.push(jj);
                        observer.push_prev(jj);
                        self.skip.set(jj, true);
                    }
                    Slope::Flat => match pc {
                        Slope::Decreasing => {
                            self.prev_stack.push(jj);
                            observer.push_prev(jj);
                            self.skip.set(jj, false);
                        }
                        Slope::Flat => self.skip.set(jj, true),
                        Slope::Increasing => self.skip.set(jj, false),
                    },
                    Slope::Increasing => match pc {
                        Slope::Decreasing => {
                            self.prev_stack.push(jj);
                            observer.push_prev(jj);
                            self.skip.set(jj, false);
                        }
                        Slope::Flat => self.skip.set(jj, false),
                        Slope::Increasing => self.skip.set(jj, true),
                    },
                }
            }
            let dist = jj as i64 - peak_center as i64 - 1;
            let remaining = (cap - 1 - accumulated).max(0);
            if dist > remaining {
                return remaining;
            }
            if samples[jj] > samples[peak_center] {
                return dist;
            }
            jj += 1;
        }
        let dist = n as i64 - peak_center as i64 - 1;
        let remaining = (cap - 1 - accumulated).max(0);
        dist.min(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unbounded() -> DetectorConfig {
        DetectorConfig::new()
    }

    fn scan(samples: &[f64], config: DetectorConfig) -> Vec<u32> {
        Scanner::new().scan(samples, config).unwrap()
    }

    #[test]
    fn empty_input() {
        assert_eq!(scan(&[], unbounded()), Vec::<u32>::new());
    }

    #[test]
    fn single_sample() {
        assert_eq!(scan(&[1.0], unbounded()), vec![0]);
    }

    #[test]
    fn simple_triangle_peak() {
        assert_eq!(scan(&[1.0, 2.0, 1.0], unbounded()), vec![0, 3, 0]);
    }

    #[test]
    fn peak_unexceeded_either_side_spans_full_signal() {
        let input = [0.0, 1.0, 2.0, 3.0, 2.0, 1.0, 0.0];
        assert_eq!(scan(&input, unbounded()), vec![0, 0, 0, 7, 0, 0, 0]);
    }

    #[test]
    fn plateau_centres_on_floor_midpoint() {
        let input = [0.0, 1.0, 1.0, 1.0, 0.0];
        assert_eq!(scan(&input, unbounded()), vec![0, 0, 5, 0, 0]);
    }

    #[test]
    fn two_peaks_of_equal_height_each_see_the_other_as_not_strictly_greater() {
        let input = [0.0, 1.0, 2.0, 1.0, 2.0, 1.0, 0.0];
        assert_eq!(scan(&input, unbounded()), vec![0, 0, 7, 0, 7, 0, 0]);
    }

    #[test]
    fn cap_clamps_both_peaks() {
        let input = [0.0, 2.0, 1.0, 3.0, 1.0, 0.0];
        let cfg = DetectorConfig::new().with_cap(2);
        assert_eq!(scan(&input, cfg), vec![0, 2, 0, 2, 0, 0]);
    }

    #[test]
    fn negative_cap_is_rejected_before_any_buffer_allocates() {
        let err = Scanner::new()
            .scan(&[1.0, 2.0, 1.0], DetectorConfig::new().with_cap(-5))
            .unwrap_err();
        assert_eq!(err, PeakError::NegativeCap(-5));
    }

    #[test]
    fn nan_region_reads_as_flat_and_never_peaks() {
        let nan = f64::NAN;
        let input = [1.0, nan, 2.0, nan, 1.0];
        assert_eq!(scan(&input, unbounded()), vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn cancelled_plateau_has_no_peak() {
        // flat stretch [1, 2] followed by a rise, not a fall: cancelled.
        let input = [0.0, 1.0, 1.0, 2.0, 3.0];
        assert_eq!(scan(&input, unbounded()), vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn scanner_is_reusable_across_differently_shaped_signals() {
        let mut scanner = Scanner::new();
        let cfg = unbounded();
        assert_eq!(
            scanner.scan(&[0.0, 1.0, 0.0], cfg).unwrap(),
            vec![0, 3, 0]
        );
        assert_eq!(
            scanner.scan(&[0.0, 1.0, 2.0, 1.0, 0.0], cfg).unwrap(),
            vec![0, 0, 5, 0, 0]
        );
    }

    #[test]
    fn sawtooth_regression_with_plateau_after_an_earlier_lookahead() {
        // A previous peak's forward lookahead must not corrupt a later,
        // unrelated plateau sitting on top of the plateau stack.
        let input = [
            0.0, 1.0, -2.0, -1.0, -3.0, -3.0, 1.0, 4.0, 4.0, 3.0, -1.0, -1.0, 1.0, 3.0, 2.0,
        ];
        let expected = vec![0, 7, 0, 4, 0, 0, 0, 15, 0, 0, 0, 0, 0, 6, 0];
        assert_eq!(scan(&input, unbounded()), expected);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn nearest_strictly_greater_left(samples: &[f64], i: usize) -> Option<usize> {
            (0..i).rev().find(|&k| samples[k] > samples[i])
        }

        fn nearest_strictly_greater_right(samples: &[f64], i: usize) -> Option<usize> {
            (i + 1..samples.len()).find(|&k| samples[k] > samples[i])
        }

        proptest! {
            #[test]
            fn length_preservation(
                samples in proptest::collection::vec(-1e6f64..1e6, 0..64),
                cap in 0u32..32,
            ) {
                let out = scan(&samples, unbounded().with_cap(cap as i64));
                prop_assert_eq!(out.len(), samples.len());
            }

            #[test]
            fn boundary_zeros(
                samples in proptest::collection::vec(-1e6f64..1e6, 2..64),
            ) {
                let out = scan(&samples, unbounded());
                prop_assert_eq!(out[0], 0);
                prop_assert_eq!(*out.last().unwrap(), 0);
            }

            #[test]
            fn cap_is_respected(
                samples in proptest::collection::vec(-1e6f64..1e6, 0..64),
                cap in 0u32..32,
            ) {
                let out = scan(&samples, unbounded().with_cap(cap as i64));
                for &w in &out {
                    prop_assert!(w <= cap);
                }
            }

            #[test]
            fn determinism(
                samples in proptest::collection::vec(-1e6f64..1e6, 0..64),
                cap in 0u32..32,
            ) {
                let cfg = unbounded().with_cap(cap as i64);
                let a = scan(&samples, cfg);
                let b = scan(&samples, cfg);
                prop_assert_eq!(a, b);
            }

            #[test]
            fn peak_validity_against_a_naive_nearest_greater_scan(
                samples in proptest::collection::vec(-100f64..100.0, 3..48),
            ) {
                let out = scan(&samples, unbounded());
                for (i, &w) in out.iter().enumerate() {
                    if w == 0 {
                        continue;
                    }
                    let l = nearest_strictly_greater_left(&samples, i).map(|k| k + 1).unwrap_or(0);
                    let r = nearest_strictly_greater_right(&samples, i)
                        .map(|k| k - 1)
                        .unwrap_or(samples.len() - 1);
                    prop_assert!(l <= i && i <= r);
                    for k in l..=r {
                        prop_assert!(samples[i] >= samples[k]);
                    }
                    let expected = 1 + (i - l) + (r - i);
                    prop_assert_eq!(w as usize, expected);
                }
            }
        }
    }
}
