use crate::adpcm_ima::{greedy_nibble, ChannelState};

/// Default number of upcoming samples the encoder looks at when choosing a code.
pub const DEFAULT_LOOKAHEAD: usize = 3;

/// Interleaved samples the lookahead search reads its upcoming targets from.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Upcoming<'a> {
    pub samples: &'a [i16],
    /// Position of the sample currently being encoded.
    pub position: usize,
    /// Distance between consecutive samples of the same channel.
    pub stride: usize,
}

impl<'a> Upcoming<'a> {
    fn next(self) -> (i32, Upcoming<'a>) {
        let position = self.position + self.stride;
        (i32::from(self.samples[position]), Upcoming { position, ..self })
    }
}

/// Chooses the code for `target` that minimizes the squared reconstruction error summed
/// over `depth` upcoming samples.
///
/// `state` is never modified; every candidate is tried on a copy. The greedy code is
/// always explored to full depth, the other 15 codes only when their immediate error
/// already beats the best total so far. Ties keep the earlier candidate.
///
/// Returns the best code and its total error.
pub(crate) fn minimum_error(state: &ChannelState, target: i32, upcoming: Upcoming,
    depth: usize) -> (u8, i64) {

    let squared_error = |sample: i16| {
        let diff = i64::from(sample) - i64::from(target);
        diff * diff
    };

    let greedy = greedy_nibble(target - i32::from(state.sample), state.step_size());
    let mut trial = *state;
    let mut best = (greedy, squared_error(trial.apply_nibble(greedy)));
    if depth == 0 {
        return best;
    }
    let (next_target, next) = upcoming.next();
    best.1 += minimum_error(&trial, next_target, next, depth - 1).1;

    for nibble in (0..=0x0f).filter(|&n| n != greedy) {
        let mut trial = *state;
        let mut error = squared_error(trial.apply_nibble(nibble));
        if error < best.1 {
            error += minimum_error(&trial, next_target, next, depth - 1).1;
            if error < best.1 {
                best = (nibble, error);
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    // exhaustive search over every code sequence, for comparison
    fn exhaustive(state: &ChannelState, targets: &[i32]) -> i64 {
        let Some((&target, rest)) = targets.split_first() else {
            return 0;
        };
        (0..16u8).map(|nibble| {
            let mut trial = *state;
            let diff = i64::from(trial.apply_nibble(nibble)) - i64::from(target);
            diff * diff + exhaustive(&trial, rest)
        }).min().unwrap_or(0)
    }

    #[test]
    fn test_depth_zero_is_greedy() {
        let state = ChannelState::new(0, 20);
        let samples = [0i16, 0];
        let upcoming = Upcoming { samples: &samples, position: 0, stride: 1 };
        // step 50: 4 * 60 / 50 = 4
        let (nibble, error) = minimum_error(&state, 60, upcoming, 0);
        assert_eq!(nibble, 0x4);
        // reconstructed 6 + 50 = 56
        assert_eq!(error, 16);
    }

    #[test]
    fn test_exact_target_is_kept() {
        // a target the greedy code reconstructs exactly cannot be beaten
        let state = ChannelState::new(0, 0);
        let samples = [0i16; 8];
        let upcoming = Upcoming { samples: &samples, position: 0, stride: 1 };
        assert_eq!(minimum_error(&state, 0, upcoming, 3), (0x0, 0));
    }

    #[test]
    fn test_lookahead_never_worse_than_greedy_path() {
        let samples = [0i16, 900, 1800, 1500, -200, -2500, 3000, 10];
        for step_index in [0u8, 10, 30, 50] {
            for position in 0..4 {
                let state = ChannelState::new(samples[position], step_index);
                let upcoming = Upcoming { samples: &samples, position, stride: 1 };
                let target = i32::from(samples[position + 1]);
                let (_, searched) = minimum_error(&state, target,
                    Upcoming { position: position + 1, ..upcoming }, 3);

                // follow the greedy code for all four samples
                let mut greedy_state = state;
                let mut greedy_error = 0;
                for &s in &samples[position + 1..position + 5] {
                    let nibble = greedy_nibble(i32::from(s) - i32::from(greedy_state.sample),
                        greedy_state.step_size());
                    let diff = i64::from(greedy_state.apply_nibble(nibble)) - i64::from(s);
                    greedy_error += diff * diff;
                }
                assert!(searched <= greedy_error);

                // and the pruned search never beats the exhaustive optimum
                let targets: Vec<i32> = samples[position + 1..position + 5].iter()
                    .map(|&s| i32::from(s)).collect();
                assert!(searched >= exhaustive(&state, &targets));
            }
        }
    }

    #[test]
    fn test_search_reads_only_its_channel() {
        // stereo interleaving: the right channel values must not influence the left search
        let left = [0i16, 400, 800, 1200];
        let mut a = Vec::new();
        let mut b = Vec::new();
        for &l in &left {
            a.extend_from_slice(&[l, 30000]);
            b.extend_from_slice(&[l, -30000]);
        }
        let state = ChannelState::new(0, 15);
        let result_a = minimum_error(&state, 400,
            Upcoming { samples: &a, position: 2, stride: 2 }, 2);
        let result_b = minimum_error(&state, 400,
            Upcoming { samples: &b, position: 2, stride: 2 }, 2);
        assert_eq!(result_a, result_b);
    }

    #[test]
    fn test_state_is_not_modified() {
        let state = ChannelState {
            sample: 100,
            step_index: 40,
            shaping_history: [1, 2],
            shaping_weight: 3,
            shaping_error: 4,
        };
        let copy = state;
        let samples = [100i16, -3000, 5000, 0];
        minimum_error(&state, -3000, Upcoming { samples: &samples, position: 1, stride: 1 }, 2);
        assert_eq!(state, copy);
    }
}
