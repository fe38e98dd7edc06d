//! Randomness contract for a battle.
//!
//! Every random decision in a battle goes through one [`RollSource`] owned by
//! that battle. The production source is a seeded ChaCha stream. Tests feed
//! literal draws through `ScriptedRolls`, available in this crate's tests and
//! to dependents that enable the `test-util` feature.

pub trait RollSource {
    /// Uniform roll in [0, 100).
    fn roll_percent(&mut self) -> f64;

    /// Uniform value in [-1, 1), scaled by the caller.
    fn variance(&mut self) -> f64;

    /// Uniform index in [0, len). Returns 0 when `len` is 0 or 1.
    fn pick(&mut self, len: usize) -> usize;
}

#[cfg(any(test, feature = "test-util"))]
pub use scripted::{Draw, ScriptedRolls};

#[cfg(any(test, feature = "test-util"))]
mod scripted {
    use std::collections::VecDeque;

    use super::RollSource;

    /// A single scripted draw.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum Draw {
        Percent(f64),
        Variance(f64),
        Pick(usize),
    }

    /// Replays a fixed sequence of draws. When a draw of the wrong kind is at the
    /// head of the script, or the script is exhausted, neutral values are used:
    /// percent 0, variance 0, pick 0.
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedRolls {
        draws: VecDeque<Draw>,
        mismatches: usize,
    }

    impl ScriptedRolls {
        pub fn new(draws: impl IntoIterator<Item = Draw>) -> Self {
            Self {
                draws: draws.into_iter().collect(),
                mismatches: 0,
            }
        }

        pub fn push(&mut self, draw: Draw) {
            self.draws.push_back(draw);
        }

        /// Draws not yet consumed.
        pub fn remaining(&self) -> usize {
            self.draws.len()
        }

        /// Number of requests that did not match the scripted head.
        pub fn mismatches(&self) -> usize {
            self.mismatches
        }

        fn next_matching<T>(&mut self, extract: impl Fn(Draw) -> Option<T>) -> Option<T> {
            match self.draws.front().copied().and_then(&extract) {
                Some(value) => {
                    self.draws.pop_front();
                    Some(value)
                }
                None => {
                    self.mismatches += 1;
                    None
                }
            }
        }
    }

    impl RollSource for ScriptedRolls {
        fn roll_percent(&mut self) -> f64 {
            self.next_matching(|d| match d {
                Draw::Percent(v) => Some(v),
                _ => None,
            })
            .unwrap_or(0.0)
        }

        fn variance(&mut self) -> f64 {
            self.next_matching(|d| match d {
                Draw::Variance(v) => Some(v),
                _ => None,
            })
            .unwrap_or(0.0)
        }

        fn pick(&mut self, len: usize) -> usize {
            let index = self
                .next_matching(|d| match d {
                    Draw::Pick(i) => Some(i),
                    _ => None,
                })
                .unwrap_or(0);
            if len == 0 {
                0
            } else {
                index.min(len - 1)
            }
        }
    }
}
