//! Shannon entropy estimation for encoder-side rate decisions.
//!
//! The estimates model the cost of the downstream symbol coder without
//! running it: data bits from the empirical symbol distribution plus an
//! approximation of the rANS frequency table size.

/// Snapshot of the tracked symbol distribution.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntropyData {
    pub entropy_norm: f64,
    pub num_values: u64,
    pub max_symbol: u32,
    pub num_unique_symbols: u32,
}

/// Incrementally tracks the entropy of a stream of unsigned symbols.
///
/// `peek` evaluates the distribution as if the symbols were added without
/// mutating the tracker; `push` commits them.
#[derive(Debug, Default)]
pub struct ShannonEntropyTracker {
    frequencies: Vec<u64>,
    data: EntropyData,
}

impl ShannonEntropyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, symbols: &[u32]) -> EntropyData {
        self.update(symbols, true)
    }

    pub fn peek(&mut self, symbols: &[u32]) -> EntropyData {
        self.update(symbols, false)
    }

    fn update(&mut self, symbols: &[u32], push_changes: bool) -> EntropyData {
        let mut data = self.data;
        data.num_values += symbols.len() as u64;
        for &symbol in symbols {
            if self.frequencies.len() <= symbol as usize {
                self.frequencies.resize(symbol as usize + 1, 0);
            }
            // Update the entropy norm for the new frequency of |symbol|.
            let frequency = self.frequencies[symbol as usize];
            if frequency > 1 {
                data.entropy_norm -= frequency as f64 * (frequency as f64).log2();
            }
            if frequency == 0 {
                data.num_unique_symbols += 1;
                if symbol > data.max_symbol {
                    data.max_symbol = symbol;
                }
            }
            self.frequencies[symbol as usize] = frequency + 1;
            let new_frequency = frequency + 1;
            if new_frequency > 1 {
                data.entropy_norm += new_frequency as f64 * (new_frequency as f64).log2();
            }
        }
        if push_changes {
            self.data = data;
        } else {
            // Roll the frequency table back; |data| keeps the peeked values.
            for &symbol in symbols {
                self.frequencies[symbol as usize] -= 1;
            }
        }
        data
    }

    /// Estimated bits needed to store the distribution in |data|.
    pub fn estimated_bits(data: &EntropyData) -> i64 {
        Self::data_bits(data) + Self::table_bits(data)
    }

    fn data_bits(data: &EntropyData) -> i64 {
        if data.num_values < 2 {
            return 0;
        }
        let num_values = data.num_values as f64;
        (num_values * num_values.log2() - data.entropy_norm).ceil() as i64
    }

    fn table_bits(data: &EntropyData) -> i64 {
        approximate_rans_frequency_table_bits(
            data.max_symbol as i64 + 1,
            data.num_unique_symbols as i64,
        )
    }
}

/// Approximate size of a rANS frequency table for symbols in
/// `[0, max_value)` of which |num_unique_symbols| actually occur.
pub fn approximate_rans_frequency_table_bits(max_value: i64, num_unique_symbols: i64) -> i64 {
    // Table entries for used symbols plus run-length coded zero spans.
    let table_zero_frequency_bits =
        8 * (num_unique_symbols + (max_value - num_unique_symbols) / 64);
    8 * num_unique_symbols + table_zero_frequency_bits
}

/// Per-value entropy of a binary stream with |num_true| set values.
pub fn binary_entropy(num_values: u64, num_true: u64) -> f64 {
    if num_values == 0 || num_true == 0 || num_true == num_values {
        return 0.0;
    }
    let p_true = num_true as f64 / num_values as f64;
    let p_false = 1.0 - p_true;
    -(p_true * p_true.log2() + p_false * p_false.log2())
}

/// Maps a signed value onto the unsigned symbol alphabet.
///
/// Non-negative values go to even symbols, negative to odd, so small
/// magnitudes keep small symbols. Magnitudes beyond the alphabet saturate
/// at its top instead of wrapping, keeping the mapping monotone.
pub fn symbol_for_signed(value: i64) -> u32 {
    const MAX_MAGNITUDE: u64 = (u32::MAX >> 1) as u64;
    let magnitude = value.unsigned_abs().min(MAX_MAGNITUDE) as u32;
    if value >= 0 {
        magnitude << 1
    } else {
        (magnitude << 1) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_symbol_stream_needs_no_data_bits() {
        let mut tracker = ShannonEntropyTracker::new();
        let data = tracker.push(&[5, 5, 5, 5]);
        let bits = ShannonEntropyTracker::estimated_bits(&data);
        // Only table bits remain for a zero-entropy stream.
        assert_eq!(
            bits,
            approximate_rans_frequency_table_bits(6, 1)
        );
    }

    #[test]
    fn test_peek_does_not_mutate() {
        let mut tracker = ShannonEntropyTracker::new();
        tracker.push(&[0, 1, 2]);
        let peeked = tracker.peek(&[3, 3, 3]);
        let pushed = tracker.push(&[3, 3, 3]);
        assert_eq!(peeked.num_values, pushed.num_values);
        assert_eq!(peeked.num_unique_symbols, pushed.num_unique_symbols);
        assert!((peeked.entropy_norm - pushed.entropy_norm).abs() < 1e-9);
    }

    #[test]
    fn test_uniform_distribution_costs_more_than_skewed() {
        let mut uniform = ShannonEntropyTracker::new();
        let u = uniform.push(&[0, 1, 2, 3, 0, 1, 2, 3]);
        let mut skewed = ShannonEntropyTracker::new();
        let s = skewed.push(&[0, 0, 0, 0, 0, 0, 0, 3]);
        assert!(
            ShannonEntropyTracker::estimated_bits(&u)
                > ShannonEntropyTracker::estimated_bits(&s)
        );
    }

    #[test]
    fn test_binary_entropy_bounds() {
        assert_eq!(binary_entropy(10, 0), 0.0);
        assert_eq!(binary_entropy(10, 10), 0.0);
        assert!((binary_entropy(10, 5) - 1.0).abs() < 1e-12);
        assert!(binary_entropy(10, 1) < 1.0);
    }

    #[test]
    fn test_symbol_for_signed_interleaves() {
        assert_eq!(symbol_for_signed(0), 0);
        assert_eq!(symbol_for_signed(-1), 1);
        assert_eq!(symbol_for_signed(1), 2);
        assert_eq!(symbol_for_signed(-2), 3);
        assert_eq!(symbol_for_signed(2), 4);
    }

    #[test]
    fn test_symbol_for_signed_saturates_instead_of_wrapping() {
        let top = i64::from(u32::MAX >> 1);
        assert_eq!(symbol_for_signed(top), u32::MAX - 1);
        assert_eq!(symbol_for_signed(top + 1), u32::MAX - 1);
        assert_eq!(symbol_for_signed(i64::MAX), u32::MAX - 1);
        assert_eq!(symbol_for_signed(-top), u32::MAX - 2);
        assert_eq!(symbol_for_signed(i64::MIN), u32::MAX - 2);
        // Monotone across the saturation point.
        assert!(symbol_for_signed(top - 1) < symbol_for_signed(top + 1));
    }
}
