//! Octahedral coordinate helpers for quantized unit normals.
//!
//! Normals are mapped onto the unit octahedron and stored as a pair of
//! quantized coordinates (s, t). Corrections in this space wrap modulo
//! 2^q, which keeps them well defined under the canonicalized encoding.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy)]
pub struct OctahedronToolBox {
    quantization_bits: u8,
    max_quantized_value: i32,
    max_value: i32,
    center_value: i32,
}

impl OctahedronToolBox {
    pub fn new(quantization_bits: u8) -> Result<Self> {
        if !(2..=30).contains(&quantization_bits) {
            return Err(Error::InvalidQuantizationBits(quantization_bits));
        }
        let max_quantized_value = (1 << quantization_bits) - 1;
        let max_value = max_quantized_value - 1;
        Ok(Self {
            quantization_bits,
            max_quantized_value,
            max_value,
            center_value: max_value / 2,
        })
    }

    pub fn quantization_bits(&self) -> u8 {
        self.quantization_bits
    }

    pub fn max_quantized_value(&self) -> i32 {
        self.max_quantized_value
    }

    pub fn max_value(&self) -> i32 {
        self.max_value
    }

    pub fn center_value(&self) -> i32 {
        self.center_value
    }

    /// Rescales |vec| so that |x| + |y| + |z| == center_value.
    ///
    /// Components must stay below 2^29 in magnitude so the products with
    /// center_value (< 2^30) fit in an i64.
    pub fn canonicalize_integer_vector(&self, vec: &mut [i64; 3]) {
        let abs_sum = vec[0].abs() + vec[1].abs() + vec[2].abs();
        if abs_sum == 0 {
            // Zero vectors map to (0, 0, center).
            vec[2] = i64::from(self.center_value);
        } else {
            let center = i64::from(self.center_value);
            vec[0] = vec[0] * center / abs_sum;
            vec[1] = vec[1] * center / abs_sum;
            // The z component absorbs the rounding residual, keeping the
            // original sign.
            if vec[2] >= 0 {
                vec[2] = center - vec[0].abs() - vec[1].abs();
            } else {
                vec[2] = -(center - vec[0].abs() - vec[1].abs());
            }
        }
    }

    /// Projects a canonicalized integer vector onto octahedral (s, t).
    pub fn integer_vector_to_quantized_octahedral_coords(&self, vec: &[i64; 3]) -> (i32, i32) {
        debug_assert_eq!(
            vec[0].abs() + vec[1].abs() + vec[2].abs(),
            i64::from(self.center_value)
        );
        let center = i64::from(self.center_value);
        let max = i64::from(self.max_value);
        let (s, t) = if vec[0] >= 0 {
            (vec[1] + center, vec[2] + center)
        } else {
            // Back hemisphere folds outward over the octahedron edges.
            let s = if vec[1] < 0 {
                vec[2].abs()
            } else {
                max - vec[2].abs()
            };
            let t = if vec[2] < 0 {
                vec[1].abs()
            } else {
                max - vec[1].abs()
            };
            (s, t)
        };
        self.canonicalize_octahedral_coords(s as i32, t as i32)
    }

    /// Collapses the redundant boundary encodings of the octahedral map so
    /// that equal directions always produce equal coordinates.
    pub fn canonicalize_octahedral_coords(&self, mut s: i32, mut t: i32) -> (i32, i32) {
        if (s == 0 && t == 0)
            || (s == 0 && t == self.max_value)
            || (s == self.max_value && t == 0)
        {
            s = self.max_value;
            t = self.max_value;
        } else if s == 0 && t > self.center_value {
            t = self.center_value - (t - self.center_value);
        } else if s == self.max_value && t < self.center_value {
            t = self.center_value + (self.center_value - t);
        } else if t == self.max_value && s < self.center_value {
            s = self.center_value + (self.center_value - s);
        }
        (s, t)
    }

    /// Reduces |value| modulo 2^q into [0, 2^q).
    pub fn mod_positive(&self, value: i32) -> i32 {
        value & self.max_quantized_value
    }

    /// Folds a value from [0, 2^q) into the centered interval
    /// (-2^(q-1), 2^(q-1)].
    pub fn fold_centered(&self, value: i32) -> i32 {
        let half = (self.max_quantized_value + 1) / 2;
        if value > half {
            value - (self.max_quantized_value + 1)
        } else {
            value
        }
    }
}
