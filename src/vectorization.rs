/*
    packed complex arithmetic for the gate kernels.

    a `ComplexPair` holds two complex f64 values in two 128-bit lanes, [re, im] per lane.
    the kernels never touch the lane layout directly, they only go through the operations below.
    there is no native complex multiply, so a product is built from real multiplies,
    a lane swap and a horizontal subtract. the swapped/negated operand is what `PackedColumn`
    caches, so a matrix coefficient pays for it once per kernel call instead of once per amplitude.
*/

use num_complex::Complex64;
use std::ops::{Add, Mul};

// --- lane backend selection ---

#[cfg(target_arch = "x86_64")]
use self::x86_64_simd as lanes;

#[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
use self::aarch64_neon as lanes;

#[cfg(not(any(
    target_arch = "x86_64",
    all(target_arch = "aarch64", target_feature = "neon")
)))]
use self::scalar as lanes;

// one 128-bit register worth of f64s on the active backend, never exposed outside this module
use self::lanes::Lane;

// --- x86_64 sse2 lanes ---
// sse2 is part of the x86_64 baseline, no runtime feature detection needed.
#[cfg(target_arch = "x86_64")]
mod x86_64_simd {
    use num_complex::Complex64;
    use std::arch::x86_64::*;

    pub type Lane = __m128d;

    #[inline(always)]
    pub fn load(c: &Complex64) -> Lane {
        // Complex64 is repr(C) { re, im }
        unsafe { _mm_loadu_pd((c as *const Complex64).cast::<f64>()) }
    }

    #[inline(always)]
    pub fn store(v: Lane, c: &mut Complex64) {
        unsafe { _mm_storeu_pd((c as *mut Complex64).cast::<f64>(), v) }
    }

    #[inline(always)]
    pub fn set(lo: f64, hi: f64) -> Lane {
        unsafe { _mm_set_pd(hi, lo) }
    }

    #[inline(always)]
    pub fn splat(x: f64) -> Lane {
        unsafe { _mm_set1_pd(x) }
    }

    #[inline(always)]
    pub fn add(a: Lane, b: Lane) -> Lane {
        unsafe { _mm_add_pd(a, b) }
    }

    #[inline(always)]
    pub fn mul(a: Lane, b: Lane) -> Lane {
        unsafe { _mm_mul_pd(a, b) }
    }

    // (a0 - a1, b0 - b1)
    #[inline(always)]
    pub fn hsub(a: Lane, b: Lane) -> Lane {
        unsafe { _mm_sub_pd(_mm_unpacklo_pd(a, b), _mm_unpackhi_pd(a, b)) }
    }

    // two selector bits starting at SHIFT: bit 0 picks the source of lane 0, bit 1 of lane 1
    #[inline(always)]
    pub fn select<const SEL: u8, const SHIFT: u8>(a: Lane) -> Lane {
        unsafe {
            match (SEL >> SHIFT) & 0b11 {
                0b00 => _mm_shuffle_pd::<0b00>(a, a),
                0b01 => _mm_shuffle_pd::<0b01>(a, a),
                0b10 => a,
                _ => _mm_shuffle_pd::<0b11>(a, a),
            }
        }
    }

    #[inline(always)]
    pub fn to_array(v: Lane) -> [f64; 2] {
        let mut out = [0.0; 2];
        unsafe { _mm_storeu_pd(out.as_mut_ptr(), v) };
        out
    }
}

// --- aarch64 neon lanes ---
#[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
mod aarch64_neon {
    use num_complex::Complex64;
    use std::arch::aarch64::*;

    pub type Lane = float64x2_t;

    #[inline(always)]
    pub fn load(c: &Complex64) -> Lane {
        unsafe { vld1q_f64((c as *const Complex64).cast::<f64>()) }
    }

    #[inline(always)]
    pub fn store(v: Lane, c: &mut Complex64) {
        unsafe { vst1q_f64((c as *mut Complex64).cast::<f64>(), v) }
    }

    #[inline(always)]
    pub fn set(lo: f64, hi: f64) -> Lane {
        let tmp = [lo, hi];
        unsafe { vld1q_f64(tmp.as_ptr()) }
    }

    #[inline(always)]
    pub fn splat(x: f64) -> Lane {
        unsafe { vdupq_n_f64(x) }
    }

    #[inline(always)]
    pub fn add(a: Lane, b: Lane) -> Lane {
        unsafe { vaddq_f64(a, b) }
    }

    #[inline(always)]
    pub fn mul(a: Lane, b: Lane) -> Lane {
        unsafe { vmulq_f64(a, b) }
    }

    // (a0 - a1, b0 - b1)
    #[inline(always)]
    pub fn hsub(a: Lane, b: Lane) -> Lane {
        unsafe { vsubq_f64(vzip1q_f64(a, b), vzip2q_f64(a, b)) }
    }

    #[inline(always)]
    pub fn select<const SEL: u8, const SHIFT: u8>(a: Lane) -> Lane {
        unsafe {
            match (SEL >> SHIFT) & 0b11 {
                0b00 => vdupq_laneq_f64::<0>(a),
                0b01 => vextq_f64::<1>(a, a),
                0b10 => a,
                _ => vdupq_laneq_f64::<1>(a),
            }
        }
    }

    #[inline(always)]
    pub fn to_array(v: Lane) -> [f64; 2] {
        let mut out = [0.0; 2];
        unsafe { vst1q_f64(out.as_mut_ptr(), v) };
        out
    }
}

// --- portable fallback ---
// plain arrays, llvm still packs these into whatever vector unit the target has.
#[cfg(not(any(
    target_arch = "x86_64",
    all(target_arch = "aarch64", target_feature = "neon")
)))]
mod scalar {
    use num_complex::Complex64;

    pub type Lane = [f64; 2];

    #[inline(always)]
    pub fn load(c: &Complex64) -> Lane {
        [c.re, c.im]
    }

    #[inline(always)]
    pub fn store(v: Lane, c: &mut Complex64) {
        c.re = v[0];
        c.im = v[1];
    }

    #[inline(always)]
    pub fn set(lo: f64, hi: f64) -> Lane {
        [lo, hi]
    }

    #[inline(always)]
    pub fn splat(x: f64) -> Lane {
        [x, x]
    }

    #[inline(always)]
    pub fn add(a: Lane, b: Lane) -> Lane {
        [a[0] + b[0], a[1] + b[1]]
    }

    #[inline(always)]
    pub fn mul(a: Lane, b: Lane) -> Lane {
        [a[0] * b[0], a[1] * b[1]]
    }

    #[inline(always)]
    pub fn hsub(a: Lane, b: Lane) -> Lane {
        [a[0] - a[1], b[0] - b[1]]
    }

    #[inline(always)]
    pub fn select<const SEL: u8, const SHIFT: u8>(a: Lane) -> Lane {
        let sel = (SEL >> SHIFT) & 0b11;
        [a[(sel & 1) as usize], a[((sel >> 1) & 1) as usize]]
    }

    #[inline(always)]
    pub fn to_array(v: Lane) -> [f64; 2] {
        v
    }
}

// --- complex pair ---

// two complex doubles, half 0 ("lo") and half 1 ("hi"), each [re, im].
// everything is lane-wise except the complex multiply, which mixes re and im inside a half
#[derive(Clone, Copy, Debug)]
pub struct ComplexPair {
    v: [Lane; 2],
}

impl ComplexPair {
    // broadcast one amplitude against a matrix column
    #[inline(always)]
    pub fn splat(c: &Complex64) -> Self {
        let l = lanes::load(c);
        ComplexPair { v: [l, l] }
    }

    // gather two rows of one matrix column
    #[inline(always)]
    pub fn load(lo: &Complex64, hi: &Complex64) -> Self {
        ComplexPair {
            v: [lanes::load(lo), lanes::load(hi)],
        }
    }

    #[inline(always)]
    pub fn new(lo: Complex64, hi: Complex64) -> Self {
        Self::load(&lo, &hi)
    }

    #[inline(always)]
    pub fn from_slice(src: &[Complex64]) -> Self {
        Self::load(&src[0], &src[1])
    }

    #[inline(always)]
    pub fn scalar(s: f64) -> Self {
        let l = lanes::splat(s);
        ComplexPair { v: [l, l] }
    }

    #[inline(always)]
    pub fn store(self, lo: &mut Complex64, hi: &mut Complex64) {
        lanes::store(self.v[0], lo);
        lanes::store(self.v[1], hi);
    }

    #[inline(always)]
    pub fn store_slice(self, dst: &mut [Complex64]) {
        let (lo, hi) = dst.split_at_mut(1);
        self.store(&mut lo[0], &mut hi[0]);
    }

    /// Half 0 or half 1 as a `Complex64`.
    ///
    /// # Panics
    ///
    /// Panics if `half` is greater than 1.
    #[inline]
    pub fn get(self, half: usize) -> Complex64 {
        assert!(half < 2, "ComplexPair has two halves, got index {}", half);
        let [re, im] = lanes::to_array(self.v[half]);
        Complex64::new(re, im)
    }

    #[inline]
    pub fn lo(self) -> Complex64 {
        self.get(0)
    }

    #[inline]
    pub fn hi(self) -> Complex64 {
        self.get(1)
    }

    // bits 0/1 of IMM pick the source lane (0 = re, 1 = im) of output lanes 0/1 in half 0,
    // bits 2/3 the same for half 1. 0b1010 is the identity, 0b0101 swaps re/im
    #[inline(always)]
    pub fn permute<const IMM: u8>(self) -> Self {
        ComplexPair {
            v: [
                lanes::select::<IMM, 0>(self.v[0]),
                lanes::select::<IMM, 2>(self.v[1]),
            ],
        }
    }

    // (im, -re) per half
    #[inline(always)]
    pub fn transposed_negated(self) -> Self {
        let swapped = self.permute::<0b0101>();
        let sign = lanes::set(1.0, -1.0);
        ComplexPair {
            v: [lanes::mul(swapped.v[0], sign), lanes::mul(swapped.v[1], sign)],
        }
    }

    // self * b per half, b_tn = b.transposed_negated()
    // (ar*br, ai*bi) and (ar*bi, -ai*br) lane-wise, then one hsub gives (ar*br - ai*bi, ar*bi + ai*br)
    #[inline(always)]
    pub fn mul_transposed(self, b: ComplexPair, b_tn: ComplexPair) -> Self {
        let re_terms = [lanes::mul(self.v[0], b.v[0]), lanes::mul(self.v[1], b.v[1])];
        let im_terms = [
            lanes::mul(self.v[0], b_tn.v[0]),
            lanes::mul(self.v[1], b_tn.v[1]),
        ];
        ComplexPair {
            v: [
                lanes::hsub(re_terms[0], im_terms[0]),
                lanes::hsub(re_terms[1], im_terms[1]),
            ],
        }
    }

    #[inline(always)]
    pub fn mul_with(self, col: &PackedColumn) -> Self {
        self.mul_transposed(col.coeff, col.coeff_tn)
    }
}

impl Add for ComplexPair {
    type Output = ComplexPair;

    #[inline(always)]
    fn add(self, rhs: ComplexPair) -> ComplexPair {
        ComplexPair {
            v: [lanes::add(self.v[0], rhs.v[0]), lanes::add(self.v[1], rhs.v[1])],
        }
    }
}

impl Mul<f64> for ComplexPair {
    type Output = ComplexPair;

    #[inline(always)]
    fn mul(self, rhs: f64) -> ComplexPair {
        let s = lanes::splat(rhs);
        ComplexPair {
            v: [lanes::mul(self.v[0], s), lanes::mul(self.v[1], s)],
        }
    }
}

impl Mul<ComplexPair> for f64 {
    type Output = ComplexPair;

    #[inline(always)]
    fn mul(self, rhs: ComplexPair) -> ComplexPair {
        rhs * self
    }
}

// one-off products; the kernels use `mul_with` so the permute is not redone per amplitude
impl Mul for ComplexPair {
    type Output = ComplexPair;

    #[inline(always)]
    fn mul(self, rhs: ComplexPair) -> ComplexPair {
        self.mul_transposed(rhs, rhs.transposed_negated())
    }
}

// --- packed matrix column ---

// two coefficients of one matrix column (rows r and r + 1) plus their transposed-negated form.
// built once per kernel call, read-only for every worker
#[derive(Clone, Copy, Debug)]
pub struct PackedColumn {
    coeff: ComplexPair,
    coeff_tn: ComplexPair,
}

impl PackedColumn {
    #[inline]
    pub fn new(lo: &Complex64, hi: &Complex64) -> Self {
        Self::from_pair(ComplexPair::load(lo, hi))
    }

    #[inline]
    pub fn from_pair(coeff: ComplexPair) -> Self {
        PackedColumn {
            coeff,
            coeff_tn: coeff.transposed_negated(),
        }
    }

    #[inline]
    pub fn coeff(&self) -> ComplexPair {
        self.coeff
    }

    #[inline]
    pub fn transposed_negated(&self) -> ComplexPair {
        self.coeff_tn
    }
}
