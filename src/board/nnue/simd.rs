//! SIMD-optimized operations for NNUE evaluation.
//!
//! Provides vectorized accumulator maintenance (add/subtract i16 vectors),
//! used both for a from-scratch refresh and for incremental per-move
//! updates. The hidden and output layers are small enough (`H2 = 32`) that
//! they're computed with plain scalar loops in `network.rs` instead.
//!
//! Supports:
//! - `x86_64`: `AVX2` (256-bit vectors, 16 i16 at a time)
//! - aarch64: NEON (128-bit vectors, 8 i16 at a time)
//! - Fallback: Scalar operations

use super::network::HIDDEN_SIZE;

// ============================================================================
// Public API - dispatches to platform-specific implementations
// ============================================================================

/// Add weights to accumulator using SIMD when available.
#[inline]
pub fn add_weights(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) {
    #[cfg(target_arch = "aarch64")]
    {
        // NEON is always available on aarch64
        unsafe { add_weights_neon(acc, weights) }
    }

    #[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
    {
        unsafe { add_weights_avx2(acc, weights) }
    }

    #[cfg(all(target_arch = "x86_64", not(target_feature = "avx2")))]
    {
        if is_x86_feature_detected!("avx2") {
            unsafe { add_weights_avx2(acc, weights) }
        } else {
            add_weights_scalar(acc, weights)
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        add_weights_scalar(acc, weights)
    }
}

/// Subtract weights from accumulator using SIMD when available.
#[inline]
pub fn sub_weights(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) {
    #[cfg(target_arch = "aarch64")]
    {
        unsafe { sub_weights_neon(acc, weights) }
    }

    #[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
    {
        unsafe { sub_weights_avx2(acc, weights) }
    }

    #[cfg(all(target_arch = "x86_64", not(target_feature = "avx2")))]
    {
        if is_x86_feature_detected!("avx2") {
            unsafe { sub_weights_avx2(acc, weights) }
        } else {
            sub_weights_scalar(acc, weights)
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        sub_weights_scalar(acc, weights)
    }
}

// ============================================================================
// Scalar fallback implementations
// Used on x86_64 without AVX2 and non-SIMD platforms.
// Not used on aarch64 (NEON always available).
// ============================================================================

#[cfg(any(
    not(any(target_arch = "x86_64", target_arch = "aarch64")),
    all(target_arch = "x86_64", not(target_feature = "avx2"))
))]
#[inline]
fn add_weights_scalar(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) {
    for i in 0..HIDDEN_SIZE {
        acc[i] = acc[i].saturating_add(weights[i]);
    }
}

#[cfg(any(
    not(any(target_arch = "x86_64", target_arch = "aarch64")),
    all(target_arch = "x86_64", not(target_feature = "avx2"))
))]
#[inline]
fn sub_weights_scalar(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) {
    for i in 0..HIDDEN_SIZE {
        acc[i] = acc[i].saturating_sub(weights[i]);
    }
}

// ============================================================================
// NEON implementations (aarch64 - Apple Silicon, ARM servers)
// ============================================================================

#[cfg(target_arch = "aarch64")]
unsafe fn add_weights_neon(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) {
    use std::arch::aarch64::{vld1q_s16, vqaddq_s16, vst1q_s16};

    let acc_ptr = acc.as_mut_ptr();
    let weights_ptr = weights.as_ptr();

    // Process 8 i16 values at a time (128 bits)
    for i in (0..HIDDEN_SIZE).step_by(8) {
        let a = vld1q_s16(acc_ptr.add(i));
        let w = vld1q_s16(weights_ptr.add(i));
        let sum = vqaddq_s16(a, w); // Saturating add
        vst1q_s16(acc_ptr.add(i), sum);
    }
}

#[cfg(target_arch = "aarch64")]
unsafe fn sub_weights_neon(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) {
    use std::arch::aarch64::{vld1q_s16, vqsubq_s16, vst1q_s16};

    let acc_ptr = acc.as_mut_ptr();
    let weights_ptr = weights.as_ptr();

    for i in (0..HIDDEN_SIZE).step_by(8) {
        let a = vld1q_s16(acc_ptr.add(i));
        let w = vld1q_s16(weights_ptr.add(i));
        let diff = vqsubq_s16(a, w); // Saturating sub
        vst1q_s16(acc_ptr.add(i), diff);
    }
}

// ============================================================================
// AVX2 implementations (x86_64 only)
// ============================================================================

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn add_weights_avx2(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) {
    use std::arch::x86_64::*;

    let acc_ptr = acc.as_mut_ptr();
    let weights_ptr = weights.as_ptr();

    // Process 16 i16 values at a time (256 bits)
    for i in (0..HIDDEN_SIZE).step_by(16) {
        let a = _mm256_loadu_si256(acc_ptr.add(i) as *const __m256i);
        let w = _mm256_loadu_si256(weights_ptr.add(i) as *const __m256i);
        let sum = _mm256_adds_epi16(a, w); // Saturating add
        _mm256_storeu_si256(acc_ptr.add(i) as *mut __m256i, sum);
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn sub_weights_avx2(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) {
    use std::arch::x86_64::*;

    let acc_ptr = acc.as_mut_ptr();
    let weights_ptr = weights.as_ptr();

    for i in (0..HIDDEN_SIZE).step_by(16) {
        let a = _mm256_loadu_si256(acc_ptr.add(i) as *const __m256i);
        let w = _mm256_loadu_si256(weights_ptr.add(i) as *const __m256i);
        let diff = _mm256_subs_epi16(a, w); // Saturating sub
        _mm256_storeu_si256(acc_ptr.add(i) as *mut __m256i, diff);
    }
}
