//! Byte-level transforms applied to the index stream.
//!
//! Two reversible transforms exist: run-length encoding as (count, value) pairs
//! and delta encoding modulo 256. When both are enabled the delta is taken of
//! the RLE output, so decoding undoes the delta first.

use crate::error::{Result, TmgError};

/// Streams shorter than this are never compressed by `auto_compress`.
pub const AUTO_MIN_LEN: usize = 100;

/// Which transforms a payload carries. Mirrors the RLE and Diff header flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scheme {
    pub rle: bool,
    pub diff: bool,
}

impl Scheme {
    pub const NONE: Scheme = Scheme { rle: false, diff: false };
    pub const RLE: Scheme = Scheme { rle: true, diff: false };
    pub const DIFF: Scheme = Scheme { rle: false, diff: true };
    pub const RLE_DIFF: Scheme = Scheme { rle: true, diff: true };
}

/// Per-transform request: off, on, or let `auto_compress` decide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Toggle {
    #[default]
    Off,
    On,
    Auto,
}

pub fn compress_rle(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut iter = data.iter().copied();
    let Some(mut current) = iter.next() else {
        return out;
    };
    let mut count: u8 = 1;

    for byte in iter {
        if byte == current && count < u8::MAX {
            count += 1;
        } else {
            out.push(count);
            out.push(current);
            current = byte;
            count = 1;
        }
    }

    out.push(count);
    out.push(current);
    out
}

pub fn decompress_rle(data: &[u8]) -> Result<Vec<u8>> {
    decompress_rle_bounded(data, usize::MAX)
}

/// RLE decode that fails as soon as the output would pass `limit` bytes.
pub fn decompress_rle_bounded(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    if data.len() % 2 != 0 {
        return Err(TmgError::CorruptPayload(format!(
            "RLE payload has odd length {}",
            data.len()
        )));
    }
    let max_len = data.len() / 2 * u8::MAX as usize;
    let mut out = Vec::with_capacity(limit.min(max_len));
    for pair in data.chunks_exact(2) {
        let (count, value) = (pair[0] as usize, pair[1]);
        if count == 0 {
            return Err(TmgError::CorruptPayload("RLE run with zero count".into()));
        }
        if count > limit - out.len() {
            return Err(TmgError::CorruptPayload(format!(
                "RLE payload expands past {limit} bytes"
            )));
        }
        out.extend(std::iter::repeat(value).take(count));
    }
    Ok(out)
}

pub fn compress_diff(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut last = 0u8;
    for (i, &byte) in data.iter().enumerate() {
        out.push(if i == 0 { byte } else { byte.wrapping_sub(last) });
        last = byte;
    }
    out
}

pub fn decompress_diff(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let Some((&first, rest)) = data.split_first() else {
        return out;
    };
    let mut last = first;
    out.push(first);
    for &delta in rest {
        last = last.wrapping_add(delta);
        out.push(last);
    }
    out
}

/// Apply the transforms in `scheme` unconditionally.
pub fn compress(data: &[u8], scheme: Scheme) -> Vec<u8> {
    match (scheme.rle, scheme.diff) {
        (true, true) => compress_diff(&compress_rle(data)),
        (true, false) => compress_rle(data),
        (false, true) => compress_diff(data),
        (false, false) => data.to_vec(),
    }
}

/// Undo `compress` for the same scheme.
pub fn decompress(data: &[u8], scheme: Scheme) -> Result<Vec<u8>> {
    decompress_bounded(data, scheme, usize::MAX)
}

/// Undo `compress`, rejecting output longer than `limit` bytes before it is
/// produced in full.
pub fn decompress_bounded(data: &[u8], scheme: Scheme, limit: usize) -> Result<Vec<u8>> {
    let too_long = |len: usize| {
        TmgError::CorruptPayload(format!("payload of {len} bytes exceeds {limit} bytes"))
    };
    match (scheme.rle, scheme.diff) {
        (true, true) => decompress_rle_bounded(&decompress_diff(data), limit),
        (true, false) => decompress_rle_bounded(data, limit),
        (false, true) if data.len() > limit => Err(too_long(data.len())),
        (false, true) => Ok(decompress_diff(data)),
        (false, false) if data.len() > limit => Err(too_long(data.len())),
        (false, false) => Ok(data.to_vec()),
    }
}

/// Pick the smallest of raw, RLE and Diff. Compression is only kept when it
/// saves at least 10%; ties prefer raw, then RLE. The combined scheme is never
/// tried here.
pub fn auto_compress(data: &[u8]) -> (Vec<u8>, Scheme) {
    if data.len() < AUTO_MIN_LEN {
        log::debug!("auto compression skipped for {} byte stream", data.len());
        return (data.to_vec(), Scheme::NONE);
    }

    let candidates = [
        (compress_rle(data), Scheme::RLE),
        (compress_diff(data), Scheme::DIFF),
    ];
    let mut best: Option<(Vec<u8>, Scheme)> = None;
    for (bytes, scheme) in candidates {
        let beats = match &best {
            Some((b, _)) => bytes.len() < b.len(),
            None => bytes.len() < data.len(),
        };
        if beats {
            best = Some((bytes, scheme));
        }
    }

    match best {
        // size < 90% of raw, in integers
        Some((bytes, scheme)) if bytes.len() * 10 < data.len() * 9 => {
            log::debug!(
                "auto compression chose {scheme:?}: {} -> {} bytes",
                data.len(),
                bytes.len()
            );
            (bytes, scheme)
        }
        _ => {
            log::debug!("auto compression saved under 10% of {} bytes, storing raw", data.len());
            (data.to_vec(), Scheme::NONE)
        }
    }
}

/// Resolve the two per-transform requests. Either toggle set to `Auto` hands
/// the decision to `auto_compress`; otherwise `On` transforms are applied as
/// asked, without a size check.
pub fn select(data: &[u8], rle: Toggle, diff: Toggle) -> (Vec<u8>, Scheme) {
    if rle == Toggle::Auto || diff == Toggle::Auto {
        return auto_compress(data);
    }
    let scheme = Scheme {
        rle: rle == Toggle::On,
        diff: diff == Toggle::On,
    };
    (compress(data, scheme), scheme)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_bytes() -> impl Strategy<Value = Vec<u8>> {
        prop_oneof![
            prop::collection::vec(any::<u8>(), 0..2000),
            // Few distinct values so long runs show up.
            prop::collection::vec(0u8..3, 0..2000),
        ]
    }

    proptest! {
        #[test]
        fn rle_round_trips(data in arb_bytes()) {
            prop_assert_eq!(decompress_rle(&compress_rle(&data)).unwrap(), data);
        }

        #[test]
        fn diff_round_trips(data in arb_bytes()) {
            prop_assert_eq!(decompress_diff(&compress_diff(&data)), data);
        }

        #[test]
        fn combined_round_trips(data in arb_bytes()) {
            let packed = compress(&data, Scheme::RLE_DIFF);
            prop_assert_eq!(decompress(&packed, Scheme::RLE_DIFF).unwrap(), data);
        }

        #[test]
        fn bounded_decode_accepts_exact_length(data in arb_bytes()) {
            for scheme in [Scheme::NONE, Scheme::RLE, Scheme::DIFF, Scheme::RLE_DIFF] {
                let packed = compress(&data, scheme);
                prop_assert_eq!(decompress_bounded(&packed, scheme, data.len()).unwrap(), data.clone());
            }
        }

        #[test]
        fn auto_never_grows_and_round_trips(data in arb_bytes()) {
            let (bytes, scheme) = auto_compress(&data);
            prop_assert!(bytes.len() <= data.len());
            prop_assert_eq!(decompress(&bytes, scheme).unwrap(), data);
        }

        #[test]
        fn auto_choice_is_deterministic(data in arb_bytes()) {
            let (bytes, scheme) = auto_compress(&data);
            let rle = compress_rle(&data);
            let diff = compress_diff(&data);
            let saves = |len: usize| len * 10 < data.len() * 9;

            prop_assert_eq!(auto_compress(&data), (bytes.clone(), scheme));
            if data.len() < AUTO_MIN_LEN {
                prop_assert_eq!(scheme, Scheme::NONE);
            } else if saves(rle.len()) && rle.len() <= diff.len() {
                prop_assert_eq!(scheme, Scheme::RLE);
                prop_assert_eq!(bytes, rle);
            } else if saves(diff.len()) && diff.len() < rle.len() {
                prop_assert_eq!(scheme, Scheme::DIFF);
            } else {
                prop_assert_eq!(scheme, Scheme::NONE);
                prop_assert_eq!(bytes, data);
            }
        }
    }
}
