//! Run-length tokens for the AC coefficients of zig-zag ordered blocks.

use std::{fmt, str::FromStr};

use crate::{
    foundation::error::{VidpressError, VidpressResult},
    raster::{channel::Channel, frame::BLOCK_COEFFS},
};

/// One token of a block stream.
///
/// Text form: literals print as integers (`"-3"`), runs as `"Z<len>"` (`"Z12"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    /// A coefficient value.
    Coefficient(i32),
    /// `n` consecutive zero coefficients.
    ZeroRun(u32),
}

/// Tokens for one block, AC coefficients only.
pub type BlockTokens = Vec<Token>;

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Coefficient(v) => write!(f, "{v}"),
            Token::ZeroRun(n) => write!(f, "Z{n}"),
        }
    }
}

impl FromStr for Token {
    type Err = VidpressError;

    fn from_str(s: &str) -> VidpressResult<Self> {
        let parsed = match s.strip_prefix('Z') {
            Some(run) => run.parse().map(Token::ZeroRun),
            None => s.parse().map(Token::Coefficient),
        };
        parsed.map_err(|e| VidpressError::serde(format!("invalid token '{s}': {e}")))
    }
}

impl serde::Serialize for Token {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Token {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Tokenize one zig-zag ordered block.
///
/// Position 0 (DC) is skipped. A pending zero run is flushed as `Z<n>` before the next nonzero
/// literal. A run still open at the end of the block is emitted as `Z<n>` when `n > 1` and as a
/// literal `0` when `n == 1`.
pub fn encode_block(coeffs: &[f32]) -> BlockTokens {
    let mut tokens = Vec::new();
    let mut run = 0u32;
    for &c in coeffs.iter().skip(1) {
        if c == 0.0 {
            run += 1;
            continue;
        }
        if run > 0 {
            tokens.push(Token::ZeroRun(run));
            run = 0;
        }
        tokens.push(Token::Coefficient(c as i32));
    }

    match run {
        0 => {}
        1 => tokens.push(Token::Coefficient(0)),
        n => tokens.push(Token::ZeroRun(n)),
    }
    tokens
}

/// Tokenize every row of a zig-zag channel (one row per block).
pub fn encode_blocks(src: &Channel) -> VidpressResult<Vec<BlockTokens>> {
    if src.width() != BLOCK_COEFFS {
        return Err(VidpressError::validation(format!(
            "token encoding expects {BLOCK_COEFFS} coefficients per row, got {}",
            src.width()
        )));
    }
    Ok(src
        .data()
        .chunks_exact(BLOCK_COEFFS)
        .map(encode_block)
        .collect())
}

/// Expand tokens back into the 63 AC coefficients of a block.
pub fn decode_block(tokens: &[Token]) -> VidpressResult<[f32; BLOCK_COEFFS - 1]> {
    let mut out = [0.0f32; BLOCK_COEFFS - 1];
    let mut pos = 0usize;
    for &t in tokens {
        let n = match t {
            Token::Coefficient(_) => 1,
            Token::ZeroRun(n) => n as usize,
        };
        if pos + n > out.len() {
            return Err(VidpressError::serde(format!(
                "token stream overruns block at token '{t}'"
            )));
        }
        if let Token::Coefficient(v) = t {
            out[pos] = v as f32;
        }
        pos += n;
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/stages/tokens.rs"]
mod tests;
