//! Gray-code translation between bit chromosomes and integer weight vectors.
//!
//! A chromosome is an ordered sequence of bits encoding every feature weight
//! of one candidate heuristic. Weights are stored as reflected-binary Gray
//! code so that consecutive integers differ by exactly one bit, which keeps
//! single-bit mutation from causing large jumps in weight space near integer
//! boundaries.
//!
//! # Mixed segment widths
//!
//! A chromosome can carry two segment widths at once: a leading block of
//! *wide* segments (the "major" weights, which deserve a finer-grained value
//! range) followed by *narrow* segments for the remaining "minor" weights.
//! The boundary is a bit offset called the *split*; a split of zero means the
//! whole chromosome uses the narrow width.
//!
//! ```text
//! | w_wide | w_wide | ... | w_small | w_small | w_small | ...
//! 0                     split                              len
//!   major weights              minor weights
//! ```
//!
//! # Decode lookup tables
//!
//! [`GrayEncoder::new`] and [`GrayEncoder::with_wide_prefix`] precompute one
//! table per width mapping every possible Gray bit pattern (read MSB-first as
//! a table index) to its decoded integer — the composition of Gray→binary and
//! binary→integer. Decoding a segment is then a single indexed load instead
//! of a per-call bit transform. A width-`w` table has `2^w` entries; widths
//! are capped at 16 bits to keep the tables small.

use derive_more as dm;

/// Largest supported segment width in bits.
///
/// Keeps decode tables at `2^16` entries or fewer.
pub const MAX_SEGMENT_WIDTH: usize = 16;

/// A chromosome (or chromosome region) is incompatible with the declared
/// segment widths. Fatal: raised at encoder construction or decode time,
/// never silently patched over.
#[derive(Debug, Clone, PartialEq, Eq, dm::Display, dm::Error)]
pub enum MalformedChromosomeError {
    /// A segment width outside `1..=MAX_SEGMENT_WIDTH`.
    #[display("segment width {width} outside supported range 1..={MAX_SEGMENT_WIDTH}")]
    UnsupportedWidth { width: usize },
    /// The wide/narrow split does not fall on a wide-segment boundary.
    #[display("split offset {split} is not a multiple of the wide segment width {width}")]
    MisalignedSplit { split: usize, width: usize },
    /// A chromosome shorter than its declared wide prefix.
    #[display("chromosome of {len} bits is shorter than the {split}-bit wide prefix")]
    TruncatedPrefix { len: usize, split: usize },
    /// A chromosome region that does not divide into whole segments.
    #[display("{len} chromosome bits do not divide into {width}-bit segments")]
    RaggedSegments { len: usize, width: usize },
}

/// Converts binary bits (MSB first) to reflected-binary Gray code.
///
/// Gray bit 0 equals binary bit 0; every later Gray bit is the XOR of the
/// two adjacent binary bits.
#[must_use]
pub fn bin_to_gray(bits: &[bool]) -> Vec<bool> {
    let mut gray = Vec::with_capacity(bits.len());
    if let Some(&first) = bits.first() {
        gray.push(first);
        gray.extend(bits.windows(2).map(|pair| pair[0] ^ pair[1]));
    }
    gray
}

/// Converts reflected-binary Gray code (MSB first) back to binary bits.
///
/// Binary bit 0 equals Gray bit 0; every later binary bit is the XOR of the
/// previous binary bit and the corresponding Gray bit.
#[must_use]
pub fn gray_to_bin(bits: &[bool]) -> Vec<bool> {
    let mut bin = Vec::with_capacity(bits.len());
    let mut acc = false;
    for &gray_bit in bits {
        acc ^= gray_bit;
        bin.push(acc);
    }
    bin
}

/// Translates between Gray-coded bit chromosomes and integer weight vectors.
///
/// Owns its decode lookup tables; construct one per `(narrow, wide)` width
/// pair and share it by reference for the whole run. The tables are
/// read-only after construction, so an encoder can be shared freely across
/// evaluation workers.
#[derive(Debug, Clone)]
pub struct GrayEncoder {
    width_small: usize,
    width_wide: usize,
    split: usize,
    table_small: Vec<u32>,
    table_wide: Vec<u32>,
}

impl GrayEncoder {
    /// Creates an encoder where the whole chromosome uses a single narrow
    /// segment width.
    pub fn new(width_small: usize) -> Result<Self, MalformedChromosomeError> {
        check_width(width_small)?;
        Ok(Self {
            width_small,
            width_wide: 0,
            split: 0,
            table_small: build_decode_table(width_small),
            table_wide: Vec::new(),
        })
    }

    /// Creates an encoder whose first `split` bits decode as `width_wide`
    /// segments and whose remainder decodes as `width_small` segments.
    ///
    /// `split` must be a whole multiple of `width_wide`; a `split` of zero
    /// degenerates to [`GrayEncoder::new`].
    pub fn with_wide_prefix(
        width_small: usize,
        width_wide: usize,
        split: usize,
    ) -> Result<Self, MalformedChromosomeError> {
        if split == 0 {
            return Self::new(width_small);
        }
        check_width(width_small)?;
        check_width(width_wide)?;
        if !split.is_multiple_of(width_wide) {
            return Err(MalformedChromosomeError::MisalignedSplit {
                split,
                width: width_wide,
            });
        }
        Ok(Self {
            width_small,
            width_wide,
            split,
            table_small: build_decode_table(width_small),
            table_wide: build_decode_table(width_wide),
        })
    }

    /// The narrow (minor-weight) segment width in bits.
    #[must_use]
    pub fn width_small(&self) -> usize {
        self.width_small
    }

    /// The wide (major-weight) segment width in bits, or 0 when the encoder
    /// has no wide prefix.
    #[must_use]
    pub fn width_wide(&self) -> usize {
        self.width_wide
    }

    /// The bit offset where the wide prefix ends.
    #[must_use]
    pub fn split(&self) -> usize {
        self.split
    }

    /// Total chromosome length for a weight vector of `num_major` wide and
    /// `num_minor` narrow weights.
    #[must_use]
    pub fn chromosome_len(&self, num_major: usize, num_minor: usize) -> usize {
        num_major * self.width_wide + num_minor * self.width_small
    }

    /// Encodes an integer weight as `width` Gray-coded bits, MSB first.
    ///
    /// # Panics
    ///
    /// Panics if `width` exceeds [`MAX_SEGMENT_WIDTH`] or `value` does not
    /// fit in `width` bits; both are caller contract violations.
    #[must_use]
    pub fn encode(&self, value: u32, width: usize) -> Vec<bool> {
        assert!(
            (1..=MAX_SEGMENT_WIDTH).contains(&width),
            "segment width {width} outside supported range"
        );
        assert!(
            u64::from(value) < 1 << width,
            "weight {value} does not fit in {width} bits"
        );
        let bin: Vec<bool> = (0..width)
            .rev()
            .map(|bit| value & (1 << bit) != 0)
            .collect();
        bin_to_gray(&bin)
    }

    /// Decodes a Gray-coded chromosome into its weight vector: the wide
    /// prefix as major weights, the narrow suffix as minor weights,
    /// concatenated major-first.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedChromosomeError`] if the chromosome is shorter
    /// than the wide prefix, or if either region does not divide into whole
    /// segments of its width.
    pub fn decode(&self, chromosome: &[bool]) -> Result<Vec<u32>, MalformedChromosomeError> {
        if chromosome.len() < self.split {
            return Err(MalformedChromosomeError::TruncatedPrefix {
                len: chromosome.len(),
                split: self.split,
            });
        }
        let (major, minor) = chromosome.split_at(self.split);

        let mut weights =
            Vec::with_capacity(self.split / self.width_wide.max(1) + minor.len() / self.width_small);
        decode_region(major, self.width_wide, &self.table_wide, &mut weights)?;
        decode_region(minor, self.width_small, &self.table_small, &mut weights)?;
        Ok(weights)
    }
}

fn check_width(width: usize) -> Result<(), MalformedChromosomeError> {
    if (1..=MAX_SEGMENT_WIDTH).contains(&width) {
        Ok(())
    } else {
        Err(MalformedChromosomeError::UnsupportedWidth { width })
    }
}

/// Builds the fused Gray-pattern → integer table for one segment width.
///
/// Index: the Gray bit pattern read MSB-first as an integer. Value: the
/// binary integer that pattern encodes. The mapping is bijective on
/// `0..2^width`.
fn build_decode_table(width: usize) -> Vec<u32> {
    let mut table = vec![0; 1 << width];
    for value in 0..(1_u32 << width) {
        // gray(n) = n ^ (n >> 1); store the inverse direction so decode is a
        // single lookup.
        let gray = value ^ (value >> 1);
        table[gray as usize] = value;
    }
    table
}

fn decode_region(
    region: &[bool],
    width: usize,
    table: &[u32],
    weights: &mut Vec<u32>,
) -> Result<(), MalformedChromosomeError> {
    if region.is_empty() {
        return Ok(());
    }
    if width == 0 || !region.len().is_multiple_of(width) {
        return Err(MalformedChromosomeError::RaggedSegments {
            len: region.len(),
            width,
        });
    }
    for segment in region.chunks_exact(width) {
        let index = segment
            .iter()
            .fold(0_usize, |acc, &bit| (acc << 1) | usize::from(bit));
        weights.push(table[index]);
    }
    Ok(())
}
