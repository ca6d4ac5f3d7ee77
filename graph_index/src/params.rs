//! Configuration surface for `init`.

use crate::error::{GraphError, GraphResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqFormat {
    Ascii,
    FourBit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMode {
    Copy,
    NoCopy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    Hash,
    IterOnly,
}

#[derive(Debug, Clone)]
pub struct InitParams {
    pub k: usize,
    pub hash_bucket_hint: usize,
    pub seq_format: SeqFormat,
    pub copy_mode: CopyMode,
    pub index_mode: IndexMode,
    pub num_threads: usize,
}

impl Default for InitParams {
    fn default() -> Self {
        InitParams {
            k: 14,
            hash_bucket_hint: 1024,
            seq_format: SeqFormat::Ascii,
            copy_mode: CopyMode::Copy,
            index_mode: IndexMode::Hash,
            num_threads: 0,
        }
    }
}

impl InitParams {
    /// Reject the two unsupported cells: k outside 1..=32, and
    /// NOCOPY paired with ASCII input — NOCOPY is only meaningful for
    /// pre-encoded 4-bit input.
    pub fn validate(&self) -> GraphResult<()> {
        if self.k == 0 || self.k > 32 {
            return Err(GraphError::BadParam("k must be in 1..=32"));
        }
        if self.copy_mode == CopyMode::NoCopy && self.seq_format != SeqFormat::FourBit {
            return Err(GraphError::BadParam(
                "NOCOPY is only valid when seq_format is FOUR_BIT",
            ));
        }
        Ok(())
    }

    pub fn mask(&self) -> u64 {
        if self.k == 32 {
            u64::MAX
        } else {
            (1u64 << (2 * self.k)) - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_valid() {
        InitParams::default().validate().unwrap();
    }

    #[test]
    fn k_over_32_is_rejected() {
        let mut p = InitParams::default();
        p.k = 33;
        assert!(matches!(p.validate(), Err(GraphError::BadParam(_))));
    }

    #[test]
    fn k_zero_is_rejected() {
        let mut p = InitParams::default();
        p.k = 0;
        assert!(matches!(p.validate(), Err(GraphError::BadParam(_))));
    }

    #[test]
    fn nocopy_ascii_is_rejected() {
        let mut p = InitParams::default();
        p.copy_mode = CopyMode::NoCopy;
        p.seq_format = SeqFormat::Ascii;
        assert!(matches!(p.validate(), Err(GraphError::BadParam(_))));
    }

    #[test]
    fn nocopy_four_bit_is_accepted() {
        let mut p = InitParams::default();
        p.copy_mode = CopyMode::NoCopy;
        p.seq_format = SeqFormat::FourBit;
        p.validate().unwrap();
    }

    #[test]
    fn mask_covers_exactly_2k_bits() {
        let mut p = InitParams::default();
        p.k = 3;
        assert_eq!(p.mask(), 0b111111);
        p.k = 32;
        assert_eq!(p.mask(), u64::MAX);
    }
}
