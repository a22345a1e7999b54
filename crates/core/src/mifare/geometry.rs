//! MIFARE Classic memory layout
//!
//! Sectors 0..32 hold 4 blocks each. The 4K card adds eight large sectors
//! (32..40) of 16 blocks each, starting at block 128.

use derive_more::Display;

use super::BLOCK_SIZE;

const SMALL_SECTOR_BLOCKS: usize = 4;
const LARGE_SECTOR_BLOCKS: usize = 16;
const SMALL_SECTOR_COUNT: usize = 32;

/// Card variants and their geometry
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MifareClassicType {
    /// MIFARE Mini, 320 bytes
    #[display("MIFARE Mini")]
    Mini,
    /// MIFARE Classic 1K
    #[display("MIFARE Classic 1K")]
    Classic1K,
    /// MIFARE Classic 4K
    #[display("MIFARE Classic 4K")]
    Classic4K,
}

impl MifareClassicType {
    /// Number of sectors
    pub const fn sector_count(&self) -> usize {
        match self {
            Self::Mini => 5,
            Self::Classic1K => 16,
            Self::Classic4K => 40,
        }
    }

    /// Total number of blocks
    pub const fn block_count(&self) -> usize {
        match self {
            Self::Mini => 20,
            Self::Classic1K => 64,
            Self::Classic4K => 256,
        }
    }

    /// Storage size in bytes
    pub const fn size(&self) -> usize {
        self.block_count() * BLOCK_SIZE
    }

    /// Number of blocks in `sector`
    pub const fn blocks_in_sector(&self, sector: usize) -> usize {
        if sector < SMALL_SECTOR_COUNT {
            SMALL_SECTOR_BLOCKS
        } else {
            LARGE_SECTOR_BLOCKS
        }
    }

    /// Index of the first block of `sector`
    pub const fn sector_to_block(&self, sector: usize) -> usize {
        if sector < SMALL_SECTOR_COUNT {
            sector * SMALL_SECTOR_BLOCKS
        } else {
            SMALL_SECTOR_COUNT * SMALL_SECTOR_BLOCKS + (sector - SMALL_SECTOR_COUNT) * LARGE_SECTOR_BLOCKS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_1k_layout() {
        let t = MifareClassicType::Classic1K;
        assert_eq!(t.sector_count(), 16);
        assert_eq!(t.size(), 1024);
        assert_eq!(t.sector_to_block(1), 4);
        assert_eq!(t.blocks_in_sector(15), 4);
    }

    #[test]
    fn test_classic_4k_large_sectors() {
        let t = MifareClassicType::Classic4K;
        assert_eq!(t.size(), 4096);
        assert_eq!(t.sector_to_block(31), 124);
        assert_eq!(t.sector_to_block(32), 128);
        assert_eq!(t.sector_to_block(39), 240);
        assert_eq!(t.blocks_in_sector(39), 16);

        let total: usize = (0..t.sector_count()).map(|s| t.blocks_in_sector(s)).sum();
        assert_eq!(total, t.block_count());
    }

    #[test]
    fn test_display() {
        assert_eq!(MifareClassicType::Mini.to_string(), "MIFARE Mini");
        assert_eq!(MifareClassicType::Mini.size(), 320);
    }
}
