//! 镜像的布局
//!
//! 根目录块 | 目录元数据块与数据块（混排，由分配表串联） | 分配表
//!
//! 所有结构都恰好占一块，按小端序逐字段编解码。

pub mod dir;
pub mod fat;
pub mod name;
pub mod root;

use vfs::{Error, Result};

pub use self::{
    dir::{DirBlock, FileRecord, MAX_FILES_IN_DIR},
    fat::{FAT_SLOTS, FatTable},
    name::{Ext, FixedName, Name},
    root::{DirRecord, MAX_DIRS_IN_ROOT, RootBlock},
};
use crate::{Block, BlockId};

/// 块首的计数字段，须落在`0..=max`内
fn decode_count(block: &Block, max: usize) -> Result<usize> {
    let count = i32::from_le_bytes([block[0], block[1], block[2], block[3]]);
    usize::try_from(count)
        .ok()
        .filter(|&count| count <= max)
        .ok_or(Error::Io)
}

/// 记录中的起始块号。0号块是根目录，不会被任何记录引用。
fn decode_block_id(raw: &[u8]) -> Result<BlockId> {
    let raw: [u8; 8] = raw.try_into().map_err(|_| Error::Io)?;
    match i64::from_le_bytes(raw) {
        id if (1..FAT_SLOTS as i64).contains(&id) => Ok(BlockId::new(id as usize)),
        id => {
            log::error!("record points at unaddressable block {id}");
            Err(Error::Io)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity() {
        assert_eq!(17, DirRecord::SIZE);
        assert_eq!(29, FileRecord::SIZE);
        assert_eq!(29, MAX_DIRS_IN_ROOT);
        assert_eq!(17, MAX_FILES_IN_DIR);
        assert_eq!(256, FAT_SLOTS);
    }
}
