//! 根目录块：0号块，登记所有目录及其元数据块。

use alloc::vec::Vec;

use vfs::{Error, Result};

use super::{Name, decode_block_id, decode_count};
use crate::{BLOCK_SIZE, Block, BlockId, BlockStore};

/// 根目录下最多容纳的目录数
pub const MAX_DIRS_IN_ROOT: usize = (BLOCK_SIZE - 4) / DirRecord::SIZE;

/// 根目录中的一项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirRecord {
    pub name: Name,
    /// 目录元数据块
    pub start: BlockId,
}

impl DirRecord {
    /// name(9) | start(8)
    pub const SIZE: usize = Name::FIELD_SIZE + 8;

    fn decode(raw: &[u8]) -> Result<Self> {
        let (name, start) = raw.split_at(Name::FIELD_SIZE);
        Ok(Self {
            name: Name::decode(name),
            start: decode_block_id(start)?,
        })
    }

    fn encode(&self, raw: &mut [u8]) {
        let (name, start) = raw.split_at_mut(Name::FIELD_SIZE);
        self.name.encode(name);
        start.copy_from_slice(&(self.start.index() as i64).to_le_bytes());
    }
}

/// 内存中的根目录块
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootBlock {
    dirs: Vec<DirRecord>,
}

impl RootBlock {
    pub fn load(store: &BlockStore) -> Result<Self> {
        Self::decode(&store.read(BlockId::ROOT)?)
    }

    pub fn sync(&self, store: &BlockStore) -> Result<()> {
        store.write(BlockId::ROOT, &self.encode())
    }

    pub fn decode(block: &Block) -> Result<Self> {
        let count = decode_count(block, MAX_DIRS_IN_ROOT).inspect_err(|_| {
            log::error!("root block holds an impossible directory count");
        })?;
        let dirs = block[4..]
            .chunks_exact(DirRecord::SIZE)
            .take(count)
            .map(DirRecord::decode)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { dirs })
    }

    pub fn encode(&self) -> Block {
        let mut block = [0; BLOCK_SIZE];
        block[..4].copy_from_slice(&(self.dirs.len() as i32).to_le_bytes());
        for (dir, raw) in self.dirs.iter().zip(block[4..].chunks_exact_mut(DirRecord::SIZE)) {
            dir.encode(raw);
        }
        block
    }

    pub fn find(&self, name: &Name) -> Option<&DirRecord> {
        self.dirs.iter().find(|dir| dir.name == *name)
    }

    pub fn push(&mut self, dir: DirRecord) -> Result<()> {
        if self.dirs.len() == MAX_DIRS_IN_ROOT {
            return Err(Error::RootFull);
        }
        self.dirs.push(dir);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// 按创建顺序
    pub fn iter(&self) -> impl Iterator<Item = &DirRecord> {
        self.dirs.iter()
    }
}
