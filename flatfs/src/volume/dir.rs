//! 目录元数据块：登记目录下所有文件的名字、大小与起始数据块。

use alloc::string::String;
use alloc::vec::Vec;

use vfs::{Error, Result};

use super::{Ext, Name, decode_block_id, decode_count};
use crate::{BLOCK_SIZE, Block, BlockId, BlockStore};

/// 一个目录下最多容纳的文件数
pub const MAX_FILES_IN_DIR: usize = (BLOCK_SIZE - 4) / FileRecord::SIZE;

/// 目录中的一项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRecord {
    pub name: Name,
    pub ext: Ext,
    /// 字节数
    pub size: u64,
    /// 第一个数据块
    pub start: BlockId,
}

impl FileRecord {
    /// name(9) | ext(4) | size(8) | start(8)
    pub const SIZE: usize = Name::FIELD_SIZE + Ext::FIELD_SIZE + 8 + 8;

    pub fn new(name: Name, ext: Ext, start: BlockId) -> Self {
        Self {
            name,
            ext,
            size: 0,
            start,
        }
    }

    /// `name.ext`，扩展名为空时省略点号
    pub fn full_name(&self) -> String {
        let mut full = String::from(self.name.to_str_lossy());
        if !self.ext.is_empty() {
            full.push('.');
            full.push_str(&self.ext.to_str_lossy());
        }
        full
    }

    fn decode(raw: &[u8]) -> Result<Self> {
        let (name, rest) = raw.split_at(Name::FIELD_SIZE);
        let (ext, rest) = rest.split_at(Ext::FIELD_SIZE);
        let (size, start) = rest.split_at(8);
        Ok(Self {
            name: Name::decode(name),
            ext: Ext::decode(ext),
            size: u64::from_le_bytes(size.try_into().map_err(|_| Error::Io)?),
            start: decode_block_id(start)?,
        })
    }

    fn encode(&self, raw: &mut [u8]) {
        let (name, rest) = raw.split_at_mut(Name::FIELD_SIZE);
        let (ext, rest) = rest.split_at_mut(Ext::FIELD_SIZE);
        let (size, start) = rest.split_at_mut(8);
        self.name.encode(name);
        self.ext.encode(ext);
        size.copy_from_slice(&self.size.to_le_bytes());
        start.copy_from_slice(&(self.start.index() as i64).to_le_bytes());
    }
}

/// 内存中的目录元数据块
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirBlock {
    files: Vec<FileRecord>,
}

impl DirBlock {
    pub fn load(store: &BlockStore, at: BlockId) -> Result<Self> {
        Self::decode(&store.read(at)?).inspect_err(|_| {
            log::error!("directory block {at} is corrupt");
        })
    }

    pub fn sync(&self, store: &BlockStore, at: BlockId) -> Result<()> {
        store.write(at, &self.encode())
    }

    pub fn decode(block: &Block) -> Result<Self> {
        let count = decode_count(block, MAX_FILES_IN_DIR)?;
        let files = block[4..]
            .chunks_exact(FileRecord::SIZE)
            .take(count)
            .map(FileRecord::decode)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { files })
    }

    pub fn encode(&self) -> Block {
        let mut block = [0; BLOCK_SIZE];
        block[..4].copy_from_slice(&(self.files.len() as i32).to_le_bytes());
        for (file, raw) in self.files.iter().zip(block[4..].chunks_exact_mut(FileRecord::SIZE)) {
            file.encode(raw);
        }
        block
    }

    /// 主名与扩展名都须相同
    pub fn find(&self, name: &Name, ext: &Ext) -> Option<(usize, &FileRecord)> {
        self.files
            .iter()
            .enumerate()
            .find(|(_, file)| file.name == *name && file.ext == *ext)
    }

    pub fn push(&mut self, file: FileRecord) -> Result<()> {
        if self.files.len() == MAX_FILES_IN_DIR {
            return Err(Error::DirectoryFull);
        }
        self.files.push(file);
        Ok(())
    }

    /// 返回大小是否真的变了
    pub fn resize(&mut self, index: usize, size: u64) -> bool {
        let file = &mut self.files[index];
        let changed = file.size != size;
        file.size = size;
        changed
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, ext: &str, start: usize) -> FileRecord {
        FileRecord::new(
            Name::new(name).unwrap(),
            Ext::new(ext).unwrap(),
            BlockId::new(start),
        )
    }

    #[test]
    fn layout() {
        let mut dir = DirBlock::default();
        let mut readme = record("readme", "txt", 3);
        readme.size = 600;
        dir.push(readme).unwrap();

        let block = dir.encode();
        assert_eq!([1, 0, 0, 0], block[..4]);
        assert_eq!(*b"readme\0\0\0", block[4..13]);
        assert_eq!(*b"txt\0", block[13..17]);
        assert_eq!(600u64.to_le_bytes(), block[17..25]);
        assert_eq!(3i64.to_le_bytes(), block[25..33]);
        assert!(block[33..].iter().all(|&b| b == 0));

        assert_eq!(dir, DirBlock::decode(&block).unwrap());
    }

    #[test]
    fn zeroed_block_is_empty_dir() {
        assert!(DirBlock::decode(&[0; BLOCK_SIZE]).unwrap().is_empty());
    }

    #[test]
    fn find_matches_extension() {
        let mut dir = DirBlock::default();
        dir.push(record("a", "txt", 3)).unwrap();
        dir.push(record("a", "md", 4)).unwrap();

        let (index, file) = dir
            .find(&Name::new("a").unwrap(), &Ext::new("md").unwrap())
            .unwrap();
        assert_eq!(1, index);
        assert_eq!(BlockId::new(4), file.start);
        assert!(dir.find(&Name::new("a").unwrap(), &Ext::empty()).is_none());
    }

    #[test]
    fn resize_reports_change() {
        let mut dir = DirBlock::default();
        dir.push(record("a", "txt", 3)).unwrap();
        assert!(!dir.resize(0, 0));
        assert!(dir.resize(0, 5));
        assert!(!dir.resize(0, 5));
    }

    #[test]
    fn full_name() {
        assert_eq!("readme.txt", record("readme", "txt", 3).full_name());
        assert_eq!("makefile", record("makefile", "", 3).full_name());
    }
}
