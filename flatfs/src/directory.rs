//! 目录层：根目录索引与目录元数据的查找、创建、更新。
//!
//! 创建时的写入顺序固定为 分配表 → 新块 → 登记新块的元数据块。
//! 中途失败至多泄漏一块，不会出现引用空闲块的记录。

use vfs::{Error, Result};

use crate::volume::{DirBlock, DirRecord, Ext, FatTable, FileRecord, Name, RootBlock};
use crate::{BlockId, BlockStore};

/// 已载入内存的目录
#[derive(Debug, Clone)]
pub struct Directory {
    /// 元数据块
    at: BlockId,
    meta: DirBlock,
}

impl Directory {
    /// 在根目录中按名字查找
    pub fn find(store: &BlockStore, name: &Name) -> Result<Self> {
        let root = RootBlock::load(store)?;
        let record = root.find(name).ok_or(Error::NotFound)?;
        Ok(Self {
            at: record.start,
            meta: DirBlock::load(store, record.start)?,
        })
    }

    /// 在根目录下新建目录，`limit`为根目录容量上限
    pub fn create(store: &BlockStore, name: Name, limit: usize) -> Result<Self> {
        let mut root = RootBlock::load(store)?;
        if root.find(&name).is_some() {
            return Err(Error::AlreadyExists);
        }
        if root.len() >= limit {
            log::warn!("root directory reached its capacity of {limit}");
            return Err(Error::RootFull);
        }

        let mut fat = FatTable::load(store)?;
        let at = fat.alloc()?;
        fat.sync(store)?;

        let meta = DirBlock::default();
        meta.sync(store, at)?;

        root.push(DirRecord { name, start: at })?;
        root.sync(store)?;
        log::info!("created directory {name} at block {at}");

        Ok(Self { at, meta })
    }

    pub fn meta(&self) -> &DirBlock {
        &self.meta
    }

    /// 返回文件在目录中的下标及其记录
    pub fn find_file(&self, name: &Name, ext: &Ext) -> Result<(usize, FileRecord)> {
        self.meta
            .find(name, ext)
            .map(|(index, file)| (index, *file))
            .ok_or(Error::NotFound)
    }

    /// 新建空文件，同时为其分配一块清零的数据块
    pub fn create_file(
        &mut self,
        store: &BlockStore,
        name: Name,
        ext: Ext,
        limit: usize,
    ) -> Result<FileRecord> {
        if self.meta.find(&name, &ext).is_some() {
            return Err(Error::AlreadyExists);
        }
        if self.meta.len() >= limit {
            log::warn!("directory at block {} reached its capacity of {limit}", self.at);
            return Err(Error::DirectoryFull);
        }

        let mut fat = FatTable::load(store)?;
        let start = fat.alloc()?;
        fat.sync(store)?;
        store.zeroize(start)?;

        let file = FileRecord::new(name, ext, start);
        self.meta.push(file)?;
        self.meta.sync(store, self.at)?;
        log::info!("created file {} at block {start}", file.full_name());

        Ok(file)
    }

    /// 大小没变就不写盘
    pub fn update_file_size(&mut self, store: &BlockStore, index: usize, size: u64) -> Result<()> {
        if self.meta.resize(index, size) {
            self.meta.sync(store, self.at)?;
        }
        Ok(())
    }
}
