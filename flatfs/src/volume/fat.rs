//! 分配表
//!
//! 镜像的最后一块，每个块号对应一个[`Slot`]：空闲、链尾、保留，或者下一块的块号。
//! 目录元数据块与文件数据块都挂在由它串起的单向链表上。

use alloc::vec;
use alloc::vec::Vec;
use core::mem;

use vfs::{Error, Result};

use crate::{BLOCK_SIZE, Block, BlockId, BlockStore, Slot, SlotError};

/// 一块能容纳的槽位数，也是分配表能寻址的块数
pub const FAT_SLOTS: usize = BLOCK_SIZE / mem::size_of::<i16>();

#[derive(Debug, Clone)]
pub struct FatTable {
    slots: [Slot; FAT_SLOTS],
    /// 分配表所在块
    at: BlockId,
    /// 可分配块号的上界（不含）
    limit: usize,
    modified: bool,
}

impl FatTable {
    /// 读出分配表；若从未初始化则就地初始化（落盘要等到[`FatTable::sync`]）
    pub fn load(store: &BlockStore) -> Result<Self> {
        let at = store.fat_block();
        let mut table = Self::decode(&store.read(at)?, at);
        table.init_if_needed();
        Ok(table)
    }

    pub fn sync(&mut self, store: &BlockStore) -> Result<()> {
        if self.modified {
            store.write(self.at, &self.encode())?;
            self.modified = false;
        }
        Ok(())
    }

    /// 以块号从小到大的顺序寻找空闲块，并将其标为链尾
    pub fn alloc(&mut self) -> Result<BlockId> {
        let Some(index) = self.slots[..self.limit]
            .iter()
            .position(|&slot| slot == Slot::FREE)
        else {
            log::warn!("no free block left");
            return Err(Error::DiskFull);
        };

        self.slots[index] = Slot::EOF;
        self.modified = true;
        log::debug!("allocated block {index}");
        Ok(BlockId::new(index))
    }

    /// 获取下一块的块号。
    /// `Ok(None)`表示`id`为链表上最后一块；链接指向空闲或保留块都视为损坏。
    pub fn next(&self, id: BlockId) -> Result<Option<BlockId>> {
        let slot = self.slot(id)?;
        match slot.validate() {
            Ok(next) if self.in_use(next) => Ok(Some(next)),
            Err(SlotError::Eof) => Ok(None),
            _ => {
                log::error!("block {id} carries a broken link {}", slot.raw());
                Err(Error::Io)
            }
        }
    }

    /// 在链尾`tail`之后接上新分配的块
    pub fn extend(&mut self, tail: BlockId) -> Result<BlockId> {
        if self.next(tail)?.is_some() {
            log::error!("block {tail} is not the tail of its chain");
            return Err(Error::Io);
        }

        let new = self.alloc()?;
        self.slots[tail.index()] = Slot::link(new);
        log::debug!("chain extended: {tail} -> {new}");
        Ok(new)
    }

    /// 从`start`开始的整条链表
    pub fn chain(&self, start: BlockId) -> Result<Vec<BlockId>> {
        let mut chain = vec![start];
        let mut current = start;
        while let Some(next) = self.next(current)? {
            // 链表比可寻址的块还多，必然成环
            if chain.len() >= self.limit {
                log::error!("chain starting at {start} loops");
                return Err(Error::Io);
            }
            chain.push(next);
            current = next;
        }
        Ok(chain)
    }

    /// 剩余的空闲块数
    pub fn free_blocks(&self) -> usize {
        self.slots[..self.limit]
            .iter()
            .filter(|&&slot| slot == Slot::FREE)
            .count()
    }
}

impl FatTable {
    fn decode(block: &Block, at: BlockId) -> Self {
        let mut slots = [Slot::FREE; FAT_SLOTS];
        for (slot, raw) in slots.iter_mut().zip(block.chunks_exact(2)) {
            *slot = Slot::new(i16::from_le_bytes([raw[0], raw[1]]));
        }

        Self {
            slots,
            at,
            limit: at.index().min(FAT_SLOTS),
            modified: false,
        }
    }

    fn encode(&self) -> Block {
        let mut block = [0; BLOCK_SIZE];
        for (slot, raw) in self.slots.iter().zip(block.chunks_exact_mut(2)) {
            raw.copy_from_slice(&slot.raw().to_le_bytes());
        }
        block
    }

    /// 0号槽位为0说明镜像刚被清零。
    /// 初始化后0号块（根目录）以及分配表自身和它之后的块都是保留的。
    fn init_if_needed(&mut self) {
        if self.slots[0] != Slot::UNINIT {
            return;
        }

        log::info!("initializing allocation table at block {}", self.at);
        self.slots.fill(Slot::FREE);
        self.slots[0] = Slot::RESERVED;
        self.slots[self.limit..].fill(Slot::RESERVED);
        self.modified = true;
    }

    /// 已分配给某条链表
    fn in_use(&self, id: BlockId) -> bool {
        id.index() < self.limit && !matches!(self.slots[id.index()], Slot::FREE | Slot::RESERVED)
    }

    fn slot(&self, id: BlockId) -> Result<Slot> {
        if id == BlockId::ROOT || id.index() >= self.limit {
            log::error!("block {id} is not a chain block");
            return Err(Error::Io);
        }
        Ok(self.slots[id.index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::tests::RamDisk;

    fn store(blocks: usize) -> BlockStore {
        BlockStore::new(RamDisk::new(blocks))
    }

    #[test]
    fn lazy_init() {
        let store = store(8);
        let mut fat = FatTable::load(&store).unwrap();
        assert_eq!(Slot::RESERVED, fat.slots[0]);
        assert_eq!(Slot::FREE, fat.slots[6]);
        // 分配表自身
        assert_eq!(Slot::RESERVED, fat.slots[7]);
        assert_eq!(Slot::RESERVED, fat.slots[FAT_SLOTS - 1]);
        assert_eq!(6, fat.free_blocks());

        // 初始化仅在内存中，同步之后才落盘
        assert_eq!([0; BLOCK_SIZE], store.read(BlockId::new(7)).unwrap());
        fat.sync(&store).unwrap();
        let raw = store.read(BlockId::new(7)).unwrap();
        assert_eq!((-3i16).to_le_bytes(), raw[..2]);
        assert_eq!((-1i16).to_le_bytes(), raw[2..4]);
    }

    #[test]
    fn alloc_lowest_first() {
        let store = store(5);
        let mut fat = FatTable::load(&store).unwrap();
        assert_eq!(BlockId::new(1), fat.alloc().unwrap());
        assert_eq!(BlockId::new(2), fat.alloc().unwrap());
        assert_eq!(BlockId::new(3), fat.alloc().unwrap());
        // 4号块是分配表
        assert_eq!(Err(Error::DiskFull), fat.alloc());
        assert_eq!(Ok(None), fat.next(BlockId::new(3)));
    }

    #[test]
    fn extend_and_walk() {
        let store = store(16);
        let mut fat = FatTable::load(&store).unwrap();
        let a = fat.alloc().unwrap();
        let b = fat.alloc().unwrap();
        let a2 = fat.extend(a).unwrap();
        let a3 = fat.extend(a2).unwrap();
        fat.sync(&store).unwrap();

        let fat = FatTable::load(&store).unwrap();
        assert_eq!(vec![a, a2, a3], fat.chain(a).unwrap());
        assert_eq!(vec![b], fat.chain(b).unwrap());
        assert_eq!(Ok(Some(a2)), fat.next(a));
    }

    #[test]
    fn extend_requires_tail() {
        let store = store(16);
        let mut fat = FatTable::load(&store).unwrap();
        let a = fat.alloc().unwrap();
        fat.extend(a).unwrap();
        assert_eq!(Err(Error::Io), fat.extend(a));
    }

    #[test]
    fn broken_links() {
        let store = store(16);
        let mut fat = FatTable::load(&store).unwrap();
        let a = fat.alloc().unwrap();
        let b = fat.alloc().unwrap();

        // 指向空闲块
        fat.slots[a.index()] = Slot::link(BlockId::new(9));
        assert_eq!(Err(Error::Io), fat.next(a));

        // 成环
        fat.slots[a.index()] = Slot::link(b);
        fat.slots[b.index()] = Slot::link(a);
        assert_eq!(Err(Error::Io), fat.chain(a));

        // 根目录块与越界块都不属于任何链表
        assert_eq!(Err(Error::Io), fat.next(BlockId::ROOT));
        assert_eq!(Err(Error::Io), fat.next(BlockId::new(15)));
    }

    #[test]
    fn large_image_only_addresses_first_slots() {
        let store = store(1024);
        let mut fat = FatTable::load(&store).unwrap();
        assert_eq!(FAT_SLOTS - 1, fat.free_blocks());
        for _ in 0..FAT_SLOTS - 1 {
            fat.alloc().unwrap();
        }
        assert_eq!(Err(Error::DiskFull), fat.alloc());
    }
}
