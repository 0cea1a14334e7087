//! 块的抽象
//!
//! 镜像由定长的512字节块组成，块号即为唯一的“指针”。
//! [`BlockStore`]不做任何缓存：每次调用都直接读写设备，不会读到过期的块。

use alloc::sync::Arc;

use block_dev::BlockDevice;
use derive_more::{Display, From, Into};
use vfs::{Error, Result};

pub const BLOCK_SIZE: usize = 512;

pub type Block = [u8; BLOCK_SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Display)]
#[repr(transparent)]
pub struct BlockId(usize);

impl BlockId {
    /// 根目录块
    pub const ROOT: Self = Self(0);

    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

/// 镜像的块级读写
#[derive(Clone)]
pub struct BlockStore {
    /// 底层块设备的引用
    dev: Arc<dyn BlockDevice>,
    total_blocks: usize,
}

impl BlockStore {
    pub fn new(dev: Arc<dyn BlockDevice>) -> Self {
        let total_blocks = dev.num_blocks();
        Self { dev, total_blocks }
    }

    pub const fn total_blocks(&self) -> usize {
        self.total_blocks
    }

    /// 分配表位于镜像的最后一块
    pub const fn fat_block(&self) -> BlockId {
        BlockId(self.total_blocks - 1)
    }

    pub fn read(&self, id: BlockId) -> Result<Block> {
        self.check(id)?;
        let mut block = [0; BLOCK_SIZE];
        self.dev.read_block(id.0, &mut block).map_err(|e| {
            log::error!("failed to read block {id}: {e:?}");
            Error::from(e)
        })?;
        Ok(block)
    }

    pub fn write(&self, id: BlockId, block: &Block) -> Result<()> {
        self.check(id)?;
        self.dev.write_block(id.0, block).map_err(|e| {
            log::error!("failed to write block {id}: {e:?}");
            Error::from(e)
        })
    }

    #[inline]
    pub fn zeroize(&self, id: BlockId) -> Result<()> {
        self.write(id, &[0; BLOCK_SIZE])
    }

    pub fn flush(&self) -> Result<()> {
        self.dev.flush().map_err(Error::from)
    }

    fn check(&self, id: BlockId) -> Result<()> {
        if id.0 < self.total_blocks {
            Ok(())
        } else {
            log::error!(
                "block {id} is past the end of the image ({} blocks)",
                self.total_blocks
            );
            Err(Error::Io)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use block_dev::BlockError;
    use spin::Mutex;

    use super::*;

    /// 内存盘，单元测试用。
    ///
    /// `tests/common`里另有一份给集成测试；`#[cfg(test)]`的条目对集成测试不可见，只能各留一份。
    pub struct RamDisk(pub Mutex<Vec<u8>>);

    impl RamDisk {
        pub fn new(blocks: usize) -> Arc<Self> {
            Arc::new(Self(Mutex::new(vec![0; blocks * BLOCK_SIZE])))
        }
    }

    impl BlockDevice for RamDisk {
        fn num_blocks(&self) -> usize {
            self.0.lock().len() / BLOCK_SIZE
        }

        fn read_block(
            &self,
            block_id: usize,
            buf: &mut [u8],
        ) -> core::result::Result<(), BlockError> {
            let data = self.0.lock();
            let start = block_id * BLOCK_SIZE;
            let src = data.get(start..start + buf.len()).ok_or(BlockError::OutOfRange)?;
            buf.copy_from_slice(src);
            Ok(())
        }

        fn write_block(
            &self,
            block_id: usize,
            buf: &[u8],
        ) -> core::result::Result<(), BlockError> {
            let mut data = self.0.lock();
            let start = block_id * BLOCK_SIZE;
            let dst = data.get_mut(start..start + buf.len()).ok_or(BlockError::OutOfRange)?;
            dst.copy_from_slice(buf);
            Ok(())
        }
    }

    #[test]
    fn out_of_range() {
        let store = BlockStore::new(RamDisk::new(4));
        assert_eq!(BlockId::new(3), store.fat_block());
        assert!(store.read(BlockId::new(3)).is_ok());
        assert_eq!(Err(Error::Io), store.read(BlockId::new(4)));
        assert_eq!(Err(Error::Io), store.zeroize(BlockId::new(4)));
    }

    #[test]
    fn write_then_read() {
        let store = BlockStore::new(RamDisk::new(4));
        let mut block = [0; BLOCK_SIZE];
        block[..5].copy_from_slice(b"hello");
        store.write(BlockId::new(2), &block).unwrap();
        assert_eq!(block, store.read(BlockId::new(2)).unwrap());
        assert_eq!([0; BLOCK_SIZE], store.read(BlockId::new(1)).unwrap());
    }
}
