#![allow(dead_code)]

use std::sync::Arc;

use block_dev::{BlockDevice, BlockError};
use flatfs::{BLOCK_SIZE, Config, FlatFileSystem};
use spin::Mutex;

/// 内存盘，与单元测试里的那份相同，锁也用`spin`
pub struct RamDisk {
    inner: Mutex<Vec<u8>>,
}

impl RamDisk {
    pub fn new(num_blocks: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(vec![0; num_blocks * BLOCK_SIZE]),
        })
    }

    /// 直接取出某块的原始字节
    pub fn block(&self, block_id: usize) -> Vec<u8> {
        let data = self.inner.lock();
        data[block_id * BLOCK_SIZE..(block_id + 1) * BLOCK_SIZE].to_vec()
    }

    /// 绕过文件系统改写原始字节
    pub fn poke(&self, offset: usize, bytes: &[u8]) {
        let mut data = self.inner.lock();
        data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
}

impl BlockDevice for RamDisk {
    fn num_blocks(&self) -> usize {
        self.inner.lock().len() / BLOCK_SIZE
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), BlockError> {
        if block_id >= self.num_blocks() {
            return Err(BlockError::OutOfRange);
        }
        let data = self.inner.lock();
        let start = block_id * BLOCK_SIZE;
        buf.copy_from_slice(&data[start..start + buf.len()]);
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), BlockError> {
        if block_id >= self.num_blocks() {
            return Err(BlockError::OutOfRange);
        }
        let mut data = self.inner.lock();
        let start = block_id * BLOCK_SIZE;
        data[start..start + buf.len()].copy_from_slice(buf);
        Ok(())
    }
}

/// 格式化一块`num_blocks`块的内存盘
pub fn format(num_blocks: usize, config: Config) -> (Arc<RamDisk>, FlatFileSystem) {
    let disk = RamDisk::new(num_blocks);
    let fs = FlatFileSystem::format(disk.clone(), config).unwrap();
    (disk, fs)
}

pub fn names(fs: &FlatFileSystem, path: &str) -> Vec<String> {
    fs.read_dir(path)
        .unwrap()
        .into_iter()
        .map(|dirent| dirent.name)
        .collect()
}
