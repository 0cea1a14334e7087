//! # 块设备接口层
//!
//! 块设备是以**块**为单位存储数据的设备，例如磁盘镜像文件、内存盘等；
//! [`BlockDevice`] 就是对读写块设备的抽象，
//! 实现了此特质的类型称为**块设备驱动**。

#![no_std]

use core::any::Any;

/// 块设备驱动特质
///
/// `buf`的长度即为一次传输的块大小。
pub trait BlockDevice: Send + Sync + Any {
    /// 设备的总块数
    fn num_blocks(&self) -> usize;

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), BlockError>;

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), BlockError>;

    /// 把写入落到存储介质上
    fn flush(&self) -> Result<(), BlockError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockError {
    /// 块号越过了设备末尾
    OutOfRange,
    /// 读写的字节数不足一块
    ShortTransfer,
    /// 底层设备报错
    Device,
}
