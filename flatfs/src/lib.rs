//! 单文件镜像上的两层文件系统：根目录下只有目录，目录下只有8.3命名的文件。
//!
//! 自下而上：
//!
//! 1. [`BlockStore`]：整块读写镜像，不做缓存
//! 2. [`volume`]：根目录块、目录元数据块、分配表的磁盘格式
//! 3. 目录层：根目录索引与目录元数据的维护
//! 4. [`Inode`]：沿块链表按偏移读写
//! 5. [`FlatFileSystem`]：按路径组织上述各层，供适配层调用

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod block;
mod control;
mod directory;
mod inode;
mod path;
mod slot;
pub mod volume;

pub use self::{
    block::{BLOCK_SIZE, Block, BlockId, BlockStore},
    control::{Config, FlatFileSystem},
    inode::Inode,
    path::{FsPath, Target, resolve},
    slot::{Slot, SlotError},
};
pub use vfs::{Error, Result};
