//! 文件系统与外部适配层之间交换的数据：错误、属性与目录项。

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod dirent;
mod error;
mod stat;

pub use self::{
    dirent::{DirEntry, DirEntryType},
    error::{Error, Result, errno},
    stat::{Permission, Stat},
};
