use enumflags2::{BitFlags, bitflags, make_bitflags};

use crate::DirEntryType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub mode: DirEntryType,
    pub perm: BitFlags<Permission>,
    /// Hard links
    pub nlink: u32,
    /// Optimal I/O block size
    pub block_size: u64,
    /// Occupying blocks
    pub blocks: u64,
    /// File size
    pub size: u64,
}

#[bitflags]
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    OtherExec = 0o001,
    OtherWrite = 0o002,
    OtherRead = 0o004,
    GroupExec = 0o010,
    GroupWrite = 0o020,
    GroupRead = 0o040,
    OwnerExec = 0o100,
    OwnerWrite = 0o200,
    OwnerRead = 0o400,
}

impl Stat {
    const S_IFDIR: u32 = 0o040000;
    const S_IFREG: u32 = 0o100000;

    /// 目录的权限恒为0755
    pub fn directory(block_size: u64, blocks: u64) -> Self {
        Self {
            mode: DirEntryType::Directory,
            perm: make_bitflags!(Permission::{
                OwnerRead | OwnerWrite | OwnerExec | GroupRead | GroupExec | OtherRead | OtherExec
            }),
            nlink: 2,
            block_size,
            blocks,
            size: 0,
        }
    }

    /// 文件的权限恒为0666
    pub fn file(block_size: u64, blocks: u64, size: u64) -> Self {
        Self {
            mode: DirEntryType::Regular,
            perm: make_bitflags!(Permission::{
                OwnerRead | OwnerWrite | GroupRead | GroupWrite | OtherRead | OtherWrite
            }),
            nlink: 1,
            block_size,
            blocks,
            size,
        }
    }

    /// `st_mode`：类型位与权限位
    pub fn st_mode(&self) -> u32 {
        let ty = match self.mode {
            DirEntryType::Directory => Self::S_IFDIR,
            DirEntryType::Regular => Self::S_IFREG,
        };
        ty | u32::from(self.perm.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn st_mode() {
        assert_eq!(0o040755, Stat::directory(512, 1).st_mode());
        assert_eq!(0o100666, Stat::file(512, 1, 5).st_mode());
    }
}
