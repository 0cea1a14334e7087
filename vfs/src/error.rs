use block_dev::BlockError;
use derive_more::Display;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[display(fmt = "malformed path")]
    InvalidPath,
    #[display(fmt = "name too long")]
    NameTooLong,
    #[display(fmt = "already exists")]
    AlreadyExists,
    #[display(fmt = "no such file or directory")]
    NotFound,
    /// 例如在子目录下再建目录
    #[display(fmt = "operation not permitted")]
    NotPermitted,
    #[display(fmt = "root directory is full")]
    RootFull,
    #[display(fmt = "directory is full")]
    DirectoryFull,
    #[display(fmt = "no free block left")]
    DiskFull,
    #[display(fmt = "offset beyond end of file")]
    OffsetTooLarge,
    /// 镜像读写失败或结构损坏
    #[display(fmt = "I/O error")]
    Io,
    #[display(fmt = "is a directory")]
    IsADirectory,
    #[display(fmt = "not a directory")]
    NotADirectory,
}

impl Error {
    /// 适配层所需的负值errno
    pub const fn errno(self) -> i32 {
        -(match self {
            Self::InvalidPath | Self::NotFound => errno::ENOENT,
            Self::NameTooLong => errno::ENAMETOOLONG,
            Self::AlreadyExists => errno::EEXIST,
            Self::NotPermitted | Self::RootFull | Self::DirectoryFull => errno::EPERM,
            Self::DiskFull => errno::ENOSPC,
            Self::OffsetTooLarge => errno::EFBIG,
            Self::Io => errno::EIO,
            Self::IsADirectory => errno::EISDIR,
            Self::NotADirectory => errno::ENOTDIR,
        })
    }
}

impl From<BlockError> for Error {
    fn from(_: BlockError) -> Self {
        Self::Io
    }
}

/// Linux errno values
pub mod errno {
    pub const EPERM: i32 = 1;
    pub const ENOENT: i32 = 2;
    pub const EIO: i32 = 5;
    pub const EEXIST: i32 = 17;
    pub const ENOTDIR: i32 = 20;
    pub const EISDIR: i32 = 21;
    pub const EFBIG: i32 = 27;
    pub const ENOSPC: i32 = 28;
    pub const ENAMETOOLONG: i32 = 36;
}
