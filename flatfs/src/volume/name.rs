//! 8.3文件名中的定长名字字段

use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

use vfs::{Error, Result};

/// 最多`N`个字节的名字。
///
/// 磁盘上占`N + 1`字节，末尾留给NUL；但解码时不依赖NUL，
/// 读到第一个NUL或读满`N`字节即止。
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedName<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

/// 目录名与文件主名
pub type Name = FixedName<8>;

/// 扩展名
pub type Ext = FixedName<3>;

impl<const N: usize> FixedName<N> {
    /// 磁盘字段的宽度
    pub const FIELD_SIZE: usize = N + 1;

    pub const fn empty() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    /// 超长即报错
    pub fn new(name: &str) -> Result<Self> {
        if name.len() > N {
            return Err(Error::NameTooLong);
        }
        Ok(Self::from_bytes(name.as_bytes()))
    }

    /// 超长的部分直接截断，截断点落在字符边界上
    pub fn truncated(name: &str) -> Self {
        let mut end = name.len().min(N);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        Self::from_bytes(&name.as_bytes()[..end])
    }

    pub fn decode(field: &[u8]) -> Self {
        debug_assert_eq!(Self::FIELD_SIZE, field.len());
        let len = field
            .iter()
            .take(N)
            .position(|&c| c == 0)
            .unwrap_or(N);
        Self::from_bytes(&field[..len])
    }

    /// 写入字段并补齐NUL
    pub fn encode(&self, field: &mut [u8]) {
        debug_assert_eq!(Self::FIELD_SIZE, field.len());
        field.fill(0);
        field[..self.len].copy_from_slice(self.as_bytes());
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    fn from_bytes(src: &[u8]) -> Self {
        let mut bytes = [0; N];
        bytes[..src.len()].copy_from_slice(src);
        Self {
            bytes,
            len: src.len(),
        }
    }
}

impl<const N: usize> Default for FixedName<N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<const N: usize> fmt::Display for FixedName<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

impl<const N: usize> fmt::Debug for FixedName<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_str_lossy())
    }
}
