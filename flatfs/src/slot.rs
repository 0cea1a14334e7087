use crate::BlockId;

/// 分配表中的一项：描述同号块的状态，或指向链表中的下一块。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Slot(i16);

#[derive(Debug, PartialEq, Eq)]
pub enum SlotError {
    Free,
    Reserved,
    Eof,
    /// 取值不在任何合法范围内
    Corrupt,
}

impl Slot {
    /// 全零镜像上0号槽位的取值，表示分配表从未初始化
    pub const UNINIT: Self = Self(0);

    pub const FREE: Self = Self(-1);

    pub const EOF: Self = Self(-2);

    /// 永不分配的块，如根目录块与分配表自身
    pub const RESERVED: Self = Self(-3);

    pub const fn new(raw: i16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i16 {
        self.0
    }

    /// 指向`id`的链接。分配表只覆盖256块，块号必然放得进`i16`。
    pub fn link(id: BlockId) -> Self {
        debug_assert!(id.index() <= i16::MAX as usize);
        Self(id.index() as i16)
    }

    pub fn validate(self) -> Result<BlockId, SlotError> {
        match self {
            Self::FREE => Err(SlotError::Free),
            Self::EOF => Err(SlotError::Eof),
            Self::RESERVED => Err(SlotError::Reserved),
            // 0号块是根目录，不可能出现在链表中
            Self(raw) if raw > 0 => Ok(BlockId::new(raw as usize)),
            _ => Err(SlotError::Corrupt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate() {
        assert_eq!(Ok(BlockId::new(7)), Slot::link(BlockId::new(7)).validate());
        assert_eq!(Err(SlotError::Free), Slot::FREE.validate());
        assert_eq!(Err(SlotError::Eof), Slot::EOF.validate());
        assert_eq!(Err(SlotError::Reserved), Slot::RESERVED.validate());
        assert_eq!(Err(SlotError::Corrupt), Slot::UNINIT.validate());
        assert_eq!(Err(SlotError::Corrupt), Slot::new(-9).validate());
    }
}
