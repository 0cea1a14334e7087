//! 数据传输层：沿着块链表按偏移读写文件内容。

use vfs::{Error, Result};

use crate::volume::{FatTable, FileRecord};
use crate::{BLOCK_SIZE, BlockId, BlockStore};

/// 文件记录指向一条块链表，这就是本文件系统中的inode。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    start: BlockId,
    size: usize,
}

impl Inode {
    pub const fn new(start: BlockId, size: usize) -> Self {
        Self { start, size }
    }

    pub const fn start(&self) -> BlockId {
        self.start
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    /// 从`offset`起读满`buf`，文件尾之后的部分不读。
    ///
    /// 偏移落在文件尾及其后时读出0字节。
    pub fn read_at(&self, offset: usize, buf: &mut [u8], store: &BlockStore) -> Result<usize> {
        if buf.is_empty() || offset >= self.size {
            return Ok(0);
        }
        let len = buf.len().min(self.size - offset);

        let fat = FatTable::load(store)?;
        let (mut current, mut inner) = (self.start, offset);
        while inner >= BLOCK_SIZE {
            // 偏移在文件内，链表却先断了
            current = fat.next(current)?.ok_or_else(|| {
                log::error!("chain of block {} ends before offset {offset}", self.start);
                Error::Io
            })?;
            inner -= BLOCK_SIZE;
        }

        let mut read_size = 0;
        loop {
            let block_read_size = (BLOCK_SIZE - inner).min(len - read_size);
            let block = store.read(current)?;
            buf[read_size..read_size + block_read_size]
                .copy_from_slice(&block[inner..inner + block_read_size]);
            read_size += block_read_size;
            inner = 0;

            if read_size == len {
                break;
            }
            match fat.next(current)? {
                Some(next) => current = next,
                None => {
                    log::warn!(
                        "chain of block {} is shorter than its size {}",
                        self.start,
                        self.size
                    );
                    break;
                }
            }
        }

        Ok(read_size)
    }

    /// 从`offset`起写入`buf`，必要时延长链表。
    ///
    /// 磁盘写满时提前结束，返回已写入的字节数。
    /// 文件大小随之变为`max(size, offset + 写入字节数)`，由调用者负责落盘。
    pub fn write_at(&mut self, offset: usize, buf: &[u8], store: &BlockStore) -> Result<usize> {
        if offset > self.size {
            return Err(Error::OffsetTooLarge);
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let mut fat = FatTable::load(store)?;
        let (mut current, mut inner) = (self.start, offset);
        // 新接上的块不必读出旧内容
        let mut fresh = false;
        while inner >= BLOCK_SIZE {
            current = match fat.next(current)? {
                Some(next) => next,
                // 文件恰好填满链尾块，从下一块的开头追加
                None if inner == BLOCK_SIZE && offset == self.size => {
                    match Self::grow(&mut fat, current, store)? {
                        Some(next) => {
                            fresh = true;
                            next
                        }
                        None => return Ok(0),
                    }
                }
                None => {
                    log::error!("chain of block {} ends before offset {offset}", self.start);
                    return Err(Error::Io);
                }
            };
            inner -= BLOCK_SIZE;
        }

        let mut wrote_size = 0;
        loop {
            let block_write_size = (BLOCK_SIZE - inner).min(buf.len() - wrote_size);
            let mut block = if fresh {
                [0; BLOCK_SIZE]
            } else {
                store.read(current)?
            };
            block[inner..inner + block_write_size]
                .copy_from_slice(&buf[wrote_size..wrote_size + block_write_size]);
            store.write(current, &block)?;
            wrote_size += block_write_size;
            inner = 0;

            if wrote_size == buf.len() {
                break;
            }
            match fat.next(current)? {
                Some(next) => {
                    current = next;
                    fresh = false;
                }
                None => match Self::grow(&mut fat, current, store)? {
                    Some(next) => {
                        current = next;
                        fresh = true;
                    }
                    None => break,
                },
            }
        }

        if wrote_size < buf.len() {
            log::warn!(
                "short write to chain of block {}: {wrote_size} of {} bytes",
                self.start,
                buf.len()
            );
        }
        self.size = self.size.max(offset + wrote_size);
        Ok(wrote_size)
    }

    /// 链表占用的块
    pub fn blocks(&self, store: &BlockStore) -> Result<usize> {
        FatTable::load(store)?.chain(self.start).map(|chain| chain.len())
    }

    /// 延长链表并立刻落盘分配表；磁盘已满时返回`None`
    fn grow(fat: &mut FatTable, tail: BlockId, store: &BlockStore) -> Result<Option<BlockId>> {
        match fat.extend(tail) {
            Ok(next) => {
                fat.sync(store)?;
                Ok(Some(next))
            }
            Err(Error::DiskFull) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl From<&FileRecord> for Inode {
    fn from(file: &FileRecord) -> Self {
        Self::new(file.start, file.size as usize)
    }
}
