use std::cell::RefCell;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use block_dev::{BlockDevice, BlockError};
use flatfs::BLOCK_SIZE;
use send_wrapper::SendWrapper;

/// 以宿主机上的文件作为块设备
#[derive(Debug)]
pub struct BlockFile {
    inner: SendWrapper<RefCell<File>>,
    num_blocks: usize,
}

impl BlockFile {
    pub fn new(fd: File) -> std::io::Result<Self> {
        let num_blocks = (fd.metadata()?.len() / BLOCK_SIZE as u64) as usize;
        Ok(Self {
            inner: SendWrapper::new(RefCell::new(fd)),
            num_blocks,
        })
    }

    fn seek(file: &mut File, block_id: usize) -> Result<(), BlockError> {
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))
            .map(|_| ())
            .map_err(|e| {
                log::error!("seeking to block {block_id}: {e}");
                BlockError::Device
            })
    }
}

impl BlockDevice for BlockFile {
    fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), BlockError> {
        if block_id >= self.num_blocks {
            return Err(BlockError::OutOfRange);
        }
        let mut file = self.inner.borrow_mut();
        Self::seek(&mut file, block_id)?;
        file.read_exact(buf).map_err(|e| {
            log::error!("reading block {block_id}: {e}");
            BlockError::ShortTransfer
        })
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), BlockError> {
        if block_id >= self.num_blocks {
            return Err(BlockError::OutOfRange);
        }
        let mut file = self.inner.borrow_mut();
        Self::seek(&mut file, block_id)?;
        file.write_all(buf).map_err(|e| {
            log::error!("writing block {block_id}: {e}");
            BlockError::ShortTransfer
        })
    }

    fn flush(&self) -> Result<(), BlockError> {
        self.inner.borrow_mut().sync_data().map_err(|e| {
            log::error!("syncing image: {e}");
            BlockError::Device
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs::OpenOptions;

    use super::*;

    #[test]
    fn file_backed_blocks() {
        let path = std::env::temp_dir()
            .join(format!("flatfs-block-file-{}.img", std::process::id()));
        let fd = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .unwrap();
        fd.set_len(4 * BLOCK_SIZE as u64).unwrap();

        let dev = BlockFile::new(fd).unwrap();
        assert_eq!(4, dev.num_blocks());

        let block = [0xAB; BLOCK_SIZE];
        dev.write_block(3, &block).unwrap();
        let mut buf = [0; BLOCK_SIZE];
        dev.read_block(3, &mut buf).unwrap();
        assert_eq!(block, buf);
        assert_eq!(Err(BlockError::OutOfRange), dev.read_block(4, &mut buf));
        dev.flush().unwrap();

        std::fs::remove_file(path).unwrap();
    }
}
