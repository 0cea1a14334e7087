use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;

use block_dev::BlockDevice;
use spin::Mutex;
use vfs::{DirEntry, DirEntryType, Error, Result, Stat};

use crate::directory::Directory;
use crate::path::{self, FsPath, Target};
use crate::volume::{
    Ext, FAT_SLOTS, FatTable, MAX_DIRS_IN_ROOT, MAX_FILES_IN_DIR, Name, RootBlock,
};
use crate::{BLOCK_SIZE, BlockId, BlockStore, Inode};

/// 挂载参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// 根目录下最多几个目录，不超过[`MAX_DIRS_IN_ROOT`]
    pub max_dirs: usize,
    /// 每个目录下最多几个文件，不超过[`MAX_FILES_IN_DIR`]
    pub max_files: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_dirs: MAX_DIRS_IN_ROOT,
            max_files: MAX_FILES_IN_DIR,
        }
    }
}

impl Config {
    fn clamped(self) -> Self {
        Self {
            max_dirs: self.max_dirs.min(MAX_DIRS_IN_ROOT),
            max_files: self.max_files.min(MAX_FILES_IN_DIR),
        }
    }
}

/// 文件系统，也是适配层调用的全部接口。
///
/// 每个操作都持有同一把锁，多步的读-改-写不会交错。
pub struct FlatFileSystem {
    store: Mutex<BlockStore>,
    config: Config,
}

impl FlatFileSystem {
    /// 根目录块、至少一块数据块、分配表
    pub const MIN_BLOCKS: usize = 3;

    pub fn new(dev: Arc<dyn BlockDevice>, config: Config) -> Result<Self> {
        let store = BlockStore::new(dev);
        let total = store.total_blocks();
        if total < Self::MIN_BLOCKS {
            log::error!("image of {total} blocks is too small");
            return Err(Error::Io);
        }
        if total - 1 > FAT_SLOTS {
            log::warn!("only the first {FAT_SLOTS} of {total} blocks are addressable");
        }

        // 顺带校验根目录块
        RootBlock::load(&store)?;

        Ok(Self {
            store: Mutex::new(store),
            config: config.clamped(),
        })
    }

    /// 清空根目录块与分配表；分配表留到第一次分配时初始化
    pub fn format(dev: Arc<dyn BlockDevice>, config: Config) -> Result<Self> {
        let store = BlockStore::new(dev.clone());
        if store.total_blocks() < Self::MIN_BLOCKS {
            log::error!("image of {} blocks is too small", store.total_blocks());
            return Err(Error::Io);
        }
        store.zeroize(BlockId::ROOT)?;
        store.zeroize(store.fat_block())?;
        store.flush()?;
        log::info!("formatted image of {} blocks", store.total_blocks());

        Self::new(dev, config)
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn stat(&self, path: &str) -> Result<Stat> {
        let store = self.store.lock();
        let block_size = BLOCK_SIZE as u64;

        match path::resolve(path)? {
            Target::Root => Ok(Stat::directory(block_size, 1)),
            Target::Directory(name) => {
                Directory::find(&store, &name)?;
                Ok(Stat::directory(block_size, 1))
            }
            Target::File(dir, name, ext) => {
                let (_, file) = Directory::find(&store, &dir)?.find_file(&name, &ext)?;
                let inode = Inode::from(&file);
                Ok(Stat::file(
                    block_size,
                    inode.blocks(&store)? as u64,
                    file.size,
                ))
            }
        }
    }

    /// 目录下的项，按创建顺序；不含`.`与`..`
    pub fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>> {
        let store = self.store.lock();

        match path::resolve(path)? {
            Target::Root => Ok(RootBlock::load(&store)?
                .iter()
                .map(|dir| DirEntry {
                    inode: dir.start.index() as u64,
                    ty: DirEntryType::Directory,
                    name: dir.name.to_string(),
                })
                .collect()),
            Target::Directory(name) => Ok(Directory::find(&store, &name)?
                .meta()
                .iter()
                .map(|file| DirEntry {
                    inode: file.start.index() as u64,
                    ty: DirEntryType::Regular,
                    name: file.full_name(),
                })
                .collect()),
            Target::File(..) => Err(Error::NotADirectory),
        }
    }

    /// 只能在根目录下建目录
    pub fn mkdir(&self, path: &str) -> Result<()> {
        let name = match FsPath::parse(path)? {
            FsPath::Root => return Err(Error::AlreadyExists),
            FsPath::Directory(name) => Name::new(name)?,
            FsPath::File { .. } => return Err(Error::NotPermitted),
        };

        let store = self.store.lock();
        Directory::create(&store, name, self.config.max_dirs).map(|_| ())
    }

    /// 新建空文件
    pub fn mknod(&self, path: &str) -> Result<()> {
        let Target::File(dir, name, ext) = FsPath::parse(path)?.strict()? else {
            return Err(Error::NotPermitted);
        };

        let store = self.store.lock();
        let mut dir = Directory::find(&store, &dir)?;
        dir.create_file(&store, name, ext, self.config.max_files)
            .map(|_| ())
    }

    pub fn read_at(&self, path: &str, offset: usize, buf: &mut [u8]) -> Result<usize> {
        let store = self.store.lock();
        let (dir, name, ext) = Self::file_target(&store, path)?;

        let (_, file) = Directory::find(&store, &dir)?.find_file(&name, &ext)?;
        Inode::from(&file).read_at(offset, buf, &store)
    }

    /// 写入后按需更新文件大小
    pub fn write_at(&self, path: &str, offset: usize, buf: &[u8]) -> Result<usize> {
        let store = self.store.lock();
        let (dir, name, ext) = Self::file_target(&store, path)?;

        let mut dir = Directory::find(&store, &dir)?;
        let (index, file) = dir.find_file(&name, &ext)?;
        let mut inode = Inode::from(&file);
        let wrote_size = inode.write_at(offset, buf, &store)?;
        dir.update_file_size(&store, index, inode.size() as u64)?;

        Ok(wrote_size)
    }

    /// 文件占用的块，按链表顺序
    pub fn blocks(&self, path: &str) -> Result<Vec<BlockId>> {
        let store = self.store.lock();
        let (dir, name, ext) = Self::file_target(&store, path)?;

        let (_, file) = Directory::find(&store, &dir)?.find_file(&name, &ext)?;
        FatTable::load(&store)?.chain(file.start)
    }

    /// 剩余的空闲块数
    pub fn free_blocks(&self) -> Result<usize> {
        let store = self.store.lock();
        Ok(FatTable::load(&store)?.free_blocks())
    }
}

/// 不回收块，这些调用一律成功
impl FlatFileSystem {
    pub fn rmdir(&self, _path: &str) -> Result<()> {
        Ok(())
    }

    pub fn unlink(&self, _path: &str) -> Result<()> {
        Ok(())
    }

    pub fn truncate(&self, _path: &str, _size: usize) -> Result<()> {
        Ok(())
    }

    pub fn open(&self, _path: &str) -> Result<()> {
        Ok(())
    }

    pub fn release(&self, _path: &str) -> Result<()> {
        Ok(())
    }

    pub fn flush(&self, _path: &str) -> Result<()> {
        Ok(())
    }
}

impl FlatFileSystem {
    /// 路径须指向文件；指向目录时报[`Error::IsADirectory`]
    fn file_target(store: &BlockStore, path: &str) -> Result<(Name, Name, Ext)> {
        match path::resolve(path)? {
            Target::File(dir, name, ext) => Ok((dir, name, ext)),
            Target::Root => Err(Error::IsADirectory),
            Target::Directory(name) => {
                Directory::find(store, &name)?;
                Err(Error::IsADirectory)
            }
        }
    }
}
