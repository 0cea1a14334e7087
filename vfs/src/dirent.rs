use alloc::string::String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// 起始块号，充当inode编号
    pub inode: u64,
    pub ty: DirEntryType,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DirEntryType {
    Directory,
    #[default]
    Regular,
}
