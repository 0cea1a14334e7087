//! 路径解析
//!
//! 命名空间只有两层：`/`、`/dir`、`/dir/name.ext`。

use vfs::{Error, Result};

use crate::volume::{Ext, Name};

/// 切分后的路径，各部分尚未校验长度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsPath<'a> {
    Root,
    Directory(&'a str),
    File {
        dir: &'a str,
        name: &'a str,
        /// 第一个`.`之后的全部内容，可以为空
        ext: &'a str,
    },
}

/// 定长名字表示的路径
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Root,
    Directory(Name),
    File(Name, Name, Ext),
}

impl<'a> FsPath<'a> {
    pub fn parse(path: &'a str) -> Result<Self> {
        let rest = path.strip_prefix('/').ok_or(Error::InvalidPath)?;
        if rest.is_empty() {
            return Ok(Self::Root);
        }
        if rest.contains('\0') {
            return Err(Error::InvalidPath);
        }

        // 只有目录可以带结尾的`/`
        let (rest, trailing_slash) = match rest.strip_suffix('/') {
            Some(rest) => (rest, true),
            None => (rest, false),
        };
        let mut cmps = rest.split('/');
        let dir = cmps.next().filter(|dir| !dir.is_empty());
        let file = cmps.next();
        if cmps.next().is_some() {
            log::debug!("{path:?} nests deeper than two levels");
            return Err(Error::InvalidPath);
        }

        match (dir, file) {
            (Some(dir), None) => Ok(Self::Directory(dir)),
            (Some(_), Some(_)) if trailing_slash => Err(Error::InvalidPath),
            (Some(dir), Some(file)) => {
                let (name, ext) = file.split_once('.').unwrap_or((file, ""));
                if name.is_empty() {
                    return Err(Error::InvalidPath);
                }
                Ok(Self::File { dir, name, ext })
            }
            _ => Err(Error::InvalidPath),
        }
    }

    /// 查找用：超长的部分截断
    pub fn lenient(self) -> Target {
        match self {
            Self::Root => Target::Root,
            Self::Directory(dir) => Target::Directory(Name::truncated(dir)),
            Self::File { dir, name, ext } => Target::File(
                Name::truncated(dir),
                Name::truncated(name),
                Ext::truncated(ext),
            ),
        }
    }

    /// 创建用：超长即报[`Error::NameTooLong`]
    pub fn strict(self) -> Result<Target> {
        Ok(match self {
            Self::Root => Target::Root,
            Self::Directory(dir) => Target::Directory(Name::new(dir)?),
            Self::File { dir, name, ext } => {
                Target::File(Name::new(dir)?, Name::new(name)?, Ext::new(ext)?)
            }
        })
    }
}

/// 宽松地解析路径
pub fn resolve(path: &str) -> Result<Target> {
    FsPath::parse(path).map(FsPath::lenient)
}
