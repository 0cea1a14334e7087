mod block_file;
mod cli;

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use block_dev::BlockDevice;
use clap::Parser;
use flatfs::{BLOCK_SIZE, Config, FlatFileSystem};
use typed_bytesize::ByteSizeIec;
use vfs::{DirEntryType, Permission, Stat};

pub use self::{
    block_file::BlockFile,
    cli::{Cli, Command},
};

fn main() -> io::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = {
        let default = Config::default();
        Config {
            max_dirs: cli.max_dirs.unwrap_or(default.max_dirs),
            max_files: cli.max_files.unwrap_or(default.max_files),
        }
    };

    match cli.command {
        Command::Format { blocks } => {
            // 默认256块，恰好是分配表能寻址的全部
            let disk_size = blocks
                .map(|blocks| blocks * BLOCK_SIZE as u64)
                .unwrap_or(ByteSizeIec::kib(128).0);
            let fd = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(&cli.image)?;
            fd.set_len(disk_size)?;

            let block_dev: Arc<dyn BlockDevice> = Arc::new(BlockFile::new(fd)?);
            let fs = FlatFileSystem::format(block_dev, config).map_err(fs_error)?;
            println!(
                "image={:?} blocks={} free={}",
                cli.image,
                disk_size / BLOCK_SIZE as u64,
                fs.free_blocks().map_err(fs_error)?
            );
        }
        Command::Mkdir { path } => {
            open(&cli.image, config)?.mkdir(&path).map_err(fs_error)?;
        }
        Command::Touch { path } => {
            open(&cli.image, config)?.mknod(&path).map_err(fs_error)?;
        }
        Command::Put {
            path,
            source,
            offset,
        } => {
            let fs = open(&cli.image, config)?;
            let data = fs::read(&source)?;
            match fs.mknod(&path) {
                Ok(()) | Err(vfs::Error::AlreadyExists) => {}
                Err(e) => return Err(fs_error(e)),
            }

            let wrote_size = fs.write_at(&path, offset, &data).map_err(fs_error)?;
            log::info!("source={source:?} path={path:?} wrote={wrote_size}");
            if wrote_size < data.len() {
                log::warn!("image is full, {} bytes dropped", data.len() - wrote_size);
            }
            println!("{wrote_size}");
        }
        Command::Cat {
            path,
            offset,
            length,
        } => {
            let fs = open(&cli.image, config)?;
            let size = fs.stat(&path).map_err(fs_error)?.size as usize;
            let mut buf = vec![0; length.unwrap_or(size.saturating_sub(offset))];
            let read_size = fs.read_at(&path, offset, &mut buf).map_err(fs_error)?;
            io::stdout().write_all(&buf[..read_size])?;
        }
        Command::Ls { path } => {
            let fs = open(&cli.image, config)?;
            for dirent in fs.read_dir(&path).map_err(fs_error)? {
                match dirent.ty {
                    DirEntryType::Directory => println!("{}/", dirent.name),
                    DirEntryType::Regular => println!("{}", dirent.name),
                }
            }
        }
        Command::Stat { path } => {
            let stat = open(&cli.image, config)?.stat(&path).map_err(fs_error)?;
            println!(
                "{} {} size={} blocks={} links={}",
                mode_string(&stat),
                path,
                stat.size,
                stat.blocks,
                stat.nlink
            );
        }
    }

    Ok(())
}

fn open(image: &Path, config: Config) -> io::Result<FlatFileSystem> {
    let fd = OpenOptions::new().read(true).write(true).open(image)?;
    let block_dev: Arc<dyn BlockDevice> = Arc::new(BlockFile::new(fd)?);
    FlatFileSystem::new(block_dev, config).map_err(fs_error)
}

fn fs_error(e: vfs::Error) -> io::Error {
    io::Error::other(format!("{e} (errno {})", -e.errno()))
}

/// `drwxr-xr-x`
fn mode_string(stat: &Stat) -> String {
    const BITS: [(Permission, char); 9] = [
        (Permission::OwnerRead, 'r'),
        (Permission::OwnerWrite, 'w'),
        (Permission::OwnerExec, 'x'),
        (Permission::GroupRead, 'r'),
        (Permission::GroupWrite, 'w'),
        (Permission::GroupExec, 'x'),
        (Permission::OtherRead, 'r'),
        (Permission::OtherWrite, 'w'),
        (Permission::OtherExec, 'x'),
    ];

    let ty = match stat.mode {
        DirEntryType::Directory => 'd',
        DirEntryType::Regular => '-',
    };
    std::iter::once(ty)
        .chain(
            BITS.iter()
                .map(|&(bit, c)| if stat.perm.contains(bit) { c } else { '-' }),
        )
        .collect()
}
