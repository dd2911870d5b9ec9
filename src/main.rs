use anyhow::{bail, Context};
use ivfs::config::{default_log_path, parse_separator, ConfigOverrides};
use ivfs::logging::{LogLevel, Logger};
use ivfs::{FileHandle, Registry, VfsConfig};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let env_config = VfsConfig::from_env().context("failed to read IVFS_* environment")?;
    let (overrides, threads) = parse_args(&args)?;
    let config = env_config.merged_with(&overrides);

    let logger = Logger::from_config(&config);
    logger.clone().install().context("logger already installed")?;

    println!("ivfs demo - virtual file-handle manager");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    let registry = Registry::from_config(&config);
    run_demo(&registry, &logger, config.separator, threads)
}

fn run_demo(
    registry: &Registry,
    logger: &Logger,
    separator: char,
    threads: usize,
) -> anyhow::Result<()> {
    let paths: Vec<String> = (1..=threads)
        .map(|i| format!("FileFolder{}File{}.txt", separator, i))
        .collect();

    // 並列に作成
    let handles: Vec<FileHandle> = std::thread::scope(|scope| {
        let workers: Vec<_> = paths
            .iter()
            .map(|path| scope.spawn(move || registry.create(path)))
            .collect();
        workers
            .into_iter()
            .map(|worker| match worker.join() {
                Ok(result) => result.map_err(anyhow::Error::from),
                Err(_) => Err(anyhow::anyhow!("create worker panicked")),
            })
            .collect::<anyhow::Result<Vec<_>>>()
    })?;
    println!("File number: {}", registry.size());

    // 並列に書き込み
    std::thread::scope(|scope| {
        for (i, handle) in handles.iter().enumerate() {
            scope.spawn(move || {
                let message = format!("file data {}", i);
                if let Err(e) = registry.write(*handle, message.as_bytes()) {
                    log::warn!("write to {} failed: {}", handle, e);
                }
            });
        }
    });
    println!("File number: {}", registry.size());

    // 並列にクローズ
    std::thread::scope(|scope| {
        for handle in &handles {
            scope.spawn(move || registry.close(*handle));
        }
    });
    println!("File number: {}", registry.size());

    for path in &paths {
        let handle = registry.open(path)?;
        let mut buf = [0u8; 64];
        let count = registry.read(handle, &mut buf)?;
        println!("{}: {}", path, String::from_utf8_lossy(&buf[..count]));
        registry.close(handle);
    }

    if !registry.is_empty() {
        bail!("{} handles still open: {:?}", registry.size(), registry.open_paths());
    }
    logger.log_info(format!("demo finished with {} files", paths.len()));
    Ok(())
}

fn parse_args(args: &[String]) -> anyhow::Result<(ConfigOverrides, usize)> {
    let mut overrides = ConfigOverrides::default();
    let mut threads = 5;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--root" => {
                let value = iter.next().context("--root requires a directory")?;
                overrides.root = Some(PathBuf::from(value));
            }
            "--threads" => {
                let value = iter.next().context("--threads requires a number")?;
                threads = value
                    .parse()
                    .with_context(|| format!("invalid thread count: {}", value))?;
            }
            "--separator" => {
                let value = iter.next().context("--separator requires a character")?;
                overrides.separator = Some(parse_separator(value)?);
            }
            "--log-level" => {
                let value = iter.next().context("--log-level requires a level")?;
                let level = value
                    .parse::<LogLevel>()
                    .map_err(|_| anyhow::anyhow!("invalid log level: {}", value))?;
                overrides.log_level = Some(level);
            }
            "--log-file" => {
                overrides.log_file = match iter.clone().next() {
                    Some(next) if !next.starts_with('-') => {
                        iter.next();
                        Some(PathBuf::from(next))
                    }
                    _ => default_log_path(),
                };
            }
            other => bail!("unknown argument: {}", other),
        }
    }

    Ok((overrides, threads))
}
