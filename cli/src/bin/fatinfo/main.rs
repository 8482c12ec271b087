use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use fatarch::cpu::arch_to_cpu_type;
use fatarch::cpu::HOST_CPU_TYPE;
use fatarch::ArchiveSlice;
use fatarch::FatArchive;
use log::debug;

#[derive(Parser)]
#[clap(
    arg_required_else_help = true,
    about = "List and extract the slices of a fat binary"
)]
struct Args {
    /// Only show the slice for the specified architecture.
    #[arg(long = "arch", value_name = "architecture", conflicts_with = "host")]
    arch: Option<String>,
    /// Only show the slice for the architecture of this machine.
    #[arg(long = "host")]
    host: bool,
    /// Write the selected slice to the specified file.
    #[arg(short = 'x', long = "extract", value_name = "output")]
    extract: Option<PathBuf>,
    /// Fat binaries.
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "FILE"
    )]
    files: Vec<PathBuf>,
}

impl Args {
    fn target_cpu_type(&self) -> Result<Option<u32>, Error> {
        match self.arch {
            Some(ref arch) => Ok(Some(arch_to_cpu_type(arch)?)),
            None if self.host => Ok(Some(HOST_CPU_TYPE)),
            None => Ok(None),
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    match do_main() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn do_main() -> Result<ExitCode, Error> {
    let args = Args::parse();
    if args.files.is_empty() {
        return Err(Error::other("no files specified"));
    }
    let target = args.target_cpu_type()?;
    if let Some(ref output) = args.extract {
        let Some(target) = target else {
            return Err(Error::other("`--extract` requires `--arch` or `--host`"));
        };
        if args.files.len() != 1 {
            return Err(Error::other("`--extract` requires exactly one file"));
        }
        let path = &args.files[0];
        extract(path, target, output)
            .map_err(|e| Error::other(format!("failed to read {}: {}", path.display(), e)))?;
        return Ok(ExitCode::SUCCESS);
    }
    let print_names = args.files.len() > 1;
    for path in args.files.iter() {
        if print_names {
            println!("{}:", path.display());
        }
        print_fat(path, target)
            .map_err(|e| Error::other(format!("failed to read {}: {}", path.display(), e)))?;
    }
    Ok(ExitCode::SUCCESS)
}

fn print_fat(path: &Path, target: Option<u32>) -> Result<(), Error> {
    let fat = read_fat(path)?;
    match target {
        Some(cpu_type) => {
            let (index, slice) = fat.position_best_arch(cpu_type)?;
            println!("{}", format_slice(index, slice));
        }
        None => {
            for (i, slice) in fat.iter().enumerate() {
                println!("{}", format_slice(i, slice));
            }
        }
    }
    Ok(())
}

fn extract(path: &Path, cpu_type: u32, output: &Path) -> Result<(), Error> {
    let fat = read_fat(path)?;
    let slice = fat.select_best_arch(cpu_type)?;
    debug!(
        "writing {} byte(s) of {} to {}",
        slice.size(),
        slice.cpu_id(),
        output.display()
    );
    std::fs::write(output, slice.data())
        .map_err(|e| Error::other(format!("failed to write {}: {}", output.display(), e)))
}

fn read_fat(path: &Path) -> Result<FatArchive, Error> {
    let file = File::open(path)?;
    let fat = FatArchive::read(file)?;
    debug!("{}: {} slice(s)", path.display(), fat.len());
    Ok(fat)
}

fn format_slice(index: usize, slice: &ArchiveSlice) -> String {
    format!(
        "{}\t{}\t{:#x}\t{:#x}\t{}\t{}",
        index,
        slice.cpu_id().arch().unwrap_or("unknown"),
        slice.cpu_type(),
        slice.cpu_sub_type(),
        slice.offset(),
        slice.size()
    )
}
