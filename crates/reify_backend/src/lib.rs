pub mod contract;
pub mod erase;
pub mod error;
pub mod interpreter;
pub mod java_gen;

use crate::error::Error;
use crate::java_gen::java_builder as java;
use reify_common::config::{BuildConfig, EraseOptions, JavaConfig};
use reify_common::data::bridge_ast as bridge;
use reify_common::data::primitive::PrimitiveKind;
use std::fs;
use std::io;

/// Erases `program` and runs it in the reference interpreter.
pub fn run(
    program: &bridge::Program,
    options: &EraseOptions,
) -> Result<interpreter::Value, Error> {
    let erased = erase::erase(program, options).map_err(Error::EraseFailed)?;
    interpreter::interpret(&erased).map_err(Error::RunFailed)
}

/// Erases `program` and lowers it to a Java class named `class_name`.
pub fn compile_to_java(
    program: &bridge::Program,
    class_name: &str,
    config: &BuildConfig,
) -> Result<java::CompilationUnit, Error> {
    let erased = erase::erase(program, &config.erase).map_err(Error::EraseFailed)?;
    java_gen::emit::emit_class(&erased, class_name, &config.java).map_err(Error::EmitFailed)
}

pub fn companion_classes(
    kinds: &[PrimitiveKind],
    config: &JavaConfig,
) -> Vec<java::CompilationUnit> {
    kinds
        .iter()
        .map(|kind| java_gen::companion::companion_class(*kind, config))
        .collect()
}

/// Writes each unit to `<output_dir>/<Class>.java`, or to stdout if there is no output directory.
pub fn write_units(units: &[java::CompilationUnit], config: &BuildConfig) -> Result<(), Error> {
    match &config.output_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .map_err(|err| Error::CouldNotCreateOutputDir(dir.clone(), err))?;
            for unit in units {
                let path = dir.join(format!("{}.java", unit.class.name.0));
                let mut file = io::BufWriter::new(
                    fs::File::create(&path)
                        .map_err(|err| Error::CouldNotWriteOutputFile(path.clone(), err))?,
                );
                java_gen::write_unit(unit, &config.java, &mut file)
                    .and_then(|()| io::Write::flush(&mut file))
                    .map_err(|err| Error::CouldNotWriteOutputFile(path.clone(), err))?;
                log::info!("wrote {}", path.display());
            }
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for unit in units {
                java_gen::write_unit(unit, &config.java, &mut out)
                    .map_err(Error::CouldNotWriteOutput)?;
            }
        }
    }
    Ok(())
}
