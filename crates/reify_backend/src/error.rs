use crate::{erase, interpreter, java_gen::emit};
use reify_common::report_error::{report_error, Reportable};
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    EraseFailed(erase::Error),
    EmitFailed(emit::Error),
    RunFailed(interpreter::Error),
    CouldNotCreateOutputDir(PathBuf, io::Error),
    CouldNotWriteOutputFile(PathBuf, io::Error),
    CouldNotWriteOutput(io::Error),
}

impl Reportable for Error {
    fn report(&self, dest: &mut impl io::Write) -> io::Result<()> {
        use Error::*;

        match self {
            EraseFailed(err) => report_error(dest, "Erasure Failed", &err.to_string()),
            EmitFailed(err) => report_error(dest, "Java Emission Failed", &err.to_string()),
            RunFailed(err) => report_error(dest, "Execution Failed", &err.to_string()),
            CouldNotCreateOutputDir(path, err) => writeln!(
                dest,
                "Could not create output directory {}: {}",
                path.display(),
                err
            ),
            CouldNotWriteOutputFile(path, err) => {
                writeln!(dest, "Could not write output file {}: {}", path.display(), err)
            }
            CouldNotWriteOutput(err) => writeln!(dest, "Could not write output: {}", err),
        }
    }

    fn exit_status(&self) -> i32 {
        match self {
            Error::RunFailed(_) => 101,
            _ => 1,
        }
    }
}
