//! External disc image tool
//!
//! Extraction, repacking and verification are delegated to Wiimms ISO Tools
//! (`wit`). This module knows nothing about disc formats; it only runs the
//! program and turns a failed run into [`Error::ExternalTool`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// Default program name of Wiimms ISO Tools
pub const DEFAULT_WIT: &str = "wit";

/// Operations the pipeline needs from a disc image tool
pub trait DiscTool {
    /// Extract `image` into the directory `dest`
    fn extract(&self, image: &Path, dest: &Path) -> Result<()>;

    /// Pack the directory `src` into `image`, replacing an existing file
    fn copy(&self, src: &Path, image: &Path) -> Result<()>;

    /// Check the integrity of `image`
    fn verify(&self, image: &Path) -> Result<()>;
}

impl<T: DiscTool + ?Sized> DiscTool for &T {
    fn extract(&self, image: &Path, dest: &Path) -> Result<()> {
        (**self).extract(image, dest)
    }

    fn copy(&self, src: &Path, image: &Path) -> Result<()> {
        (**self).copy(src, image)
    }

    fn verify(&self, image: &Path) -> Result<()> {
        (**self).verify(image)
    }
}

/// [`DiscTool`] backed by the `wit` command-line program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wit {
    program: PathBuf,
}

impl Wit {
    /// Use `program` as the `wit` executable
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The executable that will be run
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, args: &[OsString]) -> Result<String> {
        let command = render_command(&self.program, args);
        debug!("Running command: {command}");

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| Error::ExternalTool {
                command: command.clone(),
                code: None,
                stderr: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            return Err(Error::ExternalTool {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        debug!("{}", stdout.trim_end());
        Ok(stdout)
    }
}

impl Default for Wit {
    fn default() -> Self {
        Self::new(DEFAULT_WIT)
    }
}

impl DiscTool for Wit {
    fn extract(&self, image: &Path, dest: &Path) -> Result<()> {
        self.run(&["EXTRACT".into(), image.into(), dest.into()])
            .map(drop)
    }

    fn copy(&self, src: &Path, image: &Path) -> Result<()> {
        self.run(&["COPY".into(), src.into(), image.into(), "--overwrite".into()])
            .map(drop)
    }

    fn verify(&self, image: &Path) -> Result<()> {
        self.run(&["VERIFY".into(), image.into()]).map(drop)
    }
}

/// Printable form of a command line, quoting arguments with spaces
fn render_command(program: &Path, args: &[OsString]) -> String {
    std::iter::once(program.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|arg| {
            let arg = arg.to_string_lossy();
            if arg.contains(' ') {
                format!("\"{arg}\"")
            } else {
                arg.into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
