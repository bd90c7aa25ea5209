//! Progress spinners around the external disc tool

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use riivo::DiscTool;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .expect("invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Shows a spinner while the wrapped tool runs
pub struct SpinnerTool<T> {
    inner: T,
    visible: bool,
}

impl<T: DiscTool> SpinnerTool<T> {
    /// Wrap `inner`; a hidden spinner draws nothing
    pub fn new(inner: T, visible: bool) -> Self {
        Self { inner, visible }
    }

    fn with_spinner<F>(&self, message: String, f: F) -> riivo::Result<()>
    where
        F: FnOnce(&T) -> riivo::Result<()>,
    {
        let pb = create_spinner(&message);
        if !self.visible {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }

        let result = f(&self.inner);
        match &result {
            Ok(()) => pb.finish_with_message(format!("{message} done")),
            Err(_) => pb.abandon_with_message(format!("{message} failed")),
        }
        result
    }
}

impl<T: DiscTool> DiscTool for SpinnerTool<T> {
    fn extract(&self, image: &Path, dest: &Path) -> riivo::Result<()> {
        self.with_spinner(
            format!("Running \"wit EXTRACT\" on {}... (This may take a while)", file_name(image)),
            |tool| tool.extract(image, dest),
        )
    }

    fn copy(&self, src: &Path, image: &Path) -> riivo::Result<()> {
        self.with_spinner(
            format!("Running \"wit COPY\" to {}... (This may take a while)", file_name(image)),
            |tool| tool.copy(src, image),
        )
    }

    fn verify(&self, image: &Path) -> riivo::Result<()> {
        self.with_spinner(
            format!("Running \"wit VERIFY\" on {}... (This may take a while)", file_name(image)),
            |tool| tool.verify(image),
        )
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
