use indicatif::{ProgressBar, ProgressStyle};

/// A progress bar for `len` steps, hidden unless `show` is set.
pub(crate) fn progress_bar(show: bool, len: usize, prefix: &str) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::default_bar()
        .template("{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    let pb = ProgressBar::new(len as u64);
    pb.set_style(style);
    pb.set_prefix(prefix.to_string());
    pb
}
