use indicatif::{ProgressBar, ProgressStyle};

const PROGRESS_TEMPLATE: &str = "{msg:>14} [{bar:40}] {pos}/{len} messages";

/// Progress over `len` labeled messages, hidden entirely when `quiet`.
pub fn create_progress_bar(quiet: bool, len: usize, message: &'static str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(len as u64).with_message(message);
    match ProgressStyle::with_template(PROGRESS_TEMPLATE) {
        Ok(style) => progress.with_style(style.progress_chars("=> ")),
        Err(err) => {
            log::debug!("Falling back to the default progress style: {}", err);
            progress
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_bar_is_hidden() {
        assert!(create_progress_bar(true, 10, "Counting").is_hidden());
        assert_eq!(create_progress_bar(false, 10, "Counting").length(), Some(10));
    }
}
