use std::io::{BufRead, Write};

use qdeck_api::{Confirm, ConfirmPrompt};

/// Asks on the terminal; anything but `y`/`yes` declines.
pub struct TtyConfirm;

#[async_trait::async_trait]
impl Confirm for TtyConfirm {
    async fn confirm(&self, prompt: ConfirmPrompt) -> bool {
        tokio::task::spawn_blocking(move || {
            let mut err = std::io::stderr();
            let _ = writeln!(err, "{}\n{}\n{}", prompt.title, prompt.message, prompt.detail);
            let _ = write!(err, "{}? [y/N] ", prompt.accept_label);
            let _ = err.flush();
            let mut line = String::new();
            if std::io::stdin().lock().read_line(&mut line).is_err() {
                return false;
            }
            is_yes(&line)
        })
        .await
        .unwrap_or(false)
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
