//! System clipboard access.
//!
//! Writes happen on a dedicated thread that keeps the last clipboard instance
//! alive for a while. On Linux the owner must stay around long enough for
//! clipboard managers to read the contents.

use crate::controller::ClipboardWriter;
use anyhow::Result;
use std::sync::mpsc as std_mpsc;
use std::sync::OnceLock;
use std::time::Duration;

/// How long the clipboard owner is kept after the last write.
const HOLD: Duration = Duration::from_secs(2);
/// How long a caller waits for the manager thread to confirm a write.
const ACK_TIMEOUT: Duration = Duration::from_millis(500);

struct ClipboardJob {
    text: String,
    done: std_mpsc::Sender<Result<(), String>>,
}

// Global clipboard manager channel - initialized once on first use
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<ClipboardJob>> = OnceLock::new();

fn clipboard_manager() -> &'static std_mpsc::Sender<ClipboardJob> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<ClipboardJob>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            let mut held: Option<Clipboard> = None;
            loop {
                let job = match rx.recv_timeout(HOLD) {
                    Ok(job) => job,
                    Err(std_mpsc::RecvTimeoutError::Timeout) => {
                        held = None;
                        continue;
                    }
                    Err(std_mpsc::RecvTimeoutError::Disconnected) => break,
                };

                let clipboard = match held.take() {
                    Some(c) => Ok(c),
                    None => Clipboard::new(),
                };
                match clipboard {
                    Ok(mut clipboard) => {
                        let res = clipboard.set_text(job.text).map_err(|e| e.to_string());
                        if res.is_ok() {
                            held = Some(clipboard);
                        }
                        let _ = job.done.send(res);
                    }
                    Err(e) => {
                        let _ = job.done.send(Err(format!("clipboard unavailable: {e}")));
                    }
                }
            }
        });

        tx
    })
}

/// The desktop clipboard.
pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let (done_tx, done_rx) = std_mpsc::channel();
        clipboard_manager()
            .send(ClipboardJob {
                text: text.to_string(),
                done: done_tx,
            })
            .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;

        match done_rx.recv_timeout(ACK_TIMEOUT) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(anyhow::anyhow!(e)),
            Err(_) => Err(anyhow::anyhow!("Clipboard did not respond")),
        }
    }
}
