//! Clipboard and notification sinks
//!
//! Both are fire-and-forget: failures are logged, never returned.

use crate::model::Notification;

/// Receives the final location of a delivery as plain text
pub trait Clipboard: Send + Sync {
    /// Replaces the clipboard contents
    fn write_text(&self, text: &str);
}

/// Shows end-of-delivery notifications
pub trait Notifier: Send + Sync {
    /// Shows a notification; does nothing where unsupported
    fn show(&self, notification: &Notification);
}

/// Clipboard that only logs, for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogClipboard;

impl Clipboard for LogClipboard {
    fn write_text(&self, text: &str) {
        tracing::info!(text, "Clipboard");
    }
}

/// Notifier that only logs, for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, notification: &Notification) {
        tracing::info!(title = %notification.title, "{}", notification.body);
    }
}

/// System clipboard through `arboard`
///
/// A worker thread owns a single `arboard::Clipboard` for the lifetime of
/// this value. On X11 and Wayland the copied text is served by that handle,
/// so it must outlive the write. Dropping the clipboard joins the worker,
/// which lets arboard hand the contents to a clipboard manager before a
/// short-lived process exits.
#[cfg(feature = "desktop")]
#[derive(Debug)]
pub struct SystemClipboard {
    requests: Option<std::sync::mpsc::Sender<String>>,
    worker:   Option<std::thread::JoinHandle<()>>,
}

#[cfg(feature = "desktop")]
impl SystemClipboard {
    /// Starts the clipboard worker
    pub fn new() -> Self {
        let (tx, rx) = std::sync::mpsc::channel::<String>();
        let worker = std::thread::Builder::new()
            .name("shotpipe-clipboard".to_string())
            .spawn(move || serve_clipboard(rx))
            .map_err(|e| tracing::warn!("Failed to start clipboard worker: {}", e))
            .ok();

        Self {
            requests: Some(tx),
            worker,
        }
    }
}

#[cfg(feature = "desktop")]
impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "desktop")]
impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) {
        let sent = self
            .requests
            .as_ref()
            .is_some_and(|requests| requests.send(text.to_string()).is_ok());
        if !sent {
            tracing::warn!("Clipboard worker is not running, text not copied");
        }
    }
}

#[cfg(feature = "desktop")]
impl Drop for SystemClipboard {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("Clipboard worker panicked");
            }
        }
    }
}

/// Applies clipboard writes until the sender side closes
///
/// The handle is created on first use and recreated after a failed write.
#[cfg(feature = "desktop")]
fn serve_clipboard(requests: std::sync::mpsc::Receiver<String>) {
    let mut clipboard: Option<arboard::Clipboard> = None;

    for text in requests {
        if clipboard.is_none() {
            match arboard::Clipboard::new() {
                Ok(handle) => clipboard = Some(handle),
                Err(e) => {
                    tracing::warn!("Failed to open clipboard: {}", e);
                    continue;
                }
            }
        }

        let Some(handle) = clipboard.as_mut() else {
            continue;
        };
        if let Err(e) = handle.set_text(text) {
            tracing::warn!("Failed to copy to clipboard: {}", e);
            clipboard = None;
        }
    }
}

/// Desktop notifications through `notify-rust`
#[cfg(feature = "desktop")]
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
}

#[cfg(feature = "desktop")]
impl DesktopNotifier {
    /// Creates a notifier reporting as `app_name`
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

#[cfg(feature = "desktop")]
impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new("shotpipe")
    }
}

#[cfg(feature = "desktop")]
impl Notifier for DesktopNotifier {
    fn show(&self, notification: &Notification) {
        let result = notify_rust::Notification::new()
            .appname(&self.app_name)
            .summary(&notification.title)
            .body(&notification.body)
            .show();
        if let Err(e) = result {
            tracing::warn!("Failed to show notification: {}", e);
        }
    }
}

#[cfg(all(test, feature = "desktop"))]
mod tests {
    use super::*;

    #[test]
    fn test_system_clipboard_keeps_one_worker_for_all_writes() {
        let clipboard = SystemClipboard::new();
        assert!(clipboard.worker.is_some());

        // Headless hosts log the failure; either way the worker keeps serving
        clipboard.write_text("https://cdn.example.com/a.png");
        clipboard.write_text("/home/user/Screenshots/b.png");
        assert!(clipboard.requests.as_ref().is_some_and(|r| r.send(String::new()).is_ok()));

        // Joins the worker
        drop(clipboard);
    }

    #[test]
    fn test_system_clipboard_without_worker_does_not_panic() {
        let clipboard = SystemClipboard {
            requests: None,
            worker:   None,
        };
        clipboard.write_text("ignored");
    }
}
