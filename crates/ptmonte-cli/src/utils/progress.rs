use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use ptmonte::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Drives one indicatif bar from the engine's progress events of a single chain.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new(label: impl Into<String>) -> Self {
        let pb = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr())
            .with_style(Self::spinner_style())
            .with_prefix(label.into())
            .with_message("Initializing...");
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    /// A handler whose bar is drawn as one line of `multi`.
    pub fn attached(multi: &MultiProgress, label: impl Into<String>) -> Self {
        let handler = Self::new(label);
        if let Ok(mut pb) = handler.pb.lock() {
            *pb = multi.add(pb.clone());
        }
        handler
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    pb.reset();
                    pb.set_length(0);
                    pb.set_style(Self::spinner_style());
                    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb.set_message(name);
                }
                Progress::PhaseFinish => {
                    pb.disable_steady_tick();
                    pb.finish_with_message("done");
                }
                Progress::TaskStart { total_steps } => {
                    pb.disable_steady_tick();
                    pb.reset();
                    pb.set_length(total_steps);
                    pb.set_position(0);
                    pb.set_style(Self::bar_style());
                }
                Progress::TaskIncrement { steps } => {
                    pb.inc(steps);
                }
                Progress::TaskFinish => {
                    let length = pb.length().unwrap_or(0);
                    if pb.position() < length {
                        pb.set_position(length);
                    }
                    pb.finish();
                }
                Progress::Message(msg) => {
                    if pb.is_finished() {
                        pb.set_message(msg);
                    } else {
                        pb.println(format!("  {}", msg));
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{prefix:.bold} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{prefix:.bold} {msg:<14} [{bar:40.cyan/blue}] {human_pos}/{human_len} ({per_sec}, {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::new("chain 0");
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert_eq!(pb.prefix(), "chain 0");
        assert!(pb.is_finished());
    }

    #[test]
    fn callback_tracks_step_increments() {
        let handler = CliProgressHandler::new("chain 0");
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Production" });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "Production");
            assert!(!pb.is_finished());
        }

        callback(Progress::TaskStart { total_steps: 5000 });
        callback(Progress::TaskIncrement { steps: 1000 });
        callback(Progress::TaskIncrement { steps: 1000 });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.length(), Some(5000));
            assert_eq!(pb.position(), 2000);
        }

        callback(Progress::TaskFinish);
        {
            let pb = handler.pb.lock().unwrap();
            assert!(pb.is_finished());
            assert_eq!(pb.position(), 5000);
        }

        callback(Progress::PhaseFinish);
        assert_eq!(handler.pb.lock().unwrap().message(), "done");
    }

    #[test]
    fn attached_handlers_share_one_multi_progress() {
        let multi = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let handlers: Vec<_> = (0..3)
            .map(|i| CliProgressHandler::attached(&multi, format!("chain {}", i)))
            .collect();

        let workers: Vec<_> = handlers
            .iter()
            .map(|handler| {
                let callback = handler.get_callback();
                thread::spawn(move || {
                    callback(Progress::TaskStart { total_steps: 10 });
                    callback(Progress::TaskIncrement { steps: 10 });
                    callback(Progress::TaskFinish);
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        for handler in &handlers {
            let pb = handler.pb.lock().unwrap();
            assert!(pb.is_finished());
            assert_eq!(pb.position(), 10);
        }
    }
}
