use crate::coordinator::constants::*;
use crate::coordinator::error::{Result, SpeednetError};
use crate::coordinator::signal::{CompletionObserver, CompletionSignal};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle, TermLike};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Where the loading indicator draws its frames
#[derive(Debug, Clone)]
pub enum IndicatorTarget {
    /// The process stdout; indicatif hides itself when stdout is not a terminal
    Stdout,
    /// Frames are produced but never drawn
    Hidden,
    /// Any terminal-like sink
    Term(Arc<dyn TermLike>),
}

/// How the loading indicator is drawn
#[derive(Debug, Clone)]
pub struct IndicatorSettings {
    /// Delay between frames
    pub interval: Duration,
    pub target: IndicatorTarget,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(INDICATOR_INTERVAL_MS),
            target: IndicatorTarget::Stdout,
        }
    }
}

impl IndicatorSettings {
    /// Settings for non-interactive runs and tests
    pub fn hidden() -> Self {
        Self {
            target: IndicatorTarget::Hidden,
            ..Self::default()
        }
    }

    /// Draw to the given terminal instead of stdout
    pub fn on_term(term: Arc<dyn TermLike>) -> Self {
        Self {
            target: IndicatorTarget::Term(term),
            ..Self::default()
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self.target, IndicatorTarget::Hidden)
    }
}

/// Lets a shared terminal be handed to indicatif, which wants a `Box`
#[derive(Debug)]
struct SharedTerm(Arc<dyn TermLike>);

impl TermLike for SharedTerm {
    fn width(&self) -> u16 {
        self.0.width()
    }

    fn move_cursor_up(&self, n: usize) -> io::Result<()> {
        self.0.move_cursor_up(n)
    }

    fn move_cursor_down(&self, n: usize) -> io::Result<()> {
        self.0.move_cursor_down(n)
    }

    fn move_cursor_right(&self, n: usize) -> io::Result<()> {
        self.0.move_cursor_right(n)
    }

    fn move_cursor_left(&self, n: usize) -> io::Result<()> {
        self.0.move_cursor_left(n)
    }

    fn write_line(&self, s: &str) -> io::Result<()> {
        self.0.write_line(s)
    }

    fn write_str(&self, s: &str) -> io::Result<()> {
        self.0.write_str(s)
    }

    fn clear_line(&self) -> io::Result<()> {
        self.0.clear_line()
    }

    fn flush(&self) -> io::Result<()> {
        self.0.flush()
    }
}

/// Spinner running on a background thread until its completion signal is set.
///
/// The foreground keeps the [`CompletionSignal`]; the thread only holds an
/// observer. [`LoadingIndicator::stop`] sets the signal and joins the thread,
/// after which nothing else writes to the terminal from the background.
pub struct LoadingIndicator {
    signal: CompletionSignal,
    handle: Option<JoinHandle<u64>>,
}

impl LoadingIndicator {
    /// Spawn the indicator thread
    pub fn start(settings: IndicatorSettings) -> Result<Self> {
        let visible = settings.is_visible();
        let pb = Self::spinner(settings.target)?;
        let signal = CompletionSignal::new();
        let observer = signal.observer();
        let interval = settings.interval;

        debug!(
            interval_ms = interval.as_millis() as u64,
            visible = visible,
            "Starting loading indicator"
        );
        let handle = thread::Builder::new()
            .name("speednet-indicator".into())
            .spawn(move || run_indicator_loop(pb, observer, interval))?;

        Ok(Self {
            signal,
            handle: Some(handle),
        })
    }

    fn spinner(target: IndicatorTarget) -> Result<ProgressBar> {
        let target = match target {
            IndicatorTarget::Stdout => ProgressDrawTarget::stdout(),
            IndicatorTarget::Hidden => ProgressDrawTarget::hidden(),
            IndicatorTarget::Term(term) => {
                ProgressDrawTarget::term_like(Box::new(SharedTerm(term)))
            }
        };

        // indicatif shows the last tick string once finished
        let mut ticks: Vec<&str> = INDICATOR_FRAMES.to_vec();
        ticks.push(" ");

        let style = ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .map_err(|e| {
                SpeednetError::Indicator(format!("Failed to create spinner style: {}", e))
            })?
            .tick_strings(&ticks);

        let pb = ProgressBar::with_draw_target(None, target);
        pb.set_style(style);
        pb.set_message(LOADING_MESSAGE);
        Ok(pb)
    }

    /// Set the completion signal and wait for the thread to exit.
    ///
    /// Returns the number of frames the indicator rendered.
    pub fn stop(mut self) -> Result<u64> {
        self.signal.set();
        let handle = self
            .handle
            .take()
            .ok_or_else(|| SpeednetError::Indicator("indicator already stopped".into()))?;
        let frames = handle.join().map_err(|_| {
            warn!("Loading indicator thread panicked");
            SpeednetError::Indicator("indicator thread panicked".into())
        })?;
        debug!(frames = frames, "Loading indicator stopped");
        Ok(frames)
    }
}

impl Drop for LoadingIndicator {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.signal.set();
            let _ = handle.join();
        }
    }
}

/// Render frames in place until the signal is observed, then erase the line
fn run_indicator_loop(pb: ProgressBar, observer: CompletionObserver, interval: Duration) -> u64 {
    let mut frames = 0u64;
    while !observer.is_set() {
        pb.tick();
        frames += 1;
        if observer.wait_timeout(interval) {
            break;
        }
    }
    pb.finish_and_clear();
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Instant;

    /// Terminal that keeps every string written to it
    #[derive(Debug, Default)]
    struct LineLog {
        writes: Mutex<Vec<String>>,
    }

    impl LineLog {
        fn writes(&self) -> Vec<String> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl TermLike for LineLog {
        fn width(&self) -> u16 {
            80
        }

        fn move_cursor_up(&self, _n: usize) -> io::Result<()> {
            Ok(())
        }

        fn move_cursor_down(&self, _n: usize) -> io::Result<()> {
            Ok(())
        }

        fn move_cursor_right(&self, _n: usize) -> io::Result<()> {
            Ok(())
        }

        fn move_cursor_left(&self, _n: usize) -> io::Result<()> {
            Ok(())
        }

        fn write_line(&self, s: &str) -> io::Result<()> {
            self.write_str(s)
        }

        fn write_str(&self, s: &str) -> io::Result<()> {
            self.writes.lock().unwrap().push(s.to_string());
            Ok(())
        }

        fn clear_line(&self) -> io::Result<()> {
            Ok(())
        }

        fn flush(&self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_indicator_renders_until_stopped() -> Result<()> {
        let indicator = LoadingIndicator::start(IndicatorSettings {
            interval: Duration::from_millis(10),
            target: IndicatorTarget::Hidden,
        })?;
        thread::sleep(Duration::from_millis(100));

        let frames = indicator.stop()?;
        assert!(frames >= 1);
        Ok(())
    }

    #[test]
    fn test_stop_returns_within_one_interval() -> Result<()> {
        let indicator = LoadingIndicator::start(IndicatorSettings::hidden())?;
        thread::sleep(Duration::from_millis(30));

        let start = Instant::now();
        indicator.stop()?;
        assert!(start.elapsed() < Duration::from_millis(INDICATOR_INTERVAL_MS * 10));
        Ok(())
    }

    #[test]
    fn test_loop_exits_immediately_when_already_signaled() {
        let signal = CompletionSignal::new();
        signal.set();

        let frames = run_indicator_loop(
            ProgressBar::hidden(),
            signal.observer(),
            Duration::from_secs(60),
        );
        assert_eq!(frames, 0);
    }

    #[test]
    fn test_dropping_indicator_joins_thread() -> Result<()> {
        let indicator = LoadingIndicator::start(IndicatorSettings::hidden())?;
        let observer = indicator.signal.observer();
        drop(indicator);
        assert!(observer.is_set());
        Ok(())
    }

    #[test]
    fn test_default_settings() {
        let settings = IndicatorSettings::default();
        assert_eq!(settings.interval, Duration::from_millis(100));
        assert!(settings.is_visible());
        assert!(!IndicatorSettings::hidden().is_visible());
    }

    #[test]
    fn test_visible_indicator_draws_message_and_stops_drawing() -> Result<()> {
        let log = Arc::new(LineLog::default());
        let mut settings = IndicatorSettings::on_term(log.clone());
        settings.interval = Duration::from_millis(10);

        let indicator = LoadingIndicator::start(settings)?;
        thread::sleep(Duration::from_millis(100));
        let frames = indicator.stop()?;
        assert!(frames >= 1);

        let drawn = log.writes();
        assert!(
            drawn.iter().any(|s| s.contains(LOADING_MESSAGE)),
            "{:?}",
            drawn
        );
        assert!(drawn
            .iter()
            .any(|s| INDICATOR_FRAMES.iter().any(|glyph| s.contains(glyph))));

        // Nothing is drawn once stop has joined the thread
        thread::sleep(Duration::from_millis(50));
        assert_eq!(log.writes().len(), drawn.len());
        Ok(())
    }
}
