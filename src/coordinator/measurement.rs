use crate::coordinator::error::{Result, SpeednetError};
use crate::coordinator::indicator::{IndicatorSettings, LoadingIndicator};
use crate::coordinator::reporter::Reporter;
use crate::probe::{convert_to_scaled_rate, Direction, ScaledRate, SpeedProbe};
use std::collections::BTreeSet;
use std::io::{self, Write};
use tracing::{debug, info, warn};

/// Non-empty set of directions to measure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementRequest {
    directions: BTreeSet<Direction>,
}

impl MeasurementRequest {
    /// Build a request from the given directions; fails when none are given
    pub fn new<I: IntoIterator<Item = Direction>>(directions: I) -> Result<Self> {
        let directions: BTreeSet<Direction> = directions.into_iter().collect();
        if directions.is_empty() {
            return Err(SpeednetError::Option(
                "at least one direction must be requested".into(),
            ));
        }
        Ok(Self { directions })
    }

    pub fn both() -> Self {
        Self {
            directions: BTreeSet::from([Direction::Download, Direction::Upload]),
        }
    }

    pub fn download_only() -> Self {
        Self {
            directions: BTreeSet::from([Direction::Download]),
        }
    }

    pub fn upload_only() -> Self {
        Self {
            directions: BTreeSet::from([Direction::Upload]),
        }
    }

    pub fn contains(&self, direction: Direction) -> bool {
        self.directions.contains(&direction)
    }

    /// Requested directions, download first
    pub fn directions(&self) -> impl Iterator<Item = Direction> + '_ {
        self.directions.iter().copied()
    }
}

/// Scaled rates collected during a run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeasurementResult {
    pub download: Option<ScaledRate>,
    pub upload: Option<ScaledRate>,
}

impl MeasurementResult {
    pub fn record(&mut self, direction: Direction, rate: ScaledRate) {
        match direction {
            Direction::Download => self.download = Some(rate),
            Direction::Upload => self.upload = Some(rate),
        }
    }

    pub fn get(&self, direction: Direction) -> Option<ScaledRate> {
        match direction {
            Direction::Download => self.download,
            Direction::Upload => self.upload,
        }
    }
}

/// Lifecycle of a single coordinator run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Measuring,
    Completed,
    Reported,
    /// A measurement failed; the indicator was joined and nothing will be reported
    Aborted,
}

/// Runs the requested measurements while a loading indicator animates.
///
/// Probe calls happen on the calling thread, download before upload. The
/// indicator runs on its own thread and is always stopped and joined before
/// `run` returns, whether the measurements succeeded or not.
pub struct Coordinator<P: SpeedProbe> {
    probe: P,
    request: MeasurementRequest,
    indicator: IndicatorSettings,
    styled: bool,
    result: MeasurementResult,
    state: CoordinatorState,
    indicator_frames: Option<u64>,
}

impl<P: SpeedProbe> Coordinator<P> {
    pub fn new(probe: P, request: MeasurementRequest) -> Self {
        Self {
            probe,
            request,
            indicator: IndicatorSettings::default(),
            styled: false,
            result: MeasurementResult::default(),
            state: CoordinatorState::Idle,
            indicator_frames: None,
        }
    }

    pub fn with_indicator(mut self, settings: IndicatorSettings) -> Self {
        self.indicator = settings;
        self
    }

    /// Color the report frame when printing
    pub fn with_styled_report(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn request(&self) -> &MeasurementRequest {
        &self.request
    }

    pub fn result(&self) -> &MeasurementResult {
        &self.result
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Frames drawn by the indicator, known once its thread has been joined
    pub fn indicator_frames(&self) -> Option<u64> {
        self.indicator_frames
    }

    fn expect_state(&self, expected: CoordinatorState) -> Result<()> {
        if self.state != expected {
            return Err(SpeednetError::State(format!(
                "coordinator is {:?}, expected {:?}",
                self.state, expected
            )));
        }
        Ok(())
    }

    fn transition(&mut self, next: CoordinatorState) {
        debug!(from = ?self.state, to = ?next, "Coordinator state change");
        self.state = next;
    }

    /// Measure every requested direction, stopping at the first failure
    fn measure_all(&mut self) -> Result<()> {
        for direction in self.request.directions() {
            debug!(direction = %direction, "Measuring");
            let raw = self.probe.measure(direction)?;
            let scaled = convert_to_scaled_rate(raw)?;
            info!(
                direction = %direction,
                bytes_per_sec = raw.0,
                scaled = scaled.0,
                "Measurement recorded"
            );
            self.result.record(direction, scaled);
        }
        Ok(())
    }

    /// Run the measurements with the indicator active.
    ///
    /// On failure the coordinator ends in [`CoordinatorState::Aborted`] and
    /// the first error is returned once the indicator thread has exited.
    pub fn run(&mut self) -> Result<&MeasurementResult> {
        self.expect_state(CoordinatorState::Idle)?;

        let indicator = LoadingIndicator::start(self.indicator.clone())?;
        self.transition(CoordinatorState::Measuring);

        let measured = self.measure_all();
        let stopped = indicator.stop();
        if let Ok(frames) = &stopped {
            self.indicator_frames = Some(*frames);
        }

        match (measured, stopped) {
            (Ok(()), Ok(frames)) => {
                debug!(frames = frames, "Measurements finished");
                self.transition(CoordinatorState::Completed);
                Ok(&self.result)
            }
            (Err(e), _) | (Ok(()), Err(e)) => {
                warn!(error = %e, "Measurement run aborted");
                self.transition(CoordinatorState::Aborted);
                Err(e)
            }
        }
    }

    /// Write the report for a completed run
    pub fn report<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.expect_state(CoordinatorState::Completed)?;

        let text = if self.styled {
            Reporter::render_styled(&self.result)
        } else {
            Reporter::render(&self.result)
        };
        out.write_all(text.as_bytes())?;
        out.flush()?;

        self.transition(CoordinatorState::Reported);
        Ok(())
    }

    /// Run the measurements and write the report; nothing is written on failure.
    ///
    /// `out` must not hold a lock on the stream the indicator draws to, or
    /// the indicator thread blocks and is never joined. Use
    /// [`Coordinator::check_speed_stdout`] for the process stdout.
    pub fn check_speed<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.run()?;
        self.report(out)
    }

    /// Like [`Coordinator::check_speed`], reporting to stdout.
    ///
    /// The stdout lock is taken only after the indicator thread has exited.
    pub fn check_speed_stdout(&mut self) -> Result<()> {
        self.run()?;
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.report(&mut out)
    }
}
