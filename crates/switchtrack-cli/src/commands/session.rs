//! Interactive session loop.
//!
//! Runs on a single-threaded tokio runtime. Each stdin line or ticker tick
//! is handled to completion before the next one is read, so the engine is
//! never touched concurrently.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use clap::Args;
use switchtrack_core::{
    Clock, Config, Event, IdGenerator, LiveTicker, SessionEngine, SystemClock, Tick, UuidGenerator,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::render::Presenter;
use crate::repl::{parse_line, ReplCommand};

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Print events, status and metrics as JSON lines
    #[arg(long)]
    pub json: bool,
    /// Print the elapsed time on every tick while a task is active
    #[arg(long)]
    pub live: bool,
    /// Tick period in milliseconds (overrides display.tick_interval_ms)
    #[arg(long)]
    pub tick_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Glue between typed commands, the engine, the ticker and the presenter.
pub struct SessionController<C, G, W> {
    engine: SessionEngine<C, G>,
    ticker: Option<LiveTicker>,
    presenter: Presenter<W>,
    pending: Rc<RefCell<Vec<Event>>>,
    live: bool,
    alert_active: bool,
}

impl<C: Clock, G: IdGenerator, W: Write> SessionController<C, G, W> {
    pub fn new(
        mut engine: SessionEngine<C, G>,
        ticker: Option<LiveTicker>,
        presenter: Presenter<W>,
        live: bool,
    ) -> Self {
        let pending = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&pending);
        engine.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        Self {
            engine,
            ticker,
            presenter,
            pending,
            live,
            alert_active: false,
        }
    }

    pub fn engine(&self) -> &SessionEngine<C, G> {
        &self.engine
    }

    pub fn ticker_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(LiveTicker::is_running)
    }

    pub fn into_presenter(self) -> Presenter<W> {
        self.presenter
    }

    pub fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        match parse_line(line) {
            Ok(Some(cmd)) => self.handle(cmd),
            Ok(None) => Ok(Flow::Continue),
            Err(e) => {
                tracing::debug!(error = %e, "rejected input line");
                self.presenter.error(&e.to_string())?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn handle(&mut self, cmd: ReplCommand) -> io::Result<Flow> {
        match cmd {
            ReplCommand::Task(name) => {
                if self.engine.set_current_task_name(&name).is_none() {
                    self.presenter
                        .ignored("task", "the active task keeps its name; switch first")?;
                }
            }
            ReplCommand::Start(name) => {
                let started = match name {
                    Some(name) if !self.engine.is_tracking() => self.engine.start_task(&name),
                    _ => self.engine.start(),
                };
                if started.is_none() {
                    let reason = if self.engine.is_tracking() {
                        "already tracking; use 'switch'"
                    } else {
                        "enter a task name first"
                    };
                    self.presenter.ignored("start", reason)?;
                }
            }
            ReplCommand::Switch(next) => {
                let switched = match next {
                    Some(next) => self.engine.switch_to(&next),
                    None => self.engine.switch_task(),
                };
                if switched.is_none() {
                    self.presenter.ignored("switch", "no task is being tracked")?;
                }
            }
            ReplCommand::End => {
                if self.engine.end_session().is_none() {
                    self.presenter.ignored("end", "no task is being tracked")?;
                }
            }
            ReplCommand::Reset => {
                self.engine.reset();
            }
            ReplCommand::Status => {
                self.flush_events()?;
                self.presenter.status(&self.engine.snapshot())?;
            }
            ReplCommand::Metrics => {
                self.flush_events()?;
                self.presenter.metrics(&self.engine.metrics())?;
            }
            ReplCommand::History => {
                self.flush_events()?;
                let threshold = self.engine.policy().deep_work_threshold_ms;
                self.presenter.history(&self.engine.snapshot(), threshold)?;
            }
            ReplCommand::Tips => self.presenter.tips()?,
            ReplCommand::Help => self.presenter.help()?,
            ReplCommand::Quit => {
                self.finish()?;
                return Ok(Flow::Quit);
            }
        }
        self.after_command()?;
        Ok(Flow::Continue)
    }

    /// Refresh the live display. Ticks never change session state.
    pub fn on_tick(&mut self, tick: Tick) -> io::Result<()> {
        if !self.engine.is_tracking() {
            return Ok(());
        }
        let now = self.engine.now();
        let snapshot = self.engine.snapshot();
        let metrics = self.engine.metrics_at(now);
        if self.live {
            self.presenter.tick(tick, &snapshot, &metrics)?;
        }
        self.check_alert(&metrics)
    }

    /// End the session and print the final report.
    pub fn finish(&mut self) -> io::Result<()> {
        self.engine.end_session();
        self.after_command()?;
        if !self.engine.history().is_empty() {
            self.presenter.metrics(&self.engine.metrics())?;
        }
        Ok(())
    }

    fn after_command(&mut self) -> io::Result<()> {
        self.flush_events()?;
        if let Some(ticker) = self.ticker.as_mut() {
            ticker.sync(self.engine.is_tracking());
        }
        let metrics = self.engine.metrics();
        self.check_alert(&metrics)
    }

    fn flush_events(&mut self) -> io::Result<()> {
        let events: Vec<Event> = self.pending.borrow_mut().drain(..).collect();
        for event in &events {
            self.presenter.event(event)?;
        }
        Ok(())
    }

    fn check_alert(&mut self, metrics: &switchtrack_core::MetricsSnapshot) -> io::Result<()> {
        if metrics.high_switching_alert != self.alert_active {
            self.alert_active = metrics.high_switching_alert;
            tracing::info!(active = self.alert_active, "switching alert changed");
            self.presenter.alert_changed(metrics)?;
        }
        Ok(())
    }
}

pub fn run(args: SessionArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_loop(args, config))
}

async fn run_loop(args: SessionArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let period = match args.tick_ms {
        Some(0) => return Err("--tick-ms must be greater than zero".into()),
        Some(ms) => Duration::from_millis(ms),
        None => config.tick_interval(),
    };

    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
    let engine = SessionEngine::with_policy(SystemClock, UuidGenerator, config.metrics_policy());
    let presenter = Presenter::new(io::stdout(), args.json, config.display.history_limit);
    let mut controller = SessionController::new(
        engine,
        Some(LiveTicker::new(period, tick_tx)),
        presenter,
        args.live,
    );
    tracing::debug!(?period, json = args.json, "session loop started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if controller.handle_line(&line)? == Flow::Quit {
                        break;
                    }
                }
                None => {
                    controller.finish()?;
                    break;
                }
            },
            Some(tick) = tick_rx.recv() => controller.on_tick(tick)?,
        }
    }

    tracing::debug!("session loop finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use switchtrack_core::{ManualClock, SequentialIds};

    type TestController = SessionController<ManualClock, SequentialIds, Vec<u8>>;

    fn controller(json: bool) -> (TestController, ManualClock) {
        let clock = ManualClock::at_epoch();
        let engine = SessionEngine::new(clock.clone(), SequentialIds::new());
        let presenter = Presenter::new(Vec::new(), json, 0);
        (SessionController::new(engine, None, presenter, false), clock)
    }

    fn output(controller: TestController) -> String {
        String::from_utf8(controller.into_presenter().into_inner()).unwrap()
    }

    #[test]
    fn start_without_name_is_reported_as_ignored() {
        let (mut c, _) = controller(false);
        c.handle_line("start").unwrap();
        assert!(c.engine().history().is_empty());
        assert_eq!(output(c), "start ignored: enter a task name first\n");
    }

    #[test]
    fn typed_session_produces_records() {
        let (mut c, clock) = controller(false);
        c.handle_line("start writing").unwrap();
        clock.advance(ChronoDuration::minutes(30));
        c.handle_line("switch email").unwrap();
        clock.advance(ChronoDuration::minutes(2));
        assert_eq!(c.handle_line("quit").unwrap(), Flow::Quit);

        assert_eq!(c.engine().history().len(), 2);
        let out = output(c);
        assert!(out.contains("started: writing"));
        assert!(out.contains("switched away from 'writing' after 0h 30m 0s (switch #1)"));
        assert!(out.contains("started: email"));
        assert!(out.contains("session ended: 'email' ran 0h 2m 0s"));
        assert!(out.contains("Context switches:  2"));
    }

    #[test]
    fn unknown_command_keeps_loop_running() {
        let (mut c, _) = controller(false);
        assert_eq!(c.handle_line("dance").unwrap(), Flow::Continue);
        assert!(output(c).starts_with("error: unknown command 'dance'"));
    }

    #[test]
    fn alert_is_announced_once() {
        let (mut c, clock) = controller(true);
        for i in 0..7 {
            c.handle_line(&format!("start t{i}")).unwrap();
            clock.advance(ChronoDuration::minutes(2));
            c.handle_line("switch").unwrap();
        }
        let out = output(c);
        let alerts: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap())
            .filter(|doc| doc["type"] == "alert")
            .collect();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0]["active"], true);
        assert_eq!(alerts[0]["switch_count"], 6);
    }

    #[test]
    fn ticks_are_ignored_while_idle() {
        let (mut c, _) = controller(true);
        c.live = true;
        c.on_tick(Tick { seq: 1 }).unwrap();
        assert!(output(c).is_empty());
    }

    #[test]
    fn live_ticks_report_elapsed() {
        let (mut c, clock) = controller(true);
        c.live = true;
        c.handle_line("start focus").unwrap();
        clock.advance(ChronoDuration::seconds(3));
        c.on_tick(Tick { seq: 3 }).unwrap();

        let out = output(c);
        let last: serde_json::Value = serde_json::from_str(out.lines().last().unwrap()).unwrap();
        assert_eq!(last["type"], "tick");
        assert_eq!(last["elapsed_ms"], 3000);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn ticker_runs_only_while_tracking() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let clock = ManualClock::at_epoch();
        let engine = SessionEngine::new(clock, SequentialIds::new());
        let presenter = Presenter::new(Vec::new(), false, 0);
        let ticker = LiveTicker::new(Duration::from_millis(50), tx);
        let mut c = SessionController::new(engine, Some(ticker), presenter, false);

        assert!(!c.ticker_running());
        c.handle_line("start a").unwrap();
        assert!(c.ticker_running());
        c.handle_line("switch b").unwrap();
        assert!(c.ticker_running());
        c.handle_line("end").unwrap();
        assert!(!c.ticker_running());
        c.handle_line("start c").unwrap();
        c.handle_line("reset").unwrap();
        assert!(!c.ticker_running());
    }
}
