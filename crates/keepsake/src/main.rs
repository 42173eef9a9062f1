//! # Keepsake Runner
//!
//! Plays a story headless and logs what a renderer would draw.
//!
//! ```bash
//! # Scripted walkthrough on simulated time
//! keepsake --config data/engine.toml --content data/story.toml
//!
//! # Real time for 5 seconds, more log detail
//! RUST_LOG=keepsake=debug,keepsake_core=debug keepsake --realtime 5
//! ```

use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

use keepsake_core::{
    EngineConfig, KeepsakeResult, RealtimeDriver, SceneAction, SceneFlow, SceneKind, Session, SessionSnapshot,
    StoryContent, UiEvent, Viewport,
};
use keepsake_ui::{DisplayList, HitRegion, OffsetTween, PointerTracker};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Simulated frame length.
const FRAME_MS: u64 = 16;
/// Give up waiting for a control after this long.
const WAIT_LIMIT_MS: u64 = 120_000;

#[derive(Debug)]
struct Options {
    config: Option<PathBuf>,
    content: Option<PathBuf>,
    seed: Option<u64>,
    short: bool,
    realtime: Option<Duration>,
    viewport: Viewport,
}

fn usage() {
    println!("Usage: keepsake [options]");
    println!();
    println!("Options:");
    println!("  --config <file>      Engine config (TOML)");
    println!("  --content <file>     Story content (TOML)");
    println!("  --seed <n>           Fix the session seed");
    println!("  --short              Stop the story at the gallery");
    println!("  --realtime <secs>    Run on the wall clock instead of the script");
    println!("  --viewport <w>x<h>   Viewport size in pixels (default 1280x800)");
}

/// Parses the arguments after the program name.
///
/// Returns `Ok(None)` when help was requested, `Err` with a message for a
/// flag value that cannot be used.
fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    if args.iter().any(|a| a == "--help" || a == "-h") {
        return Ok(None);
    }

    let value = |flag: &str| args.iter().position(|a| a == flag).and_then(|i| args.get(i + 1));

    let viewport = value("--viewport")
        .and_then(|v| v.split_once('x'))
        .and_then(|(w, h)| Some(Viewport::new(w.parse().ok()?, h.parse().ok()?)))
        .unwrap_or(Viewport::new(1280.0, 800.0));

    let realtime = match value("--realtime") {
        Some(raw) => {
            let run_for = raw
                .parse::<f64>()
                .ok()
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .ok_or_else(|| format!("--realtime expects a non-negative number of seconds, got {raw:?}"))?;
            Some(run_for)
        }
        None => None,
    };

    Ok(Some(Options {
        config: value("--config").map(PathBuf::from),
        content: value("--content").map(PathBuf::from),
        seed: value("--seed").and_then(|s| s.parse().ok()),
        short: args.iter().any(|a| a == "--short"),
        realtime,
        viewport,
    }))
}

fn load(options: &Options) -> KeepsakeResult<(EngineConfig, StoryContent)> {
    let mut config = match &options.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = options.seed {
        config = config.with_seed(seed);
    }
    if options.short {
        config = config.with_flow(SceneFlow::Short);
    }

    let content = match &options.content {
        Some(path) => StoryContent::load(path)?,
        None => StoryContent::default(),
    };
    Ok((config, content))
}

fn log_frame(snapshot: &SessionSnapshot, list: &DisplayList) {
    let letter = snapshot
        .letter
        .as_ref()
        .map_or_else(String::new, |l| format!(" letter={}/{}", l.revealed_len, l.total_len));
    info!(
        "t={}ms scene={}{} hearts={} bursts={} commands={}{}",
        snapshot.now,
        snapshot.scene,
        if snapshot.is_transitioning { " (fading)" } else { "" },
        snapshot.hearts.len(),
        snapshot.explosions.len(),
        list.commands().len(),
        letter
    );
}

/// Plays a scripted visitor against a session on simulated time.
struct Walkthrough<'a> {
    session: Session,
    content: &'a StoryContent,
    viewport: Viewport,
    tracker: PointerTracker,
    evasive: OffsetTween,
}

impl Walkthrough<'_> {
    /// Renders a frame, feeds hover changes back, and returns the list.
    fn frame(&mut self) -> DisplayList {
        let snapshot = self.session.snapshot();
        let list = DisplayList::build(&snapshot, self.content, self.viewport);
        for event in self.tracker.set_regions(list.hit_regions().iter().copied()) {
            self.session.handle(event);
        }
        self.evasive.set_target(snapshot.evasive_offset);
        self.evasive.update(FRAME_MS as f32);
        list
    }

    /// Advances frame by frame until `region` is on screen and clickable.
    fn wait_for(&mut self, region: HitRegion) -> Option<(f32, f32)> {
        let deadline = self.session.now() + WAIT_LIMIT_MS;
        loop {
            let list = self.frame();
            let found = list
                .hit_regions()
                .iter()
                .find(|(r, _)| *r == region)
                .map(|(_, rect)| rect.center());
            if found.is_some() && !self.session.is_transitioning() {
                log_frame(&self.session.snapshot(), &list);
                return found;
            }
            if self.session.now() >= deadline {
                return None;
            }
            self.session.advance(FRAME_MS);
        }
    }

    fn press(&mut self, action: SceneAction) -> bool {
        let Some((x, y)) = self.wait_for(HitRegion::Action(action)) else {
            warn!("{:?} never became available", action);
            return false;
        };
        for event in self.tracker.pointer_moved(x, y) {
            self.session.handle(event);
        }
        match self.tracker.click(x, y) {
            Some(event) => {
                let outcome = self.session.handle(event);
                info!("Clicked {:?}: {:?}", action, outcome);
                true
            }
            None => false,
        }
    }

    fn click_a_heart(&mut self) {
        let list = self.frame();
        let heart = list
            .hit_regions()
            .iter()
            .find(|(r, _)| matches!(r, HitRegion::Heart(_)))
            .map(|(_, rect)| rect.center());
        if let Some((x, y)) = heart {
            if let Some(event @ UiEvent::HeartClicked { .. }) = self.tracker.click(x, y) {
                info!("Clicked a heart: {:?}", self.session.handle(event));
            }
        }
    }

    fn dodge(&mut self, attempts: usize) {
        for _ in 0..attempts {
            let Some((x, y)) = self.wait_for(HitRegion::EvasiveControl) else {
                return;
            };
            for event in self.tracker.pointer_moved(x, y) {
                info!("Chased the evasive control: {:?}", self.session.handle(event));
            }
            self.tracker.pointer_left();
            self.session.advance(FRAME_MS * 10);
            let drawn = self.evasive.value();
            info!("Evasive control drawn at ({:.1}, {:.1})", drawn.x, drawn.y);
        }
    }

    fn settle(&mut self, ms: u64) {
        let until = self.session.now() + ms;
        while self.session.now() < until {
            self.session.advance(FRAME_MS);
            self.frame();
        }
        let list = self.frame();
        log_frame(&self.session.snapshot(), &list);
    }

    fn run(mut self) -> SessionSnapshot {
        self.settle(2_000);
        self.click_a_heart();

        if !self.press(SceneAction::Surprise) || !self.press(SceneAction::SeeMemories) {
            return self.finish();
        }
        self.settle(1_000);
        if self.session.config().flow == SceneFlow::Short {
            return self.finish();
        }

        if !self.press(SceneAction::NextFromGallery) {
            return self.finish();
        }
        self.dodge(3);
        if self.press(SceneAction::AcceptProposal) {
            self.settle(1_000);
        }
        self.finish()
    }

    fn finish(mut self) -> SessionSnapshot {
        self.session.end();
        self.session.snapshot()
    }
}

fn run_realtime(session: Session, run_for: Duration) -> KeepsakeResult<SessionSnapshot> {
    let driver = RealtimeDriver::new(session);
    let ui = driver.sender();

    thread::spawn(move || {
        thread::sleep(Duration::from_millis(250));
        ui.send(UiEvent::TitleHover(true));
        thread::sleep(Duration::from_millis(250));
        ui.send(UiEvent::Action(SceneAction::Surprise));
    });

    info!("Running on real time for {:.1}s", run_for.as_secs_f64());
    driver.run(Some(run_for))
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keepsake=info,keepsake_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            usage();
            return;
        }
        Err(message) => {
            error!("{}", message);
            usage();
            process::exit(1);
        }
    };

    let (config, content) = match load(&options) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Failed to load story: {}", e);
            process::exit(1);
        }
    };

    let session = match Session::new(config, &content, options.viewport) {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to start session: {}", e);
            process::exit(1);
        }
    };
    info!("Session seed {} (pass --seed {} to replay)", session.seed(), session.seed());

    let last = match options.realtime {
        Some(run_for) => match run_realtime(session, run_for) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Realtime driver failed: {}", e);
                process::exit(1);
            }
        },
        None => Walkthrough {
            session,
            content: &content,
            viewport: options.viewport,
            tracker: PointerTracker::new(),
            evasive: OffsetTween::new(),
        }
        .run(),
    };

    let reached_end = matches!(last.scene, SceneKind::Promise)
        || (last.flow == SceneFlow::Short && last.scene == SceneKind::Gallery);
    info!(
        "Story stopped at {}ms on scene {}{}",
        last.now,
        last.scene,
        if reached_end { " (the end)" } else { "" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| (*a).to_owned()).collect()
    }

    #[test]
    fn test_realtime_accepts_seconds() {
        let options = parse_args(&args(&["--realtime", "2.5", "--seed", "1"])).unwrap().unwrap();
        assert_eq!(options.realtime, Some(Duration::from_millis(2500)));
        assert_eq!(options.seed, Some(1));
    }

    #[test]
    fn test_realtime_rejects_unusable_values() {
        for bad in ["-1", "NaN", "inf", "1e400", "soon"] {
            let err = parse_args(&args(&["--realtime", bad])).unwrap_err();
            assert!(err.contains("--realtime"), "{bad}: {err}");
        }
    }

    #[test]
    fn test_help_and_defaults() {
        assert!(parse_args(&args(&["--short", "-h"])).unwrap().is_none());

        let options = parse_args(&[]).unwrap().unwrap();
        assert_eq!(options.realtime, None);
        assert!(!options.short);
        assert_eq!(options.viewport, Viewport::new(1280.0, 800.0));
    }
}
