//! Optics Sim command line
//!
//! Traces a scene document and prints the result (or a re-export with fresh
//! detector readings) as JSON.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::fs;
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::{Parser, ValueEnum};
    use log::LevelFilter;

    use optics_sim::scene_file::{self, SceneDocument};
    use optics_sim::sim::{Viewport, trace_with_limits};
    use optics_sim::Settings;

    #[derive(Debug, Clone, ValueEnum)]
    pub enum LogLevel {
        Error,
        Warn,
        Info,
        Debug,
        Trace,
    }

    impl From<LogLevel> for LevelFilter {
        fn from(level: LogLevel) -> Self {
            match level {
                LogLevel::Error => LevelFilter::Error,
                LogLevel::Warn => LevelFilter::Warn,
                LogLevel::Info => LevelFilter::Info,
                LogLevel::Debug => LevelFilter::Debug,
                LogLevel::Trace => LevelFilter::Trace,
            }
        }
    }

    #[derive(Parser)]
    #[command(name = "optics-sim")]
    #[command(about = "Trace light through a 2D optical bench")]
    pub struct Args {
        /// Scene document (JSON); generator output wrapped in a code fence is accepted
        pub scene: PathBuf,

        /// Settings file (JSON)
        #[arg(short, long, default_value = "optics-sim.json")]
        pub settings: PathBuf,

        /// Viewport width in pixels (overrides settings)
        #[arg(long)]
        pub width: Option<f64>,

        /// Viewport height in pixels (overrides settings)
        #[arg(long)]
        pub height: Option<f64>,

        /// Enable port gating using the settings' connection map
        #[arg(long)]
        pub gating: bool,

        /// Print a scene document with detector readings instead of the raw trace
        #[arg(long)]
        pub export: bool,

        #[arg(long, default_value = "warn")]
        pub log_level: LogLevel,
    }

    pub fn run() -> Result<()> {
        let args = Args::parse();
        env_logger::Builder::from_default_env()
            .filter_level(args.log_level.clone().into())
            .init();

        let mut settings = Settings::load(&args.settings)
            .with_context(|| format!("loading settings {}", args.settings.display()))?;
        let defaults = settings.viewport;
        settings.viewport = Viewport::new(
            args.width.unwrap_or(defaults.width),
            args.height.unwrap_or(defaults.height),
        );
        settings.gating_enabled |= args.gating;

        let text = fs::read_to_string(&args.scene)
            .with_context(|| format!("reading scene {}", args.scene.display()))?;
        let document = scene_file::parse_generated(&text)
            .with_context(|| format!("parsing scene {}", args.scene.display()))?;
        let scene = document.to_scene()?;

        let result = trace_with_limits(
            &scene,
            settings.viewport,
            &settings.gating(),
            &settings.limits(),
        );
        log::info!(
            "{} rays, {} segments, {} detector readings",
            result.rays.len(),
            result.total_segments(),
            result.detector_hits.len()
        );

        let output = if args.export {
            let mut exported = SceneDocument::export(&scene, Some(&result));
            exported.timestamp = document.timestamp;
            exported.to_json_pretty()?
        } else {
            serde_json::to_string_pretty(&result)?
        };
        println!("{output}");
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::start, this is just to satisfy the compiler
}
