use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use knect_meet::{
    create_router, generate_room_id, AppState, Config, ControllerOptions, JoinRequest,
    LoopbackTransport, PreJoinForm, Services, SessionController, SessionEvent, SessionPhase,
    TranslationPhase,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "knect-meet", version, about = "Video rooms with live speech translation")]
struct Cli {
    /// Config file path (without extension)
    #[arg(long, default_value = "config/knect-meet")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the connection-details and notification endpoints
    Serve,
    /// Print a new room id
    NewRoom,
    /// Join a room with the loopback transport
    Join(JoinArgs),
}

#[derive(Args)]
struct JoinArgs {
    /// Room id or full room link (`https://host/rooms/<id>?username=..`)
    target: String,

    /// Display name, required unless the link carries one
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    no_video: bool,

    #[arg(long)]
    no_audio: bool,

    /// Toggle translation on after connecting
    #[arg(long)]
    translate: bool,

    /// Seconds to stay in the room before leaving
    #[arg(long, default_value_t = 10)]
    hold_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::NewRoom => {
            println!("{}", generate_room_id());
            Ok(())
        }
        Command::Serve => {
            let cfg = Config::load(&cli.config)?;
            serve(&cfg).await
        }
        Command::Join(args) => {
            let cfg = Config::load(&cli.config)?;
            join(&cfg, args).await
        }
    }
}

async fn serve(cfg: &Config) -> Result<()> {
    info!("Loaded config: {}", cfg.service.name);

    let app = create_router(AppState::from_config(cfg));
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("HTTP server failed")
}

async fn join(cfg: &Config, args: JoinArgs) -> Result<()> {
    let (request, quality) = if args.target.contains("://") {
        let request = JoinRequest::from_url(&args.target)?;
        let quality = request.quality;
        (request, quality)
    } else {
        (JoinRequest::for_room(&args.target), cfg.room.quality())
    };

    let (choices, settings) = match request.auto_connect() {
        Some((choices, settings)) => (
            choices.with_video(!args.no_video).with_audio(!args.no_audio),
            settings,
        ),
        None => {
            let mut form = PreJoinForm::new(cfg.translation.settings);
            form.username = args
                .name
                .clone()
                .context("--name is required when the room link carries no username")?;
            form.video_enabled = !args.no_video;
            form.audio_enabled = !args.no_audio;
            form.submit()?
        }
    };

    let transport = Arc::new(LoopbackTransport::new());
    let options = ControllerOptions {
        quality,
        ..ControllerOptions::from_config(cfg)
    };
    let controller = SessionController::new(Services::from_config(cfg, transport)?, options);

    let mut events = controller.subscribe_events();
    let reporter = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SessionEvent::PhaseChanged(phase) => info!("Session {}", phase),
                SessionEvent::TranslationPhaseChanged(phase) => info!("Translation {}", phase),
                SessionEvent::DeviceEnableFailed { device, reason } => {
                    warn!("Could not enable {}: {}", device, reason)
                }
                SessionEvent::Alert(message) => warn!("{}", message),
                SessionEvent::Ended(reason) => {
                    info!("Session ended: {:?}", reason);
                    break;
                }
            }
        }
    });

    info!(
        "Translation preference: {} -> {} ({:?} voice)",
        settings.input_lang.label(),
        settings.output_lang.label(),
        settings.gender
    );

    let region = request.region.clone().or_else(|| cfg.room.region.clone());
    controller
        .request_connection(choices, settings, &request.room_id, region.as_deref())
        .await?;

    if args.translate {
        match controller.translation().toggle().await {
            Ok(phase) => info!("Translation is now {}", phase),
            Err(e) => warn!("Translation unavailable: {}", e),
        }
    }

    let mut phase = controller.phase_watch();
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(args.hold_secs)) => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
        _ = phase.wait_for(|p| *p == SessionPhase::Disconnected) => {}
    }

    // Stop translation in the foreground so the process does not exit
    // before the backend hears about it
    if controller.translation().phase() == TranslationPhase::Active {
        controller.translation().stop().await?;
    }
    controller.leave().await;
    // A remote disconnect may have left a forced stop in flight
    controller.translation().drain_stops().await;

    let _ = reporter.await;
    Ok(())
}
