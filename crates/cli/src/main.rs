use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use snapcaption_core::progress::{DEFAULT_INTERVAL, DEFAULT_STEP};
use snapcaption_core::{
    generate_with_deadline, init, CaptionSession, CaptionStyle, Config, Exporter, GeminiEngine,
    GenerationRequest, ImageLoader, Notification, Notifier, ProgressTicker, Settings, Severity,
    SystemClipboard, UnsupportedShare, ALL_STYLES,
};
use std::io;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Photo to generate captions for
    #[arg(required_unless_present = "list_styles")]
    image: Option<PathBuf>,

    /// Caption style: default, witty, poetic, casual, professional, bold
    #[arg(short, long)]
    style: Option<String>,

    /// Override the model defined in .env
    #[arg(short, long)]
    model: Option<String>,

    /// Pick caption N (1-based) without prompting
    #[arg(short, long)]
    pick: Option<usize>,

    /// Copy the chosen caption to clipboard
    #[arg(short, long, default_value_t = false)]
    copy: bool,

    /// Share the chosen caption (falls back to copy where unsupported)
    #[arg(long, default_value_t = false)]
    share: bool,

    /// List available caption styles and exit
    #[arg(long)]
    list_styles: bool,
}

/// Toast-equivalent output for the terminal.
struct TermNotifier;

impl Notifier for TermNotifier {
    fn notify(&mut self, n: Notification) {
        match n.severity {
            Severity::Success => println!("✔ {}: {}", n.title, n.description),
            Severity::Error => eprintln!("✖ {}: {}", n.title, n.description),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let _ = dotenvy::dotenv();
    init();
    let args = Args::parse();

    // Handle --list-styles
    if args.list_styles {
        println!("Available caption styles:");
        for style in ALL_STYLES {
            println!("  {:<14} {}", style.id(), style.label());
        }
        return Ok(());
    }

    // Load config and override model if specified via CLI
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(m) = args.model {
        config.model_name = m;
    }

    // Persisted preferences: CLI style wins, otherwise last used style
    let mut settings = Settings::load(&config.model_name);
    let style = match &args.style {
        Some(raw) => raw
            .parse::<CaptionStyle>()
            .context("Unknown caption style, see --list-styles")?,
        None => settings.style,
    };
    settings.style = style;
    settings.model = config.model_name.clone();
    if let Err(e) = settings.save() {
        eprintln!("Warning: Failed to save settings: {}", e);
    }

    let engine = GeminiEngine::new(&config).context("Failed to create caption engine")?;
    let mut session = CaptionSession::new(TermNotifier);
    // No photo yet, so this only records the style for the first request
    let _ = session.set_style(style);

    // Upload phase
    let image = args.image.context("An image path is required")?;
    let bar = percent_bar("Uploading")?;
    let payload = match ImageLoader::load(&image, |pct| bar.set_position(pct as u64)).await {
        Ok(payload) => {
            bar.finish_and_clear();
            payload
        }
        Err(err) => {
            bar.finish_and_clear();
            session.report(&err);
            return Ok(());
        }
    };
    println!(
        "Loaded {} ({:.1} KB, {})",
        image.display(),
        payload.size_bytes() as f64 / 1024.0,
        payload.mime_type()
    );

    // First generation is chained directly onto the upload
    let request = session.attach_photo(payload);
    generate(&engine, &mut session, request, config.engine_timeout_secs).await?;
    if session.captions().is_empty() {
        return Ok(());
    }
    print_captions(&session);

    // Selection: --pick, or an interactive prompt that also allows
    // switching styles to regenerate
    if let Some(n) = args.pick {
        match n.checked_sub(1).and_then(|i| session.captions().get(i)).cloned() {
            Some(caption) => session.select(&caption),
            None => eprintln!("No caption number {n}"),
        }
    } else {
        loop {
            print!("\nPick a caption number, type a style to regenerate, or press Enter to quit: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            let input = line.trim();

            if input.is_empty() {
                break;
            }
            if let Ok(n) = input.parse::<usize>() {
                match n.checked_sub(1).and_then(|i| session.captions().get(i)).cloned() {
                    Some(caption) => {
                        session.select(&caption);
                        break;
                    }
                    None => println!("No caption number {n}"),
                }
            } else if let Ok(new_style) = input.parse::<CaptionStyle>() {
                if let Some(request) = session.set_style(new_style) {
                    generate(&engine, &mut session, request, config.engine_timeout_secs).await?;
                    if session.captions().is_empty() {
                        break;
                    }
                    print_captions(&session);
                }
            } else {
                println!("Unrecognized input {input:?} (styles: default, witty, poetic, casual, professional, bold)");
            }
        }
    }

    // Export phase
    let Some(caption) = session.selected().map(str::to_string) else {
        return Ok(());
    };
    println!("\nSelected: {caption}");

    if args.share {
        if let Some(photo) = session.photo().cloned() {
            match SystemClipboard::new() {
                Ok(clipboard) => {
                    let mut exporter = Exporter::new(clipboard);
                    // The terminal has no native share sheet, so this exercises
                    // the copy-and-notify fallback tier.
                    exporter.share(&mut UnsupportedShare, &photo, &caption, session.notifier_mut());
                }
                Err(e) => eprintln!("Warning: {}", e),
            }
        }
    } else if args.copy {
        match SystemClipboard::new() {
            Ok(clipboard) => {
                let mut exporter = Exporter::new(clipboard);
                match exporter.copy(&caption) {
                    Ok(()) => println!("(Copied to clipboard)"),
                    Err(e) => eprintln!("Warning: {}", e),
                }
            }
            Err(e) => eprintln!("Warning: {}", e),
        }
    }

    Ok(())
}

/// Runs one caption request with a simulated progress bar.
///
/// The ticker is dropped as soon as the engine resolves, which aborts its
/// timer task; the bar then snaps to 100 whether the request succeeded or not.
async fn generate(
    engine: &GeminiEngine,
    session: &mut CaptionSession<TermNotifier>,
    request: GenerationRequest,
    deadline_secs: Option<u64>,
) -> Result<()> {
    let bar = percent_bar("Generating captions")?;
    let (ticker, mut rx) = ProgressTicker::spawn(DEFAULT_STEP, DEFAULT_INTERVAL);
    let forwarder = {
        let bar = bar.clone();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let value = *rx.borrow();
                bar.set_position(value as u64);
            }
        })
    };

    let result = generate_with_deadline(engine, &request.engine_request(), deadline_secs).await;

    drop(ticker);
    forwarder.abort();
    bar.set_position(100);
    bar.finish_and_clear();

    session.resolve(request.seq, result);
    Ok(())
}

fn print_captions(session: &CaptionSession<TermNotifier>) {
    println!("\nCaptions ({} style):", session.style().label());
    for (i, caption) in session.captions().iter().enumerate() {
        println!("  {}. {}", i + 1, caption);
    }
}

fn percent_bar(message: &'static str) -> Result<ProgressBar> {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:30}] {pos}%")?
            .progress_chars("=> "),
    );
    bar.set_message(message);
    Ok(bar)
}
