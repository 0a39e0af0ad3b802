use std::path::Path;
use std::sync::Arc;

use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use punter_client::api::HttpPunterApi;
use punter_client::carousel::{AutoplayHandle, Carousel, default_slides, spawn_autoplay};
use punter_client::config::{ClientConfig, Palette, paint};
use punter_client::onboarding::{
    FormSnapshot, Navigator, Notifier, OnboardingController, OnboardingSettings, PrimaryCategory,
    ToastEvent,
};
use punter_client::store::{LibSqlTokenStore, TokenStore};

/// Forwards navigation requests to the REPL loop.
struct CliNavigator {
    tx: mpsc::UnboundedSender<String>,
}

impl Navigator for CliNavigator {
    fn navigate(&self, route: &str) {
        let _ = self.tx.send(route.to_string());
    }
}

const PALETTE: Palette = Palette::DEFAULT;

const HELP: &str = "\
Commands:
  user <name>          set the username
  check                check username availability
  primary <category>   sports | trading | none
  secondary <name>     pick a sub-category
  price <amount>       weekly subscription price
  terms [yes|no]       agree to the terms (default yes)
  submit               register as a punter
  status               show the form
  banner               show the current slide
  slide <index>        jump to a slide
  pause | resume       stop or restart the banner
  logout               forget the stored token
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ClientConfig::from_env()?;

    eprintln!("🏇 Punter client v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", config.api_base_url);
    eprintln!("   Database: {}", config.db_path);

    // ── Token store ─────────────────────────────────────────────────────
    let store = Arc::new(LibSqlTokenStore::new_local(Path::new(&config.db_path)).await?);
    if let Ok(token) = std::env::var("PUNTER_TOKEN") {
        store.set_token(&SecretString::from(token)).await?;
        eprintln!("   Token: stored from PUNTER_TOKEN");
    }

    // ── Banner ──────────────────────────────────────────────────────────
    let banner = spawn_autoplay(Carousel::new(default_slides())?, config.carousel_interval);

    // ── Onboarding form ─────────────────────────────────────────────────
    let api = Arc::new(HttpPunterApi::from_config(&config)?);
    let notifier = Notifier::new(config.toast_duration);
    let mut toasts = notifier.subscribe();
    let (nav_tx, mut nav_rx) = mpsc::unbounded_channel();
    let controller = OnboardingController::new(
        api,
        store.clone(),
        notifier,
        Arc::new(CliNavigator { tx: nav_tx }),
        OnboardingSettings::from(&config),
    );

    match controller.mount().await {
        Ok(user) => eprintln!("   Signed in as {}\n", user.username.as_deref().unwrap_or(&user.id)),
        Err(e) => eprintln!("   ⚠️  {}\n", paint(PALETTE.error, &e.to_string())),
    }
    eprintln!("{HELP}\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprint!("> ");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                };
                if !handle_command(line.trim(), &controller, &banner, &*store).await {
                    break;
                }
                eprint!("> ");
            }
            Some(route) = nav_rx.recv() => {
                eprintln!("\n➡️  Navigating to {route}");
                break;
            }
            Ok(event) = toasts.recv() => {
                if let ToastEvent::Shown(toast) = event {
                    eprintln!("\n🔔 {}", paint(PALETTE.success, &toast.message));
                    eprint!("> ");
                }
            }
        }
    }

    controller.unmount();
    banner.stop();
    Ok(())
}

/// Run one REPL command. Returns `false` to quit.
async fn handle_command(
    line: &str,
    controller: &OnboardingController,
    banner: &AutoplayHandle,
    store: &dyn TokenStore,
) -> bool {
    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };

    let result = match cmd {
        "" => Ok(()),
        "help" => {
            eprintln!("{HELP}");
            Ok(())
        }
        "quit" | "exit" => return false,
        "user" => controller.set_username(arg).await,
        "check" => controller.check_username().await.map(|status| {
            eprintln!("   username status: {status:?}");
        }),
        "primary" => {
            let primary = if arg.is_empty() || arg == "none" {
                Ok(None)
            } else {
                arg.parse::<PrimaryCategory>().map(Some)
            };
            match primary {
                Ok(primary) => {
                    let result = controller.set_primary_category(primary).await;
                    if let Some(primary) = primary {
                        eprintln!("   options: {}", primary.options().join(", "));
                    }
                    result
                }
                Err(e) => {
                    eprintln!("❌ {e}");
                    Ok(())
                }
            }
        }
        "secondary" => controller.set_secondary_category(arg).await,
        "price" => controller.set_price(arg).await,
        "terms" => controller.set_agreed_to_terms(arg != "no").await,
        "submit" => controller.submit().await,
        "status" => {
            print_form(&controller.snapshot().await);
            Ok(())
        }
        "banner" => {
            let snap = banner.snapshot().await;
            eprintln!(
                "   [{}/{}] {}",
                snap.active_index + 1,
                snap.indicators.len(),
                paint(PALETTE.accent, &snap.slide.title)
            );
            Ok(())
        }
        "slide" => {
            match arg.parse::<usize>() {
                Ok(index) => match banner.go_to_slide(index).await {
                    Ok(snap) => eprintln!("   {}", paint(PALETTE.accent, &snap.slide.title)),
                    Err(e) => eprintln!("❌ {e}"),
                },
                Err(_) => eprintln!("❌ usage: slide <index>"),
            }
            Ok(())
        }
        "pause" => {
            banner.pause();
            Ok(())
        }
        "resume" => {
            banner.resume();
            Ok(())
        }
        "logout" => {
            match store.clear_token().await {
                Ok(true) => eprintln!("   token removed"),
                Ok(false) => eprintln!("   no token stored"),
                Err(e) => eprintln!("❌ {e}"),
            }
            Ok(())
        }
        other => {
            eprintln!("❌ unknown command '{other}', try 'help'");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("❌ {}", paint(PALETTE.error, &e.to_string()));
    }
    true
}

fn print_form(snap: &FormSnapshot) {
    let form = &snap.form;
    eprintln!("   phase:     {}", snap.phase);
    eprintln!(
        "   user:      {}",
        form.current_user
            .as_ref()
            .map(|u| u.id.as_str())
            .unwrap_or("(not signed in)")
    );
    eprintln!(
        "   username:  {} ({:?})",
        form.username, form.username_status
    );
    eprintln!(
        "   category:  {} / {}",
        form.primary_category
            .map(|p| p.to_string())
            .unwrap_or_default(),
        form.secondary_category
    );
    eprintln!("   price:     {}", form.price_per_week);
    eprintln!("   terms:     {}", form.agreed_to_terms);
    if let Some(ref error) = form.last_error {
        eprintln!("   error:     {}", paint(PALETTE.error, error));
    }
    eprintln!(
        "   submit:    {}",
        if snap.can_submit { "enabled" } else { "disabled" }
    );
}
