// Scrumble command-line client.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file, stdout is for output)
// 3. Load config
// 4. Build the application context (storage + HTTP transport)
// 5. Run the requested command and print its views

mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{error, info};

use scrumble_app::admin::{ActiveRefresh, AdminOutcome, EntryForm, MatchupForm};
use scrumble_app::presenter::{public_history, ArenaView, NO_ACTIVE_MATCHUP};
use scrumble_app::status::StatusLine;
use scrumble_app::voting::VoteOutcome;
use scrumble_app::AppContext;
use scrumble_core::config;
use scrumble_core::protocol::Side;

#[derive(Parser)]
#[command(name = "scrumble")]
#[command(about = "Vote on and administer Scrumble matchups")]
struct Cli {
    /// Directory holding config/ and defaults/.
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
    /// Print views as JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the active matchup.
    Show,
    /// Vote for one side of the active matchup.
    Vote {
        #[arg(value_enum)]
        side: SideArg,
    },
    /// Past matchups.
    History,
    /// Manage the stored admin key.
    Key {
        #[command(subcommand)]
        command: KeyCommand,
    },
    /// Admin views.
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
    /// Make a matchup the active one.
    Activate { matchup_id: String },
    /// Create a matchup.
    Create(CreateArgs),
}

#[derive(Subcommand)]
enum KeyCommand {
    Set { value: String },
    Clear,
    Show,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// API base, key status and the active matchup.
    Status,
    /// Every matchup, active one included.
    History,
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Left,
    Right,
}

impl From<SideArg> for Side {
    fn from(value: SideArg) -> Self {
        match value {
            SideArg::Left => Side::Left,
            SideArg::Right => Side::Right,
        }
    }
}

#[derive(Args)]
struct CreateArgs {
    /// Start from the sample matchup; other flags override its fields.
    #[arg(long, default_value_t = false)]
    sample: bool,
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long, default_value_t = false)]
    active: bool,
    #[command(flatten)]
    left: LeftEntryArgs,
    #[command(flatten)]
    right: RightEntryArgs,
}

#[derive(Args)]
struct LeftEntryArgs {
    #[arg(long)]
    left_id: Option<String>,
    #[arg(long)]
    left_name: Option<String>,
    #[arg(long)]
    left_neighborhood: Option<String>,
    #[arg(long)]
    left_tag: Option<String>,
    #[arg(long)]
    left_blurb: Option<String>,
}

#[derive(Args)]
struct RightEntryArgs {
    #[arg(long)]
    right_id: Option<String>,
    #[arg(long)]
    right_name: Option<String>,
    #[arg(long)]
    right_neighborhood: Option<String>,
    #[arg(long)]
    right_tag: Option<String>,
    #[arg(long)]
    right_blurb: Option<String>,
}

/// Overwrite the form fields that were given on the command line.
fn apply_entry(form: &mut EntryForm, fields: [Option<String>; 5]) {
    let [id, name, neighborhood, tag, blurb] = fields;
    let targets = [
        (&mut form.id, id),
        (&mut form.name, name),
        (&mut form.neighborhood, neighborhood),
        (&mut form.tag, tag),
        (&mut form.blurb, blurb),
    ];
    for (slot, value) in targets {
        if let Some(v) = value {
            *slot = v;
        }
    }
}

impl CreateArgs {
    fn into_form(self) -> MatchupForm {
        let mut form = if self.sample {
            MatchupForm::sample()
        } else {
            MatchupForm::default()
        };
        if let Some(v) = self.id {
            form.id = v;
        }
        if let Some(v) = self.title {
            form.title = v;
        }
        if let Some(v) = self.category {
            form.category = v;
        }
        form.active = self.active;
        let l = self.left;
        apply_entry(
            &mut form.left,
            [l.left_id, l.left_name, l.left_neighborhood, l.left_tag, l.left_blurb],
        );
        let r = self.right;
        apply_entry(
            &mut form.right,
            [r.right_id, r.right_name, r.right_neighborhood, r.right_tag, r.right_blurb],
        );
        form
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // 1. Parse arguments
    let cli = Cli::parse();

    let base_dir = match cli.base_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to read current directory")?,
    };

    // 2. Initialize tracing
    init_tracing(&base_dir)?;
    info!("Scrumble client starting");

    // 3. Load config
    let config = config::load_config(&base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: api={}, region={}",
        if config.api.base_url.is_empty() { "<unset>" } else { config.api.base_url.as_str() },
        config.display.region
    );

    // 4. Build the application context
    let ctx = AppContext::from_config(config).context("failed to initialize application")?;

    // 5. Run the command
    let ok = match run(&ctx, cli.command, cli.json).await {
        Ok(ok) => ok,
        Err(e) => {
            error!("Command failed: {e:#}");
            return Err(e);
        }
    };
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Everything `admin status` reports, as one document.
#[derive(Serialize)]
struct AdminStatusReport {
    api: String,
    key: Option<StatusLine>,
    active: ActiveRefresh,
}

/// The arena after a vote attempt plus what happened to the vote.
#[derive(Serialize)]
struct VoteReport {
    arena: Option<ArenaView>,
    status: StatusLine,
}

/// Run one command. Returns `false` when the user-facing outcome was an
/// error.
async fn run(ctx: &AppContext, command: Command, json: bool) -> anyhow::Result<bool> {
    match command {
        Command::Show => {
            let voting = ctx.voting();
            if let Err(e) = voting.load_matchup().await {
                return emit_status(&StatusLine::error(e.to_string()), json);
            }
            match voting.arena() {
                Some(view) => emit(&view, render::arena(&view), json)?,
                None => return emit_status(&StatusLine::info(NO_ACTIVE_MATCHUP), json),
            }
            Ok(true)
        }
        Command::Vote { side } => {
            let voting = ctx.voting();
            if let Err(e) = voting.load_matchup().await {
                return emit_status(&StatusLine::error(e.to_string()), json);
            }
            let side = Side::from(side);
            let line = match voting.vote(side).await {
                VoteOutcome::Recorded(side) => StatusLine::info(format!("Voted {side}")),
                VoteOutcome::Ignored => StatusLine::error("Nothing to vote on"),
                VoteOutcome::Failed(message) => StatusLine::error(message),
            };
            let report = VoteReport {
                arena: voting.arena(),
                status: line,
            };
            let mut text = report.arena.as_ref().map(render::arena).unwrap_or_default();
            text.push_str(&render::status(&report.status));
            emit(&report, text, json)?;
            Ok(!report.status.is_error)
        }
        Command::History => match ctx.api.fetch_history().await {
            Ok(items) => {
                let view = public_history(&items);
                emit(&view, render::history(&view), json)?;
                Ok(true)
            }
            Err(e) => emit_status(&StatusLine::error(e.to_string()), json),
        },
        Command::Key { command } => {
            let admin = ctx.admin();
            let line = match command {
                KeyCommand::Set { value } => admin.save_key(&value)?,
                KeyCommand::Clear => admin.clear_key()?,
                KeyCommand::Show => admin
                    .key_status()?
                    .unwrap_or_else(|| StatusLine::info("No admin key stored")),
            };
            emit_status(&line, json)
        }
        Command::Admin { command } => {
            let admin = ctx.admin();
            match command {
                AdminCommand::Status => {
                    let report = AdminStatusReport {
                        api: admin.api_base_label(),
                        key: admin.key_status()?,
                        active: admin.load_active().await,
                    };
                    let text = render::admin_status(&report.api, report.key.as_ref(), &report.active);
                    emit(&report, text, json)?;
                    Ok(report.active.status.is_none())
                }
                AdminCommand::History => {
                    let refresh = admin.load_history().await;
                    emit(&refresh, render::history_refresh(&refresh), json)?;
                    Ok(refresh.status.is_none())
                }
            }
        }
        Command::Activate { matchup_id } => {
            let outcome = ctx.admin().activate(&matchup_id).await;
            emit_outcome(&outcome, json)
        }
        Command::Create(args) => {
            let outcome = ctx.admin().create(&args.into_form()).await;
            emit_outcome(&outcome, json)
        }
    }
}

/// The JSON document for `value`, or the prepared text.
fn format_view<T: Serialize>(value: &T, text: String, json: bool) -> anyhow::Result<String> {
    if json {
        let mut out = serde_json::to_string_pretty(value)?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(text)
    }
}

fn emit<T: Serialize>(value: &T, text: String, json: bool) -> anyhow::Result<()> {
    print!("{}", format_view(value, text, json)?);
    Ok(())
}

fn emit_status(line: &StatusLine, json: bool) -> anyhow::Result<bool> {
    emit(line, render::status(line), json)?;
    Ok(!line.is_error)
}

fn emit_outcome(outcome: &AdminOutcome, json: bool) -> anyhow::Result<bool> {
    emit(outcome, render::outcome(outcome), json)?;
    Ok(!outcome.status.is_error)
}

/// Initialize tracing to log to a file so stdout carries only command output.
fn init_tracing(base_dir: &std::path::Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = base_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("scrumble.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scrumble=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrumble_app::presenter::ActiveView;

    fn create_form(args: &[&str]) -> MatchupForm {
        let cli = Cli::try_parse_from(args).expect("arguments should parse");
        match cli.command {
            Command::Create(create) => create.into_form(),
            _ => panic!("expected the create command"),
        }
    }

    #[test]
    fn create_from_flags() {
        let form = create_form(&[
            "scrumble",
            "create",
            "--id",
            "m9",
            "--title",
            "Taco Fight",
            "--category",
            "food",
            "--active",
            "--left-name",
            "Taco Town",
            "--right-id",
            "el-jefe",
            "--right-name",
            "El Jefe",
        ]);
        assert_eq!(form.id, "m9");
        assert_eq!(form.title, "Taco Fight");
        assert!(form.active);
        assert_eq!(form.left.name, "Taco Town");
        assert_eq!(form.left.id, "");
        assert_eq!(form.right.id, "el-jefe");

        let request = form.to_request().unwrap();
        assert_eq!(request.matchup.left_entry_id, "taco-town");
    }

    #[test]
    fn create_sample_with_override() {
        let form = create_form(&["scrumble", "create", "--sample", "--left-blurb", "New blurb"]);
        let sample = MatchupForm::sample();
        assert_eq!(form.id, sample.id);
        assert_eq!(form.right, sample.right);
        assert_eq!(form.left.blurb, "New blurb");
        assert_eq!(form.left.name, sample.left.name);
    }

    #[test]
    fn global_json_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["scrumble", "activate", "m1", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Activate { ref matchup_id } if matchup_id == "m1"));
    }

    #[test]
    fn outcome_as_json_is_one_document() {
        let outcome = AdminOutcome {
            status: StatusLine::info("Activated m1"),
            active: Some(ActiveRefresh {
                view: ActiveView::unavailable(),
                status: None,
            }),
            history: None,
        };
        let out = format_view(&outcome, render::outcome(&outcome), true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["status"]["message"], "Activated m1");
        assert_eq!(parsed["active"]["view"]["title"], "Unable to load");

        let text = format_view(&outcome, render::outcome(&outcome), false).unwrap();
        assert!(text.starts_with("Activated m1\n== Active ==\n"));
    }

    #[test]
    fn admin_status_as_json_is_one_document() {
        let report = AdminStatusReport {
            api: "http://scrumble.test".into(),
            key: Some(StatusLine::info("Admin key loaded")),
            active: ActiveRefresh {
                view: ActiveView::unavailable(),
                status: Some(StatusLine::error("HTTP 502")),
            },
        };
        let text = render::admin_status(&report.api, report.key.as_ref(), &report.active);
        let out = format_view(&report, text, true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["api"], "http://scrumble.test");
        assert_eq!(parsed["key"]["message"], "Admin key loaded");
        assert_eq!(parsed["active"]["status"]["message"], "HTTP 502");
    }

    #[test]
    fn status_as_json() {
        let line = StatusLine::info(NO_ACTIVE_MATCHUP);
        let out = format_view(&line, render::status(&line), true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["message"], "No active matchup");
        assert_eq!(parsed["is_error"], false);
    }
}
