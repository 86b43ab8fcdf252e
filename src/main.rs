//! office-ticket - Office IT helpdesk ticketing
//!
//! Entry point for the command-line tool. Parses arguments, opens the
//! ticket database and dispatches to the command handlers.

use clap::Parser;
use office_ticket::cli::handlers::{
    self, AddUserParams, CreateParams, HandlerContext, ListParams, StatusParams,
};
use office_ticket::cli::{Cli, Commands, OutputFormatter, UserCommands};
use office_ticket::error::{OfficeTicketError, Result};
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let formatter = OutputFormatter::new(cli.json, cli.no_color);

    if let Err(e) = run(cli, &formatter).await {
        handle_error(&e, &formatter);
        process::exit(1);
    }
}

async fn run(cli: Cli, formatter: &OutputFormatter) -> Result<()> {
    init_logging(&cli);

    let ctx = HandlerContext::new(cli.config.as_deref()).await?;
    let result = dispatch_command(&ctx, cli.command, cli.token.as_deref(), formatter).await;
    ctx.close().await;
    result
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if is_serve(&cli.command) {
        "info"
    } else {
        "warn"
    };
    let filter = if cli.verbose {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "api")]
const fn is_serve(command: &Commands) -> bool {
    matches!(command, Commands::Serve { .. })
}

#[cfg(not(feature = "api"))]
const fn is_serve(_command: &Commands) -> bool {
    false
}

async fn dispatch_command(
    ctx: &HandlerContext,
    command: Commands,
    token: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    match command {
        Commands::Init => handlers::handle_init(ctx, formatter).await,
        #[cfg(feature = "api")]
        Commands::Serve { bind } => handlers::handle_serve(ctx, bind, formatter).await,
        Commands::Login { email, password } => {
            handlers::handle_login(ctx, &email, password, formatter).await
        },
        Commands::Show { ticket } => handlers::handle_show(ctx, &ticket, formatter).await,
        command => {
            let caller = ctx.caller(token).await?;
            dispatch_authenticated(ctx, &caller, command, formatter).await
        },
    }
}

/// Commands that act on behalf of the `--token` holder
async fn dispatch_authenticated(
    ctx: &HandlerContext,
    caller: &office_ticket::core::Caller,
    command: Commands,
    formatter: &OutputFormatter,
) -> Result<()> {
    match command {
        Commands::New {
            name,
            email,
            department,
            location,
            category,
            sub_category,
            description,
            attachments,
            interactive,
        } => {
            let params = CreateParams {
                name,
                email,
                department,
                location,
                category,
                sub_category,
                description,
                attachments,
                interactive,
            };
            handlers::handle_new(ctx, caller, params, formatter).await
        },
        Commands::List {
            status,
            department,
            location,
            category,
            mine,
        } => {
            let params = ListParams {
                status,
                department,
                location,
                category,
                mine,
            };
            handlers::handle_list(ctx, caller, params, formatter).await
        },
        Commands::Status {
            ticket,
            status,
            comment,
            assign,
        } => {
            let params = StatusParams {
                ticket,
                status,
                comment,
                assign,
            };
            handlers::handle_status(ctx, caller, params, formatter).await
        },
        Commands::Assign {
            ticket,
            assignee,
            comment,
        } => {
            handlers::handle_assign(ctx, caller, &ticket, &assignee, comment.as_deref(), formatter)
                .await
        },
        Commands::Comment { ticket, message } => {
            handlers::handle_comment(ctx, caller, &ticket, &message, formatter).await
        },
        Commands::Freeze => handlers::handle_freeze(ctx, caller, formatter).await,
        Commands::Stats => handlers::handle_stats(ctx, caller, formatter).await,
        Commands::User(UserCommands::Add {
            name,
            email,
            password,
            role,
            department,
        }) => {
            let params = AddUserParams {
                name,
                email,
                password,
                role,
                department,
            };
            handlers::handle_user_add(ctx, caller, params, formatter).await
        },
        Commands::User(UserCommands::List) => {
            handlers::handle_user_list(ctx, caller, formatter).await
        },
        Commands::Export { format, output } => {
            handlers::handle_export(ctx, caller, format, output.as_deref(), formatter).await
        },
        other => Err(OfficeTicketError::Custom(format!(
            "Command not handled here: {other:?}"
        ))),
    }
}

/// Print an error with its suggestions
fn handle_error(error: &OfficeTicketError, formatter: &OutputFormatter) {
    let suggestions = error.suggestions();

    if formatter.is_json() {
        let _ = formatter.print_json(&serde_json::json!({
            "status": "error",
            "error": error.user_message(),
            "error_type": format!("{:?}", error.kind()),
            "suggestions": suggestions,
            "recoverable": error.is_recoverable(),
            "is_config_error": error.is_config_error(),
        }));
    } else {
        formatter.error(&error.user_message());
        if !suggestions.is_empty() {
            eprintln!("\nSuggestions:");
            for suggestion in &suggestions {
                eprintln!("  • {suggestion}");
            }
        }
    }

    if tracing::enabled!(tracing::Level::DEBUG) {
        eprintln!("\nDebug information:");
        eprintln!("{error:?}");
    }
}
