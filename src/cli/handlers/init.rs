//! `init` and `serve`

use super::base::HandlerContext;
use crate::cli::output::OutputFormatter;
use crate::error::Result;
use serde_json::json;

/// Create the database, the uploads directory and the seed accounts
pub async fn handle_init(ctx: &HandlerContext, formatter: &OutputFormatter) -> Result<()> {
    tokio::fs::create_dir_all(ctx.service.blobs().dir()).await?;
    let created = ctx.service.bootstrap().await?;

    if formatter.is_json() {
        return formatter.print_json(&json!({
            "status": "success",
            "database": ctx.settings.database.path,
            "uploads": ctx.service.blobs().dir(),
            "seeded_accounts": created,
        }));
    }

    formatter.success(&format!(
        "Initialized database at {}",
        ctx.settings.database.path.display()
    ));
    formatter.info(&format!(
        "Attachments are stored in {}",
        ctx.service.blobs().dir().display()
    ));
    if created.is_empty() {
        formatter.info("Default accounts already exist");
    } else {
        for email in &created {
            formatter.info(&format!("  created account {email}"));
        }
        formatter.warning("Default accounts use well-known passwords; change them before going live");
    }
    Ok(())
}

/// Run the HTTP API until Ctrl-C
#[cfg(feature = "api")]
pub async fn handle_serve(
    ctx: &HandlerContext,
    bind: Option<String>,
    formatter: &OutputFormatter,
) -> Result<()> {
    if ctx.settings.auth.uses_dev_secret() {
        formatter.warning("Using the built-in JWT secret; set OFFICE_TICKET__AUTH__JWT_SECRET");
    }
    tokio::fs::create_dir_all(ctx.service.blobs().dir()).await?;
    ctx.service.bootstrap().await?;

    let bind = bind.unwrap_or_else(|| ctx.settings.server.bind.clone());
    let max_upload_bytes = usize::try_from(ctx.settings.uploads.max_bytes)
        .unwrap_or(usize::MAX)
        .saturating_mul(ctx.settings.uploads.max_files.max(1));
    let router = crate::api::router(
        ctx.service.clone(),
        ctx.service.blobs().dir(),
        max_upload_bytes,
    );

    formatter.info(&format!("Serving on http://{bind}"));
    crate::api::serve(router, &bind).await
}
