//! `login` and `user` commands

use super::base::{HandlerContext, password_or_prompt};
use crate::cli::output::OutputFormatter;
use crate::core::{Caller, Registration, Role, User};
use crate::error::Result;
use colored::Colorize;
use serde_json::json;

pub async fn handle_login(
    ctx: &HandlerContext,
    email: &str,
    password: Option<String>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let password = password_or_prompt(password, false)?;
    let login = ctx.service.login(email, &password).await?;

    if formatter.is_json() {
        return formatter.print_json(&login);
    }
    formatter.success(&format!(
        "Logged in as {} ({})",
        login.user.email, login.user.role
    ));
    formatter.info("Pass this token with --token or export OFFICE_TICKET_TOKEN:");
    println!("{}", login.token);
    Ok(())
}

/// Parameters for `user add`
pub struct AddUserParams {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub role: String,
    pub department: Option<String>,
}

pub async fn handle_user_add(
    ctx: &HandlerContext,
    caller: &Caller,
    params: AddUserParams,
    formatter: &OutputFormatter,
) -> Result<()> {
    let role: Role = params.role.parse()?;
    let password = password_or_prompt(params.password, true)?;
    let user = ctx
        .service
        .register_user(
            caller,
            Registration {
                name: params.name,
                email: params.email,
                password,
                role: Some(role),
                department: params.department,
            },
        )
        .await?;

    if formatter.is_json() {
        return formatter.print_json(&json!({ "status": "success", "user": user }));
    }
    formatter.success(&format!("Created {} account for {}", user.role, user.email));
    Ok(())
}

pub async fn handle_user_list(
    ctx: &HandlerContext,
    caller: &Caller,
    formatter: &OutputFormatter,
) -> Result<()> {
    let users = ctx.service.list_users(caller).await?;
    if formatter.is_json() {
        return formatter.print_json(&users);
    }
    print_users(&users);
    Ok(())
}

fn print_users(users: &[User]) {
    println!(
        "{:<6} {:<28} {:<20} {:<10} {}",
        "ID".bold(),
        "EMAIL".bold(),
        "NAME".bold(),
        "ROLE".bold(),
        "DEPARTMENT".bold()
    );
    for user in users {
        println!(
            "{:<6} {:<28} {:<20} {:<10} {}",
            user.user_id,
            user.email,
            user.name,
            user.role.to_string(),
            user.department.as_deref().unwrap_or("-")
        );
    }
}
