//! Account and session command handlers.

use dialoguer::{Input, Password};

use rolo_api::RegisterRequest;
use rolo_core::Directory;

use crate::cli::{GlobalOpts, LoginArgs, RegisterArgs};
use crate::error::CliError;
use crate::output;

pub async fn login(
    directory: &Directory,
    args: LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let username = match args.username {
        Some(username) => username,
        None => Input::new().with_prompt("Username").interact_text()?,
    };
    let password = match args.password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let user = directory.login(&username, &password).await?;
    output::print_output(
        &format!("Logged in as {} {}", user.first_name, user.last_name),
        global.quiet,
    );
    Ok(())
}

pub async fn register(
    directory: &Directory,
    args: RegisterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let password = match args.password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    let user = directory
        .register(RegisterRequest {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone_number: args.phone,
            password,
        })
        .await?;
    output::print_output(
        &format!("Account created; logged in as {} {}", user.first_name, user.last_name),
        global.quiet,
    );
    Ok(())
}

pub fn logout(directory: &Directory, global: &GlobalOpts) -> Result<(), CliError> {
    directory.logout();
    output::print_output("Logged out", global.quiet);
    Ok(())
}

pub async fn whoami(directory: &Directory, global: &GlobalOpts) -> Result<(), CliError> {
    let user = directory.me().await?;
    let out = output::render_single(
        &global.output,
        &user,
        |u| {
            [
                format!("ID:     {}", u.id),
                format!("Name:   {} {}", u.first_name, u.last_name),
                format!("Email:  {}", u.email.as_deref().unwrap_or("-")),
                format!("Phone:  {}", u.phone_number.as_deref().unwrap_or("-")),
                format!("Active: {}", u.active),
            ]
            .join("\n")
        },
        |u| u.id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn passwd(directory: &Directory) -> Result<(), CliError> {
    let current = Password::new().with_prompt("Current password").interact()?;
    let new = Password::new()
        .with_prompt("New password")
        .with_confirmation("Confirm new password", "Passwords do not match")
        .interact()?;

    directory.change_password(&current, &new).await?;
    println!("Password changed");
    Ok(())
}
