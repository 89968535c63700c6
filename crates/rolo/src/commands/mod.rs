//! Command handlers, one module per command family.

pub mod auth;
pub mod contacts;
pub mod transfer;

use rolo_core::Directory;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

pub async fn dispatch(
    command: Command,
    directory: &Directory,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match command {
        Command::Login(args) => auth::login(directory, args, global).await,
        Command::Register(args) => auth::register(directory, args, global).await,
        Command::Logout => auth::logout(directory, global),
        Command::Whoami => auth::whoami(directory, global).await,
        Command::Passwd => auth::passwd(directory).await,

        Command::List(args) => contacts::list(directory, &args, global).await,
        Command::Search(args) => contacts::search(directory, &args, global).await,
        Command::Show { id } => contacts::show(directory, id, global).await,
        Command::Create(fields) => contacts::create(directory, &fields, global).await,
        Command::Update { id, fields } => contacts::update(directory, id, &fields, global).await,
        Command::Delete { id } => contacts::delete(directory, id, global).await,

        Command::Import { file } => transfer::import(directory, &file, global).await,
        Command::Export(args) => transfer::export(directory, &args, global).await,

        // Handled in main before a Directory exists.
        Command::Completions { .. } => Ok(()),
    }
}
