mod command;
mod cookie_file;
mod logging;
mod render;
mod settings;
mod transport;

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use todo_client::{ApiClient, App, CookieStore, EditState, Remote, Screen, TodoDraft, Transport};

use command::Command;
use cookie_file::FileCookieJar;
use settings::Settings;
use transport::ReqwestTransport;

const HELP: &str = "\
login | register                  switch the form
submit <email> <password> [conf]  log in or register
add <title> | <description>       create a todo
edit <row>                        make a row editable
save <row> <title> | <desc>       save an edited row
toggle <row>                      mark done / pending
delete <row>                      delete a row
refresh                           reload the list
logout                            end the session
quit                              exit";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let settings = Settings::new().context("Failed to load configuration")?;
    settings
        .validate()
        .map_err(|e| anyhow!("Configuration validation failed: {e}"))?;

    let (log_path, _guard) = logging::init_logging(&settings.log_path())?;
    tracing::info!("todo client starting against {}", settings.base_url);

    let cookies = FileCookieJar::open(settings.cookie_path())?;
    tracing::debug!("cookie jar at {}", cookies.path().display());
    let transport = ReqwestTransport::new(Duration::from_secs(settings.request_timeout_secs))?;
    let app = App::new(Remote::new(ApiClient::new(&settings.base_url), transport), cookies);

    println!("logging to {}", log_path.display());
    app.start().await;
    run(&app).await?;

    tracing::info!("todo client exiting");
    Ok(())
}

async fn run<T: Transport, C: CookieStore>(app: &App<T, C>) -> Result<()> {
    let mut lines = BufReader::new(stdin()).lines();
    print!("{}", render::render(&app.render()));

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match command::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        if let Err(message) = dispatch(app, command).await {
            println!("{message}");
            continue;
        }
        print!("{}", render::render(&app.render()));
    }
    Ok(())
}

/// Apply one command. `Err` carries a hint for commands that make no sense
/// on the current screen; operation failures are already part of the view.
async fn dispatch<T: Transport, C: CookieStore>(app: &App<T, C>, command: Command) -> Result<(), String> {
    let on_list = app.screen() == Screen::Todos;
    match command {
        Command::Help => return Err(HELP.to_string()),
        Command::Mode(mode) if !on_list => app.switch_mode(mode),
        Command::Submit { .. } if !on_list => {
            if let Some(credentials) = command.credentials() {
                // The failure message is rendered by the auth view.
                let _ = app.authenticate(&credentials).await;
            }
        }
        Command::Add { title, description } if on_list => {
            app.set_draft(TodoDraft { title, description });
            app.create_from_draft().await;
        }
        Command::Edit(row) if on_list => app.begin_edit(&row_id(app, row)?),
        Command::Save {
            row,
            title,
            description,
        } if on_list => {
            let id = row_id(app, row)?;
            if app.todos().edit_state(&id) != EditState::Editing {
                return Err(format!("row {row} is not being edited (use `edit {row}`)"));
            }
            app.save_edit(&id, &title, &description).await;
        }
        Command::Toggle(row) if on_list => {
            let id = row_id(app, row)?;
            let current = app.find(&id).map(|t| t.completed).unwrap_or_default();
            app.toggle_complete(&id, current).await;
        }
        Command::Delete(row) if on_list => {
            app.delete(&row_id(app, row)?).await;
        }
        Command::Refresh if on_list => {
            app.refresh().await;
        }
        Command::Logout if on_list => app.logout().await,
        _ if on_list => return Err("log out first".to_string()),
        _ => return Err("log in first".to_string()),
    }
    Ok(())
}

fn row_id<T: Transport, C: CookieStore>(app: &App<T, C>, row: usize) -> Result<String, String> {
    app.todos()
        .items()
        .get(row - 1)
        .map(|t| t.id.clone())
        .ok_or_else(|| format!("no row {row}"))
}
