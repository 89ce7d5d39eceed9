use thiserror::Error;
use todo_client::{Credentials, ViewMode};

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mode(ViewMode),
    Submit {
        email: String,
        password: String,
        confirm_password: Option<String>,
    },
    Add { title: String, description: String },
    Edit(usize),
    Save { row: usize, title: String, description: String },
    Toggle(usize),
    Delete(usize),
    Refresh,
    Logout,
    Help,
    Quit,
}

impl Command {
    pub fn credentials(&self) -> Option<Credentials> {
        match self {
            Command::Submit {
                email,
                password,
                confirm_password,
            } => {
                let creds = Credentials::new(email.clone(), password.clone());
                Some(match confirm_password {
                    Some(confirm) => creds.with_confirmation(confirm.clone()),
                    None => creds,
                })
            }
            _ => None,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parse a line such as `add Buy milk | 2 litres` or `toggle 3`. Row numbers
/// are 1-based, as printed.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match word {
        "login" => Ok(Command::Mode(ViewMode::Login)),
        "register" => Ok(Command::Mode(ViewMode::Register)),
        "submit" => {
            let mut parts = rest.split_whitespace();
            let email = parts.next().unwrap_or("").to_string();
            let password = parts.next().unwrap_or("").to_string();
            let confirm_password = parts.next().map(str::to_string);
            Ok(Command::Submit {
                email,
                password,
                confirm_password,
            })
        }
        "add" => {
            let (title, description) = split_fields(rest);
            Ok(Command::Add { title, description })
        }
        "edit" => row(rest, "edit <row>").map(Command::Edit),
        "save" => {
            let (index, fields) = rest.split_once(' ').unwrap_or((rest, ""));
            let row = row(index, "save <row> <title> | <description>")?;
            let (title, description) = split_fields(fields);
            Ok(Command::Save {
                row,
                title,
                description,
            })
        }
        "toggle" => row(rest, "toggle <row>").map(Command::Toggle),
        "delete" => row(rest, "delete <row>").map(Command::Delete),
        "refresh" => Ok(Command::Refresh),
        "logout" => Ok(Command::Logout),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn row(s: &str, usage: &'static str) -> Result<usize, CommandError> {
    match s.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn split_fields(s: &str) -> (String, String) {
    let (title, description) = s.split_once('|').unwrap_or((s, ""));
    (title.trim().to_string(), description.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mode_switches() {
        assert_eq!(parse("register"), Ok(Command::Mode(ViewMode::Register)));
        assert_eq!(parse("  login "), Ok(Command::Mode(ViewMode::Login)));
    }

    #[test]
    fn submit_builds_credentials() {
        let cmd = parse("submit a@b.com pw pw").unwrap();
        let creds = cmd.credentials().unwrap();
        assert_eq!(creds.email, "a@b.com");
        assert_eq!(creds.password, "pw");
        assert_eq!(creds.confirm_password.as_deref(), Some("pw"));

        // Missing fields are left for the session controller to reject.
        let creds = parse("submit").unwrap().credentials().unwrap();
        assert!(creds.email.is_empty() && creds.password.is_empty());
    }

    #[test]
    fn add_splits_on_pipe() {
        assert_eq!(
            parse("add Buy milk | 2 litres"),
            Ok(Command::Add {
                title: "Buy milk".to_string(),
                description: "2 litres".to_string(),
            })
        );
        assert_eq!(
            parse("add only a title"),
            Ok(Command::Add {
                title: "only a title".to_string(),
                description: String::new(),
            })
        );
    }

    #[test]
    fn save_takes_row_and_fields() {
        assert_eq!(
            parse("save 2 New title | new body"),
            Ok(Command::Save {
                row: 2,
                title: "New title".to_string(),
                description: "new body".to_string(),
            })
        );
    }

    #[test]
    fn row_commands_need_positive_index() {
        assert_eq!(parse("toggle 3"), Ok(Command::Toggle(3)));
        assert_eq!(parse("delete 0"), Err(CommandError::Usage("delete <row>")));
        assert_eq!(parse("edit x"), Err(CommandError::Usage("edit <row>")));
    }

    #[test]
    fn unknown_word_is_rejected() {
        assert_eq!(parse("frobnicate"), Err(CommandError::Unknown("frobnicate".to_string())));
    }
}
