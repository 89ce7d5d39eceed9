use std::io;

use tokio::net::TcpListener;

/// In-memory todo service for local runs of the `todo` client.
/// Port comes from the first argument, then `PORT`, then 3000.
#[tokio::main]
async fn main() -> Result<(), io::Error> {
    let port = port(std::env::args().nth(1), std::env::var("PORT").ok())?;
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    println!("todo service listening on http://{}", listener.local_addr()?);
    mock_server::run(listener).await
}

fn port(arg: Option<String>, env: Option<String>) -> Result<u16, io::Error> {
    let Some(raw) = arg.or(env) else {
        return Ok(3000);
    };
    raw.trim()
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("invalid port {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_beats_env_beats_default() {
        assert_eq!(port(Some("4000".into()), Some("5000".into())).unwrap(), 4000);
        assert_eq!(port(None, Some("5000".into())).unwrap(), 5000);
        assert_eq!(port(None, None).unwrap(), 3000);
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = port(Some("http".into()), None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(port(Some("70000".into()), None).is_err());
    }
}
