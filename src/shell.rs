use crate::{
    configs::FileContent,
    error::AppResult,
    session::Session,
    view::SessionView,
};
use std::{convert::Infallible, str::FromStr};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const PROMPT: &str = "x509> ";
const STDIN_IN_SHELL: &str =
    "Standard input carries the shell's commands; pipe the certificate to `x509-viewer open -` instead";
const HELP: &str = "\
open <FILE>    load a certificate (DER or PEM; `-` only works as `x509-viewer open -`)
select <NAME>  show a shelved certificate
new            clear the selection
list           show the shelf
help           this text
quit           leave";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    Open(FileContent),
    Select(String),
    New,
    List,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl FromStr for ShellCommand {
    type Err = Infallible;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((line, ""));

        let command = match (word, rest) {
            ("", _) => Self::Empty,
            ("open", file) if !file.is_empty() => Self::Open(file.parse()?),
            ("select", name) if !name.is_empty() => Self::Select(name.to_owned()),
            ("new", "") => Self::New,
            ("list", "") => Self::List,
            ("help" | "?", "") => Self::Help,
            ("quit" | "exit", "") => Self::Quit,
            _ => Self::Unknown(line.to_owned()),
        };
        Ok(command)
    }
}

/// Reads commands until `quit` or end of input, rendering both panes after
/// each one. Commands run one at a time.
pub async fn run<R, W>(session: &mut Session, input: R, mut output: W) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output
        .write_all(format!("{}\n\n", SessionView(session)).as_bytes())
        .await?;

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command: ShellCommand = match line.parse() {
            Ok(command) => command,
            Err(never) => match never {},
        };
        trace!("Shell command: {:?}", command);

        let notice = match command {
            ShellCommand::Quit => break,
            ShellCommand::Empty => continue,
            ShellCommand::Help => {
                output.write_all(format!("{}\n", HELP).as_bytes()).await?;
                continue;
            }
            ShellCommand::Unknown(line) => {
                output
                    .write_all(format!("Unknown command: {} (try `help`)\n", line).as_bytes())
                    .await?;
                continue;
            }
            ShellCommand::Open(FileContent::Stdin) => Some(STDIN_IN_SHELL.to_owned()),
            ShellCommand::Open(source) => session.upload(source).await.err().map(|a| a.to_string()),
            ShellCommand::Select(name) => session.select(&name).err().map(|e| e.to_string()),
            ShellCommand::New => {
                session.clear_selection();
                None
            }
            ShellCommand::List => None,
        };

        if let Some(notice) = notice {
            output.write_all(format!("!! {}\n", notice).as_bytes()).await?;
        }
        output
            .write_all(format!("{}\n\n", SessionView(session)).as_bytes())
            .await?;
    }

    output.flush().await?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        configs::ExtractionMode,
        store::{MemoryRepository, Store},
        view::{INVALID_CERTIFICATE, UPLOAD_PROMPT},
    };
    use std::path::PathBuf;

    #[test]
    fn parses_commands() {
        let parse = |s: &str| s.parse::<ShellCommand>().unwrap();
        assert_eq!(
            parse("open  certs/acme one.pem "),
            ShellCommand::Open(FileContent::Path {
                path: PathBuf::from("certs/acme one.pem")
            })
        );
        assert_eq!(parse("open -"), ShellCommand::Open(FileContent::Stdin));
        assert_eq!(parse("select ACME Corp"), ShellCommand::Select("ACME Corp".into()));
        assert_eq!(parse(" new "), ShellCommand::New);
        assert_eq!(parse("list"), ShellCommand::List);
        assert_eq!(parse("exit"), ShellCommand::Quit);
        assert_eq!(parse(""), ShellCommand::Empty);
        assert_eq!(parse("open"), ShellCommand::Unknown("open".into()));
        assert_eq!(parse("new thing"), ShellCommand::Unknown("new thing".into()));
    }

    #[tokio::test]
    async fn session_transcript() {
        let repo = MemoryRepository::default();
        let mut session = Session::new(Store::open(repo.clone()).unwrap(), ExtractionMode::Attributes);
        let fixture = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/acme.pem");
        let garbage = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml");
        let script = format!(
            "open {}\nopen {}\nnew\nselect ACME Corp\nselect Initech\nbogus\nquit\nopen {}\n",
            fixture, garbage, garbage
        );

        let mut output = Vec::new();
        run(&mut session, script.as_bytes(), &mut output).await.unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains("Issuer CN:   ACME Root CA"));
        assert_eq!(output.matches(INVALID_CERTIFICATE).count(), 1);
        assert!(output.contains(UPLOAD_PROMPT));
        assert!(output.contains("Initech"));
        assert!(output.contains("Unknown command: bogus"));
        assert_eq!(session.store().len(), 1);
        assert_eq!(session.selection().unwrap().name, "ACME Corp");
        assert!(repo.contents().unwrap().contains("ACME Corp"));
    }

    #[tokio::test]
    async fn dash_does_not_swallow_the_command_stream() {
        let mut session = Session::new(
            Store::open(MemoryRepository::default()).unwrap(),
            ExtractionMode::Attributes,
        );
        let fixture = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/acme.pem");
        let script = format!("open -\nopen {}\nquit\n", fixture);

        let mut output = Vec::new();
        run(&mut session, script.as_bytes(), &mut output).await.unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains(STDIN_IN_SHELL));
        assert_eq!(output.matches(INVALID_CERTIFICATE).count(), 0);
        assert_eq!(session.store().len(), 1);
        assert_eq!(session.selection().unwrap().name, "ACME Corp");
    }
}
