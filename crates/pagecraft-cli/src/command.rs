//! Line commands for `pagecraft edit`.
//!
//! One command per line. Blocks are addressed by their position in the page.
//!
//! ```text
//! add hero            add hero 0          rm 2
//! dup 0               mv 0 2              set primaryColor "#e91e63"
//! title Spring launch field 0 en heading "Hello"
//! reset 1             select 0            select none
//! undo  redo  jump 3  history  show  save  quit
//! ```

use std::str::FromStr;

use anyhow::{Context, bail};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Add {
        block_type: String,
        position: Option<usize>,
    },
    Remove(usize),
    Duplicate(usize),
    Move {
        from: usize,
        to: usize,
    },
    /// Set one page-level setting.
    Set {
        key: String,
        value: Value,
    },
    Title(String),
    /// Set one content field of one block in one language.
    Field {
        index: usize,
        language: String,
        key: String,
        value: Value,
    },
    Reset(usize),
    Select(Option<usize>),
    Undo,
    Redo,
    Jump(usize),
    History,
    Show,
    Save,
    Quit,
}

fn index(arg: Option<&str>, what: &str) -> anyhow::Result<usize> {
    let arg = arg.with_context(|| format!("missing {what}"))?;
    arg.parse()
        .with_context(|| format!("{what} must be a number, got {arg:?}"))
}

fn json(arg: Option<&str>) -> anyhow::Result<Value> {
    let arg = arg.context("missing JSON value")?;
    serde_json::from_str(arg).with_context(|| format!("invalid JSON: {arg}"))
}

fn word(arg: Option<&str>, what: &str) -> anyhow::Result<String> {
    Ok(arg.with_context(|| format!("missing {what}"))?.to_string())
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim_start();
        let mut args = rest.split_whitespace();

        let command = match name {
            "add" => Command::Add {
                block_type: word(args.next(), "block type")?,
                position: args.next().map(|p| index(Some(p), "position")).transpose()?,
            },
            "rm" => Command::Remove(index(args.next(), "block index")?),
            "dup" => Command::Duplicate(index(args.next(), "block index")?),
            "mv" => Command::Move {
                from: index(args.next(), "source index")?,
                to: index(args.next(), "target index")?,
            },
            "set" => {
                let mut parts = rest.splitn(2, char::is_whitespace);
                Command::Set {
                    key: word(parts.next().filter(|k| !k.is_empty()), "setting key")?,
                    value: json(parts.next())?,
                }
            }
            "title" => {
                if rest.is_empty() {
                    bail!("missing title");
                }
                Command::Title(rest.to_string())
            }
            "field" => {
                let mut parts = rest.splitn(4, char::is_whitespace);
                Command::Field {
                    index: index(parts.next().filter(|p| !p.is_empty()), "block index")?,
                    language: word(parts.next(), "language")?,
                    key: word(parts.next(), "field key")?,
                    value: json(parts.next())?,
                }
            }
            "reset" => Command::Reset(index(args.next(), "block index")?),
            "select" => match args.next() {
                Some("none") => Command::Select(None),
                arg => Command::Select(Some(index(arg, "block index")?)),
            },
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "jump" => Command::Jump(index(args.next(), "history index")?),
            "history" => Command::History,
            "show" => Command::Show,
            "save" => Command::Save,
            "quit" | "exit" => Command::Quit,
            "" => bail!("empty command"),
            other => bail!("unknown command: {other}"),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(line: &str) -> Command {
        line.parse().unwrap()
    }

    #[test]
    fn test_add_with_and_without_position() {
        assert_eq!(
            parse("add hero"),
            Command::Add {
                block_type: "hero".into(),
                position: None
            }
        );
        assert_eq!(
            parse("add  cta 2"),
            Command::Add {
                block_type: "cta".into(),
                position: Some(2)
            }
        );
    }

    #[test]
    fn test_json_values_keep_spaces() {
        assert_eq!(
            parse(r#"set tagline "ship it today""#),
            Command::Set {
                key: "tagline".into(),
                value: json!("ship it today")
            }
        );
        assert_eq!(
            parse(r#"field 1 de heading {"text": "Hallo Welt"}"#),
            Command::Field {
                index: 1,
                language: "de".into(),
                key: "heading".into(),
                value: json!({ "text": "Hallo Welt" })
            }
        );
    }

    #[test]
    fn test_title_takes_rest_of_line() {
        assert_eq!(
            parse("title  Spring launch 2026"),
            Command::Title("Spring launch 2026".into())
        );
    }

    #[test]
    fn test_select() {
        assert_eq!(parse("select none"), Command::Select(None));
        assert_eq!(parse("select 3"), Command::Select(Some(3)));
    }

    #[test]
    fn test_bare_commands() {
        assert_eq!(parse("undo"), Command::Undo);
        assert_eq!(parse(" redo "), Command::Redo);
        assert_eq!(parse("jump 0"), Command::Jump(0));
        assert_eq!(parse("exit"), Command::Quit);
    }

    #[test]
    fn test_errors() {
        for bad in [
            "",
            "frobnicate",
            "rm",
            "rm x",
            "mv 1",
            "set key",
            "set key {nope",
            "title",
            "field 0 en",
            "select",
        ] {
            assert!(bad.parse::<Command>().is_err(), "{bad:?} should fail");
        }
    }
}
