use crate::catalog::DebouncedLookup;
use crate::error::SessionError;
use crate::models::{Feedback, SearchKind, SongRef, Suggestion};
use crate::recommendation::GenerationService;
use crate::session::{SeedField, SessionMachine};
use crate::view::{render, render_detail, render_suggestions};
use anyhow::Result;
use std::io::{BufRead, Write};
use std::time::Duration;
use tracing::debug;

pub const HELP: &str = "\
commands:
  show                         redraw the current view
  add | remove <row>           add or remove a song row
  set <row> <title> / <artist> fill a song row
  title <row> <text>           set a row's title
  by <row> <text>              set a row's artist
  artist [name]                set or clear the target artist
  suggest song|artist <term>   look up names in the catalog
  pick <n> <row>               apply suggestion n to a row
  submit                       get recommendations
  like <rank> | skip <rank>    rate a recommendation (again to clear)
  detail <rank>                show a recommendation in full
  refine                       update using your feedback
  reset | retry                start over (songs are kept)
  help | quit";

/// One parsed line of user input. Rows and ranks are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Add,
    Remove(usize),
    Set { row: usize, song: SongRef },
    Title { row: usize, text: String },
    By { row: usize, text: String },
    Artist(String),
    Suggest { kind: SearchKind, term: String },
    Pick { index: usize, row: usize },
    Submit,
    Like(usize),
    Skip(usize),
    Detail(usize),
    Refine,
    Reset,
    Help,
    Quit,
}

fn parse_number(raw: Option<&str>, what: &str) -> Result<usize, String> {
    let raw = raw.ok_or_else(|| format!("missing {what}"))?;
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("{what} must be a number from 1: {raw}")),
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();

        let command = match word.to_lowercase().as_str() {
            "" | "show" => Command::Show,
            "add" => Command::Add,
            "remove" | "rm" => Command::Remove(parse_number(args.next(), "row")?),
            "set" => {
                let (row, rest) = rest
                    .split_once(char::is_whitespace)
                    .ok_or("usage: set <row> <title> / <artist>")?;
                let (title, artist) = rest
                    .split_once('/')
                    .ok_or("usage: set <row> <title> / <artist>")?;
                Command::Set {
                    row: parse_number(Some(row), "row")?,
                    song: SongRef::new(title.trim(), artist.trim()),
                }
            }
            "title" | "by" => {
                let (row, text) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| format!("usage: {word} <row> <text>"))?;
                let row = parse_number(Some(row), "row")?;
                let text = text.trim().to_string();
                if word.eq_ignore_ascii_case("title") {
                    Command::Title { row, text }
                } else {
                    Command::By { row, text }
                }
            }
            "artist" => Command::Artist(rest.to_string()),
            "suggest" => {
                let kind = match args.next() {
                    Some("song") => SearchKind::Song,
                    Some("artist") => SearchKind::Artist,
                    _ => return Err("usage: suggest song|artist <term>".to_string()),
                };
                let term = rest
                    .split_once(char::is_whitespace)
                    .map(|(_, term)| term.trim().to_string())
                    .unwrap_or_default();
                Command::Suggest { kind, term }
            }
            "pick" => Command::Pick {
                index: parse_number(args.next(), "suggestion")?,
                row: parse_number(args.next(), "row")?,
            },
            "submit" | "go" => Command::Submit,
            "like" => Command::Like(parse_number(args.next(), "rank")?),
            "skip" => Command::Skip(parse_number(args.next(), "rank")?),
            "detail" | "info" => Command::Detail(parse_number(args.next(), "rank")?),
            "refine" => Command::Refine,
            "reset" | "retry" => Command::Reset,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("unknown command: {other} (try `help`)")),
        };
        Ok(command)
    }
}

/// Interactive loop driving one session
pub struct Repl<S> {
    machine: SessionMachine<S>,
    lookup: DebouncedLookup,
    lookup_timeout: Duration,
    suggestions: Vec<(SearchKind, Suggestion)>,
}

impl<S: GenerationService> Repl<S> {
    pub fn new(
        machine: SessionMachine<S>,
        lookup: DebouncedLookup,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            machine,
            lookup,
            lookup_timeout,
            suggestions: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn machine(&self) -> &SessionMachine<S> {
        &self.machine
    }

    /// Read commands until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        writeln!(output, "{}\n\n`help` でコマンド一覧", render(self.machine.session()))?;
        write!(output, "> ")?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => {
                    if let Some(text) = self.execute(command) {
                        writeln!(output, "{text}")?;
                    }
                }
                Err(usage) => writeln!(output, "! {usage}")?,
            }
            write!(output, "> ")?;
            output.flush()?;
        }
        Ok(())
    }

    /// Apply one command; returns text the session observers do not already show
    pub fn execute(&mut self, command: Command) -> Option<String> {
        debug!(?command, "executing command");
        let outcome = match command {
            Command::Show => return Some(render(self.machine.session())),
            Command::Help => return Some(HELP.to_string()),
            Command::Quit => return None,
            Command::Add => self.machine.add_seed_row(),
            Command::Remove(row) => self.machine.remove_seed_row(row - 1),
            Command::Set { row, song } => self.machine.set_seed(row - 1, song),
            Command::Title { row, text } => {
                self.machine.update_seed(row - 1, SeedField::Title, &text)
            }
            Command::By { row, text } => {
                self.machine.update_seed(row - 1, SeedField::Artist, &text)
            }
            Command::Artist(name) => self.machine.set_target_artist(&name),
            Command::Suggest { kind, term } => return Some(self.suggest(kind, &term)),
            Command::Pick { index, row } => {
                let picked = index
                    .checked_sub(1)
                    .and_then(|i| self.suggestions.get(i))
                    .cloned();
                match picked {
                    Some((kind, suggestion)) => self.pick(kind, suggestion, row),
                    None => return Some(format!("! no suggestion {index}")),
                }
            }
            Command::Submit => self.machine.submit(),
            Command::Like(rank) => self.feedback(rank, Feedback::Like),
            Command::Skip(rank) => self.feedback(rank, Feedback::Skip),
            Command::Detail(rank) => {
                return Some(match self.machine.session().recommendation_at(rank) {
                    Some(song) => render_detail(rank, song),
                    None => format!("! no recommendation at rank {rank}"),
                });
            }
            Command::Refine => self.machine.refine(),
            Command::Reset => self.machine.reset(),
        };

        match outcome {
            Ok(()) => None,
            // Already visible through the redrawn view
            Err(SessionError::Validation(_)) | Err(SessionError::Generation(_)) => None,
            Err(SessionError::UnknownRow(index)) => {
                Some(format!("! row {} does not exist", index + 1))
            }
            Err(e) => Some(format!("! {e}")),
        }
    }

    fn feedback(&mut self, rank: usize, kind: Feedback) -> Result<(), SessionError> {
        let id = self
            .machine
            .session()
            .recommendation_at(rank)
            .map(|song| song.id.clone())
            .ok_or_else(|| SessionError::UnknownRecommendation(format!("#{rank}")))?;
        self.machine.give_feedback(&id, kind).map(|_| ())
    }

    fn suggest(&mut self, kind: SearchKind, term: &str) -> String {
        self.lookup.input(term, kind);
        let found = match self.lookup.poll() {
            Some(found) => found,
            None => self.lookup.wait(self.lookup_timeout).unwrap_or_default(),
        };
        self.suggestions = found.iter().cloned().map(|s| (kind, s)).collect();
        render_suggestions(&found)
    }

    fn pick(
        &mut self,
        kind: SearchKind,
        suggestion: Suggestion,
        row: usize,
    ) -> Result<(), SessionError> {
        match kind {
            SearchKind::Song => self.machine.set_seed(
                row - 1,
                SongRef::new(suggestion.primary, suggestion.secondary.unwrap_or_default()),
            ),
            SearchKind::Artist => {
                self.machine
                    .update_seed(row - 1, SeedField::Artist, &suggestion.primary)
            }
        }
    }
}
