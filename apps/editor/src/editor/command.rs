//! Line-oriented front end: turns typed lines into editor calls.
//!
//! The meaning of a line depends on the input mode. While a field is in edit,
//! lines go to its buffer; while the save prompt is open, the line is the
//! filename; otherwise it is a command.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::{view, Editor, Notice};
use crate::errors::EditorError;

pub const HELP: &str = "\
Commands:
  show [field]          show the whole resume or one field
  edit <field>          edit a field (then type lines; :done, :cancel, :clear, :show)
  enhance <field>       ask the service to rewrite a field
  skill add             add an empty skill
  skill set <i> <text>  change skill number i
  skill rm <i>          remove skill number i
  save                  save to the remote store (asks for a filename)
  export                write <filename>.json locally (after a successful save)
  page <n>              go to page n of the uploaded document
  status                show pending work and export availability
  help                  show this help
  quit                  leave the editor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Command,
    Editing,
    Filename,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show(Option<String>),
    Edit(String),
    Enhance(String),
    SkillAdd,
    SkillSet(usize, String),
    SkillRemove(usize),
    Save,
    Export,
    Page(u32),
    Status,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, EditorError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "show" | "ls" => Command::Show(non_empty(rest)),
            "edit" => Command::Edit(required(rest, "edit <field>")?),
            "enhance" => Command::Enhance(required(rest, "enhance <field>")?),
            "skill" => parse_skill(rest)?,
            "save" => Command::Save,
            "export" | "download" => Command::Export,
            "page" => Command::Page(parse_number(rest, "page <n>")?),
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => {
                return Err(EditorError::Validation(format!(
                    "Unknown command '{other}'. Type 'help' for a list."
                )))
            }
        };
        Ok(command)
    }
}

fn parse_skill(rest: &str) -> Result<Command, EditorError> {
    let (action, args) = match rest.split_once(char::is_whitespace) {
        Some((action, args)) => (action, args.trim()),
        None => (rest, ""),
    };
    match action {
        "add" => Ok(Command::SkillAdd),
        "rm" | "remove" => Ok(Command::SkillRemove(parse_number(args, "skill rm <i>")?)),
        "set" => {
            let (index, text) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
            Ok(Command::SkillSet(
                parse_number(index, "skill set <i> <text>")?,
                text.trim().to_string(),
            ))
        }
        _ => Err(EditorError::Validation(
            "Usage: skill add | skill set <i> <text> | skill rm <i>".to_string(),
        )),
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

fn required(text: &str, usage: &str) -> Result<String, EditorError> {
    non_empty(text).ok_or_else(|| EditorError::Validation(format!("Usage: {usage}")))
}

fn parse_number<T: std::str::FromStr>(text: &str, usage: &str) -> Result<T, EditorError> {
    text.trim()
        .parse()
        .map_err(|_| EditorError::Validation(format!("Usage: {usage}")))
}

/// Reads one input line, replacing bytes that are not UTF-8 instead of
/// failing. Returns `None` at end of input.
///
/// `pending` must outlive the call: when the future is dropped inside
/// `tokio::select!`, bytes read so far stay in it and the next call resumes.
pub async fn read_line_lossy<R>(
    reader: &mut R,
    pending: &mut Vec<u8>,
) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let read = reader.read_until(b'\n', pending).await?;
    if read == 0 && pending.is_empty() {
        return Ok(None);
    }
    let mut raw = std::mem::take(pending);
    if raw.last() == Some(&b'\n') {
        raw.pop();
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
}

/// What the front end should do after a line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub output: Option<String>,
    pub notices: Vec<Notice>,
    pub quit: bool,
}

impl Outcome {
    fn output(text: impl Into<String>) -> Self {
        Self {
            output: Some(text.into()),
            ..Self::default()
        }
    }

    fn notice(notice: Notice) -> Self {
        Self {
            notices: vec![notice],
            ..Self::default()
        }
    }

    fn from_result(result: Result<Outcome, EditorError>) -> Self {
        result.unwrap_or_else(|e| Self::notice(Notice::from(&e)))
    }
}

impl Editor {
    pub fn input_mode(&self) -> InputMode {
        if self.session().active_field().is_some() {
            InputMode::Editing
        } else if self.session().persistence.prompt().awaiting_filename {
            InputMode::Filename
        } else {
            InputMode::Command
        }
    }

    /// Handles one typed line according to the current input mode.
    pub fn handle_line(&mut self, line: &str) -> Outcome {
        let result = match self.input_mode() {
            InputMode::Editing => self.handle_edit_line(line),
            InputMode::Filename => self.handle_filename_line(line),
            InputMode::Command => Command::parse(line).and_then(|c| self.run(c)),
        };
        Outcome::from_result(result)
    }

    fn handle_edit_line(&mut self, line: &str) -> Result<Outcome, EditorError> {
        match line.trim() {
            ":done" => {
                let commit = self.commit_edit();
                let field = commit.map(|c| c.field).unwrap_or_default();
                Ok(Outcome::output(view::render_field(self, &field)))
            }
            ":cancel" => {
                let field = self.cancel_edit().unwrap_or_default();
                Ok(Outcome::notice(Notice::info(format!("Discarded changes to {field}"))))
            }
            ":clear" => {
                self.replace_buffer("")?;
                Ok(Outcome::default())
            }
            ":show" => Ok(Outcome::output(
                self.session().fields.buffer().unwrap_or_default().to_string(),
            )),
            _ => {
                self.push_line(line)?;
                Ok(Outcome::default())
            }
        }
    }

    fn handle_filename_line(&mut self, line: &str) -> Result<Outcome, EditorError> {
        if line.trim() == ":cancel" {
            self.cancel_save_prompt();
            return Ok(Outcome::notice(Notice::info("Save cancelled")));
        }
        let filename = self.submit_filename(line)?;
        Ok(Outcome::notice(Notice::info(format!(
            "Saving your resume as {filename}..."
        ))))
    }

    fn run(&mut self, command: Command) -> Result<Outcome, EditorError> {
        match command {
            Command::Show(None) => Ok(Outcome::output(view::render_document(self))),
            Command::Show(Some(field)) => {
                let field = self.resolve_field(&field)?;
                Ok(Outcome::output(view::render_field(self, &field)))
            }
            Command::Edit(field) => {
                let field = self.resolve_field(&field)?;
                let seed = self.begin_edit(&field)?;
                Ok(Outcome::output(format!(
                    "Editing {field} ({} rows). Current text:\n{seed}\n\
                     Type new lines to append, :clear to start over, :done to save, :cancel to discard.",
                    self.session().fields.rows(self.document(), &field)
                )))
            }
            Command::Enhance(field) => {
                let field = self.resolve_field(&field)?;
                self.enhance(&field)?;
                Ok(Outcome::notice(Notice::info(format!("Enhancing {field}..."))))
            }
            Command::SkillAdd => {
                let index = self.add_skill()?;
                Ok(Outcome::output(format!(
                    "Added skill #{index}. Fill it with: skill set {index} <text>"
                )))
            }
            Command::SkillSet(index, text) => {
                self.set_skill(index, &text)?;
                Ok(Outcome::output(view::render_field(self, super::SKILLS_FIELD)))
            }
            Command::SkillRemove(index) => {
                let removed = self.remove_skill(index)?;
                let mut outcome = Outcome::output(view::render_field(self, super::SKILLS_FIELD));
                outcome
                    .notices
                    .push(Notice::info(format!("Removed skill '{removed}'")));
                Ok(outcome)
            }
            Command::Save => {
                let prompt = self.open_save_prompt();
                Ok(Outcome::output(format!(
                    "Type a filename (suggested: {}) or :cancel:",
                    prompt.proposed_filename
                )))
            }
            Command::Export => {
                let target = self.export()?;
                Ok(Outcome::notice(Notice::info(format!(
                    "Writing {}...",
                    target.display()
                ))))
            }
            Command::Page(page) => {
                self.go_to_page(page)?;
                Ok(Outcome::output(self.preview().status_line()))
            }
            Command::Status => Ok(Outcome::output(view::render_status(self))),
            Command::Help => Ok(Outcome::output(HELP)),
            Command::Quit => Ok(Outcome {
                quit: true,
                ..Outcome::default()
            }),
        }
    }

    fn resolve_field(&self, name: &str) -> Result<String, EditorError> {
        self.document()
            .find_name(name)
            .map(str::to_string)
            .ok_or_else(|| crate::document::DocumentError::UnknownField(name.to_string()).into())
    }
}
