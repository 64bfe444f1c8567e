//! a line based host for trying the autocomplete in a terminal
//!
//! every plain line replaces the field text with the caret at the end. lines starting with `:`
//! are commands
use {
    crate::{
        app::cli::read_files,
        complete::{
            AutocompleteHandle, FieldBounds, Key, PopupPlacement, SuggestionRenderer, TextField,
            blur_with_timer, lock,
        },
        controller::{DatasetController, DatasetStats},
        index::Suggestion,
        loader::LoadOptions,
    },
    color_eyre::eyre::Result,
    owo_colors::OwoColorize,
    std::{
        path::PathBuf,
        sync::{Arc, Mutex},
    },
    tokio::io::{AsyncBufReadExt, BufReader},
    tracing::warn,
};

/// the text of the terminal "field"
#[derive(Debug, Default)]
struct LineState {
    /// the current text
    text: String,
    /// the caret, as a byte offset
    caret: usize,
}

/// a text field backed by the last line typed
#[derive(Clone, Default)]
pub struct LineField(Arc<Mutex<LineState>>);

impl LineField {
    /// lock the field state
    fn state(&self) -> std::sync::MutexGuard<'_, LineState> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// replace the text, putting the caret at the end
    pub fn type_line(&self, line: &str) {
        let mut state = self.state();
        state.text = line.to_string();
        state.caret = line.len();
    }

    /// the current text
    pub fn current(&self) -> String {
        self.state().text.clone()
    }
}

impl TextField for LineField {
    fn text(&self) -> String {
        self.current()
    }

    fn caret(&self) -> usize {
        self.state().caret
    }

    fn set_text(&mut self, text: String, caret: usize) {
        let mut state = self.state();
        state.text = text;
        state.caret = caret;
    }

    fn notify_changed(&mut self) {
        let state = self.state();
        println!("{} {}", "=>".bright_green(), state.text.bright_white());
    }

    fn bounds(&self) -> FieldBounds {
        FieldBounds {
            left: 0.0,
            top: 0.0,
            width: 80.0,
            height: 1.0,
        }
    }
}

/// prints the popup to stdout
#[derive(Default)]
pub struct TermRenderer {
    /// the suggestions last shown
    tags: Vec<String>,
}

impl TermRenderer {
    /// print one popup line
    fn print_line(index: usize, suggestion: &Suggestion, active: bool) {
        let record = &suggestion.record;
        let marker = if active { "›" } else { " " };
        let mut line = if active {
            format!("{} {:>2}. {}", marker.cyan(), index, record.tag().bold().cyan())
        } else {
            format!("{} {:>2}. {}", marker, index, record.tag().bright_white())
        };

        if let Some(aliases) = record.alias_preview() {
            line.push_str(&format!("  {}", aliases.bright_black()));
        }

        if let Some(meta) = record.meta_line() {
            line.push_str(&format!("  {}", meta.dimmed()));
        }

        println!("{line}");
    }
}

impl SuggestionRenderer for TermRenderer {
    fn show(&mut self, suggestions: &[Suggestion], active: usize, _placement: PopupPlacement) {
        self.tags = suggestions.iter().map(|s| s.tag().to_string()).collect();
        for (i, suggestion) in suggestions.iter().enumerate() {
            Self::print_line(i, suggestion, i == active);
        }
    }

    fn highlight(&mut self, active: usize) {
        if let Some(tag) = self.tags.get(active) {
            println!("{} {}", "›".cyan(), tag.bold().cyan());
        }
    }

    fn hide(&mut self) {
        self.tags.clear();
    }
}

/// a parsed host command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// new field text
    Text(String),
    /// a key press
    Key(Key),
    /// pick a suggestion by index
    Pick(usize),
    /// leave the field
    Blur,
    /// print the stats
    Stats,
    /// list the sources
    Sources,
    /// reload from the configured sources
    Reload,
    /// replace the dataset with files
    Replace(Vec<PathBuf>),
    /// merge files into the dataset
    Merge(Vec<PathBuf>),
    /// print the commands
    Help,
    /// stop
    Quit,
}

impl Command {
    /// parse one input line
    pub fn parse(line: &str) -> Result<Self, String> {
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Self::Text(line.to_string()));
        };

        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();

        Ok(match name {
            "down" => Self::Key(Key::Down),
            "up" => Self::Key(Key::Up),
            "tab" => Self::Key(Key::Tab),
            "enter" => Self::Key(Key::Enter),
            "esc" => Self::Key(Key::Escape),
            "pick" => Self::Pick(
                args.first()
                    .and_then(|n| n.parse().ok())
                    .ok_or(":pick needs a suggestion number")?,
            ),
            "blur" => Self::Blur,
            "stats" => Self::Stats,
            "sources" => Self::Sources,
            "reload" => Self::Reload,
            "replace" | "merge" if args.is_empty() => {
                return Err(format!(":{name} needs at least one file"));
            }
            "replace" => Self::Replace(args.iter().map(PathBuf::from).collect()),
            "merge" => Self::Merge(args.iter().map(PathBuf::from).collect()),
            "help" => Self::Help,
            "quit" | "q" => Self::Quit,
            other => return Err(format!("unknown command :{other}")),
        })
    }
}

/// print dataset stats
fn print_stats(stats: DatasetStats) {
    println!(
        "{} {} tags from {} sources",
        "::".bright_blue(),
        stats.tag_count.bold(),
        stats.source_count.bold()
    );
}

/// print the command list
fn print_help() {
    println!(
        "{}\n  :down :up :tab :enter :esc  move or commit\n  :pick N  pick suggestion N\n  :blur  leave the field\n  :stats :sources :reload\n  :replace FILES  :merge FILES\n  :quit",
        "type tags separated by commas, or:".bright_black()
    );
}

/// run the host until stdin closes or `:quit`
///
/// # Errors
///
/// returns an error if stdin can't be read
pub async fn run(controller: Arc<DatasetController>, options: LoadOptions) -> Result<()> {
    let field = LineField::default();
    let handle: AutocompleteHandle =
        controller.attach(Box::new(field.clone()), Box::<TermRenderer>::default());

    print_stats(controller.stats());
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(line.trim_end_matches(['\r', '\n'])) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e.red());
                continue;
            }
        };

        match command {
            Command::Text(text) => {
                field.type_line(&text);
                lock(&handle).handle_input();
            }
            Command::Key(key) => {
                lock(&handle).handle_key(key);
            }
            Command::Pick(index) => {
                if !lock(&handle).pointer_select(index) {
                    println!("{}", "no such suggestion".red());
                }
            }
            Command::Blur => {
                blur_with_timer(&handle).await?;
            }
            Command::Stats => print_stats(controller.stats()),
            Command::Sources => {
                for source in controller.sources() {
                    println!(
                        "  {} {} {}",
                        source.label.bright_white(),
                        format!("[{}]", source.format).bright_black(),
                        format!("{} tags", source.size).dimmed()
                    );
                }
            }
            Command::Reload => print_stats(controller.reload(&options).await),
            Command::Replace(paths) => match read_files(&paths).await {
                Ok(files) => print_stats(controller.replace_with_files(files).await),
                Err(e) => warn!(error = %e, "not replacing dataset"),
            },
            Command::Merge(paths) => match read_files(&paths).await {
                Ok(files) => print_stats(controller.merge_files(files).await),
                Err(e) => warn!(error = %e, "not merging files"),
            },
            Command::Help => print_help(),
            Command::Quit => break,
        }
    }

    controller.detach(&handle);
    Ok(())
}
