//! Migration commands and the builder that accumulates them.

use serde::{Deserialize, Serialize};

const INDENT: &str = "    ";

/// One executable unit of migration SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationCommand {
	pub command_text: String,
	/// When set, the command must run outside of any migration transaction.
	pub transaction_suppressed: bool,
}

impl MigrationCommand {
	pub fn new(command_text: impl Into<String>, transaction_suppressed: bool) -> Self {
		Self {
			command_text: command_text.into(),
			transaction_suppressed,
		}
	}
}

/// Accumulates SQL text and cuts it into [`MigrationCommand`]s.
///
/// # Example
///
/// ```rust
/// use reinhardt_relational::commands::MigrationCommandListBuilder;
///
/// let mut builder = MigrationCommandListBuilder::new();
/// builder.append("DROP TABLE \"t\"").append_line(";");
/// builder.end_command(true);
///
/// let commands = builder.into_commands();
/// assert_eq!(commands.len(), 1);
/// assert_eq!(commands[0].command_text, "DROP TABLE \"t\";\n");
/// assert!(commands[0].transaction_suppressed);
/// ```
#[derive(Debug, Default)]
pub struct MigrationCommandListBuilder {
	buffer: String,
	indent: usize,
	at_line_start: bool,
	commands: Vec<MigrationCommand>,
}

impl MigrationCommandListBuilder {
	pub fn new() -> Self {
		Self {
			at_line_start: true,
			..Default::default()
		}
	}

	pub fn append(&mut self, text: impl AsRef<str>) -> &mut Self {
		let text = text.as_ref();
		if text.is_empty() {
			return self;
		}
		if self.at_line_start {
			for _ in 0..self.indent {
				self.buffer.push_str(INDENT);
			}
			self.at_line_start = false;
		}
		self.buffer.push_str(text);
		self
	}

	pub fn append_line(&mut self, text: impl AsRef<str>) -> &mut Self {
		self.append(text);
		self.buffer.push('\n');
		self.at_line_start = true;
		self
	}

	/// Appends every line of `text`, indenting each one.
	pub fn append_lines(&mut self, text: impl AsRef<str>) -> &mut Self {
		for line in text.as_ref().lines() {
			self.append_line(line);
		}
		self
	}

	pub fn increment_indent(&mut self) -> &mut Self {
		self.indent += 1;
		self
	}

	pub fn decrement_indent(&mut self) -> &mut Self {
		self.indent = self.indent.saturating_sub(1);
		self
	}

	/// Runs `f` one indentation level deeper.
	pub fn indented<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
		self.increment_indent();
		let result = f(self);
		self.decrement_indent();
		result
	}

	/// Closes the current command. An empty buffer produces no command.
	pub fn end_command(&mut self, suppress_transaction: bool) -> &mut Self {
		if !self.buffer.trim().is_empty() {
			let text = std::mem::take(&mut self.buffer);
			self.commands
				.push(MigrationCommand::new(text, suppress_transaction));
		} else {
			self.buffer.clear();
		}
		self.at_line_start = true;
		self
	}

	/// Text appended since the last [`end_command`](Self::end_command).
	pub fn pending_text(&self) -> &str {
		&self.buffer
	}

	pub fn commands(&self) -> &[MigrationCommand] {
		&self.commands
	}

	pub fn into_commands(mut self) -> Vec<MigrationCommand> {
		self.end_command(false);
		self.commands
	}
}
