use serde::Deserialize;
use serde::Serialize;

use crate::StructureError;
use crate::lexer::extract_statements;
use crate::statement::Statement;
use crate::tags::TagKind;
use crate::tags::family_of;

/// Columns added to the expected indentation for each level of nesting.
pub const INDENT_SHIFT: usize = 4;
/// The single space conventionally written after a non-trimming `{%`.
pub const DEFAULT_WHITESPACES: usize = 1;

/// Index of a [`Node`] inside an [`Indenter`].
pub type NodeId = usize;

/// One statement occurrence in the block tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
	pub statement: Statement,
	pub tag: String,
	/// Line of the statement itself.
	pub node_start: usize,
	/// Line of the statement closing this node's block. Equal to `node_start`
	/// for anything that does not open a block.
	pub node_end: usize,
	pub expected_indent: usize,
	/// `None` for top-level statements.
	pub parent: Option<NodeId>,
	pub children: Vec<NodeId>,
}

/// A single indentation mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndentationRecord {
	/// Line on which the statement starts.
	pub line: usize,
	/// The statement with its delimiters, e.g. `{%  endif %}`.
	pub text: String,
	pub message: String,
}

/// Outcome of validating one file: every indentation mismatch found, plus the
/// structural failure that stopped validation, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndentationReport {
	pub records: Vec<IndentationRecord>,
	pub fatal: Option<StructureError>,
}

impl IndentationReport {
	pub fn is_ok(&self) -> bool {
		self.records.is_empty() && self.fatal.is_none()
	}
}

/// Extract the line-leading statements of `text` and validate their nesting
/// and indentation.
pub fn check_indentation(text: &str) -> IndentationReport {
	let statements: Vec<Statement> = extract_statements(text, true).collect();
	validate_indentation(&statements)
}

/// Validate nesting and indentation of an ordered list of statements.
///
/// Every call works on its own [`Indenter`], so validating several files, in
/// sequence or in parallel, never shares block state.
pub fn validate_indentation(statements: &[Statement]) -> IndentationReport {
	let mut indenter = Indenter::new();
	let fatal = indenter.check(statements).err();

	IndentationReport {
		records: indenter.records,
		fatal,
	}
}

/// A parse level: the node whose block is being filled and the indentation
/// expected of statements directly inside it.
#[derive(Debug, Clone, Copy)]
struct Frame {
	/// `None` for the top level of the file.
	owner: Option<NodeId>,
	baseline: usize,
}

/// Builds the block tree for one file and records indentation mismatches.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]. The open
/// block stack holds the begin nodes whose end tag has not been seen yet,
/// innermost last.
#[derive(Debug, Default)]
pub struct Indenter {
	nodes: Vec<Node>,
	roots: Vec<NodeId>,
	stack: Vec<NodeId>,
	records: Vec<IndentationRecord>,
}

impl Indenter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Top-level nodes in source order.
	pub fn roots(&self) -> &[NodeId] {
		&self.roots
	}

	pub fn records(&self) -> &[IndentationRecord] {
		&self.records
	}

	/// Blocks still open. Empty after a successful [`check`](Self::check).
	pub fn open_blocks(&self) -> &[NodeId] {
		&self.stack
	}

	/// Walk `statements`, building the block tree and collecting indentation
	/// records. Any state from a previous run is discarded first.
	///
	/// A begin tag opens a new level whose contents are expected
	/// [`INDENT_SHIFT`] columns deeper. A middle tag (`elif`, `else`, ...)
	/// starts a sibling section at its begin tag's level. An end tag closes the
	/// innermost block. A level that meets a tag belonging to an enclosing
	/// block hands it back to that block without consuming it.
	///
	/// The indentation of a begin or middle tag is checked once its section
	/// has closed, so records are ordered the way the levels unwind.
	pub fn check(&mut self, statements: &[Statement]) -> Result<(), StructureError> {
		self.reset();

		let mut frames = vec![Frame {
			owner: None,
			baseline: 0,
		}];
		let mut index = 0;

		while let Some(&frame) = frames.last() {
			let Some(statement) = statements.get(index) else {
				self.leave(&mut frames);
				continue;
			};

			match TagKind::of(statement.tag()) {
				TagKind::Begin => {
					let node = self.add_node(statement, frame.baseline, frame.owner);
					self.stack.push(node);
					frames.push(Frame {
						owner: Some(node),
						baseline: frame.baseline + INDENT_SHIFT,
					});
					index += 1;
				}
				TagKind::End => {
					let open = self.matching_block(statement)?;
					if frame.owner != Some(open) {
						self.leave(&mut frames);
						continue;
					}

					let expected = self.nodes[open].expected_indent;
					let parent = self.nodes[open].parent;
					let node = self.add_node(statement, expected, parent);
					self.nodes[open].node_end = statement.start_line;
					self.check_indent_level(node);
					self.stack.pop();
					index += 1;
					self.leave(&mut frames);
				}
				TagKind::Middle => {
					let open = self.continued_block(statement)?;
					if frame.owner != Some(open) {
						self.leave(&mut frames);
						continue;
					}

					let expected = self.nodes[open].expected_indent;
					let parent = self.nodes[open].parent;
					let node = self.add_node(statement, expected, parent);
					frames.push(Frame {
						owner: Some(node),
						baseline: expected + INDENT_SHIFT,
					});
					index += 1;
				}
				TagKind::Content => {
					let node = self.add_node(statement, frame.baseline, frame.owner);
					self.check_indent_level(node);
					index += 1;
				}
			}
		}

		if let Some(&open) = self.stack.last() {
			let statement = &self.nodes[open].statement;
			return Err(StructureError::UnterminatedBlock {
				tag: self.nodes[open].tag.clone(),
				line: statement.start_line,
				text: statement.render(),
			});
		}

		Ok(())
	}

	fn reset(&mut self) {
		self.nodes.clear();
		self.roots.clear();
		self.stack.clear();
		self.records.clear();
	}

	fn add_node(
		&mut self,
		statement: &Statement,
		expected_indent: usize,
		parent: Option<NodeId>,
	) -> NodeId {
		let id = self.nodes.len();
		self.nodes.push(Node {
			statement: statement.clone(),
			tag: statement.tag().to_string(),
			node_start: statement.start_line,
			node_end: statement.start_line,
			expected_indent,
			parent,
			children: vec![],
		});

		match parent {
			Some(parent) => self.nodes[parent].children.push(id),
			None => self.roots.push(id),
		}

		id
	}

	/// Close the current level and check the node that opened it.
	fn leave(&mut self, frames: &mut Vec<Frame>) {
		if let Some(Frame {
			owner: Some(node), ..
		}) = frames.pop()
		{
			self.check_indent_level(node);
		}
	}

	/// The open block an end tag closes. It must be the innermost one.
	fn matching_block(&self, statement: &Statement) -> Result<NodeId, StructureError> {
		let tag = statement.tag();
		self.stack
			.last()
			.copied()
			.filter(|&open| {
				tag.strip_prefix("end")
					.is_some_and(|name| name == self.nodes[open].tag)
			})
			.ok_or_else(|| {
				StructureError::OutOfOrderTag {
					tag: tag.to_string(),
					line: statement.start_line,
					text: statement.render(),
				}
			})
	}

	/// The open block a middle tag continues. The tag must belong to the
	/// innermost block's family.
	fn continued_block(&self, statement: &Statement) -> Result<NodeId, StructureError> {
		let tag = statement.tag();
		self.stack
			.last()
			.copied()
			.filter(|&open| {
				family_of(&self.nodes[open].tag).is_some_and(|family| family.contains(&tag))
			})
			.ok_or_else(|| {
				StructureError::UnsupportedTag {
					tag: tag.to_string(),
					line: statement.start_line,
					text: statement.render(),
				}
			})
	}

	/// Compare the whitespace after a node's start delimiter with what its
	/// depth and delimiters call for.
	///
	/// A trimming opener (`{%-`, `{%+`) replaces the conventional single space.
	/// One extra column is expected when the innermost open block uses a
	/// trimming opener, or when a top-level node uses one itself.
	fn check_indent_level(&mut self, id: NodeId) {
		let node = &self.nodes[id];
		let statement = &node.statement;
		let actual = statement.indent();
		let trimming = statement.start_delimiter.is_trimming();

		let inside_trimmed_block = self
			.stack
			.last()
			.is_some_and(|&open| self.nodes[open].statement.start_delimiter.is_trimming());
		let block_start_indent =
			usize::from(inside_trimmed_block || (node.expected_indent == 0 && trimming));

		let expected = if trimming {
			node.expected_indent + block_start_indent
		} else {
			node.expected_indent + DEFAULT_WHITESPACES + block_start_indent
		};

		if actual == expected {
			return;
		}

		let record = IndentationRecord {
			line: statement.start_line,
			text: statement.render(),
			message: format!("Bad Indentation, expected {expected}, got {actual}"),
		};
		tracing::debug!(?record, "bad indentation");
		self.records.push(record);
	}
}
