/// A name inside a Jinja expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
	pub text: &'a str,
	/// Byte offset of the first character within the expression.
	pub start: usize,
	/// Byte offset just past the last character.
	pub end: usize,
	/// Set for attribute and filter names: the word follows `.` or `|`.
	pub qualified: bool,
}

/// Constants that keep their capitalised spelling.
pub const LITERAL_NAMES: [&str; 3] = ["True", "False", "None"];

/// Split an expression into its names. String literals and numbers are
/// skipped.
pub fn words(expression: &str) -> Vec<Word<'_>> {
	let bytes = expression.as_bytes();
	let mut words = Vec::new();
	// Last significant byte before the current position.
	let mut previous: Option<u8> = None;
	let mut index = 0;

	while index < bytes.len() {
		let byte = bytes[index];

		if byte == b'\'' || byte == b'"' {
			index = bytes[index + 1..]
				.iter()
				.position(|candidate| *candidate == byte)
				.map_or(bytes.len(), |offset| index + offset + 2);
			previous = Some(byte);
			continue;
		}

		if byte.is_ascii_digit() {
			while index < bytes.len() && is_name_byte(bytes[index]) {
				index += 1;
			}
			previous = Some(b'0');
			continue;
		}

		if byte.is_ascii_alphabetic() || byte == b'_' {
			let start = index;
			while index < bytes.len() && is_name_byte(bytes[index]) {
				index += 1;
			}
			words.push(Word {
				text: &expression[start..index],
				start,
				end: index,
				qualified: matches!(previous, Some(b'.' | b'|')),
			});
			previous = Some(b'a');
			continue;
		}

		if !byte.is_ascii_whitespace() {
			previous = Some(byte);
		}
		index += 1;
	}

	words
}

fn is_name_byte(byte: u8) -> bool {
	byte.is_ascii_alphanumeric() || byte == b'_'
}
