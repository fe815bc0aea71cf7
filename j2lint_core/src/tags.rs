use std::collections::HashSet;
use std::sync::LazyLock;

/// Block families as `(begin, middle..., end)`. A family's tags must open,
/// continue and close together.
pub const TAG_FAMILIES: &[&[&str]] = &[
	&["for", "else", "endfor"],
	&["if", "elif", "else", "endif"],
	&["macro", "endmacro"],
	&["block", "endblock"],
	&["call", "endcall"],
	&["filter", "endfilter"],
	&["with", "endwith"],
	&["autoescape", "endautoescape"],
	&["raw", "endraw"],
	&["trans", "pluralize", "endtrans"],
];

struct TagSets {
	begin: HashSet<&'static str>,
	middle: HashSet<&'static str>,
	end: HashSet<&'static str>,
}

static TAG_SETS: LazyLock<TagSets> = LazyLock::new(|| {
	let mut sets = TagSets {
		begin: HashSet::new(),
		middle: HashSet::new(),
		end: HashSet::new(),
	};

	for family in TAG_FAMILIES {
		let (Some(begin), Some(end)) = (family.first(), family.last()) else {
			continue;
		};
		sets.begin.insert(*begin);
		sets.end.insert(*end);
		sets.middle.extend(&family[1..family.len() - 1]);
	}

	sets
});

/// The role a statement's leading word plays in the block structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
	Begin,
	Middle,
	End,
	/// Any other statement (`set`, `include`, ...), checked as plain content.
	Content,
}

impl TagKind {
	pub fn of(tag: &str) -> Self {
		if is_begin_tag(tag) {
			Self::Begin
		} else if is_end_tag(tag) {
			Self::End
		} else if is_middle_tag(tag) {
			Self::Middle
		} else {
			Self::Content
		}
	}
}

pub fn is_begin_tag(tag: &str) -> bool {
	TAG_SETS.begin.contains(tag)
}

pub fn is_middle_tag(tag: &str) -> bool {
	TAG_SETS.middle.contains(tag)
}

pub fn is_end_tag(tag: &str) -> bool {
	TAG_SETS.end.contains(tag)
}

/// The first family containing `tag`.
pub fn family_of(tag: &str) -> Option<&'static [&'static str]> {
	TAG_FAMILIES
		.iter()
		.copied()
		.find(|family| family.contains(&tag))
}
