//! `j2lint_core` is the core library of the j2lint Jinja2 linter. It extracts
//! `{% ... %}` statements and `{{ ... }}` expressions from template text,
//! checks that block statements nest correctly and are indented according to
//! their depth, and runs the built-in lint rules over files.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Template text
//!   → Tag extractors (`{% … %}` statements, `{{ … }}` expressions and `{# … #}` comments, with line numbers)
//!   → Tag classifier (begin / middle / end / plain statement)
//!   → Indenter (open-block stack, block tree, expected indentation per depth)
//!   → Rules collection (wraps findings as issues, applies ignore / warn / disable comments)
//! ```
//!
//! ## Indentation
//!
//! Indentation is measured *inside* the delimiters. A top-level statement has
//! one space after `{%`, every nesting level adds four more, and middle and
//! end tags line up with their begin tag:
//!
//! ```text
//! {% if user %}
//! {%     for item in user.items %}
//! {%         set total = total + item.price %}
//! {%     endfor %}
//! {% else %}
//! {%     set total = 0 %}
//! {% endif %}
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use j2lint_core::check_indentation;
//!
//! let report = check_indentation("{% if x %}\n{%    set y = 1 %}\n{% endif %}\n");
//! assert!(report.fatal.is_none());
//! assert_eq!(report.records.len(), 1);
//! assert_eq!(report.records[0].message, "Bad Indentation, expected 5, got 4");
//! ```

pub use collection::*;
pub use config::*;
pub use error::*;
pub use indenter::*;
pub use lexer::Statements;
pub use lexer::Variables;
pub use lexer::extract_comments;
pub use lexer::extract_statements;
pub use lexer::extract_variables;
pub use rules::*;
pub use statement::*;

mod collection;
pub mod config;
#[allow(unused_assignments)]
mod error;
mod expression;
mod indenter;
pub(crate) mod lexer;
pub mod project;
mod rules;
mod statement;
pub mod tags;
