use anyhow::Result;

#[derive(Debug, thiserror::Error)]
#[error("ParseError on line '{line}': {msg}")]
pub struct Error {
    msg: String,
    pos: usize,
    line: String,
}

impl Error {
    /// Byte offset of the error in the parsed text.
    pub fn pos(&self) -> usize {
        self.pos
    }
}

/// Parse the text of a graph file. The whole text must be consumed.
pub fn parse(text: &str) -> Result<Vec<crate::ast::Item<'_>>> {
    use combine::EasyParser;
    graphfile::items()
        .easy_parse(text)
        .map(|(items, _remainder)| items)
        .map_err(|e| {
            let pos = e.position.translate_position(text);
            // isolate the line in question:
            let before = &text[0..pos];
            let after = &text[pos..text.len()];
            let prefix: String = before.chars().rev().take_while(|&c| c != '\n').collect();
            let prefix: String = prefix.chars().rev().collect();
            let suffix: String = after.chars().take_while(|&c| c != '\n').collect();
            let line = prefix + &suffix;
            // since converting combine's errors is a lifetime nightmare,
            // we just stringify the error before returning it.
            Error {
                pos,
                line,
                msg: format!("{}", e),
            }
            .into()
        })
}

pub mod prelude {
    pub use combine::parser::char::{char, string};
    pub use combine::parser::range::recognize;
    pub use combine::*;
}

pub mod util {

    use super::prelude::*;
    use combine::parser::char::{alpha_num, letter, space};

    p! {
        ident_start() -> char, {
            char('_').or(letter())
        }
    }

    p! {
        ident_rest() -> Vec<char>, {
            many(char('_').or(alpha_num()))
        }
    }

    p! {
        ident() -> &'a str, {
            recognize(ident_start().and(ident_rest()))
        }
    }

    // runs to the end of the line, but leaves the newline alone.
    p! {
        comment() -> &'a str, {
            recognize(char('#').and(skip_many(none_of("\n".chars()))))
        }
    }

    p! {
        whitespace() -> (), {
            skip_many1(
                space().map(|_| ()).or(comment().map(|_| ()))
            )
        }
    }

    combinator! {
        lex(parser) -> P::Output, {
            optional(whitespace()).with(parser).skip(optional(whitespace()))
        }
    }

    p! {
        line_internal_whitespace() -> (), {
            skip_many1(satisfy(|c: char| c.is_whitespace() && c != '\n'))
        }
    }

    combinator! {
        lex_inline(parser) -> P::Output, {
            optional(line_internal_whitespace())
                .with(parser)
                .skip(optional(line_internal_whitespace()))
        }
    }

    // parser, followed by *mandatory* whitespace
    combinator! {
        lex_word(parser) -> P::Output, {
            optional(whitespace()).with(parser).skip(whitespace())
        }
    }

    // parser, followed by *mandatory* line-internal whitespace
    combinator! {
        lex_word_inline(parser) -> P::Output, {
            optional(line_internal_whitespace()).with(parser).skip(line_internal_whitespace())
        }
    }

    combinator! {
        braces(parser) -> P::Output, {
            char('{').with(parser).skip(char('}'))
        }
    }

    // any number of `parser`s between braces, separated by whitespace and comments.
    combinator! {
        block_of(parser) -> Vec<P::Output>, {
            braces(
                optional(whitespace())
                    .with(many(parser.skip(optional(whitespace()))))
            )
        }
    }

    // a trailing comment is fine before the end of a line.
    p! {
        eol() -> (), {
            optional(comment())
                .with(eof().or(char('\n').and(optional(whitespace())).map(|_| ())))
        }
    }

    combinator! {
        line(parser) -> P::Output, {
            lex_inline(parser).skip(eol())
        }
    }

}

mod literal {

    use super::prelude::*;
    use combine::parser::char::digit;
    use combine::parser::combinator::from_str;

    const FORBID_UNQUOTED: [char; 11] = ['(', ')', '[', ']', '{', '}', '=', ',', '#', '"', '\''];

    combinator! {
        double_quotes(parser) -> P::Output, {
            char('"').with(parser).skip(char('"'))
        }
    }

    p! {
        double_quoted_literal() -> &'a str, {
            double_quotes(recognize(skip_many(none_of("\"".chars()))))
        }
    }

    p! {
        unquoted_literal_char() -> char, {
            satisfy(|c: char|
                !c.is_whitespace() && !FORBID_UNQUOTED.iter().any(|&forbidden| forbidden == c)
            )
        }
    }

    p! {
        unquoted_literal() -> &'a str, {
            recognize(skip_many1(unquoted_literal_char()))
        }
    }

    p! {
        literal() -> &'a str, {
            double_quoted_literal().or(unquoted_literal())
        }
    }

    p! {
        integer() -> i32, {
            from_str(recognize(optional(char('-')).and(skip_many1(digit()))))
        }
    }

}

mod node {
    use super::literal::literal;
    use super::prelude::*;
    use super::util::{
        block_of, ident, lex, lex_inline, lex_word, line_internal_whitespace, whitespace,
    };
    use crate::ast::{Attribute, NodeBlock};

    // `{` for nested attributes has to be on the same line as the value.
    p! {
        children_start() -> (), {
            attempt(optional(line_internal_whitespace()).with(look_ahead(char('{'))))
                .map(|_| ())
        }
    }

    p! {
        attribute() -> Attribute<'a>, {
            literal()
                .skip(lex_inline(char('=')))
                .and(literal())
                .and(optional(children_start().with(block_of(attribute()))))
                .map(|((header, value), children)| Attribute {
                    header,
                    value,
                    children: children.unwrap_or_default(),
                })
        }
    }

    p! {
        property() -> (&'a str, &'a str), {
            ident().skip(lex(char('='))).and(literal())
        }
    }

    p! {
        properties() -> Vec<(&'a str, &'a str)>, {
            string("::")
                .skip(optional(whitespace()))
                .with(many1(property().skip(optional(whitespace()))))
        }
    }

    p! {
        node_block() -> NodeBlock<'a>, {
            lex_word(string("node"))
                .with(ident())
                .skip(optional(whitespace()))
                .and(optional(properties()))
                .and(block_of(attribute()))
                .map(|((name, props), attributes)| NodeBlock {
                    name,
                    props: props.unwrap_or_default(),
                    attributes,
                })
        }
    }

}

mod misc {
    use super::literal::{integer, literal};
    use super::prelude::*;
    use super::util::{block_of, ident, lex_inline, lex_word, lex_word_inline, line};
    use crate::ast::OrderSpec;

    p! {
        order_entry() -> (&'a str, i32), {
            literal().skip(lex_inline(char('='))).and(integer())
        }
    }

    p! {
        order_statement() -> OrderSpec<'a>, {
            lex_word(string("order")).with(
                block_of(order_entry())
                    .map(OrderSpec::Table)
                    .or(ident().map(OrderSpec::Preset))
            )
        }
    }

    p! {
        link_statement() -> Vec<&'a str>, {
            line(lex_word_inline(string("link")).with(sep_by1(lex_inline(ident()), string("->"))))
        }
    }

    p! {
        seed_statement() -> Vec<&'a str>, {
            line(lex_word_inline(string("seed")).with(sep_by1(lex_inline(ident()), char(','))))
        }
    }

}

mod graphfile {
    use super::{
        misc::{link_statement, order_statement, seed_statement},
        node::node_block,
        prelude::*,
        util::whitespace,
    };
    use crate::ast::Item;

    p! {
        item() -> Item<'a>, {
            choice!(
                order_statement().map(Item::Order),
                node_block().map(Item::Node),
                link_statement().map(Item::Link),
                seed_statement().map(Item::Seed)
            )
        }
    }

    p! {
        items() -> Vec<Item<'a>>, {
            optional(whitespace())
                .with(many(item().skip(optional(whitespace()))))
                .skip(eof())
        }
    }
}
