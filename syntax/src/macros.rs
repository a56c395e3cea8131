// Both macros expand to `combine::parser!` fns over `&str` range streams.
// Parse errors must accept `ParseIntError`, for the integers in `order` tables.

/// A parser fn with no parser arguments: `p! { name() -> Output, { body } }`.
macro_rules! p (
    ($name:ident( $($arg: ident :  $arg_type: ty),* ) -> $ret:ty, $code:expr) => (
        combine::parser!{
            pub fn $name['a, I]($($arg : $arg_type),*)(I) -> $ret
                where
                [I: combine::stream::RangeStream<Range = &'a str, Token = char>,
                 I::Error: combine::ParseError<char, &'a str, <I as combine::stream::StreamOnce>::Position>,
                 <I::Error as combine::ParseError<char, &'a str, <I as combine::stream::StreamOnce>::Position>>::StreamError:
                     From<std::num::ParseIntError>
            ]            {
                $code
            }
        }
    );
);

/// A parser fn built around another parser `P`, which the output type may refer to:
/// `combinator! { braces(parser) -> P::Output, { ... } }`.
macro_rules! combinator (
    ($name:ident($delegate: ident) -> $ret:ty, $code:expr) => (
        combine::parser!{
            pub fn $name['a, I, P]($delegate: P)(I) -> $ret
                where
                [I: combine::stream::RangeStream<Range = &'a str, Token = char>,
                 I::Error: combine::ParseError<char, &'a str, <I as combine::stream::StreamOnce>::Position>,
                 <I::Error as combine::ParseError<char, &'a str, <I as combine::stream::StreamOnce>::Position>>::StreamError:
                     From<std::num::ParseIntError>,
                 P: combine::Parser<I>,
            ]            {
                $code
            }
        }
    );
);
