#![allow(unused)]

/// Paints text when stdout is a terminal, plain text otherwise
#[allow(unused_macros)]
macro_rules! colorize_impl {
    ($color_expr:expr, $($arg:tt)*) => {
        {
            use atty::Stream;
            if atty::is(Stream::Stdout) {
                format!("{}", $color_expr.paint(format!($($arg)*)))
            } else {
                format!($($arg)*)
            }
        }
    }
}

#[allow(unused_macros)]
#[macro_export]
macro_rules! green {
    ($($arg:tt)*) => {
        colorize_impl!(ansi_term::Colour::Green.bold(), $($arg)*)
    }
}

#[allow(unused_macros)]
#[macro_export]
macro_rules! red {
    ($($arg:tt)*) => {
        colorize_impl!(ansi_term::Colour::Red.bold(), $($arg)*)
    }
}

#[allow(unused_macros)]
#[macro_export]
macro_rules! yellow {
    ($($arg:tt)*) => {
        colorize_impl!(ansi_term::Colour::Yellow.bold(), $($arg)*)
    }
}

/// `1 file`, `0 files`, `3 files`
#[macro_export]
macro_rules! pluralize {
    ($value:expr, $word:expr) => {
        if $value == 1 {
            format!("{} {}", $value, $word)
        } else {
            format!("{} {}s", $value, $word)
        }
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_color_macros_contain_text() {
        assert!(green!("hello").contains("hello"));
        assert!(red!("error {}", 2).contains("error 2"));
        assert!(yellow!("warning").contains("warning"));
    }

    #[test]
    fn test_pluralize_macro() {
        assert_eq!(pluralize!(1, "file"), "1 file");
        assert_eq!(pluralize!(0, "file"), "0 files");
        assert_eq!(pluralize!(2, "rule"), "2 rules");
    }
}
