#[allow(unused_macros)]
macro_rules! green {
    ($($arg:tt)*) => (
        {
            use atty::Stream;
            use ansi_term::Colour;
            if atty::is(Stream::Stdout) {
                format!("{}", Colour::Green.bold().paint(format!($($arg)*)))
            } else {
                format!($($arg)*)
            }
        }
    )
}

#[allow(unused_macros)]
macro_rules! red {
    ($($arg:tt)*) => (
        {
            use atty::Stream;
            use ansi_term::Colour;
            if atty::is(Stream::Stderr) {
                format!("{}", Colour::Red.bold().paint(format!($($arg)*)))
            } else {
                format!($($arg)*)
            }
        }
    )
}

#[allow(unused_macros)]
macro_rules! yellow {
    ($($arg:tt)*) => (
        {
            use atty::Stream;
            use ansi_term::Colour;
            if atty::is(Stream::Stdout) {
                format!("{}", Colour::Yellow.bold().paint(format!($($arg)*)))
            } else {
                format!($($arg)*)
            }
        }
    )
}

#[allow(unused_macros)]
macro_rules! format_err {
    ($($arg:tt)*) => (
        {
            format!("{} {}", red!("error:"), $($arg)*)
        }
    )
}
